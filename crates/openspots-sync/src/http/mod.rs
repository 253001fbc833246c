//! HTTP transport for reservation actions.

pub mod transport;

pub use transport::HttpActionTransport;
