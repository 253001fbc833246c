//! Transport trait for state-changing reservation requests.

use async_trait::async_trait;

use crate::result::AppResult;

/// Issues authenticated state-changing requests against the venue server.
///
/// Implementations own authentication (CSRF token, session cookie) and URL
/// resolution. A non-success status or an unparsable body must surface as
/// an error; the decoded JSON body is returned untouched otherwise.
#[async_trait]
pub trait ActionTransport: Send + Sync + std::fmt::Debug + 'static {
    /// POST an empty JSON object to `url` and return the decoded response body.
    async fn post_json(&self, url: &str) -> AppResult<serde_json::Value>;
}
