//! Venue server endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where the dashboard talks to and how it authenticates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the venue web application (`https://host[:port]`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base URL of the push channel. Derived from `base_url` when empty.
    #[serde(default)]
    pub ws_base_url: String,
    /// Venue whose notifications the dashboard follows.
    #[serde(default)]
    pub venue_id: String,
    /// CSRF token sent as `X-CSRFToken` on state-changing requests.
    #[serde(default)]
    pub csrf_token: String,
    /// Raw `Cookie` header value carrying the authenticated session.
    #[serde(default)]
    pub session_cookie: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_base_url: String::new(),
            venue_id: String::new(),
            csrf_token: String::new(),
            session_cookie: String::new(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// Resolve a server-relative path (`/reservation/7/...`) against `base_url`.
    /// Absolute URLs pass through untouched.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Push channel base: explicit `ws_base_url`, else `base_url` with the
    /// scheme swapped (`https` → `wss`, `http` → `ws`).
    pub fn ws_base(&self) -> String {
        if !self.ws_base_url.is_empty() {
            return self.ws_base_url.trim_end_matches('/').to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        }
    }

    /// Full URL of the venue notification feed.
    pub fn feed_url(&self) -> String {
        format!("{}/ws/notifications/{}/", self.ws_base(), self.venue_id)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
