//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use openspots_core::traits::ActionTransport;
use openspots_core::{AppError, AppResult};

/// Transport that replays queued responses and records requested URLs.
#[derive(Debug, Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<AppResult<Value>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    /// Queue the result of the next POST.
    pub fn respond(&self, response: AppResult<Value>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// URLs posted so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionTransport for FakeTransport {
    async fn post_json(&self, url: &str) -> AppResult<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::network("No response queued")))
    }
}
