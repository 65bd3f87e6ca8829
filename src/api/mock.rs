//! Recording transport for tests.

use super::{ApiError, Request, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16),
}

/// Answers from a fixed table keyed by request target (`/path?k=v`) or POST
/// path. Unknown targets get a 404. Every call is recorded.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    bodies: Mutex<Vec<Value>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, target: &str, value: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(target.to_string(), Reply::Json(value));
        self
    }

    pub fn with_status(self, target: &str, status: u16) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(target.to_string(), Reply::Status(status));
        self
    }

    /// Calls so far, as `"GET /path?query"` or `"POST /path"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.bodies.lock().unwrap().last().cloned()
    }

    fn reply(&self, target: &str) -> Result<Value, ApiError> {
        match self.replies.lock().unwrap().get(target).cloned() {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status)) => Err(ApiError::Status {
                status,
                path: target.to_string(),
            }),
            None => Err(ApiError::Status {
                status: 404,
                path: target.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: &Request) -> Result<Value, ApiError> {
        let target = request.target();
        self.calls.lock().unwrap().push(format!("GET {}", target));
        self.reply(&target)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(format!("POST {}", path));
        self.bodies.lock().unwrap().push(body.clone());
        self.reply(path)
    }
}
