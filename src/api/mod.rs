pub mod endpoints;
mod lenient;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use endpoints::Request;
pub use types::{AdminStats, LoginRequest, LoginResponse, MovieDetail, MovieSummary, UserMetric};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Every way a backend call can fail, collapsed into one error path.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// True when the backend rejected the caller's credentials or role.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { status, .. } if self.is_auth_failure() => {
                format!("Not authorised (HTTP {})", status)
            }
            ApiError::Status { status, .. } => format!("Server error (HTTP {})", status),
            ApiError::Decode(_) => "The server sent an unreadable response".to_string(),
            ApiError::Network(e) if e.is_timeout() => "The request timed out".to_string(),
            ApiError::Network(_) => "Could not reach the server".to_string(),
        }
    }
}

/// The wire underneath the gateway. Swapped for a recording fake in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &Request) -> Result<Value, ApiError>;
    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}

/// reqwest-backed transport talking to the recommendation API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("cinephile/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: response.url().path().to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &Request) -> Result<Value, ApiError> {
        debug!(target = %request.target(), "GET");
        let response = self
            .client
            .get(self.url(&request.path))
            .query(&request.query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        debug!(path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }
}

/// Single-slot admission control in front of the transport.
///
/// At most one request sequence is outstanding per gateway. A second
/// `try_begin` while one is in flight returns `None` and issues nothing.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    busy: Arc<AtomicBool>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the gateway. The returned guard releases it on drop, whatever
    /// happened to the requests made through it.
    pub fn try_begin(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                transport: Arc::clone(&self.transport),
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Proof that the gateway is claimed. Requests go through this.
pub struct InFlight {
    transport: Arc<dyn Transport>,
    busy: Arc<AtomicBool>,
}

impl InFlight {
    pub async fn get_json<T: DeserializeOwned>(&self, request: &Request) -> Result<T, ApiError> {
        let value = self.transport.get(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch a movie list. Entries that are not objects are skipped.
    pub async fn get_movies(&self, request: &Request) -> Result<Vec<MovieSummary>, ApiError> {
        let value = self.transport.get(request).await?;
        types::decode_movie_list(value)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let value = self.transport.post(path, &body).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_second_begin_is_refused_while_in_flight() {
        let gateway = Gateway::new(Arc::new(MockTransport::new()));
        let first = gateway.try_begin();
        assert!(first.is_some());
        assert!(gateway.is_busy());
        assert!(gateway.try_begin().is_none());

        drop(first);
        assert!(!gateway.is_busy());
        assert!(gateway.try_begin().is_some());
    }

    #[tokio::test]
    async fn test_refused_begin_issues_no_call() {
        let transport = Arc::new(MockTransport::new().with_json("/trending?limit=20", json!([])));
        let gateway = Gateway::new(transport.clone());

        let flight = gateway.try_begin().unwrap();
        let _: Vec<MovieSummary> = flight.get_movies(&endpoints::trending(20)).await.unwrap();
        assert!(gateway.try_begin().is_none());

        assert_eq!(transport.calls(), vec!["GET /trending?limit=20"]);
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let transport = Arc::new(MockTransport::new().with_status("/trending?limit=20", 500));
        let gateway = Gateway::new(transport);

        {
            let flight = gateway.try_begin().unwrap();
            let result = flight.get_movies(&endpoints::trending(20)).await;
            assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
        }
        assert!(!gateway.is_busy());
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let transport =
            Arc::new(MockTransport::new().with_json("/movie/1", json!("not an object")));
        let gateway = Gateway::new(transport);
        let flight = gateway.try_begin().unwrap();
        let result: Result<MovieDetail, _> = flight.get_json(&endpoints::movie(1)).await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_post_json_roundtrip() {
        let transport = Arc::new(MockTransport::new().with_json(
            endpoints::LOGIN_PATH,
            json!({ "role": "user", "user_id": 1, "username": "abdullah" }),
        ));
        let gateway = Gateway::new(transport.clone());
        let flight = gateway.try_begin().unwrap();
        let response: LoginResponse = flight
            .post_json(
                endpoints::LOGIN_PATH,
                &LoginRequest {
                    username: "abdullah".to_string(),
                    password: "1234".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.user_id, Some(1));
        assert_eq!(transport.calls(), vec!["POST /login"]);
        assert_eq!(
            transport.last_body(),
            Some(json!({ "username": "abdullah", "password": "1234" }))
        );
    }

    #[test]
    fn test_auth_failure_classification() {
        let unauthorized = ApiError::Status { status: 401, path: "/login".to_string() };
        let forbidden = ApiError::Status { status: 403, path: "/admin/stats".to_string() };
        let broken = ApiError::Status { status: 500, path: "/login".to_string() };
        assert!(unauthorized.is_auth_failure());
        assert!(forbidden.is_auth_failure());
        assert!(!broken.is_auth_failure());
        assert!(broken.user_message().contains("500"));
    }

    #[test]
    fn test_http_transport_trims_base_url() {
        let transport = HttpTransport::new("http://localhost:8000/", None).unwrap();
        assert_eq!(transport.url("/trending"), "http://localhost:8000/trending");
    }
}
