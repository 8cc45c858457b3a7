//! HTTP client abstraction for testability
//!
//! Every network call in the crate goes through [`AsyncHttpClient`], so the
//! export protocol and the headless viewer can be exercised against scripted
//! responses in tests and against reqwest in production.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Default timeout for a single HTTP request in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP method used by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// An outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a GET request with no headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request with no headers and no body.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Sets the request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the value of the first header with the given name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received HTTP response.
///
/// Non-2xx statuses are not errors at this layer; callers decide what a
/// status means for their operation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Transport-level HTTP failures.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The request could not be sent or the response could not be read.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Sends a request and returns the response, whatever its status.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<C: AsyncHttpClient> AsyncHttpClient for Arc<C> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send {
        (**self).send(request)
    }
}

/// Real async HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with default configuration.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new AsyncReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("imodel-tiles/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| HttpError::Transport {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| HttpError::Transport {
            url: request.url.clone(),
            reason: format!("failed to read response: {}", e),
        })?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct MockRoute {
        method: Method,
        url_pattern: String,
        responses: VecDeque<Result<HttpResponse, HttpError>>,
    }

    /// Scripted async HTTP client for testing.
    ///
    /// Routes match on method and a URL substring, first registered first.
    /// A route replays its responses in order and keeps repeating the last
    /// one. Every request is recorded with the (tokio) time it was sent.
    #[derive(Default)]
    pub struct MockAsyncHttpClient {
        routes: Mutex<Vec<MockRoute>>,
        requests: Mutex<Vec<(HttpRequest, Instant)>>,
    }

    impl MockAsyncHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a route answering with the given responses.
        pub fn on(
            self,
            method: Method,
            url_pattern: &str,
            responses: Vec<Result<HttpResponse, HttpError>>,
        ) -> Self {
            self.routes.lock().unwrap().push(MockRoute {
                method,
                url_pattern: url_pattern.to_string(),
                responses: responses.into(),
            });
            self
        }

        /// Registers a route answering with JSON bodies and status 200.
        pub fn on_json(self, method: Method, url_pattern: &str, bodies: &[&str]) -> Self {
            let responses = bodies
                .iter()
                .map(|b| Ok(HttpResponse::new(200, b.as_bytes().to_vec())))
                .collect();
            self.on(method, url_pattern, responses)
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(r, _)| r.clone())
                .collect()
        }

        pub fn request_times(&self, method: Method, url_pattern: &str) -> Vec<Instant> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(r, _)| r.method == method && r.url.contains(url_pattern))
                .map(|(_, t)| *t)
                .collect()
        }

        pub fn count(&self, method: Method, url_pattern: &str) -> usize {
            self.request_times(method, url_pattern).len()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.requests
                .lock()
                .unwrap()
                .push((request.clone(), Instant::now()));

            let mut routes = self.routes.lock().unwrap();
            let route = routes
                .iter_mut()
                .find(|r| r.method == request.method && request.url.contains(&r.url_pattern));

            match route {
                Some(route) if route.responses.len() > 1 => route.responses.pop_front().unwrap(),
                Some(route) if route.responses.len() == 1 => route.responses[0].clone(),
                _ => Err(HttpError::Transport {
                    url: request.url,
                    reason: "no mock route".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_mock_client_replays_then_repeats_last() {
        let mock = MockAsyncHttpClient::new().on_json(Method::Get, "/a", &["1", "2"]);

        let first = mock.send(HttpRequest::get("http://x/a")).await.unwrap();
        let second = mock.send(HttpRequest::get("http://x/a")).await.unwrap();
        let third = mock.send(HttpRequest::get("http://x/a")).await.unwrap();

        assert_eq!(first.text(), "1");
        assert_eq!(second.text(), "2");
        assert_eq!(third.text(), "2");
        assert_eq!(mock.count(Method::Get, "/a"), 3);
    }

    #[tokio::test]
    async fn test_mock_client_unrouted_request_fails() {
        let mock = MockAsyncHttpClient::new();
        let result = mock.send(HttpRequest::post("http://x/a")).await;
        assert!(matches!(result, Err(HttpError::Transport { .. })));
    }

    #[test]
    fn test_request_builder_headers() {
        let request = HttpRequest::post("http://x")
            .header("Accept", "application/json")
            .body("{}");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("accept"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some("{}"));
        assert_eq!(request.header_value("Authorization"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, Vec::new()).is_success());
        assert!(HttpResponse::new(201, Vec::new()).is_success());
        assert!(!HttpResponse::new(404, Vec::new()).is_success());
        assert!(!HttpResponse::new(500, Vec::new()).is_success());
    }
}
