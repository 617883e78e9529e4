use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, header};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_MALFORMED_REPLIES, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS,
    CLIENT_REQUEST_RETRIES, CLIENT_REQUESTS,
};
use crate::types::{GenerateContentRequest, Model, Reply};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Create a new response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one request and returns whatever the server said.
///
/// Implementations report transport failures as [`Error::Connection`] or
/// [`Error::Timeout`]; any status, including errors, comes back as `Ok`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `url`.
    async fn post_json(&self, url: &Url, body: &GenerateContentRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .default_headers(Self::default_headers())
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(Self { client, timeout })
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(e.to_string(), Some(self.timeout.as_secs_f64()))
        } else {
            Error::connection(e.to_string(), Some(Box::new(e)))
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &Url, body: &GenerateContentRequest) -> Result<HttpResponse> {
        let body = serde_json::to_vec(body).map_err(|e| {
            Error::serialization(format!("Failed to encode request: {}", e), Some(Box::new(e)))
        })?;
        let response = self
            .client
            .post(url.clone())
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(HttpResponse { status, body })
    }
}

/// How many times to try a request and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is raised to 1 if it is 0.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fixed pause between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// What to do after a single attempt.
#[derive(Debug)]
enum Attempt {
    Done(Reply),
    Retry(Error),
    Fail(Error),
}

impl Attempt {
    fn classify(outcome: Result<HttpResponse>) -> Self {
        match outcome {
            Ok(response) if response.status == 200 => Attempt::Done(Reply::from_body(&response.body)),
            Ok(response) => {
                let err = Error::from_status(response.status, response.body);
                if err.is_retryable() {
                    Attempt::Retry(err)
                } else {
                    Attempt::Fail(err)
                }
            }
            Err(err) if err.is_retryable() => Attempt::Retry(err),
            Err(err) => Attempt::Fail(err),
        }
    }
}

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    base_url: Url,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key, env::var(API_KEY_ENV).ok())?;
        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL))?;
        let transport = ReqwestTransport::new(timeout.unwrap_or(DEFAULT_TIMEOUT))?;
        Ok(Self {
            api_key,
            base_url,
            transport: Arc::new(transport),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(api_key: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            transport,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The active retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The `generateContent` URL for `model`, with the API key attached.
    pub fn endpoint(&self, model: Model) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", model))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Send `request` to `model`, retrying transient failures.
    ///
    /// Transport failures and 5xx statuses are retried until the policy's
    /// attempts run out. Any other status fails at once. A 200 always yields a
    /// [`Reply`], which is [`Reply::Malformed`] when the body has no text.
    pub async fn generate(&self, model: Model, request: &GenerateContentRequest) -> Result<Reply> {
        let url = self.endpoint(model)?;
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;
        loop {
            CLIENT_REQUESTS.click();
            debug!(attempt, max_attempts, %model, "sending generateContent request");
            let start = Instant::now();
            let outcome = Attempt::classify(self.transport.post_json(&url, request).await);
            CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

            match outcome {
                Attempt::Done(reply) => {
                    if reply.is_malformed() {
                        CLIENT_MALFORMED_REPLIES.click();
                        warn!(%model, "response did not contain candidate text");
                    }
                    return Ok(reply);
                }
                Attempt::Retry(err) if attempt < max_attempts => {
                    CLIENT_REQUEST_ERRORS.click();
                    CLIENT_REQUEST_RETRIES.click();
                    warn!(attempt, max_attempts, error = %err, "request failed; retrying");
                    tokio::time::sleep(self.retry.delay()).await;
                    attempt += 1;
                }
                Attempt::Retry(err) | Attempt::Fail(err) => {
                    CLIENT_REQUEST_ERRORS.click();
                    warn!(attempt, max_attempts, error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .or(from_env)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            Error::configuration(format!(
                "API key not provided and {API_KEY_ENV} environment variable not set"
            ))
        })
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // Url::join drops the last path segment unless the base ends in a slash.
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{base_url}/"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        responses: Mutex<VecDeque<Result<HttpResponse>>>,
        calls: Mutex<Vec<(Url, GenerateContentRequest)>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<HttpResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Transport for Scripted {
        async fn post_json(
            &self,
            url: &Url,
            body: &GenerateContentRequest,
        ) -> Result<HttpResponse> {
            self.calls.lock().unwrap().push((url.clone(), body.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("transport called more often than scripted")
        }
    }

    fn ok(text: &str) -> Result<HttpResponse> {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        });
        Ok(HttpResponse::new(200, body.to_string()))
    }

    fn status(code: u16) -> Result<HttpResponse> {
        Ok(HttpResponse::new(code, format!("{{\"error\": {{\"code\": {code}}}}}")))
    }

    fn client(transport: Arc<Scripted>) -> Gemini {
        Gemini::with_transport("test-key", transport)
    }

    #[test]
    fn endpoint_includes_model_and_key() {
        let gemini = client(Scripted::new(vec![]));
        assert_eq!(
            gemini.endpoint(Model::Gemini15Flash).unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=test-key"
        );
        assert_eq!(
            gemini.endpoint(Model::Gemini15Pro).unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent?key=test-key"
        );
    }

    #[test]
    fn custom_base_url() {
        let gemini = Gemini::with_options(
            Some("test-key".to_string()),
            Some("http://127.0.0.1:8080/v1beta".to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(
            gemini.endpoint(Model::Gemini15Pro).unwrap().as_str(),
            "http://127.0.0.1:8080/v1beta/models/gemini-1.5-pro:generateContent?key=test-key"
        );
    }

    #[test]
    fn api_key_resolution() {
        assert_eq!(
            resolve_api_key(Some("explicit".to_string()), Some("env".to_string())).unwrap(),
            "explicit"
        );
        assert_eq!(resolve_api_key(None, Some("env".to_string())).unwrap(), "env");
        assert!(resolve_api_key(None, None).unwrap_err().is_configuration());
        assert!(resolve_api_key(None, Some(String::new())).unwrap_err().is_configuration());
    }

    #[test]
    fn retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_secs(2));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt() {
        let transport = Scripted::new(vec![ok("  Hello!\n")]);
        let gemini = client(transport.clone());
        let request = GenerateContentRequest::new("Hi");
        let reply = gemini.generate(Model::Gemini15Flash, &request).await.unwrap();
        assert_eq!(reply, Reply::Text("Hello!".to_string()));
        assert_eq!(transport.call_count(), 1);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1, request);
        assert!(calls[0].0.path().ends_with("gemini-1.5-flash:generateContent"));
    }

    #[tokio::test(start_paused = true)]
    async fn server_error_then_success() {
        let transport = Scripted::new(vec![status(500), ok("recovered")]);
        let gemini = client(transport.clone());
        let start = tokio::time::Instant::now();
        let reply = gemini
            .generate(Model::Gemini15Flash, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap();
        assert_eq!(reply.as_str(), "recovered");
        assert_eq!(transport.call_count(), 2);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn client_error_is_not_retried() {
        let transport = Scripted::new(vec![status(400)]);
        let gemini = client(transport.clone());
        let err = gemini
            .generate(Model::Gemini15Flash, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_is_not_retried() {
        let transport = Scripted::new(vec![status(429)]);
        let gemini = client(transport.clone());
        assert!(gemini
            .generate(Model::Gemini15Flash, &GenerateContentRequest::new("Hi"))
            .await
            .is_err());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_server_error_exhausts_attempts() {
        let transport = Scripted::new(vec![status(503), status(503), status(503)]);
        let gemini = client(transport.clone());
        let err = gemini
            .generate(Model::Gemini15Pro, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_are_retried() {
        let transport = Scripted::new(vec![
            Err(Error::connection("connection refused", None)),
            Err(Error::timeout("operation timed out", Some(30.0))),
            ok("finally"),
        ]);
        let gemini = client(transport.clone());
        let reply = gemini
            .generate(Model::Gemini15Flash, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap();
        assert_eq!(reply.as_str(), "finally");
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_exhausts_attempts() {
        let transport = Scripted::new(vec![
            Err(Error::connection("connection refused", None)),
            Err(Error::connection("connection refused", None)),
        ]);
        let gemini = client(transport.clone())
            .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)));
        let err = gemini
            .generate(Model::Gemini15Flash, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap_err();
        assert!(err.is_connection());
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_policy_never_retries() {
        let transport = Scripted::new(vec![status(502)]);
        let gemini = client(transport.clone()).with_retry_policy(RetryPolicy::new(1, Duration::ZERO));
        assert!(gemini
            .generate(Model::Gemini15Flash, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap_err()
            .is_server_error());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_body_is_not_retried() {
        let transport = Scripted::new(vec![Ok(HttpResponse::new(200, r#"{"candidates": []}"#))]);
        let gemini = client(transport.clone());
        let reply = gemini
            .generate(Model::Gemini15Flash, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap();
        assert!(reply.is_malformed());
        assert_eq!(transport.call_count(), 1);
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        use tokio::io::AsyncReadExt;

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    /// Serves one HTTP response and hands back the raw request it answered.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}/v1beta/", listener.local_addr().unwrap())).unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (url, handle)
    }

    #[tokio::test]
    async fn reqwest_transport_returns_error_statuses() {
        let body = r#"{"error": {"code": 503, "message": "overloaded"}}"#;
        let (url, server) = serve_once("503 Service Unavailable", body).await;
        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();

        let response = transport
            .post_json(&url, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap();
        assert_eq!(response, HttpResponse::new(503, body));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/ HTTP/1.1"));
        assert!(request.contains(r#"{"contents":[{"parts":[{"text":"Hi"}]}]}"#));
    }

    #[tokio::test]
    async fn reqwest_transport_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let transport = ReqwestTransport::new(Duration::from_millis(100)).unwrap();

        let err = transport
            .post_json(&url, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
        assert!(err.is_retryable());
        server.abort();
    }

    #[tokio::test]
    async fn reqwest_transport_reports_refused_connection() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        drop(listener);
        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();

        let err = transport
            .post_json(&url, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap_err();
        assert!(err.is_connection(), "{err:?}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn generate_over_http() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": " Hello from the server \n"}]}}]}"#;
        let (url, server) = serve_once("200 OK", body).await;
        let gemini = Gemini::with_options(
            Some("test-key".to_string()),
            Some(url.to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        let reply = gemini
            .generate(Model::Gemini15Pro, &GenerateContentRequest::new("Hi"))
            .await
            .unwrap();
        assert_eq!(reply.as_str(), "Hello from the server");

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "POST /v1beta/models/gemini-1.5-pro:generateContent?key=test-key HTTP/1.1"
        ));
    }
}
