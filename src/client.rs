use std::fmt;
use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;

use crate::{ClientOptions, MockApiError, QueryParams, Result};

/// Base URL used by [`MockApiClient::from_env`] when `API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Joins a base URL and a request path with exactly one `/` between them.
///
/// Example: `("http://api/", "mock/ecom/order")` → `"http://api/mock/ecom/order"`
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    format!("{base}/{path}")
}

#[derive(Clone)]
/// JSON client for the demo agents mock API.
///
/// Owns one connection pool; clones share it. Every call runs through the
/// same bounded retry loop configured by [`ClientOptions`].
pub struct MockApiClient {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
}

impl fmt::Debug for MockApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockApiClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish()
    }
}

impl MockApiClient {
    /// Creates a client for `base_url` with default options.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            options: ClientOptions::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `API_BASE` (the mock API base URL). Falls back to
    /// [`DEFAULT_API_BASE`] when the variable is missing, and returns an error
    /// when it is set but empty.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use agent_demo_http::MockApiClient;
    ///
    /// let api = MockApiClient::from_env().expect("API_BASE must not be empty");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        match std::env::var("API_BASE") {
            Ok(url) if url.trim().is_empty() => Err("API_BASE is set but empty".to_owned()),
            Ok(url) => Ok(Self::new(url)),
            Err(_) => Ok(Self::new(DEFAULT_API_BASE)),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Issues a GET to `base_url + path` and decodes the JSON body.
    pub async fn get<Q: Into<QueryParams>>(&self, path: &str, query: Q) -> Result<Value> {
        let url = join_url(&self.base_url, path);
        let query = query.into();
        self.send_with_retry(Method::GET, &url, || {
            let request = self.http.get(&url);
            if query.is_empty() {
                request
            } else {
                request.query(&query)
            }
        })
        .await
    }

    /// Issues a POST with `body` encoded as JSON and decodes the JSON reply.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = join_url(&self.base_url, path);
        let body = serde_json::to_vec(body)
            .map_err(|err| MockApiError::Decode(format!("cannot encode request body: {err}")))?;
        self.send_with_retry(Method::POST, &url, || {
            self.http
                .post(&url)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.clone())
        })
        .await
    }

    async fn send_with_retry<F>(&self, method: Method, url: &str, build: F) -> Result<Value>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_attempts = self.options.max_attempts.max(1);
        let mut attempt = 0usize;
        loop {
            let attempts = attempt + 1;
            let can_retry = attempts < max_attempts;

            let outcome = match build()
                .header(header::ACCEPT, "application/json")
                .timeout(Duration::from_millis(self.options.timeout_ms))
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    response.text().await.map(|body| (status, body))
                }
                Err(err) => Err(err),
            };

            match outcome {
                Ok((status, body)) if status.is_success() => {
                    return serde_json::from_str::<Value>(&body).map_err(|err| {
                        MockApiError::Decode(format!("invalid JSON response: {err}; body: {body}"))
                    });
                }
                Ok((status, body)) if self.should_retry_status(status) => {
                    log_transient_failure(&method, url, attempts, &status);

                    if can_retry {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(MockApiError::Server {
                        status: status.as_u16(),
                        body,
                        attempts,
                    });
                }
                Ok((status, body)) => {
                    return Err(MockApiError::Http {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => {
                    let retryable = self.should_retry_transport(&err);
                    if retryable {
                        log_transient_failure(&method, url, attempts, &err);
                    }

                    if retryable && can_retry {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(MockApiError::Transport {
                        attempts,
                        retryable,
                        source: err,
                    });
                }
            }
        }
    }

    fn should_retry_status(&self, status: StatusCode) -> bool {
        status.is_server_error()
    }

    fn should_retry_transport(&self, err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
    }

    /// Sleeps for the exponential backoff that follows attempt `attempt` (0-based).
    async fn wait_before_retry(&self, attempt: usize) {
        let delay_ms = self.options.backoff_for(attempt);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying upstream request after {} ms", delay_ms);

        sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn log_transient_failure(method: &Method, url: &str, attempt: usize, cause: &dyn fmt::Display) {
    #[cfg(feature = "tracing")]
    tracing::warn!(%method, %url, attempt, %cause, "transient upstream failure");

    #[cfg(not(feature = "tracing"))]
    let _ = (method, url, attempt, cause);
}
