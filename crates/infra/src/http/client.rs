//! HTTP transport for the remote clients
//!
//! Transient failures are retried only where repeating the request cannot
//! duplicate a record: idempotent methods (GET, HEAD, PUT, DELETE) are
//! retried after 5xx responses, timeouts and rate limiting, while a POST is
//! sent once unless the connection was never established. Rate limits honor
//! `Retry-After` and GitHub's `x-ratelimit-reset`, including the secondary
//! limit GitHub reports as 403. Every other response is handed back to the
//! caller, which owns status-to-error mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use timesheet_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use timesheet_domain::TimesheetError;
use tracing::{debug, warn};

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("timesheet-sync/", env!("CARGO_PKG_VERSION"));
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// How often and how long to wait before giving up on a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, initial try included.
    pub max_attempts: usize,
    /// Delay before the first retry; doubles per retry.
    pub base_backoff: Duration,
    /// Longest server-requested wait that is still honored. A rate limit
    /// asking for more is returned to the caller instead.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_wait: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, retry: usize) -> Duration {
        let shift = retry.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1 << shift)
    }
}

/// Shared reqwest client plus the retry policy of the remote clients.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with the default timeout and retry policy.
    pub fn new() -> Result<Self, TimesheetError> {
        Self::builder().build()
    }

    /// Start a request; send it with [`HttpClient::send`].
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send `builder`, retrying transient failures the method allows.
    ///
    /// # Errors
    /// `TimesheetError::Network` when no response arrived; an unbufferable
    /// body is `TimesheetError::Internal`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, TimesheetError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| TimesheetError::Internal("request body is not replayable".into()))?
                .build()
                .map_err(|err| TimesheetError::from(InfraError::from(err)))?;
            let method = request.method().clone();
            let url = request.url().clone();
            let last = attempt >= attempts;
            debug!(attempt, %method, %url, "sending request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "response received");
                    if last {
                        return Ok(response);
                    }
                    match self.response_delay(&method, status, response.headers(), attempt) {
                        Some(delay) => {
                            warn!(attempt, %method, %url, %status, ?delay, "retrying request");
                            pause(delay).await;
                        }
                        None => return Ok(response),
                    }
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "request failed");
                    if last || !may_resend(&method, &err) {
                        return Err(InfraError::from(err).into());
                    }
                    warn!(attempt, %method, %url, error = %err, "retrying after transport error");
                    pause(self.policy.backoff(attempt)).await;
                }
            }
        }
    }

    /// Wait before resending, or `None` when the response is final.
    fn response_delay(
        &self,
        method: &Method,
        status: StatusCode,
        headers: &HeaderMap,
        attempt: usize,
    ) -> Option<Duration> {
        if !is_idempotent(method) {
            return None;
        }
        if status.is_server_error() {
            return Some(self.policy.backoff(attempt));
        }
        if !is_rate_limited(status, headers) {
            return None;
        }
        match requested_wait(headers, chrono::Utc::now().timestamp()) {
            Some(wait) if wait > self.policy.max_wait => {
                warn!(?wait, "rate limit wait exceeds policy; not retrying");
                None
            }
            Some(wait) => Some(wait),
            None => Some(self.policy.backoff(attempt)),
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    default_headers: HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            policy: RetryPolicy::default(),
            default_headers: HeaderMap::new(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts, initial try included.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_backoff = backoff;
        self
    }

    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.policy.max_wait = wait;
        self
    }

    /// Headers sent with every request (auth, API version).
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn build(self) -> Result<HttpClient, TimesheetError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(self.default_headers)
            .no_proxy()
            .build()
            .map_err(|err| TimesheetError::from(InfraError::from(err)))?;
        Ok(HttpClient { client, policy: self.policy })
    }
}

/// Methods whose repetition leaves the server in the same state.
fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::PUT | Method::DELETE)
}

/// A connect failure means nothing reached the server, so any method may be
/// resent. Timeouts may have been processed and only repeat when idempotent.
fn may_resend(method: &Method, err: &reqwest::Error) -> bool {
    err.is_connect() || (is_idempotent(method) && (err.is_timeout() || err.is_request()))
}

/// 429, or a GitHub 403 carrying rate-limit headers.
pub(crate) fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && (headers.contains_key(RETRY_AFTER)
            || header_str(headers, RATE_LIMIT_REMAINING) == Some("0"))
}

/// Server-requested wait: `Retry-After` seconds, else the distance to
/// `x-ratelimit-reset` (unix seconds) from `now`.
fn requested_wait(headers: &HeaderMap, now: i64) -> Option<Duration> {
    if let Some(secs) = header_str(headers, RETRY_AFTER.as_str()).and_then(|v| v.parse().ok()) {
        return Some(Duration::from_secs(secs));
    }
    let reset: i64 = header_str(headers, RATE_LIMIT_RESET)?.parse().ok()?;
    Some(Duration::from_secs(u64::try_from(reset.saturating_sub(now)).unwrap_or(0)))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
