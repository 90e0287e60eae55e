// Use 3rd party
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

// Use built-in library
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Use internal modules
use crate::auth::SpotifyCredentials;
use crate::config::ClientConfig;
use crate::diagnostics::{DiagnosticSink, Event, LogSink};
use crate::model::Page;

// Possible errors returned from `playlyzer` client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request unauthorized")]
    Unauthorized,
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },
    #[error("spotify error {status}: {body}")]
    Upstream {
        status: StatusCode,
        error: Option<ApiError>,
        body: String,
    },
    #[error("gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },
    #[error("json parse error: {0}")]
    ParseJSON(#[from] serde_json::Error),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("operation cancelled")]
    Cancelled,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    async fn from_response(response: Response) -> Self {
        match response.status() {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited {
                retry_after: retry_after(response.headers()),
            },
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = serde_json::from_str::<ApiErrorBody>(&body)
                    .ok()
                    .map(|parsed| parsed.error);
                Self::Upstream {
                    status,
                    error,
                    body,
                }
            }
        }
    }

    /// Whether the failure may be retried under the bounded attempt budget.
    /// Rate limits have their own budget and are not included.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { .. } => true,
            Self::Request(err) => !err.is_builder() && !err.is_decode(),
            _ => false,
        }
    }

    /// HTTP status of the underlying service response, looking through retry wrappers.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Upstream { status, .. } => Some(*status),
            Self::RetriesExhausted { source, .. } => source.status(),
            Self::Request(err) => err.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error, Deserialize)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

pub type ClientResult<T> = Result<T, ClientError>;

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Result of a multi-page or multi-chunk operation that may have lost part of its data.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial<T> {
    pub items: Vec<T>,
    /// Items known to exist upstream that could not be fetched or written.
    pub missing: usize,
}

impl<T> Partial<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, missing: 0 }
    }

    pub fn is_complete(&self) -> bool {
        self.missing == 0
    }

    pub fn map<U, F: FnMut(T) -> Option<U>>(self, f: F) -> Partial<U> {
        Partial {
            items: self.items.into_iter().filter_map(f).collect(),
            missing: self.missing,
        }
    }
}

// Spotify Web API
pub struct Spotify {
    client: Client,
    credentials: SpotifyCredentials,
    config: ClientConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
    features_denied: AtomicBool,
}

impl Spotify {
    pub fn new(credentials: SpotifyCredentials) -> ClientResult<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: SpotifyCredentials, config: ClientConfig) -> ClientResult<Self> {
        credentials.validate()?;
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            credentials,
            config,
            diagnostics: Arc::new(LogSink),
            features_denied: AtomicBool::new(false),
        })
    }

    /// Replaces the default `log`-backed sink.
    #[must_use]
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn emit(&self, event: Event) {
        self.diagnostics.record(&event);
    }

    pub(crate) fn features_denied(&self) -> bool {
        self.features_denied.load(Ordering::Relaxed)
    }

    pub(crate) fn deny_features(&self) {
        if !self.features_denied.swap(true, Ordering::Relaxed) {
            self.emit(Event::FeaturesUnavailable);
        }
    }

    fn endpoint_url<'a>(&self, path: &'a str) -> Cow<'a, str> {
        if path.starts_with("http") {
            path.into()
        } else {
            [self.config.base_url.as_str(), path].concat().into()
        }
    }

    async fn send_once<B>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        payload: Option<&B>,
    ) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let response = {
            let builder = self
                .client
                .request(method, url)
                .bearer_auth(self.credentials.access_token())
                .query(query);

            // Only add payload when sent
            let builder = if let Some(payload) = payload {
                builder.json(payload)
            } else {
                builder
            };

            builder.send().await.map_err(ClientError::from)?
        };

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ClientError::from_response(response).await)
        }
    }

    /// Sends a request, absorbing rate limits and retrying transient failures
    /// according to the configured [`RetryPolicy`](crate::config::RetryPolicy).
    ///
    /// Statuses listed in `terminal` are returned on first sight.
    async fn api_call<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&B>,
        terminal: &[StatusCode],
    ) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(path);
        let policy = &self.config.retry;
        let mut attempt: u32 = 1;
        let mut rate_limited: u32 = 0;

        loop {
            self.emit(Event::Request {
                method: method.clone(),
                path: path.to_owned(),
                attempt,
            });

            let err = match self.send_once(method.clone(), &url, query, payload).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            match err {
                ClientError::RateLimited { retry_after } => {
                    rate_limited += 1;
                    let wait = policy.rate_limit_wait(retry_after, rate_limited);
                    if rate_limited > policy.max_rate_limit_retries
                        || wait > policy.max_rate_limit_wait
                    {
                        return Err(ClientError::RateLimited { retry_after });
                    }
                    self.emit(Event::RateLimited {
                        path: path.to_owned(),
                        wait,
                    });
                    sleep(wait).await;
                }
                err if self.should_retry(&err, terminal) && attempt < policy.max_attempts => {
                    let wait = policy.backoff(attempt);
                    self.emit(Event::Retrying {
                        path: path.to_owned(),
                        attempt,
                        wait,
                        reason: err.to_string(),
                    });
                    sleep(wait).await;
                    attempt += 1;
                }
                err if self.should_retry(&err, terminal) => {
                    return Err(ClientError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    })
                }
                err => return Err(err),
            }
        }
    }

    fn should_retry(&self, err: &ClientError, terminal: &[StatusCode]) -> bool {
        match err {
            ClientError::Upstream { status, .. } if terminal.contains(status) => false,
            ClientError::Upstream { status, .. } if status.is_client_error() => {
                self.config.retry.retry_client_errors
            }
            err => err.is_retryable(),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.get_or_stop_on(path, query, &[]).await
    }

    /// Like [`get`](Self::get), but `terminal` statuses are never retried.
    pub(crate) async fn get_or_stop_on<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        terminal: &[StatusCode],
    ) -> ClientResult<T> {
        let result = self
            .api_call::<()>(Method::GET, path, query, None, terminal)
            .await?
            .text()
            .await?;
        Self::convert_result::<T>(&result)
    }

    pub async fn post<B, T>(&self, path: &str, payload: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let result = self
            .api_call(Method::POST, path, &[], Some(payload), &[])
            .await?
            .text()
            .await?;
        Self::convert_result::<T>(&result)
    }

    pub(crate) async fn page<T: DeserializeOwned>(
        &self,
        path: &str,
        limit: u32,
        offset: u32,
    ) -> ClientResult<Page<T>> {
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        self.get::<Page<T>>(path, &query).await
    }

    /// Waits `delay` unless `cancel` fires first. Returns `false` on cancellation.
    pub(crate) async fn pause(&self, delay: Duration, cancel: &CancellationToken) -> bool {
        if delay.is_zero() {
            return !cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = sleep(delay) => true,
        }
    }

    /// Walks every page of `path`, in order, until a page comes back short.
    ///
    /// A failed page after the first is skipped and counted as missing; a
    /// failure of the first page, or an authorization failure, is returned as is.
    pub(crate) async fn collect_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<Partial<T>> {
        let limit = self.config.page_size;
        let mut items: Vec<T> = Vec::new();
        let mut missing: usize = 0;
        let mut offset: u32 = 0;
        let mut total: Option<u32> = None;

        loop {
            if offset > 0 && !self.pause(self.config.page_delay, cancel).await {
                return self.cancelled(path, items, missing, total, offset);
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.cancelled(path, items, missing, total, offset);
                }
                result = self.page::<T>(path, limit, offset) => result,
            };

            match result {
                Ok(page) => {
                    let received = page.items.len();
                    total = Some(page.total);
                    self.emit(Event::PageFetched {
                        path: path.to_owned(),
                        offset,
                        received,
                    });
                    items.extend(page.items);
                    if received < limit as usize {
                        break;
                    }
                    offset += limit;
                }
                Err(err @ ClientError::Unauthorized) => return Err(err),
                Err(err) => {
                    let known_total = match total {
                        Some(known_total) => known_total,
                        None => return Err(err),
                    };
                    self.emit(Event::PageFailed {
                        path: path.to_owned(),
                        offset,
                        reason: err.to_string(),
                    });
                    missing += known_total.saturating_sub(offset).min(limit) as usize;
                    offset += limit;
                    if offset >= known_total {
                        break;
                    }
                }
            }
        }

        Ok(Partial { items, missing })
    }

    fn cancelled<T>(
        &self,
        path: &str,
        items: Vec<T>,
        missing: usize,
        total: Option<u32>,
        offset: u32,
    ) -> ClientResult<Partial<T>> {
        self.emit(Event::Cancelled {
            path: path.to_owned(),
        });
        match total {
            None => Err(ClientError::Cancelled),
            Some(total) => Ok(Partial {
                items,
                missing: missing + total.saturating_sub(offset) as usize,
            }),
        }
    }

    pub(crate) fn convert_result<T: DeserializeOwned>(input: &str) -> ClientResult<T> {
        serde_json::from_str::<T>(input).map_err(Into::into)
    }
}
