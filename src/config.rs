//! Client configuration: where to talk to, how big pages and chunks are,
//! how long to wait between requests and how hard to retry.

use std::time::Duration;

use crate::client::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "https://api.spotify.com/v1";

/// Largest page the service returns for playlist, library and playlist-list calls.
pub const MAX_PAGE_SIZE: u32 = 50;
/// Largest number of ids accepted by `GET /audio-features`.
pub const MAX_FEATURE_IDS: usize = 100;
/// Largest number of URIs accepted by `POST /playlists/{id}/tracks`.
pub const MAX_TRACK_URIS: usize = 100;

/// Retry and rate-limit behaviour shared by every request the client makes.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts for a retryable failure, the first try included.
    pub max_attempts: u32,
    /// Linear backoff unit: the n-th retry waits `base_delay * n`.
    pub base_delay: Duration,
    /// Rate-limit responses tolerated per request. Counted apart from `max_attempts`.
    pub max_rate_limit_retries: u32,
    /// Server hints above this are not waited out.
    pub max_rate_limit_wait: Duration,
    /// Retry 4xx answers other than 401 and 429 like server errors.
    pub retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_rate_limit_retries: 5,
            max_rate_limit_wait: Duration::from_secs(120),
            retry_client_errors: true,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting. Rate limits still get the default budget.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    pub fn max_rate_limit_wait(mut self, wait: Duration) -> Self {
        self.max_rate_limit_wait = wait;
        self
    }

    pub fn retry_client_errors(mut self, retry: bool) -> Self {
        self.retry_client_errors = retry;
        self
    }

    /// Wait before retry number `attempt` (1-based) of a failed request.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Wait after the `hit`-th rate-limit response (1-based). The server hint wins when present.
    pub fn rate_limit_wait(&self, hint: Option<Duration>, hit: u32) -> Duration {
        hint.unwrap_or_else(|| self.base_delay * hit)
    }
}

/// Settings for a [`Spotify`](crate::client::Spotify) client.
///
/// ```
/// use std::time::Duration;
/// use playlyzer::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .page_size(20)
///     .chunk_delay(Duration::from_millis(250));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: u32,
    pub feature_chunk_size: usize,
    pub track_chunk_size: usize,
    /// Pause between two page requests of one paginated fetch.
    pub page_delay: Duration,
    /// Pause between two chunk requests of one batched call.
    pub chunk_delay: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            page_size: MAX_PAGE_SIZE,
            feature_chunk_size: MAX_FEATURE_IDS,
            track_chunk_size: MAX_TRACK_URIS,
            page_delay: Duration::from_millis(100),
            chunk_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn feature_chunk_size(mut self, size: usize) -> Self {
        self.feature_chunk_size = size;
        self
    }

    pub fn track_chunk_size(mut self, size: usize) -> Self {
        self.track_chunk_size = size;
        self
    }

    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks every limit the service imposes.
    pub fn validate(&self) -> ClientResult<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::InvalidConfig("base url is empty".to_owned()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ClientError::InvalidConfig(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.feature_chunk_size == 0 || self.feature_chunk_size > MAX_FEATURE_IDS {
            return Err(ClientError::InvalidConfig(format!(
                "feature chunk size must be between 1 and {}, got {}",
                MAX_FEATURE_IDS, self.feature_chunk_size
            )));
        }
        if self.track_chunk_size == 0 || self.track_chunk_size > MAX_TRACK_URIS {
            return Err(ClientError::InvalidConfig(format!(
                "track chunk size must be between 1 and {}, got {}",
                MAX_TRACK_URIS, self.track_chunk_size
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::InvalidConfig(
                "retry policy needs at least one attempt".to_owned(),
            ));
        }
        Ok(())
    }
}
