use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, info, instrument, warn};

use crate::kidy::coverage::error::{CoverageError, Result};
use crate::kidy::coverage::layout::DEFAULT_TIMEOUT;

/// Source of raw workbook bytes.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Arc<[u8]>>;
}

/// Bounded retry with exponential backoff. One attempt means no retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before the attempt following `attempt` (one-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Client settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
        }
    }
}

/// Fetches the workbook over HTTP(S) with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Builds the underlying client with the configured timeout.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| CoverageError::Transport {
                url: String::new(),
                status: None,
                reason: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(err) => {
                let transient = err.is_timeout() || err.is_connect();
                return Attempt::Failed {
                    error: transport_error(url, &err),
                    transient,
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Attempt::Failed {
                error: CoverageError::Transport {
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    reason: status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string(),
                },
                transient: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            };
        }

        match response.bytes() {
            Ok(body) => Attempt::Done(Arc::from(&body[..])),
            Err(err) => Attempt::Failed {
                transient: err.is_timeout(),
                error: transport_error(url, &err),
            },
        }
    }
}

enum Attempt {
    Done(Arc<[u8]>),
    Failed {
        error: CoverageError,
        transient: bool,
    },
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "info", skip(self), fields(max_attempts = self.retry.max_attempts))]
    fn fetch(&self, url: &str) -> Result<Arc<[u8]>> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(url) {
                Attempt::Done(bytes) => {
                    info!(bytes = bytes.len(), attempt, "workbook downloaded");
                    return Ok(bytes);
                }
                Attempt::Failed { error, transient } => {
                    if !transient || attempt >= max_attempts {
                        return Err(error);
                    }
                    let delay = self.retry.delay_after(attempt);
                    warn!(attempt, ?delay, %error, "transient fetch failure, retrying");
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

fn transport_error(url: &str, err: &reqwest::Error) -> CoverageError {
    CoverageError::Transport {
        url: url.to_string(),
        status: err.status().map(|status| status.as_u16()),
        reason: err.to_string(),
    }
}

/// Reads the workbook from the local filesystem; the `url` is a path.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    #[instrument(level = "info", skip(self))]
    fn fetch(&self, url: &str) -> Result<Arc<[u8]>> {
        let path = PathBuf::from(url);
        if !path.exists() {
            return Err(CoverageError::MissingInput(path));
        }
        let bytes = std::fs::read(&path)?;
        info!(bytes = bytes.len(), "workbook read from disk");
        Ok(Arc::from(bytes))
    }
}

/// Opt-in cache of immutable per-URL snapshots.
///
/// The first successful fetch of a URL is kept and handed out on every later
/// call; entries are never modified after insertion. Failures are not cached.
#[derive(Debug)]
pub struct SnapshotCache<F> {
    inner: F,
    snapshots: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl<F: Fetcher> SnapshotCache<F> {
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped fetcher.
    pub fn get_ref(&self) -> &F {
        &self.inner
    }

    /// Drops every snapshot so the next fetch goes back to the source.
    pub fn clear(&self) {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<F: Fetcher> Fetcher for SnapshotCache<F> {
    fn fetch(&self, url: &str) -> Result<Arc<[u8]>> {
        if let Some(bytes) = self
            .snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
        {
            debug!(url, "serving cached snapshot");
            return Ok(Arc::clone(bytes));
        }

        let bytes = self.inner.fetch(url)?;
        let mut snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            snapshots.entry(url.to_string()).or_insert(bytes),
        ))
    }
}
