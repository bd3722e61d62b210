use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;

// Some CDNs refuse the default client string.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Retries after the first attempt. 404-class failures never retry.
const DEFAULT_RETRIES: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("permanent HTTP failure ({0})")]
    Permanent(StatusCode),
    #[error("retry budget exhausted: {0}")]
    Exhausted(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A 400-class status that will not improve on retry.
pub fn is_permanent_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 400 | 401 | 403 | 404)
}

// Linear backoff: 1s, then 2s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 + u64::from(attempt))
}

enum Attempt {
    Permanent(StatusCode),
    Retryable(String),
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retries: u32,
}

impl Fetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            retries: DEFAULT_RETRIES,
        })
    }

    // The destination file is written only on success; failed attempts
    // leave no partial output behind.
    pub fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut attempt = 0;
        loop {
            match self.try_fetch(url) {
                Ok(body) => {
                    std::fs::write(dest, body)?;
                    return Ok(());
                }
                Err(Attempt::Permanent(status)) => return Err(FetchError::Permanent(status)),
                Err(Attempt::Retryable(reason)) => {
                    if attempt >= self.retries {
                        return Err(FetchError::Exhausted(reason));
                    }
                    log::debug!("retrying {url} after failure: {reason}");
                    thread::sleep(backoff_delay(attempt));
                    attempt += 1;
                }
            }
        }
    }

    fn try_fetch(&self, url: &str) -> Result<Vec<u8>, Attempt> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "*/*")
            .send()
            .map_err(|e| Attempt::Retryable(e.to_string()))?;

        let status = response.status();
        if is_permanent_status(status) {
            return Err(Attempt::Permanent(status));
        }
        if !status.is_success() {
            return Err(Attempt::Retryable(format!("HTTP {status}")));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| Attempt::Retryable(e.to_string()))
    }
}
