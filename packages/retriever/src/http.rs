//! HTTP client wrapper for downloading bulk archives.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{RetrieverError, Result};

/// User agent string identifying this retriever.
const USER_AGENT: &str = concat!("uspto-retriever/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Create a configured HTTP client.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_body()
}

/// Stream the body at `url` into the file at `dest`, with retry logic.
///
/// The body is never held in memory as a whole. Uses exponential backoff
/// for transient failures (network errors, 5xx responses); each attempt
/// starts the file over.
///
/// # Returns
/// Number of bytes written.
pub fn download_to_file(client: &Client, url: &str, dest: &Path) -> Result<u64> {
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms, 2000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        let response = match client.get(url).send() {
            Ok(response) => response,
            Err(e) if is_transient(&e) => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "Connection error, will retry"
                );
                last_error = Some(e.to_string());
                continue;
            }
            // Other errors (like invalid URL) - don't retry
            Err(e) => return Err(RetrieverError::Http(e)),
        };

        let status = response.status();
        if status.is_server_error() {
            tracing::warn!(
                status = %status,
                attempt = attempt + 1,
                max_retries = MAX_RETRIES,
                "Server error, will retry"
            );
            last_error = Some(format!("Server error: {status}"));
            continue;
        }

        // Don't retry client errors (4xx) - they won't succeed
        let mut response = response.error_for_status()?;

        let mut writer = BufWriter::new(File::create(dest)?);
        match response.copy_to(&mut writer) {
            Ok(bytes) => {
                writer.flush()?;
                tracing::info!(url, bytes, dest = %dest.display(), "Downloaded archive");
                return Ok(bytes);
            }
            Err(e) if is_transient(&e) => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "Transfer interrupted, will retry"
                );
                last_error = Some(e.to_string());
            }
            Err(e) => return Err(RetrieverError::Http(e)),
        }
    }

    // All retries exhausted
    Err(RetrieverError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("uspto-retriever/"));
    }
}
