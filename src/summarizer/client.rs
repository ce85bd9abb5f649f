/// HTTP summarizer client.
///
/// Speaks to an Ollama-style generation endpoint (`/api/generate`) on a
/// local model server, with timeout configuration and retry logic for
/// transient failures.
use std::thread;
use std::time::Duration;

use log::debug;
use thiserror::Error;

use super::Summarizer;

/// Errors that can occur when calling the summarization service.
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Service-specific errors (malformed or error responses)
    #[error("Summarizer API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Builder for constructing `HttpSummarizer` instances.
///
/// # Examples
///
/// ```
/// use medq::HttpSummarizerBuilder;
///
/// let summarizer = HttpSummarizerBuilder::new()
///     .base_url("http://localhost:11434")
///     .model("t5-small")
///     .build()
///     .expect("Failed to create summarizer");
/// ```
#[derive(Debug, Default)]
pub struct HttpSummarizerBuilder {
    base_url: Option<String>,
    model: Option<String>,
}

impl HttpSummarizerBuilder {
    /// Creates a new `HttpSummarizerBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the summarization service.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model name used for summarization requests.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `HttpSummarizer` with the configured settings.
    ///
    /// If `base_url()` was not called, the `MEDQ_SUMMARIZER_URL`
    /// environment variable is consulted, then the default
    /// `http://localhost:11434`. Likewise `model()` falls back to
    /// `MEDQ_SUMMARIZER_MODEL`, then an empty string.
    pub fn build(self) -> Result<HttpSummarizer, SummarizerError> {
        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            std::env::var("MEDQ_SUMMARIZER_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string())
        };

        let model = if let Some(m) = self.model {
            m
        } else {
            std::env::var("MEDQ_SUMMARIZER_MODEL").unwrap_or_else(|_| String::new())
        };

        reqwest::Url::parse(&base_url)
            .map_err(|e| SummarizerError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(SummarizerError::Network)?;

        Ok(HttpSummarizer {
            client,
            base_url,
            model,
        })
    }
}

/// Synchronous HTTP client for the summarization service.
///
/// Construct via `HttpSummarizerBuilder`.
pub struct HttpSummarizer {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl HttpSummarizer {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn summarize_internal(&self, text: &str) -> Result<String, SummarizerError> {
        let url = format!("{}/api/generate", self.base_url);
        let request_body = serde_json::json!({
            "model": self.model,
            "prompt": format!("summarize: {text}"),
            "stream": false
        });

        debug!("summarize request to {url} (model: {})", self.model);

        retry_with_backoff(|| {
            let response = self
                .client
                .post(&url)
                .json(&request_body)
                .send()
                .map_err(|e| {
                    if e.is_timeout() {
                        SummarizerError::Timeout(e)
                    } else {
                        SummarizerError::Network(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(SummarizerError::Http {
                    status: status.as_u16(),
                });
            }

            let json: serde_json::Value = response.json().map_err(SummarizerError::Network)?;

            json.get("response")
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .ok_or_else(|| SummarizerError::Api {
                    message: "Missing 'response' field in API response".to_string(),
                })
        })
    }
}

impl Summarizer for HttpSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        self.summarize_internal(text)
    }
}

/// Retries an operation with exponential backoff.
///
/// Up to 3 retries with delays of 1s, 2s, and 4s, and only for transient
/// errors (HTTP 5xx, network failures, timeouts) — client errors fail
/// immediately.
pub fn retry_with_backoff<F, T>(mut f: F) -> Result<T, SummarizerError>
where
    F: FnMut() -> Result<T, SummarizerError>,
{
    const MAX_RETRIES: usize = 3;
    const DELAYS: [u64; MAX_RETRIES] = [1, 2, 4]; // seconds

    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) => {
            if !should_retry(&e) {
                return Err(e);
            }
            e
        }
    };

    for &delay_secs in &DELAYS {
        thread::sleep(Duration::from_secs(delay_secs));

        match f() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Transient errors (HTTP 5xx, network errors, timeouts) are retried;
/// everything else fails fast.
fn should_retry(error: &SummarizerError) -> bool {
    match error {
        SummarizerError::Network(_) => true,
        SummarizerError::Timeout(_) => true,
        SummarizerError::Http { status } => *status >= 500 && *status < 600,
        SummarizerError::Serialization(_) => false,
        SummarizerError::Api { .. } => false,
        SummarizerError::InvalidUrl(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::error::Error;

    #[test]
    fn http_error_display_includes_status() {
        let error = SummarizerError::Http { status: 503 };
        let msg = format!("{}", error);
        assert!(msg.contains("HTTP error"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn api_error_display_includes_message() {
        let error = SummarizerError::Api {
            message: "Missing 'response' field in API response".to_string(),
        };
        assert!(format!("{}", error).contains("Missing 'response' field"));
    }

    #[test]
    fn serialization_error_chains_source() {
        let json_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let error = SummarizerError::Serialization(json_error);
        assert!(format!("{}", error).contains("Serialization error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn should_retry_on_server_errors_only() {
        assert!(should_retry(&SummarizerError::Http { status: 500 }));
        assert!(should_retry(&SummarizerError::Http { status: 503 }));
        assert!(!should_retry(&SummarizerError::Http { status: 404 }));
        assert!(!should_retry(&SummarizerError::Http { status: 400 }));
    }

    #[test]
    fn should_not_retry_api_or_url_errors() {
        assert!(!should_retry(&SummarizerError::Api {
            message: "bad".to_string()
        }));
        assert!(!should_retry(&SummarizerError::InvalidUrl(
            "nope".to_string()
        )));
    }

    #[test]
    fn retry_returns_first_success() {
        let mut calls = 0;
        let result: Result<i32, SummarizerError> = retry_with_backoff(|| {
            calls += 1;
            Ok(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn retry_fails_fast_on_client_error() {
        let mut calls = 0;
        let result: Result<i32, SummarizerError> = retry_with_backoff(|| {
            calls += 1;
            Err(SummarizerError::Http { status: 404 })
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn builder_rejects_invalid_url() {
        let result = HttpSummarizerBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(SummarizerError::InvalidUrl(_))));
    }

    #[test]
    fn builder_uses_explicit_configuration() {
        let summarizer = HttpSummarizerBuilder::new()
            .base_url("http://localhost:9999")
            .model("t5-small")
            .build()
            .expect("builder failed");
        assert_eq!(summarizer.base_url(), "http://localhost:9999");
        assert_eq!(summarizer.model(), "t5-small");
    }

    #[test]
    #[serial]
    fn builder_falls_back_to_environment() {
        unsafe {
            std::env::set_var("MEDQ_SUMMARIZER_URL", "http://example.com:1234");
            std::env::set_var("MEDQ_SUMMARIZER_MODEL", "t5-base");
        }
        let summarizer = HttpSummarizerBuilder::new().build().expect("builder failed");
        assert_eq!(summarizer.base_url(), "http://example.com:1234");
        assert_eq!(summarizer.model(), "t5-base");
        unsafe {
            std::env::remove_var("MEDQ_SUMMARIZER_URL");
            std::env::remove_var("MEDQ_SUMMARIZER_MODEL");
        }
    }

    #[test]
    #[serial]
    fn builder_defaults_without_environment() {
        unsafe {
            std::env::remove_var("MEDQ_SUMMARIZER_URL");
            std::env::remove_var("MEDQ_SUMMARIZER_MODEL");
        }
        let summarizer = HttpSummarizerBuilder::new().build().expect("builder failed");
        assert_eq!(summarizer.base_url(), "http://localhost:11434");
        assert_eq!(summarizer.model(), "");
    }
}
