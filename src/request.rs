use crate::errors::ApiError;
use crate::logfile::DatedLogSink;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Side-channel logger invoked on request failures.
///
/// The executor calls it exactly once per failed request (validation,
/// status or decode failures) and never on success. Transport failures
/// propagate without a forced invocation.
pub type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Timeouts applied to every request issued by a [`RequestExecutor`].
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Time allowed for establishing the connection.
    pub connect_timeout: Duration,
    /// Time allowed for the whole request, response body included.
    pub total_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            total_timeout: Duration::from_secs(10),
        }
    }
}

/// Generic outbound HTTP executor.
///
/// Performs one request per call and returns the parsed JSON body, or a
/// typed [`ApiError`] describing which phase failed. The pipeline is
/// validate, dispatch, status check, decode; each phase is terminal on
/// failure and nothing is retried. Holds no state between calls beyond
/// the connection pool inside `reqwest::Client`.
#[derive(Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
    logger: LogFn,
}

impl RequestExecutor {
    /// Creates an executor with the default dated-file error logger.
    pub fn new(config: ExecutorConfig) -> Result<Self, ApiError> {
        Self::with_logger(config, default_logger())
    }

    /// Creates an executor with a caller-supplied logger.
    ///
    /// # Arguments
    ///
    /// * `config` - Connect and total timeouts for every request.
    /// * `logger` - Callable receiving one diagnostic line per failure.
    pub fn with_logger(config: ExecutorConfig, logger: LogFn) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, logger })
    }

    /// Executes one HTTP request and parses the response body as JSON.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL; must carry a scheme and a host.
    /// * `headers` - Ordered `"Name: Value"` lines.
    /// * `method` - HTTP method token, case-insensitive.
    /// * `body` - Raw payload; ignored for GET and HEAD.
    ///
    /// # Returns
    ///
    /// * `Result<Value, ApiError>` - The decoded JSON value as-is
    ///   (mapping, sequence or scalar), with no schema validation.
    pub async fn execute(
        &self,
        url: &str,
        headers: &[String],
        method: &str,
        body: Option<&[u8]>,
    ) -> Result<Value, ApiError> {
        let method = match normalize_method(method) {
            Ok(m) => m,
            Err(e) => {
                (self.logger)(&format!("Invalid method: {}", method));
                return Err(e);
            }
        };

        let url = match validate_url(url) {
            Ok(u) => u,
            Err(e) => {
                (self.logger)(&format!("Invalid URL: {}", url));
                return Err(e);
            }
        };

        let header_map = match build_headers(headers) {
            Ok(map) => map,
            Err(e) => {
                (self.logger)(&e.to_string());
                return Err(e);
            }
        };

        let mut request = self.client.request(method.clone(), url).headers(header_map);
        if method != Method::GET && method != Method::HEAD {
            if let Some(payload) = body {
                request = request.body(payload.to_vec());
            }
        }

        // Transport failures propagate without a logger invocation.
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let code = response.status().as_u16();
        let raw_body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !(200..300).contains(&code) {
            (self.logger)(&format!("HTTP error: {} - Response: {}", code, raw_body));
            return Err(ApiError::HttpStatus {
                code,
                body: raw_body,
            });
        }

        match serde_json::from_str(&raw_body) {
            Ok(value) => Ok(value),
            Err(e) => {
                (self.logger)(&format!("JSON decoding error: {} - Body: {}", e, raw_body));
                Err(ApiError::Decode(e.to_string()))
            }
        }
    }
}

/// Uppercases and parses an HTTP method token.
fn normalize_method(method: &str) -> Result<Method, ApiError> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| ApiError::InvalidInput(format!("Invalid method: {}", method)))
}

/// Checks that `url` is an absolute URL with scheme and host.
pub fn validate_url(url: &str) -> Result<Url, ApiError> {
    let parsed =
        Url::parse(url).map_err(|_| ApiError::InvalidInput(format!("Invalid URL: {}", url)))?;
    if !parsed.has_host() {
        return Err(ApiError::InvalidInput(format!("Invalid URL: {}", url)));
    }
    Ok(parsed)
}

/// Parses `"Name: Value"` lines into a header map, preserving order.
fn build_headers(headers: &[String]) -> Result<HeaderMap, ApiError> {
    let mut map = HeaderMap::new();
    for line in headers {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ApiError::InvalidInput(format!("Invalid header: {}", line)))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| ApiError::InvalidInput(format!("Invalid header: {}", line)))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ApiError::InvalidInput(format!("Invalid header: {}", line)))?;
        map.append(name, value);
    }
    Ok(map)
}

/// Default failure logger: dated `error.log` partition, `tracing` fallback.
fn default_logger() -> LogFn {
    let sink = DatedLogSink::default();
    Arc::new(move |message: &str| {
        if sink.append("error.log", message).is_err() {
            tracing::error!("{}", message);
        }
    })
}
