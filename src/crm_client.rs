use crate::errors::ApiError;
use crate::request::RequestExecutor;
use serde::Deserialize;
use serde_json::Value;

/// Response envelope returned by every CRM REST method.
///
/// The CRM answers `{ result, error, error_description, ... }`; extra
/// members (timing blocks, pagination) are kept in `raw` untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(flatten)]
    pub raw: Value,
}

impl CrmResponse {
    /// True when the CRM reported a logical error for this call.
    pub fn is_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// Human-readable error text, preferring the description.
    pub fn error_text(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Unknown CRM error".to_string())
    }
}

/// Client for the CRM's inbound webhook REST endpoint.
///
/// One RPC per call: parameters are posted as JSON to
/// `<webhook_url>/<method>.json` and the standard envelope is returned.
/// CRM business semantics live in the callers, not here.
#[derive(Clone)]
pub struct CrmClient {
    executor: RequestExecutor,
    webhook_url: String,
}

impl CrmClient {
    /// Creates a new `CrmClient`.
    ///
    /// # Arguments
    ///
    /// * `webhook_url` - The CRM inbound webhook base URL.
    /// * `executor` - Transport used for every RPC.
    pub fn new(webhook_url: String, executor: RequestExecutor) -> Self {
        Self {
            executor,
            webhook_url: webhook_url.trim_end_matches('/').to_string(),
        }
    }

    /// Invokes one CRM REST method.
    ///
    /// # Arguments
    ///
    /// * `method` - REST method name, e.g. `crm.lead.add`.
    /// * `params` - JSON parameters for the method.
    pub async fn call(&self, method: &str, params: &Value) -> Result<CrmResponse, ApiError> {
        let url = format!("{}/{}.json", self.webhook_url, method);
        tracing::debug!("CRM call: {}", method);

        let payload = serde_json::to_vec(params)
            .map_err(|e| ApiError::InvalidInput(format!("Invalid CRM params: {}", e)))?;

        let value = self
            .executor
            .execute(
                &url,
                &["Content-Type: application/json".to_string()],
                "POST",
                Some(&payload),
            )
            .await?;

        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
