use crate::config::Config;
use crate::errors::ApiError;
use crate::request::RequestExecutor;
use serde_json::Value;

/// Client for the lead-generation portal's stats API.
pub struct PortalService {
    executor: RequestExecutor,
    base_url: String,
    auth_token: String,
    listing_site_url: String,
}

impl PortalService {
    pub fn new(config: &Config, executor: RequestExecutor) -> Self {
        Self {
            executor,
            base_url: config.portal_base_url.trim_end_matches('/').to_string(),
            auth_token: config.portal_auth_token.clone(),
            listing_site_url: config.listing_site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches website client leads of one type since `timestamp`.
    ///
    /// Returns `None` when the portal answers with an empty payload.
    pub async fn fetch_leads(
        &self,
        lead_type: &str,
        timestamp: &str,
    ) -> Result<Option<Value>, ApiError> {
        // Query params go through Url to keep values properly encoded.
        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/profolio/api-v7/stats/website-client-leads",
                self.base_url
            ),
            &[("type", lead_type), ("timestamp", timestamp)],
        )
        .map_err(|e| ApiError::InvalidInput(format!("Invalid URL: {}", e)))?;

        tracing::info!("Fetching '{}' leads from portal", lead_type);

        let headers = [
            "Content-Type: application/json".to_string(),
            format!("Authorization: Bearer {}", self.auth_token),
        ];
        let data = self
            .executor
            .execute(url.as_str(), &headers, "GET", None)
            .await?;

        if is_empty_payload(&data) {
            tracing::info!("Portal returned no '{}' leads", lead_type);
            return Ok(None);
        }

        Ok(Some(data))
    }

    /// Canonical public detail-page URL for a listing.
    pub fn property_link(&self, property_id: &str) -> String {
        format!(
            "{}/property/details-{}.html",
            self.listing_site_url, property_id
        )
    }
}

fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
