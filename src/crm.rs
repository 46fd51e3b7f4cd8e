use crate::config::Config;
use crate::crm_client::CrmClient;
use crate::errors::ApiError;
use serde_json::{json, Map, Value};

/// Service account excluded from assignee lookups.
const EXCLUDED_USER_ID: i64 = 8;

/// How to resolve the responsible salesperson for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// Match a listing by its reference number, then walk its agent fields.
    Reference,
    /// Match a user directly by personal mobile number.
    Phone,
}

/// CRM-side glue: lead and contact creation, call telemetry and
/// user/agent lookups over the webhook REST endpoint.
pub struct CrmService {
    client: CrmClient,
    default_assigned_user_id: i64,
    listings_entity_type_id: i64,
}

impl CrmService {
    pub fn new(config: &Config, client: CrmClient) -> Self {
        Self {
            client,
            default_assigned_user_id: config.default_assigned_user_id,
            listings_entity_type_id: config.listings_entity_type_id,
        }
    }

    /// Creates a CRM lead and returns the raw `result` member.
    pub async fn create_lead(&self, fields: Value) -> Result<Value, ApiError> {
        let response = self
            .client
            .call("crm.lead.add", &json!({ "fields": fields }))
            .await?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Creates a CRM contact and returns the raw `result` member.
    pub async fn create_contact(&self, fields: Value) -> Result<Value, ApiError> {
        let response = self
            .client
            .call("crm.contact.add", &json!({ "fields": fields }))
            .await?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Registers an inbound/outbound call with CRM telephony.
    pub async fn register_call(&self, fields: Value) -> Result<Value, ApiError> {
        let response = self
            .client
            .call("telephony.externalcall.register", &fields)
            .await?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Marks a registered call as finished.
    pub async fn finish_call(&self, fields: Value) -> Result<Value, ApiError> {
        let response = self
            .client
            .call("telephony.externalcall.finish", &fields)
            .await?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Attaches a call recording to a finished call.
    pub async fn attach_record(&self, fields: Value) -> Result<Value, ApiError> {
        let response = self
            .client
            .call("telephony.externalcall.attachRecord", &fields)
            .await?;
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Finds an active user ID matching `filter`.
    ///
    /// `ACTIVE: "Y"` is merged into the filter. CRM-level errors degrade
    /// to `None` after logging; only transport failures propagate.
    pub async fn get_user_id(&self, filter: Value) -> Result<Option<i64>, ApiError> {
        let mut merged = match filter {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                if !other.is_null() {
                    tracing::warn!("Non-object user filter ignored: {}", other);
                }
                map
            }
        };
        merged.insert("ACTIVE".to_string(), json!("Y"));

        let response = self
            .client
            .call("user.get", &json!({ "filter": merged }))
            .await?;

        if response.is_error() {
            tracing::error!("Error getting user: {}", response.error_text());
            return Ok(None);
        }

        let id = response
            .result
            .as_ref()
            .and_then(|r| r.as_array())
            .and_then(|users| users.first())
            .and_then(|user| user.get("ID"))
            .and_then(id_as_i64);

        Ok(id)
    }

    /// Resolves the responsible salesperson for a lead.
    ///
    /// Reference mode walks the matched listing's fields in order:
    /// owner ID, listing owner name, agent email; CRM errors and missing
    /// listings fall back to the default assigned user. Phone mode goes
    /// straight to a personal-mobile user lookup.
    pub async fn get_responsible_person(
        &self,
        search_value: &str,
        mode: LookupMode,
    ) -> Result<Option<i64>, ApiError> {
        match mode {
            LookupMode::Phone => {
                self.get_user_id(json!({
                    "%PERSONAL_MOBILE": search_value,
                    "!ID": EXCLUDED_USER_ID,
                }))
                .await
            }
            LookupMode::Reference => self.resolve_from_listing(search_value).await,
        }
    }

    async fn resolve_from_listing(&self, reference: &str) -> Result<Option<i64>, ApiError> {
        let response = self
            .client
            .call(
                "crm.item.list",
                &json!({
                    "entityTypeId": self.listings_entity_type_id,
                    "filter": { "ufCrm6ReferenceNumber": reference },
                    "select": [
                        "ufCrm6ReferenceNumber",
                        "ufCrm6AgentEmail",
                        "ufCrm6ListingOwner",
                        "ufCrm6OwnerId",
                    ],
                }),
            )
            .await?;

        if response.is_error() {
            tracing::error!("Error getting CRM item: {}", response.error_text());
            return Ok(Some(self.default_assigned_user_id));
        }

        let listing = match response
            .result
            .as_ref()
            .and_then(|r| r.get("items"))
            .and_then(|items| items.as_array())
            .and_then(|items| items.first())
        {
            Some(listing) => listing.clone(),
            None => {
                tracing::error!("No listing found with reference number: {}", reference);
                return Ok(Some(self.default_assigned_user_id));
            }
        };

        if let Some(owner_id) = listing.get("ufCrm6OwnerId").and_then(id_as_i64) {
            return Ok(Some(owner_id));
        }

        if let Some(owner_name) = listing
            .get("ufCrm6ListingOwner")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
        {
            let mut parts = owner_name.trim().splitn(2, ' ');
            let first_name = parts.next().unwrap_or_default();
            let last_name = parts.next();

            let mut filter = Map::new();
            filter.insert("%NAME".to_string(), json!(first_name));
            if let Some(last) = last_name {
                filter.insert("%LAST_NAME".to_string(), json!(last));
            }
            filter.insert("!ID".to_string(), json!(EXCLUDED_USER_ID));
            return self.get_user_id(Value::Object(filter)).await;
        }

        if let Some(agent_email) = listing
            .get("ufCrm6AgentEmail")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
        {
            return self
                .get_user_id(json!({
                    "EMAIL": agent_email,
                    "!ID": EXCLUDED_USER_ID,
                }))
                .await;
        }

        tracing::error!("No agent email found for reference number: {}", reference);
        Ok(Some(self.default_assigned_user_id))
    }

    /// Advertised price of the listing matching `reference`, if any.
    pub async fn get_property_price(&self, reference: &str) -> Result<Option<Value>, ApiError> {
        let response = self
            .client
            .call(
                "crm.item.list",
                &json!({
                    "entityTypeId": self.listings_entity_type_id,
                    "filter": { "ufCrm6ReferenceNumber": reference },
                    "select": ["ufCrm6Price"],
                }),
            )
            .await?;

        let price = response
            .result
            .as_ref()
            .and_then(|r| r.get("items"))
            .and_then(|items| items.as_array())
            .and_then(|items| items.first())
            .and_then(|listing| listing.get("ufCrm6Price"))
            .filter(|v| !v.is_null())
            .cloned();

        Ok(price)
    }
}

/// CRM IDs arrive as numbers or numeric strings depending on the method.
fn id_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
