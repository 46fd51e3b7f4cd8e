/// Lead sync workflow shared by the binary and the integration tests.
///
/// One run walks the configured lead types:
/// 1. Fetch new leads from the portal
/// 2. Skip leads already in the processed ledger
/// 3. Resolve the responsible salesperson from the property reference
/// 4. Create the CRM lead
/// 5. Record the lead ID in the ledger
use crate::crm::{CrmService, LookupMode};
use crate::ledger::ProcessedLedger;
use crate::portal::PortalService;
use crate::textutil::parse_message_and_link;
use serde_json::{json, Value};

/// Outcome counters for one sync run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub fetched: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs one sync pass over `lead_types`.
///
/// Per-lead failures are logged and counted, never fatal; a failed fetch
/// skips that lead type and moves on (the portal call is independent per
/// type). Only ledger I/O failures abort the run.
pub async fn run_sync(
    portal: &PortalService,
    crm: &CrmService,
    ledger: &ProcessedLedger,
    lead_types: &[String],
    timestamp: &str,
) -> anyhow::Result<SyncSummary> {
    let processed = ledger.load()?;
    let mut summary = SyncSummary::default();

    for lead_type in lead_types {
        let payload = match portal.fetch_leads(lead_type, timestamp).await {
            Ok(Some(payload)) => payload,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("Fetching '{}' leads failed: {}", lead_type, e);
                continue;
            }
        };

        for lead in leads_from_payload(&payload) {
            summary.fetched += 1;

            let lead_id = match lead_identity(&lead) {
                Some(id) => id,
                None => {
                    tracing::warn!("Skipping lead without an id: {}", lead);
                    summary.failed += 1;
                    continue;
                }
            };

            if processed.iter().any(|p| p == &lead_id) {
                summary.skipped += 1;
                continue;
            }

            let reference = text_field(&lead, &["listing_reference", "reference"]);
            let responsible = match &reference {
                Some(reference) => {
                    match crm
                        .get_responsible_person(reference, LookupMode::Reference)
                        .await
                    {
                        Ok(id) => id,
                        Err(e) => {
                            tracing::warn!(
                                "Responsible lookup failed for '{}': {}",
                                reference,
                                e
                            );
                            None
                        }
                    }
                }
                None => None,
            };

            let link = reference.as_deref().map(|r| portal.property_link(r));
            let fields = lead_fields_from(&lead, lead_type, link.as_deref(), responsible);

            match crm.create_lead(fields).await {
                Ok(result) => {
                    tracing::info!("Created CRM lead {} for portal lead {}", result, lead_id);
                    ledger.record(&lead_id)?;
                    summary.created += 1;
                }
                Err(e) => {
                    tracing::error!("Creating CRM lead for {} failed: {}", lead_id, e);
                    summary.failed += 1;
                }
            }
        }
    }

    Ok(summary)
}

/// Extracts the lead list from a portal payload.
///
/// The portal answers either with a bare array or with the list nested
/// under `results` / `leads`.
pub fn leads_from_payload(payload: &Value) -> Vec<Value> {
    if let Some(items) = payload.as_array() {
        return items.clone();
    }
    for key in ["results", "leads", "data"] {
        if let Some(items) = payload.get(key).and_then(|v| v.as_array()) {
            return items.clone();
        }
    }
    Vec::new()
}

/// Maps one portal lead onto CRM lead fields.
pub fn lead_fields_from(
    lead: &Value,
    lead_type: &str,
    property_link: Option<&str>,
    assigned_by_id: Option<i64>,
) -> Value {
    let name = text_field(lead, &["name", "client_name"]).unwrap_or_else(|| "Unknown".to_string());
    let reference = text_field(lead, &["listing_reference", "reference"]);

    let mut comments = String::new();
    if let Some(message) = text_field(lead, &["message", "comment"]) {
        let parsed = parse_message_and_link(&message);
        comments.push_str(&parsed.message);
        if let Some(inline_link) = parsed.link {
            comments.push_str(&format!("\nLink: {}", inline_link));
        }
    }
    if let Some(link) = property_link {
        if !comments.contains(link) {
            if !comments.is_empty() {
                comments.push('\n');
            }
            comments.push_str(&format!("Property: {}", link));
        }
    }

    let mut fields = serde_json::Map::new();
    let title = match &reference {
        Some(reference) => format!("{} - {}", name, reference),
        None => format!("{} - {}", name, lead_type),
    };
    fields.insert("TITLE".to_string(), json!(title));
    fields.insert("NAME".to_string(), json!(name));
    fields.insert("SOURCE_ID".to_string(), json!("WEB"));
    fields.insert("SOURCE_DESCRIPTION".to_string(), json!(lead_type));
    if !comments.is_empty() {
        fields.insert("COMMENTS".to_string(), json!(comments));
    }
    if let Some(phone) = text_field(lead, &["phone", "mobile"]) {
        fields.insert(
            "PHONE".to_string(),
            json!([{ "VALUE": phone, "VALUE_TYPE": "WORK" }]),
        );
    }
    if let Some(email) = text_field(lead, &["email"]) {
        fields.insert(
            "EMAIL".to_string(),
            json!([{ "VALUE": email, "VALUE_TYPE": "WORK" }]),
        );
    }
    if let Some(id) = assigned_by_id {
        fields.insert("ASSIGNED_BY_ID".to_string(), json!(id));
    }

    Value::Object(fields)
}

/// Portal lead IDs arrive as strings or numbers.
fn lead_identity(lead: &Value) -> Option<String> {
    match lead.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(lead: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = lead.get(key).and_then(|v| v.as_str()) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shapes_unwrap_to_lead_lists() {
        let bare = json!([{ "id": "1" }, { "id": "2" }]);
        assert_eq!(leads_from_payload(&bare).len(), 2);

        let nested = json!({ "results": [{ "id": "1" }] });
        assert_eq!(leads_from_payload(&nested).len(), 1);

        let empty = json!({ "count": 0 });
        assert!(leads_from_payload(&empty).is_empty());
    }

    #[test]
    fn lead_fields_carry_contact_and_assignee() {
        let lead = json!({
            "id": "L-1",
            "name": "Jane Buyer",
            "phone": "+971501234567",
            "email": "jane@example.com",
            "listing_reference": "AP1234",
            "message": "Is this still available? Link: https://example.com/p/1",
        });

        let fields = lead_fields_from(
            &lead,
            "email",
            Some("https://www.bayut.com/property/details-AP1234.html"),
            Some(42),
        );

        assert_eq!(fields["TITLE"], "Jane Buyer - AP1234");
        assert_eq!(fields["NAME"], "Jane Buyer");
        assert_eq!(fields["ASSIGNED_BY_ID"], 42);
        assert_eq!(fields["PHONE"][0]["VALUE"], "+971501234567");
        assert_eq!(fields["EMAIL"][0]["VALUE"], "jane@example.com");
        let comments = fields["COMMENTS"].as_str().unwrap();
        assert!(comments.contains("Is this still available?"));
        assert!(comments.contains("https://example.com/p/1"));
        assert!(comments.contains("details-AP1234"));
    }

    #[test]
    fn lead_without_reference_titles_by_type() {
        let lead = json!({ "id": 7, "name": "Walk In" });
        let fields = lead_fields_from(&lead, "call", None, None);
        assert_eq!(fields["TITLE"], "Walk In - call");
        assert!(fields.get("PHONE").is_none());
        assert!(fields.get("ASSIGNED_BY_ID").is_none());
    }

    #[test]
    fn numeric_lead_ids_stringify() {
        assert_eq!(lead_identity(&json!({ "id": 99 })), Some("99".to_string()));
        assert_eq!(
            lead_identity(&json!({ "id": "L-7" })),
            Some("L-7".to_string())
        );
        assert_eq!(lead_identity(&json!({ "id": "" })), None);
        assert_eq!(lead_identity(&json!({ "name": "no id" })), None);
    }
}
