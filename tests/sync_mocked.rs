/// End-to-end lead sync against a mocked portal and CRM
use portal_crm_bridge::config::Config;
use portal_crm_bridge::crm::CrmService;
use portal_crm_bridge::crm_client::CrmClient;
use portal_crm_bridge::ledger::ProcessedLedger;
use portal_crm_bridge::portal::PortalService;
use portal_crm_bridge::request::{ExecutorConfig, RequestExecutor};
use portal_crm_bridge::sync::{run_sync, SyncSummary};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config pointing at the mock server
fn create_test_config(mock_uri: &str) -> Config {
    Config {
        portal_base_url: mock_uri.to_string(),
        portal_auth_token: "test_token".to_string(),
        crm_webhook_url: format!("{}/rest/1/hook", mock_uri),
        default_assigned_user_id: 9,
        listings_entity_type_id: 1036,
        listing_site_url: "https://listings.example.com".to_string(),
        logs_dir: "logs".to_string(),
        processed_leads_file: "processed_leads.txt".to_string(),
        lead_types: vec!["email".to_string()],
        connect_timeout_secs: 5,
        request_timeout_secs: 10,
    }
}

fn temp_ledger(name: &str) -> ProcessedLedger {
    let path = std::env::temp_dir().join(format!(
        "bridge-sync-ledger-{}-{}.txt",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    ProcessedLedger::new(path)
}

fn wire_services(config: &Config) -> (PortalService, CrmService) {
    let executor = RequestExecutor::new(ExecutorConfig::default()).unwrap();
    let portal = PortalService::new(config, executor.clone());
    let crm = CrmService::new(
        config,
        CrmClient::new(config.crm_webhook_url.clone(), executor),
    );
    (portal, crm)
}

#[tokio::test]
async fn sync_creates_new_leads_and_skips_processed_ones() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profolio/api-v7/stats/website-client-leads"))
        .and(query_param("type", "email"))
        .and(query_param("timestamp", "2026-08-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": "lead-new",
                    "name": "Jane Buyer",
                    "phone": "+971501234567",
                    "email": "jane@example.com",
                    "listing_reference": "AP1234",
                    "message": "Is this still available?"
                },
                { "id": "lead-old", "name": "Seen Before" }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/1/hook/crm.item.list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "items": [{ "ufCrm6OwnerId": 77 }] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Only the unprocessed lead may reach lead creation
    Mock::given(method("POST"))
        .and(path("/rest/1/hook/crm.lead.add.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 501 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (portal, crm) = wire_services(&config);
    let ledger = temp_ledger("skip");
    ledger.record("lead-old").unwrap();

    let summary = run_sync(&portal, &crm, &ledger, &config.lead_types, "2026-08-07")
        .await
        .unwrap();

    assert_eq!(
        summary,
        SyncSummary {
            fetched: 2,
            created: 1,
            skipped: 1,
            failed: 0,
        }
    );
    let recorded = ledger.load().unwrap();
    assert!(recorded.contains(&"lead-old".to_string()));
    assert!(recorded.contains(&"lead-new".to_string()));
}

#[tokio::test]
async fn empty_portal_payload_creates_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profolio/api-v7/stats/website-client-leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/1/hook/crm.lead.add.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 1 })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (portal, crm) = wire_services(&config);
    let ledger = temp_ledger("empty");

    let summary = run_sync(&portal, &crm, &ledger, &config.lead_types, "2026-08-07")
        .await
        .unwrap();

    assert_eq!(summary, SyncSummary::default());
}

#[tokio::test]
async fn portal_failure_skips_the_lead_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profolio/api-v7/stats/website-client-leads"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (portal, crm) = wire_services(&config);
    let ledger = temp_ledger("portal-down");

    let summary = run_sync(&portal, &crm, &ledger, &config.lead_types, "2026-08-07")
        .await
        .unwrap();

    assert_eq!(summary, SyncSummary::default());
}

#[tokio::test]
async fn failed_lead_creation_is_counted_and_not_recorded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profolio/api-v7/stats/website-client-leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "lead-1", "name": "Jane Buyer" }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/1/hook/crm.lead.add.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (portal, crm) = wire_services(&config);
    let ledger = temp_ledger("create-fails");

    let summary = run_sync(&portal, &crm, &ledger, &config.lead_types, "2026-08-07")
        .await
        .unwrap();

    assert_eq!(
        summary,
        SyncSummary {
            fetched: 1,
            created: 0,
            skipped: 0,
            failed: 1,
        }
    );
    assert!(ledger.load().unwrap().is_empty());
}
