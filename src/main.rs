use chrono::Utc;
use portal_crm_bridge::config::Config;
use portal_crm_bridge::crm::CrmService;
use portal_crm_bridge::crm_client::CrmClient;
use portal_crm_bridge::ledger::ProcessedLedger;
use portal_crm_bridge::logfile::DatedLogSink;
use portal_crm_bridge::portal::PortalService;
use portal_crm_bridge::request::{ExecutorConfig, RequestExecutor};
use portal_crm_bridge::sync::run_sync;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the lead sync runner.
///
/// Loads configuration, wires the portal and CRM clients over one
/// request executor, runs a single sync pass and reports the counters.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok when the run completes, or an error if
///   initialization or ledger I/O fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_crm_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Request failures land in a dated error.log under the configured root
    let sink = DatedLogSink::new(&config.logs_dir);
    let logger = Arc::new(move |message: &str| {
        if sink.append("error.log", message).is_err() {
            tracing::error!("{}", message);
        }
    });

    let executor = RequestExecutor::with_logger(
        ExecutorConfig {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            total_timeout: Duration::from_secs(config.request_timeout_secs),
        },
        logger,
    )?;
    tracing::info!("Request executor initialized");

    let portal = PortalService::new(&config, executor.clone());
    let crm = CrmService::new(
        &config,
        CrmClient::new(config.crm_webhook_url.clone(), executor),
    );
    let ledger = ProcessedLedger::new(&config.processed_leads_file);

    // Pull everything the portal reported for today
    let timestamp = Utc::now().format("%Y-%m-%d").to_string();
    tracing::info!("Starting lead sync for {}", timestamp);

    let summary = run_sync(&portal, &crm, &ledger, &config.lead_types, &timestamp).await?;

    tracing::info!(
        "Sync finished: {} fetched, {} created, {} skipped, {} failed",
        summary.fetched,
        summary.created,
        summary.skipped,
        summary.failed
    );

    Ok(())
}
