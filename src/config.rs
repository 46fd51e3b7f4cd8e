use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portal_base_url: String,
    pub portal_auth_token: String,
    pub crm_webhook_url: String,
    pub default_assigned_user_id: i64,
    pub listings_entity_type_id: i64,
    pub listing_site_url: String,
    pub logs_dir: String,
    pub processed_leads_file: String,
    pub lead_types: Vec<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            portal_base_url: std::env::var("PORTAL_BASE_URL")
                .map_err(|_| anyhow::anyhow!("PORTAL_BASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("PORTAL_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("PORTAL_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })?,
            portal_auth_token: std::env::var("PORTAL_AUTH_TOKEN")
                .map_err(|_| anyhow::anyhow!("PORTAL_AUTH_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("PORTAL_AUTH_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            crm_webhook_url: std::env::var("CRM_WEBHOOK_URL")
                .map_err(|_| anyhow::anyhow!("CRM_WEBHOOK_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("CRM_WEBHOOK_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("CRM_WEBHOOK_URL must start with http:// or https://");
                    }
                    Ok(url)
                })?,
            default_assigned_user_id: std::env::var("DEFAULT_ASSIGNED_USER_ID")
                .map_err(|_| {
                    anyhow::anyhow!("DEFAULT_ASSIGNED_USER_ID environment variable required")
                })?
                .parse()
                .map_err(|_| anyhow::anyhow!("DEFAULT_ASSIGNED_USER_ID must be a valid user ID"))?,
            listings_entity_type_id: std::env::var("LISTINGS_ENTITY_TYPE_ID")
                .unwrap_or_else(|_| "1036".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LISTINGS_ENTITY_TYPE_ID must be a number"))?,
            listing_site_url: std::env::var("LISTING_SITE_URL")
                .unwrap_or_else(|_| "https://www.bayut.com".to_string()),
            logs_dir: std::env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            processed_leads_file: std::env::var("PROCESSED_LEADS_FILE")
                .unwrap_or_else(|_| "processed_leads.txt".to_string()),
            lead_types: std::env::var("LEAD_TYPES")
                .unwrap_or_else(|_| "email,call,whatsapp".to_string())
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            connect_timeout_secs: std::env::var("CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CONNECT_TIMEOUT_SECS must be a number of seconds"))?,
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a number of seconds"))?,
        };

        if config.lead_types.is_empty() {
            anyhow::bail!("LEAD_TYPES must name at least one lead type");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Portal base URL: {}", config.portal_base_url);
        tracing::debug!("CRM webhook URL: {}", config.crm_webhook_url);
        tracing::debug!("Lead types: {:?}", config.lead_types);
        tracing::debug!(
            "Timeouts: connect {}s, total {}s",
            config.connect_timeout_secs,
            config.request_timeout_secs
        );

        Ok(config)
    }
}
