//! Portal → CRM Lead Bridge Library
//!
//! This library bridges a real-estate lead-generation portal with a CRM
//! system's REST API: lead fetch, lead and contact creation, call
//! telemetry and responsible-agent lookups, all riding on one generic
//! outbound HTTP request executor.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `crm`: CRM glue services (leads, contacts, telephony, user lookup).
//! - `crm_client`: Opaque CRM REST client.
//! - `errors`: Error handling types.
//! - `ledger`: Processed-lead ledger.
//! - `logfile`: Date-partitioned log sink.
//! - `portal`: Lead portal API client.
//! - `request`: Generic outbound HTTP request executor.
//! - `sync`: Lead sync workflow.
//! - `textutil`: Message and duration helpers.

pub mod config;
pub mod crm;
pub mod crm_client;
pub mod errors;
pub mod ledger;
pub mod logfile;
pub mod portal;
pub mod request;
pub mod sync;
pub mod textutil;
