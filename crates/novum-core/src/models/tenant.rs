//! Tenant domain model.
//!
//! A tenant is the organisation boundary. It owns every person,
//! document, task and audit row, and is soft-deactivated rather than
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// URL-safe unique identifier (e.g., `sunrise-care`).
    pub slug: String,
    /// Inactive tenants are skipped by scheduled jobs.
    pub active: bool,
    pub settings: TenantSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-tenant preferences. Unknown keys are preserved in
/// `feature_flags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Monthly compliance report emails. Absent means enabled.
    #[serde(default = "enabled")]
    pub compliance_email_notifications: bool,
    #[serde(default)]
    pub feature_flags: serde_json::Value,
}

fn enabled() -> bool {
    true
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            compliance_email_notifications: true,
            feature_flags: serde_json::Value::Object(Default::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub slug: String,
    pub settings: Option<TenantSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub settings: Option<TenantSettings>,
}
