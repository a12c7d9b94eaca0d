//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    User,
    System,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::User => "user",
            ActorType::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ActorType::User),
            "system" => Some(ActorType::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_type: ActorType,
    /// e.g. `document_verified`, `compliance_report_generated`.
    pub action: String,
    /// e.g. `compliance/document`, `compliance/monthly_report`.
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    pub tenant_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_type: ActorType,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl CreateAuditLogEntry {
    /// An entry recorded by the system itself rather than a user.
    pub fn system(
        tenant_id: Uuid,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            tenant_id,
            actor_id: None,
            actor_type: ActorType::System,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id,
            metadata: Some(metadata),
        }
    }
}

/// Optional filters for listing audit entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogFilter {
    pub action: Option<String>,
    pub entity_type: Option<String>,
}
