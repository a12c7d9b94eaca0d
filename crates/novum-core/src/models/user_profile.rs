//! Staff user profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    HrManager,
    ComplianceOfficer,
    RegisteredManager,
    OperationsManager,
    /// The person the item belongs to.
    Employee,
}

impl StaffRole {
    pub const ALL: [StaffRole; 6] = [
        StaffRole::Admin,
        StaffRole::HrManager,
        StaffRole::ComplianceOfficer,
        StaffRole::RegisteredManager,
        StaffRole::OperationsManager,
        StaffRole::Employee,
    ];

    /// Roles that receive the monthly compliance report.
    pub const REPORT_RECIPIENTS: [StaffRole; 3] = [
        StaffRole::Admin,
        StaffRole::HrManager,
        StaffRole::ComplianceOfficer,
    ];

    /// Roles notified when a task breaches its SLA.
    pub const SUPERVISORY: [StaffRole; 2] =
        [StaffRole::RegisteredManager, StaffRole::ComplianceOfficer];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::HrManager => "hr_manager",
            StaffRole::ComplianceOfficer => "compliance_officer",
            StaffRole::RegisteredManager => "registered_manager",
            StaffRole::OperationsManager => "operations_manager",
            StaffRole::Employee => "employee",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserProfile {
    pub tenant_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub role: StaffRole,
}
