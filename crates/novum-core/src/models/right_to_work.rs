//! Right-to-work check domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RtwCheckType {
    /// Manual check of original documents.
    Manual,
    /// Online check with a Home Office share code.
    Online,
    /// Employer Checking Service.
    EmployerCheckingService,
}

impl RtwCheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RtwCheckType::Manual => "manual",
            RtwCheckType::Online => "online",
            RtwCheckType::EmployerCheckingService => "employer_checking_service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(RtwCheckType::Manual),
            "online" => Some(RtwCheckType::Online),
            "employer_checking_service" => Some(RtwCheckType::EmployerCheckingService),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RtwOutcome {
    /// Unlimited right to work.
    Continuous,
    /// Right to work until `next_check_date`; a follow-up check is due.
    TimeLimited,
    Failed,
}

impl RtwOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RtwOutcome::Continuous => "continuous",
            RtwOutcome::TimeLimited => "time_limited",
            RtwOutcome::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "continuous" => Some(RtwOutcome::Continuous),
            "time_limited" => Some(RtwOutcome::TimeLimited),
            "failed" => Some(RtwOutcome::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightToWorkCheck {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    pub check_type: RtwCheckType,
    pub checked_on: NaiveDate,
    pub outcome: RtwOutcome,
    /// Date by which the follow-up check must happen.
    pub next_check_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRightToWorkCheck {
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    pub check_type: RtwCheckType,
    pub checked_on: NaiveDate,
    pub outcome: RtwOutcome,
    pub next_check_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
