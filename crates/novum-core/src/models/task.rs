//! Compliance task domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::{ItemSource, Urgency};
use crate::models::user_profile::StaffRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    DocumentExpiring,
    DocumentExpired,
    TrainingRenewal,
    RightToWorkRecheck,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::DocumentExpiring => "document_expiring",
            TaskType::DocumentExpired => "document_expired",
            TaskType::TrainingRenewal => "training_renewal",
            TaskType::RightToWorkRecheck => "right_to_work_recheck",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document_expiring" => Some(TaskType::DocumentExpiring),
            "document_expired" => Some(TaskType::DocumentExpired),
            "training_renewal" => Some(TaskType::TrainingRenewal),
            "right_to_work_recheck" => Some(TaskType::RightToWorkRecheck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// A work item raised by the workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceTask {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    /// The document, training record, or right-to-work check that
    /// triggered the task.
    pub source: ItemSource,
    pub source_id: Uuid,
    /// Document type or course id of the triggering item.
    pub item_type: Option<String>,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub urgency: Urgency,
    pub status: TaskStatus,
    pub assigned_role: StaffRole,
    pub due_date: Option<NaiveDate>,
    pub escalation_level: u32,
    pub last_escalated_at: Option<DateTime<Utc>>,
    pub closed_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ComplianceTask {
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Start of the current SLA window: creation, or the most recent
    /// escalation.
    pub fn sla_anchor(&self) -> DateTime<Utc> {
        self.last_escalated_at.unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub tenant_id: Uuid,
    pub person_id: Uuid,
    pub source: ItemSource,
    pub source_id: Uuid,
    pub item_type: Option<String>,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub urgency: Urgency,
    pub assigned_role: StaffRole,
    pub due_date: Option<NaiveDate>,
}
