//! In-app notification domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::Urgency;
use crate::models::user_profile::StaffRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ExpiryWarning,
    DocumentExpired,
    TrainingRenewal,
    RightToWorkRecheck,
    TaskEscalation,
    StageProgressed,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ExpiryWarning => "expiry_warning",
            NotificationKind::DocumentExpired => "document_expired",
            NotificationKind::TrainingRenewal => "training_renewal",
            NotificationKind::RightToWorkRecheck => "right_to_work_recheck",
            NotificationKind::TaskEscalation => "task_escalation",
            NotificationKind::StageProgressed => "stage_progressed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expiry_warning" => Some(NotificationKind::ExpiryWarning),
            "document_expired" => Some(NotificationKind::DocumentExpired),
            "training_renewal" => Some(NotificationKind::TrainingRenewal),
            "right_to_work_recheck" => Some(NotificationKind::RightToWorkRecheck),
            "task_escalation" => Some(NotificationKind::TaskEscalation),
            "stage_progressed" => Some(NotificationKind::StageProgressed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub person_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub urgency: Urgency,
    pub recipient_roles: Vec<StaffRole>,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    pub tenant_id: Uuid,
    pub person_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub urgency: Urgency,
    pub recipient_roles: Vec<StaffRole>,
    pub title: String,
    pub message: String,
}
