//! Automated workflow engine.
//!
//! Each monitored item moves through an implicit state machine:
//! valid → expiring soon (task raised) → renewed (task closed) or
//! expired (task raised to critical). Nothing about that state is
//! persisted beyond the tasks themselves; every run recomputes it from
//! stored dates, so a missed run heals on the next one and a repeated
//! run creates no duplicates.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info};
use uuid::Uuid;

use novum_core::clock::Clock;
use novum_core::error::NovumResult;
use novum_core::expiry::{ExpiringItem, ExpiryStatus, ItemSource, Urgency};
use novum_core::models::notification::{CreateNotification, NotificationKind};
use novum_core::models::task::{ComplianceTask, CreateTask, TaskType};
use novum_core::models::user_profile::StaffRole;
use novum_core::repository::{
    AuditLogRepository, ComplianceStore, DocumentRepository, NotificationRepository,
    TaskRepository, TenantRepository,
};

use crate::config::ComplianceConfig;
use crate::service::{Snapshot, advance_stage, audit_entry, outstanding_requirements};

/// Counts of what one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowRunSummary {
    pub tenant_id: Uuid,
    pub items_evaluated: usize,
    pub expiry_statuses_updated: usize,
    pub tasks_created: usize,
    pub tasks_retiered: usize,
    pub tasks_escalated: usize,
    pub tasks_closed: usize,
    pub notifications_created: usize,
    pub persons_progressed: usize,
}

/// Roles told about an item's own task: the person and HR, plus the
/// compliance officer once it is urgent.
fn owner_roles(urgency: Urgency) -> Vec<StaffRole> {
    let mut roles = vec![StaffRole::Employee, StaffRole::HrManager];
    if urgency <= Urgency::High {
        roles.push(StaffRole::ComplianceOfficer);
    }
    roles
}

/// Task type and notification kind for an item in the given state.
fn task_kind(source: ItemSource, status: ExpiryStatus) -> (TaskType, NotificationKind) {
    match (source, status) {
        (ItemSource::Document, ExpiryStatus::Expired) => {
            (TaskType::DocumentExpired, NotificationKind::DocumentExpired)
        }
        (ItemSource::Document, _) => (TaskType::DocumentExpiring, NotificationKind::ExpiryWarning),
        (ItemSource::Training, _) => (TaskType::TrainingRenewal, NotificationKind::TrainingRenewal),
        (ItemSource::RightToWork, _) => (
            TaskType::RightToWorkRecheck,
            NotificationKind::RightToWorkRecheck,
        ),
    }
}

pub struct WorkflowEngine<S: ComplianceStore> {
    store: Arc<S>,
    config: ComplianceConfig,
    clock: Arc<dyn Clock>,
}

impl<S: ComplianceStore> WorkflowEngine<S> {
    pub fn new(store: Arc<S>, config: ComplianceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Run every pass for one tenant.
    pub async fn run(&self, tenant_id: Uuid) -> NovumResult<WorkflowRunSummary> {
        let now = self.clock.now();
        let today = now.date_naive();
        let mut summary = WorkflowRunSummary {
            tenant_id,
            ..Default::default()
        };

        self.store.tenants().get_by_id(tenant_id).await?;
        let snapshot = Snapshot::load(self.store.as_ref(), tenant_id).await?;
        let items = snapshot.dated_items(today, &self.config.scoring);
        summary.items_evaluated = items.len();

        // 1. Documents: refresh the stored expiry status, then act on it.
        let stored_status: HashMap<Uuid, Option<ExpiryStatus>> = snapshot
            .documents
            .values()
            .flatten()
            .map(|d| (d.id, d.expiry_status))
            .collect();
        for item in items.iter().filter(|i| i.source == ItemSource::Document) {
            if stored_status.get(&item.source_id).copied().flatten() != Some(item.status) {
                self.store
                    .documents()
                    .set_expiry_status(tenant_id, item.source_id, item.status)
                    .await?;
                summary.expiry_statuses_updated += 1;
            }
            self.evaluate(&snapshot, item, now, &mut summary).await?;
        }

        // 2. Mandatory training.
        for item in items.iter().filter(|i| i.source == ItemSource::Training) {
            self.evaluate(&snapshot, item, now, &mut summary).await?;
        }

        // 3. Right-to-work re-checks.
        for item in items.iter().filter(|i| i.source == ItemSource::RightToWork) {
            self.evaluate(&snapshot, item, now, &mut summary).await?;
        }

        // 4. Escalation of tasks left untouched past their SLA.
        self.escalate_overdue(tenant_id, now, &mut summary).await?;

        // 5. Stage progression.
        if self.config.auto_stage_progression {
            self.progress_stages(&snapshot, today, &mut summary).await?;
        }

        self.store
            .audit()
            .append(audit_entry(
                tenant_id,
                None,
                "compliance_workflow_run",
                "compliance/workflow",
                tenant_id,
                json!(summary),
            ))
            .await?;

        info!(
            tenant_id = %tenant_id,
            items = summary.items_evaluated,
            created = summary.tasks_created,
            escalated = summary.tasks_escalated,
            closed = summary.tasks_closed,
            progressed = summary.persons_progressed,
            "compliance workflow run complete"
        );
        Ok(summary)
    }

    /// Run every active tenant in turn. A failing tenant is logged and
    /// skipped.
    pub async fn run_all(&self) -> NovumResult<Vec<WorkflowRunSummary>> {
        let tenants = self.store.tenants().list_active().await?;
        let mut summaries = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            match self.run(tenant.id).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    error!(tenant_id = %tenant.id, error = %e, "compliance workflow run failed")
                }
            }
        }
        Ok(summaries)
    }

    async fn evaluate(
        &self,
        snapshot: &Snapshot,
        item: &ExpiringItem,
        now: DateTime<Utc>,
        summary: &mut WorkflowRunSummary,
    ) -> NovumResult<()> {
        let tenant_id = summary.tenant_id;
        let tasks = self.store.tasks();

        // Tasks raised for an older record of the same item (e.g. last
        // year's training) are superseded by this one.
        let stale: Vec<&ComplianceTask> = snapshot
            .open_tasks
            .get(&item.person_id)
            .into_iter()
            .flatten()
            .filter(|t| {
                t.item_type.as_deref() == Some(item.item_type.as_str())
                    && t.source_id != item.source_id
            })
            .collect();
        for task in stale {
            tasks
                .complete(tenant_id, task.id, Some("superseded".into()), now)
                .await?;
            summary.tasks_closed += 1;
        }

        let open = tasks
            .find_open_by_source(tenant_id, item.source, item.source_id)
            .await?;

        match (item.status, open) {
            (ExpiryStatus::Valid, Some(task)) => {
                tasks
                    .complete(tenant_id, task.id, Some("renewed".into()), now)
                    .await?;
                summary.tasks_closed += 1;
                debug!(tenant_id = %tenant_id, task_id = %task.id, "task closed, item renewed");
            }
            (ExpiryStatus::Valid, None) => {}
            (status, Some(task)) => {
                let urgency = self.urgency_for(item);
                let (task_type, kind) = task_kind(item.source, status);
                if urgency < task.urgency || task_type != task.task_type {
                    let urgency = urgency.min(task.urgency);
                    tasks.retier(tenant_id, task.id, task_type, urgency).await?;
                    summary.tasks_retiered += 1;
                    if status == ExpiryStatus::Expired {
                        self.notify_owner(item, Some(task.id), kind, urgency, summary)
                            .await?;
                    }
                }
            }
            (status, None) => {
                let urgency = self.urgency_for(item);
                let (task_type, kind) = task_kind(item.source, status);
                let task = tasks
                    .create(CreateTask {
                        tenant_id,
                        person_id: item.person_id,
                        source: item.source,
                        source_id: item.source_id,
                        item_type: Some(item.item_type.clone()),
                        task_type,
                        title: task_title(item),
                        description: Some(describe(item)),
                        urgency,
                        assigned_role: StaffRole::HrManager,
                        due_date: Some(item.expiry_date),
                    })
                    .await?;
                summary.tasks_created += 1;
                debug!(
                    tenant_id = %tenant_id,
                    task_id = %task.id,
                    item_type = %item.item_type,
                    urgency = urgency.as_str(),
                    "task created"
                );
                self.notify_owner(item, Some(task.id), kind, urgency, summary)
                    .await?;
            }
        }
        Ok(())
    }

    fn urgency_for(&self, item: &ExpiringItem) -> Urgency {
        match item.status {
            ExpiryStatus::Expired => Urgency::Critical,
            _ => self.config.urgency.for_days(item.days_until_expiry),
        }
    }

    async fn notify_owner(
        &self,
        item: &ExpiringItem,
        task_id: Option<Uuid>,
        kind: NotificationKind,
        urgency: Urgency,
        summary: &mut WorkflowRunSummary,
    ) -> NovumResult<()> {
        self.store
            .notifications()
            .create(CreateNotification {
                tenant_id: summary.tenant_id,
                person_id: Some(item.person_id),
                task_id,
                kind,
                urgency,
                recipient_roles: owner_roles(urgency),
                title: task_title(item),
                message: describe(item),
            })
            .await?;
        summary.notifications_created += 1;
        Ok(())
    }

    async fn escalate_overdue(
        &self,
        tenant_id: Uuid,
        now: DateTime<Utc>,
        summary: &mut WorkflowRunSummary,
    ) -> NovumResult<()> {
        for task in self.store.tasks().list_open(tenant_id).await? {
            let sla = Duration::days(self.config.escalation.for_urgency(task.urgency));
            if now - task.sla_anchor() < sla {
                continue;
            }

            let raised = task.urgency.raised();
            let escalated = self
                .store
                .tasks()
                .escalate(tenant_id, task.id, raised, now)
                .await?;
            summary.tasks_escalated += 1;

            self.store
                .notifications()
                .create(CreateNotification {
                    tenant_id,
                    person_id: Some(task.person_id),
                    task_id: Some(task.id),
                    kind: NotificationKind::TaskEscalation,
                    urgency: raised,
                    recipient_roles: StaffRole::SUPERVISORY.to_vec(),
                    title: format!("Escalated: {}", task.title),
                    message: format!(
                        "Task open since {} without action (escalation level {}).",
                        task.created_at.date_naive(),
                        escalated.escalation_level
                    ),
                })
                .await?;
            summary.notifications_created += 1;

            info!(
                tenant_id = %tenant_id,
                task_id = %task.id,
                from = task.urgency.as_str(),
                to = raised.as_str(),
                level = escalated.escalation_level,
                "task escalated"
            );
        }
        Ok(())
    }

    async fn progress_stages(
        &self,
        snapshot: &Snapshot,
        today: NaiveDate,
        summary: &mut WorkflowRunSummary,
    ) -> NovumResult<()> {
        for person in &snapshot.persons {
            let Some(next) = person.stage.next() else {
                continue;
            };
            let outstanding = outstanding_requirements(
                person,
                snapshot.documents_of(person.id),
                snapshot.training_of(person.id),
                today,
            );
            if !outstanding.is_empty() {
                continue;
            }

            advance_stage(self.store.as_ref(), person, next, None).await?;
            summary.persons_progressed += 1;

            self.store
                .notifications()
                .create(CreateNotification {
                    tenant_id: summary.tenant_id,
                    person_id: Some(person.id),
                    task_id: None,
                    kind: NotificationKind::StageProgressed,
                    urgency: Urgency::Low,
                    recipient_roles: vec![StaffRole::HrManager],
                    title: format!("{} moved to {}", person.full_name(), next.as_str()),
                    message: format!(
                        "All {} requirements are complete.",
                        person.stage.as_str()
                    ),
                })
                .await?;
            summary.notifications_created += 1;
        }
        Ok(())
    }
}

fn task_title(item: &ExpiringItem) -> String {
    match item.status {
        ExpiryStatus::Expired => format!("{} expired: {}", item.item_name, item.person_name),
        _ => format!("Renew {} for {}", item.item_name, item.person_name),
    }
}

fn describe(item: &ExpiringItem) -> String {
    match item.days_until_expiry {
        d if d < 0 => format!(
            "{} expired on {} ({} days ago).",
            item.item_name, item.expiry_date, -d
        ),
        0 => format!("{} expires today.", item.item_name),
        d => format!(
            "{} expires on {} ({} days).",
            item.item_name, item.expiry_date, d
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_items_reach_the_compliance_officer() {
        assert!(!owner_roles(Urgency::Medium).contains(&StaffRole::ComplianceOfficer));
        assert!(owner_roles(Urgency::High).contains(&StaffRole::ComplianceOfficer));
        assert!(owner_roles(Urgency::Critical).contains(&StaffRole::ComplianceOfficer));
    }

    #[test]
    fn expired_documents_get_their_own_task_type() {
        assert_eq!(
            task_kind(ItemSource::Document, ExpiryStatus::Expired).0,
            TaskType::DocumentExpired
        );
        assert_eq!(
            task_kind(ItemSource::Document, ExpiryStatus::ExpiringSoon).0,
            TaskType::DocumentExpiring
        );
        assert_eq!(
            task_kind(ItemSource::Training, ExpiryStatus::Expired).0,
            TaskType::TrainingRenewal
        );
    }
}
