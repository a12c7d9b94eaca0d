//! SurrealDB implementation of [`TaskRepository`].

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::expiry::{ItemSource, Urgency};
use novum_core::models::task::{ComplianceTask, CreateTask, TaskStatus, TaskType};
use novum_core::models::user_profile::StaffRole;
use novum_core::repository::TaskRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{CountRow, date_str, first_or_not_found, parse_enum, parse_opt_date, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TaskRow {
    record_id: String,
    tenant_id: String,
    person_id: String,
    source: String,
    source_id: String,
    item_type: Option<String>,
    task_type: String,
    title: String,
    description: Option<String>,
    urgency: String,
    status: String,
    assigned_role: String,
    due_date: Option<String>,
    escalation_level: u32,
    last_escalated_at: Option<DateTime<Utc>>,
    closed_reason: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TaskRow {
    fn try_into_task(self) -> Result<ComplianceTask, DbError> {
        Ok(ComplianceTask {
            id: parse_uuid("task", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            person_id: parse_uuid("person", &self.person_id)?,
            source: parse_enum("task source", &self.source, ItemSource::parse)?,
            source_id: parse_uuid("source", &self.source_id)?,
            item_type: self.item_type,
            task_type: parse_enum("task type", &self.task_type, TaskType::parse)?,
            title: self.title,
            description: self.description,
            urgency: parse_enum("urgency", &self.urgency, Urgency::parse)?,
            status: parse_enum("task status", &self.status, TaskStatus::parse)?,
            assigned_role: parse_enum("assigned role", &self.assigned_role, StaffRole::parse)?,
            due_date: parse_opt_date("due", self.due_date)?,
            escalation_level: self.escalation_level,
            last_escalated_at: self.last_escalated_at,
            closed_reason: self.closed_reason,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

fn collect(rows: Vec<TaskRow>) -> Result<Vec<ComplianceTask>, DbError> {
    rows.into_iter().map(TaskRow::try_into_task).collect()
}

const SELECT_TASK: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('compliance_task', $id) \
     WHERE tenant_id = $tenant_id";

/// Update one pending task of the tenant, then read it back. A task of
/// another tenant reads back as not found; a closed task reads back
/// unchanged.
fn update_open_sql(set_clause: &str) -> String {
    format!(
        "UPDATE type::record('compliance_task', $id) SET {set_clause} \
         WHERE tenant_id = $tenant_id AND status = 'pending'; {SELECT_TASK}"
    )
}

/// SurrealDB implementation of the compliance task repository.
#[derive(Clone)]
pub struct SurrealTaskRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTaskRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TaskRepository for SurrealTaskRepository<C> {
    async fn create(&self, input: CreateTask) -> NovumResult<ComplianceTask> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('compliance_task', $id) SET \
                 tenant_id = $tenant_id, person_id = $person_id, \
                 source = $source, source_id = $source_id, \
                 item_type = $item_type, task_type = $task_type, \
                 title = $title, description = $description, \
                 urgency = $urgency, status = 'pending', \
                 assigned_role = $assigned_role, due_date = $due_date, \
                 escalation_level = 0; {SELECT_TASK}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("person_id", input.person_id.to_string()))
            .bind(("source", input.source.as_str()))
            .bind(("source_id", input.source_id.to_string()))
            .bind(("item_type", input.item_type))
            .bind(("task_type", input.task_type.as_str()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("urgency", input.urgency.as_str()))
            .bind(("assigned_role", input.assigned_role.as_str()))
            .bind(("due_date", date_str(input.due_date)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "compliance_task", &id_str)?.try_into_task()?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> NovumResult<ComplianceTask> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_TASK)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "compliance_task", &id_str)?.try_into_task()?)
    }

    async fn find_open_by_source(
        &self,
        tenant_id: Uuid,
        source: ItemSource,
        source_id: Uuid,
    ) -> NovumResult<Option<ComplianceTask>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM compliance_task \
                 WHERE tenant_id = $tenant_id AND source = $source \
                 AND source_id = $source_id AND status = 'pending' \
                 ORDER BY created_at ASC LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("source", source.as_str()))
            .bind(("source_id", source_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(TaskRow::try_into_task)
            .transpose()?)
    }

    async fn list_open(&self, tenant_id: Uuid) -> NovumResult<Vec<ComplianceTask>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM compliance_task \
                 WHERE tenant_id = $tenant_id AND status = 'pending' \
                 ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_open_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> NovumResult<Vec<ComplianceTask>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM compliance_task \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 AND status = 'pending' ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TaskRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn retier(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        task_type: TaskType,
        urgency: Urgency,
    ) -> NovumResult<ComplianceTask> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(update_open_sql("task_type = $task_type, urgency = $urgency"))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("task_type", task_type.as_str()))
            .bind(("urgency", urgency.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "compliance_task", &id_str)?.try_into_task()?)
    }

    async fn escalate(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        urgency: Urgency,
        at: DateTime<Utc>,
    ) -> NovumResult<ComplianceTask> {
        let id_str = id.to_string();
        debug!(task_id = %id, urgency = urgency.as_str(), "Escalating task");

        let result = self
            .db
            .query(update_open_sql(
                "urgency = $urgency, escalation_level += 1, last_escalated_at = $at",
            ))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("urgency", urgency.as_str()))
            .bind(("at", at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "compliance_task", &id_str)?.try_into_task()?)
    }

    async fn complete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> NovumResult<ComplianceTask> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(update_open_sql(
                "status = 'done', completed_at = $at, closed_reason = $reason",
            ))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("at", at))
            .bind(("reason", reason))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TaskRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "compliance_task", &id_str)?.try_into_task()?)
    }

    async fn close_open_for_item(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
        item_type: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> NovumResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM compliance_task \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 AND item_type = $item_type AND status = 'pending' GROUP ALL; \
                 UPDATE compliance_task SET status = 'done', \
                 completed_at = $at, closed_reason = $reason \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 AND item_type = $item_type AND status = 'pending' \
                 RETURN NONE",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .bind(("item_type", item_type.to_string()))
            .bind(("reason", reason.to_string()))
            .bind(("at", at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let closed = count_rows.first().map(|r| r.total).unwrap_or(0);
        if closed > 0 {
            debug!(%person_id, item_type, closed, "Closed open tasks for item");
        }
        Ok(closed)
    }
}
