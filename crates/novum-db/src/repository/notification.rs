//! SurrealDB implementation of [`NotificationRepository`].

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::expiry::Urgency;
use novum_core::models::notification::{CreateNotification, Notification, NotificationKind};
use novum_core::models::user_profile::StaffRole;
use novum_core::repository::NotificationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_or_not_found, parse_enum, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct NotificationRow {
    record_id: String,
    tenant_id: String,
    person_id: Option<String>,
    task_id: Option<String>,
    kind: String,
    urgency: String,
    recipient_roles: Vec<String>,
    title: String,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn try_into_notification(self) -> Result<Notification, DbError> {
        let recipient_roles = self
            .recipient_roles
            .iter()
            .map(|r| parse_enum("recipient role", r, StaffRole::parse))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Notification {
            id: parse_uuid("notification", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            person_id: parse_opt_uuid("person", self.person_id)?,
            task_id: parse_opt_uuid("task", self.task_id)?,
            kind: parse_enum("notification kind", &self.kind, NotificationKind::parse)?,
            urgency: parse_enum("urgency", &self.urgency, Urgency::parse)?,
            recipient_roles,
            title: self.title,
            message: self.message,
            read: self.read,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the in-app notification repository.
#[derive(Clone)]
pub struct SurrealNotificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNotificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NotificationRepository for SurrealNotificationRepository<C> {
    async fn create(&self, input: CreateNotification) -> NovumResult<Notification> {
        let id_str = Uuid::new_v4().to_string();
        let roles: Vec<String> = input
            .recipient_roles
            .iter()
            .map(|r| r.as_str().to_string())
            .collect();

        let result = self
            .db
            .query(
                "CREATE type::record('notification', $id) SET \
                 tenant_id = $tenant_id, person_id = $person_id, \
                 task_id = $task_id, kind = $kind, urgency = $urgency, \
                 recipient_roles = $recipient_roles, title = $title, \
                 message = $message, read = false; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('notification', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("person_id", input.person_id.map(|id| id.to_string())))
            .bind(("task_id", input.task_id.map(|id| id.to_string())))
            .bind(("kind", input.kind.as_str()))
            .bind(("urgency", input.urgency.as_str()))
            .bind(("recipient_roles", roles))
            .bind(("title", input.title))
            .bind(("message", input.message))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<NotificationRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "notification", &id_str)?.try_into_notification()?)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> NovumResult<Vec<Notification>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM notification \
                 WHERE tenant_id = $tenant_id ORDER BY created_at DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let notifications = rows
            .into_iter()
            .map(NotificationRow::try_into_notification)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(notifications)
    }
}
