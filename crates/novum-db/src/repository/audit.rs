//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! Append-only: the trait exposes no update or delete.

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::models::audit::{ActorType, AuditLogEntry, AuditLogFilter, CreateAuditLogEntry};
use novum_core::repository::{AuditLogRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_or_not_found, parse_enum, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditRow {
    record_id: String,
    tenant_id: String,
    actor_id: Option<String>,
    actor_type: String,
    action: String,
    entity_type: String,
    entity_id: Option<String>,
    metadata: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl AuditRow {
    fn try_into_entry(self) -> Result<AuditLogEntry, DbError> {
        Ok(AuditLogEntry {
            id: parse_uuid("audit entry", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            actor_id: parse_opt_uuid("actor", self.actor_id)?,
            actor_type: parse_enum("actor type", &self.actor_type, ActorType::parse)?,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            metadata: self.metadata,
            timestamp: self.timestamp,
        })
    }
}

/// Build the WHERE clause for a filtered audit query.
fn where_clause(filter: &AuditLogFilter) -> String {
    let mut conditions = vec!["tenant_id = $tenant_id"];
    if filter.action.is_some() {
        conditions.push("action = $action");
    }
    if filter.entity_type.is_some() {
        conditions.push("entity_type = $entity_type");
    }
    conditions.join(" AND ")
}

/// SurrealDB implementation of the AuditLog repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditLogEntry) -> NovumResult<AuditLogEntry> {
        let id_str = Uuid::new_v4().to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 tenant_id = $tenant_id, actor_id = $actor_id, \
                 actor_type = $actor_type, action = $action, \
                 entity_type = $entity_type, entity_id = $entity_id, \
                 metadata = $metadata; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('audit_log', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("actor_id", input.actor_id.map(|id| id.to_string())))
            .bind(("actor_type", input.actor_type.as_str()))
            .bind(("action", input.action))
            .bind(("entity_type", input.entity_type))
            .bind(("entity_id", input.entity_id))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "audit_log", &id_str)?.try_into_entry()?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: AuditLogFilter,
        pagination: Pagination,
    ) -> NovumResult<PaginatedResult<AuditLogEntry>> {
        let tenant_id_str = tenant_id.to_string();
        let clause = where_clause(&filter);

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM audit_log WHERE {clause} GROUP ALL"
            ))
            .bind(("tenant_id", tenant_id_str.clone()))
            .bind(("action", filter.action.clone()))
            .bind(("entity_type", filter.entity_type.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM audit_log \
                 WHERE {clause} ORDER BY timestamp DESC \
                 LIMIT $limit START $offset"
            ))
            .bind(("tenant_id", tenant_id_str))
            .bind(("action", filter.action))
            .bind(("entity_type", filter.entity_type))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(AuditRow::try_into_entry)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn where_clause_adds_only_present_filters() {
        assert_eq!(
            where_clause(&AuditLogFilter::default()),
            "tenant_id = $tenant_id"
        );
        let filter = AuditLogFilter {
            action: Some("document_verified".into()),
            entity_type: None,
        };
        assert_eq!(
            where_clause(&filter),
            "tenant_id = $tenant_id AND action = $action"
        );
    }
}
