//! SurrealDB implementation of [`RightToWorkRepository`].

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::models::right_to_work::{
    CreateRightToWorkCheck, RightToWorkCheck, RtwCheckType, RtwOutcome,
};
use novum_core::repository::RightToWorkRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{date_str, first_or_not_found, parse_date, parse_enum, parse_opt_date, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RtwRow {
    record_id: String,
    tenant_id: String,
    person_id: String,
    check_type: String,
    checked_on: String,
    outcome: String,
    next_check_date: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl RtwRow {
    fn try_into_check(self) -> Result<RightToWorkCheck, DbError> {
        Ok(RightToWorkCheck {
            id: parse_uuid("right-to-work check", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            person_id: parse_uuid("person", &self.person_id)?,
            check_type: parse_enum("check type", &self.check_type, RtwCheckType::parse)?,
            checked_on: parse_date("check", &self.checked_on)?,
            outcome: parse_enum("outcome", &self.outcome, RtwOutcome::parse)?,
            next_check_date: parse_opt_date("next check", self.next_check_date)?,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

fn collect(rows: Vec<RtwRow>) -> Result<Vec<RightToWorkCheck>, DbError> {
    rows.into_iter().map(RtwRow::try_into_check).collect()
}

/// SurrealDB implementation of the right-to-work check repository.
#[derive(Clone)]
pub struct SurrealRightToWorkRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRightToWorkRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RightToWorkRepository for SurrealRightToWorkRepository<C> {
    async fn create(&self, input: CreateRightToWorkCheck) -> NovumResult<RightToWorkCheck> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('right_to_work_check', $id) SET \
                 tenant_id = $tenant_id, person_id = $person_id, \
                 check_type = $check_type, checked_on = $checked_on, \
                 outcome = $outcome, next_check_date = $next_check_date, \
                 notes = $notes; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('right_to_work_check', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("person_id", input.person_id.to_string()))
            .bind(("check_type", input.check_type.as_str()))
            .bind(("checked_on", input.checked_on.to_string()))
            .bind(("outcome", input.outcome.as_str()))
            .bind(("next_check_date", date_str(input.next_check_date)))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<RtwRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "right_to_work_check", &id_str)?.try_into_check()?)
    }

    async fn list_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> NovumResult<Vec<RightToWorkCheck>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM right_to_work_check \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 ORDER BY checked_on DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RtwRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> NovumResult<Vec<RightToWorkCheck>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM right_to_work_check \
                 WHERE tenant_id = $tenant_id ORDER BY checked_on DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RtwRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }
}
