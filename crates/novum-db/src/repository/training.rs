//! SurrealDB implementation of [`TrainingRepository`].

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::models::training::{CreateTrainingRecord, TrainingRecord};
use novum_core::repository::TrainingRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{date_str, first_or_not_found, parse_date, parse_opt_date, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TrainingRow {
    record_id: String,
    tenant_id: String,
    person_id: String,
    course_id: String,
    completed_on: String,
    expiry_date: Option<String>,
    certificate_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl TrainingRow {
    fn try_into_record(self) -> Result<TrainingRecord, DbError> {
        Ok(TrainingRecord {
            id: parse_uuid("training record", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            person_id: parse_uuid("person", &self.person_id)?,
            course_id: self.course_id,
            completed_on: parse_date("completion", &self.completed_on)?,
            expiry_date: parse_opt_date("expiry", self.expiry_date)?,
            certificate_ref: self.certificate_ref,
            created_at: self.created_at,
        })
    }
}

fn collect(rows: Vec<TrainingRow>) -> Result<Vec<TrainingRecord>, DbError> {
    rows.into_iter().map(TrainingRow::try_into_record).collect()
}

/// SurrealDB implementation of the Training repository.
#[derive(Clone)]
pub struct SurrealTrainingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTrainingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TrainingRepository for SurrealTrainingRepository<C> {
    async fn create(&self, input: CreateTrainingRecord) -> NovumResult<TrainingRecord> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('training_record', $id) SET \
                 tenant_id = $tenant_id, person_id = $person_id, \
                 course_id = $course_id, completed_on = $completed_on, \
                 expiry_date = $expiry_date, certificate_ref = $certificate_ref; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('training_record', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("person_id", input.person_id.to_string()))
            .bind(("course_id", input.course_id))
            .bind(("completed_on", input.completed_on.to_string()))
            .bind(("expiry_date", date_str(input.expiry_date)))
            .bind(("certificate_ref", input.certificate_ref))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TrainingRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "training_record", &id_str)?.try_into_record()?)
    }

    async fn list_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> NovumResult<Vec<TrainingRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM training_record \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 ORDER BY completed_on DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TrainingRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> NovumResult<Vec<TrainingRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM training_record \
                 WHERE tenant_id = $tenant_id ORDER BY completed_on DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TrainingRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }
}
