//! SurrealDB implementation of [`PersonRepository`].

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::models::person::{CreatePerson, Person, PersonType, UpdatePerson};
use novum_core::repository::{PaginatedResult, Pagination, PersonRepository};
use novum_core::taxonomy::Stage;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, date_str, first_or_not_found, parse_enum, parse_opt_date, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PersonRow {
    record_id: String,
    tenant_id: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    job_title: Option<String>,
    person_type: String,
    stage: String,
    nationality: Option<String>,
    requires_nmc: bool,
    start_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonRow {
    fn try_into_person(self) -> Result<Person, DbError> {
        Ok(Person {
            id: parse_uuid("person", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            job_title: self.job_title,
            person_type: parse_enum("person type", &self.person_type, PersonType::parse)?,
            stage: parse_enum("stage", &self.stage, Stage::parse)?,
            nationality: self.nationality,
            requires_nmc: self.requires_nmc,
            start_date: parse_opt_date("start", self.start_date)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_PERSON: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('person', $id) WHERE tenant_id = $tenant_id";

/// SurrealDB implementation of the Person repository.
#[derive(Clone)]
pub struct SurrealPersonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPersonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PersonRepository for SurrealPersonRepository<C> {
    async fn create(&self, input: CreatePerson) -> NovumResult<Person> {
        let id_str = Uuid::new_v4().to_string();
        let stage = input.stage.unwrap_or(Stage::Application);

        let result = self
            .db
            .query(format!(
                "CREATE type::record('person', $id) SET \
                 tenant_id = $tenant_id, first_name = $first_name, \
                 last_name = $last_name, email = $email, \
                 job_title = $job_title, person_type = $person_type, \
                 stage = $stage, nationality = $nationality, \
                 requires_nmc = $requires_nmc, start_date = $start_date; \
                 {SELECT_PERSON}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("job_title", input.job_title))
            .bind(("person_type", PersonType::for_stage(stage).as_str()))
            .bind(("stage", stage.as_str()))
            .bind(("nationality", input.nationality))
            .bind(("requires_nmc", input.requires_nmc))
            .bind(("start_date", date_str(input.start_date)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PersonRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "person", &id_str)?.try_into_person()?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> NovumResult<Person> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_PERSON)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "person", &id_str)?.try_into_person()?)
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdatePerson) -> NovumResult<Person> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.job_title.is_some() {
            sets.push("job_title = $job_title");
        }
        if input.stage.is_some() {
            sets.push("stage = $stage");
            sets.push("person_type = $person_type");
        }
        if input.nationality.is_some() {
            sets.push("nationality = $nationality");
        }
        if input.requires_nmc.is_some() {
            sets.push("requires_nmc = $requires_nmc");
        }
        if input.start_date.is_some() {
            sets.push("start_date = $start_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('person', $id) SET {} \
             WHERE tenant_id = $tenant_id; {SELECT_PERSON}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(job_title) = input.job_title {
            builder = builder.bind(("job_title", job_title));
        }
        if let Some(stage) = input.stage {
            builder = builder
                .bind(("stage", stage.as_str()))
                .bind(("person_type", PersonType::for_stage(stage).as_str()));
        }
        if let Some(nationality) = input.nationality {
            builder = builder.bind(("nationality", nationality));
        }
        if let Some(requires_nmc) = input.requires_nmc {
            builder = builder.bind(("requires_nmc", requires_nmc));
        }
        if let Some(start_date) = input.start_date {
            builder = builder.bind(("start_date", start_date.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PersonRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "person", &id_str)?.try_into_person()?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> NovumResult<PaginatedResult<Person>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM person \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM person \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY last_name ASC, first_name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PersonRow::try_into_person)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_all(&self, tenant_id: Uuid) -> NovumResult<Vec<Person>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM person \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY last_name ASC, first_name ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let persons = rows
            .into_iter()
            .map(PersonRow::try_into_person)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(persons)
    }
}
