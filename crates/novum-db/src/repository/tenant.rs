//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::models::tenant::{CreateTenant, Tenant, TenantSettings, UpdateTenant};
use novum_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_or_not_found, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TenantRow {
    record_id: String,
    name: String,
    slug: String,
    active: bool,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let settings: TenantSettings = serde_json::from_value(self.settings)
            .map_err(|e| DbError::InvalidRow(format!("invalid tenant settings: {e}")))?;
        Ok(Tenant {
            id: parse_uuid("tenant", &self.record_id)?,
            name: self.name,
            slug: self.slug,
            active: self.active,
            settings,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn settings_value(settings: &TenantSettings) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(settings)
        .map_err(|e| DbError::InvalidRow(format!("unserializable tenant settings: {e}")))
}

const SELECT_TENANT: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('tenant', $id)";

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> NovumResult<Tenant> {
        let id_str = Uuid::new_v4().to_string();
        let settings = settings_value(&input.settings.unwrap_or_default())?;

        let result = self
            .db
            .query(format!(
                "CREATE type::record('tenant', $id) SET \
                 name = $name, slug = $slug, active = true, \
                 settings = $settings; {SELECT_TENANT}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("settings", settings))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "tenant", &id_str)?.try_into_tenant()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NovumResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_TENANT)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "tenant", &id_str)?.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> NovumResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        if input.settings.is_some() {
            sets.push("settings = $settings");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tenant', $id) SET {}; {SELECT_TENANT}",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }
        if let Some(settings) = input.settings {
            builder = builder.bind(("settings", settings_value(&settings)?));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "tenant", &id_str)?.try_into_tenant()?)
    }

    async fn list_active(&self) -> NovumResult<Vec<Tenant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE active = true ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let tenants = rows
            .into_iter()
            .map(TenantRow::try_into_tenant)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tenants)
    }
}
