//! SurrealDB implementation of [`UserProfileRepository`].

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::models::user_profile::{CreateUserProfile, StaffRole, UserProfile};
use novum_core::repository::UserProfileRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_or_not_found, parse_enum, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProfileRow {
    record_id: String,
    tenant_id: String,
    full_name: String,
    email: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn try_into_profile(self) -> Result<UserProfile, DbError> {
        Ok(UserProfile {
            id: parse_uuid("user profile", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            full_name: self.full_name,
            email: self.email,
            role: parse_enum("role", &self.role, StaffRole::parse)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the user profile repository.
#[derive(Clone)]
pub struct SurrealUserProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserProfileRepository for SurrealUserProfileRepository<C> {
    async fn create(&self, input: CreateUserProfile) -> NovumResult<UserProfile> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user_profile', $id) SET \
                 tenant_id = $tenant_id, full_name = $full_name, \
                 email = $email, role = $role; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user_profile', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("full_name", input.full_name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "user_profile", &id_str)?.try_into_profile()?)
    }

    async fn list_by_roles(
        &self,
        tenant_id: Uuid,
        roles: &[StaffRole],
    ) -> NovumResult<Vec<UserProfile>> {
        let roles: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_profile \
                 WHERE tenant_id = $tenant_id AND role IN $roles \
                 ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("roles", roles))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let profiles = rows
            .into_iter()
            .map(ProfileRow::try_into_profile)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(profiles)
    }
}
