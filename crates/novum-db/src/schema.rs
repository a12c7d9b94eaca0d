//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs and calendar dates
//! (`YYYY-MM-DD`) are stored as strings; enums are stored as snake_case
//! strings with ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "compliance_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD active ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD settings ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

-- =======================================================================
-- Persons (tenant scope)
-- =======================================================================
DEFINE TABLE person SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE person TYPE string;
DEFINE FIELD first_name ON TABLE person TYPE string;
DEFINE FIELD last_name ON TABLE person TYPE string;
DEFINE FIELD email ON TABLE person TYPE option<string>;
DEFINE FIELD job_title ON TABLE person TYPE option<string>;
DEFINE FIELD person_type ON TABLE person TYPE string \
    ASSERT $value IN ['applicant', 'candidate', 'new_hire', 'employee', \
    'former_employee'];
DEFINE FIELD stage ON TABLE person TYPE string \
    ASSERT $value IN ['application', 'pre_employment', 'onboarding', \
    'ongoing', 'offboarding'];
DEFINE FIELD nationality ON TABLE person TYPE option<string>;
DEFINE FIELD requires_nmc ON TABLE person TYPE bool DEFAULT false;
DEFINE FIELD start_date ON TABLE person TYPE option<string>;
DEFINE FIELD created_at ON TABLE person TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE person TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_person_tenant ON TABLE person COLUMNS tenant_id;

-- =======================================================================
-- Compliance documents (tenant scope)
-- =======================================================================
DEFINE TABLE compliance_document SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE compliance_document TYPE string;
DEFINE FIELD person_id ON TABLE compliance_document TYPE string;
DEFINE FIELD document_type_id ON TABLE compliance_document \
    TYPE option<string>;
DEFINE FIELD authority ON TABLE compliance_document TYPE option<string>;
DEFINE FIELD suggested_type_id ON TABLE compliance_document \
    TYPE option<string>;
DEFINE FIELD file_name ON TABLE compliance_document TYPE string;
DEFINE FIELD file_path ON TABLE compliance_document TYPE option<string>;
DEFINE FIELD issue_date ON TABLE compliance_document TYPE option<string>;
DEFINE FIELD expiry_date ON TABLE compliance_document TYPE option<string>;
DEFINE FIELD review_status ON TABLE compliance_document TYPE string \
    ASSERT $value IN ['uploaded', 'verified', 'rejected', 'unclassified'];
DEFINE FIELD expiry_status ON TABLE compliance_document \
    TYPE option<string>;
DEFINE FIELD confidence ON TABLE compliance_document TYPE option<int>;
DEFINE FIELD version ON TABLE compliance_document TYPE int DEFAULT 1;
DEFINE FIELD is_current ON TABLE compliance_document TYPE bool \
    DEFAULT true;
DEFINE FIELD review_notes ON TABLE compliance_document \
    TYPE option<string>;
DEFINE FIELD metadata ON TABLE compliance_document TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD uploaded_at ON TABLE compliance_document TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD verified_at ON TABLE compliance_document \
    TYPE option<datetime>;
DEFINE INDEX idx_document_person ON TABLE compliance_document \
    COLUMNS tenant_id, person_id;
DEFINE INDEX idx_document_person_type ON TABLE compliance_document \
    COLUMNS tenant_id, person_id, document_type_id;

-- =======================================================================
-- Training records (tenant scope)
-- =======================================================================
DEFINE TABLE training_record SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE training_record TYPE string;
DEFINE FIELD person_id ON TABLE training_record TYPE string;
DEFINE FIELD course_id ON TABLE training_record TYPE string;
DEFINE FIELD completed_on ON TABLE training_record TYPE string;
DEFINE FIELD expiry_date ON TABLE training_record TYPE option<string>;
DEFINE FIELD certificate_ref ON TABLE training_record TYPE option<string>;
DEFINE FIELD created_at ON TABLE training_record TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_training_person ON TABLE training_record \
    COLUMNS tenant_id, person_id;

-- =======================================================================
-- Right-to-work checks (tenant scope)
-- =======================================================================
DEFINE TABLE right_to_work_check SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE right_to_work_check TYPE string;
DEFINE FIELD person_id ON TABLE right_to_work_check TYPE string;
DEFINE FIELD check_type ON TABLE right_to_work_check TYPE string \
    ASSERT $value IN ['manual', 'online', 'employer_checking_service'];
DEFINE FIELD checked_on ON TABLE right_to_work_check TYPE string;
DEFINE FIELD outcome ON TABLE right_to_work_check TYPE string \
    ASSERT $value IN ['continuous', 'time_limited', 'failed'];
DEFINE FIELD next_check_date ON TABLE right_to_work_check \
    TYPE option<string>;
DEFINE FIELD notes ON TABLE right_to_work_check TYPE option<string>;
DEFINE FIELD created_at ON TABLE right_to_work_check TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_rtw_person ON TABLE right_to_work_check \
    COLUMNS tenant_id, person_id;

-- =======================================================================
-- Compliance tasks (tenant scope)
-- =======================================================================
DEFINE TABLE compliance_task SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE compliance_task TYPE string;
DEFINE FIELD person_id ON TABLE compliance_task TYPE string;
DEFINE FIELD source ON TABLE compliance_task TYPE string \
    ASSERT $value IN ['document', 'right_to_work', 'training'];
DEFINE FIELD source_id ON TABLE compliance_task TYPE string;
DEFINE FIELD item_type ON TABLE compliance_task TYPE option<string>;
DEFINE FIELD task_type ON TABLE compliance_task TYPE string \
    ASSERT $value IN ['document_expiring', 'document_expired', \
    'training_renewal', 'right_to_work_recheck'];
DEFINE FIELD title ON TABLE compliance_task TYPE string;
DEFINE FIELD description ON TABLE compliance_task TYPE option<string>;
DEFINE FIELD urgency ON TABLE compliance_task TYPE string \
    ASSERT $value IN ['critical', 'high', 'medium', 'low'];
DEFINE FIELD status ON TABLE compliance_task TYPE string \
    ASSERT $value IN ['pending', 'done'];
DEFINE FIELD assigned_role ON TABLE compliance_task TYPE string;
DEFINE FIELD due_date ON TABLE compliance_task TYPE option<string>;
DEFINE FIELD escalation_level ON TABLE compliance_task TYPE int \
    DEFAULT 0;
DEFINE FIELD last_escalated_at ON TABLE compliance_task \
    TYPE option<datetime>;
DEFINE FIELD closed_reason ON TABLE compliance_task TYPE option<string>;
DEFINE FIELD created_at ON TABLE compliance_task TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD completed_at ON TABLE compliance_task TYPE option<datetime>;
DEFINE INDEX idx_task_tenant_status ON TABLE compliance_task \
    COLUMNS tenant_id, status;
DEFINE INDEX idx_task_source ON TABLE compliance_task \
    COLUMNS tenant_id, source, source_id;

-- =======================================================================
-- Notifications (tenant scope)
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE notification TYPE string;
DEFINE FIELD person_id ON TABLE notification TYPE option<string>;
DEFINE FIELD task_id ON TABLE notification TYPE option<string>;
DEFINE FIELD kind ON TABLE notification TYPE string;
DEFINE FIELD urgency ON TABLE notification TYPE string \
    ASSERT $value IN ['critical', 'high', 'medium', 'low'];
DEFINE FIELD recipient_roles ON TABLE notification TYPE array<string> \
    DEFAULT [];
DEFINE FIELD title ON TABLE notification TYPE string;
DEFINE FIELD message ON TABLE notification TYPE string;
DEFINE FIELD read ON TABLE notification TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_notification_tenant ON TABLE notification \
    COLUMNS tenant_id;

-- =======================================================================
-- User profiles (tenant scope)
-- =======================================================================
DEFINE TABLE user_profile SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user_profile TYPE string;
DEFINE FIELD full_name ON TABLE user_profile TYPE string;
DEFINE FIELD email ON TABLE user_profile TYPE option<string>;
DEFINE FIELD role ON TABLE user_profile TYPE string \
    ASSERT $value IN ['admin', 'hr_manager', 'compliance_officer', \
    'registered_manager', 'operations_manager', 'employee'];
DEFINE FIELD created_at ON TABLE user_profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_profile_tenant_role ON TABLE user_profile \
    COLUMNS tenant_id, role;

-- =======================================================================
-- Audit log (tenant scope, append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE audit_log TYPE string;
DEFINE FIELD actor_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD actor_type ON TABLE audit_log TYPE string \
    ASSERT $value IN ['user', 'system'];
DEFINE FIELD action ON TABLE audit_log TYPE string;
DEFINE FIELD entity_type ON TABLE audit_log TYPE string;
DEFINE FIELD entity_id ON TABLE audit_log TYPE option<string>;
DEFINE FIELD metadata ON TABLE audit_log TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_tenant_time ON TABLE audit_log \
    COLUMNS tenant_id, timestamp;
";

/// Apply every migration newer than the recorded schema version.
///
/// Safe to call on every start-up.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query("CREATE _migration SET version = $version, name = $name")
                .bind(("version", migration.version))
                .bind(("name", migration.name))
                .await?
                .check()
                .map_err(|e| {
                    DbError::Migration(format!(
                        "Failed to record migration v{}: {}",
                        migration.version, e,
                    ))
                })?;

            info!(version = migration.version, "Migration applied");
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
