//! SurrealDB repository implementations.

mod audit;
mod document;
mod notification;
mod person;
mod right_to_work;
mod task;
mod tenant;
mod training;
mod user_profile;

pub use audit::SurrealAuditLogRepository;
pub use document::SurrealDocumentRepository;
pub use notification::SurrealNotificationRepository;
pub use person::SurrealPersonRepository;
pub use right_to_work::SurrealRightToWorkRepository;
pub use task::SurrealTaskRepository;
pub use tenant::SurrealTenantRepository;
pub use training::SurrealTrainingRepository;
pub use user_profile::SurrealUserProfileRepository;

use chrono::NaiveDate;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub total: u64,
}

pub(crate) fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::InvalidRow(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_opt_uuid(field: &str, s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|s| parse_uuid(field, &s)).transpose()
}

pub(crate) fn parse_date(field: &str, s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbError::InvalidRow(format!("invalid {field} date '{s}': {e}")))
}

pub(crate) fn parse_opt_date(field: &str, s: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    s.map(|s| parse_date(field, &s)).transpose()
}

pub(crate) fn parse_enum<T>(field: &str, s: &str, parse: fn(&str) -> Option<T>) -> Result<T, DbError> {
    parse(s).ok_or_else(|| DbError::InvalidRow(format!("unknown {field}: {s}")))
}

pub(crate) fn date_str(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

/// First row of a result, or `NotFound`.
pub(crate) fn first_or_not_found<T>(rows: Vec<T>, entity: &str, id: &str) -> Result<T, DbError> {
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: entity.into(),
        id: id.into(),
    })
}
