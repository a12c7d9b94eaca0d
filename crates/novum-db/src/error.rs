//! Database-specific error types and conversions.

use novum_core::error::NovumError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid stored value: {0}")]
    InvalidRow(String),
}

impl From<DbError> for NovumError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => NovumError::NotFound { entity, id },
            other => NovumError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_its_variant() {
        let err: NovumError = DbError::NotFound {
            entity: "person".into(),
            id: "abc".into(),
        }
        .into();
        assert!(matches!(err, NovumError::NotFound { ref entity, .. } if entity == "person"));
    }

    #[test]
    fn other_errors_become_database() {
        let err: NovumError = DbError::InvalidRow("bad date".into()).into();
        assert!(matches!(err, NovumError::Database(_)));
    }
}
