//! SurrealDB implementation of [`DocumentRepository`].
//!
//! Filing a document under a type supersedes the previous current
//! version of that (person, type): the old row keeps its data with
//! `is_current = false`, the new row gets the next version number.

use chrono::{DateTime, Utc};
use novum_core::error::NovumResult;
use novum_core::expiry::ExpiryStatus;
use novum_core::models::document::{
    ComplianceDocument, CreateDocument, ReviewDocument, ReviewStatus,
};
use novum_core::repository::DocumentRepository;
use novum_core::taxonomy::{self, Authority};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{date_str, first_or_not_found, parse_enum, parse_opt_date, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DocumentRow {
    record_id: String,
    tenant_id: String,
    person_id: String,
    document_type_id: Option<String>,
    authority: Option<String>,
    suggested_type_id: Option<String>,
    file_name: String,
    file_path: Option<String>,
    issue_date: Option<String>,
    expiry_date: Option<String>,
    review_status: String,
    expiry_status: Option<String>,
    confidence: Option<u32>,
    version: u32,
    is_current: bool,
    review_notes: Option<String>,
    metadata: serde_json::Value,
    uploaded_at: DateTime<Utc>,
    verified_at: Option<DateTime<Utc>>,
}

impl DocumentRow {
    fn try_into_document(self) -> Result<ComplianceDocument, DbError> {
        Ok(ComplianceDocument {
            id: parse_uuid("document", &self.record_id)?,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            person_id: parse_uuid("person", &self.person_id)?,
            document_type_id: self.document_type_id,
            authority: self
                .authority
                .map(|a| parse_enum("authority", &a, Authority::parse))
                .transpose()?,
            suggested_type_id: self.suggested_type_id,
            file_name: self.file_name,
            file_path: self.file_path,
            issue_date: parse_opt_date("issue", self.issue_date)?,
            expiry_date: parse_opt_date("expiry", self.expiry_date)?,
            review_status: parse_enum("review status", &self.review_status, ReviewStatus::parse)?,
            expiry_status: self
                .expiry_status
                .map(|s| parse_enum("expiry status", &s, ExpiryStatus::parse))
                .transpose()?,
            confidence: self.confidence.map(|c| c.min(100) as u8),
            version: self.version,
            is_current: self.is_current,
            review_notes: self.review_notes,
            metadata: self.metadata,
            uploaded_at: self.uploaded_at,
            verified_at: self.verified_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct VersionRow {
    version: u32,
}

fn authority_of(type_id: Option<&str>) -> Option<&'static str> {
    type_id
        .and_then(taxonomy::lookup)
        .map(|spec| spec.authority.as_str())
}

fn collect(rows: Vec<DocumentRow>) -> Result<Vec<ComplianceDocument>, DbError> {
    rows.into_iter().map(DocumentRow::try_into_document).collect()
}

const SELECT_DOCUMENT: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('compliance_document', $id) \
     WHERE tenant_id = $tenant_id";

/// SurrealDB implementation of the Document repository.
#[derive(Clone)]
pub struct SurrealDocumentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Mark the current version of (person, type) superseded and return
    /// the version number the next row should take.
    async fn supersede(
        &self,
        tenant_id: &str,
        person_id: &str,
        type_id: &str,
        except: Option<&str>,
    ) -> Result<u32, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT version FROM compliance_document \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 AND document_type_id = $type_id \
                 ORDER BY version DESC LIMIT 1; \
                 UPDATE compliance_document SET is_current = false \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 AND document_type_id = $type_id AND is_current = true \
                 AND meta::id(id) != $except",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .bind(("type_id", type_id.to_string()))
            .bind(("except", except.unwrap_or_default().to_string()))
            .await?
            .check()?;

        let rows: Vec<VersionRow> = result.take(0)?;
        let next = rows.first().map(|r| r.version + 1).unwrap_or(1);
        debug!(person_id, type_id, next, "Superseding current document version");
        Ok(next)
    }
}

impl<C: Connection> DocumentRepository for SurrealDocumentRepository<C> {
    async fn create(&self, input: CreateDocument) -> NovumResult<ComplianceDocument> {
        let id_str = Uuid::new_v4().to_string();
        let tenant_id_str = input.tenant_id.to_string();
        let person_id_str = input.person_id.to_string();

        let version = match input.document_type_id.as_deref() {
            Some(type_id) => {
                self.supersede(&tenant_id_str, &person_id_str, type_id, None)
                    .await?
            }
            None => 1,
        };
        let authority = authority_of(input.document_type_id.as_deref());
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(format!(
                "CREATE type::record('compliance_document', $id) SET \
                 tenant_id = $tenant_id, person_id = $person_id, \
                 document_type_id = $document_type_id, authority = $authority, \
                 suggested_type_id = $suggested_type_id, \
                 file_name = $file_name, file_path = $file_path, \
                 issue_date = $issue_date, expiry_date = $expiry_date, \
                 review_status = $review_status, confidence = $confidence, \
                 version = $version, is_current = true, metadata = $metadata; \
                 {SELECT_DOCUMENT}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id_str))
            .bind(("person_id", person_id_str))
            .bind(("document_type_id", input.document_type_id))
            .bind(("authority", authority.map(str::to_string)))
            .bind(("suggested_type_id", input.suggested_type_id))
            .bind(("file_name", input.file_name))
            .bind(("file_path", input.file_path))
            .bind(("issue_date", date_str(input.issue_date)))
            .bind(("expiry_date", date_str(input.expiry_date)))
            .bind(("review_status", input.review_status.as_str()))
            .bind(("confidence", input.confidence.map(u32::from)))
            .bind(("version", version))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<DocumentRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "document", &id_str)?.try_into_document()?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> NovumResult<ComplianceDocument> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_DOCUMENT)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "document", &id_str)?.try_into_document()?)
    }

    async fn list_for_person(
        &self,
        tenant_id: Uuid,
        person_id: Uuid,
    ) -> NovumResult<Vec<ComplianceDocument>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM compliance_document \
                 WHERE tenant_id = $tenant_id AND person_id = $person_id \
                 ORDER BY uploaded_at DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("person_id", person_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_current(&self, tenant_id: Uuid) -> NovumResult<Vec<ComplianceDocument>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM compliance_document \
                 WHERE tenant_id = $tenant_id AND is_current = true \
                 ORDER BY uploaded_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn file(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        document_type_id: &str,
    ) -> NovumResult<ComplianceDocument> {
        let existing = self.get_by_id(tenant_id, id).await?;
        let id_str = id.to_string();
        let tenant_id_str = tenant_id.to_string();

        let version = self
            .supersede(
                &tenant_id_str,
                &existing.person_id.to_string(),
                document_type_id,
                Some(&id_str),
            )
            .await?;

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('compliance_document', $id) SET \
                 document_type_id = $document_type_id, authority = $authority, \
                 review_status = $review_status, version = $version, \
                 is_current = true WHERE tenant_id = $tenant_id; \
                 {SELECT_DOCUMENT}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id_str))
            .bind(("document_type_id", document_type_id.to_string()))
            .bind(("authority", authority_of(Some(document_type_id)).map(str::to_string)))
            .bind(("review_status", ReviewStatus::Uploaded.as_str()))
            .bind(("version", version))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<DocumentRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "document", &id_str)?.try_into_document()?)
    }

    async fn review(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: ReviewDocument,
        at: DateTime<Utc>,
    ) -> NovumResult<ComplianceDocument> {
        let id_str = id.to_string();
        let verified_at = (input.review_status == ReviewStatus::Verified).then_some(at);

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('compliance_document', $id) SET \
                 review_status = $review_status, review_notes = $review_notes, \
                 verified_at = $verified_at \
                 WHERE tenant_id = $tenant_id; {SELECT_DOCUMENT}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("review_status", input.review_status.as_str()))
            .bind(("review_notes", input.review_notes))
            .bind(("verified_at", verified_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<DocumentRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "document", &id_str)?.try_into_document()?)
    }

    async fn set_expiry_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: ExpiryStatus,
    ) -> NovumResult<()> {
        self.db
            .query(
                "UPDATE type::record('compliance_document', $id) \
                 SET expiry_status = $status WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("status", status.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }
}
