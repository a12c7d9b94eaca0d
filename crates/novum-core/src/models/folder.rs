//! Folder view: documents grouped by authority and subfolder.
//!
//! Folders are a presentation structure over the taxonomy, not storage.

use serde::{Deserialize, Serialize};

use crate::models::document::ComplianceDocument;
use crate::taxonomy::{Authority, FOLDER_STRUCTURE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceFolder {
    pub authority: Authority,
    pub name: String,
    pub sections: Vec<FolderSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderSection {
    pub id: String,
    pub name: String,
    pub documents: Vec<ComplianceDocument>,
}

/// Group current classified documents into the folder structure. A
/// document type listed in several subfolders appears in each.
pub fn group_into_folders(documents: &[ComplianceDocument]) -> Vec<ComplianceFolder> {
    FOLDER_STRUCTURE
        .iter()
        .map(|folder| ComplianceFolder {
            authority: folder.authority,
            name: folder.name.to_string(),
            sections: folder
                .subfolders
                .iter()
                .map(|sub| FolderSection {
                    id: sub.id.to_string(),
                    name: sub.name.to_string(),
                    documents: documents
                        .iter()
                        .filter(|d| d.is_current)
                        .filter(|d| {
                            d.document_type_id
                                .as_deref()
                                .is_some_and(|t| sub.documents.contains(&t))
                        })
                        .cloned()
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
