use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::json;
use thiserror::Error;

use crate::models::{Document, JsonRecord};
use crate::services::file_store::FileStore;

/// What a processor learned about a document. `None` fields leave the stored
/// values untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingOutcome {
    pub summary: Option<String>,
    pub extracted_text: Option<String>,
    pub metadata: Option<JsonRecord>,
}

impl ProcessingOutcome {
    /// Changeset marking the document processed with whatever the processor supplied.
    pub fn into_changeset(self, now: DateTime<Utc>) -> DocumentProcessed {
        DocumentProcessed {
            processed: true,
            summary: self.summary,
            extracted_text: self.extracted_text,
            metadata: self.metadata,
            updated_at: now,
        }
    }
}

#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::documents)]
pub struct DocumentProcessed {
    pub processed: bool,
    pub summary: Option<String>,
    pub extracted_text: Option<String>,
    pub metadata: Option<JsonRecord>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("document {0} has no stored file")]
    MissingFile(i32),

    #[error("{processor} cannot handle {file_type} documents")]
    Unsupported {
        processor: &'static str,
        file_type: String,
    },

    #[error("file store error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Turns an uploaded document into processed state.
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process(
        &self,
        document: &Document,
        store: &dyn FileStore,
    ) -> Result<ProcessingOutcome, ProcessingError>;
}

/// Checks the stored file against what the upload declared and records the
/// result under `metadata.inspection`. No content is extracted.
pub struct FileInspector;

#[async_trait]
impl DocumentProcessor for FileInspector {
    fn name(&self) -> &'static str {
        "file_inspector"
    }

    async fn process(
        &self,
        document: &Document,
        store: &dyn FileStore,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        let stored_size = store
            .size(&document.file_path)
            .await?
            .ok_or(ProcessingError::MissingFile(document.id))?;

        let declared = u64::try_from(document.file_size).unwrap_or_default();
        if stored_size != declared {
            log::warn!(
                "Document {} declares {} bytes but {} are stored",
                document.id,
                declared,
                stored_size
            );
        }

        let mut metadata = document.metadata.clone().unwrap_or_default();
        metadata.insert(
            "inspection",
            json!({
                "processor": self.name(),
                "stored_size": stored_size,
                "size_matches": stored_size == declared,
                "file_type": document.file_type.as_str(),
            }),
        );

        Ok(ProcessingOutcome {
            summary: None,
            extracted_text: None,
            metadata: Some(metadata),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::services::file_store::LocalFileStore;
    use chrono::Utc;

    fn document(file_path: &str, file_size: i64) -> Document {
        let now = Utc::now();
        Document {
            id: 9,
            user_id: 1,
            filename: "f81d4fae.txt".to_string(),
            original_filename: "outage-notes.txt".to_string(),
            file_type: DocumentType::Txt,
            file_size,
            file_path: file_path.to_string(),
            processed: false,
            summary: Some("kept".to_string()),
            extracted_text: None,
            metadata: Some(serde_json::from_str(r#"{"uploader": "web"}"#).unwrap()),
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_rt::test]
    async fn test_inspection_records_stored_size() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        store.write("uploads/notes.txt", b"line one\nline two\n").await.unwrap();

        let outcome = FileInspector
            .process(&document("uploads/notes.txt", 18), &store)
            .await
            .unwrap();

        assert!(outcome.summary.is_none());
        assert!(outcome.extracted_text.is_none());
        let metadata = outcome.metadata.unwrap();
        assert_eq!(metadata.get("uploader").unwrap(), "web");
        let inspection = metadata.get("inspection").unwrap();
        assert_eq!(inspection["stored_size"], 18);
        assert_eq!(inspection["size_matches"], true);
    }

    #[actix_rt::test]
    async fn test_size_mismatch_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        store.write("uploads/notes.txt", b"abc").await.unwrap();

        let outcome = FileInspector
            .process(&document("uploads/notes.txt", 10), &store)
            .await
            .unwrap();
        let metadata = outcome.metadata.unwrap();
        assert_eq!(metadata.get("inspection").unwrap()["size_matches"], false);
    }

    #[test]
    fn test_changeset_keeps_absent_fields_unset() {
        let now = Utc::now();
        let changes = ProcessingOutcome {
            summary: Some("Three feeders tripped".to_string()),
            ..Default::default()
        }
        .into_changeset(now);

        assert!(changes.processed);
        assert_eq!(changes.summary.as_deref(), Some("Three feeders tripped"));
        assert!(changes.extracted_text.is_none());
        assert!(changes.metadata.is_none());
        assert_eq!(changes.updated_at, now);
    }

    #[actix_rt::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        let err = FileInspector
            .process(&document("uploads/gone.txt", 10), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::MissingFile(9)));
    }
}
