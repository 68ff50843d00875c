use std::sync::Arc;

use crate::config::AppConfig;

pub mod alerts;
pub mod chat;
pub mod dashboard;
pub mod documents;
pub mod export;
pub mod file_store;

use chat::{ChatResponder, DocumentDigestResponder};
use documents::{DocumentProcessor, FileInspector};
use export::RendererRegistry;
use file_store::{FileStore, LocalFileStore};

/// The pluggable collaborators behind document processing, chat and export.
#[derive(Clone)]
pub struct ServiceRegistry {
    pub files: Arc<dyn FileStore>,
    pub processor: Arc<dyn DocumentProcessor>,
    pub responder: Arc<dyn ChatResponder>,
    pub renderers: RendererRegistry,
    pub export_dir: String,
}

impl ServiceRegistry {
    /// Built-in collaborators over the given file store.
    pub fn new(files: Arc<dyn FileStore>, export_dir: impl Into<String>) -> Self {
        Self {
            files,
            processor: Arc::new(FileInspector),
            responder: Arc::new(DocumentDigestResponder),
            renderers: RendererRegistry::with_defaults(),
            export_dir: export_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(LocalFileStore::new(config.storage_root.clone())),
            config.export_dir.clone(),
        )
    }
}
