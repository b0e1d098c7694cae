//! File-based storage for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::format;
use crate::page::PageSnapshot;
use std::fs;
use std::path::PathBuf;

/// Extension used for stored documents.
const DOCUMENT_EXTENSION: &str = "ilf";

/// File-based storage keeping one interchange-format file per document.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if
    /// it does not exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("failed to create storage directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// File path for a document name, sanitized for the filesystem.
    fn document_path(&self, name: &str) -> PathBuf {
        let safe_name: String = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path
            .join(format!("{safe_name}.{DOCUMENT_EXTENSION}"))
    }
}

impl Storage for FileStorage {
    fn save(&self, name: &str, pages: &[PageSnapshot]) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(name);
        let raw = match format::write(pages) {
            Ok(raw) => raw,
            Err(e) => return Box::pin(async move { Err(e.into()) }),
        };

        Box::pin(async move {
            fs::write(&path, raw)
                .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<Vec<PageSnapshot>>> {
        let path = self.document_path(name);
        let name_owned = name.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(name_owned));
            }

            let raw = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))?;

            format::read(&raw).map_err(|e| {
                StorageError::Serialization(format!("failed to parse {}: {e}", path.display()))
            })
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(name);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("failed to read directory: {e}")))?;

            let mut names = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                let is_document = path
                    .extension()
                    .map(|e| e == DOCUMENT_EXTENSION)
                    .unwrap_or(false);
                if !is_document {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
            Ok(names)
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(name);
        Box::pin(async move { Ok(path.exists()) })
    }
}
