// src/storage/mod.rs
pub mod archive;

use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::document::models::{Table, TableId};
use crate::utils::error::StorageError;

pub const CSV_HEADER: &str = "Código, Descrição da categoria";

/// Renders a table as the `code, description` text the tool publishes.
/// Fields are not quoted: descriptions may contain commas, and readers split on the first ", ".
pub fn render_csv(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(table.rows().map(|(code, description)| format!("{}, {}", code, description)));
    lines.join("\n")
}

/// Sidecar describing one exported table
#[derive(Debug, Serialize)]
pub struct TableMetadata<'a> {
    pub table_number: u32,
    pub title: &'a str,
    pub csv_file: String,
    pub row_count: usize,
    pub source_document: String,
    pub extraction_timestamp: String,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified output directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the output directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path the CSV for a table is written to
    pub fn csv_path(&self, id: TableId) -> PathBuf {
        self.base_dir.join(id.file_name())
    }

    /// Deletes a table's CSV left over from an earlier run; a missing file is fine
    pub async fn remove_table_csv(&self, id: TableId) -> Result<(), StorageError> {
        let file_path = self.csv_path(id);
        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => {
                tracing::info!("Removed stale {}", file_path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// Writes the table as CSV, replacing any previous file
    pub async fn save_table_csv(&self, table: &Table) -> Result<PathBuf, StorageError> {
        let file_path = self.csv_path(table.id);

        tokio::fs::write(&file_path, render_csv(table))
            .await
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved {} as {}", table.id, file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the exported table in JSON format
    pub async fn save_table_metadata(&self, table: &Table, source: &Path) -> Result<PathBuf, StorageError> {
        let filename = format!("{}_meta.json", table.id.title());
        let file_path = self.base_dir.join(filename);

        let metadata = TableMetadata {
            table_number: table.id.number(),
            title: table.id.title(),
            csv_file: table.id.file_name(),
            row_count: table.len(),
            source_document: source.display().to_string(),
            extraction_timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        tokio::fs::write(&file_path, metadata_str)
            .await
            .map_err(StorageError::IoError)?;

        tracing::debug!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }

    /// Writes a debug artifact under `<output>/debug/`
    pub fn save_debug_file(&self, name: &str, contents: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.debug_dir()?.join(name);
        fs::write(&file_path, contents)?;
        tracing::info!("Saved debug file {}", file_path.display());
        Ok(file_path)
    }

    pub fn debug_dir(&self) -> Result<PathBuf, StorageError> {
        let dir = self.base_dir.join("debug");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
