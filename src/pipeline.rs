// src/pipeline.rs
use std::path::PathBuf;

use crate::document::models::{DocumentText, TableId};
use crate::extractors::{TableExtractor, DESCRIPTION_HEADER, SOURCE_MARKER};
use crate::storage::archive;
use crate::storage::StorageManager;
use crate::utils::error::{AppError, ArchiveError};
use crate::utils::text_debug;

/// Resolved settings for one export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub source_pdf: PathBuf,
    pub output_dir: PathBuf,
    pub archive_path: PathBuf,
    pub compression_level: u32,
    pub create_archive: bool,
    pub debug: bool,
}

/// Outcome of exporting a single table
#[derive(Debug)]
pub struct TableReport {
    pub table: TableId,
    pub outcome: Result<PathBuf, AppError>,
}

/// Everything a run produced or failed to produce
#[derive(Debug, Default)]
pub struct RunReport {
    pub tables: Vec<TableReport>,
    pub archive: Option<Result<PathBuf, ArchiveError>>,
}

impl RunReport {
    pub fn succeeded_tables(&self) -> usize {
        self.tables.iter().filter(|t| t.outcome.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        let table_failures = self.tables.len() - self.succeeded_tables();
        let archive_failure = matches!(self.archive, Some(Err(_))) as usize;
        table_failures + archive_failure
    }

    pub fn log_summary(&self) {
        for report in &self.tables {
            match &report.outcome {
                Ok(path) => tracing::info!("{}: saved {}", report.table, path.display()),
                Err(e) => tracing::error!("{}: failed: {}", report.table, e),
            }
        }
        match &self.archive {
            Some(Ok(path)) => tracing::info!("Archive saved: {}", path.display()),
            Some(Err(e)) => tracing::error!("Archive failed: {}", e),
            None => tracing::info!("Archive step skipped"),
        }
        tracing::info!(
            "Processing finished. Tables: {}/{}, failures: {}",
            self.succeeded_tables(),
            self.tables.len(),
            self.failure_count()
        );
    }
}

pub struct ExportPipeline {
    config: ExportConfig,
    document: DocumentText,
}

impl ExportPipeline {
    pub fn new(config: ExportConfig, document: DocumentText) -> Self {
        Self { config, document }
    }

    /// Exports every table to CSV in ascending order, then bundles the CSVs into the archive.
    /// Per-table and archive failures are recorded in the report and never stop the remaining steps.
    pub async fn run(&self) -> Result<RunReport, AppError> {
        let mut report = RunReport::default();

        // Without an output directory no table can be written
        let storage = StorageManager::new(&self.config.output_dir)?;

        if self.config.debug {
            self.write_debug_artifacts(&storage);
        }

        let extractor = TableExtractor::new(self.document.as_str());
        for table in TableId::ALL {
            let outcome = self.export_table(&extractor, &storage, table).await;
            if let Err(e) = &outcome {
                tracing::error!("Failed to export {}: {}", table, e);
                // A CSV from an earlier run must not pass for this run's output
                if let Err(e) = storage.remove_table_csv(table).await {
                    tracing::warn!("Could not remove previous output for {}: {}", table, e);
                }
            }
            report.tables.push(TableReport { table, outcome });
        }

        if self.config.create_archive {
            let result = self.archive_tables(&report).await;

            if let Err(e) = &result {
                tracing::error!("Failed to create archive {}: {}", self.config.archive_path.display(), e);
            }
            report.archive = Some(result);
        }

        Ok(report)
    }

    /// Bundles the CSVs produced by this run; any failed table fails the archive.
    async fn archive_tables(&self, report: &RunReport) -> Result<PathBuf, ArchiveError> {
        let mut entries = Vec::with_capacity(report.tables.len());
        for table_report in &report.tables {
            match &table_report.outcome {
                Ok(path) => entries.push((path.clone(), table_report.table.file_name())),
                Err(_) => return Err(ArchiveError::MissingEntry(table_report.table.file_name())),
            }
        }

        archive::build_archive(
            self.config.archive_path.clone(),
            self.config.compression_level,
            entries,
        )
        .await
    }

    async fn export_table(
        &self,
        extractor: &TableExtractor<'_>,
        storage: &StorageManager,
        id: TableId,
    ) -> Result<PathBuf, AppError> {
        let table = extractor.get_table(id.number())?;
        let path = storage.save_table_csv(&table).await?;

        if let Err(e) = storage.save_table_metadata(&table, &self.config.source_pdf).await {
            tracing::warn!("Failed to save metadata for {}: {}", id, e);
        }

        Ok(path)
    }

    fn write_debug_artifacts(&self, storage: &StorageManager) {
        let text = self.document.as_str();

        if let Err(e) = storage.save_debug_file("document.txt", text) {
            tracing::warn!("Failed to save debug document text: {}", e);
        }

        let mut markers: Vec<(&str, &str)> = TableId::ALL
            .iter()
            .map(|id| (id.start_marker(), "start"))
            .collect();
        markers.push((DESCRIPTION_HEADER, "header"));
        markers.push((SOURCE_MARKER, "end"));

        match storage.debug_dir() {
            Ok(dir) => {
                if let Err(e) = text_debug::create_debug_text(text, &dir.join("document_annotated.txt"), &markers) {
                    tracing::warn!("Failed to create annotated debug text: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to create debug directory: {}", e),
        }

        let extractor = TableExtractor::new(text);
        for id in TableId::ALL {
            match extractor.region(id) {
                Ok(region) => {
                    if let Err(e) = storage.save_debug_file(&format!("region_{}.txt", id.number()), &region) {
                        tracing::warn!("Failed to save region for {}: {}", id, e);
                    }
                }
                Err(e) => tracing::warn!("No region for {}: {}", id, e),
            }
        }
    }
}
