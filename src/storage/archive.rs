// src/storage/archive.rs
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use crate::utils::error::ArchiveError;

/// Zip archive being assembled from files already on disk
pub struct ArchiveWriter {
    path: PathBuf,
    zip: ZipWriter<BufWriter<File>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ArchiveWriter {
    /// Creates (or truncates) the archive file. Level 0 stores entries, 1-9 deflates them.
    pub fn create(path: &Path, level: u32) -> Result<Self, ArchiveError> {
        let options = match level {
            0 => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            1..=9 => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level))),
            other => return Err(ArchiveError::InvalidLevel(other)),
        };

        let file = File::create(path)?;
        tracing::debug!("Created archive {} (level {})", path.display(), level);

        Ok(Self {
            path: path.to_path_buf(),
            zip: ZipWriter::new(BufWriter::new(file)),
            options,
            entries: 0,
        })
    }

    /// Copies a file into the archive under `entry_name`
    pub fn add_entry(&mut self, source_path: &Path, entry_name: &str) -> Result<(), ArchiveError> {
        let contents = std::fs::read(source_path)?;

        self.zip.start_file(entry_name, self.options)?;
        self.zip.write_all(&contents)?;
        self.entries += 1;

        tracing::debug!("Added {} ({} bytes) as '{}'", source_path.display(), contents.len(), entry_name);
        Ok(())
    }

    /// Writes the central directory and flushes the file
    pub fn finalize(self) -> Result<PathBuf, ArchiveError> {
        let mut writer = self.zip.finish()?;
        writer.flush()?;

        tracing::info!("Archive {} finalized with {} entries", self.path.display(), self.entries);
        Ok(self.path)
    }
}

/// Builds a complete archive from `(source_path, entry_name)` pairs on the blocking pool.
pub async fn build_archive(
    path: PathBuf,
    level: u32,
    entries: Vec<(PathBuf, String)>,
) -> Result<PathBuf, ArchiveError> {
    tokio::task::spawn_blocking(move || {
        let mut writer = ArchiveWriter::create(&path, level)?;
        for (source, name) in &entries {
            writer.add_entry(source, name)?;
        }
        writer.finalize()
    })
    .await
    .map_err(|e| ArchiveError::Task(e.to_string()))?
}
