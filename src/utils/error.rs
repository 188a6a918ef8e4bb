// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not read source document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Text extraction failed: {0}")]
    TextExtraction(String), // pdf-extract reports its errors as OutputError

    #[error("Extraction task did not complete: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Region marker not found: {marker:?}")]
    RegionNotFound { marker: String },

    #[error("Unsupported table identifier: {0} (expected 30, 31 or 32)")]
    UnsupportedTable(u32),

    #[error("Table {table}: {codes} codes but {descriptions} descriptions after cleanup")]
    ColumnMismatch {
        table: u32,
        codes: usize,
        descriptions: usize,
    },

    #[error("Table {table}: expected {expected} rows, found {found}")]
    IncompleteTable {
        table: u32,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive task did not complete: {0}")]
    Task(String),

    #[error("Invalid compression level {0} (expected 0-9)")]
    InvalidLevel(u32),

    #[error("Not produced by this run: {0}")]
    MissingEntry(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Reading the document failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
