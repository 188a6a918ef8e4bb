// src/document/source.rs
use crate::document::models::DocumentText;
use crate::utils::error::DocumentError;
use std::path::Path;

/// Reads the source PDF and extracts its full plain text.
/// Parsing runs on the blocking pool since pdf-extract is synchronous and CPU bound.
pub async fn load_document(path: &Path) -> Result<DocumentText, DocumentError> {
    tracing::info!("Reading source document: {}", path.display());

    let bytes = tokio::fs::read(path).await.map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

    let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| DocumentError::Task(e.to_string()))??;

    tracing::info!("Extracted {} bytes of text", text.len());
    Ok(text)
}

/// Runs the PDF-to-text step over an in-memory document.
pub fn extract_text(bytes: &[u8]) -> Result<DocumentText, DocumentError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| DocumentError::TextExtraction(e.to_string()))?;
    Ok(DocumentText::new(text))
}
