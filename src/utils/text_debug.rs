// src/utils/text_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::utils::error::StorageError;

/// Saves plain text to a file with the given byte ranges wrapped in `[[label>>` ... `<<label]]`
pub fn save_debug_text(text: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), StorageError> {
    let mut file = File::create(path)?;

    let mut annotated = String::with_capacity(text.len() + highlights.len() * 24);
    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    for (start, end, label) in sorted_highlights {
        // Overlapping ranges would split a marker; keep the earlier one
        if start < last_pos {
            tracing::trace!("Skipping overlapping highlight '{}' at {}-{}", label, start, end);
            continue;
        }

        annotated.push_str(&text[last_pos..start]);
        annotated.push_str(&format!("[[{}>>", label));
        annotated.push_str(&text[start..end]);
        annotated.push_str(&format!("<<{}]]", label));

        last_pos = end;
    }

    // Add any remaining content
    annotated.push_str(&text[last_pos..]);

    file.write_all(annotated.as_bytes())?;

    tracing::info!("Saved debug text to {}", path.display());
    Ok(())
}

/// Creates an annotated copy of the document text with every occurrence of the given literal markers highlighted
pub fn create_debug_text(text: &str, path: &Path, markers: &[(&str, &str)]) -> Result<(), StorageError> {
    let mut highlights = Vec::new();

    for (marker, label) in markers {
        let mut occurrences = 0;
        for (start, matched) in text.match_indices(marker) {
            highlights.push((start, start + matched.len(), *label));
            occurrences += 1;
        }
        tracing::debug!("Marker '{}' occurs {} times", marker, occurrences);
    }

    save_debug_text(text, path, &highlights)
}
