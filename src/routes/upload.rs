use std::path::{Path, PathBuf};

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::{
    errors::{AppError, Result},
    ingestion::{process_file, ChunkConfig, DocumentKind, UploadBatch},
    models::{FileInfo, UploadResponse},
    state::AppState,
};

const FILES_FIELD: &str = "files";

/// Accept a batch of documents and open a session over their chunks.
///
/// Every file is validated before any is chunked. A rejected batch leaves no
/// temporary files behind. Files that yield no text are reported with zero
/// chunks; the batch only fails when none of them yield any.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut batch = UploadBatch::new(&state.config.upload.upload_dir);
    let mut saved: Vec<(String, PathBuf)> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(AppError::BadRequest("All files must have filenames.".to_string())),
        };

        if DocumentKind::from_path(&filename).is_none() {
            return Err(AppError::BadRequest(format!(
                "Unsupported file type: {}",
                filename
            )));
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest(format!("File is empty: {}", filename)));
        }

        let path = batch.save(&extension_of(&filename), &bytes)?;
        tracing::debug!(filename = %filename, bytes = bytes.len(), "Saved upload");
        saved.push((filename, path));
    }

    if saved.is_empty() {
        return Err(AppError::BadRequest(
            "At least one file is required.".to_string(),
        ));
    }

    let chunk_config = ChunkConfig {
        chunk_size: state.config.chunking.chunk_size,
        overlap: state.config.chunking.chunk_overlap,
    };

    let mut files = Vec::with_capacity(saved.len());
    let mut filenames = Vec::new();
    let mut all_chunks = Vec::new();

    for (filename, path) in saved {
        let chunks = process_file(path.clone(), filename.clone(), chunk_config.clone()).await?;

        if chunks.is_empty() {
            tracing::warn!(filename = %filename, "No text extracted from upload");
            batch.discard(&path);
        } else {
            filenames.push(filename.clone());
        }

        files.push(FileInfo {
            filename,
            chunk_count: chunks.len(),
        });
        all_chunks.extend(chunks);
    }

    if all_chunks.is_empty() {
        return Err(AppError::Unprocessable(
            "Unable to extract text from any uploaded file.".to_string(),
        ));
    }

    let total_chunks = all_chunks.len();
    let file_id = state
        .sessions
        .create(batch.keep(), all_chunks, filenames);

    tracing::info!(
        session_id = %file_id,
        files = files.len(),
        total_chunks,
        "Upload processed"
    );

    Ok(Json(UploadResponse {
        file_id,
        files,
        total_chunks,
    }))
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("notes.TXT"), "txt");
        assert_eq!(extension_of("a.b.docx"), "docx");
        assert_eq!(extension_of("README"), "");
    }
}
