use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ingestion::{chunk_text, extract_text, Chunk, ChunkConfig};

/// Extract and chunk one saved upload.
///
/// Extraction failures are logged and treated as "no text": the file then
/// contributes zero chunks and the caller decides whether the batch survives.
pub fn create_chunks(path: &Path, filename: &str, config: &ChunkConfig) -> Vec<Chunk> {
    let text = match extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(filename = %filename, "Failed to extract text: {:#}", e);
            return Vec::new();
        }
    };

    let chunks = chunk_text(&text, config, filename, path);
    tracing::debug!(
        filename = %filename,
        chars = text.len(),
        chunks = chunks.len(),
        "Chunked uploaded file"
    );
    chunks
}

/// Run [`create_chunks`] on the blocking pool; PDF and DOCX parsing are CPU bound.
///
/// A parser panic on a malformed document counts as "no text" for that file.
pub async fn process_file(
    path: PathBuf,
    filename: String,
    config: ChunkConfig,
) -> Result<Vec<Chunk>> {
    let name = filename.clone();
    match tokio::task::spawn_blocking(move || create_chunks(&path, &filename, &config)).await {
        Ok(chunks) => Ok(chunks),
        Err(e) if e.is_panic() => {
            tracing::warn!(filename = %name, "Text extraction panicked; skipping file");
            Ok(Vec::new())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Chunking task was cancelled")),
    }
}

/// Temporary files written for one upload batch.
///
/// Files are deleted when the batch is dropped unless [`UploadBatch::keep`] was
/// called, so every early return from the upload handler cleans up after itself.
/// Cleanup is best-effort: failures are logged, not reported.
#[derive(Debug)]
pub struct UploadBatch {
    dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl UploadBatch {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
        }
    }

    /// Write `bytes` to a fresh file whose name ends in `.{extension}`
    pub fn save(&mut self, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create upload dir {}", self.dir.display()))?;

        let mut file = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.dir)
            .context("Failed to create temporary upload file")?;
        file.write_all(bytes)
            .context("Failed to write temporary upload file")?;

        let (_, path) = file.keep().context("Failed to persist temporary upload file")?;
        self.paths.push(path.clone());
        Ok(path)
    }

    /// Delete one file early, e.g. one that contributed no chunks
    pub fn discard(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
        remove_file_logged(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Hand the files over to the caller; they are no longer deleted on drop
    pub fn keep(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }
}

impl Drop for UploadBatch {
    fn drop(&mut self) {
        for path in &self.paths {
            remove_file_logged(path);
        }
    }
}

pub fn remove_file_logged(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "Failed to remove temporary file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_removes_files_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let mut batch = UploadBatch::new(dir.path());
            let path = batch.save("txt", b"hello").unwrap();
            assert!(path.exists());
            assert_eq!(path.extension().unwrap(), "txt");
            path
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_batch_leaves_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = UploadBatch::new(dir.path());
        batch.save("txt", b"one").unwrap();
        batch.save("md", b"two").unwrap();

        let paths = batch.keep();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_discard_removes_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = UploadBatch::new(dir.path());
        let first = batch.save("txt", b"one").unwrap();
        let second = batch.save("txt", b"two").unwrap();

        batch.discard(&first);
        assert!(!first.exists());
        assert_eq!(batch.paths(), &[second.clone()]);
        assert!(second.exists());
    }

    #[test]
    fn test_create_chunks_for_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = UploadBatch::new(dir.path());
        let path = batch.save("txt", b"Paris is the capital of France.").unwrap();

        let chunks = create_chunks(&path, "geo.txt", &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Paris is the capital of France.");
        assert_eq!(chunks[0].metadata.source, "geo.txt");
        assert_eq!(chunks[0].metadata.path, path);
    }

    #[test]
    fn test_create_chunks_swallows_extraction_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = UploadBatch::new(dir.path());
        let path = batch.save("pdf", b"not really a pdf").unwrap();

        assert!(create_chunks(&path, "broken.pdf", &ChunkConfig::default()).is_empty());
    }

    /// Single-page PDF whose content stream selects font F1 but whose page has
    /// no /Resources, which pdf-extract cannot resolve.
    fn pdf_with_missing_font() -> Vec<u8> {
        let content = "BT /F1 12 Tf 72 720 Td (Hello) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{:010} 00000 n \n", offset));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        pdf.extend_from_slice(tail.as_bytes());
        pdf
    }

    #[tokio::test]
    async fn test_process_file_survives_parser_panic() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = UploadBatch::new(dir.path());
        let path = batch.save("pdf", &pdf_with_missing_font()).unwrap();

        let chunks = process_file(path, "scan.pdf".to_string(), ChunkConfig::default())
            .await
            .unwrap();
        assert!(chunks.is_empty());
    }
}
