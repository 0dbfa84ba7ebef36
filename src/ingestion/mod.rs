pub mod chunker;
pub mod embedder;
pub mod extractors;
pub mod processor;

pub use chunker::{chunk_text, Chunk, ChunkConfig, ChunkMetadata};
pub use embedder::{Embedder, HashingEmbedder, HttpEmbedder};
pub use extractors::{extract_docx_text, extract_pdf_text, extract_text, DocumentKind};
pub use processor::{create_chunks, process_file, UploadBatch};
