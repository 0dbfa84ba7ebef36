use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Original filename as uploaded
    pub source: String,
    /// Temporary file the text was extracted from
    pub path: PathBuf,
}

/// A bounded slice of a document's text, tagged with its source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Configuration for text chunking
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    pub chunk_size: usize, // Characters per chunk
    pub overlap: usize,    // Characters carried over between chunks
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Separators tried in order, coarsest first. `""` splits into single characters.
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Split one document into overlapping windows tagged with `source` and `path`.
///
/// Returns no chunks when the text is empty or whitespace-only.
pub fn chunk_text(text: &str, config: &ChunkConfig, source: &str, path: &Path) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    split_recursive(text, SEPARATORS, config)
        .into_iter()
        .map(|content| Chunk {
            content,
            metadata: ChunkMetadata {
                source: source.to_string(),
                path: path.to_path_buf(),
            },
        })
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(text: &str, separators: &[&str], config: &ChunkConfig) -> Vec<String> {
    // Pick the first separator present in the text; "" always matches
    let (separator, finer) = separators
        .iter()
        .enumerate()
        .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
        .map(|(idx, sep)| (*sep, &separators[idx + 1..]))
        .unwrap_or(("", &[]));

    let pieces: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|piece| !piece.is_empty())
            .map(String::from)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for piece in pieces {
        if char_len(&piece) < config.chunk_size {
            pending.push(piece);
            continue;
        }

        if !pending.is_empty() {
            chunks.extend(merge_pieces(std::mem::take(&mut pending), separator, config));
        }

        if finer.is_empty() {
            chunks.push(piece.trim().to_string());
        } else {
            chunks.extend(split_recursive(&piece, finer, config));
        }
    }

    if !pending.is_empty() {
        chunks.extend(merge_pieces(pending, separator, config));
    }

    chunks.retain(|chunk| !chunk.is_empty());
    chunks
}

/// Greedily join small pieces into windows of at most `chunk_size` characters,
/// carrying up to `overlap` characters of trailing pieces into the next window.
fn merge_pieces(pieces: Vec<String>, separator: &str, config: &ChunkConfig) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut window: VecDeque<String> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(&piece);
        let joined_len = |total: usize, window: &VecDeque<String>| {
            total + len + if window.is_empty() { 0 } else { sep_len }
        };

        if joined_len(total, &window) > config.chunk_size && !window.is_empty() {
            push_window(&mut chunks, &window, separator);

            // Drop from the front until the carried-over tail fits the overlap budget
            while total > config.overlap
                || (joined_len(total, &window) > config.chunk_size && total > 0)
            {
                let Some(front) = window.pop_front() else {
                    break;
                };
                total -= char_len(&front) + if window.is_empty() { 0 } else { sep_len };
            }
        }

        total += len + if window.is_empty() { 0 } else { sep_len };
        window.push_back(piece);
    }

    push_window(&mut chunks, &window, separator);
    chunks
}

fn push_window(chunks: &mut Vec<String>, window: &VecDeque<String>, separator: &str) {
    let joined = window
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
