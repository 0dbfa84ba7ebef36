pub mod vector;

pub use vector::{cosine_similarity, SearchResult, VectorIndex};
