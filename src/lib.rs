// Library exports for the binary and integration tests
pub mod config;
pub mod errors;
pub mod export;
pub mod generation;
pub mod ingestion;
pub mod llm;
pub mod models;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;
