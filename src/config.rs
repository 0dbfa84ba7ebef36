use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub upload: UploadConfig,
    pub chunking: ChunkingConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built frontend bundle served for non-API paths
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Remote embedding provider. When `base_url` is unset the local hashing embedder is used.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_upload_size_mb: usize,
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: usize,    // characters
    pub chunk_overlap: usize, // characters
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_seconds: u64, // 0 = never evict
    pub sweep_interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                static_dir: None,
            },
            llm: LlmConfig {
                api_key: String::new(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "llama-3.1-8b-instant".to_string(),
            },
            embedding: EmbeddingConfig {
                base_url: None,
                api_key: None,
                model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            },
            upload: UploadConfig {
                max_upload_size_mb: 50,
                upload_dir: env::temp_dir(),
            },
            chunking: ChunkingConfig {
                chunk_size: 1000,
                chunk_overlap: 200,
            },
            session: SessionConfig {
                ttl_seconds: 86_400,
                sweep_interval_seconds: 300,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .context("Failed to parse PORT")?,
                static_dir: env::var("STATIC_DIR").ok().map(PathBuf::from),
            },
            llm: LlmConfig {
                api_key: env::var("LLM_API_KEY")
                    .or_else(|_| env::var("GROQ_API_KEY"))
                    .context("LLM_API_KEY (or GROQ_API_KEY) must be set")?,
                base_url: env::var("LLM_BASE_URL").unwrap_or(defaults.llm.base_url),
                model: env::var("LLM_MODEL").unwrap_or(defaults.llm.model),
            },
            embedding: EmbeddingConfig {
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                api_key: env::var("EMBEDDING_API_KEY").ok(),
                model: env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding.model),
            },
            upload: UploadConfig {
                max_upload_size_mb: env::var("MAX_UPLOAD_SIZE_MB")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .context("Failed to parse MAX_UPLOAD_SIZE_MB")?,
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.upload.upload_dir),
            },
            chunking: ChunkingConfig {
                chunk_size: env::var("CHUNK_SIZE")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .context("Failed to parse CHUNK_SIZE")?,
                chunk_overlap: env::var("CHUNK_OVERLAP")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()
                    .context("Failed to parse CHUNK_OVERLAP")?,
            },
            session: SessionConfig {
                ttl_seconds: env::var("SESSION_TTL_SECONDS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .context("Failed to parse SESSION_TTL_SECONDS")?,
                sweep_interval_seconds: env::var("SESSION_SWEEP_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .context("Failed to parse SESSION_SWEEP_INTERVAL_SECONDS")?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            anyhow::bail!("CHUNK_SIZE must be greater than zero");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            anyhow::bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunking.chunk_overlap,
                self.chunking.chunk_size
            );
        }
        if self.session.ttl_seconds > 0 && self.session.sweep_interval_seconds == 0 {
            anyhow::bail!("SESSION_SWEEP_INTERVAL_SECONDS must be greater than zero");
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.upload.max_upload_size_mb * 1024 * 1024
    }
}
