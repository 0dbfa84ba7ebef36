use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_api::{
    config::Config,
    ingestion::{Embedder, HashingEmbedder, HttpEmbedder},
    llm::ChatCompletionsClient,
    routes,
    session::{self, expiry, SessionStore},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing/logging
    init_tracing();

    tracing::info!("Starting study API server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        "Loaded configuration: server={}:{}, model={}",
        config.server.host,
        config.server.port,
        config.llm.model
    );

    let llm = ChatCompletionsClient::from_config(&config.llm);

    let embedder: Arc<dyn Embedder> = match config.embedding.base_url.clone() {
        Some(base_url) => {
            tracing::info!("Using remote embeddings from {}", base_url);
            Arc::new(HttpEmbedder::new(
                base_url,
                config.embedding.api_key.clone(),
                config.embedding.model.clone(),
            ))
        }
        None => {
            tracing::warn!("EMBEDDING_BASE_URL not set - using local hashing embeddings");
            Arc::new(HashingEmbedder::default())
        }
    };

    let sessions = Arc::new(SessionStore::new(expiry::from_ttl_seconds(
        config.session.ttl_seconds,
    )));

    if config.session.ttl_seconds > 0 {
        session::spawn_eviction_task(
            sessions.clone(),
            Duration::from_secs(config.session.sweep_interval_seconds),
        );
        tracing::info!(
            "Sessions expire after {}s idle",
            config.session.ttl_seconds
        );
    } else {
        tracing::info!("Session expiry disabled");
    }

    // Create app state
    let state = AppState::new(config.clone(), sessions, Arc::new(llm), embedder);

    // Build router with middleware
    let app = routes::create_router(state).layer(
        ServiceBuilder::new()
            // Logging layer
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            // CORS layer
            .layer(CorsLayer::permissive())
            // Compression layer
            .layer(CompressionLayer::new()),
    );

    // Start server
    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "study_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
