use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_cupos_api::config::Config;
use rust_cupos_api::handlers::{self, AppState};
use rust_cupos_api::loader::TableLoader;
use rust_cupos_api::planner::PipelineConfig;
use rust_cupos_api::table_cache::TableCache;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, reads the dataset once and serves
/// lookups over HTTP. A dataset that cannot be loaded stops the process before
/// any request is accepted.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_cupos_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let loader = TableLoader::connect(&config.data_source).await?;
    let tables = TableCache::new(loader, config.table_ttl);

    // Fail fast: the lookup core is never invoked without a dataset
    if let Err(e) = tables.table().await {
        tracing::error!("Failed to load dataset: {}", e);
        return Err(anyhow::anyhow!("dataset unavailable: {}", e));
    }

    let app_state = Arc::new(AppState {
        tables,
        pipeline: PipelineConfig::default(),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    let app = handlers::router(app_state)
        .layer(
            ServiceBuilder::new()
                // Lookup bodies are tiny
                .layer(RequestBodyLimitLayer::new(64 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
