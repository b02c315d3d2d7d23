mod routes;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use nyaya_agent::GeminiBackend;
use nyaya_core::{
    catalog::RightsCatalog,
    config::Config,
    guidance::{GuidanceOrchestrator, RetryPolicy},
    model::ModelBackend,
};
use tracing::info;

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub catalog: Arc<RightsCatalog>,
    pub guidance: GuidanceOrchestrator,
    pub start_time: Instant,
}

fn load_catalog(config: &Config) -> anyhow::Result<RightsCatalog> {
    let catalog = match &config.rights_library_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read rights library {path}"))?;
            RightsCatalog::from_json(&json)?
        },
        None => nyaya_domains::seed_catalog()?,
    };
    Ok(catalog)
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nyaya_server=info,nyaya_core=info,nyaya_agent=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    info!(?config, "configuration loaded");

    let catalog = load_catalog(&config)?;
    info!(
        records = catalog.len(),
        source = config.rights_library_path.as_deref().unwrap_or("built-in"),
        "rights library loaded"
    );

    let backend: Arc<dyn ModelBackend> = Arc::new(
        GeminiBackend::new(&config.google_api_key, &config.model)
            .with_base_url(&config.gemini_base_url)
            .with_json_mode(config.model_json_mode)
            .with_timeout(config.model_timeout_s),
    );
    info!(backend = %backend.name(), "model backend ready");

    let guidance = GuidanceOrchestrator::new(backend)
        .with_timeout(config.model_timeout())
        .with_retry(RetryPolicy {
            max_retries: config.model_max_retries,
            backoff: config.retry_backoff(),
        });

    let state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        guidance,
        start_time: Instant::now(),
    });

    let app = routes::router(state);

    let addr = config.web_addr();
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
