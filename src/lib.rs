pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, redis::RedisHandle, state::AppState, telemetry};
use crate::services::extraction::{DatalabExtractor, DocumentExtractor, UnavailableExtractor};

fn build_extractor(settings: &Settings) -> anyhow::Result<Arc<dyn DocumentExtractor>> {
    if !settings.extraction().is_configured() {
        tracing::warn!("DATALAB_API_KEY not configured; corrections will use simulated text");
        return Ok(Arc::new(UnavailableExtractor));
    }

    let extractor = DatalabExtractor::from_settings(settings.extraction())?;
    tracing::info!(
        base_url = %settings.extraction().base_url,
        mode = %settings.extraction().mode,
        "Document extraction client ready"
    );
    Ok(Arc::new(extractor))
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let redis = RedisHandle::new(settings.redis().redis_url());
    if let Err(err) = redis.connect().await {
        tracing::error!(error = %err, "Failed to connect to Redis; login rate limiting disabled");
    } else {
        tracing::info!("Redis connected successfully");
    }

    let extractor = build_extractor(&settings)?;
    let state = AppState::new(settings, db_pool, redis.clone(), extractor);

    if let Err(err) = core::bootstrap::ensure_superuser(&state).await {
        tracing::error!(error = %err, "Failed to ensure default superuser");
    }

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Exam correction API listening"
    );

    let service = axum::ServiceExt::<axum::extract::Request>::into_make_service(app);
    let result = axum::serve(listener, service)
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await;

    redis.disconnect().await;
    tracing::info!("Redis disconnected");

    result?;

    Ok(())
}
