use anyhow::Context;
use babysleep_dev_backend::config::{DevBackendConfig, ANON_KEY_VAR};
use babysleep_dev_backend::{create_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "babysleep_dev_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DevBackendConfig::from_env().context("Invalid dev backend configuration")?;
    let addr = config.addr;
    info!(
        "🔑 Frontend must be built with BABYSLEEP_BACKEND_URL=http://{} and BABYSLEEP_ANON_KEY matching {}",
        addr, ANON_KEY_VAR
    );
    info!("🌐 Allowing browser requests from {}", config.allowed_origin);

    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🚀 Dev backend listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
