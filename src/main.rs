//! # Trade Journal — dashboard backend
//!
//! Serves the journal and statistics pages as JSON.  See [`trade_journal::routes`]
//! for the endpoint list and [`trade_journal::config`] for the environment
//! variables.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trade_journal::{config::Config, routes::router, state::build_state, store::open_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("trade_journal=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("📓 Trade Journal starting");

    // ── 3. Config + store ─────────────────────────────────────────────────────
    let config = Config::from_env()?;
    let store = open_store(&config).await?;
    if config.api_key.is_none() {
        info!("API_KEY not set — dashboard endpoints are open (dev mode)");
    }

    // ── 4. Router ─────────────────────────────────────────────────────────────
    let app = router(build_state(store, config.api_key.clone()));

    // ── 5. Bind & Serve ───────────────────────────────────────────────────────
    info!(addr = ?config.bind_addr, "🚀 dashboard listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
