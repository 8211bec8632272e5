mod config;
mod db;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use services::mailer::{Mailer, ResendMailer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasknest=info,tower_http=info")))
        .init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    if let Some(seed) = &config.admin_seed {
        if let Err(e) = services::admin::seed_admin(&pool, seed).await {
            tracing::warn!(error = %e, "bootstrap admin not seeded");
        }
    }

    // Initialize mailer (non-fatal: reset tokens are still issued without it).
    let mailer: Option<Arc<dyn Mailer>> = match ResendMailer::from_env() {
        Some(m) => {
            tracing::info!("Resend mailer initialized");
            Some(Arc::new(m))
        }
        None => {
            tracing::warn!("RESEND_API_KEY/RESEND_FROM not set; password reset emails disabled");
            None
        }
    };

    let port = config.port;
    let state = state::AppState::new(pool, config, mailer);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "tasknest listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}
