use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use ripple_api::AppStateInner;
use ripple_api::email::EmailClient;
use ripple_api::security::TokenService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("RIPPLE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("RIPPLE_DB_PATH").unwrap_or_else(|_| "ripple.db".into());
    let host = std::env::var("RIPPLE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("RIPPLE_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;
    let base_url =
        std::env::var("RIPPLE_BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

    // Init database
    let db = ripple_db::Database::open(&PathBuf::from(&db_path))?;

    let email = EmailClient::from_env();
    if email.is_none() {
        warn!("MAILTRAP_API_URL/MAILTRAP_API_KEY not set, sign-up emails are disabled");
    }

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        tokens: TokenService::new(&jwt_secret),
        email,
        base_url,
    });

    let app = ripple_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Ripple server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
