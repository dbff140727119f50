use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use decor_booking::config::AppConfig;
use decor_booking::db;
use decor_booking::routes;
use decor_booking::services::identity::firebase::FirebaseIdentityVerifier;
use decor_booking::services::payment::stripe::StripeGateway;
use decor_booking::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.firebase_api_key.is_empty() {
        tracing::warn!("FIREBASE_API_KEY is not set; every authenticated request will be rejected");
    }
    if config.stripe_secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY is not set; checkout calls will fail");
    }
    if config.strict_price {
        tracing::info!("strict price mode: unparseable booking prices block completion");
    }

    let identity = FirebaseIdentityVerifier::new(config.firebase_api_key.clone());
    let payments = StripeGateway::new(
        config.stripe_secret_key.clone(),
        config.stripe_api_url.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        identity: Box::new(identity),
        payments: Box::new(payments),
    });

    let app = routes::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
