use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Frontend origin used to build checkout success/cancel redirects.
    pub client_url: String,
    pub stripe_secret_key: String,
    pub stripe_api_url: String,
    pub firebase_api_key: String,
    /// Reject unparseable booking prices at completion instead of paying a zero commission.
    pub strict_price: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "decor.db".to_string()),
            client_url: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_api_url: env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string()),
            firebase_api_key: env::var("FIREBASE_API_KEY").unwrap_or_default(),
            strict_price: env::var("STRICT_PRICE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}
