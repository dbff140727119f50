pub mod stripe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Booking context carried through the hosted checkout and echoed back on
/// the completed session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutMetadata {
    #[serde(default)]
    pub booking_id: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub service_image: String,
    #[serde(default)]
    pub user_email: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub metadata: CheckoutMetadata,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// State of a checkout session as reported by the gateway.
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub id: String,
    /// Gateway transaction id; absent until the customer has paid.
    pub payment_intent: Option<String>,
    pub payment_status: String,
    pub amount_total: i64,
    pub currency: String,
    pub metadata: CheckoutMetadata,
}

impl SessionDetails {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Checkout session ids are opaque tokens of ASCII letters, digits and `_`.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, req: &CheckoutRequest) -> anyhow::Result<CheckoutSession>;

    async fn retrieve_session(&self, session_id: &str) -> anyhow::Result<SessionDetails>;
}
