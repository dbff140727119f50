use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One completed gateway transaction. Append-only: never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub transactional_id: String,
    pub customer_email: String,
    pub currency: String,
    pub amount: f64,
    pub payment_status: String,
    pub booking_id: String,
    pub service_id: String,
    pub service_name: String,
    pub service_image: String,
    pub tracking_id: String,
    pub paid_at: NaiveDateTime,
}
