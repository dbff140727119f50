use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppJson;
use crate::auth::AuthUser;
use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::Payment;
use crate::services::checkout::{self, CheckoutInput, PaymentOutcome};
use crate::state::AppState;

// POST /create-checkout-session
pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CheckoutInput>,
) -> Result<Json<Value>, AppError> {
    let session = checkout::start_checkout(&state, body).await?;
    Ok(Json(json!({ "url": session.url })))
}

// PATCH /payment-success?session_id=...
#[derive(Deserialize)]
pub struct PaymentSuccessQuery {
    pub session_id: Option<String>,
}

pub async fn payment_success(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentSuccessQuery>,
) -> Result<Json<Value>, AppError> {
    let session_id = query
        .session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("session_id is required".to_string()))?;

    let body = match checkout::record_payment_completion(&state, &session_id).await? {
        PaymentOutcome::Recorded(payment) => json!({
            "success": true,
            "trackingId": payment.tracking_id,
            "transactionalId": payment.transactional_id,
            "paymentInfo": payment,
        }),
        PaymentOutcome::AlreadyProcessed(payment) => json!({
            "success": false,
            "message": "Payment already exists",
            "trackingId": payment.tracking_id,
            "transactionalId": payment.transactional_id,
        }),
    };
    Ok(Json(body))
}

// GET /payments
#[derive(Deserialize)]
pub struct PaymentsQuery {
    pub email: Option<String>,
}

pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<PaymentsQuery>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments = db::call(&state.db, move |conn| {
        queries::list_payments(conn, query.email.as_deref())
    })
    .await?;
    Ok(Json(payments))
}
