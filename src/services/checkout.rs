use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{Payment, RawPrice};
use crate::services::lifecycle::new_record_id;
use crate::services::payment::{
    is_valid_session_id, CheckoutMetadata, CheckoutRequest, CheckoutSession,
};
use crate::services::tracking::generate_tracking_id;
use crate::state::AppState;

pub const CURRENCY: &str = "usd";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    pub price: Option<RawPrice>,
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

pub fn amount_in_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

pub async fn start_checkout(state: &AppState, input: CheckoutInput) -> Result<CheckoutSession, AppError> {
    let price = input
        .price
        .as_ref()
        .and_then(RawPrice::as_number)
        .filter(|p| *p > 0.0)
        .ok_or_else(|| AppError::Validation("price must be a positive number".to_string()))?;

    let client_url = state.config.client_url.trim_end_matches('/');
    let req = CheckoutRequest {
        amount_cents: amount_in_cents(price),
        currency: CURRENCY.to_string(),
        metadata: CheckoutMetadata {
            booking_id: input.booking_id,
            service_id: input.service_id,
            service_name: input.service_name,
            service_image: input.service_image,
            user_email: input.user_email,
        },
        success_url: format!(
            "{client_url}/dashboard/payment-success?session_id={{CHECKOUT_SESSION_ID}}"
        ),
        cancel_url: format!("{client_url}/dashboard/payment-cancel"),
    };

    let session = state.payments.create_checkout_session(&req).await?;
    tracing::info!(
        session_id = %session.id,
        booking_id = %req.metadata.booking_id,
        amount_cents = req.amount_cents,
        "checkout session created"
    );
    Ok(session)
}

#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// First report of this transaction: payment written, booking marked paid.
    Recorded(Payment),
    /// The transaction was already on the ledger; carries the stored record.
    AlreadyProcessed(Payment),
}

/// Records a finished checkout at most once per gateway transaction id, no
/// matter how often the success callback is replayed.
pub async fn record_payment_completion(
    state: &AppState,
    session_id: &str,
) -> Result<PaymentOutcome, AppError> {
    if !is_valid_session_id(session_id) {
        return Err(AppError::Validation("Invalid session_id".to_string()));
    }

    let session = state.payments.retrieve_session(session_id).await?;

    if !session.is_paid() {
        return Err(AppError::Validation(format!(
            "Checkout session {} is not paid (status: {})",
            session.id, session.payment_status
        )));
    }

    let transactional_id = session
        .payment_intent
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Checkout session has no payment intent".to_string()))?;

    let now = Utc::now();
    let payment = Payment {
        id: new_record_id(),
        transactional_id,
        customer_email: session.metadata.user_email,
        currency: session.currency,
        amount: session.amount_total as f64 / 100.0,
        payment_status: session.payment_status,
        booking_id: session.metadata.booking_id,
        service_id: session.metadata.service_id,
        service_name: session.metadata.service_name,
        service_image: session.metadata.service_image,
        tracking_id: generate_tracking_id(now),
        paid_at: now.naive_utc(),
    };

    // Ledger row and booking flip commit together; a failed booking update
    // leaves no payment behind, so the callback can simply be retried.
    let outcome = db::call(&state.db, move |conn| {
        let tx = conn
            .unchecked_transaction()
            .context("failed to begin payment transaction")?;
        if queries::insert_payment_if_absent(&tx, &payment)? {
            let updated = queries::mark_booking_paid(&tx, &payment.booking_id, &payment.tracking_id)?;
            tx.commit().context("failed to commit payment")?;
            if updated == 0 {
                tracing::warn!(
                    booking_id = %payment.booking_id,
                    "payment recorded but booking was missing or already paid"
                );
            }
            Ok(PaymentOutcome::Recorded(payment))
        } else {
            let existing = queries::get_payment_by_transaction(&tx, &payment.transactional_id)?
                .context("payment missing after conflicting insert")?;
            Ok(PaymentOutcome::AlreadyProcessed(existing))
        }
    })
    .await?;

    match &outcome {
        PaymentOutcome::Recorded(p) => tracing::info!(
            transactional_id = %p.transactional_id,
            tracking_id = %p.tracking_id,
            booking_id = %p.booking_id,
            "payment recorded"
        ),
        PaymentOutcome::AlreadyProcessed(p) => tracing::info!(
            transactional_id = %p.transactional_id,
            "duplicate payment completion ignored"
        ),
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_in_cents_rounds() {
        assert_eq!(amount_in_cents(500.0), 50000);
        assert_eq!(amount_in_cents(19.99), 1999);
    }
}
