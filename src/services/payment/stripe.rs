use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{
    is_valid_session_id, CheckoutMetadata, CheckoutRequest, CheckoutSession, PaymentGateway,
    SessionDetails,
};

pub struct StripeGateway {
    secret_key: String,
    api_url: String,
    client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(secret_key: String, api_url: String) -> Self {
        Self {
            secret_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    payment_intent: Option<String>,
    payment_status: String,
    amount_total: Option<i64>,
    currency: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

fn metadata_pairs(prefix: &str, metadata: &CheckoutMetadata) -> Vec<(String, String)> {
    [
        ("bookingId", &metadata.booking_id),
        ("serviceId", &metadata.service_id),
        ("serviceName", &metadata.service_name),
        ("serviceImage", &metadata.service_image),
        ("userEmail", &metadata.user_email),
    ]
    .into_iter()
    .map(|(key, value)| (format!("{prefix}[{key}]"), value.clone()))
    .collect()
}

/// Flattens a checkout request into Stripe's bracketed form encoding.
fn checkout_form(req: &CheckoutRequest) -> Vec<(String, String)> {
    let item = "line_items[0]";
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        (format!("{item}[quantity]"), "1".to_string()),
        (format!("{item}[price_data][currency]"), req.currency.clone()),
        (format!("{item}[price_data][unit_amount]"), req.amount_cents.to_string()),
        (
            format!("{item}[price_data][product_data][name]"),
            req.metadata.service_name.clone(),
        ),
        ("success_url".to_string(), req.success_url.clone()),
        ("cancel_url".to_string(), req.cancel_url.clone()),
    ];
    form.extend(metadata_pairs(
        &format!("{item}[price_data][product_data][metadata]"),
        &req.metadata,
    ));
    form.extend(metadata_pairs("metadata", &req.metadata));
    form
}

impl StripeGateway {
    fn session_url(&self, session_id: &str) -> anyhow::Result<reqwest::Url> {
        if !is_valid_session_id(session_id) {
            anyhow::bail!("invalid checkout session id: {session_id:?}");
        }

        let mut url = reqwest::Url::parse(&self.api_url).context("invalid Stripe API url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Stripe API url cannot take a path"))?
            .pop_if_empty()
            .extend(["checkout", "sessions", session_id]);
        Ok(url)
    }

    async fn read_session(&self, resp: reqwest::Response) -> anyhow::Result<StripeSession> {
        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Stripe response")?;

        if !status.is_success() {
            anyhow::bail!("Stripe API error ({}): {}", status, data["error"]["message"]);
        }

        serde_json::from_value(data).context("unexpected Stripe session shape")
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(&self, req: &CheckoutRequest) -> anyhow::Result<CheckoutSession> {
        let resp = self
            .client
            .post(format!("{}/checkout/sessions", self.api_url))
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(req))
            .send()
            .await
            .context("failed to create Stripe checkout session")?;

        let session = self.read_session(resp).await?;
        let url = session
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe session {} has no redirect url", session.id))?;

        Ok(CheckoutSession { id: session.id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> anyhow::Result<SessionDetails> {
        let resp = self
            .client
            .get(self.session_url(session_id)?)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .context("failed to retrieve Stripe checkout session")?;

        let session = self.read_session(resp).await?;
        let field = |key: &str| session.metadata.get(key).cloned().unwrap_or_default();

        Ok(SessionDetails {
            metadata: CheckoutMetadata {
                booking_id: field("bookingId"),
                service_id: field("serviceId"),
                service_name: field("serviceName"),
                service_image: field("serviceImage"),
                user_email: field("userEmail"),
            },
            id: session.id,
            payment_intent: session.payment_intent,
            payment_status: session.payment_status,
            amount_total: session.amount_total.unwrap_or(0),
            currency: session.currency.unwrap_or_default(),
        })
    }
}
