use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub service_id: String,
    pub service_name: Option<String>,
    pub service_image: Option<String>,
    pub price: RawPrice,
    pub booking_date: Option<String>,
    pub location: Option<String>,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub decorator_id: Option<String>,
    pub decorator_name: Option<String>,
    pub decorator_email: Option<String>,
    pub tracking_id: Option<String>,
    pub decorator_cost: Option<f64>,
    pub created_at: NaiveDateTime,
    pub assigned_at: Option<NaiveDateTime>,
    pub accepted_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Unpaid,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    Pending,
    PendingPickup,
    Assigned,
    AcceptedDecorator,
    Completed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::PendingPickup => "pending-pickup",
            DeliveryStatus::Assigned => "assigned",
            DeliveryStatus::AcceptedDecorator => "accepted-decorator",
            DeliveryStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending-pickup" => DeliveryStatus::PendingPickup,
            "assigned" => DeliveryStatus::Assigned,
            "accepted-decorator" => DeliveryStatus::AcceptedDecorator,
            "completed" => DeliveryStatus::Completed,
            _ => DeliveryStatus::Pending,
        }
    }
}

/// Booking price exactly as the client submitted it. Clients send either a
/// JSON number or a string, and the commission rule has to see the original
/// text to decide whether it parses.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrice(pub String);

impl RawPrice {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_number(&self) -> Option<f64> {
        self.0.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Reads the longest decimal prefix and ignores whatever follows, so
    /// `"500 BDT"` is 500. `None` when the text does not start with a number.
    pub fn leading_number(&self) -> Option<f64> {
        let s = self.0.trim_start();
        let bytes = s.as_bytes();
        let digits_from = |mut i: usize| {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            i
        };

        let mut end = if matches!(bytes.first(), Some(b'+' | b'-')) { 1 } else { 0 };
        let int_end = digits_from(end);
        let mut has_digits = int_end > end;
        end = int_end;

        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits_from(end + 1);
            if frac_end > end + 1 || has_digits {
                has_digits |= frac_end > end + 1;
                end = frac_end;
            }
        }
        if !has_digits {
            return None;
        }

        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_end = digits_from(exp);
            if exp_end > exp {
                end = exp_end;
            }
        }

        s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl Serialize for RawPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Ok(whole) = self.0.trim().parse::<i64>() {
            return serializer.serialize_i64(whole);
        }
        match self.as_number() {
            Some(n) => serializer.serialize_f64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RawPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => Ok(RawPrice(n.to_string())),
            serde_json::Value::String(s) => Ok(RawPrice(s)),
            other => Err(serde::de::Error::custom(format!(
                "price must be a number or a string, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub service_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub service_name: Option<String>,
    pub service_image: Option<String>,
    pub price: Option<RawPrice>,
    pub booking_date: Option<String>,
    pub location: Option<String>,
}

/// Fields a customer may still change while the booking is unpaid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    pub user_name: Option<String>,
    pub booking_date: Option<String>,
    pub location: Option<String>,
    pub price: Option<RawPrice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
    pub email: Option<String>,
    pub payment_status: Option<String>,
    pub delivery_status: Option<String>,
}
