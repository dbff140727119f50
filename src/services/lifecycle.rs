//! Booking lifecycle: the delivery state machine, decorator assignment and
//! actions, and the commission paid out on completion.
//!
//! ```text
//! pending --(payment confirmed)--> pending-pickup
//! pending-pickup --(decorator assigned)--> assigned
//! assigned --(decorator accepts)--> accepted-decorator
//! accepted-decorator --(decorator completes)--> completed
//! ```
//!
//! Every function here is pure; handlers read the booking, ask for a plan,
//! then apply it with writes guarded on the status the plan was built from.

use chrono::NaiveDateTime;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Booking, DeliveryStatus, NewBooking, PaymentStatus, RawPrice, UserStatus};

/// Share of the booking price credited to the decorator.
pub const COMMISSION_RATE: f64 = 0.10;

pub const SUPPORTED_ACTIONS: &str = "accept, completed";

impl DeliveryStatus {
    /// The only status a booking may move to `self` from.
    pub fn predecessor(&self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::Pending => None,
            DeliveryStatus::PendingPickup => Some(DeliveryStatus::Pending),
            DeliveryStatus::Assigned => Some(DeliveryStatus::PendingPickup),
            DeliveryStatus::AcceptedDecorator => Some(DeliveryStatus::Assigned),
            DeliveryStatus::Completed => Some(DeliveryStatus::AcceptedDecorator),
        }
    }

    /// One step forward, or a repeat of the current status so that an
    /// interrupted two-write operation can be re-run.
    pub fn can_advance_to(&self, next: DeliveryStatus) -> bool {
        *self == next || next.predecessor() == Some(*self)
    }
}

pub fn check_transition(from: DeliveryStatus, to: DeliveryStatus) -> Result<(), AppError> {
    if from.can_advance_to(to) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Cannot move booking from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

pub fn is_valid_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Builds a fresh booking: unpaid, pending, no decorator. The referenced
/// service is not looked up.
pub fn new_booking(input: NewBooking, now: NaiveDateTime) -> Result<Booking, AppError> {
    let service_id = required(input.service_id, "serviceId")?;
    let user_email = required(input.user_email, "userEmail")?;
    let price = input
        .price
        .filter(|p| !p.as_str().trim().is_empty())
        .ok_or_else(|| AppError::Validation("price is required".to_string()))?;

    Ok(Booking {
        id: new_record_id(),
        user_email,
        user_name: input.user_name,
        service_id,
        service_name: input.service_name,
        service_image: input.service_image,
        price,
        booking_date: input.booking_date,
        location: input.location,
        payment_status: PaymentStatus::Unpaid,
        delivery_status: DeliveryStatus::Pending,
        decorator_id: None,
        decorator_name: None,
        decorator_email: None,
        tracking_id: None,
        decorator_cost: None,
        created_at: now,
        assigned_at: None,
        accepted_at: None,
        completed_at: None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorAssignment {
    pub decorator_id: Option<String>,
    pub decorator_name: Option<String>,
    pub decorator_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl DecoratorAssignment {
    pub fn validate(self) -> Result<Decorator, AppError> {
        let missing = || AppError::Validation("Decorator info missing".to_string());
        let id = self.decorator_id.filter(|v| !v.is_empty()).ok_or_else(missing)?;
        let name = self.decorator_name.filter(|v| !v.is_empty()).ok_or_else(missing)?;
        let email = self.decorator_email.filter(|v| !v.is_empty()).ok_or_else(missing)?;

        if !is_valid_id(&id) {
            return Err(AppError::Validation("Invalid decorator ID".to_string()));
        }

        Ok(Decorator { id, name, email })
    }
}

/// Assignment is allowed once the booking is waiting for pickup, and may be
/// repeated while it is still only assigned.
pub fn check_assignment(booking: &Booking) -> Result<(), AppError> {
    check_transition(booking.delivery_status, DeliveryStatus::Assigned)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorAction {
    Accept,
    Completed,
}

impl DecoratorAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(DecoratorAction::Accept),
            "completed" => Some(DecoratorAction::Completed),
            _ => None,
        }
    }

    pub fn target(&self) -> DeliveryStatus {
        match self {
            DecoratorAction::Accept => DeliveryStatus::AcceptedDecorator,
            DecoratorAction::Completed => DeliveryStatus::Completed,
        }
    }

    /// Status mirrored onto the decorator's user record.
    pub fn decorator_status(&self) -> UserStatus {
        match self {
            DecoratorAction::Accept => UserStatus::AcceptedService,
            DecoratorAction::Completed => UserStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionPlan {
    pub decorator_id: String,
    pub from: DeliveryStatus,
    pub target: DeliveryStatus,
    pub decorator_status: UserStatus,
    pub decorator_cost: Option<f64>,
}

/// 10% of the booking price, read from its leading number. A price with no
/// leading number pays 0 unless `strict`.
pub fn decorator_cost(price: &RawPrice, strict: bool) -> Result<f64, AppError> {
    match price.leading_number() {
        Some(p) => Ok(p * COMMISSION_RATE),
        None if strict => Err(AppError::Validation(format!(
            "Booking price {:?} is not a number",
            price.as_str()
        ))),
        None => Ok(0.0),
    }
}

pub fn plan_decorator_action(
    booking: &Booking,
    action: Option<&str>,
    strict_price: bool,
) -> Result<ActionPlan, AppError> {
    let decorator_id = booking
        .decorator_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("No decorator assigned to this booking".to_string()))?;

    if !is_valid_id(&decorator_id) {
        return Err(AppError::Validation(
            "Invalid decorator ID associated with booking".to_string(),
        ));
    }

    let action = action.and_then(DecoratorAction::parse).ok_or_else(|| {
        AppError::InvalidInput(format!("Invalid action. Supported actions: {SUPPORTED_ACTIONS}"))
    })?;

    let target = action.target();
    check_transition(booking.delivery_status, target)?;

    let decorator_cost = match action {
        DecoratorAction::Completed => Some(decorator_cost(&booking.price, strict_price)?),
        DecoratorAction::Accept => None,
    };

    Ok(ActionPlan {
        decorator_id,
        from: booking.delivery_status,
        target,
        decorator_status: action.decorator_status(),
        decorator_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DeliveryStatus; 5] = [
        DeliveryStatus::Pending,
        DeliveryStatus::PendingPickup,
        DeliveryStatus::Assigned,
        DeliveryStatus::AcceptedDecorator,
        DeliveryStatus::Completed,
    ];

    fn rank(s: DeliveryStatus) -> usize {
        ALL.iter().position(|x| *x == s).unwrap()
    }

    fn booking_in(status: DeliveryStatus, price: &str) -> Booking {
        let mut booking = new_booking(
            NewBooking {
                service_id: Some("svc-1".to_string()),
                user_email: Some("alice@example.com".to_string()),
                price: Some(RawPrice(price.to_string())),
                ..Default::default()
            },
            chrono::Utc::now().naive_utc(),
        )
        .unwrap();
        booking.delivery_status = status;
        if status != DeliveryStatus::Pending && status != DeliveryStatus::PendingPickup {
            booking.decorator_id = Some(new_record_id());
            booking.decorator_email = Some("deco@example.com".to_string());
        }
        booking
    }

    #[test]
    fn test_transitions_never_go_backward() {
        for from in ALL {
            for to in ALL {
                if from.can_advance_to(to) {
                    assert!(rank(to) == rank(from) || rank(to) == rank(from) + 1, "{from:?} -> {to:?}");
                }
            }
        }
    }

    #[test]
    fn test_each_forward_edge_allowed() {
        for pair in ALL.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]));
            assert!(!pair[1].can_advance_to(pair[0]));
        }
        assert!(!DeliveryStatus::Pending.can_advance_to(DeliveryStatus::Assigned));
        assert!(!DeliveryStatus::PendingPickup.can_advance_to(DeliveryStatus::Completed));
    }

    #[test]
    fn test_new_booking_defaults() {
        let booking = booking_in(DeliveryStatus::Pending, "500");
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.delivery_status, DeliveryStatus::Pending);
        assert!(booking.decorator_email.is_none());
        assert!(booking.decorator_cost.is_none());
        assert!(is_valid_id(&booking.id));
    }

    #[test]
    fn test_new_booking_requires_service() {
        let err = new_booking(
            NewBooking {
                user_email: Some("alice@example.com".to_string()),
                price: Some(RawPrice("500".to_string())),
                ..Default::default()
            },
            chrono::Utc::now().naive_utc(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("serviceId")));
    }

    #[test]
    fn test_commission_is_ten_percent() {
        assert_eq!(decorator_cost(&RawPrice("500".to_string()), false).unwrap(), 50.0);
        let cost = decorator_cost(&RawPrice(" 1234.5 ".to_string()), false).unwrap();
        assert!((cost - 123.45).abs() < 1e-9);
        assert_eq!(decorator_cost(&RawPrice("500 BDT".to_string()), false).unwrap(), 50.0);
        assert_eq!(decorator_cost(&RawPrice("500 BDT".to_string()), true).unwrap(), 50.0);
    }

    #[test]
    fn test_unparseable_price_pays_zero() {
        assert_eq!(decorator_cost(&RawPrice("call us".to_string()), false).unwrap(), 0.0);
        assert_eq!(decorator_cost(&RawPrice("NaN".to_string()), false).unwrap(), 0.0);
        assert!(decorator_cost(&RawPrice("call us".to_string()), true).is_err());
    }

    #[test]
    fn test_accept_plan() {
        let booking = booking_in(DeliveryStatus::Assigned, "500");
        let plan = plan_decorator_action(&booking, Some("accept"), false).unwrap();
        assert_eq!(plan.target, DeliveryStatus::AcceptedDecorator);
        assert_eq!(plan.decorator_status, UserStatus::AcceptedService);
        assert_eq!(plan.decorator_cost, None);
        assert_eq!(plan.from, DeliveryStatus::Assigned);
    }

    #[test]
    fn test_completed_plan_frees_decorator() {
        let booking = booking_in(DeliveryStatus::AcceptedDecorator, "500");
        let plan = plan_decorator_action(&booking, Some("completed"), false).unwrap();
        assert_eq!(plan.target, DeliveryStatus::Completed);
        assert_eq!(plan.decorator_status, UserStatus::Active);
        assert_eq!(plan.decorator_cost, Some(50.0));
    }

    #[test]
    fn test_unknown_action_names_supported_ones() {
        let booking = booking_in(DeliveryStatus::Assigned, "500");
        let err = plan_decorator_action(&booking, Some("foo"), false).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m.contains("accept, completed")));
        assert!(plan_decorator_action(&booking, None, false).is_err());
    }

    #[test]
    fn test_action_without_decorator() {
        let booking = booking_in(DeliveryStatus::PendingPickup, "500");
        let err = plan_decorator_action(&booking, Some("accept"), false).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_action_with_malformed_decorator_id() {
        let mut booking = booking_in(DeliveryStatus::Assigned, "500");
        booking.decorator_id = Some("not-an-id".to_string());
        let err = plan_decorator_action(&booking, Some("accept"), false).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("Invalid decorator ID")));
    }

    #[test]
    fn test_complete_before_accept_rejected() {
        let booking = booking_in(DeliveryStatus::Assigned, "500");
        assert!(plan_decorator_action(&booking, Some("completed"), false).is_err());
    }

    #[test]
    fn test_assignment_requires_paid_booking() {
        assert!(check_assignment(&booking_in(DeliveryStatus::Pending, "500")).is_err());
        assert!(check_assignment(&booking_in(DeliveryStatus::PendingPickup, "500")).is_ok());
        assert!(check_assignment(&booking_in(DeliveryStatus::Assigned, "500")).is_ok());
        assert!(check_assignment(&booking_in(DeliveryStatus::Completed, "500")).is_err());
    }

    #[test]
    fn test_assignment_payload_validation() {
        let missing = DecoratorAssignment {
            decorator_id: Some(new_record_id()),
            decorator_name: None,
            decorator_email: Some("deco@example.com".to_string()),
        };
        assert!(matches!(missing.validate(), Err(AppError::Validation(_))));

        let bad_id = DecoratorAssignment {
            decorator_id: Some("123".to_string()),
            decorator_name: Some("Deco".to_string()),
            decorator_email: Some("deco@example.com".to_string()),
        };
        assert!(bad_id.validate().is_err());
    }
}
