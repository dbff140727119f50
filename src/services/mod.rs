pub mod checkout;
pub mod identity;
pub mod lifecycle;
pub mod payment;
pub mod tracking;
