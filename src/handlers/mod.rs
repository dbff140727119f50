pub mod bookings;
pub mod catalog;
pub mod health;
pub mod payments;
pub mod users;

use axum::extract::FromRequest;

use crate::errors::AppError;
use crate::services::lifecycle;

/// JSON body extractor whose rejections use the app's error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

pub(crate) fn require_id(id: &str) -> Result<(), AppError> {
    if lifecycle::is_valid_id(id) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid id format: {id}")))
    }
}
