use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{require_id, AppJson};
use crate::auth::AuthUser;
use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{
    Booking, BookingFilter, BookingUpdate, DeleteResult, InsertResult, NewBooking, PaymentStatus,
    UpdateResult, UserStatus,
};
use crate::services::lifecycle::{self, DecoratorAssignment};
use crate::state::AppState;

async fn load_booking(state: &AppState, id: &str) -> Result<Booking, AppError> {
    let id = id.to_string();
    db::call(&state.db, move |conn| queries::get_booking(conn, &id))
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

fn status_changed(booking: &Booking) -> AppError {
    AppError::Validation(format!(
        "Booking {} changed while it was being updated; retry the request",
        booking.id
    ))
}

// POST /bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    AppJson(mut body): AppJson<NewBooking>,
) -> Result<Json<InsertResult>, AppError> {
    if body.user_email.is_none() {
        body.user_email = Some(auth.email);
    }

    let booking = lifecycle::new_booking(body, Utc::now().naive_utc())?;
    let id = booking.id.clone();
    let service_id = booking.service_id.clone();
    db::call(&state.db, move |conn| queries::insert_booking(conn, &booking)).await?;

    tracing::info!(booking_id = %id, service_id = %service_id, "booking created");
    Ok(Json(InsertResult::new(id)))
}

// GET /bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = db::call(&state.db, move |conn| queries::list_bookings(conn, &filter)).await?;
    Ok(Json(bookings))
}

// GET /bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    require_id(&id)?;
    Ok(Json(load_booking(&state, &id).await?))
}

// PATCH /bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<BookingUpdate>,
) -> Result<Json<UpdateResult>, AppError> {
    require_id(&id)?;

    let booking = load_booking(&state, &id).await?;
    if booking.payment_status == PaymentStatus::Paid {
        return Err(AppError::Validation(
            "Paid bookings can no longer be edited".to_string(),
        ));
    }

    let changed = db::call(&state.db, move |conn| queries::update_booking_details(conn, &id, &body)).await?;
    if changed == 0 {
        return Err(status_changed(&booking));
    }
    Ok(Json(UpdateResult::new(changed)))
}

// DELETE /bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    require_id(&id)?;

    let target = id.clone();
    let deleted = db::call(&state.db, move |conn| queries::delete_booking(conn, &target)).await?;

    tracing::info!(booking_id = %id, by = %auth.email, deleted, "booking deleted");
    Ok(Json(DeleteResult::new(deleted)))
}

// GET /bookings/decorator/:email
pub async fn decorator_bookings(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = db::call(&state.db, move |conn| queries::list_decorator_bookings(conn, &email)).await?;
    Ok(Json(bookings))
}

// GET /bookings/decorator-earnings/:email
pub async fn decorator_earnings(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = db::call(&state.db, move |conn| queries::list_decorator_earnings(conn, &email)).await?;
    Ok(Json(bookings))
}

// PATCH /bookings/:id/assign-decorator
//
// Booking and decorator are written separately. If a later write fails the
// booking is already assigned; re-running the request repeats the writes.
pub async fn assign_decorator(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<DecoratorAssignment>,
) -> Result<Json<Value>, AppError> {
    if !lifecycle::is_valid_id(&id) {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }
    let decorator = body.validate()?;

    let booking = load_booking(&state, &id).await?;
    lifecycle::check_assignment(&booking)?;

    let now = Utc::now().naive_utc();
    let expected = booking.delivery_status;
    let (booking_id, d) = (id.clone(), decorator.clone());
    let booking_changed = db::call(&state.db, move |conn| {
        queries::assign_decorator(conn, &booking_id, expected, &d.id, &d.name, &d.email, &now)
    })
    .await?;
    if booking_changed == 0 {
        return Err(status_changed(&booking));
    }

    let decorator_id = decorator.id.clone();
    let decorator_changed = db::call(&state.db, move |conn| {
        queries::set_user_status(conn, &decorator_id, UserStatus::Assigned)
    })
    .await?;
    if decorator_changed == 0 {
        tracing::warn!(decorator_id = %decorator.id, "assigned decorator has no user record");
    }

    // Reassignment frees whoever held the booking before.
    if let Some(previous) = booking.decorator_id.clone().filter(|p| *p != decorator.id) {
        let released = previous.clone();
        db::call(&state.db, move |conn| {
            queries::set_user_status(conn, &released, UserStatus::Active)
        })
        .await?;
        tracing::info!(booking_id = %id, decorator_id = %previous, "previous decorator released");
    }

    tracing::info!(
        booking_id = %id,
        decorator_email = %decorator.email,
        by = %auth.email,
        "decorator assigned"
    );
    Ok(Json(json!({
        "success": true,
        "bookingResult": UpdateResult::new(booking_changed),
        "decoratorResult": UpdateResult::new(decorator_changed),
    })))
}

// PATCH /bookings/:id/decorator-action?action=accept|completed
#[derive(Deserialize)]
pub struct DecoratorActionQuery {
    pub action: Option<String>,
}

pub async fn decorator_action(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<DecoratorActionQuery>,
) -> Result<Json<Value>, AppError> {
    if !lifecycle::is_valid_id(&id) {
        return Err(AppError::InvalidInput("Invalid booking ID format".to_string()));
    }

    let booking = load_booking(&state, &id).await?;
    let plan = lifecycle::plan_decorator_action(
        &booking,
        query.action.as_deref(),
        state.config.strict_price,
    )?;

    let now = Utc::now().naive_utc();
    let (booking_id, from, target, cost) = (id.clone(), plan.from, plan.target, plan.decorator_cost);
    let booking_changed = db::call(&state.db, move |conn| {
        queries::advance_delivery(conn, &booking_id, from, target, &now, cost)
    })
    .await?;
    if booking_changed == 0 {
        return Err(status_changed(&booking));
    }

    let (decorator_id, decorator_status) = (plan.decorator_id.clone(), plan.decorator_status);
    let decorator_changed = db::call(&state.db, move |conn| {
        queries::set_user_status(conn, &decorator_id, decorator_status)
    })
    .await?;

    tracing::info!(
        booking_id = %id,
        status = plan.target.as_str(),
        decorator_cost = ?plan.decorator_cost,
        by = %auth.email,
        "decorator action applied"
    );
    Ok(Json(json!({
        "success": true,
        "bookingResult": UpdateResult::new(booking_changed),
        "decoratorResult": UpdateResult::new(decorator_changed),
    })))
}
