use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        // Users
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::register_user),
        )
        .route(
            "/users/active-decorators",
            get(handlers::users::active_decorators),
        )
        // GET takes an email in the segment, DELETE a record id.
        .route(
            "/users/:id",
            get(handlers::users::get_user).delete(handlers::users::delete_user),
        )
        .route("/users/:id/role", patch(handlers::users::update_role))
        // Services
        .route(
            "/services",
            get(handlers::catalog::list_services).post(handlers::catalog::create_service),
        )
        .route(
            "/services/:id",
            get(handlers::catalog::get_service)
                .patch(handlers::catalog::update_service)
                .delete(handlers::catalog::delete_service),
        )
        // Bookings
        .route(
            "/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route(
            "/bookings/decorator/:email",
            get(handlers::bookings::decorator_bookings),
        )
        .route(
            "/bookings/decorator-earnings/:email",
            get(handlers::bookings::decorator_earnings),
        )
        .route(
            "/bookings/:id",
            get(handlers::bookings::get_booking)
                .patch(handlers::bookings::update_booking)
                .delete(handlers::bookings::delete_booking),
        )
        .route(
            "/bookings/:id/assign-decorator",
            patch(handlers::bookings::assign_decorator),
        )
        .route(
            "/bookings/:id/decorator-action",
            patch(handlers::bookings::decorator_action),
        )
        // Payments
        .route(
            "/create-checkout-session",
            post(handlers::payments::create_checkout_session),
        )
        .route("/payment-success", patch(handlers::payments::payment_success))
        .route("/payments", get(handlers::payments::list_payments))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
