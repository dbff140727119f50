use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{require_id, AppJson};
use crate::auth::AdminUser;
use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{DeleteResult, InsertResult, NewService, Service, ServiceUpdate, UpdateResult};
use crate::services::lifecycle::new_record_id;
use crate::state::AppState;

fn check_price(price: f64) -> Result<(), AppError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation("price must be a non-negative number".to_string()))
    }
}

// POST /services
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    AppJson(body): AppJson<NewService>,
) -> Result<Json<InsertResult>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    check_price(body.price)?;

    let service = Service {
        id: new_record_id(),
        name: body.name,
        price: body.price,
        image: body.image,
        description: body.description,
        category: body.category,
        created_by: Some(admin.email),
        created_at: Utc::now().naive_utc(),
    };

    let id = service.id.clone();
    db::call(&state.db, move |conn| queries::insert_service(conn, &service)).await?;

    tracing::info!(service_id = %id, "service created");
    Ok(Json(InsertResult::new(id)))
}

// GET /services
#[derive(Deserialize)]
pub struct ServicesQuery {
    pub limit: Option<String>,
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ServicesQuery>,
) -> Result<Json<Vec<Service>>, AppError> {
    // Anything that isn't a number means "no limit".
    let limit = query.limit.and_then(|l| l.trim().parse::<i64>().ok());
    let services = db::call(&state.db, move |conn| queries::list_services(conn, limit)).await?;
    Ok(Json(services))
}

// GET /services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    require_id(&id)?;

    let service = db::call(&state.db, move |conn| queries::get_service(conn, &id)).await?;
    service
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
}

// PATCH /services/:id
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<ServiceUpdate>,
) -> Result<Json<UpdateResult>, AppError> {
    require_id(&id)?;
    if let Some(price) = body.price {
        check_price(price)?;
    }

    let changed = db::call(&state.db, move |conn| queries::update_service(conn, &id, &body)).await?;
    Ok(Json(UpdateResult::new(changed)))
}

// DELETE /services/:id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    require_id(&id)?;

    let deleted = db::call(&state.db, move |conn| queries::delete_service(conn, &id)).await?;
    Ok(Json(DeleteResult::new(deleted)))
}
