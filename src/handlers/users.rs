use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{require_id, AppJson};
use crate::auth::{AdminUser, AuthUser};
use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{DeleteResult, InsertResult, Role, UpdateResult, User, UserStatus};
use crate::services::lifecycle::new_record_id;
use crate::state::AppState;

// POST /users
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

pub async fn register_user(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<Json<InsertResult>, AppError> {
    let email = body
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("email is required".to_string()))?;

    // Self-registration never grants more than the base role.
    let user = User {
        id: new_record_id(),
        email,
        name: body.name.unwrap_or_default(),
        photo_url: body.photo_url,
        role: Role::User,
        status: UserStatus::None,
        created_at: Utc::now().naive_utc(),
    };

    let id = user.id.clone();
    let email = user.email.clone();
    let inserted = db::call(&state.db, move |conn| queries::insert_user(conn, &user)).await?;
    if !inserted {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    tracing::info!(user_id = %id, email = %email, "user registered");
    Ok(Json(InsertResult::new(id)))
}

// GET /users
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub search_text: Option<String>,
    pub sort_order: Option<String>,
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let search = query.search_text.unwrap_or_default();
    let descending = query.sort_order.as_deref() == Some("desc");

    let users = db::call(&state.db, move |conn| queries::search_users(conn, &search, descending)).await?;
    Ok(Json(users))
}

// GET /users/active-decorators
pub async fn active_decorators(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    let decorators = db::call(&state.db, queries::list_active_decorators).await?;
    Ok(Json(decorators))
}

// GET /users/:email
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = db::call(&state.db, move |conn| queries::get_user_by_email(conn, &email)).await?;
    user.map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

// PATCH /users/:id/role
#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<RoleRequest>,
) -> Result<Json<UpdateResult>, AppError> {
    require_id(&id)?;

    let target = id.clone();
    let changed = db::call(&state.db, move |conn| queries::update_user_role(conn, &target, body.role)).await?;

    tracing::info!(user_id = %id, role = body.role.as_str(), by = %admin.email, "user role changed");
    Ok(Json(UpdateResult::new(changed)))
}

// DELETE /users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    require_id(&id)?;

    let target = id.clone();
    let deleted = db::call(&state.db, move |conn| queries::delete_user(conn, &target)).await?;

    tracing::info!(user_id = %id, by = %admin.email, deleted, "user deleted");
    Ok(Json(DeleteResult::new(deleted)))
}
