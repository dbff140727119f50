use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::Role;
use crate::state::AppState;

/// A caller whose bearer token the identity verifier accepted.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

/// An authenticated caller whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

        let token = bearer_token(value)
            .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".to_string()))?;

        match state.identity.verify(token).await {
            Ok(email) => Ok(AuthUser { email }),
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                Err(AppError::Unauthorized("Invalid token".to_string()))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { email } = AuthUser::from_request_parts(parts, state).await?;

        let lookup = email.clone();
        let user = db::call(&state.db, move |conn| queries::get_user_by_email(conn, &lookup)).await?;

        match user {
            Some(u) if u.role == Role::Admin => Ok(AdminUser { email }),
            _ => Err(AppError::Forbidden("Admins only".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
