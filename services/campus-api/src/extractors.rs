//! Axum extractors for authentication and role gating

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use campus_auth_core::AuthenticatedUser;
use campus_types::{ApiResponse, Role};

use crate::state::AppState;

/// Authenticated user extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    /// Row id of the backing token record, used for logout
    pub token_id: Uuid,
}

impl AuthUser {
    /// Check if the user holds an administrative role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if the user may record fee payments
    pub fn can_collect_fees(&self) -> bool {
        self.role.can_collect_fees()
    }
}

impl From<AuthenticatedUser> for AuthUser {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            role: user.role,
            token_id: user.token_id,
        }
    }
}

/// Auth rejection type
pub struct AuthRejection {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        tracing::debug!(code = self.code, status = self.status.as_u16(), "Auth rejection");
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_token(parts)?;

        let user = app_state.auth.validate(&token).await.map_err(|e| {
            tracing::debug!(error = ?e, "Token validation failed");
            AuthRejection {
                status: StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::UNAUTHORIZED),
                code: e.error_code(),
                message: e.to_string(),
            }
        })?;

        Ok(AuthUser::from(user))
    }
}

/// Authenticated user that also holds an administrative role.
///
/// Rejects with 403 before the handler runs, so role checks cannot be
/// forgotten on gated routes.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthRejection {
                status: StatusCode::FORBIDDEN,
                code: "FORBIDDEN",
                message: "administrative role required".to_string(),
            });
        }

        Ok(AdminUser(user))
    }
}

/// Extract the bearer token from the Authorization header
fn extract_token(parts: &Parts) -> Result<String, AuthRejection> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| AuthRejection {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_HEADER",
            message: "Invalid Authorization header encoding".to_string(),
        })?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.to_string());
        }
    }

    Err(AuthRejection {
        status: StatusCode::UNAUTHORIZED,
        code: "MISSING_TOKEN",
        message: "No authentication token provided".to_string(),
    })
}
