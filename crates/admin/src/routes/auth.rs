//! Admin login, logout and registration.
//!
//! Mounted under `/api/admin/auth` behind the auth rate limiter.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::{AppResult, clear_sentry_user, set_sentry_user},
    extract::ApiJson,
    middleware::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin},
    models::{AdminRole, CurrentAdmin},
    services::auth::{AuthService, Registration},
    state::AppState,
};

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<AdminRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Create an admin account.
///
/// POST /api/admin/auth/register
#[instrument(skip(actor, state, body), fields(email = %body.email))]
async fn register(
    OptionalAdminAuth(actor): OptionalAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> AppResult<Json<Value>> {
    let user = AuthService::new(state.pool())
        .register(
            Registration {
                name: &body.name,
                email: &body.email,
                password: &body.password,
                role: body.role,
            },
            actor.as_ref(),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Admin registered",
        "user": user,
    })))
}

/// Verify credentials and start a session.
///
/// POST /api/admin/auth/login
#[instrument(skip(session, state, body))]
async fn login(
    session: Session,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<Value>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let current = CurrentAdmin::from(&user);
    set_current_admin(&session, &current).await?;
    set_sentry_user(user.id.as_i32(), Some(user.email.as_str()));
    tracing::info!(admin_id = %user.id, "Admin logged in");

    Ok(Json(json!({
        "success": true,
        "message": "Logged in",
        "user": user,
    })))
}

/// End the session.
///
/// POST /api/admin/auth/logout
async fn logout(session: Session) -> AppResult<Json<Value>> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "success": true, "message": "Logged out" })))
}

/// The logged-in admin.
///
/// GET /api/admin/auth/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}
