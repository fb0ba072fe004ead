//! Admin account listing (super admins only).

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::{
    db::AdminUserRepository, error::AppResult, middleware::RequireSuperAdmin, models::AdminUser,
    state::AppState,
};

/// Build the admin users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list))
}

/// GET /api/admin/users
#[instrument(skip(_admin, state))]
async fn list(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AdminUser>>> {
    let users = AdminUserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}
