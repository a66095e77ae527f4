//! Current-user endpoint
//!
//! # Endpoint
//!
//! `GET /v1/users/me` — the caller's user record including points and home
//! membership, or 404 if the record was never created (no session sync
//! yet).

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::identity::Identity;
use axum::{extract::State, Extension, Json};
use choreboard_shared::models::user::User;

/// Current-user handler
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, &identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
