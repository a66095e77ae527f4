//! Session sync endpoint
//!
//! The identity provider lives upstream; what reaches this server is an
//! already-resolved identity in trusted headers. This endpoint turns that
//! identity into a user record — called by the client once after login,
//! it inserts the user on first authentication and merges refreshed
//! profile fields on every later call.
//!
//! # Endpoint
//!
//! `POST /v1/auth/session`
//!
//! # Example Response
//!
//! ```json
//! {
//!   "id": "auth0|abc123",
//!   "email": "ana@example.com",
//!   "firstName": "Ana",
//!   "lastName": "Silva",
//!   "profileImageUrl": null,
//!   "points": 0,
//!   "homeId": null,
//!   "createdAt": "2025-08-01T12:00:00Z",
//!   "updatedAt": "2025-08-01T12:00:00Z"
//! }
//! ```

use crate::app::AppState;
use crate::error::ApiResult;
use crate::middleware::identity::Identity;
use axum::{extract::State, Extension, Json};
use choreboard_shared::models::user::{UpsertUser, User};

/// Session sync handler
///
/// Upserts the caller's user record from the proxy-resolved identity and
/// returns it.
pub async fn sync_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<User>> {
    let user = User::upsert(
        &state.db,
        UpsertUser {
            id: identity.user_id,
            email: identity.email,
            first_name: identity.first_name,
            last_name: identity.last_name,
            profile_image_url: identity.profile_image_url,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Session synced");

    Ok(Json(user))
}
