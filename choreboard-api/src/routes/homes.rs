//! Home endpoints
//!
//! Homes are the household groups users belong to. A user creates one and
//! becomes its first member; others join by id (the invite link the client
//! shares is just the home id).
//!
//! # Endpoints
//!
//! - `POST /v1/homes` — create a home owned by the caller
//! - `GET  /v1/homes/:id` — home aggregate with members and creator
//! - `POST /v1/homes/:id/join` — join an existing home
//! - `GET  /v1/homes/:id/ranking` — members ordered by points

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::identity::Identity;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use choreboard_shared::models::home::{CreateHome, Home, HomeWithMembers};
use choreboard_shared::models::user::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create home request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHomeRequest {
    /// Household name
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Create home response
#[derive(Debug, Clone, Serialize)]
pub struct CreateHomeResponse {
    /// The created home
    pub home: Home,

    /// Confirmation message for the client
    pub message: String,
}

/// Join home response
#[derive(Debug, Clone, Serialize)]
pub struct JoinHomeResponse {
    /// Confirmation message for the client
    pub message: String,
}

/// Create home handler
///
/// Creates a home owned by the caller and moves the caller into it.
///
/// # Errors
///
/// - 422: invalid name
/// - 400: caller has no user record yet (no session sync)
pub async fn create_home(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateHomeRequest>,
) -> ApiResult<Json<CreateHomeResponse>> {
    request.validate()?;

    let home = Home::create(
        &state.db,
        CreateHome {
            name: request.name,
            created_by: identity.user_id.clone(),
        },
    )
    .await?;

    tracing::info!(home_id = %home.id, user_id = %identity.user_id, "Home created");

    Ok(Json(CreateHomeResponse {
        home,
        message: "Home successfully created!".to_string(),
    }))
}

/// Get home handler
///
/// Returns the home aggregate with all members and the creator resolved,
/// or 404 if the home does not exist.
pub async fn get_home(
    State(state): State<AppState>,
    Path(home_id): Path<String>,
) -> ApiResult<Json<HomeWithMembers>> {
    let home = Home::find_with_members(&state.db, &home_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Home not found".to_string()))?;

    Ok(Json(home))
}

/// Join home handler
///
/// Sets the caller's home membership to the given home. Idempotent:
/// joining the home the caller is already in is fine. There is no invite
/// validation or capacity limit beyond the home having to exist.
///
/// # Errors
///
/// - 404: home does not exist, or the caller has no user record
pub async fn join_home(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(home_id): Path<String>,
) -> ApiResult<Json<JoinHomeResponse>> {
    let home = Home::find_by_id(&state.db, &home_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Home not found".to_string()))?;

    User::join_home(&state.db, &identity.user_id, &home.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(home_id = %home.id, user_id = %identity.user_id, "User joined home");

    Ok(Json(JoinHomeResponse {
        message: "User added to your home!".to_string(),
    }))
}

/// Home ranking handler
///
/// Returns the members of a home ordered by points descending, ties
/// broken by user id so the order is stable.
pub async fn get_ranking(
    State(state): State<AppState>,
    Path(home_id): Path<String>,
) -> ApiResult<Json<Vec<User>>> {
    let ranking = User::ranking(&state.db, &home_id).await?;

    Ok(Json(ranking))
}
