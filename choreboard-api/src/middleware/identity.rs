//! Identity middleware
//!
//! Authentication is owned by an upstream identity-terminating proxy; this
//! server never sees credentials. The proxy forwards the authenticated
//! subject and profile in trusted headers:
//!
//! - `x-auth-user-id` (required) — stable subject, used as the user's id
//! - `x-auth-email`, `x-auth-first-name`, `x-auth-last-name`,
//!   `x-auth-profile-image` (optional)
//!
//! The middleware parses these into an [`Identity`] inserted into request
//! extensions; a missing or empty user id yields 401 before any handler
//! runs. There is no ambient "current user" — handlers receive the
//! identity explicitly and pass explicit ids to the storage layer.
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware::from_fn, routing::get, Extension, Router};
//! use choreboard_api::middleware::identity::{identity_layer, Identity};
//!
//! async fn whoami(Extension(identity): Extension<Identity>) -> String {
//!     identity.user_id
//! }
//!
//! let app: Router = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(from_fn(identity_layer));
//! ```

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Header carrying the authenticated subject
pub const USER_ID_HEADER: &str = "x-auth-user-id";

/// Optional profile headers forwarded by the proxy
pub const EMAIL_HEADER: &str = "x-auth-email";
pub const FIRST_NAME_HEADER: &str = "x-auth-first-name";
pub const LAST_NAME_HEADER: &str = "x-auth-last-name";
pub const PROFILE_IMAGE_HEADER: &str = "x-auth-profile-image";

/// Resolved caller identity, added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Authenticated subject (becomes `users.id`)
    pub user_id: String,

    /// Email forwarded by the proxy
    pub email: Option<String>,

    /// Given name forwarded by the proxy
    pub first_name: Option<String>,

    /// Family name forwarded by the proxy
    pub last_name: Option<String>,

    /// Avatar URL forwarded by the proxy
    pub profile_image_url: Option<String>,
}

/// Identity resolution failure
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The required subject header is missing or empty
    #[error("Missing or empty x-auth-user-id header")]
    MissingUserId,
}

impl Identity {
    /// Parses the identity from request headers
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::MissingUserId`] when the subject header is
    /// absent or blank.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, IdentityError> {
        let user_id = header_value(headers, USER_ID_HEADER).ok_or(IdentityError::MissingUserId)?;

        Ok(Self {
            user_id,
            email: header_value(headers, EMAIL_HEADER),
            first_name: header_value(headers, FIRST_NAME_HEADER),
            last_name: header_value(headers, LAST_NAME_HEADER),
            profile_image_url: header_value(headers, PROFILE_IMAGE_HEADER),
        })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Identity middleware layer
///
/// Rejects unauthenticated requests with 401 and injects [`Identity`]
/// into request extensions otherwise.
pub async fn identity_layer(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = Identity::from_headers(req.headers())
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::Service as _;

    #[test]
    fn test_from_headers_requires_user_id() {
        let headers = HeaderMap::new();
        assert!(matches!(
            Identity::from_headers(&headers),
            Err(IdentityError::MissingUserId)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "   ".parse().unwrap());
        assert!(Identity::from_headers(&headers).is_err());
    }

    #[test]
    fn test_from_headers_parses_profile_fields() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, "auth0|ana".parse().unwrap());
        headers.insert(EMAIL_HEADER, "ana@example.com".parse().unwrap());
        headers.insert(FIRST_NAME_HEADER, "Ana".parse().unwrap());

        let identity = Identity::from_headers(&headers).unwrap();
        assert_eq!(identity.user_id, "auth0|ana");
        assert_eq!(identity.email.as_deref(), Some("ana@example.com"));
        assert_eq!(identity.first_name.as_deref(), Some("Ana"));
        assert!(identity.last_name.is_none());
        assert!(identity.profile_image_url.is_none());
    }

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        identity.user_id
    }

    fn test_app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn(identity_layer))
    }

    #[tokio::test]
    async fn test_layer_rejects_missing_identity() {
        let mut app = test_app();

        let response = app
            .call(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_layer_injects_identity() {
        let mut app = test_app();

        let response = app
            .call(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(USER_ID_HEADER, "auth0|bruno")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"auth0|bruno");
    }
}
