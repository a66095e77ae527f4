//! User model and database operations
//!
//! This module provides the User model for household members. Users are
//! created on first authentication (the identity provider owns credentials;
//! we only store the profile it resolves), belong to at most one home, and
//! accumulate points by completing tasks.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id TEXT PRIMARY KEY,
//!     email TEXT UNIQUE,
//!     first_name TEXT,
//!     last_name TEXT,
//!     profile_image_url TEXT,
//!     points INTEGER NOT NULL DEFAULT 0,
//!     home_id TEXT REFERENCES homes(id),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use choreboard_shared::models::user::{UpsertUser, User};
//! use choreboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! // Idempotent: inserts on first sight, merges profile fields afterwards
//! let user = User::upsert(&pool, UpsertUser {
//!     id: "auth0|abc123".to_string(),
//!     email: Some("ana@example.com".to_string()),
//!     first_name: Some("Ana".to_string()),
//!     last_name: Some("Silva".to_string()),
//!     profile_image_url: None,
//! }).await?;
//!
//! assert_eq!(user.points, 0);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// User model representing a household member
///
/// The id is the opaque subject issued by the external identity provider,
/// not something this service generates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque subject from the identity provider
    pub id: String,

    /// Email address (unique when present)
    pub email: Option<String>,

    /// Optional given name
    pub first_name: Option<String>,

    /// Optional family name
    pub last_name: Option<String>,

    /// Optional avatar URL
    pub profile_image_url: Option<String>,

    /// Accumulated points; only increases, and only via task completion
    pub points: i32,

    /// Home the user belongs to (None until they create or join one)
    pub home_id: Option<String>,

    /// When the user record was created
    pub created_at: DateTime<Utc>,

    /// When the user record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or refreshing a user record
///
/// Identified by primary key; an existing row has its profile fields
/// merged, points and home membership are never touched by an upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    /// Subject from the identity provider
    pub id: String,

    /// Email address
    pub email: Option<String>,

    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: Option<String>,

    /// Avatar URL
    pub profile_image_url: Option<String>,
}

impl User {
    /// Finds a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails; a missing user is
    /// `Ok(None)`, not an error.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, profile_image_url,
                   points, home_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new user or merges profile fields into an existing one
    ///
    /// The merge is keyed on the primary key and always refreshes
    /// `updated_at`. Points and `home_id` are left as they are; those
    /// change only through [`User::add_points`] and [`User::join_home`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is already taken by a different user
    /// - Database connection fails
    pub async fn upsert(pool: &PgPool, data: UpsertUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, profile_image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                profile_image_url = EXCLUDED.profile_image_url,
                updated_at = NOW()
            RETURNING id, email, first_name, last_name, profile_image_url,
                      points, home_id, created_at, updated_at
            "#,
        )
        .bind(data.id)
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.profile_image_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Sets the user's home membership
    ///
    /// Unconditional and idempotent: joining the home the user is already
    /// in leaves state unchanged apart from `updated_at`. Callers are
    /// expected to have resolved the home first.
    ///
    /// # Returns
    ///
    /// The updated user, or None if no user row matched `user_id`.
    pub async fn join_home(
        pool: &PgPool,
        user_id: &str,
        home_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET home_id = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, first_name, last_name, profile_image_url,
                      points, home_id, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(home_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Credits `delta` points to the user
    ///
    /// The increment happens server-side (`points = points + $delta`), so
    /// concurrent completions never lose updates to a stale read.
    ///
    /// Takes any Postgres executor so the credit can run inside the
    /// task-completion transaction as well as standalone.
    ///
    /// # Returns
    ///
    /// The updated user, or None if no user row matched `user_id`.
    pub async fn add_points<'e>(
        executor: impl PgExecutor<'e>,
        user_id: &str,
        delta: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET points = points + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, first_name, last_name, profile_image_url,
                      points, home_id, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Lists all members of a home
    pub async fn find_by_home(pool: &PgPool, home_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, profile_image_url,
                   points, home_id, created_at, updated_at
            FROM users
            WHERE home_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(home_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Returns the members of a home ordered by points, best first
    ///
    /// Ties are broken by user id ascending so the order is deterministic.
    pub async fn ranking(pool: &PgPool, home_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, profile_image_url,
                   points, home_id, created_at, updated_at
            FROM users
            WHERE home_id = $1
            ORDER BY points DESC, id ASC
            "#,
        )
        .bind(home_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
