//! Home model and database operations
//!
//! A home is a household/family group. Users reference their home through
//! `users.home_id`; membership is exactly that reference, there is no join
//! table. The creator is implicitly a member because `create` sets their
//! `home_id` in the same transaction.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE homes (
//!     id TEXT PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     created_by TEXT NOT NULL REFERENCES users(id),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;

/// Home model representing a household group
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    /// Generated identifier (UUIDv4 string)
    pub id: String,

    /// Display name of the household
    pub name: String,

    /// User who created the home
    pub created_by: String,

    /// When the home was created
    pub created_at: DateTime<Utc>,

    /// When the home was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new home
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHome {
    /// Display name of the household
    pub name: String,

    /// Creating user; must reference an existing user
    pub created_by: String,
}

/// Home aggregate with resolved members and creator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeWithMembers {
    /// The home itself, flattened into the aggregate
    #[serde(flatten)]
    pub home: Home,

    /// All users whose home reference points here
    pub members: Vec<User>,

    /// Resolved creator record
    pub creator: User,
}

impl Home {
    /// Creates a new home and makes the creator its first member
    ///
    /// Generates the home id, inserts the row, and sets the creating
    /// user's `home_id` to the new id. Both writes run in one transaction
    /// so a home can never exist without its creator inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if `created_by` does not reference an existing
    /// user (foreign key violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateHome) -> Result<Self, sqlx::Error> {
        let home_id = Uuid::new_v4().to_string();

        let mut tx = pool.begin().await?;

        let home = sqlx::query_as::<_, Home>(
            r#"
            INSERT INTO homes (id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_by, created_at, updated_at
            "#,
        )
        .bind(&home_id)
        .bind(data.name)
        .bind(&data.created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET home_id = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&data.created_by)
        .bind(&home_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(home)
    }

    /// Finds a home by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let home = sqlx::query_as::<_, Home>(
            r#"
            SELECT id, name, created_by, created_at, updated_at
            FROM homes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(home)
    }

    /// Finds a home by ID with all members and the creator resolved
    ///
    /// Returns None if the home does not exist. The creator row is
    /// guaranteed by the foreign key on `created_by`; its absence means a
    /// broken schema and surfaces as `RowNotFound`.
    pub async fn find_with_members(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<HomeWithMembers>, sqlx::Error> {
        let Some(home) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let members = User::find_by_home(pool, id).await?;
        let creator = User::find_by_id(pool, &home.created_by)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok(Some(HomeWithMembers {
            home,
            members,
            creator,
        }))
    }
}
