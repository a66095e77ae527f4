//! Database models for ChoreBoard
//!
//! This module contains all database models and their storage operations.
//!
//! # Models
//!
//! - `user`: household members, their point totals and home membership
//! - `home`: household/family groups
//! - `task`: assignable chores with priority, deadline and point value
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
//! let user = User::upsert(&pool, UpsertUser {
//!     id: "auth0|abc123".to_string(),
//!     email: Some("ana@example.com".to_string()),
//!     first_name: Some("Ana".to_string()),
//!     last_name: None,
//!     profile_image_url: None,
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod home;
pub mod task;
pub mod user;
