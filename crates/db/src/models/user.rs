//! Account rows and their public projection.

use docroute_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An account as stored in `users`. Holds the Argon2 hash, so it is
/// deliberately not `Serialize`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// What the auth endpoints return about an account.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let User { id, email, role, .. } = user;
        Self {
            id: *id,
            email: email.clone(),
            role: role.clone(),
        }
    }
}

/// Insert payload for [`crate::repositories::UserRepo::create`]. The
/// password must already be hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}
