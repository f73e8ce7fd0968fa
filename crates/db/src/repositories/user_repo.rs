//! Queries against `users`.

use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at";

/// Account persistence used by signup and login.
pub struct UserRepo;

impl UserRepo {
    /// Fails with a unique violation on `uq_users_email` when the address
    /// is taken.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(input.id)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Exact match; callers normalise the address to lowercase first.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
