//! User operations

use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewUser, User, UserProfile};
use crate::repository::Database;
use crate::utils::{format_timestamp, now};

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = now();
        let id = Uuid::new_v4().to_string();

        // Check if email is already registered
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(DbError::Duplicate(format!(
                "Email '{}' already registered",
                user.email
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(format_timestamp(&now))
        .bind(format_timestamp(&now))
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, format!("Email '{}' already registered", user.email)))?;

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email, including the password hash
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| User::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get a user's public profile by ID (the password hash is never selected)
    pub async fn get_user_profile(&self, id: &str) -> Result<Option<UserProfile>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| UserProfile::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Delete a user
    pub async fn delete_user(&self, id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
