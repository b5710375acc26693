use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use crate::modules::auth::model::{Role, User};

pub struct UserCrud {
    pool: Pool<MySql>,
}

impl UserCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Role::User.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn email_or_username_exists(&self, email: &str, username: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ? OR username = ?")
            .bind(email)
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    /// Replaces any outstanding reset token for the user.
    pub async fn set_reset_token(
        &self,
        email: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET reset_token_hash = ?, reset_token_expiry = ? WHERE email = ?")
            .bind(token_hash)
            .bind(expires_at)
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn find_by_reset_token(&self, email: &str, token_hash: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? AND reset_token_hash = ?")
            .bind(email)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
    }

    /// Sets the new password and consumes the token in one statement. Returns
    /// false when the token was consumed concurrently.
    pub async fn reset_password(&self, user_id: i64, token_hash: &str, password_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?, reset_token_hash = NULL, reset_token_expiry = NULL
            WHERE id = ? AND reset_token_hash = ?
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
