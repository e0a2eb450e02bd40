use async_trait::async_trait;
use shared::models::{TokenPair, User};
use shared::util::now_millis;

use super::{PgStore, map_constraint};
use crate::db::{NewUser, StoreError, UserRepository};

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let now = now_millis();
        sqlx::query_as(
            r#"
            INSERT INTO users (username, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, ("user", user.email.as_str()), 0))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_tokens(&self, user_id: i64, tokens: &TokenPair) -> Result<User, StoreError> {
        let user: Option<User> = sqlx::query_as(
            r#"
            UPDATE users SET token = $2, refresh_token = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&tokens.token)
        .bind(&tokens.refresh_token)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| StoreError::not_found("user", user_id))
    }

    async fn update_password_hash(&self, user_id: i64, hash: &str) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(user_id)
                .bind(hash)
                .bind(now_millis())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user", user_id));
        }
        Ok(())
    }
}
