use anyhow::Result;

use super::Database;
use crate::models::{Role, User};

impl Database {
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, password_hash, active
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(self.get_pool())
        .await?;

        Ok(user)
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        password_hash: &str,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (name, email, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(name.trim())
        .bind(email.trim())
        .bind(role.as_str())
        .bind(password_hash)
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(user_id = id, role = %role, "user created");
        Ok(id)
    }
}
