use anyhow::Result;

use super::Database;
use crate::error::ClinicError;
use crate::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, description, display_order, active";

impl Database {
    // Category operations

    /// Active categories in display order, for the public pages.
    pub async fn load_active_categories(&self) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE active ORDER BY display_order ASC, name ASC",
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(self.get_pool())
            .await?;

        Ok(categories)
    }

    pub async fn load_categories(&self) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories ORDER BY display_order ASC, name ASC",
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(self.get_pool())
            .await?;

        Ok(categories)
    }

    pub async fn get_category(&self, id: i32) -> Result<Category> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or(ClinicError::NotFound { entity: "Category", id })?;

        Ok(category)
    }

    pub async fn create_category(&self, category: &Category) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO categories (name, description, display_order, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(category.name.trim())
        .bind(&category.description)
        .bind(category.display_order)
        .bind(category.active)
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(category_id = id, "category created");
        Ok(id)
    }

    pub async fn update_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, description = $2, display_order = $3, active = $4
            WHERE id = $5
            "#,
        )
        .bind(category.name.trim())
        .bind(&category.description)
        .bind(category.display_order)
        .bind(category.active)
        .bind(category.id)
        .execute(self.get_pool())
        .await?;

        tracing::info!(category_id = category.id, "category updated");
        Ok(())
    }

    /// Services of a deleted category are kept without a category.
    pub async fn delete_category(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }
}
