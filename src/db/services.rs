use anyhow::Result;

use super::Database;
use crate::error::ClinicError;
use crate::models::Service;

const SERVICE_SELECT: &str = r#"
    SELECT s.id, s.category_id, c.name AS category_name, s.title, s.description,
           s.full_description, s.price::float8 AS price, s.duration_minutes,
           s.active, s.featured, s.image_url
    FROM services s
    LEFT JOIN categories c ON c.id = s.category_id
"#;

impl Database {
    // Service operations

    /// Active services for the public catalogue.
    pub async fn load_active_services(&self) -> Result<Vec<Service>> {
        let sql = format!("{} WHERE s.active ORDER BY s.title ASC", SERVICE_SELECT);
        let services = sqlx::query_as::<_, Service>(&sql)
            .fetch_all(self.get_pool())
            .await?;

        Ok(services)
    }

    pub async fn load_services(&self) -> Result<Vec<Service>> {
        let sql = format!("{} ORDER BY s.title ASC", SERVICE_SELECT);
        let services = sqlx::query_as::<_, Service>(&sql)
            .fetch_all(self.get_pool())
            .await?;

        Ok(services)
    }

    pub async fn load_services_by_category(&self, category_id: i32) -> Result<Vec<Service>> {
        let sql = format!(
            "{} WHERE s.category_id = $1 AND s.active ORDER BY s.title ASC",
            SERVICE_SELECT
        );
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(category_id)
            .fetch_all(self.get_pool())
            .await?;

        Ok(services)
    }

    pub async fn get_service(&self, id: i32) -> Result<Service> {
        let sql = format!("{} WHERE s.id = $1", SERVICE_SELECT);
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or(ClinicError::NotFound { entity: "Service", id })?;

        Ok(service)
    }

    pub async fn create_service(&self, service: &Service) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO services (category_id, title, description, full_description, price,
                                  duration_minutes, active, featured, image_url)
            VALUES ($1, $2, $3, $4, $5::float8, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(service.category_id)
        .bind(service.title.trim())
        .bind(service.description.trim())
        .bind(&service.full_description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(service.active)
        .bind(service.featured)
        .bind(&service.image_url)
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(service_id = id, "service created");
        Ok(id)
    }

    pub async fn update_service(&self, service: &Service) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE services
            SET category_id = $1, title = $2, description = $3, full_description = $4,
                price = $5::float8, duration_minutes = $6, active = $7, featured = $8,
                image_url = $9, updated_at = now()
            WHERE id = $10
            "#,
        )
        .bind(service.category_id)
        .bind(service.title.trim())
        .bind(service.description.trim())
        .bind(&service.full_description)
        .bind(service.price)
        .bind(service.duration_minutes)
        .bind(service.active)
        .bind(service.featured)
        .bind(&service.image_url)
        .bind(service.id)
        .execute(self.get_pool())
        .await?;

        tracing::info!(service_id = service.id, "service updated");
        Ok(())
    }

    pub async fn set_service_active(&self, id: i32, active: bool) -> Result<()> {
        sqlx::query("UPDATE services SET active = $1, updated_at = now() WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::info!(service_id = id, active, "service visibility changed");
        Ok(())
    }

    pub async fn set_service_featured(&self, id: i32, featured: bool) -> Result<()> {
        sqlx::query("UPDATE services SET featured = $1, updated_at = now() WHERE id = $2")
            .bind(featured)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::info!(service_id = id, featured, "service highlight changed");
        Ok(())
    }

    /// Fails while appointments still reference the service.
    pub async fn delete_service(&self, id: i32) -> Result<()> {
        let booked = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM appointments WHERE service_id = $1",
        )
        .bind(id)
        .fetch_one(self.get_pool())
        .await?;

        if booked > 0 {
            return Err(ClinicError::Validation(format!(
                "This service has {} appointment(s); deactivate it instead",
                booked
            ))
            .into());
        }

        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::info!(service_id = id, "service deleted");
        Ok(())
    }
}
