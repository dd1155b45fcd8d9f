use anyhow::Result;
use chrono::NaiveDateTime;

use super::Database;
use crate::models::{ClinicSettings, ScheduleBlock};

const SETTINGS_COLUMNS: &str = r#"
    id, clinic_name, opening_time, closing_time, working_days, booking_interval_minutes,
    contact_email, contact_phone, whatsapp, instagram, facebook, address, logo_url
"#;

impl Database {
    // Schedule block operations

    /// Blocks overlapping `[from, to)`.
    pub async fn load_blocks_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<ScheduleBlock>> {
        let blocks = sqlx::query_as::<_, ScheduleBlock>(
            r#"
            SELECT id, starts_at, ends_at, reason, created_by
            FROM schedule_blocks
            WHERE starts_at < $2 AND ends_at > $1
            ORDER BY starts_at ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.get_pool())
        .await?;

        Ok(blocks)
    }

    pub async fn create_block(&self, block: &ScheduleBlock) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO schedule_blocks (starts_at, ends_at, reason, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(block.starts_at)
        .bind(block.ends_at)
        .bind(&block.reason)
        .bind(block.created_by)
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(block_id = id, starts_at = %block.starts_at, ends_at = %block.ends_at, "time blocked");
        Ok(id)
    }

    pub async fn delete_block(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM schedule_blocks WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::info!(block_id = id, "time unblocked");
        Ok(())
    }

    // Settings operations
    pub async fn get_settings(&self) -> Result<ClinicSettings> {
        let sql = format!(
            "SELECT {} FROM clinic_settings ORDER BY id ASC LIMIT 1",
            SETTINGS_COLUMNS
        );
        let settings = sqlx::query_as::<_, ClinicSettings>(&sql)
            .fetch_optional(self.get_pool())
            .await?;

        match settings {
            Some(settings) => Ok(settings),
            None => {
                tracing::warn!("no clinic_settings row, using defaults");
                Ok(ClinicSettings::default())
            }
        }
    }

    pub async fn update_settings(&self, settings: &ClinicSettings) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE clinic_settings
            SET clinic_name = $1, opening_time = $2, closing_time = $3, working_days = $4,
                booking_interval_minutes = $5, contact_email = $6, contact_phone = $7,
                whatsapp = $8, instagram = $9, facebook = $10, address = $11, logo_url = $12,
                updated_at = now()
            WHERE id = $13
            "#,
        )
        .bind(settings.clinic_name.trim())
        .bind(settings.opening_time)
        .bind(settings.closing_time)
        .bind(&settings.working_days)
        .bind(settings.booking_interval_minutes)
        .bind(&settings.contact_email)
        .bind(&settings.contact_phone)
        .bind(&settings.whatsapp)
        .bind(&settings.instagram)
        .bind(&settings.facebook)
        .bind(&settings.address)
        .bind(&settings.logo_url)
        .bind(settings.id)
        .execute(self.get_pool())
        .await?;

        tracing::info!("clinic settings updated");
        Ok(())
    }
}
