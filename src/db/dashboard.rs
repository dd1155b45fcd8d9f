use anyhow::Result;
use chrono::NaiveDate;

use super::Database;
use super::appointments::DETAILS_SELECT;
use crate::dashboard::DashboardStats;
use crate::models::{AppointmentDetails, AppointmentStatus};

impl Database {
    async fn count(&self, sql: &str, date: Option<NaiveDate>) -> Result<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        if let Some(date) = date {
            query = query.bind(date);
        }
        Ok(query.fetch_one(self.get_pool()).await?)
    }

    pub async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats> {
        let total_clients = self.count("SELECT COUNT(*) FROM clients", None).await?;
        let active_services = self
            .count("SELECT COUNT(*) FROM services WHERE active", None)
            .await?;
        let scheduled_today = self
            .count(
                "SELECT COUNT(*) FROM appointments WHERE date = $1 AND status = 'scheduled'",
                Some(today),
            )
            .await?;
        let scheduled_upcoming = self
            .count(
                "SELECT COUNT(*) FROM appointments WHERE date > $1 AND status = 'scheduled'",
                Some(today),
            )
            .await?;
        let completed = self
            .count("SELECT COUNT(*) FROM appointments WHERE status = 'completed'", None)
            .await?;
        let cancelled = self
            .count("SELECT COUNT(*) FROM appointments WHERE status = 'cancelled'", None)
            .await?;

        Ok(DashboardStats {
            total_clients,
            active_services,
            scheduled_today,
            scheduled_upcoming,
            completed,
            cancelled,
        })
    }

    /// Scheduled appointments from `today` on, soonest first.
    pub async fn upcoming_appointments(
        &self,
        today: NaiveDate,
        limit: i64,
    ) -> Result<Vec<AppointmentDetails>> {
        let sql = format!(
            "{} WHERE a.status = $1 AND a.date >= $2 ORDER BY a.date ASC, a.start_time ASC LIMIT $3",
            DETAILS_SELECT
        );
        let appointments = sqlx::query_as::<_, AppointmentDetails>(&sql)
            .bind(AppointmentStatus::Scheduled)
            .bind(today)
            .bind(limit)
            .fetch_all(self.get_pool())
            .await?;

        Ok(appointments)
    }
}
