use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use super::Database;
use crate::scheduling::AvailabilityCheck;

impl Database {
    /// Calls the `check_slot_availability` stored function.
    pub async fn check_slot_availability(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        service_id: i32,
        exclude_appointment: Option<i32>,
    ) -> Result<bool> {
        let available = sqlx::query_scalar::<_, Option<bool>>(
            "SELECT check_slot_availability($1, $2, $3, $4)",
        )
        .bind(date)
        .bind(time)
        .bind(service_id)
        .bind(exclude_appointment)
        .fetch_one(self.get_pool())
        .await?;

        tracing::debug!(%date, %time, service_id, ?available, "slot availability checked");
        Ok(available.unwrap_or(false))
    }
}

#[async_trait]
impl AvailabilityCheck for Database {
    async fn is_available(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        service_id: i32,
        exclude_appointment: Option<i32>,
    ) -> Result<bool> {
        self.check_slot_availability(date, time, service_id, exclude_appointment)
            .await
    }
}
