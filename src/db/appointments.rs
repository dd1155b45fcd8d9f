use anyhow::Result;
use chrono::NaiveDate;

use super::Database;
use crate::error::ClinicError;
use crate::models::{Appointment, AppointmentDetails, AppointmentStatus};

pub(super) const DETAILS_SELECT: &str = r#"
    SELECT a.id, a.client_id, a.service_id, a.date, a.start_time, a.status, a.notes,
           c.name AS client_name, c.email AS client_email, c.phone AS client_phone,
           s.title AS service_title, s.price::float8 AS service_price,
           s.duration_minutes AS service_duration
    FROM appointments a
    JOIN clients c ON c.id = a.client_id
    JOIN services s ON s.id = a.service_id
"#;

impl Database {
    // Appointment operations
    pub async fn load_appointments(&self) -> Result<Vec<AppointmentDetails>> {
        let sql = format!("{} ORDER BY a.date ASC, a.start_time ASC", DETAILS_SELECT);
        let appointments = sqlx::query_as::<_, AppointmentDetails>(&sql)
            .fetch_all(self.get_pool())
            .await?;

        Ok(appointments)
    }

    pub async fn load_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentDetails>> {
        let sql = format!(
            "{} WHERE a.status = $1 ORDER BY a.date ASC, a.start_time ASC",
            DETAILS_SELECT
        );
        let appointments = sqlx::query_as::<_, AppointmentDetails>(&sql)
            .bind(status)
            .fetch_all(self.get_pool())
            .await?;

        Ok(appointments)
    }

    pub async fn load_appointments_by_date(&self, date: NaiveDate) -> Result<Vec<AppointmentDetails>> {
        let sql = format!("{} WHERE a.date = $1 ORDER BY a.start_time ASC", DETAILS_SELECT);
        let appointments = sqlx::query_as::<_, AppointmentDetails>(&sql)
            .bind(date)
            .fetch_all(self.get_pool())
            .await?;

        Ok(appointments)
    }

    /// Both bounds inclusive.
    pub async fn load_appointments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AppointmentDetails>> {
        let sql = format!(
            "{} WHERE a.date BETWEEN $1 AND $2 ORDER BY a.date ASC, a.start_time ASC",
            DETAILS_SELECT
        );
        let appointments = sqlx::query_as::<_, AppointmentDetails>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(self.get_pool())
            .await?;

        Ok(appointments)
    }

    pub async fn get_appointment(&self, id: i32) -> Result<AppointmentDetails> {
        let sql = format!("{} WHERE a.id = $1", DETAILS_SELECT);
        let appointment = sqlx::query_as::<_, AppointmentDetails>(&sql)
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or(ClinicError::NotFound { entity: "Appointment", id })?;

        Ok(appointment)
    }

    /// Inserts after the availability check accepts the slot.
    pub async fn create_appointment(&self, appointment: &Appointment) -> Result<i32> {
        let available = self
            .check_slot_availability(
                appointment.date,
                appointment.start_time,
                appointment.service_id,
                None,
            )
            .await?;

        if !available {
            return Err(ClinicError::SlotUnavailable {
                date: appointment.date,
                time: appointment.start_time,
            }
            .into());
        }

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO appointments (client_id, service_id, date, start_time, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(appointment.client_id)
        .bind(appointment.service_id)
        .bind(appointment.date)
        .bind(appointment.start_time)
        .bind(appointment.status)
        .bind(&appointment.notes)
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(
            appointment_id = id,
            date = %appointment.date,
            time = %appointment.start_time,
            "appointment created"
        );
        Ok(id)
    }

    /// Re-checks the slot, ignoring the appointment itself, while it still
    /// holds a place on the calendar.
    pub async fn update_appointment(&self, appointment: &Appointment) -> Result<()> {
        if appointment.status.occupies_slot() {
            let available = self
                .check_slot_availability(
                    appointment.date,
                    appointment.start_time,
                    appointment.service_id,
                    Some(appointment.id),
                )
                .await?;

            if !available {
                return Err(ClinicError::SlotUnavailable {
                    date: appointment.date,
                    time: appointment.start_time,
                }
                .into());
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET client_id = $1, service_id = $2, date = $3, start_time = $4,
                status = $5, notes = $6, updated_at = now()
            WHERE id = $7
            "#,
        )
        .bind(appointment.client_id)
        .bind(appointment.service_id)
        .bind(appointment.date)
        .bind(appointment.start_time)
        .bind(appointment.status)
        .bind(&appointment.notes)
        .bind(appointment.id)
        .execute(self.get_pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(ClinicError::NotFound { entity: "Appointment", id: appointment.id }.into());
        }

        tracing::info!(appointment_id = appointment.id, "appointment updated");
        Ok(())
    }

    async fn set_appointment_status(&self, id: i32, status: AppointmentStatus) -> Result<()> {
        let result =
            sqlx::query("UPDATE appointments SET status = $1, updated_at = now() WHERE id = $2")
                .bind(status)
                .bind(id)
                .execute(self.get_pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(ClinicError::NotFound { entity: "Appointment", id }.into());
        }

        tracing::info!(appointment_id = id, status = %status, "appointment status changed");
        Ok(())
    }

    /// A non-empty reason replaces the notes.
    pub async fn cancel_appointment(&self, id: i32, reason: Option<&str>) -> Result<()> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());

        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET status = $1, notes = COALESCE($2, notes), updated_at = now()
            WHERE id = $3
            "#,
        )
        .bind(AppointmentStatus::Cancelled)
        .bind(reason)
        .bind(id)
        .execute(self.get_pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(ClinicError::NotFound { entity: "Appointment", id }.into());
        }

        tracing::info!(appointment_id = id, "appointment cancelled");
        Ok(())
    }

    pub async fn complete_appointment(&self, id: i32) -> Result<()> {
        self.set_appointment_status(id, AppointmentStatus::Completed).await
    }

    pub async fn mark_no_show(&self, id: i32) -> Result<()> {
        self.set_appointment_status(id, AppointmentStatus::NoShow).await
    }

    pub async fn delete_appointment(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ClinicError::NotFound { entity: "Appointment", id }.into());
        }

        tracing::info!(appointment_id = id, "appointment deleted");
        Ok(())
    }
}
