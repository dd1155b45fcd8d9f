use anyhow::Result;

use super::Database;
use super::appointments::DETAILS_SELECT;
use crate::error::ClinicError;
use crate::models::{AppointmentDetails, Client};

const CLIENT_COLUMNS: &str =
    "id, name, email, phone, birthdate, address, notes, created_at";

impl Database {
    // Client operations
    pub async fn load_clients(&self) -> Result<Vec<Client>> {
        let sql = format!("SELECT {} FROM clients ORDER BY name ASC", CLIENT_COLUMNS);
        let clients = sqlx::query_as::<_, Client>(&sql)
            .fetch_all(self.get_pool())
            .await?;

        Ok(clients)
    }

    pub async fn get_client(&self, id: i32) -> Result<Client> {
        let sql = format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS);
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or(ClinicError::NotFound { entity: "Client", id })?;

        Ok(client)
    }

    pub async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>> {
        let sql = format!(
            "SELECT {} FROM clients WHERE lower(email) = lower($1) ORDER BY id ASC LIMIT 1",
            CLIENT_COLUMNS
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(email.trim())
            .fetch_optional(self.get_pool())
            .await?;

        Ok(client)
    }

    pub async fn create_client(&self, client: &Client) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO clients (name, email, phone, birthdate, address, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(client.name.trim())
        .bind(client.email.trim())
        .bind(client.phone.trim())
        .bind(client.birthdate)
        .bind(&client.address)
        .bind(&client.notes)
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(client_id = id, "client created");
        Ok(id)
    }

    pub async fn update_client(&self, client: &Client) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = $1, email = $2, phone = $3, birthdate = $4,
                address = $5, notes = $6, updated_at = now()
            WHERE id = $7
            "#,
        )
        .bind(client.name.trim())
        .bind(client.email.trim())
        .bind(client.phone.trim())
        .bind(client.birthdate)
        .bind(&client.address)
        .bind(&client.notes)
        .bind(client.id)
        .execute(self.get_pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(ClinicError::NotFound { entity: "Client", id: client.id }.into());
        }

        tracing::info!(client_id = client.id, "client updated");
        Ok(())
    }

    /// Appointments cascade with the client.
    pub async fn delete_client(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        tracing::info!(client_id = id, "client deleted");
        Ok(())
    }

    pub async fn recent_clients(&self, limit: i64) -> Result<Vec<Client>> {
        let sql = format!(
            "SELECT {} FROM clients ORDER BY created_at DESC LIMIT $1",
            CLIENT_COLUMNS
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(limit)
            .fetch_all(self.get_pool())
            .await?;

        Ok(clients)
    }

    /// Every appointment of a client, newest first.
    pub async fn client_history(&self, client_id: i32) -> Result<Vec<AppointmentDetails>> {
        let sql = format!(
            "{} WHERE a.client_id = $1 ORDER BY a.date DESC, a.start_time DESC",
            DETAILS_SELECT
        );
        let history = sqlx::query_as::<_, AppointmentDetails>(&sql)
            .bind(client_id)
            .fetch_all(self.get_pool())
            .await?;

        Ok(history)
    }
}
