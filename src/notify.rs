use anyhow::{Context, Result, anyhow};
use lettre::message::{Mailbox, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Config;
use crate::models::{Appointment, Client, ClinicSettings, Service};

/// SMTP delivery for booking confirmations.
#[derive(Clone)]
pub struct Mailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl Mailer {
    /// `None` when no SMTP server is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        if !config.smtp_enabled() {
            return Ok(None);
        }
        let server = config.smtp_server.as_deref().unwrap_or_default().trim();

        let from_address = config
            .smtp_from
            .as_deref()
            .or(config.smtp_username.as_deref())
            .ok_or_else(|| anyhow!("SMTP_FROM or SMTP_USERNAME must be set to send e-mail"))?;
        let from = from_address
            .parse::<Mailbox>()
            .with_context(|| format!("invalid sender address {}", from_address))?;

        let mut builder = SmtpTransport::relay(server)?;
        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(server, "booking confirmation e-mail enabled");
        Ok(Some(Self {
            transport: builder.build(),
            from,
        }))
    }

    pub fn sender(&self) -> &Mailbox {
        &self.from
    }

    /// Delivers on a blocking thread so the UI task is not stalled.
    pub async fn send(&self, message: Message) -> Result<()> {
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("mail task panicked")?
            .context("sending e-mail")?;
        tracing::info!("booking confirmation sent");
        Ok(())
    }
}

/// Confirmation sent to the client after an online booking.
pub fn booking_confirmation(
    from: &Mailbox,
    settings: &ClinicSettings,
    client: &Client,
    service: &Service,
    appointment: &Appointment,
) -> Result<Message> {
    let to = format!("{} <{}>", client.name.trim(), client.email.trim())
        .parse::<Mailbox>()
        .with_context(|| format!("invalid client address {}", client.email))?;

    let mut body = format!(
        "Hello {},\n\nYour appointment at {} is confirmed.\n\n\
         Service: {}\nDate: {}\nTime: {}\nDuration: {}\nPrice: {}\n",
        client.name.trim(),
        settings.clinic_name,
        service.title,
        appointment.date.format("%d/%m/%Y"),
        appointment.start_time.format("%H:%M"),
        service.duration_label(),
        service.price_label(),
    );
    if let Some(address) = settings.address.as_deref().filter(|a| !a.trim().is_empty()) {
        body.push_str(&format!("Address: {}\n", address));
    }
    if let Some(phone) = settings.contact_phone.as_deref().filter(|p| !p.trim().is_empty()) {
        body.push_str(&format!("\nTo reschedule or cancel, call us at {}.\n", phone));
    }
    body.push_str(&format!("\nSee you soon,\n{}\n", settings.clinic_name));

    let message = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(format!("Appointment confirmed: {}", service.title))
        .header(header::ContentType::TEXT_PLAIN)
        .body(body)?;

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn config(vars: &[(&str, &str)]) -> Config {
        let mut pairs = vec![("DATABASE_URL".to_string(), "postgres://localhost/clinic".to_string())];
        pairs.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Config::from_pairs(pairs).unwrap()
    }

    #[test]
    fn mailer_is_disabled_without_server() {
        assert!(Mailer::from_config(&config(&[])).unwrap().is_none());
    }

    #[test]
    fn mailer_needs_a_sender() {
        assert!(Mailer::from_config(&config(&[("SMTP_SERVER", "smtp.example.com")])).is_err());
    }

    #[test]
    fn confirmation_is_addressed_to_the_client() {
        let from: Mailbox = "Esthetic Clinic <hello@clinic.com>".parse().unwrap();
        let settings = ClinicSettings {
            contact_phone: Some("(11) 3333-4444".into()),
            ..ClinicSettings::default()
        };
        let client = Client {
            id: 4,
            name: "Ana Silva".into(),
            email: "ana@example.com".into(),
            phone: "555".into(),
            ..Client::blank()
        };
        let service = Service {
            id: 2,
            title: "Facial cleansing".into(),
            price: 150.0,
            duration_minutes: 90,
            ..Service::blank()
        };
        let appointment = Appointment::new(
            4,
            2,
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        );

        let message = booking_confirmation(&from, &settings, &client, &service, &appointment).unwrap();

        let recipients: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(recipients, vec!["ana@example.com".to_string()]);

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Appointment confirmed: Facial cleansing"));
        assert!(raw.contains("Date: 03/06/2024"));
        assert!(raw.contains("Time: 14:30"));
        assert!(raw.contains("Duration: 1h30"));
        assert!(raw.contains("(11) 3333-4444"));
    }
}
