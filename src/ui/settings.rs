use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{ClinicSettings, WEEKDAY_NAMES};
use crate::ui::components::popup::{render_notification, Notification};
use crate::ui::components::{edit_text, field_line, non_empty, read_key};
use crate::validation::{parse_time, validate_settings};

pub enum SettingsAction {
    Back,
    Save(ClinicSettings),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ClinicName,
    Opening,
    Closing,
    Interval,
    WorkingDays,
    ContactEmail,
    ContactPhone,
    Whatsapp,
    Instagram,
    Facebook,
    Address,
    LogoUrl,
}

const FIELDS: [(SettingsField, &str); 12] = [
    (SettingsField::ClinicName, "Clinic name"),
    (SettingsField::Opening, "Opens at (HH:MM)"),
    (SettingsField::Closing, "Closes at (HH:MM)"),
    (SettingsField::Interval, "Booking interval (minutes)"),
    (SettingsField::WorkingDays, "Working days"),
    (SettingsField::ContactEmail, "Contact e-mail"),
    (SettingsField::ContactPhone, "Contact phone"),
    (SettingsField::Whatsapp, "WhatsApp"),
    (SettingsField::Instagram, "Instagram"),
    (SettingsField::Facebook, "Facebook"),
    (SettingsField::Address, "Address"),
    (SettingsField::LogoUrl, "Logo URL"),
];

pub struct SettingsState {
    pub settings: ClinicSettings,
    opening: String,
    closing: String,
    interval: String,
    contact_email: String,
    contact_phone: String,
    whatsapp: String,
    instagram: String,
    facebook: String,
    address: String,
    logo_url: String,
    /// 0 = Sunday, like `working_days`.
    day_cursor: usize,
    pub current_field: SettingsField,
    pub editing: bool,
    error: Option<String>,
}

impl SettingsState {
    pub fn new(settings: ClinicSettings) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            opening: settings.opening_time.format("%H:%M").to_string(),
            closing: settings.closing_time.format("%H:%M").to_string(),
            interval: settings.booking_interval_minutes.to_string(),
            contact_email: text(&settings.contact_email),
            contact_phone: text(&settings.contact_phone),
            whatsapp: text(&settings.whatsapp),
            instagram: text(&settings.instagram),
            facebook: text(&settings.facebook),
            address: text(&settings.address),
            logo_url: text(&settings.logo_url),
            settings,
            day_cursor: 1,
            current_field: SettingsField::ClinicName,
            editing: false,
            error: None,
        }
    }

    fn position(&self) -> usize {
        FIELDS.iter().position(|(f, _)| *f == self.current_field).unwrap_or(0)
    }

    pub fn next_field(&mut self) {
        self.current_field = FIELDS[(self.position() + 1) % FIELDS.len()].0;
    }

    pub fn previous_field(&mut self) {
        self.current_field = FIELDS[(self.position() + FIELDS.len() - 1) % FIELDS.len()].0;
    }

    fn text_value(&mut self) -> Option<&mut String> {
        match self.current_field {
            SettingsField::ClinicName => Some(&mut self.settings.clinic_name),
            SettingsField::Opening => Some(&mut self.opening),
            SettingsField::Closing => Some(&mut self.closing),
            SettingsField::Interval => Some(&mut self.interval),
            SettingsField::WorkingDays => None,
            SettingsField::ContactEmail => Some(&mut self.contact_email),
            SettingsField::ContactPhone => Some(&mut self.contact_phone),
            SettingsField::Whatsapp => Some(&mut self.whatsapp),
            SettingsField::Instagram => Some(&mut self.instagram),
            SettingsField::Facebook => Some(&mut self.facebook),
            SettingsField::Address => Some(&mut self.address),
            SettingsField::LogoUrl => Some(&mut self.logo_url),
        }
    }

    fn display_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::ClinicName => self.settings.clinic_name.clone(),
            SettingsField::Opening => self.opening.clone(),
            SettingsField::Closing => self.closing.clone(),
            SettingsField::Interval => self.interval.clone(),
            SettingsField::WorkingDays => self.settings.working_days_label(),
            SettingsField::ContactEmail => self.contact_email.clone(),
            SettingsField::ContactPhone => self.contact_phone.clone(),
            SettingsField::Whatsapp => self.whatsapp.clone(),
            SettingsField::Instagram => self.instagram.clone(),
            SettingsField::Facebook => self.facebook.clone(),
            SettingsField::Address => self.address.clone(),
            SettingsField::LogoUrl => self.logo_url.clone(),
        }
    }

    pub fn build(&self) -> Result<ClinicSettings, String> {
        let mut settings = self.settings.clone();
        settings.clinic_name = settings.clinic_name.trim().to_string();
        settings.opening_time = parse_time(&self.opening).ok_or("Opening time must be HH:MM")?;
        settings.closing_time = parse_time(&self.closing).ok_or("Closing time must be HH:MM")?;
        settings.booking_interval_minutes = self
            .interval
            .trim()
            .parse::<i32>()
            .map_err(|_| "Booking interval must be a whole number of minutes".to_string())?;
        settings.contact_email = non_empty(&self.contact_email);
        settings.contact_phone = non_empty(&self.contact_phone);
        settings.whatsapp = non_empty(&self.whatsapp);
        settings.instagram = non_empty(&self.instagram);
        settings.facebook = non_empty(&self.facebook);
        settings.address = non_empty(&self.address);
        settings.logo_url = non_empty(&self.logo_url);

        match validate_settings(&settings).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(settings),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SettingsAction> {
        if self.error.take().is_some() {
            return None;
        }

        if self.editing {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.editing = false,
                other => {
                    if let Some(value) = self.text_value() {
                        edit_text(value, other);
                    }
                }
            }
            return None;
        }

        match (self.current_field, key.code) {
            (_, KeyCode::Esc) => return Some(SettingsAction::Back),
            (_, KeyCode::Up) => self.previous_field(),
            (_, KeyCode::Down) => self.next_field(),
            (_, KeyCode::Char('s')) => match self.build() {
                Ok(settings) => return Some(SettingsAction::Save(settings)),
                Err(error) => self.error = Some(error),
            },
            (SettingsField::WorkingDays, KeyCode::Left) => self.day_cursor = (self.day_cursor + 6) % 7,
            (SettingsField::WorkingDays, KeyCode::Right) => self.day_cursor = (self.day_cursor + 1) % 7,
            (SettingsField::WorkingDays, KeyCode::Char(' ') | KeyCode::Enter) => {
                self.settings.toggle_working_day(self.day_cursor as i32);
            }
            (_, KeyCode::Enter) => self.editing = true,
            _ => {}
        }
        None
    }
}

fn working_days_line(state: &SettingsState, selected: bool) -> Spans<'static> {
    let label_style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut spans = vec![Span::styled("Working days: ", label_style)];
    for (day, name) in WEEKDAY_NAMES.iter().enumerate() {
        let on = state.settings.working_days.contains(&(day as i32));
        let mut style = if on {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if selected && day == state.day_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let mark = if on { "x" } else { " " };
        spans.push(Span::styled(format!("[{}]{}", mark, name), style));
        spans.push(Span::raw(" "));
    }
    Spans::from(spans)
}

pub fn render_settings<B: Backend>(frame: &mut Frame<B>, state: &mut SettingsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(14), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let title = Paragraph::new("Clinic settings")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|(field, label)| {
            let selected = *field == state.current_field;
            if *field == SettingsField::WorkingDays {
                ListItem::new(working_days_line(state, selected))
            } else {
                ListItem::new(field_line(label, &state.display_value(*field), selected, state.editing))
            }
        })
        .collect();
    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("General, hours and contact"));
    frame.render_widget(form, chunks[1]);

    let help = match (state.editing, state.current_field) {
        (true, _) => "Enter - Save field | Esc - Stop editing",
        (false, SettingsField::WorkingDays) => "Left/Right - Day | Space - Toggle | Up/Down - Navigate | S - Save | Esc - Back",
        (false, _) => "Enter - Edit field | Up/Down - Navigate | S - Save | Esc - Back",
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if let Some(error) = &state.error {
        render_notification(frame, &Notification::error(error.clone()));
    }
}

pub fn handle_input(state: &mut SettingsState) -> Result<Option<SettingsAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
