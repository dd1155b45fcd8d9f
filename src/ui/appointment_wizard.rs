use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Appointment, AppointmentStatus, Client, Service};
use crate::ui::components::date_input::DateInput;
use crate::ui::components::popup::{render_notification, Notification};
use crate::ui::components::{cycle, edit_text, field_line, non_empty, read_key};
use crate::validation::parse_time;

pub enum AppointmentWizardAction {
    Cancel,
    Save(Appointment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentField {
    Client,
    Service,
    Date,
    Time,
    Status,
    Notes,
}

/// Admin form for booking or rescheduling an appointment.
pub struct AppointmentWizardState {
    pub appointment: Appointment,
    clients: Vec<Client>,
    services: Vec<Service>,
    client_index: Option<usize>,
    service_index: Option<usize>,
    client_search: String,
    pub date: DateInput,
    time: String,
    notes: String,
    pub current_field: AppointmentField,
    pub editing: bool,
    error: Option<String>,
}

impl AppointmentWizardState {
    pub fn new(clients: Vec<Client>, services: Vec<Service>, date: NaiveDate, time: Option<NaiveTime>) -> Self {
        let services: Vec<Service> = services.into_iter().filter(|s| s.active).collect();
        let mut appointment = Appointment::new(0, 0, date, time.unwrap_or(NaiveTime::MIN));
        appointment.status = AppointmentStatus::Scheduled;
        Self {
            client_index: (!clients.is_empty()).then_some(0),
            service_index: (!services.is_empty()).then_some(0),
            time: time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
            date: DateInput::new(date),
            appointment,
            clients,
            services,
            client_search: String::new(),
            notes: String::new(),
            current_field: AppointmentField::Client,
            editing: false,
            error: None,
        }
    }

    pub fn from_existing(appointment: Appointment, clients: Vec<Client>, services: Vec<Service>) -> Self {
        // inactive services stay selectable for the appointment that already uses one
        let services: Vec<Service> = services
            .into_iter()
            .filter(|s| s.active || s.id == appointment.service_id)
            .collect();
        Self {
            client_index: clients.iter().position(|c| c.id == appointment.client_id),
            service_index: services.iter().position(|s| s.id == appointment.service_id),
            time: appointment.start_time.format("%H:%M").to_string(),
            date: DateInput::new(appointment.date),
            notes: appointment.notes.clone().unwrap_or_default(),
            appointment,
            clients,
            services,
            client_search: String::new(),
            current_field: AppointmentField::Client,
            editing: false,
            error: None,
        }
    }

    fn is_new(&self) -> bool {
        self.appointment.id == 0
    }

    fn fields(&self) -> Vec<AppointmentField> {
        let mut fields = vec![
            AppointmentField::Client,
            AppointmentField::Service,
            AppointmentField::Date,
            AppointmentField::Time,
        ];
        if !self.is_new() {
            fields.push(AppointmentField::Status);
        }
        fields.push(AppointmentField::Notes);
        fields
    }

    fn move_field(&mut self, delta: isize) {
        let fields = self.fields();
        let current = fields.iter().position(|f| *f == self.current_field).unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(fields.len() as isize) as usize;
        self.current_field = fields[next];
    }

    pub fn selected_client(&self) -> Option<&Client> {
        self.client_index.and_then(|i| self.clients.get(i))
    }

    pub fn selected_service(&self) -> Option<&Service> {
        self.service_index.and_then(|i| self.services.get(i))
    }

    /// Jumps to the first client matching what was typed so far.
    fn search_client(&mut self) {
        if let Some(i) = self.clients.iter().position(|c| c.matches(&self.client_search)) {
            self.client_index = Some(i);
        }
    }

    pub fn build(&self) -> Result<Appointment, String> {
        let client = self.selected_client().ok_or("Choose a client")?;
        let service = self.selected_service().ok_or("Choose a service")?;
        let time = parse_time(&self.time).ok_or("Time must be HH:MM")?;

        let mut appointment = self.appointment.clone();
        appointment.client_id = client.id;
        appointment.service_id = service.id;
        appointment.date = self.date.date;
        appointment.start_time = time;
        appointment.notes = non_empty(&self.notes);
        Ok(appointment)
    }

    fn display_value(&self, field: AppointmentField) -> String {
        match field {
            AppointmentField::Client => {
                let name = self
                    .selected_client()
                    .map(|c| format!("{} <{}>", c.name, c.email))
                    .unwrap_or_else(|| "(no clients yet)".to_string());
                if self.editing && field == self.current_field {
                    format!("{}  search: {}", name, self.client_search)
                } else {
                    format!("< {} >", name)
                }
            }
            AppointmentField::Service => self
                .selected_service()
                .map(|s| format!("< {} ({}) >", s.title, s.duration_label()))
                .unwrap_or_else(|| "(no services yet)".to_string()),
            AppointmentField::Date => self.date.display(),
            AppointmentField::Time => self.time.clone(),
            AppointmentField::Status => format!("< {} >", self.appointment.status.label()),
            AppointmentField::Notes => self.notes.clone(),
        }
    }

    fn handle_editing_key(&mut self, code: KeyCode) {
        match (self.current_field, code) {
            (_, KeyCode::Enter | KeyCode::Esc) => {
                self.editing = false;
                if self.current_field == AppointmentField::Date {
                    self.date.toggle_editing();
                }
            }
            (AppointmentField::Client, other) => {
                if edit_text(&mut self.client_search, other) {
                    self.search_client();
                }
            }
            (AppointmentField::Date, other) => {
                self.date.handle_key(other);
            }
            (AppointmentField::Time, other) => {
                edit_text(&mut self.time, other);
            }
            (AppointmentField::Notes, other) => {
                edit_text(&mut self.notes, other);
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppointmentWizardAction> {
        if self.error.take().is_some() {
            return None;
        }
        if self.editing {
            self.handle_editing_key(key.code);
            return None;
        }

        match (self.current_field, key.code) {
            (_, KeyCode::Esc) => return Some(AppointmentWizardAction::Cancel),
            (_, KeyCode::Up) => self.move_field(-1),
            (_, KeyCode::Down) => self.move_field(1),
            (_, KeyCode::Char('s')) => match self.build() {
                Ok(appointment) => return Some(AppointmentWizardAction::Save(appointment)),
                Err(error) => self.error = Some(error),
            },
            (AppointmentField::Client, KeyCode::Right) => {
                self.client_index = cycle(self.client_index, self.clients.len(), 1);
            }
            (AppointmentField::Client, KeyCode::Left) => {
                self.client_index = cycle(self.client_index, self.clients.len(), -1);
            }
            (AppointmentField::Client, KeyCode::Enter) => {
                self.client_search.clear();
                self.editing = true;
            }
            (AppointmentField::Service, KeyCode::Right | KeyCode::Enter) => {
                self.service_index = cycle(self.service_index, self.services.len(), 1);
            }
            (AppointmentField::Service, KeyCode::Left) => {
                self.service_index = cycle(self.service_index, self.services.len(), -1);
            }
            (AppointmentField::Date, KeyCode::Right) => {
                self.date.shift_days(1);
            }
            (AppointmentField::Date, KeyCode::Left) => {
                self.date.shift_days(-1);
            }
            (AppointmentField::Date, KeyCode::Enter) => {
                self.date.toggle_editing();
                self.editing = true;
            }
            (AppointmentField::Status, KeyCode::Right | KeyCode::Enter) => {
                self.appointment.status = self.appointment.status.next();
            }
            (AppointmentField::Status, KeyCode::Left) => {
                for _ in 0..AppointmentStatus::ALL.len() - 1 {
                    self.appointment.status = self.appointment.status.next();
                }
            }
            (AppointmentField::Time | AppointmentField::Notes, KeyCode::Enter) => self.editing = true,
            _ => {}
        }
        None
    }
}

pub fn render_appointment_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut AppointmentWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let title = if state.is_new() { "New appointment" } else { "Edit appointment" };
    let title = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = state
        .fields()
        .into_iter()
        .map(|field| {
            let label = match field {
                AppointmentField::Client => "Client",
                AppointmentField::Service => "Service",
                AppointmentField::Date => "Date",
                AppointmentField::Time => "Time (HH:MM)",
                AppointmentField::Status => "Status",
                AppointmentField::Notes => "Notes",
            };
            ListItem::new(field_line(
                label,
                &state.display_value(field),
                field == state.current_field,
                state.editing,
            ))
        })
        .collect();
    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Appointment"));
    frame.render_widget(form, chunks[1]);

    let help = match (state.editing, state.current_field) {
        (true, AppointmentField::Client) => "Type to search | Enter - Done",
        (true, AppointmentField::Date) => "Type digits | Left/Right - Date part | Enter - Done",
        (true, _) => "Enter - Save field | Esc - Stop editing",
        (false, AppointmentField::Client) => "Left/Right - Choose | Enter - Search | S - Save | Esc - Cancel",
        (false, AppointmentField::Date) => "Left/Right - Day | Enter - Type date | S - Save | Esc - Cancel",
        (false, AppointmentField::Service | AppointmentField::Status) => {
            "Left/Right - Choose | Up/Down - Navigate | S - Save | Esc - Cancel"
        }
        (false, _) => "Enter - Edit field | Up/Down - Navigate | S - Save | Esc - Cancel",
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if let Some(error) = &state.error {
        render_notification(frame, &Notification::error(error.clone()));
    }
}

pub fn handle_input(state: &mut AppointmentWizardState) -> Result<Option<AppointmentWizardAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
