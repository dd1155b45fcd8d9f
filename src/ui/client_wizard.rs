use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::Client;
use crate::ui::components::popup::{render_notification, Notification};
use crate::ui::components::{edit_text, field_line, non_empty, read_key};
use crate::validation::{parse_date, validate_client};

pub enum ClientWizardAction {
    Cancel,
    Save(Client),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ClientField {
    Name,
    Email,
    Phone,
    Birthdate,
    Address,
    Notes,
}

const FIELDS: [(ClientField, &str); 6] = [
    (ClientField::Name, "Name"),
    (ClientField::Email, "E-mail"),
    (ClientField::Phone, "Phone"),
    (ClientField::Birthdate, "Birthdate (YYYY-MM-DD)"),
    (ClientField::Address, "Address"),
    (ClientField::Notes, "Notes"),
];

pub struct ClientWizardState {
    pub client: Client,
    birthdate: String,
    address: String,
    notes: String,
    pub current_field: ClientField,
    pub editing: bool,
    error: Option<String>,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self::from_existing(Client::blank())
    }

    pub fn from_existing(client: Client) -> Self {
        Self {
            birthdate: client.birthdate.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            address: client.address.clone().unwrap_or_default(),
            notes: client.notes.clone().unwrap_or_default(),
            client,
            current_field: ClientField::Name,
            editing: false,
            error: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
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

    fn value(&self, field: ClientField) -> &str {
        match field {
            ClientField::Name => &self.client.name,
            ClientField::Email => &self.client.email,
            ClientField::Phone => &self.client.phone,
            ClientField::Birthdate => &self.birthdate,
            ClientField::Address => &self.address,
            ClientField::Notes => &self.notes,
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            ClientField::Name => &mut self.client.name,
            ClientField::Email => &mut self.client.email,
            ClientField::Phone => &mut self.client.phone,
            ClientField::Birthdate => &mut self.birthdate,
            ClientField::Address => &mut self.address,
            ClientField::Notes => &mut self.notes,
        };
        edit_text(field_value, key);
    }

    /// The client to store, or the first problem with the form.
    pub fn build(&self) -> Result<Client, String> {
        let mut client = self.client.clone();
        client.name = client.name.trim().to_string();
        client.email = client.email.trim().to_string();
        client.phone = client.phone.trim().to_string();
        client.address = non_empty(&self.address);
        client.notes = non_empty(&self.notes);
        client.birthdate = match non_empty(&self.birthdate) {
            None => None,
            Some(text) => Some(parse_date(&text).ok_or("Birthdate must be YYYY-MM-DD")?),
        };

        match validate_client(&client).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(client),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ClientWizardAction> {
        if self.error.take().is_some() {
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                if self.editing {
                    self.toggle_editing();
                } else {
                    return Some(ClientWizardAction::Cancel);
                }
            }
            KeyCode::Enter => self.toggle_editing(),
            KeyCode::Up if !self.editing => self.previous_field(),
            KeyCode::Down if !self.editing => self.next_field(),
            KeyCode::Char('s') if !self.editing => match self.build() {
                Ok(client) => return Some(ClientWizardAction::Save(client)),
                Err(error) => self.error = Some(error),
            },
            other if self.editing => self.edit_current_field(other),
            _ => {}
        }
        None
    }
}

impl Default for ClientWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(3)].as_ref())
        .split(f.size());

    let title_text = if state.client.id == 0 {
        "New client"
    } else {
        "Edit client"
    };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|(field, label)| {
            ListItem::new(field_line(
                label,
                state.value(*field),
                *field == state.current_field,
                state.editing,
            ))
        })
        .collect();
    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Client details"));
    f.render_widget(form, chunks[1]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save client | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if let Some(error) = &state.error {
        render_notification(f, &Notification::error(error.clone()));
    }
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
