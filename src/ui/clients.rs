use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
    Frame,
};

use crate::models::{AppointmentDetails, Client};
use crate::ui::components::popup::{render_confirmation, render_dialog_frame};
use crate::ui::components::{cycle, edit_text, read_key};

// Represents the state of the client list screen
pub struct ClientsState {
    clients: Vec<Client>,
    search: String,
    searching: bool,
    list_state: ListState,
    show_delete_confirmation: bool,
    history: Option<(Client, Vec<AppointmentDetails>)>,
}

impl ClientsState {
    pub fn new(clients: Vec<Client>) -> Self {
        let mut state = Self {
            clients,
            search: String::new(),
            searching: false,
            list_state: ListState::default(),
            show_delete_confirmation: false,
            history: None,
        };
        state.reset_selection();
        state
    }

    pub fn visible_clients(&self) -> Vec<&Client> {
        self.clients.iter().filter(|c| c.matches(&self.search)).collect()
    }

    fn reset_selection(&mut self) {
        let empty = self.visible_clients().is_empty();
        self.list_state.select(if empty { None } else { Some(0) });
    }

    pub fn next(&mut self) {
        let len = self.visible_clients().len();
        self.list_state.select(cycle(self.list_state.selected(), len, 1));
    }

    pub fn previous(&mut self) {
        let len = self.visible_clients().len();
        self.list_state.select(cycle(self.list_state.selected(), len, -1));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_client(&self) -> Option<&Client> {
        let visible = self.visible_clients();
        self.list_state.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn selected_client_id(&self) -> Option<i32> {
        self.selected_client().map(|c| c.id)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn show_history(&mut self, client: Client, appointments: Vec<AppointmentDetails>) {
        self.history = Some((client, appointments));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ClientAction> {
        if self.history.is_some() {
            self.history = None;
            return None;
        }

        if self.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                other => {
                    if edit_text(&mut self.search, other) {
                        self.reset_selection();
                    }
                }
            }
            return None;
        }

        if self.show_delete_confirmation {
            match key.code {
                KeyCode::Char('y') => {
                    self.toggle_delete_confirmation();
                    return self.selected_client_id().map(ClientAction::DeleteClient);
                }
                KeyCode::Char('n') | KeyCode::Esc => self.toggle_delete_confirmation(),
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                if self.search.is_empty() {
                    return Some(ClientAction::Back);
                }
                self.search.clear();
                self.reset_selection();
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('n') => return Some(ClientAction::NewClient),
            KeyCode::Char('e') => return self.selected_client_id().map(ClientAction::EditClient),
            KeyCode::Char('d') => {
                if self.selected_client().is_some() {
                    self.toggle_delete_confirmation();
                }
            }
            KeyCode::Enter | KeyCode::Char('h') => {
                return self.selected_client_id().map(ClientAction::ShowHistory);
            }
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            _ => {}
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Back,
    NewClient,
    EditClient(i32),
    DeleteClient(i32),
    ShowHistory(i32),
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(size);

    let search_style = if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let cursor = if state.searching { "|" } else { "" };
    let search = Paragraph::new(format!("{}{}", state.search, cursor))
        .style(search_style)
        .block(Block::default().title("Search name, e-mail or phone").borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = state
        .visible_clients()
        .iter()
        .map(|client| {
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:<30}", client.name)),
                Span::styled(format!("{:<32}", client.email), Style::default().fg(Color::Gray)),
                Span::raw(client.phone.clone()),
            ]))
        })
        .collect();

    let title = format!("Clients ({})", state.visible_clients().len());
    let clients_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(clients_list, chunks[1], &mut state.list_state);

    let buttons_text = if state.selected_client().is_some() {
        "</> Search | <N> New | <E> Edit | <D> Delete | <Enter> History | <Esc> Back"
    } else {
        "</> Search | <N> New | <Esc> Back"
    };
    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[2]);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this client?",
                "Their appointment history will also be deleted.",
            ],
        );
    }

    if let Some((client, appointments)) = &state.history {
        render_history(frame, client, appointments);
    }
}

fn render_history<B: Backend>(frame: &mut Frame<B>, client: &Client, appointments: &[AppointmentDetails]) {
    let inner = render_dialog_frame(frame, &format!("History of {}", client.name), 80, 70);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(1)].as_ref())
        .split(inner);

    let mut details = vec![Spans::from(format!("{} | {}", client.email, client.phone))];
    let extra: Vec<String> = [
        client.birthdate.map(|b| format!("Born {}", b.format("%d/%m/%Y"))),
        client.address.clone(),
        client.notes.clone(),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !extra.is_empty() {
        details.push(Spans::from(extra.join(" | ")));
    }
    frame.render_widget(Paragraph::new(details), rows[0]);

    render_history_table(frame, appointments, rows[1]);

    let footer = Paragraph::new("Press any key to close").style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, rows[2]);
}

fn render_history_table<B: Backend>(frame: &mut Frame<B>, appointments: &[AppointmentDetails], area: Rect) {
    if appointments.is_empty() {
        frame.render_widget(Paragraph::new("No appointments yet."), area);
        return;
    }

    let header = Row::new(["Date", "Time", "Service", "Price", "Status"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow))
    }));
    let rows = appointments.iter().map(|a| {
        Row::new(vec![
            Cell::from(a.date.format("%d/%m/%Y").to_string()),
            Cell::from(a.start_time.format("%H:%M").to_string()),
            Cell::from(a.service_title.clone()),
            Cell::from(format!("$ {:.2}", a.service_price)),
            Cell::from(a.status.label()),
        ])
    });
    let table = Table::new(rows).header(header).widths(&[
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Percentage(40),
        Constraint::Length(11),
        Constraint::Length(10),
    ]);
    frame.render_widget(table, area);
}

pub fn handle_input(state: &mut ClientsState) -> Result<Option<ClientAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
