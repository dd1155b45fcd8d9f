use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

use crate::models::{Category, Service};
use crate::ui::components::popup::render_confirmation;
use crate::ui::components::{checkbox, cycle, read_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Back,
    NewService,
    EditService(i32),
    DeleteService(i32),
    SetActive(i32, bool),
    SetFeatured(i32, bool),
}

pub struct ServicesState {
    services: Vec<Service>,
    categories: Vec<Category>,
    tab: usize,
    table_state: TableState,
    show_delete_confirmation: bool,
}

impl ServicesState {
    pub fn new(services: Vec<Service>, categories: Vec<Category>) -> Self {
        let mut state = Self {
            services,
            categories,
            tab: 0,
            table_state: TableState::default(),
            show_delete_confirmation: false,
        };
        state.reset_selection();
        state
    }

    /// Keeps the tab and the cursor across a reload.
    pub fn reload(&mut self, services: Vec<Service>, categories: Vec<Category>) {
        let selected = self.selected_service().map(|s| s.id);
        self.services = services;
        self.categories = categories;
        if self.tab > self.categories.len() {
            self.tab = 0;
        }
        let index = selected.and_then(|id| self.visible_services().iter().position(|s| s.id == id));
        match index {
            Some(i) => self.table_state.select(Some(i)),
            None => self.reset_selection(),
        }
    }

    pub fn visible_services(&self) -> Vec<&Service> {
        let category = match self.tab {
            0 => None,
            i => self.categories.get(i - 1).map(|c| c.id),
        };
        self.services
            .iter()
            .filter(|s| category.is_none() || s.category_id == category)
            .collect()
    }

    fn reset_selection(&mut self) {
        let empty = self.visible_services().is_empty();
        self.table_state.select(if empty { None } else { Some(0) });
    }

    pub fn selected_service(&self) -> Option<&Service> {
        let visible = self.visible_services();
        self.table_state.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ServiceAction> {
        if self.show_delete_confirmation {
            match key.code {
                KeyCode::Char('y') => {
                    self.show_delete_confirmation = false;
                    return self.selected_service().map(|s| ServiceAction::DeleteService(s.id));
                }
                KeyCode::Char('n') | KeyCode::Esc => self.show_delete_confirmation = false,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Some(ServiceAction::Back),
            KeyCode::Right | KeyCode::Tab => {
                self.tab = (self.tab + 1) % (self.categories.len() + 1);
                self.reset_selection();
            }
            KeyCode::Left | KeyCode::BackTab => {
                let tabs = self.categories.len() + 1;
                self.tab = (self.tab + tabs - 1) % tabs;
                self.reset_selection();
            }
            KeyCode::Down => {
                let len = self.visible_services().len();
                self.table_state.select(cycle(self.table_state.selected(), len, 1));
            }
            KeyCode::Up => {
                let len = self.visible_services().len();
                self.table_state.select(cycle(self.table_state.selected(), len, -1));
            }
            KeyCode::Char('n') => return Some(ServiceAction::NewService),
            KeyCode::Char('e') | KeyCode::Enter => {
                return self.selected_service().map(|s| ServiceAction::EditService(s.id));
            }
            KeyCode::Char('d') => {
                if self.selected_service().is_some() {
                    self.show_delete_confirmation = true;
                }
            }
            KeyCode::Char('a') => {
                return self.selected_service().map(|s| ServiceAction::SetActive(s.id, !s.active));
            }
            KeyCode::Char('f') => {
                return self.selected_service().map(|s| ServiceAction::SetFeatured(s.id, !s.featured));
            }
            _ => {}
        }
        None
    }
}

pub fn render_services<B: Backend>(frame: &mut Frame<B>, state: &mut ServicesState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let mut titles = vec![Spans::from("All")];
    titles.extend(state.categories.iter().map(|c| Spans::from(c.name.clone())));
    let tabs = Tabs::new(titles)
        .select(state.tab)
        .block(Block::default().title("Services").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    let header = Row::new(
        ["Title", "Category", "Price", "Duration", "Active", "Featured"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow))),
    )
    .bottom_margin(1);

    let rows = state.visible_services().into_iter().map(|s| {
        let style = if s.active {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Row::new(vec![
            Cell::from(s.title.clone()),
            Cell::from(s.category_name.clone().unwrap_or_else(|| "-".to_string())),
            Cell::from(s.price_label()),
            Cell::from(s.duration_label()),
            Cell::from(checkbox(s.active)),
            Cell::from(checkbox(s.featured)),
        ])
        .style(style)
    });

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD))
        .widths(&[
            Constraint::Percentage(32),
            Constraint::Percentage(20),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(9),
        ]);
    frame.render_stateful_widget(table, chunks[1], &mut state.table_state);

    let help = Paragraph::new(
        "Left/Right - Category | <N> New | <E> Edit | <D> Delete | <A> Toggle active | <F> Toggle featured | <Esc> Back",
    )
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this service?",
                "Services with appointments can only be deactivated.",
            ],
        );
    }
}

pub fn handle_input(state: &mut ServicesState) -> Result<Option<ServiceAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
