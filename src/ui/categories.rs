use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::Category;
use crate::ui::components::popup::render_confirmation;
use crate::ui::components::{checkbox, cycle, read_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryAction {
    Back,
    NewCategory,
    EditCategory(i32),
    DeleteCategory(i32),
}

pub struct CategoriesState {
    categories: Vec<Category>,
    table_state: TableState,
    show_delete_confirmation: bool,
}

impl CategoriesState {
    pub fn new(categories: Vec<Category>) -> Self {
        let mut table_state = TableState::default();
        if !categories.is_empty() {
            table_state.select(Some(0));
        }
        Self {
            categories,
            table_state,
            show_delete_confirmation: false,
        }
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.table_state.selected().and_then(|i| self.categories.get(i))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<CategoryAction> {
        if self.show_delete_confirmation {
            match key.code {
                KeyCode::Char('y') => {
                    self.show_delete_confirmation = false;
                    return self.selected_category().map(|c| CategoryAction::DeleteCategory(c.id));
                }
                KeyCode::Char('n') | KeyCode::Esc => self.show_delete_confirmation = false,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Some(CategoryAction::Back),
            KeyCode::Down => self
                .table_state
                .select(cycle(self.table_state.selected(), self.categories.len(), 1)),
            KeyCode::Up => self
                .table_state
                .select(cycle(self.table_state.selected(), self.categories.len(), -1)),
            KeyCode::Char('n') => return Some(CategoryAction::NewCategory),
            KeyCode::Char('e') | KeyCode::Enter => {
                return self.selected_category().map(|c| CategoryAction::EditCategory(c.id));
            }
            KeyCode::Char('d') => {
                if self.selected_category().is_some() {
                    self.show_delete_confirmation = true;
                }
            }
            _ => {}
        }
        None
    }
}

pub fn render_categories<B: Backend>(frame: &mut Frame<B>, state: &mut CategoriesState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let header = Row::new(
        ["Order", "Name", "Description", "Active"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow))),
    )
    .bottom_margin(1);
    let rows = state.categories.iter().map(|c| {
        Row::new(vec![
            Cell::from(c.display_order.to_string()),
            Cell::from(c.name.clone()),
            Cell::from(c.description.clone().unwrap_or_default()),
            Cell::from(checkbox(c.active)),
        ])
    });
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Categories").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD))
        .widths(&[
            Constraint::Length(6),
            Constraint::Percentage(30),
            Constraint::Percentage(50),
            Constraint::Length(7),
        ]);
    frame.render_stateful_widget(table, chunks[0], &mut state.table_state);

    let help = Paragraph::new("<N> New | <E> Edit | <D> Delete | <Esc> Back")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[1]);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this category?",
                "Its services will be left without a category.",
            ],
        );
    }
}

pub fn handle_input(state: &mut CategoriesState) -> Result<Option<CategoryAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
