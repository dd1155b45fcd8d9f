use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::Category;
use crate::ui::components::popup::{render_notification, Notification};
use crate::ui::components::{checkbox, edit_text, field_line, non_empty, read_key};
use crate::validation::validate_category;

pub enum CategoryWizardAction {
    Cancel,
    Save(Category),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Name,
    Description,
    Order,
    Active,
}

pub struct CategoryWizardState {
    pub category: Category,
    description: String,
    order: String,
    pub current_field: CategoryField,
    pub editing: bool,
    error: Option<String>,
}

impl CategoryWizardState {
    /// A new category goes after the existing ones.
    pub fn new(next_order: i32) -> Self {
        Self::from_existing(Category {
            display_order: next_order,
            ..Category::blank()
        })
    }

    pub fn from_existing(category: Category) -> Self {
        Self {
            description: category.description.clone().unwrap_or_default(),
            order: category.display_order.to_string(),
            category,
            current_field: CategoryField::Name,
            editing: false,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            CategoryField::Name => CategoryField::Description,
            CategoryField::Description => CategoryField::Order,
            CategoryField::Order => CategoryField::Active,
            CategoryField::Active => CategoryField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            CategoryField::Name => CategoryField::Active,
            CategoryField::Description => CategoryField::Name,
            CategoryField::Order => CategoryField::Description,
            CategoryField::Active => CategoryField::Order,
        };
    }

    pub fn build(&self) -> Result<Category, String> {
        let mut category = self.category.clone();
        category.name = category.name.trim().to_string();
        category.description = non_empty(&self.description);
        category.display_order = self
            .order
            .trim()
            .parse::<i32>()
            .map_err(|_| "Order must be a whole number".to_string())?;

        match validate_category(&category).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(category),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<CategoryWizardAction> {
        if self.error.take().is_some() {
            return None;
        }

        if self.editing {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.editing = false,
                other => {
                    let value = match self.current_field {
                        CategoryField::Name => &mut self.category.name,
                        CategoryField::Description => &mut self.description,
                        CategoryField::Order => &mut self.order,
                        CategoryField::Active => return None,
                    };
                    edit_text(value, other);
                }
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => return Some(CategoryWizardAction::Cancel),
            KeyCode::Up => self.previous_field(),
            KeyCode::Down => self.next_field(),
            KeyCode::Char('s') => match self.build() {
                Ok(category) => return Some(CategoryWizardAction::Save(category)),
                Err(error) => self.error = Some(error),
            },
            KeyCode::Enter | KeyCode::Char(' ') if self.current_field == CategoryField::Active => {
                self.category.active = !self.category.active;
            }
            KeyCode::Enter => self.editing = true,
            _ => {}
        }
        None
    }
}

pub fn render_category_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut CategoryWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let title = if state.category.id == 0 { "New category" } else { "Edit category" };
    let title = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let fields = [
        (CategoryField::Name, "Name", state.category.name.clone()),
        (CategoryField::Description, "Description", state.description.clone()),
        (CategoryField::Order, "Display order", state.order.clone()),
        (CategoryField::Active, "Active", checkbox(state.category.active).to_string()),
    ];
    let items: Vec<ListItem> = fields
        .iter()
        .map(|(field, label, value)| {
            ListItem::new(field_line(label, value, *field == state.current_field, state.editing))
        })
        .collect();
    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Category details"));
    frame.render_widget(form, chunks[1]);

    let help = if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit / toggle | Up/Down - Navigate fields | S - Save | Esc - Cancel"
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if let Some(error) = &state.error {
        render_notification(frame, &Notification::error(error.clone()));
    }
}

pub fn handle_input(state: &mut CategoryWizardState) -> Result<Option<CategoryWizardAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
