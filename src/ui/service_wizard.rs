use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Category, Service};
use crate::ui::components::popup::{render_notification, Notification};
use crate::ui::components::{checkbox, edit_text, field_line, non_empty, read_key};
use crate::validation::validate_service;

pub enum ServiceWizardAction {
    Cancel,
    Save(Service),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceField {
    Title,
    Category,
    Description,
    FullDescription,
    Price,
    Duration,
    ImageUrl,
    Active,
    Featured,
}

const FIELDS: [(ServiceField, &str); 9] = [
    (ServiceField::Title, "Title"),
    (ServiceField::Category, "Category"),
    (ServiceField::Description, "Short description"),
    (ServiceField::FullDescription, "Full description"),
    (ServiceField::Price, "Price"),
    (ServiceField::Duration, "Duration (minutes)"),
    (ServiceField::ImageUrl, "Image URL"),
    (ServiceField::Active, "Active"),
    (ServiceField::Featured, "Featured"),
];

pub struct ServiceWizardState {
    pub service: Service,
    categories: Vec<Category>,
    full_description: String,
    price: String,
    duration: String,
    image_url: String,
    pub current_field: ServiceField,
    pub editing: bool,
    error: Option<String>,
}

impl ServiceWizardState {
    pub fn new(categories: Vec<Category>) -> Self {
        Self::from_existing(Service::blank(), categories)
    }

    pub fn from_existing(service: Service, categories: Vec<Category>) -> Self {
        let price = if service.id == 0 { String::new() } else { format!("{:.2}", service.price) };
        Self {
            full_description: service.full_description.clone().unwrap_or_default(),
            price,
            duration: service.duration_minutes.to_string(),
            image_url: service.image_url.clone().unwrap_or_default(),
            service,
            categories,
            current_field: ServiceField::Title,
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

    pub fn category_label(&self) -> String {
        self.service
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "(none)".to_string())
    }

    /// Steps through "(none)" and every category.
    fn cycle_category(&mut self, delta: isize) {
        let options: Vec<Option<i32>> = std::iter::once(None)
            .chain(self.categories.iter().map(|c| Some(c.id)))
            .collect();
        let current = options.iter().position(|o| *o == self.service.category_id).unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(options.len() as isize) as usize;
        self.service.category_id = options[next];
    }

    fn text_value(&mut self) -> Option<&mut String> {
        match self.current_field {
            ServiceField::Title => Some(&mut self.service.title),
            ServiceField::Description => Some(&mut self.service.description),
            ServiceField::FullDescription => Some(&mut self.full_description),
            ServiceField::Price => Some(&mut self.price),
            ServiceField::Duration => Some(&mut self.duration),
            ServiceField::ImageUrl => Some(&mut self.image_url),
            ServiceField::Category | ServiceField::Active | ServiceField::Featured => None,
        }
    }

    fn display_value(&self, field: ServiceField) -> String {
        match field {
            ServiceField::Title => self.service.title.clone(),
            ServiceField::Category => format!("< {} >", self.category_label()),
            ServiceField::Description => self.service.description.clone(),
            ServiceField::FullDescription => self.full_description.clone(),
            ServiceField::Price => self.price.clone(),
            ServiceField::Duration => self.duration.clone(),
            ServiceField::ImageUrl => self.image_url.clone(),
            ServiceField::Active => checkbox(self.service.active).to_string(),
            ServiceField::Featured => checkbox(self.service.featured).to_string(),
        }
    }

    pub fn build(&self) -> Result<Service, String> {
        let mut service = self.service.clone();
        service.title = service.title.trim().to_string();
        service.description = service.description.trim().to_string();
        service.full_description = non_empty(&self.full_description);
        service.image_url = non_empty(&self.image_url);
        service.price = self
            .price
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| "Price must be a number".to_string())?;
        service.duration_minutes = self
            .duration
            .trim()
            .parse::<i32>()
            .map_err(|_| "Duration must be a whole number of minutes".to_string())?;

        match validate_service(&service).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(service),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ServiceWizardAction> {
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
            (_, KeyCode::Esc) => return Some(ServiceWizardAction::Cancel),
            (_, KeyCode::Up) => self.previous_field(),
            (_, KeyCode::Down) => self.next_field(),
            (_, KeyCode::Char('s')) => match self.build() {
                Ok(service) => return Some(ServiceWizardAction::Save(service)),
                Err(error) => self.error = Some(error),
            },
            (ServiceField::Category, KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ')) => self.cycle_category(1),
            (ServiceField::Category, KeyCode::Left) => self.cycle_category(-1),
            (ServiceField::Active, KeyCode::Enter | KeyCode::Char(' ')) => {
                self.service.active = !self.service.active;
            }
            (ServiceField::Featured, KeyCode::Enter | KeyCode::Char(' ')) => {
                self.service.featured = !self.service.featured;
            }
            (_, KeyCode::Enter) => self.editing = true,
            _ => {}
        }
        None
    }
}

pub fn render_service_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut ServiceWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(11), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let title = if state.service.id == 0 { "New service" } else { "Edit service" };
    let title = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|(field, label)| {
            ListItem::new(field_line(
                label,
                &state.display_value(*field),
                *field == state.current_field,
                state.editing,
            ))
        })
        .collect();
    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Service details"));
    frame.render_widget(form, chunks[1]);

    let help = match (state.editing, state.current_field) {
        (true, _) => "Enter - Save field | Esc - Stop editing",
        (false, ServiceField::Category) => "Left/Right - Choose category | Up/Down - Navigate | S - Save | Esc - Cancel",
        (false, ServiceField::Active | ServiceField::Featured) => {
            "Space - Toggle | Up/Down - Navigate | S - Save | Esc - Cancel"
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

pub fn handle_input(state: &mut ServiceWizardState) -> Result<Option<ServiceWizardAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::testing::{chr, key, type_text};

    fn categories() -> Vec<Category> {
        vec![
            Category { id: 10, name: "Facial".into(), ..Category::blank() },
            Category { id: 20, name: "Body".into(), ..Category::blank() },
        ]
    }

    fn fill(state: &mut ServiceWizardState, field: ServiceField, text: &str) {
        state.current_field = field;
        state.handle_key(key(KeyCode::Enter));
        type_text(&mut *state, text, ServiceWizardState::handle_key);
        state.handle_key(key(KeyCode::Enter));
    }

    #[test]
    fn category_cycles_through_none() {
        let mut state = ServiceWizardState::new(categories());
        state.current_field = ServiceField::Category;
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.category_label(), "Facial");
        state.handle_key(key(KeyCode::Right));
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.service.category_id, None);
        state.handle_key(key(KeyCode::Left));
        assert_eq!(state.category_label(), "Body");
    }

    #[test]
    fn builds_service_with_parsed_numbers() {
        let mut state = ServiceWizardState::new(categories());
        fill(&mut state, ServiceField::Title, "Microneedling");
        fill(&mut state, ServiceField::Description, "Collagen induction");
        fill(&mut state, ServiceField::Price, "250,50");
        state.current_field = ServiceField::Duration;
        state.handle_key(key(KeyCode::Enter));
        state.handle_key(key(KeyCode::Backspace));
        state.handle_key(key(KeyCode::Backspace));
        type_text(&mut state, "90", ServiceWizardState::handle_key);
        state.handle_key(key(KeyCode::Enter));
        state.current_field = ServiceField::Featured;
        state.handle_key(chr(' '));

        match state.handle_key(chr('s')) {
            Some(ServiceWizardAction::Save(service)) => {
                assert_eq!(service.title, "Microneedling");
                assert_eq!(service.price, 250.5);
                assert_eq!(service.duration_minutes, 90);
                assert!(service.featured);
                assert!(service.active);
                assert_eq!(service.full_description, None);
            }
            _ => panic!("expected save"),
        }
    }

    #[test]
    fn bad_price_is_reported() {
        let mut state = ServiceWizardState::new(categories());
        fill(&mut state, ServiceField::Title, "Peeling");
        fill(&mut state, ServiceField::Price, "abc");
        assert!(state.handle_key(chr('s')).is_none());
        assert_eq!(state.error.as_deref(), Some("Price must be a number"));
    }

    #[test]
    fn validation_message_comes_from_rules() {
        let mut state = ServiceWizardState::new(categories());
        fill(&mut state, ServiceField::Title, "Peeling");
        fill(&mut state, ServiceField::Price, "100");
        assert!(state.handle_key(chr('s')).is_none());
        assert_eq!(state.error.as_deref(), Some("Description is required"));
    }

    #[test]
    fn existing_service_prefills_price() {
        let service = Service { id: 3, price: 99.9, ..Service::blank() };
        let state = ServiceWizardState::from_existing(service, vec![]);
        assert_eq!(state.price, "99.90");
        assert_eq!(state.duration, "60");
    }
}
