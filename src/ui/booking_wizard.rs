use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::booking::BookingRequest;
use crate::models::{Category, ClinicSettings, Service};
use crate::ui::components::date_input::DateInput;
use crate::ui::components::popup::{render_notification, Notification};
use crate::ui::components::{cycle, edit_text, field_line, read_key};
use crate::validation::validate_booking_contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Service,
    DateTime,
    Details,
}

impl BookingStep {
    fn number(&self) -> usize {
        match self {
            BookingStep::Service => 1,
            BookingStep::DateTime => 2,
            BookingStep::Details => 3,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            BookingStep::Service => "Service",
            BookingStep::DateTime => "Date & Time",
            BookingStep::Details => "Personal details",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsField {
    Name,
    Email,
    Phone,
    Notes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    Cancel,
    LoadSlots { date: NaiveDate, service_id: i32 },
    Submit(BookingRequest),
    /// The confirmation was acknowledged.
    Done,
}

pub struct BookingWizardState {
    pub step: BookingStep,
    settings: ClinicSettings,
    categories: Vec<Category>,
    services: Vec<Service>,
    category_tab: usize,
    service_list: ListState,
    selected_service: Option<i32>,
    pub date: DateInput,
    slots: Vec<NaiveTime>,
    slots_loaded: bool,
    slot_list: ListState,
    selected_time: Option<NaiveTime>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub current_field: DetailsField,
    pub editing: bool,
    error: Option<String>,
    confirmation: Option<String>,
}

impl BookingWizardState {
    pub fn new(
        settings: ClinicSettings,
        categories: Vec<Category>,
        services: Vec<Service>,
        today: NaiveDate,
    ) -> Self {
        let mut state = Self {
            step: BookingStep::Service,
            settings,
            categories,
            services: services.into_iter().filter(|s| s.active).collect(),
            category_tab: 0,
            service_list: ListState::default(),
            selected_service: None,
            date: DateInput::new(today).not_before(today),
            slots: Vec::new(),
            slots_loaded: false,
            slot_list: ListState::default(),
            selected_time: None,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            notes: String::new(),
            current_field: DetailsField::Name,
            editing: false,
            error: None,
            confirmation: None,
        };
        state.reset_service_cursor();
        state
    }

    /// Starts with a service already chosen, e.g. from the catalogue.
    pub fn with_service(mut self, service_id: i32) -> Self {
        if let Some(service) = self.services.iter().find(|s| s.id == service_id) {
            if let Some(tab) = service
                .category_id
                .and_then(|c| self.categories.iter().position(|cat| cat.id == c))
            {
                self.category_tab = tab + 1;
            }
            self.reset_service_cursor();
            let index = self.visible_services().iter().position(|s| s.id == service_id);
            self.service_list.select(index);
            self.selected_service = Some(service_id);
        }
        self
    }

    fn visible_services(&self) -> Vec<&Service> {
        let category = match self.category_tab {
            0 => None,
            i => self.categories.get(i - 1).map(|c| c.id),
        };
        self.services
            .iter()
            .filter(|s| category.is_none() || s.category_id == category)
            .collect()
    }

    fn reset_service_cursor(&mut self) {
        let empty = self.visible_services().is_empty();
        self.service_list.select(if empty { None } else { Some(0) });
    }

    pub fn selected_service(&self) -> Option<&Service> {
        self.selected_service
            .and_then(|id| self.services.iter().find(|s| s.id == id))
    }

    pub fn selected_time(&self) -> Option<NaiveTime> {
        self.selected_time
    }

    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn confirmation(&self) -> Option<&str> {
        self.confirmation.as_deref()
    }

    pub fn is_step_complete(&self, step: BookingStep) -> bool {
        match step {
            BookingStep::Service => self.selected_service.is_some(),
            BookingStep::DateTime => self.selected_time.is_some(),
            BookingStep::Details => validate_booking_contact(&self.name, &self.email, &self.phone).is_empty(),
        }
    }

    /// New slot list for the current date and service.
    pub fn set_slots(&mut self, slots: Vec<NaiveTime>) {
        self.slots = slots;
        self.slots_loaded = true;
        if self.selected_time.is_some_and(|t| !self.slots.contains(&t)) {
            self.selected_time = None;
        }
        let index = match self.selected_time {
            Some(t) => self.slots.iter().position(|s| *s == t),
            None if self.slots.is_empty() => None,
            None => Some(0),
        };
        self.slot_list.select(index);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn confirm(&mut self, message: impl Into<String>) {
        self.confirmation = Some(message.into());
    }

    /// The chosen time was taken in the meantime; pick another one.
    pub fn slot_taken(&mut self, message: impl Into<String>) -> Option<BookingAction> {
        self.error = Some(message.into());
        self.selected_time = None;
        self.step = BookingStep::DateTime;
        self.reload_slots()
    }

    /// Clears the slot list and asks for it to be reloaded.
    fn reload_slots(&mut self) -> Option<BookingAction> {
        self.slots.clear();
        self.slots_loaded = false;
        self.slot_list.select(None);
        self.selected_time = None;
        self.selected_service.map(|service_id| BookingAction::LoadSlots {
            date: self.date.date,
            service_id,
        })
    }

    fn choose_service(&mut self, service_id: i32) -> Option<BookingAction> {
        let changed = self.selected_service != Some(service_id);
        self.selected_service = Some(service_id);
        self.step = BookingStep::DateTime;
        if changed || !self.slots_loaded {
            self.reload_slots()
        } else {
            None
        }
    }

    fn switch_category(&mut self, delta: isize) {
        if let Some(tab) = cycle(Some(self.category_tab), self.categories.len() + 1, delta) {
            self.category_tab = tab;
            self.selected_service = None;
            self.selected_time = None;
            self.slots.clear();
            self.slots_loaded = false;
            self.reset_service_cursor();
        }
    }

    fn details_value(&mut self) -> &mut String {
        match self.current_field {
            DetailsField::Name => &mut self.name,
            DetailsField::Email => &mut self.email,
            DetailsField::Phone => &mut self.phone,
            DetailsField::Notes => &mut self.notes,
        }
    }

    fn next_field(&mut self) {
        self.current_field = match self.current_field {
            DetailsField::Name => DetailsField::Email,
            DetailsField::Email => DetailsField::Phone,
            DetailsField::Phone => DetailsField::Notes,
            DetailsField::Notes => DetailsField::Name,
        };
    }

    fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            DetailsField::Name => DetailsField::Notes,
            DetailsField::Email => DetailsField::Name,
            DetailsField::Phone => DetailsField::Email,
            DetailsField::Notes => DetailsField::Phone,
        };
    }

    fn submit(&mut self) -> Option<BookingAction> {
        let errors = validate_booking_contact(&self.name, &self.email, &self.phone);
        if let Some(first) = errors.into_iter().next() {
            self.error = Some(first);
            return None;
        }
        match (self.selected_service, self.selected_time) {
            (Some(service_id), Some(time)) => Some(BookingAction::Submit(BookingRequest {
                service_id,
                date: self.date.date,
                time,
                name: self.name.clone(),
                email: self.email.clone(),
                phone: self.phone.clone(),
                notes: self.notes.clone(),
            })),
            _ => {
                self.error = Some("Choose a service and a time first".to_string());
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BookingAction> {
        if self.confirmation.is_some() {
            return Some(BookingAction::Done);
        }
        if self.error.take().is_some() {
            return None;
        }

        match self.step {
            BookingStep::Service => self.handle_service_key(key.code),
            BookingStep::DateTime => self.handle_date_time_key(key.code),
            BookingStep::Details => self.handle_details_key(key.code),
        }
    }

    fn handle_service_key(&mut self, code: KeyCode) -> Option<BookingAction> {
        match code {
            KeyCode::Esc => return Some(BookingAction::Cancel),
            KeyCode::Right | KeyCode::Tab => self.switch_category(1),
            KeyCode::Left | KeyCode::BackTab => self.switch_category(-1),
            KeyCode::Down => {
                let len = self.visible_services().len();
                self.service_list.select(cycle(self.service_list.selected(), len, 1));
            }
            KeyCode::Up => {
                let len = self.visible_services().len();
                self.service_list.select(cycle(self.service_list.selected(), len, -1));
            }
            KeyCode::Enter => {
                let highlighted = self
                    .service_list
                    .selected()
                    .and_then(|i| self.visible_services().get(i).map(|s| s.id));
                if let Some(id) = highlighted {
                    return self.choose_service(id);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_date_time_key(&mut self, code: KeyCode) -> Option<BookingAction> {
        if self.date.editing {
            return match code {
                KeyCode::Enter | KeyCode::Esc => {
                    self.date.toggle_editing();
                    self.reload_slots()
                }
                other => {
                    self.date.handle_key(other);
                    None
                }
            };
        }

        match code {
            KeyCode::Esc | KeyCode::Backspace => self.step = BookingStep::Service,
            KeyCode::Char('d') => self.date.toggle_editing(),
            KeyCode::Left => {
                if self.date.shift_days(-1) {
                    return self.reload_slots();
                }
            }
            KeyCode::Right => {
                if self.date.shift_days(1) {
                    return self.reload_slots();
                }
            }
            KeyCode::Down => self.slot_list.select(cycle(self.slot_list.selected(), self.slots.len(), 1)),
            KeyCode::Up => self.slot_list.select(cycle(self.slot_list.selected(), self.slots.len(), -1)),
            KeyCode::Enter => {
                if let Some(time) = self.slot_list.selected().and_then(|i| self.slots.get(i).copied()) {
                    self.selected_time = Some(time);
                    self.step = BookingStep::Details;
                }
            }
            _ => {}
        }
        None
    }

    fn handle_details_key(&mut self, code: KeyCode) -> Option<BookingAction> {
        if self.editing {
            match code {
                KeyCode::Enter | KeyCode::Esc => self.editing = false,
                KeyCode::Tab => {
                    self.next_field();
                }
                other => {
                    edit_text(self.details_value(), other);
                }
            }
            return None;
        }

        match code {
            KeyCode::Esc => self.step = BookingStep::DateTime,
            KeyCode::Enter => self.editing = true,
            KeyCode::Down | KeyCode::Tab => self.next_field(),
            KeyCode::Up | KeyCode::BackTab => self.previous_field(),
            KeyCode::Char('s') => return self.submit(),
            _ => {}
        }
        None
    }
}

pub fn render_booking_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut BookingWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ].as_ref())
        .split(frame.size());

    let title = Paragraph::new(format!("Book an appointment at {}", state.settings.clinic_name))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let steps = [BookingStep::Service, BookingStep::DateTime, BookingStep::Details];
    let titles: Vec<Spans> = steps
        .iter()
        .map(|s| {
            let done = if state.is_step_complete(*s) && *s != state.step { " ✓" } else { "" };
            Spans::from(format!("{}. {}{}", s.number(), s.title(), done))
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.step.number() - 1)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[1]);

    match state.step {
        BookingStep::Service => render_service_step(frame, state, chunks[2]),
        BookingStep::DateTime => render_date_time_step(frame, state, chunks[2]),
        BookingStep::Details => render_details_step(frame, state, chunks[2]),
    }

    let help = match (state.step, state.editing || state.date.editing) {
        (BookingStep::Service, _) => "Left/Right - Category | Up/Down - Service | <Enter> Choose | <Esc> Cancel",
        (BookingStep::DateTime, true) => "Type digits | Left/Right - Switch date part | <Enter> Done",
        (BookingStep::DateTime, false) => {
            "Left/Right - Day | <D> Type date | Up/Down - Time | <Enter> Choose | <Esc> Back"
        }
        (BookingStep::Details, true) => "<Enter> Save field | <Tab> Next field",
        (BookingStep::Details, false) => "Up/Down - Field | <Enter> Edit | <S> Confirm booking | <Esc> Back",
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);

    if let Some(message) = &state.confirmation {
        render_notification(frame, &Notification::success(message.clone()));
    } else if let Some(error) = &state.error {
        render_notification(frame, &Notification::error(error.clone()));
    }
}

fn render_service_step<B: Backend>(frame: &mut Frame<B>, state: &mut BookingWizardState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    let mut titles = vec![Spans::from("All")];
    titles.extend(state.categories.iter().map(|c| Spans::from(c.name.clone())));
    let tabs = Tabs::new(titles)
        .select(state.category_tab)
        .block(Block::default().title("Category").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow));
    frame.render_widget(tabs, rows[0]);

    let chosen = state.selected_service;
    let items: Vec<ListItem> = state
        .visible_services()
        .iter()
        .map(|s| {
            let marker = if Some(s.id) == chosen { "(•) " } else { "( ) " };
            ListItem::new(format!(
                "{}{}  {} | {}",
                marker,
                s.title,
                s.price_label(),
                s.duration_label()
            ))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Choose a service").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, rows[1], &mut state.service_list);
}

fn render_date_time_step<B: Backend>(frame: &mut Frame<B>, state: &mut BookingWizardState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)].as_ref())
        .split(area);

    let service = state
        .selected_service()
        .map(|s| format!("{} ({})", s.title, s.duration_label()))
        .unwrap_or_default();
    let header = Paragraph::new(vec![
        Spans::from(format!("Service: {}", service)),
        Spans::from(vec![
            Span::raw("Date: "),
            Span::styled(state.date.display(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, rows[0]);

    if state.slots.is_empty() {
        let message = if !state.slots_loaded {
            "Loading available times..."
        } else if !state.settings.is_working_day(state.date.date) {
            "The clinic is closed on this day. Try another date."
        } else {
            "No free times on this day. Try another date."
        };
        let empty = Paragraph::new(message)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Available times").borders(Borders::ALL));
        frame.render_widget(empty, rows[1]);
        return;
    }

    let chosen = state.selected_time;
    let items: Vec<ListItem> = state
        .slots
        .iter()
        .map(|t| {
            let marker = if Some(*t) == chosen { "(•) " } else { "( ) " };
            ListItem::new(format!("{}{}", marker, t.format("%H:%M")))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Available times").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, rows[1], &mut state.slot_list);
}

fn render_details_step<B: Backend>(frame: &mut Frame<B>, state: &mut BookingWizardState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6)].as_ref())
        .split(area);

    let summary = format!(
        "{} on {} at {}",
        state.selected_service().map(|s| s.title.as_str()).unwrap_or("-"),
        state.date.date.format("%d/%m/%Y"),
        state.selected_time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
    );
    let summary = Paragraph::new(summary).block(Block::default().title("Your appointment").borders(Borders::ALL));
    frame.render_widget(summary, rows[0]);

    let fields = [
        (DetailsField::Name, "Name", &state.name),
        (DetailsField::Email, "E-mail", &state.email),
        (DetailsField::Phone, "Phone", &state.phone),
        (DetailsField::Notes, "Notes", &state.notes),
    ];
    let items: Vec<ListItem> = fields
        .iter()
        .map(|(field, label, value)| {
            ListItem::new(field_line(label, value, *field == state.current_field, state.editing))
        })
        .collect();
    let form = List::new(items).block(Block::default().title("Personal details").borders(Borders::ALL));
    frame.render_widget(form, rows[1]);
}

pub fn handle_input(state: &mut BookingWizardState) -> Result<Option<BookingAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::testing::{chr, key, render_to_string, type_text};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn state() -> BookingWizardState {
        let categories = vec![
            Category { id: 10, name: "Facial".into(), ..Category::blank() },
            Category { id: 20, name: "Body".into(), ..Category::blank() },
        ];
        let services = vec![
            Service { id: 1, title: "Peeling".into(), category_id: Some(10), ..Service::blank() },
            Service { id: 2, title: "Massage".into(), category_id: Some(20), ..Service::blank() },
        ];
        BookingWizardState::new(ClinicSettings::default(), categories, services, monday())
    }

    fn at_details(state: &mut BookingWizardState) {
        state.handle_key(key(KeyCode::Enter));
        state.set_slots(vec![t(9, 0), t(9, 30)]);
        state.handle_key(key(KeyCode::Enter));
    }

    fn fill(state: &mut BookingWizardState, field: DetailsField, text: &str) {
        state.current_field = field;
        state.handle_key(key(KeyCode::Enter));
        type_text(&mut *state, text, BookingWizardState::handle_key);
        state.handle_key(key(KeyCode::Enter));
    }

    #[test]
    fn choosing_a_service_moves_forward_and_requests_slots() {
        let mut state = state();
        let action = state.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Some(BookingAction::LoadSlots { date: monday(), service_id: 1 }));
        assert_eq!(state.step, BookingStep::DateTime);
    }

    #[test]
    fn cannot_leave_date_step_without_a_time() {
        let mut state = state();
        state.handle_key(key(KeyCode::Enter));
        state.set_slots(vec![]);
        state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.step, BookingStep::DateTime);
        assert!(!state.is_step_complete(BookingStep::DateTime));
    }

    #[test]
    fn changing_date_reloads_slots_and_clears_time() {
        let mut state = state();
        state.handle_key(key(KeyCode::Enter));
        state.set_slots(vec![t(9, 0)]);
        state.handle_key(key(KeyCode::Enter));
        state.handle_key(key(KeyCode::Esc));
        assert_eq!(state.selected_time(), Some(t(9, 0)));

        let action = state.handle_key(key(KeyCode::Right));
        let tuesday = monday().succ_opt().unwrap();
        assert_eq!(action, Some(BookingAction::LoadSlots { date: tuesday, service_id: 1 }));
        assert_eq!(state.selected_time(), None);
        assert!(state.slots().is_empty());
    }

    #[test]
    fn past_dates_are_not_offered() {
        let mut state = state();
        state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.handle_key(key(KeyCode::Left)), None);
        assert_eq!(state.date.date, monday());
    }

    #[test]
    fn changing_category_clears_the_service() {
        let mut state = state();
        state.handle_key(key(KeyCode::Enter));
        state.handle_key(key(KeyCode::Esc));
        assert_eq!(state.step, BookingStep::Service);
        assert!(state.selected_service().is_some());

        state.handle_key(key(KeyCode::Right));
        assert!(state.selected_service().is_none());
        assert!(!state.is_step_complete(BookingStep::Service));
    }

    #[test]
    fn going_back_keeps_entered_details() {
        let mut state = state();
        at_details(&mut state);
        fill(&mut state, DetailsField::Name, "Ana");
        state.handle_key(key(KeyCode::Esc));
        assert_eq!(state.step, BookingStep::DateTime);
        state.handle_key(key(KeyCode::Enter));
        assert_eq!(state.step, BookingStep::Details);
        assert_eq!(state.name, "Ana");
    }

    #[test]
    fn reselecting_same_service_keeps_loaded_slots() {
        let mut state = state();
        state.handle_key(key(KeyCode::Enter));
        state.set_slots(vec![t(9, 0)]);
        state.handle_key(key(KeyCode::Esc));
        assert_eq!(state.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(state.slots(), &[t(9, 0)]);
    }

    #[test]
    fn submit_requires_valid_contact() {
        let mut state = state();
        at_details(&mut state);
        fill(&mut state, DetailsField::Name, "Ana Silva");
        fill(&mut state, DetailsField::Email, "ana@");
        fill(&mut state, DetailsField::Phone, "555-0101");

        assert_eq!(state.handle_key(chr('s')), None);
        assert_eq!(state.error(), Some("Invalid e-mail address"));

        // any key dismisses the error
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.error(), None);

        state.current_field = DetailsField::Email;
        state.handle_key(key(KeyCode::Enter));
        type_text(&mut state, "example.com", BookingWizardState::handle_key);
        state.handle_key(key(KeyCode::Enter));

        let action = state.handle_key(chr('s'));
        assert_eq!(
            action,
            Some(BookingAction::Submit(BookingRequest {
                service_id: 1,
                date: monday(),
                time: t(9, 0),
                name: "Ana Silva".into(),
                email: "ana@example.com".into(),
                phone: "555-0101".into(),
                notes: String::new(),
            }))
        );
    }

    #[test]
    fn taken_slot_sends_user_back_to_pick_a_time() {
        let mut state = state();
        at_details(&mut state);
        let action = state.slot_taken("The time 09:00 on 03/06/2024 is not available");
        assert_eq!(state.step, BookingStep::DateTime);
        assert_eq!(action, Some(BookingAction::LoadSlots { date: monday(), service_id: 1 }));
        assert_eq!(state.selected_time(), None);
    }

    #[test]
    fn confirmation_waits_for_a_key() {
        let mut state = state();
        state.confirm("See you on 03/06/2024 at 09:00");
        assert_eq!(state.handle_key(chr('x')), Some(BookingAction::Done));
    }

    #[test]
    fn preselected_service_opens_its_category() {
        let state = state().with_service(2);
        assert_eq!(state.selected_service().map(|s| s.id), Some(2));
        assert_eq!(state.category_tab, 2);
    }

    #[test]
    fn closed_day_message() {
        let mut state = state();
        state.handle_key(key(KeyCode::Enter));
        // 2024-06-09 is a Sunday
        state.date.set(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        state.set_slots(vec![]);
        let screen = render_to_string(100, 24, |f| render_booking_wizard(f, &mut state));
        assert!(screen.contains("The clinic is closed on this day"));
    }
}
