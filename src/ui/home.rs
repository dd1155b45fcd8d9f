use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::models::{ClinicSettings, Service};
use crate::ui::components::{cycle, read_key};

const MENU: [(&str, HomeAction); 4] = [
    ("Browse services", HomeAction::Catalog),
    ("Book an appointment", HomeAction::Book),
    ("Staff login", HomeAction::Login),
    ("Quit", HomeAction::Quit),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAction {
    Catalog,
    Book,
    Login,
    Quit,
}

pub struct HomeState {
    settings: ClinicSettings,
    featured: Vec<Service>,
    menu: ListState,
}

impl HomeState {
    pub fn new(settings: ClinicSettings, services: Vec<Service>) -> Self {
        let mut menu = ListState::default();
        menu.select(Some(0));
        Self {
            settings,
            featured: services.into_iter().filter(|s| s.featured && s.active).collect(),
            menu,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<HomeAction> {
        match key.code {
            KeyCode::Down => self.menu.select(cycle(self.menu.selected(), MENU.len(), 1)),
            KeyCode::Up => self.menu.select(cycle(self.menu.selected(), MENU.len(), -1)),
            KeyCode::Enter => return self.menu.selected().map(|i| MENU[i].1),
            KeyCode::Char('s') => return Some(HomeAction::Catalog),
            KeyCode::Char('b') => return Some(HomeAction::Book),
            KeyCode::Char('l') => return Some(HomeAction::Login),
            KeyCode::Char('q') | KeyCode::Esc => return Some(HomeAction::Quit),
            _ => {}
        }
        None
    }
}

fn contact_lines(settings: &ClinicSettings) -> Vec<Spans<'static>> {
    let mut lines = vec![
        Spans::from(vec![
            Span::styled("Hours: ", Style::default().fg(Color::Yellow)),
            Span::raw(settings.hours_label()),
        ]),
        Spans::from(vec![
            Span::styled("Open: ", Style::default().fg(Color::Yellow)),
            Span::raw(settings.working_days_label()),
        ]),
    ];

    let optional = [
        ("Phone", &settings.contact_phone),
        ("WhatsApp", &settings.whatsapp),
        ("E-mail", &settings.contact_email),
        ("Address", &settings.address),
        ("Instagram", &settings.instagram),
        ("Facebook", &settings.facebook),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            lines.push(Spans::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(Color::Yellow)),
                Span::raw(value.to_string()),
            ]));
        }
    }
    lines
}

pub fn render_home<B: Backend>(frame: &mut Frame<B>, state: &mut HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let title = Paragraph::new(state.settings.clinic_name.as_str())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)].as_ref())
        .split(body[0]);

    let items: Vec<ListItem> = MENU.iter().map(|(label, _)| ListItem::new(*label)).collect();
    let menu = List::new(items)
        .block(Block::default().title("Menu").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(menu, left[0], &mut state.menu);

    let contact = Paragraph::new(contact_lines(&state.settings))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Visit us").borders(Borders::ALL));
    frame.render_widget(contact, left[1]);

    let featured: Vec<ListItem> = if state.featured.is_empty() {
        vec![ListItem::new("Our services are listed in the catalogue.")]
    } else {
        state
            .featured
            .iter()
            .map(|s| {
                ListItem::new(Spans::from(vec![
                    Span::styled(format!("★ {}", s.title), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("  {} | {}", s.price_label(), s.duration_label())),
                ]))
            })
            .collect()
    };
    let featured = List::new(featured).block(Block::default().title("Featured treatments").borders(Borders::ALL));
    frame.render_widget(featured, body[1]);

    let help = Paragraph::new("<S> Services | <B> Book | <L> Staff login | <Q> Quit")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut HomeState) -> Result<Option<HomeAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::testing::{chr, key, render_to_string};

    fn state() -> HomeState {
        let featured = Service {
            id: 1,
            title: "Lymphatic drainage".into(),
            featured: true,
            price: 120.0,
            ..Service::blank()
        };
        let plain = Service {
            id: 2,
            title: "Eyebrow design".into(),
            ..Service::blank()
        };
        let settings = ClinicSettings {
            contact_phone: Some("(11) 3333-4444".into()),
            ..ClinicSettings::default()
        };
        HomeState::new(settings, vec![featured, plain])
    }

    #[test]
    fn menu_wraps_and_enter_picks_entry() {
        let mut state = state();
        assert_eq!(state.handle_key(key(KeyCode::Up)), None);
        assert_eq!(state.handle_key(key(KeyCode::Enter)), Some(HomeAction::Quit));
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.handle_key(key(KeyCode::Enter)), Some(HomeAction::Catalog));
    }

    #[test]
    fn shortcuts() {
        let mut state = state();
        assert_eq!(state.handle_key(chr('b')), Some(HomeAction::Book));
        assert_eq!(state.handle_key(chr('l')), Some(HomeAction::Login));
        assert_eq!(state.handle_key(key(KeyCode::Esc)), Some(HomeAction::Quit));
    }

    #[test]
    fn only_featured_services_are_highlighted() {
        let mut state = state();
        let screen = render_to_string(100, 24, |f| render_home(f, &mut state));
        assert!(screen.contains("Esthetic Clinic"));
        assert!(screen.contains("Lymphatic drainage"));
        assert!(!screen.contains("Eyebrow design"));
        assert!(screen.contains("(11) 3333-4444"));
    }
}
