use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::models::{Category, Service};
use crate::ui::components::{cycle, read_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    Back,
    Book(i32),
}

/// Public service listing with one tab per category.
pub struct CatalogState {
    categories: Vec<Category>,
    services: Vec<Service>,
    /// 0 is "All", then one tab per category.
    tab: usize,
    list_state: ListState,
}

impl CatalogState {
    pub fn new(categories: Vec<Category>, services: Vec<Service>) -> Self {
        let mut state = Self {
            categories,
            services: services.into_iter().filter(|s| s.active).collect(),
            tab: 0,
            list_state: ListState::default(),
        };
        state.reset_selection();
        state
    }

    fn selected_category(&self) -> Option<i32> {
        match self.tab {
            0 => None,
            i => self.categories.get(i - 1).map(|c| c.id),
        }
    }

    pub fn visible_services(&self) -> Vec<&Service> {
        let category = self.selected_category();
        self.services
            .iter()
            .filter(|s| category.is_none() || s.category_id == category)
            .collect()
    }

    pub fn selected_service(&self) -> Option<&Service> {
        let visible = self.visible_services();
        self.list_state.selected().and_then(|i| visible.get(i).copied())
    }

    fn reset_selection(&mut self) {
        let empty = self.visible_services().is_empty();
        self.list_state.select(if empty { None } else { Some(0) });
    }

    fn switch_tab(&mut self, delta: isize) {
        if let Some(tab) = cycle(Some(self.tab), self.categories.len() + 1, delta) {
            self.tab = tab;
            self.reset_selection();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<CatalogAction> {
        match key.code {
            KeyCode::Right | KeyCode::Tab => self.switch_tab(1),
            KeyCode::Left | KeyCode::BackTab => self.switch_tab(-1),
            KeyCode::Down => {
                let len = self.visible_services().len();
                self.list_state.select(cycle(self.list_state.selected(), len, 1));
            }
            KeyCode::Up => {
                let len = self.visible_services().len();
                self.list_state.select(cycle(self.list_state.selected(), len, -1));
            }
            KeyCode::Enter | KeyCode::Char('b') => {
                return self.selected_service().map(|s| CatalogAction::Book(s.id));
            }
            KeyCode::Esc | KeyCode::Char('q') => return Some(CatalogAction::Back),
            _ => {}
        }
        None
    }
}

pub fn render_catalog<B: Backend>(frame: &mut Frame<B>, state: &mut CatalogState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let mut titles = vec![Spans::from("All")];
    titles.extend(state.categories.iter().map(|c| Spans::from(c.name.clone())));
    let tabs = Tabs::new(titles)
        .select(state.tab)
        .block(Block::default().title("Categories").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(chunks[1]);

    let items: Vec<ListItem> = state
        .visible_services()
        .iter()
        .map(|s| {
            let marker = if s.featured { "★ " } else { "  " };
            ListItem::new(Spans::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::raw(s.title.clone()),
                Span::styled(format!("  {}", s.price_label()), Style::default().fg(Color::Green)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Services").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(list, body[0], &mut state.list_state);

    let detail = match state.selected_service() {
        Some(service) => {
            let mut lines = vec![
                Spans::from(Span::styled(service.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
                Spans::from(""),
                Spans::from(format!("Price: {}", service.price_label())),
                Spans::from(format!("Duration: {}", service.duration_label())),
            ];
            if let Some(category) = &service.category_name {
                lines.push(Spans::from(format!("Category: {}", category)));
            }
            if service.featured {
                lines.push(Spans::from(Span::styled("★ Featured", Style::default().fg(Color::Yellow))));
            }
            lines.push(Spans::from(""));
            let text = service
                .full_description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(&service.description);
            lines.extend(text.lines().map(|l| Spans::from(l.to_string())));
            lines
        }
        None => vec![Spans::from("No services in this category yet.")],
    };
    let detail = Paragraph::new(detail)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Details").borders(Borders::ALL));
    frame.render_widget(detail, body[1]);

    let help = Paragraph::new("Left/Right - Category | Up/Down - Service | <Enter> Book this service | <Esc> Back")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut CatalogState) -> Result<Option<CatalogAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::testing::{chr, key, render_to_string};

    fn category(id: i32, name: &str) -> Category {
        Category {
            id,
            name: name.into(),
            ..Category::blank()
        }
    }

    fn service(id: i32, title: &str, category_id: Option<i32>, active: bool) -> Service {
        Service {
            id,
            title: title.into(),
            description: format!("About {}", title),
            category_id,
            active,
            ..Service::blank()
        }
    }

    fn state() -> CatalogState {
        CatalogState::new(
            vec![category(10, "Facial"), category(20, "Body")],
            vec![
                service(1, "Peeling", Some(10), true),
                service(2, "Massage", Some(20), true),
                service(3, "Retired", Some(20), false),
                service(4, "Botox", Some(10), true),
            ],
        )
    }

    #[test]
    fn inactive_services_are_hidden() {
        let state = state();
        let titles: Vec<&str> = state.visible_services().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Peeling", "Massage", "Botox"]);
    }

    #[test]
    fn tabs_filter_by_category_and_reset_selection() {
        let mut state = state();
        state.handle_key(key(KeyCode::Down));
        state.handle_key(key(KeyCode::Right));
        let titles: Vec<&str> = state.visible_services().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Peeling", "Botox"]);
        assert_eq!(state.selected_service().map(|s| s.id), Some(1));

        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.selected_service().map(|s| s.id), Some(2));

        // wraps back to "All"
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.visible_services().len(), 3);
    }

    #[test]
    fn enter_books_selected_service() {
        let mut state = state();
        state.handle_key(key(KeyCode::Up));
        assert_eq!(state.handle_key(key(KeyCode::Enter)), Some(CatalogAction::Book(4)));
        assert_eq!(state.handle_key(chr('q')), Some(CatalogAction::Back));
    }

    #[test]
    fn empty_category_has_nothing_to_book() {
        let mut state = CatalogState::new(vec![category(10, "Facial")], vec![]);
        state.handle_key(key(KeyCode::Right));
        assert_eq!(state.handle_key(key(KeyCode::Enter)), None);
    }

    #[test]
    fn detail_pane_prefers_full_description() {
        let mut peeling = service(1, "Peeling", None, true);
        peeling.full_description = Some("Chemical peeling with glycolic acid".into());
        let mut state = CatalogState::new(vec![], vec![peeling]);
        let screen = render_to_string(120, 20, |f| render_catalog(f, &mut state));
        assert!(screen.contains("Chemical peeling with glycolic acid"));
        assert!(!screen.contains("About Peeling"));
    }
}
