use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
    Frame,
};

use crate::dashboard::{DashboardStats, MonthlySummary};
use crate::models::AppointmentDetails;
use crate::ui::components::{cycle, read_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    Calendar,
    Clients,
    Services,
    Categories,
    Settings,
}

const MENU: [(&str, AdminSection); 5] = [
    ("Calendar", AdminSection::Calendar),
    ("Clients", AdminSection::Clients),
    ("Services", AdminSection::Services),
    ("Categories", AdminSection::Categories),
    ("Settings", AdminSection::Settings),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Open(AdminSection),
    Refresh,
    Logout,
}

pub struct DashboardState {
    user_name: String,
    today: NaiveDate,
    stats: DashboardStats,
    upcoming: Vec<AppointmentDetails>,
    summary: MonthlySummary,
    menu: ListState,
}

impl DashboardState {
    pub fn new(
        user_name: String,
        today: NaiveDate,
        stats: DashboardStats,
        upcoming: Vec<AppointmentDetails>,
        month: &[AppointmentDetails],
    ) -> Self {
        let mut menu = ListState::default();
        menu.select(Some(0));
        Self {
            user_name,
            today,
            stats,
            upcoming,
            summary: MonthlySummary::from_appointments(month),
            menu,
        }
    }

    pub fn summary(&self) -> &MonthlySummary {
        &self.summary
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<DashboardAction> {
        match key.code {
            KeyCode::Down => self.menu.select(cycle(self.menu.selected(), MENU.len(), 1)),
            KeyCode::Up => self.menu.select(cycle(self.menu.selected(), MENU.len(), -1)),
            KeyCode::Enter => return self.menu.selected().map(|i| DashboardAction::Open(MENU[i].1)),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                return Some(DashboardAction::Open(MENU[index].1));
            }
            KeyCode::Char('r') => return Some(DashboardAction::Refresh),
            KeyCode::Char('l') | KeyCode::Esc => return Some(DashboardAction::Logout),
            _ => {}
        }
        None
    }
}

fn stat_line(label: &str, value: String) -> Spans<'static> {
    Spans::from(vec![
        Span::styled(format!("{:<22}", label), Style::default().fg(Color::Yellow)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Min(5),
            Constraint::Length(3),
        ].as_ref())
        .split(frame.size());

    let title = Paragraph::new(format!(
        "Dashboard | {} | {}",
        state.user_name,
        state.today.format("%A, %d/%m/%Y")
    ))
    .style(Style::default().fg(Color::Cyan))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(37),
            Constraint::Percentage(38),
        ].as_ref())
        .split(chunks[1]);

    let items: Vec<ListItem> = MENU
        .iter()
        .enumerate()
        .map(|(i, (label, _))| ListItem::new(format!("{} {}", i + 1, label)))
        .collect();
    let menu = List::new(items)
        .block(Block::default().title("Menu").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(menu, top[0], &mut state.menu);

    let stats = &state.stats;
    let overview = Paragraph::new(vec![
        stat_line("Clients", stats.total_clients.to_string()),
        stat_line("Active services", stats.active_services.to_string()),
        stat_line("Scheduled today", stats.scheduled_today.to_string()),
        stat_line("Scheduled upcoming", stats.scheduled_upcoming.to_string()),
        stat_line("Completed", stats.completed.to_string()),
        stat_line("Cancelled", stats.cancelled.to_string()),
    ])
    .block(Block::default().title("Overview").borders(Borders::ALL));
    frame.render_widget(overview, top[1]);

    let summary = &state.summary;
    let month = Paragraph::new(vec![
        stat_line("Revenue", format!("$ {:.2}", summary.revenue)),
        stat_line("Appointments", summary.total.to_string()),
        stat_line("Completed", summary.completed.to_string()),
        stat_line("Cancelled", summary.cancelled.to_string()),
        stat_line("Average ticket", format!("$ {:.2}", summary.average_ticket)),
    ])
    .block(Block::default().title(format!("This month ({})", state.today.format("%m/%Y"))).borders(Borders::ALL));
    frame.render_widget(month, top[2]);

    let header = Row::new(["Date", "Time", "Client", "Service", "Phone"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow))
    }))
    .bottom_margin(1);
    let rows = state.upcoming.iter().map(|a| {
        Row::new(vec![
            Cell::from(a.date.format("%d/%m").to_string()),
            Cell::from(a.start_time.format("%H:%M").to_string()),
            Cell::from(a.client_name.clone()),
            Cell::from(a.service_title.clone()),
            Cell::from(a.client_phone.clone()),
        ])
    });
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title("Upcoming appointments").borders(Borders::ALL))
        .widths(&[
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ]);
    frame.render_widget(table, chunks[2]);

    let help = Paragraph::new("1-5 / <Enter> Open | <R> Refresh | <L> Logout")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);
}

pub fn handle_input(state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
