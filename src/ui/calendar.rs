use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::{AppointmentDetails, AppointmentStatus, ClinicSettings, ScheduleBlock, WEEKDAY_NAMES};
use crate::scheduling::{day_schedule, week_days, week_overview, DayOverview, DaySchedule, SlotRow};
use crate::ui::components::popup::{render_confirmation, render_dialog_frame, render_notification, Notification};
use crate::ui::components::{cycle, edit_text, field_line, non_empty, read_key};
use crate::validation::{parse_date, parse_time, validate_block};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Day,
    Week,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarAction {
    Back,
    /// The visible week changed; appointments and blocks must be fetched again.
    Reload { from: NaiveDate, to: NaiveDate },
    CreateBlock(ScheduleBlock),
    DeleteBlock(i32),
    Complete(i32),
    Cancel { id: i32, reason: Option<String> },
    NoShow(i32),
    Edit(i32),
    NewAppointment { date: NaiveDate, time: Option<NaiveTime> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField {
    StartDate,
    StartTime,
    EndDate,
    EndTime,
    Reason,
}

const BLOCK_FIELDS: [(BlockField, &str); 5] = [
    (BlockField::StartDate, "From date"),
    (BlockField::StartTime, "From time"),
    (BlockField::EndDate, "To date"),
    (BlockField::EndTime, "To time"),
    (BlockField::Reason, "Reason"),
];

/// Typed-in period to close on the agenda.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockForm {
    pub field: BlockField,
    start_date: String,
    start_time: String,
    end_date: String,
    end_time: String,
    reason: String,
}

impl BlockForm {
    fn new(date: NaiveDate, start: NaiveTime, length: Duration) -> Self {
        let starts_at = date.and_time(start);
        let ends_at = starts_at + length;
        Self {
            field: BlockField::StartDate,
            start_date: starts_at.format("%Y-%m-%d").to_string(),
            start_time: starts_at.format("%H:%M").to_string(),
            end_date: ends_at.format("%Y-%m-%d").to_string(),
            end_time: ends_at.format("%H:%M").to_string(),
            reason: String::new(),
        }
    }

    fn value(&self, field: BlockField) -> &str {
        match field {
            BlockField::StartDate => &self.start_date,
            BlockField::StartTime => &self.start_time,
            BlockField::EndDate => &self.end_date,
            BlockField::EndTime => &self.end_time,
            BlockField::Reason => &self.reason,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.field {
            BlockField::StartDate => &mut self.start_date,
            BlockField::StartTime => &mut self.start_time,
            BlockField::EndDate => &mut self.end_date,
            BlockField::EndTime => &mut self.end_time,
            BlockField::Reason => &mut self.reason,
        }
    }

    fn move_field(&mut self, delta: isize) {
        let current = BLOCK_FIELDS.iter().position(|(f, _)| *f == self.field);
        if let Some(next) = cycle(current, BLOCK_FIELDS.len(), delta) {
            self.field = BLOCK_FIELDS[next].0;
        }
    }

    pub fn build(&self) -> Result<ScheduleBlock, String> {
        let start_date = parse_date(&self.start_date).ok_or("From date must be YYYY-MM-DD")?;
        let start_time = parse_time(&self.start_time).ok_or("From time must be HH:MM")?;
        let end_date = parse_date(&self.end_date).ok_or("To date must be YYYY-MM-DD")?;
        let end_time = parse_time(&self.end_time).ok_or("To time must be HH:MM")?;

        let block = ScheduleBlock {
            id: 0,
            starts_at: start_date.and_time(start_time),
            ends_at: end_date.and_time(end_time),
            reason: non_empty(&self.reason),
            created_by: None,
        };
        match validate_block(&block).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(block),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarDialog {
    Block(BlockForm),
    Actions(i32),
    CancelReason { id: i32, reason: String },
    ConfirmUnblock(i32),
}

/// Agenda for the admin area: one day on the slot grid, or a week summary.
pub struct CalendarState {
    pub date: NaiveDate,
    today: NaiveDate,
    pub view: CalendarView,
    settings: ClinicSettings,
    appointments: Vec<AppointmentDetails>,
    blocks: Vec<ScheduleBlock>,
    schedule: DaySchedule,
    week: Vec<DayOverview>,
    row_state: ListState,
    week_state: TableState,
    pub dialog: Option<CalendarDialog>,
    error: Option<String>,
}

impl CalendarState {
    pub fn new(settings: ClinicSettings, today: NaiveDate) -> Self {
        let mut state = Self {
            date: today,
            today,
            view: CalendarView::Day,
            schedule: day_schedule(today, &settings, &[], &[]),
            week: week_overview(today, &settings, &[], &[]),
            settings,
            appointments: Vec::new(),
            blocks: Vec::new(),
            row_state: ListState::default(),
            week_state: TableState::default(),
            dialog: None,
            error: None,
        };
        state.refresh();
        state
    }

    /// Monday and Sunday of the visible week.
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        let days = week_days(self.date);
        (days[0], days[6])
    }

    pub fn set_data(&mut self, appointments: Vec<AppointmentDetails>, blocks: Vec<ScheduleBlock>) {
        self.appointments = appointments;
        self.blocks = blocks;
        self.refresh();
    }

    pub fn set_settings(&mut self, settings: ClinicSettings) {
        self.settings = settings;
        self.refresh();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    fn refresh(&mut self) {
        self.schedule = day_schedule(self.date, &self.settings, &self.appointments, &self.blocks);
        self.week = week_overview(self.date, &self.settings, &self.appointments, &self.blocks);

        let len = self.schedule.rows.len();
        let selected = match self.row_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.row_state.select(selected);
        self.week_state
            .select(Some(self.date.weekday().num_days_from_monday() as usize));
    }

    pub fn selected_row(&self) -> Option<&SlotRow> {
        self.row_state.selected().and_then(|i| self.schedule.rows.get(i))
    }

    fn appointment(&self, id: i32) -> Option<&AppointmentDetails> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// Moves to `date`, asking for a reload when the week changes.
    fn go_to(&mut self, date: NaiveDate) -> Option<CalendarAction> {
        let before = self.range();
        self.date = date;
        self.refresh();
        let (from, to) = self.range();
        (before != (from, to)).then_some(CalendarAction::Reload { from, to })
    }

    fn shift(&mut self, days: i64) -> Option<CalendarAction> {
        let date = self.date.checked_add_signed(Duration::days(days))?;
        self.go_to(date)
    }

    fn open_block_form(&mut self) {
        let interval = Duration::minutes(self.settings.booking_interval_minutes.max(1) as i64);
        let start = self
            .selected_row()
            .map(|r| r.time)
            .unwrap_or(self.settings.opening_time);
        self.dialog = Some(CalendarDialog::Block(BlockForm::new(self.date, start, interval)));
    }

    /// Enter on a day-view row.
    fn open_row(&mut self) -> Option<CalendarAction> {
        let row = self.selected_row()?.clone();
        let occupying = row
            .appointment
            .as_ref()
            .filter(|a| a.status.occupies_slot())
            .map(|a| a.id);

        if let Some(id) = occupying.or(row.continues) {
            self.dialog = Some(CalendarDialog::Actions(id));
        } else if let Some(id) = row.block_id {
            self.dialog = Some(CalendarDialog::ConfirmUnblock(id));
        } else if let Some(cancelled) = row.appointment {
            // a freed slot still shows what was there; editing it reopens the booking
            self.dialog = Some(CalendarDialog::Actions(cancelled.id));
        } else {
            return Some(CalendarAction::NewAppointment {
                date: self.date,
                time: Some(row.time),
            });
        }
        None
    }

    fn handle_dialog_key(&mut self, dialog: CalendarDialog, code: KeyCode) -> Option<CalendarAction> {
        match dialog {
            CalendarDialog::Block(mut form) => match code {
                KeyCode::Esc => {}
                KeyCode::Enter => match form.build() {
                    Ok(block) => return Some(CalendarAction::CreateBlock(block)),
                    Err(error) => {
                        self.error = Some(error);
                        self.dialog = Some(CalendarDialog::Block(form));
                    }
                },
                KeyCode::Up | KeyCode::BackTab => {
                    form.move_field(-1);
                    self.dialog = Some(CalendarDialog::Block(form));
                }
                KeyCode::Down | KeyCode::Tab => {
                    form.move_field(1);
                    self.dialog = Some(CalendarDialog::Block(form));
                }
                other => {
                    edit_text(form.value_mut(), other);
                    self.dialog = Some(CalendarDialog::Block(form));
                }
            },
            CalendarDialog::Actions(id) => {
                let open = self.appointment(id).is_some_and(|a| !a.status.is_final());
                match code {
                    KeyCode::Char('e') | KeyCode::Enter => return Some(CalendarAction::Edit(id)),
                    KeyCode::Char('c') if open => return Some(CalendarAction::Complete(id)),
                    KeyCode::Char('n') if open => return Some(CalendarAction::NoShow(id)),
                    KeyCode::Char('x') if open => {
                        self.dialog = Some(CalendarDialog::CancelReason { id, reason: String::new() });
                    }
                    KeyCode::Esc | KeyCode::Char('q') => {}
                    _ => self.dialog = Some(CalendarDialog::Actions(id)),
                }
            }
            CalendarDialog::CancelReason { id, mut reason } => match code {
                KeyCode::Esc => self.dialog = Some(CalendarDialog::Actions(id)),
                KeyCode::Enter => {
                    return Some(CalendarAction::Cancel {
                        id,
                        reason: non_empty(&reason),
                    });
                }
                other => {
                    edit_text(&mut reason, other);
                    self.dialog = Some(CalendarDialog::CancelReason { id, reason });
                }
            },
            CalendarDialog::ConfirmUnblock(id) => match code {
                KeyCode::Char('y') => return Some(CalendarAction::DeleteBlock(id)),
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.dialog = Some(CalendarDialog::ConfirmUnblock(id)),
            },
        }
        None
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<CalendarAction> {
        if self.error.take().is_some() {
            return None;
        }
        if let Some(dialog) = self.dialog.take() {
            return self.handle_dialog_key(dialog, key.code);
        }

        let step = match self.view {
            CalendarView::Day => 1,
            CalendarView::Week => 7,
        };

        match (self.view, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q')) => return Some(CalendarAction::Back),
            (_, KeyCode::Left) => return self.shift(-step),
            (_, KeyCode::Right) => return self.shift(step),
            (_, KeyCode::Char('t')) => return self.go_to(self.today),
            (_, KeyCode::Char('b')) => self.open_block_form(),
            (CalendarView::Day, KeyCode::Char('w')) => self.view = CalendarView::Week,
            (CalendarView::Week, KeyCode::Char('w') | KeyCode::Enter) => self.view = CalendarView::Day,
            (CalendarView::Day, KeyCode::Down) => {
                let next = cycle(self.row_state.selected(), self.schedule.rows.len(), 1);
                self.row_state.select(next);
            }
            (CalendarView::Day, KeyCode::Up) => {
                let next = cycle(self.row_state.selected(), self.schedule.rows.len(), -1);
                self.row_state.select(next);
            }
            (CalendarView::Week, KeyCode::Down) => return self.go_to(week_day_step(self.date, 1)),
            (CalendarView::Week, KeyCode::Up) => return self.go_to(week_day_step(self.date, -1)),
            (CalendarView::Day, KeyCode::Enter) => return self.open_row(),
            (CalendarView::Day, KeyCode::Char('u')) => {
                if let Some(id) = self.selected_row().and_then(|r| r.block_id) {
                    self.dialog = Some(CalendarDialog::ConfirmUnblock(id));
                }
            }
            (_, KeyCode::Char('n')) => {
                let time = match self.view {
                    CalendarView::Day => self.selected_row().filter(|r| r.is_free()).map(|r| r.time),
                    CalendarView::Week => None,
                };
                return Some(CalendarAction::NewAppointment { date: self.date, time });
            }
            _ => {}
        }
        None
    }
}

/// Next or previous day, wrapping inside the same Monday-to-Sunday week.
fn week_day_step(date: NaiveDate, delta: i64) -> NaiveDate {
    let days = week_days(date);
    let index = date.weekday().num_days_from_monday() as i64;
    days[(index + delta).rem_euclid(7) as usize]
}

fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

fn status_color(status: AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Scheduled => Color::Cyan,
        AppointmentStatus::Completed => Color::Green,
        AppointmentStatus::Cancelled => Color::DarkGray,
        AppointmentStatus::NoShow => Color::Magenta,
    }
}

fn row_spans(row: &SlotRow) -> Spans<'static> {
    let time = Span::raw(format!("{}  ", row.time.format("%H:%M")));
    let active = row.appointment.as_ref().filter(|a| a.status.occupies_slot());

    let detail = if let Some(a) = active {
        Span::styled(
            format!("{} - {} ({})", a.client_name, a.service_title, a.status.label()),
            Style::default().fg(status_color(a.status)).add_modifier(Modifier::BOLD),
        )
    } else if row.continues.is_some() {
        Span::styled("  |", Style::default().fg(Color::Cyan))
    } else if let Some(reason) = &row.blocked_reason {
        Span::styled(format!("Blocked: {}", reason), Style::default().fg(Color::Red))
    } else if let Some(a) = &row.appointment {
        Span::styled(
            format!("free (was {} - {}, {})", a.client_name, a.service_title, a.status.label()),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled("free", Style::default().fg(Color::Green))
    };

    Spans::from(vec![time, detail])
}

pub fn render_calendar<B: Backend>(frame: &mut Frame<B>, state: &mut CalendarState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let mut title = match state.view {
        CalendarView::Day => format!(
            "{} {}",
            weekday_name(state.date),
            state.date.format("%d/%m/%Y")
        ),
        CalendarView::Week => {
            let (from, to) = state.range();
            format!("Week {} - {}", from.format("%d/%m"), to.format("%d/%m/%Y"))
        }
    };
    if state.view == CalendarView::Day && !state.schedule.working_day {
        title.push_str("  (clinic closed)");
    }
    if state.date == state.today {
        title.push_str("  [today]");
    }
    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().title("Calendar").borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    match state.view {
        CalendarView::Day => render_day(frame, state, chunks[1]),
        CalendarView::Week => render_week(frame, state, chunks[1]),
    }

    let help = match state.view {
        CalendarView::Day => {
            "Left/Right - Day | T - Today | W - Week | Enter - Open | N - New | B - Block | U - Unblock | Esc - Back"
        }
        CalendarView::Week => "Left/Right - Week | Up/Down - Day | Enter - Open day | T - Today | N - New | B - Block | Esc - Back",
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if let Some(dialog) = &state.dialog {
        render_dialog(frame, state, dialog);
    }

    if let Some(error) = &state.error {
        render_notification(frame, &Notification::error(error.clone()));
    }
}

fn render_day<B: Backend>(frame: &mut Frame<B>, state: &mut CalendarState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(area);

    let items: Vec<ListItem> = state.schedule.rows.iter().map(|r| ListItem::new(row_spans(r))).collect();
    let slots = List::new(items)
        .block(Block::default().title("Slots").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(slots, columns[0], &mut state.row_state);

    let mut notes: Vec<Spans> = Vec::new();
    if !state.schedule.blocks.is_empty() {
        notes.push(Spans::from(Span::styled("Blocked", Style::default().fg(Color::Red))));
        for block in &state.schedule.blocks {
            notes.push(Spans::from(format!(
                "{} - {}  {}",
                block.starts_at.format("%d/%m %H:%M"),
                block.ends_at.format("%d/%m %H:%M"),
                block.reason_label()
            )));
        }
    }
    if !state.schedule.off_grid.is_empty() {
        notes.push(Spans::from(Span::styled("Outside the slot grid", Style::default().fg(Color::Yellow))));
        for a in &state.schedule.off_grid {
            notes.push(Spans::from(format!(
                "{}  {} - {} ({})",
                a.start_time.format("%H:%M"),
                a.client_name,
                a.service_title,
                a.status.label()
            )));
        }
    }
    if notes.is_empty() {
        notes.push(Spans::from("Nothing else on this day."));
    }
    let side = Paragraph::new(notes).block(Block::default().title("Notes").borders(Borders::ALL));
    frame.render_widget(side, columns[1]);
}

fn render_week<B: Backend>(frame: &mut Frame<B>, state: &mut CalendarState, area: Rect) {
    let header = Row::new(
        ["Day", "Date", "Appointments", "Cancelled", "Blocked", "Open"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow))),
    )
    .bottom_margin(1);

    let rows = state.week.iter().map(|d| {
        let style = if d.working_day {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Row::new(vec![
            Cell::from(weekday_name(d.date)),
            Cell::from(d.date.format("%d/%m/%Y").to_string()),
            Cell::from(d.appointments.to_string()),
            Cell::from(d.cancelled.to_string()),
            Cell::from(if d.blocked { "yes" } else { "" }),
            Cell::from(if d.working_day { "yes" } else { "closed" }),
        ])
        .style(style)
    });

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD))
        .widths(&[
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Length(9),
            Constraint::Length(8),
        ]);
    frame.render_stateful_widget(table, area, &mut state.week_state);
}

fn render_dialog<B: Backend>(frame: &mut Frame<B>, state: &CalendarState, dialog: &CalendarDialog) {
    match dialog {
        CalendarDialog::Block(form) => {
            let inner = render_dialog_frame(frame, "Block time", 60, 45);
            let mut lines: Vec<Spans> = BLOCK_FIELDS
                .iter()
                .map(|(field, label)| field_line(label, form.value(*field), *field == form.field, *field == form.field))
                .collect();
            lines.push(Spans::from(""));
            lines.push(Spans::from(Span::styled(
                "Up/Down - Field | Enter - Block | Esc - Cancel",
                Style::default().fg(Color::Gray),
            )));
            frame.render_widget(Paragraph::new(lines), inner);
        }
        CalendarDialog::Actions(id) => {
            let inner = render_dialog_frame(frame, "Appointment", 60, 40);
            let mut lines = Vec::new();
            if let Some(a) = state.appointment(*id) {
                lines.push(Spans::from(format!("{} ({})", a.client_name, a.client_phone)));
                lines.push(Spans::from(format!(
                    "{} - {} at {}",
                    a.service_title,
                    a.date.format("%d/%m/%Y"),
                    a.start_time.format("%H:%M")
                )));
                lines.push(Spans::from(Span::styled(
                    a.status.label(),
                    Style::default().fg(status_color(a.status)),
                )));
                if let Some(notes) = &a.notes {
                    lines.push(Spans::from(notes.clone()));
                }
                lines.push(Spans::from(""));
                let keys = if a.status.is_final() {
                    "<E> Edit | <Esc> Close"
                } else {
                    "<C> Complete | <X> Cancel | <N> No-show | <E> Edit | <Esc> Close"
                };
                lines.push(Spans::from(Span::styled(keys, Style::default().fg(Color::Gray))));
            }
            frame.render_widget(Paragraph::new(lines), inner);
        }
        CalendarDialog::CancelReason { reason, .. } => {
            let inner = render_dialog_frame(frame, "Cancel appointment", 60, 30);
            let lines = vec![
                field_line("Reason (optional)", reason, true, true),
                Spans::from(""),
                Spans::from(Span::styled(
                    "Enter - Cancel appointment | Esc - Back",
                    Style::default().fg(Color::Gray),
                )),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
        }
        CalendarDialog::ConfirmUnblock(_) => {
            render_confirmation(frame, "Unblock", &["Remove this block from the agenda?"]);
        }
    }
}

pub fn handle_input(state: &mut CalendarState) -> Result<Option<CalendarAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}
