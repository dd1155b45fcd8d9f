use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

/// Message shown over the current screen until a key is pressed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }

    fn title(&self) -> &'static str {
        match self.kind {
            NotificationKind::Info => "Notice",
            NotificationKind::Success => "Success",
            NotificationKind::Error => "Error",
        }
    }

    fn color(&self) -> Color {
        match self.kind {
            NotificationKind::Info => Color::Cyan,
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
        }
    }
}

pub fn render_notification<B: Backend>(frame: &mut Frame<B>, notification: &Notification) {
    let area = centered_rect(60, 30, frame.size());

    let text = vec![
        Spans::from(""),
        Spans::from(notification.message.as_str()),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ];
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(notification.title()).borders(Borders::ALL))
        .style(Style::default().fg(notification.color()).bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Yes/no question; the caller handles `y` and `n`.
pub fn render_confirmation<B: Backend>(frame: &mut Frame<B>, title: &str, lines: &[&str]) {
    let area = centered_rect(50, 25, frame.size());

    let mut text: Vec<Spans> = vec![Spans::from("")];
    text.extend(lines.iter().map(|line| Spans::from(*line)));
    text.push(Spans::from(""));
    text.push(Spans::from("<Y> Yes  <N> No"));

    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Empty bordered box in the middle of the screen; returns the inner area.
pub fn render_dialog_frame<B: Backend>(
    frame: &mut Frame<B>,
    title: &str,
    percent_x: u16,
    percent_y: u16,
) -> Rect {
    let area = centered_rect(percent_x, percent_y, frame.size());
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(area);

    frame.render_widget(Clear, area);
    frame.render_widget(block, area);
    inner
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
