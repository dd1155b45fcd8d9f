use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::components::popup::{centered_rect, render_notification, Notification};
use crate::ui::components::{edit_text, field_line, read_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginAction {
    Back,
    Submit { email: String, password: String },
}

/// Staff sign-in. Both fields take typing directly.
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub current_field: LoginField,
    error: Option<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            current_field: LoginField::Email,
            error: None,
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.password.clear();
        self.current_field = LoginField::Password;
    }

    fn switch_field(&mut self) {
        self.current_field = match self.current_field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<LoginAction> {
        if self.error.take().is_some() {
            return None;
        }

        match key.code {
            KeyCode::Esc => return Some(LoginAction::Back),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.switch_field(),
            KeyCode::Enter => {
                if self.current_field == LoginField::Email {
                    self.current_field = LoginField::Password;
                } else if self.email.trim().is_empty() || self.password.is_empty() {
                    self.error = Some("E-mail and password are required".to_string());
                } else {
                    return Some(LoginAction::Submit {
                        email: self.email.trim().to_string(),
                        password: self.password.clone(),
                    });
                }
            }
            other => {
                let value = match self.current_field {
                    LoginField::Email => &mut self.email,
                    LoginField::Password => &mut self.password,
                };
                edit_text(value, other);
            }
        }
        None
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &mut LoginState) {
    let area = centered_rect(50, 40, frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4), Constraint::Length(3)].as_ref())
        .split(area);

    let title = Paragraph::new("Staff login")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let masked = "*".repeat(state.password.chars().count());
    let items = vec![
        ListItem::new(field_line("E-mail", &state.email, state.current_field == LoginField::Email, true)),
        ListItem::new(field_line("Password", &masked, state.current_field == LoginField::Password, true)),
    ];
    let form = List::new(items).block(Block::default().borders(Borders::ALL));
    frame.render_widget(form, chunks[1]);

    let help = Paragraph::new("<Tab> Switch field | <Enter> Sign in | <Esc> Back")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if let Some(error) = &state.error {
        render_notification(frame, &Notification::error(error.clone()));
    }
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    Ok(read_key()?.and_then(|key| state.handle_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::testing::{key, render_to_string, type_text};

    #[test]
    fn enter_moves_to_password_then_submits() {
        let mut state = LoginState::new();
        type_text(&mut state, "admin@clinic.com ", LoginState::handle_key);
        assert_eq!(state.handle_key(key(KeyCode::Enter)), None);
        type_text(&mut state, "s3cret", LoginState::handle_key);
        assert_eq!(
            state.handle_key(key(KeyCode::Enter)),
            Some(LoginAction::Submit {
                email: "admin@clinic.com".into(),
                password: "s3cret".into(),
            })
        );
    }

    #[test]
    fn empty_password_is_refused_locally() {
        let mut state = LoginState::new();
        type_text(&mut state, "admin@clinic.com", LoginState::handle_key);
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.handle_key(key(KeyCode::Enter)), None);
        assert!(state.error.is_some());
    }

    #[test]
    fn failed_login_clears_the_password() {
        let mut state = LoginState::new();
        state.password = "guess".into();
        state.set_error("Invalid credentials. Check your e-mail and password.");
        assert!(state.password.is_empty());
        assert_eq!(state.current_field, LoginField::Password);
    }

    #[test]
    fn password_is_masked() {
        let mut state = LoginState::new();
        state.email = "admin@clinic.com".into();
        state.password = "hunter2".into();
        let screen = render_to_string(100, 30, |f| render_login(f, &mut state));
        assert!(screen.contains("*******"));
        assert!(!screen.contains("hunter2"));
    }
}
