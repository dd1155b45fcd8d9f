pub mod date_input;
pub mod popup;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tui::{
    style::{Color, Modifier, Style},
    text::{Span, Spans},
};

/// Blocks until the next key press. Other terminal events yield `None`.
pub fn read_key() -> Result<Option<KeyEvent>> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Release {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

/// Applies a typing key to a text buffer. Returns whether it changed.
pub fn edit_text(value: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(c) => {
            value.push(c);
            true
        }
        KeyCode::Backspace => value.pop().is_some(),
        _ => false,
    }
}

/// Trimmed text, or `None` when only whitespace is left.
pub fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// One `Label: value` line of a form.
pub fn field_line(label: &str, value: &str, selected: bool, editing: bool) -> Spans<'static> {
    let label_style = if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    if selected && editing {
        Spans::from(vec![
            Span::styled(format!("{}: ", label), label_style),
            Span::styled(format!("{}|", value), Style::default().add_modifier(Modifier::BOLD)),
        ])
    } else {
        Spans::from(vec![
            Span::styled(format!("{}: ", label), label_style),
            Span::raw(value.to_string()),
        ])
    }
}

pub fn checkbox(value: bool) -> &'static str {
    if value { "[x]" } else { "[ ]" }
}

/// Moves a list selection by `delta`, wrapping at both ends.
pub fn cycle(selected: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = selected.unwrap_or(0).min(len - 1) as isize;
    Some((current + delta).rem_euclid(len as isize) as usize)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_text_pushes_and_pops() {
        let mut value = String::from("An");
        assert!(edit_text(&mut value, KeyCode::Char('a')));
        assert_eq!(value, "Ana");
        assert!(edit_text(&mut value, KeyCode::Backspace));
        assert_eq!(value, "An");
        assert!(!edit_text(&mut value, KeyCode::Up));

        let mut empty = String::new();
        assert!(!edit_text(&mut empty, KeyCode::Backspace));
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(Some(2), 3, 1), Some(0));
        assert_eq!(cycle(Some(0), 3, -1), Some(2));
        assert_eq!(cycle(None, 3, 1), Some(1));
        assert_eq!(cycle(Some(5), 3, 0), Some(2));
        assert_eq!(cycle(Some(0), 0, 1), None);
    }

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty("  Rua A, 10 "), Some("Rua A, 10".to_string()));
        assert_eq!(non_empty(" \t"), None);
    }
}
