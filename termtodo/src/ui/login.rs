//! Login screen rendering (sign-in / sign-up form).

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, AuthMode, LoginFocus};

/// Render the centered sign-in / sign-up form.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let form_area = centered_rect(46, 10, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(3), // email
            Constraint::Length(3), // password
            Constraint::Length(1), // error
            Constraint::Length(1), // mode switch hint
        ])
        .split(form_area);

    let title = Line::from(vec![
        Span::styled("TermTodo", theme::panel_title(theme::BOARD_TITLE)),
        Span::raw(" · "),
        Span::styled(app.login.mode.label(), theme::bold()),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    render_field(
        frame,
        chunks[1],
        "Email",
        &app.login.email,
        app.login.focus == LoginFocus::Email,
    );

    // The password renders masked; the mask keeps one bullet per character.
    let masked = "\u{2022}".repeat(app.login.password.chars().count());
    render_field(
        frame,
        chunks[2],
        "Password",
        &masked,
        app.login.focus == LoginFocus::Password,
    );

    if let Some(error) = &app.login.error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.as_str(), theme::error())),
            chunks[3],
        );
    }

    let hint = match app.login.mode {
        AuthMode::SignIn => "New here? Ctrl+T to create an account",
        AuthMode::SignUp => "Have an account? Ctrl+T to sign in",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, theme::dimmed())),
        chunks[4],
    );
}

/// Render one bordered form field with an end-of-text cursor when focused.
fn render_field(frame: &mut Frame, area: Rect, title: &str, contents: &str, focused: bool) {
    let mut display_text = contents.to_string();
    if focused {
        display_text.push('█');
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(
        Paragraph::new(Span::styled(display_text, theme::normal())).block(block),
        area,
    );
}

/// A `width` x `height` rectangle centered in `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .split(vertical[1]);

    horizontal[1]
}
