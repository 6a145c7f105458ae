//! Bottom status bar: backend mode, identity, counts and key help.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, BoardFocus, Screen};
use crate::remote::BackendKind;

/// Render the one-line status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let (dot_color, mode_text) = match (app.backend, &app.session) {
        (BackendKind::Hosted, Some(session)) => {
            (theme::SUCCESS, format!("Hosted ({})", session.user.email))
        }
        (BackendKind::Hosted, None) => (theme::WARNING, "Hosted (signed out)".to_string()),
        (BackendKind::Local, _) => (theme::HIGHLIGHT, "Local".to_string()),
    };

    let mut spans = vec![
        Span::styled("TermTodo v0.1.0", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", Style::default().fg(dot_color)),
        Span::raw(" "),
        Span::raw(mode_text),
        Span::raw(" | "),
        Span::raw(format!("{} left", app.tasks.active_count())),
    ];

    if let Some(symbol) = app.spinner_symbol() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(symbol, theme::highlighted()));
    }

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(help_text(app), theme::dimmed()));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(theme::status_bar_bg()),
        area,
    );
}

fn help_text(app: &App) -> &'static str {
    match app.screen {
        Screen::Login => "Enter: submit | Tab: switch field | Ctrl+T: sign in/up | Esc: quit",
        Screen::Board => match app.focus {
            BoardFocus::Input if app.editing.is_some() => "Enter: save | Esc: cancel",
            BoardFocus::Input => "Enter: add | Tab: task list | Esc: quit",
            BoardFocus::List => {
                "Space: toggle | e: edit | d: delete | c: clear done | f/1-3: filter | r: refresh | Tab: input"
            }
        },
    }
}
