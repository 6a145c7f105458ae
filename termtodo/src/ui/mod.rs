//! Terminal UI rendering.

pub mod board;
pub mod login;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::{App, Screen};

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Content above, one-line status bar below.
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    match app.screen {
        Screen::Login => login::render(frame, main_chunks[0], app),
        Screen::Board => board::render(frame, main_chunks[0], app),
    }

    status_bar::render(frame, main_chunks[1], app);
}
