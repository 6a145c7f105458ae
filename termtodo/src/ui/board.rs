//! Board screen rendering: error banner, input line and the task list.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::theme;
use crate::app::{App, BoardFocus};
use crate::store::Filter;

/// Render the task board into `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // error banner
            Constraint::Length(3), // input box
            Constraint::Length(1), // inline validation error
            Constraint::Min(3),    // task list
        ])
        .split(area);

    render_banner(frame, chunks[0], app);
    render_input(frame, chunks[1], app);
    render_input_error(frame, chunks[2], app);
    render_task_list(frame, chunks[3], app);
}

fn render_banner(frame: &mut Frame, area: Rect, app: &App) {
    let Some(banner) = &app.banner else {
        return;
    };
    let line = Line::from(vec![
        Span::styled(banner.as_str(), theme::error()),
        Span::styled("  (Esc to dismiss)", theme::dimmed()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == BoardFocus::Input;
    let title = if app.editing.is_some() {
        "Edit task"
    } else {
        "Add task"
    };

    let content = if app.input.is_empty() && !focused {
        Line::from(Span::styled("What needs doing?", theme::dimmed()))
    } else {
        let mut text = app.input.clone();
        if focused {
            // The cursor column counts characters; convert before splicing.
            let at = text
                .char_indices()
                .map(|(i, _)| i)
                .nth(app.character_index)
                .unwrap_or(text.len());
            text.insert(at, '█');
        }
        Line::from(Span::styled(text, theme::normal()))
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_input_error(frame: &mut Frame, area: Rect, app: &App) {
    let Some(error) = &app.input_error else {
        return;
    };
    frame.render_widget(
        Paragraph::new(Span::styled(error.as_str(), theme::error())),
        area,
    );
}

fn render_task_list(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == BoardFocus::List;
    let block = Block::default()
        .title(filter_tabs(app))
        .borders(Borders::ALL)
        .border_style(if focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    let visible = app.visible_tasks();
    if visible.is_empty() {
        let placeholder = if app.is_busy() {
            "Loading..."
        } else {
            "No tasks yet. Type above and press Enter."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(placeholder, theme::dimmed())).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let checkbox = if task.completed { "[✓] " } else { "[ ] " };
            let text_style = if task.completed {
                theme::done()
            } else {
                theme::normal()
            };
            let stamp = task.created_at.format(&app.timestamp_format).to_string();
            let mut line = Line::from(vec![
                Span::raw(checkbox),
                Span::styled(task.text.clone(), text_style),
                Span::raw("  "),
                Span::styled(stamp, theme::timestamp()),
            ]);
            if focused && i == app.selected {
                line = line.style(theme::selected());
            }
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Title line showing every filter with its row count, the active one
/// highlighted.
fn filter_tabs(app: &App) -> Line<'static> {
    let tabs = [
        (Filter::All, app.tasks.len()),
        (Filter::Active, app.tasks.active_count()),
        (Filter::Completed, app.tasks.completed_count()),
    ];
    let mut spans = Vec::new();
    for (filter, count) in tabs {
        if !spans.is_empty() {
            spans.push(Span::raw(" / "));
        }
        let style = if filter == app.filter {
            theme::highlighted()
        } else {
            theme::dimmed()
        };
        spans.push(Span::styled(format!("{} ({count})", filter.label()), style));
    }
    Line::from(spans)
}
