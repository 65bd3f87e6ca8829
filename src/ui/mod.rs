mod admin;
mod detail;
mod grid;
mod help;
mod login;

use crate::app::{App, GenreView, InputMode, View};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    if let View::Login(form) = &app.view {
        login::render(form, frame, area);
    } else {
        // Layout: nav(3) + title(3) + body(min) + status(1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        render_nav(app, frame, chunks[0]);
        render_title(app, frame, chunks[1]);

        match &app.view {
            View::Genres(GenreView::Picker { selected }) => {
                grid::render_picker(*selected, frame, chunks[2])
            }
            View::MovieDetail(detail) => detail::render(detail, frame, chunks[2]),
            View::Admin(admin) => admin::render(admin, frame, chunks[2]),
            view => {
                if let Some(g) = view.grid() {
                    grid::render(g, app.columns, frame, chunks[2]);
                }
            }
        }

        render_status(app, frame, chunks[3]);
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}

fn key_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn render_nav(app: &App, frame: &mut Frame, area: Rect) {
    let nav = app.nav();
    if !nav.visible {
        return;
    }

    let active = |on: bool| {
        if on {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let items = [
        (nav.home, "h", "Home", matches!(app.view, View::Home(_))),
        (nav.trending, "t", "Trending", matches!(app.view, View::Trending(_))),
        (nav.genres, "g", "Genres", matches!(app.view, View::Genres(_))),
        (nav.history, "w", "History", matches!(app.view, View::History(_))),
        (nav.search, "/", "Search", matches!(app.view, View::Search { .. })),
        (nav.logout, "L", "Logout", false),
    ];

    let mut spans = vec![Span::styled(
        " 🎬 Cinephile ",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];
    for (shown, key, label, is_active) in items {
        if !shown {
            continue;
        }
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("[{}]", key), key_style()));
        spans.push(Span::styled(format!(" {} ", label), active(is_active)));
    }

    let who = app
        .session()
        .username
        .map(|name| format!(" {} ", name))
        .unwrap_or_default();

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .title_top(Line::from(who).alignment(Alignment::Right)),
    );
    frame.render_widget(bar, area);
}

fn render_title(app: &App, frame: &mut Frame, area: Rect) {
    if app.input_mode == InputMode::Editing {
        let label = " 🔍 Search (Enter to run, Esc to cancel): ";
        let input = Paragraph::new(format!("{}{}", label, app.search_input))
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(input, area);

        let cursor_x = area
            .x
            .saturating_add(1)
            .saturating_add(grid::display_width(label))
            .saturating_add(grid::display_width(&app.search_input));
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
        return;
    }

    let title = app.view.title().unwrap_or_default();
    let heading = Paragraph::new(format!(" {}", title))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(heading, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" ←↑↓→", key_style()),
        Span::raw(" Move  "),
        Span::styled("Enter", key_style()),
        Span::raw(" Open  "),
    ];
    if matches!(app.view, View::MovieDetail(_)) {
        spans.push(Span::styled("Esc", key_style()));
        spans.push(Span::raw(" Back  "));
    }
    spans.extend([
        Span::styled("?", key_style()),
        Span::raw(" Help  "),
        Span::styled("q", key_style()),
        Span::raw(" Quit  "),
    ]);
    if app.is_busy() {
        spans.push(Span::styled("Loading… ", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(&app.status_msg, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
pub(crate) mod testing {
    use super::render;
    use crate::api::Gateway;
    use crate::api::mock::MockTransport;
    use crate::app::App;
    use crate::session::{Session, SessionManager, SessionStore};
    use ratatui::{Terminal, backend::TestBackend};
    use std::sync::Arc;
    use tempfile::TempDir;
    use unicode_width::UnicodeWidthStr;

    /// An idle app signed in as `session`. The tempdir must outlive it.
    pub fn app_with(session: Session) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let manager = SessionManager::open(SessionStore::new(dir.path().join("session.json")));
        manager.update(session).unwrap();
        let app = App::new(Gateway::new(Arc::new(MockTransport::new())), manager, 4);
        (app, dir)
    }

    /// Draw into a test terminal and return the screen, one line per row.
    pub fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut rows = Vec::new();
        for y in 0..height {
            let mut row = String::new();
            let mut hidden = 0;
            for x in 0..width {
                // Cells behind a wide glyph are padding.
                if hidden > 0 {
                    hidden -= 1;
                    continue;
                }
                let symbol = buffer[(x, y)].symbol();
                row.push_str(symbol);
                hidden = symbol.width().saturating_sub(1);
            }
            rows.push(row);
        }
        rows.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{app_with, draw};
    use crate::app::{GenreView, InputMode, View};
    use crate::session::{Role, Session};

    fn user() -> Session {
        Session {
            user_id: Some(7),
            role: Some(Role::User),
            username: Some("abdullah".to_string()),
        }
    }

    #[test]
    fn test_user_nav_shows_every_section() {
        let (mut app, _dir) = app_with(user());
        app.view = View::Genres(GenreView::Picker { selected: 0 });
        let screen = draw(&app, 120, 30);
        for label in ["Home", "Trending", "Genres", "History", "Search", "Logout", "abdullah"] {
            assert!(screen.contains(label), "missing {label}");
        }
        assert!(screen.contains("Pick a Genre"));
    }

    #[test]
    fn test_admin_nav_only_offers_logout() {
        let (mut app, _dir) = app_with(Session {
            user_id: None,
            role: Some(Role::Admin),
            username: Some("admin".to_string()),
        });
        app.view = View::Admin(crate::app::AdminView {
            panel: crate::render::AdminPanel::placeholder(),
            status: crate::app::AdminStatus::Ready,
            selected: 0,
        });
        let screen = draw(&app, 120, 30);
        assert!(screen.contains("Logout"));
        assert!(!screen.contains("Trending"));
        assert!(!screen.contains("History"));
    }

    #[test]
    fn test_overlong_search_input_keeps_cursor_in_box() {
        let (mut app, _dir) = app_with(user());
        app.view = View::Genres(GenreView::Picker { selected: 0 });
        app.input_mode = InputMode::Editing;
        app.search_input = "x".repeat(70_000);
        let screen = draw(&app, 120, 30);
        assert!(screen.contains("xxxx"));
    }

    #[test]
    fn test_search_input_is_drawn_while_editing() {
        let (mut app, _dir) = app_with(user());
        app.view = View::Genres(GenreView::Picker { selected: 0 });
        app.input_mode = InputMode::Editing;
        app.search_input = "toy story".to_string();
        let screen = draw(&app, 120, 30);
        assert!(screen.contains("toy story"));
    }

    #[test]
    fn test_help_overlay() {
        let (mut app, _dir) = app_with(user());
        app.view = View::Genres(GenreView::Picker { selected: 0 });
        app.show_help = true;
        let screen = draw(&app, 120, 40);
        assert!(screen.contains("Keybindings"));
        assert!(screen.contains("Watch history"));
    }
}
