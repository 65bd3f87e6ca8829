use super::centered_rect;
use crate::app::{LoginField, LoginForm};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Sign-in form. Nothing else is drawn while it is up.
pub fn render(form: &LoginForm, frame: &mut Frame, area: Rect) {
    let area = centered_rect(50, 50, area);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" 🎬 Cinephile: Sign In ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let field_block = |title: &'static str, focused: bool| {
        let color = if focused { Color::Cyan } else { Color::DarkGray };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
    };

    let username = Paragraph::new(form.username.as_str())
        .block(field_block(" Username ", form.focus == LoginField::Username));
    frame.render_widget(username, chunks[1]);

    // Password field (masked)
    let masked = "*".repeat(form.password.chars().count());
    let password = Paragraph::new(masked)
        .block(field_block(" Password ", form.focus == LoginField::Password));
    frame.render_widget(password, chunks[2]);

    let footer = if form.submitting {
        Paragraph::new("Signing in…").style(Style::default().fg(Color::Yellow))
    } else if let Some(error) = &form.error {
        Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red))
    } else {
        Paragraph::new("Tab: switch field | Enter: sign in | Esc: quit")
            .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(footer.alignment(Alignment::Center), chunks[3]);

    if !form.submitting {
        let (row, text) = match form.focus {
            LoginField::Username => (chunks[1], form.username.as_str()),
            LoginField::Password => (chunks[2], form.password.as_str()),
        };
        let offset = match form.focus {
            LoginField::Username => super::grid::display_width(text),
            LoginField::Password => u16::try_from(text.chars().count()).unwrap_or(u16::MAX),
        };
        let x = row
            .x
            .saturating_add(1)
            .saturating_add(offset)
            .min(row.right().saturating_sub(2));
        frame.set_cursor_position((x, row.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{LoginField, LoginForm, View};
    use crate::session::Session;
    use crate::ui::testing::{app_with, draw};

    fn screen(form: LoginForm) -> String {
        let (mut app, _dir) = app_with(Session::default());
        app.view = View::Login(form);
        draw(&app, 100, 30)
    }

    #[test]
    fn test_password_is_masked() {
        let text = screen(LoginForm {
            username: "abdullah".to_string(),
            password: "hunter2".to_string(),
            focus: LoginField::Password,
            ..LoginForm::default()
        });
        assert!(text.contains("abdullah"));
        assert!(text.contains("*******"));
        assert!(!text.contains("hunter2"));
        // No navigation before sign-in.
        assert!(!text.contains("Logout"));
    }

    #[test]
    fn test_overlong_fields_draw_without_overflow() {
        screen(LoginForm {
            username: "u".repeat(70_000),
            ..LoginForm::default()
        });
        let text = screen(LoginForm {
            password: "p".repeat(70_000),
            focus: LoginField::Password,
            ..LoginForm::default()
        });
        assert!(text.contains("****"));
    }

    #[test]
    fn test_inline_error() {
        let text = screen(LoginForm {
            error: Some("Invalid username or password.".to_string()),
            ..LoginForm::default()
        });
        assert!(text.contains("Invalid username or password."));
    }
}
