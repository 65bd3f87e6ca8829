use super::grid::truncate_str;
use crate::app::{DetailBody, DetailView};
use crate::render::{DetailCard, MovieCard};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

const SIMILAR_CARD_WIDTH: u16 = 24;

pub fn render(detail: &DetailView, frame: &mut Frame, area: Rect) {
    match &detail.body {
        DetailBody::Loading => {
            let loading = Paragraph::new("Loading movie…")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
            frame.render_widget(loading, area);
        }
        DetailBody::Error(message) => {
            let error = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(error, area);
        }
        DetailBody::Ready { card, similar, selected } => {
            if similar.is_empty() {
                render_card(card, frame, area);
            } else {
                // Layout: detail(min) + similar carousel(6)
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(8), Constraint::Length(6)])
                    .split(area);
                render_card(card, frame, chunks[0]);
                render_similar(similar, *selected, frame, chunks[1]);
            }
        }
    }
}

fn render_card(card: &DetailCard, frame: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let field = |name: &'static str, value: &str, style: Style| {
        Line::from(vec![
            Span::styled(format!(" {}: ", name), label),
            Span::styled(value.to_string(), style),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", card.title),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field("Release", &card.release, Style::default().fg(Color::White)),
        field("Rating", &format!("⭐ {}", card.rating), Style::default().fg(Color::Yellow)),
        field("Genres", &card.genres, Style::default().fg(Color::Cyan)),
        field("Cast", &card.cast, Style::default().fg(Color::White)),
        field(
            "Poster",
            &card.poster,
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        ),
        Line::from(""),
        Line::from(Span::styled(" Overview:", label)),
        Line::from(format!(" {}", card.overview)),
    ];

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Movie Detail ")
            .title_bottom(Line::from(" Esc/b: back ").alignment(Alignment::Right)),
    );
    frame.render_widget(paragraph, area);
}

/// One row of similar titles, scrolled so the selected one is visible.
fn render_similar(similar: &[MovieCard], selected: usize, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Similar Movies ")
        .title_bottom(
            Line::from(format!(" ←→ {}/{} ", selected + 1, similar.len()))
                .alignment(Alignment::Right),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = (inner.width / SIMILAR_CARD_WIDTH).max(1) as usize;
    let first = (selected + 1).saturating_sub(visible);
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Length(SIMILAR_CARD_WIDTH); visible])
        .split(inner);

    for (cell, (index, movie)) in cells.iter().zip(similar.iter().enumerate().skip(first)) {
        let style = if index == selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let width = (SIMILAR_CARD_WIDTH - 2) as usize;
        let text = vec![
            Line::from(Span::styled(
                truncate_str(&movie.title, width),
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                truncate_str(&movie.meta(), width),
                Style::default().fg(Color::Yellow),
            )),
        ];
        let card = Paragraph::new(text).block(Block::default().borders(Borders::ALL).border_style(style));
        frame.render_widget(card, *cell);
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{MovieDetail, MovieSummary};
    use crate::app::{DetailBody, DetailView, View};
    use crate::render::{detail_card, render_movies};
    use crate::session::{Role, Session};
    use crate::ui::testing::{app_with, draw};

    fn detail_app(similar: Vec<MovieSummary>) -> String {
        let (mut app, _dir) = app_with(Session {
            user_id: Some(7),
            role: Some(Role::User),
            username: None,
        });
        let movie = MovieDetail {
            movie_id: Some(42),
            title: Some("Heat".to_string()),
            cast: Some("Al Pacino, Robert De Niro".to_string()),
            ..MovieDetail::default()
        };
        app.view = View::MovieDetail(DetailView {
            movie_id: 42,
            body: DetailBody::Ready {
                card: detail_card(&movie),
                similar: render_movies(&similar, None),
                selected: 0,
            },
        });
        draw(&app, 110, 36)
    }

    #[test]
    fn test_detail_with_similar() {
        let screen = detail_app(vec![MovieSummary {
            movie_id: Some(43),
            title: Some("Ronin".to_string()),
            ..MovieSummary::default()
        }]);
        assert!(screen.contains("Heat"));
        assert!(screen.contains("Al Pacino, Robert De Niro"));
        assert!(screen.contains("Genres: N/A"));
        assert!(screen.contains("Similar Movies"));
        assert!(screen.contains("Ronin"));
    }

    #[test]
    fn test_detail_without_similar_hides_section() {
        let screen = detail_app(Vec::new());
        assert!(screen.contains("Release: Unknown"));
        assert!(!screen.contains("Similar Movies"));
    }
}
