use crate::app::{Body, CARD_WIDTH, GENRES, Grid};
use crate::render::MovieCard;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows taken by one card, borders included.
const CARD_HEIGHT: u16 = 6;

pub fn render(grid: &Grid, columns: usize, frame: &mut Frame, area: Rect) {
    match &grid.body {
        Body::Loading(count) => render_cells(*count, columns, None, frame, area, |_| skeleton()),
        Body::Cards(cards) => render_cells(
            cards.len(),
            columns,
            Some(grid.selected),
            frame,
            area,
            |i| card_lines(&cards[i]),
        ),
        Body::Empty(message) => render_message(message, Color::DarkGray, frame, area),
        Body::Error(message) => render_message(message, Color::Red, frame, area),
    }
}

fn render_message(message: &str, color: Color, frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().padding(Padding::top(2)));
    frame.render_widget(paragraph, area);
}

/// Lay `count` cells out in rows of `columns`, scrolled so the selected cell
/// is on screen.
fn render_cells<'a>(
    count: usize,
    columns: usize,
    selected: Option<usize>,
    frame: &mut Frame,
    area: Rect,
    lines: impl Fn(usize) -> Vec<Line<'a>>,
) {
    let columns = columns.max(1);
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = selected.unwrap_or(0) / columns;
    let first_row = (selected_row + 1).saturating_sub(visible_rows);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (r, row_area) in rows.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(CARD_WIDTH); columns])
            .split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            let index = (first_row + r) * columns + c;
            if index >= count {
                return;
            }
            let is_selected = selected == Some(index);
            let border = if is_selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let card = Paragraph::new(lines(index))
                .block(Block::default().borders(Borders::ALL).border_style(border));
            frame.render_widget(card, *cell);
        }
    }
}

fn card_lines(card: &MovieCard) -> Vec<Line<'static>> {
    let inner = (CARD_WIDTH - 2) as usize;
    let mut lines = vec![
        Line::from(Span::styled(
            truncate_str(&card.title, inner),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_str(&card.meta(), inner),
            Style::default().fg(Color::Yellow),
        )),
    ];
    if let Some(extra) = &card.extra {
        lines.push(Line::from(Span::styled(
            truncate_str(extra, inner),
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::from(Span::styled(
        truncate_str(&card.poster, inner),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn skeleton() -> Vec<Line<'static>> {
    let shade = Style::default().fg(Color::DarkGray);
    vec![
        Line::from(Span::styled("░".repeat(18), shade)),
        Line::from(Span::styled("░".repeat(10), shade)),
        Line::from(Span::styled("░".repeat(14), shade)),
    ]
}

/// The genre list; nothing is fetched until one is picked.
pub fn render_picker(selected: usize, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = GENRES
        .iter()
        .map(|genre| ListItem::new(Line::from(format!(" {}", genre))))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Genres "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn display_width(s: &str) -> u16 {
    s.width().min(u16::MAX as usize) as u16
}

/// Truncate a string to `max_width` terminal columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        result.push(c);
        used += w;
    }
    result.push('…');
    result
}
