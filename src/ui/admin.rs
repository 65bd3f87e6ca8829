use crate::app::{AdminStatus, AdminView};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

pub fn render(admin: &AdminView, frame: &mut Frame, area: Rect) {
    // Layout: tiles(4) + status(1) + table(min)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[0]);
    for (tile, rect) in admin.panel.tiles.iter().zip(tiles.iter()) {
        let widget = Paragraph::new(Line::from(Span::styled(
            tile.value.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", tile.label)),
        );
        frame.render_widget(widget, *rect);
    }

    let status = match &admin.status {
        AdminStatus::Loading => Span::styled(" Loading metrics…", Style::default().fg(Color::DarkGray)),
        AdminStatus::Ready => Span::raw(""),
        AdminStatus::NoUsername => Span::styled(
            " No username in this session; metrics were not requested.",
            Style::default().fg(Color::DarkGray),
        ),
        AdminStatus::Failed(message) => Span::styled(
            format!(" Could not load metrics: {}", message),
            Style::default().fg(Color::Red),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

    let header = Row::new(["User ID", "Ratings", "Avg Rating", "Last Activity"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let rows = admin.panel.rows.iter().map(|row| {
        Row::new([
            Cell::from(row.user_id.as_str()),
            Cell::from(row.ratings_count.as_str()),
            Cell::from(row.avg_rating.as_str()),
            Cell::from(row.last_activity.as_str()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Min(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" User Metrics "),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    if !admin.panel.rows.is_empty() {
        state.select(Some(admin.selected));
    }
    frame.render_stateful_widget(table, chunks[2], &mut state);
}
