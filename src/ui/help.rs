use super::centered_rect;
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("q", "Quit application"),
            ("Ctrl+C", "Quit from anywhere"),
            ("L", "Log out"),
        ],
    ),
    (
        "Browse",
        &[
            ("h", "Handpicked recommendations"),
            ("t", "Trending now"),
            ("g", "Pick a genre"),
            ("w", "Watch history"),
            ("/", "Search titles"),
        ],
    ),
    (
        "Grids and Detail",
        &[
            ("←↑↓→ j k", "Move the selection"),
            ("Enter", "Open movie / pick genre"),
            ("Esc / b", "Back to home"),
        ],
    ),
    (
        "Sign In",
        &[
            ("Tab", "Switch between username and password"),
            ("Enter", "Sign in"),
        ],
    ),
];

pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let mut help_text = vec![Line::from("")];
    for (heading, keys) in SECTIONS {
        help_text.push(Line::from(Span::styled(
            format!("  {}", heading),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in *keys {
            help_text.push(Line::from(vec![
                Span::styled(format!("    {:<12}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ]));
        }
        help_text.push(Line::from(""));
    }

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press any key to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}
