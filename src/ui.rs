use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::app::{App, MenuState};
use crate::model::MainAction;

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);

pub fn render(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    render_body(frame, root[1], app);
    render_footer(frame, root[2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let breadcrumb = match app.state() {
        MenuState::MainMenu => "main menu".to_string(),
        MenuState::ResourceList { action, .. } => action.label().to_ascii_lowercase(),
        MenuState::Notice { .. } => "notice".to_string(),
    };
    let mut spans = vec![
        Span::styled(
            " DOCKYARD ",
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {breadcrumb}"), Style::default().fg(MUTED)),
    ];
    if let Some(source) = &app.settings().source {
        spans.push(Span::styled(
            format!("  cfg:{source}"),
            Style::default().fg(MUTED),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    match app.state() {
        MenuState::MainMenu => {
            let items = MainAction::ALL
                .iter()
                .map(|action| ListItem::new(action.label()))
                .collect::<Vec<_>>();
            render_menu(frame, area, app, items, "Pick an action");
        }
        MenuState::ResourceList { kind, items, .. } => {
            let items = items
                .iter()
                .map(|line| ListItem::new(line.as_str()))
                .collect::<Vec<_>>();
            let prompt = format!("Select a {} (esc to go back)", kind.singular());
            render_menu(frame, area, app, items, &prompt);
        }
        MenuState::Notice { message } => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Min(1),
                ])
                .split(area);
            frame.render_widget(Paragraph::new("").style(Style::default().bg(BG)), area);
            frame.render_widget(
                Paragraph::new(message.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().bg(BG).fg(WARN).add_modifier(Modifier::BOLD)),
                rows[1],
            );
        }
    }
}

fn render_menu(frame: &mut Frame, area: Rect, app: &App, items: Vec<ListItem>, prompt: &str) {
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {prompt} "))
                .border_style(Style::default().fg(MUTED))
                .style(Style::default().bg(PANEL).fg(Color::White)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.selected()));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Key hints for the footer. The main menu has no cancel and the notice
/// accepts no input at all.
fn footer_hints(state: &MenuState) -> &'static str {
    match state {
        MenuState::MainMenu => "↑/↓ move · enter select · q quit ",
        MenuState::ResourceList { .. } => "↑/↓ move · enter select · esc back · q quit ",
        MenuState::Notice { .. } => "",
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let stamp = app
        .status_at()
        .map(|at| at.format("%H:%M:%S ").to_string())
        .unwrap_or_default();
    let left = Line::from(vec![
        Span::styled(stamp, Style::default().fg(MUTED)),
        Span::styled(app.status().to_string(), Style::default().fg(Color::White)),
    ]);
    let hints = footer_hints(app.state());
    let hints_width = hints.chars().count() as u16;

    if hints.is_empty() || area.width <= hints_width + 8 {
        frame.render_widget(Paragraph::new(left).style(Style::default().bg(BG)), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(hints_width)])
        .split(area);
    frame.render_widget(Paragraph::new(left).style(Style::default().bg(BG)), chunks[0]);
    frame.render_widget(
        Paragraph::new(hints)
            .alignment(Alignment::Right)
            .style(Style::default().bg(BG).fg(MUTED)),
        chunks[1],
    );
}
