use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::app::{App, InputMode, Row};
use super::theme;
use crate::budget::month::month_label;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_title_bar(f, chunks[0], app);
    super::screens::budget::render(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_title_bar(f: &mut Frame, area: Rect, app: &App) {
    let title = Line::from(vec![
        Span::styled(
            " AutoBudget ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(theme::OVERLAY)),
        Span::styled(month_label(app.month()), Style::default().fg(theme::TEXT)),
    ]);
    f.render_widget(
        Paragraph::new(title).style(Style::default().bg(theme::HEADER_BG)),
        area,
    );
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
        InputMode::Editing => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::GREEN)
            .add_modifier(Modifier::BOLD),
    };

    let res = &app.resolution;
    let info = format!(
        " {} | {} allocated of {} ",
        app.month(),
        super::util::format_amount(res.total_allocated),
        super::util::format_amount(res.net_income),
    );

    let right = match app.input_mode {
        InputMode::Editing => " Enter done | Esc cancel ",
        InputMode::Normal => " e edit | %/$ mode | x auto | s save | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.len() + info.len() + right.len();
    let pad = available.saturating_sub(used);

    let info_style = if res.is_over_budget {
        Style::default().fg(theme::RED).bg(theme::SURFACE)
    } else {
        theme::status_bar_style()
    };

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, info_style),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Editing => {
            let label = match app.selected_row() {
                Row::Savings => "Savings".to_string(),
                Row::Category(i) => app.session.names.get(i).cloned().unwrap_or_default(),
            };
            let prompt = format!("{label}> ");
            let offset = (prompt.chars().count() + app.edit_buffer.chars().count()) as u16;
            (
                Line::from(vec![
                    Span::styled(prompt, Style::default().fg(theme::GREEN)),
                    Span::styled(&app.edit_buffer, theme::command_bar_style()),
                    Span::styled("  (empty = Auto)", theme::dim_style()),
                ]),
                Some(offset),
            )
        }
        InputMode::Normal => (
            if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Enter to edit a line, H/L to change month, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    theme::command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {title}"),
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    ))
}

fn entry(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), theme::normal_style()))
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            " AutoBudget Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Navigation"),
        entry("  j/k or Up/Down   Move cursor           H/L        Prev/Next month"),
        entry("  g/G              Top/Bottom            q          Quit"),
        Line::from(""),
        section("Editing"),
        entry("  Enter or e       Edit amount           Esc        Cancel edit"),
        entry("  %                Percentage of net     $          Fixed amount"),
        entry("  x                Back to automatic     s          Save month"),
        Line::from(""),
        section("How amounts are worked out"),
        entry("  Savings come off average income, then fixed expenses."),
        entry("  Pinned lines get exactly what they ask for; percentages"),
        entry("  are of net income. Auto lines split what is left equally."),
        Line::from(""),
        Line::from(Span::styled(
            " Press any key to close ",
            Style::default().fg(theme::TEXT_DIM),
        )),
    ];

    // Center the popup, clamped to terminal height
    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 72.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}
