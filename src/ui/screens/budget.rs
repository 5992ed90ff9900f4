use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::{App, InputMode, Row};
use crate::ui::theme;
use crate::ui::util::{format_amount, format_input, format_value, progress_bar, truncate, usage_ratio};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let has_banner = app.session.reference_month.is_some() || app.resolution.is_over_budget;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),                              // Summary cards
            Constraint::Length(if has_banner { 1 } else { 0 }), // Banner
            Constraint::Min(5),                                 // Budget lines
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);
    if has_banner {
        render_banner(f, chunks[1], app);
    }
    render_lines(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let ctx = &app.session.context;
    let res = &app.resolution;

    render_card(f, cards[0], "Avg Income", ctx.avg_income, theme::GREEN, None);
    render_card(f, cards[1], "Fixed", ctx.fixed_total, theme::RED, None);
    render_card(
        f,
        cards[2],
        "Savings",
        res.savings_amount,
        theme::ACCENT,
        Some(format_value(app.session.savings.mode, app.session.savings.value)),
    );
    render_card(
        f,
        cards[3],
        "Net",
        res.net_income,
        if res.net_income >= Decimal::ZERO {
            theme::GREEN
        } else {
            theme::RED
        },
        Some(format!("{} spent", format_amount(app.session.total_spent()))),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: Color,
    subtitle: Option<String>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            format_amount(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle.unwrap_or_default(), theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_banner(f: &mut Frame, area: Rect, app: &App) {
    let line = if app.resolution.is_over_budget {
        Line::from(Span::styled(
            format!(
                " Over budget by {}: allocations exceed net income ",
                format_amount(app.resolution.over_by())
            ),
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(theme::RED)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        let reference = app.session.reference_month.as_deref().unwrap_or_default();
        Line::from(Span::styled(
            format!(" New month, based on {reference} "),
            Style::default().fg(theme::HEADER_BG).bg(theme::YELLOW),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_lines(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = (0..app.row_count())
        .skip(app.scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|i| {
            let style = if i == app.selected {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let editing = i == app.selected && app.input_mode == InputMode::Editing;
            match app.row(i) {
                Row::Savings => savings_item(app, style, editing),
                Row::Category(c) => category_item(app, c, style, editing),
            }
        })
        .collect();

    let auto_note = if app.resolution.automatic_count > 0 {
        format!(
            " {} auto at {} ",
            app.resolution.automatic_count,
            format_amount(app.resolution.auto_amount)
        )
    } else {
        String::new()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " Budget for {}{} ",
                    crate::budget::month::month_label(app.month()),
                    if app.dirty { " *" } else { "" }
                ),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Span::styled(auto_note, theme::dim_style())),
    );
    f.render_widget(list, area);
}

fn input_span(text: String, editing: bool) -> Span<'static> {
    if editing {
        Span::styled(
            format!("{text:>12}▏"),
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!("{text:>12} "), theme::dim_style())
    }
}

fn savings_item(app: &App, style: Style, editing: bool) -> ListItem<'static> {
    let savings = &app.session.savings;
    let input = if editing {
        app.edit_buffer.clone()
    } else {
        format_value(savings.mode, savings.value)
    };
    ListItem::new(Line::from(vec![
        Span::styled(format!("{:<20}", "Savings"), style.add_modifier(Modifier::BOLD)),
        Span::styled(format!("{:<5}", savings.mode.symbol()), theme::dim_style()),
        input_span(input, editing),
        Span::styled(
            format!("{:>14}", format_amount(app.resolution.savings_amount)),
            Style::default().fg(theme::ACCENT),
        ),
    ]))
}

fn category_item(app: &App, index: usize, style: Style, editing: bool) -> ListItem<'static> {
    let Some(spec) = app.session.specs.get(index) else {
        return ListItem::new(Line::from(""));
    };
    let name = app
        .session
        .names
        .get(index)
        .map(|n| truncate(n, 19))
        .unwrap_or_default();
    let amount = app.amount_at(index);

    let tag = if spec.allocation.is_manual() {
        spec.mode.symbol().to_string()
    } else {
        "Auto".to_string()
    };
    let input = if editing {
        app.edit_buffer.clone()
    } else if spec.allocation.is_manual() {
        format_input(spec.mode, spec.allocation)
    } else {
        String::new()
    };

    let ratio = usage_ratio(spec.spent, amount);
    let color = if spec.spent > amount {
        theme::RED
    } else if ratio > 0.7 {
        theme::YELLOW
    } else {
        theme::GREEN
    };

    ListItem::new(Line::from(vec![
        Span::styled(format!("{name:<20}"), style),
        Span::styled(format!("{tag:<5}"), theme::dim_style()),
        input_span(input, editing),
        Span::styled(format!("{:>14}", format_amount(amount)), theme::normal_style()),
        Span::styled(
            format!("  {}/{} ", format_amount(spec.spent), format_amount(amount)),
            Style::default().fg(color),
        ),
        Span::styled(progress_bar(ratio, 16), Style::default().fg(color)),
    ]))
}
