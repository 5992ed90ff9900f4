use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::budget::month::current_month;
use crate::db::Database;
use crate::models::AllocationMode;
use crate::ui::app::{App, InputMode};
use crate::ui::util::{scroll_down, scroll_up};

pub(crate) fn as_tui(db: &mut Database) -> Result<()> {
    let mut app = App::open(db, &current_month())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "tui exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // Title, status and command bars, summary cards and list borders
            let content_height = f.area().height.saturating_sub(11) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Editing => handle_editing_input(key, app),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    let page = app.visible_rows.max(1);
    let len = app.row_count();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => scroll_down(&mut app.selected, &mut app.scroll, len, page),
        KeyCode::Char('k') | KeyCode::Up => scroll_up(&mut app.selected, &mut app.scroll),
        KeyCode::Char('g') | KeyCode::Home => {
            app.selected = 0;
            app.scroll = 0;
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.selected = len.saturating_sub(1);
            app.scroll = app.selected.saturating_sub(page.saturating_sub(1));
        }
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('%') => app.set_mode(AllocationMode::Percentage),
        KeyCode::Char('$') => app.set_mode(AllocationMode::Absolute),
        KeyCode::Char('x') => app.reset_selected(),
        KeyCode::Char('s') => {
            if let Err(e) = app.save(db) {
                tracing::error!(error = ?e, month = app.month(), "failed to save budget");
                app.set_status(format!("Save failed: {e}"));
            }
        }
        KeyCode::Char('H') | KeyCode::Left => app.change_month(db, -1)?,
        KeyCode::Char('L') | KeyCode::Right => app.change_month(db, 1)?,
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => app.finish_edit(),
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Backspace => app.edit_pop(),
        KeyCode::Char('%') => app.set_mode(AllocationMode::Percentage),
        KeyCode::Char('$') => app.set_mode(AllocationMode::Absolute),
        KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | ',' | '-') => {
            app.edit_push(c);
        }
        _ => {}
    }
}
