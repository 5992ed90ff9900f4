use anyhow::Result;
use rust_decimal::Decimal;

use crate::budget::month::shift_month;
use crate::budget::{BudgetSession, CategorySpec, Resolution, SavingsSpec};
use crate::db::Database;
use crate::models::AllocationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Editing,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Editing => write!(f, "EDIT"),
        }
    }
}

/// A row of the editor. Savings is always the first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Row {
    Savings,
    Category(usize),
}

/// What a row held before an edit started, restored on Esc.
#[derive(Debug, Clone)]
struct Snapshot {
    row: RowSnapshot,
    was_dirty: bool,
}

#[derive(Debug, Clone)]
enum RowSnapshot {
    Savings(SavingsSpec),
    Category(CategorySpec),
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) input_mode: InputMode,
    pub(crate) show_help: bool,
    pub(crate) status_message: String,

    pub(crate) session: BudgetSession,
    /// Re-computed after every edit.
    pub(crate) resolution: Resolution,
    pub(crate) dirty: bool,

    pub(crate) selected: usize,
    pub(crate) scroll: usize,
    pub(crate) edit_buffer: String,
    snapshot: Option<Snapshot>,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn open(db: &Database, month: &str) -> Result<Self> {
        let session = db.load_session(month)?;
        let resolution = session.resolve();
        let mut app = Self {
            running: true,
            input_mode: InputMode::Normal,
            show_help: false,
            status_message: String::new(),
            session,
            resolution,
            dirty: false,
            selected: 0,
            scroll: 0,
            edit_buffer: String::new(),
            snapshot: None,
            visible_rows: 20,
        };
        app.announce_month();
        Ok(app)
    }

    pub(crate) fn month(&self) -> &str {
        self.session.month()
    }

    /// Savings plus one row per category.
    pub(crate) fn row_count(&self) -> usize {
        self.session.specs.len() + 1
    }

    pub(crate) fn row(&self, index: usize) -> Row {
        match index {
            0 => Row::Savings,
            i => Row::Category(i - 1),
        }
    }

    pub(crate) fn selected_row(&self) -> Row {
        self.row(self.selected)
    }

    fn recompute(&mut self) {
        self.resolution = self.session.resolve();
    }

    fn announce_month(&mut self) {
        if let Some(reference) = &self.session.reference_month {
            self.status_message = format!("New month, based on {reference}. Press s to keep it.");
        } else if self.session.is_new_month {
            self.status_message = "New month: every category starts on Auto".into();
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    // ── Month navigation ─────────────────────────────────────

    pub(crate) fn change_month(&mut self, db: &Database, delta: i32) -> Result<()> {
        let Some(target) = shift_month(self.month(), delta) else {
            return Ok(());
        };
        let discarded = self.dirty;
        self.session = db.load_session(&target)?;
        self.recompute();
        self.dirty = false;
        self.selected = 0;
        self.scroll = 0;
        self.status_message.clear();
        self.announce_month();
        if discarded {
            self.set_status(format!("Unsaved changes discarded; now editing {target}"));
        }
        Ok(())
    }

    // ── Editing ──────────────────────────────────────────────

    pub(crate) fn begin_edit(&mut self) {
        let (row, buffer) = match self.selected_row() {
            Row::Savings => (
                RowSnapshot::Savings(self.session.savings.clone()),
                self.session.savings.value.normalize().to_string(),
            ),
            Row::Category(i) => {
                let Some(spec) = self.session.specs.get(i) else {
                    return;
                };
                let buffer = spec
                    .allocation
                    .manual_value()
                    .map(|v| v.normalize().to_string())
                    .unwrap_or_default();
                (RowSnapshot::Category(spec.clone()), buffer)
            }
        };
        self.snapshot = Some(Snapshot {
            row,
            was_dirty: self.dirty,
        });
        self.edit_buffer = buffer;
        self.input_mode = InputMode::Editing;
    }

    pub(crate) fn edit_push(&mut self, c: char) {
        self.edit_buffer.push(c);
        self.apply_buffer();
    }

    pub(crate) fn edit_pop(&mut self) {
        self.edit_buffer.pop();
        self.apply_buffer();
    }

    /// Feed the edit buffer into the session and re-resolve, so totals follow
    /// every keystroke.
    fn apply_buffer(&mut self) {
        match self.selected_row() {
            Row::Savings => self.session.set_savings_input(&self.edit_buffer),
            Row::Category(i) => {
                if let Some(id) = self.session.specs.get(i).map(|s| s.category_id) {
                    self.session.set_input(id, &self.edit_buffer);
                }
            }
        }
        self.dirty = true;
        self.recompute();
    }

    pub(crate) fn finish_edit(&mut self) {
        self.snapshot = None;
        self.edit_buffer.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Put the row back as it was when the edit began, mode included.
    pub(crate) fn cancel_edit(&mut self) {
        if let Some(Snapshot { row, was_dirty }) = self.snapshot.take() {
            match row {
                RowSnapshot::Savings(savings) => self.session.savings = savings,
                RowSnapshot::Category(spec) => {
                    self.session.restore(spec);
                }
            }
            self.dirty = was_dirty;
        }
        self.edit_buffer.clear();
        self.input_mode = InputMode::Normal;
        self.recompute();
        self.set_status("Edit cancelled");
    }

    pub(crate) fn set_mode(&mut self, mode: AllocationMode) {
        match self.selected_row() {
            Row::Savings => self.session.set_savings_mode(mode),
            Row::Category(i) => {
                if let Some(id) = self.session.specs.get(i).map(|s| s.category_id) {
                    self.session.set_mode(id, mode);
                }
            }
        }
        self.dirty = true;
        self.recompute();
    }

    pub(crate) fn reset_selected(&mut self) {
        if let Row::Category(i) = self.selected_row() {
            if let Some(id) = self.session.specs.get(i).map(|s| s.category_id) {
                self.session.reset(id);
                self.dirty = true;
                self.recompute();
                let name = self.session.names.get(i).cloned().unwrap_or_default();
                self.set_status(format!("{name} is automatic again"));
            }
        }
    }

    pub(crate) fn save(&mut self, db: &mut Database) -> Result<()> {
        let count = db.save_session(&self.session)?;
        // Reload so ids of freshly inserted rows are picked up.
        let month = self.month().to_string();
        self.session = db.load_session(&month)?;
        self.recompute();
        self.dirty = false;
        if self.resolution.is_over_budget {
            self.set_status(format!(
                "Saved {count} rows (over budget by {})",
                crate::ui::util::format_amount(self.resolution.over_by())
            ));
        } else {
            self.set_status(format!("Saved {count} rows for {}", self.month()));
        }
        Ok(())
    }

    // ── Display helpers ──────────────────────────────────────

    /// Resolved amount of the i-th category.
    pub(crate) fn amount_at(&self, i: usize) -> Decimal {
        self.resolution
            .allocations
            .get(i)
            .map(|a| a.amount)
            .unwrap_or_default()
    }
}
