use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::budget::month::{current_month, month_label, parse_month, year_of};
use crate::budget::{summarize, BudgetSession, CategoryUsage};
use crate::db::Database;
use crate::models::*;
use crate::ui::util::{format_amount, format_input, format_value, truncate};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "budget" | "b" => cli_budget(&args[2..], db),
        "set" => cli_set(&args[2..], db),
        "auto" => cli_auto(&args[2..], db),
        "savings" => cli_savings(&args[2..], db),
        "summary" | "s" => cli_summary(&args[2..], db),
        "accounts" => cli_accounts(db),
        "categories" => cli_categories(db),
        "account" => cli_add_account(&args[2..], db),
        "category" => cli_add_category(&args[2..], db),
        "income" => cli_add_transaction(TransactionKind::Income, &args[2..], db),
        "expense" => cli_add_transaction(TransactionKind::Expense, &args[2..], db),
        "fixed" => cli_add_fixed(&args[2..], db),
        "settings" => cli_settings(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("autobudget {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("AutoBudget: monthly budgets that fill themselves in");
    println!();
    println!("Usage: autobudget [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Launch the budget editor");
    println!("  budget [YYYY-MM]                    Print the month's resolved budget");
    println!("  set <category> <value>[%]           Pin a category to an amount or % of net income");
    println!("  auto <category>                     Return a category to automatic");
    println!("  savings <value>[%]                  Set the month's savings (% of average income)");
    println!("    --month <YYYY-MM>                 Month to edit (default: current)");
    println!("  summary [YYYY-MM]                   Spending against budget");
    println!("  accounts | categories               List records");
    println!("  account <name> [debit|credit]       Add an account");
    println!("  category <name> [--income]          Add a category");
    println!("    --enable | --disable              Include or leave out an existing one");
    println!("  income|expense <date> <amount> [category]");
    println!("    --account <name> --note <text>    Record a transaction");
    println!("  fixed <description> <amount> <start-date>");
    println!("    --until <date>                    Add a recurring monthly expense");
    println!("  settings [--savings <value>[%]] [--window <n>]");
    println!("                                      Show or change defaults");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
    println!();
    println!("Environment: AUTOBUDGET_DB overrides the database path,");
    println!("AUTOBUDGET_LOG sets the log filter (e.g. debug).");
}

// ── Argument helpers ─────────────────────────────────────────

/// Remove `--name <value>` from `args`, returning the value.
fn take_flag(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        anyhow::bail!("{name} needs a value");
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

/// Remove a bare `--name` switch from `args`.
fn take_switch(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

/// A trailing `%` selects percentage mode; anything else is an absolute amount.
fn split_mode(value: &str) -> (AllocationMode, &str) {
    match value.trim().strip_suffix('%') {
        Some(v) => (AllocationMode::Percentage, v),
        None => (AllocationMode::Absolute, value.trim()),
    }
}

fn resolve_month(input: Option<&str>) -> Result<String> {
    match input {
        None => Ok(current_month()),
        Some(m) => parse_month(m, year_of(&current_month()))
            .ok_or_else(|| anyhow::anyhow!("Invalid month: {m} (expected YYYY-MM)")),
    }
}

fn parse_money(input: &str) -> Result<Decimal> {
    let cleaned: String = input.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    Decimal::from_str(&cleaned).with_context(|| format!("Invalid amount: {input}"))
}

fn parse_date(input: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {input} (expected YYYY-MM-DD)"))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

fn find_expense_category(session: &BudgetSession, name: &str) -> Result<(i64, String)> {
    let lower = name.to_lowercase();
    session
        .specs
        .iter()
        .zip(&session.names)
        .find(|(_, n)| n.to_lowercase() == lower)
        .map(|(spec, n)| (spec.category_id, n.clone()))
        .ok_or_else(|| anyhow::anyhow!("No active expense category named '{name}'"))
}

// ── Budget commands ──────────────────────────────────────────

fn cli_budget(args: &[String], db: &mut Database) -> Result<()> {
    let month = resolve_month(args.first().map(String::as_str))?;
    let session = db.load_session(&month)?;
    print_budget(&session);
    Ok(())
}

fn print_budget(session: &BudgetSession) {
    let res = session.resolve();
    let ctx = &session.context;

    println!("AutoBudget: {}", month_label(&ctx.month));
    if let Some(reference) = &session.reference_month {
        println!("  (new month, based on {reference}; not saved yet)");
    } else if session.is_new_month {
        println!("  (new month; not saved yet)");
    }
    println!("{}", "─".repeat(60));
    println!("  Average income:  {:>14}", format_amount(ctx.avg_income));
    println!("  Fixed expenses:  {:>14}", format_amount(ctx.fixed_total));
    println!(
        "  Savings:         {:>14}  ({})",
        format_amount(res.savings_amount),
        format_value(session.savings.mode, session.savings.value)
    );
    println!("  Net income:      {:>14}", format_amount(res.net_income));
    println!();
    println!(
        "  {:<20} {:>12} {:>14} {:>12}",
        "Category", "Input", "Budget", "Spent"
    );
    for ((spec, name), alloc) in session
        .specs
        .iter()
        .zip(&session.names)
        .zip(&res.allocations)
    {
        let input = if alloc.is_manual {
            format_input(spec.mode, spec.allocation)
        } else {
            "Auto".to_string()
        };
        println!(
            "  {:<20} {:>12} {:>14} {:>12}",
            truncate(name, 20),
            input,
            format_amount(alloc.amount),
            format_amount(spec.spent),
        );
    }
    println!("{}", "─".repeat(60));
    println!(
        "  Allocated {} of {}",
        format_amount(res.total_allocated),
        format_amount(res.net_income)
    );
    println!(
        "  Pinned {}, leaving {} for automatic categories",
        format_amount(res.manual_total),
        format_amount(res.remaining)
    );
    if res.automatic_count > 0 {
        println!(
            "  {} automatic categories at {} each",
            res.automatic_count,
            format_amount(res.auto_amount)
        );
    }
    if res.is_over_budget {
        println!("  Over budget by {}", format_amount(res.over_by()));
    }
}

/// Load the month, apply `edit`, and save the whole month back.
fn edit_month<F>(db: &mut Database, month: &str, edit: F) -> Result<BudgetSession>
where
    F: FnOnce(&mut BudgetSession) -> Result<()>,
{
    let mut session = db.load_session(month)?;
    edit(&mut session)?;
    db.save_session(&session)?;
    Ok(session)
}

fn cli_set(args: &[String], db: &mut Database) -> Result<()> {
    let mut args = args.to_vec();
    let month = resolve_month(take_flag(&mut args, "--month")?.as_deref())?;
    let [name, value] = args.as_slice() else {
        anyhow::bail!("Usage: autobudget set <category> <value>[%] [--month YYYY-MM]");
    };
    let (mode, input) = split_mode(value);

    let mut pinned = None;
    let session = edit_month(db, &month, |session| {
        let (id, display) = find_expense_category(session, name)?;
        session.set_mode(id, mode);
        session.set_input(id, input);
        pinned = Some((id, display));
        Ok(())
    })?;
    if let Some((id, display)) = &pinned {
        if let Some(spec) = session.spec(*id) {
            println!("Pinned {display} to {} for {month}", format_input(spec.mode, spec.allocation));
        }
    }
    print_budget(&session);
    Ok(())
}

fn cli_auto(args: &[String], db: &mut Database) -> Result<()> {
    let mut args = args.to_vec();
    let month = resolve_month(take_flag(&mut args, "--month")?.as_deref())?;
    let [name] = args.as_slice() else {
        anyhow::bail!("Usage: autobudget auto <category> [--month YYYY-MM]");
    };

    let mut reset = String::new();
    let session = edit_month(db, &month, |session| {
        let (id, display) = find_expense_category(session, name)?;
        session.reset(id);
        reset = display;
        Ok(())
    })?;
    println!("{reset} is automatic for {month}");
    print_budget(&session);
    Ok(())
}

fn cli_savings(args: &[String], db: &mut Database) -> Result<()> {
    let mut args = args.to_vec();
    let month = resolve_month(take_flag(&mut args, "--month")?.as_deref())?;
    let [value] = args.as_slice() else {
        anyhow::bail!("Usage: autobudget savings <value>[%] [--month YYYY-MM]");
    };
    let (mode, input) = split_mode(value);

    let session = edit_month(db, &month, |session| {
        session.set_savings_mode(mode);
        session.set_savings_input(input);
        Ok(())
    })?;
    if session.savings_category_id.is_none() {
        tracing::warn!(month = %month, "no savings category; savings will not be stored");
    }
    print_budget(&session);
    Ok(())
}

fn cli_summary(args: &[String], db: &mut Database) -> Result<()> {
    let month = resolve_month(args.first().filter(|a| !a.starts_with('-')).map(String::as_str))?;
    let summary = summarize(
        &month,
        &db.get_budget_rows(&month)?,
        &db.get_categories()?,
        &db.get_transactions_for_month(&month)?,
        db.savings_category_id()?,
    );

    println!("AutoBudget: {}", month_label(&summary.month));
    println!("{}", "─".repeat(60));
    println!("  Income:     {:>14}", format_amount(summary.income));
    println!("  Expenses:   {:>14}", format_amount(summary.expenses));
    println!("  Net:        {:>14}", format_amount(summary.net));
    println!("  Budgeted:   {:>14}", format_amount(summary.total_budgeted()));

    if summary.categories.is_empty() {
        println!();
        println!("No budget saved for {month}. Run `autobudget budget {month}` to see a proposal.");
        return Ok(());
    }

    println!();
    println!(
        "  {:<20} {:>12} {:>12} {:>6}  {}",
        "Category", "Spent", "Budget", "Used", "Left"
    );
    for usage in &summary.categories {
        println!("{}", usage_line(usage));
    }
    Ok(())
}

fn usage_line(usage: &CategoryUsage) -> String {
    let pct = usage.usage.saturating_mul(Decimal::ONE_HUNDRED).round();
    let left = if usage.is_over() {
        format!("over by {}", format_amount(usage.excess()))
    } else {
        format_amount(usage.remaining())
    };
    format!(
        "  {:<20} {:>12} {:>12} {:>5}%  {}",
        truncate(&usage.name, 20),
        format_amount(usage.spent),
        format_amount(usage.budgeted),
        pct,
        left
    )
}

// ── Records ──────────────────────────────────────────────────

fn cli_accounts(db: &mut Database) -> Result<()> {
    let accounts = db.get_accounts()?;
    if accounts.is_empty() {
        println!("No accounts");
        return Ok(());
    }

    println!("{:<4} {:<20} {:<8} Credit limit", "ID", "Name", "Kind");
    println!("{}", "─".repeat(50));
    for acct in &accounts {
        println!(
            "{:<4} {:<20} {:<8} {}",
            acct.id.unwrap_or(0),
            acct.name,
            acct.kind,
            acct.credit_limit.map(format_amount).unwrap_or_default(),
        );
    }
    Ok(())
}

fn cli_categories(db: &mut Database) -> Result<()> {
    let categories = db.get_categories()?;
    println!("{:<4} {:<24} {:<8} Active", "ID", "Name", "Kind");
    println!("{}", "─".repeat(46));
    for cat in &categories {
        println!(
            "{:<4} {:<24} {:<8} {}",
            cat.id.unwrap_or(0),
            cat.name,
            cat.kind,
            if cat.is_active { "yes" } else { "no" },
        );
    }
    Ok(())
}

fn cli_add_account(args: &[String], db: &mut Database) -> Result<()> {
    let (name, kind) = match args {
        [name] => (name, AccountKind::Debit),
        [name, kind] => (name, AccountKind::parse(kind)),
        _ => anyhow::bail!("Usage: autobudget account <name> [debit|credit]"),
    };
    let id = db.insert_account(&Account::new(name.clone(), kind))?;
    let account = db
        .get_account_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Account {id} missing after insert"))?;
    tracing::info!(id, name = %account.name, "account added");
    println!("Added {} account '{}' (id {id})", account.kind, account.name);
    Ok(())
}

fn cli_add_category(args: &[String], db: &mut Database) -> Result<()> {
    let mut args = args.to_vec();
    let income = take_switch(&mut args, "--income");
    let enable = take_switch(&mut args, "--enable");
    let disable = take_switch(&mut args, "--disable");
    let [name] = args.as_slice() else {
        anyhow::bail!("Usage: autobudget category <name> [--income | --enable | --disable]");
    };
    match (enable, disable) {
        (true, true) => anyhow::bail!("Use only one of --enable and --disable"),
        (true, false) => return cli_set_category_active(name, true, db),
        (false, true) => return cli_set_category_active(name, false, db),
        (false, false) => {}
    }

    let kind = if income {
        CategoryKind::Income
    } else {
        CategoryKind::Expense
    };
    let existing = db.get_categories()?;
    if existing
        .iter()
        .any(|c| c.kind == kind && c.name.eq_ignore_ascii_case(name))
    {
        anyhow::bail!("Category '{name}' already exists");
    }
    let id = db.insert_category(&Category::new(name.clone(), kind))?;
    tracing::info!(id, name = %name, kind = kind.as_str(), "category added");
    println!("Added {kind} category '{name}' (id {id})");
    Ok(())
}

fn cli_set_category_active(name: &str, active: bool, db: &mut Database) -> Result<()> {
    let categories = db.get_categories()?;
    let category = Category::find_by_name(&categories, name)
        .ok_or_else(|| anyhow::anyhow!("Category not found: {name}"))?;
    if category.kind == CategoryKind::Savings {
        anyhow::bail!("The savings category cannot be disabled");
    }
    let Some(id) = category.id else {
        anyhow::bail!("Category '{name}' has no id");
    };
    if !db.set_category_active(id, active)? {
        anyhow::bail!("Category not found: {name}");
    }
    tracing::info!(id, name = %category.name, active, "category activity changed");
    let state = if active { "enabled" } else { "disabled" };
    println!("Category '{}' {state}", category.name);
    Ok(())
}

fn cli_add_transaction(kind: TransactionKind, args: &[String], db: &mut Database) -> Result<()> {
    let mut args = args.to_vec();
    let account_name = take_flag(&mut args, "--account")?;
    let note = take_flag(&mut args, "--note")?;
    let (date, amount, category) = match args.as_slice() {
        [date, amount] => (date, amount, None),
        [date, amount, category] => (date, amount, Some(category)),
        _ => anyhow::bail!(
            "Usage: autobudget {} <YYYY-MM-DD> <amount> [category] [--account <name>] [--note <text>]",
            kind.as_str()
        ),
    };

    let accounts = db.get_accounts()?;
    let account = match &account_name {
        Some(name) => Account::find_by_name(&accounts, name)
            .ok_or_else(|| anyhow::anyhow!("Account not found: {name}"))?,
        None => accounts
            .iter()
            .find(|a| a.is_active)
            .ok_or_else(|| anyhow::anyhow!("No accounts. Add one with `autobudget account <name>`"))?,
    };
    let account_id = account
        .id
        .ok_or_else(|| anyhow::anyhow!("Account has no id"))?;

    let mut txn = Transaction::new(account_id, kind, parse_money(amount)?, parse_date(date)?);
    if let Some(name) = category {
        let categories = db.get_categories()?;
        let cat = Category::find_by_name(&categories, name)
            .ok_or_else(|| anyhow::anyhow!("Category not found: {name}"))?;
        txn.category_id = cat.id;
    }
    txn.description = note.unwrap_or_default();

    let id = db.insert_transaction(&txn)?;
    tracing::info!(id, kind = kind.as_str(), amount = %txn.amount, date = %txn.date, "transaction recorded");
    println!(
        "Recorded {} of {} on {} in {}",
        kind.as_str(),
        format_amount(txn.amount),
        txn.date,
        account.name
    );
    Ok(())
}

fn cli_add_fixed(args: &[String], db: &mut Database) -> Result<()> {
    let mut args = args.to_vec();
    let until = take_flag(&mut args, "--until")?;
    let [description, amount, start] = args.as_slice() else {
        anyhow::bail!("Usage: autobudget fixed <description> <amount> <YYYY-MM-DD> [--until YYYY-MM-DD]");
    };

    let accounts = db.get_accounts()?;
    let account_id = accounts
        .iter()
        .find(|a| a.is_active)
        .and_then(|a| a.id)
        .ok_or_else(|| anyhow::anyhow!("No accounts. Add one with `autobudget account <name>`"))?;

    let mut fe = FixedExpense::new(account_id, description.clone(), parse_money(amount)?, parse_date(start)?);
    fe.end_date = until.as_deref().map(parse_date).transpose()?;
    if let Some(end) = &fe.end_date {
        if *end < fe.start_date {
            anyhow::bail!("--until {end} is before the start date {}", fe.start_date);
        }
    }

    let id = db.insert_fixed_expense(&fe)?;
    tracing::info!(id, description = %fe.description, amount = %fe.amount, "fixed expense added");
    println!(
        "Added fixed expense '{}' of {} from {}{}",
        fe.description,
        format_amount(fe.amount),
        fe.start_date,
        fe.end_date
            .as_deref()
            .map(|d| format!(" until {d}"))
            .unwrap_or_default()
    );
    Ok(())
}

fn cli_settings(args: &[String], db: &mut Database) -> Result<()> {
    let mut args = args.to_vec();
    let savings = take_flag(&mut args, "--savings")?;
    let window = take_flag(&mut args, "--window")?;
    if let Some(extra) = args.first() {
        anyhow::bail!("Unexpected argument: {extra}");
    }

    let mut settings = db.get_settings()?;
    if let Some(value) = &savings {
        let (mode, input) = split_mode(value);
        let amount = parse_money(input)?;
        settings.savings_mode = mode;
        match mode {
            AllocationMode::Percentage => settings.savings_percentage = amount,
            AllocationMode::Absolute => settings.savings_amount = Some(amount),
        }
    }
    if let Some(n) = &window {
        settings.carry_forward_window = n
            .parse()
            .with_context(|| format!("Invalid window: {n}"))?;
        if settings.carry_forward_window == 0 {
            anyhow::bail!("--window must be at least 1");
        }
    }
    if savings.is_some() || window.is_some() {
        db.update_settings(&settings)?;
        tracing::info!("settings updated");
    }

    let (mode, value) = settings.default_savings();
    println!("Default savings:       {}", format_value(mode, value));
    println!("Carry-forward window:  {} rows", settings.carry_forward_window);
    println!("Currency:              {}", settings.currency);
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
