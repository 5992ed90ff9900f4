mod budget;
mod db;
mod logging;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};
use std::path::PathBuf;

const DB_ENV: &str = "AUTOBUDGET_DB";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let data_dir = get_data_dir()?;
    logging::init(&data_dir)?;

    let db_path = get_db_path(&data_dir);
    let mut db = db::Database::open(&db_path)?;
    ensure_default_account(&db)?;
    tracing::info!(db = %db_path.display(), "autobudget started");

    match args.len() {
        1 => run::as_tui(&mut db),
        2.. => run::as_cli(&args, &mut db),
        _ => {
            eprintln!("Usage: autobudget [command]");
            Ok(())
        }
    }
}

fn ensure_default_account(db: &db::Database) -> Result<()> {
    if db.get_accounts()?.is_empty() {
        let account = models::Account::new("Default".into(), models::AccountKind::Debit);
        db.insert_account(&account)?;
        tracing::info!("created default account");
    }
    Ok(())
}

fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "autobudget", "AutoBudget")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

fn get_db_path(data_dir: &std::path::Path) -> PathBuf {
    match std::env::var_os(DB_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => data_dir.join("autobudget.db"),
    }
}
