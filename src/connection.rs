use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::CacheResult;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection to the cache file with foreign keys enforced.
pub fn conn(database_path: &Path) -> CacheResult<Connection> {
    let conn = Connection::open(database_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Creates the cache file, its directory and the tables if missing.
pub fn create_database(database_path: &Path) -> CacheResult<()> {
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = conn(database_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS draws (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            number INTEGER NOT NULL UNIQUE,
            drawn_at TEXT NOT NULL,
            numbers TEXT NOT NULL,
            rolled_over INTEGER NOT NULL,
            next_draw_date TEXT,
            next_draw_estimated_prize TEXT,
            cached_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS prize_tiers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            draw_number INTEGER NOT NULL,
            tier INTEGER NOT NULL,
            description TEXT NOT NULL,
            winner_count TEXT,
            prize_amount TEXT,
            UNIQUE (draw_number, tier),
            FOREIGN KEY (draw_number) REFERENCES draws (number)
        )",
        [],
    )?;

    Ok(())
}
