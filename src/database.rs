use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use std::path::{Path, PathBuf};

use crate::connection::{conn, create_database};
use crate::error::CacheResult;
use crate::types::{Draw, DrawRecord, DrawRow, PrizeTierRow};

/// SQLite-backed cache of fetched draws.
///
/// Holds only the file path; each operation opens its own connection and
/// transaction, so nothing is shared in memory between callers. Dropping a
/// transaction without committing rolls it back.
#[derive(Debug, Clone)]
pub struct DrawCache {
    path: PathBuf,
}

const DRAW_COLUMNS: &str = "number, drawn_at, numbers, rolled_over, next_draw_date, \
                            next_draw_estimated_prize, cached_at";

fn draw_row(row: &Row<'_>) -> rusqlite::Result<DrawRow> {
    Ok(DrawRow {
        number: row.get(0)?,
        drawn_at: row.get(1)?,
        numbers: row.get(2)?,
        rolled_over: row.get(3)?,
        next_draw_date: row.get(4)?,
        next_draw_estimated_prize: row.get(5)?,
        cached_at: row.get(6)?,
    })
}

impl DrawCache {
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref().to_path_buf();
        create_database(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> CacheResult<Connection> {
        conn(&self.path)
    }

    /// Exact lookup by draw number.
    pub fn get(&self, number: u32) -> CacheResult<Option<Draw>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let draw = load_draw(&tx, number)?;
        tx.commit()?;
        Ok(draw)
    }

    /// The cached draw with the highest number.
    pub fn latest(&self) -> CacheResult<Option<Draw>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let number = tx
            .query_row("SELECT MAX(number) FROM draws", [], |row| {
                row.get::<_, Option<u32>>(0)
            })
            .optional()?
            .flatten();

        let draw = match number {
            Some(n) => load_draw(&tx, n)?,
            None => None,
        };
        tx.commit()?;
        Ok(draw)
    }

    /// Insert-if-absent. Returns `false` when the draw was already cached, in
    /// which case nothing is written. Header and tiers land together or not at all.
    pub fn put(&self, draw: &Draw) -> CacheResult<bool> {
        let record = DrawRecord::from(draw);
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let header = &record.header;
        tx.execute(
            "INSERT OR IGNORE INTO draws (
                number, drawn_at, numbers, rolled_over, next_draw_date, next_draw_estimated_prize
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                header.number,
                &header.drawn_at,
                &header.numbers,
                header.rolled_over,
                &header.next_draw_date,
                &header.next_draw_estimated_prize,
            ),
        )?;

        if tx.changes() == 0 {
            return Ok(false);
        }

        for tier in &record.tiers {
            tx.execute(
                "INSERT INTO prize_tiers (
                    draw_number, tier, description, winner_count, prize_amount
                ) VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    tier.draw_number,
                    tier.tier,
                    &tier.description,
                    &tier.winner_count,
                    &tier.prize_amount,
                ),
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    pub fn contains(&self, number: u32) -> CacheResult<bool> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM draws WHERE number = ?1",
            [number],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Cached draw headers, newest draw first.
    pub fn list(&self, limit: u32) -> CacheResult<Vec<DrawRow>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM draws ORDER BY number DESC LIMIT ?1",
            DRAW_COLUMNS
        ))?;
        let draw_iter = stmt.query_map([limit], draw_row)?;

        let mut results = Vec::new();
        for draw in draw_iter {
            results.push(draw?);
        }
        Ok(results)
    }
}

fn load_draw(tx: &Transaction<'_>, number: u32) -> CacheResult<Option<Draw>> {
    let header = tx
        .query_row(
            &format!("SELECT {} FROM draws WHERE number = ?1", DRAW_COLUMNS),
            [number],
            draw_row,
        )
        .optional()?;

    let Some(header) = header else {
        return Ok(None);
    };

    let mut stmt = tx.prepare(
        "SELECT draw_number, tier, description, winner_count, prize_amount
         FROM prize_tiers WHERE draw_number = ?1 ORDER BY tier",
    )?;
    let tier_iter = stmt.query_map([number], |row| {
        Ok(PrizeTierRow {
            draw_number: row.get(0)?,
            tier: row.get(1)?,
            description: row.get(2)?,
            winner_count: row.get(3)?,
            prize_amount: row.get(4)?,
        })
    })?;

    let mut tiers = Vec::new();
    for tier in tier_iter {
        tiers.push(tier?);
    }

    DrawRecord { header, tiers }.into_draw().map(Some)
}
