use rusqlite::Connection;

use crate::error::{GastosError, Result};
use crate::fmt::iso_date;
use crate::models::Transaction;

/// The only writer to the `transactions` table and the only appender to `rules`.
pub struct Persister<'c> {
    conn: &'c Connection,
}

impl<'c> Persister<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, txn: &Transaction, category: &str) -> Result<i64> {
        if category.is_empty() {
            return Err(GastosError::EmptyCategory);
        }
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO transactions (date, amount, description, category) VALUES (?1, ?2, ?3, ?4)",
        )?;
        stmt.execute(rusqlite::params![
            iso_date(&txn.date),
            txn.amount,
            txn.description,
            category,
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Inserts a rule, ignoring keyword collisions. Returns whether a row was added.
    pub fn learn(&self, keyword: &str, category: &str) -> Result<bool> {
        let added = self.conn.execute(
            "INSERT OR IGNORE INTO rules (keyword, category) VALUES (?1, ?2)",
            rusqlite::params![keyword, category],
        )?;
        Ok(added > 0)
    }
}
