use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    amount REAL NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category <> '')
);

CREATE TABLE IF NOT EXISTS rules (
    keyword TEXT UNIQUE,
    category TEXT
);
";

// (keyword, category), in the order they are seeded
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    ("IFOOD", "Alimentação"),
    ("UBER", "Transporte"),
    ("99", "Transporte"),
    ("NETFLIX", "Assinaturas"),
    ("SPOTIFY", "Assinaturas"),
    ("AMAZON", "Compras"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    for (keyword, category) in DEFAULT_RULES {
        conn.execute(
            "INSERT OR IGNORE INTO rules (keyword, category) VALUES (?1, ?2)",
            rusqlite::params![keyword, category],
        )?;
    }
    Ok(())
}
