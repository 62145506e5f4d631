use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::Connection;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{GastosError, Result};
use crate::fmt::{backup_stamp, iso_date, month_key, parse_iso_date};
use crate::models::StoredTransaction;

pub const HEADER: [&str; 4] = ["Data", "Valor", "Descrição", "Categoria"];

#[derive(Debug)]
pub struct ExportSummary {
    pub backup: Option<PathBuf>,
    pub sheets: usize,
    pub rows: usize,
}

/// `<path>.<YYYYMMDD_HHMMSS>.bak`, next to `path`.
pub fn backup_path(path: &Path, at: &NaiveDateTime) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.bak", backup_stamp(at)));
    PathBuf::from(name)
}

/// Moves an existing spreadsheet out of the way with a same-directory rename.
pub fn backup_existing(path: &Path, at: &NaiveDateTime) -> Result<Option<PathBuf>> {
    let backup_err = |source| GastosError::Backup {
        path: path.to_path_buf(),
        source,
    };
    if !path.try_exists().map_err(backup_err)? {
        return Ok(None);
    }
    let dest = backup_path(path, at);
    std::fs::rename(path, &dest).map_err(backup_err)?;
    Ok(Some(dest))
}

/// All stored transactions grouped by `YYYY-MM`, each group in id order.
pub fn load_months(conn: &Connection) -> Result<BTreeMap<String, Vec<StoredTransaction>>> {
    let mut stmt = conn.prepare(
        "SELECT date, amount, description, category FROM transactions ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut months: BTreeMap<String, Vec<StoredTransaction>> = BTreeMap::new();
    for (raw_date, amount, description, category) in rows {
        let date = parse_iso_date(&raw_date).ok_or(GastosError::InvalidDate(raw_date))?;
        months.entry(month_key(&date)).or_default().push(StoredTransaction {
            date,
            amount,
            description,
            category,
        });
    }
    Ok(months)
}

/// One sheet per month key, header row first. With no transactions at all the
/// workbook gets a single blank sheet.
pub fn write_workbook(months: &BTreeMap<String, Vec<StoredTransaction>>, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");

    for (month, txns) in months {
        let sheet = workbook.add_worksheet();
        sheet.set_name(month)?;
        for (col, title) in HEADER.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }
        for (i, txn) in txns.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, iso_date(&txn.date))?;
            sheet.write_number_with_format(row, 1, txn.amount, &money)?;
            sheet.write_string(row, 2, txn.description.as_str())?;
            sheet.write_string(row, 3, txn.category.as_str())?;
        }
        sheet.set_column_width(0, 12)?;
        sheet.set_column_width(2, 40)?;
        sheet.set_column_width(3, 18)?;
    }

    if months.is_empty() {
        workbook.add_worksheet();
    }
    workbook.save(path)?;
    Ok(())
}

/// Backs up any previous spreadsheet at `path`, then writes a fresh one.
pub fn export(conn: &Connection, path: &Path, at: &NaiveDateTime) -> Result<ExportSummary> {
    let months = load_months(conn)?;
    let backup = backup_existing(path, at)?;
    write_workbook(&months, path)?;
    Ok(ExportSummary {
        backup,
        sheets: months.len(),
        rows: months.values().map(Vec::len).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use chrono::NaiveDate;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_txn(conn: &Connection, date: &str, amount: f64, description: &str, category: &str) {
        conn.execute(
            "INSERT INTO transactions (date, amount, description, category) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![date, amount, description, category],
        ).unwrap();
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn test_load_months_buckets_by_month() {
        let (_dir, conn) = test_db();
        add_txn(&conn, "2024-03-01", -1.0, "A", "X");
        add_txn(&conn, "2024-02-10", -2.0, "B", "X");
        add_txn(&conn, "2024-03-20", -3.0, "C", "X");
        let months = load_months(&conn).unwrap();
        assert_eq!(months.keys().collect::<Vec<_>>(), vec!["2024-02", "2024-03"]);
        let march: Vec<&str> = months["2024-03"].iter().map(|t| t.description.as_str()).collect();
        assert_eq!(march, vec!["A", "C"]);
    }

    #[test]
    fn test_load_months_rejects_bad_date() {
        let (_dir, conn) = test_db();
        add_txn(&conn, "14/03/2024", -1.0, "A", "X");
        assert!(matches!(load_months(&conn), Err(GastosError::InvalidDate(_))));
    }

    #[test]
    fn test_backup_path_format() {
        let path = backup_path(Path::new("out/gastos.xlsx"), &at(2024, 3, 14, 9, 0, 0));
        assert_eq!(path, PathBuf::from("out/gastos.xlsx.20240314_090000.bak"));
    }

    #[test]
    fn test_backup_existing_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.xlsx");
        std::fs::write(&path, "old content").unwrap();
        let backup = backup_existing(&path, &at(2024, 3, 14, 9, 0, 0)).unwrap().unwrap();
        assert_eq!(backup, dir.path().join("gastos.xlsx.20240314_090000.bak"));
        assert!(!path.exists());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "old content");
    }

    #[test]
    fn test_backup_existing_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gastos.xlsx");
        assert!(backup_existing(&path, &at(2024, 3, 14, 9, 0, 0)).unwrap().is_none());
    }

    #[test]
    fn test_export_writes_one_sheet_per_month() {
        let (dir, conn) = test_db();
        add_txn(&conn, "2024-02-01", -42.5, "IFOOD*RESTAURANTE", "Alimentação");
        add_txn(&conn, "2024-03-01", -12.0, "UBER TRIP", "Transporte");
        add_txn(&conn, "2024-03-05", 9.9, "ESTORNO SPOTIFY", "Assinaturas");
        let path = dir.path().join("gastos.xlsx");
        let summary = export(&conn, &path, &at(2024, 3, 14, 9, 0, 0)).unwrap();
        assert_eq!(summary.sheets, 2);
        assert_eq!(summary.rows, 3);
        assert!(summary.backup.is_none());

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["2024-02".to_string(), "2024-03".to_string()]);

        let feb = workbook.worksheet_range("2024-02").unwrap();
        assert_eq!(feb.height(), 2);
        let header: Vec<String> = feb.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(header, vec!["Data", "Valor", "Descrição", "Categoria"]);
        assert_eq!(feb.get((1, 0)), Some(&Data::String("2024-02-01".to_string())));
        assert_eq!(feb.get((1, 1)), Some(&Data::Float(-42.5)));
        assert_eq!(feb.get((1, 2)), Some(&Data::String("IFOOD*RESTAURANTE".to_string())));
        assert_eq!(feb.get((1, 3)), Some(&Data::String("Alimentação".to_string())));

        let mar = workbook.worksheet_range("2024-03").unwrap();
        assert_eq!(mar.height(), 3);
    }

    #[test]
    fn test_export_backs_up_previous_output() {
        let (dir, conn) = test_db();
        add_txn(&conn, "2024-03-01", -12.0, "UBER TRIP", "Transporte");
        let path = dir.path().join("gastos.xlsx");
        std::fs::write(&path, "previous run").unwrap();
        let summary = export(&conn, &path, &at(2024, 3, 14, 9, 0, 0)).unwrap();

        let backup = dir.path().join("gastos.xlsx.20240314_090000.bak");
        assert_eq!(summary.backup.as_deref(), Some(backup.as_path()));
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "previous run");
        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["2024-03".to_string()]);
    }

    #[test]
    fn test_failed_backup_leaves_output_untouched() {
        let (dir, conn) = test_db();
        add_txn(&conn, "2024-03-01", -12.0, "UBER TRIP", "Transporte");
        let path = dir.path().join("gastos.xlsx");
        std::fs::write(&path, "previous run").unwrap();
        // a non-empty directory where the backup should go makes the rename fail
        let blocker = backup_path(&path, &at(2024, 3, 14, 9, 0, 0));
        std::fs::create_dir_all(blocker.join("inner")).unwrap();

        let err = export(&conn, &path, &at(2024, 3, 14, 9, 0, 0)).unwrap_err();
        assert!(matches!(err, GastosError::Backup { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run");
    }
}
