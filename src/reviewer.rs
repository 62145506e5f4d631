use std::io::{BufRead, Write};

use colored::Colorize;

use crate::categorizer::RuleBook;
use crate::error::Result;
use crate::fmt::{amount, decode_text, iso_date};
use crate::models::Transaction;
use crate::persister::Persister;

#[derive(Debug, Default, PartialEq)]
pub struct ResolveReport {
    /// Transactions whose category was typed in.
    pub prompted: usize,
    /// Transactions matched by a rule learned earlier in the same session.
    pub auto_applied: usize,
    pub learned: usize,
    /// Left unresolved because input ended.
    pub discarded: usize,
    pub failed_writes: usize,
}

/// Asks for a category for each unknown transaction, in order, saving it and
/// learning a rule from the first word of its description.
///
/// Before asking, each transaction is checked against the rules learned so far
/// in this session, so a second `PADARIA ...` is filed without a prompt.
/// Blank answers are asked again. End of input stops the loop and the
/// remaining transactions are left out of the store.
pub fn resolve_unknowns<R: BufRead, W: Write>(
    persister: &Persister,
    rules: &mut RuleBook,
    unknowns: &[Transaction],
    input: &mut R,
    output: &mut W,
) -> Result<ResolveReport> {
    let mut report = ResolveReport::default();

    for (i, txn) in unknowns.iter().enumerate() {
        if let Some(category) = rules.classify(&txn.description) {
            if record_write(persister.save(txn, category), &mut report) {
                report.auto_applied += 1;
            }
            continue;
        }

        let Some(category) = ask_category(txn, input, output)? else {
            report.discarded = unknowns.len() - i;
            break;
        };
        report.prompted += 1;
        record_write(persister.save(txn, &category), &mut report);

        let keyword = txn.first_word();
        if keyword.is_empty() {
            continue;
        }
        match persister.learn(keyword, &category) {
            Ok(added) => {
                if added {
                    report.learned += 1;
                }
                rules.remember(keyword, &category);
            }
            Err(e) => {
                record_write::<bool>(Err(e), &mut report);
            }
        }
    }

    if report.discarded > 0 {
        eprintln!(
            "{}",
            format!("input ended, {} transactions left uncategorized", report.discarded).yellow()
        );
    }
    Ok(report)
}

fn ask_category<R: BufRead, W: Write>(
    txn: &Transaction,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>> {
    write!(
        output,
        "\n{} | {} | {}\nCategoria: ",
        iso_date(&txn.date),
        amount(txn.amount),
        txn.description
    )?;
    output.flush()?;

    // Answers typed on a cp1252 console arrive as Latin-1.
    loop {
        let mut line = Vec::new();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        let line = decode_text(&line);
        let category = line.trim();
        if !category.is_empty() {
            return Ok(Some(category.to_string()));
        }
        write!(output, "Categoria: ")?;
        output.flush()?;
    }
}

fn record_write<T>(result: Result<T>, report: &mut ResolveReport) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            eprintln!("{}", format!("write failed: {e}").red());
            report.failed_writes += 1;
            false
        }
    }
}
