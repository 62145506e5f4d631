use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Mutex;
use std::thread;

use colored::Colorize;

use crate::categorizer::RuleBook;
use crate::error::Result;
use crate::models::Transaction;
use crate::ofx;
use crate::persister::Persister;

/// Capacity of the queue between the parse workers and the writer.
pub const TRANSACTION_BUFFER: usize = 1000;

/// Credit-card transactions in `path`, in file order. Bank statements are ignored.
pub fn read_statement_file(path: &Path) -> Result<Vec<Transaction>> {
    let data = std::fs::read(path)?;
    let response = ofx::parse(&data)?;
    Ok(response
        .credit_card()
        .flat_map(|stmt| stmt.transactions.iter())
        .map(|line| Transaction::new(line.posted, line.amount_f64(), line.payee()))
        .collect())
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub files_parsed: usize,
    pub files_skipped: usize,
    pub classified: usize,
    /// Transactions no rule matched, in the order the writer received them.
    pub unknown: Vec<Transaction>,
    pub failed_writes: usize,
}

#[derive(Default)]
struct WorkerTally {
    parsed: usize,
    skipped: usize,
}

/// Parses `paths` on `workers` threads and classifies and stores the result on
/// the calling thread, which is the only one touching the database.
///
/// Shutdown order: the feeder closes the path queue after the last path, each
/// worker exits once the path queue is closed and drained, the transaction
/// queue closes when the last worker drops its sender, and the writer loop
/// ends after draining it.
pub fn ingest(
    persister: &Persister,
    rules: &RuleBook,
    paths: Vec<PathBuf>,
    workers: usize,
) -> IngestReport {
    let workers = workers.max(1);
    let (path_tx, path_rx) = mpsc::sync_channel::<PathBuf>(0);
    let (txn_tx, txn_rx) = mpsc::sync_channel::<Transaction>(TRANSACTION_BUFFER.max(workers));
    let path_rx = Mutex::new(path_rx);

    thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let out = txn_tx.clone();
                let path_rx = &path_rx;
                s.spawn(move || parse_worker(path_rx, out))
            })
            .collect();
        drop(txn_tx);

        s.spawn(move || {
            for path in paths {
                if path_tx.send(path).is_err() {
                    break;
                }
            }
        });

        let mut report = write_incoming(persister, rules, txn_rx);

        for handle in handles {
            match handle.join() {
                Ok(tally) => {
                    report.files_parsed += tally.parsed;
                    report.files_skipped += tally.skipped;
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        report
    })
}

fn parse_worker(paths: &Mutex<Receiver<PathBuf>>, out: SyncSender<Transaction>) -> WorkerTally {
    let mut tally = WorkerTally::default();
    loop {
        let next = match paths.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        let Ok(path) = next else { break };

        match read_statement_file(&path) {
            Ok(txns) => {
                for txn in txns {
                    if out.send(txn).is_err() {
                        return tally;
                    }
                }
                println!("parsed: {}", path.display());
                tally.parsed += 1;
            }
            Err(e) => {
                eprintln!("{}", format!("skipped: {}: {e}", path.display()).yellow());
                tally.skipped += 1;
            }
        }
    }
    tally
}

fn write_incoming(
    persister: &Persister,
    rules: &RuleBook,
    incoming: Receiver<Transaction>,
) -> IngestReport {
    let mut report = IngestReport::default();
    for txn in incoming {
        let Some(category) = rules.classify(&txn.description) else {
            report.unknown.push(txn);
            continue;
        };
        match persister.save(&txn, category) {
            Ok(_) => report.classified += 1,
            Err(e) => {
                eprintln!("{}", format!("write failed for {}: {e}", txn.description).red());
                report.failed_writes += 1;
            }
        }
    }
    report
}
