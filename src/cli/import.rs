use colored::Colorize;

use crate::categorizer::RuleBook;
use crate::db::{get_connection, init_db};
use crate::discover::find_statement_files;
use crate::error::{GastosError, Result};
use crate::exporter::export;
use crate::importer::ingest;
use crate::persister::Persister;
use crate::reviewer::resolve_unknowns;
use crate::settings::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let conn = get_connection(&settings.db_path)?;
    init_db(&conn)?;
    let persister = Persister::new(&conn);
    let mut rules = RuleBook::load(&conn)?;

    let files = find_statement_files(&settings.input_dir);
    if files.is_empty() {
        println!(
            "{}",
            format!("nenhum arquivo .ofx em {}", settings.input_dir.display()).yellow()
        );
    }

    let report = ingest(&persister, &rules, files, settings.worker_count());
    println!(
        "{} arquivos lidos, {} ignorados; {} transações classificadas por {} regras, {} sem categoria",
        report.files_parsed,
        report.files_skipped,
        report.classified,
        rules.len(),
        report.unknown.len()
    );
    let mut failed_writes = report.failed_writes;

    if !report.unknown.is_empty() {
        let mut input = std::io::stdin().lock();
        let mut output = std::io::stdout();
        let resolved = resolve_unknowns(&persister, &mut rules, &report.unknown, &mut input, &mut output)?;
        println!(
            "\n{} categorizadas à mão, {} por regra aprendida, {} regras novas",
            resolved.prompted, resolved.auto_applied, resolved.learned
        );
        failed_writes += resolved.failed_writes;
    }

    let summary = export(&conn, &settings.output_path, &chrono::Local::now().naive_local())?;
    if let Some(backup) = &summary.backup {
        println!("backup: {}", backup.display());
    }
    println!(
        "{} gravado: {} abas, {} transações",
        settings.output_path.display(),
        summary.sheets,
        summary.rows
    );

    if failed_writes > 0 {
        return Err(GastosError::FailedWrites(failed_writes));
    }
    println!("{}", "✔ importação concluída".green());
    Ok(())
}
