mod categorizer;
mod cli;
mod db;
mod discover;
mod error;
mod exporter;
mod fmt;
mod importer;
mod models;
mod ofx;
mod persister;
mod reviewer;
mod settings;

use clap::Parser;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let result = cli.settings().and_then(|settings| cli::import::run(&settings));

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
