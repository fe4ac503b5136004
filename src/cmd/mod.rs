pub mod ledger;
pub mod tax;

use crate::store::FileStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ingot",
    version,
    about = "Gold position tracker and personal income tax calculator"
)]
pub struct Cli {
    /// Directory holding persisted calculator state
    #[arg(long, global = true, default_value = ".ingot")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gold position ledger
    #[command(subcommand)]
    Ledger(ledger::LedgerCommand),
    /// Personal income tax calculator
    #[command(subcommand)]
    Tax(tax::TaxCommand),
}

impl Cli {
    pub fn exec(&self) -> anyhow::Result<()> {
        let store = FileStore::new(&self.data_dir);
        match &self.command {
            Command::Ledger(cmd) => cmd.exec(&store),
            Command::Tax(cmd) => cmd.exec(&store),
        }
    }
}
