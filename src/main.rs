use clap::Parser;

mod cmd;
mod ledger;
mod store;
mod tax;
mod utils;

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = cmd::Cli::parse();
    cli.exec()
}
