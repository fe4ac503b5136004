//! Ledger commands - record transactions and track the gold position

use crate::ledger::{compute_position, Ledger, PositionSummary, Transaction, TxKind};
use crate::store::{self, KeyValueStore};
use crate::utils;
use anyhow::{anyhow, bail};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Record a buy or sell (pass --id to edit an existing record in place)
    Add(AddCommand),
    /// List recorded transactions
    List(ListCommand),
    /// Delete a transaction by id
    Delete(DeleteCommand),
    /// Show the current position against the market price
    Position(PositionCommand),
    /// Write the transaction list as CSV to stdout
    Export,
}

impl LedgerCommand {
    pub fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        match self {
            LedgerCommand::Add(cmd) => cmd.exec(store),
            LedgerCommand::List(cmd) => cmd.exec(store),
            LedgerCommand::Delete(cmd) => cmd.exec(store),
            LedgerCommand::Position(cmd) => cmd.exec(store),
            LedgerCommand::Export => export(store),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Buy,
    Sell,
}

impl From<KindArg> for TxKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Buy => TxKind::Buy,
            KindArg::Sell => TxKind::Sell,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddCommand {
    /// Transaction kind
    #[arg(short, long, value_enum)]
    kind: KindArg,

    /// Unit price (currency per gram)
    #[arg(short, long)]
    price: Decimal,

    /// Total amount spent (buy) or received (sell)
    #[arg(short, long)]
    amount: Decimal,

    /// Transaction date (defaults to today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Id of an existing transaction to replace in place
    #[arg(long)]
    id: Option<String>,
}

impl AddCommand {
    fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        let mut ledger = Ledger::from_transactions(store::load_transactions(store)?);
        let id = self
            .id
            .clone()
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());

        let tx = ledger
            .add(id, self.kind.into(), self.price, self.amount, date)?
            .clone();
        store::save_transactions(store, ledger.transactions())?;

        match (tx.realized_profit, tx.realized_profit_percent) {
            (Some(profit), Some(percent)) => println!(
                "Recorded sell {}: {}g at {}/g, realized P/L {} ({}%)",
                tx.id,
                format_quantity(tx.quantity),
                format_amount(tx.unit_price),
                format_signed(profit),
                format_signed(percent.round_dp(2))
            ),
            _ => println!(
                "Recorded buy {}: {}g at {}/g for {}",
                tx.id,
                format_quantity(tx.quantity),
                format_amount(tx.unit_price),
                format_amount(tx.amount)
            ),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,
}

impl ListCommand {
    fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        let transactions = store::load_transactions(store)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&transactions)?);
            return Ok(());
        }

        if transactions.is_empty() {
            println!("No transactions recorded");
            return Ok(());
        }

        let rows: Vec<TransactionRow> = transactions.iter().map(TransactionRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// Id of the transaction to delete
    #[arg(long)]
    id: String,
}

impl DeleteCommand {
    fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        let mut ledger = Ledger::from_transactions(store::load_transactions(store)?);
        if !ledger.remove(&self.id) {
            bail!("no transaction with id {}", self.id);
        }
        store::save_transactions(store, ledger.transactions())?;
        println!("Deleted transaction {}", self.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PositionCommand {
    /// Market price (currency per gram); persisted for later runs
    #[arg(short, long)]
    price: Option<Decimal>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl PositionCommand {
    fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        let transactions = store::load_transactions(store)?;
        let current_price = match self.price {
            Some(price) => {
                store::save_current_price(store, price)?;
                price
            }
            None => store::load_current_price(store)?
                .ok_or_else(|| anyhow!("no market price stored; pass --price"))?,
        };

        let position = compute_position(&transactions, current_price);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rounded_view(&position))?
            );
            return Ok(());
        }

        println!();
        println!("POSITION (market price {}/g)", format_amount(current_price));
        println!();
        println!("  Holding: {} g", format_quantity(position.total_quantity));
        println!(
            "  Total cost: {} | Average cost: {}/g",
            format_amount(position.total_cost),
            format_amount(position.average_cost)
        );
        println!(
            "  Market value: {} | P/L: {} ({}%)",
            format_amount(position.current_value),
            format_signed(position.profit.round_dp(2)),
            format_signed(position.profit_percent.round_dp(2))
        );
        println!();
        Ok(())
    }
}

fn export(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    let transactions = store::load_transactions(store)?;
    let records: Vec<TransactionCsvRecord> =
        transactions.iter().map(TransactionCsvRecord::from).collect();
    utils::write_csv(records, io::stdout())
}

/// Presentation rounding only: 2 dp for currency, 4 dp for grams.
fn rounded_view(position: &PositionSummary) -> PositionSummary {
    PositionSummary {
        total_quantity: position.total_quantity.round_dp(4),
        total_cost: position.total_cost.round_dp(2),
        average_cost: position.average_cost.round_dp(2),
        current_value: position.current_value.round_dp(2),
        profit: position.profit.round_dp(2),
        profit_percent: position.profit_percent.round_dp(2),
    }
}

#[derive(Debug, Clone, Tabled)]
struct TransactionRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Quantity (g)")]
    quantity: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Realized P/L")]
    realized_profit: String,
    #[tabled(rename = "P/L %")]
    realized_profit_percent: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        TransactionRow {
            id: tx.id.clone(),
            kind: kind_name(tx.kind).to_string(),
            price: format_amount(tx.unit_price),
            amount: format_amount(tx.amount),
            quantity: format_quantity(tx.quantity),
            date: tx.date.format("%Y-%m-%d").to_string(),
            realized_profit: tx
                .realized_profit
                .map(format_signed)
                .unwrap_or_else(|| "-".to_string()),
            realized_profit_percent: tx
                .realized_profit_percent
                .map(|p| format_signed(p.round_dp(2)))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// CSV record for ledger export
#[derive(Debug, Serialize)]
struct TransactionCsvRecord {
    id: String,
    kind: String,
    price: String,
    amount: String,
    quantity: String,
    date: String,
    realized_profit: String,
    realized_profit_percent: String,
}

impl From<&Transaction> for TransactionCsvRecord {
    fn from(tx: &Transaction) -> Self {
        TransactionCsvRecord {
            id: tx.id.clone(),
            kind: kind_name(tx.kind).to_string(),
            price: tx.unit_price.to_string(),
            amount: tx.amount.to_string(),
            quantity: tx.quantity.round_dp(4).to_string(),
            date: tx.date.format("%Y-%m-%d").to_string(),
            realized_profit: tx
                .realized_profit
                .map(|p| p.round_dp(2).to_string())
                .unwrap_or_default(),
            realized_profit_percent: tx
                .realized_profit_percent
                .map(|p| p.round_dp(2).to_string())
                .unwrap_or_default(),
        }
    }
}

fn kind_name(kind: TxKind) -> &'static str {
    match kind {
        TxKind::Buy => "buy",
        TxKind::Sell => "sell",
    }
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn format_signed(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("{:.2}", amount)
    } else {
        format!("+{:.2}", amount)
    }
}

fn format_quantity(qty: Decimal) -> String {
    format!("{:.4}", qty)
}
