//! Tax commands - stored inputs and the computed estimate

use crate::store::{self, KeyValueStore};
use crate::tax::{compute_tax, TaxInput, TaxResult};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Subcommand, Debug)]
pub enum TaxCommand {
    /// Update stored inputs with any provided flags, then compute
    Compute(ComputeCommand),
    /// Recompute from the stored inputs without changing them
    Show(ShowCommand),
    /// Clear the stored inputs
    Reset,
}

impl TaxCommand {
    pub fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        match self {
            TaxCommand::Compute(cmd) => cmd.exec(store),
            TaxCommand::Show(cmd) => cmd.exec(store),
            TaxCommand::Reset => {
                store::clear_tax_input(store)?;
                println!("Tax inputs cleared");
                Ok(())
            }
        }
    }
}

/// Raw amounts are taken as strings on purpose: coercion to numbers is the
/// engine's explicit zero-default contract, not the CLI's.
#[derive(Args, Debug)]
pub struct ComputeCommand {
    /// Annual gross salary
    #[arg(long)]
    salary: Option<String>,

    /// Special deduction (social insurance and housing fund)
    #[arg(long)]
    special_deduction: Option<String>,

    /// Children education deduction
    #[arg(long)]
    children_education: Option<String>,

    /// Continuing education deduction
    #[arg(long)]
    continuing_education: Option<String>,

    /// Housing loan interest deduction
    #[arg(long)]
    housing_loan: Option<String>,

    /// Housing rent deduction
    #[arg(long)]
    housing_rent: Option<String>,

    /// Elderly support deduction
    #[arg(long)]
    elderly_support: Option<String>,

    /// Other deductions
    #[arg(long)]
    other_deduction: Option<String>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl ComputeCommand {
    fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        let mut input = store::load_tax_input(store)?;
        overlay(&mut input.salary, &self.salary);
        overlay(&mut input.special_deduction, &self.special_deduction);
        overlay(&mut input.children_edu, &self.children_education);
        overlay(&mut input.continuing_edu, &self.continuing_education);
        overlay(&mut input.housing_loan, &self.housing_loan);
        overlay(&mut input.housing_rent, &self.housing_rent);
        overlay(&mut input.elderly_support, &self.elderly_support);
        overlay(&mut input.other_deduction, &self.other_deduction);
        store::save_tax_input(store, &input)?;

        let result = compute_tax(&input);
        print_result(&result, self.json)
    }
}

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl ShowCommand {
    fn exec(&self, store: &dyn KeyValueStore) -> anyhow::Result<()> {
        let input = store::load_tax_input(store)?;
        let result = compute_tax(&input);
        print_result(&result, self.json)
    }
}

fn overlay(field: &mut Option<String>, arg: &Option<String>) {
    if let Some(value) = arg {
        *field = Some(value.clone());
    }
}

fn print_result(result: &TaxResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!();
    println!("TAX ESTIMATE");
    println!();
    println!("  Taxable income: {}", format_amount(result.taxable_income));
    println!(
        "  Rate: {:.1}% | Quick deduction: {}",
        result.rate * dec!(100),
        format_amount(result.quick_deduction)
    );
    println!("  Tax owed: {}", format_amount(result.tax));
    println!("  Net income: {}", format_amount(result.net_income));
    println!();
    Ok(())
}

fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
