//! Progressive personal income tax on annual comprehensive income.

pub mod brackets;

pub use brackets::{find_bracket, Bracket, BRACKETS, TAX_THRESHOLD};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw calculator input as persisted: free-text amounts straight from the
/// form. Coercion to numbers happens in exactly one place, [`parse_amount`].
///
/// Field names in the stored JSON match the original blob
/// (`specialDeduction`, `childrenEdu`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxInput {
    pub salary: Option<String>,
    pub special_deduction: Option<String>,
    pub children_edu: Option<String>,
    pub continuing_edu: Option<String>,
    pub housing_loan: Option<String>,
    pub housing_rent: Option<String>,
    pub elderly_support: Option<String>,
    pub other_deduction: Option<String>,
}

impl TaxInput {
    /// Sum of the six additional special deduction categories.
    fn additional_deductions(&self) -> Decimal {
        [
            &self.children_edu,
            &self.continuing_edu,
            &self.housing_loan,
            &self.housing_rent,
            &self.elderly_support,
            &self.other_deduction,
        ]
        .into_iter()
        .map(|raw| parse_amount(raw.as_deref()))
        .sum()
    }
}

/// Derived tax figures, always recomputed from [`TaxInput`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxResult {
    pub taxable_income: Decimal,
    pub rate: Decimal,
    pub quick_deduction: Decimal,
    pub tax: Decimal,
    pub net_income: Decimal,
}

/// Coerce a raw field to an amount. Missing, blank, and non-numeric input
/// all read as zero - the calculator never rejects.
pub fn parse_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| Decimal::from_str(s.trim()).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Compute tax owed and net income.
///
/// `taxable = salary - threshold - special deduction - additional
/// deductions`, clamped to zero; a positive taxable income is charged at
/// its bracket's marginal rate minus the quick deduction.
pub fn compute_tax(input: &TaxInput) -> TaxResult {
    let salary = parse_amount(input.salary.as_deref());
    let special_deduction = parse_amount(input.special_deduction.as_deref());
    let additional_deductions = input.additional_deductions();

    let taxable_income = salary - TAX_THRESHOLD - special_deduction - additional_deductions;
    if taxable_income <= Decimal::ZERO {
        return TaxResult {
            taxable_income: Decimal::ZERO,
            rate: Decimal::ZERO,
            quick_deduction: Decimal::ZERO,
            tax: Decimal::ZERO,
            net_income: salary,
        };
    }

    let bracket = find_bracket(taxable_income);
    let tax = taxable_income * bracket.rate - bracket.quick_deduction;
    log::debug!(
        "taxable={}, rate={}, quick_deduction={}, tax={}",
        taxable_income,
        bracket.rate,
        bracket.quick_deduction,
        tax
    );

    TaxResult {
        taxable_income,
        rate: bracket.rate,
        quick_deduction: bracket.quick_deduction,
        tax,
        net_income: salary - tax,
    }
}
