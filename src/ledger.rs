//! Position ledger for gold transactions.
//!
//! Cost basis is a moving weighted average across the ordered transaction
//! list (not FIFO/LIFO): buys add quantity and cost, sells remove quantity
//! and remove cost at the pre-sale average.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Buy,
    Sell,
}

/// A single buy or sell, as persisted in the transaction list.
///
/// `quantity` is always derived from `amount / unit_price` at creation.
/// `realized_profit` is present on sells only and is a snapshot taken
/// against the average cost basis at the moment the sell was recorded; it
/// is never recomputed when earlier transactions change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub quantity: Decimal,
    pub date: NaiveDate,
    #[serde(rename = "profit", default, skip_serializing_if = "Option::is_none")]
    pub realized_profit: Option<Decimal>,
    #[serde(
        rename = "profitPercentage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub realized_profit_percent: Option<Decimal>,
}

/// Rejected transaction input. The original calculator dropped these
/// silently; here the caller gets to say so.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("price and amount must both be positive (got price {unit_price}, amount {amount})")]
    NonPositiveInput {
        unit_price: Decimal,
        amount: Decimal,
    },
}

/// Realized profit snapshot for a sell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellProfit {
    pub profit: Decimal,
    pub profit_percent: Decimal,
}

/// Current position derived from the full transaction list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSummary {
    pub total_quantity: Decimal,
    pub total_cost: Decimal,
    pub average_cost: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
}

/// Derive the quantity for a new transaction.
///
/// Returns `None` when either input is non-positive, which callers treat
/// as "do not create a transaction".
pub fn compute_quantity(unit_price: Decimal, amount: Decimal) -> Option<Decimal> {
    if unit_price <= Decimal::ZERO || amount <= Decimal::ZERO {
        return None;
    }
    Some(amount / unit_price)
}

#[derive(Debug, Default, Clone, Copy)]
struct Holdings {
    quantity: Decimal,
    cost: Decimal,
}

impl Holdings {
    fn average_cost(&self) -> Decimal {
        if self.quantity > Decimal::ZERO {
            self.cost / self.quantity
        } else {
            Decimal::ZERO
        }
    }
}

/// Fold the transaction list into total held quantity and total cost.
fn fold_holdings(transactions: &[Transaction]) -> Holdings {
    let mut holdings = Holdings::default();
    for tx in transactions {
        match tx.kind {
            TxKind::Buy => {
                holdings.quantity += tx.quantity;
                holdings.cost += tx.amount;
            }
            TxKind::Sell => {
                // Remove cost at the pre-sale average; selling with no
                // holdings removes no cost at all.
                let removed = if holdings.quantity.is_zero() {
                    Decimal::ZERO
                } else {
                    holdings.cost / holdings.quantity * tx.quantity
                };
                holdings.cost -= removed;
                holdings.quantity -= tx.quantity;
            }
        }
        log::debug!(
            "holdings after {:?} {}: qty={}, cost={}",
            tx.kind,
            tx.id,
            holdings.quantity,
            holdings.cost
        );
    }
    holdings
}

/// Realized profit of a sell against the average cost basis of
/// `prior_transactions`.
///
/// A sell with no prior holdings has a zero cost basis, so the profit
/// equals the full proceeds and the percentage reads 0.
pub fn record_sell_profit(
    sell_price: Decimal,
    sell_quantity: Decimal,
    prior_transactions: &[Transaction],
) -> SellProfit {
    let average_cost = fold_holdings(prior_transactions).average_cost();
    let proceeds = sell_price * sell_quantity;
    let cost = average_cost * sell_quantity;
    let profit = proceeds - cost;
    let profit_percent = if cost > Decimal::ZERO {
        profit / cost * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    SellProfit {
        profit,
        profit_percent,
    }
}

/// Current position against a market price. Pure: calling it twice on the
/// same list yields identical output. Rounding is left to the caller.
pub fn compute_position(transactions: &[Transaction], current_price: Decimal) -> PositionSummary {
    let holdings = fold_holdings(transactions);
    let average_cost = holdings.average_cost();
    let current_value = holdings.quantity * current_price;
    let profit = current_value - holdings.cost;
    let profit_percent = if holdings.cost > Decimal::ZERO {
        profit / holdings.cost * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    PositionSummary {
        total_quantity: holdings.quantity,
        total_cost: holdings.cost,
        average_cost,
        current_value,
        profit,
        profit_percent,
    }
}

/// The ordered transaction list with in-place edit and delete by id.
#[derive(Debug, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Ledger { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Validate and record a transaction. An existing `id` is replaced in
    /// place (edit), otherwise the transaction is appended.
    ///
    /// Sells snapshot their realized profit against the list as it stands,
    /// so an in-place edit prices against the record's own previous version
    /// as well - the behaviour the stored blobs have always had.
    ///
    /// Rejects without touching the list when price or amount is
    /// non-positive.
    pub fn add(
        &mut self,
        id: String,
        kind: TxKind,
        unit_price: Decimal,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<&Transaction, LedgerError> {
        let quantity = compute_quantity(unit_price, amount)
            .ok_or(LedgerError::NonPositiveInput { unit_price, amount })?;
        let (realized_profit, realized_profit_percent) = match kind {
            TxKind::Sell => {
                let snapshot = record_sell_profit(unit_price, quantity, &self.transactions);
                (Some(snapshot.profit), Some(snapshot.profit_percent))
            }
            TxKind::Buy => (None, None),
        };
        let tx = Transaction {
            id,
            kind,
            unit_price,
            amount,
            quantity,
            date,
            realized_profit,
            realized_profit_percent,
        };
        Ok(self.upsert(tx))
    }

    /// Replace by id, or append when the id is new.
    pub fn upsert(&mut self, tx: Transaction) -> &Transaction {
        match self.transactions.iter().position(|t| t.id == tx.id) {
            Some(i) => {
                log::debug!("replacing transaction {}", tx.id);
                self.transactions[i] = tx;
                &self.transactions[i]
            }
            None => {
                self.transactions.push(tx);
                let i = self.transactions.len() - 1;
                &self.transactions[i]
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Remove by id. Frozen sell snapshots on later transactions are left
    /// untouched. Returns false when the id is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn buy(id: &str, price: Decimal, amount: Decimal) -> Transaction {
        Transaction {
            id: id.to_string(),
            kind: TxKind::Buy,
            unit_price: price,
            amount,
            quantity: amount / price,
            date: date("2024-01-15"),
            realized_profit: None,
            realized_profit_percent: None,
        }
    }

    fn sell(id: &str, price: Decimal, amount: Decimal) -> Transaction {
        Transaction {
            id: id.to_string(),
            kind: TxKind::Sell,
            unit_price: price,
            amount,
            quantity: amount / price,
            date: date("2024-02-15"),
            realized_profit: None,
            realized_profit_percent: None,
        }
    }

    #[test]
    fn quantity_is_amount_over_price() {
        assert_eq!(compute_quantity(dec!(500), dec!(10000)), Some(dec!(20)));
        // Inverse relation holds for any valid pair
        let qty = compute_quantity(dec!(480.5), dec!(9610)).unwrap();
        assert_eq!(qty * dec!(480.5), dec!(9610));
    }

    #[test]
    fn quantity_rejects_non_positive_inputs() {
        assert_eq!(compute_quantity(Decimal::ZERO, dec!(100)), None);
        assert_eq!(compute_quantity(dec!(-1), dec!(100)), None);
        assert_eq!(compute_quantity(dec!(500), Decimal::ZERO), None);
        assert_eq!(compute_quantity(dec!(500), dec!(-50)), None);
    }

    #[test]
    fn sell_profit_worked_example() {
        // Buy 10000 at 500 (20g), buy 5000 at 500 (10g), sell 15g at 600.
        // Average cost before the sell: 15000 / 30 = 500.
        let prior = vec![
            buy("1", dec!(500), dec!(10000)),
            buy("2", dec!(500), dec!(5000)),
        ];
        let snapshot = record_sell_profit(dec!(600), dec!(15), &prior);
        assert_eq!(snapshot.profit, dec!(1500));
        assert_eq!(snapshot.profit_percent, dec!(20));
    }

    #[test]
    fn sell_with_empty_history_yields_full_proceeds() {
        let snapshot = record_sell_profit(dec!(600), dec!(5), &[]);
        assert_eq!(snapshot.profit, dec!(3000));
        assert_eq!(snapshot.profit_percent, Decimal::ZERO);
    }

    #[test]
    fn sell_removes_cost_at_pre_sale_average() {
        // 30g at average 500, sell 15g: remaining 15g still at 500 average.
        let transactions = vec![
            buy("1", dec!(500), dec!(10000)),
            buy("2", dec!(500), dec!(5000)),
            sell("3", dec!(600), dec!(9000)),
        ];
        let position = compute_position(&transactions, dec!(600));
        assert_eq!(position.total_quantity, dec!(15));
        assert_eq!(position.total_cost, dec!(7500));
        assert_eq!(position.average_cost, dec!(500));
    }

    #[test]
    fn buy_only_position_averages_exactly() {
        let transactions = vec![
            buy("1", dec!(450), dec!(9000)),
            buy("2", dec!(550), dec!(11000)),
        ];
        let position = compute_position(&transactions, dec!(520));
        assert_eq!(position.total_quantity, dec!(40));
        assert_eq!(position.total_cost, dec!(20000));
        assert_eq!(
            position.average_cost,
            position.total_cost / position.total_quantity
        );
        assert_eq!(position.current_value, dec!(20800));
        assert_eq!(position.profit, position.current_value - position.total_cost);
        assert_eq!(position.profit_percent, dec!(4));
    }

    #[test]
    fn position_is_idempotent() {
        let transactions = vec![
            buy("1", dec!(500), dec!(10000)),
            sell("2", dec!(550), dec!(5500)),
        ];
        let first = compute_position(&transactions, dec!(560));
        let second = compute_position(&transactions, dec!(560));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_list_position_is_all_zero() {
        let position = compute_position(&[], dec!(600));
        assert_eq!(position.total_quantity, Decimal::ZERO);
        assert_eq!(position.total_cost, Decimal::ZERO);
        assert_eq!(position.average_cost, Decimal::ZERO);
        assert_eq!(position.profit, Decimal::ZERO);
        assert_eq!(position.profit_percent, Decimal::ZERO);
    }

    #[test]
    fn add_rejects_invalid_input_without_mutating() {
        let mut ledger = Ledger::default();
        let err = ledger
            .add(
                "1".to_string(),
                TxKind::Buy,
                Decimal::ZERO,
                dec!(100),
                date("2024-01-15"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::NonPositiveInput {
                unit_price: Decimal::ZERO,
                amount: dec!(100),
            }
        );
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn add_sell_freezes_profit_snapshot() {
        let mut ledger = Ledger::from_transactions(vec![buy("1", dec!(500), dec!(10000))]);
        ledger
            .add(
                "2".to_string(),
                TxKind::Sell,
                dec!(600),
                dec!(6000),
                date("2024-02-15"),
            )
            .unwrap();

        let recorded = ledger.get("2").unwrap();
        assert_eq!(recorded.quantity, dec!(10));
        assert_eq!(recorded.realized_profit, Some(dec!(1000)));
        assert_eq!(recorded.realized_profit_percent, Some(dec!(20)));

        // Deleting the earlier buy must not touch the frozen snapshot.
        assert!(ledger.remove("1"));
        let recorded = ledger.get("2").unwrap();
        assert_eq!(recorded.realized_profit, Some(dec!(1000)));
    }

    #[test]
    fn add_with_existing_id_replaces_in_place() {
        let mut ledger = Ledger::from_transactions(vec![
            buy("1", dec!(500), dec!(10000)),
            buy("2", dec!(500), dec!(5000)),
        ]);
        ledger
            .add(
                "1".to_string(),
                TxKind::Buy,
                dec!(520),
                dec!(10400),
                date("2024-01-20"),
            )
            .unwrap();

        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.transactions()[0].id, "1");
        assert_eq!(ledger.transactions()[0].unit_price, dec!(520));
        assert_eq!(ledger.transactions()[1].id, "2");
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut ledger = Ledger::from_transactions(vec![buy("1", dec!(500), dec!(10000))]);
        assert!(!ledger.remove("missing"));
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn transaction_json_uses_original_field_names() {
        let tx = buy("1700000000000", dec!(500), dec!(10000));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "buy");
        assert_eq!(json["price"], "500");
        assert_eq!(json["date"], "2024-01-15");
        assert!(json.get("profit").is_none());
    }
}
