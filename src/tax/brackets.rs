use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Annual exemption deducted before any income becomes taxable.
pub const TAX_THRESHOLD: Decimal = dec!(60000);

/// One row of the progressive rate table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: Decimal,
    /// `None` marks the unbounded final bracket.
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    /// Precomputed constant so the tax is a single multiply-subtract
    /// instead of summing marginal slices.
    pub quick_deduction: Decimal,
}

/// Annual comprehensive income brackets. Half-open on the low end, closed
/// on the high end: a taxable income sitting exactly on a boundary falls
/// into the lower bracket.
pub const BRACKETS: [Bracket; 7] = [
    Bracket {
        lower: dec!(0),
        upper: Some(dec!(36000)),
        rate: dec!(0.03),
        quick_deduction: dec!(0),
    },
    Bracket {
        lower: dec!(36000),
        upper: Some(dec!(144000)),
        rate: dec!(0.10),
        quick_deduction: dec!(2520),
    },
    Bracket {
        lower: dec!(144000),
        upper: Some(dec!(300000)),
        rate: dec!(0.20),
        quick_deduction: dec!(16920),
    },
    Bracket {
        lower: dec!(300000),
        upper: Some(dec!(420000)),
        rate: dec!(0.25),
        quick_deduction: dec!(31920),
    },
    Bracket {
        lower: dec!(420000),
        upper: Some(dec!(660000)),
        rate: dec!(0.30),
        quick_deduction: dec!(52920),
    },
    Bracket {
        lower: dec!(660000),
        upper: Some(dec!(960000)),
        rate: dec!(0.35),
        quick_deduction: dec!(85920),
    },
    Bracket {
        lower: dec!(960000),
        upper: None,
        rate: dec!(0.45),
        quick_deduction: dec!(181920),
    },
];

/// Find the bracket containing a positive taxable income.
///
/// The table covers `(0, +inf)` with no gaps, so a miss is a programming
/// error, not a user-facing one.
pub fn find_bracket(taxable_income: Decimal) -> &'static Bracket {
    BRACKETS
        .iter()
        .find(|bracket| {
            taxable_income > bracket.lower
                && bracket.upper.is_none_or(|upper| taxable_income <= upper)
        })
        .expect("bracket table covers (0, +inf) with no gaps")
}
