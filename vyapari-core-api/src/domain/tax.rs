//! GST decomposition of tax-inclusive prices.
//!
//! Unit rates quoted by sellers already contain GST. The base (ex-tax) rate
//! is recovered by dividing out `1 + (cgst + sgst + igst) / 100`; every
//! component amount is then derived from the base rate. Accumulation runs at
//! full `Decimal` precision and rounding happens only in [`round_money`].

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round a monetary amount to paise, half away from zero. The result always
/// carries two decimal places so it prints as `190.00`.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// CGST/SGST/IGST percentages applied to one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxRates {
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
}

impl TaxRates {
    pub fn new(cgst: Decimal, sgst: Decimal, igst: Decimal) -> Result<Self, ValidationError> {
        let rates = Self { cgst, sgst, igst };
        rates.validate()?;
        Ok(rates)
    }

    /// Intra-state sale: the combined rate is split evenly into CGST and SGST.
    pub fn intra_state(combined: Decimal) -> Result<Self, ValidationError> {
        let half = combined / Decimal::TWO;
        Self::new(half, half, Decimal::ZERO)
    }

    /// Inter-state sale: the whole rate is IGST.
    pub fn inter_state(igst: Decimal) -> Result<Self, ValidationError> {
        Self::new(Decimal::ZERO, Decimal::ZERO, igst)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("cgst_rate", self.cgst), ("sgst_rate", self.sgst), ("igst_rate", self.igst)] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ValidationError::new(field, "tax rate cannot be negative"));
            }
        }
        Ok(())
    }

    /// Blended percentage stored on ledger rows.
    pub fn combined(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }

    pub fn tax_factor(&self) -> Decimal {
        Decimal::ONE + self.combined() / HUNDRED
    }
}

/// Per-line amounts at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// Tax-inclusive rate after the per-unit discount.
    pub effective_rate: Decimal,
    pub base_rate: Decimal,
    pub base_total: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub gross_total: Decimal,
}

impl LineAmounts {
    pub fn tax_total(&self) -> Decimal {
        self.cgst_amount + self.sgst_amount + self.igst_amount
    }
}

/// Decompose one line item.
///
/// `unit_rate` is tax-inclusive; `discount` is taken off each unit before
/// the tax is divided out. The gross total is `(unit_rate - discount) * quantity`.
pub fn decompose_line(
    unit_rate: Decimal,
    discount: Decimal,
    quantity: u32,
    rates: &TaxRates,
) -> Result<LineAmounts, ValidationError> {
    rates.validate()?;
    if unit_rate <= Decimal::ZERO {
        return Err(ValidationError::new("unit_rate", "must be greater than zero"));
    }
    if quantity == 0 {
        return Err(ValidationError::new("quantity", "must be a positive integer"));
    }
    if discount.is_sign_negative() && !discount.is_zero() {
        return Err(ValidationError::new("discount", "cannot be negative"));
    }
    if discount > unit_rate {
        return Err(ValidationError::new("discount", "cannot exceed the unit rate"));
    }

    let qty = Decimal::from(quantity);
    let effective_rate = unit_rate - discount;
    let base_rate = effective_rate / rates.tax_factor();
    let component = |percent: Decimal| base_rate * percent / HUNDRED * qty;

    Ok(LineAmounts {
        effective_rate,
        base_rate,
        base_total: base_rate * qty,
        cgst_amount: component(rates.cgst),
        sgst_amount: component(rates.sgst),
        igst_amount: component(rates.igst),
        gross_total: effective_rate * qty,
    })
}

/// Sum of all line amounts of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub base_total: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub gross_total: Decimal,
}

impl InvoiceTotals {
    pub fn add(&mut self, line: &LineAmounts) {
        self.base_total += line.base_total;
        self.cgst_amount += line.cgst_amount;
        self.sgst_amount += line.sgst_amount;
        self.igst_amount += line.igst_amount;
        self.gross_total += line.gross_total;
    }

    pub fn tax_total(&self) -> Decimal {
        self.cgst_amount + self.sgst_amount + self.igst_amount
    }

    /// Presentation copy rounded to paise.
    pub fn rounded(&self) -> Self {
        Self {
            base_total: round_money(self.base_total),
            cgst_amount: round_money(self.cgst_amount),
            sgst_amount: round_money(self.sgst_amount),
            igst_amount: round_money(self.igst_amount),
            gross_total: round_money(self.gross_total),
        }
    }
}

impl<'a> FromIterator<&'a LineAmounts> for InvoiceTotals {
    fn from_iter<I: IntoIterator<Item = &'a LineAmounts>>(iter: I) -> Self {
        let mut totals = InvoiceTotals::default();
        for line in iter {
            totals.add(line);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000001)
    }

    #[test]
    fn base_rate_times_factor_recovers_inclusive_rate() {
        let rates = TaxRates::new(dec!(9), dec!(9), dec!(0)).unwrap();
        for (rate, qty) in [(dec!(20.0), 5u32), (dec!(45.0), 2), (dec!(0.01), 1), (dec!(99999.99), 7)] {
            let line = decompose_line(rate, Decimal::ZERO, qty, &rates).unwrap();
            assert!(close(line.base_rate * rates.tax_factor(), rate));
            assert!(close(line.base_total + line.tax_total(), line.gross_total));
        }
    }

    #[test]
    fn components_sum_with_igst() {
        let rates = TaxRates::new(dec!(2.5), dec!(2.5), dec!(12)).unwrap();
        let line = decompose_line(dec!(117), Decimal::ZERO, 3, &rates).unwrap();
        assert!(close(line.base_rate, dec!(100)));
        assert!(close(line.igst_amount, dec!(36)));
        assert!(close(line.cgst_amount + line.sgst_amount, dec!(15)));
        assert_eq!(line.gross_total, dec!(351));
    }

    #[test]
    fn tea_and_sugar_invoice() {
        let rates = TaxRates::intra_state(dec!(18)).unwrap();
        assert_eq!(rates.tax_factor(), dec!(1.18));

        let tea = decompose_line(dec!(20.0), Decimal::ZERO, 5, &rates).unwrap();
        let sugar = decompose_line(dec!(45.0), Decimal::ZERO, 2, &rates).unwrap();
        assert_eq!(round_money(tea.base_rate), dec!(16.95));
        assert_eq!(round_money(sugar.base_rate), dec!(38.14));

        let totals: InvoiceTotals = [tea, sugar].iter().collect();
        assert_eq!(totals.rounded().gross_total, dec!(190.00));
        assert!(close(totals.base_total + totals.tax_total(), totals.gross_total));
    }

    #[test]
    fn zero_tax_keeps_rate() {
        let line = decompose_line(dec!(50), Decimal::ZERO, 2, &TaxRates::default()).unwrap();
        assert_eq!(line.base_rate, dec!(50));
        assert_eq!(line.tax_total(), Decimal::ZERO);
        assert_eq!(line.gross_total, dec!(100));
    }

    #[test]
    fn discount_is_taken_before_tax() {
        let rates = TaxRates::intra_state(dec!(18)).unwrap();
        let line = decompose_line(dec!(128), dec!(10), 1, &rates).unwrap();
        assert_eq!(line.effective_rate, dec!(118));
        assert!(close(line.base_rate, dec!(100)));
        assert_eq!(line.gross_total, dec!(118));
    }

    #[test]
    fn rejects_invalid_inputs() {
        let rates = TaxRates::default();
        assert_eq!(decompose_line(dec!(0), dec!(0), 1, &rates).unwrap_err().field, "unit_rate");
        assert_eq!(decompose_line(dec!(-5), dec!(0), 1, &rates).unwrap_err().field, "unit_rate");
        assert_eq!(decompose_line(dec!(5), dec!(0), 0, &rates).unwrap_err().field, "quantity");
        assert_eq!(decompose_line(dec!(5), dec!(6), 1, &rates).unwrap_err().field, "discount");
        assert_eq!(decompose_line(dec!(5), dec!(-1), 1, &rates).unwrap_err().field, "discount");
        assert!(TaxRates::new(dec!(-1), dec!(0), dec!(0)).is_err());
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_money(dec!(38.135)), dec!(38.14));
        assert_eq!(round_money(dec!(16.945)), dec!(16.95));
        assert_eq!(round_money(dec!(16.944)), dec!(16.94));
        assert_eq!(round_money(dec!(190.0)).to_string(), "190.00");
    }
}
