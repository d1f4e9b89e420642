//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are never stored as floats: `rust_decimal::Decimal` keeps cart
//! totals exact no matter how many line items are summed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// The zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply by a quantity, e.g. to compute a cart line total.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add another price. Both operands must share a currency; mixed-currency
    /// carts are not supported.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        debug_assert_eq!(self.currency_code, other.currency_code);
        Self::new(self.amount + other.amount, self.currency_code)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    #[test]
    fn test_times_computes_line_total() {
        let unit = usd(1999);
        assert_eq!(unit.times(3), usd(5997));
    }

    #[test]
    fn test_times_zero_quantity() {
        assert_eq!(usd(1999).times(0), usd(0));
    }

    #[test]
    fn test_plus_sums_amounts() {
        assert_eq!(usd(100).plus(&usd(250)), usd(350));
    }

    #[test]
    fn test_zero() {
        assert_eq!(Price::zero(CurrencyCode::USD), usd(0));
    }
}
