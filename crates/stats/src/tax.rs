//! Auction house BIN tax, computed locally.

use crate::format::format_number;

/// Parse an amount like `1500`, `2.5m`, `1,000,000` or `3B`.
///
/// Returns `None` for anything unparsable, non-finite, or not strictly positive.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let (digits, multiplier) = match lower.chars().last()? {
        'k' => (&lower[..lower.len() - 1], 1e3),
        'm' => (&lower[..lower.len() - 1], 1e6),
        'b' => (&lower[..lower.len() - 1], 1e9),
        _ => (lower.as_str(), 1.0),
    };
    let value = digits.parse::<f64>().ok()? * multiplier;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Fee breakdown for listing an item at a BIN price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBreakdown {
    /// Listing price.
    pub price: f64,
    /// Listing fee rate in percent.
    pub listing_rate: f64,
    /// Listing fee.
    pub listing_fee: f64,
    /// Claim tax rate in percent (zero at or below 1M).
    pub claim_rate: f64,
    /// Claim tax.
    pub claim_tax: f64,
    /// Whether the Derpy multiplier was applied.
    pub derpy: bool,
}

impl TaxBreakdown {
    /// Compute fees for `price`. `derpy` quadruples both taxes.
    pub fn calculate(price: f64, derpy: bool) -> Self {
        let mut listing_rate = if price < 10_000_000.0 {
            1.0
        } else if price < 100_000_000.0 {
            2.0
        } else {
            2.5
        };
        let mut claim_rate = if price > 1_000_000.0 { 1.0 } else { 0.0 };
        if derpy {
            listing_rate *= 4.0;
            claim_rate *= 4.0;
        }
        Self {
            price,
            listing_rate,
            listing_fee: price * listing_rate / 100.0,
            claim_rate,
            claim_tax: price * claim_rate / 100.0,
            derpy,
        }
    }

    /// Total fees.
    pub fn total(&self) -> f64 {
        self.listing_fee + self.claim_tax
    }

    /// What the seller keeps.
    pub fn proceeds(&self) -> f64 {
        self.price - self.total()
    }

    /// Chat line without the response marker.
    pub fn message(&self) -> String {
        let derpy = if self.derpy { " [Derpy]" } else { "" };
        format!(
            "Tax for {}{derpy}: Listing {} ({}%) | Claim {} ({}%) | Total {} | You get {}",
            format_number(self.price),
            format_number(self.listing_fee),
            self.listing_rate,
            format_number(self.claim_tax),
            self.claim_rate,
            format_number(self.total()),
            format_number(self.proceeds())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixes_and_separators() {
        assert_eq!(parse_amount("1500"), Some(1500.0));
        assert_eq!(parse_amount("2.5m"), Some(2_500_000.0));
        assert_eq!(parse_amount("3B"), Some(3_000_000_000.0));
        assert_eq!(parse_amount("10k"), Some(10_000.0));
        assert_eq!(parse_amount("1,000,000"), Some(1_000_000.0));
    }

    #[test]
    fn rejects_non_positive_and_garbage() {
        for raw in ["", "0", "-5m", "abc", "m", "1.2.3k", "inf", "NaN"] {
            assert_eq!(parse_amount(raw), None, "{raw}");
        }
    }

    #[test]
    fn rate_brackets() {
        assert_eq!(TaxBreakdown::calculate(500_000.0, false).listing_rate, 1.0);
        assert_eq!(TaxBreakdown::calculate(500_000.0, false).claim_rate, 0.0);
        assert_eq!(TaxBreakdown::calculate(50_000_000.0, false).listing_rate, 2.0);
        assert_eq!(TaxBreakdown::calculate(500_000_000.0, false).listing_rate, 2.5);
    }

    #[test]
    fn message_for_mid_bracket() {
        let tax = TaxBreakdown::calculate(50_000_000.0, false);
        assert_eq!(tax.total(), 1_500_000.0);
        assert_eq!(
            tax.message(),
            "Tax for 50.0M: Listing 1.0M (2%) | Claim 500.0K (1%) | Total 1.5M | You get 48.5M"
        );
    }

    #[test]
    fn derpy_quadruples() {
        let tax = TaxBreakdown::calculate(50_000_000.0, true);
        assert_eq!(tax.listing_rate, 8.0);
        assert_eq!(tax.claim_rate, 4.0);
        assert!(tax.message().contains("[Derpy]"));
    }
}
