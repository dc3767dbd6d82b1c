//! Quantity validation and price computation. Pure; no state, no I/O.

use thiserror::Error;

use crate::config::PricingConfig;
use crate::model::Stars;
use crate::money::Rub;

/// Why a requested quantity was rejected. All variants are recoverable; the
/// flow re-prompts with variant-specific guidance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("not a whole number")]
    NotANumber,

    #[error("below the minimum of {min} stars")]
    BelowMinimum { min: Stars },

    #[error("above the maximum of {max} stars")]
    AboveMaximum { max: Stars },
}

/// Parse and range-check a user-supplied quantity.
///
/// The input is the raw message text: it must parse as a whole number
/// (fractional input such as `12.5` is rejected, not truncated) and fall
/// within `[cfg.min_stars, MAX_STARS]`.
pub fn validate(text: &str, cfg: &PricingConfig) -> Result<Stars, ValidationError> {
    let stars: i64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber)?;
    if stars < i64::from(cfg.min_stars) {
        return Err(ValidationError::BelowMinimum {
            min: cfg.min_stars,
        });
    }
    if stars > i64::from(PricingConfig::MAX_STARS) {
        return Err(ValidationError::AboveMaximum {
            max: PricingConfig::MAX_STARS,
        });
    }
    Ok(stars as Stars)
}

/// Price for an already-validated quantity, rounded to whole kopeks
/// (ties to even).
pub fn price(stars: Stars, cfg: &PricingConfig) -> Rub {
    (cfg.star_price * stars).round_to_kopeks()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PricingConfig {
        PricingConfig {
            star_price: Rub::from_float(1.6),
            min_stars: 50,
        }
    }

    #[test]
    fn accepts_the_whole_valid_range() {
        assert_eq!(validate("50", &cfg()), Ok(50));
        assert_eq!(validate("100", &cfg()), Ok(100));
        assert_eq!(validate("5000", &cfg()), Ok(5000));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(validate("  250 ", &cfg()), Ok(250));
    }

    #[test]
    fn rejects_below_minimum() {
        assert_eq!(
            validate("49", &cfg()),
            Err(ValidationError::BelowMinimum { min: 50 })
        );
        assert_eq!(
            validate("10", &cfg()),
            Err(ValidationError::BelowMinimum { min: 50 })
        );
        // Negative numbers parse fine and fail the range check.
        assert_eq!(
            validate("-5", &cfg()),
            Err(ValidationError::BelowMinimum { min: 50 })
        );
    }

    #[test]
    fn rejects_above_maximum() {
        assert_eq!(
            validate("5001", &cfg()),
            Err(ValidationError::AboveMaximum { max: 5000 })
        );
    }

    #[test]
    fn rejects_non_numeric_input() {
        for input in ["abc", "12.5", "", "1e3", "100 stars"] {
            assert_eq!(validate(input, &cfg()), Err(ValidationError::NotANumber), "{input:?}");
        }
    }

    #[test]
    fn price_is_quantity_times_unit_price() {
        assert_eq!(price(100, &cfg()), Rub::from_float(160.0));
        assert_eq!(price(50, &cfg()), Rub::from_float(80.0));
        assert_eq!(price(5000, &cfg()), Rub::from_float(8000.0));
    }

    #[test]
    fn price_rounds_sub_kopek_products() {
        // 1.6005 * 3 = 4.8015, below the half-kopek mark -> 4.80.
        let cfg = PricingConfig {
            star_price: Rub::from_scaled(16_005),
            min_stars: 1,
        };
        assert_eq!(price(3, &cfg), Rub::from_float(4.80));
        assert_eq!(price(1, &cfg), Rub::from_float(1.60));
    }

    #[test]
    fn price_ties_go_to_the_even_kopek() {
        // 1.6050 sits exactly between 160 and 161 kopeks -> 1.60 (even).
        let even = PricingConfig {
            star_price: Rub::from_scaled(16_050),
            min_stars: 1,
        };
        assert_eq!(price(1, &even), Rub::from_float(1.60));
        // 1.6150 sits between 161 and 162 kopeks -> 1.62 (even).
        let odd = PricingConfig {
            star_price: Rub::from_scaled(16_150),
            min_stars: 1,
        };
        assert_eq!(price(1, &odd), Rub::from_float(1.62));
    }
}
