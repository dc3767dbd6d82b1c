//! Process configuration, read once at startup and immutable afterwards.

use std::{env, fmt};

use thiserror::Error;

use crate::model::Stars;
use crate::money::Rub;

const DEFAULT_STAR_PRICE: f64 = 1.6;
const DEFAULT_MIN_STARS: Stars = 50;
const DEFAULT_BANK_CARD: &str = "2200 0000 0000 0000";
const DEFAULT_CARD_HOLDER: &str = "CARD HOLDER";

/// Fatal configuration problems. The process refuses to start on any of
/// these; there is no degraded mode.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set; set it to the bot's API token")]
    MissingToken,

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// A value that must never leak through `Debug` or `Display` output.
#[derive(Clone, Default)]
pub struct Secret<T: Clone + Default> {
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Unit price and purchase bounds.
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    pub star_price: Rub,
    pub min_stars: Stars,
}

impl PricingConfig {
    /// Upper purchase bound. Fixed, not configurable.
    pub const MAX_STARS: Stars = 5000;
}

/// Manual-transfer payment details shown verbatim to the user.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub bank_card: String,
    pub card_holder: String,
}

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    pub bot_token: Secret<String>,
    pub payment: PaymentDetails,
    pub pricing: PricingConfig,
}

impl ShopConfig {
    /// Load the configuration from the environment.
    ///
    /// Only the token is required; everything else falls back to a default.
    /// A value that is present but malformed is an error, not a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        let bank_card = env::var("BANK_CARD").unwrap_or_else(|_| DEFAULT_BANK_CARD.to_string());
        let card_holder =
            env::var("BANK_CARD_HOLDER").unwrap_or_else(|_| DEFAULT_CARD_HOLDER.to_string());

        let star_price = match env::var("STAR_PRICE") {
            Ok(s) => {
                let value: f64 = s.parse().map_err(|e| ConfigError::Invalid {
                    var: "STAR_PRICE",
                    reason: format!("{e}"),
                })?;
                let price = Rub::from_float(value);
                if !price.is_positive() {
                    return Err(ConfigError::Invalid {
                        var: "STAR_PRICE",
                        reason: format!("{s} is not a positive price"),
                    });
                }
                price
            }
            Err(_) => Rub::from_float(DEFAULT_STAR_PRICE),
        };

        let min_stars = match env::var("MIN_STARS") {
            Ok(s) => {
                let value: Stars = s.parse().map_err(|e| ConfigError::Invalid {
                    var: "MIN_STARS",
                    reason: format!("{e}"),
                })?;
                if value < 1 || value > PricingConfig::MAX_STARS {
                    return Err(ConfigError::Invalid {
                        var: "MIN_STARS",
                        reason: format!("{value} is outside 1..={}", PricingConfig::MAX_STARS),
                    });
                }
                value
            }
            Err(_) => DEFAULT_MIN_STARS,
        };

        Ok(Self {
            bot_token: Secret::new(bot_token),
            payment: PaymentDetails {
                bank_card,
                card_holder,
            },
            pricing: PricingConfig {
                star_price,
                min_stars,
            },
        })
    }
}
