//! Screen texts and keyboards, one function per screen.
//!
//! Texts use Telegram's legacy Markdown; button rows round-trip the action
//! ids from [`ActionKind`].

use super::reply::{Button, Reply};
use crate::config::{PaymentDetails, PricingConfig};
use crate::model::{ActionKind, Order, Stars};
use crate::pricing::{self, ValidationError};

/// Quantities shown in the calculator, filtered to the configured range.
const SAMPLE_QUANTITIES: [Stars; 7] = [50, 100, 250, 500, 1000, 2000, 5000];

/// Quantity used for the worked example in the buy prompt.
const EXAMPLE_STARS: Stars = 100;

/// Support contact shown to the user.
const SUPPORT_CONTACT: &str = "@stars_shop_support";

fn menu_keyboard() -> Vec<Vec<Button>> {
    vec![
        vec![Button::new("⭐ Buy stars", &ActionKind::Buy)],
        vec![Button::new("💰 Calculator", &ActionKind::Calculator)],
        vec![Button::new("💳 Payment details", &ActionKind::Details)],
        vec![Button::new("📞 Support", &ActionKind::Support)],
    ]
}

pub fn main_menu(cfg: &PricingConfig) -> Reply {
    let text = format!(
        "🚀 *Stars Shop*\n\n\
         💎 *Price:* {price}₽ per star\n\
         📦 *Range:* {min} to {max} stars\n\n\
         💳 *Payment by bank card*\n\
         ⚡ *Delivery:* instant\n\n\
         Press *'Buy stars'* to order",
        price = cfg.star_price,
        min = cfg.min_stars,
        max = PricingConfig::MAX_STARS,
    );
    Reply::new(text, menu_keyboard())
}

pub fn buy_prompt(cfg: &PricingConfig) -> Reply {
    let text = format!(
        "🎛 *Enter the number of stars*\n\n\
         💎 Price: *{price}₽* per star\n\
         📦 From *{min}* to *{max}* stars\n\n\
         *Example:* {example} stars = *{example_price}₽*\n\n\
         Enter any number:",
        price = cfg.star_price,
        min = cfg.min_stars,
        max = PricingConfig::MAX_STARS,
        example = EXAMPLE_STARS,
        example_price = pricing::price(EXAMPLE_STARS, cfg),
    );
    Reply::bare(text)
}

pub fn invalid_quantity(err: &ValidationError, cfg: &PricingConfig) -> Reply {
    let text = match err {
        ValidationError::NotANumber => format!(
            "❌ *Enter a NUMBER!*\n\n\
             For example: 100, 250, 500\n\
             Range: {min} to {max}",
            min = cfg.min_stars,
            max = PricingConfig::MAX_STARS,
        ),
        ValidationError::BelowMinimum { min } => format!(
            "❌ *Minimum {min} stars*\n\nEnter a number from {min}:"
        ),
        ValidationError::AboveMaximum { max } => format!(
            "❌ *Maximum {max} stars*\n\nEnter a number up to {max}:"
        ),
    };
    Reply::bare(text)
}

pub fn order_summary(order: &Order, payment: &PaymentDetails) -> Reply {
    let text = format!(
        "✅ *Order #{id}*\n\n\
         ⭐ Stars: *{stars}*\n\
         💰 Total: *{price}₽*\n\n\
         💳 *Transfer to card:*\n\
         `{card}`\n\
         👤 *Recipient:* {holder}\n\n\
         📝 *INSTRUCTIONS:*\n\
         1. Transfer *{price}₽*\n\
         2. Put *{id}* in the transfer comment\n\
         3. Keep a screenshot\n\
         4. Press *'I have paid'* below\n\n\
         ⚠️ *Without the comment the payment is not credited!*",
        id = order.id,
        stars = order.stars,
        price = order.price,
        card = payment.bank_card,
        holder = payment.card_holder,
    );
    let keyboard = vec![
        vec![Button::new(
            "✅ I have paid",
            &ActionKind::MarkPaid(order.id.as_str().to_string()),
        )],
        vec![Button::new("📞 Support", &ActionKind::Support)],
        vec![Button::new("🔄 New order", &ActionKind::Buy)],
    ];
    Reply::new(text, keyboard)
}

pub fn payment_accepted(order_id: &str) -> Reply {
    let text = format!(
        "✅ *Order #{order_id} received!*\n\n\
         ⏱ *Status:* awaiting review\n\
         🕐 *Time:* 1-10 minutes\n\n\
         📞 *Support:* {SUPPORT_CONTACT}\n\
         🔄 *New order:* /start"
    );
    Reply::bare(text)
}

pub fn calculator(cfg: &PricingConfig) -> Reply {
    let mut examples = String::new();
    for stars in SAMPLE_QUANTITIES {
        if stars >= cfg.min_stars && stars <= PricingConfig::MAX_STARS {
            let price = pricing::price(stars, cfg);
            examples.push_str(&format!("• *{stars}* stars = *{price}₽*\n"));
        }
    }
    let text = format!(
        "🧮 *Price calculator*\n\n\
         💎 Price per star: *{price}₽*\n\
         📦 Range: *{min}* to *{max}*\n\n\
         *Examples:*\n{examples}\n\
         📝 *Formula:* stars × {price} = total",
        price = cfg.star_price,
        min = cfg.min_stars,
        max = PricingConfig::MAX_STARS,
    );
    let keyboard = vec![
        vec![Button::new("🛒 Buy now", &ActionKind::Buy)],
        vec![Button::new("🔙 Back", &ActionKind::Back)],
    ];
    Reply::new(text, keyboard)
}

pub fn payment_details(payment: &PaymentDetails) -> Reply {
    let text = format!(
        "💳 *Payment details*\n\n\
         🏦 *Card:*\n\
         `{card}`\n\
         👤 *Recipient:* {holder}\n\n\
         📝 *How to pay:*\n\
         1. Place an order through the bot\n\
         2. Get the order code\n\
         3. Transfer the total to the card\n\
         4. Put the code in the transfer comment\n\
         5. Press 'I have paid'\n\n\
         ⚠️ *Payments without the code are not credited!*",
        card = payment.bank_card,
        holder = payment.card_holder,
    );
    let keyboard = vec![
        vec![Button::new("🛒 Place an order", &ActionKind::Buy)],
        vec![Button::new("🔙 Back", &ActionKind::Back)],
    ];
    Reply::new(text, keyboard)
}

pub fn support() -> Reply {
    let text = format!(
        "📞 *Support*\n\n\
         👤 *Manager:* {SUPPORT_CONTACT}\n\
         ⏱ *Response time:* 5-15 minutes\n\n\
         *When writing include:*\n\
         1. Order code\n\
         2. Transfer amount\n\
         3. Date and time\n\
         4. Transfer screenshot\n\n\
         *Available 24/7*"
    );
    let keyboard = vec![vec![Button::new("🔙 Back", &ActionKind::Back)]];
    Reply::new(text, keyboard)
}
