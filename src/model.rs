//! Core domain types for the order flow.

use std::fmt;

use chrono::NaiveDateTime;

use crate::money::Rub;

/// Telegram user identifier.
pub type UserId = i64;

/// A quantity of stars.
pub type Stars = u32;

/// An inbound event delivered by the transport.
#[derive(Debug, Clone)]
pub enum Event {
    /// Free-form text message.
    Text { user: UserId, text: String },
    /// Inline-keyboard button press. `message` identifies the message the
    /// keyboard was attached to, so the reply can edit it in place.
    Button {
        user: UserId,
        message: Option<i32>,
        action: ActionKind,
    },
    /// Slash command, name without the leading `/`.
    Command { user: UserId, name: String },
}

/// A button action, decoded exactly once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Start an order; prompts for a quantity.
    Buy,
    /// Show the example price table.
    Calculator,
    /// Show the bank-transfer details.
    Details,
    /// Show the support contact.
    Support,
    /// Return to the main menu.
    Back,
    /// Self-reported payment for the embedded order id.
    MarkPaid(String),
}

impl ActionKind {
    /// Decode a callback-data string. Unknown data yields `None`.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "buy" => Some(Self::Buy),
            "calculator" => Some(Self::Calculator),
            "details" => Some(Self::Details),
            "support" => Some(Self::Support),
            "back" => Some(Self::Back),
            _ => data
                .strip_prefix("paid_")
                .map(|id| Self::MarkPaid(id.to_string())),
        }
    }

    /// The callback-data string round-tripped through the transport.
    pub fn as_data(&self) -> String {
        match self {
            Self::Buy => "buy".to_string(),
            Self::Calculator => "calculator".to_string(),
            Self::Details => "details".to_string(),
            Self::Support => "support".to_string(),
            Self::Back => "back".to_string(),
            Self::MarkPaid(id) => format!("paid_{id}"),
        }
    }
}

/// Per-user position within the order-intake conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Resting state; menu navigation only.
    #[default]
    Menu,
    /// A quantity prompt is outstanding.
    AwaitingQuantity,
}

/// Human-readable order identifier: `ST`, the issue time as `MMDDHHmm`, and
/// the user id modulo 1000 zero-padded to three digits.
///
/// Not globally unique: users whose ids collide modulo 1000 ordering within
/// the same minute mint identical ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderId(String);

impl OrderId {
    /// Mint the id for an order issued by `user` at `now`. Deterministic.
    pub fn issue(user: UserId, now: NaiveDateTime) -> Self {
        OrderId(format!(
            "ST{}{:03}",
            now.format("%m%d%H%M"),
            user.rem_euclid(1000)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A priced order as presented to the user. Only the flow controller builds
/// these, from quantities that already passed validation.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub stars: Stars,
    pub price: Rub,
}

impl Order {
    pub fn new(id: OrderId, stars: Stars, price: Rub) -> Self {
        Self { id, stars, price }
    }
}
