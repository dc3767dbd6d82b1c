//! Transport-agnostic outbound payloads.

use crate::model::{ActionKind, UserId};

/// One inline-keyboard button: a label plus the action id it round-trips
/// through the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: &ActionKind) -> Self {
        Self {
            label: label.into(),
            action: action.as_data(),
        }
    }
}

/// A rendered screen: message text plus keyboard rows (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
    pub fn new(text: impl Into<String>, keyboard: Vec<Vec<Button>>) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }

    /// A screen with no keyboard attached.
    pub fn bare(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

/// A reply addressed to a user. `edit` carries the message to update in
/// place when the reply answers a button press; `None` sends a new message.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub user: UserId,
    pub reply: Reply,
    pub edit: Option<i32>,
}
