//! The order-intake state machine.
//!
//! Consumes transport events, tracks each user's conversation phase, prices
//! validated quantities, and emits display instructions for the transport to
//! render. Also supports an async stream of events.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::config::ShopConfig;
use crate::model::{ActionKind, Event, Order, OrderId, Phase, UserId};
use crate::pricing;

mod reply;
pub use reply::{Button, Outbound, Reply};

pub mod views;

/// The order flow controller.
///
/// Holds the immutable shop configuration and each user's conversation
/// phase. State is only touched from [`OrderFlow::apply`], so running it on
/// a single task serializes every transition.
pub struct OrderFlow {
    config: ShopConfig,
    phases: HashMap<UserId, Phase>,
}

/// Public API
impl OrderFlow {
    pub fn new(config: ShopConfig) -> Self {
        Self {
            config,
            phases: HashMap::new(),
        }
    }

    /// Run the flow over the given event stream, forwarding replies to
    /// `outbox`. Returns when the stream ends or every receiver is gone.
    pub async fn run(
        &mut self,
        mut events: impl Stream<Item = Event> + Unpin,
        outbox: mpsc::Sender<Outbound>,
    ) {
        while let Some(event) = events.next().await {
            if let Some(out) = self.apply(event, Local::now().naive_local()) {
                if outbox.send(out).await.is_err() {
                    break;
                }
            }
        }
    }

    /// Apply a single event on top of the current conversation state.
    ///
    /// `now` is the issuance time for any order minted by this event; it is
    /// injected so order ids are deterministic under test. Events with no
    /// defined transition produce `None` and are dropped.
    pub fn apply(&mut self, event: Event, now: NaiveDateTime) -> Option<Outbound> {
        match event {
            Event::Command { user, name } if name == "start" => {
                self.phases.insert(user, Phase::Menu);
                info!(user, "menu opened");
                Some(Outbound {
                    user,
                    reply: views::main_menu(&self.config.pricing),
                    edit: None,
                })
            }
            Event::Command { user, name } => {
                debug!(user, command = %name, "unrecognized command ignored");
                None
            }
            Event::Button {
                user,
                message,
                action,
            } => Some(self.apply_action(user, message, action)),
            Event::Text { user, text } => self.apply_text(user, &text, now),
        }
    }

    /// Current conversation phase for a user; `Menu` before first contact.
    pub fn phase(&self, user: UserId) -> Phase {
        self.phases.get(&user).copied().unwrap_or_default()
    }
}

/// Private API
impl OrderFlow {
    /// Handle a button press. Buttons are global: they act regardless of the
    /// user's phase, since a keyboard stays pressable in old messages.
    fn apply_action(&mut self, user: UserId, message: Option<i32>, action: ActionKind) -> Outbound {
        let reply = match action {
            ActionKind::Buy => {
                self.phases.insert(user, Phase::AwaitingQuantity);
                info!(user, "quantity prompt shown");
                views::buy_prompt(&self.config.pricing)
            }
            ActionKind::Calculator => views::calculator(&self.config.pricing),
            ActionKind::Details => views::payment_details(&self.config.payment),
            ActionKind::Support => views::support(),
            ActionKind::Back => {
                self.phases.insert(user, Phase::Menu);
                views::main_menu(&self.config.pricing)
            }
            ActionKind::MarkPaid(order_id) => {
                // Stateless: keyed entirely by the id carried in the event.
                info!(user, order = %order_id, "payment reported");
                views::payment_accepted(&order_id)
            }
        };
        Outbound {
            user,
            reply,
            edit: message,
        }
    }

    /// Handle a text message. Only meaningful while a quantity prompt is
    /// outstanding; anywhere else text is dropped.
    fn apply_text(&mut self, user: UserId, text: &str, now: NaiveDateTime) -> Option<Outbound> {
        match self.phase(user) {
            Phase::Menu => {
                debug!(user, "text outside a quantity prompt ignored");
                None
            }
            Phase::AwaitingQuantity => {
                let reply = match pricing::validate(text, &self.config.pricing) {
                    Ok(stars) => {
                        let order = Order::new(
                            OrderId::issue(user, now),
                            stars,
                            pricing::price(stars, &self.config.pricing),
                        );
                        self.phases.insert(user, Phase::Menu);
                        info!(user, order = %order.id, stars, price = %order.price, "order issued");
                        views::order_summary(&order, &self.config.payment)
                    }
                    Err(e) => {
                        info!(user, input = %text, reason = %e, "quantity rejected");
                        views::invalid_quantity(&e, &self.config.pricing)
                    }
                };
                Some(Outbound {
                    user,
                    reply,
                    edit: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::config::{PaymentDetails, PricingConfig, Secret};
    use crate::money::Rub;

    // test utils

    fn config() -> ShopConfig {
        ShopConfig {
            bot_token: Secret::new("test-token".to_string()),
            payment: PaymentDetails {
                bank_card: "2200 0000 0000 0000".to_string(),
                card_holder: "CARD HOLDER".to_string(),
            },
            pricing: PricingConfig {
                star_price: Rub::from_float(1.6),
                min_stars: 50,
            },
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn start(user: UserId) -> Event {
        Event::Command {
            user,
            name: "start".to_string(),
        }
    }

    fn press(user: UserId, action: ActionKind) -> Event {
        Event::Button {
            user,
            message: Some(99),
            action,
        }
    }

    fn text(user: UserId, text: &str) -> Event {
        Event::Text {
            user,
            text: text.to_string(),
        }
    }

    #[test]
    fn start_opens_the_menu() {
        let mut flow = OrderFlow::new(config());
        let out = flow.apply(start(1), noon()).unwrap();
        assert!(out.reply.text.contains("Stars Shop"));
        assert_eq!(out.edit, None);
        assert_eq!(flow.phase(1), Phase::Menu);
    }

    #[test]
    fn buy_enters_awaiting_quantity() {
        let mut flow = OrderFlow::new(config());
        let out = flow.apply(press(1, ActionKind::Buy), noon()).unwrap();
        assert_eq!(flow.phase(1), Phase::AwaitingQuantity);
        assert!(out.reply.text.contains("Enter the number of stars"));
        // Button replies edit the pressed message in place.
        assert_eq!(out.edit, Some(99));
    }

    #[test]
    fn valid_quantity_issues_an_order_and_returns_to_menu() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(7, ActionKind::Buy), noon());
        let out = flow.apply(text(7, "100"), noon()).unwrap();
        assert_eq!(flow.phase(7), Phase::Menu);
        assert!(out.reply.text.contains("Order #ST01011200007"));
        assert!(out.reply.text.contains("*160.00₽*"));
        assert_eq!(out.reply.keyboard[0][0].action, "paid_ST01011200007");
    }

    #[test]
    fn below_minimum_stays_in_awaiting_quantity() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(1, ActionKind::Buy), noon());
        let out = flow.apply(text(1, "10"), noon()).unwrap();
        assert_eq!(flow.phase(1), Phase::AwaitingQuantity);
        assert!(out.reply.text.contains("Minimum 50 stars"));
    }

    #[test]
    fn above_maximum_stays_in_awaiting_quantity() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(1, ActionKind::Buy), noon());
        let out = flow.apply(text(1, "9000"), noon()).unwrap();
        assert_eq!(flow.phase(1), Phase::AwaitingQuantity);
        assert!(out.reply.text.contains("Maximum 5000 stars"));
    }

    #[test]
    fn non_numeric_stays_in_awaiting_quantity() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(1, ActionKind::Buy), noon());
        let out = flow.apply(text(1, "abc"), noon()).unwrap();
        assert_eq!(flow.phase(1), Phase::AwaitingQuantity);
        assert!(out.reply.text.contains("Enter a NUMBER"));
        // No retry limit: still prompting after repeated failures.
        let out = flow.apply(text(1, "abc"), noon()).unwrap();
        assert_eq!(flow.phase(1), Phase::AwaitingQuantity);
        assert!(out.reply.text.contains("Enter a NUMBER"));
    }

    #[test]
    fn back_resets_to_menu() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(1, ActionKind::Buy), noon());
        let out = flow.apply(press(1, ActionKind::Back), noon()).unwrap();
        assert_eq!(flow.phase(1), Phase::Menu);
        assert!(out.reply.text.contains("Stars Shop"));
    }

    #[test]
    fn start_resets_an_outstanding_prompt() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(1, ActionKind::Buy), noon());
        flow.apply(start(1), noon());
        assert_eq!(flow.phase(1), Phase::Menu);
    }

    #[test]
    fn text_in_menu_is_dropped() {
        let mut flow = OrderFlow::new(config());
        flow.apply(start(1), noon());
        assert!(flow.apply(text(1, "100"), noon()).is_none());
    }

    #[test]
    fn unrecognized_command_is_dropped() {
        let mut flow = OrderFlow::new(config());
        assert!(
            flow.apply(
                Event::Command {
                    user: 1,
                    name: "help".to_string()
                },
                noon()
            )
            .is_none()
        );
    }

    #[test]
    fn mark_paid_echoes_the_id_from_any_phase() {
        let mut flow = OrderFlow::new(config());
        // From the menu.
        let out = flow
            .apply(press(1, ActionKind::MarkPaid("ST01011200007".to_string())), noon())
            .unwrap();
        assert!(out.reply.text.contains("Order #ST01011200007 received!"));
        // From an outstanding quantity prompt, without disturbing it.
        flow.apply(press(2, ActionKind::Buy), noon());
        let out = flow
            .apply(press(2, ActionKind::MarkPaid("ST01011200007".to_string())), noon())
            .unwrap();
        assert!(out.reply.text.contains("Order #ST01011200007 received!"));
        assert_eq!(flow.phase(2), Phase::AwaitingQuantity);
    }

    #[test]
    fn informational_views_do_not_change_the_phase() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(1, ActionKind::Buy), noon());
        for action in [ActionKind::Calculator, ActionKind::Details, ActionKind::Support] {
            let out = flow.apply(press(1, action), noon()).unwrap();
            assert!(!out.reply.text.is_empty());
            assert_eq!(flow.phase(1), Phase::AwaitingQuantity);
        }
    }

    #[test]
    fn phases_are_independent_across_users() {
        let mut flow = OrderFlow::new(config());
        flow.apply(press(1, ActionKind::Buy), noon());
        assert_eq!(flow.phase(1), Phase::AwaitingQuantity);
        assert_eq!(flow.phase(2), Phase::Menu);
        flow.apply(text(1, "100"), noon());
        assert_eq!(flow.phase(1), Phase::Menu);
    }

    #[tokio::test]
    async fn run_drains_a_stream_and_forwards_replies() {
        let mut flow = OrderFlow::new(config());
        let (event_tx, event_rx) = mpsc::channel(16);
        let (reply_tx, mut reply_rx) = mpsc::channel(16);

        event_tx.send(press(1, ActionKind::Buy)).await.unwrap();
        event_tx.send(text(1, "100")).await.unwrap();
        drop(event_tx);

        flow.run(
            tokio_stream::wrappers::ReceiverStream::new(event_rx),
            reply_tx,
        )
        .await;

        let prompt = reply_rx.recv().await.unwrap();
        assert!(prompt.reply.text.contains("Enter the number of stars"));
        let summary = reply_rx.recv().await.unwrap();
        assert!(summary.reply.text.contains("Order #ST"));
        assert!(reply_rx.recv().await.is_none());
    }
}
