//! Telegram transport binding.
//!
//! Decodes teloxide updates into flow events exactly once at the boundary
//! and renders the flow's outbound replies. All conversation state lives in
//! the flow task; the handlers here only translate and forward.

use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::config::ShopConfig;
use crate::flow::{OrderFlow, Outbound};
use crate::model::{ActionKind, Event};

const CHANNEL_CAPACITY: usize = 16;

/// Run the bot until the process is interrupted.
pub async fn run(config: ShopConfig) {
    let bot = Bot::new(config.bot_token.reveal().clone());

    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (reply_tx, mut reply_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let mut flow = OrderFlow::new(config);
    tokio::spawn(async move {
        flow.run(ReceiverStream::new(event_rx), reply_tx).await;
    });

    let sender = bot.clone();
    tokio::spawn(async move {
        while let Some(out) = reply_rx.recv().await {
            deliver(&sender, out).await;
        }
    });

    info!("starting long polling");
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![event_tx])
        .default_handler(|update: std::sync::Arc<Update>| async move {
            debug!(?update, "unhandled update");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn on_message(
    msg: Message,
    events: mpsc::Sender<Event>,
) -> Result<(), teloxide::RequestError> {
    let user = msg.chat.id.0;
    if let Some(text) = msg.text() {
        let event = match text.strip_prefix('/') {
            Some(rest) => Event::Command {
                user,
                name: rest.split_whitespace().next().unwrap_or_default().to_string(),
            },
            None => Event::Text {
                user,
                text: text.to_string(),
            },
        };
        forward(&events, event).await;
    }
    Ok(())
}

async fn on_callback(
    bot: Bot,
    q: CallbackQuery,
    events: mpsc::Sender<Event>,
) -> Result<(), teloxide::RequestError> {
    bot.answer_callback_query(q.id.clone()).await?;
    let user = q.from.id.0 as i64;
    let message = q.message.as_ref().map(|m| m.id().0);
    if let Some(data) = q.data {
        match ActionKind::parse(&data) {
            Some(action) => {
                forward(
                    &events,
                    Event::Button {
                        user,
                        message,
                        action,
                    },
                )
                .await;
            }
            None => debug!(user, data = %data, "unrecognized callback data ignored"),
        }
    }
    Ok(())
}

async fn forward(events: &mpsc::Sender<Event>, event: Event) {
    if events.send(event).await.is_err() {
        warn!("flow task is gone; dropping event");
    }
}

/// Render one outbound reply, editing in place when it answers a button.
/// Delivery failures are logged and dropped; they never stop the bot.
async fn deliver(bot: &Bot, out: Outbound) {
    let chat = ChatId(out.user);
    let markup = keyboard(&out);
    let result = match out.edit {
        Some(message_id) => {
            let mut request = bot
                .edit_message_text(chat, MessageId(message_id), out.reply.text.clone())
                .parse_mode(ParseMode::Markdown);
            if let Some(markup) = markup {
                request = request.reply_markup(markup);
            }
            request.await.map(drop)
        }
        None => {
            let mut request = bot
                .send_message(chat, out.reply.text.clone())
                .parse_mode(ParseMode::Markdown);
            if let Some(markup) = markup {
                request = request.reply_markup(markup);
            }
            request.await.map(drop)
        }
    };
    if let Err(e) = result {
        warn!(user = out.user, error = %e, "failed to deliver reply");
    }
}

fn keyboard(out: &Outbound) -> Option<InlineKeyboardMarkup> {
    if out.reply.keyboard.is_empty() {
        return None;
    }
    let rows = out.reply.keyboard.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.clone()))
            .collect::<Vec<_>>()
    });
    Some(InlineKeyboardMarkup::new(rows))
}
