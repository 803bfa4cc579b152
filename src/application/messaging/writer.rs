//! Response writer - output sink bound to one conversation

use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{Message, User};

/// Sends replies into the conversation a message came from.
///
/// Cloning is cheap; every clone feeds the same outbound queue, which the
/// serve loop drains into `Adapter::send`.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    tx: mpsc::UnboundedSender<Message>,
    chat_id: String,
    recipient: Option<User>,
    platform: String,
}

impl ResponseWriter {
    pub fn new(tx: mpsc::UnboundedSender<Message>, chat_id: impl Into<String>) -> Self {
        Self {
            tx,
            chat_id: chat_id.into(),
            recipient: None,
            platform: "unknown".to_string(),
        }
    }

    /// A writer plus the receiving end of its queue, handy for tests and
    /// for adapters that poll replies themselves
    pub fn channel(chat_id: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx, chat_id), rx)
    }

    /// Rebind to the conversation `m` belongs to
    pub fn for_message(&self, m: &Message) -> Self {
        Self {
            tx: self.tx.clone(),
            chat_id: m.chat_id.clone(),
            recipient: m.sender.clone(),
            platform: m.platform.clone(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Queue one line of output
    pub fn send(&self, text: impl Into<String>) -> Result<(), BotError> {
        let mut msg = Message::new(self.chat_id.clone(), text).with_platform(self.platform.clone());
        msg.sender = self.recipient.clone();
        self.tx
            .send(msg)
            .map_err(|_| BotError::Adapter(format!("response channel for {} closed", self.chat_id)))
    }
}
