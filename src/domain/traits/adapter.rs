use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::errors::BotError;
use crate::domain::entities::Message;

/// Adapter trait - abstraction for messaging platform backends
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Deliver a message produced by a handler
    async fn send(&self, ctx: &CancellationToken, m: Message) -> Result<(), BotError>;

    /// Next inbound message, or `None` once the backend is closed.
    ///
    /// Must be cancel safe: the serve loop drops a pending `receive` whenever
    /// another event wins the race, and no message may be lost when it does.
    async fn receive(&self) -> Option<Message>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    /// Conversation background handlers write to
    pub home_channel: String,
}
