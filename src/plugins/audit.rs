use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::errors::BotError;
use crate::application::messaging::ResponseWriter;
use crate::domain::entities::Message;
use crate::domain::traits::{Handler, RawHandler};

/// Logs every message the bot sees
pub struct Audit;

impl Handler for Audit {
    fn describe(&self) -> (String, String) {
        ("audit".to_string(), "Log all traffic".to_string())
    }

    fn as_raw(self: Arc<Self>) -> Option<Arc<dyn RawHandler>> {
        Some(self)
    }
}

#[async_trait]
impl RawHandler for Audit {
    async fn handle(&self, _ctx: CancellationToken, _w: ResponseWriter, m: Message) -> Result<(), BotError> {
        let from = m
            .sender
            .as_ref()
            .map(|u| u.display_name().to_string())
            .unwrap_or_else(|| "-".to_string());
        let preview: String = m.text.chars().take(80).collect();

        info!(
            target: "audit",
            "[{}/{}] {} (to_bot={}): {}",
            m.platform, m.chat_id, from, m.to_bot, preview
        );
        Ok(())
    }
}
