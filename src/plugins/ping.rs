use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::errors::CommandError;
use crate::application::messaging::ResponseWriter;
use crate::domain::entities::Message;
use crate::domain::traits::{CommandHandler, Handler};

/// `ping` - answers PONG, or echoes any extra words back
pub struct Ping;

impl Handler for Ping {
    fn describe(&self) -> (String, String) {
        ("ping".to_string(), "Check the bot is alive".to_string())
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandHandler>> {
        Some(self)
    }
}

#[async_trait]
impl CommandHandler for Ping {
    async fn command(
        &self,
        _ctx: &CancellationToken,
        w: &ResponseWriter,
        m: &mut Message,
    ) -> Result<(), CommandError> {
        m.shift_args();
        let reply = if m.args().is_empty() {
            "PONG".to_string()
        } else {
            format!("PONG {}", m.args().join(" "))
        };
        w.send(reply).map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}
