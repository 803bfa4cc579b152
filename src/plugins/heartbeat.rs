use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::errors::BotError;
use crate::application::messaging::ResponseWriter;
use crate::domain::traits::{BackgroundHandler, Handler};

/// Posts a short message to the home channel at a fixed interval
pub struct Heartbeat {
    every: Duration,
}

impl Heartbeat {
    pub fn new(every: Duration) -> Self {
        Self { every }
    }
}

impl Handler for Heartbeat {
    fn describe(&self) -> (String, String) {
        ("heartbeat".to_string(), "Periodic liveness message".to_string())
    }

    fn as_background(self: Arc<Self>) -> Option<Arc<dyn BackgroundHandler>> {
        Some(self)
    }
}

#[async_trait]
impl BackgroundHandler for Heartbeat {
    async fn run(&self, ctx: CancellationToken, w: ResponseWriter) -> Result<(), BotError> {
        let mut ticker = tokio::time::interval(self.every);
        // The first tick completes immediately.
        ticker.tick().await;

        let mut beats: u64 = 0;
        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    debug!("Heartbeat stopping after {} beats", beats);
                    return Ok(());
                }
                _ = ticker.tick() => {
                    beats += 1;
                    w.send(format!("still here ({})", beats))?;
                }
            }
        }
    }
}
