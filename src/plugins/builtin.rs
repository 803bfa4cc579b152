//! Registration of the bundled handlers

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::errors::BotError;
use crate::application::messaging::Mux;
use crate::infrastructure::config::Config;

use super::{Audit, Greeter, Heartbeat, Ping, Status};

/// Register the bundled handlers on `mux`
pub async fn register_builtin(mux: &Mux, config: &Config) -> Result<(), BotError> {
    mux.add(Arc::new(Audit)).await?;
    mux.add(Arc::new(Ping)).await?;
    mux.add(Arc::new(Greeter)).await?;
    mux.add(Arc::new(Status::new())).await?;

    if let Some(secs) = config.bot.heartbeat_secs.filter(|s| *s > 0) {
        mux.add(Arc::new(Heartbeat::new(Duration::from_secs(secs)))).await?;
    }

    info!("Registered {} bundled handlers", mux.handlers().await.len());
    Ok(())
}
