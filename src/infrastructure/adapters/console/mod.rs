//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::{Message, User};
use crate::domain::traits::{Adapter, BotInfo};
use crate::infrastructure::config::Config;

const CHANNEL: &str = "console";

/// Console adapter: each stdin line is a direct message to the bot
pub struct ConsoleAdapter {
    info: BotInfo,
    user: User,
    parser: MessageParser,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(config: &Config) -> Self {
        let username = config
            .adapters
            .console
            .as_ref()
            .and_then(|c| c.username.clone())
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "user".to_string());

        let mut parser = MessageParser::new(config.bot.prefix.clone());
        if let Some(alias) = &config.bot.alias {
            parser = parser.with_alias(alias.clone());
        }

        Self {
            info: BotInfo {
                id: CHANNEL.to_string(),
                name: config.bot.name.clone(),
                home_channel: CHANNEL.to_string(),
            },
            user: User::new(username.clone()).with_username(username),
            parser,
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl Adapter for ConsoleAdapter {
    async fn send(&self, _ctx: &CancellationToken, m: Message) -> Result<(), BotError> {
        println!("{}: {}", self.info.name, m.text);
        Ok(())
    }

    async fn receive(&self) -> Option<Message> {
        let mut lines = self.lines.lock().await;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    return Some(
                        self.parser
                            .parse(CHANNEL, line, Some(self.user.clone()), true)
                            .with_platform(CHANNEL),
                    );
                }
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!("Failed to read from console: {}", e);
                    return None;
                }
            }
        }
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
