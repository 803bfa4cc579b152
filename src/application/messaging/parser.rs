//! Message parser - Turns raw chat text into dispatchable messages

use crate::domain::entities::{Message, User};

/// Decides whether text is addressed to the bot and splits command tokens
pub struct MessageParser {
    command_prefix: String,
    alias: Option<String>,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
            alias: None,
        }
    }

    /// Also treat `<alias>: ...` and `@<alias> ...` as addressed to the bot
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Parse a line of chat text.
    ///
    /// `direct` marks one-to-one conversations, where everything is for the
    /// bot. Otherwise the text must carry the command prefix or mention the
    /// alias. Only messages for the bot get `args`.
    pub fn parse(
        &self,
        chat_id: impl Into<String>,
        text: impl Into<String>,
        sender: Option<User>,
        direct: bool,
    ) -> Message {
        let text = text.into();
        let mut msg = Message::new(chat_id, text.clone());
        msg.sender = sender;

        let cmd_text = match self.strip_address(text.trim()) {
            Some(rest) => Some(rest),
            None if direct => Some(text.trim()),
            None => None,
        };

        if let Some(cmd_text) = cmd_text {
            msg.to_bot = true;
            msg.args = cmd_text.split_whitespace().map(str::to_string).collect();
        }
        msg
    }

    fn strip_address<'a>(&self, text: &'a str) -> Option<&'a str> {
        if !self.command_prefix.is_empty() {
            if let Some(rest) = text.strip_prefix(self.command_prefix.as_str()) {
                return Some(rest);
            }
        }

        let alias = self.alias.as_deref()?;
        text.strip_prefix('@')
            .unwrap_or(text)
            .strip_prefix(alias)
            .and_then(|rest| rest.strip_prefix(':').or_else(|| rest.strip_prefix(' ')))
            .map(str::trim_start)
    }
}
