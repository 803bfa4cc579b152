use super::User;
use chrono::{DateTime, Utc};

/// Represents an incoming or outgoing message
///
/// Handlers each receive their own clone, so mutating `args` or `matches`
/// in one handler is never visible to another.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender: Option<User>,
    pub text: String,
    /// Whether the message was addressed directly to the bot
    pub to_bot: bool,
    /// Command tokens, set by the parser when the message is a command invocation
    pub args: Vec<String>,
    /// Capture groups from the most recent hears match
    pub matches: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub platform: String,
    pub raw: Option<serde_json::Value>,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            sender: None,
            text: text.into(),
            to_bot: false,
            args: Vec::new(),
            matches: Vec::new(),
            timestamp: Utc::now(),
            platform: "unknown".to_string(),
            raw: None,
        }
    }

    /// A message addressed to the bot, with its command tokens already split
    pub fn command(chat_id: impl Into<String>, args: Vec<String>) -> Self {
        let mut msg = Self::new(chat_id, args.join(" "));
        msg.to_bot = true;
        msg.args = args;
        msg
    }

    /// Build a reply bound to the same conversation as this message
    pub fn reply(&self, text: impl Into<String>) -> Self {
        let mut msg = Self::new(self.chat_id.clone(), text);
        msg.sender = self.sender.clone();
        msg.platform = self.platform.clone();
        msg
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn to_bot(mut self, to_bot: bool) -> Self {
        self.to_bot = to_bot;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Drop the leading token and return it. Command handlers call this to
    /// consume their own name before deferring to subcommands.
    pub fn shift_args(&mut self) -> Option<String> {
        if self.args.is_empty() {
            None
        } else {
            Some(self.args.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_args() {
        let mut msg = Message::command("c1", vec!["deploy".into(), "prod".into()]);
        assert!(msg.to_bot);
        assert_eq!(msg.text, "deploy prod");
        assert_eq!(msg.shift_args().as_deref(), Some("deploy"));
        assert_eq!(msg.args(), ["prod".to_string()]);
        msg.shift_args();
        assert_eq!(msg.shift_args(), None);
    }

    #[test]
    fn test_reply_keeps_conversation() {
        let msg = Message::new("room", "hi")
            .with_sender(User::new("u1"))
            .with_platform("console");
        let reply = msg.reply("hello");
        assert_eq!(reply.chat_id, "room");
        assert_eq!(reply.platform, "console");
        assert_eq!(reply.text, "hello");
        assert!(!reply.to_bot);
        assert_ne!(reply.id, msg.id);
    }
}
