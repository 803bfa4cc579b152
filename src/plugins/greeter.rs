use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use tokio_util::sync::CancellationToken;

use crate::application::messaging::ResponseWriter;
use crate::domain::entities::Message;
use crate::domain::traits::{Handler, HearsHandler};

static GREETING_RE: Lazy<Arc<Regex>> = Lazy::new(|| {
    Arc::new(Regex::new(r"(?i)^\s*(hello|hi|hey)\b").unwrap())
});

/// Says hello back to anyone who greets the room
pub struct Greeter;

impl Handler for Greeter {
    fn describe(&self) -> (String, String) {
        ("greeter".to_string(), "Greets people who say hello".to_string())
    }

    fn as_hears(self: Arc<Self>) -> Option<Arc<dyn HearsHandler>> {
        Some(self)
    }
}

#[async_trait]
impl HearsHandler for Greeter {
    fn hears(&self) -> Arc<Regex> {
        GREETING_RE.clone()
    }

    async fn hear(&self, _ctx: &CancellationToken, w: &ResponseWriter, m: Message) -> bool {
        let who = m
            .sender
            .as_ref()
            .map(|u| u.display_name().to_string())
            .unwrap_or_else(|| "there".to_string());
        let greeting = m.matches.get(1).map(String::as_str).unwrap_or("Hello");

        match w.send(format!("{}, {}!", capitalize(greeting), who)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Greeter could not reply: {}", e);
                false
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
