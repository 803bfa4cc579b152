//! chatmux - message dispatch core for chat bots
//!
//! A [`Mux`] routes each inbound message to raw observers, a tree of
//! commands, and pattern-matching hears handlers, and serves web requests for
//! HTTP handlers. Adapters feed it messages through [`listen_and_serve`].

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;

pub use application::errors::{BotError, CommandError, ConfigError};
pub use application::messaging::{default_mux, CommandMux, MessageParser, Mux, ResponseWriter};
pub use application::services::listen_and_serve;
pub use domain::entities::{Message, User};
pub use domain::traits::{
    Adapter, BackgroundHandler, BotInfo, CommandHandler, Handler, HearsHandler, HttpHandler,
    RawHandler,
};
