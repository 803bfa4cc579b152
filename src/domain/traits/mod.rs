//! Domain traits - Abstractions for adapters and handlers

pub mod adapter;
pub mod handler;

pub use adapter::{Adapter, BotInfo};
pub use handler::{
    BackgroundHandler, CommandHandler, Handler, HearsHandler, HttpHandler, RawHandler,
};
