//! Handler capability traits
//!
//! A handler is any `Handler` that also implements one or more of the kind
//! traits below. `Mux::add` discovers which kinds an object supports through
//! the `as_*` probes, so an implementation overrides the probe for each kind it
//! provides:
//!
//! ```rust,ignore
//! impl Handler for Ping {
//!     fn describe(&self) -> (String, String) {
//!         ("ping".into(), "Reply with PONG".into())
//!     }
//!
//!     fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandHandler>> {
//!         Some(self)
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use regex_lite::Regex;
use tokio_util::sync::CancellationToken;

use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::{CommandMux, ResponseWriter};
use crate::domain::entities::Message;

/// Base trait for everything that can be registered with a `Mux`
pub trait Handler: Send + Sync + 'static {
    /// Name and short description. The name keys the command tree and
    /// forms the last segment of HTTP paths.
    fn describe(&self) -> (String, String);

    fn as_raw(self: Arc<Self>) -> Option<Arc<dyn RawHandler>> {
        None
    }

    fn as_background(self: Arc<Self>) -> Option<Arc<dyn BackgroundHandler>> {
        None
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandHandler>> {
        None
    }

    fn as_hears(self: Arc<Self>) -> Option<Arc<dyn HearsHandler>> {
        None
    }

    fn as_http(self: Arc<Self>) -> Option<Arc<dyn HttpHandler>> {
        None
    }

    /// Only `CommandMux` answers this; it lets a pre-built sub-tree be
    /// installed as-is instead of being wrapped in a new node.
    fn as_command_mux(self: Arc<Self>) -> Option<Arc<CommandMux>> {
        None
    }
}

/// Receives every message, fire-and-forget
#[async_trait]
pub trait RawHandler: Handler {
    async fn handle(
        &self,
        ctx: CancellationToken,
        w: ResponseWriter,
        m: Message,
    ) -> Result<(), BotError>;
}

/// Long running task, started once and stopped by cancelling `ctx`
#[async_trait]
pub trait BackgroundHandler: Handler {
    async fn run(&self, ctx: CancellationToken, w: ResponseWriter) -> Result<(), BotError>;
}

/// Handles messages addressed to the bot and routed by the command tree.
///
/// Return `CommandError::NextCommand` to defer to subcommands, or
/// `CommandError::SkipHears` to suppress hears processing for this message.
#[async_trait]
pub trait CommandHandler: Handler {
    async fn command(
        &self,
        ctx: &CancellationToken,
        w: &ResponseWriter,
        m: &mut Message,
    ) -> Result<(), CommandError>;
}

/// Reacts to messages whose text matches a pattern
#[async_trait]
pub trait HearsHandler: Handler {
    /// The pattern this handler listens for. Handlers sharing one `Arc`
    /// are grouped together; equal patterns in different `Arc`s are not.
    fn hears(&self) -> Arc<Regex>;

    /// Returns true when the handler considers the message handled
    async fn hear(&self, ctx: &CancellationToken, w: &ResponseWriter, m: Message) -> bool;
}

/// Serves inbound web requests under `/<mux-name>/<handler-name>`
#[async_trait]
pub trait HttpHandler: Handler {
    async fn serve_http(&self, req: Request<Body>) -> Response<Body>;
}
