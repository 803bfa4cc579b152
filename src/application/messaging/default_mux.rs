//! Process-wide default mux
//!
//! Built on first use and kept for the life of the process. The free
//! functions forward to it for callers that don't want to pass a `Mux`
//! around.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use once_cell::sync::Lazy;
use tokio_util::sync::CancellationToken;

use crate::application::errors::BotError;
use crate::domain::entities::Message;
use crate::domain::traits::{
    BackgroundHandler, CommandHandler, Handler, HearsHandler, HttpHandler, RawHandler,
};

use super::{CommandMux, Mux, ResponseWriter};

static DEFAULT_MUX: Lazy<Arc<Mux>> = Lazy::new(|| Arc::new(Mux::new("defaultMux", "")));

/// The shared default mux
pub fn default_mux() -> Arc<Mux> {
    DEFAULT_MUX.clone()
}

/// Add a handler to the default mux under every kind it supports
pub async fn add(h: Arc<dyn Handler>) -> Result<(), BotError> {
    DEFAULT_MUX.add(h).await
}

pub async fn add_raw(h: Arc<dyn RawHandler>) {
    DEFAULT_MUX.add_raw(h).await
}

pub async fn add_background(h: Arc<dyn BackgroundHandler>) {
    DEFAULT_MUX.add_background(h).await
}

pub async fn add_hears(h: Arc<dyn HearsHandler>) {
    DEFAULT_MUX.add_hears(h).await
}

pub async fn add_command(h: Arc<dyn CommandHandler>) -> Arc<CommandMux> {
    DEFAULT_MUX.add_command(h).await
}

pub async fn add_http(h: Arc<dyn HttpHandler>) -> String {
    DEFAULT_MUX.add_http(h).await
}

pub async fn start_background(ctx: &CancellationToken, w: &ResponseWriter) {
    DEFAULT_MUX.start_background(ctx, w).await
}

pub async fn handle(ctx: &CancellationToken, w: &ResponseWriter, m: &Message) {
    DEFAULT_MUX.handle(ctx, w, m).await
}

pub async fn serve_http(req: Request<Body>) -> Response<Body> {
    DEFAULT_MUX.serve_http(req).await
}
