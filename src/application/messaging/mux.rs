//! Message dispatcher - Routes messages to raw, command and hears handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use async_trait::async_trait;
use regex_lite::Regex;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::errors::{BotError, CommandError};
use crate::application::services::HelpCommand;
use crate::domain::entities::Message;
use crate::domain::traits::{
    BackgroundHandler, CommandHandler, Handler, HearsHandler, HttpHandler, RawHandler,
};

use super::invoke::{run_background, run_command, run_hears, run_http, run_raw};
use super::{CommandMux, ResponseWriter};

/// Everything guarded by the mux lock
struct Registry {
    handlers: Vec<Arc<dyn Handler>>,
    raw: Vec<Arc<dyn RawHandler>>,
    background: Vec<Arc<dyn BackgroundHandler>>,
    /// Keyed by pattern identity; equal patterns in separate `Arc`s get
    /// separate entries
    hears: Vec<(Arc<Regex>, Vec<Arc<dyn HearsHandler>>)>,
    cmds: Arc<CommandMux>,
    http: HashMap<String, Arc<dyn HttpHandler>>,
}

/// Multiplexes messages to a set of command, hears and raw handlers, and
/// web requests to HTTP handlers.
///
/// `handle` runs under a shared lock, so concurrent dispatches never wait on
/// each other; registration takes the lock exclusively. A handler must not
/// register new handlers on the mux that is currently dispatching to it.
pub struct Mux {
    name: String,
    desc: String,
    inner: RwLock<Registry>,
}

impl Mux {
    /// Create a mux with a `help` command already registered
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        let name = name.into();
        let desc = desc.into();
        let cmds = CommandMux::new(None);
        cmds.add_command(Arc::new(HelpCommand::new(&name, &desc, &cmds)));

        Self {
            name,
            desc,
            inner: RwLock::new(Registry {
                handlers: Vec::new(),
                raw: Vec::new(),
                background: Vec::new(),
                hears: Vec::new(),
                cmds,
                http: HashMap::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a handler under every kind it supports.
    ///
    /// Fails with `BotError::UnusableHandler` when `h` implements none of
    /// them.
    pub async fn add(&self, h: Arc<dyn Handler>) -> Result<(), BotError> {
        let mut used = false;

        if let Some(rh) = h.clone().as_raw() {
            self.add_raw(rh).await;
            used = true;
        }
        if let Some(bh) = h.clone().as_background() {
            self.add_background(bh).await;
            used = true;
        }
        if let Some(ch) = h.clone().as_command() {
            self.add_command(ch).await;
            used = true;
        }
        if let Some(hh) = h.clone().as_hears() {
            self.add_hears(hh).await;
            used = true;
        }
        if let Some(wh) = h.clone().as_http() {
            self.add_http(wh).await;
            used = true;
        }

        if !used {
            return Err(BotError::UnusableHandler(h.describe().0));
        }

        self.inner.write().await.handlers.push(h);
        Ok(())
    }

    /// Every handler registered through `add`
    pub async fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.inner.read().await.handlers.clone()
    }

    /// Register a handler that sees every message
    pub async fn add_raw(&self, h: Arc<dyn RawHandler>) {
        info!("Registering raw handler: {}", h.describe().0);
        self.inner.write().await.raw.push(h);
    }

    /// Register a handler to be started by `start_background`
    pub async fn add_background(&self, h: Arc<dyn BackgroundHandler>) {
        info!("Registering background handler: {}", h.describe().0);
        self.inner.write().await.background.push(h);
    }

    /// Register a handler for messages matching its pattern
    pub async fn add_hears(&self, h: Arc<dyn HearsHandler>) {
        let re = h.hears();
        info!("Registering hears handler: {} ({})", h.describe().0, re.as_str());

        let mut inner = self.inner.write().await;
        match inner.hears.iter_mut().find(|(r, _)| Arc::ptr_eq(r, &re)) {
            Some((_, hhs)) => hhs.push(h),
            None => inner.hears.push((re, vec![h])),
        }
    }

    /// Register a command at the top of the command tree. The returned node
    /// accepts sub-commands.
    pub async fn add_command(&self, h: Arc<dyn CommandHandler>) -> Arc<CommandMux> {
        info!("Registering command handler: {}", h.describe().0);
        let inner = self.inner.write().await;
        inner.cmds.add_command(h)
    }

    /// Register a web handler at `/<mux-name>/<handler-name>` and return
    /// that path. A later handler with the same name replaces this one.
    pub async fn add_http(&self, h: Arc<dyn HttpHandler>) -> String {
        let (n, _) = h.describe();
        let path = format!("/{}/{}", self.name, n);
        info!("Registering HTTP handler: {}", path);

        self.inner.write().await.http.insert(path.clone(), h);
        path
    }

    /// The root of the command tree
    pub async fn commands(&self) -> Arc<CommandMux> {
        self.inner.read().await.cmds.clone()
    }

    /// Start every background handler as its own task. Returns at once;
    /// cancelling `ctx` is how the tasks are told to stop.
    pub async fn start_background(&self, ctx: &CancellationToken, w: &ResponseWriter) {
        let inner = self.inner.read().await;
        for h in &inner.background {
            tokio::spawn(run_background(h.clone(), ctx.clone(), w.clone()));
        }
    }

    /// Dispatch one message.
    ///
    /// Raw handlers are spawned first and not awaited. If the message is
    /// addressed to the bot the command tree runs next, then every matching
    /// hears handler unless the command returned `SkipHears`. A command error
    /// is written back as `error, <details>` unless some hears handler
    /// reported the message handled. Failures never escape to the caller.
    pub async fn handle(&self, ctx: &CancellationToken, w: &ResponseWriter, m: &Message) {
        let inner = self.inner.read().await;

        for rh in &inner.raw {
            tokio::spawn(run_raw(rh.clone(), ctx.clone(), w.clone(), m.clone()));
        }

        let mut err = None;
        if m.to_bot {
            let mut mc = m.clone();
            if let Err(e) = run_command(ctx, inner.cmds.as_ref(), w, &mut mc).await {
                err = Some(e);
            }
        }

        if err == Some(CommandError::SkipHears) {
            debug!("Command requested no hears processing for {}", m.id);
            return;
        }

        for (_, hhs) in &inner.hears {
            for hh in hhs {
                if run_hears(ctx, hh.as_ref(), w, m.clone()).await {
                    err = None;
                }
            }
        }

        if let Some(e) = err {
            debug!("Command failed for {}: {}", m.id, e);
            if let Err(we) = w.send(format!("error, {}", e)) {
                warn!("Could not report error to {}: {}", w.chat_id(), we);
            }
        }
    }

    /// Route a web request to the handler bound to its exact path
    pub async fn serve_http(&self, req: Request<Body>) -> Response<Body> {
        let h = self.inner.read().await.http.get(req.uri().path()).cloned();
        match h {
            Some(h) => run_http(h.as_ref(), req).await,
            None => {
                let mut resp = Response::new(Body::from("404 page not found"));
                *resp.status_mut() = StatusCode::NOT_FOUND;
                resp
            }
        }
    }

    /// An axum router forwarding every request to `serve_http`, for mounting
    /// into a host server
    pub fn router(self: Arc<Self>) -> Router {
        Router::new().fallback(move |req: Request<Body>| {
            let mux = self.clone();
            async move { mux.serve_http(req).await }
        })
    }
}

impl Handler for Mux {
    fn describe(&self) -> (String, String) {
        (self.name.clone(), self.desc.clone())
    }

    fn as_raw(self: Arc<Self>) -> Option<Arc<dyn RawHandler>> {
        Some(self)
    }

    fn as_http(self: Arc<Self>) -> Option<Arc<dyn HttpHandler>> {
        Some(self)
    }
}

/// A mux registered in another mux sees every message the outer one receives
#[async_trait]
impl RawHandler for Mux {
    async fn handle(
        &self,
        ctx: CancellationToken,
        w: ResponseWriter,
        m: Message,
    ) -> Result<(), BotError> {
        Mux::handle(self, &ctx, &w, &m).await;
        Ok(())
    }
}

#[async_trait]
impl HttpHandler for Mux {
    async fn serve_http(&self, req: Request<Body>) -> Response<Body> {
        Mux::serve_http(self, req).await
    }
}
