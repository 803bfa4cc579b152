//! Handler invocation helpers
//!
//! Each helper runs a single handler of one kind and turns a panic into a
//! logged failure (or a `CommandError::Panicked`) so one misbehaving handler
//! cannot take down the task that dispatched it.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::application::errors::CommandError;
use crate::domain::entities::Message;
use crate::domain::traits::{
    BackgroundHandler, CommandHandler, HearsHandler, HttpHandler, RawHandler,
};

use super::ResponseWriter;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run a raw handler. Failures are logged, never returned.
pub async fn run_raw(
    h: Arc<dyn RawHandler>,
    ctx: CancellationToken,
    w: ResponseWriter,
    m: Message,
) {
    let (name, _) = h.describe();
    match AssertUnwindSafe(h.handle(ctx, w, m)).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Raw handler {} failed: {}", name, e),
        Err(p) => error!("Raw handler {} panicked: {}", name, panic_message(p.as_ref())),
    }
}

/// Run a background handler until it returns. Failures are logged.
pub async fn run_background(
    h: Arc<dyn BackgroundHandler>,
    ctx: CancellationToken,
    w: ResponseWriter,
) {
    let (name, _) = h.describe();
    debug!("Starting background handler {}", name);
    match AssertUnwindSafe(h.run(ctx, w)).catch_unwind().await {
        Ok(Ok(())) => debug!("Background handler {} stopped", name),
        Ok(Err(e)) => warn!("Background handler {} failed: {}", name, e),
        Err(p) => error!("Background handler {} panicked: {}", name, panic_message(p.as_ref())),
    }
}

/// Run a command handler, converting a panic into `CommandError::Panicked`
pub async fn run_command(
    ctx: &CancellationToken,
    h: &dyn CommandHandler,
    w: &ResponseWriter,
    m: &mut Message,
) -> Result<(), CommandError> {
    match AssertUnwindSafe(h.command(ctx, w, m)).catch_unwind().await {
        Ok(res) => res,
        Err(p) => {
            let msg = panic_message(p.as_ref());
            error!("Command handler {} panicked: {}", h.describe().0, msg);
            Err(CommandError::Panicked(msg))
        }
    }
}

/// Match `m` against the handler's pattern and run it on a hit.
///
/// Returns whether the handler reported the message as handled. The capture
/// groups of the match are stored in `m.matches` before the call.
pub async fn run_hears(
    ctx: &CancellationToken,
    h: &dyn HearsHandler,
    w: &ResponseWriter,
    mut m: Message,
) -> bool {
    let re = h.hears();
    let matches: Vec<String> = match re.captures(&m.text) {
        Some(caps) => caps
            .iter()
            .map(|c| c.map(|c| c.as_str().to_string()).unwrap_or_default())
            .collect(),
        None => return false,
    };
    m.matches = matches;

    match AssertUnwindSafe(h.hear(ctx, w, m)).catch_unwind().await {
        Ok(handled) => handled,
        Err(p) => {
            error!("Hears handler {} panicked: {}", h.describe().0, panic_message(p.as_ref()));
            false
        }
    }
}

/// Serve one request, answering 500 if the handler panics
pub async fn run_http(h: &dyn HttpHandler, req: Request<Body>) -> Response<Body> {
    match AssertUnwindSafe(h.serve_http(req)).catch_unwind().await {
        Ok(resp) => resp,
        Err(p) => {
            error!("HTTP handler {} panicked: {}", h.describe().0, panic_message(p.as_ref()));
            let mut resp = Response::new(Body::from("internal server error"));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BotError;
    use crate::domain::traits::Handler;
    use async_trait::async_trait;
    use regex_lite::Regex;

    struct Boom;

    impl Handler for Boom {
        fn describe(&self) -> (String, String) {
            ("boom".to_string(), "always panics".to_string())
        }
    }

    #[async_trait]
    impl CommandHandler for Boom {
        async fn command(
            &self,
            _ctx: &CancellationToken,
            _w: &ResponseWriter,
            _m: &mut Message,
        ) -> Result<(), CommandError> {
            panic!("kaboom")
        }
    }

    #[async_trait]
    impl RawHandler for Boom {
        async fn handle(
            &self,
            _ctx: CancellationToken,
            _w: ResponseWriter,
            _m: Message,
        ) -> Result<(), BotError> {
            panic!("raw kaboom")
        }
    }

    #[async_trait]
    impl BackgroundHandler for Boom {
        async fn run(&self, _ctx: CancellationToken, _w: ResponseWriter) -> Result<(), BotError> {
            panic!("background kaboom")
        }
    }

    struct Capture {
        re: Arc<Regex>,
    }

    impl Handler for Capture {
        fn describe(&self) -> (String, String) {
            ("capture".to_string(), String::new())
        }
    }

    #[async_trait]
    impl HearsHandler for Capture {
        fn hears(&self) -> Arc<Regex> {
            self.re.clone()
        }

        async fn hear(&self, _ctx: &CancellationToken, w: &ResponseWriter, m: Message) -> bool {
            w.send(m.matches.join("|")).is_ok()
        }
    }

    #[tokio::test]
    async fn test_command_panic_becomes_error() {
        let (w, _rx) = ResponseWriter::channel("c");
        let mut m = Message::command("c", vec!["boom".into()]);
        let err = run_command(&CancellationToken::new(), &Boom, &w, &mut m)
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::Panicked("kaboom".to_string()));
    }

    #[tokio::test]
    async fn test_raw_and_background_panics_are_contained() {
        let (w, mut rx) = ResponseWriter::channel("c");
        let ctx = CancellationToken::new();

        let raw = tokio::spawn(run_raw(Arc::new(Boom), ctx.clone(), w.clone(), Message::new("c", "hi")));
        let background = tokio::spawn(run_background(Arc::new(Boom), ctx, w));

        // Both tasks finish normally instead of propagating the panic
        assert!(raw.await.is_ok());
        assert!(background.await.is_ok());

        // Nothing reached the sender, and every writer clone is gone
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_hears_fills_matches() {
        let (w, mut rx) = ResponseWriter::channel("c");
        let h = Capture { re: Arc::new(Regex::new(r"deploy (\w+)").unwrap()) };
        let ctx = CancellationToken::new();

        assert!(!run_hears(&ctx, &h, &w, Message::new("c", "nothing here")).await);
        assert!(run_hears(&ctx, &h, &w, Message::new("c", "please deploy api now")).await);
        assert_eq!(rx.recv().await.unwrap().text, "deploy api|api");
    }
}
