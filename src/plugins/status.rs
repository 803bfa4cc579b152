use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::ResponseWriter;
use crate::domain::entities::Message;
use crate::domain::traits::{CommandHandler, Handler, HttpHandler, RawHandler};

/// Counts messages and reports uptime, both as the `status` command and at
/// `/<bot>/status` over HTTP
pub struct Status {
    started: DateTime<Utc>,
    seen: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub started: DateTime<Utc>,
    pub uptime_secs: i64,
    pub messages_seen: u64,
}

impl Status {
    pub fn new() -> Self {
        Self {
            started: Utc::now(),
            seen: AtomicU64::new(0),
        }
    }

    pub fn report(&self) -> StatusReport {
        StatusReport {
            started: self.started,
            uptime_secs: (Utc::now() - self.started).num_seconds(),
            messages_seen: self.seen.load(Ordering::Relaxed),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for Status {
    fn describe(&self) -> (String, String) {
        ("status".to_string(), "Show uptime and message count".to_string())
    }

    fn as_raw(self: Arc<Self>) -> Option<Arc<dyn RawHandler>> {
        Some(self)
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandHandler>> {
        Some(self)
    }

    fn as_http(self: Arc<Self>) -> Option<Arc<dyn HttpHandler>> {
        Some(self)
    }
}

#[async_trait]
impl RawHandler for Status {
    async fn handle(&self, _ctx: CancellationToken, _w: ResponseWriter, _m: Message) -> Result<(), BotError> {
        self.seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for Status {
    async fn command(
        &self,
        _ctx: &CancellationToken,
        w: &ResponseWriter,
        _m: &mut Message,
    ) -> Result<(), CommandError> {
        let report = self.report();
        w.send(format!(
            "up {}s since {}, {} messages seen",
            report.uptime_secs,
            report.started.format("%Y-%m-%d %H:%M:%S UTC"),
            report.messages_seen
        ))
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}

#[async_trait]
impl HttpHandler for Status {
    async fn serve_http(&self, _req: Request<Body>) -> Response<Body> {
        let (status, body) = match serde_json::to_string(&self.report()) {
            Ok(json) => (StatusCode::OK, json),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let mut resp = Response::new(Body::from(body));
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        resp
    }
}
