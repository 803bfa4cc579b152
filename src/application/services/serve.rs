use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::messaging::{Mux, ResponseWriter};
use crate::domain::entities::Message;
use crate::domain::traits::Adapter;

/// Connect an adapter to a mux and process messages until the adapter
/// closes or `ctx` is cancelled.
///
/// Background handlers are started with a writer bound to the adapter's
/// home channel. Every received message is dispatched on its own task with
/// a writer bound to that message's conversation; replies from all handlers
/// are forwarded to `Adapter::send`.
///
/// When the adapter closes, dispatches still in flight are awaited and
/// background handlers are stopped, then every queued reply is delivered
/// before returning. Cancelling `ctx` returns without draining.
pub async fn listen_and_serve(ctx: CancellationToken, adapter: Arc<dyn Adapter>, mux: Arc<Mux>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let out = adapter.clone();
    let out_ctx = ctx.clone();
    let pump = tokio::spawn(async move {
        while let Some(m) = rx.recv().await {
            if let Err(e) = out.send(&out_ctx, m).await {
                warn!("Failed to deliver reply: {}", e);
            }
        }
    });
    let stop_pump = pump.abort_handle();

    let info = adapter.bot_info();
    info!("Bot started: {} ({})", info.name, info.id);

    let home = ResponseWriter::new(tx, info.home_channel.clone());
    let background = ctx.child_token();
    mux.start_background(&background, &home).await;

    let mut dispatches = JoinSet::new();
    loop {
        tokio::select! {
            _ = ctx.cancelled() => {
                info!("Shutting down {}", info.name);
                stop_pump.abort();
                return;
            }
            Some(res) = dispatches.join_next(), if !dispatches.is_empty() => {
                if let Err(e) = res {
                    warn!("Dispatch task failed: {}", e);
                }
            }
            next = adapter.receive() => {
                let Some(m) = next else {
                    info!("Adapter for {} closed", info.name);
                    break;
                };
                debug!("[{}] {}", m.chat_id, m.text);
                let mux = mux.clone();
                let ctx = ctx.clone();
                let w = home.for_message(&m);
                dispatches.spawn(async move {
                    mux.handle(&ctx, &w, &m).await;
                });
            }
        }
    }

    // The pump ends once the last writer clone is dropped
    let drain = async move {
        while let Some(res) = dispatches.join_next().await {
            if let Err(e) = res {
                warn!("Dispatch task failed: {}", e);
            }
        }
        background.cancel();
        drop(home);
        if let Err(e) = pump.await {
            warn!("Reply pump failed: {}", e);
        }
    };

    tokio::select! {
        _ = drain => debug!("Delivered pending replies for {}", info.name),
        _ = ctx.cancelled() => {
            info!("Shutting down {} before replies drained", info.name);
            stop_pump.abort();
        }
    }
}
