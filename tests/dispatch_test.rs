//! Dispatch integration tests
//! Run with: cargo test --test dispatch_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use chatmux::application::messaging::default_mux;
use chatmux::{
    BackgroundHandler, BotError, CommandError, CommandHandler, CommandMux, Handler,
    HearsHandler, Message, Mux, RawHandler, ResponseWriter,
};
use regex_lite::Regex;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Forwards each raw message it sees to a channel, then scribbles on its copy
struct Tap {
    seen: mpsc::UnboundedSender<Message>,
}

impl Handler for Tap {
    fn describe(&self) -> (String, String) {
        ("tap".to_string(), String::new())
    }

    fn as_raw(self: Arc<Self>) -> Option<Arc<dyn RawHandler>> {
        Some(self)
    }
}

#[async_trait]
impl RawHandler for Tap {
    async fn handle(&self, _ctx: CancellationToken, _w: ResponseWriter, mut m: Message) -> Result<(), BotError> {
        m.text.push_str(" [tapped]");
        m.args.clear();
        self.seen.send(m).map_err(|e| BotError::Handler(e.to_string()))
    }
}

/// Counts calls; fails if the args it was given were tampered with
struct Counter {
    name: String,
    calls: AtomicUsize,
}

impl Counter {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self { name: name.to_string(), calls: AtomicUsize::new(0) })
    }
}

impl Handler for Counter {
    fn describe(&self) -> (String, String) {
        (self.name.clone(), format!("counts {}", self.name))
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandHandler>> {
        Some(self)
    }
}

#[async_trait]
impl CommandHandler for Counter {
    async fn command(
        &self,
        _ctx: &CancellationToken,
        w: &ResponseWriter,
        m: &mut Message,
    ) -> Result<(), CommandError> {
        if m.args().first() != Some(&self.name) {
            return Err(CommandError::InvalidArgs(format!("{:?}", m.args())));
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        w.send(format!("{} {}", self.name, n))
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}

/// A hears handler that is also a background ticker
struct Echo {
    re: Arc<Regex>,
    ticks: AtomicUsize,
}

impl Handler for Echo {
    fn describe(&self) -> (String, String) {
        ("echo".to_string(), String::new())
    }

    fn as_hears(self: Arc<Self>) -> Option<Arc<dyn HearsHandler>> {
        Some(self)
    }

    fn as_background(self: Arc<Self>) -> Option<Arc<dyn BackgroundHandler>> {
        Some(self)
    }
}

#[async_trait]
impl HearsHandler for Echo {
    fn hears(&self) -> Arc<Regex> {
        self.re.clone()
    }

    async fn hear(&self, _ctx: &CancellationToken, w: &ResponseWriter, m: Message) -> bool {
        w.send(format!("echo: {}", m.matches[1])).is_ok()
    }
}

#[async_trait]
impl BackgroundHandler for Echo {
    async fn run(&self, ctx: CancellationToken, w: ResponseWriter) -> Result<(), BotError> {
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_millis(10)) => {
                    self.ticks.fetch_add(1, Ordering::SeqCst);
                    w.send("tick")?;
                }
            }
        }
    }
}

fn cmd(args: &[&str]) -> Message {
    Message::command("room", args.iter().map(|s| s.to_string()).collect())
}

#[tokio::test]
async fn test_raw_handlers_get_their_own_copy() {
    ensure_init();

    let mux = Mux::new("bot", "");
    let (tx, mut seen) = mpsc::unbounded_channel();
    mux.add(Arc::new(Tap { seen: tx.clone() })).await.unwrap();
    mux.add(Arc::new(Tap { seen: tx })).await.unwrap();
    let counter = Counter::new("count");
    mux.add(counter.clone()).await.unwrap();

    let (w, mut rx) = ResponseWriter::channel("room");
    let m = cmd(&["count"]);
    mux.handle(&CancellationToken::new(), &w, &m).await;

    // The command saw untouched args even though the taps clear theirs
    assert_eq!(rx.recv().await.unwrap().text, "count 1");

    for _ in 0..2 {
        let copy = seen.recv().await.unwrap();
        assert_eq!(copy.text, "count [tapped]");
        assert_eq!(copy.id, m.id);
    }
    assert_eq!(m.text, "count");
}

#[tokio::test]
async fn test_overheard_messages_skip_commands() {
    ensure_init();

    let mux = Mux::new("bot", "");
    let counter = Counter::new("count");
    mux.add_command(counter.clone()).await;

    let (w, mut rx) = ResponseWriter::channel("room");
    mux.handle(&CancellationToken::new(), &w, &cmd(&["count"]).to_bot(false)).await;
    mux.handle(&CancellationToken::new(), &w, &cmd(&["nosuch"]).to_bot(false)).await;

    assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_multi_kind_handler_and_background() {
    ensure_init();

    let mux = Mux::new("bot", "");
    let echo = Arc::new(Echo {
        re: Arc::new(Regex::new(r"^say (.+)$").unwrap()),
        ticks: AtomicUsize::new(0),
    });
    mux.add(echo.clone()).await.unwrap();
    assert_eq!(mux.handlers().await.len(), 1);

    let (w, mut rx) = ResponseWriter::channel("room");
    mux.handle(&CancellationToken::new(), &w, &Message::new("room", "say hi there")).await;
    assert_eq!(rx.recv().await.unwrap().text, "echo: hi there");

    let ctx = CancellationToken::new();
    let (home, mut ticks) = ResponseWriter::channel("home");
    mux.start_background(&ctx, &home).await;

    assert_eq!(ticks.recv().await.unwrap().text, "tick");
    ctx.cancel();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let after = echo.ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(echo.ticks.load(Ordering::SeqCst), after);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_handle_sees_prior_registrations() {
    ensure_init();

    let mux = Arc::new(Mux::new("bot", ""));
    let counter = Counter::new("count");
    let sub: Arc<CommandMux> = mux.add_command(counter.clone()).await;
    assert!(sub.base().is_some());

    let (w, mut rx) = ResponseWriter::channel("room");
    let mut tasks = Vec::new();
    for _ in 0..32 {
        let mux = mux.clone();
        let w = w.clone();
        tasks.push(tokio::spawn(async move {
            mux.handle(&CancellationToken::new(), &w, &cmd(&["count"])).await;
        }));
    }

    // Registration interleaved with dispatch must not deadlock
    let late = Counter::new("late");
    mux.add_command(late.clone()).await;

    for t in tasks {
        tokio::time::timeout(Duration::from_secs(5), t)
            .await
            .expect("dispatch deadlocked")
            .unwrap();
    }
    assert_eq!(counter.calls.load(Ordering::SeqCst), 32);

    let mut replies = 0;
    while let Ok(m) = rx.try_recv() {
        assert!(m.text.starts_with("count "), "unexpected reply {}", m.text);
        replies += 1;
    }
    assert_eq!(replies, 32);

    mux.handle(&CancellationToken::new(), &w, &cmd(&["late"])).await;
    assert_eq!(late.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_default_mux_forwards() {
    ensure_init();

    let counter = Counter::new("default-count");
    chatmux::application::messaging::default_mux::add(counter.clone())
        .await
        .unwrap();

    let mux = default_mux();
    assert_eq!(mux.name(), "defaultMux");
    assert!(Arc::ptr_eq(&mux, &default_mux()));

    let (w, mut rx) = ResponseWriter::channel("room");
    chatmux::application::messaging::default_mux::handle(
        &CancellationToken::new(),
        &w,
        &cmd(&["default-count"]),
    )
    .await;
    assert_eq!(rx.recv().await.unwrap().text, "default-count 1");
}
