//! Nested command routing
//!
//! A `CommandMux` is a node in a tree of commands. Dispatch starts at the
//! root and consumes one token of `Message::args` per level, so
//! `deploy prod api` reaches the `api` node under `prod` under `deploy`.
//! Any node with a base handler can answer the command itself, or return
//! `CommandError::NextCommand` to hand it on to the matching child.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::errors::CommandError;
use crate::domain::entities::Message;
use crate::domain::traits::{CommandHandler, Handler};

use super::invoke::run_command;
use super::ResponseWriter;

/// A command handler supporting nested sub-commands
pub struct CommandMux {
    base: Option<Arc<dyn CommandHandler>>,
    sub_cmds: RwLock<HashMap<String, Arc<CommandMux>>>,
}

impl CommandMux {
    /// Create a node. The base handler, if any, runs before sub-command
    /// lookup and may process leading flags or shift its own name off
    /// `args` before deferring.
    pub fn new(base: Option<Arc<dyn CommandHandler>>) -> Arc<Self> {
        Arc::new(Self {
            base,
            sub_cmds: RwLock::new(HashMap::new()),
        })
    }

    /// Install `c` as a sub-command, keyed by its described name.
    ///
    /// A `CommandMux` is installed as-is; any other handler is wrapped in a
    /// fresh node. The installed node is returned so further sub-commands can
    /// be attached beneath it. An existing entry with the same name is
    /// replaced.
    ///
    /// A handler with an empty name could never be reached by any message,
    /// so it is not installed; the node is still returned.
    pub fn add_command(&self, c: Arc<dyn CommandHandler>) -> Arc<CommandMux> {
        let (name, _) = c.describe();
        let node = match c.clone().as_command_mux() {
            Some(sub) => sub,
            None => CommandMux::new(Some(c)),
        };

        if name.is_empty() {
            warn!("Ignoring command without a name");
            return node;
        }

        debug!("Registering command: {}", name);
        self.sub_cmds.write().insert(name, node.clone());
        node
    }

    /// Snapshot of the immediate sub-commands
    pub fn sub_commands(&self) -> HashMap<String, Arc<CommandMux>> {
        self.sub_cmds.read().clone()
    }

    pub fn sub_command(&self, name: &str) -> Option<Arc<CommandMux>> {
        self.sub_cmds.read().get(name).cloned()
    }

    pub fn base(&self) -> Option<&Arc<dyn CommandHandler>> {
        self.base.as_ref()
    }
}

impl Handler for CommandMux {
    fn describe(&self) -> (String, String) {
        match &self.base {
            Some(base) => base.describe(),
            None => (String::new(), String::new()),
        }
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandHandler>> {
        Some(self)
    }

    fn as_command_mux(self: Arc<Self>) -> Option<Arc<CommandMux>> {
        Some(self)
    }
}

#[async_trait]
impl CommandHandler for CommandMux {
    async fn command(
        &self,
        ctx: &CancellationToken,
        w: &ResponseWriter,
        m: &mut Message,
    ) -> Result<(), CommandError> {
        let res = match &self.base {
            Some(base) => run_command(ctx, base.as_ref(), w, m).await,
            None => Err(CommandError::NextCommand),
        };

        match res {
            Err(CommandError::NextCommand) => {}
            other => return other,
        }

        let Some(key) = m.args.first().cloned() else {
            return Err(CommandError::MissingSubCommand);
        };

        match self.sub_command(&key) {
            Some(cmd) => cmd.command(ctx, w, m).await,
            None => Err(CommandError::UnknownCommand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts invocations and answers with a fixed result
    struct Probe {
        name: &'static str,
        result: Result<(), CommandError>,
        calls: AtomicUsize,
        shift: bool,
    }

    impl Probe {
        fn new(name: &'static str, result: Result<(), CommandError>) -> Arc<Self> {
            Arc::new(Self { name, result, calls: AtomicUsize::new(0), shift: false })
        }

        fn shifting(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Err(CommandError::NextCommand),
                calls: AtomicUsize::new(0),
                shift: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Handler for Probe {
        fn describe(&self) -> (String, String) {
            (self.name.to_string(), format!("{} probe", self.name))
        }
    }

    #[async_trait]
    impl CommandHandler for Probe {
        async fn command(
            &self,
            _ctx: &CancellationToken,
            _w: &ResponseWriter,
            m: &mut Message,
        ) -> Result<(), CommandError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.shift {
                m.shift_args();
            }
            self.result.clone()
        }
    }

    fn msg(args: &[&str]) -> Message {
        Message::command("c", args.iter().map(|s| s.to_string()).collect())
    }

    async fn dispatch(cx: &CommandMux, args: &[&str]) -> Result<(), CommandError> {
        let (w, _rx) = ResponseWriter::channel("c");
        cx.command(&CancellationToken::new(), &w, &mut msg(args)).await
    }

    #[tokio::test]
    async fn test_routes_to_named_child() {
        let root = CommandMux::new(Some(Probe::new("root", Err(CommandError::NextCommand))));
        let a = Probe::new("a", Ok(()));
        let b = Probe::new("b", Ok(()));
        root.add_command(a.clone());
        root.add_command(b.clone());

        assert_eq!(dispatch(&root, &["a"]).await, Ok(()));
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn test_routing_errors() {
        let root = CommandMux::new(Some(Probe::new("root", Err(CommandError::NextCommand))));
        root.add_command(Probe::new("a", Ok(())));
        root.add_command(Probe::new("b", Ok(())));

        assert_eq!(dispatch(&root, &[]).await, Err(CommandError::MissingSubCommand));
        assert_eq!(dispatch(&root, &["c"]).await, Err(CommandError::UnknownCommand));
    }

    #[tokio::test]
    async fn test_base_handler_can_answer_itself() {
        let base = Probe::new("root", Err(CommandError::ExecutionFailed("nope".into())));
        let root = CommandMux::new(Some(base.clone()));
        let a = Probe::new("a", Ok(()));
        root.add_command(a.clone());

        assert_eq!(
            dispatch(&root, &["a"]).await,
            Err(CommandError::ExecutionFailed("nope".into()))
        );
        assert_eq!(base.calls(), 1);
        assert_eq!(a.calls(), 0);
    }

    #[tokio::test]
    async fn test_nested_sub_commands() {
        let root = CommandMux::new(None);
        let deploy = root.add_command(Probe::shifting("deploy"));
        let prod = Probe::new("prod", Ok(()));
        deploy.add_command(prod.clone());

        assert_eq!(dispatch(&root, &["deploy", "prod"]).await, Ok(()));
        assert_eq!(prod.calls(), 1);
        assert_eq!(dispatch(&root, &["deploy"]).await, Err(CommandError::MissingSubCommand));
        assert_eq!(dispatch(&root, &["deploy", "qa"]).await, Err(CommandError::UnknownCommand));
    }

    #[tokio::test]
    async fn test_prebuilt_sub_tree_installed_directly() {
        let root = CommandMux::new(None);
        let sub = CommandMux::new(Some(Probe::shifting("admin")));
        let users = Probe::new("users", Ok(()));
        sub.add_command(users.clone());

        let installed = root.add_command(sub.clone());
        assert!(Arc::ptr_eq(&installed, &sub));
        assert!(root.sub_commands().contains_key("admin"));

        assert_eq!(dispatch(&root, &["admin", "users"]).await, Ok(()));
        assert_eq!(users.calls(), 1);
    }

    #[tokio::test]
    async fn test_same_name_overwrites() {
        let root = CommandMux::new(None);
        let first = Probe::new("dup", Ok(()));
        let second = Probe::new("dup", Ok(()));
        root.add_command(first.clone());
        root.add_command(second.clone());

        assert_eq!(root.sub_commands().len(), 1);
        dispatch(&root, &["dup"]).await.unwrap();
        assert_eq!(first.calls(), 0);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_unnamed_node_is_not_installed() {
        let root = CommandMux::new(None);
        let anonymous = CommandMux::new(None);
        anonymous.add_command(Probe::new("a", Ok(())));

        let returned = root.add_command(anonymous.clone());
        assert!(Arc::ptr_eq(&returned, &anonymous));
        assert!(root.sub_commands().is_empty());
        assert_eq!(dispatch(&root, &[""]).await, Err(CommandError::UnknownCommand));
    }
}
