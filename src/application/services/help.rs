use std::fmt::Write as _;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::errors::CommandError;
use crate::application::messaging::{CommandMux, ResponseWriter};
use crate::domain::entities::Message;
use crate::domain::traits::{CommandHandler, Handler};

/// The `help` command every mux starts with.
///
/// `help` lists the top level commands; `help deploy prod` walks the tree
/// and describes the `prod` sub-command of `deploy`.
pub struct HelpCommand {
    mux_name: String,
    mux_desc: String,
    // Weak because the root node owns this handler.
    root: Weak<CommandMux>,
}

impl HelpCommand {
    pub fn new(mux_name: &str, mux_desc: &str, root: &Arc<CommandMux>) -> Self {
        Self {
            mux_name: mux_name.to_string(),
            mux_desc: mux_desc.to_string(),
            root: Arc::downgrade(root),
        }
    }

    fn listing(node: &CommandMux) -> String {
        let mut names: Vec<(String, String)> = node
            .sub_commands()
            .into_iter()
            .map(|(name, cmd)| (name, cmd.describe().1))
            .collect();
        names.sort();

        let mut out = String::new();
        for (name, desc) in names {
            let _ = writeln!(out, "  {} - {}", name, desc);
        }
        out
    }
}

impl Handler for HelpCommand {
    fn describe(&self) -> (String, String) {
        ("help".to_string(), "Show available commands".to_string())
    }

    fn as_command(self: Arc<Self>) -> Option<Arc<dyn CommandHandler>> {
        Some(self)
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn command(
        &self,
        _ctx: &CancellationToken,
        w: &ResponseWriter,
        m: &mut Message,
    ) -> Result<(), CommandError> {
        let root = self
            .root
            .upgrade()
            .ok_or_else(|| CommandError::ExecutionFailed("command tree is gone".to_string()))?;

        // Drop "help" itself
        m.shift_args();

        let mut node = root;
        let mut path = Vec::new();
        for arg in m.args() {
            node = node.sub_command(arg).ok_or_else(|| {
                CommandError::InvalidArgs(format!("no such command: {}", arg))
            })?;
            path.push(arg.as_str());
        }

        let mut out = String::new();
        if path.is_empty() {
            if self.mux_desc.is_empty() {
                let _ = writeln!(out, "{}", self.mux_name);
            } else {
                let _ = writeln!(out, "{} - {}", self.mux_name, self.mux_desc);
            }
            out.push_str("Available commands:\n");
        } else {
            let _ = writeln!(out, "{} - {}", path.join(" "), node.describe().1);
            if !node.sub_commands().is_empty() {
                out.push_str("Sub-commands:\n");
            }
        }
        out.push_str(&Self::listing(&node));

        w.send(out.trim_end())
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}
