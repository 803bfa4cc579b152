//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Don't know how to use {0} as a handler")]
    UnusableHandler(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors.
///
/// The first four variants are part of the dispatch contract: a command
/// handler returns `NextCommand` to defer to its subcommands and `SkipHears`
/// to stop hears processing for the message. `UnknownCommand` and
/// `MissingSubCommand` are produced by the command tree itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("pass execution to next command")]
    NextCommand,

    #[error("skip hears processing")]
    SkipHears,

    #[error("unknown command")]
    UnknownCommand,

    #[error("missing sub-command")]
    MissingSubCommand,

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl CommandError {
    /// True for the variants that steer dispatch rather than report failure
    pub fn is_control(&self) -> bool {
        matches!(self, CommandError::NextCommand | CommandError::SkipHears)
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_messages() {
        assert_eq!(CommandError::UnknownCommand.to_string(), "unknown command");
        assert_eq!(CommandError::MissingSubCommand.to_string(), "missing sub-command");
        assert!(CommandError::SkipHears.is_control());
        assert!(!CommandError::UnknownCommand.is_control());
    }

    #[test]
    fn test_unusable_handler_message() {
        let err = BotError::UnusableHandler("widget".to_string());
        assert_eq!(err.to_string(), "Don't know how to use widget as a handler");
    }
}
