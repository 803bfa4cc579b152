//! Application services - Built-in commands and the adapter serve loop

pub mod help;
pub mod serve;

pub use help::HelpCommand;
pub use serve::listen_and_serve;
