//! Message handling - Parsing, command routing and dispatch

pub mod command_mux;
pub mod default_mux;
pub mod invoke;
pub mod mux;
pub mod parser;
pub mod writer;

pub use command_mux::CommandMux;
pub use default_mux::default_mux;
pub use mux::Mux;
pub use parser::MessageParser;
pub use writer::ResponseWriter;
