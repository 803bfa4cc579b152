//! Bundled handlers for chatmux
//! 
//! Small handlers covering each handler kind, registered by the binary

pub mod audit;
pub mod builtin;
pub mod greeter;
pub mod heartbeat;
pub mod ping;
pub mod status;

pub use audit::Audit;
pub use builtin::register_builtin;
pub use greeter::Greeter;
pub use heartbeat::Heartbeat;
pub use ping::Ping;
pub use status::Status;
