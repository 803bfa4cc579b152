//! Application layer - Dispatch logic
//! 
//! This layer contains:
//! - Errors: Registration, routing and command errors
//! - Messaging: Parsing, the command tree and the message dispatcher
//! - Services: The help command and the adapter serve loop

pub mod errors;
pub mod services;
pub mod messaging;
