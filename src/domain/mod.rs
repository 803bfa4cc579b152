//! Domain layer - Core types shared by the dispatcher and its collaborators
//! 
//! This layer contains:
//! - Entities: Message, User
//! - Traits: Handler capabilities and the Adapter abstraction

pub mod entities;
pub mod traits;
