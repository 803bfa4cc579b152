//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Platform integrations (console)
//! - Web: HTTP server for web handlers

pub mod config;
pub mod adapters;
pub mod web;
