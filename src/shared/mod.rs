//! Shared application plumbing: configuration, logging, wiring.

pub mod bootstrap;
pub mod config;
pub mod logging;
