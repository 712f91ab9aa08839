//! Infrastructure adapters. Implement outbound ports.
//!
//! Node bridge, terminal UI. Map errors to DomainError.

pub mod ui;
pub mod whatsapp;
