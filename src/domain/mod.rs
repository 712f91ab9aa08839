//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    ChatSummary, DispatchOutcome, Group, MediaPayload, ReportRequest, SessionState, TransportEvent,
};
pub use errors::DomainError;
