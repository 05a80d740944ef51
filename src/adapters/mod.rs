//! Infrastructure adapters. Implement outbound ports.
//!
//! Persistence, export formats, terminal UI. Map errors to DomainError.

pub mod export;
pub mod persistence;
pub mod ui;
