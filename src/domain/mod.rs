//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the analytics aggregator and business rules live here. Dependencies flow inward.

pub mod analytics;
pub mod entities;
pub mod errors;

pub use analytics::Calendar;
pub use entities::{
    Alter, Disorder, EntryContent, LogEntry, Medication, MedicationLog, NewAlter, NewDisorder,
    NewLogEntry, NewMedication, NewMedicationLog, NewSwitch, NewTherapySession, Switch,
    SymptomReading, TherapySession,
};
pub use errors::DomainError;
