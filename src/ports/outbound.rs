//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by persistence adapters (in-memory and SQLite). Records coming out of these
//! ports are already typed; use cases never see raw rows.

use crate::domain::{
    Alter, Disorder, DomainError, LogEntry, Medication, MedicationLog, NewAlter, NewDisorder,
    NewLogEntry, NewMedication, NewMedicationLog, NewSwitch, NewTherapySession, Switch,
    TherapySession,
};
use chrono::{DateTime, Utc};

/// Disorder catalogue.
#[async_trait::async_trait]
pub trait DisorderRepoPort: Send + Sync {
    /// All disorders in id order.
    async fn list_disorders(&self) -> Result<Vec<Disorder>, DomainError>;

    async fn get_disorder(&self, id: i64) -> Result<Option<Disorder>, DomainError>;

    async fn create_disorder(&self, disorder: &NewDisorder) -> Result<Disorder, DomainError>;
}

/// Journal entries.
#[async_trait::async_trait]
pub trait EntryRepoPort: Send + Sync {
    async fn create_entry(&self, entry: &NewLogEntry) -> Result<LogEntry, DomainError>;

    async fn get_entry(&self, id: i64) -> Result<Option<LogEntry>, DomainError>;

    /// Newest first. `offset` skips that many of the newest entries.
    async fn list_entries(&self, limit: u32, offset: u32) -> Result<Vec<LogEntry>, DomainError>;

    /// Entries with `timestamp >= since`, oldest first.
    async fn list_entries_since(&self, since: DateTime<Utc>)
    -> Result<Vec<LogEntry>, DomainError>;

    /// Entries with `start <= timestamp < end`, oldest first.
    async fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, DomainError>;

    /// Every entry, oldest first.
    async fn all_entries(&self) -> Result<Vec<LogEntry>, DomainError>;

    /// Replace all fields of an entry. Returns `None` if it does not exist.
    async fn update_entry(
        &self,
        id: i64,
        entry: &NewLogEntry,
    ) -> Result<Option<LogEntry>, DomainError>;

    /// Returns `true` if a row was removed.
    async fn delete_entry(&self, id: i64) -> Result<bool, DomainError>;
}

/// Medications and their adherence logs.
#[async_trait::async_trait]
pub trait MedicationRepoPort: Send + Sync {
    async fn create_medication(&self, medication: &NewMedication)
    -> Result<Medication, DomainError>;

    /// Most recently prescribed first.
    async fn list_medications(&self) -> Result<Vec<Medication>, DomainError>;

    async fn get_medication(&self, id: i64) -> Result<Option<Medication>, DomainError>;

    async fn create_medication_log(
        &self,
        log: &NewMedicationLog,
    ) -> Result<MedicationLog, DomainError>;

    /// Newest first, optionally restricted to one medication.
    async fn list_medication_logs(
        &self,
        medication_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<MedicationLog>, DomainError>;

    /// Logs with `start <= timestamp < end`, oldest first.
    async fn list_medication_logs_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MedicationLog>, DomainError>;

    /// Every log, oldest first.
    async fn all_medication_logs(&self) -> Result<Vec<MedicationLog>, DomainError>;
}

/// Alters and the switches between them.
#[async_trait::async_trait]
pub trait AlterRepoPort: Send + Sync {
    async fn create_alter(&self, alter: &NewAlter) -> Result<Alter, DomainError>;

    async fn list_alters(&self) -> Result<Vec<Alter>, DomainError>;

    async fn get_alter(&self, id: i64) -> Result<Option<Alter>, DomainError>;

    async fn create_switch(&self, switch: &NewSwitch) -> Result<Switch, DomainError>;

    /// Newest first.
    async fn list_switches(&self, limit: u32) -> Result<Vec<Switch>, DomainError>;

    /// Switches with `start <= timestamp < end`, oldest first.
    async fn list_switches_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Switch>, DomainError>;
}

/// Therapy appointments.
#[async_trait::async_trait]
pub trait TherapyRepoPort: Send + Sync {
    async fn create_therapy_session(
        &self,
        session: &NewTherapySession,
    ) -> Result<TherapySession, DomainError>;

    async fn get_therapy_session(&self, id: i64) -> Result<Option<TherapySession>, DomainError>;

    /// Newest first.
    async fn list_therapy_sessions(&self, limit: u32)
    -> Result<Vec<TherapySession>, DomainError>;

    /// Sessions with `start <= timestamp < end`, oldest first.
    async fn list_therapy_sessions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TherapySession>, DomainError>;
}
