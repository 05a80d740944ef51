//! Journal service. Validated writes into the repositories.
//!
//! Everything the aggregator later reads goes through here first: referenced disorders,
//! medications and alters must exist, severities stay within 0..=10 and numeric fields are finite.

use crate::domain::entities::{MAX_SEVERITY, default_disorders};
use crate::domain::{
    Alter, Disorder, DomainError, EntryContent, LogEntry, Medication, MedicationLog, NewAlter,
    NewLogEntry, NewMedication, NewMedicationLog, NewSwitch, NewTherapySession, Switch,
    SymptomReading, TherapySession,
};
use crate::ports::{
    AlterRepoPort, DisorderRepoPort, EntryRepoPort, MedicationRepoPort, TherapyRepoPort,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Maximum plausible sleep in one night.
const MAX_SLEEP_HOURS: f64 = 24.0;
/// Upper bound of the effectiveness rating scale.
const MAX_EFFECTIVENESS: f64 = 10.0;

/// What the user logs for one entry, before it is encoded for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub timestamp: DateTime<Utc>,
    pub disorder_id: i64,
    pub title: Option<String>,
    pub symptoms: Vec<SymptomReading>,
    pub fronting_alter_id: Option<i64>,
    pub mood: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<f64>,
}

impl EntryDraft {
    pub fn new(disorder_id: i64, symptoms: Vec<SymptomReading>) -> Self {
        Self {
            timestamp: Utc::now(),
            disorder_id,
            title: None,
            symptoms,
            fronting_alter_id: None,
            mood: None,
            sleep_hours: None,
            stress_level: None,
        }
    }
}

fn check_finite(field: &str, value: Option<f64>) -> Result<(), DomainError> {
    match value {
        Some(v) if !v.is_finite() => Err(DomainError::Validation(format!(
            "{} must be a finite number",
            field
        ))),
        _ => Ok(()),
    }
}

fn non_empty(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Service for recording journal data.
pub struct JournalService {
    disorders: Arc<dyn DisorderRepoPort>,
    entries: Arc<dyn EntryRepoPort>,
    medications: Arc<dyn MedicationRepoPort>,
    alters: Arc<dyn AlterRepoPort>,
    therapy: Arc<dyn TherapyRepoPort>,
}

impl JournalService {
    pub fn new(
        disorders: Arc<dyn DisorderRepoPort>,
        entries: Arc<dyn EntryRepoPort>,
        medications: Arc<dyn MedicationRepoPort>,
        alters: Arc<dyn AlterRepoPort>,
        therapy: Arc<dyn TherapyRepoPort>,
    ) -> Self {
        Self {
            disorders,
            entries,
            medications,
            alters,
            therapy,
        }
    }

    /// Insert the built-in disorder list when the store has none. Returns how many were added.
    pub async fn seed_default_disorders(&self) -> Result<usize, DomainError> {
        if !self.disorders.list_disorders().await?.is_empty() {
            return Ok(0);
        }
        let defaults = default_disorders();
        for disorder in &defaults {
            self.disorders.create_disorder(disorder).await?;
        }
        info!(count = defaults.len(), "seeded default disorders");
        Ok(defaults.len())
    }

    pub async fn list_disorders(&self) -> Result<Vec<Disorder>, DomainError> {
        self.disorders.list_disorders().await
    }

    async fn require_disorder(&self, id: i64) -> Result<Disorder, DomainError> {
        self.disorders
            .get_disorder(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Disorder", id))
    }

    async fn require_alter(&self, id: i64) -> Result<Alter, DomainError> {
        self.alters
            .get_alter(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Alter", id))
    }

    /// Validate a draft and encode it into the stored shape.
    async fn prepare_entry(&self, draft: EntryDraft) -> Result<NewLogEntry, DomainError> {
        self.require_disorder(draft.disorder_id).await?;
        if let Some(alter_id) = draft.fronting_alter_id {
            self.require_alter(alter_id).await?;
        }

        let mut symptoms = Vec::with_capacity(draft.symptoms.len());
        for reading in draft.symptoms {
            if reading.severity > MAX_SEVERITY {
                return Err(DomainError::Validation(format!(
                    "severity for '{}' must be between 0 and {}, got {}",
                    reading.name, MAX_SEVERITY, reading.severity
                )));
            }
            let name = non_empty("symptom name", &reading.name)?;
            symptoms.push(SymptomReading::new(name, reading.severity));
        }

        check_finite("mood", draft.mood)?;
        check_finite("stress level", draft.stress_level)?;
        check_finite("sleep hours", draft.sleep_hours)?;
        if let Some(hours) = draft.sleep_hours {
            if !(0.0..=MAX_SLEEP_HOURS).contains(&hours) {
                return Err(DomainError::Validation(format!(
                    "sleep hours must be between 0 and {}, got {}",
                    MAX_SLEEP_HOURS, hours
                )));
            }
        }

        let content = EntryContent {
            symptoms,
            fronting_alter_id: draft.fronting_alter_id,
        }
        .to_json()
        .map_err(|e| DomainError::Validation(format!("could not encode entry content: {}", e)))?;

        Ok(NewLogEntry {
            timestamp: draft.timestamp,
            disorder_id: Some(draft.disorder_id),
            title: optional_text(draft.title),
            content: Some(content),
            mood: draft.mood,
            sleep_hours: draft.sleep_hours,
            stress_level: draft.stress_level,
        })
    }

    pub async fn log_entry(&self, draft: EntryDraft) -> Result<LogEntry, DomainError> {
        let new_entry = self.prepare_entry(draft).await?;
        let entry = self.entries.create_entry(&new_entry).await?;
        info!(
            id = entry.id,
            disorder_id = ?entry.disorder_id,
            symptoms = entry.symptoms().len(),
            "entry logged"
        );
        Ok(entry)
    }

    pub async fn update_entry(&self, id: i64, draft: EntryDraft) -> Result<LogEntry, DomainError> {
        let new_entry = self.prepare_entry(draft).await?;
        self.entries
            .update_entry(id, &new_entry)
            .await?
            .ok_or_else(|| DomainError::not_found("Entry", id))
    }

    pub async fn get_entry(&self, id: i64) -> Result<LogEntry, DomainError> {
        self.entries
            .get_entry(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Entry", id))
    }

    /// Newest first.
    pub async fn recent_entries(&self, limit: u32, offset: u32) -> Result<Vec<LogEntry>, DomainError> {
        self.entries.list_entries(limit, offset).await
    }

    pub async fn delete_entry(&self, id: i64) -> Result<(), DomainError> {
        if !self.entries.delete_entry(id).await? {
            return Err(DomainError::not_found("Entry", id));
        }
        info!(id, "entry deleted");
        Ok(())
    }

    pub async fn add_medication(&self, medication: NewMedication) -> Result<Medication, DomainError> {
        let medication = NewMedication {
            name: non_empty("medication name", &medication.name)?,
            dosage: optional_text(medication.dosage),
            frequency: optional_text(medication.frequency),
            ..medication
        };
        let created = self.medications.create_medication(&medication).await?;
        info!(id = created.id, name = %created.name, "medication added");
        Ok(created)
    }

    pub async fn list_medications(&self) -> Result<Vec<Medication>, DomainError> {
        self.medications.list_medications().await
    }

    pub async fn log_medication(&self, log: NewMedicationLog) -> Result<MedicationLog, DomainError> {
        self.medications
            .get_medication(log.medication_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Medication", log.medication_id))?;
        check_finite("effectiveness", log.effectiveness)?;
        if let Some(rating) = log.effectiveness {
            if !(0.0..=MAX_EFFECTIVENESS).contains(&rating) {
                return Err(DomainError::Validation(format!(
                    "effectiveness must be between 0 and {}, got {}",
                    MAX_EFFECTIVENESS, rating
                )));
            }
        }
        let log = NewMedicationLog {
            notes: optional_text(log.notes),
            ..log
        };
        self.medications.create_medication_log(&log).await
    }

    pub async fn recent_medication_logs(
        &self,
        medication_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<MedicationLog>, DomainError> {
        self.medications
            .list_medication_logs(medication_id, limit)
            .await
    }

    pub async fn add_alter(&self, alter: NewAlter) -> Result<Alter, DomainError> {
        if let Some(disorder_id) = alter.disorder_id {
            self.require_disorder(disorder_id).await?;
        }
        let alter = NewAlter {
            name: non_empty("alter name", &alter.name)?,
            role: optional_text(alter.role),
            ..alter
        };
        self.alters.create_alter(&alter).await
    }

    pub async fn list_alters(&self) -> Result<Vec<Alter>, DomainError> {
        self.alters.list_alters().await
    }

    pub async fn record_switch(&self, switch: NewSwitch) -> Result<Switch, DomainError> {
        if switch.from_alter_id == Some(switch.to_alter_id) {
            return Err(DomainError::Validation(
                "a switch must go to a different alter".to_string(),
            ));
        }
        self.require_alter(switch.to_alter_id).await?;
        if let Some(from) = switch.from_alter_id {
            self.require_alter(from).await?;
        }
        if let Some(disorder_id) = switch.disorder_id {
            self.require_disorder(disorder_id).await?;
        }
        let switch = NewSwitch {
            notes: optional_text(switch.notes),
            ..switch
        };
        let recorded = self.alters.create_switch(&switch).await?;
        info!(
            id = recorded.id,
            from = ?recorded.from_alter_id,
            to = recorded.to_alter_id,
            "switch recorded"
        );
        Ok(recorded)
    }

    pub async fn recent_switches(&self, limit: u32) -> Result<Vec<Switch>, DomainError> {
        self.alters.list_switches(limit).await
    }

    pub async fn log_therapy_session(
        &self,
        session: NewTherapySession,
    ) -> Result<TherapySession, DomainError> {
        self.require_disorder(session.disorder_id).await?;
        let session = NewTherapySession {
            therapist_name: non_empty("therapist name", &session.therapist_name)?,
            notes: optional_text(session.notes),
            ..session
        };
        let logged = self.therapy.create_therapy_session(&session).await?;
        info!(
            id = logged.id,
            disorder_id = logged.disorder_id,
            "therapy session logged"
        );
        Ok(logged)
    }

    /// Newest first.
    pub async fn recent_therapy_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<TherapySession>, DomainError> {
        self.therapy.list_therapy_sessions(limit).await
    }
}
