//! Domain entities. Pure data structures for the core business.
//!
//! No database/IO types here; these are mapped from adapters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Highest severity a symptom reading can carry.
pub const MAX_SEVERITY: u8 = 10;

/// One of the fixed clinical categories entries are filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disorder {
    pub id: i64,
    pub name: String,
    pub acronym: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDisorder {
    pub name: String,
    pub acronym: String,
    pub full_name: String,
}

impl NewDisorder {
    pub fn new(name: &str, acronym: &str, full_name: &str) -> Self {
        Self {
            name: name.to_string(),
            acronym: acronym.to_string(),
            full_name: full_name.to_string(),
        }
    }
}

/// Categories seeded into an empty store.
pub fn default_disorders() -> Vec<NewDisorder> {
    vec![
        NewDisorder::new("BD.2", "BD.2", "Bipolar II Disorder"),
        NewDisorder::new("DID", "DID", "Dissociative Identity Disorder"),
        NewDisorder::new(
            "ASPD/PP",
            "ASPD/PP",
            "Antisocial Personality Disorder/Psychopathy",
        ),
        NewDisorder::new("BPD", "BPD", "Borderline Personality Disorder"),
        NewDisorder::new("GD/TI", "GD/TI", "Gender Dysphoria/Trans-Identity"),
    ]
}

/// A named symptom with its 0–10 severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomReading {
    pub name: String,
    pub severity: u8,
}

impl SymptomReading {
    pub fn new(name: impl Into<String>, severity: u8) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }
}

/// Structured payload stored in `LogEntry::content`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryContent {
    pub symptoms: Vec<SymptomReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fronting_alter_id: Option<i64>,
}

/// Loose shape used for decoding; individual symptom items are checked one by one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    #[serde(default)]
    symptoms: Vec<serde_json::Value>,
    #[serde(default)]
    fronting_alter_id: Option<i64>,
}

impl EntryContent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored payload. Symptom items without a string name or an integer
    /// severity in 0..=10 are dropped; a payload that is not a JSON object is an error.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let raw: RawContent = serde_json::from_str(raw)?;
        let symptoms = raw
            .symptoms
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?;
                let severity = item.get("severity")?.as_u64()?;
                if severity > u64::from(MAX_SEVERITY) {
                    return None;
                }
                Some(SymptomReading::new(name, severity as u8))
            })
            .collect();
        Ok(Self {
            symptoms,
            fronting_alter_id: raw.fronting_alter_id,
        })
    }
}

/// A single journal entry as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub disorder_id: Option<i64>,
    pub title: Option<String>,
    /// Raw structured payload. May be absent or malformed in legacy rows.
    pub content: Option<String>,
    pub mood: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<f64>,
}

impl LogEntry {
    /// Symptom readings carried by the payload. Missing or unparseable content yields none.
    pub fn symptoms(&self) -> Vec<SymptomReading> {
        self.parsed_content()
            .map(|c| c.symptoms)
            .unwrap_or_default()
    }

    pub fn parsed_content(&self) -> Option<EntryContent> {
        self.content
            .as_deref()
            .and_then(|raw| EntryContent::parse(raw).ok())
    }
}

/// Fields for creating or replacing an entry. `id` is assigned by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub timestamp: DateTime<Utc>,
    pub disorder_id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<f64>,
}

impl NewLogEntry {
    pub fn into_entry(self, id: i64) -> LogEntry {
        LogEntry {
            id,
            timestamp: self.timestamp,
            disorder_id: self.disorder_id,
            title: self.title,
            content: self.content,
            mood: self.mood,
            sleep_hours: self.sleep_hours,
            stress_level: self.stress_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: i64,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub prescribed_date: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMedication {
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub prescribed_date: NaiveDate,
    pub is_active: bool,
}

/// One adherence record: whether a dose was taken and how well it worked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLog {
    pub id: i64,
    pub medication_id: i64,
    pub timestamp: DateTime<Utc>,
    pub taken: bool,
    pub effectiveness: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicationLog {
    pub medication_id: i64,
    pub timestamp: DateTime<Utc>,
    pub taken: bool,
    pub effectiveness: Option<f64>,
    pub notes: Option<String>,
}

impl NewMedicationLog {
    pub fn into_log(self, id: i64) -> MedicationLog {
        MedicationLog {
            id,
            medication_id: self.medication_id,
            timestamp: self.timestamp,
            taken: self.taken,
            effectiveness: self.effectiveness,
            notes: self.notes,
        }
    }
}

/// A tracked identity state (DID tracking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alter {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub role: Option<String>,
    pub disorder_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlter {
    pub name: String,
    pub age: Option<i64>,
    pub role: Option<String>,
    pub disorder_id: Option<i64>,
}

/// A logged switch from one alter to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Switch {
    pub id: i64,
    pub from_alter_id: Option<i64>,
    pub to_alter_id: i64,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub disorder_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSwitch {
    pub from_alter_id: Option<i64>,
    pub to_alter_id: i64,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub disorder_id: Option<i64>,
}

/// A logged therapy appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapySession {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub therapist_name: String,
    pub notes: Option<String>,
    pub disorder_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTherapySession {
    pub timestamp: DateTime<Utc>,
    pub therapist_name: String,
    pub notes: Option<String>,
    pub disorder_id: i64,
}

impl NewTherapySession {
    pub fn into_session(self, id: i64) -> TherapySession {
        TherapySession {
            id,
            timestamp: self.timestamp,
            therapist_name: self.therapist_name,
            notes: self.notes,
            disorder_id: self.disorder_id,
        }
    }
}
