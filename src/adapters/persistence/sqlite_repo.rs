//! SQLite-backed repository via libsql. Implements every repo port against one database file.
//!
//! All tables live in data/psytrack.db. Timestamps are stored as RFC 3339 UTC text with
//! millisecond precision so that string comparison orders them chronologically.
//! Rows whose timestamps no longer parse are skipped with a warning instead of failing the read.

use crate::domain::{
    Alter, Disorder, DomainError, LogEntry, Medication, MedicationLog, NewAlter, NewDisorder,
    NewLogEntry, NewMedication, NewMedicationLog, NewSwitch, NewTherapySession, Switch,
    TherapySession,
};
use crate::ports::{
    AlterRepoPort, DisorderRepoPort, EntryRepoPort, MedicationRepoPort, TherapyRepoPort,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use libsql::params::IntoParams;
use libsql::{params, Connection, Database, Row};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DISORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS disorders (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    acronym TEXT NOT NULL,
    full_name TEXT NOT NULL
)"#;

const ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY,
    title TEXT,
    content TEXT,
    date TEXT NOT NULL,
    disorder_id INTEGER REFERENCES disorders (id),
    mood REAL,
    sleep_hours REAL,
    stress_level REAL
)"#;
const ENTRIES_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_entries_date ON entries (date DESC)";

const MEDICATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    dosage TEXT,
    frequency TEXT,
    prescribed_date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
)"#;

const MEDICATION_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS medication_logs (
    id INTEGER PRIMARY KEY,
    medication_id INTEGER NOT NULL REFERENCES medications (id),
    date TEXT NOT NULL,
    taken INTEGER NOT NULL,
    effectiveness REAL,
    notes TEXT
)"#;
const MEDICATION_LOGS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_medication_logs_med_date ON medication_logs (medication_id, date DESC)";

const ALTERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS alters (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER,
    role TEXT,
    disorder_id INTEGER REFERENCES disorders (id)
)"#;

const SWITCHES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS switches (
    id INTEGER PRIMARY KEY,
    from_alter_id INTEGER REFERENCES alters (id),
    to_alter_id INTEGER NOT NULL REFERENCES alters (id),
    notes TEXT,
    date TEXT NOT NULL,
    disorder_id INTEGER REFERENCES disorders (id)
)"#;

const THERAPY_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS therapy_sessions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    therapist_name TEXT NOT NULL,
    notes TEXT,
    disorder_id INTEGER NOT NULL REFERENCES disorders (id)
)"#;

const ENTRY_COLUMNS: &str =
    "id, date, disorder_id, title, content, mood, sleep_hours, stress_level";
const MEDICATION_COLUMNS: &str = "id, name, dosage, frequency, prescribed_date, is_active";
const MEDICATION_LOG_COLUMNS: &str = "id, medication_id, date, taken, effectiveness, notes";
const SWITCH_COLUMNS: &str = "id, from_alter_id, to_alter_id, notes, date, disorder_id";
const THERAPY_COLUMNS: &str = "id, date, therapist_name, notes, disorder_id";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

/// Timestamps are stored with millisecond precision; records returned from writes carry
/// the same truncated value that a later read yields.
fn stored_ts(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

fn ts_to_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn text_to_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decoder for one row. `Ok(None)` means the row is malformed and should be skipped.
type Decode<T> = fn(&Row) -> Result<Option<T>, DomainError>;

fn decode_disorder(row: &Row) -> Result<Option<Disorder>, DomainError> {
    Ok(Some(Disorder {
        id: row.get(0).map_err(repo_err)?,
        name: row.get::<String>(1).map_err(repo_err)?,
        acronym: row.get::<String>(2).map_err(repo_err)?,
        full_name: row.get::<String>(3).map_err(repo_err)?,
    }))
}

fn decode_entry(row: &Row) -> Result<Option<LogEntry>, DomainError> {
    let id: i64 = row.get(0).map_err(repo_err)?;
    let date: String = row.get(1).map_err(repo_err)?;
    let Some(timestamp) = text_to_ts(&date) else {
        warn!(id, date = %date, "skipping entry with unparseable date");
        return Ok(None);
    };
    Ok(Some(LogEntry {
        id,
        timestamp,
        disorder_id: row.get::<i64>(2).ok(),
        title: row.get::<String>(3).ok(),
        content: row.get::<String>(4).ok(),
        mood: row.get::<f64>(5).ok(),
        sleep_hours: row.get::<f64>(6).ok(),
        stress_level: row.get::<f64>(7).ok(),
    }))
}

fn decode_medication(row: &Row) -> Result<Option<Medication>, DomainError> {
    let id: i64 = row.get(0).map_err(repo_err)?;
    let prescribed: String = row.get(4).map_err(repo_err)?;
    let Ok(prescribed_date) = NaiveDate::parse_from_str(&prescribed, "%Y-%m-%d") else {
        warn!(id, prescribed = %prescribed, "skipping medication with unparseable date");
        return Ok(None);
    };
    Ok(Some(Medication {
        id,
        name: row.get::<String>(1).map_err(repo_err)?,
        dosage: row.get::<String>(2).ok(),
        frequency: row.get::<String>(3).ok(),
        prescribed_date,
        is_active: row.get::<i64>(5).map_err(repo_err)? != 0,
    }))
}

fn decode_medication_log(row: &Row) -> Result<Option<MedicationLog>, DomainError> {
    let id: i64 = row.get(0).map_err(repo_err)?;
    let date: String = row.get(2).map_err(repo_err)?;
    let Some(timestamp) = text_to_ts(&date) else {
        warn!(id, date = %date, "skipping medication log with unparseable date");
        return Ok(None);
    };
    Ok(Some(MedicationLog {
        id,
        medication_id: row.get(1).map_err(repo_err)?,
        timestamp,
        taken: row.get::<i64>(3).map_err(repo_err)? != 0,
        effectiveness: row.get::<f64>(4).ok(),
        notes: row.get::<String>(5).ok(),
    }))
}

fn decode_alter(row: &Row) -> Result<Option<Alter>, DomainError> {
    Ok(Some(Alter {
        id: row.get(0).map_err(repo_err)?,
        name: row.get::<String>(1).map_err(repo_err)?,
        age: row.get::<i64>(2).ok(),
        role: row.get::<String>(3).ok(),
        disorder_id: row.get::<i64>(4).ok(),
    }))
}

fn decode_switch(row: &Row) -> Result<Option<Switch>, DomainError> {
    let id: i64 = row.get(0).map_err(repo_err)?;
    let date: String = row.get(4).map_err(repo_err)?;
    let Some(timestamp) = text_to_ts(&date) else {
        warn!(id, date = %date, "skipping switch with unparseable date");
        return Ok(None);
    };
    Ok(Some(Switch {
        id,
        from_alter_id: row.get::<i64>(1).ok(),
        to_alter_id: row.get(2).map_err(repo_err)?,
        notes: row.get::<String>(3).ok(),
        timestamp,
        disorder_id: row.get::<i64>(5).ok(),
    }))
}

fn decode_therapy_session(row: &Row) -> Result<Option<TherapySession>, DomainError> {
    let id: i64 = row.get(0).map_err(repo_err)?;
    let date: String = row.get(1).map_err(repo_err)?;
    let Some(timestamp) = text_to_ts(&date) else {
        warn!(id, date = %date, "skipping therapy session with unparseable date");
        return Ok(None);
    };
    Ok(Some(TherapySession {
        id,
        timestamp,
        therapist_name: row.get::<String>(2).map_err(repo_err)?,
        notes: row.get::<String>(3).ok(),
        disorder_id: row.get(4).map_err(repo_err)?,
    }))
}

/// SQLite repository. One database file (psytrack.db) in the given base directory.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("psytrack.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Repo(format!("WAL pragma failed: {}", e)))?;
        while wal_rows.next().await.map_err(repo_err)?.is_some() {}

        for ddl in [
            DISORDERS_TABLE,
            ENTRIES_TABLE,
            ENTRIES_INDEX,
            MEDICATIONS_TABLE,
            MEDICATION_LOGS_TABLE,
            MEDICATION_LOGS_INDEX,
            ALTERS_TABLE,
            SWITCHES_TABLE,
            THERAPY_SESSIONS_TABLE,
        ] {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    async fn query_all<T>(
        &self,
        sql: &str,
        params: impl IntoParams,
        decode: Decode<T>,
    ) -> Result<Vec<T>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn.query(sql, params).await.map_err(repo_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            if let Some(item) = decode(&row)? {
                out.push(item);
            }
        }
        Ok(out)
    }

    async fn query_one<T>(
        &self,
        sql: &str,
        params: impl IntoParams,
        decode: Decode<T>,
    ) -> Result<Option<T>, DomainError> {
        Ok(self.query_all(sql, params, decode).await?.into_iter().next())
    }

    /// Run an INSERT and return the new rowid.
    async fn insert(&self, sql: &str, params: impl IntoParams) -> Result<i64, DomainError> {
        let conn = self.conn()?;
        conn.execute(sql, params).await.map_err(repo_err)?;
        Ok(conn.last_insert_rowid())
    }
}

#[async_trait::async_trait]
impl DisorderRepoPort for SqliteRepo {
    async fn list_disorders(&self) -> Result<Vec<Disorder>, DomainError> {
        self.query_all(
            "SELECT id, name, acronym, full_name FROM disorders ORDER BY id",
            (),
            decode_disorder,
        )
        .await
    }

    async fn get_disorder(&self, id: i64) -> Result<Option<Disorder>, DomainError> {
        self.query_one(
            "SELECT id, name, acronym, full_name FROM disorders WHERE id = ?1",
            params![id],
            decode_disorder,
        )
        .await
    }

    async fn create_disorder(&self, disorder: &NewDisorder) -> Result<Disorder, DomainError> {
        let id = self
            .insert(
                "INSERT INTO disorders (name, acronym, full_name) VALUES (?1, ?2, ?3)",
                params![
                    disorder.name.as_str(),
                    disorder.acronym.as_str(),
                    disorder.full_name.as_str()
                ],
            )
            .await?;
        Ok(Disorder {
            id,
            name: disorder.name.clone(),
            acronym: disorder.acronym.clone(),
            full_name: disorder.full_name.clone(),
        })
    }
}

#[async_trait::async_trait]
impl EntryRepoPort for SqliteRepo {
    async fn create_entry(&self, entry: &NewLogEntry) -> Result<LogEntry, DomainError> {
        let entry = NewLogEntry {
            timestamp: stored_ts(entry.timestamp),
            ..entry.clone()
        };
        let id = self
            .insert(
                r#"
                INSERT INTO entries (date, disorder_id, title, content, mood, sleep_hours, stress_level)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    ts_to_text(&entry.timestamp),
                    entry.disorder_id,
                    entry.title.clone(),
                    entry.content.clone(),
                    entry.mood,
                    entry.sleep_hours,
                    entry.stress_level
                ],
            )
            .await?;
        info!(id, disorder_id = ?entry.disorder_id, "entry saved");
        Ok(entry.into_entry(id))
    }

    async fn get_entry(&self, id: i64) -> Result<Option<LogEntry>, DomainError> {
        let sql = format!("SELECT {} FROM entries WHERE id = ?1", ENTRY_COLUMNS);
        self.query_one(&sql, params![id], decode_entry).await
    }

    async fn list_entries(&self, limit: u32, offset: u32) -> Result<Vec<LogEntry>, DomainError> {
        let sql = format!(
            "SELECT {} FROM entries ORDER BY date DESC, id DESC LIMIT ?1 OFFSET ?2",
            ENTRY_COLUMNS
        );
        self.query_all(&sql, params![limit as i64, offset as i64], decode_entry)
            .await
    }

    async fn list_entries_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, DomainError> {
        let sql = format!(
            "SELECT {} FROM entries WHERE date >= ?1 ORDER BY date, id",
            ENTRY_COLUMNS
        );
        self.query_all(&sql, params![ts_to_text(&since)], decode_entry)
            .await
    }

    async fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, DomainError> {
        let sql = format!(
            "SELECT {} FROM entries WHERE date >= ?1 AND date < ?2 ORDER BY date, id",
            ENTRY_COLUMNS
        );
        self.query_all(
            &sql,
            params![ts_to_text(&start), ts_to_text(&end)],
            decode_entry,
        )
        .await
    }

    async fn all_entries(&self) -> Result<Vec<LogEntry>, DomainError> {
        let sql = format!("SELECT {} FROM entries ORDER BY date, id", ENTRY_COLUMNS);
        self.query_all(&sql, (), decode_entry).await
    }

    async fn update_entry(
        &self,
        id: i64,
        entry: &NewLogEntry,
    ) -> Result<Option<LogEntry>, DomainError> {
        let entry = NewLogEntry {
            timestamp: stored_ts(entry.timestamp),
            ..entry.clone()
        };
        let conn = self.conn()?;
        let changed = conn
            .execute(
                r#"
                UPDATE entries
                SET date = ?1, disorder_id = ?2, title = ?3, content = ?4,
                    mood = ?5, sleep_hours = ?6, stress_level = ?7
                WHERE id = ?8
                "#,
                params![
                    ts_to_text(&entry.timestamp),
                    entry.disorder_id,
                    entry.title.clone(),
                    entry.content.clone(),
                    entry.mood,
                    entry.sleep_hours,
                    entry.stress_level,
                    id
                ],
            )
            .await
            .map_err(repo_err)?;
        Ok((changed > 0).then(|| entry.into_entry(id)))
    }

    async fn delete_entry(&self, id: i64) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])
            .await
            .map_err(repo_err)?;
        Ok(removed > 0)
    }
}

#[async_trait::async_trait]
impl MedicationRepoPort for SqliteRepo {
    async fn create_medication(
        &self,
        medication: &NewMedication,
    ) -> Result<Medication, DomainError> {
        let id = self
            .insert(
                r#"
                INSERT INTO medications (name, dosage, frequency, prescribed_date, is_active)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    medication.name.as_str(),
                    medication.dosage.clone(),
                    medication.frequency.clone(),
                    medication.prescribed_date.format("%Y-%m-%d").to_string(),
                    i64::from(medication.is_active)
                ],
            )
            .await?;
        Ok(Medication {
            id,
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            frequency: medication.frequency.clone(),
            prescribed_date: medication.prescribed_date,
            is_active: medication.is_active,
        })
    }

    async fn list_medications(&self) -> Result<Vec<Medication>, DomainError> {
        let sql = format!(
            "SELECT {} FROM medications ORDER BY prescribed_date DESC, id DESC",
            MEDICATION_COLUMNS
        );
        self.query_all(&sql, (), decode_medication).await
    }

    async fn get_medication(&self, id: i64) -> Result<Option<Medication>, DomainError> {
        let sql = format!("SELECT {} FROM medications WHERE id = ?1", MEDICATION_COLUMNS);
        self.query_one(&sql, params![id], decode_medication).await
    }

    async fn create_medication_log(
        &self,
        log: &NewMedicationLog,
    ) -> Result<MedicationLog, DomainError> {
        let log = NewMedicationLog {
            timestamp: stored_ts(log.timestamp),
            ..log.clone()
        };
        let id = self
            .insert(
                r#"
                INSERT INTO medication_logs (medication_id, date, taken, effectiveness, notes)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    log.medication_id,
                    ts_to_text(&log.timestamp),
                    i64::from(log.taken),
                    log.effectiveness,
                    log.notes.clone()
                ],
            )
            .await?;
        info!(id, medication_id = log.medication_id, taken = log.taken, "medication log saved");
        Ok(log.into_log(id))
    }

    async fn list_medication_logs(
        &self,
        medication_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<MedicationLog>, DomainError> {
        match medication_id {
            Some(medication_id) => {
                let sql = format!(
                    "SELECT {} FROM medication_logs WHERE medication_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2",
                    MEDICATION_LOG_COLUMNS
                );
                self.query_all(
                    &sql,
                    params![medication_id, limit as i64],
                    decode_medication_log,
                )
                .await
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM medication_logs ORDER BY date DESC, id DESC LIMIT ?1",
                    MEDICATION_LOG_COLUMNS
                );
                self.query_all(&sql, params![limit as i64], decode_medication_log)
                    .await
            }
        }
    }

    async fn list_medication_logs_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MedicationLog>, DomainError> {
        let sql = format!(
            "SELECT {} FROM medication_logs WHERE date >= ?1 AND date < ?2 ORDER BY date, id",
            MEDICATION_LOG_COLUMNS
        );
        self.query_all(
            &sql,
            params![ts_to_text(&start), ts_to_text(&end)],
            decode_medication_log,
        )
        .await
    }

    async fn all_medication_logs(&self) -> Result<Vec<MedicationLog>, DomainError> {
        let sql = format!(
            "SELECT {} FROM medication_logs ORDER BY date, id",
            MEDICATION_LOG_COLUMNS
        );
        self.query_all(&sql, (), decode_medication_log).await
    }
}

#[async_trait::async_trait]
impl AlterRepoPort for SqliteRepo {
    async fn create_alter(&self, alter: &NewAlter) -> Result<Alter, DomainError> {
        let id = self
            .insert(
                "INSERT INTO alters (name, age, role, disorder_id) VALUES (?1, ?2, ?3, ?4)",
                params![
                    alter.name.as_str(),
                    alter.age,
                    alter.role.clone(),
                    alter.disorder_id
                ],
            )
            .await?;
        Ok(Alter {
            id,
            name: alter.name.clone(),
            age: alter.age,
            role: alter.role.clone(),
            disorder_id: alter.disorder_id,
        })
    }

    async fn list_alters(&self) -> Result<Vec<Alter>, DomainError> {
        self.query_all(
            "SELECT id, name, age, role, disorder_id FROM alters ORDER BY id",
            (),
            decode_alter,
        )
        .await
    }

    async fn get_alter(&self, id: i64) -> Result<Option<Alter>, DomainError> {
        self.query_one(
            "SELECT id, name, age, role, disorder_id FROM alters WHERE id = ?1",
            params![id],
            decode_alter,
        )
        .await
    }

    async fn create_switch(&self, switch: &NewSwitch) -> Result<Switch, DomainError> {
        let timestamp = stored_ts(switch.timestamp);
        let id = self
            .insert(
                r#"
                INSERT INTO switches (from_alter_id, to_alter_id, notes, date, disorder_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    switch.from_alter_id,
                    switch.to_alter_id,
                    switch.notes.clone(),
                    ts_to_text(&timestamp),
                    switch.disorder_id
                ],
            )
            .await?;
        Ok(Switch {
            id,
            from_alter_id: switch.from_alter_id,
            to_alter_id: switch.to_alter_id,
            notes: switch.notes.clone(),
            timestamp,
            disorder_id: switch.disorder_id,
        })
    }

    async fn list_switches(&self, limit: u32) -> Result<Vec<Switch>, DomainError> {
        let sql = format!(
            "SELECT {} FROM switches ORDER BY date DESC, id DESC LIMIT ?1",
            SWITCH_COLUMNS
        );
        self.query_all(&sql, params![limit as i64], decode_switch)
            .await
    }

    async fn list_switches_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Switch>, DomainError> {
        let sql = format!(
            "SELECT {} FROM switches WHERE date >= ?1 AND date < ?2 ORDER BY date, id",
            SWITCH_COLUMNS
        );
        self.query_all(
            &sql,
            params![ts_to_text(&start), ts_to_text(&end)],
            decode_switch,
        )
        .await
    }
}

#[async_trait::async_trait]
impl TherapyRepoPort for SqliteRepo {
    async fn create_therapy_session(
        &self,
        session: &NewTherapySession,
    ) -> Result<TherapySession, DomainError> {
        let session = NewTherapySession {
            timestamp: stored_ts(session.timestamp),
            ..session.clone()
        };
        let id = self
            .insert(
                r#"
                INSERT INTO therapy_sessions (date, therapist_name, notes, disorder_id)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    ts_to_text(&session.timestamp),
                    session.therapist_name.as_str(),
                    session.notes.clone(),
                    session.disorder_id
                ],
            )
            .await?;
        info!(id, disorder_id = session.disorder_id, "therapy session saved");
        Ok(session.into_session(id))
    }

    async fn get_therapy_session(&self, id: i64) -> Result<Option<TherapySession>, DomainError> {
        let sql = format!("SELECT {} FROM therapy_sessions WHERE id = ?1", THERAPY_COLUMNS);
        self.query_one(&sql, params![id], decode_therapy_session).await
    }

    async fn list_therapy_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<TherapySession>, DomainError> {
        let sql = format!(
            "SELECT {} FROM therapy_sessions ORDER BY date DESC, id DESC LIMIT ?1",
            THERAPY_COLUMNS
        );
        self.query_all(&sql, params![limit as i64], decode_therapy_session)
            .await
    }

    async fn list_therapy_sessions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TherapySession>, DomainError> {
        let sql = format!(
            "SELECT {} FROM therapy_sessions WHERE date >= ?1 AND date < ?2 ORDER BY date, id",
            THERAPY_COLUMNS
        );
        self.query_all(
            &sql,
            params![ts_to_text(&start), ts_to_text(&end)],
            decode_therapy_session,
        )
        .await
    }
}
