//! In-memory repository. Implements every repo port over ordered maps.
//!
//! One id counter is shared by all tables, so ids are unique across record kinds.
//! Nothing survives the process; used for tests and `storage = "memory"`.

use crate::domain::{
    Alter, Disorder, DomainError, LogEntry, Medication, MedicationLog, NewAlter, NewDisorder,
    NewLogEntry, NewMedication, NewMedicationLog, NewSwitch, NewTherapySession, Switch,
    TherapySession,
};
use crate::ports::{
    AlterRepoPort, DisorderRepoPort, EntryRepoPort, MedicationRepoPort, TherapyRepoPort,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct MemoryState {
    next_id: i64,
    disorders: BTreeMap<i64, Disorder>,
    entries: BTreeMap<i64, LogEntry>,
    medications: BTreeMap<i64, Medication>,
    medication_logs: BTreeMap<i64, MedicationLog>,
    alters: BTreeMap<i64, Alter>,
    switches: BTreeMap<i64, Switch>,
    therapy_sessions: BTreeMap<i64, TherapySession>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            next_id: 1,
            disorders: BTreeMap::new(),
            entries: BTreeMap::new(),
            medications: BTreeMap::new(),
            medication_logs: BTreeMap::new(),
            alters: BTreeMap::new(),
            switches: BTreeMap::new(),
            therapy_sessions: BTreeMap::new(),
        }
    }
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Map-backed store guarded by a single async RwLock.
#[derive(Debug, Default)]
pub struct MemoryRepo {
    state: RwLock<MemoryState>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort newest first, breaking timestamp ties by id (newer id first).
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Records with `start <= timestamp < end`, oldest first.
fn between<'a, T: Clone + 'a>(
    items: impl Iterator<Item = &'a T>,
    key: impl Fn(&T) -> (DateTime<Utc>, i64),
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<T> {
    let mut out: Vec<T> = items
        .filter(|item| {
            let (ts, _) = key(item);
            ts >= start && ts < end
        })
        .cloned()
        .collect();
    out.sort_by_key(|item| key(item));
    out
}

#[async_trait::async_trait]
impl DisorderRepoPort for MemoryRepo {
    async fn list_disorders(&self) -> Result<Vec<Disorder>, DomainError> {
        Ok(self.state.read().await.disorders.values().cloned().collect())
    }

    async fn get_disorder(&self, id: i64) -> Result<Option<Disorder>, DomainError> {
        Ok(self.state.read().await.disorders.get(&id).cloned())
    }

    async fn create_disorder(&self, disorder: &NewDisorder) -> Result<Disorder, DomainError> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = Disorder {
            id,
            name: disorder.name.clone(),
            acronym: disorder.acronym.clone(),
            full_name: disorder.full_name.clone(),
        };
        state.disorders.insert(id, created.clone());
        Ok(created)
    }
}

#[async_trait::async_trait]
impl EntryRepoPort for MemoryRepo {
    async fn create_entry(&self, entry: &NewLogEntry) -> Result<LogEntry, DomainError> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = entry.clone().into_entry(id);
        state.entries.insert(id, created.clone());
        Ok(created)
    }

    async fn get_entry(&self, id: i64) -> Result<Option<LogEntry>, DomainError> {
        Ok(self.state.read().await.entries.get(&id).cloned())
    }

    async fn list_entries(&self, limit: u32, offset: u32) -> Result<Vec<LogEntry>, DomainError> {
        let mut entries: Vec<LogEntry> =
            self.state.read().await.entries.values().cloned().collect();
        newest_first(&mut entries, |e| (e.timestamp, e.id));
        Ok(entries
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_entries_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, DomainError> {
        let mut entries: Vec<LogEntry> = self
            .state
            .read()
            .await
            .entries
            .values()
            .filter(|e| e.timestamp >= since)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.timestamp, e.id));
        Ok(entries)
    }

    async fn list_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, DomainError> {
        let state = self.state.read().await;
        Ok(between(
            state.entries.values(),
            |e| (e.timestamp, e.id),
            start,
            end,
        ))
    }

    async fn all_entries(&self) -> Result<Vec<LogEntry>, DomainError> {
        let mut entries: Vec<LogEntry> =
            self.state.read().await.entries.values().cloned().collect();
        entries.sort_by_key(|e| (e.timestamp, e.id));
        Ok(entries)
    }

    async fn update_entry(
        &self,
        id: i64,
        entry: &NewLogEntry,
    ) -> Result<Option<LogEntry>, DomainError> {
        let mut state = self.state.write().await;
        match state.entries.get_mut(&id) {
            Some(existing) => {
                *existing = entry.clone().into_entry(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_entry(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.state.write().await.entries.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl MedicationRepoPort for MemoryRepo {
    async fn create_medication(
        &self,
        medication: &NewMedication,
    ) -> Result<Medication, DomainError> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = Medication {
            id,
            name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            frequency: medication.frequency.clone(),
            prescribed_date: medication.prescribed_date,
            is_active: medication.is_active,
        };
        state.medications.insert(id, created.clone());
        Ok(created)
    }

    async fn list_medications(&self) -> Result<Vec<Medication>, DomainError> {
        let mut medications: Vec<Medication> =
            self.state.read().await.medications.values().cloned().collect();
        medications.sort_by(|a, b| {
            b.prescribed_date
                .cmp(&a.prescribed_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(medications)
    }

    async fn get_medication(&self, id: i64) -> Result<Option<Medication>, DomainError> {
        Ok(self.state.read().await.medications.get(&id).cloned())
    }

    async fn create_medication_log(
        &self,
        log: &NewMedicationLog,
    ) -> Result<MedicationLog, DomainError> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = log.clone().into_log(id);
        state.medication_logs.insert(id, created.clone());
        Ok(created)
    }

    async fn list_medication_logs(
        &self,
        medication_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<MedicationLog>, DomainError> {
        let mut logs: Vec<MedicationLog> = self
            .state
            .read()
            .await
            .medication_logs
            .values()
            .filter(|l| medication_id.is_none_or(|m| l.medication_id == m))
            .cloned()
            .collect();
        newest_first(&mut logs, |l| (l.timestamp, l.id));
        logs.truncate(limit as usize);
        Ok(logs)
    }

    async fn list_medication_logs_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MedicationLog>, DomainError> {
        let state = self.state.read().await;
        Ok(between(
            state.medication_logs.values(),
            |l| (l.timestamp, l.id),
            start,
            end,
        ))
    }

    async fn all_medication_logs(&self) -> Result<Vec<MedicationLog>, DomainError> {
        let mut logs: Vec<MedicationLog> = self
            .state
            .read()
            .await
            .medication_logs
            .values()
            .cloned()
            .collect();
        logs.sort_by_key(|l| (l.timestamp, l.id));
        Ok(logs)
    }
}

#[async_trait::async_trait]
impl AlterRepoPort for MemoryRepo {
    async fn create_alter(&self, alter: &NewAlter) -> Result<Alter, DomainError> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = Alter {
            id,
            name: alter.name.clone(),
            age: alter.age,
            role: alter.role.clone(),
            disorder_id: alter.disorder_id,
        };
        state.alters.insert(id, created.clone());
        Ok(created)
    }

    async fn list_alters(&self) -> Result<Vec<Alter>, DomainError> {
        Ok(self.state.read().await.alters.values().cloned().collect())
    }

    async fn get_alter(&self, id: i64) -> Result<Option<Alter>, DomainError> {
        Ok(self.state.read().await.alters.get(&id).cloned())
    }

    async fn create_switch(&self, switch: &NewSwitch) -> Result<Switch, DomainError> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = Switch {
            id,
            from_alter_id: switch.from_alter_id,
            to_alter_id: switch.to_alter_id,
            notes: switch.notes.clone(),
            timestamp: switch.timestamp,
            disorder_id: switch.disorder_id,
        };
        state.switches.insert(id, created.clone());
        Ok(created)
    }

    async fn list_switches(&self, limit: u32) -> Result<Vec<Switch>, DomainError> {
        let mut switches: Vec<Switch> =
            self.state.read().await.switches.values().cloned().collect();
        newest_first(&mut switches, |s| (s.timestamp, s.id));
        switches.truncate(limit as usize);
        Ok(switches)
    }

    async fn list_switches_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Switch>, DomainError> {
        let state = self.state.read().await;
        Ok(between(
            state.switches.values(),
            |s| (s.timestamp, s.id),
            start,
            end,
        ))
    }
}

#[async_trait::async_trait]
impl TherapyRepoPort for MemoryRepo {
    async fn create_therapy_session(
        &self,
        session: &NewTherapySession,
    ) -> Result<TherapySession, DomainError> {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let created = session.clone().into_session(id);
        state.therapy_sessions.insert(id, created.clone());
        Ok(created)
    }

    async fn get_therapy_session(&self, id: i64) -> Result<Option<TherapySession>, DomainError> {
        Ok(self.state.read().await.therapy_sessions.get(&id).cloned())
    }

    async fn list_therapy_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<TherapySession>, DomainError> {
        let mut sessions: Vec<TherapySession> = self
            .state
            .read()
            .await
            .therapy_sessions
            .values()
            .cloned()
            .collect();
        newest_first(&mut sessions, |s| (s.timestamp, s.id));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn list_therapy_sessions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TherapySession>, DomainError> {
        let state = self.state.read().await;
        Ok(between(
            state.therapy_sessions.values(),
            |s| (s.timestamp, s.id),
            start,
            end,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_entry(day: u32, title: &str) -> NewLogEntry {
        NewLogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            disorder_id: Some(1),
            title: Some(title.to_string()),
            content: None,
            mood: None,
            sleep_hours: None,
            stress_level: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_shared_across_tables() {
        let repo = MemoryRepo::new();
        let d = repo
            .create_disorder(&NewDisorder::new("BPD", "BPD", "Borderline"))
            .await
            .unwrap();
        let e = repo.create_entry(&new_entry(1, "first")).await.unwrap();
        assert_eq!(d.id, 1);
        assert_eq!(e.id, 2);
    }

    #[tokio::test]
    async fn test_entry_listing_order_and_window() {
        let repo = MemoryRepo::new();
        repo.create_entry(&new_entry(3, "b")).await.unwrap();
        repo.create_entry(&new_entry(1, "a")).await.unwrap();
        repo.create_entry(&new_entry(5, "c")).await.unwrap();

        let newest = repo.list_entries(2, 0).await.unwrap();
        let titles: Vec<_> = newest.iter().map(|e| e.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["c", "b"]);

        let page = repo.list_entries(10, 2).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title.as_deref(), Some("a"));

        let since = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        let recent = repo.list_entries_since(since).await.unwrap();
        let titles: Vec<_> = recent.iter().map(|e| e.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_between_is_half_open() {
        let repo = MemoryRepo::new();
        repo.create_entry(&new_entry(2, "before")).await.unwrap();
        repo.create_entry(&new_entry(4, "late")).await.unwrap();
        repo.create_entry(&new_entry(3, "inside")).await.unwrap();

        let start = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();
        let titles: Vec<_> = repo
            .list_entries_between(start, end)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title.unwrap())
            .collect();
        assert_eq!(titles, vec!["inside"]);

        let session = repo
            .create_therapy_session(&NewTherapySession {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 3, 15, 0, 0).unwrap(),
                therapist_name: "Dr. Ames".to_string(),
                notes: None,
                disorder_id: 1,
            })
            .await
            .unwrap();
        assert_eq!(
            repo.list_therapy_sessions_between(start, end).await.unwrap(),
            vec![session.clone()]
        );
        assert_eq!(repo.get_therapy_session(session.id).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_update_and_delete_entry() {
        let repo = MemoryRepo::new();
        let created = repo.create_entry(&new_entry(1, "draft")).await.unwrap();

        let updated = repo
            .update_entry(created.id, &new_entry(2, "final"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title.as_deref(), Some("final"));
        assert!(repo.update_entry(999, &new_entry(2, "x")).await.unwrap().is_none());

        assert!(repo.delete_entry(created.id).await.unwrap());
        assert!(!repo.delete_entry(created.id).await.unwrap());
        assert!(repo.get_entry(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_medication_logs_filter() {
        let repo = MemoryRepo::new();
        for (med, taken) in [(10, true), (11, false), (10, false)] {
            repo.create_medication_log(&NewMedicationLog {
                medication_id: med,
                timestamp: Utc::now(),
                taken,
                effectiveness: None,
                notes: None,
            })
            .await
            .unwrap();
        }
        assert_eq!(repo.list_medication_logs(Some(10), 50).await.unwrap().len(), 2);
        assert_eq!(repo.list_medication_logs(None, 2).await.unwrap().len(), 2);
        assert_eq!(repo.all_medication_logs().await.unwrap().len(), 3);
    }
}
