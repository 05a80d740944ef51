//! Analytics service. Fetches a snapshot from the repositories and runs the aggregator over it.
//!
//! Also renders the exported report (a Markdown digest plus CSV files in the reports directory)
//! and the plain-text log of a single day.

use crate::adapters::export::{trends_to_csv, weekly_to_csv};
use crate::domain::analytics::{self, AdvancedAnalytics, MAX_TIMESPAN_DAYS, Summary, SymptomTrend};
use crate::domain::{
    Alter, Calendar, DomainError, LogEntry, Medication, MedicationLog, Switch, TherapySession,
};
use crate::ports::{
    AlterRepoPort, DisorderRepoPort, EntryRepoPort, MedicationRepoPort, TherapyRepoPort,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Files produced by one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub trends_csv: PathBuf,
    pub weekly_csv: PathBuf,
}

/// Service for dashboard analytics and report export.
pub struct AnalyticsService {
    disorders: Arc<dyn DisorderRepoPort>,
    entries: Arc<dyn EntryRepoPort>,
    medications: Arc<dyn MedicationRepoPort>,
    alters: Arc<dyn AlterRepoPort>,
    therapy: Arc<dyn TherapyRepoPort>,
    reports_dir: PathBuf,
    default_timespan: NonZeroU32,
}

/// Everything logged during one local day, oldest first.
struct DayRecords {
    entries: Vec<LogEntry>,
    switches: Vec<Switch>,
    medication_logs: Vec<MedicationLog>,
    therapy_sessions: Vec<TherapySession>,
    alters: Vec<Alter>,
    medications: Vec<Medication>,
}

impl AnalyticsService {
    /// # Arguments
    /// * `reports_dir` - Directory exported reports are written to (created on demand)
    /// * `default_timespan` - Trend window used when the caller passes none
    pub fn new(
        disorders: Arc<dyn DisorderRepoPort>,
        entries: Arc<dyn EntryRepoPort>,
        medications: Arc<dyn MedicationRepoPort>,
        alters: Arc<dyn AlterRepoPort>,
        therapy: Arc<dyn TherapyRepoPort>,
        reports_dir: PathBuf,
        default_timespan: NonZeroU32,
    ) -> Self {
        Self {
            disorders,
            entries,
            medications,
            alters,
            therapy,
            reports_dir,
            default_timespan,
        }
    }

    pub fn default_timespan(&self) -> NonZeroU32 {
        self.default_timespan
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    fn resolve_timespan(&self, requested: Option<u32>) -> Result<NonZeroU32, DomainError> {
        match requested {
            None => Ok(self.default_timespan),
            Some(days) if days > MAX_TIMESPAN_DAYS => Err(DomainError::Validation(format!(
                "timespan must be at most {} days, got {}",
                MAX_TIMESPAN_DAYS, days
            ))),
            Some(days) => NonZeroU32::new(days).ok_or_else(|| {
                DomainError::Validation("timespan must be at least one day".to_string())
            }),
        }
    }

    pub async fn symptom_trends(&self, timespan: Option<u32>) -> Result<Vec<SymptomTrend>, DomainError> {
        self.symptom_trends_at(timespan, &Calendar::now_local()).await
    }

    /// Same as [`Self::symptom_trends`] against an explicit calendar.
    pub async fn symptom_trends_at<Tz: TimeZone>(
        &self,
        timespan: Option<u32>,
        calendar: &Calendar<Tz>,
    ) -> Result<Vec<SymptomTrend>, DomainError> {
        let timespan = self.resolve_timespan(timespan)?;
        let since = calendar.start_of_day_utc(calendar.window_start(timespan));
        let entries = self.entries.list_entries_since(since).await?;
        let disorders = self.disorders.list_disorders().await?;
        Ok(analytics::symptom_trends(&entries, &disorders, timespan, calendar))
    }

    pub async fn summary(&self) -> Result<Summary, DomainError> {
        self.summary_at(&Calendar::now_local()).await
    }

    pub async fn summary_at<Tz: TimeZone>(
        &self,
        calendar: &Calendar<Tz>,
    ) -> Result<Summary, DomainError> {
        let entries = self.entries.all_entries().await?;
        let disorders = self.disorders.list_disorders().await?;
        Ok(analytics::summary(&entries, &disorders, calendar))
    }

    pub async fn advanced(&self) -> Result<AdvancedAnalytics, DomainError> {
        self.advanced_at(&Calendar::now_local()).await
    }

    pub async fn advanced_at<Tz: TimeZone>(
        &self,
        calendar: &Calendar<Tz>,
    ) -> Result<AdvancedAnalytics, DomainError> {
        let entries = self.entries.all_entries().await?;
        let logs = self.medications.all_medication_logs().await?;
        Ok(analytics::advanced_analytics(&entries, &logs, calendar))
    }

    pub async fn export_report(&self, timespan: Option<u32>) -> Result<ReportPaths, DomainError> {
        self.export_report_at(timespan, &Calendar::now_local()).await
    }

    /// Write `report_<date>.md`, `trends_<date>.csv` and `weekly_<date>.csv`.
    /// Re-exporting on the same day overwrites the previous files.
    pub async fn export_report_at<Tz: TimeZone>(
        &self,
        timespan: Option<u32>,
        calendar: &Calendar<Tz>,
    ) -> Result<ReportPaths, DomainError> {
        let timespan = self.resolve_timespan(timespan)?;
        fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to create reports dir: {}", e)))?;

        let trends = self.symptom_trends_at(Some(timespan.get()), calendar).await?;
        let summary = self.summary_at(calendar).await?;
        let advanced = self.advanced_at(calendar).await?;
        let medications = self.medications.list_medications().await?;

        let date = calendar.today().format("%Y-%m-%d").to_string();
        let paths = ReportPaths {
            markdown: self.reports_dir.join(format!("report_{}.md", date)),
            trends_csv: self.reports_dir.join(format!("trends_{}.csv", date)),
            weekly_csv: self.reports_dir.join(format!("weekly_{}.csv", date)),
        };

        let md = render_markdown(&date, timespan, &summary, &trends, &advanced, &medications);
        write_file(&paths.markdown, md).await?;

        let trends_csv = trends_to_csv(&trends)
            .map_err(|e| DomainError::Export(format!("Failed to generate CSV: {}", e)))?;
        write_file(&paths.trends_csv, trends_csv).await?;

        let weekly_csv = weekly_to_csv(&advanced.weekly_trends)
            .map_err(|e| DomainError::Export(format!("Failed to generate CSV: {}", e)))?;
        write_file(&paths.weekly_csv, weekly_csv).await?;

        info!(
            path = %paths.markdown.display(),
            timespan_days = timespan.get(),
            disorders = trends.len(),
            "report exported"
        );
        Ok(paths)
    }

    pub async fn daily_log(&self, date: NaiveDate) -> Result<String, DomainError> {
        self.daily_log_at(date, &Calendar::now_local()).await
    }

    /// Plain-text log of the entries, switches, doses and therapy sessions of one local day.
    pub async fn daily_log_at<Tz: TimeZone>(
        &self,
        date: NaiveDate,
        calendar: &Calendar<Tz>,
    ) -> Result<String, DomainError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| DomainError::Validation(format!("date out of range: {}", date)))?;
        let (start, end) = (calendar.start_of_day_utc(date), calendar.start_of_day_utc(next));

        let day = DayRecords {
            entries: self.entries.list_entries_between(start, end).await?,
            switches: self.alters.list_switches_between(start, end).await?,
            medication_logs: self.medications.list_medication_logs_between(start, end).await?,
            therapy_sessions: self.therapy.list_therapy_sessions_between(start, end).await?,
            alters: self.alters.list_alters().await?,
            medications: self.medications.list_medications().await?,
        };
        info!(
            date = %date,
            entries = day.entries.len(),
            switches = day.switches.len(),
            "daily log built"
        );
        Ok(render_daily_log(date, &day, calendar))
    }
}

async fn write_file(path: &Path, contents: String) -> Result<(), DomainError> {
    fs::write(path, contents)
        .await
        .map_err(|e| DomainError::Export(format!("Failed to write {}: {}", path.display(), e)))
}

fn clock<Tz: TimeZone>(calendar: &Calendar<Tz>, ts: &DateTime<Utc>) -> String {
    calendar.local(ts).time().format("%H:%M").to_string()
}

fn render_daily_log<Tz: TimeZone>(
    date: NaiveDate,
    day: &DayRecords,
    calendar: &Calendar<Tz>,
) -> String {
    let alter_name = |id: Option<i64>| {
        day.alters
            .iter()
            .find(|a| Some(a.id) == id)
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown")
    };
    let mut out = String::new();

    out.push_str(&format!("PsyTrack Daily Log for {}\n", date.format("%Y-%m-%d")));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format!("--- Journal Entries ({}) ---\n", day.entries.len()));
    if day.entries.is_empty() {
        out.push_str("No journal entries logged.\n");
    }
    for entry in &day.entries {
        out.push_str(&format!(
            "[{}] {}\n",
            clock(calendar, &entry.timestamp),
            entry.title.as_deref().unwrap_or("Untitled")
        ));
        match (entry.parsed_content(), entry.content.as_deref()) {
            (Some(content), _) => {
                out.push_str(&format!(
                    "  Fronting Alter: {}\n",
                    alter_name(content.fronting_alter_id)
                ));
                if !content.symptoms.is_empty() {
                    out.push_str("  Symptoms Logged:\n");
                    for s in &content.symptoms {
                        out.push_str(&format!("    - {} (Severity: {}/10)\n", s.name, s.severity));
                    }
                }
            }
            (None, Some(raw)) => out.push_str(&format!("  Content: {}\n", raw)),
            (None, None) => {}
        }
    }
    out.push('\n');

    out.push_str(&format!("--- Alter Switches ({}) ---\n", day.switches.len()));
    if day.switches.is_empty() {
        out.push_str("No switches logged.\n");
    }
    for switch in &day.switches {
        out.push_str(&format!(
            "[{}] Switch: {} -> {}\n",
            clock(calendar, &switch.timestamp),
            alter_name(switch.from_alter_id),
            alter_name(Some(switch.to_alter_id))
        ));
        if let Some(notes) = &switch.notes {
            out.push_str(&format!("  Notes: {}\n", notes));
        }
    }
    out.push('\n');

    out.push_str(&format!("--- Medication Logs ({}) ---\n", day.medication_logs.len()));
    if day.medication_logs.is_empty() {
        out.push_str("No medications logged.\n");
    }
    for log in &day.medication_logs {
        let name = day
            .medications
            .iter()
            .find(|m| m.id == log.medication_id)
            .map(|m| m.name.as_str())
            .unwrap_or("Unknown Medication");
        let dose = match (log.taken, log.effectiveness) {
            (true, Some(rating)) => format!("taken, effectiveness {}/10", rating),
            (true, None) => "taken".to_string(),
            (false, _) => "skipped".to_string(),
        };
        out.push_str(&format!("[{}] {} - {}\n", clock(calendar, &log.timestamp), name, dose));
        if let Some(notes) = &log.notes {
            out.push_str(&format!("  Notes: {}\n", notes));
        }
    }
    out.push('\n');

    out.push_str(&format!("--- Therapy Sessions ({}) ---\n", day.therapy_sessions.len()));
    if day.therapy_sessions.is_empty() {
        out.push_str("No therapy sessions logged.\n");
    }
    for session in &day.therapy_sessions {
        out.push_str(&format!(
            "[{}] Therapist: {}\n",
            clock(calendar, &session.timestamp),
            session.therapist_name
        ));
        if let Some(notes) = &session.notes {
            out.push_str(&format!("  Notes: {}\n", notes));
        }
    }
    out
}

fn render_markdown(
    date: &str,
    timespan: NonZeroU32,
    summary: &Summary,
    trends: &[SymptomTrend],
    advanced: &AdvancedAnalytics,
    medications: &[Medication],
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Psytrack Report: {}\n\n", date));
    md.push_str(&format!(
        "**Entries:** {} | **Today:** {} | **Streak:** {} day(s)\n\n",
        summary.total_entries, summary.today_entries, summary.consecutive_days
    ));
    md.push_str("---\n\n");

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Average severity: {:.1}\n", summary.avg_severity));
    md.push_str(&format!(
        "- Most active disorder: {}\n\n",
        summary.most_active_disorder.as_deref().unwrap_or("none")
    ));

    md.push_str(&format!("## Symptoms (last {} days)\n\n", timespan));
    for trend in trends {
        if trend.datasets.is_empty() {
            continue;
        }
        md.push_str(&format!("### {}\n\n", trend.disorder_name));
        for dataset in &trend.datasets {
            let logged: Vec<u8> = dataset.data.iter().copied().filter(|s| *s > 0).collect();
            let peak = logged.iter().max().copied().unwrap_or(0);
            md.push_str(&format!(
                "- **{}**: peak {}, {} day(s) above zero\n",
                dataset.label,
                peak,
                logged.len()
            ));
        }
        md.push('\n');
    }

    if !advanced.weekly_trends.is_empty() {
        md.push_str("## Weekly Trends\n\n");
        md.push_str("| Week | Avg severity | Avg mood | Entries |\n");
        md.push_str("|------|--------------|----------|---------|\n");
        for week in &advanced.weekly_trends {
            let mood = week
                .avg_mood
                .map(|m| format!("{:.2}", m))
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| {} | {:.2} | {} | {} |\n",
                week.week, week.avg_severity, mood, week.entry_count
            ));
        }
        md.push('\n');
    }

    if !advanced.correlations.is_empty() {
        md.push_str("## Correlations\n\n");
        for c in &advanced.correlations {
            let label = match c.kind {
                analytics::CorrelationKind::SleepVsMood => "Sleep vs Mood",
                analytics::CorrelationKind::StressVsSeverity => "Stress vs Symptom Severity",
            };
            md.push_str(&format!(
                "- {}: r = {:.2} (n = {})\n",
                label, c.correlation, c.sample_size
            ));
        }
        md.push('\n');
    }

    if let Some(peak) = advanced
        .time_of_day
        .iter()
        .max_by(|a, b| a.avg_severity.total_cmp(&b.avg_severity))
    {
        md.push_str("## Patterns\n\n");
        md.push_str(&format!(
            "- Hardest hour: {:02}:00 (avg {:.1}, {} entries)\n",
            peak.hour, peak.avg_severity, peak.count
        ));
        if let Some(day) = advanced
            .day_of_week
            .iter()
            .max_by(|a, b| a.avg_severity.total_cmp(&b.avg_severity))
        {
            md.push_str(&format!(
                "- Hardest day: {} (avg {:.1}, {} entries)\n",
                day.day, day.avg_severity, day.count
            ));
        }
        md.push('\n');
    }

    if !advanced.medication_effectiveness.is_empty() {
        md.push_str("## Medications\n\n");
        for stats in &advanced.medication_effectiveness {
            let name = medications
                .iter()
                .find(|m| m.id == stats.medication_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| format!("#{}", stats.medication_id));
            let rating = stats
                .avg_effectiveness
                .map(|r| format!("{:.1}/10", r))
                .unwrap_or_else(|| "unrated".to_string());
            md.push_str(&format!(
                "- **{}**: adherence {:.0}%, effectiveness {}, {} log(s)\n",
                name,
                stats.adherence_rate * 100.0,
                rating,
                stats.total_logs
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n");
    md.push_str("*Generated by psytrack*\n");
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryRepo;
    use crate::domain::{
        EntryContent, NewAlter, NewDisorder, NewLogEntry, NewMedication, NewMedicationLog,
        NewSwitch, NewTherapySession, SymptomReading,
    };
    use chrono::FixedOffset;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    async fn seeded(reports_dir: PathBuf) -> (Arc<MemoryRepo>, AnalyticsService) {
        let repo = Arc::new(MemoryRepo::new());
        repo.create_disorder(&NewDisorder::new("BPD", "BPD", "Borderline Personality Disorder"))
            .await
            .unwrap();
        let service = AnalyticsService::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo.clone(),
            reports_dir,
            NonZeroU32::new(7).unwrap(),
        );
        (repo, service)
    }

    fn entry(day: u32, hour: u32, symptoms: Vec<SymptomReading>) -> NewLogEntry {
        let content = EntryContent {
            symptoms,
            fronting_alter_id: None,
        };
        NewLogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            disorder_id: Some(1),
            title: None,
            content: Some(content.to_json().unwrap()),
            mood: Some(5.0),
            sleep_hours: Some(7.0),
            stress_level: None,
        }
    }

    #[tokio::test]
    async fn test_zero_timespan_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (_, service) = seeded(dir.path().join("reports")).await;
        let cal = Calendar::utc(today());
        assert!(matches!(
            service.symptom_trends_at(Some(0), &cal).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.export_report_at(Some(0), &cal).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_timespan_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let (_, service) = seeded(dir.path().join("reports")).await;
        let cal = Calendar::utc(today());
        assert!(matches!(
            service.symptom_trends_at(Some(MAX_TIMESPAN_DAYS + 1), &cal).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.symptom_trends_at(Some(u32::MAX), &cal).await,
            Err(DomainError::Validation(_))
        ));
        let trends = service
            .symptom_trends_at(Some(MAX_TIMESPAN_DAYS), &cal)
            .await
            .unwrap();
        assert_eq!(trends[0].labels.len(), MAX_TIMESPAN_DAYS as usize);
    }

    #[tokio::test]
    async fn test_trends_use_default_window() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, service) = seeded(dir.path().join("reports")).await;
        repo.create_entry(&entry(1, 9, vec![SymptomReading::new("Splitting", 9)]))
            .await
            .unwrap();
        repo.create_entry(&entry(13, 9, vec![SymptomReading::new("Splitting", 4)]))
            .await
            .unwrap();

        let trends = service
            .symptom_trends_at(None, &Calendar::utc(today()))
            .await
            .unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].labels.len(), 7);
        assert_eq!(trends[0].datasets[0].data, vec![0, 0, 0, 0, 0, 4, 0]);
    }

    #[tokio::test]
    async fn test_summary_and_advanced() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, service) = seeded(dir.path().join("reports")).await;
        repo.create_entry(&entry(13, 9, vec![SymptomReading::new("Splitting", 4)]))
            .await
            .unwrap();
        repo.create_entry(&entry(14, 21, vec![SymptomReading::new("Splitting", 6)]))
            .await
            .unwrap();

        let cal = Calendar::utc(today());
        let summary = service.summary_at(&cal).await.unwrap();
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.today_entries, 1);
        assert_eq!(summary.consecutive_days, 2);
        assert_eq!(summary.most_active_disorder.as_deref(), Some("BPD"));

        let advanced = service.advanced_at(&cal).await.unwrap();
        assert_eq!(advanced.time_of_day.len(), 2);
        assert!(advanced.medication_effectiveness.is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        let (repo, service) = seeded(reports.clone()).await;
        repo.create_entry(&entry(12, 22, vec![SymptomReading::new("Emptiness", 8)]))
            .await
            .unwrap();
        let med = repo
            .create_medication(&NewMedication {
                name: "Lamotrigine".to_string(),
                dosage: None,
                frequency: None,
                prescribed_date: today(),
                is_active: true,
            })
            .await
            .unwrap();
        repo.create_medication_log(&NewMedicationLog {
            medication_id: med.id,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 13, 8, 0, 0).unwrap(),
            taken: true,
            effectiveness: Some(6.0),
            notes: None,
        })
        .await
        .unwrap();

        let paths = service
            .export_report_at(None, &Calendar::utc(today()))
            .await
            .unwrap();
        assert_eq!(paths.markdown, reports.join("report_2024-03-14.md"));

        let md = std::fs::read_to_string(&paths.markdown).unwrap();
        assert!(md.starts_with("# Psytrack Report: 2024-03-14"));
        assert!(md.contains("### Borderline Personality Disorder"));
        assert!(md.contains("**Emptiness**: peak 8"));
        assert!(md.contains("**Lamotrigine**: adherence 100%"));

        let csv = std::fs::read_to_string(&paths.trends_csv).unwrap();
        assert!(csv.contains("Borderline Personality Disorder,Emptiness,2024-03-12,8"));
        let weekly = std::fs::read_to_string(&paths.weekly_csv).unwrap();
        assert!(weekly.starts_with("week,avg_severity,avg_mood,entry_count"));
    }

    #[tokio::test]
    async fn test_daily_log_lists_one_day() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, service) = seeded(dir.path().join("reports")).await;
        let host = repo
            .create_alter(&NewAlter {
                name: "Host".to_string(),
                age: None,
                role: None,
                disorder_id: None,
            })
            .await
            .unwrap();
        let little = repo
            .create_alter(&NewAlter {
                name: "Little".to_string(),
                age: None,
                role: None,
                disorder_id: None,
            })
            .await
            .unwrap();

        let mut fronted = entry(14, 9, vec![SymptomReading::new("Emptiness", 6)]);
        fronted.title = Some("Rough morning".to_string());
        fronted.content = Some(
            EntryContent {
                symptoms: vec![SymptomReading::new("Emptiness", 6)],
                fronting_alter_id: Some(little.id),
            }
            .to_json()
            .unwrap(),
        );
        repo.create_entry(&fronted).await.unwrap();
        repo.create_entry(&entry(13, 9, vec![SymptomReading::new("Splitting", 3)]))
            .await
            .unwrap();
        repo.create_switch(&NewSwitch {
            from_alter_id: Some(host.id),
            to_alter_id: little.id,
            notes: Some("after the call".to_string()),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 14, 10, 15, 0).unwrap(),
            disorder_id: None,
        })
        .await
        .unwrap();
        let med = repo
            .create_medication(&NewMedication {
                name: "Lamotrigine".to_string(),
                dosage: None,
                frequency: None,
                prescribed_date: today(),
                is_active: true,
            })
            .await
            .unwrap();
        repo.create_medication_log(&NewMedicationLog {
            medication_id: med.id,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 14, 8, 0, 0).unwrap(),
            taken: true,
            effectiveness: Some(7.0),
            notes: None,
        })
        .await
        .unwrap();
        repo.create_therapy_session(&NewTherapySession {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 14, 16, 0, 0).unwrap(),
            therapist_name: "Dr. Ames".to_string(),
            notes: None,
            disorder_id: 1,
        })
        .await
        .unwrap();

        let log = service
            .daily_log_at(today(), &Calendar::utc(today()))
            .await
            .unwrap();
        assert!(log.starts_with("PsyTrack Daily Log for 2024-03-14\n===="));
        assert!(log.contains("--- Journal Entries (1) ---\n[09:00] Rough morning\n"));
        assert!(log.contains("  Fronting Alter: Little\n"));
        assert!(log.contains("    - Emptiness (Severity: 6/10)\n"));
        assert!(!log.contains("Splitting"));
        assert!(log.contains("[10:15] Switch: Host -> Little\n  Notes: after the call\n"));
        assert!(log.contains("[08:00] Lamotrigine - taken, effectiveness 7/10\n"));
        assert!(log.contains("[16:00] Therapist: Dr. Ames\n"));

        let empty = service
            .daily_log_at(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), &Calendar::utc(today()))
            .await
            .unwrap();
        assert!(empty.contains("--- Journal Entries (0) ---\nNo journal entries logged.\n"));
        assert!(empty.contains("No switches logged."));
        assert!(empty.contains("No medications logged."));
        assert!(empty.contains("No therapy sessions logged."));
    }

    #[tokio::test]
    async fn test_daily_log_uses_local_day() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, service) = seeded(dir.path().join("reports")).await;
        // 23:00 UTC on the 13th is already the 14th two hours east.
        repo.create_entry(&entry(13, 23, vec![SymptomReading::new("Anergia", 2)]))
            .await
            .unwrap();
        let east = Calendar::new(FixedOffset::east_opt(2 * 3600).unwrap(), today());

        let log = service.daily_log_at(today(), &east).await.unwrap();
        assert!(log.contains("--- Journal Entries (1) ---\n[01:00] Untitled\n"));
        assert!(log.contains("  Fronting Alter: Unknown\n"));

        let utc_log = service
            .daily_log_at(today(), &Calendar::utc(today()))
            .await
            .unwrap();
        assert!(utc_log.contains("--- Journal Entries (0) ---"));
    }
}
