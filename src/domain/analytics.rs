//! Analytics aggregator. Pure functions from persisted records to chart/report summaries.
//!
//! Nothing here touches storage or the clock directly: callers pass a snapshot of records
//! and a [`Calendar`] that fixes "today" and the local time zone for the whole computation.

use crate::domain::entities::{Disorder, LogEntry, MedicationLog, SymptomReading};
use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeDelta,
    TimeZone, Timelike, Utc,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroU32;

/// Default trend window in days.
pub const DEFAULT_TIMESPAN_DAYS: u32 = 7;

/// Longest trend window accepted, roughly ten years.
pub const MAX_TIMESPAN_DAYS: u32 = 3650;

/// Minimum paired samples before a correlation is reported.
const MIN_CORRELATION_SAMPLES: usize = 2;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Local calendar used to bucket timestamps into days, weeks and hours.
///
/// Every instant is converted with the zone's own offset at that instant, so entries from
/// the other side of a daylight-saving change land in the hour and day they were logged in.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    zone: Tz,
    today: NaiveDate,
}

impl Calendar<FixedOffset> {
    /// UTC calendar with an explicit "today".
    pub fn utc(today: NaiveDate) -> Self {
        Self::new(Utc.fix(), today)
    }
}

impl Calendar<Local> {
    /// The machine's time zone and current local date.
    pub fn now_local() -> Self {
        Self::new(Local, Local::now().date_naive())
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn new(zone: Tz, today: NaiveDate) -> Self {
        Self { zone, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn zone(&self) -> &Tz {
        &self.zone
    }

    pub fn local(&self, ts: &DateTime<Utc>) -> DateTime<Tz> {
        ts.with_timezone(&self.zone)
    }

    pub fn day_of(&self, ts: &DateTime<Utc>) -> NaiveDate {
        self.local(ts).date_naive()
    }

    /// Instant of local midnight opening `day`. When midnight falls in a DST gap the first
    /// valid instant after it is used.
    pub fn start_of_day_utc(&self, day: NaiveDate) -> DateTime<Utc> {
        let midnight = day.and_time(NaiveTime::MIN);
        (0..=2)
            .filter_map(|h| {
                self.zone
                    .from_local_datetime(&(midnight + TimeDelta::hours(h)))
                    .earliest()
            })
            .next()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    /// First day of a window of `days` days ending today.
    pub fn window_start(&self, days: NonZeroU32) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(u64::from(days.get() - 1)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Days of the window ending today, oldest first.
    pub fn window(&self, days: NonZeroU32) -> Vec<NaiveDate> {
        self.window_start(days)
            .iter_days()
            .take(days.get() as usize)
            .collect()
    }
}

fn iso_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Running sum of severities and the number of readings that produced it.
#[derive(Debug, Clone, Copy, Default)]
struct SeverityTally {
    total: u64,
    readings: u64,
}

impl SeverityTally {
    fn of(readings: &[SymptomReading]) -> Self {
        let mut tally = Self::default();
        tally.add(readings);
        tally
    }

    fn add(&mut self, readings: &[SymptomReading]) {
        for r in readings {
            self.total += u64::from(r.severity);
            self.readings += 1;
        }
    }

    fn average(&self) -> Option<f64> {
        (self.readings > 0).then(|| self.total as f64 / self.readings as f64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Symptom trends
// ─────────────────────────────────────────────────────────────────────────────

/// One symptom's per-day severities, aligned with [`SymptomTrend::labels`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDataset {
    pub label: String,
    pub data: Vec<u8>,
}

/// Chart data for one disorder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomTrend {
    pub disorder_id: i64,
    pub disorder_name: String,
    pub labels: Vec<String>,
    pub datasets: Vec<TrendDataset>,
}

/// Symptom name -> day -> severity, remembering first-seen name order.
#[derive(Default)]
struct SymptomSeries {
    order: Vec<String>,
    by_name: HashMap<String, HashMap<NaiveDate, u8>>,
}

impl SymptomSeries {
    fn record(&mut self, reading: SymptomReading, day: NaiveDate) {
        if !self.by_name.contains_key(&reading.name) {
            self.order.push(reading.name.clone());
        }
        self.by_name
            .entry(reading.name)
            .or_default()
            .insert(day, reading.severity);
    }

    fn into_datasets(mut self, days: &[NaiveDate]) -> Vec<TrendDataset> {
        self.order
            .into_iter()
            .map(|name| {
                let values = self.by_name.remove(&name).unwrap_or_default();
                TrendDataset {
                    data: days
                        .iter()
                        .map(|d| values.get(d).copied().unwrap_or(0))
                        .collect(),
                    label: name,
                }
            })
            .collect()
    }
}

/// Per-disorder daily severity series over the last `timespan` days.
///
/// Every disorder in `disorders` appears in the output, in input order, even without data.
/// When one symptom is logged more than once on the same day the chronologically last
/// entry wins. Entries with unparseable content contribute nothing.
pub fn symptom_trends<Tz: TimeZone>(
    entries: &[LogEntry],
    disorders: &[Disorder],
    timespan: NonZeroU32,
    calendar: &Calendar<Tz>,
) -> Vec<SymptomTrend> {
    let days = calendar.window(timespan);
    let start = calendar.window_start(timespan);

    let mut included: Vec<&LogEntry> = entries
        .iter()
        .filter(|e| calendar.day_of(&e.timestamp) >= start)
        .collect();
    // Stable sort: entries sharing an instant keep their input order.
    included.sort_by_key(|e| e.timestamp);

    let mut series: HashMap<i64, SymptomSeries> = disorders
        .iter()
        .map(|d| (d.id, SymptomSeries::default()))
        .collect();

    for entry in included {
        let Some(disorder_series) = entry.disorder_id.and_then(|id| series.get_mut(&id)) else {
            continue;
        };
        let day = calendar.day_of(&entry.timestamp);
        for reading in entry.symptoms() {
            disorder_series.record(reading, day);
        }
    }

    let labels: Vec<String> = days.iter().copied().map(iso_day).collect();
    disorders
        .iter()
        .map(|d| SymptomTrend {
            disorder_id: d.id,
            disorder_name: d.full_name.clone(),
            labels: labels.clone(),
            datasets: series
                .remove(&d.id)
                .map(|s| s.into_datasets(&days))
                .unwrap_or_default(),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard summary
// ─────────────────────────────────────────────────────────────────────────────

/// Consecutive days with at least one entry, counting back from today.
/// Zero when nothing was logged today.
pub fn streak<Tz: TimeZone>(entries: &[LogEntry], calendar: &Calendar<Tz>) -> u32 {
    let logged: HashSet<NaiveDate> = entries
        .iter()
        .map(|e| calendar.day_of(&e.timestamp))
        .collect();

    let mut streak = 0;
    let mut cursor = calendar.today();
    while logged.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_entries: usize,
    pub today_entries: usize,
    /// Mean severity over every reading, one decimal place. 0 without readings.
    pub avg_severity: f64,
    /// Acronym of the disorder with the most entries.
    pub most_active_disorder: Option<String>,
    pub consecutive_days: u32,
}

pub fn summary<Tz: TimeZone>(
    entries: &[LogEntry],
    disorders: &[Disorder],
    calendar: &Calendar<Tz>,
) -> Summary {
    let today = calendar.today();
    let mut tally = SeverityTally::default();
    // Insertion-ordered counts so ties go to the first disorder seen.
    let mut counts: Vec<(i64, usize)> = Vec::new();
    let mut today_entries = 0;

    for entry in entries {
        if calendar.day_of(&entry.timestamp) == today {
            today_entries += 1;
        }
        tally.add(&entry.symptoms());
        if let Some(id) = entry.disorder_id {
            match counts.iter_mut().find(|(seen, _)| *seen == id) {
                Some((_, n)) => *n += 1,
                None => counts.push((id, 1)),
            }
        }
    }

    let mut top: Option<(i64, usize)> = None;
    for &(id, n) in &counts {
        if top.is_none_or(|(_, best)| n > best) {
            top = Some((id, n));
        }
    }
    let most_active_disorder = top.and_then(|(id, _)| {
        disorders
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.acronym.clone())
    });

    Summary {
        total_entries: entries.len(),
        today_entries,
        avg_severity: tally
            .average()
            .map(|avg| (avg * 10.0).round() / 10.0)
            .unwrap_or(0.0),
        most_active_disorder,
        consecutive_days: streak(entries, calendar),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Weekly trends
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrend {
    /// ISO date of the week's Sunday.
    pub week: String,
    /// 0 when the week has entries but no severity readings.
    pub avg_severity: f64,
    pub avg_mood: Option<f64>,
    pub entry_count: usize,
}

/// Sunday that opens the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let back = u64::from(day.weekday().num_days_from_sunday());
    day.checked_sub_days(Days::new(back)).unwrap_or(day)
}

/// Weekly averages, oldest week first.
pub fn weekly_trends<Tz: TimeZone>(
    entries: &[LogEntry],
    calendar: &Calendar<Tz>,
) -> Vec<WeeklyTrend> {
    #[derive(Default)]
    struct Week {
        tally: SeverityTally,
        moods: Vec<f64>,
        entries: usize,
    }

    let mut weeks: BTreeMap<NaiveDate, Week> = BTreeMap::new();
    for entry in entries {
        let week = weeks
            .entry(week_start(calendar.day_of(&entry.timestamp)))
            .or_default();
        week.entries += 1;
        week.tally.add(&entry.symptoms());
        if let Some(mood) = entry.mood.and_then(finite) {
            week.moods.push(mood);
        }
    }

    weeks
        .into_iter()
        .map(|(start, week)| WeeklyTrend {
            week: iso_day(start),
            avg_severity: week.tally.average().unwrap_or(0.0),
            avg_mood: mean(&week.moods),
            entry_count: week.entries,
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Correlations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CorrelationKind {
    #[serde(rename = "Sleep vs Mood")]
    SleepVsMood,
    #[serde(rename = "Stress vs Symptom Severity")]
    StressVsSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    #[serde(rename = "type")]
    pub kind: CorrelationKind,
    pub correlation: f64,
    pub sample_size: usize,
}

/// Pearson product-moment correlation. 0 for empty input or a zero denominator.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = nf * sum_xy - sum_x * sum_y;
    let denominator = ((nf * sum_x2 - sum_x * sum_x) * (nf * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// Sleep vs. mood and stress vs. mean entry severity. A pair with fewer than two
/// complete samples is left out rather than reported as 0.
pub fn correlations(entries: &[LogEntry]) -> Vec<Correlation> {
    let mut out = Vec::new();

    let (sleep, mood): (Vec<f64>, Vec<f64>) = entries
        .iter()
        .filter_map(|e| Some((finite(e.sleep_hours?)?, finite(e.mood?)?)))
        .unzip();
    if sleep.len() >= MIN_CORRELATION_SAMPLES {
        out.push(Correlation {
            kind: CorrelationKind::SleepVsMood,
            correlation: pearson(&sleep, &mood),
            sample_size: sleep.len(),
        });
    }

    let (stress, severity): (Vec<f64>, Vec<f64>) = entries
        .iter()
        .filter_map(|e| {
            let stress = finite(e.stress_level?)?;
            let avg = SeverityTally::of(&e.symptoms()).average()?;
            Some((stress, avg))
        })
        .unzip();
    if stress.len() >= MIN_CORRELATION_SAMPLES {
        out.push(Correlation {
            kind: CorrelationKind::StressVsSeverity,
            correlation: pearson(&stress, &severity),
            sample_size: stress.len(),
        });
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Medication effectiveness
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationEffectiveness {
    pub medication_id: i64,
    /// Taken logs over all logs for the medication.
    pub adherence_rate: f64,
    /// Mean effectiveness over taken, rated logs.
    pub avg_effectiveness: Option<f64>,
    pub total_logs: usize,
}

/// Adherence and effectiveness per medication, ordered by medication id.
pub fn medication_effectiveness(logs: &[MedicationLog]) -> Vec<MedicationEffectiveness> {
    #[derive(Default)]
    struct Acc {
        total: usize,
        taken: usize,
        ratings: Vec<f64>,
    }

    let mut by_medication: BTreeMap<i64, Acc> = BTreeMap::new();
    for log in logs {
        let acc = by_medication.entry(log.medication_id).or_default();
        acc.total += 1;
        if log.taken {
            acc.taken += 1;
            if let Some(rating) = log.effectiveness.and_then(finite) {
                acc.ratings.push(rating);
            }
        }
    }

    by_medication
        .into_iter()
        .map(|(medication_id, acc)| MedicationEffectiveness {
            medication_id,
            adherence_rate: acc.taken as f64 / acc.total as f64,
            avg_effectiveness: mean(&acc.ratings),
            total_logs: acc.total,
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Temporal patterns
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourPattern {
    pub hour: u32,
    pub count: usize,
    pub avg_severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPattern {
    pub day: String,
    /// Sunday = 0 .. Saturday = 6.
    pub day_index: u32,
    pub count: usize,
    pub avg_severity: f64,
}

/// Entry count and severity tally per bucket. The average divides by the readings
/// observed in that bucket only.
fn bucket_by<K: Ord>(
    entries: &[LogEntry],
    key: impl Fn(&LogEntry) -> K,
) -> BTreeMap<K, (usize, SeverityTally)> {
    let mut buckets: BTreeMap<K, (usize, SeverityTally)> = BTreeMap::new();
    for entry in entries {
        let (count, tally) = buckets.entry(key(entry)).or_default();
        *count += 1;
        tally.add(&entry.symptoms());
    }
    buckets
}

/// Local hour-of-day buckets (0..=23) that have at least one entry.
pub fn time_of_day_patterns<Tz: TimeZone>(
    entries: &[LogEntry],
    calendar: &Calendar<Tz>,
) -> Vec<HourPattern> {
    bucket_by(entries, |e| calendar.local(&e.timestamp).hour())
        .into_iter()
        .map(|(hour, (count, tally))| HourPattern {
            hour,
            count,
            avg_severity: tally.average().unwrap_or(0.0),
        })
        .collect()
}

/// Local weekday buckets, Sunday first, that have at least one entry.
pub fn day_of_week_patterns<Tz: TimeZone>(
    entries: &[LogEntry],
    calendar: &Calendar<Tz>,
) -> Vec<DayPattern> {
    bucket_by(entries, |e| {
        calendar.local(&e.timestamp).weekday().num_days_from_sunday()
    })
    .into_iter()
    .map(|(day_index, (count, tally))| DayPattern {
        day: DAY_NAMES[day_index as usize].to_string(),
        day_index,
        count,
        avg_severity: tally.average().unwrap_or(0.0),
    })
    .collect()
}

/// Everything the advanced analytics view shows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedAnalytics {
    pub weekly_trends: Vec<WeeklyTrend>,
    pub correlations: Vec<Correlation>,
    pub time_of_day: Vec<HourPattern>,
    pub day_of_week: Vec<DayPattern>,
    pub medication_effectiveness: Vec<MedicationEffectiveness>,
}

pub fn advanced_analytics<Tz: TimeZone>(
    entries: &[LogEntry],
    medication_logs: &[MedicationLog],
    calendar: &Calendar<Tz>,
) -> AdvancedAnalytics {
    AdvancedAnalytics {
        weekly_trends: weekly_trends(entries, calendar),
        correlations: correlations(entries),
        time_of_day: time_of_day_patterns(entries, calendar),
        day_of_week: day_of_week_patterns(entries, calendar),
        medication_effectiveness: medication_effectiveness(medication_logs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntryContent;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    /// Wednesday 2024-03-13, UTC.
    fn calendar() -> Calendar<FixedOffset> {
        Calendar::utc(date(2024, 3, 13))
    }

    fn days(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn disorder(id: i64, acronym: &str) -> Disorder {
        Disorder {
            id,
            name: acronym.to_string(),
            acronym: acronym.to_string(),
            full_name: format!("{} full", acronym),
        }
    }

    fn entry(id: i64, ts: DateTime<Utc>, disorder_id: i64, symptoms: &[(&str, u8)]) -> LogEntry {
        let content = EntryContent {
            symptoms: symptoms
                .iter()
                .map(|(n, s)| SymptomReading::new(*n, *s))
                .collect(),
            fronting_alter_id: None,
        };
        LogEntry {
            id,
            timestamp: ts,
            disorder_id: Some(disorder_id),
            title: None,
            content: Some(content.to_json().unwrap()),
            mood: None,
            sleep_hours: None,
            stress_level: None,
        }
    }

    fn med_log(id: i64, medication_id: i64, taken: bool, effectiveness: Option<f64>) -> MedicationLog {
        MedicationLog {
            id,
            medication_id,
            timestamp: at(2024, 3, 13, 8),
            taken,
            effectiveness,
            notes: None,
        }
    }

    #[test]
    fn test_labels_cover_window_oldest_first() {
        let trends = symptom_trends(&[], &[disorder(1, "BPD")], days(5), &calendar());
        assert_eq!(
            trends[0].labels,
            vec!["2024-03-09", "2024-03-10", "2024-03-11", "2024-03-12", "2024-03-13"]
        );

        let single = symptom_trends(&[], &[disorder(1, "BPD")], days(1), &calendar());
        assert_eq!(single[0].labels, vec!["2024-03-13"]);
    }

    #[test]
    fn test_disorders_without_data_keep_input_order() {
        let disorders = vec![disorder(3, "BPD"), disorder(1, "DID"), disorder(2, "BD.2")];
        let entries = vec![entry(1, at(2024, 3, 12, 10), 1, &[("Depersonalization", 5)])];

        let trends = symptom_trends(&entries, &disorders, days(7), &calendar());
        let ids: Vec<i64> = trends.iter().map(|t| t.disorder_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(trends[0].datasets.is_empty());
        assert_eq!(trends[1].datasets.len(), 1);
        assert!(trends[2].datasets.is_empty());
        assert_eq!(trends[1].disorder_name, "DID full");
    }

    #[test]
    fn test_later_write_wins_and_missing_days_are_zero() {
        let entries = vec![
            entry(2, at(2024, 3, 12, 18), 1, &[("Splitting", 7)]),
            entry(1, at(2024, 3, 12, 9), 1, &[("Splitting", 2)]),
            entry(3, at(2024, 3, 10, 9), 1, &[("Splitting", 4), ("Chronic emptiness", 3)]),
        ];
        let trends = symptom_trends(&entries, &[disorder(1, "BPD")], days(4), &calendar());
        let datasets = &trends[0].datasets;

        assert_eq!(datasets[0].label, "Splitting");
        assert_eq!(datasets[0].data, vec![4, 0, 7, 0]);
        assert_eq!(datasets[1].label, "Chronic emptiness");
        assert_eq!(datasets[1].data, vec![3, 0, 0, 0]);
    }

    #[test]
    fn test_window_and_malformed_content() {
        let mut broken = entry(2, at(2024, 3, 13, 9), 1, &[]);
        broken.content = Some("{symptoms: oops".to_string());
        let entries = vec![
            entry(1, at(2024, 3, 1, 9), 1, &[("Too old", 9)]),
            broken,
            entry(3, at(2024, 3, 13, 10), 1, &[("Anergia", 6)]),
            entry(4, at(2024, 3, 13, 11), 99, &[("Unknown disorder", 6)]),
        ];
        let trends = symptom_trends(&entries, &[disorder(1, "BD.2")], days(7), &calendar());

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].datasets.len(), 1);
        assert_eq!(trends[0].datasets[0].label, "Anergia");
        assert_eq!(trends[0].datasets[0].data.last(), Some(&6));
    }

    #[test]
    fn test_content_roundtrip_through_trends() {
        let logged = [("Identity confusion", 5), ("Derealization", 8)];
        let entries = vec![entry(1, at(2024, 3, 13, 7), 2, &logged)];
        let trends = symptom_trends(&entries, &[disorder(2, "DID")], days(1), &calendar());

        let recovered: Vec<(String, u8)> = trends[0]
            .datasets
            .iter()
            .map(|d| (d.label.clone(), d.data[0]))
            .collect();
        let expected: Vec<(String, u8)> = logged.iter().map(|(n, s)| (n.to_string(), *s)).collect();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn test_streak() {
        let cal = calendar();
        assert_eq!(streak(&[], &cal), 0);

        let today_only = vec![entry(1, at(2024, 3, 13, 8), 1, &[])];
        assert_eq!(streak(&today_only, &cal), 1);

        let with_gap = vec![
            entry(1, at(2024, 3, 13, 8), 1, &[]),
            entry(2, at(2024, 3, 13, 20), 1, &[]),
            entry(3, at(2024, 3, 12, 8), 1, &[]),
            entry(4, at(2024, 3, 10, 8), 1, &[]),
        ];
        assert_eq!(streak(&with_gap, &cal), 2);

        let yesterday_only = vec![entry(1, at(2024, 3, 12, 8), 1, &[])];
        assert_eq!(streak(&yesterday_only, &cal), 0);
    }

    #[test]
    fn test_streak_uses_local_day() {
        // 23:30 UTC on the 13th is already the 14th at UTC+2.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let cal = Calendar::new(offset, date(2024, 3, 14));
        let ts = Utc.with_ymd_and_hms(2024, 3, 13, 23, 30, 0).unwrap();
        assert_eq!(streak(&[entry(1, ts, 1, &[])], &cal), 1);
        assert_eq!(streak(&[entry(1, ts, 1, &[])], &calendar()), 1);
    }

    #[test]
    fn test_start_of_day_utc_honours_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let cal = Calendar::new(offset, date(2024, 3, 14));
        assert_eq!(
            cal.start_of_day_utc(date(2024, 3, 14)),
            Utc.with_ymd_and_hms(2024, 3, 13, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_summary() {
        let disorders = vec![disorder(1, "BD.2"), disorder(2, "DID")];
        let entries = vec![
            entry(1, at(2024, 3, 12, 8), 2, &[("Switching episodes", 3)]),
            entry(2, at(2024, 3, 13, 8), 1, &[("Anhedonia", 4), ("Anergia", 4)]),
            entry(3, at(2024, 3, 13, 9), 1, &[]),
            entry(4, at(2024, 3, 11, 9), 2, &[]),
        ];
        let s = summary(&entries, &disorders, &calendar());

        assert_eq!(s.total_entries, 4);
        assert_eq!(s.today_entries, 2);
        // 11 / 3 = 3.666..
        assert_eq!(s.avg_severity, 3.7);
        // Tie (2 each): DID was seen first.
        assert_eq!(s.most_active_disorder.as_deref(), Some("DID"));
        assert_eq!(s.consecutive_days, 3);
    }

    #[test]
    fn test_summary_empty() {
        let s = summary(&[], &[disorder(1, "BPD")], &calendar());
        assert_eq!(s.total_entries, 0);
        assert_eq!(s.today_entries, 0);
        assert_eq!(s.avg_severity, 0.0);
        assert_eq!(s.most_active_disorder, None);
        assert_eq!(s.consecutive_days, 0);
    }

    #[test]
    fn test_weekly_trends_keyed_by_sunday() {
        let mut with_mood = entry(1, at(2024, 3, 13, 8), 1, &[("Anhedonia", 6), ("Anergia", 2)]);
        with_mood.mood = Some(4.0);
        let mut sunday = entry(2, at(2024, 3, 10, 8), 1, &[]);
        sunday.mood = Some(6.0);
        let previous_week = entry(3, at(2024, 3, 9, 8), 1, &[]);

        let weeks = weekly_trends(&[with_mood, sunday, previous_week], &calendar());
        assert_eq!(weeks.len(), 2);

        assert_eq!(weeks[0].week, "2024-03-03");
        assert_eq!(weeks[0].avg_severity, 0.0);
        assert_eq!(weeks[0].avg_mood, None);
        assert_eq!(weeks[0].entry_count, 1);

        assert_eq!(weeks[1].week, "2024-03-10");
        assert_eq!(weeks[1].avg_severity, 4.0);
        assert_eq!(weeks[1].avg_mood, Some(5.0));
        assert_eq!(weeks[1].entry_count, 2);
    }

    #[test]
    fn test_pearson() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-9);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-9);
        assert_eq!(pearson(&[2.0, 2.0, 2.0], &[1.0, 5.0, 9.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn test_correlations_need_two_samples() {
        let mut one = entry(1, at(2024, 3, 13, 8), 1, &[("Anergia", 3)]);
        one.sleep_hours = Some(6.0);
        one.mood = Some(4.0);
        one.stress_level = Some(2.0);
        assert!(correlations(&[one.clone()]).is_empty());

        let mut two = entry(2, at(2024, 3, 12, 8), 1, &[("Anergia", 5)]);
        two.sleep_hours = Some(8.0);
        two.mood = Some(8.0);
        // Stress without readings does not qualify for the severity pair.
        let mut three = entry(3, at(2024, 3, 11, 8), 1, &[]);
        three.stress_level = Some(9.0);

        let result = correlations(&[one, two, three]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind, CorrelationKind::SleepVsMood);
        assert_eq!(result[0].sample_size, 2);
        assert!((result[0].correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stress_vs_severity() {
        let mut a = entry(1, at(2024, 3, 13, 8), 1, &[("Splitting", 2), ("Anger", 4)]);
        a.stress_level = Some(1.0);
        let mut b = entry(2, at(2024, 3, 12, 8), 1, &[("Splitting", 6)]);
        b.stress_level = Some(2.0);
        let mut c = entry(3, at(2024, 3, 11, 8), 1, &[("Splitting", 9)]);
        c.stress_level = Some(3.0);

        let result = correlations(&[a, b, c]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].kind, CorrelationKind::StressVsSeverity);
        assert!(result[0].correlation > 0.9);
    }

    #[test]
    fn test_medication_effectiveness() {
        let logs = vec![med_log(1, 5, true, Some(8.0)), med_log(2, 5, false, None)];
        let result = medication_effectiveness(&logs);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].medication_id, 5);
        assert_eq!(result[0].adherence_rate, 0.5);
        assert_eq!(result[0].avg_effectiveness, Some(8.0));
        assert_eq!(result[0].total_logs, 2);
    }

    #[test]
    fn test_medication_effectiveness_ignores_untaken_ratings() {
        let logs = vec![
            med_log(1, 9, false, Some(2.0)),
            med_log(2, 3, true, None),
            med_log(3, 9, true, Some(6.0)),
        ];
        let result = medication_effectiveness(&logs);
        assert_eq!(result[0].medication_id, 3);
        assert_eq!(result[0].adherence_rate, 1.0);
        assert_eq!(result[0].avg_effectiveness, None);
        assert_eq!(result[1].medication_id, 9);
        assert_eq!(result[1].avg_effectiveness, Some(6.0));
        assert!(medication_effectiveness(&[]).is_empty());
    }

    #[test]
    fn test_hour_patterns_divide_by_bucket_readings() {
        // The first entry logs two symptoms; dividing the 21h bucket by that count would give 4.
        let entries = vec![
            entry(1, at(2024, 3, 13, 9), 1, &[("Anhedonia", 4), ("Anergia", 6)]),
            entry(2, at(2024, 3, 12, 21), 1, &[("Anhedonia", 8)]),
            entry(3, at(2024, 3, 11, 9), 1, &[]),
        ];
        let hours = time_of_day_patterns(&entries, &calendar());
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0], HourPattern { hour: 9, count: 2, avg_severity: 5.0 });
        assert_eq!(hours[1], HourPattern { hour: 21, count: 1, avg_severity: 8.0 });
    }

    #[test]
    fn test_day_patterns() {
        let entries = vec![
            entry(1, at(2024, 3, 10, 9), 1, &[("Splitting", 3)]),
            entry(2, at(2024, 3, 13, 9), 1, &[("Splitting", 5), ("Anger", 7)]),
            entry(3, at(2024, 3, 6, 9), 1, &[]),
        ];
        let days = day_of_week_patterns(&entries, &calendar());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, "Sunday");
        assert_eq!(days[0].day_index, 0);
        assert_eq!(days[0].avg_severity, 3.0);
        assert_eq!(days[1].day, "Wednesday");
        assert_eq!(days[1].count, 2);
        assert_eq!(days[1].avg_severity, 6.0);
    }

    /// Central European time with EU daylight-saving rules (+01:00 winter, +02:00 summer).
    #[derive(Debug, Clone, Copy)]
    struct CentralEurope;

    impl CentralEurope {
        fn last_sunday(year: i32, month: u32) -> NaiveDate {
            let mut day = date(year, month + 1, 1).pred_opt().unwrap();
            while day.weekday() != chrono::Weekday::Sun {
                day = day.pred_opt().unwrap();
            }
            day
        }

        fn offset_at(utc: &chrono::NaiveDateTime) -> FixedOffset {
            let year = utc.year();
            let summer_start = Self::last_sunday(year, 3).and_hms_opt(1, 0, 0).unwrap();
            let summer_end = Self::last_sunday(year, 10).and_hms_opt(1, 0, 0).unwrap();
            let hours = if *utc >= summer_start && *utc < summer_end { 2 } else { 1 };
            FixedOffset::east_opt(hours * 3600).unwrap()
        }
    }

    impl TimeZone for CentralEurope {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            CentralEurope
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> chrono::LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(
            &self,
            local: &chrono::NaiveDateTime,
        ) -> chrono::LocalResult<FixedOffset> {
            let fits = |hours: i32| {
                let offset = FixedOffset::east_opt(hours * 3600).unwrap();
                let utc = *local - TimeDelta::hours(i64::from(hours));
                (Self::offset_at(&utc) == offset).then_some(offset)
            };
            match (fits(2), fits(1)) {
                (Some(summer), Some(winter)) => chrono::LocalResult::Ambiguous(summer, winter),
                (Some(only), None) | (None, Some(only)) => chrono::LocalResult::Single(only),
                (None, None) => chrono::LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            Self::offset_at(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &chrono::NaiveDateTime) -> FixedOffset {
            Self::offset_at(utc)
        }
    }

    #[test]
    fn test_winter_entries_bucket_with_winter_offset_in_summer() {
        // "Today" is in summer time; the entries were logged in January (UTC+1).
        let cal = Calendar::new(CentralEurope, date(2026, 10, 16));
        let morning = entry(1, at(2024, 1, 15, 8), 1, &[("Anxiety", 4)]);
        // 22:30 UTC on Sunday the 14th is still Sunday in CET, but Monday at a frozen +02:00.
        let late = entry(
            2,
            Utc.with_ymd_and_hms(2024, 1, 14, 22, 30, 0).unwrap(),
            1,
            &[("Anxiety", 6)],
        );

        let hours = time_of_day_patterns(std::slice::from_ref(&morning), &cal);
        assert_eq!(hours[0].hour, 9);

        let days = day_of_week_patterns(std::slice::from_ref(&late), &cal);
        assert_eq!(days[0].day, "Sunday");
        let weeks = weekly_trends(&[late], &cal);
        assert_eq!(weeks[0].week, "2024-01-14");
    }

    #[test]
    fn test_start_of_day_follows_dst() {
        let cal = Calendar::new(CentralEurope, date(2024, 7, 1));
        assert_eq!(
            cal.start_of_day_utc(date(2024, 1, 15)),
            Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap()
        );
        assert_eq!(
            cal.start_of_day_utc(date(2024, 7, 1)),
            Utc.with_ymd_and_hms(2024, 6, 30, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_advanced_analytics_empty() {
        let result = advanced_analytics(&[], &[], &calendar());
        assert!(result.weekly_trends.is_empty());
        assert!(result.correlations.is_empty());
        assert!(result.time_of_day.is_empty());
        assert!(result.day_of_week.is_empty());
        assert!(result.medication_effectiveness.is_empty());
    }

    #[test]
    fn test_trend_json_shape() {
        let trends = symptom_trends(&[], &[disorder(1, "BPD")], days(1), &calendar());
        let json = serde_json::to_value(&trends[0]).unwrap();
        assert_eq!(json["disorderName"], "BPD full");
        assert!(json["datasets"].as_array().unwrap().is_empty());
    }
}
