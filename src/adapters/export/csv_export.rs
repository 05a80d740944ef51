//! CSV export of aggregator output. Uses the `csv` crate for quoting/escaping.
//!
//! Long format: one row per (disorder, symptom, day) so spreadsheets can pivot freely.

use crate::domain::analytics::{SymptomTrend, WeeklyTrend};

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = wtr.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

/// Convert trend series to CSV: `disorder,symptom,date,severity`.
///
/// Disorders without datasets produce no rows. Zero-filled days are written as 0.
pub fn trends_to_csv(trends: &[SymptomTrend]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(["disorder", "symptom", "date", "severity"])?;

    for trend in trends {
        for dataset in &trend.datasets {
            for (label, severity) in trend.labels.iter().zip(&dataset.data) {
                let severity = severity.to_string();
                wtr.write_record([
                    trend.disorder_name.as_str(),
                    dataset.label.as_str(),
                    label.as_str(),
                    severity.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    finish(wtr)
}

/// Convert weekly trends to CSV: `week,avg_severity,avg_mood,entry_count`.
/// A week without mood values leaves `avg_mood` empty.
pub fn weekly_to_csv(weeks: &[WeeklyTrend]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(["week", "avg_severity", "avg_mood", "entry_count"])?;

    for week in weeks {
        let mood = week
            .avg_mood
            .map(|m| format!("{:.2}", m))
            .unwrap_or_default();
        let severity = format!("{:.2}", week.avg_severity);
        let count = week.entry_count.to_string();
        wtr.write_record([
            week.week.as_str(),
            severity.as_str(),
            mood.as_str(),
            count.as_str(),
        ])?;
    }

    wtr.flush()?;
    finish(wtr)
}
