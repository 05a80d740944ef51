//! Implements InputPort. Inquire-based menu over the journal and analytics services.
//!
//! Analytics results are printed as pretty JSON (the same camelCase shape the aggregator
//! serializes). Cancelling any prompt inside an action returns to the main menu.

use crate::domain::{
    DomainError, NewAlter, NewMedication, NewMedicationLog, NewSwitch, NewTherapySession,
    SymptomReading,
};
use crate::domain::entities::MAX_SEVERITY;
use crate::ports::InputPort;
use crate::usecases::{AnalyticsService, EntryDraft, JournalService};
use async_trait::async_trait;
use crate::domain::analytics::MAX_TIMESPAN_DAYS;
use chrono::{Local, NaiveDate, Utc};
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::progress;

const LAVENDER: Color = Color::Rgb {
    r: 0xb3,
    g: 0x88,
    b: 0xff,
};
const MINT: Color = Color::Rgb {
    r: 0x64,
    g: 0xff,
    b: 0xda,
};

/// Install the global inquire theme. Call once before any prompt.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(LAVENDER))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(MINT))
        .with_selected_option(Some(StyleSheet::new().with_fg(MINT)))
        .with_answer(StyleSheet::new().with_fg(MINT));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Dashboard,
    SymptomTrends,
    Advanced,
    DailyLog,
    LogSymptoms,
    LogMedication,
    RecordSwitch,
    LogTherapy,
    Export,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 10] = [
        MenuItem::Dashboard,
        MenuItem::SymptomTrends,
        MenuItem::Advanced,
        MenuItem::DailyLog,
        MenuItem::LogSymptoms,
        MenuItem::LogMedication,
        MenuItem::RecordSwitch,
        MenuItem::LogTherapy,
        MenuItem::Export,
        MenuItem::Quit,
    ];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuItem::Dashboard => "Dashboard summary",
            MenuItem::SymptomTrends => "Symptom trends",
            MenuItem::Advanced => "Advanced analytics",
            MenuItem::DailyLog => "Daily log",
            MenuItem::LogSymptoms => "Log symptoms",
            MenuItem::LogMedication => "Log medication dose",
            MenuItem::RecordSwitch => "Record switch",
            MenuItem::LogTherapy => "Log therapy session",
            MenuItem::Export => "Export report",
            MenuItem::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// A labelled option whose value is carried through `Select`.
struct Choice<T> {
    label: String,
    value: T,
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn ui_err(e: InquireError) -> DomainError {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            DomainError::Cancelled
        }
        other => DomainError::Ui(other.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), DomainError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| DomainError::Ui(format!("Failed to render JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn optional_number(message: &str, help: &str) -> Result<Option<f64>, DomainError> {
    CustomType::<f64>::new(message)
        .with_help_message(help)
        .prompt_skippable()
        .map_err(ui_err)
}

fn optional_text(message: &str) -> Result<Option<String>, DomainError> {
    Text::new(message)
        .with_help_message("Esc to skip")
        .prompt_skippable()
        .map_err(ui_err)
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    journal: Arc<JournalService>,
    analytics: Arc<AnalyticsService>,
}

impl TuiInputPort {
    pub fn new(journal: Arc<JournalService>, analytics: Arc<AnalyticsService>) -> Self {
        Self { journal, analytics }
    }

    async fn dispatch(&self, item: MenuItem) -> Result<(), DomainError> {
        match item {
            MenuItem::Dashboard => print_json(&self.analytics.summary().await?),
            MenuItem::SymptomTrends => {
                let days = CustomType::<u32>::new("Days to chart:")
                    .with_default(self.analytics.default_timespan().get())
                    .with_help_message(&format!("1 to {}", MAX_TIMESPAN_DAYS))
                    .prompt()
                    .map_err(ui_err)?;
                print_json(&self.analytics.symptom_trends(Some(days)).await?)
            }
            MenuItem::Advanced => print_json(&self.analytics.advanced().await?),
            MenuItem::DailyLog => {
                let date = CustomType::<NaiveDate>::new("Day (YYYY-MM-DD):")
                    .with_default(Local::now().date_naive())
                    .with_error_message("Use the YYYY-MM-DD format")
                    .prompt()
                    .map_err(ui_err)?;
                println!("{}", self.analytics.daily_log(date).await?);
                Ok(())
            }
            MenuItem::LogSymptoms => self.log_symptoms().await,
            MenuItem::LogMedication => self.log_medication().await,
            MenuItem::RecordSwitch => self.record_switch().await,
            MenuItem::LogTherapy => self.log_therapy().await,
            MenuItem::Export => self.export().await,
            MenuItem::Quit => Ok(()),
        }
    }

    async fn pick_disorder(&self) -> Result<Option<i64>, DomainError> {
        let disorders: Vec<Choice<i64>> = self
            .journal
            .list_disorders()
            .await?
            .into_iter()
            .map(|d| Choice {
                label: format!("{} ({})", d.full_name, d.acronym),
                value: d.id,
            })
            .collect();
        if disorders.is_empty() {
            println!("No disorders configured.");
            return Ok(None);
        }
        let disorder = Select::new("Disorder:", disorders)
            .prompt()
            .map_err(ui_err)?;
        Ok(Some(disorder.value))
    }

    async fn log_symptoms(&self) -> Result<(), DomainError> {
        let Some(disorder_id) = self.pick_disorder().await? else {
            return Ok(());
        };

        let mut symptoms = Vec::new();
        loop {
            let name = Text::new("Symptom:")
                .with_help_message("Leave empty to finish")
                .prompt()
                .map_err(ui_err)?;
            if name.trim().is_empty() {
                break;
            }
            let severity = CustomType::<u8>::new("Severity (0-10):")
                .with_validator(|v: &u8| {
                    if *v <= MAX_SEVERITY {
                        Ok(inquire::validator::Validation::Valid)
                    } else {
                        Ok(inquire::validator::Validation::Invalid(
                            "Severity must be between 0 and 10".into(),
                        ))
                    }
                })
                .prompt()
                .map_err(ui_err)?;
            symptoms.push(SymptomReading::new(name, severity));
        }

        let mut draft = EntryDraft::new(disorder_id, symptoms);
        draft.title = optional_text("Title:")?;
        draft.mood = optional_number("Mood:", "Esc to skip")?;
        draft.sleep_hours = optional_number("Hours slept:", "Esc to skip")?;
        draft.stress_level = optional_number("Stress level:", "Esc to skip")?;

        let entry = self.journal.log_entry(draft).await?;
        println!("Logged entry #{} ({} symptoms).", entry.id, entry.symptoms().len());
        Ok(())
    }

    async fn log_medication(&self) -> Result<(), DomainError> {
        const ADD_NEW: i64 = -1;
        let mut choices: Vec<Choice<i64>> = self
            .journal
            .list_medications()
            .await?
            .into_iter()
            .filter(|m| m.is_active)
            .map(|m| Choice {
                label: match &m.dosage {
                    Some(dosage) => format!("{} {}", m.name, dosage),
                    None => m.name.clone(),
                },
                value: m.id,
            })
            .collect();
        choices.push(Choice {
            label: "+ Add medication".to_string(),
            value: ADD_NEW,
        });

        let picked = Select::new("Medication:", choices)
            .prompt()
            .map_err(ui_err)?;
        let medication_id = if picked.value == ADD_NEW {
            let name = Text::new("Name:").prompt().map_err(ui_err)?;
            let medication = self
                .journal
                .add_medication(NewMedication {
                    name,
                    dosage: optional_text("Dosage:")?,
                    frequency: optional_text("Frequency:")?,
                    prescribed_date: Local::now().date_naive(),
                    is_active: true,
                })
                .await?;
            medication.id
        } else {
            picked.value
        };

        let taken = Confirm::new("Taken?")
            .with_default(true)
            .prompt()
            .map_err(ui_err)?;
        let effectiveness = if taken {
            optional_number("Effectiveness (0-10):", "Esc to skip")?
        } else {
            None
        };
        let log = self
            .journal
            .log_medication(NewMedicationLog {
                medication_id,
                timestamp: Utc::now(),
                taken,
                effectiveness,
                notes: optional_text("Notes:")?,
            })
            .await?;
        println!("Logged dose #{}.", log.id);
        Ok(())
    }

    async fn record_switch(&self) -> Result<(), DomainError> {
        let mut alters = self.journal.list_alters().await?;
        if alters.is_empty() {
            println!("No alters yet. Add one first.");
            let name = Text::new("Alter name:").prompt().map_err(ui_err)?;
            let alter = self
                .journal
                .add_alter(NewAlter {
                    name,
                    age: None,
                    role: optional_text("Role:")?,
                    disorder_id: None,
                })
                .await?;
            alters.push(alter);
        }

        let mut from_choices = vec![Choice {
            label: "(unknown)".to_string(),
            value: None,
        }];
        from_choices.extend(alters.iter().map(|a| Choice {
            label: a.name.clone(),
            value: Some(a.id),
        }));
        let from = Select::new("Switching from:", from_choices)
            .prompt()
            .map_err(ui_err)?;

        let to_choices: Vec<Choice<i64>> = alters
            .iter()
            .filter(|a| Some(a.id) != from.value)
            .map(|a| Choice {
                label: a.name.clone(),
                value: a.id,
            })
            .collect();
        if to_choices.is_empty() {
            println!("No other alter to switch to.");
            return Ok(());
        }
        let to = Select::new("Switching to:", to_choices)
            .prompt()
            .map_err(ui_err)?;

        let switch = self
            .journal
            .record_switch(NewSwitch {
                from_alter_id: from.value,
                to_alter_id: to.value,
                notes: optional_text("Notes:")?,
                timestamp: Utc::now(),
                disorder_id: None,
            })
            .await?;
        println!("Recorded switch #{}.", switch.id);
        Ok(())
    }

    async fn log_therapy(&self) -> Result<(), DomainError> {
        let Some(disorder_id) = self.pick_disorder().await? else {
            return Ok(());
        };
        let therapist_name = Text::new("Therapist:").prompt().map_err(ui_err)?;
        let session = self
            .journal
            .log_therapy_session(NewTherapySession {
                timestamp: Utc::now(),
                therapist_name,
                notes: optional_text("Notes:")?,
                disorder_id,
            })
            .await?;
        println!("Logged therapy session #{}.", session.id);
        Ok(())
    }

    async fn export(&self) -> Result<(), DomainError> {
        let pb = progress::spinner("Exporting report...");
        let result = self.analytics.export_report(None).await;
        match &result {
            Ok(paths) => {
                pb.finish_with_message("Report exported");
                println!("  {}", paths.markdown.display());
                println!("  {}", paths.trends_csv.display());
                println!("  {}", paths.weekly_csv.display());
            }
            Err(_) => pb.finish_and_clear(),
        }
        result.map(|_| ())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let item = match Select::new("What next?", MenuItem::ALL.to_vec()).prompt() {
                Ok(item) => item,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                }
                Err(e) => return Err(ui_err(e)),
            };
            if item == MenuItem::Quit {
                return Ok(());
            }
            match self.dispatch(item).await {
                Ok(()) => {}
                Err(DomainError::Cancelled) => {}
                Err(e) => {
                    warn!(action = %item, error = %e, "action failed");
                    println!("Error: {}", e);
                }
            }
        }
    }
}
