//! Application use cases. Orchestrate domain logic via ports.

pub mod analytics_service;
pub mod journal_service;

pub use analytics_service::{AnalyticsService, ReportPaths};
pub use journal_service::{EntryDraft, JournalService};
