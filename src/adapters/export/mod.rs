//! Export adapters. Turn aggregator output into files for spreadsheets.

pub mod csv_export;

pub use csv_export::{trends_to_csv, weekly_to_csv};
