use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::Field;

/// Errors reported by the record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Error loading data from {}: {}", .path.display(), .source)]
    Load { path: PathBuf, source: io::Error },

    #[error("Error saving data to {}: {}", .path.display(), .source)]
    Save { path: PathBuf, source: io::Error },

    #[error("Error displaying updates and patches: {0}")]
    Render(#[source] io::Error),

    #[error("No updates or patches recorded yet.")]
    Empty,

    #[error("No updates found for app '{app}'.")]
    UnknownApp { app: String },

    #[error("No update or patch found for the given {field} in {app}.")]
    NoMatches { app: String, field: Field },

    #[error("Invalid date '{value}'. Expected YYYY-MM-DD.")]
    InvalidDate { value: String },

    #[error("Invalid date {date}. Please enter a future date.")]
    NotInFuture { date: String },

    #[error("Invalid month {year}-{month}.")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Unknown field '{name}'.")]
    UnknownField { name: String },

    #[error("Invalid choice. There is no app #{} ({} recorded).", .index + 1, .len)]
    AppIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid choice. {} has no log #{} ({} recorded).", .app, .index + 1, .len)]
    EntryIndexOutOfRange { app: String, index: usize, len: usize },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::UnknownApp { .. } | StoreError::NoMatches { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidDate { .. }
                | StoreError::NotInFuture { .. }
                | StoreError::InvalidMonth { .. }
                | StoreError::UnknownField { .. }
                | StoreError::AppIndexOutOfRange { .. }
                | StoreError::EntryIndexOutOfRange { .. }
        )
    }
}
