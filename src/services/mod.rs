//! Import and export pipeline.
//!
//! Services move attributes between a [`crate::Host`] and a
//! [`crate::RecordStore`], one entity at a time or over a family closure.
//! The [`ActionDispatcher`] ties them to the persisted scope mode.

mod dispatch;
mod export;
mod import;

pub use dispatch::{Action, ActionDispatcher, ActionResult};
pub use export::ExportService;
pub use import::{ImportOptions, ImportService};

use crate::models::EntityId;

/// Result of running one operation over a family closure.
///
/// Failures on one member never stop the others; each is kept here with
/// the error text that was announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult<T> {
    /// Members the operation completed for, in closure order.
    pub completed: Vec<(EntityId, T)>,
    /// Members it failed for, with the error.
    pub failed: Vec<(EntityId, String)>,
}

impl<T> BatchResult<T> {
    const fn new() -> Self {
        Self {
            completed: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Number of members processed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    /// Returns true if no member was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every member completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::new()
    }
}
