//! # Kinfile
//!
//! Keeps one editable text record per character in sync with a few of that
//! character's attributes inside a family graph owned by a host application.
//!
//! Each record carries:
//!
//! - the birth moment, split into year, season, day and hour plus the exact
//!   sub-hour tick remainder,
//! - the lineage (culture) tag,
//! - the five bounded traits, or their experience totals for the tracked
//!   character.
//!
//! Exports write records for one character or for its whole family closure.
//! Imports read them back, applying each attribute group only when all of its
//! keys parse, and report exactly which groups were applied.
//!
//! ## Architecture
//!
//! - [`codec`] turns an [`codec::AttributeRecord`] into commented `key=value`
//!   text and back
//! - [`graph`] computes the family closure of a character
//! - [`config::mode`] persists the single/family scope selector
//! - [`services`] orchestrates export, import and mode toggling
//! - [`host`] is the contract the owning application implements
//!
//! ## Example
//!
//! ```rust,ignore
//! use kinfile::{ExportService, InMemoryHost, EntityId};
//! use kinfile::storage::InMemoryRecordStore;
//!
//! let host = InMemoryHost::from_json(&world_json)?;
//! let store = InMemoryRecordStore::new();
//! let service = ExportService::new(&store);
//! service.export(&host, &EntityId::new("lord_1"), &mut announcer)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod codec;
pub mod config;
pub mod graph;
pub mod host;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::{KinfileConfig, ModeSnapshot, ModeStore, ScopeMode};
pub use graph::{FamilyClosure, family_closure};
pub use host::{FamilyRelations, Host, InMemoryHost};
pub use models::{AppliedGroups, CalendarParts, EntityId, Moment, Trait};
pub use observability::{Announcer, Notice, NoticeSink};
pub use services::{
    Action, ActionDispatcher, ActionResult, BatchResult, ExportService, ImportOptions, ImportService,
};
pub use storage::{FilesystemRecordStore, RecordKey, RecordStore};

/// Error type for kinfile operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unsafe record keys, bad CLI arguments, unknown mode labels |
/// | `OperationFailed` | Filesystem I/O, (de)serialization, logging init |
/// | `EntityNotFound` | The host has no character with the given id |
/// | `ParseFailure` | A record value cannot be converted to its expected type |
/// | `MomentOutOfRange` | Recomposing a birth moment overflows the tick range |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Record or mode files cannot be read or written
    /// - The world file cannot be parsed
    /// - The tracing subscriber cannot be installed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The host does not know the requested character.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A record value could not be converted.
    ///
    /// Aborts the import of the whole record; nothing is applied.
    #[error("failed to parse {key} (value '{value}')")]
    ParseFailure {
        /// The record key whose value was rejected.
        key: String,
        /// The raw value as written in the record.
        value: String,
    },

    /// A birth moment could not be represented as a tick count.
    #[error("birth moment out of range at {field}")]
    MomentOutOfRange {
        /// The component where the overflow happened.
        field: &'static str,
    },
}

/// Result type alias for kinfile operations.
pub type Result<T> = std::result::Result<T, Error>;
