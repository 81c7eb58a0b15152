//! Data models for kinfile.
//!
//! This module contains the value types shared by the codec, the graph walk
//! and the import/export services.

mod entity;
mod lineage;
pub mod moment;
mod outcome;
mod traits;

pub use entity::EntityId;
pub use lineage::LineageCode;
pub use moment::{Calendar, CalendarParts, Moment, TICKS_PER_SECOND};
pub use outcome::{AppliedGroups, ImportOutcome};
pub use traits::{Trait, TraitRange, TraitValues};
