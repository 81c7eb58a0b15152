//! Contract with the application that owns the family graph.
//!
//! The host owns every character, its relations and its attributes. Kinfile
//! only reads relations and reads or writes attributes through these traits.
//!
//! # Available Implementations
//!
//! | Host | Use Case |
//! |------|----------|
//! | [`InMemoryHost`] | Tests, CLI world files |
//!
//! # Implementor Notes
//!
//! - Relation accessors must not mutate state; the closure walk may call
//!   them many times for the same character
//! - `set_trait_level` clamps to the trait's range
//! - Lookups for unknown ids return [`crate::Error::EntityNotFound`]

mod memory;

pub use memory::{Character, Clan, InMemoryHost};

use crate::Result;
use crate::models::{Calendar, EntityId, LineageCode, Moment, Trait, TraitRange};

/// Upward and downward relation accessors used by the closure walk.
pub trait FamilyRelations {
    /// Biological father, if known.
    fn father(&self, id: &EntityId) -> Option<EntityId>;

    /// Biological mother, if known.
    fn mother(&self, id: &EntityId) -> Option<EntityId>;

    /// Characters sharing at least one parent, excluding `id`.
    fn siblings(&self, id: &EntityId) -> Vec<EntityId>;

    /// Children, in a stable host-defined order.
    fn children(&self, id: &EntityId) -> Vec<EntityId>;
}

/// Attribute access the import/export services need from the host.
pub trait Host: FamilyRelations {
    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Display name of a character.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn display_name(&self, id: &EntityId) -> Result<String>;

    /// Every character whose display name equals `name`.
    fn entities_named(&self, name: &str) -> Vec<EntityId>;

    /// The tracked character whose traits are experience-driven, if any.
    fn tracked_entity(&self) -> Option<EntityId>;

    /// Returns true if `id` is the tracked character.
    fn is_tracked(&self, id: &EntityId) -> bool {
        self.tracked_entity().as_ref() == Some(id)
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Unit sizes of the host calendar.
    fn calendar(&self) -> Calendar;

    /// Current moment, used to derive ages.
    fn now(&self) -> Moment;

    /// Exact birth moment of a character.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn birth_moment(&self, id: &EntityId) -> Result<Moment>;

    /// Overwrites the birth moment of a character.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn set_birth_moment(&mut self, id: &EntityId, moment: Moment) -> Result<()>;

    /// Age in years derived from the birth moment.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn age(&self, id: &EntityId) -> Result<f32> {
        let birth = self.birth_moment(id)?;
        Ok(self.calendar().years_between(birth, self.now()))
    }

    /// Re-derives the age-dependent body properties of a character.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn refresh_body(&mut self, id: &EntityId, age: f32) -> Result<()>;

    // ------------------------------------------------------------------
    // Traits
    // ------------------------------------------------------------------

    /// Valid level range of a trait.
    fn trait_range(&self, t: Trait) -> TraitRange;

    /// Current trait level.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn trait_level(&self, id: &EntityId, t: Trait) -> Result<i32>;

    /// Sets a trait level, clamped to [`Host::trait_range`].
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn set_trait_level(&mut self, id: &EntityId, t: Trait, level: i32) -> Result<()>;

    /// Current trait experience total.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn trait_xp(&self, id: &EntityId, t: Trait) -> Result<i32>;

    /// Adds (or with a negative delta removes) trait experience. The host
    /// recomputes the level.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn add_trait_xp(&mut self, id: &EntityId, t: Trait, delta: i32) -> Result<()>;

    /// Experience total needed to reach `level`.
    fn xp_required(&self, t: Trait, level: i32) -> i32;

    // ------------------------------------------------------------------
    // Lineage
    // ------------------------------------------------------------------

    /// Host-native name of a character's lineage.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist.
    fn lineage_name(&self, id: &EntityId) -> Result<String>;

    /// Resolves a record value to a known lineage code.
    fn parse_lineage(&self, raw: &str) -> Option<LineageCode>;

    /// Some character carrying `code`, if any.
    fn find_lineage_bearer(&self, code: &LineageCode) -> Option<EntityId>;

    /// Gives `id` the lineage carried by `bearer`.
    ///
    /// # Errors
    ///
    /// Returns an error if either character does not exist.
    fn adopt_lineage(&mut self, id: &EntityId, bearer: &EntityId) -> Result<()>;

    /// Returns true if `id` leads its group.
    fn leads_group(&self, id: &EntityId) -> bool;

    /// Copies the lineage of `id` to the group it leads.
    ///
    /// # Errors
    ///
    /// Returns an error if the character does not exist or leads no group.
    fn propagate_lineage_to_group(&mut self, id: &EntityId) -> Result<()>;
}
