//! In-memory host.
//!
//! Holds a whole world (characters, clans and cultures) in ordered maps and
//! serializes to JSON, which is the format of the CLI's `--world` file:
//!
//! ```json
//! {
//!   "now": 78744000000000,
//!   "tracked": "player",
//!   "cultures": { "aserai": "Aserai", "vlandia": "Vlandia" },
//!   "clans": { "banu_hulwan": { "leader": "player", "lineage": "aserai" } },
//!   "characters": {
//!     "player": { "name": "Aldric", "birth": 72576000000000, "lineage": "aserai" }
//!   }
//! }
//! ```

use super::{FamilyRelations, Host};
use crate::models::{Calendar, EntityId, LineageCode, Moment, Trait, TraitRange};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default experience for the first trait level.
const DEFAULT_XP_STEP: i32 = 1_000;

/// A character in an [`InMemoryHost`] world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Display name; not unique.
    pub name: String,
    /// Father's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<EntityId>,
    /// Mother's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<EntityId>,
    /// Spouse's id. Never part of a family closure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<EntityId>,
    /// Exact birth moment.
    #[serde(default)]
    pub birth: Moment,
    /// Lineage code.
    pub lineage: LineageCode,
    /// Clan the character belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clan: Option<String>,
    /// Trait levels; missing traits are level 0.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traits: BTreeMap<Trait, i32>,
    /// Trait experience totals, only meaningful for the tracked character.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub trait_xp: BTreeMap<Trait, i32>,
    /// Age the body properties were last derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_age: Option<f32>,
}

impl Character {
    /// Creates a parentless character.
    #[must_use]
    pub fn new(name: impl Into<String>, lineage: LineageCode, birth: Moment) -> Self {
        Self {
            name: name.into(),
            father: None,
            mother: None,
            spouse: None,
            birth,
            lineage,
            clan: None,
            traits: BTreeMap::new(),
            trait_xp: BTreeMap::new(),
            body_age: None,
        }
    }

    /// Sets the father.
    #[must_use]
    pub fn with_father(mut self, father: impl Into<EntityId>) -> Self {
        self.father = Some(father.into());
        self
    }

    /// Sets the mother.
    #[must_use]
    pub fn with_mother(mut self, mother: impl Into<EntityId>) -> Self {
        self.mother = Some(mother.into());
        self
    }

    /// Sets the spouse.
    #[must_use]
    pub fn with_spouse(mut self, spouse: impl Into<EntityId>) -> Self {
        self.spouse = Some(spouse.into());
        self
    }

    /// Sets the clan.
    #[must_use]
    pub fn with_clan(mut self, clan: impl Into<String>) -> Self {
        self.clan = Some(clan.into());
        self
    }

    /// Sets a trait level.
    #[must_use]
    pub fn with_trait(mut self, t: Trait, level: i32) -> Self {
        self.traits.insert(t, level);
        self
    }

    /// Sets a trait experience total.
    #[must_use]
    pub fn with_trait_xp(mut self, t: Trait, xp: i32) -> Self {
        self.trait_xp.insert(t, xp);
        self
    }

    fn is_child_of(&self, parent: &EntityId) -> bool {
        self.father.as_ref() == Some(parent) || self.mother.as_ref() == Some(parent)
    }
}

/// A clan led by one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clan {
    /// Leader's id.
    pub leader: EntityId,
    /// The clan's own lineage.
    pub lineage: LineageCode,
}

/// A serializable world implementing [`Host`].
///
/// Children and siblings are derived from the `father` and `mother` links,
/// in id order. The tracked character's trait levels follow its experience:
/// level `n` needs `n² × xp_step` experience (negated for negative levels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryHost {
    /// Current moment.
    #[serde(default)]
    pub now: Moment,
    /// Tracked character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked: Option<EntityId>,
    /// Known lineages, code to display name.
    #[serde(default)]
    pub cultures: BTreeMap<LineageCode, String>,
    /// Clans by id.
    #[serde(default)]
    pub clans: BTreeMap<String, Clan>,
    /// Experience needed for the first trait level.
    #[serde(default = "default_xp_step")]
    pub xp_step: i32,
    /// Characters by id.
    #[serde(default)]
    pub characters: BTreeMap<EntityId, Character>,
    #[serde(skip)]
    calendar: Calendar,
}

const fn default_xp_step() -> i32 {
    DEFAULT_XP_STEP
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    /// Creates an empty world at moment zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Moment::default(),
            tracked: None,
            cultures: BTreeMap::new(),
            clans: BTreeMap::new(),
            xp_step: DEFAULT_XP_STEP,
            characters: BTreeMap::new(),
            calendar: Calendar::default(),
        }
    }

    /// Parses a world from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::OperationFailed {
            operation: "parse_world".to_string(),
            cause: e.to_string(),
        })
    }

    /// Serializes the world as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "serialize_world".to_string(),
            cause: e.to_string(),
        })
    }

    /// Sets the current moment.
    #[must_use]
    pub const fn with_now(mut self, now: Moment) -> Self {
        self.now = now;
        self
    }

    /// Sets the calendar.
    #[must_use]
    pub const fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Registers a lineage.
    #[must_use]
    pub fn with_culture(mut self, code: LineageCode, name: impl Into<String>) -> Self {
        self.cultures.insert(code, name.into());
        self
    }

    /// Registers a clan.
    #[must_use]
    pub fn with_clan(mut self, id: impl Into<String>, clan: Clan) -> Self {
        self.clans.insert(id.into(), clan);
        self
    }

    /// Adds a character.
    #[must_use]
    pub fn with_character(mut self, id: impl Into<EntityId>, character: Character) -> Self {
        self.characters.insert(id.into(), character);
        self
    }

    /// Marks a character as tracked.
    #[must_use]
    pub fn with_tracked(mut self, id: impl Into<EntityId>) -> Self {
        self.tracked = Some(id.into());
        self
    }

    /// Returns a character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntityNotFound`] if there is no such character.
    pub fn character(&self, id: &EntityId) -> Result<&Character> {
        self.characters
            .get(id)
            .ok_or_else(|| Error::EntityNotFound(id.clone()))
    }

    fn character_mut(&mut self, id: &EntityId) -> Result<&mut Character> {
        self.characters
            .get_mut(id)
            .ok_or_else(|| Error::EntityNotFound(id.clone()))
    }

    fn clan_led_by(&self, id: &EntityId) -> Option<&str> {
        let clan_id = self.characters.get(id)?.clan.as_deref()?;
        self.clans
            .get(clan_id)
            .filter(|clan| &clan.leader == id)
            .map(|_| clan_id)
    }

    /// Level reached with `xp` experience.
    fn level_for_xp(&self, t: Trait, xp: i32) -> i32 {
        let range = self.trait_range(t);
        if xp >= 0 {
            range
                .levels()
                .filter(|level| *level >= 0 && xp >= self.xp_required(t, *level))
                .max()
                .unwrap_or(0)
        } else {
            range
                .levels()
                .filter(|level| *level <= 0 && xp <= self.xp_required(t, *level))
                .min()
                .unwrap_or(0)
        }
    }
}

impl FamilyRelations for InMemoryHost {
    fn father(&self, id: &EntityId) -> Option<EntityId> {
        self.characters.get(id)?.father.clone()
    }

    fn mother(&self, id: &EntityId) -> Option<EntityId> {
        self.characters.get(id)?.mother.clone()
    }

    fn siblings(&self, id: &EntityId) -> Vec<EntityId> {
        let Some(character) = self.characters.get(id) else {
            return Vec::new();
        };
        let parents: Vec<&EntityId> = character
            .father
            .iter()
            .chain(character.mother.iter())
            .collect();
        self.characters
            .iter()
            .filter(|(other, c)| *other != id && parents.iter().any(|p| c.is_child_of(p)))
            .map(|(other, _)| other.clone())
            .collect()
    }

    fn children(&self, id: &EntityId) -> Vec<EntityId> {
        self.characters
            .iter()
            .filter(|(_, c)| c.is_child_of(id))
            .map(|(child, _)| child.clone())
            .collect()
    }
}

impl Host for InMemoryHost {
    fn display_name(&self, id: &EntityId) -> Result<String> {
        Ok(self.character(id)?.name.clone())
    }

    fn entities_named(&self, name: &str) -> Vec<EntityId> {
        self.characters
            .iter()
            .filter(|(_, c)| c.name == name)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn tracked_entity(&self) -> Option<EntityId> {
        self.tracked.clone()
    }

    fn calendar(&self) -> Calendar {
        self.calendar
    }

    fn now(&self) -> Moment {
        self.now
    }

    fn birth_moment(&self, id: &EntityId) -> Result<Moment> {
        Ok(self.character(id)?.birth)
    }

    fn set_birth_moment(&mut self, id: &EntityId, moment: Moment) -> Result<()> {
        self.character_mut(id)?.birth = moment;
        Ok(())
    }

    fn refresh_body(&mut self, id: &EntityId, age: f32) -> Result<()> {
        self.character_mut(id)?.body_age = Some(age);
        Ok(())
    }

    fn trait_range(&self, _t: Trait) -> TraitRange {
        TraitRange::default()
    }

    fn trait_level(&self, id: &EntityId, t: Trait) -> Result<i32> {
        Ok(self.character(id)?.traits.get(&t).copied().unwrap_or(0))
    }

    fn set_trait_level(&mut self, id: &EntityId, t: Trait, level: i32) -> Result<()> {
        let level = self.trait_range(t).clamp(level);
        self.character_mut(id)?.traits.insert(t, level);
        Ok(())
    }

    fn trait_xp(&self, id: &EntityId, t: Trait) -> Result<i32> {
        Ok(self.character(id)?.trait_xp.get(&t).copied().unwrap_or(0))
    }

    fn add_trait_xp(&mut self, id: &EntityId, t: Trait, delta: i32) -> Result<()> {
        let xp = self.trait_xp(id, t)?.saturating_add(delta);
        let level = self.level_for_xp(t, xp);
        let character = self.character_mut(id)?;
        character.trait_xp.insert(t, xp);
        character.traits.insert(t, level);
        Ok(())
    }

    fn xp_required(&self, _t: Trait, level: i32) -> i32 {
        level
            .saturating_mul(level.saturating_abs())
            .saturating_mul(self.xp_step)
    }

    fn lineage_name(&self, id: &EntityId) -> Result<String> {
        let code = &self.character(id)?.lineage;
        Ok(self
            .cultures
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string()))
    }

    fn parse_lineage(&self, raw: &str) -> Option<LineageCode> {
        let code = LineageCode::parse(raw)?;
        if self.cultures.contains_key(&code) {
            return Some(code);
        }
        // Exports write the display name, which may differ from the code.
        let wanted = raw.trim().to_lowercase();
        self.cultures
            .iter()
            .find(|(_, name)| name.trim().to_lowercase() == wanted)
            .map(|(code, _)| code.clone())
    }

    fn find_lineage_bearer(&self, code: &LineageCode) -> Option<EntityId> {
        self.characters
            .iter()
            .find(|(_, c)| &c.lineage == code)
            .map(|(id, _)| id.clone())
    }

    fn adopt_lineage(&mut self, id: &EntityId, bearer: &EntityId) -> Result<()> {
        let lineage = self.character(bearer)?.lineage.clone();
        self.character_mut(id)?.lineage = lineage;
        Ok(())
    }

    fn leads_group(&self, id: &EntityId) -> bool {
        self.clan_led_by(id).is_some()
    }

    fn propagate_lineage_to_group(&mut self, id: &EntityId) -> Result<()> {
        let lineage = self.character(id)?.lineage.clone();
        let clan_id = self
            .clan_led_by(id)
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidInput(format!("{id} does not lead a clan")))?;
        if let Some(clan) = self.clans.get_mut(&clan_id) {
            clan.lineage = lineage;
        }
        Ok(())
    }
}
