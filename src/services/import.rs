//! Record import.
//!
//! An import runs in two phases. Every expected key is converted first, and
//! the first failure aborts the entity with nothing applied. Only then are
//! the complete groups written to the host:
//!
//! | Group | Keys | Applied as |
//! |-------|------|------------|
//! | Birthday | `Year` `Season` `Day` `Hour` `RemainingTicks` | exact birth moment |
//! | Lineage | `Culture` | lineage adopted from a bearer |
//! | Traits | five levels, or five `XP` totals for the tracked entity | clamped levels or experience deltas |

use super::BatchResult;
use crate::codec::schema::{self, CULTURE, DAY, HOUR, REMAINING_TICKS, SEASON, TypedValue, YEAR};
use crate::codec::{self, AttributeRecord};
use crate::graph::family_closure;
use crate::host::Host;
use crate::models::{
    AppliedGroups, CalendarParts, EntityId, ImportOutcome, Moment, Trait, TraitValues,
};
use crate::observability::{Announcer, NoticeSink};
use crate::storage::{RecordKey, RecordStore};
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Options for an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Re-derive age-dependent body properties after a birthday change.
    pub refresh_appearance: bool,
}

impl ImportOptions {
    /// Sets `refresh_appearance`.
    #[must_use]
    pub const fn with_refresh_appearance(mut self, refresh: bool) -> Self {
        self.refresh_appearance = refresh;
        self
    }
}

/// Applies records back onto entities.
pub struct ImportService<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> ImportService<'a, S> {
    /// Creates an import service over a record store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Imports one entity's record.
    ///
    /// A missing record is skipped silently. A value that fails to convert
    /// is announced and nothing is applied. Otherwise every group whose keys
    /// are all present is applied and one summary notice is announced.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not exist, the record cannot be
    /// read, or the host rejects a change.
    #[instrument(skip_all, fields(entity = %id))]
    pub fn import<H, N>(
        &self,
        host: &mut H,
        id: &EntityId,
        options: ImportOptions,
        announcer: &mut Announcer<N>,
    ) -> Result<ImportOutcome>
    where
        H: Host + ?Sized,
        N: NoticeSink,
    {
        let name = host.display_name(id)?;
        let key = RecordKey::for_entity(&name, id);
        let Some(text) = self.store.read(&key)? else {
            debug!(key = %key, "no record, skipping");
            return Ok(ImportOutcome::RecordMissing);
        };

        let record = codec::decode(&text);
        let plan = match ImportPlan::build(&*host, id, &record) {
            Ok(plan) => plan,
            Err(Error::ParseFailure { key, value }) => {
                warn!(key = %key, value = %value, "unparseable value");
                announcer.warn(format!("Failed to parse {key} for {name}"));
                return Ok(ImportOutcome::ParseFailed { key });
            },
            Err(Error::MomentOutOfRange { field }) => {
                warn!(field, "birth moment out of range");
                announcer.warn(format!("Failed to parse {field} for {name}"));
                return Ok(ImportOutcome::ParseFailed {
                    key: field.to_string(),
                });
            },
            Err(e) => return Err(e),
        };

        let applied = plan.apply(host, id, options)?;
        if let Some(groups) = applied.describe() {
            let appearance = if options.refresh_appearance {
                "Appearance updated."
            } else {
                "Appearance not updated."
            };
            announcer.success(format!("Imported {name}'s {groups}. {appearance}"));
        } else {
            debug!("record had no complete group");
        }
        Ok(ImportOutcome::Applied(applied))
    }

    /// Imports every member of the entity's family closure.
    ///
    /// The closure is computed once, before any member is changed.
    pub fn import_closure<H, N>(
        &self,
        host: &mut H,
        origin: &EntityId,
        options: ImportOptions,
        announcer: &mut Announcer<N>,
    ) -> BatchResult<ImportOutcome>
    where
        H: Host + ?Sized,
        N: NoticeSink,
    {
        let closure = family_closure(&*host, origin);
        let mut result = BatchResult::default();
        for id in &closure {
            match self.import(host, id, options, announcer) {
                Ok(outcome) => result.completed.push((id.clone(), outcome)),
                Err(e) => {
                    warn!(entity = %id, error = %e, "import failed");
                    announcer.warn(format!("Failed to import {id}: {e}"));
                    result.failed.push((id.clone(), e.to_string()));
                },
            }
        }
        result
    }
}

/// Changes to make to one entity, all validated up front.
#[derive(Debug, Default)]
struct ImportPlan {
    birth: Option<Moment>,
    lineage_bearer: Option<EntityId>,
    traits: Option<TraitValues>,
    tracked: bool,
}

impl ImportPlan {
    fn build<H: Host + ?Sized>(host: &H, id: &EntityId, record: &AttributeRecord) -> Result<Self> {
        let tracked = host.is_tracked(id);
        let values = convert_expected(record, tracked)?;

        let birth = match (
            int(&values, YEAR),
            int(&values, SEASON),
            int(&values, DAY),
            int(&values, HOUR),
            values.get(REMAINING_TICKS).and_then(TypedValue::as_i64),
        ) {
            (Some(year), Some(season), Some(day), Some(hour), Some(remaining)) => Some(
                host.calendar()
                    .compose_exact(CalendarParts::new(year, season, day, hour), remaining)?,
            ),
            _ => None,
        };

        // Unknown lineages leave the group unapplied.
        let lineage_bearer = values
            .get(CULTURE)
            .and_then(TypedValue::as_text)
            .and_then(|raw| host.parse_lineage(raw))
            .and_then(|code| host.find_lineage_bearer(&code));

        let trait_key = |t: Trait| if tracked { t.xp_key() } else { t.as_str() };
        let mut traits = TraitValues::default();
        let mut complete = true;
        for t in Trait::all() {
            match int(&values, trait_key(*t)) {
                Some(value) => traits.set(*t, value),
                None => complete = false,
            }
        }

        Ok(Self {
            birth,
            lineage_bearer,
            traits: complete.then_some(traits),
            tracked,
        })
    }

    fn apply<H: Host + ?Sized>(
        self,
        host: &mut H,
        id: &EntityId,
        options: ImportOptions,
    ) -> Result<AppliedGroups> {
        let mut applied = AppliedGroups::default();

        if let Some(birth) = self.birth {
            host.set_birth_moment(id, birth)?;
            if options.refresh_appearance {
                let age = host.age(id)?;
                host.refresh_body(id, age)?;
            }
            debug!(birth = %birth, "birthday applied");
            applied.birthday = true;
        }

        if let Some(bearer) = self.lineage_bearer {
            host.adopt_lineage(id, &bearer)?;
            if host.leads_group(id) {
                host.propagate_lineage_to_group(id)?;
            }
            debug!(bearer = %bearer, "lineage applied");
            applied.lineage = true;
        }

        if let Some(traits) = self.traits {
            for (t, target) in traits.iter() {
                if self.tracked {
                    move_trait_xp(host, id, t, target)?;
                } else {
                    let level = host.trait_range(t).clamp(target);
                    host.set_trait_level(id, t, level)?;
                }
            }
            debug!(tracked = self.tracked, "traits applied");
            applied.traits = true;
        }

        Ok(applied)
    }
}

/// Adds experience until the total reaches `target`.
///
/// The gap between two `i32` totals can exceed `i32`, so it is closed in at
/// most two steps. Zero gaps add nothing.
fn move_trait_xp<H: Host + ?Sized>(
    host: &mut H,
    id: &EntityId,
    t: Trait,
    target: i32,
) -> Result<()> {
    let mut remaining = i64::from(target) - i64::from(host.trait_xp(id, t)?);
    while remaining != 0 {
        let step = i32::try_from(remaining.clamp(i64::from(i32::MIN), i64::from(i32::MAX)))
            .map_err(|e| Error::OperationFailed {
                operation: "add_trait_xp".to_string(),
                cause: e.to_string(),
            })?;
        host.add_trait_xp(id, t, step)?;
        remaining -= i64::from(step);
    }
    Ok(())
}

/// Converts, in record order, every entry this entity reads on import.
///
/// The last occurrence of a key wins; the first unconvertible value fails.
fn convert_expected(
    record: &AttributeRecord,
    tracked: bool,
) -> Result<HashMap<&'static str, TypedValue>> {
    let mut values = HashMap::new();
    for (key, raw) in record.iter() {
        let Some(spec) = schema::lookup(key) else {
            continue;
        };
        if !spec.group.is_read_on_import(tracked) {
            continue;
        }
        values.insert(spec.key, spec.convert(raw)?);
    }
    Ok(values)
}

fn int(values: &HashMap<&'static str, TypedValue>, key: &str) -> Option<i32> {
    values.get(key).and_then(TypedValue::as_i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Character, Clan, InMemoryHost};
    use crate::models::{Calendar, LineageCode};
    use crate::observability::MemorySink;
    use crate::storage::InMemoryRecordStore;

    fn code(raw: &str) -> LineageCode {
        LineageCode::parse(raw).unwrap()
    }

    fn world() -> InMemoryHost {
        InMemoryHost::new()
            .with_culture(code("aserai"), "Aserai")
            .with_culture(code("vlandia"), "Vlandia")
            .with_clan(
                "banu",
                Clan {
                    leader: EntityId::new("lord"),
                    lineage: code("aserai"),
                },
            )
            .with_character(
                "lord",
                Character::new("Faris", code("aserai"), Moment::default()).with_clan("banu"),
            )
            .with_character(
                "knight",
                Character::new("Bran", code("vlandia"), Moment::default()),
            )
            .with_character(
                "player",
                Character::new("Aldric", code("aserai"), Moment::default())
                    .with_trait_xp(Trait::Honor, 500),
            )
            .with_tracked("player")
    }

    fn store_with(id: &str, name: &str, text: &str) -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        store
            .write(&RecordKey::for_entity(name, &EntityId::new(id)), text)
            .unwrap();
        store
    }

    const BIRTHDAY: &str = "Year=1084\nSeason=2\nDay=5\nHour=10\nRemainingTicks=4321\n";
    const LEVELS: &str = "Mercy=1\nValor=-1\nHonor=5\nGenerosity=0\nCalculating=2\n";

    #[test]
    fn test_import_missing_record_is_silent() {
        let mut host = world();
        let store = InMemoryRecordStore::new();
        let mut announcer = Announcer::new(MemorySink::new());

        let outcome = ImportService::new(&store)
            .import(&mut host, &EntityId::new("lord"), ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(outcome, ImportOutcome::RecordMissing);
        assert!(announcer.sink().notices().is_empty());
    }

    #[test]
    fn test_import_all_groups() {
        let mut host = world();
        let text = format!("{BIRTHDAY}Culture=Vlandia\n{LEVELS}");
        let store = store_with("lord", "Faris", &text);
        let mut announcer = Announcer::new(MemorySink::new());
        let id = EntityId::new("lord");

        let outcome = ImportService::new(&store)
            .import(&mut host, &id, ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Applied(AppliedGroups {
                birthday: true,
                lineage: true,
                traits: true,
            })
        );

        let expected = Calendar::default()
            .compose_exact(CalendarParts::new(1084, 2, 5, 10), 4321)
            .unwrap();
        assert_eq!(host.birth_moment(&id).unwrap(), expected);
        assert_eq!(host.character(&id).unwrap().lineage, code("vlandia"));
        assert_eq!(host.clans["banu"].lineage, code("vlandia"));
        assert_eq!(host.trait_level(&id, Trait::Honor).unwrap(), 2);
        assert_eq!(host.trait_level(&id, Trait::Valor).unwrap(), -1);
        assert!(host.character(&id).unwrap().body_age.is_none());
        assert_eq!(
            announcer.sink().texts(),
            ["Imported Faris's birthday, lineage and traits. Appearance not updated."]
        );
    }

    #[test]
    fn test_import_missing_hour_applies_traits_only() {
        let mut host = world();
        let text = format!("Year=1084\nSeason=2\nDay=5\nRemainingTicks=4321\n{LEVELS}");
        let store = store_with("knight", "Bran", &text);
        let mut announcer = Announcer::new(MemorySink::new());
        let id = EntityId::new("knight");

        let outcome = ImportService::new(&store)
            .import(&mut host, &id, ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Applied(AppliedGroups {
                traits: true,
                ..AppliedGroups::default()
            })
        );
        assert_eq!(host.birth_moment(&id).unwrap(), Moment::default());
        assert_eq!(
            announcer.sink().texts(),
            ["Imported Bran's traits. Appearance not updated."]
        );
    }

    #[test]
    fn test_import_parse_failure_applies_nothing() {
        let mut host = world();
        let text = format!("{BIRTHDAY}Mercy=1\nValor=brave\nHonor=1\nGenerosity=0\nCalculating=0\n");
        let store = store_with("knight", "Bran", &text);
        let mut announcer = Announcer::new(MemorySink::new());
        let id = EntityId::new("knight");

        let outcome = ImportService::new(&store)
            .import(&mut host, &id, ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::ParseFailed {
                key: "Valor".to_string()
            }
        );
        assert_eq!(host.birth_moment(&id).unwrap(), Moment::default());
        assert_eq!(host.trait_level(&id, Trait::Honor).unwrap(), 0);
        assert_eq!(announcer.sink().texts(), ["Failed to parse Valor for Bran"]);
    }

    #[test]
    fn test_import_out_of_range_moment_applies_nothing() {
        let mut host = world();
        let text = format!("Year=2147483647\nSeason=3\nDay=20\nHour=23\nRemainingTicks=0\n{LEVELS}");
        let store = store_with("knight", "Bran", &text);
        let mut announcer = Announcer::new(MemorySink::new());
        let id = EntityId::new("knight");

        let outcome = ImportService::new(&store)
            .import(&mut host, &id, ImportOptions::default(), &mut announcer)
            .unwrap();
        assert!(matches!(outcome, ImportOutcome::ParseFailed { .. }));
        assert_eq!(host.trait_level(&id, Trait::Mercy).unwrap(), 0);
    }

    #[test]
    fn test_import_unknown_lineage_is_not_applied() {
        let mut host = world();
        let store = store_with("knight", "Bran", "Culture=Atlantis\n");
        let mut announcer = Announcer::new(MemorySink::new());
        let id = EntityId::new("knight");

        let outcome = ImportService::new(&store)
            .import(&mut host, &id, ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Applied(AppliedGroups::default()));
        assert_eq!(host.character(&id).unwrap().lineage, code("vlandia"));
        assert!(announcer.sink().notices().is_empty());
    }

    #[test]
    fn test_import_tracked_uses_experience() {
        let mut host = world();
        let text = "Mercy=2\nValor=2\nHonor=2\nGenerosity=2\nCalculating=2\n\
                    MercyXP=0\nValorXP=1000\nHonorXP=500\nGenerosityXP=-4000\nCalculatingXP=0\n";
        let store = store_with("player", "Aldric", text);
        let mut announcer = Announcer::new(MemorySink::new());
        let id = EntityId::new("player");

        ImportService::new(&store)
            .import(&mut host, &id, ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(host.trait_xp(&id, Trait::Valor).unwrap(), 1_000);
        assert_eq!(host.trait_level(&id, Trait::Valor).unwrap(), 1);
        assert_eq!(host.trait_xp(&id, Trait::Honor).unwrap(), 500);
        assert_eq!(host.trait_level(&id, Trait::Generosity).unwrap(), -2);
        // Level keys are not read for the tracked entity.
        assert_eq!(host.trait_level(&id, Trait::Mercy).unwrap(), 0);
    }

    #[test]
    fn test_import_tracked_reaches_distant_experience_target() {
        let mut host = world();
        let id = EntityId::new("player");
        host.characters
            .get_mut(&id)
            .unwrap()
            .trait_xp
            .insert(Trait::Valor, -2_000_000_000);
        let text = format!(
            "MercyXP=0\nValorXP={}\nHonorXP=500\nGenerosityXP=0\nCalculatingXP={}\n",
            i32::MAX,
            i32::MIN
        );
        let store = store_with("player", "Aldric", &text);
        let mut announcer = Announcer::new(MemorySink::new());

        ImportService::new(&store)
            .import(&mut host, &id, ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(host.trait_xp(&id, Trait::Valor).unwrap(), i32::MAX);
        assert_eq!(host.trait_level(&id, Trait::Valor).unwrap(), 2);
        assert_eq!(host.trait_xp(&id, Trait::Calculating).unwrap(), i32::MIN);
        assert_eq!(host.trait_level(&id, Trait::Calculating).unwrap(), -2);
    }

    #[test]
    fn test_import_tracked_ignores_bad_level_values() {
        let mut host = world();
        let store = store_with("player", "Aldric", "Mercy=high\n");
        let mut announcer = Announcer::new(MemorySink::new());

        let outcome = ImportService::new(&store)
            .import(&mut host, &EntityId::new("player"), ImportOptions::default(), &mut announcer)
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Applied(AppliedGroups::default()));
    }

    #[test]
    fn test_import_refreshes_appearance() {
        let calendar = Calendar::default();
        let mut host = world().with_now(Moment::from_ticks(calendar.ticks_per_year() * 1_104));
        let store = store_with("knight", "Bran", "Year=1084\nSeason=0\nDay=0\nHour=0\nRemainingTicks=0\n");
        let mut announcer = Announcer::new(MemorySink::new());
        let id = EntityId::new("knight");

        ImportService::new(&store)
            .import(
                &mut host,
                &id,
                ImportOptions::default().with_refresh_appearance(true),
                &mut announcer,
            )
            .unwrap();
        let age = host.character(&id).unwrap().body_age.unwrap();
        assert!((age - 20.0).abs() < 1e-3);
        assert_eq!(
            announcer.sink().texts(),
            ["Imported Bran's birthday. Appearance updated."]
        );
    }

    #[test]
    fn test_import_closure_continues_past_parse_failures() {
        let mut host = world()
            .with_character(
                "heir",
                Character::new("Zaid", code("aserai"), Moment::default()).with_father("lord"),
            );
        let store = store_with("lord", "Faris", "Valor=x\n");
        store
            .write(
                &RecordKey::for_entity("Zaid", &EntityId::new("heir")),
                "Culture=vlandia\n",
            )
            .unwrap();
        let mut announcer = Announcer::new(MemorySink::new());

        let result = ImportService::new(&store).import_closure(
            &mut host,
            &EntityId::new("heir"),
            ImportOptions::default(),
            &mut announcer,
        );
        assert!(result.is_success());
        assert_eq!(result.len(), 2);
        assert_eq!(
            host.character(&EntityId::new("heir")).unwrap().lineage,
            code("vlandia")
        );
        assert_eq!(
            announcer.sink().texts(),
            [
                "Imported Zaid's lineage. Appearance not updated.",
                "Failed to parse Valor for Faris",
            ]
        );
    }
}
