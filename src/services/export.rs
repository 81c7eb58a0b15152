//! Record export.

use super::BatchResult;
use crate::codec::schema::{
    CULTURE, DAY, FORMATTED_BIRTHDAY, HOUR, REMAINING_TICKS, SEASON, YEAR,
};
use crate::codec::{self, AttributeRecord, RecordMetadata};
use crate::graph::family_closure;
use crate::host::Host;
use crate::models::{EntityId, Trait};
use crate::observability::{Announcer, NoticeSink};
use crate::storage::{RecordKey, RecordStore};
use crate::Result;
use tracing::{debug, instrument, warn};

/// Writes entity attributes to records.
///
/// Export never mutates the host.
pub struct ExportService<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> ExportService<'a, S> {
    /// Creates an export service over a record store.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Exports one entity, overwriting its record.
    ///
    /// Announces a warning first when other characters share the entity's
    /// display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity does not exist, its birth moment
    /// cannot be decomposed, or the record cannot be written.
    #[instrument(skip_all, fields(entity = %id))]
    pub fn export<H, N>(
        &self,
        host: &H,
        id: &EntityId,
        announcer: &mut Announcer<N>,
    ) -> Result<RecordKey>
    where
        H: Host + ?Sized,
        N: NoticeSink,
    {
        let name = host.display_name(id)?;
        let tracked = host.is_tracked(id);
        let record = build_record(host, id, tracked)?;

        let metadata = RecordMetadata::new(&name)
            .with_tracked(tracked)
            .with_trait_range(host.trait_range(Trait::Mercy));
        let key = RecordKey::for_entity(&name, id);
        self.store.write(&key, &codec::encode(&record, &metadata))?;
        debug!(key = %key, entries = record.len(), "record written");

        let namesakes = host.entities_named(&name).len();
        if namesakes > 1 {
            announcer.warn(format!(
                "{namesakes} characters are named {name}. This one was exported to {}.",
                key.file_name()
            ));
        }
        announcer.success(format!("Exported {name}'s birthday, lineage and traits."));
        Ok(key)
    }

    /// Exports every member of the entity's family closure.
    ///
    /// A failing member is announced and recorded; the rest still run.
    pub fn export_closure<H, N>(
        &self,
        host: &H,
        origin: &EntityId,
        announcer: &mut Announcer<N>,
    ) -> BatchResult<RecordKey>
    where
        H: Host + ?Sized,
        N: NoticeSink,
    {
        let closure = family_closure(host, origin);
        let mut result = BatchResult::default();
        for id in &closure {
            match self.export(host, id, announcer) {
                Ok(key) => result.completed.push((id.clone(), key)),
                Err(e) => {
                    warn!(entity = %id, error = %e, "export failed");
                    announcer.warn(format!("Failed to export {id}: {e}"));
                    result.failed.push((id.clone(), e.to_string()));
                },
            }
        }
        result
    }
}

/// Reads every exported attribute of one entity from the host.
fn build_record<H: Host + ?Sized>(host: &H, id: &EntityId, tracked: bool) -> Result<AttributeRecord> {
    let calendar = host.calendar();
    let birth = host.birth_moment(id)?;
    let (parts, remaining) = calendar.decompose(birth)?;

    let mut record = AttributeRecord::new()
        .with(YEAR, parts.year)
        .with(SEASON, parts.season)
        .with(DAY, parts.day)
        .with(HOUR, parts.hour)
        .with(REMAINING_TICKS, remaining)
        .with(CULTURE, host.lineage_name(id)?);

    for t in Trait::all() {
        record.push(t.as_str(), host.trait_level(id, *t)?.to_string());
    }
    if tracked {
        for t in Trait::all() {
            record.push(t.xp_key(), host.trait_xp(id, *t)?.to_string());
        }
    }

    record.push(FORMATTED_BIRTHDAY, calendar.format(birth));
    if tracked {
        for t in Trait::all() {
            for level in host.trait_range(*t).levels() {
                record.push(
                    t.xp_required_key(level),
                    host.xp_required(*t, level).to_string(),
                );
            }
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Character, InMemoryHost};
    use crate::models::{CalendarParts, LineageCode, Moment};
    use crate::observability::MemorySink;
    use crate::storage::InMemoryRecordStore;

    fn code(raw: &str) -> LineageCode {
        LineageCode::parse(raw).unwrap()
    }

    fn birth() -> Moment {
        let calendar = crate::models::Calendar::default();
        calendar
            .compose_exact(CalendarParts::new(1084, 2, 5, 10), 4321)
            .unwrap()
    }

    fn world() -> InMemoryHost {
        InMemoryHost::new()
            .with_culture(code("aserai"), "Aserai")
            .with_character(
                "player",
                Character::new("Aldric", code("aserai"), birth())
                    .with_trait(Trait::Valor, 1)
                    .with_trait_xp(Trait::Valor, 1_200),
            )
            .with_character(
                "son",
                Character::new("Omar", code("aserai"), birth())
                    .with_father("player")
                    .with_trait(Trait::Mercy, -2),
            )
            .with_tracked("player")
    }

    #[test]
    fn test_export_untracked_record() {
        let host = world();
        let store = InMemoryRecordStore::new();
        let mut announcer = Announcer::new(MemorySink::new());

        let key = ExportService::new(&store)
            .export(&host, &EntityId::new("son"), &mut announcer)
            .unwrap();
        assert_eq!(key.as_str(), "Omar.son");

        let record = codec::decode(&store.read(&key).unwrap().unwrap());
        assert_eq!(record.get("Year"), Some("1084"));
        assert_eq!(record.get("Season"), Some("2"));
        assert_eq!(record.get("Day"), Some("5"));
        assert_eq!(record.get("Hour"), Some("10"));
        assert_eq!(record.get("RemainingTicks"), Some("4321"));
        assert_eq!(record.get("Culture"), Some("Aserai"));
        assert_eq!(record.get("Mercy"), Some("-2"));
        assert_eq!(record.get("Valor"), Some("0"));
        assert_eq!(record.get("FormattedBirthday"), Some("Autumn 6, 1084"));
        assert!(!record.contains("MercyXP"));
        assert!(!record.contains("MercyXPRequired1"));

        assert_eq!(
            announcer.sink().texts(),
            ["Exported Omar's birthday, lineage and traits."]
        );
    }

    #[test]
    fn test_export_tracked_record_has_experience() {
        let host = world();
        let store = InMemoryRecordStore::new();
        let mut announcer = Announcer::new(MemorySink::new());

        let key = ExportService::new(&store)
            .export(&host, &EntityId::new("player"), &mut announcer)
            .unwrap();
        let text = store.read(&key).unwrap().unwrap();
        assert!(text.contains("//Traits (Read only. Modify Trait XP to change traits):"));

        let record = codec::decode(&text);
        assert_eq!(record.get("ValorXP"), Some("1200"));
        assert_eq!(record.get("MercyXP"), Some("0"));
        assert_eq!(record.get("HonorXPRequired-2"), Some("-4000"));
        assert_eq!(record.get("HonorXPRequired2"), Some("4000"));
        assert_eq!(record.get("CalculatingXPRequired0"), Some("0"));
    }

    #[test]
    fn test_export_warns_on_shared_name() {
        let host = world().with_character(
            "other",
            Character::new("Omar", code("aserai"), Moment::default()),
        );
        let store = InMemoryRecordStore::new();
        let mut announcer = Announcer::new(MemorySink::new());

        ExportService::new(&store)
            .export(&host, &EntityId::new("son"), &mut announcer)
            .unwrap();
        let texts = announcer.sink().texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("2 characters are named Omar."));
        assert!(texts[0].ends_with("Omar.son.txt."));
    }

    #[test]
    fn test_export_unknown_entity_fails() {
        let store = InMemoryRecordStore::new();
        let mut announcer = Announcer::new(MemorySink::new());
        let result =
            ExportService::new(&store).export(&world(), &EntityId::new("ghost"), &mut announcer);
        assert!(result.is_err());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_export_closure_writes_every_member() {
        let host = world();
        let store = InMemoryRecordStore::new();
        let mut announcer = Announcer::new(MemorySink::new());

        let result = ExportService::new(&store).export_closure(
            &host,
            &EntityId::new("player"),
            &mut announcer,
        );
        assert!(result.is_success());
        assert_eq!(result.len(), 2);
        assert_eq!(result.completed[0].0, EntityId::new("player"));
        assert_eq!(store.keys().unwrap().len(), 2);
    }

    #[test]
    fn test_export_closure_continues_past_failures() {
        // The daughter's mother is referenced but missing from the world.
        let host = world().with_character(
            "daughter",
            Character::new("Mira", code("aserai"), birth())
                .with_father("player")
                .with_mother("ghost"),
        );
        let store = InMemoryRecordStore::new();
        let mut announcer = Announcer::new(MemorySink::new());

        let result = ExportService::new(&store).export_closure(
            &host,
            &EntityId::new("daughter"),
            &mut announcer,
        );
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].0, EntityId::new("ghost"));
        assert_eq!(result.completed.len(), 3);
        assert!(
            announcer
                .sink()
                .texts()
                .iter()
                .any(|text| text.starts_with("Failed to export ghost:"))
        );
    }
}
