//! Triggered actions gated by the scope mode.

use super::{BatchResult, ExportService, ImportOptions, ImportService};
use crate::config::{ModeStore, ScopeMode};
use crate::host::Host;
use crate::models::{EntityId, ImportOutcome};
use crate::observability::{Announcer, NoticeSink};
use crate::storage::{RecordKey, RecordStore};
use crate::Result;
use tracing::{debug, info_span};

/// A user-triggered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write records for the current scope.
    Export,
    /// Apply records for the current scope.
    Import {
        /// Re-derive body properties after a birthday change.
        refresh_appearance: bool,
    },
    /// Swap between `Single` and `Family`.
    ToggleMode,
}

impl Action {
    /// Returns the action name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Import { .. } => "import",
            Self::ToggleMode => "toggle",
        }
    }
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// No target and no tracked entity; nothing happened.
    Skipped,
    /// The mode file holds no valid mode; nothing was changed.
    Blocked {
        /// The value found in the mode file.
        raw: String,
    },
    /// Records were written.
    Exported(BatchResult<RecordKey>),
    /// Records were applied.
    Imported(BatchResult<ImportOutcome>),
    /// The mode was switched and saved.
    Toggled(ScopeMode),
}

/// Runs actions with a freshly loaded mode each time.
pub struct ActionDispatcher<'a, S: RecordStore + ?Sized> {
    modes: &'a ModeStore,
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> ActionDispatcher<'a, S> {
    /// Creates a dispatcher over a mode store and a record store.
    #[must_use]
    pub const fn new(modes: &'a ModeStore, store: &'a S) -> Self {
        Self { modes, store }
    }

    /// Runs one action.
    ///
    /// `target` defaults to the host's tracked entity. The mode file is read
    /// before anything else happens, so edits made since the last action
    /// take effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode file cannot be read or written, or if a
    /// single-entity export or import fails.
    pub fn dispatch<H, N>(
        &self,
        host: &mut H,
        action: Action,
        target: Option<&EntityId>,
        announcer: &mut Announcer<N>,
    ) -> Result<ActionResult>
    where
        H: Host + ?Sized,
        N: NoticeSink,
    {
        let Some(target) = target.cloned().or_else(|| host.tracked_entity()) else {
            debug!(action = action.as_str(), "no current character");
            return Ok(ActionResult::Skipped);
        };
        let _span = info_span!("dispatch", action = action.as_str(), target = %target).entered();

        let snapshot = self.modes.load(announcer)?;
        let mode = snapshot.mode();
        if mode == ScopeMode::None {
            announcer.warn(format!(
                "Invalid mode \"{}\". Please check {}",
                snapshot.raw,
                snapshot.path.display()
            ));
            return Ok(ActionResult::Blocked { raw: snapshot.raw });
        }

        match action {
            Action::Export => {
                let service = ExportService::new(self.store);
                let result = if mode == ScopeMode::Family {
                    service.export_closure(&*host, &target, announcer)
                } else {
                    let key = service.export(&*host, &target, announcer)?;
                    single(target, key)
                };
                Ok(ActionResult::Exported(result))
            },
            Action::Import { refresh_appearance } => {
                let service = ImportService::new(self.store);
                let options = ImportOptions::default().with_refresh_appearance(refresh_appearance);
                let result = if mode == ScopeMode::Family {
                    service.import_closure(host, &target, options, announcer)
                } else {
                    let outcome = service.import(host, &target, options, announcer)?;
                    single(target, outcome)
                };
                Ok(ActionResult::Imported(result))
            },
            Action::ToggleMode => {
                let toggled = mode.toggled();
                self.modes.save(toggled)?;
                let name = host.display_name(&target)?;
                let scope = if toggled == ScopeMode::Family {
                    "and family."
                } else {
                    "only."
                };
                announcer.info(format!("Mode: import/export {name} {scope}"));
                Ok(ActionResult::Toggled(toggled))
            },
        }
    }
}

fn single<T>(id: EntityId, value: T) -> BatchResult<T> {
    let mut result = BatchResult::default();
    result.completed.push((id, value));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::host::{Character, InMemoryHost};
    use crate::models::{AppliedGroups, LineageCode, Moment, Trait};
    use crate::observability::MemorySink;
    use crate::storage::InMemoryRecordStore;
    use std::fs;
    use tempfile::TempDir;

    fn code(raw: &str) -> LineageCode {
        LineageCode::parse(raw).unwrap()
    }

    fn world() -> InMemoryHost {
        InMemoryHost::new()
            .with_culture(code("aserai"), "Aserai")
            .with_character(
                "player",
                Character::new("Aldric", code("aserai"), Moment::default()),
            )
            .with_character(
                "son",
                Character::new("Omar", code("aserai"), Moment::default())
                    .with_father("player")
                    .with_trait(Trait::Valor, 2),
            )
            .with_tracked("player")
    }

    struct Fixture {
        _dir: TempDir,
        modes: ModeStore,
        store: InMemoryRecordStore,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let modes = ModeStore::new(dir.path().join("config.ini"));
        Fixture {
            _dir: dir,
            modes,
            store: InMemoryRecordStore::new(),
        }
    }

    #[test]
    fn test_family_export_covers_closure() {
        let f = fixture();
        let mut host = world();
        let mut announcer = Announcer::new(MemorySink::new());

        let result = ActionDispatcher::new(&f.modes, &f.store)
            .dispatch(&mut host, Action::Export, None, &mut announcer)
            .unwrap();
        let ActionResult::Exported(batch) = result else {
            panic!("expected export, got {result:?}");
        };
        assert_eq!(batch.len(), 2);
        assert_eq!(f.store.keys().unwrap().len(), 2);
    }

    #[test]
    fn test_single_export_uses_target_only() {
        let f = fixture();
        f.modes.save(ScopeMode::Single).unwrap();
        let mut host = world();
        let mut announcer = Announcer::new(MemorySink::new());
        let son = EntityId::new("son");

        ActionDispatcher::new(&f.modes, &f.store)
            .dispatch(&mut host, Action::Export, Some(&son), &mut announcer)
            .unwrap();
        let keys = f.store.keys().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].as_str(), "Omar.son");
    }

    #[test]
    fn test_invalid_mode_blocks_mutation() {
        let f = fixture();
        fs::write(f.modes.path(), "Mode=Everyone\n").unwrap();
        let mut host = world();
        let before = host.clone();
        let mut announcer = Announcer::new(MemorySink::new());
        let son = EntityId::new("son");
        f.store
            .write(&RecordKey::for_entity("Omar", &son), "Valor=-2\nMercy=0\nHonor=0\nGenerosity=0\nCalculating=0\n")
            .unwrap();

        let dispatcher = ActionDispatcher::new(&f.modes, &f.store);
        let result = dispatcher
            .dispatch(
                &mut host,
                Action::Import {
                    refresh_appearance: false,
                },
                Some(&son),
                &mut announcer,
            )
            .unwrap();
        assert_eq!(
            result,
            ActionResult::Blocked {
                raw: "Everyone".to_string()
            }
        );
        assert_eq!(host, before);

        let toggled = dispatcher
            .dispatch(&mut host, Action::ToggleMode, None, &mut announcer)
            .unwrap();
        assert!(matches!(toggled, ActionResult::Blocked { .. }));
        assert_eq!(fs::read_to_string(f.modes.path()).unwrap(), "Mode=Everyone\n");

        let texts = announcer.sink().texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("Invalid mode \"Everyone\". Please check "));
        assert!(texts[0].ends_with("config.ini"));
    }

    #[test]
    fn test_toggle_round_trip() {
        let f = fixture();
        let mut host = world();
        let mut announcer = Announcer::new(MemorySink::new());
        let dispatcher = ActionDispatcher::new(&f.modes, &f.store);

        let first = dispatcher
            .dispatch(&mut host, Action::ToggleMode, None, &mut announcer)
            .unwrap();
        assert_eq!(first, ActionResult::Toggled(ScopeMode::Single));
        let second = dispatcher
            .dispatch(&mut host, Action::ToggleMode, None, &mut announcer)
            .unwrap();
        assert_eq!(second, ActionResult::Toggled(ScopeMode::Family));

        assert_eq!(
            announcer.sink().texts(),
            [
                "Mode: import/export Aldric only.",
                "Mode: import/export Aldric and family.",
            ]
        );
    }

    #[test]
    fn test_mode_edits_apply_to_next_action() {
        let f = fixture();
        let mut host = world();
        let mut announcer = Announcer::new(MemorySink::new());
        let dispatcher = ActionDispatcher::new(&f.modes, &f.store);

        dispatcher
            .dispatch(&mut host, Action::Export, None, &mut announcer)
            .unwrap();
        fs::write(f.modes.path(), "Mode=Single\n").unwrap();
        let son = EntityId::new("son");
        let key = RecordKey::for_entity("Omar", &son);
        let edited = codec::decode(&f.store.read(&key).unwrap().unwrap());
        assert_eq!(edited.get("Valor"), Some("2"));
        f.store
            .write(&key, "Mercy=0\nValor=-1\nHonor=0\nGenerosity=0\nCalculating=0\n")
            .unwrap();

        let result = dispatcher
            .dispatch(
                &mut host,
                Action::Import {
                    refresh_appearance: false,
                },
                Some(&son),
                &mut announcer,
            )
            .unwrap();
        let ActionResult::Imported(batch) = result else {
            panic!("expected import, got {result:?}");
        };
        assert_eq!(
            batch.completed,
            [(
                son.clone(),
                ImportOutcome::Applied(AppliedGroups {
                    traits: true,
                    ..AppliedGroups::default()
                })
            )]
        );
        assert_eq!(host.trait_level(&son, Trait::Valor).unwrap(), -1);
    }

    #[test]
    fn test_no_target_is_silent() {
        let f = fixture();
        let mut host = InMemoryHost::new();
        let mut announcer = Announcer::new(MemorySink::new());

        let result = ActionDispatcher::new(&f.modes, &f.store)
            .dispatch(&mut host, Action::Export, None, &mut announcer)
            .unwrap();
        assert_eq!(result, ActionResult::Skipped);
        assert!(announcer.sink().notices().is_empty());
        assert!(!f.modes.path().exists());
    }
}
