//! Golden file tests for written files.
//!
//! Verifies that files users edit by hand keep their exact layout:
//! - Exported record of an untracked character
//! - Default mode file

// Golden tests use expect/unwrap/panic for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use kinfile::config::{KinfileConfig, ModeStore};
use kinfile::host::Character;
use kinfile::models::{Calendar, LineageCode};
use kinfile::observability::MemorySink;
use kinfile::storage::InMemoryRecordStore;
use kinfile::{
    Announcer, CalendarParts, EntityId, ExportService, InMemoryHost, RecordKey, RecordStore, Trait,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to the golden files directory.
fn golden_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir).join("tests").join("golden")
}

/// Load a golden file as a string.
fn load_golden(filename: &str) -> String {
    let path = golden_dir().join(filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read golden file {}: {e}", path.display()))
        .replace("\r\n", "\n")
}

#[test]
fn test_golden_untracked_export() {
    let aserai = LineageCode::parse("aserai").unwrap();
    let birth = Calendar::default()
        .compose_exact(CalendarParts::new(1084, 2, 5, 10), 4321)
        .unwrap();
    let host = InMemoryHost::new()
        .with_culture(aserai.clone(), "Aserai")
        .with_character(
            "mira",
            Character::new("Mira", aserai, birth)
                .with_trait(Trait::Mercy, 1)
                .with_trait(Trait::Valor, -2),
        );
    let store = InMemoryRecordStore::new();
    let mut announcer = Announcer::new(MemorySink::new());

    let key = ExportService::new(&store)
        .export(&host, &EntityId::new("mira"), &mut announcer)
        .unwrap();
    assert_eq!(key, RecordKey::new("Mira.mira"));
    assert_eq!(
        store.read(&key).unwrap().unwrap(),
        load_golden("export_untracked.txt")
    );
}

#[test]
fn test_golden_default_mode_file() {
    let dir = TempDir::new().unwrap();
    let config = KinfileConfig::with_root(dir.path());
    let mut announcer = Announcer::new(MemorySink::new());

    ModeStore::from_config(&config).load(&mut announcer).unwrap();
    assert_eq!(
        fs::read_to_string(&config.mode_file).unwrap(),
        load_golden("mode_default.ini")
    );
}
