//! Read-only command handlers.

use super::load_world;
use kinfile::config::KinfileConfig;
use kinfile::observability::ConsoleSink;
use kinfile::{Announcer, EntityId, Host, ModeStore, family_closure};
use std::path::PathBuf;

/// Mode command.
pub fn cmd_mode(config: &KinfileConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut announcer = Announcer::new(ConsoleSink);
    let snapshot = ModeStore::from_config(config).load(&mut announcer)?;

    println!("Mode: {}", snapshot.mode());
    println!("Mode file: {}", snapshot.path.display());
    println!("Records: {}", config.records_dir.display());
    Ok(())
}

/// Closure command.
pub fn cmd_closure(
    world: PathBuf,
    entity: Option<EntityId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = load_world(&world)?;
    let Some(origin) = entity.or_else(|| host.tracked_entity()) else {
        println!("No character selected and no tracked character in {}", world.display());
        return Ok(());
    };

    let closure = family_closure(&host, &origin);
    println!("Family of {origin} ({} members):", closure.len());
    for id in &closure {
        let name = host.display_name(id).unwrap_or_else(|_| "(unknown)".to_string());
        println!("  {id}  {name}");
    }
    Ok(())
}
