//! Dispatched action command handler.

use super::{load_world, save_world};
use kinfile::config::KinfileConfig;
use kinfile::observability::ConsoleSink;
use kinfile::storage::FilesystemRecordStore;
use kinfile::{Action, ActionDispatcher, ActionResult, Announcer, EntityId, ModeStore};
use std::path::PathBuf;

/// Export, import or toggle command.
///
/// Only a completed import writes the world file back.
pub fn cmd_action(
    config: &KinfileConfig,
    world: PathBuf,
    action: Action,
    entity: Option<EntityId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut host = load_world(&world)?;
    let modes = ModeStore::from_config(config);
    let store = FilesystemRecordStore::new(&config.records_dir);
    let mut announcer = Announcer::new(ConsoleSink);

    let result = ActionDispatcher::new(&modes, &store).dispatch(
        &mut host,
        action,
        entity.as_ref(),
        &mut announcer,
    )?;

    match result {
        ActionResult::Imported(batch) => {
            save_world(&world, &host)?;
            if !batch.is_success() {
                return Err(format!("{} of {} imports failed", batch.failed.len(), batch.len()).into());
            }
        },
        ActionResult::Exported(batch) if !batch.is_success() => {
            return Err(format!("{} of {} exports failed", batch.failed.len(), batch.len()).into());
        },
        ActionResult::Skipped => println!("No character selected and no tracked character in {}", world.display()),
        ActionResult::Blocked { .. } => return Err("no valid mode".into()),
        ActionResult::Exported(_) | ActionResult::Toggled(_) => {},
    }
    Ok(())
}
