//! Command handlers module.
//!
//! - `action.rs`: export, import and toggle through the dispatcher
//! - `inspect.rs`: read-only mode and closure listings

mod action;
mod inspect;

pub use action::cmd_action;
pub use inspect::{cmd_closure, cmd_mode};

use kinfile::InMemoryHost;
use std::path::Path;

/// Reads a world file.
fn load_world(path: &Path) -> Result<InMemoryHost, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read world file {}: {e}", path.display()))?;
    Ok(InMemoryHost::from_json(&json)?)
}

/// Writes a world file back.
fn save_world(path: &Path, host: &InMemoryHost) -> Result<(), Box<dyn std::error::Error>> {
    let json = host.to_json()?;
    std::fs::write(path, json)
        .map_err(|e| format!("cannot write world file {}: {e}", path.display()))?;
    Ok(())
}
