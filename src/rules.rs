//! Optional Hyprland workspace-rules file.
//!
//! After a remap the daemon can write one `workspace = …` rule per block
//! entry so that a Hyprland config which `source`s the file binds the same
//! workspaces to the same monitors before the daemon is even running.
//!
//! Hyprland reloads its config when a sourced file changes, and a reload
//! triggers a remap.  The file is therefore only rewritten when its content
//! actually differs.

use crate::table::AssignmentTable;
use std::io;
use std::path::Path;

const HEADER: &str = "# Generated by monsplit. Changes will be overwritten.\n";

/// Render the rules for every block of `table`.
pub fn render(table: &AssignmentTable, persistent: bool) -> String {
    let mut out = String::from(HEADER);
    for (_, block) in table.iter() {
        for (position, name) in block.names().iter().enumerate() {
            out.push_str(&format!("workspace = {}, monitor:{}", name, block.monitor()));
            if position == 0 {
                out.push_str(", default:true");
            }
            if persistent {
                out.push_str(", persistent:true");
            }
            out.push('\n');
        }
    }
    out
}

/// Write `contents` to `path` unless the file already holds exactly that.
///
/// Returns whether the file was written.
pub fn write_if_changed(path: &Path, contents: &str) -> io::Result<bool> {
    match std::fs::read_to_string(path) {
        Ok(current) if current == contents => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(true)
}
