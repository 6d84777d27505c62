//! Monitor → workspace block assignment.
//!
//! The [`AssignmentTable`] maps every mapped monitor to its [`Block`]: a
//! fixed-length, ordered run of workspace names.  Position 0 is the
//! monitor's first workspace; tokens address positions, not names.
//!
//! The table refuses a block that would claim a workspace name already owned
//! by another monitor, so blocks are disjoint at all times.

use crate::identity::MonitorKey;
use std::collections::{BTreeMap, BTreeSet};

/// The ordered workspaces owned by one monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Connector name of the owning monitor when the block was built.
    monitor: String,
    names: Vec<String>,
}

impl Block {
    /// Build the block of `count` consecutive numeric names starting at
    /// `start`.
    pub fn numbered(monitor: impl Into<String>, start: u32, count: u32) -> Self {
        Self {
            monitor: monitor.into(),
            names: (start..start.saturating_add(count))
                .map(|i| i.to_string())
                .collect(),
        }
    }

    pub fn monitor(&self) -> &str {
        &self.monitor
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("workspace {name} is already assigned to {owner}")]
    Overlap { name: String, owner: MonitorKey },
}

/// Mapping from monitor identity to its workspace block.
#[derive(Debug, Clone, Default)]
pub struct AssignmentTable {
    blocks: BTreeMap<MonitorKey, Block>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `block` to `key`, replacing any previous block of `key`.
    ///
    /// Fails without modifying the table if a name in `block` belongs to a
    /// different monitor.
    pub fn insert(&mut self, key: MonitorKey, block: Block) -> Result<(), TableError> {
        for name in block.names() {
            if let Some(owner) = self.owner_of(name) {
                if *owner != key {
                    return Err(TableError::Overlap {
                        name: name.clone(),
                        owner: owner.clone(),
                    });
                }
            }
        }
        self.blocks.insert(key, block);
        Ok(())
    }

    pub fn remove(&mut self, key: &MonitorKey) -> Option<Block> {
        self.blocks.remove(key)
    }

    pub fn get(&self, key: &MonitorKey) -> Option<&Block> {
        self.blocks.get(key)
    }

    pub fn contains_key(&self, key: &MonitorKey) -> bool {
        self.blocks.contains_key(key)
    }

    /// Which monitor's block holds `name`.
    pub fn owner_of(&self, name: &str) -> Option<&MonitorKey> {
        self.blocks
            .iter()
            .find(|(_, block)| block.contains(name))
            .map(|(key, _)| key)
    }

    /// Whether any block holds `name`.
    pub fn contains_workspace(&self, name: &str) -> bool {
        self.owner_of(name).is_some()
    }

    pub fn keys(&self) -> Vec<MonitorKey> {
        self.blocks.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MonitorKey, &Block)> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Workspaces the splitter keeps alive on purpose.
///
/// Each entry stands for the one pin the splitter holds on a persistent
/// workspace for as long as its monitor is mapped.  Releasing the entry is
/// the only way the splitter gives that pin up.
#[derive(Debug, Clone, Default)]
pub struct RetentionSet {
    names: BTreeSet<String>,
}

impl RetentionSet {
    /// Returns `false` if `name` was already retained.
    pub fn retain(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    /// Returns `false` if `name` was not retained.
    pub fn release(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}
