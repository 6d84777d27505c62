//! Builds the [`AssignmentTable`] from the current monitor list.
//!
//! Every topology or configuration change goes through [`Mapper::rebuild`]:
//! unmap every monitor, then map every eligible monitor again.  Nothing else
//! runs between the two phases, so no handler ever sees a half-built table.
//!
//! Eligible monitors (not mirrored, not disabled) are ordered by their
//! position on the layout, left to right and then top to bottom.  The
//! `i`-th monitor actually mapped owns workspaces
//! `i * count + 1 ..= (i + 1) * count`, so the blocks stay gap-free however
//! displays come and go, and a display reconnected at the same place gets
//! the same names back.
//!
//! Without persistence only the first workspace of a block is created.
//! Hyprland creates it through a pinned workspace rule; the mapper does not
//! retain it, and unmapping clears the pin like any other.

use crate::command::MonitorInfo;
use crate::identity::MonitorKey;
use crate::table::{AssignmentTable, Block, RetentionSet};
use crate::traits::WindowManager;
use log::{debug, error, info, warn};

/// Knobs for one rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    /// Length of every block.
    pub workspace_count: u32,
    /// Create every workspace up front and pin it.
    pub persistent: bool,
    /// Activate the first workspace of every freshly mapped monitor.
    pub switch_focus: bool,
}

/// Owner of the assignment table and of the workspaces pinned for it.
#[derive(Debug, Default)]
pub struct Mapper {
    table: AssignmentTable,
    retained: RetentionSet,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &AssignmentTable {
        &self.table
    }

    pub fn retained(&self) -> &RetentionSet {
        &self.retained
    }

    /// First workspace number of the block at `index`.
    pub fn block_start(index: usize, count: u32) -> u32 {
        (index as u32).saturating_mul(count).saturating_add(1)
    }

    /// Monitors that get a block, in block order.
    pub fn eligible(monitors: &[MonitorInfo]) -> Vec<&MonitorInfo> {
        let mut eligible: Vec<&MonitorInfo> =
            monitors.iter().filter(|m| m.is_eligible()).collect();
        eligible.sort_by(|a, b| (a.x, a.y, &a.name).cmp(&(b.x, b.y, &b.name)));
        eligible
    }

    /// Unmap everything, then give every eligible monitor a fresh block.
    ///
    /// Returns the keys of the mapped monitors in block order.  Failures of
    /// individual host calls are logged and skipped; the rebuild itself
    /// always completes.
    pub fn rebuild<W: WindowManager>(
        &mut self,
        wm: &W,
        monitors: &[MonitorInfo],
        opts: &MapOptions,
    ) -> Vec<MonitorKey> {
        self.unmap_all(wm);

        for m in monitors {
            if m.disabled {
                info!("skipping disabled monitor {}", m.name);
            } else if m.mirror {
                info!("skipping mirrored monitor {}", m.name);
            }
        }
        if opts.workspace_count == 0 {
            warn!("workspace count is 0, every block will be empty");
        }

        // Skipped monitors do not take an index.
        let mut mapped = Vec::new();
        for monitor in Self::eligible(monitors) {
            if let Some(key) = self.map(wm, monitor, mapped.len(), opts) {
                mapped.push(key);
            }
        }
        if mapped.is_empty() {
            debug!("no eligible monitors, nothing mapped");
        }
        mapped
    }

    /// Unmap every monitor, releasing every pinned workspace.
    pub fn unmap_all<W: WindowManager>(&mut self, wm: &W) {
        for key in self.table.keys() {
            self.unmap(wm, &key);
        }
        // Anything left was pinned outside a block; drop it as well.
        for name in self.retained.iter().map(str::to_string).collect::<Vec<_>>() {
            warn!("releasing workspace {} that belonged to no block", name);
            if let Err(e) = wm.set_persistent(&name, false) {
                warn!("failed to unpin workspace {}: {}", name, e);
            }
        }
        self.retained.clear();
    }

    fn unmap<W: WindowManager>(&mut self, wm: &W, key: &MonitorKey) {
        let Some(block) = self.table.remove(key) else {
            return;
        };
        info!(
            "unmapping workspaces {} from monitor {}",
            describe(&block),
            block.monitor()
        );
        for name in block.names() {
            match wm.workspace(name) {
                Ok(Some(_)) => {
                    if let Err(e) = wm.set_persistent(name, false) {
                        warn!("failed to unpin workspace {}: {}", name, e);
                    }
                }
                Ok(None) => debug!("workspace {} is already gone", name),
                Err(e) => warn!("failed to look up workspace {}: {}", name, e),
            }
            self.retained.release(name);
        }
    }

    fn map<W: WindowManager>(
        &mut self,
        wm: &W,
        monitor: &MonitorInfo,
        index: usize,
        opts: &MapOptions,
    ) -> Option<MonitorKey> {
        let key = MonitorKey::of(monitor);
        if self.table.contains_key(&key) {
            warn!(
                "monitor {} reports the same identity as an already mapped monitor, skipping",
                key
            );
            return None;
        }

        let start = Self::block_start(index, opts.workspace_count);
        let block = Block::numbered(monitor.name.clone(), start, opts.workspace_count);
        info!(
            "mapping workspaces {} to monitor {}",
            describe(&block),
            monitor.name
        );

        for (position, name) in block.names().iter().enumerate() {
            self.materialize(wm, name, monitor, position == 0, opts.persistent);
        }

        let first = block.first().map(str::to_string);
        if let Err(e) = self.table.insert(key.clone(), block) {
            error!("cannot map monitor {}: {}", monitor.name, e);
            return None;
        }

        if opts.switch_focus {
            if let Some(first) = first {
                info!(
                    "switching to first workspace {} on monitor {}",
                    first, monitor.name
                );
                if let Err(e) = wm.dispatch("workspace", &first) {
                    warn!("failed to switch to workspace {}: {}", first, e);
                }
            }
        }
        Some(key)
    }

    /// Make sure workspace `name` lives on `monitor`, creating it if it must
    /// exist, and pin it when persistence is on.
    fn materialize<W: WindowManager>(
        &mut self,
        wm: &W,
        name: &str,
        monitor: &MonitorInfo,
        first: bool,
        persistent: bool,
    ) {
        let existing = match wm.workspace(name) {
            Ok(ws) => ws,
            Err(e) => {
                warn!("failed to look up workspace {}: {}", name, e);
                return;
            }
        };

        let exists = match existing {
            Some(ws) => {
                if ws.monitor != monitor.name {
                    info!("moving workspace {} to monitor {}", name, monitor.name);
                    if let Err(e) = wm.move_workspace_to_monitor(name, &monitor.name) {
                        warn!("failed to move workspace {}: {}", name, e);
                    }
                }
                true
            }
            // Without persistence only the first entry is created, so the
            // monitor always has a workspace of its own to show.
            None if persistent || first => {
                info!("creating workspace {} on monitor {}", name, monitor.name);
                match wm.create_workspace(name, &monitor.name) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("failed to create workspace {}: {}", name, e);
                        false
                    }
                }
            }
            None => false,
        };

        if exists && persistent {
            match wm.set_persistent(name, true) {
                Ok(()) => {
                    self.retained.retain(name);
                }
                Err(e) => warn!("failed to pin workspace {}: {}", name, e),
            }
        }
    }
}

fn describe(block: &Block) -> String {
    match (block.names().first(), block.names().last()) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "(none)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWm;
    use std::collections::HashSet;

    fn opts(count: u32) -> MapOptions {
        MapOptions {
            workspace_count: count,
            persistent: true,
            switch_focus: false,
        }
    }

    fn three_monitors() -> Vec<MonitorInfo> {
        vec![
            FakeWm::monitor(0, "DP-1", 0),
            FakeWm::monitor(1, "DP-2", 1920),
            FakeWm::monitor(2, "HDMI-A-1", 3840),
        ]
    }

    #[test]
    fn every_eligible_monitor_gets_a_disjoint_block() {
        for m in 1..=4 {
            for k in 1..=6 {
                let monitors: Vec<MonitorInfo> = (0..m)
                    .map(|i| FakeWm::monitor(i as i64, &format!("DP-{}", i), i * 1920))
                    .collect();
                let wm = FakeWm::with_monitors(monitors.clone());
                let mut mapper = Mapper::new();
                mapper.rebuild(&wm, &monitors, &opts(k));

                assert_eq!(mapper.table().len(), m as usize);
                let mut seen = HashSet::new();
                for (_, block) in mapper.table().iter() {
                    assert_eq!(block.len(), k as usize);
                    for name in block.names() {
                        assert!(seen.insert(name.clone()), "duplicate {}", name);
                    }
                }
            }
        }
    }

    #[test]
    fn blocks_follow_layout_order() {
        let monitors = vec![
            FakeWm::monitor(0, "HDMI-A-1", 3840),
            FakeWm::monitor(1, "DP-1", 0),
            FakeWm::monitor(2, "DP-2", 1920),
        ];
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        mapper.rebuild(&wm, &monitors, &opts(10));

        let first = |m: &MonitorInfo| {
            mapper
                .table()
                .get(&MonitorKey::of(m))
                .and_then(|b| b.first().map(str::to_string))
        };
        assert_eq!(first(&monitors[1]).as_deref(), Some("1"));
        assert_eq!(first(&monitors[2]).as_deref(), Some("11"));
        assert_eq!(first(&monitors[0]).as_deref(), Some("21"));
    }

    #[test]
    fn mirrored_and_disabled_monitors_are_skipped() {
        let mut monitors = three_monitors();
        monitors[1].mirror = true;
        monitors[2].disabled = true;
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        let mapped = mapper.rebuild(&wm, &monitors, &opts(5));
        assert_eq!(mapped, vec![MonitorKey::of(&monitors[0])]);
        assert_eq!(mapper.table().len(), 1);
    }

    #[test]
    fn no_eligible_monitors_maps_nothing() {
        let mut monitors = three_monitors();
        for m in &mut monitors {
            m.mirror = true;
        }
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        assert!(mapper.rebuild(&wm, &monitors, &opts(5)).is_empty());
        assert!(mapper.table().is_empty());
        assert!(wm.created.borrow().is_empty());
    }

    #[test]
    fn persistent_mode_creates_and_pins_every_workspace() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        mapper.rebuild(&wm, &monitors, &opts(4));

        assert_eq!(wm.created.borrow().len(), 12);
        assert_eq!(wm.persistent.borrow().len(), 12);
        assert_eq!(mapper.retained().len(), 12);
        assert!(wm.created.borrow().contains(&("5".into(), "DP-2".into())));
    }

    #[test]
    fn without_persistence_only_first_entry_is_created() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        let o = MapOptions {
            persistent: false,
            ..opts(4)
        };
        mapper.rebuild(&wm, &monitors, &o);

        let created: Vec<String> = wm.created.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(created, vec!["1", "5", "9"]);
        assert!(mapper.retained().is_empty());
        // The table still lists the full blocks.
        assert_eq!(mapper.table().iter().map(|(_, b)| b.len()).sum::<usize>(), 12);
    }

    #[test]
    fn creation_pins_are_cleared_on_unmap_without_persistence() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        let o = MapOptions {
            persistent: false,
            ..opts(4)
        };
        mapper.rebuild(&wm, &monitors, &o);

        // Only the host's creation rule pins these.
        let pinned: Vec<String> = wm.persistent.borrow().iter().cloned().collect();
        assert_eq!(pinned, vec!["1", "5", "9"]);
        assert!(mapper.retained().is_empty());

        mapper.unmap_all(&wm);
        assert!(wm.persistent.borrow().is_empty());
    }

    #[test]
    fn existing_workspaces_are_moved_not_recreated() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        wm.add_workspace("6", "DP-1", 3);
        wm.add_workspace("1", "DP-1", 1);
        let mut mapper = Mapper::new();
        mapper.rebuild(&wm, &monitors, &opts(5));

        assert!(!wm.created.borrow().iter().any(|(n, _)| n == "6" || n == "1"));
        assert_eq!(*wm.moved.borrow(), vec![("6".to_string(), "DP-2".to_string())]);
        assert!(wm.persistent.borrow().contains("6"));
    }

    #[test]
    fn rebuild_releases_previous_pins() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        mapper.rebuild(&wm, &monitors, &opts(10));
        mapper.rebuild(&wm, &monitors[..1], &opts(3));

        assert_eq!(mapper.table().len(), 1);
        assert_eq!(mapper.retained().len(), 3);
        let pinned: Vec<String> = wm.persistent.borrow().iter().cloned().collect();
        assert_eq!(pinned, vec!["1", "2", "3"]);
    }

    #[test]
    fn unmap_tolerates_vanished_workspaces() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        mapper.rebuild(&wm, &monitors, &opts(2));
        wm.workspaces.borrow_mut().remove("3");

        mapper.unmap_all(&wm);
        mapper.unmap_all(&wm);
        assert!(mapper.table().is_empty());
        assert!(mapper.retained().is_empty());
        assert!(wm.persistent.borrow().contains("3"));
        assert_eq!(wm.persistent.borrow().len(), 1);
    }

    #[test]
    fn remapping_same_identity_yields_same_names() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        mapper.rebuild(&wm, &monitors, &opts(10));
        let key = MonitorKey::of(&monitors[2]);
        let before = mapper.table().get(&key).cloned();

        // Unplug HDMI-A-1, then plug it back in with a new runtime id.
        mapper.rebuild(&wm, &monitors[..2], &opts(10));
        assert!(mapper.table().get(&key).is_none());
        let mut replugged = monitors.clone();
        replugged[2].id = 7;
        mapper.rebuild(&wm, &replugged, &opts(10));

        assert_eq!(mapper.table().get(&key).cloned(), before);
    }

    #[test]
    fn colliding_identities_map_once() {
        let monitors = vec![FakeWm::monitor(0, "DP-1", 0), FakeWm::monitor(1, "DP-1", 1920)];
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        let mapped = mapper.rebuild(&wm, &monitors, &opts(3));
        assert_eq!(mapped.len(), 1);
    }

    #[test]
    fn collision_does_not_leave_a_hole() {
        let monitors = vec![
            FakeWm::monitor(0, "DP-1", 0),
            FakeWm::monitor(1, "DP-1", 1920),
            FakeWm::monitor(2, "DP-2", 3840),
        ];
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        let mapped = mapper.rebuild(&wm, &monitors, &opts(3));

        assert_eq!(mapped.len(), 2);
        let block = mapper.table().get(&MonitorKey::of(&monitors[2])).cloned();
        assert_eq!(
            block.map(|b| b.names().to_vec()),
            Some(vec!["4".to_string(), "5".to_string(), "6".to_string()])
        );
    }

    #[test]
    fn zero_count_maps_empty_blocks() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        mapper.rebuild(&wm, &monitors, &opts(0));
        assert_eq!(mapper.table().len(), 3);
        assert!(mapper.table().iter().all(|(_, b)| b.is_empty()));
        assert!(wm.created.borrow().is_empty());
    }

    #[test]
    fn switch_focus_activates_first_workspaces() {
        let monitors = three_monitors();
        let wm = FakeWm::with_monitors(monitors.clone());
        let mut mapper = Mapper::new();
        let o = MapOptions {
            switch_focus: true,
            ..opts(10)
        };
        mapper.rebuild(&wm, &monitors, &o);
        assert_eq!(
            wm.dispatched(),
            vec!["workspace 1", "workspace 11", "workspace 21"]
        );
    }
}
