//! Stable monitor identity.
//!
//! Hyprland hands out monitor ids sequentially and reuses them after a
//! display is unplugged, so they cannot key anything that must survive a
//! hotplug.  A [`MonitorKey`] is derived from what the display reports
//! about itself instead: connector name plus pixel resolution.
//!
//! Two identical panels reporting the same name and resolution collide.
//! Connector names are unique among simultaneously connected outputs on
//! Hyprland, so this only bites when a display moves between ports.

use crate::command::MonitorInfo;
use std::fmt;

/// Key for a physical display, stable across disconnect / reconnect.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonitorKey(String);

impl MonitorKey {
    /// Derive the key of `monitor`.  Never fails; a missing name becomes
    /// an empty component.
    pub fn of(monitor: &MonitorInfo) -> Self {
        Self(format!(
            "{}@{}x{}",
            monitor.name, monitor.width, monitor.height
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
