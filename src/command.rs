//! Commands and types used throughout monsplit.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every action the splitter can perform,
//! [`DispatchResult`] is what every action reports back, and
//! [`MonitorInfo`] / [`WorkspaceInfo`] / [`WindowInfo`] are the host
//! objects the core reads.
//!
//! Arguments are forwarded raw; the splitter interprets workspace tokens
//! ("empty", "+1", "3", a name) and monitor tokens ("next", "-1", "l", an
//! id) itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc;

/// Compass direction for geometric monitor navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Parse a direction string (case-insensitive; accepts "l", "left", "R", …).
pub fn parse_direction(s: &str) -> Option<Direction> {
    match s.trim().to_lowercase().as_str() {
        "l" | "left" => Some(Direction::Left),
        "r" | "right" => Some(Direction::Right),
        "u" | "up" => Some(Direction::Up),
        "d" | "down" => Some(Direction::Down),
        _ => None,
    }
}

/// Every action the splitter can perform.
///
/// User-facing variants carry the raw argument string exactly as typed in
/// the key binding.  Hotplug and reload variants are produced by the
/// Hyprland event source.
///
/// On the wire commands are externally tagged JSON, e.g.
/// `{"Workspace":"3"}`, `{"ChangeMonitor":"next"}`, `"GrabRogueWindows"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Activate a workspace of the focused monitor's block.
    Workspace(String),

    /// Step through the focused monitor's block, honouring `enable_wrapping`.
    CycleWorkspaces(String),

    /// Deprecated: step through the block without ever wrapping.
    CycleWorkspacesNowrap(String),

    /// Move the focused window to a workspace of the focused monitor's block
    /// and follow it.
    MoveToWorkspace(String),

    /// Same as [`MoveToWorkspace`](Command::MoveToWorkspace) but focus stays.
    MoveToWorkspaceSilent(String),

    /// Move the focused window to the active workspace of another monitor
    /// and follow it.
    ChangeMonitor(String),

    /// Same as [`ChangeMonitor`](Command::ChangeMonitor) but focus stays.
    ChangeMonitorSilent(String),

    /// Pull every window living outside all blocks onto the focused
    /// monitor's active workspace.
    GrabRogueWindows,

    /// A display was connected (payload: monitor name).
    MonitorAdded(String),

    /// A display was disconnected (payload: monitor name).
    MonitorRemoved(String),

    /// The host finished reloading its configuration.
    ConfigReloaded,

    /// Re-read the daemon configuration and remap every monitor.
    Reload,

    /// Unmap every monitor and stop the daemon.
    Shutdown,
}

/// Outcome of a single command, as reported back to whoever sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// A command on its way to the splitter, with an optional channel for the
/// result.
///
/// Sources that have nobody to answer (hotplug events) leave `reply` empty.
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub reply: Option<mpsc::Sender<DispatchResult>>,
}

impl Request {
    /// A request whose result nobody waits for.
    pub fn fire(command: Command) -> Self {
        Self {
            command,
            reply: None,
        }
    }
}

/// Reference to a workspace by host id and name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkspaceRef {
    pub id: i64,
    pub name: String,
}

impl WorkspaceRef {
    /// Special (scratchpad / overlay) workspaces have negative ids on
    /// Hyprland and a `special:` name prefix.
    pub fn is_special(&self) -> bool {
        self.id < 0 || self.name.starts_with("special:")
    }
}

/// What the core reads about a connected display.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    /// Runtime id assigned by the host.  Not stable across hotplug.
    pub id: i64,
    /// Connector name (e.g. `"DP-1"`).
    pub name: String,
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// X position on the virtual desktop (logical pixels).
    pub x: i32,
    /// Y position on the virtual desktop (logical pixels).
    pub y: i32,
    /// Output scale; logical size is `width / scale`.
    pub scale: f64,
    pub active_workspace: WorkspaceRef,
    pub focused: bool,
    /// Mirrors another output and gets no block of its own.
    pub mirror: bool,
    /// Disabled by a monitor rule and gets no block of its own.
    pub disabled: bool,
}

impl MonitorInfo {
    /// Whether this monitor receives a workspace block.
    pub fn is_eligible(&self) -> bool {
        !self.mirror && !self.disabled
    }

    /// Size in layout coordinates, accounting for output scale.
    pub fn logical_size(&self) -> (i32, i32) {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        (
            (self.width as f64 / scale).round() as i32,
            (self.height as f64 / scale).round() as i32,
        )
    }

    /// Whether the layout point `(x, y)` lies on this monitor.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (w, h) = self.logical_size();
        x >= self.x && x < self.x + w && y >= self.y && y < self.y + h
    }
}

/// A workspace object as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub id: i64,
    pub name: String,
    /// Name of the monitor the workspace currently lives on.
    pub monitor: String,
    /// Number of windows on the workspace.
    pub windows: u32,
}

/// A window as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Window manager address / id.
    pub address: String,
    /// Human-readable title.
    pub title: String,
    pub workspace: WorkspaceRef,
    /// Whether the window is currently mapped (shown by the compositor).
    pub mapped: bool,
}

/// Render a workspace name as a Hyprland workspace selector.
///
/// Numeric names are ids already; anything else needs the `name:` prefix.
pub fn workspace_selector(name: &str) -> String {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        name.to_string()
    } else {
        format!("name:{}", name)
    }
}
