//! [`WindowManager`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Hyprland has no request for creating a workspace without focusing it.
//! A workspace rule carrying `persistent:true` does exactly that, so
//! workspaces are created (and pinned, and unpinned) through `keyword
//! workspace` rules bound to their monitor.

use crate::command::{workspace_selector, MonitorInfo, WindowInfo, WorkspaceInfo, WorkspaceRef};
use crate::traits::WindowManager;
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Colour of monsplit notifications (`rgb(RRGGBB)`).
const NOTIFY_COLOR: &str = "rgb(61afef)";
/// How long notifications stay up, in milliseconds.
const NOTIFY_TIMEOUT_MS: u32 = 5000;

/// Hyprland-backed window manager.
///
/// All communication happens over Hyprland's IPC socket
/// (`$XDG_RUNTIME_DIR/hypr/<instance>/.socket.sock`).  No child processes
/// are spawned.
#[derive(Debug, Default)]
pub struct HyprlandWm;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl HyprlandWm {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandWmError> {
    Ok(super::instance_dir().map_err(HyprlandWmError)?.join(".socket.sock"))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and deserialize the answer.
fn ipc_json<T: for<'de> Deserialize<'de>>(data_command: &str) -> Result<T, HyprlandWmError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    parse_json(&json)
}

fn parse_json<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T, HyprlandWmError> {
    serde_json::from_str(json).map_err(|e| HyprlandWmError(format!("parse: {}", e)))
}

/// Send a command whose only successful answer is `"ok"`.
fn ipc_ok(command: &str) -> Result<(), HyprlandWmError> {
    debug!("hyprctl {}", command);
    let response = ipc_request(command)?;
    check_ok(&response)
}

fn check_ok(response: &str) -> Result<(), HyprlandWmError> {
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(response.trim().to_string()))
    }
}

//  Minimal serde structs for the JSON we care about

#[derive(Deserialize)]
struct WorkspaceRefJson {
    id: i64,
    name: String,
}

impl From<WorkspaceRefJson> for WorkspaceRef {
    fn from(w: WorkspaceRefJson) -> Self {
        WorkspaceRef {
            id: w.id,
            name: w.name,
        }
    }
}

/// Subset of the JSON object returned by `j/monitors all`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonitorJson {
    id: i64,
    name: String,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    active_workspace: WorkspaceRefJson,
    #[serde(default)]
    focused: bool,
    #[serde(default)]
    disabled: bool,
    /// `"none"` unless the monitor mirrors another one.
    #[serde(default)]
    mirror_of: Option<String>,
}

fn unit_scale() -> f64 {
    1.0
}

impl From<MonitorJson> for MonitorInfo {
    fn from(m: MonitorJson) -> Self {
        let mirror = m
            .mirror_of
            .as_deref()
            .is_some_and(|s| !s.is_empty() && s != "none");
        MonitorInfo {
            id: m.id,
            name: m.name,
            width: m.width,
            height: m.height,
            x: m.x,
            y: m.y,
            scale: m.scale,
            active_workspace: m.active_workspace.into(),
            focused: m.focused,
            mirror,
            disabled: m.disabled,
        }
    }
}

/// Subset of the JSON object returned by `j/workspaces`.
#[derive(Deserialize)]
struct WorkspaceJson {
    id: i64,
    name: String,
    monitor: String,
    #[serde(default)]
    windows: u32,
}

/// Subset of the JSON object returned by `j/clients`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default)]
    title: String,
    workspace: WorkspaceRefJson,
    #[serde(default = "default_true")]
    mapped: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct CursorJson {
    x: i32,
    y: i32,
}

/// Answer of `j/getoption`.  Only string options carry `str`.
#[derive(Deserialize)]
struct OptionJson {
    #[serde(default)]
    str: Option<String>,
}

fn parse_option(response: &str) -> Result<Option<String>, HyprlandWmError> {
    // Unknown options are answered in plain text, not JSON.
    if !response.trim_start().starts_with('{') {
        debug!("getoption: {}", response.trim());
        return Ok(None);
    }
    let opt: OptionJson = parse_json(response)?;
    Ok(opt.str)
}

//  WindowManager implementation

impl WindowManager for HyprlandWm {
    type Error = HyprlandWmError;

    fn monitors(&self) -> Result<Vec<MonitorInfo>, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors all")?;
        Ok(monitors.into_iter().map(MonitorInfo::from).collect())
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, Self::Error> {
        let workspaces: Vec<WorkspaceJson> = ipc_json("workspaces")?;
        Ok(workspaces
            .into_iter()
            .map(|w| WorkspaceInfo {
                id: w.id,
                name: w.name,
                monitor: w.monitor,
                windows: w.windows,
            })
            .collect())
    }

    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error> {
        let clients: Vec<ClientJson> = ipc_json("clients")?;
        Ok(clients
            .into_iter()
            .map(|c| WindowInfo {
                address: c.address,
                title: c.title,
                workspace: c.workspace.into(),
                mapped: c.mapped,
            })
            .collect())
    }

    fn cursor_position(&self) -> Result<Option<(i32, i32)>, Self::Error> {
        let pos: CursorJson = ipc_json("cursorpos")?;
        Ok(Some((pos.x, pos.y)))
    }

    fn create_workspace(&self, name: &str, monitor: &str) -> Result<(), Self::Error> {
        ipc_ok(&format!(
            "/keyword workspace {}, monitor:{}, persistent:true",
            workspace_selector(name),
            monitor
        ))
    }

    fn move_workspace_to_monitor(&self, name: &str, monitor: &str) -> Result<(), Self::Error> {
        ipc_ok(&format!(
            "/dispatch moveworkspacetomonitor {} {}",
            workspace_selector(name),
            monitor
        ))
    }

    fn set_persistent(&self, name: &str, persistent: bool) -> Result<(), Self::Error> {
        ipc_ok(&format!(
            "/keyword workspace {}, persistent:{}",
            workspace_selector(name),
            persistent
        ))
    }

    fn dispatch(&self, dispatcher: &str, arg: &str) -> Result<(), Self::Error> {
        ipc_ok(&format!("/dispatch {} {}", dispatcher, arg))
    }

    fn option_str(&self, name: &str) -> Result<Option<String>, Self::Error> {
        let response = ipc_request(&format!("j/getoption {}", name))?;
        parse_option(&response)
    }

    fn notify(&self, message: &str) -> Result<(), Self::Error> {
        // -1 selects Hyprland's default icon.
        ipc_ok(&format!(
            "/notify -1 {} {} {}",
            NOTIFY_TIMEOUT_MS, NOTIFY_COLOR, message
        ))
    }
}
