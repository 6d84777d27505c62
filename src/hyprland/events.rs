//! Translates Hyprland's event stream into monsplit [`Command`]s.
//!
//! Hyprland broadcasts events over its second IPC socket (`socket2`) in the
//! `EVENT>>DATA\n` format, at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`.
//!
//! Three of them matter here:
//!
//! | Event            | Payload  | Command                          |
//! |------------------|----------|----------------------------------|
//! | `monitoradded`   | `<name>` | [`Command::MonitorAdded`]        |
//! | `monitorremoved` | `<name>` | [`Command::MonitorRemoved`]      |
//! | `configreloaded` |          | [`Command::ConfigReloaded`]      |
//!
//! The `v2` variants of the monitor events are sent alongside the plain
//! ones and are ignored, otherwise every hotplug would remap twice.

use crate::command::{Command, Request};
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::mpsc;

/// A [`CommandSource`] that listens to Hyprland's event socket and emits
/// hotplug and reload commands.
#[derive(Debug, Default)]
pub struct HyprlandEventSource {
    /// Overrides the socket path discovered from the environment.
    path: Option<PathBuf>,
}

impl HyprlandEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read events from `path` instead of the running instance's socket2.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn socket_path(&self) -> Result<PathBuf, HyprlandEventError> {
        match &self.path {
            Some(p) => Ok(p.clone()),
            None => Ok(super::instance_dir()
                .map_err(HyprlandEventError)?
                .join(".socket2.sock")),
        }
    }
}

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA\n`.
fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(">>")?;
    Some((&line[..sep], &line[sep + 2..]))
}

/// Map one event to the command it triggers, if any.
fn command_for(event: &str, data: &str) -> Option<Command> {
    match event {
        "monitoradded" => Some(Command::MonitorAdded(data.trim().to_string())),
        "monitorremoved" => Some(Command::MonitorRemoved(data.trim().to_string())),
        "configreloaded" => Some(Command::ConfigReloaded),
        _ => None,
    }
}

impl CommandSource for HyprlandEventSource {
    type Error = HyprlandEventError;

    /// Connect to Hyprland's event socket and forward hotplug and reload
    /// events.
    ///
    /// This method **blocks** until the socket is closed or an error
    /// occurs.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        let path = self.socket_path()?;
        info!("connecting to socket2: {}", path.display());
        let stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandEventError(format!("connect to {}: {}", path.display(), e)))?;
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("socket2 read error: {}", e);
                    return Err(HyprlandEventError(format!("read error: {}", e)));
                }
            };
            let Some((event, data)) = parse_event_line(&line) else {
                continue;
            };
            if let Some(cmd) = command_for(event, data) {
                debug!("event {}>>{}", event, data);
                if sink.send(Request::fire(cmd)).is_err() {
                    debug!("receiver dropped, stopping event source");
                    return Ok(());
                }
            }
        }

        warn!("socket2 stream ended");
        Ok(())
    }
}

/// Error from the Hyprland event source.
#[derive(Debug, thiserror::Error)]
#[error("hyprland event error: {0}")]
pub struct HyprlandEventError(String);

//  Tests
