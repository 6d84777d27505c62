//! Core traits that decouple monsplit from any specific compositor or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements one of these traits.  The [`Splitter`](crate::splitter::Splitter)
//! only depends on these abstractions.

use crate::command::{Command, MonitorInfo, Request, WindowInfo, WorkspaceInfo};
use log::{error, info};
use std::sync::mpsc;
use std::thread;

/// Abstraction over the compositor that owns monitors, workspaces and
/// windows.
///
/// The core never constructs or destroys monitors; it only reads them and
/// asks the window manager to create, move and pin workspaces, and to run
/// dispatch commands.  An implementation might talk to Hyprland via IPC, or
/// it might be a recording stub used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Return every monitor the window manager knows about, including
    /// mirrored and disabled ones.
    fn monitors(&self) -> Result<Vec<MonitorInfo>, Self::Error>;

    /// Return every workspace that currently exists.
    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, Self::Error>;

    /// Look up a workspace by name.  `None` means it does not exist (yet).
    fn workspace(&self, name: &str) -> Result<Option<WorkspaceInfo>, Self::Error> {
        Ok(self.workspaces()?.into_iter().find(|w| w.name == name))
    }

    /// Return every window the window manager knows about.
    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error>;

    /// Cursor position in layout coordinates, if known.
    fn cursor_position(&self) -> Result<Option<(i32, i32)>, Self::Error>;

    /// Create the workspace `name` bound to `monitor` without focusing it.
    ///
    /// The host may keep the new workspace pinned until
    /// [`set_persistent`](Self::set_persistent)`(name, false)`.
    fn create_workspace(&self, name: &str, monitor: &str) -> Result<(), Self::Error>;

    /// Move an existing workspace onto `monitor`.
    fn move_workspace_to_monitor(&self, name: &str, monitor: &str) -> Result<(), Self::Error>;

    /// Set or clear the flag that keeps an empty, unfocused workspace alive.
    fn set_persistent(&self, name: &str, persistent: bool) -> Result<(), Self::Error>;

    /// Run a named dispatcher (`workspace`, `movetoworkspace`, …) with one
    /// argument.  Any answer other than success is an error carrying the
    /// host's message.
    fn dispatch(&self, dispatcher: &str, arg: &str) -> Result<(), Self::Error>;

    /// Read a string option from the host configuration.  `None` means the
    /// option does not exist.
    fn option_str(&self, name: &str) -> Result<Option<String>, Self::Error>;

    /// Show a short-lived notification to the user.
    fn notify(&self, message: &str) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Request`]s.
///
/// Implementations listen on some transport (a Unix socket, Hyprland's
/// IPC event stream, an in-memory channel) and forward parsed commands
/// into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
///   They never touch splitter state; all handling happens on the thread
///   that owns the receiving end.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming request into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error>;
}

/// Run `source` on its own thread.
///
/// With `shutdown_on_exit`, a [`Command::Shutdown`] request follows once
/// the source stops (cleanly or not), so the daemon unmaps and exits
/// instead of outliving the compositor it serves.
pub fn spawn_source<S>(
    mut source: S,
    sink: mpsc::Sender<Request>,
    name: &'static str,
    shutdown_on_exit: bool,
) -> thread::JoinHandle<()>
where
    S: CommandSource + 'static,
{
    thread::spawn(move || {
        if let Err(e) = source.run(sink.clone()) {
            error!("{} error: {}", name, e);
        }
        if shutdown_on_exit {
            info!("{} stopped, requesting shutdown", name);
            let _ = sink.send(Request::fire(Command::Shutdown));
        }
    })
}
