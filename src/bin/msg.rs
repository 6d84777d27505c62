//! `monsplit-msg` sends one dispatcher to a running monsplit daemon.
//!
//! Meant for key bindings:
//!
//! ```text
//! bind = SUPER, 1, exec, monsplit-msg workspace 1
//! bind = SUPER, Tab, exec, monsplit-msg cycleworkspaces next
//! bind = SUPER SHIFT, L, exec, monsplit-msg changemonitor l
//! ```

use clap::{Parser, Subcommand};
use monsplit::command::Command;
use monsplit::ipc::{client, default_socket_path};
use std::path::PathBuf;
use std::process::exit;

#[derive(Parser, Debug)]
#[command(version, about = "Send a dispatcher to the monsplit daemon")]
struct Args {
    #[command(subcommand)]
    dispatcher: Dispatcher,

    /// Daemon socket.  Defaults to `$XDG_RUNTIME_DIR/monsplit.sock`.
    #[arg(long, global = true)]
    socket: Option<PathBuf>,
}

/// Dispatchers understood by the daemon.  The `split-` spelling used in
/// Hyprland binds is accepted as an alias.
#[derive(Subcommand, Debug)]
enum Dispatcher {
    /// Switch to a workspace of the focused monitor (`3`, `+1`, `empty`, a name)
    #[command(name = "workspace", alias = "split-workspace")]
    Workspace {
        #[arg(allow_hyphen_values = true)]
        token: String,
    },
    /// Step through the focused monitor's workspaces (`next`, `prev`, `N`, `-N`)
    #[command(name = "cycleworkspaces", alias = "split-cycleworkspaces")]
    CycleWorkspaces {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Same as `cycleworkspaces` but never wraps (deprecated)
    #[command(name = "cycleworkspacesnowrap", alias = "split-cycleworkspacesnowrap")]
    CycleWorkspacesNowrap {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Move the focused window to a workspace and follow it
    #[command(name = "movetoworkspace", alias = "split-movetoworkspace")]
    MoveToWorkspace {
        #[arg(allow_hyphen_values = true)]
        token: String,
    },
    /// Move the focused window to a workspace
    #[command(name = "movetoworkspacesilent", alias = "split-movetoworkspacesilent")]
    MoveToWorkspaceSilent {
        #[arg(allow_hyphen_values = true)]
        token: String,
    },
    /// Move the focused window to another monitor and follow it (`next`, `-1`, `l`, an id)
    #[command(name = "changemonitor", alias = "split-changemonitor")]
    ChangeMonitor {
        #[arg(allow_hyphen_values = true)]
        target: String,
    },
    /// Move the focused window to another monitor
    #[command(name = "changemonitorsilent", alias = "split-changemonitorsilent")]
    ChangeMonitorSilent {
        #[arg(allow_hyphen_values = true)]
        target: String,
    },
    /// Collect windows living outside every block
    #[command(name = "grabroguewindows", alias = "split-grabroguewindows")]
    GrabRogueWindows,
    /// Re-read the config and remap every monitor
    Reload,
    /// Unmap everything and stop the daemon
    Shutdown,
}

impl From<Dispatcher> for Command {
    fn from(d: Dispatcher) -> Self {
        match d {
            Dispatcher::Workspace { token } => Command::Workspace(token),
            Dispatcher::CycleWorkspaces { value } => Command::CycleWorkspaces(value),
            Dispatcher::CycleWorkspacesNowrap { value } => Command::CycleWorkspacesNowrap(value),
            Dispatcher::MoveToWorkspace { token } => Command::MoveToWorkspace(token),
            Dispatcher::MoveToWorkspaceSilent { token } => Command::MoveToWorkspaceSilent(token),
            Dispatcher::ChangeMonitor { target } => Command::ChangeMonitor(target),
            Dispatcher::ChangeMonitorSilent { target } => Command::ChangeMonitorSilent(target),
            Dispatcher::GrabRogueWindows => Command::GrabRogueWindows,
            Dispatcher::Reload => Command::Reload,
            Dispatcher::Shutdown => Command::Shutdown,
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let socket = args.socket.unwrap_or_else(default_socket_path);

    match client::send(&socket, &Command::from(args.dispatcher)) {
        Ok(result) if result.success => {}
        Ok(result) => {
            eprintln!("{}", result.error.unwrap_or_default());
            exit(1);
        }
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(argv: &[&str]) -> Command {
        let args = Args::try_parse_from(std::iter::once("monsplit-msg").chain(argv.iter().copied()))
            .unwrap();
        Command::from(args.dispatcher)
    }

    #[test]
    fn dispatcher_names_match_hyprland_spelling() {
        assert_eq!(command(&["workspace", "3"]), Command::Workspace("3".into()));
        assert_eq!(
            command(&["movetoworkspacesilent", "web"]),
            Command::MoveToWorkspaceSilent("web".into())
        );
        assert_eq!(command(&["grabroguewindows"]), Command::GrabRogueWindows);
    }

    #[test]
    fn negative_offsets_are_values_not_flags() {
        assert_eq!(command(&["workspace", "-1"]), Command::Workspace("-1".into()));
        assert_eq!(
            command(&["changemonitor", "-2"]),
            Command::ChangeMonitor("-2".into())
        );
    }

    #[test]
    fn split_prefix_is_accepted() {
        assert_eq!(
            command(&["split-cycleworkspaces", "next"]),
            Command::CycleWorkspaces("next".into())
        );
    }

    #[test]
    fn socket_override_and_unknown_dispatchers() {
        let args =
            Args::try_parse_from(["monsplit-msg", "reload", "--socket", "/tmp/x.sock"]).unwrap();
        assert_eq!(args.socket, Some(PathBuf::from("/tmp/x.sock")));
        assert!(Args::try_parse_from(["monsplit-msg", "frobnicate"]).is_err());
        assert!(Args::try_parse_from(["monsplit-msg", "workspace"]).is_err());
    }
}
