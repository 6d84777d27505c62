//! Entry point for the **monsplit** daemon.
//!
//! Spawns the command sources (the Unix-socket listener and the Hyprland
//! event stream) on background threads and processes incoming requests on
//! the main thread, one at a time.

use clap::Parser;
use log::{error, info};
use monsplit::command::Request;
use monsplit::config::Config;
use monsplit::hyprland::events::HyprlandEventSource;
use monsplit::hyprland::wm::HyprlandWm;
use monsplit::ipc::default_socket_path;
use monsplit::ipc::listener::UnixSocketListener;
use monsplit::splitter::Splitter;
use monsplit::traits::{spawn_source, WindowManager};
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Parser, Debug)]
#[command(version, about = "Per-monitor workspace namespaces for Hyprland")]
struct Args {
    /// Config file.  Defaults to `$XDG_CONFIG_HOME/monsplit/config.json`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command socket.  Defaults to `$XDG_RUNTIME_DIR/monsplit.sock`.
    #[arg(long)]
    socket: Option<PathBuf>,
}

/// Resolve the default config path (`$XDG_CONFIG_HOME/monsplit/config.json`).
fn default_config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("monsplit").join("config.json")
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);
    let socket_path = args.socket.unwrap_or_else(default_socket_path);

    let wm = HyprlandWm::new();
    match wm.monitors() {
        Ok(m) => info!("found {} monitor(s)", m.len()),
        Err(e) => {
            error!("failed to query monitors: {}", e);
            std::process::exit(1);
        }
    }

    // The first reload reads the config file and maps every monitor.
    let mut splitter = Splitter::new(wm, Config::default()).with_config_path(&config_path);
    splitter.reload();

    let (tx, rx) = mpsc::channel::<Request>();
    spawn_command_sources(tx, socket_path.clone());
    splitter.run(rx);
    let _ = std::fs::remove_file(&socket_path);
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Request>, socket_path: PathBuf) {
    spawn_source(
        UnixSocketListener::new(&socket_path),
        tx.clone(),
        "socket listener",
        false,
    );
    // Hyprland closes socket2 when it exits; the daemon goes with it.
    spawn_source(HyprlandEventSource::new(), tx, "hyprland event source", true);
}
