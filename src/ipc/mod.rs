//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (scripts, key-bind helpers, etc.) can connect to the
//! socket and send newline-delimited JSON commands.  The `monsplit-msg`
//! binary is a thin wrapper around [`client::send`].

pub mod client;
pub mod listener;

use std::path::PathBuf;

/// Socket file name inside `$XDG_RUNTIME_DIR`.
pub const SOCKET_NAME: &str = "monsplit.sock";

/// `$XDG_RUNTIME_DIR/monsplit.sock`, or the temp dir when the runtime dir
/// is not set.
pub fn default_socket_path() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(SOCKET_NAME)
}
