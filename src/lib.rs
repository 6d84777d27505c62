//! **monsplit**: per-monitor workspace namespaces for Hyprland.
//!
//! Every eligible monitor owns a fixed-size, contiguous block of
//! workspaces.  Workspace tokens typed in key bindings (`1`, `+1`, `empty`,
//! a name) are resolved against the block of the focused monitor, so
//! "workspace 3" means the third workspace *of this monitor*.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`]: the compositor operations the core needs
//!   (query monitors and workspaces, create, move and pin workspaces, run
//!   dispatchers) so the mapping logic is not coupled to Hyprland.
//! * [`traits::CommandSource`]: the transport that delivers requests (the
//!   command socket, the Hyprland event stream) so the main loop is not
//!   coupled to any specific IPC mechanism.
//!
//! The core is [`identity`] (stable monitor keys), [`token`] (workspace
//! token grammar), [`table`] (the assignment table), [`mapper`] (building
//! the table), [`navigation`] (picking a target monitor) and [`splitter`]
//! (the request handlers).  Concrete implementations live in [`hyprland`]
//! (Hyprland IPC) and [`ipc`] (Unix-socket command listener and client).

pub mod command;
pub mod config;
pub mod hyprland;
pub mod identity;
pub mod ipc;
pub mod mapper;
pub mod navigation;
pub mod rules;
pub mod splitter;
pub mod table;
pub mod token;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
