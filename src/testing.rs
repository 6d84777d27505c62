//! Recording [`WindowManager`] double shared by the unit tests.

use crate::command::{MonitorInfo, WindowInfo, WorkspaceInfo, WorkspaceRef};
use crate::traits::WindowManager;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, thiserror::Error)]
#[error("fake error: {0}")]
pub struct FakeError(pub String);

/// In-memory compositor.  Every mutating call is recorded so tests can
/// assert on what the core asked for.
#[derive(Debug, Default)]
pub struct FakeWm {
    pub monitors: RefCell<Vec<MonitorInfo>>,
    pub workspaces: RefCell<BTreeMap<String, WorkspaceInfo>>,
    pub windows: RefCell<Vec<WindowInfo>>,
    pub persistent: RefCell<BTreeSet<String>>,
    pub created: RefCell<Vec<(String, String)>>,
    pub moved: RefCell<Vec<(String, String)>>,
    pub dispatches: RefCell<Vec<String>>,
    pub notifications: RefCell<Vec<String>>,
    pub options: RefCell<BTreeMap<String, String>>,
    pub cursor: RefCell<Option<(i32, i32)>>,
    /// When set, every dispatch fails with this message.
    pub dispatch_error: RefCell<Option<String>>,
}

impl FakeWm {
    /// A 1920×1080 monitor at `(x, 0)` showing workspace 1.
    pub fn monitor(id: i64, name: &str, x: i32) -> MonitorInfo {
        MonitorInfo {
            id,
            name: name.into(),
            width: 1920,
            height: 1080,
            x,
            y: 0,
            scale: 1.0,
            active_workspace: WorkspaceRef {
                id: 1,
                name: "1".into(),
            },
            focused: false,
            mirror: false,
            disabled: false,
        }
    }

    pub fn with_monitors(monitors: Vec<MonitorInfo>) -> Self {
        let wm = Self::default();
        *wm.monitors.borrow_mut() = monitors;
        wm
    }

    pub fn add_workspace(&self, name: &str, monitor: &str, windows: u32) {
        let id = name.parse().unwrap_or(-1);
        self.workspaces.borrow_mut().insert(
            name.into(),
            WorkspaceInfo {
                id,
                name: name.into(),
                monitor: monitor.into(),
                windows,
            },
        );
    }

    pub fn add_window(&self, address: &str, workspace: &str, workspace_id: i64) {
        self.windows.borrow_mut().push(WindowInfo {
            address: address.into(),
            title: format!("window {}", address),
            workspace: WorkspaceRef {
                id: workspace_id,
                name: workspace.into(),
            },
            mapped: true,
        });
    }

    /// Mark `monitor` focused and showing `workspace`.
    pub fn focus(&self, monitor: &str, workspace: &str) {
        for m in self.monitors.borrow_mut().iter_mut() {
            m.focused = m.name == monitor;
        }
        self.show(monitor, workspace);
    }

    /// Make `monitor` show `workspace` without touching focus.
    pub fn show(&self, monitor: &str, workspace: &str) {
        for m in self.monitors.borrow_mut().iter_mut() {
            if m.name == monitor {
                m.active_workspace = WorkspaceRef {
                    id: workspace.parse().unwrap_or(-1),
                    name: workspace.into(),
                };
            }
        }
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatches.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.dispatches.borrow_mut().clear();
        self.created.borrow_mut().clear();
        self.moved.borrow_mut().clear();
        self.notifications.borrow_mut().clear();
    }
}

impl WindowManager for FakeWm {
    type Error = FakeError;

    fn monitors(&self) -> Result<Vec<MonitorInfo>, FakeError> {
        Ok(self.monitors.borrow().clone())
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, FakeError> {
        Ok(self.workspaces.borrow().values().cloned().collect())
    }

    fn windows(&self) -> Result<Vec<WindowInfo>, FakeError> {
        Ok(self.windows.borrow().clone())
    }

    fn cursor_position(&self) -> Result<Option<(i32, i32)>, FakeError> {
        Ok(*self.cursor.borrow())
    }

    fn create_workspace(&self, name: &str, monitor: &str) -> Result<(), FakeError> {
        self.created
            .borrow_mut()
            .push((name.into(), monitor.into()));
        self.add_workspace(name, monitor, 0);
        // Hyprland creates through a persistent workspace rule.
        self.persistent.borrow_mut().insert(name.into());
        Ok(())
    }

    fn move_workspace_to_monitor(&self, name: &str, monitor: &str) -> Result<(), FakeError> {
        self.moved.borrow_mut().push((name.into(), monitor.into()));
        match self.workspaces.borrow_mut().get_mut(name) {
            Some(ws) => {
                ws.monitor = monitor.into();
                Ok(())
            }
            None => Err(FakeError(format!("no workspace {}", name))),
        }
    }

    fn set_persistent(&self, name: &str, persistent: bool) -> Result<(), FakeError> {
        if persistent {
            self.persistent.borrow_mut().insert(name.into());
        } else {
            self.persistent.borrow_mut().remove(name);
        }
        Ok(())
    }

    fn dispatch(&self, dispatcher: &str, arg: &str) -> Result<(), FakeError> {
        if let Some(msg) = self.dispatch_error.borrow().clone() {
            return Err(FakeError(msg));
        }
        self.dispatches
            .borrow_mut()
            .push(format!("{} {}", dispatcher, arg));
        Ok(())
    }

    fn option_str(&self, name: &str) -> Result<Option<String>, FakeError> {
        Ok(self.options.borrow().get(name).cloned())
    }

    fn notify(&self, message: &str) -> Result<(), FakeError> {
        self.notifications.borrow_mut().push(message.into());
        Ok(())
    }
}
