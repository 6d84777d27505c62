//! The main orchestrator that ties the assignment table, the window manager
//! and the command sources together.
//!
//! [`Splitter`] owns the [`Mapper`] (and through it the assignment table and
//! the retention set) and reacts to [`Command`]s by resolving tokens against
//! the focused monitor's block and issuing calls to the [`WindowManager`].
//!
//! All handlers run on one thread, one at a time, to completion.  A remap
//! (unmap everything, map everything) therefore never interleaves with a
//! dispatch handler.

use crate::command::{Command, DispatchResult, MonitorInfo, Request};
use crate::config::Config;
use crate::identity::MonitorKey;
use crate::mapper::{MapOptions, Mapper};
use crate::navigation::{self, NavigationError};
use crate::rules;
use crate::table::Block;
use crate::token::{self, Target, TokenError};
use crate::traits::WindowManager;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;

/// Hyprland option naming the monitor that should get focus first.
const DEFAULT_MONITOR_OPTION: &str = "cursor:default_monitor";

/// Possible errors from the splitter.
#[derive(Debug, thiserror::Error)]
pub enum SplitterError {
    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),
    /// A dispatch reached the window manager and was refused.
    #[error("{0}")]
    Dispatch(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    /// The request cannot be mapped onto a known workspace or monitor.
    #[error("{0}")]
    Resolution(String),
}

fn wm_error(e: impl std::fmt::Display) -> SplitterError {
    SplitterError::WindowManager(e.to_string())
}

/// Per-monitor workspace switching on top of a [`WindowManager`].
///
/// The splitter is generic over any [`WindowManager`] implementation, making
/// it completely independent of Hyprland or any other concrete backend.
///
/// # Typical usage
///
/// ```ignore
/// let mut splitter = Splitter::new(HyprlandWm::new(), config);
/// splitter.reload();
/// let result = splitter.handle(Command::Workspace("3".into()));
/// ```
pub struct Splitter<W: WindowManager> {
    wm: W,
    config: Config,
    config_path: Option<PathBuf>,
    mapper: Mapper,
    /// Until the first remap completes, focus is switched even when
    /// `keep_focused` is set.
    first_load: bool,
}

impl<W: WindowManager> Splitter<W> {
    /// Create a new splitter.  Nothing is mapped until [`reload`](Self::reload)
    /// or [`remap`](Self::remap) runs.
    pub fn new(wm: W, config: Config) -> Self {
        Self {
            wm,
            config,
            config_path: None,
            mapper: Mapper::new(),
            first_load: true,
        }
    }

    /// Re-read the configuration from `path` on every reload.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Process a single [`Command`].
    ///
    /// Never fails: every error is logged and reported in the returned
    /// [`DispatchResult`].
    pub fn handle(&mut self, cmd: Command) -> DispatchResult {
        let result = match cmd {
            Command::Workspace(token) => {
                info!("workspace {}", token);
                self.switch_workspace(&token)
            }
            Command::CycleWorkspaces(value) => {
                info!("cycle workspaces {}", value);
                self.cycle_workspaces(&value, !self.config.enable_wrapping)
            }
            Command::CycleWorkspacesNowrap(value) => {
                let msg = "cycleworkspacesnowrap is deprecated. Set enable_wrapping to false instead.";
                warn!("{}", msg);
                self.notify(msg);
                self.cycle_workspaces(&value, true)
            }
            Command::MoveToWorkspace(token) => {
                info!("move to workspace {}", token);
                self.move_to_workspace(&token, false)
            }
            Command::MoveToWorkspaceSilent(token) => {
                info!("move to workspace silently {}", token);
                self.move_to_workspace(&token, true)
            }
            Command::ChangeMonitor(value) => {
                info!("change monitor {}", value);
                self.change_monitor(&value, false)
            }
            Command::ChangeMonitorSilent(value) => {
                info!("change monitor silently {}", value);
                self.change_monitor(&value, true)
            }
            Command::GrabRogueWindows => self.grab_rogue_windows(),
            Command::MonitorAdded(name) => {
                info!("monitor {} added", name);
                self.remap();
                Ok(())
            }
            Command::MonitorRemoved(name) => {
                info!("monitor {} removed", name);
                self.remap();
                Ok(())
            }
            Command::ConfigReloaded => {
                // Must never ask the host to reload again from here.
                info!("config reloaded");
                self.notify("Config reloaded");
                self.reload();
                Ok(())
            }
            Command::Reload => {
                self.reload();
                Ok(())
            }
            Command::Shutdown => {
                self.shutdown();
                Ok(())
            }
        };
        match result {
            Ok(()) => DispatchResult::ok(),
            Err(e) => {
                warn!("{}", e);
                DispatchResult::err(e.to_string())
            }
        }
    }

    /// Handle requests until a shutdown request arrives or every sender is
    /// gone.  Either way every monitor is unmapped before this returns.
    pub fn run(&mut self, requests: mpsc::Receiver<Request>) {
        info!("monsplit running");
        for request in requests {
            let shutdown = request.command == Command::Shutdown;
            let result = self.handle(request.command);
            if let Some(reply) = request.reply {
                // The client may have hung up already.
                let _ = reply.send(result);
            }
            if shutdown {
                info!("shutdown requested, exiting");
                return;
            }
        }
        info!("all command sources closed, exiting");
        self.shutdown();
    }

    //  Lifecycle

    /// Re-read the configuration file (if any) and remap every monitor.
    pub fn reload(&mut self) {
        if let Some(path) = &self.config_path {
            self.config = match Config::load(path) {
                Ok(cfg) => {
                    info!("loaded config from {}", path.display());
                    cfg
                }
                Err(e) => {
                    warn!("{}, using defaults", e);
                    Config::default()
                }
            };
        }
        self.remap();
        if self.first_load {
            self.notify("Started");
            self.first_load = false;
        }
    }

    /// Unmap every monitor and map the current ones again.
    pub fn remap(&mut self) {
        self.notify("Remapping workspaces...");
        let monitors = match self.wm.monitors() {
            Ok(m) => m,
            Err(e) => {
                error!("failed to query monitors: {}", e);
                return;
            }
        };
        let switch_focus = !self.config.keep_focused || self.first_load;
        let opts = MapOptions {
            workspace_count: self.config.workspace_count(),
            persistent: self.config.enable_persistent_workspaces,
            switch_focus,
        };
        let mapped = self.mapper.rebuild(&self.wm, &monitors, &opts);
        info!("mapped {} monitor(s)", mapped.len());

        if switch_focus {
            self.focus_primary(&monitors);
        }
        self.write_rules();
    }

    /// Release every block and pinned workspace.
    pub fn shutdown(&mut self) {
        info!("unmapping all monitors");
        self.mapper.unmap_all(&self.wm);
        self.notify("Unloaded");
    }

    //  Dispatch handlers

    /// Activate the workspace `token` points at on the focused monitor.
    pub fn switch_workspace(&self, token: &str) -> Result<(), SplitterError> {
        let monitors = self.wm.monitors().map_err(wm_error)?;
        let monitor = self.current_monitor(&monitors)?;
        let target = self.resolve_workspace(&monitor, token)?;
        debug!("  → workspace {}", target);
        self.dispatch("workspace", &target)
    }

    /// Move the focused window to the workspace `token` points at.
    pub fn move_to_workspace(&self, token: &str, silent: bool) -> Result<(), SplitterError> {
        let monitors = self.wm.monitors().map_err(wm_error)?;
        let monitor = self.current_monitor(&monitors)?;
        let target = self.resolve_workspace(&monitor, token)?;
        debug!("  → workspace {}", target);
        let dispatcher = if silent {
            "movetoworkspacesilent"
        } else {
            "movetoworkspace"
        };
        self.dispatch(dispatcher, &target)
    }

    /// Step `value` positions through the focused monitor's block.
    ///
    /// With `nowrap`, a step past either end does nothing and succeeds.
    pub fn cycle_workspaces(&self, value: &str, nowrap: bool) -> Result<(), SplitterError> {
        let delta = token::parse_delta(value)
            .ok_or_else(|| SplitterError::Resolution(format!("Invalid cycle value: {}", value)))?;
        let monitors = self.wm.monitors().map_err(wm_error)?;
        let monitor = self.current_monitor(&monitors)?;
        let block = self.block_of(&monitor).ok_or_else(|| {
            SplitterError::Resolution(format!("monitor {} has no mapped workspaces", monitor.name))
        })?;
        let position = block.position(&monitor.active_workspace.name).ok_or_else(|| {
            SplitterError::Resolution(
                "Could not find active workspace in monitor workspaces".to_string(),
            )
        })?;
        match token::step(position, delta, block.len(), !nowrap) {
            Some(index) => {
                let target = block.get(index).ok_or_else(|| {
                    SplitterError::Resolution(format!("position {} is outside the block", index))
                })?;
                debug!("  → workspace {}", target);
                self.dispatch("workspace", target)
            }
            None => {
                debug!("at the end of the block and wrapping is off, nothing to do");
                Ok(())
            }
        }
    }

    /// Move the focused window to the active workspace of the monitor
    /// `value` points at.
    pub fn change_monitor(&self, value: &str, silent: bool) -> Result<(), SplitterError> {
        let target = navigation::parse_target(value)?;
        let monitors = self.wm.monitors().map_err(wm_error)?;
        let eligible: Vec<MonitorInfo> = Mapper::eligible(&monitors).into_iter().cloned().collect();
        match eligible.len() {
            0 => {
                error!("no monitors found");
                return Err(SplitterError::Resolution("No monitors found".to_string()));
            }
            1 => {
                debug!("only one monitor, nothing to change");
                return Ok(());
            }
            _ => {}
        }

        let current = self.current_monitor(&monitors)?;
        let current_index = eligible
            .iter()
            .position(|m| m.name == current.name)
            .ok_or_else(|| {
                SplitterError::Resolution(format!(
                    "Monitor {} not found in monitor list",
                    current.name
                ))
            })?;
        let next_index = navigation::select(&eligible, current_index, target)?;
        if next_index == current_index {
            debug!("target is the current monitor, nothing to do");
            return Ok(());
        }

        let next = &eligible[next_index];
        info!(
            "  → monitor {} (workspace {})",
            next.name, next.active_workspace.name
        );
        let dispatcher = if silent {
            "movetoworkspacesilent"
        } else {
            "movetoworkspace"
        };
        self.dispatch(dispatcher, &next.active_workspace.id.to_string())
    }

    /// Move every window whose workspace is in no block onto the focused
    /// monitor's active workspace.
    pub fn grab_rogue_windows(&self) -> Result<(), SplitterError> {
        info!("grabbing rogue windows");
        let monitors = self.wm.monitors().map_err(wm_error)?;
        let current = self.current_monitor(&monitors)?;
        let target = &current.active_workspace;
        if target.name.is_empty() {
            error!("no active workspace on monitor {}", current.name);
            return Err(SplitterError::Resolution("No active workspace found".to_string()));
        }

        let table = self.mapper.table();
        let windows = self.wm.windows().map_err(wm_error)?;
        let mut failed = 0;
        for window in windows {
            if !window.mapped || window.workspace.is_special() {
                continue;
            }
            if window.workspace.name == target.name || table.contains_workspace(&window.workspace.name) {
                continue;
            }
            info!(
                "moving rogue window {} from workspace {} to workspace {}",
                window.title, window.workspace.name, target.name
            );
            let arg = format!("{},address:{}", target.id, window.address);
            if let Err(e) = self.dispatch("movetoworkspacesilent", &arg) {
                warn!("failed to move window {}: {}", window.address, e);
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(SplitterError::Dispatch(format!(
                "{} rogue window(s) could not be moved",
                failed
            )));
        }
        Ok(())
    }

    //  Helpers

    /// The monitor the user is working on: the focused one, or the one
    /// under the cursor if none reports focus.
    fn current_monitor(&self, monitors: &[MonitorInfo]) -> Result<MonitorInfo, SplitterError> {
        if let Some(m) = monitors.iter().find(|m| m.focused) {
            return Ok(m.clone());
        }
        warn!("no focused monitor, falling back to the monitor under the cursor");
        let cursor = self.wm.cursor_position().map_err(wm_error)?;
        cursor
            .and_then(|(x, y)| monitors.iter().find(|m| m.is_eligible() && m.contains(x, y)))
            .cloned()
            .ok_or_else(|| SplitterError::Resolution("No active monitor found".to_string()))
    }

    /// The non-empty block of `monitor`, if it is mapped.
    fn block_of(&self, monitor: &MonitorInfo) -> Option<&Block> {
        self.mapper
            .table()
            .get(&MonitorKey::of(monitor))
            .filter(|b| !b.is_empty())
    }

    /// Turn `token` into the workspace to hand to the host.
    ///
    /// An unmapped monitor (or an empty block) passes the token through
    /// unchanged; Hyprland understands most of the same forms itself.
    fn resolve_workspace(&self, monitor: &MonitorInfo, token: &str) -> Result<String, SplitterError> {
        let Some(block) = self.block_of(monitor) else {
            warn!("monitor {} is not mapped, using {:?} as is", monitor.name, token);
            return Ok(token.to_string());
        };

        let counts: HashMap<String, u32> = if token == "empty" {
            self.wm
                .workspaces()
                .map_err(wm_error)?
                .into_iter()
                .map(|w| (w.name, w.windows))
                .collect()
        } else {
            HashMap::new()
        };
        let ctx = token::Context {
            block: block.names(),
            current: &monitor.active_workspace.name,
            wrap: self.config.enable_wrapping,
        };
        match token::resolve(token, &ctx, |name| counts.get(name).copied().unwrap_or(0))? {
            Target::Position(p) => block.get(p).map(str::to_string).ok_or_else(|| {
                SplitterError::Resolution(format!("position {} is outside the block", p))
            }),
            Target::Literal(name) => Ok(name),
        }
    }

    /// Pick the monitor that receives focus after a remap.
    fn primary_monitor<'a>(&self, eligible: &[&'a MonitorInfo]) -> Option<&'a MonitorInfo> {
        let wanted = if self.config.default_monitor.is_empty() {
            match self.wm.option_str(DEFAULT_MONITOR_OPTION) {
                Ok(value) => value.map(|v| strip_quotes(&v).to_string()),
                Err(e) => {
                    warn!("failed to read {}: {}", DEFAULT_MONITOR_OPTION, e);
                    None
                }
            }
        } else {
            Some(self.config.default_monitor.clone())
        };

        if let Some(name) = wanted.filter(|n| !n.is_empty()) {
            if let Some(m) = eligible.iter().find(|m| m.name == name).copied() {
                info!("using default monitor {}", name);
                return Some(m);
            }
            warn!("default monitor {} not found, using the lowest id", name);
        }
        eligible
            .iter()
            .filter(|m| m.id >= 0)
            .min_by_key(|m| m.id)
            .copied()
    }

    /// Activate the first workspace of the primary monitor.
    fn focus_primary(&self, monitors: &[MonitorInfo]) {
        let eligible = Mapper::eligible(monitors);
        if eligible.is_empty() {
            error!("no monitors found");
            return;
        }
        let Some(primary) = self.primary_monitor(&eligible) else {
            error!("no valid primary monitor found");
            return;
        };
        let key = MonitorKey::of(primary);
        let Some(block) = self.mapper.table().get(&key) else {
            error!("primary monitor {} is not mapped", primary.name);
            return;
        };
        if let Some(first) = block.first() {
            info!(
                "switching to first workspace {} on primary monitor {}",
                first, primary.name
            );
            if let Err(e) = self.dispatch("workspace", first) {
                warn!("{}", e);
            }
        }
    }

    fn dispatch(&self, dispatcher: &str, arg: &str) -> Result<(), SplitterError> {
        info!("dispatch {} {}", dispatcher, arg);
        self.wm
            .dispatch(dispatcher, arg)
            .map_err(|e| SplitterError::Dispatch(e.to_string()))
    }

    fn notify(&self, message: &str) {
        if !self.config.enable_notifications {
            return;
        }
        if let Err(e) = self.wm.notify(&format!("[monsplit] {}", message)) {
            debug!("notification failed: {}", e);
        }
    }

    fn write_rules(&self) {
        let Some(path) = &self.config.rules_file else {
            return;
        };
        let text = rules::render(self.mapper.table(), self.config.enable_persistent_workspaces);
        match rules::write_if_changed(path, &text) {
            Ok(true) => info!("wrote workspace rules to {}", path.display()),
            Ok(false) => debug!("workspace rules unchanged"),
            Err(e) => warn!("failed to write {}: {}", path.display(), e),
        }
    }
}

/// Strip one pair of surrounding double quotes.
fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

//  Tests
