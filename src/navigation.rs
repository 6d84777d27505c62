//! Picking the monitor a change-monitor request points at.
//!
//! Monitors are addressed in block order (see [`Mapper::eligible`]).
//! `next` / `prev` / `+N` / `-N` step cyclically through that order, a bare
//! integer names a monitor by its runtime id, and a compass direction
//! selects the neighbour sharing the longest edge on that side.  When no
//! monitor touches that side, directions fall back to cyclic stepping
//! (`right` and `down` forward, `left` and `up` backward).
//!
//! [`Mapper::eligible`]: crate::mapper::Mapper::eligible

use crate::command::{parse_direction, Direction, MonitorInfo};
use crate::token::{try_parse_int, try_parse_signed};

/// Parsed form of a monitor token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorTarget {
    Relative(i64),
    Id(i64),
    Toward(Direction),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("invalid monitor value: {0}")]
    InvalidToken(String),
    #[error("no monitor with id {0}")]
    UnknownId(i64),
}

/// Classify a monitor token.
pub fn parse_target(token: &str) -> Result<MonitorTarget, NavigationError> {
    let token = token.trim();
    let invalid = || NavigationError::InvalidToken(token.to_string());
    match token {
        "next" => return Ok(MonitorTarget::Relative(1)),
        "prev" => return Ok(MonitorTarget::Relative(-1)),
        _ => {}
    }
    if let Some(dir) = parse_direction(token) {
        return Ok(MonitorTarget::Toward(dir));
    }
    if token.starts_with('+') || token.starts_with('-') {
        return match try_parse_signed(token) {
            Some(0) | None => Err(invalid()),
            Some(delta) => Ok(MonitorTarget::Relative(delta)),
        };
    }
    try_parse_int(token).map(MonitorTarget::Id).ok_or_else(invalid)
}

/// Index `delta` steps away from `current`, wrapping around `len`.
pub fn cyclic(current: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    ((current as i64).rem_euclid(len) + delta.rem_euclid(len)).rem_euclid(len) as usize
}

/// Logical edges `(left, top, right, bottom)` of a monitor.
fn edges(m: &MonitorInfo) -> (i32, i32, i32, i32) {
    let (w, h) = m.logical_size();
    (m.x, m.y, m.x + w, m.y + h)
}

/// Length of the overlap of `[a0, a1)` and `[b0, b1)`.
fn overlap(a0: i32, a1: i32, b0: i32, b1: i32) -> i32 {
    (a1.min(b1) - a0.max(b0)).max(0)
}

/// Index of the monitor directly adjacent to `monitors[current]` on side
/// `dir`, i.e. whose opposite edge lies on that side's edge and shares the
/// longest stretch of it.
///
/// Monitors are evaluated in slice order and only a strictly longer shared
/// edge replaces the current best, so on ties the earlier monitor wins.
pub fn neighbor(monitors: &[MonitorInfo], current: usize, dir: Direction) -> Option<usize> {
    let (cl, ct, cr, cb) = edges(monitors.get(current)?);
    let mut best: Option<(usize, i32)> = None;
    for (i, m) in monitors.iter().enumerate() {
        if i == current {
            continue;
        }
        let (l, t, r, b) = edges(m);
        let shared = match dir {
            Direction::Right if l == cr => overlap(ct, cb, t, b),
            Direction::Left if r == cl => overlap(ct, cb, t, b),
            Direction::Down if t == cb => overlap(cl, cr, l, r),
            Direction::Up if b == ct => overlap(cl, cr, l, r),
            _ => 0,
        };
        if shared > 0 && best.map_or(true, |(_, len)| shared > len) {
            best = Some((i, shared));
        }
    }
    best.map(|(i, _)| i)
}

/// Resolve `target` to an index into `monitors` (block order).
pub fn select(
    monitors: &[MonitorInfo],
    current: usize,
    target: MonitorTarget,
) -> Result<usize, NavigationError> {
    match target {
        MonitorTarget::Relative(delta) => Ok(cyclic(current, delta, monitors.len())),
        MonitorTarget::Id(id) => monitors
            .iter()
            .position(|m| m.id == id)
            .ok_or(NavigationError::UnknownId(id)),
        MonitorTarget::Toward(dir) => Ok(neighbor(monitors, current, dir).unwrap_or_else(|| {
            let delta = match dir {
                Direction::Right | Direction::Down => 1,
                Direction::Left | Direction::Up => -1,
            };
            cyclic(current, delta, monitors.len())
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWm;

    fn mon(id: i64, name: &str, x: i32, y: i32, w: u32, h: u32) -> MonitorInfo {
        MonitorInfo {
            y,
            width: w,
            height: h,
            ..FakeWm::monitor(id, name, x)
        }
    }

    fn row_of_three() -> Vec<MonitorInfo> {
        vec![
            mon(0, "DP-1", 0, 0, 1920, 1080),
            mon(1, "DP-2", 1920, 0, 1920, 1080),
            mon(2, "DP-3", 3840, 0, 1920, 1080),
        ]
    }

    #[test]
    fn parse_monitor_tokens() {
        assert_eq!(parse_target("next"), Ok(MonitorTarget::Relative(1)));
        assert_eq!(parse_target("prev"), Ok(MonitorTarget::Relative(-1)));
        assert_eq!(parse_target("+2"), Ok(MonitorTarget::Relative(2)));
        assert_eq!(parse_target("-1"), Ok(MonitorTarget::Relative(-1)));
        assert_eq!(parse_target("3"), Ok(MonitorTarget::Id(3)));
        assert_eq!(parse_target("l"), Ok(MonitorTarget::Toward(Direction::Left)));
        assert_eq!(parse_target("down"), Ok(MonitorTarget::Toward(Direction::Down)));
        assert!(parse_target("+0").is_err());
        assert!(parse_target("sideways").is_err());
        assert!(parse_target("").is_err());
    }

    #[test]
    fn cyclic_wraps_both_ways() {
        assert_eq!(cyclic(2, 1, 3), 0);
        assert_eq!(cyclic(0, -1, 3), 2);
        assert_eq!(cyclic(1, 5, 3), 0);
        assert_eq!(cyclic(0, 1, 1), 0);
    }

    #[test]
    fn cyclic_handles_extreme_deltas() {
        // i64::MAX leaves 1 modulo 3, i64::MIN + 1 leaves 2.
        assert_eq!(cyclic(2, i64::MAX, 3), 0);
        assert_eq!(cyclic(1, i64::MIN + 1, 3), 0);
        assert_eq!(cyclic(0, i64::MIN, 3), 1);
    }

    #[test]
    fn neighbor_right_and_left() {
        let mons = row_of_three();
        assert_eq!(neighbor(&mons, 0, Direction::Right), Some(1));
        assert_eq!(neighbor(&mons, 1, Direction::Left), Some(0));
        assert_eq!(neighbor(&mons, 2, Direction::Right), None);
    }

    #[test]
    fn neighbor_requires_touching_edges() {
        // DP-3 is right of DP-1 but not adjacent to it.
        let mons = row_of_three();
        assert_eq!(neighbor(&mons, 0, Direction::Right), Some(1));
        assert_ne!(neighbor(&mons, 0, Direction::Right), Some(2));
    }

    #[test]
    fn neighbor_prefers_longest_shared_edge() {
        // Two stacked monitors to the right of a tall one; the lower one
        // shares more of the edge.
        let mons = vec![
            mon(0, "DP-1", 0, 0, 1080, 1920),
            mon(1, "DP-2", 1080, 0, 1920, 800),
            mon(2, "DP-3", 1080, 800, 1920, 1080),
        ];
        assert_eq!(neighbor(&mons, 0, Direction::Right), Some(2));
    }

    #[test]
    fn neighbor_ties_keep_first_evaluated() {
        let mons = vec![
            mon(0, "DP-1", 0, 0, 1920, 2160),
            mon(1, "DP-2", 1920, 0, 1920, 1080),
            mon(2, "DP-3", 1920, 1080, 1920, 1080),
        ];
        assert_eq!(neighbor(&mons, 0, Direction::Right), Some(1));
    }

    #[test]
    fn neighbor_above_and_below() {
        let mons = vec![
            mon(0, "DP-1", 0, 0, 1920, 1080),
            mon(1, "eDP-1", 240, 1080, 1440, 900),
        ];
        assert_eq!(neighbor(&mons, 0, Direction::Down), Some(1));
        assert_eq!(neighbor(&mons, 1, Direction::Up), Some(0));
        assert_eq!(neighbor(&mons, 1, Direction::Down), None);
    }

    #[test]
    fn neighbor_uses_logical_size() {
        let mut hidpi = mon(0, "eDP-1", 0, 0, 2880, 1800);
        hidpi.scale = 2.0;
        let mons = vec![hidpi, mon(1, "DP-1", 1440, 0, 1920, 1080)];
        assert_eq!(neighbor(&mons, 0, Direction::Right), Some(1));
    }

    #[test]
    fn direction_without_neighbor_falls_back_to_cycling() {
        let mons = row_of_three();
        assert_eq!(select(&mons, 2, MonitorTarget::Toward(Direction::Right)), Ok(0));
        assert_eq!(select(&mons, 0, MonitorTarget::Toward(Direction::Up)), Ok(2));
    }

    #[test]
    fn select_by_id() {
        let mons = row_of_three();
        assert_eq!(select(&mons, 0, MonitorTarget::Id(2)), Ok(2));
        assert_eq!(
            select(&mons, 0, MonitorTarget::Id(9)),
            Err(NavigationError::UnknownId(9))
        );
    }
}
