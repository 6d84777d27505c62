//! Workspace token grammar.
//!
//! A token is whatever the user typed after the dispatcher name.  It is
//! interpreted against the block of the focused monitor, in this order:
//!
//! 1. `empty`: the first workspace of the block without windows (a
//!    workspace that does not exist yet counts as empty), or the last entry
//!    when every workspace is occupied.  The focused workspace is a valid
//!    candidate.
//! 2. `+N` / `-N`: an offset from the focused workspace's position.
//! 3. `N`: a 1-based position inside the block.
//! 4. anything else: a literal workspace name handed to the host as is.
//!
//! Positions that fall outside the block are wrapped (Euclidean modulo) or
//! clamped to the nearest end, depending on the wrap policy.

use log::warn;

/// Parsed form of a workspace token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceToken {
    Empty,
    Relative(i64),
    /// 1-based position inside the block.
    Absolute(i64),
    Name(String),
}

/// Where a token points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 0-based position inside the block.
    Position(usize),
    /// Not a block position; pass this string to the host unchanged.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid workspace token: {0}")]
    InvalidToken(String),
}

/// Parse a string made only of ASCII digits.  Signs, whitespace and
/// overflow all yield `None`.
pub fn try_parse_int(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse a signed integer: an optional `+` or `-` followed by digits.
pub fn try_parse_signed(s: &str) -> Option<i64> {
    if let Some(rest) = s.strip_prefix('+') {
        try_parse_int(rest)
    } else if let Some(rest) = s.strip_prefix('-') {
        try_parse_int(rest).map(|n| -n)
    } else {
        try_parse_int(s)
    }
}

/// Step size for `next` / `prev` / `+N` / `-N` / `N`.
///
/// Returns `None` for anything unparseable and for a zero step.
pub fn parse_delta(s: &str) -> Option<i64> {
    let delta = match s.trim() {
        "next" => 1,
        "prev" => -1,
        other => try_parse_signed(other)?,
    };
    (delta != 0).then_some(delta)
}

/// Classify `token` according to the grammar above.
pub fn parse(token: &str) -> Result<WorkspaceToken, TokenError> {
    if token == "empty" {
        return Ok(WorkspaceToken::Empty);
    }
    if token.starts_with('+') || token.starts_with('-') {
        return match try_parse_signed(token) {
            Some(0) => Err(TokenError::InvalidToken(token.to_string())),
            Some(delta) => Ok(WorkspaceToken::Relative(delta)),
            None => {
                warn!("{:?} is not a valid offset, treating it as a workspace name", token);
                Ok(WorkspaceToken::Name(token.to_string()))
            }
        };
    }
    match try_parse_int(token) {
        Some(n) => Ok(WorkspaceToken::Absolute(n)),
        None => Ok(WorkspaceToken::Name(token.to_string())),
    }
}

/// Bring an arbitrary 0-based index back into `0..len`.
///
/// `len` must be non-zero.
pub fn normalize(index: i64, len: usize, wrap: bool) -> usize {
    let len = len as i64;
    if (0..len).contains(&index) {
        index as usize
    } else if wrap {
        index.rem_euclid(len) as usize
    } else {
        index.clamp(0, len - 1) as usize
    }
}

/// Position `delta` steps away from `position`, wrapped or clamped into a
/// block of `len` entries.  `len` must be non-zero.
///
/// Any `i64` delta is accepted: when wrapping, the delta is reduced modulo
/// `len` before it is added.
pub fn offset(position: usize, delta: i64, len: usize, wrap: bool) -> usize {
    let len = len as i64;
    let position = position as i64;
    if wrap {
        ((position + delta.rem_euclid(len)) % len) as usize
    } else {
        position.saturating_add(delta).clamp(0, len - 1) as usize
    }
}

/// Step `delta` positions from `position` in a block of `len` entries.
///
/// With wrapping disabled, a step that would leave the block returns
/// `None`: the caller should do nothing.
pub fn step(position: usize, delta: i64, len: usize, wrap: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if wrap {
        return Some(offset(position, delta, len, true));
    }
    match (position as i64).checked_add(delta) {
        Some(target) if (0..len as i64).contains(&target) => Some(target as usize),
        _ => None,
    }
}

/// Everything token resolution needs to know about the focused monitor.
pub struct Context<'a> {
    /// The monitor's block, position 0 first.  Must not be empty.
    pub block: &'a [String],
    /// Name of the workspace the monitor currently shows.
    pub current: &'a str,
    pub wrap: bool,
}

/// Resolve `token` against `ctx`.
///
/// `window_count` reports how many windows a workspace holds; workspaces
/// that do not exist should report zero.
pub fn resolve<F>(token: &str, ctx: &Context<'_>, window_count: F) -> Result<Target, TokenError>
where
    F: Fn(&str) -> u32,
{
    let len = ctx.block.len();
    if len == 0 {
        return Ok(Target::Literal(token.to_string()));
    }
    let index = match parse(token)? {
        WorkspaceToken::Empty => {
            let pos = ctx
                .block
                .iter()
                .position(|name| window_count(name) == 0)
                .unwrap_or(len - 1);
            return Ok(Target::Position(pos));
        }
        WorkspaceToken::Relative(delta) => {
            match ctx.block.iter().position(|name| name == ctx.current) {
                Some(pos) => return Ok(Target::Position(offset(pos, delta, len, ctx.wrap))),
                None => {
                    warn!(
                        "current workspace {} is not part of this monitor's block",
                        ctx.current
                    );
                    return Ok(Target::Literal(token.to_string()));
                }
            }
        }
        WorkspaceToken::Absolute(n) => n - 1,
        WorkspaceToken::Name(name) => return Ok(Target::Literal(name)),
    };
    Ok(Target::Position(normalize(index, len, ctx.wrap)))
}
