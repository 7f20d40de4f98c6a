// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Readers for comma-separated symbol arguments.
//!
//! Each reader returns `None` on malformed input; method handlers treat that
//! as a silent no-op.

use crate::math::Vec3;

/// Splits an argument string on commas. An empty string yields no parts.
pub fn split(args: &str) -> Vec<&str> {
    if args.is_empty() {
        return Vec::new();
    }
    args.split(',').collect()
}

/// Reads `x,y,z`; extra components are ignored.
pub fn vec3(args: &str) -> Option<Vec3> {
    let parts = split(args);
    if parts.len() < 3 {
        return None;
    }
    Some(Vec3::new(
        parts[0].parse().ok()?,
        parts[1].parse().ok()?,
        parts[2].parse().ok()?,
    ))
}

/// Reads a signed integer.
pub fn int(arg: &str) -> Option<i64> {
    arg.trim().parse().ok()
}

/// Reads a boolean flag: `t`, `T`, `1` are true; anything else is false.
pub fn flag(arg: &str) -> bool {
    matches!(arg.trim(), "t" | "T" | "1")
}

/// Ancestor depth for reparenting: a count, or `root`/`r` for the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Walk this many producers up.
    Levels(usize),
    /// Walk to the root-level producer.
    Root,
}

/// Reads a [`Depth`].
pub fn depth(arg: &str) -> Option<Depth> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case("root") || arg.eq_ignore_ascii_case("r") {
        return Some(Depth::Root);
    }
    arg.parse().ok().map(Depth::Levels)
}
