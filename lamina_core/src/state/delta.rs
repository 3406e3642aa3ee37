// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline change sets and the flush observer.
//!
//! Each [`StateDelta`] bit is an independent category of GPU pipeline
//! state. Geometry already queued in a batch was recorded under the old
//! value of every category, so a change to any of them requires the
//! batch to be submitted first. Alpha is deliberately absent: it is baked
//! into vertex colors and never breaks a batch.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// A set of pipeline state categories that changed.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StateDelta(u8);

impl StateDelta {
    /// No change.
    pub const EMPTY: Self = Self(0);
    /// Blend mode changed.
    pub const BLEND: Self = Self(1 << 0);
    /// Render target resource or its options changed.
    pub const TARGET: Self = Self(1 << 1);
    /// Clip rectangle changed.
    pub const CLIP: Self = Self(1 << 2);
    /// Culling mode changed.
    pub const CULLING: Self = Self(1 << 3);
    /// Depth mask or depth test changed.
    pub const DEPTH: Self = Self(1 << 4);

    const NAMED: [(Self, &'static str); 5] = [
        (Self::BLEND, "BLEND"),
        (Self::TARGET, "TARGET"),
        (Self::CLIP, "CLIP"),
        (Self::CULLING, "CULLING"),
        (Self::DEPTH, "DEPTH"),
    ];

    /// Returns `true` if nothing changed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every category in `other` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds a set from raw bits, dropping unknown ones.
    #[inline]
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0x1f)
    }

    /// Returns `flag` if `cond` holds, otherwise [`EMPTY`](Self::EMPTY).
    #[inline]
    #[must_use]
    pub(crate) const fn when(cond: bool, flag: Self) -> Self {
        if cond { flag } else { Self::EMPTY }
    }

    /// Iterates over the names of the categories present.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for StateDelta {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for StateDelta {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for StateDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateDelta(")?;
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        f.write_str(")")
    }
}

/// Receives a notification before a pipeline change is committed.
///
/// The draw-call issuer implements this to submit its pending batch. The
/// call happens synchronously, before the new value is written, so the
/// observer can still read the old state.
pub trait FlushObserver {
    /// Called with the categories about to change. Never called with an
    /// empty delta.
    fn flush_required(&mut self, delta: StateDelta);
}

impl<F: FnMut(StateDelta)> FlushObserver for F {
    fn flush_required(&mut self, delta: StateDelta) {
        self(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn union_and_contains() {
        let d = StateDelta::BLEND | StateDelta::CLIP;
        assert!(d.contains(StateDelta::BLEND));
        assert!(d.contains(StateDelta::CLIP));
        assert!(!d.contains(StateDelta::TARGET));
        assert!(StateDelta::EMPTY.is_empty());
        assert!(!d.is_empty());
    }

    #[test]
    fn debug_lists_names() {
        let d = StateDelta::TARGET | StateDelta::DEPTH;
        assert_eq!(format!("{d:?}"), "StateDelta(TARGET | DEPTH)");
        assert_eq!(format!("{:?}", StateDelta::EMPTY), "StateDelta()");
    }

    #[test]
    fn closures_are_observers() {
        let mut seen = Vec::new();
        {
            let mut obs = |d: StateDelta| seen.push(d);
            obs.flush_required(StateDelta::CULLING);
        }
        assert_eq!(seen, [StateDelta::CULLING]);
    }
}
