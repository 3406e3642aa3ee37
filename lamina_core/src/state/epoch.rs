// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projection revision counter.

use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

/// A revision counter shared by every [`RenderState`](super::RenderState)
/// of one traversal context.
///
/// Setting a projection stamps the state with the next revision. Two states
/// drawing from the same epoch hold equal projection matrices whenever
/// their revisions are equal, so a copy can skip the 4×4 matrix when the
/// stamps match. Revision `0` is reserved for the identity projection of a
/// fresh or reset state.
///
/// Cloning yields another handle to the same counter.
#[derive(Clone, Default)]
pub struct ProjectionEpoch(Rc<Cell<u64>>);

impl ProjectionEpoch {
    /// Creates a new, independent counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the counter and returns the new revision.
    pub fn advance(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }

    /// The most recently issued revision.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.get()
    }

    /// Returns `true` if both handles share one counter.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ProjectionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectionEpoch({})", self.0.get())
    }
}
