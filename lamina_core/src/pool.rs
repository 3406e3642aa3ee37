// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot pool with generational handles.
//!
//! [`Pool`] keeps released values around so that the per-frame hot path
//! can reuse them instead of allocating. Values are addressed through
//! [`Handle`]s carrying a slot index and a generation counter; releasing a
//! slot bumps its generation so that stale handles are detected rather than
//! silently aliasing the next owner.
//!
//! [`PoolGuard`] is the scoped form: it releases its slot when dropped, so
//! an early return out of a traversal cannot leak a slot.

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::matrix::Matrix3d;

/// Values that can be handed out again after being released.
pub trait Recycle {
    /// Creates a value for a freshly allocated slot.
    fn fresh() -> Self;

    /// Prepares a previously released value for its next owner.
    fn recycle(&mut self);
}

impl Recycle for Matrix3d {
    fn fresh() -> Self {
        Self::IDENTITY
    }

    fn recycle(&mut self) {
        self.set_identity();
    }
}

/// Rectangles are handed out as-is; the caller fills them in.
impl Recycle for kurbo::Rect {
    fn fresh() -> Self {
        Self::ZERO
    }

    fn recycle(&mut self) {}
}

/// A handle to a slot in a [`Pool`].
pub struct Handle<T> {
    idx: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}@gen{})", self.idx, self.generation)
    }
}

/// A pool of reusable `T` values.
pub struct Pool<T> {
    values: Vec<T>,
    generation: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.values.len())
            .field("live", &self.live_count())
            .finish_non_exhaustive()
    }
}

impl<T: Recycle> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Recycle> Pool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Creates a pool with `n` slots allocated up front, all free.
    #[must_use]
    pub fn with_capacity(n: u32) -> Self {
        let len = n as usize;
        let mut values = Vec::with_capacity(len);
        values.resize_with(len, T::fresh);
        Self {
            values,
            generation: alloc::vec![0; len],
            live: alloc::vec![false; len],
            // Reversed so that acquisition hands out slot 0 first.
            free_list: (0..n).rev().collect(),
        }
    }

    /// Takes a slot, reusing a released one when available.
    ///
    /// Reused values are passed through [`Recycle::recycle`]; new slots
    /// start from [`Recycle::fresh`].
    pub fn acquire(&mut self) -> Handle<T> {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.values[idx as usize].recycle();
            self.live[idx as usize] = true;
            idx
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "slot indices are u32; pools stay far below 4G slots"
            )]
            let idx = self.values.len() as u32;
            self.values.push(T::fresh());
            self.generation.push(0);
            self.live.push(true);
            idx
        };
        Handle {
            idx,
            generation: self.generation[idx as usize],
            _marker: PhantomData,
        }
    }

    /// Takes a slot and borrows its value in one step.
    pub fn acquire_mut(&mut self) -> (Handle<T>, &mut T) {
        let handle = self.acquire();
        (handle, &mut self.values[handle.idx as usize])
    }

    /// Takes a slot that is released again when the guard drops.
    pub fn scoped(&mut self) -> PoolGuard<'_, T> {
        let handle = self.acquire();
        PoolGuard { pool: self, handle }
    }
}

impl<T> Pool<T> {
    /// Returns a slot to the pool.
    ///
    /// Returns `false` (and does nothing) if the handle is stale.
    pub fn release(&mut self, handle: Handle<T>) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        let idx = handle.idx as usize;
        self.generation[idx] = self.generation[idx].wrapping_add(1);
        self.live[idx] = false;
        self.free_list.push(handle.idx);
        true
    }

    /// Returns whether `handle` refers to a slot that is currently taken.
    #[must_use]
    pub fn is_live(&self, handle: Handle<T>) -> bool {
        let idx = handle.idx as usize;
        idx < self.values.len() && self.live[idx] && self.generation[idx] == handle.generation
    }

    /// Borrows the value behind a live handle.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if self.is_live(handle) {
            Some(&self.values[handle.idx as usize])
        } else {
            None
        }
    }

    /// Mutably borrows the value behind a live handle.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if self.is_live(handle) {
            Some(&mut self.values[handle.idx as usize])
        } else {
            None
        }
    }

    /// Number of slots currently taken.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.values.len() - self.free_list.len()
    }

    /// Number of slots ever allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }
}

/// A pool slot released on drop.
pub struct PoolGuard<'a, T> {
    pool: &'a mut Pool<T>,
    handle: Handle<T>,
}

impl<T> PoolGuard<'_, T> {
    /// The handle of the guarded slot.
    #[must_use]
    pub fn handle(&self) -> Handle<T> {
        self.handle
    }
}

impl<T> fmt::Debug for PoolGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolGuard")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl<T> Deref for PoolGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.pool.values[self.handle.idx as usize]
    }
}

impl<T> DerefMut for PoolGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.pool.values[self.handle.idx as usize]
    }
}

impl<T> Drop for PoolGuard<'_, T> {
    fn drop(&mut self) {
        self.pool.release(self.handle);
    }
}
