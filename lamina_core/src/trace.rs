// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for render-state traversal.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the [`StateStack`](crate::stack::StateStack) calls as it saves, restores,
//! and flushes. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::state::StateDelta;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What caused a flush notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlushReason {
    /// A setter changed pipeline state on the current state.
    Setter,
    /// A restore (`copy_from`) brought back different pipeline state.
    Restore,
    /// The state was reset to defaults.
    Reset,
}

/// Direction of a stack operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackOp {
    /// A state was saved.
    Push,
    /// A state was restored.
    Pop,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when pipeline state changed and pending geometry must be
/// submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushEvent {
    /// Stack depth at which the change happened.
    pub depth: u32,
    /// Categories that changed.
    pub delta: StateDelta,
    /// What caused the change.
    pub reason: FlushReason,
}

/// Emitted on every push and pop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackEvent {
    /// Stack depth after the operation.
    pub depth: u32,
    /// Push or pop.
    pub op: StackOp,
}

/// Emitted when the projection matrix of the current state is replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectionEvent {
    /// Stack depth at which the projection changed.
    pub depth: u32,
    /// The new projection revision.
    pub revision: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from render-state traversal.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when pipeline state changes.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }

    /// Called on push and pop.
    fn on_stack(&mut self, e: &StackEvent) {
        _ = e;
    }

    /// Called when the projection changes.
    fn on_projection(&mut self, e: &ProjectionEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FlushEvent`] if `e.delta` is non-empty.
    #[inline]
    pub fn flush(&mut self, e: &FlushEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink
            && !e.delta.is_empty()
        {
            s.on_flush(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StackEvent`].
    #[inline]
    pub fn stack(&mut self, e: &StackEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_stack(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ProjectionEvent`].
    #[inline]
    pub fn projection(&mut self, e: &ProjectionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_projection(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
