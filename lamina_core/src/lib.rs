// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render state tracking for a GPU-batched 2D/3D display list.
//!
//! `lamina_core` holds the state a scene traversal carries while it walks
//! the display tree and feeds a geometry batcher: cumulative alpha, blend
//! mode, render target, clipping, culling, depth options, and the 2-D,
//! 3-D, and projection matrices. It is `no_std` compatible (with `alloc`)
//! and does not talk to a GPU itself; instead it tells the batcher when
//! queued geometry must be submitted because pipeline state is about to
//! change.
//!
//! # Architecture
//!
//! ```text
//!   Traversal
//!       │ push / push_with / pop
//!       ▼
//!   StateStack ──► Pool<RenderState> (saved levels)
//!       │
//!       ▼
//!   RenderState ──► FlushObserver::flush_required(StateDelta)
//!       │                         │
//!       │                         ▼
//!       │                   batcher submits
//!       ▼
//!   mvp_matrix_3d() / alpha / modelview ──► vertex transform
//! ```
//!
//! **[`state`]**: [`RenderState`](state::RenderState) and its value types.
//! Pipeline mutators compare old and new values and notify the observer
//! only on real changes. Projection matrices are stamped with revisions
//! from a shared [`ProjectionEpoch`](state::ProjectionEpoch), so restoring
//! a level skips the matrix copy when nothing changed.
//!
//! **[`stack`]**: [`StateStack`](stack::StateStack), the save/restore stack
//! a traversal drives, with pooled snapshot slots and a scope guard.
//!
//! **[`compose`]**: matrix composition helpers and the perspective
//! projection used for 3-D content.
//!
//! **[`matrix`]**: the column-major 4×4 [`Matrix3d`](matrix::Matrix3d).
//!
//! **[`pool`]**: generational slot pool for reusable values.
//!
//! **[`vertex`]**: vertex attribute formats and layouts.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! stack and flush instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod compose;
pub mod error;
pub mod matrix;
pub mod pool;
pub mod stack;
pub mod state;
pub mod trace;
pub mod vertex;

pub use error::Error;
