// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render state data model.
//!
//! A [`RenderState`] holds everything that decides how and where the next
//! geometry is drawn:
//!
//! - **Pipeline state**: [`BlendMode`], [`RenderTarget`] and its options,
//!   [`Culling`], depth mask and [`DepthTest`], and the clip rectangle.
//!   Changing any of these breaks the current batch, so the state notifies
//!   its [`FlushObserver`] first and reports the change as a
//!   [`StateDelta`].
//! - **Per-vertex state**: cumulative alpha and the modelview matrices,
//!   which the batcher applies to vertices and which never break a batch.
//! - **Projection**: a 4×4 matrix stamped with a revision from a
//!   [`ProjectionEpoch`], so that save/restore can skip copying it.
//!
//! # Flushing
//!
//! Notifications fire synchronously inside the mutator, before the new
//! value is stored. Callers that prefer to drive flushing themselves can
//! leave the observer unset and act on the returned [`StateDelta`].

mod blend;
mod delta;
mod epoch;
mod options;
mod render_state;
mod target;

pub use blend::{BlendFactor, BlendMode};
pub use delta::{FlushObserver, StateDelta};
pub use epoch::ProjectionEpoch;
pub use options::{Culling, DepthTest, MAX_ANTI_ALIAS};
pub use render_state::RenderState;
pub use target::{RenderTarget, ResourceKey, TextureId};
