// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutable render state aggregate.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Affine, Rect};

use super::blend::BlendMode;
use super::delta::{FlushObserver, StateDelta};
use super::epoch::ProjectionEpoch;
use super::options::{Culling, DepthTest, MiscOptions};
use super::target::{RenderTarget, ResourceKey, base_of};
use crate::compose::{self, CameraPosition};
use crate::error::Error;
use crate::matrix::Matrix3d;
use crate::pool::Recycle;

/// Drawing configuration in effect at one point of a scene traversal.
///
/// A traversal keeps one live state per depth level (see
/// [`StateStack`](crate::stack::StateStack)), mutates it on the way down,
/// and restores the parent's copy on the way up with
/// [`copy_from`](Self::copy_from).
///
/// Mutators that touch GPU pipeline state (blend mode, render target,
/// clip rectangle, culling, depth) notify the registered
/// [`FlushObserver`] *before* committing and return the [`StateDelta`] they
/// applied. Alpha and the matrices never notify: alpha is baked into
/// vertex colors and matrices are applied to vertices on the CPU side.
///
/// # Transform model
///
/// Transforms start on a 2-D fast path: [`modelview_matrix`] is a
/// [`kurbo::Affine`] and [`modelview_matrix_3d`] is `None`. The first call
/// to [`transform_modelview_matrix_3d`] moves the accumulated 2-D transform
/// into a 3-D matrix. From then until the next [`reset`](Self::reset) the
/// state reports [`is_3d`](Self::is_3d), even if the 3-D matrix later
/// returns to identity.
///
/// [`modelview_matrix`]: Self::modelview_matrix
/// [`modelview_matrix_3d`]: Self::modelview_matrix_3d
/// [`transform_modelview_matrix_3d`]: Self::transform_modelview_matrix_3d
pub struct RenderState {
    alpha: f32,
    blend_mode: BlendMode,
    render_target: Option<RenderTarget>,
    misc: MiscOptions,
    clip_rect: Option<Rect>,
    modelview_matrix: Affine,
    modelview_matrix_3d: Option<Matrix3d>,
    projection_matrix_3d: Matrix3d,
    projection_revision: u64,
    epoch: ProjectionEpoch,
    observer: Option<Box<dyn FlushObserver>>,
}

impl fmt::Debug for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderState")
            .field("alpha", &self.alpha)
            .field("blend_mode", &self.blend_mode)
            .field("render_target", &self.render_target)
            .field("culling", &self.misc.culling())
            .field("clip_rect", &self.clip_rect)
            .field("modelview_matrix", &self.modelview_matrix)
            .field("modelview_matrix_3d", &self.modelview_matrix_3d)
            .field("projection_revision", &self.projection_revision)
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderState {
    /// Creates a state in its reset configuration with a private
    /// [`ProjectionEpoch`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_epoch(&ProjectionEpoch::new())
    }

    /// Creates a state in its reset configuration that stamps projection
    /// revisions from `epoch`.
    #[must_use]
    pub fn with_epoch(epoch: &ProjectionEpoch) -> Self {
        Self {
            alpha: 1.0,
            blend_mode: BlendMode::Normal,
            render_target: None,
            misc: MiscOptions::RESET,
            clip_rect: None,
            modelview_matrix: Affine::IDENTITY,
            modelview_matrix_3d: None,
            projection_matrix_3d: Matrix3d::IDENTITY,
            projection_revision: 0,
            epoch: epoch.clone(),
            observer: None,
        }
    }

    // -- Observer --

    /// Registers the observer notified before pipeline changes, replacing
    /// any previous one.
    pub fn set_flush_observer(&mut self, observer: impl FlushObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Removes and returns the registered observer.
    pub fn take_flush_observer(&mut self) -> Option<Box<dyn FlushObserver>> {
        self.observer.take()
    }

    /// Returns whether an observer is registered.
    #[must_use]
    pub fn has_flush_observer(&self) -> bool {
        self.observer.is_some()
    }

    fn notify(&mut self, delta: StateDelta) {
        if delta.is_empty() {
            return;
        }
        if let Some(observer) = &mut self.observer {
            observer.flush_required(delta);
        }
    }

    // -- Epoch --

    /// The revision counter this state stamps projections from.
    #[must_use]
    pub fn epoch(&self) -> &ProjectionEpoch {
        &self.epoch
    }

    /// Moves this state onto another revision counter.
    ///
    /// The current projection is kept and re-stamped from `epoch`, so
    /// later copies between states of that epoch stay exact.
    pub fn set_epoch(&mut self, epoch: &ProjectionEpoch) {
        if self.epoch.same_as(epoch) {
            return;
        }
        self.epoch = epoch.clone();
        if self.projection_revision != 0 {
            self.projection_revision = self.epoch.advance();
        }
    }

    // -- Save / restore --

    /// Returns the pipeline categories in which `self` and `other` differ.
    ///
    /// Render targets are compared by [`ResourceKey`], clip rectangles by
    /// value. Every check is a field comparison.
    #[must_use]
    pub fn pipeline_delta(&self, other: &Self) -> StateDelta {
        let target_changed =
            base_of(self.render_target.as_ref()) != base_of(other.render_target.as_ref());
        StateDelta::when(self.blend_mode != other.blend_mode, StateDelta::BLEND)
            | StateDelta::when(target_changed, StateDelta::TARGET)
            | StateDelta::when(self.clip_rect != other.clip_rect, StateDelta::CLIP)
            | StateDelta::when(self.misc.culling_differs(other.misc), StateDelta::CULLING)
            | StateDelta::when(self.misc.depth_differs(other.misc), StateDelta::DEPTH)
    }

    /// Overwrites every field with `source`'s, except the observer and the
    /// epoch.
    ///
    /// If the pipeline state differs, the observer is notified before
    /// anything is written. The projection matrix is only copied when the
    /// revision stamps say it may differ.
    pub fn copy_from(&mut self, source: &Self) -> StateDelta {
        let delta = self.pipeline_delta(source);
        self.notify(delta);

        self.alpha = source.alpha;
        self.blend_mode = source.blend_mode;
        self.render_target = source.render_target;
        self.misc = source.misc;
        self.modelview_matrix = source.modelview_matrix;

        if !self.epoch.same_as(&source.epoch) {
            // Stamps from another counter mean nothing here.
            self.projection_matrix_3d = source.projection_matrix_3d;
            self.projection_revision = if source.projection_revision == 0 {
                0
            } else {
                self.epoch.advance()
            };
        } else if self.projection_revision != source.projection_revision {
            self.projection_matrix_3d = source.projection_matrix_3d;
            self.projection_revision = source.projection_revision;
        }

        self.modelview_matrix_3d = source.modelview_matrix_3d;
        self.clip_rect = source.clip_rect;
        delta
    }

    /// Restores the reset configuration in place.
    ///
    /// Alpha 1, normal blending, no culling, depth mask off with an
    /// `always` test, back buffer target with depth and stencil and no
    /// anti-aliasing, no clip, identity 2-D modelview,
    /// no 3-D modelview, identity projection at revision 0. The observer is
    /// notified once if any pipeline category changes.
    pub fn reset(&mut self) -> StateDelta {
        let misc = self.misc;
        let delta = StateDelta::when(self.blend_mode != BlendMode::Normal, StateDelta::BLEND)
            | StateDelta::when(
                self.render_target.is_some() || misc.target() != MiscOptions::RESET.target(),
                StateDelta::TARGET,
            )
            | StateDelta::when(self.clip_rect.is_some(), StateDelta::CLIP)
            | StateDelta::when(misc.culling() != Culling::None, StateDelta::CULLING)
            | StateDelta::when(
                misc.depth_mask() || misc.depth_test() != DepthTest::Always,
                StateDelta::DEPTH,
            );
        self.notify(delta);

        self.alpha = 1.0;
        self.blend_mode = BlendMode::Normal;
        self.render_target = None;
        self.misc = MiscOptions::RESET;
        self.clip_rect = None;
        self.modelview_matrix = Affine::IDENTITY;
        self.modelview_matrix_3d = None;
        self.projection_matrix_3d.set_identity();
        self.projection_revision = 0;
        delta
    }

    // -- Transforms --

    /// Prepends `matrix` to the 2-D modelview matrix.
    ///
    /// `matrix` is applied to points first: it is the local transform of
    /// the child being descended into.
    pub fn transform_modelview_matrix(&mut self, matrix: Affine) {
        compose::prepend_affine(&mut self.modelview_matrix, matrix);
    }

    /// Prepends a 3-D `matrix`, switching the state to 3-D mode.
    ///
    /// The accumulated 2-D transform is folded into the 3-D modelview
    /// (created as identity if absent) ahead of `matrix`, and the 2-D
    /// modelview becomes identity so it is not applied twice.
    pub fn transform_modelview_matrix_3d(&mut self, matrix: &Matrix3d) {
        let mv3 = self.modelview_matrix_3d.get_or_insert(Matrix3d::IDENTITY);
        mv3.prepend(&compose::affine_to_3d(self.modelview_matrix));
        mv3.prepend(matrix);
        self.modelview_matrix = Affine::IDENTITY;
    }

    /// Sets the 2-D modelview and, if present, the 3-D modelview to
    /// identity. Leaves [`is_3d`](Self::is_3d) unchanged.
    pub fn set_modelview_matrices_to_identity(&mut self) {
        self.modelview_matrix = Affine::IDENTITY;
        if let Some(mv3) = &mut self.modelview_matrix_3d {
            mv3.set_identity();
        }
    }

    /// Replaces the 2-D modelview matrix.
    pub fn set_modelview_matrix(&mut self, matrix: Affine) {
        self.modelview_matrix = matrix;
    }

    /// Mutable access to the 2-D modelview matrix.
    pub fn modelview_matrix_mut(&mut self) -> &mut Affine {
        &mut self.modelview_matrix
    }

    /// Installs or removes the 3-D modelview matrix.
    pub fn set_modelview_matrix_3d(&mut self, matrix: Option<Matrix3d>) {
        self.modelview_matrix_3d = matrix;
    }

    // -- Projection --

    /// Sets a perspective projection for the viewport `[x, y, x + width,
    /// y + height]`.
    ///
    /// See [`compose::perspective_projection`] for the meaning of the
    /// stage size and camera. Stamps a new projection revision.
    pub fn set_projection_matrix(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stage_width: f64,
        stage_height: f64,
        camera: Option<CameraPosition>,
    ) {
        self.projection_matrix_3d = compose::perspective_projection(
            x,
            y,
            width,
            height,
            stage_width,
            stage_height,
            camera,
        );
        self.set_projection_matrix_changed();
    }

    /// Replaces the projection matrix and stamps a new revision.
    pub fn set_projection_matrix_3d(&mut self, matrix: &Matrix3d) {
        self.projection_matrix_3d = *matrix;
        self.set_projection_matrix_changed();
    }

    /// Mutable access to the projection matrix.
    ///
    /// Call [`set_projection_matrix_changed`](Self::set_projection_matrix_changed)
    /// after editing, or copies of this state may keep a stale projection.
    pub fn projection_matrix_3d_mut(&mut self) -> &mut Matrix3d {
        &mut self.projection_matrix_3d
    }

    /// Stamps a new projection revision after an in-place edit.
    pub fn set_projection_matrix_changed(&mut self) {
        self.projection_revision = self.epoch.advance();
    }

    /// Computes the model-view-projection matrix.
    ///
    /// `projection * modelview_3d * modelview_2d`, recomputed on every call
    /// from the current fields.
    #[must_use]
    pub fn mvp_matrix_3d(&self) -> Matrix3d {
        let mut mvp = self.projection_matrix_3d;
        if let Some(mv3) = &self.modelview_matrix_3d {
            mvp.prepend(mv3);
        }
        mvp.prepend(&compose::affine_to_3d(self.modelview_matrix));
        mvp
    }

    // -- Pipeline mutators --

    /// Sets the cumulative alpha. Never notifies.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    /// Sets the blend mode. [`BlendMode::Auto`] is ignored.
    pub fn set_blend_mode(&mut self, mode: BlendMode) -> StateDelta {
        if mode == BlendMode::Auto || mode == self.blend_mode {
            return StateDelta::EMPTY;
        }
        self.notify(StateDelta::BLEND);
        self.blend_mode = mode;
        StateDelta::BLEND
    }

    /// Sets the blend mode by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlendMode`] for an unknown name; the state is
    /// left untouched.
    pub fn set_blend_mode_name(&mut self, name: &str) -> Result<StateDelta, Error> {
        Ok(self.set_blend_mode(name.parse()?))
    }

    /// Sets the render target and its options.
    ///
    /// The usual arguments for a new target are `true, 0`. Targets are
    /// compared by [`RenderTarget::base`]; if neither the resource nor the
    /// packed options change this is a no-op, and the previously stored
    /// [`RenderTarget`] is kept.
    pub fn set_render_target(
        &mut self,
        target: Option<RenderTarget>,
        enable_depth_and_stencil: bool,
        anti_alias: u8,
    ) -> StateDelta {
        let bits = MiscOptions::target_bits(anti_alias, enable_depth_and_stencil);
        let same_base = base_of(self.render_target.as_ref()) == base_of(target.as_ref());
        if same_base && bits == self.misc.target() {
            return StateDelta::EMPTY;
        }
        self.notify(StateDelta::TARGET);
        self.render_target = target;
        self.misc.set_target(bits);
        StateDelta::TARGET
    }

    /// Sets the culling mode.
    pub fn set_culling(&mut self, culling: Culling) -> StateDelta {
        if culling == self.misc.culling() {
            return StateDelta::EMPTY;
        }
        self.notify(StateDelta::CULLING);
        self.misc.set_culling(culling);
        StateDelta::CULLING
    }

    /// Sets the culling mode by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCulling`] unless `name` is one of `none`,
    /// `front`, `back`, `frontAndBack`; the state is left untouched.
    pub fn set_culling_name(&mut self, name: &str) -> Result<StateDelta, Error> {
        Ok(self.set_culling(name.parse()?))
    }

    /// Enables or disables depth writes.
    pub fn set_depth_mask(&mut self, enabled: bool) -> StateDelta {
        if enabled == self.misc.depth_mask() {
            return StateDelta::EMPTY;
        }
        self.notify(StateDelta::DEPTH);
        self.misc.set_depth_mask(enabled);
        StateDelta::DEPTH
    }

    /// Sets the depth comparison.
    pub fn set_depth_test(&mut self, test: DepthTest) -> StateDelta {
        if test == self.misc.depth_test() {
            return StateDelta::EMPTY;
        }
        self.notify(StateDelta::DEPTH);
        self.misc.set_depth_test(test);
        StateDelta::DEPTH
    }

    /// Sets or clears the stage-space clip rectangle.
    pub fn set_clip_rect(&mut self, rect: Option<Rect>) -> StateDelta {
        if rect == self.clip_rect {
            return StateDelta::EMPTY;
        }
        self.notify(StateDelta::CLIP);
        self.clip_rect = rect;
        StateDelta::CLIP
    }

    // -- Readers --

    /// Cumulative opacity.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Current blend mode; never [`BlendMode::Auto`].
    #[must_use]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Current render target; `None` is the back buffer.
    #[must_use]
    pub fn render_target(&self) -> Option<RenderTarget> {
        self.render_target
    }

    /// GPU resource of the current render target.
    #[must_use]
    pub fn render_target_base(&self) -> Option<ResourceKey> {
        base_of(self.render_target.as_ref())
    }

    /// Anti-alias level of the current render target, in `0..=16`.
    #[must_use]
    pub fn render_target_anti_alias(&self) -> u8 {
        self.misc.anti_alias()
    }

    /// Whether the current render target has depth and stencil buffers.
    #[must_use]
    pub fn render_target_supports_depth_and_stencil(&self) -> bool {
        self.misc.depth_and_stencil()
    }

    /// Current culling mode.
    #[must_use]
    pub fn culling(&self) -> Culling {
        self.misc.culling()
    }

    /// Whether depth writes are enabled.
    #[must_use]
    pub fn depth_mask(&self) -> bool {
        self.misc.depth_mask()
    }

    /// Current depth comparison.
    #[must_use]
    pub fn depth_test(&self) -> DepthTest {
        self.misc.depth_test()
    }

    /// Current clip rectangle in stage coordinates.
    #[must_use]
    pub fn clip_rect(&self) -> Option<Rect> {
        self.clip_rect
    }

    /// The 2-D modelview matrix.
    #[must_use]
    pub fn modelview_matrix(&self) -> Affine {
        self.modelview_matrix
    }

    /// The 3-D modelview matrix, if the state has gone 3-D.
    #[must_use]
    pub fn modelview_matrix_3d(&self) -> Option<&Matrix3d> {
        self.modelview_matrix_3d.as_ref()
    }

    /// The projection matrix.
    #[must_use]
    pub fn projection_matrix_3d(&self) -> &Matrix3d {
        &self.projection_matrix_3d
    }

    /// Revision stamp of the projection matrix.
    #[must_use]
    pub fn projection_revision(&self) -> u64 {
        self.projection_revision
    }

    /// Whether a 3-D transform has been applied since the last reset.
    #[must_use]
    pub fn is_3d(&self) -> bool {
        self.modelview_matrix_3d.is_some()
    }
}

/// Pooled states come back reset and without an observer.
impl Recycle for RenderState {
    fn fresh() -> Self {
        Self::new()
    }

    fn recycle(&mut self) {
        self.observer = None;
        self.reset();
    }
}
