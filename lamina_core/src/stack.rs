// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Save/restore stack for scene traversal.
//!
//! [`StateStack`] owns the live [`RenderState`] a traversal mutates, plus
//! pooled snapshots of each ancestor level. Pushing copies the live state
//! into a pooled slot; popping copies it back with
//! [`RenderState::copy_from`], which notifies the flush observer only when
//! pipeline state actually differs. Snapshot slots are recycled across
//! frames, so a steady-state traversal does not allocate.
//!
//! All states of one stack share a [`ProjectionEpoch`], so restoring a
//! level whose projection was never touched skips the matrix copy.
//!
//! [`StateScope`] pops back to its entry depth when dropped, including on
//! early returns.

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use kurbo::Affine;

use crate::compose::CameraPosition;
use crate::error::Error;
use crate::pool::{Handle, Pool};
use crate::state::{BlendMode, ProjectionEpoch, RenderState, StateDelta};
use crate::trace::{FlushEvent, FlushReason, ProjectionEvent, StackEvent, StackOp, Tracer};

/// The live render state plus saved ancestor snapshots.
#[derive(Debug)]
pub struct StateStack {
    current: RenderState,
    saved: Vec<Handle<RenderState>>,
    pool: Pool<RenderState>,
    epoch: ProjectionEpoch,
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStack {
    /// Creates a stack with a default live state and its own epoch.
    #[must_use]
    pub fn new() -> Self {
        let epoch = ProjectionEpoch::new();
        Self {
            current: RenderState::with_epoch(&epoch),
            saved: Vec::new(),
            pool: Pool::new(),
            epoch,
        }
    }

    /// The live state.
    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.current
    }

    /// Mutable access to the live state.
    pub fn state_mut(&mut self) -> &mut RenderState {
        &mut self.current
    }

    /// The revision counter shared by all states of this stack.
    #[must_use]
    pub fn epoch(&self) -> &ProjectionEpoch {
        &self.epoch
    }

    /// Number of saved levels.
    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::try_from(self.saved.len()).unwrap_or(u32::MAX)
    }

    /// Number of snapshot slots allocated so far.
    #[must_use]
    pub fn pooled_capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Saves the live state.
    pub fn push(&mut self, tracer: &mut Tracer<'_>) {
        let (handle, slot) = self.pool.acquire_mut();
        slot.set_epoch(&self.epoch);
        slot.copy_from(&self.current);
        self.saved.push(handle);
        tracer.stack(&StackEvent {
            depth: self.depth(),
            op: StackOp::Push,
        });
    }

    /// Saves the live state, then descends into a child.
    ///
    /// `transform` is prepended to the 2-D modelview, alpha is multiplied
    /// by `alpha_factor`, and `blend_mode` is applied unless it is
    /// [`BlendMode::Auto`]. Returns the pipeline change caused by the blend
    /// mode.
    pub fn push_with(
        &mut self,
        transform: Affine,
        alpha_factor: f32,
        blend_mode: BlendMode,
        tracer: &mut Tracer<'_>,
    ) -> StateDelta {
        self.push(tracer);
        self.current.transform_modelview_matrix(transform);
        self.current.set_alpha(self.current.alpha() * alpha_factor);
        let delta = self.current.set_blend_mode(blend_mode);
        tracer.flush(&FlushEvent {
            depth: self.depth(),
            delta,
            reason: FlushReason::Setter,
        });
        delta
    }

    /// Restores the most recently saved state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackUnderflow`] if nothing is saved.
    pub fn pop(&mut self, tracer: &mut Tracer<'_>) -> Result<StateDelta, Error> {
        let handle = self.saved.pop().ok_or(Error::StackUnderflow)?;
        let delta = match self.pool.get(handle) {
            Some(saved) => self.current.copy_from(saved),
            None => StateDelta::EMPTY,
        };
        self.pool.release(handle);

        let depth = self.depth();
        tracer.flush(&FlushEvent {
            depth,
            delta,
            reason: FlushReason::Restore,
        });
        tracer.stack(&StackEvent {
            depth,
            op: StackOp::Pop,
        });
        Ok(delta)
    }

    /// Pops until at most `depth` levels remain and returns the combined
    /// pipeline change.
    pub fn pop_to(&mut self, depth: u32, tracer: &mut Tracer<'_>) -> StateDelta {
        let mut delta = StateDelta::EMPTY;
        while self.depth() > depth {
            match self.pop(tracer) {
                Ok(d) => delta |= d,
                Err(_) => break,
            }
        }
        delta
    }

    /// Saves the live state and returns a guard that restores it on drop.
    ///
    /// The guard keeps `tracer`, so the restore is traced like a [`pop`](Self::pop).
    pub fn scope<'a, 't>(&'a mut self, tracer: &'a mut Tracer<'t>) -> StateScope<'a, 't> {
        let depth = self.depth();
        self.push(tracer);
        StateScope {
            stack: self,
            tracer,
            depth,
        }
    }

    /// Sets a perspective projection on the live state.
    ///
    /// See [`RenderState::set_projection_matrix`].
    pub fn set_projection_matrix(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stage_width: f64,
        stage_height: f64,
        camera: Option<CameraPosition>,
        tracer: &mut Tracer<'_>,
    ) {
        self.current
            .set_projection_matrix(x, y, width, height, stage_width, stage_height, camera);
        tracer.projection(&ProjectionEvent {
            depth: self.depth(),
            revision: self.current.projection_revision(),
        });
    }

    /// Drops every saved level and resets the live state, keeping its
    /// observer. Call at the start of a frame.
    pub fn reset(&mut self, tracer: &mut Tracer<'_>) -> StateDelta {
        for handle in self.saved.drain(..) {
            self.pool.release(handle);
        }
        let delta = self.current.reset();
        tracer.flush(&FlushEvent {
            depth: 0,
            delta,
            reason: FlushReason::Reset,
        });
        delta
    }
}

/// A saved level that is restored when dropped.
///
/// Derefs to the [`StateStack`] for state access. Use [`nested`](Self::nested)
/// for inner levels and [`parts`](Self::parts) to call traced stack methods.
#[derive(Debug)]
pub struct StateScope<'a, 't> {
    stack: &'a mut StateStack,
    tracer: &'a mut Tracer<'t>,
    depth: u32,
}

impl<'t> StateScope<'_, 't> {
    /// Saves another level that is restored before this one.
    pub fn nested(&mut self) -> StateScope<'_, 't> {
        self.stack.scope(&mut *self.tracer)
    }

    /// The stack and the tracer this scope reports to.
    pub fn parts(&mut self) -> (&mut StateStack, &mut Tracer<'t>) {
        (&mut *self.stack, &mut *self.tracer)
    }
}

impl Deref for StateScope<'_, '_> {
    type Target = StateStack;

    fn deref(&self) -> &StateStack {
        self.stack
    }
}

impl DerefMut for StateScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut StateStack {
        self.stack
    }
}

impl Drop for StateScope<'_, '_> {
    fn drop(&mut self) {
        self.stack.pop_to(self.depth, self.tracer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix3d;
    use crate::state::{Culling, RenderTarget, ResourceKey, TextureId};
    use alloc::rc::Rc;
    use core::cell::Cell;

    fn counting(stack: &mut StateStack) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        stack
            .state_mut()
            .set_flush_observer(move |_: StateDelta| c.set(c.get() + 1));
        count
    }

    #[test]
    fn pop_restores_parent_values() {
        let mut stack = StateStack::new();
        let t = &mut Tracer::none();
        stack.state_mut().set_alpha(0.8);
        stack.push(t);
        stack.state_mut().set_alpha(0.2);
        stack
            .state_mut()
            .transform_modelview_matrix(Affine::translate((4.0, 0.0)));
        stack
            .state_mut()
            .transform_modelview_matrix_3d(&Matrix3d::from_rotation_y(0.5));

        stack.pop(t).unwrap();
        assert_eq!(stack.state().alpha(), 0.8);
        assert_eq!(stack.state().modelview_matrix(), Affine::IDENTITY);
        assert!(!stack.state().is_3d());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn pop_flushes_only_for_pipeline_changes() {
        let mut stack = StateStack::new();
        let count = counting(&mut stack);
        let t = &mut Tracer::none();

        stack.push(t);
        stack.state_mut().set_alpha(0.5);
        assert!(stack.pop(t).unwrap().is_empty());
        assert_eq!(count.get(), 0);

        stack.push(t);
        stack.state_mut().set_culling(Culling::Back);
        assert_eq!(count.get(), 1, "setter flushes");
        assert_eq!(stack.pop(t).unwrap(), StateDelta::CULLING);
        assert_eq!(count.get(), 2, "restore flushes");
        assert_eq!(stack.state().culling(), Culling::None);
    }

    #[test]
    fn underflow_is_an_error() {
        let mut stack = StateStack::new();
        assert_eq!(stack.pop(&mut Tracer::none()), Err(Error::StackUnderflow));
    }

    #[test]
    fn snapshot_slots_are_reused() {
        let mut stack = StateStack::new();
        let t = &mut Tracer::none();
        for _ in 0..10 {
            stack.push(t);
            stack.push(t);
            stack.push(t);
            stack.pop_to(0, t);
        }
        assert_eq!(stack.pooled_capacity(), 3);
    }

    #[test]
    fn push_with_descends() {
        let mut stack = StateStack::new();
        let t = &mut Tracer::none();
        stack.state_mut().set_blend_mode(BlendMode::Add);
        stack.state_mut().set_alpha(0.5);

        let delta = stack.push_with(Affine::translate((1.0, 2.0)), 0.5, BlendMode::Auto, t);
        assert!(delta.is_empty());
        assert_eq!(stack.state().alpha(), 0.25);
        assert_eq!(stack.state().blend_mode(), BlendMode::Add);
        assert_eq!(
            stack.state().modelview_matrix(),
            Affine::translate((1.0, 2.0))
        );

        let delta = stack.push_with(Affine::IDENTITY, 1.0, BlendMode::Multiply, t);
        assert_eq!(delta, StateDelta::BLEND);
        stack.pop_to(0, t);
        assert_eq!(stack.state().blend_mode(), BlendMode::Add);
        assert_eq!(stack.state().alpha(), 0.5);
    }

    #[test]
    fn untouched_projection_keeps_revision() {
        let mut stack = StateStack::new();
        let t = &mut Tracer::none();
        stack.set_projection_matrix(0.0, 0.0, 320.0, 240.0, 0.0, 0.0, None, t);
        let rev = stack.state().projection_revision();
        let projection = *stack.state().projection_matrix_3d();

        stack.push(t);
        stack.pop(t).unwrap();
        assert_eq!(stack.state().projection_revision(), rev);
        assert_eq!(*stack.state().projection_matrix_3d(), projection);
    }

    #[test]
    fn child_projection_is_undone_on_pop() {
        let mut stack = StateStack::new();
        let t = &mut Tracer::none();
        stack.set_projection_matrix(0.0, 0.0, 320.0, 240.0, 0.0, 0.0, None, t);
        let parent = *stack.state().projection_matrix_3d();

        stack.push(t);
        stack.set_projection_matrix(0.0, 0.0, 64.0, 64.0, 0.0, 0.0, None, t);
        assert_ne!(*stack.state().projection_matrix_3d(), parent);
        stack.pop(t).unwrap();
        assert_eq!(*stack.state().projection_matrix_3d(), parent);
    }

    #[test]
    fn render_target_pass_restores_back_buffer() {
        let mut stack = StateStack::new();
        let count = counting(&mut stack);
        let t = &mut Tracer::none();
        stack.push(t);
        stack.state_mut().set_render_target(
            Some(RenderTarget::new(TextureId(1), ResourceKey(9))),
            true,
            0,
        );
        stack.state_mut().set_modelview_matrices_to_identity();
        stack.pop(t).unwrap();
        assert_eq!(stack.state().render_target(), None);
        assert_eq!(count.get(), 2);
    }

    fn draw_child(stack: &mut StateStack, fail: bool) -> Result<(), Error> {
        let mut tracer = Tracer::none();
        let mut scope = stack.scope(&mut tracer);
        scope.state_mut().set_clip_rect(Some(kurbo::Rect::new(0.0, 0.0, 8.0, 8.0)));
        if fail {
            return Err(Error::StackUnderflow);
        }
        let mut inner = scope.nested();
        inner.state_mut().set_alpha(0.1);
        Ok(())
    }

    #[test]
    fn scope_restores_on_every_exit_path() {
        let mut stack = StateStack::new();
        draw_child(&mut stack, false).unwrap();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.state().clip_rect(), None);
        assert_eq!(stack.state().alpha(), 1.0);

        assert!(draw_child(&mut stack, true).is_err());
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.state().clip_rect(), None);
    }

    #[test]
    fn reset_drops_saved_levels() {
        let mut stack = StateStack::new();
        let count = counting(&mut stack);
        let t = &mut Tracer::none();
        stack.push(t);
        stack.state_mut().set_blend_mode(BlendMode::Screen);
        stack.push(t);

        assert_eq!(stack.reset(t), StateDelta::BLEND);
        assert_eq!(stack.depth(), 0);
        assert!(stack.state().has_flush_observer());
        assert_eq!(count.get(), 2);
        assert_eq!(stack.pop(t), Err(Error::StackUnderflow));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn stack_operations_are_traced() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Log {
            flushes: Vec<FlushEvent>,
            stack: Vec<StackEvent>,
        }

        impl TraceSink for Log {
            fn on_flush(&mut self, e: &FlushEvent) {
                self.flushes.push(*e);
            }

            fn on_stack(&mut self, e: &StackEvent) {
                self.stack.push(*e);
            }
        }

        let mut log = Log::default();
        {
            let mut stack = StateStack::new();
            let mut tracer = Tracer::new(&mut log);
            stack.push(&mut tracer);
            stack.state_mut().set_culling(Culling::Front);
            stack.pop(&mut tracer).unwrap();
        }
        assert_eq!(
            log.stack,
            [
                StackEvent {
                    depth: 1,
                    op: StackOp::Push,
                },
                StackEvent {
                    depth: 0,
                    op: StackOp::Pop,
                },
            ]
        );
        assert_eq!(
            log.flushes,
            [FlushEvent {
                depth: 0,
                delta: StateDelta::CULLING,
                reason: FlushReason::Restore,
            }]
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn scope_restores_are_traced() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Ops(Vec<StackEvent>);

        impl TraceSink for Ops {
            fn on_stack(&mut self, e: &StackEvent) {
                self.0.push(*e);
            }
        }

        let mut ops = Ops::default();
        {
            let mut stack = StateStack::new();
            let mut tracer = Tracer::new(&mut ops);
            let mut scope = stack.scope(&mut tracer);
            let mut inner = scope.nested();
            let (stack, tracer) = inner.parts();
            stack.push(tracer);
        }
        let pushes = ops.0.iter().filter(|e| e.op == StackOp::Push).count();
        let pops: Vec<u32> = ops
            .0
            .iter()
            .filter(|e| e.op == StackOp::Pop)
            .map(|e| e.depth)
            .collect();
        assert_eq!(pushes, 3);
        assert_eq!(pops, [2, 1, 0], "every push is matched on scope exit");
    }
}
