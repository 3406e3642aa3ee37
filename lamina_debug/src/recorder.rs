// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use lamina_core::state::StateDelta;
use lamina_core::trace::{
    FlushEvent, FlushReason, ProjectionEvent, StackEvent, StackOp, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FLUSH: u8 = 1;
const TAG_STACK: u8 = 2;
const TAG_PROJECTION: u8 = 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_reason(&mut self, r: FlushReason) {
        self.write_u8(match r {
            FlushReason::Setter => 0,
            FlushReason::Restore => 1,
            FlushReason::Reset => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_flush(&mut self, e: &FlushEvent) {
        self.write_u8(TAG_FLUSH);
        self.write_u32(e.depth);
        self.write_u8(e.delta.bits());
        self.write_reason(e.reason);
    }

    fn on_stack(&mut self, e: &StackEvent) {
        self.write_u8(TAG_STACK);
        self.write_u32(e.depth);
        self.write_u8(match e.op {
            StackOp::Push => 0,
            StackOp::Pop => 1,
        });
    }

    fn on_projection(&mut self, e: &ProjectionEvent) {
        self.write_u8(TAG_PROJECTION);
        self.write_u32(e.depth);
        self.write_u64(e.revision);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`FlushEvent`].
    Flush(FlushEvent),
    /// A [`StackEvent`].
    Stack(StackEvent),
    /// A [`ProjectionEvent`].
    Projection(ProjectionEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_reason(&mut self) -> Option<FlushReason> {
        Some(match self.read_u8()? {
            0 => FlushReason::Setter,
            1 => FlushReason::Restore,
            _ => FlushReason::Reset,
        })
    }

    fn decode_flush(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Flush(FlushEvent {
            depth: self.read_u32()?,
            delta: StateDelta::from_bits_truncate(self.read_u8()?),
            reason: self.read_reason()?,
        }))
    }

    fn decode_stack(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Stack(StackEvent {
            depth: self.read_u32()?,
            op: if self.read_u8()? == 0 {
                StackOp::Push
            } else {
                StackOp::Pop
            },
        }))
    }

    fn decode_projection(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Projection(ProjectionEvent {
            depth: self.read_u32()?,
            revision: self.read_u64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FLUSH => self.decode_flush(),
            TAG_STACK => self.decode_stack(),
            TAG_PROJECTION => self.decode_projection(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::stack::StateStack;
    use lamina_core::state::{BlendMode, Culling};
    use lamina_core::trace::Tracer;

    #[test]
    fn records_a_traversal() {
        let mut rec = RecorderSink::new();
        {
            let mut stack = StateStack::new();
            let mut tracer = Tracer::new(&mut rec);
            stack.set_projection_matrix(0.0, 0.0, 320.0, 240.0, 0.0, 0.0, None, &mut tracer);
            stack.push(&mut tracer);
            stack.state_mut().set_culling(Culling::Back);
            stack.pop(&mut tracer).unwrap();
        }

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[0],
            RecordedEvent::Projection(ProjectionEvent { depth: 0, .. })
        ));
        assert_eq!(
            events[1],
            RecordedEvent::Stack(StackEvent {
                depth: 1,
                op: StackOp::Push,
            })
        );
        assert_eq!(
            events[2],
            RecordedEvent::Flush(FlushEvent {
                depth: 0,
                delta: StateDelta::CULLING,
                reason: FlushReason::Restore,
            })
        );
        assert_eq!(
            events[3],
            RecordedEvent::Stack(StackEvent {
                depth: 0,
                op: StackOp::Pop,
            })
        );
    }

    #[test]
    fn setter_flush_keeps_every_category() {
        let mut rec = RecorderSink::new();
        rec.on_flush(&FlushEvent {
            depth: 3,
            delta: StateDelta::BLEND | StateDelta::TARGET | StateDelta::DEPTH,
            reason: FlushReason::Setter,
        });
        match decode(rec.as_bytes()).next() {
            Some(RecordedEvent::Flush(e)) => {
                assert_eq!(e.depth, 3);
                assert!(e.delta.contains(StateDelta::TARGET | StateDelta::DEPTH));
                assert!(!e.delta.contains(StateDelta::CLIP));
                assert_eq!(e.reason, FlushReason::Setter);
            }
            other => panic!("expected Flush, got {other:?}"),
        }
    }

    #[test]
    fn push_with_records_blend_change() {
        let mut rec = RecorderSink::new();
        {
            let mut stack = StateStack::new();
            let mut tracer = Tracer::new(&mut rec);
            stack.push_with(
                kurbo::Affine::IDENTITY,
                1.0,
                BlendMode::Add,
                &mut tracer,
            );
        }
        let flushes: Vec<_> = decode(rec.as_bytes())
            .filter_map(|e| match e {
                RecordedEvent::Flush(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(flushes.len(), 1);
        assert_eq!(flushes[0].delta, StateDelta::BLEND);
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_projection(&ProjectionEvent {
            depth: 0,
            revision: 9,
        });
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
