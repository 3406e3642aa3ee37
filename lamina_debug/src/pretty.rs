// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Lines are
//! indented by stack depth, so the output reads like the traversal.

use std::io::Write;

use lamina_core::state::StateDelta;
use lamina_core::trace::{
    FlushEvent, FlushReason, ProjectionEvent, StackEvent, StackOp, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    indent: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            indent: true,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            indent: true,
        }
    }

    /// Turns depth indentation on or off.
    #[must_use]
    pub fn indented(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn pad(&self, depth: u32) -> usize {
        if self.indent { depth as usize * 2 } else { 0 }
    }
}

fn reason_name(reason: FlushReason) -> &'static str {
    match reason {
        FlushReason::Setter => "setter",
        FlushReason::Restore => "restore",
        FlushReason::Reset => "reset",
    }
}

fn delta_names(delta: StateDelta) -> String {
    delta.names().collect::<Vec<_>>().join("|")
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_flush(&mut self, e: &FlushEvent) {
        let pad = self.pad(e.depth);
        let _ = writeln!(
            self.writer,
            "{:pad$}[flush] depth={} reason={} delta={}",
            "",
            e.depth,
            reason_name(e.reason),
            delta_names(e.delta),
        );
    }

    fn on_stack(&mut self, e: &StackEvent) {
        let (tag, pad) = match e.op {
            StackOp::Push => ("push", self.pad(e.depth.saturating_sub(1))),
            StackOp::Pop => ("pop", self.pad(e.depth)),
        };
        let _ = writeln!(self.writer, "{:pad$}[{tag}] depth={}", "", e.depth);
    }

    fn on_projection(&mut self, e: &ProjectionEvent) {
        let pad = self.pad(e.depth);
        let _ = writeln!(
            self.writer,
            "{:pad$}[projection] depth={} revision={}",
            "", e.depth, e.revision,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_flush() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).indented(false);
        sink.on_flush(&FlushEvent {
            depth: 2,
            delta: StateDelta::BLEND | StateDelta::CLIP,
            reason: FlushReason::Restore,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[flush] depth=2 reason=restore delta=BLEND|CLIP\n");
    }

    #[test]
    fn push_and_pop_line_up() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_stack(&StackEvent {
            depth: 2,
            op: StackOp::Push,
        });
        sink.on_stack(&StackEvent {
            depth: 1,
            op: StackOp::Pop,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines, ["  [push] depth=2", "  [pop] depth=1"]);
    }

    #[test]
    fn pretty_print_projection() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_projection(&ProjectionEvent {
            depth: 0,
            revision: 4,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[projection]"), "got: {output}");
        assert!(output.contains("revision=4"), "got: {output}");
    }
}
