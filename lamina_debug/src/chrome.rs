// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Recordings carry no clock, so each event gets its sequence number as the
//! timestamp. Saved levels become nested `B`/`E` slices; flushes and
//! projection changes become instant events.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use lamina_core::trace::StackOp;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::Stack(e) => {
                let (ph, level) = match e.op {
                    StackOp::Push => ("B", e.depth),
                    StackOp::Pop => ("E", e.depth.saturating_add(1)),
                };
                events.push(json!({
                    "ph": ph,
                    "name": format!("level {level}"),
                    "cat": "Stack",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                }));
            }
            RecordedEvent::Flush(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Flush",
                    "cat": "Pipeline",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "depth": e.depth,
                        "reason": format!("{:?}", e.reason),
                        "delta": e.delta.names().collect::<Vec<_>>(),
                    }
                }));
            }
            RecordedEvent::Projection(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Projection",
                    "cat": "Pipeline",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "depth": e.depth,
                        "revision": e.revision,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
