// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for the few fallible operations.
//!
//! Every variant is an integration error: an unrecognized name coming from
//! configuration or a save/restore imbalance. None of them is retried.

use alloc::string::String;
use core::fmt;

/// Errors returned by `lamina_core`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The string does not name a [`Culling`](crate::state::Culling) mode.
    InvalidCulling(String),
    /// The string does not name a [`BlendMode`](crate::state::BlendMode).
    InvalidBlendMode(String),
    /// The string does not name a [`DepthTest`](crate::state::DepthTest).
    InvalidDepthTest(String),
    /// The string does not name a [`VertexFormat`](crate::vertex::VertexFormat).
    InvalidFormat {
        /// The rejected value.
        value: String,
        /// Comma-separated list of accepted values.
        valid: &'static str,
    },
    /// A [`VertexLayout`](crate::vertex::VertexLayout) already has an
    /// attribute with this name.
    DuplicateAttribute(String),
    /// [`StateStack::pop`](crate::stack::StateStack::pop) was called with
    /// nothing saved.
    StackUnderflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCulling(v) => write!(f, "invalid culling mode: {v:?}"),
            Self::InvalidBlendMode(v) => write!(f, "invalid blend mode: {v:?}"),
            Self::InvalidDepthTest(v) => write!(f, "invalid depth test: {v:?}"),
            Self::InvalidFormat { value, valid } => {
                write!(f, "invalid vertex format {value:?}, expected one of: {valid}")
            }
            Self::DuplicateAttribute(name) => {
                write!(f, "vertex attribute {name:?} is already defined")
            }
            Self::StackUnderflow => f.write_str("render state stack underflow"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn format_error_lists_choices() {
        let e = Error::InvalidFormat {
            value: "float5".into(),
            valid: "bytes4, float1",
        };
        let msg = e.to_string();
        assert!(msg.contains("\"float5\""), "names the value: {msg}");
        assert!(msg.contains("bytes4, float1"), "lists choices: {msg}");
    }

    #[test]
    fn underflow_message() {
        assert_eq!(
            Error::StackUnderflow.to_string(),
            "render state stack underflow"
        );
    }
}
