// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertex attribute descriptors.
//!
//! A [`VertexAttribute`] describes one named field inside an interleaved
//! vertex. Descriptors are built once when a layout is defined and then
//! shared read-only by every buffer using that layout, so they expose
//! getters only.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// Wire format of a single vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Four packed unsigned bytes (typically RGBA).
    Bytes4,
    /// One 32-bit float.
    Float1,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl VertexFormat {
    /// Every format, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Bytes4,
        Self::Float1,
        Self::Float2,
        Self::Float3,
        Self::Float4,
    ];

    /// Accepted names, as listed in [`Error::InvalidFormat`].
    pub const VALID_NAMES: &'static str = "bytes4, float1, float2, float3, float4";

    /// Size of one attribute of this format, in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Bytes4 | Self::Float1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }

    /// The format's canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bytes4 => "bytes4",
            Self::Float1 => "float1",
            Self::Float2 => "float2",
            Self::Float3 => "float3",
            Self::Float4 => "float4",
        }
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VertexFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::InvalidFormat {
                value: s.into(),
                valid: Self::VALID_NAMES,
            })
    }
}

/// One named field of an interleaved vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    name: String,
    format: VertexFormat,
    offset: usize,
    is_color: bool,
}

impl VertexAttribute {
    /// Creates a descriptor from a format name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if `format` is not one of
    /// `bytes4`, `float1`, `float2`, `float3`, `float4`.
    pub fn new(name: impl Into<String>, format: &str, offset: usize) -> Result<Self, Error> {
        Ok(Self::with_format(name, format.parse()?, offset))
    }

    /// Creates a descriptor from an already-typed format.
    #[must_use]
    pub fn with_format(name: impl Into<String>, format: VertexFormat, offset: usize) -> Self {
        let name = name.into();
        let is_color = name.to_ascii_lowercase().contains("color");
        Self {
            name,
            format,
            offset,
            is_color,
        }
    }

    /// The attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wire format.
    #[must_use]
    pub const fn format(&self) -> VertexFormat {
        self.format
    }

    /// Byte offset from the start of the vertex.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Byte size, derived from the format.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.format.size()
    }

    /// Whether the name marks this attribute as a color.
    #[must_use]
    pub const fn is_color(&self) -> bool {
        self.is_color
    }
}

/// An ordered set of attributes making up one interleaved vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: usize,
}

impl VertexLayout {
    /// Creates an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute at the current end of the vertex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for an unknown format name and
    /// [`Error::DuplicateAttribute`] if `name` is already present.
    pub fn push(&mut self, name: &str, format: &str) -> Result<&VertexAttribute, Error> {
        let format = format.parse()?;
        self.push_format(name, format)
    }

    /// Appends an attribute with a typed format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateAttribute`] if `name` is already present.
    pub fn push_format(
        &mut self,
        name: &str,
        format: VertexFormat,
    ) -> Result<&VertexAttribute, Error> {
        if self.get(name).is_some() {
            return Err(Error::DuplicateAttribute(name.into()));
        }
        let attr = VertexAttribute::with_format(name, format, self.stride);
        self.stride += attr.size();
        self.attributes.push(attr);
        Ok(&self.attributes[self.attributes.len() - 1])
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// All attributes in offset order.
    #[must_use]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Total size of one vertex in bytes.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_format_table() {
        let expected = [
            ("bytes4", 4),
            ("float1", 4),
            ("float2", 8),
            ("float3", 12),
            ("float4", 16),
        ];
        for (name, size) in expected {
            let attr = VertexAttribute::new("position", name, 0).unwrap();
            assert_eq!(attr.size(), size, "size of {name}");
            assert_eq!(attr.format().as_str(), name);
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        for bad in ["float5", "Float2", "", "bytes"] {
            let err = VertexAttribute::new("position", bad, 0).unwrap_err();
            assert_eq!(
                err,
                Error::InvalidFormat {
                    value: bad.into(),
                    valid: VertexFormat::VALID_NAMES,
                }
            );
        }
    }

    #[test]
    fn color_detection_ignores_case() {
        let color =
            |name: &str| VertexAttribute::with_format(name, VertexFormat::Bytes4, 0).is_color();
        assert!(color("diffuseColor"));
        assert!(color("COLOR"));
        assert!(color("color"));
        assert!(color("vertexCoLoR2"));
        assert!(!color("colr"));
        assert!(!color("texCoords"));
    }

    #[test]
    fn vertex_color_descriptor() {
        let attr = VertexAttribute::new("vertexColor", "bytes4", 12).unwrap();
        assert_eq!(attr.name(), "vertexColor");
        assert_eq!(attr.offset(), 12);
        assert_eq!(attr.size(), 4);
        assert!(attr.is_color());
    }

    #[test]
    fn layout_offsets_are_running_sums() {
        let mut layout = VertexLayout::new();
        layout.push("position", "float2").unwrap();
        layout.push("color", "bytes4").unwrap();
        layout.push("texCoords", "float2").unwrap();

        assert_eq!(layout.stride(), 20);
        let offsets: Vec<usize> = layout.attributes().iter().map(VertexAttribute::offset).collect();
        assert_eq!(offsets, [0, 8, 12]);
        assert!(layout.get("color").unwrap().is_color());
        assert!(layout.get("normal").is_none());
    }

    #[test]
    fn layout_rejects_duplicates_and_bad_formats() {
        let mut layout = VertexLayout::new();
        layout.push("position", "float2").unwrap();
        assert_eq!(
            layout.push("position", "float3").unwrap_err(),
            Error::DuplicateAttribute("position".into())
        );
        assert!(matches!(
            layout.push("normal", "double3"),
            Err(Error::InvalidFormat { .. })
        ));
        assert_eq!(layout.stride(), 8, "failed pushes leave the layout unchanged");
    }
}
