// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blend modes and their GPU blend factors.

use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// A GPU blend factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variants are the standard blend factors")]
pub enum BlendFactor {
    Zero,
    One,
    SourceAlpha,
    SourceColor,
    OneMinusSourceAlpha,
    OneMinusSourceColor,
    DestinationAlpha,
    DestinationColor,
    OneMinusDestinationAlpha,
    OneMinusDestinationColor,
}

/// How a drawn object is composited onto the render target.
///
/// Factors assume premultiplied alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Inherit the mode of the parent; never stored as a change.
    Auto,
    /// Overwrite the destination, ignoring alpha.
    None,
    /// Source-over alpha compositing.
    #[default]
    Normal,
    /// Additive blending.
    Add,
    /// Multiply source and destination colors.
    Multiply,
    /// Inverse-multiply: brightens the destination.
    Screen,
    /// Erase the destination where the source is opaque.
    Erase,
    /// Keep the destination only where the source is opaque.
    Mask,
    /// Draw behind the existing destination.
    Below,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Auto,
        Self::None,
        Self::Normal,
        Self::Add,
        Self::Multiply,
        Self::Screen,
        Self::Erase,
        Self::Mask,
        Self::Below,
    ];

    /// The mode's canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
            Self::Normal => "normal",
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Erase => "erase",
            Self::Mask => "mask",
            Self::Below => "below",
        }
    }

    /// Source and destination blend factors, or `None` for
    /// [`Auto`](Self::Auto).
    #[must_use]
    pub const fn factors(self) -> Option<(BlendFactor, BlendFactor)> {
        use BlendFactor::*;
        Some(match self {
            Self::Auto => return None,
            Self::None => (One, Zero),
            Self::Normal => (One, OneMinusSourceAlpha),
            Self::Add => (One, One),
            Self::Multiply => (DestinationColor, OneMinusSourceAlpha),
            Self::Screen => (One, OneMinusSourceColor),
            Self::Erase => (Zero, OneMinusSourceAlpha),
            Self::Mask => (Zero, SourceAlpha),
            Self::Below => (OneMinusDestinationAlpha, DestinationAlpha),
        })
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::InvalidBlendMode(s.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.as_str().parse::<BlendMode>(), Ok(mode));
        }
        assert_eq!(
            "overlay".parse::<BlendMode>(),
            Err(Error::InvalidBlendMode("overlay".into()))
        );
    }

    #[test]
    fn auto_has_no_factors() {
        assert_eq!(BlendMode::Auto.factors(), None);
        assert_eq!(
            BlendMode::Normal.factors(),
            Some((BlendFactor::One, BlendFactor::OneMinusSourceAlpha))
        );
    }
}
