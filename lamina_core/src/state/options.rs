// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Culling and depth settings, and the packed option word that holds them.

use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// Which triangle faces are discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Culling {
    /// Draw every triangle.
    #[default]
    None,
    /// Discard front-facing triangles.
    Front,
    /// Discard back-facing triangles.
    Back,
    /// Discard all triangles.
    FrontAndBack,
}

impl Culling {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 4] = [Self::None, Self::Front, Self::Back, Self::FrontAndBack];

    /// The mode's canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Front => "front",
            Self::Back => "back",
            Self::FrontAndBack => "frontAndBack",
        }
    }

    const fn bits(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Front => 1,
            Self::Back => 2,
            Self::FrontAndBack => 3,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits {
            1 => Self::Front,
            2 => Self::Back,
            3 => Self::FrontAndBack,
            _ => Self::None,
        }
    }
}

impl fmt::Display for Culling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Culling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidCulling(s.into()))
    }
}

/// Comparison used for the depth test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DepthTest {
    /// Always pass.
    #[default]
    Always,
    /// Never pass.
    Never,
    /// Pass if the new depth is less.
    Less,
    /// Pass if the new depth is less or equal.
    LessEqual,
    /// Pass if the depths are equal.
    Equal,
    /// Pass if the new depth is greater or equal.
    GreaterEqual,
    /// Pass if the new depth is greater.
    Greater,
    /// Pass if the depths differ.
    NotEqual,
}

impl DepthTest {
    /// Every comparison, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Always,
        Self::Never,
        Self::Less,
        Self::LessEqual,
        Self::Equal,
        Self::GreaterEqual,
        Self::Greater,
        Self::NotEqual,
    ];

    /// The comparison's canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Never => "never",
            Self::Less => "less",
            Self::LessEqual => "lessEqual",
            Self::Equal => "equal",
            Self::GreaterEqual => "greaterEqual",
            Self::Greater => "greater",
            Self::NotEqual => "notEqual",
        }
    }

    const fn bits(self) -> u32 {
        self as u32
    }

    const fn from_bits(bits: u32) -> Self {
        match bits {
            1 => Self::Never,
            2 => Self::Less,
            3 => Self::LessEqual,
            4 => Self::Equal,
            5 => Self::GreaterEqual,
            6 => Self::Greater,
            7 => Self::NotEqual,
            _ => Self::Always,
        }
    }
}

impl fmt::Display for DepthTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepthTest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| Error::InvalidDepthTest(s.into()))
    }
}

/// Highest supported anti-alias level for render targets.
pub const MAX_ANTI_ALIAS: u8 = 16;

// Layout of the packed option word.
const ANTI_ALIAS_MASK: u32 = 0x1f;
const DEPTH_STENCIL_BIT: u32 = 0x20;
const TARGET_MASK: u32 = 0xff;
const CULLING_SHIFT: u32 = 8;
const CULLING_MASK: u32 = 0xf << CULLING_SHIFT;
const DEPTH_MASK_BIT: u32 = 0x1000;
const DEPTH_TEST_SHIFT: u32 = 16;
const DEPTH_TEST_MASK: u32 = 0xf << DEPTH_TEST_SHIFT;
const DEPTH_MASK: u32 = DEPTH_MASK_BIT | DEPTH_TEST_MASK;

/// Render target options, culling, and depth settings packed into one word
/// so that a state copy and most comparisons are single integer operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct MiscOptions(u32);

impl MiscOptions {
    /// Back buffer with depth and stencil, no anti-aliasing, no culling,
    /// depth mask off, `always` depth test.
    pub(crate) const RESET: Self = Self(DEPTH_STENCIL_BIT);

    /// Packs render target options, clamping the anti-alias level.
    pub(crate) fn target_bits(anti_alias: u8, depth_and_stencil: bool) -> u32 {
        let aa = u32::from(anti_alias.min(MAX_ANTI_ALIAS));
        let ds = if depth_and_stencil { DEPTH_STENCIL_BIT } else { 0 };
        aa | ds
    }

    pub(crate) const fn target(self) -> u32 {
        self.0 & TARGET_MASK
    }

    pub(crate) fn set_target(&mut self, bits: u32) {
        self.0 = (self.0 & !TARGET_MASK) | (bits & TARGET_MASK);
    }

    #[expect(clippy::cast_possible_truncation, reason = "masked to five bits")]
    pub(crate) const fn anti_alias(self) -> u8 {
        (self.0 & ANTI_ALIAS_MASK) as u8
    }

    pub(crate) const fn depth_and_stencil(self) -> bool {
        self.0 & DEPTH_STENCIL_BIT != 0
    }

    pub(crate) const fn culling(self) -> Culling {
        Culling::from_bits((self.0 & CULLING_MASK) >> CULLING_SHIFT)
    }

    pub(crate) fn set_culling(&mut self, culling: Culling) {
        self.0 = (self.0 & !CULLING_MASK) | (culling.bits() << CULLING_SHIFT);
    }

    pub(crate) const fn depth_mask(self) -> bool {
        self.0 & DEPTH_MASK_BIT != 0
    }

    pub(crate) fn set_depth_mask(&mut self, enabled: bool) {
        if enabled {
            self.0 |= DEPTH_MASK_BIT;
        } else {
            self.0 &= !DEPTH_MASK_BIT;
        }
    }

    pub(crate) const fn depth_test(self) -> DepthTest {
        DepthTest::from_bits((self.0 & DEPTH_TEST_MASK) >> DEPTH_TEST_SHIFT)
    }

    pub(crate) fn set_depth_test(&mut self, test: DepthTest) {
        self.0 = (self.0 & !DEPTH_TEST_MASK) | (test.bits() << DEPTH_TEST_SHIFT);
    }

    pub(crate) const fn culling_differs(self, other: Self) -> bool {
        self.0 & CULLING_MASK != other.0 & CULLING_MASK
    }

    pub(crate) const fn depth_differs(self, other: Self) -> bool {
        self.0 & DEPTH_MASK != other.0 & DEPTH_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn culling_names_round_trip() {
        for c in Culling::ALL {
            assert_eq!(c.as_str().parse::<Culling>(), Ok(c));
        }
        assert_eq!("frontAndBack".parse::<Culling>(), Ok(Culling::FrontAndBack));
        for bad in ["None", "left", "", "frontAndBack ", "front_and_back"] {
            assert_eq!(
                bad.parse::<Culling>(),
                Err(Error::InvalidCulling(bad.into()))
            );
        }
    }

    #[test]
    fn depth_test_names_round_trip() {
        for d in DepthTest::ALL {
            assert_eq!(d.as_str().parse::<DepthTest>(), Ok(d));
        }
        assert_eq!("lessEqual".parse::<DepthTest>(), Ok(DepthTest::LessEqual));
        assert!("sometimes".parse::<DepthTest>().is_err());
    }

    #[test]
    fn anti_alias_is_clamped() {
        assert_eq!(MiscOptions::target_bits(200, false), 16);
        assert_eq!(MiscOptions::target_bits(4, true), 4 | DEPTH_STENCIL_BIT);
    }

    #[test]
    fn fields_do_not_overlap() {
        let mut m = MiscOptions::default();
        m.set_target(MiscOptions::target_bits(16, true));
        m.set_culling(Culling::FrontAndBack);
        m.set_depth_mask(true);
        m.set_depth_test(DepthTest::NotEqual);

        assert_eq!(m.anti_alias(), 16);
        assert!(m.depth_and_stencil());
        assert_eq!(m.culling(), Culling::FrontAndBack);
        assert!(m.depth_mask());
        assert_eq!(m.depth_test(), DepthTest::NotEqual);

        m.set_target(0);
        m.set_depth_mask(false);
        assert_eq!(m.culling(), Culling::FrontAndBack);
        assert_eq!(m.depth_test(), DepthTest::NotEqual);
        assert_eq!(m.anti_alias(), 0);
        assert!(!m.depth_mask());
    }

    #[test]
    fn reset_word_matches_default_target_arguments() {
        let m = MiscOptions::RESET;
        assert_eq!(m.target(), MiscOptions::target_bits(0, true));
        assert_eq!(m.culling(), Culling::None);
        assert!(!m.depth_mask());
        assert_eq!(m.depth_test(), DepthTest::Always);
    }

    #[test]
    fn comparisons_are_scoped() {
        let a = MiscOptions::default();
        let mut b = a;
        b.set_target(MiscOptions::target_bits(2, true));
        assert!(!a.culling_differs(b));
        assert!(!a.depth_differs(b));
        b.set_culling(Culling::Back);
        assert!(a.culling_differs(b));
        b.set_depth_test(DepthTest::Less);
        assert!(a.depth_differs(b));
    }
}
