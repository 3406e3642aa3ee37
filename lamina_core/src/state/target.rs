// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render target identity.
//!
//! Several high-level textures can wrap the same GPU resource (for example
//! sub-textures of one atlas). Batch-breaking decisions care about the
//! resource, so [`RenderTarget`] carries both identities and state
//! comparisons use [`RenderTarget::base`].

use core::fmt;

/// An opaque handle to a backend-managed GPU resource.
///
/// Assigned by the texture provider; two targets with the same key render
/// into the same buffer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(pub u64);

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({})", self.0)
    }
}

/// An opaque handle to a high-level texture object.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u64);

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.0)
    }
}

/// A texture used as a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    /// The high-level texture.
    pub texture: TextureId,
    /// The GPU resource the texture renders into.
    pub resource: ResourceKey,
}

impl RenderTarget {
    /// Creates a render target.
    #[inline]
    #[must_use]
    pub const fn new(texture: TextureId, resource: ResourceKey) -> Self {
        Self { texture, resource }
    }

    /// The underlying GPU resource.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> ResourceKey {
        self.resource
    }
}

/// Resource identity of an optional target; `None` is the back buffer.
#[inline]
pub(crate) fn base_of(target: Option<&RenderTarget>) -> Option<ResourceKey> {
    target.map(RenderTarget::base)
}
