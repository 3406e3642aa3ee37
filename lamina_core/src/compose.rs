// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stateless matrix composition helpers.
//!
//! 2-D transforms are [`kurbo::Affine`] values (coefficients `[a, b, c, d,
//! e, f]`, mapping `x' = a·x + c·y + e`, `y' = b·x + d·y + f`). 3-D transforms
//! are [`Matrix3d`]. Everything here is pure; the render state calls these
//! on its own storage.

use kurbo::Affine;

use crate::matrix::Matrix3d;

/// `tan(0.5)`: the default camera sees the stage with a one-radian field of
/// view.
const TAN_HALF_DEFAULT_FOV: f64 = 0.546_302_489_843_790_5;

/// Near plane distance of the perspective projection.
const NEAR: f64 = 1.0;

/// Far plane distance, as a multiple of the focal length.
const FAR_FACTOR: f64 = 20.0;

/// A camera position in stage coordinates.
///
/// `z` is the distance from the stage plane; its magnitude is the focal
/// length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPosition {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Distance from the `z = 0` plane.
    pub z: f64,
}

impl CameraPosition {
    /// Creates a camera position.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The default camera for a stage: centered, with a one-radian field of
    /// view across the stage width.
    #[must_use]
    pub fn centered(stage_width: f64, stage_height: f64) -> Self {
        Self {
            x: stage_width / 2.0,
            y: stage_height / 2.0,
            z: stage_width / TAN_HALF_DEFAULT_FOV * 0.5,
        }
    }
}

/// Prepends `prep` to `base`: `base = base * prep`.
///
/// `prep` is applied to points first, so it describes a transform in the
/// more local coordinate space.
#[inline]
pub fn prepend_affine(base: &mut Affine, prep: Affine) {
    *base = *base * prep;
}

/// Converts a 2-D affine transform into the equivalent 3-D matrix.
///
/// The z axis passes through unchanged.
#[must_use]
pub fn affine_to_3d(m: Affine) -> Matrix3d {
    let [a, b, c, d, e, f] = m.as_coeffs();
    Matrix3d::from_cols(
        [a, b, 0.0, 0.0],
        [c, d, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [e, f, 0.0, 1.0],
    )
}

/// Builds a perspective projection for the viewport `[x, y, x + width,
/// y + height]`.
///
/// Geometry on the `z = 0` plane inside the viewport maps onto normalized
/// device coordinates `[-1, 1]` without distortion, with y pointing down in
/// stage space and up in NDC. The camera controls the field of view and
/// the viewing angle for geometry off that plane.
///
/// A non-positive `stage_width` or `stage_height` falls back to `width` or
/// `height`. With no camera, [`CameraPosition::centered`] is used.
#[must_use]
pub fn perspective_projection(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    stage_width: f64,
    stage_height: f64,
    camera: Option<CameraPosition>,
) -> Matrix3d {
    let stage_width = if stage_width <= 0.0 { width } else { stage_width };
    let stage_height = if stage_height <= 0.0 {
        height
    } else {
        stage_height
    };
    let camera = camera.unwrap_or_else(|| CameraPosition::centered(stage_width, stage_height));

    let focal_length = camera.z.abs();
    let offset_x = camera.x - stage_width / 2.0;
    let offset_y = camera.y - stage_height / 2.0;
    let far = focal_length * FAR_FACTOR;
    let scale_x = stage_width / width;
    let scale_y = stage_height / height;

    let mut m = Matrix3d::ZERO;
    // General perspective, y flipped.
    m.cols[0][0] = 2.0 * focal_length / stage_width * scale_x;
    m.cols[1][1] = -2.0 * focal_length / stage_height * scale_y;
    m.cols[2][2] = far / (far - NEAR);
    m.cols[3][2] = -far * NEAR / (far - NEAR);
    m.cols[2][3] = 1.0;
    // Zoom into the visible area.
    m.cols[2][0] = scale_x - 1.0 - 2.0 * scale_x * (x - offset_x) / stage_width;
    m.cols[2][1] = -scale_y + 1.0 + 2.0 * scale_y * (y - offset_y) / stage_height;

    m.prepend_translation(
        -stage_width / 2.0 - offset_x,
        -stage_height / 2.0 - offset_y,
        focal_length,
    );
    m
}
