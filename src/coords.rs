//! Coordinate conversion from authoring space to target fixed-point.
//!
//! The authoring tool is right-handed with +Z up; the games are left-handed
//! with +Y up, so spatial components are emitted in (X, Z, Y) order. Both
//! spatial and texture coordinates are fixed-point: `round(scale * value)`
//! stored as signed 32-bit.

use crate::error::{ExportError, Result};

/// Default spatial scale (2^18). Chosen so the in-game 16-unit tile side
/// comes out to roughly 16 metres.
pub const SPATIAL_SCALE: f64 = 262_144.0;

/// Default texture coordinate scale (2^16).
pub const TEXTURE_SCALE: f64 = 65_536.0;

/// Convert an authoring-space point to target fixed-point, permuting axes
/// into the target's (X, Z, Y) order.
pub fn to_spatial(point: [f32; 3], scale: f64) -> Result<[i32; 3]> {
    Ok([
        to_fixed(point[0], scale)?,
        to_fixed(point[2], scale)?,
        to_fixed(point[1], scale)?,
    ])
}

/// Convert a UV pair to target fixed-point. No axis permutation.
pub fn to_texture(u: f32, v: f32, scale: f64) -> Result<[i32; 2]> {
    Ok([to_fixed(u, scale)?, to_fixed(v, scale)?])
}

fn to_fixed(value: f32, scale: f64) -> Result<i32> {
    let scaled = (scale * value as f64).round();
    if scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
        return Err(ExportError::Range(format!(
            "scaled coordinate {} exceeds 32 bits",
            scaled
        )));
    }
    Ok(scaled as i32)
}
