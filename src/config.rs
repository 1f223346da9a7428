//! Export configuration (TOML).
//!
//! Loaded once per run and treated as read-only afterwards. Every field has
//! a default, so an empty document is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::coords::{SPATIAL_SCALE, TEXTURE_SCALE};
use crate::error::{ExportError, Result};
use crate::face::SpecialGroups;

/// Full configuration surface for one encode run.
///
/// ```toml
/// palette = "palette.gpl"
/// collision = [100, 100, 45]
/// origin = [0.0, 0.0, 0.0]
/// spatial_scale = 262144.0
/// texture_scale = 65536.0
///
/// [special_groups.gTex78]
/// category = "faceTexturedDedicated"
/// texture_file = 0
/// index = 78
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Palette file to resolve vertex colors against.
    pub palette: Option<PathBuf>,
    /// Output destination; callers fall back to an input-derived path.
    pub output: Option<PathBuf>,
    /// Collision-influence bytes written into the object header. Their exact
    /// in-game meaning is unknown; the third being zero disables collision.
    pub collision: [u8; 3],
    /// Authoring-space coordinates of the synthetic origin vertex.
    pub origin: [f32; 3],
    /// Fixed-point scale for spatial coordinates. Different target consumers
    /// expect different scales, so this is configuration, not a constant.
    pub spatial_scale: f64,
    /// Fixed-point scale for texture coordinates.
    pub texture_scale: f64,
    /// User-declared group-name overrides.
    pub special_groups: SpecialGroups,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            palette: None,
            output: None,
            collision: [100, 100, 45],
            origin: [0.0; 3],
            spatial_scale: SPATIAL_SCALE,
            texture_scale: TEXTURE_SCALE,
            special_groups: SpecialGroups::new(),
        }
    }
}

impl ExportConfig {
    /// Parse a configuration from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ExportError::Config(e.to_string()))
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}
