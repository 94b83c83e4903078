use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::{Color, Vec3, check_positive};
use crate::foundation::error::{ViewerError, ViewerResult};

/// Tunables of the shape constructors.
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Radius of the strips created by `add_line`.
    pub line_radius: f32,
    /// Initial width of the strips created by `add_curve`.
    pub curve_line_width: f32,
    /// Floor box extents.
    pub floor_size: [f32; 3],
    /// Floor color.
    pub floor_color: [u8; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            line_radius: 0.1,
            curve_line_width: 0.1,
            floor_size: [200.0, 200.0, 0.5],
            floor_color: [125, 125, 125, 255],
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ViewerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ViewerError::validation(format!("parse viewer config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ViewerError::validation(format!("open viewer config '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject non-positive radii and floor extents.
    pub fn validate(&self) -> ViewerResult<()> {
        check_positive("line_radius", self.line_radius)?;
        check_positive("curve_line_width", self.curve_line_width)?;
        for (axis, v) in ["x", "y", "z"].iter().zip(self.floor_size) {
            check_positive(&format!("floor_size.{axis}"), v)?;
        }
        Ok(())
    }

    pub(crate) fn floor_extents(&self) -> Vec3 {
        Vec3::from_array(self.floor_size)
    }

    pub(crate) fn floor_color(&self) -> Color {
        Color(self.floor_color)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
