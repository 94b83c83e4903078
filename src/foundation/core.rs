use crate::foundation::error::{ViewerError, ViewerResult};

pub use glam::Vec3;

/// Straight-alpha RGBA8 color, as handed to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// Build a color from its four channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Validate a dynamically sized channel list (exactly 4 values in `0..=255`).
    pub fn from_slice(channels: &[f64]) -> ViewerResult<Self> {
        let [r, g, b, a] = channels else {
            return Err(ViewerError::validation(format!(
                "RGBA color must have 4 components, got {}",
                channels.len()
            )));
        };
        let mut out = [0u8; 4];
        for (dst, &v) in out.iter_mut().zip([r, g, b, a]) {
            if !v.is_finite() || !(0.0..=255.0).contains(&v) {
                return Err(ViewerError::validation(format!(
                    "RGBA component {v} is outside [0, 255]"
                )));
            }
            *dst = v.round() as u8;
        }
        Ok(Self(out))
    }
}

impl From<[u8; 4]> for Color {
    fn from(v: [u8; 4]) -> Self {
        Self(v)
    }
}

impl From<(u8, u8, u8, u8)> for Color {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self([r, g, b, a])
    }
}

pub(crate) fn check_finite(what: &str, v: f32) -> ViewerResult<f32> {
    if !v.is_finite() {
        return Err(ViewerError::validation(format!("{what} must be finite, got {v}")));
    }
    Ok(v)
}

pub(crate) fn check_positive(what: &str, v: f32) -> ViewerResult<f32> {
    check_finite(what, v)?;
    if v <= 0.0 {
        return Err(ViewerError::validation(format!("{what} must be > 0, got {v}")));
    }
    Ok(v)
}

pub(crate) fn check_point(what: &str, p: Vec3) -> ViewerResult<Vec3> {
    if !p.is_finite() {
        return Err(ViewerError::validation(format!(
            "{what} must have finite coordinates, got {p}"
        )));
    }
    Ok(p)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
