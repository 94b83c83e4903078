//! Renderable payloads handed to the backend.
//!
//! Each variant mirrors one backend archetype. Constructors validate their numeric inputs; the
//! scene graph treats the result as opaque.

use std::fmt;
use std::path::PathBuf;

use crate::foundation::core::{Color, Vec3, check_finite, check_point, check_positive};
use crate::foundation::error::{ViewerError, ViewerResult};

/// Box fill mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Filled faces.
    #[default]
    Solid,
    /// Edges only.
    Wireframe,
}

/// Renderable payload of an entity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "archetype")]
pub enum Shape {
    /// A single arrow starting at the origin.
    #[serde(rename = "arrows3d")]
    Arrows3D {
        /// Arrow vector.
        vector: Vec3,
        /// Shaft radius.
        radius: f32,
        /// Arrow color.
        color: Color,
        /// Text label.
        label: String,
    },
    /// A single axis-aligned box centred on the origin.
    #[serde(rename = "boxes3d")]
    Boxes3D {
        /// Full extents along x, y, z.
        size: Vec3,
        /// Box color.
        color: Color,
        /// Fill mode.
        fill_mode: FillMode,
        /// Optional text label.
        label: Option<String>,
    },
    /// A single capsule along the z axis.
    #[serde(rename = "capsules3d")]
    Capsules3D {
        /// Length of the cylindrical part.
        length: f32,
        /// Radius.
        radius: f32,
        /// Capsule color.
        color: Color,
    },
    /// A single poly-line (lines and curves).
    #[serde(rename = "line_strips3d")]
    LineStrips3D {
        /// Vertices, in order.
        points: Vec<Vec3>,
        /// Line radius.
        radius: f32,
        /// One color for the whole strip, or one per vertex.
        colors: Vec<Color>,
        /// Optional text label.
        label: Option<String>,
    },
    /// Triangle mesh.
    #[serde(rename = "mesh3d")]
    Mesh3D {
        /// Vertex positions.
        vertex_positions: Vec<Vec3>,
        /// Triangles; empty means the vertices form a single triangle list.
        triangle_indices: Vec<[u32; 3]>,
        /// Vertex colors.
        vertex_colors: Vec<Color>,
    },
    /// Mesh loaded by the backend from a file.
    #[serde(rename = "mesh_from_path")]
    MeshFromPath {
        /// Mesh file on disk.
        path: PathBuf,
    },
    /// Points with a radius (spheres).
    #[serde(rename = "points3d")]
    Points3D {
        /// Point positions.
        positions: Vec<Vec3>,
        /// Point radius.
        radius: f32,
        /// Point color.
        color: Color,
        /// Text label.
        label: String,
    },
}

/// Archetype of a [`Shape`], without its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// [`Shape::Arrows3D`].
    Arrows3D,
    /// [`Shape::Boxes3D`].
    Boxes3D,
    /// [`Shape::Capsules3D`].
    Capsules3D,
    /// [`Shape::LineStrips3D`].
    LineStrips3D,
    /// [`Shape::Mesh3D`].
    Mesh3D,
    /// [`Shape::MeshFromPath`].
    MeshFromPath,
    /// [`Shape::Points3D`].
    Points3D,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Arrows3D => "Arrows3D",
            Self::Boxes3D => "Boxes3D",
            Self::Capsules3D => "Capsules3D",
            Self::LineStrips3D => "LineStrips3D",
            Self::Mesh3D => "Mesh3D",
            Self::MeshFromPath => "MeshFromPath",
            Self::Points3D => "Points3D",
        };
        f.write_str(s)
    }
}

/// Triangulation of a four-vertex face.
const SQUARE_FACE_TRIANGLES: [[u32; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

impl Shape {
    /// Archetype of this payload.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Arrows3D { .. } => ShapeKind::Arrows3D,
            Self::Boxes3D { .. } => ShapeKind::Boxes3D,
            Self::Capsules3D { .. } => ShapeKind::Capsules3D,
            Self::LineStrips3D { .. } => ShapeKind::LineStrips3D,
            Self::Mesh3D { .. } => ShapeKind::Mesh3D,
            Self::MeshFromPath { .. } => ShapeKind::MeshFromPath,
            Self::Points3D { .. } => ShapeKind::Points3D,
        }
    }

    /// Solid box of extents `size`.
    pub fn boxes(label: impl Into<String>, size: Vec3, color: Color) -> ViewerResult<Self> {
        for (axis, v) in ["x", "y", "z"].into_iter().zip(size.to_array()) {
            check_positive(&format!("box size {axis}"), v)?;
        }
        Ok(Self::Boxes3D {
            size,
            color,
            fill_mode: FillMode::Solid,
            label: Some(label.into()),
        })
    }

    /// Unlabelled solid floor slab.
    pub fn floor(size: Vec3, color: Color) -> ViewerResult<Self> {
        for (axis, v) in ["x", "y", "z"].into_iter().zip(size.to_array()) {
            check_positive(&format!("floor size {axis}"), v)?;
        }
        Ok(Self::Boxes3D {
            size,
            color,
            fill_mode: FillMode::Solid,
            label: None,
        })
    }

    /// Arrow of `length` along +z. A negative length points the arrow along -z.
    pub fn arrow(
        label: impl Into<String>,
        radius: f32,
        length: f32,
        color: Color,
    ) -> ViewerResult<Self> {
        Ok(Self::Arrows3D {
            vector: arrow_vector(length)?,
            radius: check_positive("arrow radius", radius)?,
            color,
            label: label.into(),
        })
    }

    /// Capsule of cylindrical `length` and `radius`.
    pub fn capsule(radius: f32, length: f32, color: Color) -> ViewerResult<Self> {
        Ok(Self::Capsules3D {
            length: check_positive("capsule length", length)?,
            radius: check_positive("capsule radius", radius)?,
            color,
        })
    }

    /// Segment from `from` to `to`.
    pub fn line(
        label: impl Into<String>,
        from: Vec3,
        to: Vec3,
        radius: f32,
        color: Color,
    ) -> ViewerResult<Self> {
        Ok(Self::LineStrips3D {
            points: vec![check_point("line start", from)?, check_point("line end", to)?],
            radius: check_positive("line radius", radius)?,
            colors: vec![color],
            label: Some(label.into()),
        })
    }

    /// Poly-line through `points` (at least two).
    pub fn curve(
        label: impl Into<String>,
        points: Vec<Vec3>,
        width: f32,
        color: Color,
    ) -> ViewerResult<Self> {
        Ok(Self::LineStrips3D {
            points: check_curve_points(points)?,
            radius: check_positive("curve line width", width)?,
            colors: vec![color],
            label: Some(label.into()),
        })
    }

    /// Quad face, triangulated over its four vertices.
    pub fn square_face(corners: [Vec3; 4], color: Color) -> ViewerResult<Self> {
        for p in corners {
            check_point("face vertex", p)?;
        }
        Ok(Self::Mesh3D {
            vertex_positions: corners.to_vec(),
            triangle_indices: SQUARE_FACE_TRIANGLES.to_vec(),
            vertex_colors: vec![color],
        })
    }

    /// Single triangle face.
    pub fn triangle_face(corners: [Vec3; 3], color: Color) -> ViewerResult<Self> {
        for p in corners {
            check_point("face vertex", p)?;
        }
        Ok(Self::Mesh3D {
            vertex_positions: corners.to_vec(),
            triangle_indices: Vec::new(),
            vertex_colors: vec![color],
        })
    }

    /// Sphere of `radius` at the origin.
    pub fn sphere(label: impl Into<String>, radius: f32, color: Color) -> ViewerResult<Self> {
        Ok(Self::Points3D {
            positions: vec![Vec3::ZERO],
            radius: check_positive("sphere radius", radius)?,
            color,
            label: label.into(),
        })
    }

    /// Mesh the backend loads from `path`.
    pub fn mesh_from_path(path: impl Into<PathBuf>) -> ViewerResult<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ViewerError::validation("mesh file path must be non-empty"));
        }
        Ok(Self::MeshFromPath { path })
    }

    /// Change radius and length of an arrow.
    pub fn resize_arrow(&mut self, new_radius: f32, new_length: f32) -> ViewerResult<()> {
        let new_vector = arrow_vector(new_length)?;
        let new_radius = check_positive("arrow radius", new_radius)?;
        match self {
            Self::Arrows3D { vector, radius, .. } => {
                *vector = new_vector;
                *radius = new_radius;
                Ok(())
            }
            other => Err(wrong_kind("resize_arrow", ShapeKind::Arrows3D, other.kind())),
        }
    }

    /// Change radius and length of a capsule.
    pub fn resize_capsule(&mut self, new_radius: f32, new_length: f32) -> ViewerResult<()> {
        let new_length = check_positive("capsule length", new_length)?;
        let new_radius = check_positive("capsule radius", new_radius)?;
        match self {
            Self::Capsules3D { length, radius, .. } => {
                *length = new_length;
                *radius = new_radius;
                Ok(())
            }
            other => Err(wrong_kind("resize_capsule", ShapeKind::Capsules3D, other.kind())),
        }
    }

    /// Replace curve colors: one color, or exactly one per vertex.
    pub fn set_curve_colors(&mut self, new_colors: Vec<Color>) -> ViewerResult<()> {
        match self {
            Self::LineStrips3D { points, colors, .. } => {
                if new_colors.len() != 1 && new_colors.len() != points.len() {
                    return Err(ViewerError::validation(format!(
                        "curve has {} points but {} colors were given",
                        points.len(),
                        new_colors.len()
                    )));
                }
                *colors = new_colors;
                Ok(())
            }
            other => Err(wrong_kind("set_curve_colors", ShapeKind::LineStrips3D, other.kind())),
        }
    }

    /// Replace the curve line width.
    pub fn set_curve_line_width(&mut self, width: f32) -> ViewerResult<()> {
        let width = check_positive("curve line width", width)?;
        match self {
            Self::LineStrips3D { radius, .. } => {
                *radius = width;
                Ok(())
            }
            other => Err(wrong_kind(
                "set_curve_line_width",
                ShapeKind::LineStrips3D,
                other.kind(),
            )),
        }
    }

    /// Replace curve vertices. Per-vertex colors that no longer fit collapse to the first one.
    pub fn set_curve_points(&mut self, new_points: Vec<Vec3>) -> ViewerResult<()> {
        let new_points = check_curve_points(new_points)?;
        match self {
            Self::LineStrips3D { points, colors, .. } => {
                if colors.len() > 1 && colors.len() != new_points.len() {
                    colors.truncate(1);
                }
                *points = new_points;
                Ok(())
            }
            other => Err(wrong_kind("set_curve_points", ShapeKind::LineStrips3D, other.kind())),
        }
    }
}

fn arrow_vector(length: f32) -> ViewerResult<Vec3> {
    let length = check_finite("arrow length", length)?;
    if length == 0.0 {
        return Err(ViewerError::validation("arrow length must be non-zero"));
    }
    Ok(Vec3::new(0.0, 0.0, length))
}

fn check_curve_points(points: Vec<Vec3>) -> ViewerResult<Vec<Vec3>> {
    if points.len() < 2 {
        return Err(ViewerError::validation(format!(
            "a curve needs at least 2 points, got {}",
            points.len()
        )));
    }
    for &p in &points {
        check_point("curve point", p)?;
    }
    Ok(points)
}

fn wrong_kind(op: &str, expected: ShapeKind, found: ShapeKind) -> ViewerError {
    ViewerError::validation(format!("{op}: expected a {expected} entity, found {found}"))
}

#[cfg(test)]
#[path = "../../tests/unit/shapes/shape.rs"]
mod tests;
