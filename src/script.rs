//! JSON command scripts replayed against a [`Gui`].
//!
//! ```json
//! { "keep_going": false,
//!   "commands": [
//!     { "op": "create_window", "name": "w1" },
//!     { "op": "add_sphere", "name": "s1/ball", "radius": 0.5, "color": [255, 0, 0, 255] } ] }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::backend::Backend;
use crate::foundation::core::{Color, Vec3};
use crate::foundation::error::{ViewerError, ViewerResult};
use crate::gui::Gui;

/// One façade call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Command {
    CreateWindow {
        name: String,
    },
    CreateScene {
        name: String,
    },
    AddSceneToWindow {
        scene: String,
        window: String,
    },
    AddFloor {
        name: String,
    },
    AddBox {
        name: String,
        size: [f32; 3],
        color: Color,
    },
    AddArrow {
        name: String,
        radius: f32,
        length: f32,
        color: Color,
    },
    AddCapsule {
        name: String,
        radius: f32,
        length: f32,
        color: Color,
    },
    AddLine {
        name: String,
        from: Vec3,
        to: Vec3,
        color: Color,
    },
    AddSquareFace {
        name: String,
        corners: [Vec3; 4],
        color: Color,
    },
    AddTriangleFace {
        name: String,
        corners: [Vec3; 3],
        color: Color,
    },
    AddSphere {
        name: String,
        radius: f32,
        color: Color,
    },
    AddCurve {
        name: String,
        points: Vec<Vec3>,
        color: Color,
    },
    AddMesh {
        name: String,
        file: PathBuf,
    },
    ResizeArrow {
        name: String,
        radius: f32,
        length: f32,
    },
    ResizeCapsule {
        name: String,
        radius: f32,
        length: f32,
    },
    SetCurveColors {
        name: String,
        colors: Vec<Color>,
    },
    SetCurveLineWidth {
        name: String,
        width: f32,
    },
    SetCurvePoints {
        name: String,
        points: Vec<Vec3>,
    },
    CreateGroup {
        name: String,
    },
    AddToGroup {
        node: String,
        group: String,
    },
    DeleteNode {
        node: String,
        #[serde(default)]
        all: bool,
    },
}

impl Command {
    /// Operation name, as written in the `op` tag.
    pub fn op(&self) -> &'static str {
        match self {
            Self::CreateWindow { .. } => "create_window",
            Self::CreateScene { .. } => "create_scene",
            Self::AddSceneToWindow { .. } => "add_scene_to_window",
            Self::AddFloor { .. } => "add_floor",
            Self::AddBox { .. } => "add_box",
            Self::AddArrow { .. } => "add_arrow",
            Self::AddCapsule { .. } => "add_capsule",
            Self::AddLine { .. } => "add_line",
            Self::AddSquareFace { .. } => "add_square_face",
            Self::AddTriangleFace { .. } => "add_triangle_face",
            Self::AddSphere { .. } => "add_sphere",
            Self::AddCurve { .. } => "add_curve",
            Self::AddMesh { .. } => "add_mesh",
            Self::ResizeArrow { .. } => "resize_arrow",
            Self::ResizeCapsule { .. } => "resize_capsule",
            Self::SetCurveColors { .. } => "set_curve_colors",
            Self::SetCurveLineWidth { .. } => "set_curve_line_width",
            Self::SetCurvePoints { .. } => "set_curve_points",
            Self::CreateGroup { .. } => "create_group",
            Self::AddToGroup { .. } => "add_to_group",
            Self::DeleteNode { .. } => "delete_node",
        }
    }

    /// Run the command against `gui`.
    pub fn apply<B: Backend>(&self, gui: &mut Gui<B>) -> ViewerResult<()> {
        match self {
            Self::CreateWindow { name } => gui.create_window(name).map(|_| ()),
            Self::CreateScene { name } => gui.create_scene(name),
            Self::AddSceneToWindow { scene, window } => gui.add_scene_to_window(scene, window),
            Self::AddFloor { name } => gui.add_floor(name),
            Self::AddBox { name, size, color } => {
                gui.add_box(name, size[0], size[1], size[2], *color)
            }
            Self::AddArrow {
                name,
                radius,
                length,
                color,
            } => gui.add_arrow(name, *radius, *length, *color),
            Self::AddCapsule {
                name,
                radius,
                length,
                color,
            } => gui.add_capsule(name, *radius, *length, *color),
            Self::AddLine {
                name,
                from,
                to,
                color,
            } => gui.add_line(name, *from, *to, *color),
            Self::AddSquareFace {
                name,
                corners: [a, b, c, d],
                color,
            } => gui.add_square_face(name, *a, *b, *c, *d, *color),
            Self::AddTriangleFace {
                name,
                corners: [a, b, c],
                color,
            } => gui.add_triangle_face(name, *a, *b, *c, *color),
            Self::AddSphere {
                name,
                radius,
                color,
            } => gui.add_sphere(name, *radius, *color),
            Self::AddCurve {
                name,
                points,
                color,
            } => gui.add_curve(name, points.clone(), *color),
            Self::AddMesh { name, file } => gui.add_mesh(name, file),
            Self::ResizeArrow {
                name,
                radius,
                length,
            } => gui.resize_arrow(name, *radius, *length),
            Self::ResizeCapsule {
                name,
                radius,
                length,
            } => gui.resize_capsule(name, *radius, *length),
            Self::SetCurveColors { name, colors } => gui.set_curve_colors(name, colors.clone()),
            Self::SetCurveLineWidth { name, width } => gui.set_curve_line_width(name, *width),
            Self::SetCurvePoints { name, points } => gui.set_curve_points(name, points.clone()),
            Self::CreateGroup { name } => gui.create_group(name),
            Self::AddToGroup { node, group } => gui.add_to_group(node, group),
            Self::DeleteNode { node, all } => gui.delete_node(node, *all),
        }
    }
}

/// Ordered list of commands.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Script {
    /// Commands, run in order.
    pub commands: Vec<Command>,
    /// Keep running after a failing command.
    #[serde(default)]
    pub keep_going: bool,
}

/// Outcome of one command of a [`Script`] run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CommandOutcome {
    /// Position in the script.
    pub index: usize,
    /// Operation name.
    pub op: &'static str,
    /// Error message, if the command failed.
    pub error: Option<String>,
}

/// Per-command outcomes of a [`Script`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScriptReport {
    /// Outcomes of the commands that ran, in order.
    pub outcomes: Vec<CommandOutcome>,
    /// `true` when a failure stopped the run before the last command.
    pub stopped: bool,
}

impl ScriptReport {
    /// Number of commands that succeeded.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    /// Outcomes of the failed commands.
    pub fn failures(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

impl Script {
    /// Parse a script from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ViewerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ViewerError::serde(format!("parse command script JSON: {e}")))
    }

    /// Parse a script from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ViewerError::validation(format!("open command script '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply the commands to `gui` in order.
    #[tracing::instrument(skip_all, fields(commands = self.commands.len()))]
    pub fn run<B: Backend>(&self, gui: &mut Gui<B>) -> ScriptReport {
        let mut report = ScriptReport::default();
        for (index, cmd) in self.commands.iter().enumerate() {
            let error = cmd.apply(gui).err().map(|e| e.to_string());
            let failed = error.is_some();
            report.outcomes.push(CommandOutcome {
                index,
                op: cmd.op(),
                error,
            });
            if failed && !self.keep_going {
                report.stopped = index + 1 < self.commands.len();
                tracing::warn!(index, op = cmd.op(), "script stopped at failing command");
                break;
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;
