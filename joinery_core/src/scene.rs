//! # Scene Bridge
//!
//! Typed commands a 3D front end sends to the engine, and the events it gets
//! back. The scene state is an explicit [`SceneContext`] owned by the caller;
//! the renderer only ever sees the module list through it.
//!
//! Commands use meters (the renderer's unit); modules are stored in
//! millimeters.
//!
//! ```rust
//! use joinery_core::project::Project;
//! use joinery_core::scene::{SceneCommand, SceneContext, SceneEvent};
//!
//! let mut scene = SceneContext::new(Project::new("Kitchen", "Ana"));
//! let cmd: SceneCommand = serde_json::from_str(
//!     r#"{"command": "add_module", "module_type": "base_cabinet", "width": 0.6, "height": 0.72, "depth": 0.56}"#,
//! ).unwrap();
//!
//! let event = scene.dispatch(cmd).unwrap();
//! assert!(matches!(event, SceneEvent::ModuleAdded { .. }));
//! assert_eq!(scene.modules()[0].width_mm, 600.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{JoineryError, JoineryResult};
use crate::module::{Module, ModuleType};
use crate::project::Project;
use crate::units::{Meters, Millimeters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SceneCommand {
    AddModule {
        /// Base cabinet when the renderer sends no type
        #[serde(default)]
        module_type: ModuleType,
        /// Meters
        width: f64,
        height: f64,
        depth: f64,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        z: f64,
        /// Opaque renderer data; a string `label` key becomes the module label
        #[serde(default)]
        user_data: serde_json::Value,
    },
    RemoveModule {
        id: Uuid,
    },
    MoveModule {
        id: Uuid,
        x: f64,
        z: f64,
    },
    ToggleWireframe,
    Save,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    ModuleAdded { id: Uuid },
    ModuleRemoved { id: Uuid },
    ModuleMoved { id: Uuid },
    WireframeChanged { enabled: bool },
    SaveRequested { project_id: Uuid },
}

/// Scene state shared between the renderer and the rest of the application.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub project: Project,
    pub wireframe: bool,
}

impl SceneContext {
    pub fn new(project: Project) -> Self {
        SceneContext {
            project,
            wireframe: false,
        }
    }

    pub fn modules(&self) -> &[Module] {
        &self.project.modules
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for non-positive or non-finite sizes or coordinates
    /// - `ModuleNotFound` when removing or moving an unknown module
    pub fn dispatch(&mut self, command: SceneCommand) -> JoineryResult<SceneEvent> {
        let event = match command {
            SceneCommand::AddModule {
                module_type,
                width,
                height,
                depth,
                color,
                x,
                z,
                user_data,
            } => {
                let width_mm = to_millimeters("width", width)?;
                let height_mm = to_millimeters("height", height)?;
                let depth_mm = to_millimeters("depth", depth)?;
                check_coordinates(x, z)?;

                let mut module = Module::new(module_type, width_mm, height_mm, depth_mm);
                module.position = [x, 0.0, z];
                module.color = color;
                if let Some(label) = user_data.get("label").and_then(|v| v.as_str()) {
                    module.label = label.to_string();
                }

                SceneEvent::ModuleAdded {
                    id: self.project.add_module(module),
                }
            }
            SceneCommand::RemoveModule { id } => {
                self.project
                    .remove_module(&id)
                    .ok_or_else(|| JoineryError::module_not_found(id))?;
                SceneEvent::ModuleRemoved { id }
            }
            SceneCommand::MoveModule { id, x, z } => {
                check_coordinates(x, z)?;
                let module = self
                    .project
                    .get_module_mut(&id)
                    .ok_or_else(|| JoineryError::module_not_found(id))?;
                module.position[0] = x;
                module.position[2] = z;
                SceneEvent::ModuleMoved { id }
            }
            SceneCommand::ToggleWireframe => {
                self.wireframe = !self.wireframe;
                SceneEvent::WireframeChanged {
                    enabled: self.wireframe,
                }
            }
            SceneCommand::Save => SceneEvent::SaveRequested {
                project_id: self.project.id(),
            },
        };

        debug!(?event, "scene command applied");
        Ok(event)
    }
}

fn to_millimeters(field: &str, meters: f64) -> JoineryResult<f64> {
    if !meters.is_finite() || meters <= 0.0 {
        return Err(JoineryError::invalid_input(
            field,
            meters.to_string(),
            "Size must be a positive number of meters",
        ));
    }
    Ok(Millimeters::from(Meters(meters)).value())
}

fn check_coordinates(x: f64, z: f64) -> JoineryResult<()> {
    for (field, value) in [("x", x), ("z", z)] {
        if !value.is_finite() {
            return Err(JoineryError::invalid_input(field, value.to_string(), "Coordinate must be finite"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(width: f64) -> SceneCommand {
        SceneCommand::AddModule {
            module_type: ModuleType::WallCabinet,
            width,
            height: 0.72,
            depth: 0.32,
            color: Some("#ffffff".to_string()),
            x: 1.5,
            z: -0.2,
            user_data: json!({ "label": "W-1" }),
        }
    }

    #[test]
    fn test_add_converts_meters() {
        let mut scene = SceneContext::new(Project::new("Kitchen", ""));
        let event = scene.dispatch(add(0.8)).unwrap();

        let SceneEvent::ModuleAdded { id } = event else {
            panic!("unexpected event {event:?}");
        };
        let module = scene.project.get_module(&id).unwrap();
        assert!((module.width_mm - 800.0).abs() < 1e-9);
        assert!((module.depth_mm - 320.0).abs() < 1e-9);
        assert_eq!(module.label, "W-1");
        assert_eq!(module.position, [1.5, 0.0, -0.2]);
    }

    #[test]
    fn test_add_rejects_bad_sizes() {
        let mut scene = SceneContext::new(Project::new("Kitchen", ""));
        for bad in [0.0, -0.6, f64::NAN] {
            assert!(scene.dispatch(add(bad)).is_err());
        }
        assert!(scene.modules().is_empty());
    }

    #[test]
    fn test_move_and_remove() {
        let mut scene = SceneContext::new(Project::new("Kitchen", ""));
        let SceneEvent::ModuleAdded { id } = scene.dispatch(add(0.6)).unwrap() else {
            panic!("expected module_added");
        };

        scene.dispatch(SceneCommand::MoveModule { id, x: 3.0, z: 0.5 }).unwrap();
        assert_eq!(scene.modules()[0].position, [3.0, 0.0, 0.5]);

        assert_eq!(
            scene.dispatch(SceneCommand::RemoveModule { id }).unwrap(),
            SceneEvent::ModuleRemoved { id }
        );
        let err = scene.dispatch(SceneCommand::RemoveModule { id }).unwrap_err();
        assert_eq!(err.error_code(), "MODULE_NOT_FOUND");
    }

    #[test]
    fn test_wireframe_and_save() {
        let project = Project::new("Kitchen", "");
        let project_id = project.id();
        let mut scene = SceneContext::new(project);

        assert_eq!(
            scene.dispatch(SceneCommand::ToggleWireframe).unwrap(),
            SceneEvent::WireframeChanged { enabled: true }
        );
        assert_eq!(
            scene.dispatch(SceneCommand::ToggleWireframe).unwrap(),
            SceneEvent::WireframeChanged { enabled: false }
        );
        assert_eq!(
            scene.dispatch(SceneCommand::Save).unwrap(),
            SceneEvent::SaveRequested { project_id }
        );
    }

    #[test]
    fn test_command_json() {
        let cmd: SceneCommand = serde_json::from_value(json!({ "command": "toggle_wireframe" })).unwrap();
        assert_eq!(cmd, SceneCommand::ToggleWireframe);

        let untyped: SceneCommand = serde_json::from_value(json!({
            "command": "add_module",
            "width": 0.6,
            "height": 0.72,
            "depth": 0.56,
            "color": "#c8a27a",
            "x": 0.0,
            "z": 0.0,
            "user_data": { "label": "B-1" }
        }))
        .unwrap();
        let SceneCommand::AddModule { module_type, .. } = &untyped else {
            panic!("unexpected command {untyped:?}");
        };
        assert_eq!(*module_type, ModuleType::BaseCabinet);

        let mut scene = SceneContext::new(Project::new("Kitchen", ""));
        scene.dispatch(untyped).unwrap();
        assert_eq!(scene.modules()[0].module_type, ModuleType::BaseCabinet);

        let event = serde_json::to_value(SceneEvent::WireframeChanged { enabled: true }).unwrap();
        assert_eq!(event, json!({ "event": "wireframe_changed", "enabled": true }));
    }
}
