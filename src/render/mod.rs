//! The 3D-to-2D rendering pipeline: per-scene projection and shading, then
//! project-level composition across keyframes.

pub mod project;
pub mod scene;

pub use project::{FrameRender, ProjectRender, fit_scale, render_project};
pub use scene::{SceneRender, SceneShape, render_scene};
