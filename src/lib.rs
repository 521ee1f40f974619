#![forbid(unsafe_code)]

pub mod apply;
pub mod decode;
pub mod defs;
pub mod error;
pub mod load;
pub mod math;
pub mod model;
pub mod render;

pub use apply::{ApplyTarget, JsonApplyTarget};
pub use error::{FlatshadeError, FlatshadeResult, ResultExt};
pub use load::{FileLoader, FsFileLoader, load_project, load_project_from};
pub use math::{RMat4, Vec2, Vec3, Vec4};
pub use model::{Camera, Fit, Keyframe, Light, Polygon, Project, Projection, Scene, View};
pub use render::{FrameRender, ProjectRender, SceneRender, SceneShape, render_project, render_scene};
