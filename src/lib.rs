#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod diagnostics;
pub mod config;
pub mod resources;
pub mod scene;
pub mod renderer;
pub mod engine;

pub use config::SavedSettings;
pub use diagnostics::DiagnosticLog;
pub use engine::{Engine, FramePacer, StandardLights};
pub use errors::{GloamError, Result};
pub use renderer::{
    BlurTechnique, ContextSettings, FrameReport, FrameStage, GpuContext, RenderToggles, Renderer,
    ShadowTechnique,
};
pub use resources::{Material, MeshGroup, Texture};
pub use scene::{
    Billboard, BoundingSphere, Camera, Light, LightKind, RenderableModel, SceneRegistry,
};
