//! Scene-side state: camera, registry, lights, models, billboards, bounds.

pub mod billboard;
pub mod bounds;
pub mod camera;
pub mod light;
pub mod model;
pub mod registry;

pub use billboard::{Billboard, BillboardVertex};
pub use bounds::BoundingSphere;
pub use camera::{Camera, Frustum};
pub use light::{Attenuation, Light, LightKind, MAX_LIGHTS_PER_KIND};
pub use model::RenderableModel;
pub use registry::{BillboardKey, LightKey, ModelKey, SceneRegistry};
