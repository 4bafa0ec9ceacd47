//! Headless smoke run: a spinning cube over a floor plane under the
//! standard light rig, rendered off-screen for a couple of seconds.
//!
//! Along the way it drives the rest of the public surface once: geometry
//! conditioning, runtime toggles, both shadow techniques, scene teardown
//! and the settings round-trip.
//!
//! Run with `RUST_LOG=info cargo run --example headless`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glam::{Mat4, Vec3};

use gloam::resources::mesh::{cube_geometry, plane_geometry};
use gloam::scene::{Billboard, Camera};
use gloam::{Engine, Material, MeshGroup, RenderableModel, ShadowTechnique, Texture};

/// Nominal frame interval for scaling the camera speeds.
const FRAME_STEP: f32 = 1.0 / 60.0;

fn main() -> gloam::Result<()> {
    env_logger::init();

    let mut engine = Engine::new(1280, 720)?;
    engine.add_standard_lighting()?;
    engine.load_settings();

    // Floor
    let (vertices, indices) = plane_geometry(20.0, 20.0);
    let mut floor = MeshGroup::single_part(&engine.gpu().device, "floor", vertices, indices);
    floor.meshes[0].parts[0].material = Some(Material::new(
        Vec3::new(0.55, 0.55, 0.6),
        Vec3::splat(0.2),
        Vec3::ONE,
        4.0,
    ));
    let floor_model = RenderableModel::new("floor", floor);
    let floor_uuid = floor_model.uuid;
    engine.registry_mut().add_model(floor_model);

    // Pedestal: recentered, sized up to 1.5 and rested on the floor by its
    // bottom center.
    let (vertices, indices) = cube_geometry(0.5);
    let geometry = MeshGroup::single_part(&engine.gpu().device, "pedestal", vertices, indices);
    let mut pedestal = RenderableModel::new("pedestal", geometry);
    pedestal.recenter(&engine.gpu().queue);
    pedestal.normalize_size(&engine.gpu().queue, 1.5);
    let base = pedestal.center_bottom();
    pedestal.set_world_transform(Mat4::from_translation(Vec3::new(0.0, -base.y, 0.0)));
    let pedestal_key = engine.registry_mut().add_model(pedestal);

    // Spinning cube above the pedestal
    let (vertices, indices) = cube_geometry(0.5);
    let mut cube = MeshGroup::single_part(&engine.gpu().device, "cube", vertices, indices);
    cube.meshes[0].parts[0].material = Some(Material::new(
        Vec3::new(0.2, 0.7, 1.0),
        Vec3::ONE,
        Vec3::ONE,
        64.0,
    ));
    let cube_key = engine
        .registry_mut()
        .add_model(RenderableModel::new("cube", cube));

    // Checkerboard signs flanking the scene
    let checker = Arc::new(Texture::checkerboard(
        &engine.gpu().device,
        &engine.gpu().queue,
        "checker",
        64,
        64,
        8,
    ));
    let left = Billboard::new(
        &engine.gpu().device,
        Arc::clone(&checker),
        Vec3::new(-3.0, 1.5, 0.0),
        2.0,
        3.0,
    );
    let left_key = engine.registry_mut().add_billboard(left);
    let right = Billboard::new(
        &engine.gpu().device,
        checker,
        Vec3::new(3.0, 1.5, 0.0),
        2.0,
        3.0,
    );
    let right_uuid = right.uuid;
    engine.registry_mut().add_billboard(right);

    engine.camera_mut().look_at(Vec3::new(0.0, 0.5, 0.0));

    let mut angle = 0.0_f32;
    let mut rendered = 0u32;
    let mut skipped = 0u32;
    while rendered < 120 {
        angle += 0.02;
        if let Some(model) = engine.registry_mut().model_mut(cube_key) {
            let spin = Mat4::from_rotation_y(angle);
            model.set_world_transform(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)) * spin);
        }
        // Slow orbit plus a gentle dolly toward the scene.
        engine.camera_mut().rotate(0.01 * Camera::ROTATION_SPEED, 0.0);
        engine.camera_mut().walk(0.1 * Camera::RUN_SPEED * FRAME_STEP);

        match engine.render_frame()? {
            Some(report) => {
                rendered += 1;
                match rendered {
                    // Flashlight on once the scene has settled.
                    20 => {
                        if let Some(rig) = engine.standard_lights() {
                            if let Some(flash) = engine.registry_mut().light_mut(rig.flashlight) {
                                flash.active = true;
                            }
                        }
                    }
                    40 => engine.toggles_mut().wireframe = true,
                    50 => engine.toggles_mut().wireframe = false,
                    // The right sign comes down mid-run.
                    60 => {
                        engine.registry_mut().remove_billboard_by_uuid(right_uuid);
                    }
                    90 => {
                        engine
                            .renderer_mut()
                            .set_shadow_technique(ShadowTechnique::Volumes);
                        log::info!(
                            "switched to {:?} shadows",
                            engine.renderer().shadow_technique()
                        );
                    }
                    _ => {}
                }
                log::info!(
                    "frame {rendered}: {} models, {} shadow channels, far {:.1}, blur {:?}",
                    report.visible_models,
                    report.shadow_channels,
                    report.far_plane,
                    report.blur
                );
            }
            None => skipped += 1,
        }
        thread::sleep(Duration::from_millis(4));
    }

    // Poke the unimplemented paths.
    let (vertices, indices) = plane_geometry(1.0, 1.0);
    let legacy = MeshGroup::single_part(&engine.gpu().device, "legacy", vertices, indices);
    if let Err(err) = RenderableModel::from_combined_maps("legacy", legacy) {
        log::warn!("combined-map content: {err}");
    }
    if let Err(err) = engine.render_ambient_only() {
        log::warn!("ambient pass: {err}");
    }

    // Tear the scene down through both removal flavors.
    engine.registry_mut().remove_model(cube_key);
    engine.registry_mut().remove_model(pedestal_key);
    engine.registry_mut().remove_model_by_uuid(floor_uuid);
    engine.registry_mut().remove_billboard(left_key);
    log::info!(
        "teardown: {} models, {} billboards remain",
        engine.registry().model_count(),
        engine.registry().billboard_count()
    );

    engine.save_settings()?;
    for entry in engine.diagnostics_mut().drain() {
        log::warn!("diagnostic: {entry}");
    }
    log::info!("{rendered} frames rendered, {skipped} paced out");
    Ok(())
}
