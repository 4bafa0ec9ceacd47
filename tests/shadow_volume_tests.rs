//! Shadow Volume Generation Tests
//!
//! Tests for:
//! - Apex and occluder vertex placement in the light and shadow lists
//! - Far-shell projection away from the light
//! - Pyramid fan windings and 16-to-32-bit index widening
//! - Whole-mesh generation counts against a cube occluder

use glam::{Mat4, Vec3};

use gloam::renderer::passes::shadow_volume::{VOLUME_REACH, VolumeGeometry};
use gloam::resources::Vertex;
use gloam::resources::mesh::cube_geometry;
use gloam::scene::Camera;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: [f32; 3], b: Vec3) -> bool {
    approx(a[0], b.x) && approx(a[1], b.y) && approx(a[2], b.z)
}

fn vertex_at(position: Vec3) -> Vertex {
    Vertex {
        position: position.to_array(),
        normal: [0.0, 1.0, 0.0],
        tangent: [1.0, 0.0, 0.0],
        uv: [0.0, 0.0],
    }
}

// ============================================================================
// Apex and Occluder Vertices
// ============================================================================

#[test]
fn default_geometry_is_empty() {
    let geometry = VolumeGeometry::default();
    assert!(geometry.is_empty());
    assert!(geometry.light_vertices.is_empty());
    assert!(geometry.shadow_vertices.is_empty());
}

#[test]
fn apex_lands_at_the_same_index_in_both_lists() {
    let mut geometry = VolumeGeometry::default();
    let apex = geometry.add_light(Vec3::new(1.0, 5.0, -2.0));

    assert_eq!(apex, 0);
    assert_eq!(geometry.light_vertices.len(), 1);
    assert_eq!(geometry.shadow_vertices.len(), 1);
    assert!(approx_vec(
        geometry.light_vertices[0].position,
        Vec3::new(1.0, 5.0, -2.0)
    ));
    assert!(approx_vec(
        geometry.shadow_vertices[0].position,
        Vec3::new(1.0, 5.0, -2.0)
    ));
}

#[test]
fn vertices_with_no_triangles_still_count_as_empty() {
    let mut geometry = VolumeGeometry::default();
    geometry.add_light(Vec3::ZERO);
    assert!(geometry.is_empty(), "emptiness tracks indices, not vertices");
}

#[test]
fn occluder_vertices_are_world_transformed() {
    let mut geometry = VolumeGeometry::default();
    geometry.add_light(Vec3::ZERO);

    let world = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
    let start = geometry.add_occluder_vertices(
        Vec3::ZERO,
        &world,
        &[vertex_at(Vec3::new(1.0, 0.0, 0.0))],
    );

    assert_eq!(start, 1, "occluder vertices follow the apex");
    assert!(approx_vec(
        geometry.light_vertices[1].position,
        Vec3::new(6.0, 0.0, 0.0)
    ));
}

#[test]
fn far_shell_sits_at_volume_reach_from_the_light() {
    let light = Vec3::new(0.0, 10.0, 0.0);
    let mut geometry = VolumeGeometry::default();
    geometry.add_light(light);
    geometry.add_occluder_vertices(
        light,
        &Mat4::IDENTITY,
        &[vertex_at(Vec3::new(0.0, 4.0, 0.0))],
    );

    let shell = Vec3::from_array(geometry.shadow_vertices[1].position);
    assert!(approx((shell - light).length(), VOLUME_REACH));
    // Straight below the light, the shell point continues the same ray.
    assert!(approx_vec(
        geometry.shadow_vertices[1].position,
        light + VOLUME_REACH * Vec3::NEG_Y
    ));
}

#[test]
fn volume_reach_outruns_the_camera_far_plane() {
    assert!(VOLUME_REACH > Camera::FAR_PLANE);
}

#[test]
fn vertex_coincident_with_the_light_projects_onto_the_light() {
    let light = Vec3::new(3.0, 3.0, 3.0);
    let mut geometry = VolumeGeometry::default();
    geometry.add_light(light);
    geometry.add_occluder_vertices(light, &Mat4::IDENTITY, &[vertex_at(light)]);

    // Zero-length ray degrades to the light position instead of NaN.
    assert!(approx_vec(geometry.shadow_vertices[1].position, light));
}

#[test]
fn second_occluder_starts_after_the_first() {
    let mut geometry = VolumeGeometry::default();
    geometry.add_light(Vec3::ZERO);

    let triangle = [
        vertex_at(Vec3::new(0.0, 0.0, 1.0)),
        vertex_at(Vec3::new(1.0, 0.0, 1.0)),
        vertex_at(Vec3::new(0.0, 1.0, 1.0)),
    ];
    let first = geometry.add_occluder_vertices(Vec3::ZERO, &Mat4::IDENTITY, &triangle);
    let second = geometry.add_occluder_vertices(Vec3::ZERO, &Mat4::IDENTITY, &triangle);

    assert_eq!(first, 1);
    assert_eq!(second, 4);
    assert_eq!(geometry.light_vertices.len(), 7);
    assert_eq!(geometry.shadow_vertices.len(), 7);
}

// ============================================================================
// Fan Windings and Index Widening
// ============================================================================

#[test]
fn light_pyramid_winds_against_the_base_triangle() {
    let mut geometry = VolumeGeometry::default();
    let apex = geometry.add_light(Vec3::ZERO);
    let triangle = [
        vertex_at(Vec3::new(0.0, 0.0, 1.0)),
        vertex_at(Vec3::new(1.0, 0.0, 1.0)),
        vertex_at(Vec3::new(0.0, 1.0, 1.0)),
    ];
    let start = geometry.add_occluder_vertices(Vec3::ZERO, &Mat4::IDENTITY, &triangle);
    geometry.add_triangle(apex, start, [0, 1, 2]);

    assert_eq!(geometry.light_indices, vec![0, 2, 1, 0, 3, 2, 0, 1, 3]);
}

#[test]
fn shadow_pyramid_winds_with_the_base_triangle() {
    let mut geometry = VolumeGeometry::default();
    let apex = geometry.add_light(Vec3::ZERO);
    let triangle = [
        vertex_at(Vec3::new(0.0, 0.0, 1.0)),
        vertex_at(Vec3::new(1.0, 0.0, 1.0)),
        vertex_at(Vec3::new(0.0, 1.0, 1.0)),
    ];
    let start = geometry.add_occluder_vertices(Vec3::ZERO, &Mat4::IDENTITY, &triangle);
    geometry.add_triangle(apex, start, [0, 1, 2]);

    assert_eq!(geometry.shadow_indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 1]);
}

#[test]
fn each_triangle_grows_both_pyramids_by_nine_indices() {
    let mut geometry = VolumeGeometry::default();
    let apex = geometry.add_light(Vec3::ZERO);
    for n in 0..4 {
        geometry.add_triangle(apex, 1, [0, 1, 2]);
        assert_eq!(geometry.light_indices.len(), 9 * (n + 1));
        assert_eq!(geometry.shadow_indices.len(), 9 * (n + 1));
    }
}

#[test]
fn mesh_indices_widen_past_the_sixteen_bit_limit() {
    let mut geometry = VolumeGeometry::default();
    // Start offset beyond what u16 arithmetic could represent.
    let start = 70_000;
    geometry.add_triangle(0, start, [u16::MAX, 0, 1]);

    assert_eq!(
        geometry.light_indices,
        vec![
            0,
            start,
            start + 65_535,
            0,
            start + 1,
            start,
            0,
            start + 65_535,
            start + 1,
        ]
    );
}

// ============================================================================
// Whole-Mesh Generation
// ============================================================================

#[test]
fn cube_occluder_fans_every_face_triangle() {
    let (vertices, indices) = cube_geometry(1.0);
    let light = Vec3::new(0.0, 5.0, 0.0);

    let mut geometry = VolumeGeometry::default();
    let apex = geometry.add_light(light);
    let start = geometry.add_occluder_vertices(light, &Mat4::IDENTITY, &vertices);
    for triangle in indices.chunks_exact(3) {
        geometry.add_triangle(apex, start, [triangle[0], triangle[1], triangle[2]]);
    }

    // 24 cube vertices plus the apex, 12 triangles fanned into 3 faces each.
    assert_eq!(geometry.light_vertices.len(), 25);
    assert_eq!(geometry.shadow_vertices.len(), 25);
    assert_eq!(geometry.light_indices.len(), 12 * 9);
    assert_eq!(geometry.shadow_indices.len(), 12 * 9);
    assert!(!geometry.is_empty());

    let vertex_count = geometry.light_vertices.len() as u32;
    assert!(geometry.light_indices.iter().all(|&i| i < vertex_count));
    assert!(geometry.shadow_indices.iter().all(|&i| i < vertex_count));

    // Every shell vertex sits the full reach away from the light.
    for shell in &geometry.shadow_vertices[1..] {
        let distance = (Vec3::from_array(shell.position) - light).length();
        assert!(approx(distance, VOLUME_REACH));
    }
}
