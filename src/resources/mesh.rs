//! Mesh geometry containers.
//!
//! Geometry is hierarchical: a [`MeshGroup`] owns one vertex/index buffer
//! pair plus a list of [`Mesh`]es, each of which is a list of [`MeshPart`]s
//! addressing a range of the shared index buffer. Parts are the unit of
//! texturing and drawing; passes iterate group → mesh → part.
//!
//! The CPU-side vertex and index vectors are retained after upload: the
//! bounding-sphere cache and the shadow-volume generator both read positions
//! and triangle indices back from them.

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::resources::material::{MapSet, Material};
use crate::scene::bounds::BoundingSphere;

/// Interleaved vertex as consumed by every model pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3,
        3 => Float32x2,
    ];

    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A contiguous index range drawn with one material/map binding.
#[derive(Debug, Clone, Default)]
pub struct MeshPart {
    pub index_start: u32,
    pub index_count: u32,
    pub material: Option<Material>,
    pub maps: MapSet,
}

impl MeshPart {
    #[must_use]
    pub fn new(index_start: u32, index_count: u32) -> Self {
        Self {
            index_start,
            index_count,
            material: None,
            maps: MapSet::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn index_range(&self) -> std::ops::Range<u32> {
        self.index_start..self.index_start + self.index_count
    }
}

/// A named collection of parts sharing the group's buffers.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub parts: Vec<MeshPart>,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<String>, parts: Vec<MeshPart>) -> Self {
        Self {
            name: name.into(),
            parts,
        }
    }
}

/// Geometry for one model: shared buffers plus the mesh/part hierarchy.
#[derive(Debug)]
pub struct MeshGroup {
    pub name: String,
    pub meshes: Vec<Mesh>,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl MeshGroup {
    /// Uploads `vertices`/`indices` and wraps them with the given hierarchy.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u16>,
        meshes: Vec<Mesh>,
    ) -> Self {
        let name = name.into();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}/vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}/indices")),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            name,
            meshes,
            vertices,
            indices,
            vertex_buffer,
            index_buffer,
        }
    }

    /// Convenience for geometry with one mesh covering every index.
    #[must_use]
    pub fn single_part(
        device: &wgpu::Device,
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u16>,
    ) -> Self {
        let name = name.into();
        let count = u32::try_from(indices.len()).unwrap_or(u32::MAX);
        let mesh = Mesh::new(name.clone(), vec![MeshPart::new(0, count)]);
        Self::new(device, name, vertices, indices, vec![mesh])
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    #[inline]
    #[must_use]
    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    /// Local-space positions, in vertex order.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| Vec3::from_array(v.position))
    }

    /// Smallest sphere estimate around the current vertex positions.
    /// Sentinel when the group has no vertices.
    #[must_use]
    pub fn local_bounds(&self) -> BoundingSphere {
        let positions: Vec<Vec3> = self.positions().collect();
        BoundingSphere::from_points(&positions)
    }

    /// Axis-aligned min/max of the current positions, `None` when empty.
    #[must_use]
    pub fn bounds_min_max(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }

    /// Bakes `matrix` into every vertex and re-uploads the vertex buffer.
    ///
    /// Positions take the full transform; normals and tangents are rotated
    /// by the inverse-transpose and renormalized so non-uniform scales do
    /// not shear the shading basis.
    pub fn bake_transform(&mut self, queue: &wgpu::Queue, matrix: Mat4) {
        let normal_matrix = matrix.inverse().transpose();
        for vertex in &mut self.vertices {
            let p = matrix.transform_point3(Vec3::from_array(vertex.position));
            let n = normal_matrix
                .transform_vector3(Vec3::from_array(vertex.normal))
                .normalize_or_zero();
            let t = normal_matrix
                .transform_vector3(Vec3::from_array(vertex.tangent))
                .normalize_or_zero();
            vertex.position = p.to_array();
            vertex.normal = n.to_array();
            vertex.tangent = t.to_array();
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
    }
}

// ============================================================================
// Primitive builders
// ============================================================================

/// An axis-aligned cube of half-extent `half`, 24 vertices / 36 indices.
#[must_use]
pub fn cube_geometry(half: f32) -> (Vec<Vertex>, Vec<u16>) {
    // (normal, tangent, four corners counter-clockwise seen from outside)
    let faces: [(Vec3, Vec3, [Vec3; 4]); 6] = [
        (
            Vec3::Z,
            Vec3::X,
            [
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, 1.0),
            ],
        ),
        (
            Vec3::NEG_Z,
            Vec3::NEG_X,
            [
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::X,
            Vec3::NEG_Z,
            [
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, 1.0),
            ],
        ),
        (
            Vec3::NEG_X,
            Vec3::Z,
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::Y,
            Vec3::X,
            [
                Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::NEG_Y,
            Vec3::X,
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(-1.0, -1.0, 1.0),
            ],
        ),
    ];

    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, tangent, corners) in faces {
        let base = vertices.len() as u16;
        for (corner, uv) in corners.iter().zip(uvs) {
            vertices.push(Vertex {
                position: (*corner * half).to_array(),
                normal: normal.to_array(),
                tangent: tangent.to_array(),
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// A flat quad in the XZ plane, `width` by `depth`, facing +Y.
#[must_use]
pub fn plane_geometry(width: f32, depth: f32) -> (Vec<Vertex>, Vec<u16>) {
    let hw = width * 0.5;
    let hd = depth * 0.5;
    let corners = [
        (Vec3::new(-hw, 0.0, hd), [0.0, 1.0]),
        (Vec3::new(hw, 0.0, hd), [1.0, 1.0]),
        (Vec3::new(hw, 0.0, -hd), [1.0, 0.0]),
        (Vec3::new(-hw, 0.0, -hd), [0.0, 0.0]),
    ];
    let vertices = corners
        .iter()
        .map(|(p, uv)| Vertex {
            position: p.to_array(),
            normal: Vec3::Y.to_array(),
            tangent: Vec3::X.to_array(),
            uv: *uv,
        })
        .collect();
    (vertices, vec![0, 1, 2, 0, 2, 3])
}
