//! Vertex data, the triangle mesh and its OBJ loader.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::colors::ColorRgb;
use crate::math::{Mat4, Vec2, Vec3, Vec4};

/// A model-space vertex as produced by the loader. Never changes after loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub color: ColorRgb,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: ColorRgb::WHITE,
            uv: Vec2::ZERO,
            normal: Vec3::UP,
            tangent: Vec3::RIGHT,
        }
    }
}

impl Vertex {
    pub fn new(position: Vec3, uv: Vec2, normal: Vec3, tangent: Vec3) -> Self {
        Self {
            position,
            uv,
            normal,
            tangent,
            ..Default::default()
        }
    }
}

/// A vertex after the transform stage, rebuilt every frame.
///
/// `position` holds NDC x, y, z after the perspective divide; `w` is the
/// untouched clip-space w used for perspective-correct interpolation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VertexOut {
    pub position: Vec4,
    pub color: ColorRgb,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub view_direction: Vec3,
}

/// How the index buffer is grouped into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    /// Every three indices form an independent triangle.
    #[default]
    TriangleList,
    /// Every window of three consecutive indices forms a triangle; odd windows
    /// swap their last two indices to keep the winding consistent.
    TriangleStrip,
}

/// Errors that can occur while loading a mesh from disk.
#[derive(Debug)]
pub enum LoadError {
    /// The OBJ file couldn't be opened or parsed.
    Obj {
        path: PathBuf,
        source: tobj::LoadError,
    },
    /// The file parsed but contained no triangles.
    Empty { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Obj { path, source } => {
                write!(f, "failed to load OBJ '{}': {}", path.display(), source)
            }
            LoadError::Empty { path } => {
                write!(f, "OBJ '{}' contains no triangles", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Obj { source, .. } => Some(source),
            LoadError::Empty { .. } => None,
        }
    }
}

/// Knobs for [`Mesh::from_obj`].
#[derive(Debug, Clone, Copy)]
pub struct ObjOptions {
    /// Negate z of positions, normals and tangents and reverse the triangle
    /// winding, converting right-handed OBJ data to the left-handed pipeline.
    pub flip_axis_and_winding: bool,
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self {
            flip_axis_and_winding: true,
        }
    }
}

pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    topology: PrimitiveTopology,
    vertices_out: Vec<VertexOut>,
    world_matrix: Mat4,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, topology: PrimitiveTopology) -> Self {
        Self {
            vertices_out: Vec::with_capacity(vertices.len()),
            vertices,
            indices,
            topology,
            world_matrix: Mat4::identity(),
        }
    }

    pub fn with_world_matrix(mut self, world_matrix: Mat4) -> Self {
        self.world_matrix = world_matrix;
        self
    }

    /// Loads a triangulated OBJ file as a triangle list.
    ///
    /// V is flipped to a top-left texture origin and per-vertex tangents are
    /// generated from the UV layout.
    pub fn from_obj<P: AsRef<Path>>(path: P, options: ObjOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };

        let (models, _materials) =
            tobj::load_obj(path, &load_options).map_err(|source| LoadError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            let count = mesh.positions.len() / 3;

            if mesh.normals.is_empty() {
                warn!("Mesh '{}' has no normals, defaulting to +Y", model.name);
            }
            if mesh.texcoords.is_empty() {
                warn!("Mesh '{}' has no texture coordinates", model.name);
            }

            for i in 0..count {
                let position = Vec3::new(
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                );
                let normal = if mesh.normals.is_empty() {
                    Vec3::UP
                } else {
                    Vec3::new(
                        mesh.normals[i * 3],
                        mesh.normals[i * 3 + 1],
                        mesh.normals[i * 3 + 2],
                    )
                };
                let uv = if mesh.texcoords.is_empty() {
                    Vec2::ZERO
                } else {
                    Vec2::new(mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1])
                };

                vertices.push(Vertex::new(position, uv, normal, Vec3::ZERO));
            }

            indices.extend(mesh.indices.iter().map(|index| base + index));
        }

        if indices.len() < 3 {
            return Err(LoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        compute_tangents(&mut vertices, &indices);

        if options.flip_axis_and_winding {
            for vertex in &mut vertices {
                vertex.position.z = -vertex.position.z;
                vertex.normal.z = -vertex.normal.z;
                vertex.tangent.z = -vertex.tangent.z;
            }
            for triangle in indices.chunks_exact_mut(3) {
                triangle.swap(1, 2);
            }
        }

        info!(
            "Loaded mesh {} ({} vertices, {} triangles)",
            path.display(),
            vertices.len(),
            indices.len() / 3
        );

        Ok(Self::new(vertices, indices, PrimitiveTopology::TriangleList))
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn set_topology(&mut self, topology: PrimitiveTopology) {
        self.topology = topology;
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Transformed vertices from the most recent [`Mesh::transform`].
    pub fn vertices_out(&self) -> &[VertexOut] {
        &self.vertices_out
    }

    /// Spins the mesh around its own Y axis.
    ///
    /// The rotation acts in model space, before the existing world transform.
    pub fn rotate(&mut self, angle: f32) {
        self.world_matrix = self.world_matrix * Mat4::rotation_y(angle);
    }

    /// Rebuilds the per-frame [`VertexOut`] buffer for the given camera matrices.
    pub fn transform(&mut self, view: Mat4, projection: Mat4) {
        crate::render::pipeline::transform_vertices(
            &self.vertices,
            self.world_matrix,
            view,
            projection,
            &mut self.vertices_out,
        );
    }
}

/// Accumulates per-triangle tangents from UV gradients, then orthogonalizes
/// each against its vertex normal.
fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }

        let (v0, v1, v2) = (vertices[i0], vertices[i1], vertices[i2]);
        let edge0 = v1.position - v0.position;
        let edge1 = v2.position - v0.position;
        let duv0 = v1.uv - v0.uv;
        let duv1 = v2.uv - v0.uv;

        let determinant = duv0.cross(duv1);
        if determinant == 0.0 {
            continue;
        }
        let tangent = (edge0 * duv1.y - edge1 * duv0.y) / determinant;

        vertices[i0].tangent += tangent;
        vertices[i1].tangent += tangent;
        vertices[i2].tangent += tangent;
    }

    for vertex in vertices.iter_mut() {
        vertex.tangent = vertex.tangent.reject(vertex.normal).normalize();
    }
}
