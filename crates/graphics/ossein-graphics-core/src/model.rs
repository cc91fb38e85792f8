//! Static model payload: skeleton, meshes, materials.
//!
//! These are plain containers for interchange; no topology processing
//! happens here.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::skeleton::Skeleton;

/// One bone weight on a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneInfluence {
    pub bone: u32,
    pub weight: f32,
}

/// Triangle mesh with optional per-vertex attributes.
///
/// Attribute vectors are vertex-major: `uvs` holds `uv_layer_count` entries
/// per vertex, `influences` holds `influences_per_vertex` entries per vertex.
/// Absent attributes are empty vectors. `material_indices` carries one entry
/// per UV layer slot as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub uv_layer_count: usize,
    pub influences_per_vertex: usize,
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<[f32; 4]>,
    pub influences: Vec<BoneInfluence>,
    pub faces: Vec<[u32; 3]>,
    pub material_indices: Vec<i32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Texture slots referenced by a material, when present.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MaterialTextures {
    pub diffuse: String,
    pub normal: String,
    pub specular: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub textures: Option<MaterialTextures>,
}

/// Top-level model container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub skeleton: Skeleton,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
