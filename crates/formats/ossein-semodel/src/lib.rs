//! SEModel binary container codec.
//!
//! Little-endian layout: a 7-byte magic, version and header-size words,
//! three presence masks, signed 32-bit table counts, bone names as
//! null-terminated legacy strings, fixed-order bone records, meshes with
//! variable-width vertex/bone indices, then materials. Reads honor the
//! presence masks; writes always emit every block with defaults filled in.

use std::io::{Read, Write};

use glam::{Vec2, Vec3};
use log::debug;
use ossein_graphics_core::{
    BinaryReader, BinaryWriter, Bone, BoneInfluence, FormatError, Material, MaterialTextures,
    Mesh, Model, Skeleton, Translator, TranslatorIo,
};

pub const MAGIC: [u8; 7] = *b"SEModel";
pub const VERSION: u16 = 1;
pub const HEADER_SIZE: u16 = 0x14;

// Top-level presence mask
const DATA_BONES: u8 = 1 << 0;
const DATA_MESHES: u8 = 1 << 1;
const DATA_MATERIALS: u8 = 1 << 2;

// Bone data presence mask
const BONE_WORLD: u8 = 1 << 0;
const BONE_LOCAL: u8 = 1 << 1;
const BONE_SCALE: u8 = 1 << 2;

// Mesh data presence mask
const MESH_UVS: u8 = 1 << 0;
const MESH_NORMALS: u8 = 1 << 1;
const MESH_COLORS: u8 = 1 << 2;
const MESH_WEIGHTS: u8 = 1 << 3;

fn table_len(count: i32) -> Result<usize, FormatError> {
    usize::try_from(count).map_err(|_| FormatError::NegativeCount { found: count })
}

/// Translator for `.semodel` files.
#[derive(Default)]
pub struct SeModelTranslator;

impl Translator for SeModelTranslator {
    fn name(&self) -> &'static str {
        "semodel"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".semodel"]
    }

    fn is_valid(&self, start_of_file: &[u8], _extension: Option<&str>) -> bool {
        start_of_file.starts_with(&MAGIC)
    }

    fn read(&self, reader: &mut dyn Read, io: &mut TranslatorIo) -> Result<(), FormatError> {
        let model = read_model(&mut BinaryReader::new(reader), io.name_hint.as_deref())?;
        debug!(
            "read semodel '{}': {} bones, {} meshes, {} materials",
            model.name,
            model.skeleton.len(),
            model.meshes.len(),
            model.materials.len()
        );
        io.models.push(model);
        Ok(())
    }

    fn write(&self, writer: &mut dyn Write, io: &TranslatorIo) -> Result<(), FormatError> {
        let model = io
            .models
            .first()
            .ok_or(FormatError::NothingToWrite { what: "models" })?;
        write_model(&mut BinaryWriter::new(writer), model, io.scale)
    }
}

fn read_model<R: Read>(
    reader: &mut BinaryReader<R>,
    name_hint: Option<&str>,
) -> Result<Model, FormatError> {
    let magic = reader.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        return Err(FormatError::InvalidMagic { format: "semodel" });
    }
    let version = reader.read_u16()?;
    if version != VERSION {
        return Err(FormatError::InvalidVersion {
            format: "semodel",
            found: version,
        });
    }
    let header_size = reader.read_u16()?;
    if header_size != HEADER_SIZE {
        return Err(FormatError::InvalidHeaderSize {
            format: "semodel",
            found: header_size,
        });
    }

    let _data_presence = reader.read_u8()?;
    let bone_presence = reader.read_u8()?;
    let mesh_presence = reader.read_u8()?;
    let bone_count = table_len(reader.read_i32()?)?;
    let mesh_count = table_len(reader.read_i32()?)?;
    let material_count = table_len(reader.read_i32()?)?;
    reader.read_bytes(3)?; // reserved

    let mut model = Model::new(name_hint.unwrap_or("semodel"));
    model.skeleton = read_skeleton(reader, bone_count, bone_presence)?;
    for _ in 0..mesh_count {
        model.meshes.push(read_mesh(
            reader,
            mesh_presence,
            bone_count,
            material_count,
        )?);
    }
    for _ in 0..material_count {
        model.materials.push(read_material(reader)?);
    }
    Ok(model)
}

fn read_skeleton<R: Read>(
    reader: &mut BinaryReader<R>,
    bone_count: usize,
    presence: u8,
) -> Result<Skeleton, FormatError> {
    let mut names = Vec::with_capacity(bone_count);
    for _ in 0..bone_count {
        names.push(reader.read_cstring()?);
    }

    let mut bones = Vec::with_capacity(bone_count);
    for name in names {
        let flags = reader.read_u8()?;
        if flags != 0 {
            return Err(FormatError::ReservedFlag { found: flags });
        }

        let parent = reader.read_i32()?;
        let mut bone = Bone::new(name);
        if parent >= 0 {
            let index = parent as usize;
            if index >= bone_count {
                return Err(FormatError::IndexOutOfRange {
                    index,
                    len: bone_count,
                });
            }
            bone.parent = Some(index);
        } else if parent != -1 {
            return Err(FormatError::IndexOutOfRange {
                index: parent as usize,
                len: bone_count,
            });
        }

        if presence & BONE_WORLD != 0 {
            bone.base_world_translation = reader.read_vec3()?;
            bone.base_world_rotation = reader.read_quat()?;
        }
        if presence & BONE_LOCAL != 0 {
            bone.base_local_translation = reader.read_vec3()?;
            bone.base_local_rotation = reader.read_quat()?;
        }
        if presence & BONE_SCALE != 0 {
            bone.base_scale = reader.read_vec3()?;
        }
        bones.push(bone);
    }

    Ok(Skeleton::from_bones(bones)?)
}

fn read_mesh<R: Read>(
    reader: &mut BinaryReader<R>,
    presence: u8,
    bone_count: usize,
    material_count: usize,
) -> Result<Mesh, FormatError> {
    let flags = reader.read_u8()?;
    if flags != 0 {
        return Err(FormatError::ReservedFlag { found: flags });
    }

    let mut mesh = Mesh {
        uv_layer_count: usize::from(reader.read_u8()?),
        influences_per_vertex: usize::from(reader.read_u8()?),
        ..Mesh::default()
    };
    let vertex_count = table_len(reader.read_i32()?)?;
    let face_count = table_len(reader.read_i32()?)?;

    for _ in 0..vertex_count {
        mesh.positions.push(reader.read_vec3()?);
    }
    if presence & MESH_UVS != 0 {
        for _ in 0..vertex_count * mesh.uv_layer_count {
            mesh.uvs.push(Vec2::new(reader.read_f32()?, reader.read_f32()?));
        }
    }
    if presence & MESH_NORMALS != 0 {
        for _ in 0..vertex_count {
            mesh.normals.push(reader.read_vec3()?);
        }
    }
    if presence & MESH_COLORS != 0 {
        for _ in 0..vertex_count {
            let bytes = reader.read_bytes(4)?;
            mesh.colors.push([
                f32::from(bytes[0]) / 255.0,
                f32::from(bytes[1]) / 255.0,
                f32::from(bytes[2]) / 255.0,
                f32::from(bytes[3]) / 255.0,
            ]);
        }
    }
    if presence & MESH_WEIGHTS != 0 {
        for _ in 0..vertex_count * mesh.influences_per_vertex {
            let bone = reader.read_index(bone_count)?;
            if bone as usize >= bone_count {
                return Err(FormatError::IndexOutOfRange {
                    index: bone as usize,
                    len: bone_count,
                });
            }
            let weight = reader.read_f32()?;
            mesh.influences.push(BoneInfluence { bone, weight });
        }
    }

    for _ in 0..face_count {
        let mut face = [0u32; 3];
        for corner in &mut face {
            let index = reader.read_index(vertex_count)?;
            if index as usize >= vertex_count {
                return Err(FormatError::IndexOutOfRange {
                    index: index as usize,
                    len: vertex_count,
                });
            }
            *corner = index;
        }
        mesh.faces.push(face);
    }

    // One slot per UV layer; negative means no material assigned.
    for _ in 0..mesh.uv_layer_count {
        let index = reader.read_i32()?;
        if index >= 0 && index as usize >= material_count {
            return Err(FormatError::IndexOutOfRange {
                index: index as usize,
                len: material_count,
            });
        }
        mesh.material_indices.push(index);
    }

    Ok(mesh)
}

fn read_material<R: Read>(reader: &mut BinaryReader<R>) -> Result<Material, FormatError> {
    let name = reader.read_cstring()?;
    let has_textures = reader.read_u8()? != 0;
    let textures = if has_textures {
        Some(MaterialTextures {
            diffuse: reader.read_cstring()?,
            normal: reader.read_cstring()?,
            specular: reader.read_cstring()?,
        })
    } else {
        None
    };
    Ok(Material { name, textures })
}

fn write_model<W: Write>(
    writer: &mut BinaryWriter<W>,
    model: &Model,
    scale: f32,
) -> Result<(), FormatError> {
    writer.write_bytes(&MAGIC)?;
    writer.write_u16(VERSION)?;
    writer.write_u16(HEADER_SIZE)?;

    writer.write_u8(DATA_BONES | DATA_MESHES | DATA_MATERIALS)?;
    writer.write_u8(BONE_WORLD | BONE_LOCAL | BONE_SCALE)?;
    writer.write_u8(MESH_UVS | MESH_NORMALS | MESH_COLORS | MESH_WEIGHTS)?;
    writer.write_count_i32(model.skeleton.len())?;
    writer.write_count_i32(model.meshes.len())?;
    writer.write_count_i32(model.materials.len())?;
    writer.write_bytes(&[0, 0, 0])?; // reserved

    for bone in model.skeleton.bones() {
        writer.write_cstring(&bone.name)?;
    }
    for bone in model.skeleton.bones() {
        writer.write_u8(0)?;
        match bone.parent {
            Some(p) => writer.write_i32(p as i32)?,
            None => writer.write_i32(-1)?,
        }
        writer.write_vec3(bone.base_world_translation * scale)?;
        writer.write_quat(bone.base_world_rotation)?;
        writer.write_vec3(bone.base_local_translation * scale)?;
        writer.write_quat(bone.base_local_rotation)?;
        writer.write_vec3(bone.base_scale)?;
    }

    for mesh in &model.meshes {
        write_mesh(writer, mesh, model.skeleton.len(), scale)?;
    }

    for material in &model.materials {
        writer.write_cstring(&material.name)?;
        match &material.textures {
            Some(textures) => {
                writer.write_u8(1)?;
                writer.write_cstring(&textures.diffuse)?;
                writer.write_cstring(&textures.normal)?;
                writer.write_cstring(&textures.specular)?;
            }
            None => writer.write_u8(0)?,
        }
    }
    Ok(())
}

fn write_mesh<W: Write>(
    writer: &mut BinaryWriter<W>,
    mesh: &Mesh,
    bone_count: usize,
    scale: f32,
) -> Result<(), FormatError> {
    let vertex_count = mesh.vertex_count();

    writer.write_u8(0)?;
    writer.write_count_u8(mesh.uv_layer_count)?;
    writer.write_count_u8(mesh.influences_per_vertex)?;
    writer.write_count_i32(vertex_count)?;
    writer.write_count_i32(mesh.face_count())?;

    for &position in &mesh.positions {
        writer.write_vec3(position * scale)?;
    }
    for i in 0..vertex_count * mesh.uv_layer_count {
        let uv = mesh.uvs.get(i).copied().unwrap_or(Vec2::ZERO);
        writer.write_f32(uv.x)?;
        writer.write_f32(uv.y)?;
    }
    for i in 0..vertex_count {
        writer.write_vec3(mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO))?;
    }
    for i in 0..vertex_count {
        let color = mesh.colors.get(i).copied().unwrap_or([1.0; 4]);
        for channel in color {
            writer.write_u8((channel.clamp(0.0, 1.0) * 255.0).round() as u8)?;
        }
    }
    for i in 0..vertex_count * mesh.influences_per_vertex {
        let influence = mesh
            .influences
            .get(i)
            .copied()
            .unwrap_or(BoneInfluence { bone: 0, weight: 0.0 });
        writer.write_index(influence.bone, bone_count)?;
        writer.write_f32(influence.weight)?;
    }
    for face in &mesh.faces {
        for &corner in face {
            writer.write_index(corner, vertex_count)?;
        }
    }
    for i in 0..mesh.uv_layer_count {
        writer.write_i32(mesh.material_indices.get(i).copied().unwrap_or(-1))?;
    }
    Ok(())
}
