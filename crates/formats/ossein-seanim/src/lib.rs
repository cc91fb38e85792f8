//! SEAnim binary container codec.
//!
//! Little-endian layout: a 6-byte magic, version and header-size words, the
//! animation type byte, channel/property flag bytes, framerate and table
//! counts, bone names as null-terminated legacy strings, per-bone transform
//! type modifiers, per-bone keyed channels with variable-width frame
//! indices, then a trailing notetrack table. Key values are stored as f32;
//! files written with the double-precision property flag read fine and
//! narrow to f32.

use std::io::{Read, Write};

use log::debug;
use ossein_graphics_core::{
    Animation, BinaryReader, BinaryWriter, FormatError, SkeletonAnimation, TransformSpace,
    TransformType, Translator, TranslatorIo,
};

pub const MAGIC: [u8; 6] = *b"SEAnim";
pub const VERSION: u16 = 1;
pub const HEADER_SIZE: u16 = 0x1C;

// Channel presence flags
const DATA_TRANSLATION: u8 = 1 << 0;
const DATA_ROTATION: u8 = 1 << 1;
const DATA_SCALE: u8 = 1 << 2;
const DATA_NOTETRACKS: u8 = 1 << 6;

// Property flags
const PROPERTY_HIGH_PRECISION: u8 = 1 << 0;

fn transform_type_from_byte(byte: u8) -> Result<TransformType, FormatError> {
    match byte {
        0 => Ok(TransformType::Absolute),
        1 => Ok(TransformType::Additive),
        2 => Ok(TransformType::Relative),
        found => Err(FormatError::UnknownTransformType { found }),
    }
}

fn transform_type_to_byte(transform_type: TransformType) -> u8 {
    match transform_type {
        TransformType::Additive => 1,
        TransformType::Relative => 2,
        _ => 0,
    }
}

fn table_len(count: i32) -> Result<usize, FormatError> {
    usize::try_from(count).map_err(|_| FormatError::NegativeCount { found: count })
}

/// Key counts share the index width chosen by the frame count; a count past
/// that width (duplicate or fractional key times) cannot be represented.
fn check_key_capacity(count: usize, frame_count: usize) -> Result<(), FormatError> {
    let max = if frame_count <= 0xFF {
        0xFF
    } else if frame_count <= 0xFFFF {
        0xFFFF
    } else {
        u32::MAX as usize
    };
    if count > max {
        return Err(FormatError::CapacityExceeded { count });
    }
    Ok(())
}

/// Translator for `.seanim` files.
#[derive(Default)]
pub struct SeAnimTranslator;

impl Translator for SeAnimTranslator {
    fn name(&self) -> &'static str {
        "seanim"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".seanim"]
    }

    fn is_valid(&self, start_of_file: &[u8], _extension: Option<&str>) -> bool {
        start_of_file.starts_with(&MAGIC)
    }

    fn read(&self, reader: &mut dyn Read, io: &mut TranslatorIo) -> Result<(), FormatError> {
        let animation = read_animation(&mut BinaryReader::new(reader), io.name_hint.as_deref())?;
        debug!(
            "read seanim '{}': {} targets, {} frames, {} action occurrences",
            animation.name,
            animation.target_count(),
            animation.frame_count(),
            animation.action_count()
        );
        io.animations.push(animation);
        Ok(())
    }

    fn write(&self, writer: &mut dyn Write, io: &TranslatorIo) -> Result<(), FormatError> {
        let animation = io
            .animations
            .first()
            .ok_or(FormatError::NothingToWrite { what: "animations" })?;
        write_animation(&mut BinaryWriter::new(writer), animation, io.scale)
    }
}

fn read_animation<R: Read>(
    reader: &mut BinaryReader<R>,
    name_hint: Option<&str>,
) -> Result<Animation, FormatError> {
    let magic = reader.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        return Err(FormatError::InvalidMagic { format: "seanim" });
    }
    let version = reader.read_u16()?;
    if version != VERSION {
        return Err(FormatError::InvalidVersion {
            format: "seanim",
            found: version,
        });
    }
    let header_size = reader.read_u16()?;
    if header_size != HEADER_SIZE {
        return Err(FormatError::InvalidHeaderSize {
            format: "seanim",
            found: header_size,
        });
    }

    let transform_type = transform_type_from_byte(reader.read_u8()?)?;
    let _anim_flags = reader.read_u8()?;
    let data_flags = reader.read_u8()?;
    let property_flags = reader.read_u8()?;
    let high_precision = property_flags & PROPERTY_HIGH_PRECISION != 0;
    reader.read_u16()?; // reserved

    let framerate = reader.read_f32()?;
    let frame_count = table_len(reader.read_i32()?)?;
    let bone_count = table_len(reader.read_i32()?)?;
    let modifier_count = usize::from(reader.read_u8()?);
    reader.read_u8()?; // reserved
    reader.read_u16()?; // reserved
    let action_count = table_len(reader.read_i32()?)?;

    let mut animation = Animation::new(name_hint.unwrap_or("seanim"));
    animation.framerate = framerate;

    let mut sa = SkeletonAnimation::new(None);
    sa.transform_type = transform_type;
    sa.transform_space = TransformSpace::Local;
    let mut names = Vec::with_capacity(bone_count);
    for _ in 0..bone_count {
        names.push(reader.read_cstring()?);
    }
    for name in &names {
        sa.create_target(name);
    }

    for _ in 0..modifier_count {
        let index = reader.read_index(bone_count)? as usize;
        if index >= bone_count {
            return Err(FormatError::IndexOutOfRange {
                index,
                len: bone_count,
            });
        }
        sa.targets[index].transform_type = transform_type_from_byte(reader.read_u8()?)?;
    }

    let mut read_value = |reader: &mut BinaryReader<R>| -> Result<f32, FormatError> {
        if high_precision {
            Ok(reader.read_f64()? as f32)
        } else {
            reader.read_f32()
        }
    };

    for index in 0..bone_count {
        let flags = reader.read_u8()?;
        if flags != 0 {
            return Err(FormatError::ReservedFlag { found: flags });
        }
        let target = &mut sa.targets[index];

        if data_flags & DATA_TRANSLATION != 0 {
            let key_count = reader.read_index(frame_count)?;
            for _ in 0..key_count {
                let frame = reader.read_index(frame_count)? as f32;
                let value = glam::Vec3::new(
                    read_value(reader)?,
                    read_value(reader)?,
                    read_value(reader)?,
                );
                target.add_translation_frame(frame, value);
            }
        }
        if data_flags & DATA_ROTATION != 0 {
            let key_count = reader.read_index(frame_count)?;
            for _ in 0..key_count {
                let frame = reader.read_index(frame_count)? as f32;
                let value = glam::Quat::from_xyzw(
                    read_value(reader)?,
                    read_value(reader)?,
                    read_value(reader)?,
                    read_value(reader)?,
                );
                target.add_rotation_frame(frame, value);
            }
        }
        if data_flags & DATA_SCALE != 0 {
            let key_count = reader.read_index(frame_count)?;
            for _ in 0..key_count {
                let frame = reader.read_index(frame_count)? as f32;
                let value = glam::Vec3::new(
                    read_value(reader)?,
                    read_value(reader)?,
                    read_value(reader)?,
                );
                target.add_scale_frame(frame, value);
            }
        }
    }
    animation.skeleton_animation = Some(sa);

    for _ in 0..action_count {
        let frame = reader.read_index(frame_count)? as f32;
        let name = reader.read_cstring()?;
        animation.create_action(&name).frames.push(frame);
    }

    Ok(animation)
}

fn write_animation<W: Write>(
    writer: &mut BinaryWriter<W>,
    animation: &Animation,
    scale: f32,
) -> Result<(), FormatError> {
    let empty = SkeletonAnimation::new(None);
    let sa = animation.skeleton_animation.as_ref().unwrap_or(&empty);
    let bone_count = sa.targets.len();
    let frame_count = animation.frame_count() as usize;

    let mut data_flags = 0u8;
    if animation.has_translation_frames() {
        data_flags |= DATA_TRANSLATION;
    }
    if animation.has_rotation_frames() {
        data_flags |= DATA_ROTATION;
    }
    if animation.has_scale_frames() {
        data_flags |= DATA_SCALE;
    }
    if !animation.actions.is_empty() {
        data_flags |= DATA_NOTETRACKS;
    }

    let modifiers: Vec<(usize, TransformType)> = sa
        .targets
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.transform_type != TransformType::Parent && t.transform_type != sa.transform_type
        })
        .map(|(i, t)| (i, t.transform_type))
        .collect();

    writer.write_bytes(&MAGIC)?;
    writer.write_u16(VERSION)?;
    writer.write_u16(HEADER_SIZE)?;
    writer.write_u8(transform_type_to_byte(sa.transform_type))?;
    writer.write_u8(0)?; // anim flags, reserved
    writer.write_u8(data_flags)?;
    writer.write_u8(0)?; // property flags, keys stay f32
    writer.write_u16(0)?; // reserved
    writer.write_f32(animation.framerate)?;
    writer.write_count_i32(frame_count)?;
    writer.write_count_i32(bone_count)?;
    writer.write_count_u8(modifiers.len())?;
    writer.write_u8(0)?; // reserved
    writer.write_u16(0)?; // reserved
    writer.write_count_i32(animation.action_count())?;

    for target in &sa.targets {
        // Legacy consumers treat dots as hierarchy separators.
        writer.write_cstring(&target.bone_name.replace('.', "_"))?;
    }

    for (index, transform_type) in &modifiers {
        writer.write_index(*index as u32, bone_count)?;
        writer.write_u8(transform_type_to_byte(*transform_type))?;
    }

    for target in &sa.targets {
        writer.write_u8(0)?; // reserved

        if data_flags & DATA_TRANSLATION != 0 {
            let frames = target.translation_frames.as_deref().unwrap_or(&[]);
            check_key_capacity(frames.len(), frame_count)?;
            writer.write_index(frames.len() as u32, frame_count)?;
            for frame in frames {
                writer.write_index(frame.time as u32, frame_count)?;
                writer.write_vec3(frame.value * scale)?;
            }
        }
        if data_flags & DATA_ROTATION != 0 {
            let frames = target.rotation_frames.as_deref().unwrap_or(&[]);
            check_key_capacity(frames.len(), frame_count)?;
            writer.write_index(frames.len() as u32, frame_count)?;
            for frame in frames {
                writer.write_index(frame.time as u32, frame_count)?;
                writer.write_quat(frame.value)?;
            }
        }
        if data_flags & DATA_SCALE != 0 {
            let frames = target.scale_frames.as_deref().unwrap_or(&[]);
            check_key_capacity(frames.len(), frame_count)?;
            writer.write_index(frames.len() as u32, frame_count)?;
            for frame in frames {
                writer.write_index(frame.time as u32, frame_count)?;
                writer.write_vec3(frame.value)?;
            }
        }
    }

    for action in &animation.actions {
        for &frame in &action.frames {
            writer.write_index(frame as u32, frame_count)?;
            writer.write_cstring(&action.name)?;
        }
    }

    Ok(())
}
