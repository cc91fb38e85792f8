//! Little-endian primitives shared by the binary codec crates.
//!
//! Covers the two conventions the containers rely on:
//!
//! * variable-width indices, sized by the count of the table they index
//!   (u8 up to 255 entries, u16 up to 65535, u32 beyond);
//! * legacy null-terminated strings, one byte per character with no
//!   multi-byte encoding (bytes above 0x7F map to the matching U+00..FF
//!   code point).

use std::io::{ErrorKind, Read, Write};

use glam::{Quat, Vec3};

use crate::error::FormatError;

pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), FormatError> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                FormatError::Truncated
            } else {
                FormatError::Io(e)
            }
        })
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, FormatError> {
        let mut buf = vec![0u8; count];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_i32(&mut self) -> Result<i32, FormatError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    pub fn read_f32(&mut self) -> Result<f32, FormatError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    pub fn read_f64(&mut self) -> Result<f64, FormatError> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3, FormatError> {
        Ok(Vec3::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    pub fn read_quat(&mut self) -> Result<Quat, FormatError> {
        Ok(Quat::from_xyzw(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// Reads an index whose width depends on the size of the table it
    /// points into.
    pub fn read_index(&mut self, table_len: usize) -> Result<u32, FormatError> {
        if table_len <= 0xFF {
            Ok(u32::from(self.read_u8()?))
        } else if table_len <= 0xFFFF {
            Ok(u32::from(self.read_u16()?))
        } else {
            self.read_u32()
        }
    }

    /// Reads a null-terminated legacy string, one byte per character.
    pub fn read_cstring(&mut self) -> Result<String, FormatError> {
        let mut out = String::new();
        loop {
            let byte = self.read_u8()?;
            if byte == 0 {
                return Ok(out);
            }
            out.push(char::from(byte));
        }
    }
}

pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), FormatError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_vec3(&mut self, value: Vec3) -> Result<(), FormatError> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)?;
        self.write_f32(value.z)
    }

    pub fn write_quat(&mut self, value: Quat) -> Result<(), FormatError> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)?;
        self.write_f32(value.z)?;
        self.write_f32(value.w)
    }

    /// Writes an index at the width implied by its table size.
    pub fn write_index(&mut self, value: u32, table_len: usize) -> Result<(), FormatError> {
        if table_len <= 0xFF {
            self.write_u8(value as u8)
        } else if table_len <= 0xFFFF {
            self.write_u16(value as u16)
        } else {
            self.write_u32(value)
        }
    }

    /// Writes a table length as a signed 32-bit count.
    pub fn write_count_i32(&mut self, count: usize) -> Result<(), FormatError> {
        let value =
            i32::try_from(count).map_err(|_| FormatError::CapacityExceeded { count })?;
        self.write_i32(value)
    }

    /// Writes a count that must fit one byte.
    pub fn write_count_u8(&mut self, count: usize) -> Result<(), FormatError> {
        let value =
            u8::try_from(count).map_err(|_| FormatError::CapacityExceeded { count })?;
        self.write_u8(value)
    }

    /// Writes a null-terminated legacy string. Characters above U+00FF have
    /// no byte representation and degrade to `?`.
    pub fn write_cstring(&mut self, value: &str) -> Result<(), FormatError> {
        for c in value.chars() {
            let code = c as u32;
            self.write_u8(if code <= 0xFF { code as u8 } else { b'?' })?;
        }
        self.write_u8(0)
    }
}
