//! The codec surface: translators move payloads between byte streams and
//! the in-memory containers.

use std::io::{Read, Write};

use log::debug;

use crate::animation::Animation;
use crate::error::FormatError;
use crate::model::Model;
use crate::skeleton::Skeleton;

/// Shared payload container passed through reads and writes. A translator
/// appends what it parsed; on write it consumes what it supports and leaves
/// the rest untouched.
pub struct TranslatorIo {
    pub models: Vec<Model>,
    pub animations: Vec<Animation>,
    pub skeletons: Vec<Skeleton>,
    /// Uniform unit-conversion factor applied to translations on write.
    pub scale: f32,
    /// Name hint for parsed payloads, usually the source file stem.
    pub name_hint: Option<String>,
}

impl Default for TranslatorIo {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            animations: Vec::new(),
            skeletons: Vec::new(),
            scale: 1.0,
            name_hint: None,
        }
    }
}

impl TranslatorIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

/// One binary container format.
pub trait Translator {
    fn name(&self) -> &'static str;

    /// File extensions this translator claims, with the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    fn supports_reading(&self) -> bool {
        true
    }

    fn supports_writing(&self) -> bool {
        true
    }

    /// Cheap sniff over the first bytes of a file (and optionally its
    /// extension); never reads the stream.
    fn is_valid(&self, start_of_file: &[u8], extension: Option<&str>) -> bool;

    fn read(&self, reader: &mut dyn Read, io: &mut TranslatorIo) -> Result<(), FormatError>;

    fn write(&self, writer: &mut dyn Write, io: &TranslatorIo) -> Result<(), FormatError>;
}

/// Registry of available translators, matched by content sniffing.
#[derive(Default)]
pub struct TranslatorRegistry {
    translators: Vec<Box<dyn Translator>>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, translator: Box<dyn Translator>) {
        debug!("registered translator '{}'", translator.name());
        self.translators.push(translator);
    }

    pub fn translators(&self) -> impl Iterator<Item = &dyn Translator> {
        self.translators.iter().map(AsRef::as_ref)
    }

    /// First registered translator that claims the given file start.
    pub fn find_for(
        &self,
        start_of_file: &[u8],
        extension: Option<&str>,
    ) -> Option<&dyn Translator> {
        self.translators
            .iter()
            .map(AsRef::as_ref)
            .find(|t| t.is_valid(start_of_file, extension))
    }

    /// First registered translator claiming an extension, for write paths
    /// where no content exists to sniff.
    pub fn find_by_extension(&self, extension: &str) -> Option<&dyn Translator> {
        self.translators
            .iter()
            .map(AsRef::as_ref)
            .find(|t| t.extensions().iter().any(|e| e.eq_ignore_ascii_case(extension)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake(&'static [u8]);

    impl Translator for Fake {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &[".fake"]
        }

        fn is_valid(&self, start_of_file: &[u8], _extension: Option<&str>) -> bool {
            start_of_file.starts_with(self.0)
        }

        fn read(&self, _reader: &mut dyn Read, _io: &mut TranslatorIo) -> Result<(), FormatError> {
            Ok(())
        }

        fn write(&self, _writer: &mut dyn Write, _io: &TranslatorIo) -> Result<(), FormatError> {
            Ok(())
        }
    }

    #[test]
    fn registry_matches_by_content() {
        let mut registry = TranslatorRegistry::new();
        registry.register(Box::new(Fake(b"AAA")));
        registry.register(Box::new(Fake(b"BBB")));

        assert!(registry.find_for(b"AAAxyz", None).is_some());
        assert!(registry.find_for(b"CCC", None).is_none());
        assert!(registry.find_by_extension(".FAKE").is_some());
        assert!(registry.find_by_extension(".other").is_none());
        assert_eq!(registry.translators().count(), 2);
    }
}
