//! Editable boot script extracted from a uImage container.

use std::io;
use std::path::Path;

use crate::codec::{
    build_image, build_image_with_timestamp, parse_image, HeaderDefaults, ImageHeader, ParseError,
    ParseWarning,
};

/// A boot script together with the header metadata of the container it came
/// from. Editing happens on the text; serializing produces a fresh,
/// checksum-valid container that inherits the original metadata.
#[derive(Debug, Clone)]
pub struct BootScript {
    text: String,
    header: Option<ImageHeader>,
    warnings: Vec<ParseWarning>,
}

impl BootScript {
    /// Start a new script from plain text, with no container to inherit
    /// metadata from.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            header: None,
            warnings: Vec::new(),
        }
    }

    /// Parse from raw container bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let parsed = parse_image(bytes)?;
        Ok(Self {
            text: parsed.script_text,
            header: Some(parsed.header),
            warnings: parsed.warnings,
        })
    }

    /// Read and parse a container file.
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// The script text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the script text; header metadata is untouched until rebuild.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Header of the container this script was parsed from, if any.
    pub fn header(&self) -> Option<&ImageHeader> {
        self.header.as_ref()
    }

    /// Warnings collected while parsing.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Rebuild a complete container, stamped with the current time.
    /// Metadata comes from the parsed header when present, else `defaults`.
    pub fn to_bytes(&self, defaults: &HeaderDefaults) -> Vec<u8> {
        build_image(&self.text, self.header.as_ref(), defaults)
    }

    /// Rebuild with an explicit timestamp, for reproducible output.
    pub fn to_bytes_with_timestamp(&self, defaults: &HeaderDefaults, timestamp: u32) -> Vec<u8> {
        build_image_with_timestamp(&self.text, self.header.as_ref(), defaults, timestamp)
    }

    /// Rebuild and write the container to a file.
    pub fn write_to(&self, path: &Path, defaults: &HeaderDefaults) -> io::Result<()> {
        std::fs::write(path, self.to_bytes(defaults))
    }
}
