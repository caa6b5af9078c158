//! bootscr Library
//!
//! Parses U-Boot legacy uImage boot scripts (`boot.scr`) and rebuilds them
//! into byte-exact, checksum-valid containers.

pub mod codec;
pub mod output;
pub mod script;

pub use codec::{
    build_image, build_image_with_timestamp, crc32, parse_image, HeaderDefaults, ImageHeader,
    ParseError, ParseWarning, ParsedImage,
};
pub use script::BootScript;
