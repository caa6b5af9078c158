//! Legacy uImage header structures and codec errors.

use thiserror::Error;

/// Magic number at offset 0 of every legacy uImage.
pub const IMAGE_MAGIC: u32 = 0x2705_1956;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 64;

/// Length of the NUL-padded name field.
pub const NAME_LEN: usize = 32;

/// Size of the `[u32 len][u32 zero]` wrapper preceding the script bytes.
pub const WRAPPER_SIZE: usize = 8;

/// OS id for Linux (builder default).
pub const OS_LINUX: u8 = 5;

/// Architecture id for ARM (builder default).
pub const ARCH_ARM: u8 = 2;

/// Image type id for boot scripts.
pub const TYPE_SCRIPT: u8 = 6;

/// Compression id for uncompressed payloads (builder default).
pub const COMP_NONE: u8 = 0;

/// Errors that abort parsing. Structural only; checksum disagreements are
/// reported as [`ParseWarning`]s instead.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File too small: expected at least {expected} bytes, got {actual}")]
    TooSmall { expected: usize, actual: usize },

    #[error("Bad magic number: expected 0x{IMAGE_MAGIC:08X}, got 0x{found:08X}")]
    BadMagic { found: u32 },

    #[error("Payload overrun: header declares {declared} data bytes, only {available} available")]
    PayloadOverrun { declared: usize, available: usize },

    #[error("Payload too small for script wrapper: data size is {data_size} bytes, need at least {WRAPPER_SIZE}")]
    MissingWrapper { data_size: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal findings surfaced alongside a successful parse. The caller
/// decides how to present them; the codec never turns one into an error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseWarning {
    #[error("Header CRC mismatch: stored 0x{stored:08X}, computed 0x{computed:08X}")]
    HeaderCrcMismatch { stored: u32, computed: u32 },

    #[error("Data CRC mismatch: stored 0x{stored:08X}, computed 0x{computed:08X}")]
    DataCrcMismatch { stored: u32, computed: u32 },

    #[error("Script length mismatch: wrapper declares {declared} bytes, payload holds {actual}")]
    ScriptLengthMismatch { declared: u32, actual: u32 },
}

/// The 64-byte legacy uImage header. All multi-byte fields are big-endian on
/// the wire; enum ids stay raw `u8` so unknown values round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    pub magic: u32,
    pub header_crc: u32,
    pub timestamp: u32,
    pub data_size: u32,
    pub load_address: u32,
    pub entry_point: u32,
    pub data_crc: u32,
    pub os_type: u8,
    pub arch_type: u8,
    pub image_type: u8,
    pub compression_type: u8,
    pub name: [u8; NAME_LEN],
}

impl ImageHeader {
    /// Decode from the first 64 bytes of a buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < HEADER_SIZE {
            return Err(ParseError::TooSmall {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&data[32..64]);

        Ok(Self {
            magic: u32::from_be_bytes(data[0..4].try_into().unwrap()),
            header_crc: u32::from_be_bytes(data[4..8].try_into().unwrap()),
            timestamp: u32::from_be_bytes(data[8..12].try_into().unwrap()),
            data_size: u32::from_be_bytes(data[12..16].try_into().unwrap()),
            load_address: u32::from_be_bytes(data[16..20].try_into().unwrap()),
            entry_point: u32::from_be_bytes(data[20..24].try_into().unwrap()),
            data_crc: u32::from_be_bytes(data[24..28].try_into().unwrap()),
            os_type: data[28],
            arch_type: data[29],
            image_type: data[30],
            compression_type: data[31],
            name,
        })
    }

    /// Encode to the wire layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_be_bytes());
        buf[4..8].copy_from_slice(&self.header_crc.to_be_bytes());
        buf[8..12].copy_from_slice(&self.timestamp.to_be_bytes());
        buf[12..16].copy_from_slice(&self.data_size.to_be_bytes());
        buf[16..20].copy_from_slice(&self.load_address.to_be_bytes());
        buf[20..24].copy_from_slice(&self.entry_point.to_be_bytes());
        buf[24..28].copy_from_slice(&self.data_crc.to_be_bytes());
        buf[28] = self.os_type;
        buf[29] = self.arch_type;
        buf[30] = self.image_type;
        buf[31] = self.compression_type;
        buf[32..64].copy_from_slice(&self.name);
        buf
    }

    /// Image name with NUL padding and surrounding whitespace trimmed.
    pub fn name_str(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).trim().to_string()
    }
}

/// Long name for an OS id, for display only.
pub fn os_name(id: u8) -> &'static str {
    match id {
        1 => "OpenBSD",
        2 => "NetBSD",
        3 => "FreeBSD",
        5 => "Linux",
        14 => "VxWorks",
        16 => "QNX",
        17 => "U-Boot",
        18 => "RTEMS",
        _ => "Unknown OS",
    }
}

/// Long name for an architecture id, for display only.
pub fn arch_name(id: u8) -> &'static str {
    match id {
        2 => "ARM",
        3 => "Intel x86",
        5 => "MIPS",
        7 => "PowerPC",
        12 => "M68K",
        22 => "AArch64",
        24 => "AMD x86_64",
        26 => "RISC-V",
        _ => "Unknown Architecture",
    }
}

/// Long name for an image type id, for display only.
pub fn image_type_name(id: u8) -> &'static str {
    match id {
        1 => "Standalone Program",
        2 => "Kernel Image",
        3 => "RAMDisk Image",
        4 => "Multi-File Image",
        5 => "Firmware",
        6 => "Script",
        7 => "Filesystem Image",
        8 => "Flat Device Tree",
        _ => "Unknown Image",
    }
}

/// Long name for a compression id, for display only.
pub fn compression_name(id: u8) -> &'static str {
    match id {
        0 => "uncompressed",
        1 => "gzip compressed",
        2 => "bzip2 compressed",
        3 => "lzma compressed",
        4 => "lzo compressed",
        5 => "lz4 compressed",
        6 => "zstd compressed",
        _ => "unknown compression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> ImageHeader {
        let mut name = [0u8; NAME_LEN];
        name[..11].copy_from_slice(b"boot script");
        ImageHeader {
            magic: IMAGE_MAGIC,
            header_crc: 0,
            timestamp: 1_700_000_000,
            data_size: 0x1234,
            load_address: 0x8000_8000,
            entry_point: 0x8000_8000,
            data_crc: 0xDEAD_BEEF,
            os_type: OS_LINUX,
            arch_type: ARCH_ARM,
            image_type: TYPE_SCRIPT,
            compression_type: COMP_NONE,
            name,
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let hdr = sample_header();
        let bytes = hdr.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);

        let decoded = ImageHeader::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, hdr);
        assert_eq!(decoded.name_str(), "boot script");
    }

    #[test]
    fn wire_layout_offsets() {
        let hdr = sample_header();
        let bytes = hdr.to_bytes();
        assert_eq!(&bytes[0..4], &[0x27, 0x05, 0x19, 0x56]);
        assert_eq!(&bytes[12..16], &0x1234u32.to_be_bytes());
        assert_eq!(bytes[28], OS_LINUX);
        assert_eq!(bytes[29], ARCH_ARM);
        assert_eq!(bytes[30], TYPE_SCRIPT);
        assert_eq!(bytes[31], COMP_NONE);
        assert_eq!(&bytes[32..43], b"boot script");
        assert!(bytes[43..64].iter().all(|&b| b == 0));
    }

    #[test]
    fn short_buffer_rejected() {
        let err = ImageHeader::from_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, ParseError::TooSmall { expected: 64, actual: 10 }));
    }

    #[test]
    fn name_trims_padding_and_whitespace() {
        let mut hdr = sample_header();
        hdr.name = [0u8; NAME_LEN];
        hdr.name[..7].copy_from_slice(b"  abc  ");
        assert_eq!(hdr.name_str(), "abc");
    }
}
