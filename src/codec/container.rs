//! Container layer: parse and rebuild the full uImage (header + wrapped
//! script payload).

use std::time::{SystemTime, UNIX_EPOCH};

use super::crc::crc32;
use super::header::{
    ImageHeader, ParseError, ParseWarning, ARCH_ARM, COMP_NONE, HEADER_SIZE, IMAGE_MAGIC, NAME_LEN,
    OS_LINUX, TYPE_SCRIPT, WRAPPER_SIZE,
};

/// Result of a successful parse. Holds no raw bytes beyond the decoded
/// header fields and script text.
#[derive(Debug, Clone)]
pub struct ParsedImage {
    pub header: ImageHeader,
    pub script_text: String,
    /// Non-fatal findings (checksum or wrapper-length disagreements).
    pub warnings: Vec<ParseWarning>,
}

/// Fallback header metadata used by the builder when no previous header is
/// available to inherit from.
#[derive(Debug, Clone)]
pub struct HeaderDefaults {
    pub name: String,
    pub load_address: u32,
    pub entry_point: u32,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            name: "boot script".to_string(),
            load_address: 0,
            entry_point: 0,
        }
    }
}

/// Parse a complete uImage buffer into header metadata and script text.
///
/// Structural violations (size, magic, bounds) are fatal. Checksum
/// disagreements are not: a corrupt-checksum file may still hold an editable
/// script, so they come back as warnings and the parse succeeds.
pub fn parse_image(data: &[u8]) -> Result<ParsedImage, ParseError> {
    let header = ImageHeader::from_bytes(data)?;

    if header.magic != IMAGE_MAGIC {
        return Err(ParseError::BadMagic { found: header.magic });
    }

    let data_size = header.data_size as usize;
    if HEADER_SIZE + data_size > data.len() {
        return Err(ParseError::PayloadOverrun {
            declared: data_size,
            available: data.len() - HEADER_SIZE,
        });
    }
    if data_size < WRAPPER_SIZE {
        return Err(ParseError::MissingWrapper { data_size });
    }

    let payload = &data[HEADER_SIZE..HEADER_SIZE + data_size];
    let mut warnings = Vec::new();

    // Header CRC is computed with its own field zeroed.
    let mut header_bytes = header.to_bytes();
    header_bytes[4..8].copy_from_slice(&0u32.to_be_bytes());
    let computed_hcrc = crc32(&header_bytes);
    if computed_hcrc != header.header_crc {
        warnings.push(ParseWarning::HeaderCrcMismatch {
            stored: header.header_crc,
            computed: computed_hcrc,
        });
    }

    let computed_dcrc = crc32(payload);
    if computed_dcrc != header.data_crc {
        warnings.push(ParseWarning::DataCrcMismatch {
            stored: header.data_crc,
            computed: computed_dcrc,
        });
    }

    let declared_len = u32::from_be_bytes(payload[0..4].try_into().unwrap());
    let actual_len = (data_size - WRAPPER_SIZE) as u32;
    if declared_len != actual_len {
        warnings.push(ParseWarning::ScriptLengthMismatch {
            declared: declared_len,
            actual: actual_len,
        });
    }

    // Malformed UTF-8 decodes lossily: the hard contract is round-trip of
    // header metadata, not input sanitization.
    let script_text = String::from_utf8_lossy(&payload[WRAPPER_SIZE..]).into_owned();

    Ok(ParsedImage {
        header,
        script_text,
        warnings,
    })
}

/// Build a complete uImage from script text, stamped with the current time.
///
/// Header metadata comes from `previous` field-by-field when present,
/// otherwise from `defaults` (addresses, name) or the standard script-image
/// ids (Linux/ARM/script/uncompressed).
pub fn build_image(
    script_text: &str,
    previous: Option<&ImageHeader>,
    defaults: &HeaderDefaults,
) -> Vec<u8> {
    build_image_with_timestamp(script_text, previous, defaults, unix_now())
}

/// Same as [`build_image`] with an explicit timestamp, so repeated builds of
/// identical input are byte-identical.
pub fn build_image_with_timestamp(
    script_text: &str,
    previous: Option<&ImageHeader>,
    defaults: &HeaderDefaults,
    timestamp: u32,
) -> Vec<u8> {
    let script = script_text.as_bytes();

    let mut payload = Vec::with_capacity(WRAPPER_SIZE + script.len());
    payload.extend_from_slice(&(script.len() as u32).to_be_bytes());
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.extend_from_slice(script);

    let mut header = merge_header(previous, defaults);
    header.timestamp = timestamp;
    header.data_size = payload.len() as u32;
    header.data_crc = crc32(&payload);

    // Header CRC is computed over the header with the CRC field zeroed,
    // then patched in.
    header.header_crc = 0;
    header.header_crc = crc32(&header.to_bytes());

    let mut image = Vec::with_capacity(HEADER_SIZE + payload.len());
    image.extend_from_slice(&header.to_bytes());
    image.extend_from_slice(&payload);
    image
}

/// Field-by-field merge of inherited metadata over defaults. Size, CRC and
/// timestamp fields are filled in by the builder afterwards.
fn merge_header(previous: Option<&ImageHeader>, defaults: &HeaderDefaults) -> ImageHeader {
    match previous {
        Some(prev) => ImageHeader {
            magic: IMAGE_MAGIC,
            header_crc: 0,
            timestamp: 0,
            data_size: 0,
            load_address: prev.load_address,
            entry_point: prev.entry_point,
            data_crc: 0,
            os_type: prev.os_type,
            arch_type: prev.arch_type,
            image_type: prev.image_type,
            compression_type: prev.compression_type,
            name: prev.name,
        },
        None => ImageHeader {
            magic: IMAGE_MAGIC,
            header_crc: 0,
            timestamp: 0,
            data_size: 0,
            load_address: defaults.load_address,
            entry_point: defaults.entry_point,
            data_crc: 0,
            os_type: OS_LINUX,
            arch_type: ARCH_ARM,
            image_type: TYPE_SCRIPT,
            compression_type: COMP_NONE,
            name: encode_name(&defaults.name),
        },
    }
}

/// Encode a name into the fixed 32-byte field: truncated at 32 bytes,
/// zero-padded when shorter.
pub fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut field = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: u32 = 1_700_000_000;

    fn defaults() -> HeaderDefaults {
        HeaderDefaults {
            name: "boot script".to_string(),
            load_address: 0,
            entry_point: 0,
        }
    }

    #[test]
    fn build_then_parse_roundtrip() {
        let text = "setenv bootargs console=ttyS0\nbootm 0x82000000\n";
        let image = build_image_with_timestamp(text, None, &defaults(), TS);

        let parsed = parse_image(&image).unwrap();
        assert_eq!(parsed.script_text, text);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.header.timestamp, TS);
        assert_eq!(parsed.header.data_size as usize, WRAPPER_SIZE + text.len());
        assert_eq!(parsed.header.name_str(), "boot script");
    }

    #[test]
    fn roundtrip_preserves_previous_metadata() {
        let first = build_image_with_timestamp("echo one", None, &defaults(), TS);
        let mut prev = parse_image(&first).unwrap().header;
        prev.load_address = 0x4300_0000;
        prev.entry_point = 0x4300_0040;
        prev.os_type = 17; // U-Boot
        prev.name = encode_name("custom name");

        let rebuilt = build_image_with_timestamp("echo two", Some(&prev), &defaults(), TS + 5);
        let parsed = parse_image(&rebuilt).unwrap();
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.script_text, "echo two");
        assert_eq!(parsed.header.load_address, 0x4300_0000);
        assert_eq!(parsed.header.entry_point, 0x4300_0040);
        assert_eq!(parsed.header.os_type, 17);
        assert_eq!(parsed.header.arch_type, prev.arch_type);
        assert_eq!(parsed.header.image_type, TYPE_SCRIPT);
        assert_eq!(parsed.header.compression_type, COMP_NONE);
        assert_eq!(parsed.header.name_str(), "custom name");
    }

    #[test]
    fn default_fallback_without_previous_header() {
        let image = build_image_with_timestamp("x", None, &defaults(), TS);
        let header = parse_image(&image).unwrap().header;
        assert_eq!(header.os_type, OS_LINUX);
        assert_eq!(header.arch_type, ARCH_ARM);
        assert_eq!(header.image_type, TYPE_SCRIPT);
        assert_eq!(header.compression_type, COMP_NONE);
        assert_eq!(header.load_address, 0);
        assert_eq!(header.entry_point, 0);
        assert_eq!(header.name_str(), "boot script");
    }

    #[test]
    fn too_small_rejected() {
        let err = parse_image(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, ParseError::TooSmall { .. }));
    }

    #[test]
    fn bad_magic_rejected() {
        let image = vec![0u8; 128];
        let err = parse_image(&image).unwrap_err();
        assert!(matches!(err, ParseError::BadMagic { found: 0 }));
    }

    #[test]
    fn payload_overrun_rejected() {
        let mut image = build_image_with_timestamp("echo hi", None, &defaults(), TS);
        // Declare more data than the buffer holds.
        image[12..16].copy_from_slice(&1024u32.to_be_bytes());
        let err = parse_image(&image).unwrap_err();
        assert!(matches!(err, ParseError::PayloadOverrun { declared: 1024, .. }));
    }

    #[test]
    fn missing_wrapper_rejected() {
        let mut image = build_image_with_timestamp("echo hi", None, &defaults(), TS);
        image[12..16].copy_from_slice(&4u32.to_be_bytes());
        let err = parse_image(&image).unwrap_err();
        assert!(matches!(err, ParseError::MissingWrapper { data_size: 4 }));
    }

    #[test]
    fn corrupt_data_crc_warns_but_parses() {
        let text = "run bootcmd";
        let mut image = build_image_with_timestamp(text, None, &defaults(), TS);
        image[24] ^= 0x01; // flip one bit in the stored data CRC

        let parsed = parse_image(&image).unwrap();
        assert_eq!(parsed.script_text, text);
        // The flipped bit also invalidates the header CRC, which covers
        // the stored data CRC field.
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::DataCrcMismatch { .. })));
        assert!(parsed
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::HeaderCrcMismatch { .. })));
    }

    #[test]
    fn corrupt_payload_warns_once() {
        let text = "run bootcmd";
        let mut image = build_image_with_timestamp(text, None, &defaults(), TS);
        let last = image.len() - 1;
        image[last] ^= 0x01; // corrupt the script body, header stays intact

        let parsed = parse_image(&image).unwrap();
        assert_eq!(parsed.warnings.len(), 1);
        assert!(matches!(
            parsed.warnings[0],
            ParseWarning::DataCrcMismatch { .. }
        ));
    }

    #[test]
    fn wrapper_length_mismatch_warns() {
        let mut image = build_image_with_timestamp("abcdef", None, &defaults(), TS);
        // Shrink the wrapper's declared length without touching data_size.
        image[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&2u32.to_be_bytes());

        let parsed = parse_image(&image).unwrap();
        assert!(parsed.warnings.iter().any(|w| matches!(
            w,
            ParseWarning::ScriptLengthMismatch {
                declared: 2,
                actual: 6
            }
        )));
        // Script text still spans the whole payload area past the wrapper.
        assert_eq!(parsed.script_text, "abcdef");
    }

    #[test]
    fn idempotent_rebuild() {
        let a = build_image_with_timestamp("echo hi", None, &defaults(), TS);
        let b = build_image_with_timestamp("echo hi", None, &defaults(), TS);
        assert_eq!(a, b);
    }

    #[test]
    fn utf8_script_roundtrip() {
        let text = "echo Grüße aus dem Bootloader — ✓\n";
        let image = build_image_with_timestamp(text, None, &defaults(), TS);
        let parsed = parse_image(&image).unwrap();
        assert_eq!(parsed.script_text, text);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn lossy_decode_of_malformed_script_bytes() {
        let image = build_image_with_timestamp("abc", None, &defaults(), TS);
        let mut raw = image.clone();
        let last = raw.len() - 1;
        raw[last] = 0xFF; // invalid UTF-8 in the script body

        let parsed = parse_image(&raw).unwrap();
        assert_eq!(parsed.script_text, "ab\u{FFFD}");
        assert!(parsed
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::DataCrcMismatch { .. })));
    }

    #[test]
    fn name_truncated_to_field_width() {
        let long = "a name well beyond the thirty-two byte limit";
        let image = build_image_with_timestamp(
            "x",
            None,
            &HeaderDefaults {
                name: long.to_string(),
                load_address: 0,
                entry_point: 0,
            },
            TS,
        );
        let header = parse_image(&image).unwrap().header;
        assert_eq!(header.name_str(), &long[..NAME_LEN]);

        // Same truncation when the name rides in via a previous header.
        let rebuilt = build_image_with_timestamp("x", Some(&header), &defaults(), TS);
        assert_eq!(parse_image(&rebuilt).unwrap().header.name_str(), &long[..NAME_LEN]);
    }

    #[test]
    fn empty_script_builds_valid_image() {
        let image = build_image_with_timestamp("", None, &defaults(), TS);
        let parsed = parse_image(&image).unwrap();
        assert_eq!(parsed.script_text, "");
        assert_eq!(parsed.header.data_size as usize, WRAPPER_SIZE);
        assert!(parsed.warnings.is_empty());
    }
}
