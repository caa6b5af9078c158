//! JSON output format.

use crate::codec::{ImageHeader, ParseWarning};
use crate::script::BootScript;
use serde::Serialize;
use std::io::Write;

/// JSON view of a parsed boot script and its container metadata.
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<JsonHeader>,
    pub script: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Header metadata with addresses and checksums rendered as hex strings.
#[derive(Serialize)]
pub struct JsonHeader {
    pub name: String,
    pub timestamp: u32,
    pub data_size: u32,
    pub load_address: String,
    pub entry_point: String,
    pub header_crc: String,
    pub data_crc: String,
    pub os_type: u8,
    pub arch_type: u8,
    pub image_type: u8,
    pub compression_type: u8,
}

impl JsonHeader {
    pub fn from_header(header: &ImageHeader) -> Self {
        Self {
            name: header.name_str(),
            timestamp: header.timestamp,
            data_size: header.data_size,
            load_address: format!("0x{:08x}", header.load_address),
            entry_point: format!("0x{:08x}", header.entry_point),
            header_crc: format!("0x{:08x}", header.header_crc),
            data_crc: format!("0x{:08x}", header.data_crc),
            os_type: header.os_type,
            arch_type: header.arch_type,
            image_type: header.image_type,
            compression_type: header.compression_type,
        }
    }
}

fn warning_strings(warnings: &[ParseWarning]) -> Vec<String> {
    warnings.iter().map(|w| w.to_string()).collect()
}

/// Write a BootScript as JSON to a writer.
pub fn write_json<W: Write>(
    script: &BootScript,
    writer: W,
    pretty: bool,
) -> Result<(), serde_json::Error> {
    let output = JsonOutput {
        header: script.header().map(JsonHeader::from_header),
        script: script.text(),
        warnings: warning_strings(script.warnings()),
    };

    if pretty {
        serde_json::to_writer_pretty(writer, &output)
    } else {
        serde_json::to_writer(writer, &output)
    }
}

/// Write a BootScript as a JSON string.
pub fn to_json_string(script: &BootScript, pretty: bool) -> Result<String, serde_json::Error> {
    let output = JsonOutput {
        header: script.header().map(JsonHeader::from_header),
        script: script.text(),
        warnings: warning_strings(script.warnings()),
    };

    if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
}
