//! Human-readable header listing, matching the mkimage `-l` layout.

use crate::codec::{arch_name, compression_name, image_type_name, os_name, ImageHeader};
use std::io::{self, Write};

/// Write an mkimage-style description of a header to a writer.
pub fn write_info<W: Write>(header: &ImageHeader, mut writer: W) -> io::Result<()> {
    writeln!(writer, "Image Name:   {}", header.name_str())?;

    if header.timestamp != 0 {
        match chrono::DateTime::from_timestamp(header.timestamp as i64, 0) {
            Some(dt) => writeln!(writer, "Created:      {}", dt.format("%a %b %d %H:%M:%S %Y"))?,
            None => writeln!(writer, "Created:      (invalid timestamp)")?,
        }
    }

    writeln!(
        writer,
        "Image Type:   {} {} {} ({})",
        arch_name(header.arch_type),
        os_name(header.os_type),
        image_type_name(header.image_type),
        compression_name(header.compression_type),
    )?;

    let size = header.data_size;
    if size >= 1024 {
        writeln!(
            writer,
            "Data Size:    {} Bytes = {:.2} KiB",
            size,
            size as f64 / 1024.0
        )?;
    } else {
        writeln!(writer, "Data Size:    {} Bytes", size)?;
    }

    writeln!(writer, "Load Address: {:08x}", header.load_address)?;
    writeln!(writer, "Entry Point:  {:08x}", header.entry_point)?;

    Ok(())
}

/// Render the info listing to a string.
pub fn to_info_string(header: &ImageHeader) -> io::Result<String> {
    let mut buf = Vec::new();
    write_info(header, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
