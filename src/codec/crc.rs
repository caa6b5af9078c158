//! CRC-32 (IEEE 802.3, reflected) matching U-Boot's `crc32()`.

use once_cell::sync::Lazy;

/// Reflected polynomial used by mkimage for both header and data checksums.
const POLY: u32 = 0xEDB8_8320;

/// 256-entry lookup table, built once and immutable afterwards.
static TABLE: Lazy<[u32; 256]> = Lazy::new(|| {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
});

/// CRC-32 with an explicit initial register value.
///
/// The register starts at `seed` and the final value is XOR-ed with
/// `0xFFFFFFFF`, the standard complement convention.
pub fn crc32_seeded(bytes: &[u8], seed: u32) -> u32 {
    let mut crc = seed;
    for &b in bytes {
        let idx = ((crc ^ b as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ TABLE[idx];
    }
    crc ^ 0xFFFF_FFFF
}

/// CRC-32 over a byte slice with the standard `0xFFFFFFFF` seed.
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32_seeded(bytes, 0xFFFF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(crc32(&[]), 0x0000_0000);
    }

    #[test]
    fn check_value() {
        // Canonical IEEE 802.3 check vector.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn single_byte() {
        assert_eq!(crc32(&[0x00]), 0xD202_EF8D);
        assert_eq!(crc32(&[0xFF]), 0xFF00_0000);
    }

    #[test]
    fn ascii_text() {
        assert_eq!(crc32(b"The quick brown fox jumps over the lazy dog"), 0x414F_A339);
    }

    #[test]
    fn seeded_matches_default() {
        assert_eq!(crc32_seeded(b"boot.scr", 0xFFFF_FFFF), crc32(b"boot.scr"));
    }
}
