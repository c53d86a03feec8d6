//! EBCDIC (code page 037) to printable ASCII. Anything without a printable
//! ASCII counterpart becomes a space.

const CP037_TO_ASCII: [u8; 256] = [
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x2e, 0x3c, 0x28, 0x2b, 0x7c,
    0x26, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x21, 0x24, 0x2a, 0x29, 0x3b, 0x20,
    0x2d, 0x2f, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x2c, 0x25, 0x5f, 0x3e, 0x3f,
    0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x60, 0x3a, 0x23, 0x40, 0x27, 0x3d, 0x22,
    0x20, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x6a, 0x6b, 0x6c, 0x6d, 0x6e, 0x6f, 0x70, 0x71, 0x72, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x20, 0x7e, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x5e, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x5b, 0x5d, 0x20, 0x20, 0x20, 0x20,
    0x7b, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x7d, 0x4a, 0x4b, 0x4c, 0x4d, 0x4e, 0x4f, 0x50, 0x51, 0x52, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x5c, 0x20, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
    0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
];

pub fn to_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| CP037_TO_ASCII[b as usize] as char)
        .collect()
}

/// EBCDIC headers open with `C` (0xC3) and are padded with 0x40 spaces;
/// ASCII ones pad with 0x20.
pub fn looks_like_ebcdic(bytes: &[u8]) -> bool {
    if bytes.first() == Some(&0xC3) {
        return true;
    }
    let ebcdic_spaces = bytes.iter().filter(|&&b| b == 0x40).count();
    let ascii_spaces = bytes.iter().filter(|&&b| b == 0x20).count();
    ebcdic_spaces > ascii_spaces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_card_prefix() {
        // "C 1 CLIENT" in cp037
        let raw = [0xC3, 0x40, 0xF1, 0x40, 0xC3, 0xD3, 0xC9, 0xC5, 0xD5, 0xE3];
        assert_eq!(to_ascii(&raw), "C 1 CLIENT");
        assert!(looks_like_ebcdic(&raw));
    }

    #[test]
    fn ascii_header_is_not_ebcdic() {
        assert!(!looks_like_ebcdic(b"C 1 CLIENT   LINE 12      "));
    }
}
