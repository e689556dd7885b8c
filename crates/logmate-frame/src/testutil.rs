//! Hex fixtures shared by the unit tests.

/// Parse whitespace-separated hex byte pairs.
pub(crate) fn bytes_from_hex(hex: &str) -> Vec<u8> {
    hex.split_whitespace()
        .map(|pair| u8::from_str_radix(pair, 16).expect("fixture should be valid hex"))
        .collect()
}

pub(crate) const CLIENT_INFO: &str = "
    00 00 00 65
    00 06
    00 02 00 03
    14 00 00 00 00 0e 4D 79 20 41 70 70 6C 69 63 61 74 69 6F 6E
    15 00 00 00 00 03 31 2E 30
    19 00 00 00 00 24 36 38 37 31 41 42 32 45 2D 37 32 30 39 2D 34 36 36 31 2D 42 38 44 37 2D 39 31 45 44 37 46 34 41 45 44 30 45
    16 00 00 00 00 05 6D 61 63 4F 53
    17 00 00 00 00 07 31 30 2E 31 34 2E 31
";

/// Every optional field set; timestamp split into millis and micros.
pub(crate) const COMPLETE_TEXT: &str = "
    00 00 00 70
    00 0c
    00 02 00 00
    01 03 5c 55 5d 1a
    02 02 00 07
    03 03 00 00 10 05
    04 00 00 00 00 0b 4D 61 69 6E 20 74 68 72 65 61 64
    05 00 00 00 00 03 41 70 70
    06 02 00 01
    07 00 00 00 00 0c 48 65 6C 6C 6F 2C 20 77 6F 72 6C 64
    0A 03 00 00 00 07
    0B 00 00 00 00 06 6D 61 69 6E 2E 63
    0C 02 00 2a
    0D 00 00 00 00 0e 73 6F 6D 65 46 75 6E 63 74 69 6F 6E 28 29
";

pub(crate) const BINARY: &str = "
    00 00 00 6a
    00 0b
    00 02 00 00
    01 03 5c 55 5d 1a
    02 02 00 07
    04 00 00 00 00 0b 4D 61 69 6E 20 74 68 72 65 61 64
    05 00 00 00 00 03 41 70 70
    06 02 00 01
    07 01 00 00 00 0c 48 65 6C 6C 6F 2C 20 77 6F 72 6C 64
    0A 03 00 00 00 07
    0B 00 00 00 00 06 6D 61 69 6E 2E 63
    0C 02 00 2a
    0D 00 00 00 00 0e 73 6F 6D 65 46 75 6E 63 74 69 6F 6E 28 29
";

pub(crate) const MINIMAL_TEXT: &str = "
    00 00 00 24
    00 04
    00 02 00 00
    01 03 5c 55 5d 1a
    07 00 00 00 00 0c 48 65 6C 6C 6F 2C 20 77 6F 72 6C 64
    0A 03 00 00 00 07
";

pub(crate) const IMAGE_WITH_SIZE: &str = "
    00 00 00 4a
    00 09
    00 02 00 00
    01 03 5c 55 5d 1a
    04 00 00 00 00 0b 4D 61 69 6E 20 74 68 72 65 61 64
    05 00 00 00 00 03 41 70 70
    06 02 00 01
    07 05 00 00 00 0a 01 02 03 04 05 06 07 08 09 0A
    0A 03 00 00 00 01
    08 02 04 00
    09 03 00 00 03 00
";

/// Client info, complete text, binary, minimal text and image frames.
pub(crate) fn multi_record_stream() -> Vec<u8> {
    [CLIENT_INFO, COMPLETE_TEXT, BINARY, MINIMAL_TEXT, IMAGE_WITH_SIZE]
        .iter()
        .flat_map(|hex| bytes_from_hex(hex))
        .collect()
}
