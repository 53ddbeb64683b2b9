//! Fixed-width text fields
//!
//! Names and decisions travel as fixed-size byte arrays. Encoding truncates
//! over-length input to the longest prefix that fits and still ends on a
//! UTF-8 character boundary, then right-pads with the field's pad byte.
//! Decoding strips only trailing copies of the field's own pad byte, so a
//! name may end in a space, and decodes lossily.

/// Longest prefix of `text` that fits in `max` bytes without splitting a character
pub fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Encode `text` into exactly `N` bytes
pub fn encode_fixed<const N: usize>(text: &str, pad: u8) -> [u8; N] {
    let mut field = [pad; N];
    let text = truncate(text, N);
    field[..text.len()].copy_from_slice(text.as_bytes());
    field
}

/// Decode a field padded with `pad` back into text
pub fn decode_fixed(field: &[u8], pad: u8) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != pad)
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
