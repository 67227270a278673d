//! Single-byte text conversion and the lenient base64 decoder shared by every
//! layer of a container.

use base64::{
    Engine,
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
};
use encoding_rs::WINDOWS_1252;
use log::trace;

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Maps every byte to exactly one character.
pub fn bytes_to_text(bytes: &[u8]) -> String {
    WINDOWS_1252
        .decode_without_bom_handling(bytes)
        .0
        .into_owned()
}

/// Maps every character back to one byte.
///
/// Characters outside the code page are written as numeric character
/// references by the encoder.
pub fn text_to_bytes(text: &str) -> Vec<u8> {
    WINDOWS_1252.encode(text).0.into_owned()
}

pub fn encode_base64<T: AsRef<[u8]>>(input: T) -> String {
    BASE64.encode(input)
}

/// Decodes base64 text, tolerating damage.
///
/// Surrounding whitespace and NUL characters are trimmed and embedded
/// whitespace is ignored. If the remaining text does not decode as a whole,
/// it is decoded in independent 4-character groups: groups that fail are
/// dropped and so is a trailing group shorter than 4 characters.
pub fn decode_base64(input: &str) -> Vec<u8> {
    let input = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>();
    let input = input.trim_matches(|c: char| c == '\0' || c.is_whitespace());

    if input.is_empty() {
        return Vec::new();
    }

    match BASE64.decode(input) {
        Ok(bytes) => bytes,
        Err(e) => {
            trace!("falling back to chunked base64 decoding ({e})");
            let chars = input.chars().collect::<Vec<_>>();
            let mut bytes = Vec::with_capacity(chars.len() / 4 * 3);

            for chunk in chars.chunks_exact(4) {
                let chunk = chunk.iter().collect::<String>();
                if let Ok(decoded) = BASE64.decode(&chunk) {
                    bytes.extend_from_slice(&decoded);
                }
            }

            bytes
        }
    }
}

/// Base64 text of the single-byte representation of `text`.
pub fn encode_field(text: &str) -> String {
    encode_base64(text_to_bytes(text))
}

/// Inverse of [`encode_field`], with the leniency of [`decode_base64`].
pub fn decode_field(input: &str) -> String {
    bytes_to_text(&decode_base64(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_roundtrip() {
        let bytes = (0..=255).collect::<Vec<u8>>();
        let text = bytes_to_text(&bytes);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(text_to_bytes(&text), bytes);
    }

    #[test]
    fn test_decode_strict() {
        assert_eq!(decode_base64("aGVsbG8="), b"hello");
        assert_eq!(decode_field("ZGxj"), "dlc");
    }

    #[test]
    fn test_decode_trims_padding_characters() {
        assert_eq!(decode_base64("  aGVsbG8=\0\0\0"), b"hello");
        assert_eq!(decode_base64("\0\0"), b"");
        assert_eq!(decode_base64(""), b"");
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        assert_eq!(decode_base64("aGVs\r\nbG8="), b"hello");
    }

    #[test]
    fn test_decode_trailing_garbage() {
        assert_eq!(decode_base64("QUJDREVG!!"), b"ABCDEF");
        assert_eq!(decode_base64("QUJDREVGR"), b"ABCDEF");
    }

    #[test]
    fn test_decode_drops_bad_group() {
        assert_eq!(decode_base64("QUJD*#@!REVG"), b"ABCDEF");
    }

    #[test]
    fn test_field_roundtrip_latin() {
        let text = "Caf\u{e9} \u{20ac}";
        assert_eq!(decode_field(&encode_field(text)), text);
        assert_eq!(text_to_bytes(text), b"Caf\xe9 \x80");
    }
}
