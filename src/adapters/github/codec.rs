//! Transport encoding for file contents.
//!
//! The contents API carries file bodies as standard base64. Responses
//! wrap the encoded text at 60 columns, so whitespace is dropped before
//! decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode raw bytes for a request body.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a response body, ignoring embedded line breaks.
pub fn decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode(b"hello"), "aGVsbG8=");
    }

    #[test]
    fn test_decode_wrapped_response() {
        let wrapped = "W3siaWQiOiIx\nIn1d\n";
        assert_eq!(decode(wrapped).unwrap(), br#"[{"id":"1"}]"#);
    }

    #[test]
    fn test_utf8_text_survives() {
        let text = "Café ☕ — naïve";
        let decoded = decode(&encode(text.as_bytes())).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), text);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not*base64").is_err());
    }
}
