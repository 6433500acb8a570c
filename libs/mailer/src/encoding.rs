//! Base64 helpers shared by the JWT signer and the message composer.
//!
//! Two distinct alphabets are in play and must not be mixed up: the
//! URL-safe unpadded form wraps JWT segments and whole-message envelopes,
//! while the standard padded form carries MIME bodies and RFC 2047
//! encoded words.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::MailerResult;

/// Encode bytes with the URL-safe alphabet, padding stripped.
///
/// Operates on the byte representation, so multi-byte UTF-8 text
/// round-trips exactly.
pub fn b64url_encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Exact inverse of [`b64url_encode`].
///
/// Fails with a decode error when the input contains characters outside
/// `[A-Za-z0-9_-]` or is truncated.
pub fn b64url_decode(input: &str) -> MailerResult<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(input)?)
}

/// Standard padded Base64, used for MIME body transport encoding and
/// RFC 2047 subject words.
pub fn b64_encode(input: impl AsRef<[u8]>) -> String {
    STANDARD.encode(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_arbitrary_bytes() {
        let samples: Vec<Vec<u8>> = vec![
            vec![],
            vec![0],
            vec![0xff, 0xfe, 0xfd],
            (0u8..=255).collect(),
            b"hello world".to_vec(),
        ];

        for bytes in samples {
            let encoded = b64url_encode(&bytes);
            assert_eq!(b64url_decode(&encoded).unwrap(), bytes);
        }
    }

    #[test]
    fn test_round_trip_multibyte_utf8() {
        let text = "Grüße aus Zürich — 日本語 🚀";
        let encoded = b64url_encode(text.as_bytes());
        let decoded = b64url_decode(&encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), text);
    }

    #[test]
    fn test_output_is_url_safe_and_unpadded() {
        // 0xfb 0xff forces '+' and '/' in the standard alphabet
        let encoded = b64url_encode([0xfbu8, 0xff, 0x00, 0x01, 0x02]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_decode_rejects_invalid_characters() {
        assert!(b64url_decode("abc$def").is_err());
        assert!(b64url_decode("a+b/c=").is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        // A single base64 character can never form a whole byte
        assert!(b64url_decode("A").is_err());
    }

    #[test]
    fn test_standard_encoding_keeps_padding() {
        assert_eq!(b64_encode("Hi"), "SGk=");
    }
}
