//! Opaque pagination cursors
//!
//! A cursor is the last-evaluated [`RecordKey`] serialized to canonical JSON
//! (`{"PK":"u1#d1","SK":"2024-01-02"}`) and then base64 encoded with the
//! URL-safe alphabet and no padding, so it can travel in a URL or a JSON
//! string untouched. Callers must treat it as a black box.
//!
//! Decoding fails soft: a token that cannot be decoded means "start from the
//! beginning of the partition", never an error for the whole request.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::errors::{DataPointError, ExError, Result};
use crate::log_op_degraded;
use crate::model::RecordKey;

pub struct CursorCodec;

impl CursorCodec {
    /// Token for the next page; `None` when there is no further page.
    pub fn encode(last_key: Option<&RecordKey>) -> Option<String> {
        let key = last_key?;
        // Two string fields: serialization cannot fail
        let json = serde_json::to_vec(key).ok()?;
        Some(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token, falling back to "no cursor" on any malformation.
    ///
    /// The failure is logged as a `degraded` event.
    pub fn decode(token: Option<&str>) -> Option<RecordKey> {
        let token = token?;
        match Self::try_decode(token) {
            Ok(key) => Some(key),
            Err(err) => {
                log_op_degraded!("decode_cursor", &err, token_len = token.len());
                None
            }
        }
    }

    /// Strict decode.
    ///
    /// Accepts the URL-safe unpadded form produced by [`CursorCodec::encode`]
    /// as well as standard padded base64.
    ///
    /// # Errors
    ///
    /// `MalformedCursor` if the token is not base64, not JSON, or not a
    /// `{"PK", "SK"}` object of strings.
    pub fn try_decode(token: &str) -> Result<RecordKey> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .or_else(|_| STANDARD.decode(token))
            .map_err(|e| malformed(format!("invalid base64: {}", e)))?;

        serde_json::from_slice::<RecordKey>(&bytes)
            .map_err(|e| malformed(format!("invalid key structure: {}", e)))
    }
}

fn malformed(reason: String) -> ExError {
    ExError::from(DataPointError::MalformedCursor { reason }).with_op("decode_cursor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    #[test]
    fn test_no_last_key_no_token() {
        assert_eq!(CursorCodec::encode(None), None);
        assert_eq!(CursorCodec::decode(None), None);
    }

    #[test]
    fn test_token_is_url_safe() {
        // '?' and '>' force the '+' and '/' positions of the standard alphabet
        let key = RecordKey::new("u1#d1", "???>>>");
        let token = CursorCodec::encode(Some(&key)).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(CursorCodec::decode(Some(&token)), Some(key));
    }

    #[test]
    fn test_standard_padded_tokens_accepted() {
        let json = r#"{"PK":"u1#d1","SK":"2024-01-02"}"#;
        let token = STANDARD.encode(json);
        assert_eq!(
            CursorCodec::try_decode(&token).unwrap(),
            RecordKey::new("u1#d1", "2024-01-02")
        );
    }

    #[test]
    fn test_malformed_tokens_fail_soft() {
        let not_json = URL_SAFE_NO_PAD.encode("not json");
        let wrong_shape = URL_SAFE_NO_PAD.encode(r#"{"PK":1,"SK":2}"#);
        for token in ["", "!!!", "%%%%", not_json.as_str(), wrong_shape.as_str()] {
            assert_eq!(CursorCodec::decode(Some(token)), None, "token {:?}", token);
        }
        let err = CursorCodec::try_decode("!!!").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MalformedCursor);
    }
}
