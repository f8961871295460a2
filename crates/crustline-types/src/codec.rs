//! Codec trait and implementations for persisting values as bytes.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! Storage backends don't care HOW a value is serialized; they just need
//! something that implements [`Codec`]. Swapping the format later means
//! adding a new implementation, not touching the stores.

use serde::{Serialize, de::DeserializeOwned};

use crate::CodecError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between threads. Token stores are
///   shared with the monitor's background task.
/// - `'static` → the codec owns everything it needs, so it can live
///   inside long-lived stores.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `CodecError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `CodecError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses pretty-printed JSON (via `serde_json`).
///
/// Persisted token files stay human-readable, so a developer can open
/// them and see exactly what the client remembers.
///
/// ## Example
///
/// ```rust
/// use crustline_types::{Codec, JsonCodec, NavigationState};
///
/// let codec = JsonCodec;
/// let state = NavigationState::from_path("/profile", "Please log in");
///
/// let bytes = codec.encode(&state).unwrap();
/// let decoded: NavigationState = codec.decode(&bytes).unwrap();
/// assert_eq!(state, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec_pretty(value).map_err(CodecError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(data).map_err(CodecError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<BTreeMap<String, String>, _> =
            JsonCodec.decode(b"{not json");

        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_encode_map_is_human_readable() {
        let mut map = BTreeMap::new();
        map.insert("access_token".to_string(), "abc".to_string());

        let bytes = JsonCodec.encode(&map).expect("should encode");
        let text = String::from_utf8(bytes).expect("json is utf-8");

        assert!(text.contains("\"access_token\": \"abc\""));
    }
}
