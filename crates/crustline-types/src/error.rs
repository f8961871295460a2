//! Error types for the types layer.
//!
//! Each crate in Crustline defines its own error enum. When you see a
//! `CodecError`, you know the problem is in the persisted data itself
//! (turning it into bytes, back, or checking it), not in storage I/O,
//! routing, or the identity backend.

/// Errors that can occur while encoding or decoding persisted data.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: a storage file edited by hand, a truncated write,
    /// or data written by an incompatible client version.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The data is well-formed but makes no sense, e.g. a session whose
    /// access token is empty.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
