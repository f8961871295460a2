use crustline_types::CodecError;

/// Errors that can occur in the token store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The data couldn't be encoded or decoded, or was rejected as invalid.
    #[error("bad storage data: {0}")]
    Codec(#[from] CodecError),

    /// The store's lock was poisoned by a panicking writer.
    #[error("token store lock poisoned")]
    Poisoned,
}
