//! Unified error type for Crustline.

use crustline_route::NavigationError;
use crustline_session::ProviderError;
use crustline_store::StoreError;
use crustline_types::CodecError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `crustline` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CrustlineError {
    /// Encoding, decoding or validating persisted data failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The token store couldn't be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A route transition failed.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The identity backend failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The monitor was assembled from incomplete or invalid parts.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_from_codec_error() {
        let err = CodecError::InvalidData("bad".into());
        let crustline_err: CrustlineError = err.into();
        assert!(matches!(crustline_err, CrustlineError::Codec(_)));
        assert!(crustline_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_store_error() {
        let err = StoreError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        let crustline_err: CrustlineError = err.into();
        assert!(matches!(crustline_err, CrustlineError::Store(_)));
    }

    #[test]
    fn test_from_navigation_error() {
        let err = NavigationError::InvalidPath("no-slash".into());
        let crustline_err: CrustlineError = err.into();
        assert!(matches!(crustline_err, CrustlineError::Navigation(_)));
    }

    #[test]
    fn test_from_provider_error() {
        let err = ProviderError::Network("offline".into());
        let crustline_err: CrustlineError = err.into();
        assert!(matches!(crustline_err, CrustlineError::Provider(_)));
        assert!(crustline_err.to_string().contains("offline"));
    }

    #[test]
    fn test_config_error_display() {
        let err = CrustlineError::Config("no provider".into());
        assert_eq!(err.to_string(), "invalid configuration: no provider");
    }
}
