//! Binary board bundles
//!
//! A bundle is a postcard-encoded list of descriptors behind a short
//! header, produced on the host and embedded in firmware images so the
//! target never has to parse text.

use boardcfg_core::BoardDescriptor;
use log::{debug, warn};

/// "BDSC", little-endian
pub const BUNDLE_MAGIC: u32 = 0x4353_4442;

/// Current bundle layout version
pub const BUNDLE_VERSION: u8 = 1;

/// Bundle encode/decode errors
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to encode bundle: {0}")]
    Encode(#[source] postcard::Error),
    #[error("failed to decode bundle: {0}")]
    Decode(#[source] postcard::Error),
    /// Input does not start with [`BUNDLE_MAGIC`]
    #[error("not a board bundle")]
    BadMagic,
    #[error("bundle version {found}, expected {BUNDLE_VERSION}")]
    VersionMismatch { found: u8 },
}

/// Serialize descriptors into a bundle
pub fn encode(boards: &[BoardDescriptor]) -> Result<Vec<u8>, BundleError> {
    let bytes = postcard::to_allocvec(&(BUNDLE_MAGIC, BUNDLE_VERSION, boards))
        .map_err(BundleError::Encode)?;
    debug!("Encoded {} boards into {} bytes", boards.len(), bytes.len());
    Ok(bytes)
}

/// Deserialize a bundle produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<Vec<BoardDescriptor>, BundleError> {
    let ((magic, version), rest) =
        postcard::take_from_bytes::<(u32, u8)>(bytes).map_err(|_| BundleError::BadMagic)?;

    if magic != BUNDLE_MAGIC {
        return Err(BundleError::BadMagic);
    }
    if version != BUNDLE_VERSION {
        warn!(
            "Bundle version mismatch: found {}, expected {}",
            version, BUNDLE_VERSION
        );
        return Err(BundleError::VersionMismatch { found: version });
    }

    let boards: Vec<BoardDescriptor> = postcard::from_bytes(rest).map_err(BundleError::Decode)?;
    debug!("Decoded {} boards from bundle", boards.len());
    Ok(boards)
}
