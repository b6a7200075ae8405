//! SHA-256 digests of rendered rasters.
//!
//! Two renders are the same picture exactly when their digests match; the
//! short form tags log lines.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::frame::FrameBuffer;

/// Digest of a raster's shape, format and pixel bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First 12 hex digits.
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn hash_frame(frame: &FrameBuffer) -> ContentHash {
    // Shape is hashed too: a 4x1 and a 1x4 buffer share bytes but not pictures.
    let digest = Sha256::new()
        .chain_update(frame.width.to_le_bytes())
        .chain_update(frame.height.to_le_bytes())
        .chain_update([frame.format as u8])
        .chain_update(&frame.data)
        .finalize();
    ContentHash(digest.into())
}
