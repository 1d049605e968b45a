//! Setup-time errors. The hot path (`process`/`merge_sort`/the column
//! rasterizers) never returns `Result` — degenerate input is absorbed per
//! spec §7, logged via [`log`], and simply produces no visible pixels.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RclassicError {
    #[error("resolution {width}x{height} is not supported: {reason}")]
    InvalidResolution {
        width: u32,
        height: u32,
        reason: &'static str,
    },

    #[error("colormap must have exactly 256 entries, got {0}")]
    InvalidColormapLen(usize),

    #[error("texture {0}: height is not a power of two, required for column-major indexing")]
    NonPowerOfTwoHeight(u32),
}
