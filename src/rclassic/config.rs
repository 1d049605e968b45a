//! Frame/runtime configuration (spec §9: "re-architect statics as
//! `RenderContext` fields"). `RasterConfig` is the piece of that state that
//! doesn't change frame-to-frame: resolution, projection, and the two
//! compatibility toggles spec §9's Open Questions resolve.

use super::error::RclassicError;
use super::fixed::{self, Fixed};

/// Which fixed-point word width backs every [`Fixed`] in a given
/// [`RenderContext`](super::context::RenderContext). Mirrors the original's
/// `ENABLE_HIGH_PRECISION_FIXED_POINT` compile switch; here it's informational
/// only (the actual word width is chosen at compile time by the
/// `high-precision-fixed` Cargo feature, see `rclassic::fixed`), kept on
/// `RasterConfig` so a `RenderContext` can assert it was built against the
/// feature set the caller expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixedPrecision {
    /// 16.16, the DOS-era default.
    Standard,
    /// 20.12, `ENABLE_HIGH_PRECISION_FIXED_POINT` enabled.
    High,
}

impl FixedPrecision {
    pub const fn current() -> Self {
        #[cfg(feature = "high-precision-fixed")]
        {
            FixedPrecision::High
        }
        #[cfg(not(feature = "high-precision-fixed"))]
        {
            FixedPrecision::Standard
        }
    }
}

/// Screen + projection setup, held fixed for the lifetime of a
/// [`RenderContext`](super::context::RenderContext) (rebuilding it is the
/// only way to change resolution, per spec §9's "resolution change
/// invalidates the column slope tables" note).
#[derive(Clone, Copy, Debug)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,

    /// Half-width in pixels, cached as `Fixed` for the slope-table build.
    pub half_width: Fixed,
    pub half_height: Fixed,

    /// Horizontal focal length in pixels (`half_width / tan(hfov/2)`).
    pub focal_length: Fixed,

    pub near_plane: Fixed,

    pub precision: FixedPrecision,

    /// When `true` (the default, and the faithful-reproduction choice),
    /// `process`'s near-plane clip step reproduces the original's two
    /// documented "BUG: this is NOT correct but matches the original
    /// implementation" branches verbatim. When `false`, the corrected
    /// branches run instead; useful only for comparing against a
    /// hypothetically-fixed renderer, never for matching the original's
    /// screenshots. Spec §9 Open Question: resolved in favor of `true`.
    pub legacy_near_clip_bug: bool,
}

impl RasterConfig {
    /// `hfov` in radians (full horizontal field of view).
    pub fn new(
        width: u32,
        height: u32,
        hfov: f32,
        near_plane: f32,
    ) -> Result<Self, RclassicError> {
        if width == 0 || height == 0 {
            return Err(RclassicError::InvalidResolution {
                width,
                height,
                reason: "dimensions must be nonzero",
            });
        }
        if !(0.0..std::f32::consts::PI).contains(&hfov) {
            return Err(RclassicError::InvalidResolution {
                width,
                height,
                reason: "horizontal fov must be in (0, pi) radians",
            });
        }

        let half_width = fixed::float_to_fixed16(width as f32 / 2.0);
        let half_height = fixed::float_to_fixed16(height as f32 / 2.0);
        let focal_length =
            fixed::float_to_fixed16((width as f32 / 2.0) / (hfov / 2.0).tan());

        Ok(Self {
            width,
            height,
            half_width,
            half_height,
            focal_length,
            near_plane: fixed::float_to_fixed16(near_plane),
            precision: FixedPrecision::current(),
            legacy_near_clip_bug: true,
        })
    }

    /// Standard 320x200, 90 degree DOS-era defaults.
    pub fn classic_320x200() -> Self {
        Self::new(320, 200, std::f32::consts::FRAC_PI_2, 1.0)
            .expect("the classic preset is always valid")
    }
}

#[cfg(feature = "cli")]
pub mod cli {
    use clap::Args;

    /// `clap`-derived flags for the `view_classic` demo binary.
    #[derive(Args, Debug, Clone)]
    pub struct RasterArgs {
        #[arg(long, default_value_t = 320)]
        pub width: u32,
        #[arg(long, default_value_t = 200)]
        pub height: u32,
        /// Horizontal field of view, in degrees.
        #[arg(long, default_value_t = 90.0)]
        pub hfov_deg: f32,
        #[arg(long, default_value_t = 1.0)]
        pub near_plane: f32,
        /// Disable the bit-for-bit legacy near-clip quirk.
        #[arg(long)]
        pub fix_near_clip_bug: bool,
    }

    impl RasterArgs {
        pub fn into_config(self) -> Result<super::RasterConfig, super::RclassicError> {
            let mut cfg = super::RasterConfig::new(
                self.width,
                self.height,
                self.hfov_deg.to_radians(),
                self.near_plane,
            )?;
            cfg.legacy_near_clip_bug = !self.fix_near_clip_bug;
            Ok(cfg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_preset_is_valid() {
        let cfg = RasterConfig::classic_320x200();
        assert_eq!(cfg.width, 320);
        assert_eq!(cfg.height, 200);
        assert!(cfg.legacy_near_clip_bug);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(RasterConfig::new(0, 200, 1.0, 1.0).is_err());
    }

    #[test]
    fn degenerate_fov_is_rejected() {
        assert!(RasterConfig::new(320, 200, 0.0, 1.0).is_err());
        assert!(RasterConfig::new(320, 200, std::f32::consts::PI, 1.0).is_err());
    }
}
