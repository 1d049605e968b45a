//! `RenderContext`: the re-architected home for what the original kept as
//! file-scope statics in `rwall.cpp` (spec §9 "re-architect statics as
//! `RenderContext` fields"). One of these is built per resolution and
//! reused frame to frame; only [`RenderContext::begin_frame`] resets the
//! parts that don't survive a frame.

use log::error;

use super::config::RasterConfig;
use super::fixed::{self, Fixed};
use super::framebuffer::{ClipBands, Framebuffer};
use super::types::RWallSegment;

/// Arena capacity for segments produced directly by `process`, one wall can
/// contribute at most one segment before merge-sort splits it further
/// (spec §5 resource limits). Original uses a fixed 'MAX_SEG' static array;
/// this value is a chosen placeholder sized generously for a 320x200-class
/// scene (documented in DESIGN.md).
pub const MAX_SEG: usize = 1024;

/// Arena capacity for segments after merge-sort has split overlapping walls
/// against each other (spec §5, §8 scenario 6: exceeding this logs
/// `"Wall_Process : Maximum processed walls exceeded!"` and stops accepting
/// further splits for the current sector).
pub const MAX_SPLIT_WALLS: usize = 4096;

/// Per-column perspective tables, rebuilt whenever the resolution or FOV
/// changes (spec §9: "resolution change invalidates the column slope
/// tables"). Indexed by screen column `0..width`.
pub struct ColumnTables {
    /// `atan`-free per-column horizontal viewspace slope, used to turn a
    /// screen column back into a viewspace direction for the floor/ceiling
    /// flat-fill interface.
    pub slope: Vec<Fixed>,
}

impl ColumnTables {
    fn build(cfg: &RasterConfig) -> Self {
        let width = cfg.width as usize;
        let mut slope = Vec::with_capacity(width);
        for x in 0..width {
            let screen_x = fixed::int_to_fixed16(x as i32) - cfg.half_width;
            slope.push(fixed::div16(screen_x, cfg.focal_length));
        }
        Self { slope }
    }
}

/// Everything `process`/`merge_sort`/the column rasterizers read or write
/// for one frame.
pub struct RenderContext {
    pub config: RasterConfig,
    pub columns: ColumnTables,

    pub framebuffer: Framebuffer,
    pub clip: ClipBands,

    /// 1D depth buffer: the nearest `z` written to each column so far, used
    /// to reject a later, farther wall without touching the framebuffer
    /// (mirrors the original's `s_depth1d`).
    pub depth1d: Vec<Fixed>,

    /// Segment arena `process` appends to, cleared every call to
    /// [`RenderContext::begin_sector`].
    pub segments: Vec<RWallSegment>,
    /// Segment arena `merge_sort` appends split walls into.
    pub split_walls: Vec<RWallSegment>,
}

impl RenderContext {
    pub fn new(config: RasterConfig) -> Self {
        let columns = ColumnTables::build(&config);
        let framebuffer = Framebuffer::new(config.width, config.height);
        let clip = ClipBands::new(config.width, config.height);
        let depth1d = vec![Fixed::MAX; config.width as usize];

        Self {
            config,
            columns,
            framebuffer,
            clip,
            depth1d,
            segments: Vec::with_capacity(MAX_SEG),
            split_walls: Vec::with_capacity(MAX_SPLIT_WALLS),
        }
    }

    /// Rebuilds the column slope tables and the depth/clip state for a new
    /// resolution. Per spec §9, a resolution change must not reuse the old
    /// tables; this is the only legal way to change `config.width/height`
    /// on a live context.
    pub fn rebuild_for_resolution(&mut self, config: RasterConfig) {
        self.columns = ColumnTables::build(&config);
        self.framebuffer = Framebuffer::new(config.width, config.height);
        self.clip = ClipBands::new(config.width, config.height);
        self.depth1d = vec![Fixed::MAX; config.width as usize];
        self.config = config;
    }

    /// Clears the per-frame clip bands and depth buffer. Called once before
    /// any sector is processed.
    pub fn begin_frame(&mut self) {
        self.clip.reset(self.config.height);
        self.depth1d.fill(Fixed::MAX);
    }

    /// Clears the per-sector segment arena. Called once per sector visited
    /// by the flood driver, before any of its walls are processed.
    pub fn begin_sector(&mut self) {
        self.segments.clear();
        self.split_walls.clear();
    }

    /// Appends a segment to the primary arena, logging and refusing the
    /// push if `MAX_SEG` would be exceeded (spec §7, §8 scenario 6).
    pub fn push_segment(&mut self, seg: RWallSegment) -> bool {
        if self.segments.len() >= MAX_SEG {
            error!("Wall_Process : Maximum processed walls exceeded!");
            return false;
        }
        self.segments.push(seg);
        true
    }

    /// Appends a segment to the split-wall arena, logging and refusing the
    /// push if `MAX_SPLIT_WALLS` would be exceeded.
    pub fn push_split_wall(&mut self, seg: RWallSegment) -> bool {
        if self.split_walls.len() >= MAX_SPLIT_WALLS {
            error!("Wall_MergeSort : Maximum split/merged walls exceeded!");
            return false;
        }
        self.split_walls.push(seg);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_tables_are_symmetric_about_center() {
        let cfg = RasterConfig::classic_320x200();
        let columns = ColumnTables::build(&cfg);
        let left = columns.slope[0];
        let right = columns.slope[cfg.width as usize - 1];
        assert!((left + right).abs() <= 1, "left={left} right={right}");
    }

    #[test]
    fn begin_frame_resets_clip_and_depth() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        ctx.clip.top[0] = 50;
        ctx.depth1d[0] = 123;
        ctx.begin_frame();
        assert_eq!(ctx.clip.top[0], 0);
        assert_eq!(ctx.depth1d[0], Fixed::MAX);
    }

    #[test]
    fn push_segment_refuses_past_max_seg() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let seg = RWallSegment {
            src_wall: 0,
            z0: 0,
            z1: 0,
            x0_view: 0,
            wall_x0_raw: 0,
            wall_x1_raw: 0,
            wall_x0: 0,
            wall_x1: 0,
            u_coord0: 0,
            u_scale: 0,
            slope: 0,
            orient: super::super::types::WallOrient::DzDx,
        };
        for _ in 0..MAX_SEG {
            assert!(ctx.push_segment(seg));
        }
        assert!(!ctx.push_segment(seg));
        assert_eq!(ctx.segments.len(), MAX_SEG);
    }
}
