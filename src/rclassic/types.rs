//! Persistent and per-frame data model (spec §3).

use bitflags::bitflags;

use super::fixed::Fixed;

/// Index into the level's wall table. Segments reference walls by index
/// rather than by pointer so the per-frame arenas stay trivially copyable.
pub type WallId = u32;
/// Index into the level's sector table.
pub type SectorId = u32;
/// Index into a [`crate::rclassic::texture::TextureBank`].
pub type TextureId = u32;

/// A 2D point in some fixed-point frame (world or viewspace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Vec2F {
    pub x: Fixed,
    pub z: Fixed,
}

impl Vec2F {
    pub const fn new(x: Fixed, z: Fixed) -> Self {
        Self { x, z }
    }
}

bitflags! {
    /// Flags carried on an [`RSector`] (spec §4.4 "sky/pit" substitution).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct SectorFlags: u32 {
        /// Ceiling is an exterior/sky plane; screen-top is substituted for
        /// the true projected ceiling when the neighbour is also exterior.
        const EXTERIOR        = 0x0001;
        /// Neighbour-side companion flag to `EXTERIOR` (spec §4.4 scenario 5).
        const EXT_ADJ         = 0x0002;
        /// Floor is a bottomless pit; screen-bottom is substituted.
        const PIT              = 0x0004;
        /// Neighbour-side companion flag to `PIT`.
        const EXT_FLOOR_ADJ    = 0x0008;
    }
}

bitflags! {
    /// Flags carried on an [`RWall`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct WallFlags: u32 {
        const FLIP_HORIZ = 0x0001;
        const ILLUM_SIGN = 0x0002;
    }
}

/// Persistent per-sector state (spec §3 `RSector`).
#[derive(Clone, Debug)]
pub struct RSector {
    pub ceiling_height: Fixed,
    pub floor_height: Fixed,
    pub flags: SectorFlags,
    pub light: Fixed,
    /// Indices into the level's wall table belonging to this sector.
    pub walls: Vec<WallId>,
}

/// UV offsets applied at draw time, one pair per texture role (spec §3).
#[derive(Clone, Copy, Debug, Default)]
pub struct UvOffsets {
    pub mid_u: Fixed,
    pub mid_v: Fixed,
    pub top_u: Fixed,
    pub top_v: Fixed,
    pub bot_u: Fixed,
    pub bot_v: Fixed,
}

/// Texel-space vertical extents of the three steppable textures (spec §3).
#[derive(Clone, Copy, Debug, Default)]
pub struct TexelHeights {
    pub mid: Fixed,
    pub top: Fixed,
    pub bot: Fixed,
}

/// The three texture roles a wall may carry, plus the optional sign overlay
/// (spec §3; sign rendering itself is out of scope, see `rwall.cpp`'s
/// `signTex` no-op branches, kept here only as a presence flag).
#[derive(Clone, Copy, Debug, Default)]
pub struct WallTextures {
    pub mid: Option<TextureId>,
    pub top: Option<TextureId>,
    pub bot: Option<TextureId>,
    pub sign: Option<TextureId>,
}

/// Persistent, one-per-static-wall state (spec §3 `RWall`).
#[derive(Clone, Debug)]
pub struct RWall {
    pub v0: Vec2F,
    pub v1: Vec2F,
    pub sector: SectorId,
    pub next_sector: Option<SectorId>,
    pub textures: WallTextures,
    pub texel_heights: TexelHeights,
    pub uv: UvOffsets,
    pub texel_length: Fixed,
    pub light: Fixed,
    pub flags: WallFlags,

    /// Per-frame scratch, reset by [`super::context::RenderContext::begin_sector`]
    /// (really: set by `process` every time the wall is visited).
    pub visible: bool,
    /// `-1` (all bits set) once a portal opening has been fully masked out,
    /// mirroring the original's `drawFlags = -1` sentinel.
    pub draw_flags: i32,
}

impl RWall {
    pub fn is_portal(&self) -> bool {
        self.next_sector.is_some()
    }
}

/// Which viewspace ratio a segment's `slope` holds, chosen so `|slope| <= 1`
/// (spec §4.2 step 10).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallOrient {
    /// `slope = dz/dx`, `den = dx`. Chosen when `|dx| > |dz|`.
    DzDx,
    /// `slope = dx/dz`, `den = dz`. Chosen otherwise (including ties).
    DxDz,
}

/// The clipped, projected, screen-space record `process` emits for one wall
/// (spec §3 `RWallSegment`). Copy because the merge-sort pass moves whole
/// segments around the way the original `memmove`s `RWallSegment` structs.
#[derive(Clone, Copy, Debug)]
pub struct RWallSegment {
    pub src_wall: WallId,

    pub z0: Fixed,
    pub z1: Fixed,
    pub x0_view: Fixed,

    pub wall_x0_raw: i32,
    pub wall_x1_raw: i32,
    pub wall_x0: i32,
    pub wall_x1: i32,

    pub u_coord0: Fixed,
    pub u_scale: Fixed,

    pub slope: Fixed,
    pub orient: WallOrient,
}

impl RWallSegment {
    pub fn width(&self) -> i32 {
        self.wall_x1 - self.wall_x0 + 1
    }
}

/// Which column-rasterizer role a wall should be drawn with; selected by the
/// flood driver (spec §4.4 state-machine) by inspecting `next_sector` and the
/// front/back sector heights and flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawRole {
    /// No neighbour: full-height `mid` texture.
    Solid,
    /// Neighbour floor is above this floor: lower step texture.
    Bottom,
    /// Neighbour ceiling is below this ceiling: upper step texture.
    Top,
    /// Both steps are present.
    TopAndBottom,
    /// Full-height portal with no visible step texture: clip-only.
    Mask,
}

impl DrawRole {
    /// Classifies a portal wall from the two sectors it joins (spec §4.4).
    /// Returns `None` for non-portal walls (the caller should use `Solid`).
    pub fn classify(front: &RSector, back: &RSector) -> Self {
        let has_top = back.ceiling_height < front.ceiling_height;
        let has_bottom = back.floor_height > front.floor_height;
        match (has_top, has_bottom) {
            (true, true) => DrawRole::TopAndBottom,
            (true, false) => DrawRole::Top,
            (false, true) => DrawRole::Bottom,
            (false, false) => DrawRole::Mask,
        }
    }
}
