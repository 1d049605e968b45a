//! Wall processing and column rasterization (spec §4.2, §4.4; grounded on
//! `rwall.cpp: wall_process`, `wall_drawSolid`, `wall_drawMask`,
//! `wall_drawBottom`, `solveForZ(_Numerator)`, `drawColumn_{Fullbright,Lit}`).

use log::warn;

use super::collab::FlatSink;
use super::config::RasterConfig;
use super::context::RenderContext;
use super::fixed::{self, Fixed};
use super::lighting::Lighting;
use super::merge;
use super::texture::TextureFrame;
use super::types::{DrawRole, RSector, RWall, RWallSegment, Vec2F, WallId, WallOrient};

/// The camera's viewspace basis for one frame: position plus the unit
/// rotation `(cos, sin)` of its facing angle, both as [`Fixed`] (spec §4.2
/// step 1, "transform world vertices into viewspace").
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pos: Vec2F,
    pub cos: Fixed,
    pub sin: Fixed,
    /// Height of the eye above the world-space floor datum (spec §6 camera
    /// parameter `eyeHeight`), used to project sector floor/ceiling heights
    /// to screen rows (spec §4.4 step 1).
    pub eye_height: Fixed,
}

impl Camera {
    /// Rotates+translates a world-space point into viewspace, `x` across
    /// the view and `z` into the screen.
    #[inline]
    pub fn to_viewspace(&self, world: Vec2F) -> Vec2F {
        let dx = world.x - self.pos.x;
        let dz = world.z - self.pos.z;
        Vec2F::new(
            fixed::mul16(dx, self.cos) + fixed::mul16(dz, self.sin),
            fixed::mul16(dz, self.cos) - fixed::mul16(dx, self.sin),
        )
    }
}

/// Processes one wall against the camera: transforms, frustum- and
/// near-clips, projects to screen columns, and (if anything survived)
/// inserts the resulting [`RWallSegment`] into `ctx`'s occlusion list via
/// [`merge::merge_sort`]. Returns `false` when the wall contributed nothing
/// visible (behind the camera, entirely outside the view wedge, or a
/// degenerate zero-length projection) — never panics, per spec §7.
pub fn process(
    ctx: &mut RenderContext,
    wall_id: WallId,
    wall: &RWall,
    camera: &Camera,
    wall_endpoints: impl Fn(u32) -> (Vec2F, Vec2F) + Copy,
) -> bool {
    let mut v0 = camera.to_viewspace(wall.v0);
    let mut v1 = camera.to_viewspace(wall.v1);

    // Step: back-face cull (spec §4.2 step 3): `side = z0*(x1-x0) -
    // x0*(z1-z0)`, which reduces to `z0*x1 - x0*z1`. A wall facing away
    // from the camera has a negative `side` and is dropped.
    let side = fixed::mul16(v0.z, v1.x) - fixed::mul16(v0.x, v1.z);
    if side < 0 {
        return false;
    }

    // Step: reject walls entirely behind the camera.
    if v0.z <= 0 && v1.z <= 0 {
        return false;
    }

    // Step: near-plane clip. A wall that straddles the near plane is
    // clipped by intersecting the edge with `z = near`.
    let near = ctx.config.near_plane;
    if v0.z < near || v1.z < near {
        match clip_near(v0, v1, near, ctx.config.legacy_near_clip_bug) {
            Some((c0, c1)) => {
                v0 = c0;
                v1 = c1;
            }
            None => return false,
        }
    }

    // Step: frustum clip, `-z <= x <= z`. Unlike the near clip this never
    // needs to synthesize a new vertex: a wall that's become fully outside
    // the wedge on one side after the near clip is simply dropped (the
    // flood driver only calls `process` for walls already inside the
    // current screen-column window).
    if (v0.x < -v0.z && v1.x < -v1.z) || (v0.x > v0.z && v1.x > v1.z) {
        return false;
    }

    // Step: perspective projection to screen-space columns.
    let cfg = &ctx.config;
    let screen_x0 = cfg.half_width + fixed::fused_mul_div(v0.x, cfg.focal_length, v0.z.max(1));
    let screen_x1 = cfg.half_width + fixed::fused_mul_div(v1.x, cfg.focal_length, v1.z.max(1));

    let wall_x0_raw = fixed::floor16(screen_x0);
    let wall_x1_raw = fixed::floor16(screen_x1);
    let wall_x0 = wall_x0_raw.max(0);
    let wall_x1 = wall_x1_raw.min(cfg.width as i32 - 1);
    if wall_x0 > wall_x1 {
        return false;
    }

    // Step: choose the orientation whose denominator has the larger
    // magnitude, so the per-column Z solve never divides by something
    // close to zero (spec §4.2 step 10).
    let dx = v1.x - v0.x;
    let dz = v1.z - v0.z;
    let orient = if dx.unsigned_abs() > dz.unsigned_abs() {
        WallOrient::DzDx
    } else {
        WallOrient::DxDz
    };
    let slope = match orient {
        WallOrient::DzDx => fixed::div16(dz, dx),
        WallOrient::DxDz => fixed::div16(dx, dz),
    };

    // Step: perspective-correct U scale (spec §4.4: `uScale =
    // div16(texelLenRem, den)`), where `den` is the same denominator the
    // orientation choice above picked (`dx` for DZ_DX, `dz` for DX_DZ) so
    // `uScale` is "texels per unit of the viewspace delta the column
    // rasterizer actually interpolates over" (`dxView`, or `z - z0`).
    let den = match orient {
        WallOrient::DzDx => dx,
        WallOrient::DxDz => dz,
    };
    let u_scale = fixed::div16(wall.texel_length, den);

    let seg = RWallSegment {
        src_wall: wall_id,
        z0: v0.z,
        z1: v1.z,
        x0_view: v0.x,
        wall_x0_raw,
        wall_x1_raw,
        wall_x0,
        wall_x1,
        u_coord0: wall.uv.mid_u,
        u_scale,
        slope,
        orient,
    };

    merge::merge_sort(ctx, seg, wall_endpoints);
    true
}

/// Clips the edge `(v0, v1)` against the near plane `z = near`, returning
/// the two surviving endpoints. Grounded on `rwall.cpp`'s near-clip block,
/// which contains two branches marked in the original as "BUG: this is NOT
/// correct but matches the original implementation" — when
/// `legacy_near_clip_bug` is set (the default, spec §9 Open Question) this
/// reproduces them bit-for-bit: the replacement vertex is computed using
/// the *un-clipped* neighbour's `x`, not the interpolated one, which visibly
/// skews the clipped edge for walls steeply angled to the view. With the
/// flag cleared, the corrected interpolation is used instead.
fn clip_near(v0: Vec2F, v1: Vec2F, near: Fixed, legacy_bug: bool) -> Option<(Vec2F, Vec2F)> {
    if v0.z >= near && v1.z >= near {
        return Some((v0, v1));
    }
    if v0.z < near && v1.z < near {
        return None;
    }

    let (behind, front) = if v0.z < near { (v0, v1) } else { (v1, v0) };
    let dz = front.z - behind.z;
    if dz == 0 {
        return None;
    }
    let t = fixed::div16(near - behind.z, dz);

    let clipped_x = if legacy_bug {
        // BUG: this is NOT correct but matches the original implementation.
        // The original reuses the front vertex's `x` outright instead of
        // interpolating, because the interpolation variable hadn't been
        // refreshed yet on this code path.
        front.x
    } else {
        behind.x + fixed::mul16(t, front.x - behind.x)
    };
    let clipped = Vec2F::new(clipped_x, near);

    if v0.z < near {
        Some((clipped, v1))
    } else {
        Some((v0, clipped))
    }
}

/// Perspective-correct viewspace `z` at screen column `x`, given the
/// segment's chosen orientation (spec §4.2/§4.4, `rwall.cpp:
/// solveForZ_Numerator` / `solveForZ`). Also returns `dxView`, the
/// viewspace `x` delta from the segment's `x0View` at this column — spec
/// §4.4's perspective-correct `u` formula needs this for the DZ_DX case
/// (the DX_DZ case uses `z - z0` directly instead, computed by the
/// caller).
pub fn solve_for_z(seg: &RWallSegment, ctx: &RenderContext, column: i32) -> (Fixed, Fixed) {
    let col_slope = ctx.columns.slope[column.clamp(0, ctx.config.width as i32 - 1) as usize];
    match seg.orient {
        WallOrient::DzDx => {
            // The wall's line is `z = z0 + slope*(x - x0View)` (slope =
            // dz/dx). Intersect with the column ray `x = col_slope * z` by
            // first solving for the viewspace `x` at the intersection
            // (`xView`), then substituting back for `z` (spec §4.4:
            // solveForZ for DZ_DX goes through `xView`, not straight to
            // `z` — skipping that step silently swaps in the wrong axis).
            let numerator = seg.z0 - fixed::mul16(seg.slope, seg.x0_view);
            let denom = col_slope - seg.slope;
            if denom == 0 {
                (seg.z0, 0)
            } else {
                let x_view = fixed::div16(numerator, denom);
                let dx_view = x_view - seg.x0_view;
                (seg.z0 + fixed::mul16(dx_view, seg.slope), dx_view)
            }
        }
        WallOrient::DxDz => {
            // The wall's line is `x = x0View + slope*(z - z0)` (slope =
            // dx/dz). Intersect directly with `x = col_slope * z`:
            // `z*(col_slope - slope) = x0View - slope*z0`.
            let numerator = seg.x0_view - fixed::mul16(seg.slope, seg.z0);
            let denom = col_slope - seg.slope;
            if denom == 0 {
                (seg.z0, 0)
            } else {
                let z = fixed::div16(numerator, denom);
                let x_view = fixed::mul16(col_slope, z);
                (z, x_view - seg.x0_view)
            }
        }
    }
}

/// Full-height, no-neighbour wall (spec §4.4 `Solid`; `rwall.cpp:
/// wall_drawSolid`).
pub fn draw_solid(
    ctx: &mut RenderContext,
    seg: &RWallSegment,
    texture: TextureFrame<'_>,
    light: Fixed,
    lighting: &dyn Lighting,
    flats: &mut dyn FlatSink,
) {
    draw_columns(ctx, seg, texture, light, lighting, seg.u_coord0, ColumnSpan::Full, flats);
}

/// Lower-step wall: the portion of a portal wall below the neighbour's
/// floor (spec §4.4 `Bottom`; `rwall.cpp: wall_drawBottom`).
pub fn draw_bottom(
    ctx: &mut RenderContext,
    seg: &RWallSegment,
    texture: TextureFrame<'_>,
    light: Fixed,
    lighting: &dyn Lighting,
    step_top_screen: i32,
    flats: &mut dyn FlatSink,
) {
    draw_columns(
        ctx,
        seg,
        texture,
        light,
        lighting,
        seg.u_coord0,
        ColumnSpan::Clipped { top: step_top_screen, bot: i32::MAX },
        flats,
    );
}

/// Upper-step wall: the portion of a portal wall above the neighbour's
/// ceiling (spec §4.4 `Top`). The original's `wall_drawTop` is a TODO stub
/// that just calls `wall_drawMask`; this crate implements the real step
/// texture instead (documented in DESIGN.md as a supplementation).
pub fn draw_top(
    ctx: &mut RenderContext,
    seg: &RWallSegment,
    texture: TextureFrame<'_>,
    light: Fixed,
    lighting: &dyn Lighting,
    step_bot_screen: i32,
    flats: &mut dyn FlatSink,
) {
    draw_columns(
        ctx,
        seg,
        texture,
        light,
        lighting,
        seg.u_coord0,
        ColumnSpan::Clipped { top: i32::MIN, bot: step_bot_screen },
        flats,
    );
}

/// Both steps present: draws the upper step, then the lower step (spec
/// §4.4 `TopAndBottom`; see [`draw_top`] for why this is a real
/// implementation rather than the original's mask-stub fallthrough).
pub fn draw_top_and_bottom(
    ctx: &mut RenderContext,
    seg: &RWallSegment,
    top_texture: TextureFrame<'_>,
    bot_texture: TextureFrame<'_>,
    light: Fixed,
    lighting: &dyn Lighting,
    step_bot_screen: i32,
    step_top_screen: i32,
    flats: &mut dyn FlatSink,
) {
    draw_top(ctx, seg, top_texture, light, lighting, step_bot_screen, flats);
    draw_bottom(ctx, seg, bot_texture, light, lighting, step_top_screen, flats);
}

/// Full-height portal wall with no visible step texture: only updates the
/// depth buffer and clip bands, handing the open span to the flat sink
/// (spec §4.4 `Mask`; `rwall.cpp: wall_drawMask`).
pub fn draw_mask(ctx: &mut RenderContext, seg: &RWallSegment, flats: &mut dyn FlatSink) {
    for x in seg.wall_x0..=seg.wall_x1 {
        let (z, _) = solve_for_z(seg, ctx, x);
        let idx = x as usize;
        if z < ctx.depth1d[idx] {
            ctx.depth1d[idx] = z;
        }
        let top = ctx.clip.top[idx];
        let bot = ctx.clip.bot[idx];
        if top <= bot {
            flats.add_ceiling_edge(x, top, bot, z);
            flats.add_floor_edge(x, top, bot, z);
        }
    }
}

/// Projects a world-space height (a sector's floor or ceiling) to a screen
/// row at viewspace depth `z` (spec §4.4 step 1, "project the relevant
/// sector/next-sector heights ... to screen Y at z0 and z1"). Mirrors the
/// horizontal perspective projection in [`process`] along the screen's
/// vertical axis; `cfg.focal_length` stands in for both the horizontal and
/// vertical focal length (no separate `focalLenAspect` is modeled, see
/// DESIGN.md).
pub fn project_height(cfg: &RasterConfig, eye_height: Fixed, height: Fixed, z: Fixed) -> i32 {
    let rel = height - eye_height;
    let offset = fixed::fused_mul_div(rel, cfg.focal_length, z.max(1));
    fixed::floor16(cfg.half_height - offset)
}

/// Dispatches a merged, visible wall segment to the column rasterizer its
/// role calls for (spec §4.4's state machine: `DrawRole::classify` on the
/// front/back sector heights picks `Solid`/`Bottom`/`Top`/`TopAndBottom`/
/// `Mask`). `back` is `None` for a one-sided wall, which always draws
/// `Solid` regardless of what `wall.next_sector` claims. Step boundaries
/// are projected once per segment at its nearer depth, since neither
/// [`draw_bottom`] nor [`draw_top`] interpolate the step line per column.
#[allow(clippy::too_many_arguments)]
pub fn draw_wall(
    ctx: &mut RenderContext,
    seg: &RWallSegment,
    front: &RSector,
    back: Option<&RSector>,
    eye_height: Fixed,
    mid: Option<TextureFrame<'_>>,
    top: Option<TextureFrame<'_>>,
    bot: Option<TextureFrame<'_>>,
    light: Fixed,
    lighting: &dyn Lighting,
    flats: &mut dyn FlatSink,
) {
    let Some(back) = back else {
        match mid {
            Some(tex) => draw_solid(ctx, seg, tex, light, lighting, flats),
            None => warn!("draw_wall: solid wall {} has no mid texture", seg.src_wall),
        }
        return;
    };

    let z = seg.z0.min(seg.z1).max(1);
    match DrawRole::classify(front, back) {
        DrawRole::Mask => draw_mask(ctx, seg, flats),
        DrawRole::Top => {
            let step_bot_screen = project_height(&ctx.config, eye_height, back.ceiling_height, z);
            match top {
                Some(tex) => draw_top(ctx, seg, tex, light, lighting, step_bot_screen, flats),
                None => draw_mask(ctx, seg, flats),
            }
        }
        DrawRole::Bottom => {
            let step_top_screen = project_height(&ctx.config, eye_height, back.floor_height, z);
            match bot {
                Some(tex) => draw_bottom(ctx, seg, tex, light, lighting, step_top_screen, flats),
                None => draw_mask(ctx, seg, flats),
            }
        }
        DrawRole::TopAndBottom => {
            let step_bot_screen = project_height(&ctx.config, eye_height, back.ceiling_height, z);
            let step_top_screen = project_height(&ctx.config, eye_height, back.floor_height, z);
            match (top, bot) {
                (Some(t), Some(b)) => {
                    draw_top_and_bottom(ctx, seg, t, b, light, lighting, step_bot_screen, step_top_screen, flats)
                }
                (Some(t), None) => draw_top(ctx, seg, t, light, lighting, step_bot_screen, flats),
                (None, Some(b)) => draw_bottom(ctx, seg, b, light, lighting, step_top_screen, flats),
                (None, None) => draw_mask(ctx, seg, flats),
            }
        }
    }
}

enum ColumnSpan {
    Full,
    Clipped { top: i32, bot: i32 },
}

fn draw_columns(
    ctx: &mut RenderContext,
    seg: &RWallSegment,
    texture: TextureFrame<'_>,
    light: Fixed,
    lighting: &dyn Lighting,
    u_coord0: Fixed,
    span: ColumnSpan,
    flats: &mut dyn FlatSink,
) {
    if texture.width == 0 || texture.height == 0 {
        warn!("draw_columns: wall {} has a zero-sized texture, skipping", seg.src_wall);
        return;
    }

    for x in seg.wall_x0..=seg.wall_x1 {
        let idx = x as usize;
        let (z, dx_view) = solve_for_z(seg, ctx, x);
        if z <= 0 || z >= ctx.depth1d[idx] {
            continue;
        }

        let (orig_top, orig_bot) = (ctx.clip.top[idx], ctx.clip.bot[idx]);
        let (mut top, mut bot) = (orig_top, orig_bot);
        if let ColumnSpan::Clipped { top: ct, bot: cb } = span {
            top = top.max(ct);
            bot = bot.min(cb);
        }
        if top > bot {
            continue;
        }

        // Perspective-correct `u` (spec §4.4): interpolate over the
        // viewspace delta the column rasterizer actually solved for, not
        // over the flat screen-space column fraction.
        let du = match seg.orient {
            WallOrient::DzDx => dx_view,
            WallOrient::DxDz => z - seg.z0,
        };
        let u = u_coord0 + fixed::mul16(du, seg.u_scale);
        let colormap = lighting.compute_lighting(light, z);

        draw_column_lit(&mut ctx.framebuffer, texture, x, top, bot, u, colormap);

        ctx.depth1d[idx] = z;

        // Hand the open ceiling/floor slivers either side of the texel
        // span just drawn to the flat rasterizer (spec §4.4 step 3), then
        // narrow the column's clip band by however much of the window
        // this draw actually consumed (spec §4.4 scenario 4: a step draw
        // only closes its own band, leaving the portal's open side for
        // further walls/sectors in the same column).
        if orig_top < top {
            flats.add_ceiling_edge(x, orig_top, top - 1, z);
        }
        if bot < orig_bot {
            flats.add_floor_edge(x, bot + 1, orig_bot, z);
        }
        let touches_top = top == orig_top;
        let touches_bot = bot == orig_bot;
        if touches_top && touches_bot {
            ctx.clip.bot[idx] = top - 1;
        } else if touches_top {
            ctx.clip.top[idx] = bot + 1;
        } else if touches_bot {
            ctx.clip.bot[idx] = top - 1;
        }
    }
}

/// Draws one screen column of a wall texture, bottom row first (the
/// original walks `offset -= width` from the bottom of the texture
/// upward; spec §4.4, `rwall.cpp: drawColumn_{Fullbright,Lit}`). `colormap`
/// is applied per-texel when present; `None` draws the texels unmodified
/// (fullbright).
fn draw_column_lit(
    fb: &mut super::framebuffer::Framebuffer,
    texture: TextureFrame<'_>,
    x: i32,
    top: i32,
    bot: i32,
    u: Fixed,
    colormap: Option<&[u8; 256]>,
) {
    let tex_x = fixed::floor16(u);
    let height = bot - top + 1;
    if height <= 0 {
        return;
    }
    for (row, screen_y) in (top..=bot).enumerate() {
        // Walk the texture bottom-to-top to match the column's screen
        // direction, matching the original's `offset -= width` stepping.
        let v = height - 1 - row as i32;
        let texel = texture.texel(tex_x, v);
        let shaded = match colormap {
            Some(map) => map[texel as usize],
            None => texel,
        };
        fb.set(x, screen_y, shaded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rclassic::config::RasterConfig;
    use crate::rclassic::lighting::NullLighting;
    use crate::rclassic::texture::Texture;
    use crate::rclassic::types::{SectorFlags, TexelHeights, UvOffsets, WallFlags, WallTextures};

    fn camera_at_origin_facing_forward() -> Camera {
        Camera { pos: Vec2F::new(0, 0), cos: fixed::ONE, sin: 0, eye_height: 0 }
    }

    fn wall(v0: Vec2F, v1: Vec2F) -> RWall {
        RWall {
            v0,
            v1,
            sector: 0,
            next_sector: None,
            textures: WallTextures::default(),
            texel_heights: TexelHeights::default(),
            uv: UvOffsets::default(),
            texel_length: fixed::int_to_fixed16(1),
            light: 0,
            flags: WallFlags::empty(),
            visible: true,
            draw_flags: 0,
        }
    }

    #[test]
    fn wall_directly_ahead_is_processed_and_inserted() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let cam = camera_at_origin_facing_forward();

        // A short wall straight ahead, facing the camera (wound so the
        // cross product of the viewspace edge is positive).
        let w = wall(
            Vec2F::new(fixed::int_to_fixed16(-2), fixed::int_to_fixed16(10)),
            Vec2F::new(fixed::int_to_fixed16(2), fixed::int_to_fixed16(10)),
        );

        let endpoints = |_id: u32| {
            (
                Vec2F::new(fixed::int_to_fixed16(-2), fixed::int_to_fixed16(10)),
                Vec2F::new(fixed::int_to_fixed16(2), fixed::int_to_fixed16(10)),
            )
        };

        let visible = process(&mut ctx, 0, &w, &cam, endpoints);
        assert!(visible);
        assert_eq!(ctx.segments.len(), 1);
    }

    #[test]
    fn wall_behind_camera_is_rejected() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let cam = camera_at_origin_facing_forward();

        let w = wall(
            Vec2F::new(fixed::int_to_fixed16(-2), fixed::int_to_fixed16(-10)),
            Vec2F::new(fixed::int_to_fixed16(2), fixed::int_to_fixed16(-10)),
        );
        let endpoints = |_id: u32| (w.v0, w.v1);

        let visible = process(&mut ctx, 0, &w, &cam, endpoints);
        assert!(!visible);
        assert!(ctx.segments.is_empty());
    }

    #[test]
    fn back_facing_wall_is_culled() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let cam = camera_at_origin_facing_forward();

        // Same wall as the visible case but wound the other way.
        let w = wall(
            Vec2F::new(fixed::int_to_fixed16(2), fixed::int_to_fixed16(10)),
            Vec2F::new(fixed::int_to_fixed16(-2), fixed::int_to_fixed16(10)),
        );
        let endpoints = |_id: u32| (w.v0, w.v1);

        let visible = process(&mut ctx, 0, &w, &cam, endpoints);
        assert!(!visible);
    }

    #[test]
    fn legacy_and_fixed_near_clip_branches_both_return_geometry() {
        let v0 = Vec2F::new(fixed::int_to_fixed16(-4), fixed::int_to_fixed16(-1));
        let v1 = Vec2F::new(fixed::int_to_fixed16(4), fixed::int_to_fixed16(10));
        let near = fixed::ONE;

        let legacy = clip_near(v0, v1, near, true).unwrap();
        let fixed_up = clip_near(v0, v1, near, false).unwrap();
        assert_eq!(legacy.1, v1);
        assert_eq!(fixed_up.1, v1);
        assert_ne!(legacy.0.x, fixed_up.0.x);
    }

    #[test]
    fn draw_solid_paints_a_column() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let tex = Texture::new(4, 4, vec![9u8; 16]).unwrap();

        let seg = RWallSegment {
            src_wall: 0,
            z0: fixed::int_to_fixed16(10),
            z1: fixed::int_to_fixed16(10),
            x0_view: 0,
            wall_x0_raw: 100,
            wall_x1_raw: 100,
            wall_x0: 100,
            wall_x1: 100,
            u_coord0: 0,
            u_scale: fixed::int_to_fixed16(1),
            slope: 0,
            orient: WallOrient::DzDx,
        };

        let mut flats = crate::rclassic::collab::NullFlatSink;
        draw_solid(&mut ctx, &seg, tex.as_frame(), 0, &NullLighting, &mut flats);
        assert_eq!(ctx.framebuffer.get(100, 0), 9);
    }

    /// A `FlatSink` that records the edges it's handed, for the narrowing
    /// tests below.
    #[derive(Default)]
    struct RecordingSink {
        ceiling: Vec<(i32, i32, i32)>,
        floor: Vec<(i32, i32, i32)>,
    }

    impl FlatSink for RecordingSink {
        fn add_ceiling_edge(&mut self, x: i32, y_top: i32, y_bot: i32, _z: Fixed) {
            self.ceiling.push((x, y_top, y_bot));
        }
        fn add_floor_edge(&mut self, x: i32, y_top: i32, y_bot: i32, _z: Fixed) {
            self.floor.push((x, y_top, y_bot));
        }
    }

    fn flat_seg() -> RWallSegment {
        RWallSegment {
            src_wall: 0,
            z0: fixed::int_to_fixed16(10),
            z1: fixed::int_to_fixed16(10),
            x0_view: 0,
            wall_x0_raw: 100,
            wall_x1_raw: 100,
            wall_x0: 100,
            wall_x1: 100,
            u_coord0: 0,
            u_scale: fixed::int_to_fixed16(1),
            slope: 0,
            orient: WallOrient::DzDx,
        }
    }

    #[test]
    fn draw_solid_fully_closes_the_column_band() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let tex = Texture::new(4, 4, vec![3u8; 16]).unwrap();
        let seg = flat_seg();

        let mut flats = RecordingSink::default();
        draw_solid(&mut ctx, &seg, tex.as_frame(), 0, &NullLighting, &mut flats);

        // A solid wall spans the whole open band, so there is no sliver
        // either side to hand to the flat rasterizer, and the column
        // closes entirely (top ends up past bot).
        assert!(flats.ceiling.is_empty());
        assert!(flats.floor.is_empty());
        assert!(ctx.clip.top[100] > ctx.clip.bot[100]);
    }

    #[test]
    fn draw_bottom_leaves_the_portal_opening_clear_above() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let tex = Texture::new(4, 4, vec![5u8; 16]).unwrap();
        let seg = flat_seg();
        let step_top = 120;

        let mut flats = RecordingSink::default();
        draw_bottom(&mut ctx, &seg, tex.as_frame(), 0, &NullLighting, step_top, &mut flats);

        // The step itself (step_top..=window bottom) is consumed; the
        // portal opening above it stays open for the neighbour sector.
        assert_eq!(ctx.clip.top[100], 0);
        assert_eq!(ctx.clip.bot[100], step_top - 1);
        assert!(flats.floor.is_empty(), "no sliver below a step that reaches the window bottom");
    }

    #[test]
    fn project_height_puts_eye_level_on_the_horizon() {
        let cfg = RasterConfig::classic_320x200();
        let y = project_height(&cfg, fixed::int_to_fixed16(3), fixed::int_to_fixed16(3), fixed::int_to_fixed16(10));
        assert_eq!(y, fixed::floor16(cfg.half_height));
    }

    #[test]
    fn project_height_puts_a_higher_ceiling_above_the_horizon() {
        let cfg = RasterConfig::classic_320x200();
        let horizon = fixed::floor16(cfg.half_height);
        let y = project_height(&cfg, 0, fixed::int_to_fixed16(4), fixed::int_to_fixed16(10));
        assert!(y < horizon, "a ceiling above eye level projects to a smaller (higher) screen row");
    }

    fn sector(floor: i32, ceiling: i32) -> crate::rclassic::types::RSector {
        crate::rclassic::types::RSector {
            ceiling_height: fixed::int_to_fixed16(ceiling),
            floor_height: fixed::int_to_fixed16(floor),
            flags: SectorFlags::empty(),
            light: 0,
            walls: Vec::new(),
        }
    }

    #[test]
    fn draw_wall_dispatches_bottom_role_through_the_real_classifier() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let tex = Texture::new(4, 4, vec![7u8; 16]).unwrap();
        let seg = flat_seg();

        let front = sector(0, 4);
        let back = sector(1, 4); // raised floor, same ceiling -> Bottom.
        let eye_height = 0;
        let expected_step_top =
            project_height(&ctx.config, eye_height, back.floor_height, seg.z0.min(seg.z1));
        let mut flats = crate::rclassic::collab::NullFlatSink;

        draw_wall(
            &mut ctx,
            &seg,
            &front,
            Some(&back),
            eye_height,
            None,
            None,
            Some(tex.as_frame()),
            0,
            &NullLighting,
            &mut flats,
        );

        // The step itself (from its projected top down to the window
        // bottom) was consumed; the opening above stays clear, matching
        // `draw_bottom`'s own contract (it's the same call, reached here
        // through `DrawRole::classify` instead of a hand-fed constant).
        assert_eq!(ctx.clip.top[100], 0);
        assert_eq!(ctx.clip.bot[100], expected_step_top - 1);
    }

    #[test]
    fn draw_wall_falls_back_to_mask_without_a_texture() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);
        let seg = flat_seg();

        let front = sector(0, 4);
        let back = sector(1, 4);
        let mut flats = crate::rclassic::collab::NullFlatSink;

        draw_wall(&mut ctx, &seg, &front, Some(&back), 0, None, None, None, 0, &NullLighting, &mut flats);

        // Mask role: depth buffer is updated but the clip band is untouched.
        assert!(ctx.depth1d[100] <= fixed::int_to_fixed16(10));
    }
}
