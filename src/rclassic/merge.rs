//! Segment occlusion merge/sort (spec §4.3, grounded on `rwall.cpp:
//! wall_mergeSort`; the Rust occlusion-list idiom — a `Vec` kept sorted by
//! screen column rather than a linked list of "solid spans" — follows the
//! teacher's `renderer::software::renderer::add_solid_seg`).
//!
//! Walls are inserted into the context one at a time, front sector first.
//! Each insertion compares the new segment's screen-column range against
//! every already-inserted segment it overlaps; where two segments overlap
//! in `x` but not in depth, the overlap is resolved by keeping the nearer
//! one and splitting the farther one into up to two surviving sub-segments
//! (`split_walls`, spec §5's `MAX_SPLIT_WALLS` arena).

use log::trace;

use super::context::RenderContext;
use super::fixed::{self, Fixed};
use super::types::{RWallSegment, Vec2F};

/// FRONT/BACK classification for one (new, existing) pair at the columns
/// they share (spec §4.3 result table).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Priority {
    /// The new segment occludes the existing one in the shared range.
    NewInFront,
    /// The existing segment occludes the new one in the shared range.
    ExistingInFront,
}

/// Perp-product "does segment A cross the infinite line through B" test
/// (spec §4.3, §9: kept at the original's reduced 12-bit fractional
/// precision so ties resolve exactly the way the DOS build did).
fn segment_crosses_line(a0: Vec2F, a1: Vec2F, b0: Vec2F, b1: Vec2F) -> bool {
    let bx = fixed::fixed16_to12(b1.x - b0.x);
    let bz = fixed::fixed16_to12(b1.z - b0.z);

    let cross = |p: Vec2F| -> Fixed {
        let px = fixed::fixed16_to12(p.x - b0.x);
        let pz = fixed::fixed16_to12(p.z - b0.z);
        fixed::mul16(px, bz) - fixed::mul16(pz, bx)
    };

    let c0 = cross(a0);
    let c1 = cross(a1);
    (c0 > 0) != (c1 > 0)
}

/// Decides whether `new_seg` or `existing` wins the columns they share, by
/// first comparing the nearer viewspace `z` at each segment's own x0, and
/// falling back to a camera-origin-relative perp-product crossing test
/// (spec §4.3, `rwall.cpp:439-456`) when that's ambiguous (both segments
/// present the same near/far ordering at their endpoints, which only
/// happens when they genuinely cross in depth within the shared column
/// range).
fn resolve_priority(
    new_seg: &RWallSegment,
    new_v0: Vec2F,
    new_v1: Vec2F,
    existing: &RWallSegment,
    existing_v0: Vec2F,
    existing_v1: Vec2F,
) -> Priority {
    if new_seg.z0.min(new_seg.z1) < existing.z0.min(existing.z1)
        && new_seg.z0.max(new_seg.z1) < existing.z0.max(existing.z1)
    {
        return Priority::NewInFront;
    }
    if existing.z0.min(existing.z1) < new_seg.z0.min(new_seg.z1)
        && existing.z0.max(existing.z1) < new_seg.z0.max(new_seg.z1)
    {
        return Priority::ExistingInFront;
    }

    // Ambiguous: both segments present the same near/far ordering at their
    // own endpoints, which only happens when they genuinely cross in depth.
    // Refute the tentative winner by checking whether a ray from its own
    // near vertex to the camera (the viewspace origin) actually crosses the
    // other wall's line — the silhouette-artifact test from spec §4.3 /
    // `rwall.cpp:439-456`. Without the origin vertex this degenerates into
    // a direct segment-vs-segment test that only agrees with the original
    // by coincidence.
    let origin = Vec2F::new(0, 0);
    if new_seg.z0 < existing.z0 {
        // Tentative: new segment in front.
        let refuted = !segment_crosses_line(existing_v0, origin, new_v0, new_v1)
            && segment_crosses_line(new_v1, origin, existing_v0, existing_v1);
        if refuted {
            Priority::ExistingInFront
        } else {
            Priority::NewInFront
        }
    } else {
        // Symmetric: tentative existing-in-front.
        let refuted = !segment_crosses_line(new_v0, origin, existing_v0, existing_v1)
            && segment_crosses_line(existing_v1, origin, new_v0, new_v1);
        if refuted {
            Priority::NewInFront
        } else {
            Priority::ExistingInFront
        }
    }
}

/// Clips `seg` down to the screen-column range `[lo, hi]` (inclusive),
/// rescaling the `u` interpolation endpoints so texturing stays continuous
/// across the cut. Does not touch `z0`/`z1`/`slope` — those are resampled
/// per column by the column rasterizer, not by the clip.
fn clip_to_columns(seg: &RWallSegment, lo: i32, hi: i32) -> RWallSegment {
    debug_assert!(lo <= hi);
    let mut out = *seg;
    if lo == seg.wall_x0 && hi == seg.wall_x1 {
        return out;
    }
    let span = (seg.wall_x1 - seg.wall_x0).max(1) as Fixed;
    let t0 = fixed::div16(fixed::int_to_fixed16(lo - seg.wall_x0), span);
    let t1 = fixed::div16(fixed::int_to_fixed16(hi - seg.wall_x0), span);
    let u_span = seg.u_scale;
    out.u_coord0 = seg.u_coord0 + fixed::mul16(t0, u_span);
    out.u_scale = fixed::mul16(t1 - t0, u_span);
    out.wall_x0 = lo;
    out.wall_x1 = hi;
    out
}

/// Inserts `new_seg` into `ctx.segments`, splitting it and/or the segments
/// it overlaps so the arena ends up holding a set of non-overlapping spans
/// covering exactly the visible extent of every wall inserted so far.
///
/// `wall_endpoints` returns the viewspace endpoints for the wall a segment
/// came from, needed only on the (rare) ambiguous-depth path.
pub fn merge_sort(
    ctx: &mut RenderContext,
    mut new_seg: RWallSegment,
    wall_endpoints: impl Fn(u32) -> (Vec2F, Vec2F),
) {
    if new_seg.wall_x0 > new_seg.wall_x1 {
        return;
    }

    let (new_v0, new_v1) = wall_endpoints(new_seg.src_wall);

    let mut i = 0;
    while i < ctx.segments.len() {
        let existing = ctx.segments[i];

        let lo = new_seg.wall_x0.max(existing.wall_x0);
        let hi = new_seg.wall_x1.min(existing.wall_x1);
        if lo > hi {
            i += 1;
            continue;
        }

        let (existing_v0, existing_v1) = wall_endpoints(existing.src_wall);
        let priority = resolve_priority(&new_seg, new_v0, new_v1, &existing, existing_v0, existing_v1);

        match priority {
            Priority::NewInFront => {
                trace!(
                    "merge_sort: new wall {} occludes existing wall {} over [{lo},{hi}]",
                    new_seg.src_wall, existing.src_wall
                );
                ctx.segments.swap_remove(i);
                if existing.wall_x0 < lo {
                    let left = clip_to_columns(&existing, existing.wall_x0, lo - 1);
                    if !ctx.push_split_wall(left) {
                        return;
                    }
                    ctx.segments.push(left);
                }
                if existing.wall_x1 > hi {
                    let right = clip_to_columns(&existing, hi + 1, existing.wall_x1);
                    if !ctx.push_split_wall(right) {
                        return;
                    }
                    ctx.segments.push(right);
                }
                // Do not advance `i`: `swap_remove` moved a different
                // element into this slot (or shrank the vec).
            }
            Priority::ExistingInFront => {
                trace!(
                    "merge_sort: existing wall {} occludes new wall {} over [{lo},{hi}]",
                    existing.src_wall, new_seg.src_wall
                );
                if new_seg.wall_x0 < lo {
                    let left = clip_to_columns(&new_seg, new_seg.wall_x0, lo - 1);
                    if !ctx.push_split_wall(left) {
                        return;
                    }
                    ctx.segments.push(left);
                }
                if new_seg.wall_x1 > hi {
                    new_seg = clip_to_columns(&new_seg, hi + 1, new_seg.wall_x1);
                    i += 1;
                    continue;
                } else {
                    // Fully occluded by `existing`: nothing left to insert.
                    return;
                }
            }
        }
    }

    if !ctx.push_segment(new_seg) {
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rclassic::config::RasterConfig;
    use crate::rclassic::types::WallOrient;

    fn seg(src_wall: u32, x0: i32, x1: i32, z0: Fixed, z1: Fixed) -> RWallSegment {
        RWallSegment {
            src_wall,
            z0,
            z1,
            x0_view: 0,
            wall_x0_raw: x0,
            wall_x1_raw: x1,
            wall_x0: x0,
            wall_x1: x1,
            u_coord0: 0,
            u_scale: fixed::int_to_fixed16(x1 - x0 + 1),
            slope: 0,
            orient: WallOrient::DzDx,
        }
    }

    fn flat_endpoints(_wall: u32) -> (Vec2F, Vec2F) {
        (Vec2F::new(0, 0), Vec2F::new(fixed::int_to_fixed16(1), 0))
    }

    #[test]
    fn disjoint_segments_both_survive() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);

        merge_sort(&mut ctx, seg(0, 0, 9, fixed::int_to_fixed16(10), fixed::int_to_fixed16(10)), flat_endpoints);
        merge_sort(&mut ctx, seg(1, 10, 19, fixed::int_to_fixed16(10), fixed::int_to_fixed16(10)), flat_endpoints);

        assert_eq!(ctx.segments.len(), 2);
    }

    #[test]
    fn nearer_wall_occludes_farther_overlap() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);

        // Far wall spans 0..19 at z=20; near wall spans 5..14 at z=10.
        merge_sort(&mut ctx, seg(0, 0, 19, fixed::int_to_fixed16(20), fixed::int_to_fixed16(20)), flat_endpoints);
        merge_sort(&mut ctx, seg(1, 5, 14, fixed::int_to_fixed16(10), fixed::int_to_fixed16(10)), flat_endpoints);

        // The far wall should have been split into a left remainder
        // (0..4) and a right remainder (15..19), plus the near wall
        // occupying 5..14: three spans total.
        assert_eq!(ctx.segments.len(), 3);
        let mut ranges: Vec<(i32, i32)> = ctx.segments.iter().map(|s| (s.wall_x0, s.wall_x1)).collect();
        ranges.sort();
        assert_eq!(ranges, vec![(0, 4), (5, 14), (15, 19)]);
    }

    #[test]
    fn farther_wall_is_fully_discarded_under_nearer_wall() {
        let cfg = RasterConfig::classic_320x200();
        let mut ctx = RenderContext::new(cfg);

        merge_sort(&mut ctx, seg(0, 0, 9, fixed::int_to_fixed16(10), fixed::int_to_fixed16(10)), flat_endpoints);
        merge_sort(&mut ctx, seg(1, 0, 9, fixed::int_to_fixed16(50), fixed::int_to_fixed16(50)), flat_endpoints);

        assert_eq!(ctx.segments.len(), 1);
        assert_eq!(ctx.segments[0].src_wall, 0);
    }
}
