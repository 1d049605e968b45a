//! Fixed-point wall rasterizer core.
//!
//! This module is a self-contained re-implementation of the classic
//! "process a wall, merge it into the screen's occlusion list, rasterize
//! its visible columns" pipeline found in id-Tech/Build-style software
//! renderers. It owns no asset format, no BSP traversal, and no window —
//! those are the surrounding engine's job, reached here only through the
//! [`collab`] traits and the plain data in [`types`].
//!
//! A typical frame:
//!
//! ```ignore
//! ctx.begin_frame();
//! for sector in visible_sectors {
//!     ctx.begin_sector();
//!     for &wall_id in &sector.walls {
//!         wall::process(&mut ctx, wall_id, &walls[wall_id as usize], &camera, endpoints);
//!     }
//!     for seg in ctx.segments.clone() {
//!         let wall = &walls[seg.src_wall as usize];
//!         let front = &sectors[wall.sector as usize];
//!         let back = wall.next_sector.map(|s| &sectors[s as usize]);
//!         // wall::draw_wall picks Solid/Bottom/Top/TopAndBottom/Mask via
//!         // DrawRole::classify(front, back) and projects the relevant
//!         // step heights to screen rows itself.
//!         wall::draw_wall(&mut ctx, &seg, front, back, eye_height, mid, top, bot, light, &lighting, &mut flats);
//!     }
//! }
//! ```

pub mod collab;
pub mod config;
pub mod context;
pub mod error;
pub mod fixed;
pub mod framebuffer;
pub mod lighting;
pub mod merge;
pub mod texture;
pub mod types;
pub mod wall;

pub use collab::{FlatSink, NullFlatSink};
pub use config::{FixedPrecision, RasterConfig};
pub use context::RenderContext;
pub use error::RclassicError;
pub use fixed::Fixed;
pub use lighting::{BandedColormap, Lighting, NullLighting};
pub use texture::{Texture, TextureFrame};
pub use types::{DrawRole, RSector, RWall, RWallSegment, SectorFlags, WallFlags, WallOrient};
pub use wall::Camera;
