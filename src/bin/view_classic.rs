//! Interactive demo for `rclassic`: flies a camera around a small synthetic
//! box room so the wall-processing and column-rasterizing pipeline has
//! something to draw without needing a WAD on disk.

use std::time::{Duration, Instant};

use clap::Parser;
use minifb::{Key, Window, WindowOptions};

use rclassic::collab::NullFlatSink;
use rclassic::config::cli::RasterArgs;
use rclassic::lighting::NullLighting;
use rclassic::texture::Texture;
use rclassic::types::{RSector, RWall, SectorFlags, TexelHeights, UvOffsets, Vec2F, WallFlags, WallTextures};
use rclassic::wall::{self, Camera};
use rclassic::{RasterConfig, RenderContext};
use rclassic::fixed::{self, Fixed};

#[derive(Parser, Debug)]
#[command(about = "rclassic wall-rasterizer demo")]
struct Cli {
    #[command(flatten)]
    raster: RasterArgs,
}

/// A closed 8x8 box (sector 0) with a small raised dais (sector 1) in the
/// middle, connected by a portal whose four boundary walls carry a
/// `Bottom` step texture. The outer walls are wound clockwise (`v0 =
/// corners[i+1]`, `v1 = corners[i]`) so their viewspace edge has `side >=
/// 0` for a camera standing inside the room (spec §4.2 step 3: `side =
/// z0*(x1-x0) - x0*(z1-z0)`, dropped when negative). The dais walls face
/// the opposite way — the camera views them from *outside* the smaller
/// box — so they keep the corners' natural counter-clockwise order.
fn build_room(texel_length: Fixed) -> (Vec<RWall>, Vec<RSector>) {
    let outer = [
        Vec2F::new(fixed::int_to_fixed16(-4), fixed::int_to_fixed16(-4)),
        Vec2F::new(fixed::int_to_fixed16(4), fixed::int_to_fixed16(-4)),
        Vec2F::new(fixed::int_to_fixed16(4), fixed::int_to_fixed16(4)),
        Vec2F::new(fixed::int_to_fixed16(-4), fixed::int_to_fixed16(4)),
    ];
    let dais = [
        Vec2F::new(fixed::int_to_fixed16(-1), fixed::int_to_fixed16(2)),
        Vec2F::new(fixed::int_to_fixed16(1), fixed::int_to_fixed16(2)),
        Vec2F::new(fixed::int_to_fixed16(1), fixed::int_to_fixed16(4)),
        Vec2F::new(fixed::int_to_fixed16(-1), fixed::int_to_fixed16(4)),
    ];

    let mut walls: Vec<RWall> = (0..4)
        .map(|i| RWall {
            v0: outer[(i + 1) % 4],
            v1: outer[i],
            sector: 0,
            next_sector: None,
            textures: WallTextures { mid: Some(0), top: None, bot: None, sign: None },
            texel_heights: TexelHeights::default(),
            uv: UvOffsets::default(),
            texel_length,
            light: 0,
            flags: WallFlags::empty(),
            visible: false,
            draw_flags: 0,
        })
        .collect();

    walls.extend((0..4).map(|i| RWall {
        v0: dais[i],
        v1: dais[(i + 1) % 4],
        sector: 0,
        next_sector: Some(1),
        textures: WallTextures { mid: None, top: None, bot: Some(1), sign: None },
        texel_heights: TexelHeights::default(),
        uv: UvOffsets::default(),
        texel_length,
        light: 0,
        flags: WallFlags::empty(),
        visible: false,
        draw_flags: 0,
    }));

    let sectors = vec![
        RSector {
            ceiling_height: fixed::int_to_fixed16(4),
            floor_height: fixed::int_to_fixed16(0),
            flags: SectorFlags::empty(),
            light: 0,
            walls: (0..8).collect(),
        },
        RSector {
            ceiling_height: fixed::int_to_fixed16(4),
            floor_height: fixed::int_to_fixed16(1),
            flags: SectorFlags::empty(),
            light: 0,
            walls: Vec::new(),
        },
    ];

    (walls, sectors)
}

/// A 32x32 black/white checker, column-major per [`Texture`]'s storage
/// contract.
fn checker_texture() -> Texture {
    const SIZE: u32 = 32;
    let mut image = vec![0u8; (SIZE * SIZE) as usize];
    for x in 0..SIZE {
        for y in 0..SIZE {
            let lit = ((x / 4) + (y / 4)) % 2 == 0;
            image[(x * SIZE + y) as usize] = if lit { 220 } else { 40 };
        }
    }
    Texture::new(SIZE, SIZE, image).expect("32 is a power of two")
}

/// A 32x32 horizontal-stripe texture, used for the dais's step face so it
/// reads distinctly from the outer room's checker walls.
fn stripe_texture() -> Texture {
    const SIZE: u32 = 32;
    let mut image = vec![0u8; (SIZE * SIZE) as usize];
    for x in 0..SIZE {
        for y in 0..SIZE {
            image[(x * SIZE + y) as usize] = if (y / 4) % 2 == 0 { 180 } else { 60 };
        }
    }
    Texture::new(SIZE, SIZE, image).expect("32 is a power of two")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.raster.into_config()?;
    let (width, height) = (config.width, config.height);

    let (walls, sectors) = build_room(fixed::int_to_fixed16(8));
    let textures = [checker_texture(), stripe_texture()];
    let eye_height = fixed::int_to_fixed16(0);

    let mut ctx = RenderContext::new(config);

    let mut win = Window::new("rclassic wall demo", width as usize, height as usize, WindowOptions::default())?;
    win.set_target_fps(60);
    let mut pixel_buf = vec![0u32; (width * height) as usize];

    let mut cam_x = 0.0f32;
    let mut cam_z = 0.0f32;
    let mut yaw = 0.0f32;

    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        let speed = 0.08;
        let turn = 0.04;
        if win.is_key_down(Key::Left) {
            yaw -= turn;
        }
        if win.is_key_down(Key::Right) {
            yaw += turn;
        }
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            cam_x += yaw.sin() * speed;
            cam_z += yaw.cos() * speed;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            cam_x -= yaw.sin() * speed;
            cam_z -= yaw.cos() * speed;
        }

        let camera = Camera {
            pos: Vec2F::new(fixed::float_to_fixed16(cam_x), fixed::float_to_fixed16(cam_z)),
            cos: fixed::float_to_fixed16(yaw.cos()),
            sin: fixed::float_to_fixed16(yaw.sin()),
            eye_height,
        };

        ctx.begin_frame();
        ctx.framebuffer.clear(0);
        ctx.begin_sector();

        let endpoints = |id: u32| {
            let w = &walls[id as usize];
            (camera.to_viewspace(w.v0), camera.to_viewspace(w.v1))
        };

        for (id, w) in walls.iter().enumerate() {
            wall::process(&mut ctx, id as u32, w, &camera, endpoints);
        }

        let segs = ctx.segments.clone();
        let mut flats = NullFlatSink;
        for seg in &segs {
            let w = &walls[seg.src_wall as usize];
            let front = &sectors[w.sector as usize];
            let back = w.next_sector.map(|s| &sectors[s as usize]);
            let mid = w.textures.mid.map(|t| textures[t as usize].as_frame());
            let top = w.textures.top.map(|t| textures[t as usize].as_frame());
            let bot = w.textures.bot.map(|t| textures[t as usize].as_frame());
            wall::draw_wall(&mut ctx, seg, front, back, eye_height, mid, top, bot, w.light, &NullLighting, &mut flats);
        }

        for (i, &gray) in ctx.framebuffer.as_slice().iter().enumerate() {
            let g = gray as u32;
            pixel_buf[i] = (g << 16) | (g << 8) | g;
        }
        win.update_with_buffer(&pixel_buf, width as usize, height as usize)?;

        acc_time += t0.elapsed();
        acc_frames += 1;
        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            println!("avg render: {avg_ms:.2} ms ({:.1} FPS)", 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }

    Ok(())
}
