// src/converters/background/raster.rs

use crate::converters::color;
use crate::models::fill::GradientStop;
use image::{imageops, imageops::FilterType, ImageFormat, Rgba, RgbaImage};
use log::warn;
use std::io::Cursor;

pub const RASTER_WIDTH: u32 = 1920;
pub const RASTER_HEIGHT: u32 = 1080;

const TILE: u32 = 16;
const HALF_TILE: u32 = TILE / 2;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

fn rgba(hex: &str) -> Rgba<u8> {
    match color::parse_hex(hex) {
        Some((r, g, b)) => Rgba([r, g, b, 255]),
        None => WHITE,
    }
}

fn solid_canvas(pixel: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(RASTER_WIDTH, RASTER_HEIGHT, pixel)
}

pub fn render_white() -> RgbaImage {
    solid_canvas(WHITE)
}

// --- Gradient ---

/// Gradients at 90° or 270° (±1°) run top to bottom; everything else, including stops outside
/// `0.0..=1.0`, runs left to right.
fn is_vertical(stops: &[GradientStop], angle: f64) -> bool {
    let on_axis = (angle - 90.0).abs() < 1.0 || (angle - 270.0).abs() < 1.0;
    let in_range = stops
        .iter()
        .all(|stop| (0.0..=1.0).contains(&stop.position));
    on_axis && in_range
}

/// Colour at normalized position `t`: the bracketing pair of stops if one exists, otherwise
/// the first and last stop with `t` used directly.
fn color_at(stops: &[GradientStop], t: f64) -> Rgba<u8> {
    let mut left = &stops[0];
    let mut right = &stops[stops.len() - 1];
    let mut local_t = t;
    for pair in stops.windows(2) {
        if pair[0].position <= t && t <= pair[1].position {
            left = &pair[0];
            right = &pair[1];
            let span = right.position - left.position;
            local_t = if span != 0.0 { (t - left.position) / span } else { 0.0 };
            break;
        }
    }
    let (l, r) = (rgba(&left.color), rgba(&right.color));
    let channel = |i: usize| {
        let a = l[i] as f64;
        let b = r[i] as f64;
        // Truncation, not rounding: a black→white ramp is #7f7f7f at its midpoint.
        (a + (b - a) * local_t).clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), 255])
}

/// Linear gradient along one axis. Fewer than two stops renders white.
pub fn render_gradient(stops: &[GradientStop], angle: f64) -> RgbaImage {
    if stops.len() < 2 {
        return render_white();
    }
    if is_vertical(stops, angle) {
        let rows: Vec<Rgba<u8>> = (0..RASTER_HEIGHT)
            .map(|y| color_at(stops, y as f64 / RASTER_HEIGHT as f64))
            .collect();
        RgbaImage::from_fn(RASTER_WIDTH, RASTER_HEIGHT, |_, y| rows[y as usize])
    } else {
        let cols: Vec<Rgba<u8>> = (0..RASTER_WIDTH)
            .map(|x| color_at(stops, x as f64 / RASTER_WIDTH as f64))
            .collect();
        RgbaImage::from_fn(RASTER_WIDTH, RASTER_HEIGHT, |x, _| cols[x as usize])
    }
}

// --- Pattern ---

/// Whether pixel `(x, y)` of the 16×16 tile takes the foreground colour.
fn tile_is_foreground(pattern_type: &str, x: u32, y: u32) -> bool {
    let in_rect = |x0: u32, y0: u32, x1: u32, y1: u32| x >= x0 && x <= x1 && y >= y0 && y <= y1;
    let anti_diagonal = x + y == TILE - 1 || x + y == TILE;
    let diagonal = x == y || x == y + 1;
    match pattern_type {
        "pct50" => {
            in_rect(0, 0, HALF_TILE, HALF_TILE) || in_rect(HALF_TILE, HALF_TILE, TILE, TILE)
        }
        "pct25" => in_rect(0, 0, HALF_TILE, HALF_TILE),
        "pct75" => !in_rect(HALF_TILE, HALF_TILE, TILE, TILE),
        "diagStripe" => anti_diagonal,
        "diagCross" => anti_diagonal || diagonal,
        "hsStripe" | "horzStripe" => y >= HALF_TILE,
        "vsStripe" | "vertStripe" => x >= HALF_TILE,
        _ => anti_diagonal,
    }
}

/// Tiles a 16×16 preset across the raster. Unknown presets use the diagonal stripe.
pub fn render_pattern(pattern_type: &str, fg: &str, bg: &str) -> RgbaImage {
    let (fg, bg) = (rgba(fg), rgba(bg));
    let mut tile = [[bg; TILE as usize]; TILE as usize];
    for (y, row) in tile.iter_mut().enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            if tile_is_foreground(pattern_type, x as u32, y as u32) {
                *pixel = fg;
            }
        }
    }
    RgbaImage::from_fn(RASTER_WIDTH, RASTER_HEIGHT, |x, y| {
        tile[(y % TILE) as usize][(x % TILE) as usize]
    })
}

// --- Image ---

/// CSS `background-size: cover` followed by a centre crop. Undecodable input renders white.
pub fn render_image(bytes: &[u8]) -> RgbaImage {
    let source = match image::load_from_memory(bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            warn!("Background image could not be decoded: {e}");
            return render_white();
        }
    };
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return render_white();
    }
    let (x, y, crop_w, crop_h) = cover_crop(w, h);
    let region = imageops::crop_imm(&source, x, y, crop_w, crop_h).to_image();
    imageops::resize(&region, RASTER_WIDTH, RASTER_HEIGHT, FilterType::Lanczos3)
}

/// Centred region of a `w`×`h` source with the raster's aspect ratio, as `(x, y, width, height)`.
fn cover_crop(w: u32, h: u32) -> (u32, u32, u32, u32) {
    let ratio = f64::max(
        RASTER_WIDTH as f64 / w as f64,
        RASTER_HEIGHT as f64 / h as f64,
    );
    let crop_w = ((RASTER_WIDTH as f64 / ratio).round() as u32).clamp(1, w);
    let crop_h = ((RASTER_HEIGHT as f64 / ratio).round() as u32).clamp(1, h);
    ((w - crop_w) / 2, (h - crop_h) / 2, crop_w, crop_h)
}

// --- Encoding ---

pub fn encode_png(img: &RgbaImage) -> Option<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    match img.write_to(&mut out, ImageFormat::Png) {
        Ok(()) => Some(out.into_inner()),
        Err(e) => {
            warn!("PNG encoding of background failed: {e}");
            None
        }
    }
}

/// `data:image/png;base64,...` of a raster.
pub fn to_data_url(img: &RgbaImage) -> Option<String> {
    encode_png(img).map(|png| crate::package::data_url("image/png", &png))
}
