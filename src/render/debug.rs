use resvg::tiny_skia::{ColorU8, Pixmap};

use crate::color::Color;
use crate::model::GraphicalGrid;

const DEBUG_LINE: Color = Color::rgb(170, 170, 170);

/// Grid lines at every cell boundary, XOR-ed against white so they stay
/// visible on any fill. Where two lines cross the pixel flips back.
pub(super) fn draw_debug_grid(pixmap: &mut Pixmap, grid: &GraphicalGrid) {
    let mask = [DEBUG_LINE.r ^ 255, DEBUG_LINE.g ^ 255, DEBUG_LINE.b ^ 255];
    let width = pixmap.width();
    let height = pixmap.height();

    for x in (0..width).step_by(grid.cell_width.max(1) as usize) {
        for y in 0..height {
            xor_pixel(pixmap, x, y, mask);
        }
    }
    for y in (0..height).step_by(grid.cell_height.max(1) as usize) {
        for x in 0..width {
            xor_pixel(pixmap, x, y, mask);
        }
    }
}

fn xor_pixel(pixmap: &mut Pixmap, x: u32, y: u32, mask: [u8; 3]) {
    let idx = (y * pixmap.width() + x) as usize;
    let pixels = pixmap.pixels_mut();
    let color = pixels[idx].demultiply();
    pixels[idx] = ColorU8::from_rgba(
        color.red() ^ mask[0],
        color.green() ^ mask[1],
        color.blue() ^ mask[2],
        color.alpha(),
    )
    .premultiply();
}
