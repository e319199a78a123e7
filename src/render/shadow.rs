use resvg::tiny_skia::{FillRule, Paint, Pixmap, Transform};

use crate::color::Color;
use crate::model::{GraphicalGrid, Shape, ShapeKind};

use super::geometry::render_path;

const SHADOW_OFFSET_DIVISOR: f32 = 3.333;
const BLUR_SIZE: usize = 6;
// Kernel origin as an image convolution places it: (size - 1) / 2.
const BLUR_ORIGIN: usize = (BLUR_SIZE - 1) / 2;

pub fn shadow_offset(grid: &GraphicalGrid) -> f32 {
    grid.min_cell_dimension() / SHADOW_OFFSET_DIVISOR
}

/// Fills a translated gray silhouette for every shape that casts a shadow.
/// Returns how many silhouettes were drawn.
pub fn render_shadows(
    pixmap: &mut Pixmap,
    shapes: &[Shape],
    grid: &GraphicalGrid,
    anti_alias: bool,
) -> usize {
    let offset = shadow_offset(grid);
    let mut paint = Paint::default();
    paint.set_color(Color::SHADOW.to_skia());
    paint.anti_alias = anti_alias;

    let mut drawn = 0;
    for shape in shapes {
        if !shape.drops_shadow || matches!(shape.kind, ShapeKind::Custom(_)) {
            continue;
        }
        let Some(path) = render_path(shape, grid) else {
            continue;
        };
        let Some(shadow) = path.transform(Transform::from_translate(offset, offset)) else {
            continue;
        };
        pixmap.fill_path(&shadow, &paint, FillRule::Winding, Transform::identity(), None);
        drawn += 1;
    }
    drawn
}

/// Uniform 6x6 box blur over the whole raster. Pixels whose kernel window
/// would leave the raster are copied unchanged.
pub fn box_blur(source: &Pixmap) -> Pixmap {
    let mut destination = source.clone();
    let width = source.width() as usize;
    let height = source.height() as usize;
    if width < BLUR_SIZE || height < BLUR_SIZE {
        return destination;
    }

    let taps = (BLUR_SIZE * BLUR_SIZE) as u32;
    let src = source.data();
    let dst = destination.data_mut();
    let stride = width * 4;

    for y in BLUR_ORIGIN..=height - BLUR_SIZE + BLUR_ORIGIN {
        for x in BLUR_ORIGIN..=width - BLUR_SIZE + BLUR_ORIGIN {
            let mut sums = [0u32; 4];
            for ky in 0..BLUR_SIZE {
                let row = (y + ky - BLUR_ORIGIN) * stride;
                for kx in 0..BLUR_SIZE {
                    let at = row + (x + kx - BLUR_ORIGIN) * 4;
                    for (sum, value) in sums.iter_mut().zip(&src[at..at + 4]) {
                        *sum += u32::from(*value);
                    }
                }
            }
            let at = y * stride + x * 4;
            for (out, sum) in dst[at..at + 4].iter_mut().zip(sums) {
                // premultiplied channels stay <= alpha under the same rounding
                *out = ((sum + taps / 2) / taps) as u8;
            }
        }
    }
    destination
}
