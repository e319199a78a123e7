use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use resvg::tiny_skia::{
    FilterQuality, Paint, PathBuilder, Pattern, Pixmap, Rect, SpreadMode, Transform,
};

use crate::color::Color;
use crate::error::{AssetError, RenderWarning};
use crate::model::{AssetKind, Bounds, CustomShapeDefinition, Shape};

use super::RenderContext;

// Start tags whose id ends in `_vfill`, e.g. `<path id="body_vfill" .../>`.
static VFILL_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"<(?P<name>[A-Za-z][\w:.-]*)"#,
        r#"(?P<attrs>[^<>]*\sid\s*=\s*(?:"[^"]+_vfill"|'[^']+_vfill')[^<>]*)>"#,
    ))
    .unwrap()
});
static FILL_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sfill\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap());
static STYLE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sstyle\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#).unwrap());
static FILL_DECL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|;)\s*fill\s*:[^;]*").unwrap());
// usvg is given no fonts, so these elements never reach the raster.
static TEXT_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<text[\s>/]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Where a raster asset of `image_width` x `image_height` lands inside
/// `bounds`. Without stretching the asset keeps its aspect ratio and one side
/// always matches the bounds exactly.
pub fn fit_raster(
    bounds: Placement,
    image_width: u32,
    image_height: u32,
    stretches: bool,
) -> Placement {
    if stretches || image_width == 0 || image_height == 0 {
        return bounds;
    }
    let (iw, ih) = (i64::from(image_width), i64::from(image_height));
    let (bw, bh) = (i64::from(bounds.width), i64::from(bounds.height));

    let fitted_height = bw * ih / iw;
    if fitted_height <= bh {
        Placement {
            x: bounds.x,
            y: bounds.y + ((bh - fitted_height) / 2) as i32,
            width: bounds.width,
            height: fitted_height as i32,
        }
    } else {
        let fitted_width = iw * bh / ih;
        Placement {
            x: bounds.x + ((bw - fitted_width) / 2) as i32,
            y: bounds.y,
            width: fitted_width as i32,
            height: bounds.height,
        }
    }
}

fn pixel_bounds(bounds: Bounds) -> Placement {
    Placement {
        x: bounds.x.round() as i32,
        y: bounds.y.round() as i32,
        width: bounds.width.round() as i32,
        height: bounds.height.round() as i32,
    }
}

pub(super) fn render_custom_shape(
    ctx: &mut RenderContext,
    shape: &Shape,
    definition: &CustomShapeDefinition,
) {
    let bounds = shape.bounds();
    if definition.has_border {
        draw_border(ctx, shape, bounds);
    }

    let result = match definition.kind {
        AssetKind::Raster => draw_raster(ctx, definition, bounds),
        AssetKind::Vector => draw_vector(ctx, definition, bounds, shape.fill_color),
    };
    if let Err(err) = result {
        log::warn!("skipping custom shape image: {err}");
        ctx.warnings.push(err.into());
    }
}

// Four separate segments rather than one rectangle, so every corner gets
// the pen's own caps.
fn draw_border(ctx: &mut RenderContext, shape: &Shape, bounds: Bounds) {
    let (left, top, right, bottom) = (bounds.x, bounds.y, bounds.right(), bounds.bottom());
    let segments = [
        (left, top, right, top),
        (right, top, right, bottom),
        (left, bottom, right, bottom),
        (left, top, left, bottom),
    ];
    for (x0, y0, x1, y1) in segments {
        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        pb.line_to(x1, y1);
        if let Some(path) = pb.finish() {
            ctx.stroke_path(&path, shape.stroke_color, shape.dashed);
        }
    }
}

fn draw_raster(
    ctx: &mut RenderContext,
    definition: &CustomShapeDefinition,
    bounds: Bounds,
) -> Result<(), AssetError> {
    let image = load_raster(&definition.path)?;
    let target = fit_raster(
        pixel_bounds(bounds),
        image.width(),
        image.height(),
        definition.stretches,
    );
    let empty = || AssetError::Empty {
        path: definition.path.clone(),
    };
    let rect = Rect::from_xywh(
        target.x as f32,
        target.y as f32,
        target.width as f32,
        target.height as f32,
    )
    .ok_or_else(empty)?;

    let scale_x = rect.width() / image.width() as f32;
    let scale_y = rect.height() / image.height() as f32;
    let mut paint = Paint::default();
    paint.anti_alias = ctx.anti_alias;
    paint.shader = Pattern::new(
        image.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bicubic,
        1.0,
        Transform::from_row(scale_x, 0.0, 0.0, scale_y, rect.x(), rect.y()),
    );
    ctx.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    Ok(())
}

fn load_raster(path: &Path) -> Result<Pixmap, AssetError> {
    let bytes = fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Pixmap::decode_png(&bytes).map_err(|err| AssetError::Png {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn draw_vector(
    ctx: &mut RenderContext,
    definition: &CustomShapeDefinition,
    bounds: Bounds,
    fill_override: Option<Color>,
) -> Result<(), AssetError> {
    let asset = load_vector(&definition.path, fill_override)?;
    if asset.has_text {
        log::warn!(
            "text in SVG asset {} is not rendered",
            definition.path.display()
        );
        ctx.warnings.push(RenderWarning::SvgText {
            path: definition.path.clone(),
        });
    }
    let tree = asset.tree;
    let size = tree.size();
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return Err(AssetError::Empty {
            path: definition.path.clone(),
        });
    }

    let mut scale_x = bounds.width / size.width();
    let mut scale_y = bounds.height / size.height();
    if !definition.stretches {
        let scale = scale_x.min(scale_y);
        scale_x = scale;
        scale_y = scale;
    }
    let offset_x = bounds.x + (bounds.width - size.width() * scale_x) / 2.0;
    let offset_y = bounds.y + (bounds.height - size.height() * scale_y) / 2.0;

    let transform = Transform::from_row(scale_x, 0.0, 0.0, scale_y, offset_x, offset_y);
    resvg::render(&tree, transform, &mut ctx.pixmap.as_mut());
    Ok(())
}

struct VectorAsset {
    tree: usvg::Tree,
    has_text: bool,
}

fn load_vector(path: &Path, fill_override: Option<Color>) -> Result<VectorAsset, AssetError> {
    let mut data = fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(color) = fill_override {
        data = recolor_vfill(&String::from_utf8_lossy(&data), color).into_bytes();
    }
    let has_text = contains_text(&String::from_utf8_lossy(&data));

    let mut options = usvg::Options::default();
    options.resources_dir = path.parent().map(Path::to_path_buf);
    let tree = usvg::Tree::from_data(&data, &options).map_err(|source| AssetError::Svg {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(VectorAsset { tree, has_text })
}

fn contains_text(svg: &str) -> bool {
    TEXT_ELEMENT_RE.is_match(svg)
}

/// Rewrites the fill of every element whose id ends in `_vfill`. Other
/// elements keep their authored colors.
pub fn recolor_vfill(svg: &str, color: Color) -> String {
    let hex = color.to_hex();
    VFILL_TAG_RE
        .replace_all(svg, |caps: &Captures| {
            let name = &caps["name"];
            let attrs = FILL_ATTR_RE.replace_all(&caps["attrs"], "");
            if STYLE_ATTR_RE.is_match(&attrs) {
                let attrs = STYLE_ATTR_RE.replace(&attrs, |style: &Captures| {
                    let (body, quote) = match style.name("dq") {
                        Some(body) => (body.as_str(), '"'),
                        None => (style.name("sq").map_or("", |m| m.as_str()), '\''),
                    };
                    let body = FILL_DECL_RE.replace_all(body, "");
                    let body = body.trim_start_matches(';');
                    format!(" style={quote}fill:{hex};{body}{quote}")
                });
                format!("<{name}{attrs}>")
            } else {
                format!("<{name} fill=\"{hex}\"{attrs}>")
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn area(x: i32, y: i32, width: i32, height: i32) -> Placement {
        Placement { x, y, width, height }
    }

    #[test]
    fn stretching_fills_bounds_exactly() {
        let bounds = area(10, 20, 100, 30);
        assert_eq!(fit_raster(bounds, 50, 50, true), bounds);
    }

    #[test]
    fn wide_image_fits_width_and_centres_vertically() {
        let placed = fit_raster(area(0, 0, 100, 100), 200, 100, false);
        assert_eq!(placed, area(0, 25, 100, 50));
    }

    #[test]
    fn tall_image_fits_height_and_centres_horizontally() {
        let placed = fit_raster(area(10, 10, 100, 50), 20, 40, false);
        assert_eq!(placed, area(47, 10, 25, 50));
    }

    #[test]
    fn exact_aspect_fills_bounds() {
        assert_eq!(fit_raster(area(0, 0, 60, 30), 20, 10, false), area(0, 0, 60, 30));
    }

    proptest! {
        #[test]
        fn aspect_fit_stays_within_bounds(
            bw in 1i32..2000,
            bh in 1i32..2000,
            iw in 1u32..4000,
            ih in 1u32..4000,
        ) {
            let placed = fit_raster(area(0, 0, bw, bh), iw, ih, false);
            prop_assert!(placed.width <= bw);
            prop_assert!(placed.height <= bh);
            prop_assert!(placed.width == bw || placed.height == bh);
            prop_assert!(placed.x >= 0 && placed.y >= 0);
        }
    }

    #[test]
    fn recolors_only_vfill_elements() {
        let svg = concat!(
            r##"<svg><rect id="body_vfill" fill="#00ff00" width="5"/>"##,
            r##"<rect id="frame" fill="#0000ff"/></svg>"##,
        );
        let out = recolor_vfill(svg, Color::rgb(255, 0, 0));
        assert_eq!(
            out,
            concat!(
                r##"<svg><rect fill="#ff0000" id="body_vfill" width="5"/>"##,
                r##"<rect id="frame" fill="#0000ff"/></svg>"##,
            )
        );
    }

    #[test]
    fn vfill_needs_a_prefix() {
        let svg = r#"<svg><rect id="_vfill" fill="blue"/></svg>"#;
        assert_eq!(recolor_vfill(svg, Color::BLACK), svg);
    }

    #[test]
    fn vfill_overrides_style_declarations() {
        let svg = r#"<g id='shape_vfill' style="stroke:black;fill:blue;fill-opacity:0.5">"#;
        let out = recolor_vfill(svg, Color::rgb(1, 2, 3));
        assert_eq!(
            out,
            r#"<g id='shape_vfill' style="fill:#010203;stroke:black;fill-opacity:0.5">"#
        );
    }

    #[test]
    fn detects_text_elements() {
        assert!(contains_text(r#"<svg><text x="1">hi</text></svg>"#));
        assert!(contains_text("<svg><text>hi</text></svg>"));
        assert!(!contains_text(r#"<svg><textPath href="a"/><rect/></svg>"#));
        assert!(!contains_text("<svg><!-- context --></svg>"));
    }

    #[test]
    fn missing_raster_asset_reports_read_error() {
        let err = load_raster(Path::new("/nonexistent/asset.png")).unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
    }
}
