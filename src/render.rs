mod custom;
mod debug;
mod geometry;
mod order;
mod shadow;
mod stroke;
mod text;

use std::path::Path;

use resvg::tiny_skia::{FillRule, Paint, Path as SkiaPath, Pixmap, Transform};

use crate::color::Color;
use crate::config::RenderingOptions;
use crate::error::{OutputError, RenderError, RenderWarning};
use crate::fonts::{FontBook, GlyphSource};
use crate::model::{Diagram, GraphicalGrid, Shape, ShapeKind};

pub use custom::{Placement, fit_raster, recolor_vfill};
pub use geometry::render_path;
pub use order::{area_order, depth_order};
pub use shadow::{box_blur, render_shadows, shadow_offset};
pub use stroke::StrokeStyles;

/// Working state of a single render call.
pub(crate) struct RenderContext {
    pub(crate) pixmap: Pixmap,
    pub(crate) strokes: StrokeStyles,
    pub(crate) anti_alias: bool,
    pub(crate) warnings: Vec<RenderWarning>,
}

impl RenderContext {
    fn new(pixmap: Pixmap, strokes: StrokeStyles, anti_alias: bool) -> Self {
        Self {
            pixmap,
            strokes,
            anti_alias,
            warnings: Vec::new(),
        }
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = self.anti_alias;
        paint
    }

    pub(crate) fn fill_path(&mut self, path: &SkiaPath, color: Color) {
        self.fill_path_offset(path, color, 0.0, 0.0);
    }

    pub(crate) fn fill_path_offset(&mut self, path: &SkiaPath, color: Color, dx: f32, dy: f32) {
        let paint = self.paint(color);
        self.pixmap.fill_path(
            path,
            &paint,
            FillRule::Winding,
            Transform::from_translate(dx, dy),
            None,
        );
    }

    pub(crate) fn stroke_path(&mut self, path: &SkiaPath, color: Color, dashed: bool) {
        let paint = self.paint(color);
        let stroke = self.strokes.for_shape(dashed);
        self.pixmap.stroke_path(path, &paint, stroke, Transform::identity(), None);
    }

    fn finish(self) -> RenderedImage {
        RenderedImage {
            pixmap: self.pixmap,
            warnings: self.warnings,
        }
    }
}

/// A finished raster together with everything that was skipped while drawing it.
#[derive(Debug)]
pub struct RenderedImage {
    pixmap: Pixmap,
    warnings: Vec<RenderWarning>,
}

impl RenderedImage {
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let pixel = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(
            pixel.red(),
            pixel.green(),
            pixel.blue(),
            pixel.alpha(),
        ))
    }

    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// True when some custom image or label could not be drawn.
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, OutputError> {
        self.pixmap
            .encode_png()
            .map_err(|err| OutputError::Encode(err.to_string()))
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let output_error = |source: OutputError| RenderError::Output {
            path: path.to_path_buf(),
            source,
        };
        let data = self.encode_png().map_err(output_error)?;
        std::fs::write(path, data).map_err(|err| output_error(err.into()))?;
        log::info!(
            "wrote {}x{} image to {}",
            self.width(),
            self.height(),
            path.display()
        );
        Ok(())
    }
}

/// Draws diagrams with a pluggable glyph source.
pub struct Renderer<G = FontBook> {
    glyphs: G,
}

impl Renderer<FontBook> {
    pub fn new() -> Self {
        Self::with_glyphs(FontBook::new())
    }
}

impl Default for Renderer<FontBook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GlyphSource> Renderer<G> {
    pub fn with_glyphs(glyphs: G) -> Self {
        Self { glyphs }
    }

    pub fn render_to_image(
        &mut self,
        diagram: &Diagram,
        options: RenderingOptions,
    ) -> Result<RenderedImage, RenderError> {
        let grid = &diagram.grid;
        options.validate(grid)?;

        let mut pixmap = Pixmap::new(grid.width, grid.height).ok_or(RenderError::Allocation {
            width: grid.width,
            height: grid.height,
        })?;
        pixmap.fill(options.background_color.to_skia());

        if options.drop_shadows {
            let cast = render_shadows(&mut pixmap, &diagram.shapes, grid, options.antialias);
            pixmap = box_blur(&pixmap);
            log::debug!("blurred {cast} shadows");
        }

        let mut ctx = RenderContext::new(pixmap, StrokeStyles::from_grid(grid), options.antialias);
        let storage = draw_storage_shapes(&mut ctx, &diagram.shapes, grid);
        let markers = draw_shapes(&mut ctx, &diagram.shapes, grid);
        draw_point_markers(&mut ctx, &markers, grid);
        text::render_texts(&mut ctx, &mut self.glyphs, &diagram.texts);

        if options.render_debug_lines {
            debug::draw_debug_grid(&mut ctx.pixmap, grid);
        }

        log::debug!(
            "rendered {} shapes ({} storage, {} markers) and {} labels on {}x{}",
            diagram.shapes.len(),
            storage,
            markers.len(),
            diagram.texts.len(),
            grid.width,
            grid.height
        );
        Ok(ctx.finish())
    }

    pub fn render_to_file(
        &mut self,
        diagram: &Diagram,
        path: &Path,
        options: RenderingOptions,
    ) -> Result<RenderedImage, RenderError> {
        let image = self.render_to_image(diagram, options)?;
        image.save_png(path)?;
        Ok(image)
    }
}

pub fn render_to_image(
    diagram: &Diagram,
    options: RenderingOptions,
) -> Result<RenderedImage, RenderError> {
    Renderer::new().render_to_image(diagram, options)
}

pub fn render_to_file(
    diagram: &Diagram,
    path: &Path,
    options: RenderingOptions,
) -> Result<RenderedImage, RenderError> {
    Renderer::new().render_to_file(diagram, path, options)
}

// Storage shapes go first, back to front, so nearer cylinders cover farther ones.
fn draw_storage_shapes(
    ctx: &mut RenderContext,
    shapes: &[Shape],
    grid: &GraphicalGrid,
) -> usize {
    let mut storage: Vec<&Shape> = shapes
        .iter()
        .filter(|shape| shape.kind == ShapeKind::Storage)
        .collect();
    depth_order(&mut storage);

    for shape in &storage {
        let Some(path) = render_path(shape, grid) else {
            continue;
        };
        if !shape.dashed {
            ctx.fill_path(&path, shape.fill_or_white());
        }
        ctx.stroke_path(&path, shape.stroke_color, shape.dashed);
    }
    storage.len()
}

// Largest first. Point markers are returned for a final pass on top.
fn draw_shapes<'a>(
    ctx: &mut RenderContext,
    shapes: &'a [Shape],
    grid: &GraphicalGrid,
) -> Vec<&'a Shape> {
    let mut ordered: Vec<&Shape> = shapes.iter().collect();
    area_order(&mut ordered);

    let mut markers = Vec::new();
    for shape in ordered {
        if shape.points.is_empty() {
            continue;
        }
        match &shape.kind {
            ShapeKind::PointMarker => markers.push(shape),
            ShapeKind::Storage => {}
            ShapeKind::Custom(definition) => custom::render_custom_shape(ctx, shape, definition),
            ShapeKind::Normal | ShapeKind::Arrowhead => {
                let Some(path) = render_path(shape, grid) else {
                    continue;
                };
                if shape.closed && !shape.dashed {
                    ctx.fill_path(&path, shape.fill_or_white());
                }
                // arrowheads are fill only
                if shape.kind == ShapeKind::Normal {
                    ctx.stroke_path(&path, shape.stroke_color, shape.dashed);
                }
            }
        }
    }
    markers
}

fn draw_point_markers(ctx: &mut RenderContext, markers: &[&Shape], grid: &GraphicalGrid) {
    for shape in markers {
        let Some(path) = render_path(shape, grid) else {
            continue;
        };
        ctx.fill_path(&path, Color::WHITE);
        ctx.stroke_path(&path, shape.stroke_color, false);
    }
}
