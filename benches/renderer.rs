use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ditaa_render::fonts::FontBook;
use ditaa_render::model::ShapePoint;
use ditaa_render::render::box_blur;
use ditaa_render::{Color, Diagram, GraphicalGrid, Renderer, RenderingOptions, Shape, ShapeKind};
use resvg::tiny_skia::Pixmap;
use std::hint::black_box;

const CELL_WIDTH: u32 = 10;
const CELL_HEIGHT: u32 = 14;

/// A grid of boxes joined by lines, every third one a storage cylinder.
fn dense_diagram(columns: u32, rows: u32) -> Diagram {
    let grid = GraphicalGrid::new(
        CELL_WIDTH,
        CELL_HEIGHT,
        columns * 12 * CELL_WIDTH,
        rows * 6 * CELL_HEIGHT,
    );
    let mut diagram = Diagram::new(grid);
    for row in 0..rows {
        for col in 0..columns {
            let x = (col * 12 + 1) as f32 * CELL_WIDTH as f32;
            let y = (row * 6 + 1) as f32 * CELL_HEIGHT as f32;
            let width = 8.0 * CELL_WIDTH as f32;
            let height = 3.0 * CELL_HEIGHT as f32;
            let kind = if (row + col) % 3 == 0 {
                ShapeKind::Storage
            } else {
                ShapeKind::Normal
            };
            diagram.shapes.push(
                Shape::rectangle(kind, x, y, width, height)
                    .with_fill(Color::rgb(0x33, 0x66, (col * 40 % 256) as u8))
                    .with_shadow(true),
            );
            if col + 1 < columns {
                let line_y = y + height / 2.0;
                diagram.shapes.push(Shape::new(
                    ShapeKind::Normal,
                    vec![
                        ShapePoint::new(x + width, line_y),
                        ShapePoint::new(x + 12.0 * CELL_WIDTH as f32, line_y),
                    ],
                ));
            }
        }
    }
    diagram
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let mut renderer = Renderer::with_glyphs(FontBook::without_system_fonts());
    for (columns, rows) in [(2, 2), (6, 4), (12, 10)] {
        let diagram = dense_diagram(columns, rows);
        let name = format!("{columns}x{rows}");
        group.bench_with_input(BenchmarkId::new("shadows", &name), &diagram, |b, diagram| {
            b.iter(|| {
                let image = renderer
                    .render_to_image(black_box(diagram), RenderingOptions::default())
                    .expect("render failed");
                black_box(image.width());
            });
        });
        let flat = RenderingOptions {
            drop_shadows: false,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("flat", &name), &diagram, |b, diagram| {
            b.iter(|| {
                let image = renderer
                    .render_to_image(black_box(diagram), flat)
                    .expect("render failed");
                black_box(image.width());
            });
        });
    }
    group.finish();
}

fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur");
    for size in [128u32, 512, 1024] {
        let mut pixmap = Pixmap::new(size, size).expect("pixmap");
        pixmap.fill(Color::SHADOW.to_skia());
        group.bench_with_input(BenchmarkId::from_parameter(size), &pixmap, |b, pixmap| {
            b.iter(|| black_box(box_blur(black_box(pixmap))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render, bench_blur);
criterion_main!(benches);
