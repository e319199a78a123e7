use resvg::tiny_skia::{Path, PathBuilder};

use crate::model::{Bounds, GraphicalGrid, PointKind, Shape, ShapeKind, ShapePoint};

// Cubic control-point factor for a quarter ellipse.
const KAPPA: f32 = 0.552_284_8;
const MARKER_DIAMETER_FACTOR: f32 = 0.7;

/// Turns a shape into the path that is filled and stroked. Returns `None` for
/// shapes with no points or degenerate geometry.
pub fn render_path(shape: &Shape, grid: &GraphicalGrid) -> Option<Path> {
    let first = shape.points.first()?;
    match shape.kind {
        ShapeKind::PointMarker => {
            let radius = MARKER_DIAMETER_FACTOR * grid.min_cell_dimension() / 2.0;
            PathBuilder::from_circle(first.x, first.y, radius)
        }
        ShapeKind::Storage if shape.points.len() == 4 => storage_path(shape.bounds(), grid),
        _ => polygon_path(&shape.points, shape.closed, grid.min_cell_dimension() / 2.0),
    }
}

fn polygon_path(points: &[ShapePoint], closed: bool, corner_radius: f32) -> Option<Path> {
    let count = points.len();
    let mut pb = PathBuilder::new();
    for (idx, point) in points.iter().enumerate() {
        let neighbours = if point.kind == PointKind::Round {
            neighbours(points, idx, closed)
        } else {
            None
        };
        match neighbours {
            Some((prev, next)) => {
                let start = toward(point, prev, corner_radius);
                let end = toward(point, next, corner_radius);
                if idx == 0 {
                    pb.move_to(start.0, start.1);
                } else {
                    pb.line_to(start.0, start.1);
                }
                pb.quad_to(point.x, point.y, end.0, end.1);
            }
            None if idx == 0 => pb.move_to(point.x, point.y),
            None => pb.line_to(point.x, point.y),
        }
    }
    if closed && count > 2 {
        pb.close();
    }
    pb.finish()
}

fn neighbours(
    points: &[ShapePoint],
    idx: usize,
    closed: bool,
) -> Option<(&ShapePoint, &ShapePoint)> {
    let count = points.len();
    if count < 3 {
        return None;
    }
    let prev = match idx {
        0 if closed => points.last()?,
        0 => return None,
        _ => &points[idx - 1],
    };
    let next = match idx + 1 {
        n if n == count && closed => &points[0],
        n if n == count => return None,
        n => &points[n],
    };
    Some((prev, next))
}

/// Point on the segment `from -> to`, `radius` away from `from` but never past
/// the segment midpoint.
fn toward(from: &ShapePoint, to: &ShapePoint, radius: f32) -> (f32, f32) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return (from.x, from.y);
    }
    let step = radius.min(len / 2.0) / len;
    (from.x + dx * step, from.y + dy * step)
}

/// Cylinder: the body outline plus the front half of the top ellipse. Both
/// subpaths wind the same way so the open arc never cuts a hole in the fill.
fn storage_path(bounds: Bounds, grid: &GraphicalGrid) -> Option<Path> {
    let half = (grid.min_cell_dimension() / 2.0).min(bounds.height / 2.0);
    let left = bounds.x;
    let right = bounds.right();
    let top = bounds.y;
    let bottom = bounds.bottom();
    let cx = left + bounds.width / 2.0;
    let rx = bounds.width / 2.0;
    let kx = KAPPA * rx;
    let ky = KAPPA * half;

    let mut pb = PathBuilder::new();
    pb.move_to(left, top + half);
    pb.line_to(left, bottom - half);
    pb.cubic_to(left, bottom - half + ky, cx - kx, bottom, cx, bottom);
    pb.cubic_to(cx + kx, bottom, right, bottom - half + ky, right, bottom - half);
    pb.line_to(right, top + half);
    pb.cubic_to(right, top + half - ky, cx + kx, top, cx, top);
    pb.cubic_to(cx - kx, top, left, top + half - ky, left, top + half);
    pb.close();

    let cap_bottom = top + 2.0 * half;
    pb.move_to(left, top + half);
    pb.cubic_to(left, top + half + ky, cx - kx, cap_bottom, cx, cap_bottom);
    pb.cubic_to(cx + kx, cap_bottom, right, top + half + ky, right, top + half);
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GraphicalGrid {
        GraphicalGrid::new(10, 14, 200, 200)
    }

    #[test]
    fn empty_shape_has_no_path() {
        let shape = Shape::new(ShapeKind::Normal, Vec::new());
        assert!(render_path(&shape, &grid()).is_none());
    }

    #[test]
    fn box_path_covers_its_bounds() {
        let shape = Shape::rectangle(ShapeKind::Normal, 10.0, 20.0, 40.0, 30.0);
        let bounds = render_path(&shape, &grid()).unwrap().bounds();
        assert_eq!(bounds.left(), 10.0);
        assert_eq!(bounds.top(), 20.0);
        assert_eq!(bounds.right(), 50.0);
        assert_eq!(bounds.bottom(), 50.0);
    }

    #[test]
    fn round_corners_stay_inside_bounds() {
        let shape = Shape {
            closed: true,
            ..Shape::new(
                ShapeKind::Normal,
                vec![
                    ShapePoint::round(10.0, 10.0),
                    ShapePoint::round(60.0, 10.0),
                    ShapePoint::round(60.0, 40.0),
                    ShapePoint::round(10.0, 40.0),
                ],
            )
        };
        let bounds = render_path(&shape, &grid()).unwrap().bounds();
        assert!(bounds.left() >= 10.0 && bounds.right() <= 60.0);
        assert!(bounds.top() >= 10.0 && bounds.bottom() <= 40.0);
    }

    #[test]
    fn round_point_on_open_end_stays_sharp() {
        let points = [ShapePoint::round(0.0, 0.0), ShapePoint::new(10.0, 0.0)];
        assert!(neighbours(&points, 0, false).is_none());
        let points = [
            ShapePoint::new(0.0, 0.0),
            ShapePoint::round(10.0, 0.0),
            ShapePoint::new(10.0, 10.0),
        ];
        assert!(neighbours(&points, 1, false).is_some());
        assert!(neighbours(&points, 2, false).is_none());
        assert!(neighbours(&points, 2, true).is_some());
    }

    #[test]
    fn corner_offset_never_passes_midpoint() {
        let from = ShapePoint::new(0.0, 0.0);
        let to = ShapePoint::new(4.0, 0.0);
        assert_eq!(toward(&from, &to, 5.0), (2.0, 0.0));
        assert_eq!(toward(&from, &to, 1.0), (1.0, 0.0));
    }

    #[test]
    fn point_marker_is_a_circle_around_first_point() {
        let shape = Shape::new(ShapeKind::PointMarker, vec![ShapePoint::new(50.0, 50.0)]);
        let bounds = render_path(&shape, &grid()).unwrap().bounds();
        // 0.7 * 10 = 7px across; curve control points may widen the box a little
        assert!(bounds.width() >= 6.99 && bounds.width() < 7.0 * 1.5);
        assert!((bounds.left() + bounds.width() / 2.0 - 50.0).abs() < 0.01);
        assert!((bounds.top() + bounds.height() / 2.0 - 50.0).abs() < 0.01);
    }

    #[test]
    fn storage_shape_spans_its_bounds() {
        let shape = Shape::rectangle(ShapeKind::Storage, 20.0, 20.0, 60.0, 80.0);
        let bounds = render_path(&shape, &grid()).unwrap().bounds();
        assert!((bounds.left() - 20.0).abs() < 0.01);
        assert!((bounds.right() - 80.0).abs() < 0.01);
        assert!((bounds.top() - 20.0).abs() < 0.01);
        assert!((bounds.bottom() - 100.0).abs() < 0.01);
    }

    #[test]
    fn path_is_a_pure_function_of_points() {
        let shape = Shape::rectangle(ShapeKind::Storage, 20.0, 20.0, 60.0, 80.0);
        assert_eq!(render_path(&shape, &grid()), render_path(&shape, &grid()));
    }
}
