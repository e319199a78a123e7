use std::cmp::Ordering;

use crate::model::Shape;

/// Back-to-front order for stacked storage shapes. A shape whose top edge
/// sits higher on the canvas is in front, so it is drawn later. Ties fall back
/// to the left edge, then to input order.
pub fn depth_order(shapes: &mut [&Shape]) {
    shapes.sort_by(|a, b| {
        let (a, b) = (a.bounds(), b.bounds());
        b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x))
    });
}

/// Largest bounding area first, so nested shapes land on top of the shapes
/// enclosing them. Equal areas keep input order.
pub fn area_order(shapes: &mut [&Shape]) {
    shapes.sort_by(|a, b| compare_area(a, b));
}

fn compare_area(a: &Shape, b: &Shape) -> Ordering {
    b.bounds().area().total_cmp(&a.bounds().area())
}
