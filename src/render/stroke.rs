use resvg::tiny_skia::{LineCap, LineJoin, Stroke, StrokeDash};

use crate::model::GraphicalGrid;

/// Pens derived from the grid cell size, built once per render call.
#[derive(Debug, Clone)]
pub struct StrokeStyles {
    pub normal: Stroke,
    pub dashed: Stroke,
}

impl StrokeStyles {
    pub fn from_grid(grid: &GraphicalGrid) -> Self {
        // whole pixels: odd cell sizes truncate
        let min_cell = grid.cell_width.min(grid.cell_height);
        let width = (min_cell / 10) as f32;
        let dash_interval = (min_cell / 2) as f32;

        let normal = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let dashed = Stroke {
            width,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Round,
            // dash and gap share the same interval
            dash: StrokeDash::new(vec![dash_interval, dash_interval], 0.0),
            ..Stroke::default()
        };
        Self { normal, dashed }
    }

    pub fn for_shape(&self, dashed: bool) -> &Stroke {
        if dashed { &self.dashed } else { &self.normal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_smaller_cell_side() {
        let styles = StrokeStyles::from_grid(&GraphicalGrid::new(10, 14, 100, 100));
        assert_eq!(styles.normal.width, 1.0);
        assert_eq!(styles.dashed.width, 1.0);

        let styles = StrokeStyles::from_grid(&GraphicalGrid::new(35, 30, 100, 100));
        assert_eq!(styles.normal.width, 3.0);
    }

    #[test]
    fn odd_cell_sizes_truncate_to_whole_pixels() {
        let styles = StrokeStyles::from_grid(&GraphicalGrid::new(11, 14, 100, 100));
        assert_eq!(styles.normal.width, 1.0);
        assert_eq!(styles.dashed.width, 1.0);
        let expected = StrokeDash::new(vec![5.0, 5.0], 0.0);
        assert_eq!(styles.dashed.dash, expected);

        let styles = StrokeStyles::from_grid(&GraphicalGrid::new(25, 29, 100, 100));
        assert_eq!(styles.normal.width, 2.0);
        assert_eq!(styles.dashed.dash, StrokeDash::new(vec![12.0, 12.0], 0.0));
    }

    #[test]
    fn normal_pen_is_round() {
        let styles = StrokeStyles::from_grid(&GraphicalGrid::new(10, 14, 100, 100));
        assert_eq!(styles.normal.line_cap, LineCap::Round);
        assert_eq!(styles.normal.line_join, LineJoin::Round);
        assert!(styles.normal.dash.is_none());
    }

    #[test]
    fn dashed_pen_has_butt_caps_and_a_dash() {
        let styles = StrokeStyles::from_grid(&GraphicalGrid::new(10, 14, 100, 100));
        assert_eq!(styles.dashed.line_cap, LineCap::Butt);
        assert_eq!(styles.dashed.line_join, LineJoin::Round);
        assert!(styles.dashed.dash.is_some());
        assert!(std::ptr::eq(styles.for_shape(true), &styles.dashed));
        assert!(std::ptr::eq(styles.for_shape(false), &styles.normal));
    }
}
