use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointKind {
    #[default]
    Normal,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapePoint {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub kind: PointKind,
}

impl ShapePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            kind: PointKind::Normal,
        }
    }

    pub fn round(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            kind: PointKind::Round,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetKind {
    Raster,
    Vector,
}

impl AssetKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Raster),
            "svg" => Some(Self::Vector),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomShapeDefinition {
    pub path: PathBuf,
    pub kind: AssetKind,
    #[serde(default)]
    pub has_border: bool,
    #[serde(default)]
    pub stretches: bool,
}

impl CustomShapeDefinition {
    /// Builds a definition, classifying the asset by its file suffix. Returns
    /// `None` for suffixes that are neither raster nor vector assets.
    pub fn new(path: impl Into<PathBuf>, has_border: bool, stretches: bool) -> Option<Self> {
        let path = path.into();
        let kind = AssetKind::from_path(&path)?;
        Some(Self {
            path,
            kind,
            has_border,
            stretches,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ShapeKind {
    Normal,
    Storage,
    PointMarker,
    Custom(CustomShapeDefinition),
    Arrowhead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub kind: ShapeKind,
    #[serde(default)]
    pub points: Vec<ShapePoint>,
    #[serde(default)]
    pub fill_color: Option<Color>,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: Color,
    #[serde(default)]
    pub dashed: bool,
    #[serde(default)]
    pub drops_shadow: bool,
    #[serde(default)]
    pub closed: bool,
}

fn default_stroke_color() -> Color {
    Color::BLACK
}

impl Shape {
    pub fn new(kind: ShapeKind, points: Vec<ShapePoint>) -> Self {
        Self {
            kind,
            points,
            fill_color: None,
            stroke_color: Color::BLACK,
            dashed: false,
            drops_shadow: false,
            closed: false,
        }
    }

    /// Closed axis-aligned box through the four corners of `(x, y, width, height)`.
    pub fn rectangle(kind: ShapeKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        let points = vec![
            ShapePoint::new(x, y),
            ShapePoint::new(x + width, y),
            ShapePoint::new(x + width, y + height),
            ShapePoint::new(x, y + height),
        ];
        Self {
            closed: true,
            ..Self::new(kind, points)
        }
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn with_stroke(mut self, color: Color) -> Self {
        self.stroke_color = color;
        self
    }

    pub fn with_dashed(mut self, dashed: bool) -> Self {
        self.dashed = dashed;
        self
    }

    pub fn with_shadow(mut self, drops_shadow: bool) -> Self {
        self.drops_shadow = drops_shadow;
        self
    }

    pub fn fill_or_white(&self) -> Color {
        self.fill_color.unwrap_or(Color::WHITE)
    }

    pub fn custom_definition(&self) -> Option<&CustomShapeDefinition> {
        match &self.kind {
            ShapeKind::Custom(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        let Some(first) = self.points.first() else {
            return Bounds::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in self.points.iter().skip(1) {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    #[serde(default = "default_font_family")]
    pub family: String,
    pub size: f32,
    #[serde(default)]
    pub bold: bool,
}

fn default_font_family() -> String {
    "Dialog, sans-serif".to_string()
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: default_font_family(),
            size: 12.0,
            bold: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub font: FontSpec,
    #[serde(default = "default_stroke_color")]
    pub color: Color,
    #[serde(default)]
    pub outline_color: Option<Color>,
}

impl TextLabel {
    pub fn new(text: impl Into<String>, x: f32, y: f32, font: FontSpec, color: Color) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font,
            color,
            outline_color: None,
        }
    }

    pub fn with_outline(mut self, color: Color) -> Self {
        self.outline_color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicalGrid {
    pub cell_width: u32,
    pub cell_height: u32,
    pub width: u32,
    pub height: u32,
}

impl GraphicalGrid {
    pub fn new(cell_width: u32, cell_height: u32, width: u32, height: u32) -> Self {
        Self {
            cell_width,
            cell_height,
            width,
            height,
        }
    }

    pub fn min_cell_dimension(&self) -> f32 {
        self.cell_width.min(self.cell_height) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub grid: GraphicalGrid,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub texts: Vec<TextLabel>,
}

impl Diagram {
    pub fn new(grid: GraphicalGrid) -> Self {
        Self {
            grid,
            shapes: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// Parses a model handed over by an upstream producer. JSON5 is accepted so
    /// hand-written fixtures may carry comments and trailing commas.
    pub fn from_json5(input: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_span_all_points() {
        let shape = Shape::new(
            ShapeKind::Normal,
            vec![
                ShapePoint::new(10.0, 40.0),
                ShapePoint::new(30.0, 5.0),
                ShapePoint::new(25.0, 60.0),
            ],
        );
        let bounds = shape.bounds();
        assert_eq!(bounds.x, 10.0);
        assert_eq!(bounds.y, 5.0);
        assert_eq!(bounds.width, 20.0);
        assert_eq!(bounds.height, 55.0);
        assert_eq!(bounds.area(), 1100.0);
    }

    #[test]
    fn empty_shape_has_empty_bounds() {
        let shape = Shape::new(ShapeKind::Normal, Vec::new());
        assert_eq!(shape.bounds(), Bounds::default());
    }

    #[test]
    fn asset_kind_comes_from_suffix() {
        let png = CustomShapeDefinition::new("icons/printer.PNG", true, false).unwrap();
        assert_eq!(png.kind, AssetKind::Raster);
        let svg = CustomShapeDefinition::new("icons/cloud.svg", false, true).unwrap();
        assert_eq!(svg.kind, AssetKind::Vector);
        assert!(CustomShapeDefinition::new("icons/cloud.gif", false, true).is_none());
    }

    #[test]
    fn parses_model_with_comments() {
        let input = r##"{
            // 10x14 cells on a small canvas
            grid: { cellWidth: 10, cellHeight: 14, width: 200, height: 100 },
            shapes: [
                {
                    kind: { type: "storage" },
                    points: [{ x: 0, y: 0 }, { x: 50, y: 0, kind: "round" }],
                    fillColor: "#ff0000",
                    closed: true,
                },
                {
                    kind: { type: "custom", path: "a.svg", kind: "vector", hasBorder: true },
                },
            ],
            texts: [{ text: "hi", x: 5, y: 20, font: { size: 12 }, outlineColor: "#000000" }],
        }"##;
        let diagram = Diagram::from_json5(input).unwrap();
        assert_eq!(diagram.grid.min_cell_dimension(), 10.0);
        assert_eq!(diagram.shapes[0].kind, ShapeKind::Storage);
        assert_eq!(diagram.shapes[0].points[1].kind, PointKind::Round);
        assert_eq!(diagram.shapes[0].stroke_color, Color::BLACK);
        let definition = diagram.shapes[1].custom_definition().unwrap();
        assert!(definition.has_border);
        assert!(!definition.stretches);
        assert_eq!(diagram.texts[0].outline_color, Some(Color::BLACK));
    }
}
