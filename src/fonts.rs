use std::collections::HashMap;
use std::path::Path;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use resvg::tiny_skia::{self, PathBuilder};
use ttf_parser::{Face, OutlineBuilder};

use crate::model::FontSpec;

// Advance used for characters the face has no glyph for, relative to size.
const FALLBACK_ADVANCE: f32 = 0.56;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no font available for family {family:?}")]
pub struct FontUnavailable {
    pub family: String,
}

/// Turns text into fillable outlines.
pub trait GlyphSource {
    /// Outline of `text` with its baseline starting at `(x, y)`. `Ok(None)`
    /// means there is nothing to draw, e.g. whitespace only.
    fn text_path(
        &mut self,
        text: &str,
        font: &FontSpec,
        x: f32,
        y: f32,
    ) -> Result<Option<tiny_skia::Path>, FontUnavailable>;
}

/// Font faces resolved through `fontdb`, outlined with `ttf-parser`.
pub struct FontBook {
    db: Database,
    use_system_fonts: bool,
    loaded_system_fonts: bool,
    cache: HashMap<(String, bool), Option<FontFace>>,
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
}

impl FontBook {
    /// System fonts are loaded on first use.
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            use_system_fonts: true,
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    /// Only fonts added with [`FontBook::load_font_file`] are used.
    pub fn without_system_fonts() -> Self {
        Self {
            use_system_fonts: false,
            ..Self::new()
        }
    }

    pub fn load_font_file(&mut self, path: &Path) -> std::io::Result<()> {
        self.db.load_font_file(path)?;
        self.cache.clear();
        Ok(())
    }

    fn face(&mut self, font: &FontSpec) -> Option<&FontFace> {
        let key = (normalize_family_key(&font.family), font.bold);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(&key.0, font.bold);
            self.cache.insert(key.clone(), face);
        }
        self.cache.get(&key).and_then(|face| face.as_ref())
    }

    fn load_face(&mut self, font_family: &str, bold: bool) -> Option<FontFace> {
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(fontdb::Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            let lower = raw.to_ascii_lowercase();
            match lower.as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "sansserif" | "dialog" | "system-ui" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" | "monospaced" | "dialoginput" => {
                    order.push(FamilyToken::Generic(Family::Monospace))
                }
                _ => {
                    let idx = names.len();
                    names.push(raw.to_string());
                    order.push(FamilyToken::Name(idx));
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let mut families: Vec<Family<'_>> = Vec::with_capacity(order.len());
        for token in order {
            match token {
                FamilyToken::Generic(family) => families.push(family),
                FamilyToken::Name(idx) => families.push(Family::Name(names[idx].as_str())),
            }
        }

        if self.use_system_fonts && !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        // Generic families map to fixed names that may be missing; any
        // installed face beats dropping the label.
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().into_iter().next().map(|face| face.id))?;
        self.db
            .with_face_data(id, |data, index| {
                Face::parse(data, index).ok().map(|_| FontFace {
                    data: data.to_vec(),
                    index,
                })
            })
            .flatten()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphSource for FontBook {
    fn text_path(
        &mut self,
        text: &str,
        font: &FontSpec,
        x: f32,
        y: f32,
    ) -> Result<Option<tiny_skia::Path>, FontUnavailable> {
        let unavailable = || FontUnavailable {
            family: font.family.clone(),
        };
        let face = self.face(font).ok_or_else(unavailable)?;
        let face = Face::parse(&face.data, face.index).map_err(|_| unavailable())?;
        let scale = font.size / f32::from(face.units_per_em().max(1));

        let mut pb = PathBuilder::new();
        let mut pen_x = x;
        for ch in text.chars() {
            let Some(glyph) = face.glyph_index(ch) else {
                pen_x += font.size * FALLBACK_ADVANCE;
                continue;
            };
            let mut sink = OutlineSink {
                pb: &mut pb,
                x: pen_x,
                y,
                scale,
            };
            face.outline_glyph(glyph, &mut sink);
            pen_x += f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale;
        }
        Ok(pb.finish())
    }
}

/// Maps font units (y up) onto the raster (y down) at the pen position.
struct OutlineSink<'a> {
    pb: &'a mut PathBuilder,
    x: f32,
    y: f32,
    scale: f32,
}

impl OutlineSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y - y * self.scale)
    }
}

impl OutlineBuilder for OutlineSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.pb.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.pb.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.pb.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
