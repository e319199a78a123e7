use crate::error::RenderWarning;
use crate::fonts::GlyphSource;
use crate::model::TextLabel;

use super::RenderContext;

// One pixel in each axis direction approximates a glyph outline.
const OUTLINE_OFFSETS: [(f32, f32); 4] = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

pub(super) fn render_texts<G: GlyphSource + ?Sized>(
    ctx: &mut RenderContext,
    glyphs: &mut G,
    texts: &[TextLabel],
) {
    for label in texts {
        let path = match glyphs.text_path(&label.text, &label.font, label.x, label.y) {
            Ok(Some(path)) => path,
            Ok(None) => continue,
            Err(source) => {
                log::warn!("skipping label {:?}: {source}", label.text);
                ctx.warnings.push(RenderWarning::Font {
                    text: label.text.clone(),
                    source,
                });
                continue;
            }
        };

        if let Some(outline) = label.outline_color {
            for (dx, dy) in OUTLINE_OFFSETS {
                ctx.fill_path_offset(&path, outline, dx, dy);
            }
        }
        ctx.fill_path(&path, label.color);
    }
}
