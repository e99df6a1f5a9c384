use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use fontdb::{Database, Family, Query};

use crate::atlas::{GlyphBitmap, GlyphSource};

/// A TrueType/OpenType face at a fixed point size (72 dpi, so one em is
/// `size` pixels).
pub struct TrueTypeSource {
    font: FontVec,
    scale: PxScale,
}

impl TrueTypeSource {
    pub fn from_vec(data: Vec<u8>, index: u32, size: u32) -> Option<Self> {
        let font = FontVec::try_from_vec_and_index(data, index).ok()?;
        let em = size.max(1) as f32;
        let scale = match font.units_per_em() {
            Some(upem) if upem > 0.0 => PxScale::from(em * font.height_unscaled() / upem),
            _ => PxScale::from(em),
        };
        Some(Self { font, scale })
    }

    fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }
}

impl GlyphSource for TrueTypeSource {
    fn line_height(&self) -> u32 {
        self.font.as_scaled(self.scale).height().ceil().max(1.0) as u32
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        let scaled = self.font.as_scaled(self.scale);
        let id = self.font.glyph_id(ch);
        let width = scaled.h_advance(id).round().max(1.0) as u32;
        let height = self.line_height();
        let mut coverage = vec![0u8; (width * height) as usize];

        let glyph = id.with_scale_and_position(self.scale, point(0.0, self.ascent()));
        if let Some(outlined) = self.font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    return;
                }
                let i = (y as u32 * width + x as u32) as usize;
                let v = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                coverage[i] = coverage[i].max(v);
            });
        }

        GlyphBitmap {
            width,
            height,
            coverage,
        }
    }
}

/// Installed fonts, queried by family name.
pub struct SystemFonts {
    db: Database,
}

impl SystemFonts {
    pub fn load() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("system font database: {} faces", db.len());
        Self { db }
    }

    /// Face bytes and collection index for `family`. The generic names
    /// `sans-serif`, `serif` and `monospace` pick the system default.
    pub fn family(&self, family: &str) -> Option<(Vec<u8>, u32)> {
        let families = [match family {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        }];
        let id = self.db.query(&Query {
            families: &families,
            ..Query::default()
        })?;
        self.db.with_face_data(id, |data, index| (data.to_vec(), index))
    }
}
