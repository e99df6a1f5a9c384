use std::collections::HashMap;

use padgui_core::{Rect, RenderBackend, TextureId};

/// Every character a font atlas carries. The leading space doubles as the
/// fallback for anything not listed here.
pub const CHAR_MAP: &str =
    " ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,?!-:'\"_=+&<^>~@/\\|(%)";

pub const MAX_ATLAS_WIDTH: i32 = 1024;

/// Coverage mask of one glyph cell: `width` is the advance, `height` the
/// font's line height.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

/// Anything that can rasterize glyph cells at a fixed size.
pub trait GlyphSource {
    fn line_height(&self) -> u32;
    fn rasterize(&self, ch: char) -> GlyphBitmap;
}

/// Places cells of the given widths left to right, starting a new row
/// `height + 1` pixels lower whenever a cell would cross `MAX_ATLAS_WIDTH`.
/// Returns the cell rects and the atlas size.
pub fn pack(widths: &[(char, i32)], height: i32) -> (Vec<(char, Rect)>, (i32, i32)) {
    let (mut x, mut y) = (0, 0);
    let mut right = 0;
    let mut out = Vec::with_capacity(widths.len());
    for &(ch, w) in widths {
        if x > 0 && x + w > MAX_ATLAS_WIDTH {
            x = 0;
            y += height + 1;
        }
        let r = Rect::new(x, y, w, height);
        right = right.max(r.right());
        out.push((ch, r));
        x += w;
    }
    (out, (right.max(1), (y + height).max(1)))
}

/// One font at one size, rendered into a single texture.
#[derive(Debug)]
pub struct GlyphAtlas {
    texture: TextureId,
    size: (i32, i32),
    height: i32,
    glyphs: HashMap<char, Rect>,
    blank: Rect,
}

impl GlyphAtlas {
    pub fn build(backend: &mut dyn RenderBackend, source: &dyn GlyphSource) -> GlyphAtlas {
        let height = source.line_height() as i32;
        let bitmaps: Vec<(char, GlyphBitmap)> =
            CHAR_MAP.chars().map(|c| (c, source.rasterize(c))).collect();
        let widths: Vec<(char, i32)> = bitmaps
            .iter()
            .map(|(c, b)| (*c, b.width as i32))
            .collect();
        let (cells, (w, h)) = pack(&widths, height);

        let mut rgba = vec![0u8; (w * h * 4) as usize];
        for ((_, bitmap), (_, cell)) in bitmaps.iter().zip(&cells) {
            for gy in 0..bitmap.height.min(cell.height as u32) {
                for gx in 0..bitmap.width.min(cell.width as u32) {
                    let a = bitmap.coverage[(gy * bitmap.width + gx) as usize];
                    let px = ((cell.y + gy as i32) * w + cell.x + gx as i32) as usize * 4;
                    rgba[px..px + 4].copy_from_slice(&[255, 255, 255, a]);
                }
            }
        }

        let texture = backend.create_texture(w as u32, h as u32, &rgba);
        let glyphs: HashMap<char, Rect> = cells.into_iter().collect();
        let blank = glyphs.get(&' ').copied().unwrap_or(Rect::ZERO);
        log::info!(
            "built glyph atlas {}x{} ({} glyphs, line height {})",
            w,
            h,
            glyphs.len(),
            height
        );
        GlyphAtlas {
            texture,
            size: (w, h),
            height,
            glyphs,
            blank,
        }
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }
    pub fn size(&self) -> (i32, i32) {
        self.size
    }
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Atlas cell for `ch`, or the blank cell for unsupported characters.
    pub fn glyph(&self, ch: char) -> Rect {
        self.glyphs.get(&ch).copied().unwrap_or(self.blank)
    }

    pub fn width(&self, text: &str) -> i32 {
        text.chars().map(|c| self.glyph(c).width).sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use padgui_core::HeadlessBackend;

    /// Monospace source with solid cells.
    pub(crate) struct FixedSource {
        pub advance: u32,
        pub height: u32,
    }

    impl GlyphSource for FixedSource {
        fn line_height(&self) -> u32 {
            self.height
        }
        fn rasterize(&self, _ch: char) -> GlyphBitmap {
            GlyphBitmap {
                width: self.advance,
                height: self.height,
                coverage: vec![255; (self.advance * self.height) as usize],
            }
        }
    }

    #[test]
    fn pack_wraps_rows_with_a_gap() {
        let widths: Vec<(char, i32)> = CHAR_MAP.chars().map(|c| (c, 20)).collect();
        let (cells, (w, h)) = pack(&widths, 10);
        assert!(w <= MAX_ATLAS_WIDTH);
        // 51 cells of 20px per 1020px row
        assert_eq!(cells[51].1, Rect::new(0, 11, 20, 10));
        let rows = (widths.len() as i32 + 50) / 51;
        assert_eq!(h, (rows - 1) * 11 + 10);
        for (i, (_, a)) in cells.iter().enumerate() {
            assert!(a.right() <= w && a.bottom() <= h);
            for (_, b) in &cells[i + 1..] {
                assert!(a.clip(b).is_empty(), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn narrow_atlas_is_a_single_row() {
        let widths: Vec<(char, i32)> = CHAR_MAP.chars().map(|c| (c, 3)).collect();
        let (_, (w, h)) = pack(&widths, 7);
        assert_eq!(w, 3 * CHAR_MAP.chars().count() as i32);
        assert_eq!(h, 7);
    }

    #[test]
    fn unsupported_chars_use_blank() {
        let mut backend = HeadlessBackend::new();
        let atlas = GlyphAtlas::build(&mut backend, &FixedSource { advance: 8, height: 10 });
        assert_eq!(atlas.glyph('é'), atlas.glyph(' '));
        assert_eq!(atlas.width("héllo"), 40);
        assert_eq!(backend.live_textures(), 1);
        let (w, h) = atlas.size();
        assert_eq!(backend.texture_size(atlas.texture()), Some((w as u32, h as u32)));
    }
}
