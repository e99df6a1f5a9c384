//! Bitmap-atlas fonts.
//!
//! Each (font, size) pair is rasterized once into a single texture holding
//! every character of [`CHAR_MAP`]. Measuring and drawing are then plain
//! lookups: a string is as wide as the sum of its glyph cells, and drawing
//! emits one textured copy per character into a [`Scene`].

pub mod atlas;
pub mod truetype;
pub mod wrap;

use std::collections::HashMap;
use std::path::PathBuf;

use padgui_core::{Anchor, Color, FitError, Point, Rect, RenderBackend, Resources, Scene};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

pub use atlas::{CHAR_MAP, GlyphAtlas, GlyphBitmap, GlyphSource, MAX_ATLAS_WIDTH};
pub use truetype::{SystemFonts, TrueTypeSource};
pub use wrap::{block_top, split_lines};

new_key_type! {
    pub struct FontId;
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font '{0}' not found")]
    NotFound(String),
    #[error("reading font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' is not a usable font")]
    Invalid(String),
}

/// How a piece of text is placed and colored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Tint; the alpha channel is the text opacity.
    pub color: Color,
    pub anchor: Anchor,
    /// Glyphs whose right edge would pass `clip.right()` are not drawn.
    pub clip: Option<Rect>,
    pub linespace: i32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            anchor: Anchor::TopLeft,
            clip: None,
            linespace: 0,
        }
    }
}

impl TextStyle {
    pub fn new(color: Color, anchor: Anchor) -> Self {
        Self {
            color,
            anchor,
            ..Self::default()
        }
    }
    pub fn clipped(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }
    pub fn with_linespace(mut self, linespace: i32) -> Self {
        self.linespace = linespace;
        self
    }
}

#[derive(Default)]
pub struct FontManager {
    fonts: SlotMap<FontId, GlyphAtlas>,
    loaded: HashMap<(String, u32), FontId>,
    system: Option<SystemFonts>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `name` at `size`, building its atlas on first use.
    ///
    /// `name` is looked up as a file through `resources` first, then as an
    /// installed font family.
    pub fn load(
        &mut self,
        backend: &mut dyn RenderBackend,
        resources: &Resources,
        name: &str,
        size: u32,
    ) -> Result<FontId, FontError> {
        if let Some(&id) = self.loaded.get(&(name.to_string(), size)) {
            return Ok(id);
        }

        let source = if let Some(path) = resources.resolve(name) {
            let data = std::fs::read(&path).map_err(|source| FontError::Io {
                path: path.clone(),
                source,
            })?;
            TrueTypeSource::from_vec(data, 0, size)
                .ok_or_else(|| FontError::Invalid(path.display().to_string()))?
        } else {
            let system = self.system.get_or_insert_with(SystemFonts::load);
            let (data, index) = system
                .family(name)
                .ok_or_else(|| FontError::NotFound(name.to_string()))?;
            TrueTypeSource::from_vec(data, index, size)
                .ok_or_else(|| FontError::Invalid(name.to_string()))?
        };

        log::info!("loading font '{name}' at {size}");
        Ok(self.load_source(backend, name, size, &source))
    }

    /// Register an atlas built from `source` under `(key, size)`.
    pub fn load_source(
        &mut self,
        backend: &mut dyn RenderBackend,
        key: &str,
        size: u32,
        source: &dyn GlyphSource,
    ) -> FontId {
        if let Some(&id) = self.loaded.get(&(key.to_string(), size)) {
            return id;
        }
        let id = self.fonts.insert(GlyphAtlas::build(backend, source));
        self.loaded.insert((key.to_string(), size), id);
        id
    }

    pub fn atlas(&self, font: FontId) -> Option<&GlyphAtlas> {
        self.fonts.get(font)
    }

    pub fn height(&self, font: FontId) -> i32 {
        self.fonts.get(font).map(|a| a.height()).unwrap_or(0)
    }

    pub fn width(&self, font: FontId, text: &str) -> i32 {
        self.fonts.get(font).map(|a| a.width(text)).unwrap_or(0)
    }

    pub fn split_lines(
        &self,
        font: FontId,
        text: &str,
        max_width: i32,
    ) -> Result<Vec<String>, FitError> {
        split_lines(text, max_width, |s| self.width(font, s))
    }

    /// Draw one line of text with `style.anchor` of its box at `origin`.
    ///
    /// Returns the box actually covered, which is narrower than the full
    /// text when the clip cut it short.
    pub fn draw(
        &self,
        scene: &mut Scene,
        font: FontId,
        text: &str,
        origin: Point,
        style: &TextStyle,
    ) -> Rect {
        let Some(atlas) = self.fonts.get(font) else {
            log::warn!("draw with unknown font {font:?}");
            return Rect::new(origin.0, origin.1, 0, 0);
        };
        let out = Rect::new(0, 0, atlas.width(text), atlas.height()).with_point(style.anchor, origin);
        let mut x = out.x;
        for ch in text.chars() {
            let src = atlas.glyph(ch);
            if style.clip.is_some_and(|clip| x + src.width > clip.right()) {
                break;
            }
            scene.blit(
                atlas.texture(),
                src,
                Rect::new(x, out.y, src.width, src.height),
                style.color,
            );
            x += src.width;
        }
        Rect::new(out.x, out.y, x - out.x, out.height)
    }

    /// Wrap `text` to `bounds.width` and draw it as one block anchored at
    /// `origin`. Lines that would cross `bounds.bottom()` are dropped.
    pub fn draw_wrapped(
        &self,
        scene: &mut Scene,
        font: FontId,
        text: &str,
        origin: Point,
        style: &TextStyle,
        bounds: Rect,
    ) -> Result<Rect, FitError> {
        let lines = self.split_lines(font, text, bounds.width)?;
        Ok(self.draw_lines(scene, font, &lines, origin, style, bounds))
    }

    /// Draw already-split lines as a block; see [`FontManager::draw_wrapped`].
    pub fn draw_lines<S: AsRef<str>>(
        &self,
        scene: &mut Scene,
        font: FontId,
        lines: &[S],
        origin: Point,
        style: &TextStyle,
        bounds: Rect,
    ) -> Rect {
        let height = self.height(font);
        let step = height + style.linespace;
        let mut y = block_top(style.anchor, origin.1, lines.len(), height, style.linespace);
        let line_style = TextStyle {
            anchor: style.anchor.horizontal_top(),
            clip: Some(style.clip.unwrap_or(bounds)),
            ..*style
        };

        let mut drawn = Rect::new(origin.0, y, 0, 0);
        for line in lines {
            if y + height > bounds.bottom() {
                break;
            }
            if y >= bounds.top() {
                let r = self.draw(scene, font, line.as_ref(), (origin.0, y), &line_style);
                drawn = drawn.union(&r);
            }
            y += step;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::tests::FixedSource;
    use padgui_core::{HeadlessBackend, SceneNode};

    fn setup() -> (HeadlessBackend, FontManager, FontId) {
        let mut backend = HeadlessBackend::new();
        let mut fonts = FontManager::new();
        let font = fonts.load_source(
            &mut backend,
            "mono",
            10,
            &FixedSource {
                advance: 8,
                height: 10,
            },
        );
        (backend, fonts, font)
    }

    fn dsts(scene: &Scene) -> Vec<Rect> {
        scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                SceneNode::Image { dst, .. } => Some(*dst),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn load_is_idempotent_per_key_and_size() {
        let (mut backend, mut fonts, font) = setup();
        let src = FixedSource {
            advance: 8,
            height: 10,
        };
        assert_eq!(fonts.load_source(&mut backend, "mono", 10, &src), font);
        assert_ne!(fonts.load_source(&mut backend, "mono", 12, &src), font);
        assert_eq!(backend.created(), 2);
    }

    #[test]
    fn missing_font_is_not_found_or_system() {
        let (mut backend, mut fonts, _) = setup();
        let res = Resources::default();
        assert!(
            fonts
                .load(&mut backend, &res, "no-such-font-family-xyz", 12)
                .is_err()
        );
    }

    #[test]
    fn anchored_draw_offsets_origin() {
        let (_, fonts, font) = setup();
        let mut scene = Scene::default();
        let style = TextStyle::new(Color::WHITE, Anchor::Center);
        let r = fonts.draw(&mut scene, font, "abcd", (100, 50), &style);
        assert_eq!(r, Rect::new(84, 45, 32, 10));
        assert_eq!(dsts(&scene)[0], Rect::new(84, 45, 8, 10));
        assert_eq!(scene.len(), 4);
    }

    #[test]
    fn clip_stops_at_right_edge() {
        let (_, fonts, font) = setup();
        let mut scene = Scene::default();
        let style = TextStyle::default().clipped(Rect::new(0, 0, 30, 100));
        let r = fonts.draw(&mut scene, font, "abcdef", (0, 0), &style);
        assert_eq!(scene.len(), 3);
        assert_eq!(r.width, 24);
        assert!(dsts(&scene).iter().all(|d| d.right() <= 30));
    }

    #[test]
    fn draw_tints_with_style_color() {
        let (_, fonts, font) = setup();
        let mut scene = Scene::default();
        let red = Color(255, 0, 0, 128);
        fonts.draw(&mut scene, font, "a", (0, 0), &TextStyle::new(red, Anchor::TopLeft));
        assert!(matches!(scene.nodes[0], SceneNode::Image { tint, .. } if tint == red));
    }

    #[test]
    fn wrapped_block_is_anchored_as_a_unit() {
        let (_, fonts, font) = setup();
        let bounds = Rect::new(0, 0, 100, 200);
        let style = TextStyle::new(Color::WHITE, Anchor::MidLeft).with_linespace(2);
        let mut scene = Scene::default();
        let r = fonts
            .draw_wrapped(&mut scene, font, "the quick brown fox jumps", (0, 100), &style, bounds)
            .unwrap();
        // three lines of 10px with 2px gaps centered on y=100
        assert_eq!(r.top(), 83);
        assert_eq!(r.bottom(), 83 + 34);
        let ys: Vec<i32> = dsts(&scene).iter().map(|d| d.y).collect();
        assert!(ys.contains(&83) && ys.contains(&95) && ys.contains(&107));
    }

    #[test]
    fn wrapped_block_stops_at_bottom() {
        let (_, fonts, font) = setup();
        let bounds = Rect::new(0, 0, 100, 25);
        let mut scene = Scene::default();
        let r = fonts
            .draw_wrapped(
                &mut scene,
                font,
                "the quick brown fox jumps",
                (0, 0),
                &TextStyle::default(),
                bounds,
            )
            .unwrap();
        assert_eq!(r.height, 20);
        assert!(dsts(&scene).iter().all(|d| d.bottom() <= 25));
    }

    #[test]
    fn wrapped_unfittable_word_fails() {
        let (_, fonts, font) = setup();
        let mut scene = Scene::default();
        let res = fonts.draw_wrapped(
            &mut scene,
            font,
            "tiny supercalifragilistic",
            (0, 0),
            &TextStyle::default(),
            Rect::new(0, 0, 60, 100),
        );
        assert!(matches!(res, Err(FitError::Unfittable { .. })));
        assert!(scene.is_empty());
    }
}
