//! Shared fixtures for the unit tests of this crate.

use padgui_core::{Rect, RenderBackend, Scene, SceneNode};
use padgui_text::{FontId, FontManager, GlyphBitmap, GlyphSource};
use serde_json::Value;

use crate::attrs::AttrMap;
use crate::context::UiContext;

/// Monospace glyphs, 8 pixels wide and 10 high.
pub struct Mono;

impl GlyphSource for Mono {
    fn line_height(&self) -> u32 {
        10
    }
    fn rasterize(&self, _ch: char) -> GlyphBitmap {
        GlyphBitmap {
            width: 8,
            height: 10,
            coverage: vec![255; 80],
        }
    }
}

pub fn mono(backend: &mut dyn RenderBackend) -> (FontManager, FontId) {
    let mut fonts = FontManager::new();
    let font = fonts.load_source(backend, "mono", 10, &Mono);
    (fonts, font)
}

/// 480x320 headless context where `"font": "mono", "fontsize": 10` resolves.
pub fn ctx() -> UiContext {
    let mut ctx = UiContext::headless(480, 320);
    ctx.register_font("mono", 10, &Mono);
    ctx
}

pub fn attrs(v: Value) -> AttrMap {
    match v {
        Value::Object(m) => m,
        other => panic!("not an object: {other}"),
    }
}

/// Destination rects of every textured node, in draw order.
pub fn blits(scene: &Scene) -> Vec<Rect> {
    scene
        .nodes
        .iter()
        .filter_map(|n| match n {
            SceneNode::Image { dst, .. } => Some(*dst),
            _ => None,
        })
        .collect()
}

/// Fill nodes as (rect, color).
pub fn fills(scene: &Scene) -> Vec<(Rect, padgui_core::Color)> {
    scene
        .nodes
        .iter()
        .filter_map(|n| match n {
            SceneNode::Fill { rect, color, .. } => Some((*rect, *color)),
            _ => None,
        })
        .collect()
}
