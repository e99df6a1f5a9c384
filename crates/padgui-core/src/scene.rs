use bitflags::bitflags;

use crate::{Color, Point, Rect, TextureId};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Flip: u8 {
        const HORIZONTAL = 0b01;
        const VERTICAL = 0b10;
    }
}

impl Flip {
    pub fn from_axes(x: bool, y: bool) -> Self {
        let mut f = Flip::empty();
        f.set(Flip::HORIZONTAL, x);
        f.set(Flip::VERTICAL, y);
        f
    }
}

/// Display list produced by one frame of drawing, in logical pixels.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub clear_color: Color,
    pub nodes: Vec<SceneNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    Fill {
        rect: Rect,
        color: Color,
        radius: u32,
    },
    Outline {
        rect: Rect,
        color: Color,
        thickness: u32,
        radius: u32,
    },
    /// Copy `src` of `texture` into `dst`, tinted, optionally flipped and
    /// rotated by `angle` degrees around `pivot` (relative to `dst`).
    Image {
        texture: TextureId,
        src: Rect,
        dst: Rect,
        tint: Color,
        flip: Flip,
        angle: f32,
        pivot: Option<Point>,
    },
}

impl Scene {
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color,
            nodes: Vec::new(),
        }
    }

    pub fn clear(&mut self, clear_color: Color) {
        self.clear_color = clear_color;
        self.nodes.clear();
    }

    pub fn fill(&mut self, rect: Rect, color: Color, radius: u32) {
        if rect.is_empty() {
            return;
        }
        self.nodes.push(SceneNode::Fill {
            rect,
            color,
            radius,
        });
    }

    pub fn outline(&mut self, rect: Rect, color: Color, thickness: u32, radius: u32) {
        if rect.is_empty() || thickness == 0 {
            return;
        }
        self.nodes.push(SceneNode::Outline {
            rect,
            color,
            thickness,
            radius,
        });
    }

    /// Untransformed tinted copy; used for glyphs and plain images.
    pub fn blit(&mut self, texture: TextureId, src: Rect, dst: Rect, tint: Color) {
        if dst.is_empty() || src.is_empty() {
            return;
        }
        self.nodes.push(SceneNode::Image {
            texture,
            src,
            dst,
            tint,
            flip: Flip::empty(),
            angle: 0.0,
            pivot: None,
        });
    }

    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
