//! Logical-to-surface mapping.

use padgui_core::{Flip, Point, Rect};

/// Uniform scale of the logical screen into the surface, centered, with
/// black bars on the sides that don't fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub surface: (f32, f32),
}

impl Letterbox {
    pub fn fit(logical: (u32, u32), surface: (u32, u32)) -> Self {
        let (lw, lh) = (logical.0.max(1) as f32, logical.1.max(1) as f32);
        let (sw, sh) = (surface.0 as f32, surface.1 as f32);
        let scale = (sw / lw).min(sh / lh);
        Self {
            x: ((sw - lw * scale) * 0.5).floor(),
            y: ((sh - lh * scale) * 0.5).floor(),
            scale,
            surface: (sw, sh),
        }
    }

    pub fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.y + y * self.scale)
    }

    /// Surface pixels `[x, y, w, h]`.
    pub fn rect(&self, r: Rect) -> [f32; 4] {
        let (x, y) = self.point(r.x as f32, r.y as f32);
        [x, y, r.width as f32 * self.scale, r.height as f32 * self.scale]
    }

    pub fn ndc_point(&self, x: f32, y: f32) -> [f32; 2] {
        let (px, py) = self.point(x, y);
        [
            (px / self.surface.0) * 2.0 - 1.0,
            1.0 - (py / self.surface.1) * 2.0,
        ]
    }

    /// `[min_x, min_y, w, h]` in NDC; `min_y` is the bottom edge.
    pub fn ndc_rect(&self, r: Rect) -> [f32; 4] {
        let [x, y, w, h] = self.rect(r);
        let (fw, fh) = self.surface;
        let x0 = (x / fw) * 2.0 - 1.0;
        let y0 = 1.0 - (y / fh) * 2.0;
        let x1 = ((x + w) / fw) * 2.0 - 1.0;
        let y1 = 1.0 - ((y + h) / fh) * 2.0;
        [x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs()]
    }

    /// Scissor covering the logical screen, clamped to the surface.
    pub fn scissor(&self, logical: (u32, u32)) -> (u32, u32, u32, u32) {
        let x = self.x.max(0.0) as u32;
        let y = self.y.max(0.0) as u32;
        let w = (logical.0 as f32 * self.scale).round() as u32;
        let h = (logical.1 as f32 * self.scale).round() as u32;
        let (sw, sh) = (self.surface.0 as u32, self.surface.1 as u32);
        (
            x.min(sw),
            y.min(sh),
            w.min(sw.saturating_sub(x)),
            h.min(sh.saturating_sub(y)),
        )
    }
}

/// Corners of `dst` (top-left, top-right, bottom-left, bottom-right) in
/// logical coordinates after rotating clockwise by `angle` degrees around
/// `pivot`, which is relative to `dst` and defaults to its center.
pub fn quad_corners(dst: Rect, angle: f32, pivot: Option<Point>) -> [(f32, f32); 4] {
    let (x0, y0) = (dst.x as f32, dst.y as f32);
    let (x1, y1) = (x0 + dst.width as f32, y0 + dst.height as f32);
    let corners = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)];
    if angle == 0.0 {
        return corners;
    }
    let (px, py) = match pivot {
        Some((px, py)) => (x0 + px as f32, y0 + py as f32),
        None => (x0 + dst.width as f32 * 0.5, y0 + dst.height as f32 * 0.5),
    };
    let (sin, cos) = angle.to_radians().sin_cos();
    corners.map(|(x, y)| {
        let (dx, dy) = (x - px, y - py);
        (px + dx * cos - dy * sin, py + dx * sin + dy * cos)
    })
}

/// Normalized `[u0, v0, u1, v1]` of `src` in a `size` texture, swapped per
/// flip axis.
pub fn uv_rect(src: Rect, size: (u32, u32), flip: Flip) -> [f32; 4] {
    let (tw, th) = (size.0.max(1) as f32, size.1.max(1) as f32);
    let mut u0 = src.x as f32 / tw;
    let mut v0 = src.y as f32 / th;
    let mut u1 = (src.x + src.width) as f32 / tw;
    let mut v1 = (src.y + src.height) as f32 / th;
    if flip.contains(Flip::HORIZONTAL) {
        std::mem::swap(&mut u0, &mut u1);
    }
    if flip.contains(Flip::VERTICAL) {
        std::mem::swap(&mut v0, &mut v1);
    }
    [u0, v0, u1, v1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4
    }

    #[test]
    fn wide_surface_gets_side_bars() {
        let lb = Letterbox::fit((480, 320), (1920, 1080));
        assert_eq!(lb.scale, 3.375);
        assert_eq!((lb.x, lb.y), (150.0, 0.0));
        assert_eq!(lb.rect(Rect::new(10, 10, 20, 20)), [183.75, 33.75, 67.5, 67.5]);
        assert_eq!(lb.scissor((480, 320)), (150, 0, 1620, 1080));
    }

    #[test]
    fn exact_fit_maps_screen_to_full_ndc() {
        let lb = Letterbox::fit((480, 320), (960, 640));
        assert_eq!(lb.ndc_rect(Rect::new(0, 0, 480, 320)), [-1.0, -1.0, 2.0, 2.0]);
        assert_eq!(lb.ndc_point(0.0, 0.0), [-1.0, 1.0]);
    }

    #[test]
    fn rotation_is_clockwise_around_center_by_default() {
        let c = quad_corners(Rect::new(0, 0, 10, 10), 90.0, None);
        // top-left swings to the top-right
        assert!(close(c[0], (10.0, 0.0)));
        assert!(close(c[3], (0.0, 10.0)));

        let c = quad_corners(Rect::new(0, 0, 10, 10), 90.0, Some((0, 0)));
        assert!(close(c[0], (0.0, 0.0)));
        assert!(close(c[1], (0.0, 10.0)));
    }

    #[test]
    fn flips_swap_texture_coordinates() {
        let src = Rect::new(0, 0, 16, 8);
        assert_eq!(uv_rect(src, (32, 16), Flip::empty()), [0.0, 0.0, 0.5, 0.5]);
        assert_eq!(
            uv_rect(src, (32, 16), Flip::HORIZONTAL | Flip::VERTICAL),
            [0.5, 0.5, 0.0, 0.0]
        );
    }
}
