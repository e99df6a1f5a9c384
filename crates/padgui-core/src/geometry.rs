use std::fmt;
use std::str::FromStr;

/// Integer point in logical pixels.
pub type Point = (i32, i32);

/// One of the nine named reference points of a rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    MidTop,
    TopRight,
    MidLeft,
    Center,
    MidRight,
    BottomLeft,
    MidBottom,
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::MidTop,
        Anchor::TopRight,
        Anchor::MidLeft,
        Anchor::Center,
        Anchor::MidRight,
        Anchor::BottomLeft,
        Anchor::MidBottom,
        Anchor::BottomRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "topleft",
            Anchor::MidTop => "midtop",
            Anchor::TopRight => "topright",
            Anchor::MidLeft => "midleft",
            Anchor::Center => "center",
            Anchor::MidRight => "midright",
            Anchor::BottomLeft => "bottomleft",
            Anchor::MidBottom => "midbottom",
            Anchor::BottomRight => "bottomright",
        }
    }

    pub fn vertical(self) -> VAlign {
        match self {
            Anchor::TopLeft | Anchor::MidTop | Anchor::TopRight => VAlign::Top,
            Anchor::MidLeft | Anchor::Center | Anchor::MidRight => VAlign::Middle,
            Anchor::BottomLeft | Anchor::MidBottom | Anchor::BottomRight => VAlign::Bottom,
        }
    }

    /// The anchor in the same column on the top row.
    pub fn horizontal_top(self) -> Anchor {
        match self {
            Anchor::TopLeft | Anchor::MidLeft | Anchor::BottomLeft => Anchor::TopLeft,
            Anchor::MidTop | Anchor::Center | Anchor::MidBottom => Anchor::MidTop,
            Anchor::TopRight | Anchor::MidRight | Anchor::BottomRight => Anchor::TopRight,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown anchor '{0}'")]
pub struct UnknownAnchor(pub String);

impl FromStr for Anchor {
    type Err = UnknownAnchor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAnchor(s.to_string()))
    }
}

/// Axis-aligned integer rectangle.
///
/// Position and size are the only stored state; every named point is a
/// projection of them, and writing a point moves the rect without resizing it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

fn half(v: i32) -> i32 {
    v.div_euclid(2)
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(x: i32, y: i32, x2: i32, y2: i32) -> Self {
        Self::new(x, y, x2 - x, y2 - y)
    }

    pub fn left(&self) -> i32 {
        self.x
    }
    pub fn top(&self) -> i32 {
        self.y
    }
    pub fn right(&self) -> i32 {
        self.x + self.width
    }
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
    pub fn centerx(&self) -> i32 {
        self.x + half(self.width)
    }
    pub fn centery(&self) -> i32 {
        self.y + half(self.height)
    }
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn set_left(&mut self, v: i32) {
        self.x = v;
    }
    pub fn set_top(&mut self, v: i32) {
        self.y = v;
    }
    pub fn set_right(&mut self, v: i32) {
        self.x = v - self.width;
    }
    pub fn set_bottom(&mut self, v: i32) {
        self.y = v - self.height;
    }
    pub fn set_centerx(&mut self, v: i32) {
        self.x = v - half(self.width);
    }
    pub fn set_centery(&mut self, v: i32) {
        self.y = v - half(self.height);
    }

    pub fn point(&self, anchor: Anchor) -> Point {
        let x = match anchor {
            Anchor::TopLeft | Anchor::MidLeft | Anchor::BottomLeft => self.left(),
            Anchor::MidTop | Anchor::Center | Anchor::MidBottom => self.centerx(),
            Anchor::TopRight | Anchor::MidRight | Anchor::BottomRight => self.right(),
        };
        let y = match anchor.vertical() {
            VAlign::Top => self.top(),
            VAlign::Middle => self.centery(),
            VAlign::Bottom => self.bottom(),
        };
        (x, y)
    }

    pub fn set_point(&mut self, anchor: Anchor, (x, y): Point) {
        match anchor {
            Anchor::TopLeft | Anchor::MidLeft | Anchor::BottomLeft => self.set_left(x),
            Anchor::MidTop | Anchor::Center | Anchor::MidBottom => self.set_centerx(x),
            Anchor::TopRight | Anchor::MidRight | Anchor::BottomRight => self.set_right(x),
        }
        match anchor.vertical() {
            VAlign::Top => self.set_top(y),
            VAlign::Middle => self.set_centery(y),
            VAlign::Bottom => self.set_bottom(y),
        }
    }

    pub fn with_point(mut self, anchor: Anchor, p: Point) -> Self {
        self.set_point(anchor, p);
        self
    }

    pub fn center(&self) -> Point {
        self.point(Anchor::Center)
    }

    /// Resize while keeping the center where it was.
    pub fn set_size(&mut self, width: i32, height: i32) {
        let c = self.center();
        self.width = width;
        self.height = height;
        self.set_point(Anchor::Center, c);
    }

    pub fn moved(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, (x, y): Point) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Largest copy of `self` that fits inside `other`, keeping aspect ratio,
    /// centered in `other`.
    pub fn fitted(&self, other: &Rect) -> Rect {
        if self.is_empty() || other.is_empty() {
            let (cx, cy) = other.center();
            return Rect::new(cx, cy, 0, 0);
        }
        let xr = self.width as f64 / other.width as f64;
        let yr = self.height as f64 / other.height as f64;
        let mr = xr.max(yr);
        let w = (self.width as f64 / mr) as i32;
        let h = (self.height as f64 / mr) as i32;
        let x = (other.x as f64 + (other.width - w) as f64 / 2.0) as i32;
        let y = (other.y as f64 + (other.height - h) as f64 / 2.0) as i32;
        Rect::new(x, y, w, h)
    }

    pub fn fit(&mut self, other: &Rect) {
        *self = self.fitted(other);
    }

    /// Grow by `(dx, dy)` keeping the center; negative values shrink.
    pub fn inflated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x - half(dx),
            self.y - half(dy),
            self.width + dx,
            self.height + dy,
        )
    }

    pub fn inflate(&mut self, dx: i32, dy: i32) {
        *self = self.inflated(dx, dy);
    }

    /// [`Rect::inflated`] by `d` on both axes.
    pub fn inflated_by(&self, d: i32) -> Rect {
        self.inflated(d, d)
    }

    /// Intersection with `other`. Disjoint rects give a zero-area rect at
    /// `self`'s origin.
    pub fn clip(&self, other: &Rect) -> Rect {
        let x0 = self.left().max(other.left());
        let y0 = self.top().max(other.top());
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return Rect::new(self.x, self.y, 0, 0);
        }
        Rect::from_corners(x0, y0, x1, y1)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_corners(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Scale both dimensions by `factor`, keeping the center.
    pub fn scaled(&self, factor: f32) -> Rect {
        let mut r = *self;
        r.set_size(
            (self.width as f32 * factor) as i32,
            (self.height as f32 * factor) as i32,
        );
        r
    }
}

impl From<(i32, i32, i32, i32)> for Rect {
    fn from((x, y, w, h): (i32, i32, i32, i32)) -> Self {
        Rect::new(x, y, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_projections() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.point(Anchor::TopLeft), (10, 20));
        assert_eq!(r.point(Anchor::MidTop), (60, 20));
        assert_eq!(r.point(Anchor::Center), (60, 45));
        assert_eq!(r.point(Anchor::BottomRight), (110, 70));
        assert_eq!(r.point(Anchor::MidLeft), (10, 45));
    }

    #[test]
    fn set_point_keeps_size() {
        for a in Anchor::ALL {
            let mut r = Rect::new(3, 4, 31, 17);
            r.set_point(a, (200, 100));
            assert_eq!(r.size(), (31, 17));
            assert_eq!(r.point(a), (200, 100), "{a}");
        }
    }

    #[test]
    fn odd_sizes_floor_the_half() {
        let r = Rect::new(0, 0, 5, 5);
        assert_eq!(r.center(), (2, 2));
        let r = Rect::new(-5, -5, 5, 5);
        assert_eq!(r.center(), (-3, -3));
    }

    #[test]
    fn fitted_keeps_aspect_and_stays_inside() {
        let src = Rect::new(0, 0, 200, 100);
        let area = Rect::new(10, 10, 100, 100);
        let f = src.fitted(&area);
        assert_eq!(f, Rect::new(10, 35, 100, 50));
        assert!(f.width <= area.width && f.height <= area.height);

        let tall = Rect::new(0, 0, 10, 40);
        let f = tall.fitted(&Rect::new(0, 0, 40, 20));
        assert_eq!(f, Rect::new(17, 0, 5, 20));
    }

    #[test]
    fn fitted_degenerate_is_zero_at_center() {
        let f = Rect::new(0, 0, 0, 10).fitted(&Rect::new(0, 0, 40, 20));
        assert_eq!(f, Rect::new(20, 10, 0, 0));
    }

    #[test]
    fn inflate_floor_divides() {
        let r = Rect::new(10, 10, 20, 20);
        assert_eq!(r.inflated(4, 2), Rect::new(8, 9, 24, 22));
        assert_eq!(r.inflated(-5, -5), Rect::new(13, 13, 15, 15));
        assert_eq!(r.inflated_by(-5), r.inflated(-5, -5));
        assert_eq!(r.inflated_by(3), Rect::new(9, 9, 23, 23));
    }

    #[test]
    fn clip_intersects_or_collapses() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.clip(&Rect::new(5, 5, 10, 10)), Rect::new(5, 5, 5, 5));
        assert_eq!(a.clip(&Rect::new(20, 20, 5, 5)), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn size_and_scale_keep_center() {
        let mut r = Rect::new(0, 0, 100, 100);
        r.set_size(50, 20);
        assert_eq!(r, Rect::new(25, 40, 50, 20));
        assert_eq!(Rect::new(0, 0, 100, 100).scaled(0.5), Rect::new(25, 25, 50, 50));
    }

    #[test]
    fn anchor_names_parse() {
        for a in Anchor::ALL {
            assert_eq!(a.name().parse::<Anchor>(), Ok(a));
        }
        assert!("middle".parse::<Anchor>().is_err());
    }
}
