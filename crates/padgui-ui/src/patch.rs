use padgui_core::Rect;

/// Split `src` and `dst` into the nine (source, destination) pairs of a
/// stretchable frame. `insets` are left, top, right, bottom in pixels; the
/// corners keep their size, the edges stretch along one axis and the center
/// along both.
pub fn nine_patch(src: Rect, dst: Rect, insets: [i32; 4]) -> Vec<(Rect, Rect)> {
    let [l, t, r, b] = insets;
    let cuts = |start: i32, end: i32, a: i32, b: i32| [start, start + a, end - b, end];
    let (sx, sy) = (cuts(src.left(), src.right(), l, r), cuts(src.top(), src.bottom(), t, b));
    let (dx, dy) = (cuts(dst.left(), dst.right(), l, r), cuts(dst.top(), dst.bottom(), t, b));

    let mut out = Vec::with_capacity(9);
    for row in 0..3 {
        for col in 0..3 {
            let s = Rect::from_corners(sx[col], sy[row], sx[col + 1], sy[row + 1]);
            let d = Rect::from_corners(dx[col], dy[row], dx[col + 1], dy[row + 1]);
            if !s.is_empty() && !d.is_empty() {
                out.push((s, d));
            }
        }
    }
    out
}
