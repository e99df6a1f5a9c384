use padgui_core::Rect;
use padgui_text::{FontId, FontManager};

use super::list::BarCell;
use crate::image::ImageManager;

/// Place the cells of a bar inside `area`.
///
/// Cells before the split run left to right from `area.x`; cells after it
/// run right to left from `area.right()`, in list order. Every cell is at
/// least `barwidth` wide and `barspace` apart from its neighbour. Text cells
/// are one font line high and centered vertically; image cells are fitted to
/// the row. The split itself takes no place and is not returned.
pub fn layout_bar<'c>(
    fonts: &FontManager,
    images: &ImageManager,
    font: FontId,
    area: Rect,
    cells: &'c [BarCell],
    barwidth: i32,
    barspace: i32,
) -> Vec<(Rect, &'c BarCell)> {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut past_split = false;
    let mut x = area.x;

    for cell in cells {
        let mut dest = match cell {
            BarCell::Split => {
                past_split = true;
                continue;
            }
            BarCell::Image(id) => match images.get(*id) {
                Some(image) => image.src.fitted(&area),
                None => Rect::new(x, area.centery(), 0, 0),
            },
            BarCell::Text(s) => {
                let mut r = Rect::new(x, 0, fonts.width(font, s), fonts.height(font));
                r.set_centery(area.centery());
                r
            }
        };
        dest.x = x;
        dest.width = dest.width.max(barwidth);
        x = dest.right() + barspace;
        if past_split {
            right.push((dest, cell));
        } else {
            left.push((dest, cell));
        }
    }

    let mut x = area.right();
    for (dest, _) in &mut right {
        dest.set_right(x);
        x -= dest.width + barspace;
    }
    left.extend(right);
    left
}
