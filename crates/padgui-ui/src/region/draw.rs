use padgui_core::{Anchor, Color, Rect};
use padgui_text::{FontId, TextStyle};

use super::Region;
use super::bar::layout_bar;
use super::list::{BarCell, ListItem, window_start};
use super::style::ImageMode;
use crate::context::{Canvas, UiContext};
use crate::image::ImageId;
use crate::patch::nine_patch;

/// What a selection renderer is asked to show inside its cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellContent<'a> {
    Text(&'a str),
    Image(ImageId),
}

/// Something that can draw a single highlighted list row or bar cell.
pub trait CellRenderer {
    fn render_cell(&self, canvas: &mut Canvas<'_>, area: Rect, content: CellContent<'_>);
}

/// How the selected list row (or bar cell) is marked.
pub enum Highlight {
    /// Row text in this color; bar cells get a translucent fill of it.
    Color(Color),
    Renderer(Box<dyn CellRenderer>),
}

impl std::fmt::Debug for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Highlight::Color(c) => f.debug_tuple("Color").field(c).finish(),
            Highlight::Renderer(_) => f.write_str("Renderer(..)"),
        }
    }
}

impl CellRenderer for Region {
    /// Box, image and one line of text; never the Region's own text, list
    /// or bar.
    fn render_cell(&self, canvas: &mut Canvas<'_>, area: Rect, content: CellContent<'_>) {
        self.paint(canvas, area, Some(content));
    }
}

impl Region {
    /// Record this Region into the context's scene.
    pub fn draw(&self, ctx: &mut UiContext) {
        let area = self.style.area;
        let mut canvas = ctx.canvas();
        self.paint(&mut canvas, area, None);
    }

    fn paint(&self, c: &mut Canvas<'_>, area: Rect, content: Option<CellContent<'_>>) {
        let inner = self.paint_box(c, area);

        let image = match content {
            Some(CellContent::Image(id)) => Some(id),
            _ if self.style.patch.is_some() => None,
            _ => self.image,
        };
        if let Some(id) = image {
            self.paint_image(c, id, inner);
        }

        let text_area = inner.inflated(-2 * self.style.borderx, -2 * self.style.bordery);
        let Some(font) = self.font else {
            return;
        };

        match content {
            Some(CellContent::Text(t)) => {
                let style = TextStyle::new(self.style.fontcolor, self.style.align).clipped(text_area);
                c.fonts
                    .draw(c.scene, font, t, text_area.point(self.style.align), &style);
            }
            Some(CellContent::Image(_)) => {}
            None if !self.bar.is_empty() => {
                self.paint_bar(c, font, text_area, &self.bar, None);
            }
            None if !self.text.is_empty() => self.paint_text(c, font, text_area),
            None if !self.list.is_empty() => self.paint_list(c, font, inner, text_area),
            None => {}
        }
    }

    /// Patch, or fill and outline. Returns the area left inside.
    fn paint_box(&self, c: &mut Canvas<'_>, area: Rect) -> Rect {
        let s = &self.style;
        if let Some(insets) = s.patch {
            match self.pimage.and_then(|id| c.images.get(id)) {
                Some(image) => {
                    for (src, dst) in nine_patch(image.src, area, insets) {
                        image.draw_part(c.scene, src, dst);
                    }
                }
                None => log::debug!("patch without a resident image"),
            }
            return s.inner_area(area);
        }

        let radius = s.roundness as u32;
        match (s.fill, s.outline) {
            (Some(fill), Some(outline)) => {
                c.scene.fill(area, outline, radius);
                let inner = s.inner_area(area);
                c.scene
                    .fill(inner, fill, radius.saturating_sub(s.thickness as u32));
                inner
            }
            (Some(fill), None) => {
                c.scene.fill(area, fill, radius);
                area
            }
            (None, Some(outline)) => {
                c.scene.outline(area, outline, s.thickness as u32, radius);
                s.inner_area(area)
            }
            (None, None) => area,
        }
    }

    fn paint_image(&self, c: &mut Canvas<'_>, id: ImageId, area: Rect) {
        let Some(image) = c.images.get(id) else {
            log::warn!("region '{}': image {id:?} no longer resident", self.name);
            return;
        };
        let s = &self.style;
        let mut dest = Rect::new(0, 0, image.src.width, image.src.height);
        if let Some((w, h)) = s.imagesize {
            dest.width = w;
            dest.height = h;
        }

        match s.imagemode {
            ImageMode::Fit => {
                dest.fit(&area);
                if let Some(a) = s.imagealign {
                    dest.set_point(a, area.point(a));
                }
                image.draw_in(c.scene, dest, false);
            }
            ImageMode::Stretch => image.draw_in(c.scene, area, false),
            ImageMode::Repeat => image.draw_tiled(c.scene, &area, dest.size()),
            ImageMode::Native => {
                let a = s.imagealign.unwrap_or(Anchor::TopLeft);
                dest.set_point(a, area.point(a));
                image.draw_clipped(c.scene, dest, &area);
            }
        }
    }

    /// Lines from the scroll position on, as many as fit, placed as one
    /// block by `align`.
    fn paint_text(&self, c: &mut Canvas<'_>, font: FontId, area: Rect) {
        let len = self.text.len();
        let pos = self.scroll_pos.rem_euclid(len as i32) as usize;
        let height = c.fonts.height(font);
        let ls = self.style.linespace;
        let fit = ((area.height + ls) / (height + ls).max(1)).max(0) as usize;
        let visible = &self.text[pos..(pos + fit).min(len)];

        let style = TextStyle::new(self.style.fontcolor, self.style.align)
            .clipped(area)
            .with_linespace(ls);
        c.fonts.draw_lines(
            c.scene,
            font,
            visible,
            area.point(self.style.align),
            &style,
            area,
        );
    }

    fn paint_list(&self, c: &mut Canvas<'_>, font: FontId, inner: Rect, text_area: Rect) {
        let len = self.list.len();
        let item = self.item_height(c.fonts, font);
        let page = (inner.height / item).max(0) as usize;
        let selected = self.selected % len;
        let start = window_start(selected, page, len);

        let mut row = Rect::new(text_area.x, text_area.y, text_area.width, item);
        for (i, entry) in self.list.iter().enumerate().skip(start).take(page) {
            let is_selected = i == selected;
            match entry {
                ListItem::Bar(cells) => {
                    let cell = if is_selected { self.selected_x } else { None };
                    self.paint_bar(c, font, row, cells, cell);
                }
                ListItem::Text(t) => match (&self.highlight, is_selected) {
                    (Some(Highlight::Renderer(r)), true) => {
                        r.render_cell(c, row, CellContent::Text(t));
                    }
                    (Some(Highlight::Color(color)), true) => {
                        self.paint_row_text(c, font, row, text_area, t, *color);
                    }
                    _ => self.paint_row_text(c, font, row, text_area, t, self.style.fontcolor),
                },
            }
            row.y += item;
        }
    }

    fn paint_row_text(
        &self,
        c: &mut Canvas<'_>,
        font: FontId,
        row: Rect,
        clip: Rect,
        text: &str,
        color: Color,
    ) {
        let style = TextStyle::new(color, Anchor::MidLeft).clipped(clip);
        c.fonts
            .draw(c.scene, font, text, row.point(Anchor::MidLeft), &style);
    }

    fn paint_bar(
        &self,
        c: &mut Canvas<'_>,
        font: FontId,
        area: Rect,
        cells: &[BarCell],
        selected: Option<usize>,
    ) {
        let laid = layout_bar(
            c.fonts,
            c.images,
            font,
            area,
            cells,
            self.style.barwidth,
            self.style.barspace,
        );
        for (i, (dest, cell)) in laid.into_iter().enumerate() {
            if selected == Some(i) {
                match &self.highlight {
                    Some(Highlight::Renderer(r)) => {
                        let content = match cell {
                            BarCell::Image(id) => CellContent::Image(*id),
                            BarCell::Text(t) => CellContent::Text(t),
                            BarCell::Split => continue,
                        };
                        r.render_cell(c, dest, content);
                        continue;
                    }
                    Some(Highlight::Color(color)) => c.scene.fill(dest, color.with_alpha(100), 0),
                    None => c.scene.fill(dest, Color::HIGHLIGHT, 0),
                }
            }
            match cell {
                BarCell::Image(id) => c.images.draw_fitted(c.scene, *id, dest, None),
                BarCell::Text(t) => {
                    let style = TextStyle::new(self.style.fontcolor, Anchor::Center).clipped(area);
                    c.fonts.draw(c.scene, font, t, dest.center(), &style);
                }
                BarCell::Split => {}
            }
        }
    }
}
