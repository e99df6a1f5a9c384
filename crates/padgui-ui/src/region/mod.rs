//! Regions: rectangles that draw a box, an image and one of text, a list
//! or a bar, described by an attribute map.

mod bar;
mod draw;
mod list;
mod style;

pub use bar::layout_bar;
pub use draw::{CellContent, CellRenderer, Highlight};
pub use list::{BarCell, ListItem, check_bar, window_start};
pub use style::{ImageMode, RegionStyle};

use padgui_core::{Action, Anchor, ConfigError, Error, InputHandler, Rect};
use padgui_text::{FontError, FontId, FontManager};
use serde_json::Value;

use crate::attrs::{AttrMap, Attrs, deep_merge, parse_color};
use crate::context::UiContext;
use crate::image::ImageId;
use crate::theme::Theme;

pub(crate) use list::resolve_cell;

pub struct Region {
    name: String,
    style: RegionStyle,
    font: Option<FontId>,
    image: Option<ImageId>,
    pimage: Option<ImageId>,
    text: Vec<String>,
    list: Vec<ListItem>,
    bar: Vec<BarCell>,
    selectable: Option<Vec<usize>>,
    selected: usize,
    selected_x: Option<usize>,
    highlight: Option<Highlight>,
    scroll_pos: i32,
    scroll_delay: i32,
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.name)
            .field("area", &self.style.area)
            .field("lines", &self.text.len())
            .field("items", &self.list.len())
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl Region {
    /// Build a Region from `attrs` laid over the context defaults.
    pub fn new(ctx: &mut UiContext, attrs: &AttrMap) -> Result<Self, Error> {
        let merged = deep_merge(ctx.defaults(), attrs);
        Self::build(ctx, "", &merged, true)
    }

    /// Build the Region a theme defines under `name`.
    pub fn named(ctx: &mut UiContext, theme: &Theme, name: &str) -> Result<Self, Error> {
        let attrs = theme
            .region(name)
            .ok_or_else(|| ConfigError::Missing { key: name.to_string() })?;
        let merged = deep_merge(ctx.defaults(), attrs);
        Self::build(ctx, name, &merged, true)
    }

    fn build(ctx: &mut UiContext, name: &str, merged: &AttrMap, nested: bool) -> Result<Self, Error> {
        let a = Attrs::new(merged);
        for key in a.unknown_keys() {
            log::warn!("region '{name}': unknown attribute '{key}'");
        }
        let style = RegionStyle::from_attrs(&a, ctx.logical_size())?;

        let font = match &style.font {
            Some(file) if style.fontsize > 0 => Some(load_font(ctx, file, style.fontsize)?),
            _ => None,
        };
        let mut image = a.text("image")?.and_then(|n| ctx.load_image(n));
        let mut pimage = a.text("pimage")?.and_then(|n| ctx.load_image(n));
        if style.patch.is_some() && pimage.is_none() {
            pimage = image.take();
        }

        let text = a.text("text")?;
        let list = match a.raw("list") {
            Some(v) => list::parse_list(ctx, "list", v)?,
            None => Vec::new(),
        };
        if text.is_some() && a.raw("list").is_some() {
            return Err(ConfigError::TextAndList.into());
        }
        let bar = match a.raw("bar") {
            Some(v) => list::parse_bar(ctx, "bar", v)?,
            None => Vec::new(),
        };

        let highlight = match a.raw("selected") {
            None => None,
            Some(Value::Object(obj)) if nested => {
                let mut attrs = deep_merge(ctx.defaults(), obj);
                attrs.remove("selected");
                let cell = Self::build(ctx, &format!("{name}.selected"), &attrs, false)?;
                Some(Highlight::Renderer(Box::new(cell)))
            }
            Some(Value::Object(_)) => None,
            Some(v) => Some(Highlight::Color(parse_color("selected", v)?)),
        };

        let scroll_delay = -style.autoscroll * 2;
        let mut region = Self {
            name: name.to_string(),
            style,
            font,
            image,
            pimage,
            text: Vec::new(),
            list,
            bar,
            selectable: None,
            selected: 0,
            selected_x: None,
            highlight,
            scroll_pos: 0,
            scroll_delay,
        };
        if let Some(t) = text {
            region.set_text(ctx, t)?;
            region.scroll_delay = scroll_delay;
        }
        log::debug!("built {region:?}");
        Ok(region)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &RegionStyle {
        &self.style
    }

    /// Direct access to the typed style. Font file and size changes take
    /// effect through [`Region::set_font`].
    pub fn style_mut(&mut self) -> &mut RegionStyle {
        &mut self.style
    }

    pub fn area(&self) -> Rect {
        self.style.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.style.area = area;
    }

    pub fn set_align(&mut self, align: Anchor) {
        self.style.align = align;
    }

    pub fn font(&self) -> Option<FontId> {
        self.font
    }

    /// Switch to `file` at `size`; `None` turns text off.
    pub fn set_font(
        &mut self,
        ctx: &mut UiContext,
        file: Option<&str>,
        size: u32,
    ) -> Result<(), ConfigError> {
        self.font = match file {
            Some(f) if size > 0 => Some(load_font(ctx, f, size)?),
            _ => None,
        };
        self.style.font = file.map(str::to_string);
        self.style.fontsize = size;
        Ok(())
    }

    pub fn image(&self) -> Option<ImageId> {
        self.image
    }

    pub fn set_image(&mut self, image: Option<ImageId>) {
        self.image = image;
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }

    /// Replace the text. With `wrap` the text is split to the width of the
    /// text area; otherwise on newlines. Scrolling restarts from the top.
    pub fn set_text(&mut self, ctx: &UiContext, text: &str) -> Result<(), Error> {
        if !self.list.is_empty() {
            return Err(ConfigError::TextAndList.into());
        }
        self.text = match (self.style.wrap, self.font) {
            (true, Some(font)) => {
                let width = self.style.text_area(self.style.area).width;
                ctx.fonts().split_lines(font, text, width)?
            }
            _ => text.split('\n').map(str::to_string).collect(),
        };
        self.scroll_pos = 0;
        self.scroll_delay = -self.style.autoscroll;
        Ok(())
    }

    pub fn list(&self) -> &[ListItem] {
        &self.list
    }

    /// Replace the list. The selection is kept when still in range and any
    /// selectable subset is dropped.
    pub fn set_list(&mut self, items: Vec<ListItem>) -> Result<(), ConfigError> {
        if !self.text.is_empty() {
            return Err(ConfigError::TextAndList);
        }
        for item in &items {
            if let ListItem::Bar(cells) = item {
                check_bar(cells)?;
            }
        }
        self.selected = if items.is_empty() {
            0
        } else {
            self.selected % items.len()
        };
        self.list = items;
        self.selectable = None;
        Ok(())
    }

    pub fn bar(&self) -> &[BarCell] {
        &self.bar
    }

    pub fn set_bar(&mut self, cells: Vec<BarCell>) -> Result<(), ConfigError> {
        check_bar(&cells)?;
        self.bar = cells;
        Ok(())
    }

    /// Build bar cells from strings, turning names of loadable images into
    /// image cells and empty strings into the split.
    pub fn set_bar_strings<S: AsRef<str>>(
        &mut self,
        ctx: &mut UiContext,
        cells: &[S],
    ) -> Result<(), ConfigError> {
        let cells = cells.iter().map(|s| resolve_cell(ctx, s.as_ref())).collect();
        self.set_bar(cells)
    }

    /// Restrict up/down movement to these list indices. Indices past the end
    /// are dropped; none left is an error.
    pub fn set_selectable(&mut self, indices: Vec<usize>) -> Result<(), ConfigError> {
        let len = self.list.len();
        let valid: Vec<usize> = indices.into_iter().filter(|&i| i < len).collect();
        if valid.is_empty() {
            return Err(ConfigError::NoSelectable);
        }
        if !valid.contains(&self.selected) {
            self.selected = valid[0];
        }
        self.selectable = Some(valid);
        Ok(())
    }

    pub fn selectable(&self) -> Option<&[usize]> {
        self.selectable.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Select row `index`, taken modulo the list length.
    pub fn set_selected(&mut self, index: usize) {
        self.selected = match self.list.len() {
            0 => index,
            len => index % len,
        };
    }

    pub fn selected_x(&self) -> Option<usize> {
        self.selected_x
    }

    /// Which cell of a selected bar row is highlighted; `None` highlights
    /// nothing in bar rows.
    pub fn set_selected_x(&mut self, cell: Option<usize>) {
        self.selected_x = cell;
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    pub fn set_highlight(&mut self, highlight: Option<Highlight>) {
        self.highlight = highlight;
    }

    pub fn scroll_pos(&self) -> i32 {
        self.scroll_pos
    }

    fn item_height(&self, fonts: &FontManager, font: FontId) -> i32 {
        self.style
            .itemsize
            .unwrap_or_else(|| fonts.height(font) + self.style.bordery)
            .max(1)
    }

    /// Rows of the list visible at once. Zero without a font.
    pub fn page_size(&self, fonts: &FontManager) -> usize {
        let Some(font) = self.font else {
            return 0;
        };
        let inner = self.style.inner_area(self.style.area);
        (inner.height / self.item_height(fonts, font)).max(0) as usize
    }

    /// First list row shown.
    pub fn window_start(&self, fonts: &FontManager) -> usize {
        let len = self.list.len();
        if len == 0 {
            return 0;
        }
        window_start(self.selected % len, self.page_size(fonts), len)
    }

    fn is_selectable(&self, index: usize) -> bool {
        self.selectable
            .as_ref()
            .is_none_or(|s| s.contains(&index))
    }

    /// Advance autoscroll and apply this frame's input. Returns whether the
    /// Region needs redrawing.
    pub fn update(&mut self, ctx: &mut UiContext, input: &InputHandler) -> bool {
        let pressed = input.pressed();

        if self.style.autoscroll > 0 {
            self.scroll_delay += 1;
            if self.scroll_delay < self.style.autoscroll {
                return false;
            }
            self.scroll_pos += 1;
            self.scroll_delay = 0;
            if self.scroll_pos > self.text.len() as i32 {
                self.scroll_delay = -self.style.autoscroll;
                self.scroll_pos = 0;
            }
            return true;
        }

        if !self.text.is_empty() && self.style.scrollable {
            let before = self.scroll_pos;
            match pressed {
                Some(Action::Up) => self.scroll_pos -= 1,
                Some(Action::Down) => self.scroll_pos += 1,
                _ => return false,
            }
            self.scroll_pos = self.scroll_pos.clamp(0, self.text.len() as i32 - 1);
            log::trace!("region '{}': scroll {before} -> {}", self.name, self.scroll_pos);
            return true;
        }

        if !self.list.is_empty() {
            let step = match pressed {
                Some(Action::Up) => -1,
                Some(Action::Down) => 1,
                _ => return false,
            };
            let len = self.list.len() as i64;
            let mut next = self.selected as i64;
            // at least one index is selectable, so this ends within len steps
            for _ in 0..len {
                next = (next + step).rem_euclid(len);
                if self.is_selectable(next as usize) {
                    break;
                }
            }
            self.selected = next as usize;
            ctx.play(self.style.click_sound.as_deref());
            return true;
        }

        false
    }
}

fn load_font(ctx: &mut UiContext, file: &str, size: u32) -> Result<FontId, ConfigError> {
    ctx.load_font(file, size).map_err(|e| match e {
        FontError::NotFound(_) => ConfigError::MissingFile {
            key: "font".into(),
            name: file.to_string(),
        },
        other => ConfigError::invalid("font", "a readable font", other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{attrs, blits, ctx, fills};
    use padgui_core::{Color, SoundSink};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn press(action: Action) -> InputHandler {
        let mut input = InputHandler::new();
        input.press(action);
        input
    }

    fn list_region(ctx: &mut UiContext, items: Value, height: i32) -> Region {
        Region::new(
            ctx,
            &attrs(json!({
                "area": [0, 0, 200, height], "font": "mono", "fontsize": 10, "list": items
            })),
        )
        .unwrap()
    }

    #[test]
    fn three_items_two_rows_window_follows_selection() {
        let mut ctx = ctx();
        let mut r = list_region(&mut ctx, json!(["a", "b", "c"]), 20);
        assert_eq!(r.page_size(ctx.fonts()), 2);

        let mut starts = vec![r.window_start(ctx.fonts())];
        for _ in 0..2 {
            assert!(r.update(&mut ctx, &press(Action::Down)));
            starts.push(r.window_start(ctx.fonts()));
        }
        assert_eq!(starts, vec![0, 0, 1]);
        assert_eq!(r.selected(), 2);

        ctx.begin_frame(Color::BLACK);
        r.draw(&mut ctx);
        // rows "b" and "c", one glyph each
        assert_eq!(
            blits(ctx.scene()),
            vec![Rect::new(0, 0, 8, 10), Rect::new(0, 10, 8, 10)]
        );
    }

    #[test]
    fn one_row_page_shows_the_selected_row() {
        let mut ctx = ctx();
        let mut r = list_region(&mut ctx, json!(["a", "bb", "ccc"]), 10);
        assert_eq!(r.page_size(ctx.fonts()), 1);

        assert!(r.update(&mut ctx, &press(Action::Down)));
        assert_eq!(r.selected(), 1);
        assert_eq!(r.window_start(ctx.fonts()), 1);

        ctx.begin_frame(Color::BLACK);
        r.draw(&mut ctx);
        assert_eq!(
            blits(ctx.scene()),
            vec![Rect::new(0, 0, 8, 10), Rect::new(8, 0, 8, 10)]
        );
    }

    #[test]
    fn set_selected_wraps_to_list_length() {
        let mut ctx = ctx();
        let mut r = list_region(&mut ctx, json!(["a", "b", "c"]), 100);
        r.set_selected(7);
        assert_eq!(r.selected(), 1);
        r.set_selected(2);
        assert_eq!(r.selected(), 2);
    }

    #[test]
    fn selection_wraps_and_skips_unselectable() {
        let mut ctx = ctx();
        let mut r = list_region(&mut ctx, json!(["h", "a", "b", "h2", "c"]), 100);
        r.set_selectable(vec![1, 2, 4, 99]).unwrap();
        assert_eq!(r.selected(), 1);
        assert_eq!(r.selectable(), Some(&[1, 2, 4][..]));

        r.update(&mut ctx, &press(Action::Down));
        assert_eq!(r.selected(), 2);
        r.update(&mut ctx, &press(Action::Down));
        assert_eq!(r.selected(), 4);
        r.update(&mut ctx, &press(Action::Down));
        assert_eq!(r.selected(), 1);
        r.update(&mut ctx, &press(Action::Up));
        assert_eq!(r.selected(), 4);

        assert!(!r.update(&mut ctx, &press(Action::A)));
        assert_eq!(r.set_selectable(vec![7, 8]), Err(ConfigError::NoSelectable));
    }

    #[test]
    fn list_moves_play_click_sound() {
        #[derive(Clone, Default)]
        struct Recorder(Rc<RefCell<Vec<String>>>);
        impl SoundSink for Recorder {
            fn play(&mut self, name: &str) {
                self.0.borrow_mut().push(name.to_string());
            }
            fn music(&mut self, _: &str, _: i32, _: f32) {}
        }

        let rec = Recorder::default();
        let mut ctx = ctx().with_sounds(Box::new(rec.clone()));
        let mut r = Region::new(
            &mut ctx,
            &attrs(json!({"font": "mono", "fontsize": 10, "list": ["a", "b"], "click_sound": "click"})),
        )
        .unwrap();
        r.update(&mut ctx, &press(Action::Down));
        r.update(&mut ctx, &InputHandler::new());
        assert_eq!(*rec.0.borrow(), vec!["click".to_string()]);
    }

    #[test]
    fn autoscroll_waits_then_advances_and_wraps() {
        let mut ctx = ctx();
        let mut r = Region::new(
            &mut ctx,
            &attrs(json!({"font": "mono", "fontsize": 10, "text": "one\ntwo", "autoscroll": 2})),
        )
        .unwrap();
        let idle = InputHandler::new();
        let mut positions = Vec::new();
        for _ in 0..12 {
            r.update(&mut ctx, &idle);
            positions.push(r.scroll_pos());
        }
        // 2*autoscroll frames of initial delay, then a line every 2 frames;
        // past the end it rests for autoscroll frames
        assert_eq!(positions, vec![0, 0, 0, 0, 0, 1, 1, 2, 2, 0, 0, 0]);
    }

    #[test]
    fn scrollable_text_clamps() {
        let mut ctx = ctx();
        let mut r = Region::new(
            &mut ctx,
            &attrs(json!({"font": "mono", "fontsize": 10, "text": "1\n2\n3", "scrollable": true})),
        )
        .unwrap();
        assert!(r.update(&mut ctx, &press(Action::Up)));
        assert_eq!(r.scroll_pos(), 0);
        for _ in 0..5 {
            r.update(&mut ctx, &press(Action::Down));
        }
        assert_eq!(r.scroll_pos(), 2);
        assert!(!r.update(&mut ctx, &InputHandler::new()));
    }

    #[test]
    fn wrapped_text_uses_text_area_width() {
        let mut ctx = ctx();
        let r = Region::new(
            &mut ctx,
            &attrs(json!({
                "area": [0, 0, 108, 100], "border": 4, "font": "mono", "fontsize": 10,
                "wrap": true, "text": "the quick brown fox jumps"
            })),
        )
        .unwrap();
        assert_eq!(r.text(), ["the quick ", "brown fox ", "jumps "]);
    }

    #[test]
    fn unfittable_word_is_a_fit_error() {
        let mut ctx = ctx();
        let err = Region::new(
            &mut ctx,
            &attrs(json!({
                "area": [0, 0, 40, 100], "font": "mono", "fontsize": 10,
                "wrap": true, "text": "supercalifragilistic"
            })),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Fit(_)));
    }

    #[test]
    fn construction_errors_are_config_errors() {
        let mut ctx = ctx();
        let bad = [
            json!({"text": "x", "list": ["a"]}),
            json!({"fill": [0, 0, 300]}),
            json!({"bar": ["a", null, "b", ""]}),
            json!({"font": "no-such-font-file.ttf", "fontsize": 12}),
            json!({"selected": "blue"}),
        ];
        for a in bad {
            let err = Region::new(&mut ctx, &attrs(a.clone())).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{a}: {err}");
        }
    }

    #[test]
    fn defaults_apply_and_instance_wins() {
        let mut ctx = ctx();
        ctx.set_defaults(attrs(json!({"fill": [1, 2, 3], "fontcolor": [9, 9, 9]})));
        let r = Region::new(&mut ctx, &attrs(json!({"fill": [4, 5, 6]}))).unwrap();
        assert_eq!(r.style().fill, Some(Color::from_rgb(4, 5, 6)));
        assert_eq!(r.style().fontcolor, Color::from_rgb(9, 9, 9));
    }

    #[test]
    fn fill_and_outline_draw_outline_then_inset_fill() {
        let mut ctx = ctx();
        let r = Region::new(
            &mut ctx,
            &attrs(json!({"area": [10, 10, 110, 60], "fill": [0, 0, 0], "outline": [255, 255, 255], "thickness": 3})),
        )
        .unwrap();
        r.draw(&mut ctx);
        assert_eq!(
            fills(ctx.scene()),
            vec![
                (Rect::new(10, 10, 100, 50), Color::WHITE),
                (Rect::new(13, 13, 94, 44), Color::BLACK),
            ]
        );
    }

    #[test]
    fn nothing_textual_without_a_font() {
        let mut ctx = ctx();
        let r = Region::new(&mut ctx, &attrs(json!({"text": "hello", "list": null}))).unwrap();
        r.draw(&mut ctx);
        assert!(ctx.scene().is_empty());
    }

    #[test]
    fn color_highlight_recolors_selected_row() {
        let mut ctx = ctx();
        let mut r = Region::new(
            &mut ctx,
            &attrs(json!({"font": "mono", "fontsize": 10, "list": ["a", "b"], "selected": [255, 0, 0]})),
        )
        .unwrap();
        r.set_selected(1);
        r.draw(&mut ctx);
        let tints: Vec<Color> = ctx
            .scene()
            .nodes
            .iter()
            .filter_map(|n| match n {
                padgui_core::SceneNode::Image { tint, .. } => Some(*tint),
                _ => None,
            })
            .collect();
        assert_eq!(tints, vec![Color::WHITE, Color::from_rgb(255, 0, 0)]);
    }

    #[test]
    fn nested_highlight_draws_its_box_behind_selected_row() {
        let mut ctx = ctx();
        let r = Region::new(
            &mut ctx,
            &attrs(json!({
                "area": [0, 0, 100, 40], "font": "mono", "fontsize": 10, "list": ["a", "b"],
                "selected": {"fill": [0, 0, 200], "font": "mono", "fontsize": 10}
            })),
        )
        .unwrap();
        assert!(matches!(r.highlight(), Some(Highlight::Renderer(_))));
        r.draw(&mut ctx);
        assert_eq!(
            fills(ctx.scene()),
            vec![(Rect::new(0, 0, 100, 10), Color::from_rgb(0, 0, 200))]
        );
        assert_eq!(blits(ctx.scene()).len(), 2);
    }

    #[test]
    fn bar_row_highlights_selected_cell() {
        let mut ctx = ctx();
        let mut r = Region::new(
            &mut ctx,
            &attrs(json!({
                "area": [0, 0, 200, 20], "font": "mono", "fontsize": 10,
                "list": [["Volume", null, ">", "50", "<"]]
            })),
        )
        .unwrap();
        r.set_selected_x(Some(2));
        r.draw(&mut ctx);
        assert_eq!(
            fills(ctx.scene()),
            vec![(Rect::new(172, 0, 16, 10), Color::HIGHLIGHT)]
        );
    }

    #[test]
    fn set_text_and_set_list_exclude_each_other() {
        let mut ctx = ctx();
        let mut r = list_region(&mut ctx, json!(["a"]), 40);
        assert!(r.set_text(&ctx, "hi").is_err());
        r.set_list(Vec::new()).unwrap();
        r.set_text(&ctx, "hi\nthere").unwrap();
        assert_eq!(r.text(), ["hi", "there"]);
        assert_eq!(r.set_list(vec!["x".into()]), Err(ConfigError::TextAndList));
    }
}
