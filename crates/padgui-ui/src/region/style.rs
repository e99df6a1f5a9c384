use padgui_core::{Anchor, Color, ConfigError, Rect};

use crate::attrs::{Attrs, IMAGE_MODES};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageMode {
    /// Keep aspect, as large as fits, optionally aligned.
    #[default]
    Fit,
    Stretch,
    /// Tile at native (or `imagesize`) size.
    Repeat,
    /// Native size at the top-left (or `imagealign`), clipped to the area.
    Native,
}

impl ImageMode {
    fn from_name(name: &str) -> Self {
        match name {
            "stretch" => ImageMode::Stretch,
            "repeat" => ImageMode::Repeat,
            "none" => ImageMode::Native,
            _ => ImageMode::Fit,
        }
    }
}

/// Typed form of a Region's attribute map.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionStyle {
    pub area: Rect,
    pub fill: Option<Color>,
    pub outline: Option<Color>,
    pub thickness: i32,
    pub roundness: i32,
    pub borderx: i32,
    pub bordery: i32,

    pub imagesize: Option<(i32, i32)>,
    pub imagemode: ImageMode,
    pub imagealign: Option<Anchor>,
    /// Left, top, right, bottom insets of the nine-patch.
    pub patch: Option<[i32; 4]>,

    pub font: Option<String>,
    pub fontsize: u32,
    pub fontcolor: Color,
    pub wrap: bool,
    pub linespace: i32,
    pub align: Anchor,

    pub itemsize: Option<i32>,
    pub click_sound: Option<String>,
    pub cancel_sound: Option<String>,
    pub scrollable: bool,
    /// Frames per line of automatic scrolling; 0 disables it.
    pub autoscroll: i32,
    pub barspace: i32,
    pub barwidth: i32,
}

impl RegionStyle {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            fill: None,
            outline: None,
            thickness: 0,
            roundness: 0,
            borderx: 0,
            bordery: 0,
            imagesize: None,
            imagemode: ImageMode::Fit,
            imagealign: None,
            patch: None,
            font: None,
            fontsize: 30,
            fontcolor: Color::WHITE,
            wrap: false,
            linespace: 0,
            align: Anchor::TopLeft,
            itemsize: None,
            click_sound: None,
            cancel_sound: None,
            scrollable: false,
            autoscroll: 0,
            barspace: 4,
            barwidth: 0,
        }
    }

    /// Validate every styling key of `attrs`. A missing `area` covers the
    /// whole logical screen.
    pub fn from_attrs(attrs: &Attrs<'_>, logical: (i32, i32)) -> Result<Self, ConfigError> {
        let screen = Rect::new(0, 0, logical.0, logical.1);
        let mut s = Self::new(attrs.rect("area", logical)?.unwrap_or(screen));

        s.fill = attrs.color("fill")?;
        s.outline = attrs.color("outline")?;
        s.thickness = non_negative(attrs, "thickness", 0)?;
        s.roundness = non_negative(attrs, "roundness", 0)?;
        let border = non_negative(attrs, "border", 0)?;
        s.bordery = non_negative(attrs, "bordery", border)?;
        s.borderx = non_negative(attrs, "borderx", border)?;

        s.imagesize = attrs.ints("imagesize", 2)?.map(|v| (v[0], v[1]));
        s.imagemode = attrs
            .option("imagemode", IMAGE_MODES)?
            .map(ImageMode::from_name)
            .unwrap_or_default();
        s.imagealign = attrs.anchor("imagealign")?;
        s.patch = attrs
            .ints("patch", 4)?
            .map(|v| [v[0], v[1], v[2], v[3]]);

        s.font = attrs.text("font")?.map(str::to_string);
        s.fontsize = non_negative(attrs, "fontsize", 30)? as u32;
        if let Some(c) = attrs.color("fontcolor")? {
            s.fontcolor = c;
        }
        s.wrap = attrs.bool("wrap")?.unwrap_or(false);
        s.linespace = attrs.int("linespace")?.unwrap_or(0);
        s.align = attrs.anchor("align")?.unwrap_or_default();

        s.itemsize = match attrs.int("itemsize")? {
            Some(n) if n <= 0 => {
                return Err(ConfigError::OutOfRange {
                    key: "itemsize".into(),
                    value: n as i64,
                    min: 1,
                    max: i32::MAX as i64,
                });
            }
            other => other,
        };
        s.click_sound = attrs.text("click_sound")?.map(str::to_string);
        s.cancel_sound = attrs.text("cancel_sound")?.map(str::to_string);
        s.scrollable = attrs.bool("scrollable")?.unwrap_or(false);
        s.autoscroll = non_negative(attrs, "autoscroll", 0)?;
        s.barspace = attrs.int("barspace")?.unwrap_or(4);
        s.barwidth = non_negative(attrs, "barwidth", 0)?;
        Ok(s)
    }

    /// The box left for content once the patch, or the outline, has taken
    /// its share of `area`.
    pub fn inner_area(&self, area: Rect) -> Rect {
        if let Some([l, t, r, b]) = self.patch {
            return Rect::from_corners(area.x + l, area.y + t, area.right() - r, area.bottom() - b);
        }
        if self.outline.is_some() {
            area.inflated_by(-2 * self.thickness)
        } else {
            area
        }
    }

    /// Where text, lists and bars go.
    pub fn text_area(&self, area: Rect) -> Rect {
        self.inner_area(area)
            .inflated(-2 * self.borderx, -2 * self.bordery)
    }
}

fn non_negative(attrs: &Attrs<'_>, key: &str, default: i32) -> Result<i32, ConfigError> {
    match attrs.int(key)? {
        None => Ok(default),
        Some(n) if n < 0 => Err(ConfigError::OutOfRange {
            key: key.to_string(),
            value: n as i64,
            min: 0,
            max: i32::MAX as i64,
        }),
        Some(n) => Ok(n),
    }
}
