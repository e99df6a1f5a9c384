use padgui_core::ConfigError;
use serde_json::Value;

use crate::context::UiContext;
use crate::image::ImageId;

/// One cell of a bar: a label, an image, or the marker after which the
/// remaining cells are packed against the right edge.
#[derive(Clone, Debug, PartialEq)]
pub enum BarCell {
    Text(String),
    Image(ImageId),
    Split,
}

/// A list row: plain text or a bar.
#[derive(Clone, Debug, PartialEq)]
pub enum ListItem {
    Text(String),
    Bar(Vec<BarCell>),
}

impl From<&str> for ListItem {
    fn from(s: &str) -> Self {
        ListItem::Text(s.to_string())
    }
}

impl From<String> for ListItem {
    fn from(s: String) -> Self {
        ListItem::Text(s)
    }
}

impl From<Vec<BarCell>> for ListItem {
    fn from(cells: Vec<BarCell>) -> Self {
        ListItem::Bar(cells)
    }
}

pub fn check_bar(cells: &[BarCell]) -> Result<(), ConfigError> {
    let count = cells.iter().filter(|c| **c == BarCell::Split).count();
    if count > 1 {
        return Err(ConfigError::MultipleSplits { count });
    }
    Ok(())
}

/// First visible row so the selection sits about a third of the way down the
/// page: `floor(selected - page / 3)`, never so low that the selection falls
/// off the bottom, clamped to the list.
pub fn window_start(selected: usize, page: usize, len: usize) -> usize {
    if page == 0 || len <= page {
        return 0;
    }
    let (sel, page) = (selected as i64, page as i64);
    let start = (3 * sel - page).div_euclid(3).max(sel + 1 - page);
    start.clamp(0, len as i64 - page) as usize
}

/// A string names an image when one resolves, otherwise it is a label.
pub(crate) fn resolve_cell(ctx: &mut UiContext, s: &str) -> BarCell {
    if s.is_empty() {
        return BarCell::Split;
    }
    match ctx.try_load_image(s) {
        Some(id) => BarCell::Image(id),
        None => BarCell::Text(s.to_string()),
    }
}

pub(crate) fn parse_bar(ctx: &mut UiContext, key: &str, v: &Value) -> Result<Vec<BarCell>, ConfigError> {
    let items = v
        .as_array()
        .ok_or_else(|| ConfigError::invalid(key, "a list of strings and nulls", v))?;
    let cells = items
        .iter()
        .map(|item| match item {
            Value::Null => Ok(BarCell::Split),
            Value::String(s) => Ok(resolve_cell(ctx, s)),
            other => Err(ConfigError::invalid(key, "a string or null bar cell", other)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_bar(&cells)?;
    Ok(cells)
}

pub(crate) fn parse_list(ctx: &mut UiContext, key: &str, v: &Value) -> Result<Vec<ListItem>, ConfigError> {
    let items = v
        .as_array()
        .ok_or_else(|| ConfigError::invalid(key, "a list", v))?;
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(ListItem::Text(s.clone())),
            Value::Array(_) => parse_bar(ctx, key, item).map(ListItem::Bar),
            other => Err(ConfigError::invalid(key, "strings or bars", other)),
        })
        .collect()
}
