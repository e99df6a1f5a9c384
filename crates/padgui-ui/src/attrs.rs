//! Attribute dictionaries and their validation.
//!
//! Regions are described by JSON objects. Every recognised key has a kind in
//! [`ATTRIBUTES`]; [`Attrs`] reads a key as that kind and turns anything
//! malformed into a [`ConfigError`] naming the key.

use padgui_core::{Anchor, Color, ConfigError, Rect};
use serde_json::{Map, Value};

pub type AttrMap = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrKind {
    Rect,
    Color,
    Int,
    Bool,
    File,
    Image,
    Text,
    Anchor,
    ImageMode,
    Ints(usize),
    List,
    Bar,
    /// A color, or a nested attribute object.
    Highlight,
}

pub const ATTRIBUTES: &[(&str, AttrKind)] = &[
    ("area", AttrKind::Rect),
    ("fill", AttrKind::Color),
    ("outline", AttrKind::Color),
    ("thickness", AttrKind::Int),
    ("roundness", AttrKind::Int),
    ("border", AttrKind::Int),
    ("borderx", AttrKind::Int),
    ("bordery", AttrKind::Int),
    ("image", AttrKind::Image),
    ("imagesize", AttrKind::Ints(2)),
    ("imagemode", AttrKind::ImageMode),
    ("imagealign", AttrKind::Anchor),
    ("patch", AttrKind::Ints(4)),
    ("pimage", AttrKind::Image),
    ("font", AttrKind::File),
    ("fontsize", AttrKind::Int),
    ("fontcolor", AttrKind::Color),
    ("text", AttrKind::Text),
    ("wrap", AttrKind::Bool),
    ("linespace", AttrKind::Int),
    ("align", AttrKind::Anchor),
    ("list", AttrKind::List),
    ("itemsize", AttrKind::Int),
    ("selected", AttrKind::Highlight),
    ("click_sound", AttrKind::Text),
    ("cancel_sound", AttrKind::Text),
    ("scrollable", AttrKind::Bool),
    ("autoscroll", AttrKind::Int),
    ("barspace", AttrKind::Int),
    ("barwidth", AttrKind::Int),
    ("bar", AttrKind::Bar),
];

pub fn kind_of(key: &str) -> Option<AttrKind> {
    ATTRIBUTES.iter().find(|(k, _)| *k == key).map(|(_, kind)| *kind)
}

pub const IMAGE_MODES: &[&str] = &["fit", "stretch", "repeat", "none"];

/// Merge `over` into `base` in place. Nested objects merge key by key;
/// everything else is replaced.
pub fn deep_update(base: &mut AttrMap, over: &AttrMap) {
    for (k, v) in over {
        match (base.get_mut(k), v) {
            (Some(Value::Object(b)), Value::Object(o)) => deep_update(b, o),
            _ => {
                base.insert(k.clone(), v.clone());
            }
        }
    }
}

/// Copy of `base` with `over` merged in.
pub fn deep_merge(base: &AttrMap, over: &AttrMap) -> AttrMap {
    let mut out = base.clone();
    deep_update(&mut out, over);
    out
}

fn describe(v: &Value) -> String {
    let s = v.to_string();
    if s.chars().count() > 40 {
        format!("{}...", s.chars().take(37).collect::<String>())
    } else {
        s
    }
}

/// Typed, validating view over an [`AttrMap`]. Absent keys and JSON `null`
/// read as `None`.
pub struct Attrs<'a> {
    map: &'a AttrMap,
}

impl<'a> Attrs<'a> {
    pub fn new(map: &'a AttrMap) -> Self {
        Self { map }
    }

    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn unknown_keys(&self) -> impl Iterator<Item = &'a str> {
        self.map
            .keys()
            .map(String::as_str)
            .filter(|k| kind_of(k).is_none())
    }

    pub fn int(&self, key: &str) -> Result<Option<i32>, ConfigError> {
        let Some(v) = self.raw(key) else {
            return Ok(None);
        };
        let n = v
            .as_i64()
            .ok_or_else(|| ConfigError::invalid(key, "an integer", describe(v)))?;
        i32::try_from(n).map(Some).map_err(|_| ConfigError::OutOfRange {
            key: key.to_string(),
            value: n,
            min: i32::MIN as i64,
            max: i32::MAX as i64,
        })
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.raw(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(v) => match v.as_i64() {
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                _ => Err(ConfigError::invalid(key, "a boolean", describe(v))),
            },
        }
    }

    pub fn text(&self, key: &str) -> Result<Option<&'a str>, ConfigError> {
        match self.raw(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(v) => Err(ConfigError::invalid(key, "a string", describe(v))),
        }
    }

    pub fn color(&self, key: &str) -> Result<Option<Color>, ConfigError> {
        let Some(v) = self.raw(key) else {
            return Ok(None);
        };
        parse_color(key, v).map(Some)
    }

    pub fn ints(&self, key: &str, count: usize) -> Result<Option<Vec<i32>>, ConfigError> {
        let Some(v) = self.raw(key) else {
            return Ok(None);
        };
        let expected = match count {
            2 => "a list of 2 integers",
            4 => "a list of 4 integers",
            _ => "a list of integers",
        };
        let items = v
            .as_array()
            .filter(|a| a.len() == count)
            .ok_or_else(|| ConfigError::invalid(key, expected, describe(v)))?;
        items
            .iter()
            .map(|i| {
                i.as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| ConfigError::invalid(key, expected, describe(v)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Four numbers read as corners `x, y, x2, y2`. Floats in `(0, 1]` are
    /// fractions of the logical size along their axis.
    pub fn rect(&self, key: &str, logical: (i32, i32)) -> Result<Option<Rect>, ConfigError> {
        let Some(v) = self.raw(key) else {
            return Ok(None);
        };
        let bad = || ConfigError::invalid(key, "4 numbers", describe(v));
        let items = v.as_array().filter(|a| a.len() == 4).ok_or_else(bad)?;
        let mut p = [0i32; 4];
        for (i, item) in items.iter().enumerate() {
            let axis = if i % 2 == 0 { logical.0 } else { logical.1 };
            p[i] = if let Some(n) = item.as_i64() {
                n as i32
            } else if let Some(f) = item.as_f64() {
                if f > 0.0 && f <= 1.0 {
                    (f * axis as f64) as i32
                } else {
                    f as i32
                }
            } else {
                return Err(bad());
            };
        }
        Ok(Some(Rect::from_corners(p[0], p[1], p[2], p[3])))
    }

    pub fn anchor(&self, key: &str) -> Result<Option<Anchor>, ConfigError> {
        let Some(name) = self.option(key, &[])? else {
            return Ok(None);
        };
        name.parse().map(Some).map_err(|_| ConfigError::UnknownOption {
            key: key.to_string(),
            value: name.to_string(),
            allowed: Anchor::ALL.map(|a| a.name()).join(", "),
        })
    }

    /// A string from `allowed` (any string when `allowed` is empty).
    pub fn option(&self, key: &str, allowed: &[&str]) -> Result<Option<&'a str>, ConfigError> {
        let Some(s) = self.text(key)? else {
            return Ok(None);
        };
        if !allowed.is_empty() && !allowed.contains(&s) {
            return Err(ConfigError::UnknownOption {
                key: key.to_string(),
                value: s.to_string(),
                allowed: allowed.join(", "),
            });
        }
        Ok(Some(s))
    }
}

pub fn parse_color(key: &str, v: &Value) -> Result<Color, ConfigError> {
    let bad = || ConfigError::invalid(key, "3 integers", describe(v));
    let items = v.as_array().filter(|a| a.len() == 3).ok_or_else(bad)?;
    let mut c = [0u8; 3];
    for (i, item) in items.iter().enumerate() {
        let n = item.as_i64().ok_or_else(bad)?;
        c[i] = u8::try_from(n).map_err(|_| ConfigError::OutOfRange {
            key: key.to_string(),
            value: n,
            min: 0,
            max: 255,
        })?;
    }
    Ok(Color::from(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> AttrMap {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn deep_merge_recurses_into_objects() {
        let base = map(json!({"fill": [1, 2, 3], "list": {"fontsize": 20, "fill": [0, 0, 0]}}));
        let over = map(json!({"list": {"fontsize": 24}, "text": "hi"}));
        let merged = deep_merge(&base, &over);
        assert_eq!(
            Value::Object(merged),
            json!({"fill": [1, 2, 3], "list": {"fontsize": 24, "fill": [0, 0, 0]}, "text": "hi"})
        );
        // base untouched
        assert_eq!(base["list"]["fontsize"], json!(20));
    }

    #[test]
    fn colors_must_be_three_bytes() {
        let m = map(json!({"ok": [0, 128, 255], "big": [0, 256, 0], "float": [0.5, 0, 0], "short": [1, 2]}));
        let a = Attrs::new(&m);
        assert_eq!(a.color("ok").unwrap(), Some(Color::from_rgb(0, 128, 255)));
        assert!(matches!(a.color("big"), Err(ConfigError::OutOfRange { value: 256, .. })));
        assert!(matches!(a.color("float"), Err(ConfigError::InvalidType { .. })));
        assert!(a.color("short").is_err());
        assert_eq!(a.color("missing").unwrap(), None);
    }

    #[test]
    fn rect_resolves_fractions_against_logical_size() {
        let m = map(json!({"area": [0.25, 0.5, 1.0, 320], "px": [10, 20, 110, 70], "bad": [1, 2, 3]}));
        let a = Attrs::new(&m);
        assert_eq!(
            a.rect("area", (480, 320)).unwrap(),
            Some(Rect::from_corners(120, 160, 480, 320))
        );
        assert_eq!(
            a.rect("px", (480, 320)).unwrap(),
            Some(Rect::new(10, 20, 100, 50))
        );
        assert!(a.rect("bad", (480, 320)).is_err());
    }

    #[test]
    fn ints_bools_and_options() {
        let m = map(json!({
            "fontsize": 30, "thickness": 2.5, "wrap": 1, "scrollable": "yes",
            "imagemode": "tile", "align": "center", "imagesize": [16, 16]
        }));
        let a = Attrs::new(&m);
        assert_eq!(a.int("fontsize").unwrap(), Some(30));
        assert!(a.int("thickness").is_err());
        assert_eq!(a.bool("wrap").unwrap(), Some(true));
        assert!(a.bool("scrollable").is_err());
        assert!(matches!(
            a.option("imagemode", IMAGE_MODES),
            Err(ConfigError::UnknownOption { .. })
        ));
        assert_eq!(a.anchor("align").unwrap(), Some(Anchor::Center));
        assert_eq!(a.ints("imagesize", 2).unwrap(), Some(vec![16, 16]));
        assert!(a.ints("imagesize", 4).is_err());
    }

    #[test]
    fn unknown_keys_are_reported() {
        let m = map(json!({"fill": [0, 0, 0], "colour": [1, 1, 1]}));
        let unknown: Vec<&str> = Attrs::new(&m).unknown_keys().collect();
        assert_eq!(unknown, vec!["colour"]);
    }
}
