//! Theme files: `theme.json` laid over an optional `defaults.json`.
//!
//! Top-level keys `options`, `defaults`, `sounds` and `atlases` are read
//! here; every other object is a named Region definition.

use std::io;
use std::path::{Path, PathBuf};

use padgui_core::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::attrs::{AttrMap, deep_update};
use crate::context::UiContext;
use crate::image::AtlasEntry;

pub const THEME_FILE: &str = "theme.json";
pub const DEFAULTS_FILE: &str = "defaults.json";

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("theme key '{key}': {message}")]
    Invalid { key: String, message: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThemeOptions {
    /// Size everything is laid out in, scaled to the window.
    pub logical_size: (u32, u32),
    /// Window size when not fullscreen; the logical size if absent.
    pub screen_size: Option<(u32, u32)>,
    pub fullscreen: bool,
    pub title: String,
    pub music: Option<String>,
    pub music_volume: f32,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            logical_size: (480, 320),
            screen_size: None,
            fullscreen: true,
            title: "padgui".into(),
            music: None,
            music_volume: 0.5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Theme {
    dir: PathBuf,
    root: AttrMap,
    options: ThemeOptions,
}

impl Theme {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let dir = dir.as_ref();
        let mut root = match read_object(&dir.join(DEFAULTS_FILE)) {
            Ok(map) => map,
            Err(ThemeError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                AttrMap::new()
            }
            Err(e) => return Err(e),
        };
        let theme = read_object(&dir.join(THEME_FILE))?;
        deep_update(&mut root, &theme);
        Self::from_map(dir, root)
    }

    pub fn from_map(dir: impl Into<PathBuf>, root: AttrMap) -> Result<Self, ThemeError> {
        let options = match root.get("options") {
            Some(v) => ThemeOptions::deserialize(v).map_err(|e| ThemeError::Invalid {
                key: "options".into(),
                message: e.to_string(),
            })?,
            None => ThemeOptions::default(),
        };
        let dir = dir.into();
        log::info!(
            "theme {}: {} entries, logical size {:?}",
            dir.display(),
            root.len(),
            options.logical_size
        );
        Ok(Self { dir, root, options })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn options(&self) -> &ThemeOptions {
        &self.options
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// A named Region definition.
    pub fn region(&self, name: &str) -> Option<&AttrMap> {
        self.root.get(name).and_then(Value::as_object)
    }

    pub fn defaults(&self) -> AttrMap {
        self.region("defaults").cloned().unwrap_or_default()
    }

    /// Sound name to file, in file order.
    pub fn sounds(&self) -> Vec<(String, String)> {
        self.region("sounds")
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Each atlas file with its named slices.
    pub fn atlases(&self) -> Result<Vec<(String, Vec<(String, AtlasEntry)>)>, ThemeError> {
        let Some(atlases) = self.root.get("atlases") else {
            return Ok(Vec::new());
        };
        let invalid = |key: &str, message: String| ThemeError::Invalid {
            key: key.to_string(),
            message,
        };
        let files = atlases
            .as_object()
            .ok_or_else(|| invalid("atlases", "expected an object of files".into()))?;
        files
            .iter()
            .map(|(file, slices)| {
                let slices = slices
                    .as_object()
                    .ok_or_else(|| invalid(file, "expected an object of slices".into()))?;
                let entries = slices
                    .iter()
                    .map(|(name, v)| {
                        AtlasEntry::deserialize(v)
                            .map(|e| (name.clone(), e))
                            .map_err(|e| invalid(name, e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((file.clone(), entries))
            })
            .collect()
    }

    /// Install the region defaults, load every atlas and start the music.
    pub fn apply(&self, ctx: &mut UiContext) -> Result<(), ThemeError> {
        ctx.set_defaults(self.defaults());
        for (file, entries) in self.atlases()? {
            ctx.load_atlas(&file, &entries)?;
        }
        if let Some(music) = &self.options.music {
            ctx.music(music, -1, self.options.music_volume);
        }
        Ok(())
    }
}

fn read_object(path: &Path) -> Result<AttrMap, ThemeError> {
    let data = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ThemeError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::testing::Mono;
    use serde_json::json;

    fn write(dir: &Path, name: &str, v: Value) {
        std::fs::write(dir.join(name), v.to_string()).unwrap();
    }

    #[test]
    fn theme_overrides_defaults_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            DEFAULTS_FILE,
            json!({
                "options": {"logical_size": [320, 240]},
                "defaults": {"fontcolor": [1, 1, 1], "fontsize": 10},
                "menu": {"area": [0, 0, 100, 100], "fill": [0, 0, 0]}
            }),
        );
        write(
            dir.path(),
            THEME_FILE,
            json!({"menu": {"fill": [9, 9, 9]}, "sounds": {"click": "click.wav"}}),
        );

        let theme = Theme::load(dir.path()).unwrap();
        assert_eq!(theme.options().logical_size, (320, 240));
        assert!(theme.options().fullscreen);
        assert_eq!(
            Value::Object(theme.region("menu").unwrap().clone()),
            json!({"area": [0, 0, 100, 100], "fill": [9, 9, 9]})
        );
        assert_eq!(theme.sounds(), vec![("click".into(), "click.wav".into())]);
        assert_eq!(theme.defaults()["fontsize"], json!(10));
    }

    #[test]
    fn defaults_file_is_optional_but_theme_is_not() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Theme::load(dir.path()), Err(ThemeError::Io { .. })));
        write(dir.path(), THEME_FILE, json!({}));
        let theme = Theme::load(dir.path()).unwrap();
        assert_eq!(theme.options(), &ThemeOptions::default());
    }

    #[test]
    fn malformed_files_and_options_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(THEME_FILE), "{ not json").unwrap();
        assert!(matches!(Theme::load(dir.path()), Err(ThemeError::Json { .. })));

        let bad = crate::testing::attrs(json!({"options": {"logical_size": "big"}}));
        assert!(matches!(
            Theme::from_map(".", bad),
            Err(ThemeError::Invalid { .. })
        ));
    }

    #[test]
    fn atlases_keep_author_order() {
        let root = crate::testing::attrs(json!({
            "atlases": {"icons.png": {"right": [0, 0, 16, 16], "left": [0, 0, 16, 16, 1, 0, 0]}}
        }));
        let theme = Theme::from_map(".", root).unwrap();
        let atlases = theme.atlases().unwrap();
        assert_eq!(atlases[0].0, "icons.png");
        let names: Vec<&str> = atlases[0].1.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["right", "left"]);
        assert_eq!(atlases[0].1[1].1, vec![0.0, 0.0, 16.0, 16.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn named_regions_use_theme_defaults() {
        let root = crate::testing::attrs(json!({
            "defaults": {"font": "mono", "fontsize": 10, "fontcolor": [5, 5, 5]},
            "title": {"area": [0, 0, 100, 20], "text": "hi"}
        }));
        let theme = Theme::from_map(".", root).unwrap();
        let mut ctx = UiContext::headless(480, 320);
        ctx.register_font("mono", 10, &Mono);
        theme.apply(&mut ctx).unwrap();

        let r = Region::named(&mut ctx, &theme, "title").unwrap();
        assert_eq!(r.style().fontcolor, padgui_core::Color::from_rgb(5, 5, 5));
        assert_eq!(r.text(), ["hi"]);
        assert!(Region::named(&mut ctx, &theme, "nope").is_err());
    }
}
