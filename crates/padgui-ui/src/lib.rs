//! Declarative Regions for small fixed-size screens.
//!
//! A [`Region`] is built from a JSON attribute object, usually one entry of
//! a [`Theme`], and draws through a [`UiContext`] into its frame scene:
//!
//! ```rust
//! use padgui_ui::{Region, UiContext};
//! use serde_json::json;
//!
//! let mut ctx = UiContext::headless(480, 320);
//! let attrs = json!({"area": [0, 0, 0.5, 1.0], "fill": [20, 20, 60]});
//! let region = Region::new(&mut ctx, attrs.as_object().unwrap()).unwrap();
//! region.draw(&mut ctx);
//! assert_eq!(ctx.scene().len(), 1);
//! ```

pub mod attrs;
pub mod context;
pub mod image;
pub mod keyboard;
pub mod menu;
pub mod patch;
pub mod region;
pub mod theme;

#[cfg(test)]
pub(crate) mod testing;

pub use attrs::{AttrMap, Attrs, deep_merge, deep_update};
pub use context::{Canvas, UiContext};
pub use image::{Image, ImageId, ImageManager, MAX_IMAGES};
pub use keyboard::{KeyboardLayout, KeyboardOutcome, OnScreenKeyboard};
pub use menu::{MenuOption, MenuOutcome, OptionIcons, OptionMenu, make_option_bar, range_list};
pub use region::{
    BarCell, CellContent, CellRenderer, Highlight, ImageMode, ListItem, Region, RegionStyle,
};
pub use theme::{Theme, ThemeError, ThemeOptions};
