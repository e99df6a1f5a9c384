//! # padgui core
//!
//! Shared vocabulary for the padgui crates:
//!
//! - [`Rect`] and [`Anchor`]: integer geometry with nine named reference
//!   points. Every layout decision in padgui is expressed with these.
//! - [`Scene`] / [`SceneNode`]: the display list a frame of drawing produces.
//! - [`RenderBackend`]: what a renderer must provide (textures + presenting a
//!   scene). [`HeadlessBackend`] records instead of drawing.
//! - [`InputHandler`]: folds keyboard, controller buttons and analog axes into
//!   one [`Action`] per frame, with edge detection and key repeat.
//! - [`Resources`]: asset lookup by name.
//!
//! ```rust
//! use padgui_core::*;
//!
//! let mut r = Rect::new(0, 0, 40, 20);
//! r.set_point(Anchor::Center, (100, 100));
//! assert_eq!(r.point(Anchor::TopLeft), (80, 90));
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod input;
pub mod render_api;
pub mod resources;
pub mod scene;
pub mod sound;

pub use color::*;
pub use error::*;
pub use geometry::*;
pub use input::*;
pub use render_api::*;
pub use resources::*;
pub use scene::*;
pub use sound::*;
