use padgui_core::{
    Color, ConfigError, HeadlessBackend, NullSound, Rect, RenderBackend, Resources, Scene,
    SoundSink,
};
use padgui_text::{FontError, FontId, FontManager, GlyphSource};

use crate::attrs::AttrMap;
use crate::image::{AtlasEntry, ImageId, ImageManager};

/// Everything a Region needs to load assets and record drawing: the render
/// backend, font and image caches, asset lookup, sound output, the logical
/// screen size, attribute defaults and the scene being built this frame.
pub struct UiContext {
    pub(crate) backend: Box<dyn RenderBackend>,
    pub(crate) fonts: FontManager,
    pub(crate) images: ImageManager,
    pub(crate) resources: Resources,
    sounds: Box<dyn SoundSink>,
    logical_size: (i32, i32),
    defaults: AttrMap,
    pub(crate) scene: Scene,
}

/// Borrowed view used while painting.
pub struct Canvas<'a> {
    pub fonts: &'a FontManager,
    pub images: &'a ImageManager,
    pub scene: &'a mut Scene,
    pub logical_size: (i32, i32),
}

impl UiContext {
    pub fn new(
        mut backend: Box<dyn RenderBackend>,
        resources: Resources,
        logical_size: (u32, u32),
    ) -> Self {
        backend.set_logical_size(logical_size.0, logical_size.1);
        Self {
            backend,
            fonts: FontManager::new(),
            images: ImageManager::new(),
            resources,
            sounds: Box::new(NullSound),
            logical_size: (logical_size.0 as i32, logical_size.1 as i32),
            defaults: AttrMap::new(),
            scene: Scene::new(Color::BLACK),
        }
    }

    /// Context over a [`HeadlessBackend`] with no resource roots.
    pub fn headless(width: u32, height: u32) -> Self {
        Self::new(
            Box::new(HeadlessBackend::new()),
            Resources::default(),
            (width, height),
        )
    }

    pub fn with_sounds(mut self, sounds: Box<dyn SoundSink>) -> Self {
        self.sounds = sounds;
        self
    }

    pub fn with_images(mut self, images: ImageManager) -> Self {
        self.images = images;
        self
    }

    pub fn logical_size(&self) -> (i32, i32) {
        self.logical_size
    }

    pub fn screen_rect(&self) -> Rect {
        Rect::new(0, 0, self.logical_size.0, self.logical_size.1)
    }

    /// Attributes every Region created through this context starts from.
    pub fn set_defaults(&mut self, defaults: AttrMap) {
        self.defaults = defaults;
    }

    pub fn defaults(&self) -> &AttrMap {
        &self.defaults
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontManager {
        &mut self.fonts
    }

    pub fn images(&self) -> &ImageManager {
        &self.images
    }

    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    pub fn load_font(&mut self, name: &str, size: u32) -> Result<FontId, FontError> {
        self.fonts
            .load(self.backend.as_mut(), &self.resources, name, size)
    }

    /// Make a glyph source available to Regions under `name` at `size`, as
    /// if it had been loaded from a font file of that name.
    pub fn register_font(&mut self, name: &str, size: u32, source: &dyn GlyphSource) -> FontId {
        self.fonts
            .load_source(self.backend.as_mut(), name, size, source)
    }

    pub fn load_image(&mut self, name: &str) -> Option<ImageId> {
        self.images
            .load(self.backend.as_mut(), &self.resources, name)
    }

    pub(crate) fn try_load_image(&mut self, name: &str) -> Option<ImageId> {
        self.images
            .try_load(self.backend.as_mut(), &self.resources, name)
    }

    pub fn load_rgba(&mut self, name: &str, width: u32, height: u32, rgba: &[u8]) -> ImageId {
        self.images
            .load_rgba(self.backend.as_mut(), name, width, height, rgba)
    }

    pub fn load_atlas(
        &mut self,
        file: &str,
        entries: &[(String, AtlasEntry)],
    ) -> Result<Vec<ImageId>, ConfigError> {
        self.images
            .load_atlas(self.backend.as_mut(), &self.resources, file, entries)
    }

    pub fn play(&mut self, sound: Option<&str>) {
        if let Some(name) = sound {
            self.sounds.play(name);
        }
    }

    pub fn music(&mut self, name: &str, loops: i32, volume: f32) {
        self.sounds.music(name, loops, volume);
    }

    /// Start a new frame: drop last frame's nodes.
    pub fn begin_frame(&mut self, clear: Color) {
        self.scene.clear(clear);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas {
            fonts: &self.fonts,
            images: &self.images,
            scene: &mut self.scene,
            logical_size: self.logical_size,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.configure_surface(width, height);
    }

    /// Hand the recorded scene to the backend.
    pub fn present(&mut self) {
        self.backend.frame(&self.scene);
    }
}
