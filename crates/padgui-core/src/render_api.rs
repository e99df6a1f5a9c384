use slotmap::{SlotMap, new_key_type};

use crate::scene::Scene;

new_key_type! {
    /// Handle to a texture owned by a [`RenderBackend`].
    pub struct TextureId;
}

/// What the layout layer needs from a renderer.
///
/// All coordinates handed to [`RenderBackend::frame`] are logical pixels; the
/// backend scales them to the physical surface.
pub trait RenderBackend {
    fn configure_surface(&mut self, width: u32, height: u32);
    fn set_logical_size(&mut self, width: u32, height: u32);
    /// Upload straight (non-premultiplied) RGBA8 pixels.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId;
    fn destroy_texture(&mut self, id: TextureId);
    fn frame(&mut self, scene: &Scene);
}

/// Backend that keeps only bookkeeping. Used by tests and tools that inspect
/// the produced display list instead of putting pixels on screen.
#[derive(Default)]
pub struct HeadlessBackend {
    textures: SlotMap<TextureId, (u32, u32)>,
    created: usize,
    destroyed: usize,
    frames: usize,
    surface: (u32, u32),
    logical: (u32, u32),
    last_scene: Option<Scene>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(id).copied()
    }
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }
    pub fn created(&self) -> usize {
        self.created
    }
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }
    pub fn frames(&self) -> usize {
        self.frames
    }
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }
    pub fn logical_size(&self) -> (u32, u32) {
        self.logical
    }
    pub fn last_scene(&self) -> Option<&Scene> {
        self.last_scene.as_ref()
    }
}

impl RenderBackend for HeadlessBackend {
    fn configure_surface(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
    }

    fn set_logical_size(&mut self, width: u32, height: u32) {
        self.logical = (width, height);
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        self.created += 1;
        self.textures.insert((width, height))
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if self.textures.remove(id).is_some() {
            self.destroyed += 1;
        } else {
            log::warn!("destroy of unknown texture {id:?}");
        }
    }

    fn frame(&mut self, scene: &Scene) {
        self.frames += 1;
        self.last_scene = Some(scene.clone());
    }
}
