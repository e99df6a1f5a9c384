use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::Path;

use lru::LruCache;
use padgui_core::{
    Anchor, Color, ConfigError, Flip, Point, Rect, RenderBackend, Resources, Scene, SceneNode,
    TextureId,
};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Generation-checked handle to an [`Image`]. Once the image is evicted
    /// the handle resolves to nothing instead of to a reused slot.
    pub struct ImageId;
}

pub const MAX_IMAGES: usize = 20;

/// A region of a texture plus how to draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub texture: TextureId,
    pub src: Rect,
    pub flip: Flip,
    /// Degrees, clockwise.
    pub angle: f32,
    /// Rotation center relative to the destination; `None` is its center.
    pub pivot: Option<Point>,
}

impl Image {
    pub fn new(texture: TextureId, src: Rect) -> Self {
        Self {
            texture,
            src,
            flip: Flip::empty(),
            angle: 0.0,
            pivot: None,
        }
    }

    pub fn size(&self) -> (i32, i32) {
        self.src.size()
    }

    fn node(&self, src: Rect, dst: Rect, tint: Color) -> SceneNode {
        SceneNode::Image {
            texture: self.texture,
            src,
            dst,
            tint,
            flip: self.flip,
            angle: self.angle,
            pivot: self.pivot,
        }
    }

    /// Copy an arbitrary part of the image; `src` is in texture pixels.
    pub fn draw_part(&self, scene: &mut Scene, src: Rect, dst: Rect) {
        if src.is_empty() || dst.is_empty() {
            return;
        }
        scene.push(self.node(src, dst, Color::WHITE));
    }

    /// Native size with the top-left corner at `(x, y)`.
    pub fn draw_at(&self, scene: &mut Scene, x: i32, y: i32) {
        let dst = Rect::new(x, y, self.src.width, self.src.height);
        scene.push(self.node(self.src, dst, Color::WHITE));
    }

    /// Stretched into `dest`, or fitted keeping aspect when `fit` is set.
    pub fn draw_in(&self, scene: &mut Scene, dest: Rect, fit: bool) {
        let dst = if fit { self.src.fitted(&dest) } else { dest };
        if dst.is_empty() {
            return;
        }
        scene.push(self.node(self.src, dst, Color::WHITE));
    }

    /// Fitted to the whole logical screen.
    pub fn draw(&self, scene: &mut Scene, logical_size: (i32, i32)) {
        let screen = Rect::new(0, 0, logical_size.0, logical_size.1);
        self.draw_in(scene, screen, true);
    }

    /// Draw into `dest` but only the part inside `clip`; the source rect is
    /// cropped by the same proportion so nothing is squashed.
    pub fn draw_clipped(&self, scene: &mut Scene, dest: Rect, clip: &Rect) {
        let shown = dest.clip(clip);
        if shown.is_empty() || dest.is_empty() {
            return;
        }
        let (mut l, mut t) = (shown.x - dest.x, shown.y - dest.y);
        let (mut r, mut b) = (dest.right() - shown.right(), dest.bottom() - shown.bottom());
        if self.flip.contains(Flip::HORIZONTAL) {
            std::mem::swap(&mut l, &mut r);
        }
        if self.flip.contains(Flip::VERTICAL) {
            std::mem::swap(&mut t, &mut b);
        }
        let sx = self.src.width as f32 / dest.width as f32;
        let sy = self.src.height as f32 / dest.height as f32;
        let src = Rect::new(
            self.src.x + (l as f32 * sx) as i32,
            self.src.y + (t as f32 * sy) as i32,
            self.src.width - ((l + r) as f32 * sx) as i32,
            self.src.height - ((t + b) as f32 * sy) as i32,
        );
        if src.is_empty() {
            return;
        }
        scene.push(self.node(src, shown, Color::WHITE));
    }

    /// Tile at native size from `area`'s top-left, clipped to `area`.
    pub fn draw_tiled(&self, scene: &mut Scene, area: &Rect, tile: (i32, i32)) {
        let (w, h) = tile;
        if w <= 0 || h <= 0 {
            return;
        }
        let mut y = area.y;
        while y < area.bottom() {
            let mut x = area.x;
            while x < area.right() {
                self.draw_clipped(scene, Rect::new(x, y, w, h), area);
                x += w;
            }
            y += h;
        }
    }
}

/// One named slice of an atlas texture: `x, y, w, h` and optionally
/// `flip_x, flip_y, angle`.
pub type AtlasEntry = Vec<f64>;

/// Loads image files into textures and caches them.
///
/// File images live in an LRU of at most `max_images` entries; when a new
/// file pushes the oldest out, its texture is destroyed and its handle stops
/// resolving. Atlas slices are registered by name and stay resident.
pub struct ImageManager {
    images: SlotMap<ImageId, Image>,
    cache: LruCache<String, ImageId>,
    named: HashMap<String, ImageId>,
    atlases: Vec<TextureId>,
}

impl Default for ImageManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageManager {
    pub fn new() -> Self {
        Self::with_capacity(MAX_IMAGES)
    }

    pub fn with_capacity(max_images: usize) -> Self {
        let cap = NonZeroUsize::new(max_images.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            images: SlotMap::with_key(),
            cache: LruCache::new(cap),
            named: HashMap::new(),
            atlases: Vec::new(),
        }
    }

    pub fn max_images(&self) -> usize {
        self.cache.cap().get()
    }

    /// Number of file images currently holding a texture.
    pub fn resident(&self) -> usize {
        self.cache.len()
    }

    pub fn get(&self, id: ImageId) -> Option<&Image> {
        self.images.get(id)
    }

    pub fn get_mut(&mut self, id: ImageId) -> Option<&mut Image> {
        self.images.get_mut(id)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains(name) || self.named.contains_key(name)
    }

    /// Image by atlas name or file name. Missing or undecodable files give
    /// `None`.
    pub fn load(
        &mut self,
        backend: &mut dyn RenderBackend,
        resources: &Resources,
        name: &str,
    ) -> Option<ImageId> {
        let found = self.try_load(backend, resources, name);
        if found.is_none() {
            log::warn!("image '{name}' not found");
        }
        found
    }

    /// Like [`ImageManager::load`] but silent when `name` is not an image.
    /// Used where a string may be either a label or an image name.
    pub fn try_load(
        &mut self,
        backend: &mut dyn RenderBackend,
        resources: &Resources,
        name: &str,
    ) -> Option<ImageId> {
        if let Some(&id) = self.cache.get(name) {
            log::debug!("image cache hit '{name}'");
            return Some(id);
        }
        if let Some(&id) = self.named.get(name) {
            return Some(id);
        }

        let path = resources.resolve(name)?;
        let (w, h, pixels) = decode(&path)?;
        Some(self.load_rgba(backend, name, w, h, &pixels))
    }

    /// Register in-memory pixels as a cached file image under `name`.
    pub fn load_rgba(
        &mut self,
        backend: &mut dyn RenderBackend,
        name: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> ImageId {
        if let Some(&id) = self.cache.get(name) {
            return id;
        }
        let texture = backend.create_texture(width, height, rgba);
        let id = self
            .images
            .insert(Image::new(texture, Rect::new(0, 0, width as i32, height as i32)));
        if let Some((old_name, old_id)) = self.cache.push(name.to_string(), id)
            && old_id != id
        {
            if let Some(old) = self.images.remove(old_id) {
                backend.destroy_texture(old.texture);
            }
            log::debug!("evicted image '{old_name}'");
        }
        id
    }

    /// Load `file` once and slice it into named images.
    pub fn load_atlas(
        &mut self,
        backend: &mut dyn RenderBackend,
        resources: &Resources,
        file: &str,
        entries: &[(String, AtlasEntry)],
    ) -> Result<Vec<ImageId>, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for (name, entry) in entries {
            if !seen.insert(name.as_str()) || self.named.contains_key(name) {
                return Err(ConfigError::DuplicateAtlasName {
                    file: file.to_string(),
                    name: name.clone(),
                });
            }
            if entry.len() < 4 {
                return Err(ConfigError::invalid(
                    name,
                    "x, y, w, h[, flip_x, flip_y, angle]",
                    format!("{entry:?}"),
                ));
            }
        }

        let path = resources.resolve(file).ok_or_else(|| ConfigError::MissingFile {
            key: "atlas".into(),
            name: file.to_string(),
        })?;
        let (w, h, pixels) = decode(&path).ok_or_else(|| ConfigError::MissingFile {
            key: "atlas".into(),
            name: file.to_string(),
        })?;
        let texture = backend.create_texture(w, h, &pixels);
        self.atlases.push(texture);

        let mut ids = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            let v = |i: usize| entry.get(i).copied().unwrap_or(0.0);
            let mut image = Image::new(
                texture,
                Rect::new(v(0) as i32, v(1) as i32, v(2) as i32, v(3) as i32),
            );
            image.flip = Flip::from_axes(v(4) != 0.0, v(5) != 0.0);
            image.angle = v(6) as f32;
            let id = self.images.insert(image);
            self.named.insert(name.clone(), id);
            ids.push(id);
        }
        log::info!("atlas '{file}' {w}x{h}: {} images", ids.len());
        Ok(ids)
    }

    pub fn draw_fitted(&self, scene: &mut Scene, id: ImageId, dest: Rect, align: Option<Anchor>) {
        let Some(image) = self.get(id) else {
            log::debug!("skipping evicted image {id:?}");
            return;
        };
        let mut dst = image.src.fitted(&dest);
        if let Some(a) = align {
            dst.set_point(a, dest.point(a));
        }
        image.draw_in(scene, dst, false);
    }
}

fn decode(path: &Path) -> Option<(u32, u32, Vec<u8>)> {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (w, h) = rgba.dimensions();
            Some((w, h, rgba.into_raw()))
        }
        Err(e) => {
            log::warn!("cannot decode {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padgui_core::HeadlessBackend;
    use std::path::PathBuf;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn reload_returns_same_handle_without_decoding() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 4, 2);
        let res = Resources::new([dir.path()]);
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::new();

        let a = images.load(&mut backend, &res, "a.png").unwrap();
        let again = images.load(&mut backend, &res, "a.png").unwrap();
        assert_eq!(a, again);
        assert_eq!(backend.created(), 1);
        assert_eq!(images.get(a).unwrap().size(), (4, 2));
    }

    #[test]
    fn lru_evicts_oldest_and_destroys_texture() {
        let dir = tempfile::tempdir().unwrap();
        for n in 0..4 {
            write_png(dir.path(), &format!("{n}.png"), 1, 1);
        }
        let res = Resources::new([dir.path()]);
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::with_capacity(3);

        let first = images.load(&mut backend, &res, "0.png").unwrap();
        let second = images.load(&mut backend, &res, "1.png").unwrap();
        images.load(&mut backend, &res, "2.png").unwrap();
        // touch 0 so 1 becomes least recently used
        assert_eq!(images.load(&mut backend, &res, "0.png"), Some(first));
        images.load(&mut backend, &res, "3.png").unwrap();

        assert_eq!(images.resident(), 3);
        assert!(images.get(second).is_none());
        assert!(images.get(first).is_some());
        assert!(!images.is_cached("1.png"));
        assert_eq!(backend.destroyed(), 1);
        assert_eq!(backend.live_textures(), 3);
    }

    #[test]
    fn cache_never_exceeds_capacity() {
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::new();
        for n in 0..50 {
            images.load_rgba(&mut backend, &format!("gen{n}"), 1, 1, &[0; 4]);
            assert!(images.resident() <= MAX_IMAGES);
        }
        assert_eq!(backend.live_textures(), MAX_IMAGES);
    }

    #[test]
    fn missing_or_corrupt_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"not a png").unwrap();
        let res = Resources::new([dir.path()]);
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::new();
        assert_eq!(images.load(&mut backend, &res, "nope.png"), None);
        assert_eq!(images.load(&mut backend, &res, "bad.png"), None);
        assert_eq!(backend.created(), 0);
    }

    #[test]
    fn atlas_names_resolve_and_survive_eviction() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "icons.png", 32, 16);
        let res = Resources::new([dir.path()]);
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::with_capacity(1);

        let entries = vec![
            ("left".to_string(), vec![0.0, 0.0, 16.0, 16.0]),
            ("right".to_string(), vec![0.0, 0.0, 16.0, 16.0, 1.0, 0.0, 0.0]),
        ];
        let ids = images
            .load_atlas(&mut backend, &res, "icons.png", &entries)
            .unwrap();
        for n in 0..3 {
            images.load_rgba(&mut backend, &format!("x{n}"), 1, 1, &[0; 4]);
        }
        let right = images.load(&mut backend, &res, "right").unwrap();
        assert_eq!(right, ids[1]);
        assert!(images.get(right).unwrap().flip.contains(Flip::HORIZONTAL));
        assert!(images.get(ids[0]).is_some());
    }

    #[test]
    fn atlas_duplicate_names_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "icons.png", 8, 8);
        let res = Resources::new([dir.path()]);
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::new();
        let entries = vec![
            ("dup".to_string(), vec![0.0, 0.0, 4.0, 4.0]),
            ("dup".to_string(), vec![4.0, 0.0, 4.0, 4.0]),
        ];
        assert!(matches!(
            images.load_atlas(&mut backend, &res, "icons.png", &entries),
            Err(ConfigError::DuplicateAtlasName { .. })
        ));
    }

    #[test]
    fn clipped_draw_crops_source() {
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::new();
        let id = images.load_rgba(&mut backend, "img", 20, 10, &[0; 800]);
        let mut scene = Scene::default();
        images
            .get(id)
            .unwrap()
            .draw_clipped(&mut scene, Rect::new(0, 0, 20, 10), &Rect::new(5, 0, 10, 10));
        match &scene.nodes[0] {
            SceneNode::Image { src, dst, .. } => {
                assert_eq!(*dst, Rect::new(5, 0, 10, 10));
                assert_eq!(*src, Rect::new(5, 0, 10, 10));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tiles_cover_area() {
        let mut backend = HeadlessBackend::new();
        let mut images = ImageManager::new();
        let id = images.load_rgba(&mut backend, "tile", 8, 8, &[0; 256]);
        let mut scene = Scene::default();
        images
            .get(id)
            .unwrap()
            .draw_tiled(&mut scene, &Rect::new(0, 0, 20, 10), (8, 8));
        // 3 columns x 2 rows, the last column and row cropped
        assert_eq!(scene.len(), 6);
        let covered: i32 = scene
            .nodes
            .iter()
            .map(|n| match n {
                SceneNode::Image { dst, .. } => dst.width * dst.height,
                _ => 0,
            })
            .sum();
        assert_eq!(covered, 200);
    }
}
