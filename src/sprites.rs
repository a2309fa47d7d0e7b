// sprites.rs — PNG parts decoded off the UI thread, uploaded to egui once they arrive.
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use crate::error::RigError;
use crate::surface::{AssetProvider, ImageHandle};

enum Slot {
    Loading,
    Ready(TextureHandle),
    Failed,
}

struct Decoded { image: ImageHandle, path: PathBuf, result: Result<ColorImage, RigError> }

pub struct SpriteStore {
    slots: Vec<Slot>,
    tx:    Sender<Decoded>,
    rx:    Receiver<Decoded>,
}

impl Default for SpriteStore {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { slots: Vec::new(), tx, rx }
    }
}

fn decode(path: &Path) -> Result<ColorImage, RigError> {
    let rgba = image::open(path)
        .map_err(|source| RigError::Image { path: path.to_path_buf(), source })?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

impl SpriteStore {
    /// Uploads whatever finished decoding since the last frame. Returns true if anything changed.
    pub fn poll(&mut self, ctx: &Context) -> bool {
        let mut changed = false;
        while let Ok(Decoded { image, path, result }) = self.rx.try_recv() {
            self.slots[image.0] = match result {
                Ok(pixels) => {
                    log::info!("sprite ready: {}", path.display());
                    Slot::Ready(ctx.load_texture(path.to_string_lossy(), pixels, TextureOptions::LINEAR))
                }
                Err(e) => {
                    log::warn!("{e}; overlay will be skipped");
                    Slot::Failed
                }
            };
            changed = true;
        }
        changed
    }

    pub fn pending(&self) -> usize { self.slots.iter().filter(|s| matches!(s, Slot::Loading)).count() }

    pub fn texture_id(&self, image: ImageHandle) -> Option<TextureId> {
        match self.slots.get(image.0)? { Slot::Ready(tex) => Some(tex.id()), _ => None }
    }
}

impl AssetProvider for SpriteStore {
    fn request(&mut self, path: &str) -> ImageHandle {
        let image = ImageHandle(self.slots.len());
        self.slots.push(Slot::Loading);
        let (tx, path) = (self.tx.clone(), PathBuf::from(path));
        std::thread::spawn(move || {
            let result = decode(&path);
            // receiver gone means the app shut down first
            let _ = tx.send(Decoded { image, path, result });
        });
        image
    }

    fn is_ready(&self, image: ImageHandle) -> bool { self.texture_id(image).is_some() }
}
