//! Layered backgrounds and screen-bounds containment.
//!
//! Backgrounds live on disk as `<root>/<set_name>/<NN_layer>.{png,jpg}`. Every set is
//! loaded and scaled to the display resolution once, at startup, so drawing a frame is
//! only a sequence of full-screen blits.

mod loader;

use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;
use tracing::info;

use crate::app::{Surface, Vec2};

pub use loader::{is_layer_image, load_scaled_image, ImageLayerLoader, LayerLoadError, LayerLoader};

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("display resolution must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    #[error("failed to read background root {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read background set directory {path}: {source}")]
    ReadSetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    LayerLoad(#[from] LayerLoadError),
    #[error("no background sets with png/jpg layers found under {path}")]
    NoBackgroundSets { path: PathBuf },
    #[error("background set index {index} out of range (have {count} sets)")]
    SetIndexOutOfRange { index: usize, count: usize },
}

/// One pre-scaled background image, painted full-screen at the origin.
#[derive(Debug, Clone)]
pub struct Layer {
    image: RgbaImage,
}

impl Layer {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Layers drawn together, back to front.
#[derive(Debug, Clone)]
pub struct BackgroundSet {
    name: String,
    layers: Vec<Layer>,
}

impl BackgroundSet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

/// Anything with a top-left position and a fixed size that must stay on screen.
pub trait Containable {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    /// Width and height in pixels.
    fn extent(&self) -> Vec2;
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub base_folder: PathBuf,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl EnvironmentConfig {
    pub fn new(base_folder: impl Into<PathBuf>, screen_width: u32, screen_height: u32) -> Self {
        Self {
            base_folder: base_folder.into(),
            screen_width,
            screen_height,
        }
    }

    /// Scans `base_folder` and loads every set through `loader`.
    ///
    /// Fails on an unreadable root, on any layer that fails to load, and when no
    /// subdirectory yields at least one layer.
    pub fn load(&self, loader: &dyn LayerLoader) -> Result<Environment, EnvironmentError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(EnvironmentError::InvalidResolution {
                width: self.screen_width,
                height: self.screen_height,
            });
        }

        let sources = loader::discover_set_sources(&self.base_folder)?;
        let mut background_sets = Vec::with_capacity(sources.len());
        for source in sources {
            let layers = source
                .layer_paths
                .iter()
                .map(|path| loader.load_layer(path, self.screen_width, self.screen_height))
                .collect::<Result<Vec<_>, _>>()?;
            info!(
                set = %source.name,
                layer_count = layers.len(),
                "background_set_loaded"
            );
            background_sets.push(BackgroundSet {
                name: source.name,
                layers,
            });
        }

        if background_sets.is_empty() {
            return Err(EnvironmentError::NoBackgroundSets {
                path: self.base_folder.clone(),
            });
        }

        info!(
            root = %self.base_folder.display(),
            set_count = background_sets.len(),
            width = self.screen_width,
            height = self.screen_height,
            "environment_loaded"
        );
        Ok(Environment {
            background_sets,
            current_set: 0,
            screen_width: self.screen_width,
            screen_height: self.screen_height,
        })
    }
}

/// Loaded background sets plus the active-set cursor. Always holds at least one set.
#[derive(Debug, Clone)]
pub struct Environment {
    background_sets: Vec<BackgroundSet>,
    current_set: usize,
    screen_width: u32,
    screen_height: u32,
}

impl Environment {
    pub fn set_count(&self) -> usize {
        self.background_sets.len()
    }

    pub fn current_set(&self) -> usize {
        self.current_set
    }

    pub fn current_background(&self) -> &BackgroundSet {
        &self.background_sets[self.current_set]
    }

    pub fn current_set_name(&self) -> &str {
        self.current_background().name()
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.background_sets.iter().map(BackgroundSet::name)
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    pub fn set_background_set(&mut self, index: usize) -> Result<(), EnvironmentError> {
        if index >= self.background_sets.len() {
            return Err(EnvironmentError::SetIndexOutOfRange {
                index,
                count: self.background_sets.len(),
            });
        }
        self.current_set = index;
        Ok(())
    }

    pub fn next_background_set(&mut self) {
        self.current_set = (self.current_set + 1) % self.background_sets.len();
    }

    pub fn previous_background_set(&mut self) {
        let count = self.background_sets.len();
        self.current_set = (self.current_set + count - 1) % count;
    }

    pub fn reset_background(&mut self) {
        self.current_set = 0;
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for layer in self.current_background().layers() {
            surface.blit(layer.image(), 0, 0);
        }
    }

    /// Clamps the character's top-left corner so its whole box stays on screen.
    ///
    /// Only the position changes. A character larger than the screen on an axis is pinned
    /// to 0 on that axis.
    pub fn constrain_character_position<C: Containable + ?Sized>(&self, character: &mut C) {
        let extent = character.extent();
        let max_x = (self.screen_width as f32 - extent.x).max(0.0);
        let max_y = (self.screen_height as f32 - extent.y).max(0.0);
        let position = character.position();
        character.set_position(Vec2 {
            x: position.x.clamp(0.0, max_x),
            y: position.y.clamp(0.0, max_y),
        });
    }
}
