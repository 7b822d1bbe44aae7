use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{ImageReader, RgbaImage};
use thiserror::Error;
use tracing::debug;

use super::{EnvironmentError, Layer};

const LAYER_EXTENSIONS: [&str; 2] = ["png", "jpg"];

#[derive(Debug, Error)]
pub enum LayerLoadError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Produces one display-sized layer from a source file.
pub trait LayerLoader {
    fn load_layer(&self, path: &Path, width: u32, height: u32) -> Result<Layer, LayerLoadError>;
}

/// Decodes PNG/JPEG files with `image` and resizes them to the display resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageLayerLoader;

impl LayerLoader for ImageLayerLoader {
    fn load_layer(&self, path: &Path, width: u32, height: u32) -> Result<Layer, LayerLoadError> {
        load_scaled_image(path, width, height).map(Layer::new)
    }
}

pub fn load_scaled_image(path: &Path, width: u32, height: u32) -> Result<RgbaImage, LayerLoadError> {
    let reader = ImageReader::open(path).map_err(|source| LayerLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| LayerLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if decoded.width() == width && decoded.height() == height {
        return Ok(decoded.into_rgba8());
    }
    Ok(decoded
        .resize_exact(width, height, FilterType::Triangle)
        .into_rgba8())
}

/// Extension check used for layer discovery, case-insensitive.
pub fn is_layer_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            LAYER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SetSource {
    pub name: String,
    pub layer_paths: Vec<PathBuf>,
}

/// Lists candidate sets under `root`: subdirectories sorted by name, each with its image
/// files sorted by file name. Directories without images are dropped here.
pub(crate) fn discover_set_sources(root: &Path) -> Result<Vec<SetSource>, EnvironmentError> {
    let mut set_dirs = read_dir_sorted(root).map_err(|source| EnvironmentError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;
    set_dirs.retain(|(_, path)| path.is_dir());

    let mut sources = Vec::with_capacity(set_dirs.len());
    for (name, dir) in set_dirs {
        let entries = read_dir_sorted(&dir).map_err(|source| EnvironmentError::ReadSetDir {
            path: dir.clone(),
            source,
        })?;
        let layer_paths: Vec<PathBuf> = entries
            .into_iter()
            .map(|(_, path)| path)
            .filter(|path| path.is_file() && is_layer_image(path))
            .collect();

        let name = name.to_string_lossy().into_owned();
        if layer_paths.is_empty() {
            debug!(set = %name, dir = %dir.display(), "background_set_skipped_no_images");
            continue;
        }
        sources.push(SetSource { name, layer_paths });
    }

    Ok(sources)
}

fn read_dir_sorted(dir: &Path) -> std::io::Result<Vec<(OsString, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        entries.push((entry.file_name(), entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
