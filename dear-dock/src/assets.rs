//! Asset folder lookup and images loaded from it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dear_imgui_rs::texture::{OwnedTextureData, TextureData, TextureFormat};
use image::ImageReader;
use tracing::{info, warn};

use crate::error::{Result, RunnerError};

/// Where fonts and images are read from.
///
/// Relative asset names are looked up, in order, in the configured folder,
/// in `assets/` next to the executable and in `assets/` under the current
/// directory.
#[derive(Clone, Debug, Default)]
pub struct Assets {
    folder: Option<PathBuf>,
}

impl Assets {
    pub fn new(folder: Option<PathBuf>) -> Self {
        Self { folder }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::with_capacity(3);
        if let Some(folder) = &self.folder {
            dirs.push(folder.clone());
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(exe_dir.join("assets"));
        }
        if let Ok(cwd) = std::env::current_dir() {
            dirs.push(cwd.join("assets"));
        }
        dirs
    }

    pub fn resolve(&self, name: impl AsRef<Path>) -> Result<PathBuf> {
        let name = name.as_ref();
        if name.is_absolute() {
            return if name.is_file() {
                Ok(name.to_path_buf())
            } else {
                Err(RunnerError::AssetNotFound {
                    name: name.display().to_string(),
                    searched: Vec::new(),
                })
            };
        }
        let searched = self.search_dirs();
        searched
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| RunnerError::AssetNotFound {
                name: name.display().to_string(),
                searched,
            })
    }

    pub fn read(&self, name: impl AsRef<Path>) -> Result<(PathBuf, Vec<u8>)> {
        let path = self.resolve(name)?;
        let data = std::fs::read(&path).map_err(|source| RunnerError::Io {
            path: path.clone(),
            source,
        })?;
        Ok((path, data))
    }
}

/// Decoded RGBA pixels of an asset image.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub fn decode_image(assets: &Assets, name: &str) -> Result<AssetImage> {
    let path = assets.resolve(name)?;
    let reader = ImageReader::open(&path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| RunnerError::Io {
            path: path.clone(),
            source,
        })?;
    let img = reader.decode().map_err(|source| RunnerError::Image {
        path: path.clone(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(AssetImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

pub(crate) struct CachedImage {
    pub(crate) texture: OwnedTextureData,
}

impl CachedImage {
    fn from_image(image: &AssetImage) -> Self {
        let mut texture = TextureData::new();
        texture.create(
            TextureFormat::RGBA32,
            image.width as i32,
            image.height as i32,
        );
        texture.set_data(&image.rgba);
        Self { texture }
    }
}

/// Images loaded from the assets folder, keyed by asset name.
///
/// Failures are cached as well, so a missing file is reported once and not
/// retried every frame.
#[derive(Default)]
pub(crate) struct ImageCache {
    images: HashMap<String, Option<CachedImage>>,
}

impl ImageCache {
    pub(crate) fn get_or_load(&mut self, assets: &Assets, name: &str) -> Option<&mut CachedImage> {
        self.images
            .entry(name.to_string())
            .or_insert_with(|| match decode_image(assets, name) {
                Ok(image) => {
                    info!(
                        "Loaded image asset {name:?} ({}x{})",
                        image.width, image.height
                    );
                    Some(CachedImage::from_image(&image))
                }
                Err(e) => {
                    warn!("Cannot load image asset: {e}");
                    None
                }
            })
            .as_mut()
    }

    pub(crate) fn clear(&mut self) {
        self.images.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let pid = std::process::id();
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        p.push(format!("dear-dock-{prefix}-{pid}-{t}"));
        p
    }

    #[test]
    fn resolves_from_configured_folder_first() {
        let dir = unique_temp_dir("assets");
        std::fs::create_dir_all(dir.join("fonts")).unwrap();
        std::fs::write(dir.join("fonts/custom.ttf"), b"data").unwrap();

        let assets = Assets::new(Some(dir.clone()));
        assert_eq!(assets.search_dirs()[0], dir);
        let path = assets.resolve("fonts/custom.ttf").unwrap();
        assert_eq!(path, dir.join("fonts/custom.ttf"));
        let (_, data) = assets.read("fonts/custom.ttf").unwrap();
        assert_eq!(data, b"data");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_asset_lists_searched_dirs() {
        let dir = unique_temp_dir("missing");
        let assets = Assets::new(Some(dir.clone()));
        match assets.resolve("images/none.png") {
            Err(RunnerError::AssetNotFound { name, searched }) => {
                assert_eq!(name, Path::new("images/none.png").display().to_string());
                assert_eq!(searched.first(), Some(&dir));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn directories_are_not_assets() {
        let dir = unique_temp_dir("dir_asset");
        std::fs::create_dir_all(dir.join("fonts")).unwrap();
        let assets = Assets::new(Some(dir.clone()));
        assert!(assets.resolve("fonts").is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn decodes_png_to_rgba() {
        let dir = unique_temp_dir("png");
        std::fs::create_dir_all(&dir).unwrap();
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        img.save(dir.join("tiny.png")).unwrap();

        let assets = Assets::new(Some(dir.clone()));
        let decoded = decode_image(&assets, "tiny.png").unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[10, 20, 30, 255]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_image_is_a_decode_error() {
        let dir = unique_temp_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bad.png"), b"\x89PNG\r\n\x1a\nnot really").unwrap();
        let assets = Assets::new(Some(dir.clone()));
        assert!(matches!(
            decode_image(&assets, "bad.png"),
            Err(RunnerError::Image { .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
