//! Window position and size persisted between runs.
//!
//! ```toml
//! width = 1000.0
//! height = 800.0
//! x = 120
//! y = 80
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RunnerError};

/// Smallest logical size restored from disk.
pub const MIN_WINDOW_SIZE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// Logical inner width.
    pub width: f64,
    /// Logical inner height.
    pub height: f64,
    /// Physical outer position, when the platform reports one.
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
}

impl WindowGeometry {
    pub fn new(size: (f64, f64)) -> Self {
        Self {
            width: size.0,
            height: size.1,
            x: None,
            y: None,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }

    /// Read the geometry file.
    ///
    /// A missing file is `Ok(None)`; an unreadable or malformed one is an
    /// error the caller is expected to log before falling back to defaults.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RunnerError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let geometry: Self = toml::from_str(&contents).map_err(|e| RunnerError::Geometry {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !(geometry.width.is_finite() && geometry.height.is_finite()) {
            return Err(RunnerError::Geometry {
                path: path.to_path_buf(),
                reason: "window size is not finite".to_string(),
            });
        }
        Ok(Some(geometry.clamped()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string(self).map_err(|e| RunnerError::Geometry {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RunnerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, contents).map_err(|source| RunnerError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn clamped(mut self) -> Self {
        self.width = self.width.max(MIN_WINDOW_SIZE);
        self.height = self.height.max(MIN_WINDOW_SIZE);
        self
    }
}

/// `foo/app.ini` -> `foo/app_geometry.toml`.
pub fn geometry_path_for(ini: &Path) -> PathBuf {
    let stem = ini
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "imgui".to_string());
    ini.with_file_name(format!("{stem}_geometry.toml"))
}
