use std::path::PathBuf;
use thiserror::Error;

use crate::docking::LayoutError;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Window creation failed: {0}")]
    WindowCreation(#[from] winit::error::OsError),
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("WGPU error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("request_device failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Renderer error: {0}")]
    Renderer(String),
    #[error("Invalid docking layout: {0}")]
    InvalidLayout(#[from] LayoutError),
    #[error("Asset {name:?} not found (searched: {searched:?})")]
    AssetNotFound { name: String, searched: Vec<PathBuf> },
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported font {path:?}: {reason}")]
    Font { path: PathBuf, reason: String },
    #[error("Failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Invalid window geometry file {path:?}: {reason}")]
    Geometry { path: PathBuf, reason: String },
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T, E = RunnerError> = std::result::Result<T, E>;
