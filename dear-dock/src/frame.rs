use dear_imgui_rs::texture::TextureStatus;
use dear_imgui_rs::{Image, Ui};
use dear_imgui_wgpu::WgpuRenderer;
use tracing::warn;

use crate::assets::{Assets, ImageCache};
use crate::logging::{LogBuffer, LogView};
use crate::params::Theme;

/// Requests issued by callbacks during a frame, handled after rendering.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct FrameRequests {
    pub(crate) exit: bool,
    pub(crate) reset_layout: bool,
    pub(crate) theme: Option<Theme>,
}

/// Runner state that outlives frames and is reachable from callbacks.
pub struct FrameServices {
    assets: Assets,
    images: ImageCache,
    log: LogBuffer,
    log_view: LogView,
    pub(crate) theme: Option<Theme>,
    pub(crate) requests: FrameRequests,
}

impl FrameServices {
    pub fn new(assets: Assets, log: LogBuffer) -> Self {
        Self {
            assets,
            images: ImageCache::default(),
            log,
            log_view: LogView::default(),
            theme: None,
            requests: FrameRequests::default(),
        }
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn exit_requested(&self) -> bool {
        self.requests.exit
    }

    pub fn layout_reset_requested(&self) -> bool {
        self.requests.reset_layout
    }

    pub(crate) fn take_requests(&mut self) -> FrameRequests {
        std::mem::take(&mut self.requests)
    }

    /// Drop every cached image; textures are uploaded again on next use.
    pub(crate) fn clear_images(&mut self) {
        self.images.clear();
    }
}

/// What a callback receives each frame: the frame's [`Ui`] plus runner
/// services (assets, images, the log and deferred requests).
pub struct GuiCtx<'a> {
    ui: &'a Ui,
    services: &'a mut FrameServices,
    renderer: Option<&'a mut WgpuRenderer>,
}

impl<'a> GuiCtx<'a> {
    /// A context without a GPU renderer. Images are not uploaded and draw as
    /// placeholders; everything else behaves as in the runner.
    pub fn new(ui: &'a Ui, services: &'a mut FrameServices) -> Self {
        Self {
            ui,
            services,
            renderer: None,
        }
    }

    pub(crate) fn with_renderer(
        ui: &'a Ui,
        services: &'a mut FrameServices,
        renderer: &'a mut WgpuRenderer,
    ) -> Self {
        Self {
            ui,
            services,
            renderer: Some(renderer),
        }
    }

    pub fn ui(&self) -> &'a Ui {
        self.ui
    }

    pub fn assets(&self) -> &Assets {
        &self.services.assets
    }

    pub fn log(&self) -> &LogBuffer {
        &self.services.log
    }

    pub(crate) fn log_parts(&mut self) -> (&mut LogView, &LogBuffer) {
        (&mut self.services.log_view, &self.services.log)
    }

    /// Stop the event loop once the current frame is presented.
    pub fn request_exit(&mut self) {
        self.services.requests.exit = true;
    }

    /// Rebuild the default docking layout on the next frame.
    pub fn request_layout_reset(&mut self) {
        self.services.requests.reset_layout = true;
    }

    /// Theme currently applied, if the runner applied one.
    pub fn theme(&self) -> Option<Theme> {
        self.services.theme
    }

    /// Switch theme after the current frame.
    pub fn set_theme(&mut self, theme: Theme) {
        self.services.requests.theme = Some(theme);
    }

    /// Draw an image from the assets folder, loading it on first use.
    ///
    /// Returns false and draws a placeholder when the image cannot be shown.
    pub fn image_from_asset(&mut self, name: &str, size: [f32; 2]) -> bool {
        let ui = self.ui;
        let services = &mut *self.services;
        let Some(cached) = services.images.get_or_load(&services.assets, name) else {
            ui.text_disabled(format!("[{name}]"));
            return false;
        };
        let tex = &mut cached.texture;

        if matches!(
            tex.status(),
            TextureStatus::WantCreate | TextureStatus::WantUpdates
        ) {
            if let Some(renderer) = self.renderer.as_deref_mut() {
                match renderer.update_texture(&**tex) {
                    Ok(res) => res.apply_to(&mut **tex),
                    Err(e) => warn!("Texture upload failed for {name:?}: {e}"),
                }
            }
        }
        if !matches!(tex.status(), TextureStatus::OK) {
            ui.text_disabled(format!("[{name}]"));
            return false;
        }
        Image::new(ui, &mut **tex, size).build();
        true
    }
}
