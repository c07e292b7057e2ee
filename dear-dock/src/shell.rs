//! Per-frame orchestration shared by the windowed runner and headless hosts.

use std::path::PathBuf;

use dear_imgui_rs::{self as imgui, ConfigFlags, DockFlags, Ui};
use dear_imgui_wgpu::WgpuRenderer;
use tracing::{debug, info};

use crate::chrome;
use crate::docking::{DockableWindow, DockingParams, LayoutCondition, LayoutPlan};
use crate::error::Result;
use crate::fonts;
use crate::frame::{FrameServices, GuiCtx};
use crate::params::{
    AppWindowParams, DefaultWindowType, ImGuiWindowParams, RedrawMode, RunnerCallbacks,
    RunnerParams,
};

#[cfg(feature = "multi-viewport")]
fn enable_viewports(context: &mut imgui::Context) {
    // cleared again by Dear ImGui on the first frame when the backends
    // cannot host viewports
    context.enable_multi_viewport();
    debug!("Multi-viewport enabled");
}

#[cfg(not(feature = "multi-viewport"))]
fn enable_viewports(_context: &mut imgui::Context) {
    tracing::warn!(
        "enable_viewports is set but dear-dock was built without the multi-viewport feature"
    );
}

/// Settings only the native window loop needs.
pub(crate) struct WindowConfig {
    pub(crate) app_window: AppWindowParams,
    pub(crate) redraw: RedrawMode,
    pub(crate) geometry_path: Option<PathBuf>,
}

/// Everything drawn inside a frame: chrome, dockspace, dockable windows and
/// the user callbacks.
///
/// The runner drives one of these from its event loop. Tests drive it from
/// a bare [`imgui::Context`]:
///
/// ```no_run
/// # use dear_dock::{AppShell, RunnerParams};
/// # fn demo() -> dear_dock::Result<()> {
/// let mut ctx = dear_imgui_rs::Context::create();
/// let mut state = 0u32;
/// let mut shell = AppShell::new(RunnerParams::<u32>::new("headless"))?;
/// shell.setup_context(&mut ctx, &mut state);
/// let ui = ctx.frame();
/// shell.frame(ui, None, &mut state);
/// let _ = ctx.render();
/// let exit = shell.end_frame();
/// # let _ = exit;
/// # Ok(())
/// # }
/// ```
pub struct AppShell<S> {
    window: ImGuiWindowParams,
    docking: DockingParams<S>,
    callbacks: RunnerCallbacks<S>,
    plan: LayoutPlan,
    ini_filename: Option<PathBuf>,
    services: FrameServices,
    force_layout: bool,
    layouts_applied: usize,
}

impl<S> AppShell<S> {
    pub fn new(params: RunnerParams<S>) -> Result<Self> {
        Ok(Self::from_params(params)?.0)
    }

    pub(crate) fn from_params(params: RunnerParams<S>) -> Result<(Self, WindowConfig)> {
        let plan = params.validate()?;
        let geometry_path = params.geometry_path();
        let assets = params.assets();
        let RunnerParams {
            app_window,
            imgui_window,
            docking,
            callbacks,
            ini_filename,
            redraw,
            log_buffer,
            ..
        } = params;

        let shell = Self {
            window: imgui_window,
            force_layout: docking.layout_condition == LayoutCondition::ApplicationStart,
            docking,
            callbacks,
            plan,
            ini_filename,
            services: FrameServices::new(assets, log_buffer),
            layouts_applied: 0,
        };
        let config = WindowConfig {
            app_window,
            redraw,
            geometry_path,
        };
        Ok((shell, config))
    }

    /// Configure a fresh context: settings file, docking, theme, style and
    /// fonts. Called again whenever the GPU stack is rebuilt.
    pub fn setup_context(&mut self, context: &mut imgui::Context, state: &mut S) {
        let _ = context.set_ini_filename(self.ini_filename.clone());
        {
            let io = context.io_mut();
            let mut flags = io.config_flags();
            flags.insert(ConfigFlags::DOCKING_ENABLE);
            io.set_config_flags(flags);
        }
        if self.window.enable_viewports {
            enable_viewports(context);
        }

        if let Some(theme) = self.window.theme {
            theme.apply();
            self.services.theme = Some(theme);
        }
        let assets = self.services.assets().clone();
        if let Some(style) = self.callbacks.setup_imgui_style.as_mut() {
            style(context, &assets, state);
        }

        fonts::load_default_font_with_icons(context, &assets);
        if let Some(load) = self.callbacks.load_additional_fonts.as_mut() {
            load(context, &assets, state);
        }
        // textures of a previous context are gone
        self.services.clear_images();
        debug!("Dear ImGui context configured");
    }

    pub fn post_init(&mut self, state: &mut S) {
        if let Some(cb) = self.callbacks.post_init.as_mut() {
            cb(state);
        }
    }

    pub fn before_exit(&mut self, state: &mut S) {
        if let Some(cb) = self.callbacks.before_exit.as_mut() {
            cb(state);
        }
    }

    /// Draw one frame. `renderer` is needed to upload asset images.
    pub fn frame(&mut self, ui: &Ui, renderer: Option<&mut WgpuRenderer>, state: &mut S) {
        let Self {
            window,
            docking,
            callbacks,
            plan,
            services,
            force_layout,
            layouts_applied,
            ..
        } = self;
        let mut ctx = match renderer {
            Some(renderer) => GuiCtx::with_renderer(ui, services, renderer),
            None => GuiCtx::new(ui, services),
        };

        if window.show_menu_bar {
            chrome::menu_bar(&mut ctx, window, docking, callbacks, state);
        }
        let bottom_inset = if window.show_status_bar {
            chrome::status_bar_height(ui)
        } else {
            0.0
        };

        match window.default_window_type {
            DefaultWindowType::ProvideFullScreenDockSpace => {
                if chrome::dockspace_host(
                    ui,
                    plan,
                    DockFlags::from_bits_retain(window.dockspace_flags.bits()),
                    bottom_inset,
                    *force_layout,
                ) {
                    *force_layout = false;
                    *layouts_applied += 1;
                }
            }
            DefaultWindowType::ProvideFullScreenWindow => {
                chrome::full_screen_window(ui, bottom_inset, || {
                    if let Some(gui) = callbacks.show_gui.as_mut() {
                        gui(&mut ctx, state);
                    }
                });
            }
            DefaultWindowType::NoDefaultWindow => {}
        }

        for dockable in docking.dockable_windows.iter_mut() {
            let DockableWindow {
                label,
                gui,
                is_visible,
                ..
            } = dockable;
            if *is_visible {
                ui.window(label.as_str()).build(|| gui(&mut ctx, state));
            }
        }

        if window.default_window_type != DefaultWindowType::ProvideFullScreenWindow
            && let Some(gui) = callbacks.show_gui.as_mut()
        {
            gui(&mut ctx, state);
        }

        if window.show_status_bar {
            chrome::status_bar(&mut ctx, window, callbacks, state);
        }
    }

    /// Handle requests made during the frame. Returns true when the
    /// application asked to exit.
    ///
    /// Call after `Context::render`.
    pub fn end_frame(&mut self) -> bool {
        let requests = self.services.take_requests();
        if let Some(theme) = requests.theme {
            theme.apply();
            self.services.theme = Some(theme);
            info!("Theme set to {}", theme.label());
        }
        if requests.reset_layout {
            self.force_layout = true;
            info!("Restoring default docking layout");
        }
        requests.exit
    }

    pub fn services(&self) -> &FrameServices {
        &self.services
    }

    pub fn dockable_windows(&self) -> &[DockableWindow<S>] {
        &self.docking.dockable_windows
    }

    pub fn imgui_window(&self) -> &ImGuiWindowParams {
        &self.window
    }

    pub fn plan(&self) -> &LayoutPlan {
        &self.plan
    }

    /// How many times the default layout was written into the dockspace.
    pub fn layouts_applied(&self) -> usize {
        self.layouts_applied
    }

    /// Rebuild the default layout on the next frame.
    pub fn request_layout_reset(&mut self) {
        self.force_layout = true;
    }
}
