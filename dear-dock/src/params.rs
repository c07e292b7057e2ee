//! Runner configuration.
//!
//! [`RunnerParams`] gathers everything the runner needs: the native window,
//! the Dear ImGui host window, the docking layout and the user callbacks.
//! Fields are public and have defaults; the `with_*`/`on_*` methods are a
//! builder-style shorthand.

use std::path::PathBuf;

use dear_imgui_rs::{self as imgui, DockFlags, SplitDirection};

use crate::assets::Assets;
use crate::docking::{DockableWindow, DockingParams, DockingSplit, LayoutCondition, LayoutPlan};
use crate::error::{Result, RunnerError};
use crate::geometry::geometry_path_for;
use crate::logging::LogBuffer;
use crate::{GuiCtx, GuiFn};

/// Callback run on the Dear ImGui context outside of a frame.
pub type ContextFn<S> = Box<dyn FnMut(&mut imgui::Context, &Assets, &mut S)>;
/// Callback that only needs the user state.
pub type StateFn<S> = Box<dyn FnMut(&mut S)>;

/// Native window settings.
#[derive(Clone, Debug)]
pub struct AppWindowParams {
    pub window_title: String,
    /// Logical inner size.
    pub window_size: (f64, f64),
    /// Reuse the position and size saved by the previous run.
    pub restore_previous_geometry: bool,
    pub present_mode: wgpu::PresentMode,
    pub clear_color: [f32; 4],
}

impl Default for AppWindowParams {
    fn default() -> Self {
        Self {
            window_title: format!("Dear Dock - {}", env!("CARGO_PKG_VERSION")),
            window_size: (1280.0, 720.0),
            restore_previous_geometry: false,
            present_mode: wgpu::PresentMode::Fifo,
            clear_color: [0.1, 0.1, 0.12, 1.0],
        }
    }
}

/// What the runner draws behind the user windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DefaultWindowType {
    /// A full-viewport host window containing the main dockspace.
    #[default]
    ProvideFullScreenDockSpace,
    /// A full-viewport window in which `show_gui` draws.
    ProvideFullScreenWindow,
    NoDefaultWindow,
}

/// Built-in color themes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
    Classic,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::Classic];

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::Classic => "Classic",
        }
    }

    pub(crate) fn apply(self) {
        // Only touches the current context's style; no Ui needed
        unsafe {
            match self {
                Theme::Dark => imgui::sys::igStyleColorsDark(std::ptr::null_mut()),
                Theme::Light => imgui::sys::igStyleColorsLight(std::ptr::null_mut()),
                Theme::Classic => imgui::sys::igStyleColorsClassic(std::ptr::null_mut()),
            }
        }
    }
}

/// Dear ImGui host window and chrome settings.
#[derive(Debug)]
pub struct ImGuiWindowParams {
    pub default_window_type: DefaultWindowType,
    pub show_menu_bar: bool,
    /// Show the App menu (user items and Quit).
    pub show_menu_app: bool,
    /// Show the View menu (windows, layout, status bar, theme).
    pub show_menu_view: bool,
    pub show_status_bar: bool,
    pub show_status_fps: bool,
    pub theme: Option<Theme>,
    pub dockspace_flags: DockFlags,
    /// Let windows leave the main window as native OS windows. Needs the
    /// `multi-viewport` cargo feature; ignored with a warning otherwise.
    pub enable_viewports: bool,
}

// `DockFlags` does not implement `Clone`, so copy it through its raw bits.
impl Clone for ImGuiWindowParams {
    fn clone(&self) -> Self {
        Self {
            default_window_type: self.default_window_type.clone(),
            show_menu_bar: self.show_menu_bar,
            show_menu_app: self.show_menu_app,
            show_menu_view: self.show_menu_view,
            show_status_bar: self.show_status_bar,
            show_status_fps: self.show_status_fps,
            theme: self.theme.clone(),
            dockspace_flags: DockFlags::from_bits_retain(self.dockspace_flags.bits()),
            enable_viewports: self.enable_viewports,
        }
    }
}

impl Default for ImGuiWindowParams {
    fn default() -> Self {
        Self {
            default_window_type: DefaultWindowType::default(),
            show_menu_bar: false,
            show_menu_app: true,
            show_menu_view: true,
            show_status_bar: false,
            show_status_fps: true,
            theme: Some(Theme::Dark),
            dockspace_flags: DockFlags::PASSTHRU_CENTRAL_NODE,
            enable_viewports: false,
        }
    }
}

/// Redraw behavior for the event loop
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RedrawMode {
    /// Always redraw (ControlFlow::Poll)
    Poll,
    /// On-demand redraw (ControlFlow::Wait)
    Wait,
    /// Redraw at most `fps` per second
    WaitUntil { fps: f32 },
}

/// User callbacks, all optional.
pub struct RunnerCallbacks<S> {
    /// Drawn every frame after the dockable windows.
    pub show_gui: Option<GuiFn<S>>,
    /// Extra menus appended to the menu bar.
    pub show_menus: Option<GuiFn<S>>,
    /// Items placed at the top of the App menu.
    pub show_app_menu_items: Option<GuiFn<S>>,
    /// Content of the status bar, left of the FPS counter.
    pub show_status: Option<GuiFn<S>>,
    /// Called once after the default font is added.
    pub load_additional_fonts: Option<ContextFn<S>>,
    /// Called once after the theme is applied.
    pub setup_imgui_style: Option<ContextFn<S>>,
    pub post_init: Option<StateFn<S>>,
    pub before_exit: Option<StateFn<S>>,
}

impl<S> Default for RunnerCallbacks<S> {
    fn default() -> Self {
        Self {
            show_gui: None,
            show_menus: None,
            show_app_menu_items: None,
            show_status: None,
            load_additional_fonts: None,
            setup_imgui_style: None,
            post_init: None,
            before_exit: None,
        }
    }
}

pub struct RunnerParams<S> {
    pub app_window: AppWindowParams,
    pub imgui_window: ImGuiWindowParams,
    pub docking: DockingParams<S>,
    pub callbacks: RunnerCallbacks<S>,
    /// Searched before `assets/` next to the executable and in the
    /// working directory.
    pub assets_folder: Option<PathBuf>,
    /// Dear ImGui settings file. `None` disables layout persistence.
    pub ini_filename: Option<PathBuf>,
    pub redraw: RedrawMode,
    /// Lines shown by [`crate::logging::log_gui`]. Pass the buffer returned
    /// by [`crate::logging::init`] so `tracing` events reach the window.
    pub log_buffer: LogBuffer,
}

impl<S> Default for RunnerParams<S> {
    fn default() -> Self {
        Self {
            app_window: AppWindowParams::default(),
            imgui_window: ImGuiWindowParams::default(),
            docking: DockingParams::default(),
            callbacks: RunnerCallbacks::default(),
            assets_folder: None,
            ini_filename: None,
            redraw: RedrawMode::Poll,
            log_buffer: LogBuffer::default(),
        }
    }
}

impl<S> RunnerParams<S> {
    pub fn new(window_title: impl Into<String>) -> Self {
        let mut params = Self::default();
        params.app_window.window_title = window_title.into();
        params
    }

    pub fn with_window_size(mut self, width: f64, height: f64) -> Self {
        self.app_window.window_size = (width, height);
        self
    }
    pub fn with_restore_previous_geometry(mut self, restore: bool) -> Self {
        self.app_window.restore_previous_geometry = restore;
        self
    }
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.imgui_window.theme = Some(theme);
        self
    }
    pub fn with_menu_bar(mut self, show: bool) -> Self {
        self.imgui_window.show_menu_bar = show;
        self
    }
    pub fn with_status_bar(mut self, show: bool) -> Self {
        self.imgui_window.show_status_bar = show;
        self
    }
    pub fn with_viewports(mut self, enable: bool) -> Self {
        self.imgui_window.enable_viewports = enable;
        self
    }
    pub fn with_default_window_type(mut self, window_type: DefaultWindowType) -> Self {
        self.imgui_window.default_window_type = window_type;
        self
    }
    pub fn with_assets_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.assets_folder = Some(folder.into());
        self
    }
    pub fn with_ini_filename(mut self, ini: impl Into<PathBuf>) -> Self {
        self.ini_filename = Some(ini.into());
        self
    }
    pub fn with_redraw(mut self, redraw: RedrawMode) -> Self {
        self.redraw = redraw;
        self
    }
    pub fn with_log_buffer(mut self, buffer: LogBuffer) -> Self {
        self.log_buffer = buffer;
        self
    }
    pub fn with_layout_condition(mut self, condition: LayoutCondition) -> Self {
        self.docking.layout_condition = condition;
        self
    }

    pub fn with_split(
        mut self,
        initial_dock: impl Into<String>,
        new_dock: impl Into<String>,
        direction: SplitDirection,
        ratio: f32,
    ) -> Self {
        self.docking
            .docking_splits
            .push(DockingSplit::new(initial_dock, new_dock, direction, ratio));
        self
    }

    pub fn with_window(mut self, window: DockableWindow<S>) -> Self {
        self.docking.dockable_windows.push(window);
        self
    }

    pub fn on_show_gui<F: FnMut(&mut GuiCtx<'_>, &mut S) + 'static>(mut self, f: F) -> Self {
        self.callbacks.show_gui = Some(Box::new(f));
        self
    }
    pub fn on_show_menus<F: FnMut(&mut GuiCtx<'_>, &mut S) + 'static>(mut self, f: F) -> Self {
        self.callbacks.show_menus = Some(Box::new(f));
        self
    }
    pub fn on_show_app_menu_items<F: FnMut(&mut GuiCtx<'_>, &mut S) + 'static>(
        mut self,
        f: F,
    ) -> Self {
        self.callbacks.show_app_menu_items = Some(Box::new(f));
        self
    }
    pub fn on_show_status<F: FnMut(&mut GuiCtx<'_>, &mut S) + 'static>(mut self, f: F) -> Self {
        self.callbacks.show_status = Some(Box::new(f));
        self
    }
    pub fn on_load_fonts<F: FnMut(&mut imgui::Context, &Assets, &mut S) + 'static>(
        mut self,
        f: F,
    ) -> Self {
        self.callbacks.load_additional_fonts = Some(Box::new(f));
        self
    }
    pub fn on_setup_style<F: FnMut(&mut imgui::Context, &Assets, &mut S) + 'static>(
        mut self,
        f: F,
    ) -> Self {
        self.callbacks.setup_imgui_style = Some(Box::new(f));
        self
    }
    pub fn on_post_init<F: FnMut(&mut S) + 'static>(mut self, f: F) -> Self {
        self.callbacks.post_init = Some(Box::new(f));
        self
    }
    pub fn on_before_exit<F: FnMut(&mut S) + 'static>(mut self, f: F) -> Self {
        self.callbacks.before_exit = Some(Box::new(f));
        self
    }

    pub fn assets(&self) -> Assets {
        Assets::new(self.assets_folder.clone())
    }

    /// Where the window geometry is saved: next to the ini file.
    pub fn geometry_path(&self) -> Option<PathBuf> {
        if !self.app_window.restore_previous_geometry {
            return None;
        }
        self.ini_filename.as_deref().map(geometry_path_for)
    }

    /// Check the parameters that can be checked before a window exists and
    /// return the docking layout they describe.
    pub fn validate(&self) -> Result<LayoutPlan> {
        let (w, h) = self.app_window.window_size;
        if !(w > 0.0 && h > 0.0) {
            return Err(RunnerError::Generic(format!(
                "window size must be positive, got {w}x{h}"
            )));
        }
        if let RedrawMode::WaitUntil { fps } = self.redraw
            && !(fps > 0.0)
        {
            return Err(RunnerError::Generic(format!(
                "WaitUntil fps must be positive, got {fps}"
            )));
        }
        Ok(self.docking.plan()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docking::{LayoutError, MAIN_DOCK_SPACE};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn builder_fills_the_params() {
        let params: RunnerParams<u32> = RunnerParams::new("Docking demo")
            .with_window_size(1000.0, 800.0)
            .with_restore_previous_geometry(true)
            .with_menu_bar(true)
            .with_status_bar(true)
            .with_ini_filename("docking_demo.ini")
            .with_split(MAIN_DOCK_SPACE, "BottomSpace", SplitDirection::Down, 0.25)
            .with_window(DockableWindow::new("Logs", "BottomSpace", |_, _| {}))
            .on_show_status(|_, n| *n += 1);

        assert_eq!(params.app_window.window_title, "Docking demo");
        assert_eq!(params.app_window.window_size, (1000.0, 800.0));
        assert!(params.imgui_window.show_menu_bar);
        assert!(params.imgui_window.show_status_bar);
        assert!(params.callbacks.show_status.is_some());
        assert!(params.callbacks.show_gui.is_none());
        assert_eq!(params.docking.docking_splits.len(), 1);
        assert_eq!(
            params.geometry_path().as_deref(),
            Some(Path::new("docking_demo_geometry.toml"))
        );
        let plan = params.validate().unwrap();
        assert_eq!(
            plan.spaces().collect::<Vec<_>>(),
            vec![MAIN_DOCK_SPACE, "BottomSpace"]
        );
        assert_eq!(
            plan.placements,
            vec![("Logs".to_string(), "BottomSpace".to_string())]
        );
        assert!(!params.imgui_window.enable_viewports);
        assert!(params.with_viewports(true).imgui_window.enable_viewports);
    }

    #[test]
    fn geometry_needs_restore_and_ini() {
        let params: RunnerParams<()> = RunnerParams::new("t").with_ini_filename("a.ini");
        assert_eq!(params.geometry_path(), None);
        let params: RunnerParams<()> =
            RunnerParams::new("t").with_restore_previous_geometry(true);
        assert_eq!(params.geometry_path(), None);
    }

    #[test]
    fn validate_reports_layout_errors() {
        let params: RunnerParams<()> = RunnerParams::new("t").with_window(DockableWindow::new(
            "Logs",
            "Nowhere",
            |_, _| {},
        ));
        match params.validate() {
            Err(RunnerError::InvalidLayout(LayoutError::UnknownDockSpace { window, space })) => {
                assert_eq!((window.as_str(), space.as_str()), ("Logs", "Nowhere"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_bad_window_size_and_fps() {
        let params: RunnerParams<()> = RunnerParams::new("t").with_window_size(0.0, 600.0);
        assert!(matches!(params.validate(), Err(RunnerError::Generic(_))));
        let params: RunnerParams<()> =
            RunnerParams::new("t").with_redraw(RedrawMode::WaitUntil { fps: 0.0 });
        assert!(matches!(params.validate(), Err(RunnerError::Generic(_))));
    }

    #[test]
    fn theme_labels_are_unique() {
        let labels: Vec<_> = Theme::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["Dark", "Light", "Classic"]);
    }
}
