//! dear-dock: a docking application runner for dear-imgui-rs
//!
//! Goals
//! - Hide boilerplate (Winit + WGPU + platform + renderer)
//! - Describe the docking layout as data: splits of named spaces plus the
//!   windows that start in each space
//! - Provide the usual chrome: main menu bar, status bar, log window, themes
//! - Read fonts and images from an assets folder
//!
//! Quickstart
//! ```no_run
//! use dear_dock::{DockableWindow, MAIN_DOCK_SPACE, RunnerParams, logging};
//! use dear_imgui_rs::SplitDirection;
//!
//! fn main() -> dear_dock::Result<()> {
//!     let log = logging::init("info", logging::DEFAULT_LOG_CAPACITY);
//!     let params = RunnerParams::<i32>::new("Hello")
//!         .with_log_buffer(log)
//!         .with_split(MAIN_DOCK_SPACE, "Bottom", SplitDirection::Down, 0.3)
//!         .with_window(DockableWindow::new("Counter", MAIN_DOCK_SPACE, |ctx, n: &mut i32| {
//!             let ui = ctx.ui();
//!             if ui.button("+1") {
//!                 *n += 1;
//!             }
//!             ui.text(format!("counter = {n}"));
//!         }))
//!         .with_window(DockableWindow::new("Logs", "Bottom", |ctx, _| logging::log_gui(ctx)));
//!     dear_dock::run(params, 0)
//! }
//! ```

pub mod assets;
mod chrome;
pub mod docking;
pub mod error;
pub mod fonts;
mod frame;
pub mod geometry;
pub mod logging;
pub mod params;
mod runner;
mod shell;

pub use assets::Assets;
pub use docking::{
    DockableWindow, DockingParams, DockingSplit, LayoutCondition, LayoutError, LayoutPlan,
    MAIN_DOCK_SPACE,
};
pub use error::{Result, RunnerError};
pub use frame::{FrameServices, GuiCtx};
pub use params::{
    AppWindowParams, DefaultWindowType, ImGuiWindowParams, RedrawMode, RunnerCallbacks,
    RunnerParams, Theme,
};
pub use runner::run;
pub use shell::AppShell;

/// Per-frame callback: the frame context and the application state.
pub type GuiFn<S> = Box<dyn FnMut(&mut GuiCtx<'_>, &mut S)>;
