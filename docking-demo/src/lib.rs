//! A docking application built on `dear-dock`: a command window, a log
//! window and the Dear ImGui demo, arranged around the main dockspace.
//!
//! ```text
//!  +-----------+---------------------------+
//!  | Commands  |                           |
//!  | (left,    |  Dear ImGui Demo          |
//!  |  25%)     |  (MainDockSpace)          |
//!  +-----------+---------------------------+
//!  | Logs (bottom, 25%)                    |
//!  +---------------------------------------+
//!  | status bar                            |
//!  +---------------------------------------+
//! ```

pub mod fonts;
pub mod gui;
pub mod state;

use dear_dock::logging::{LogBuffer, log_gui};
use dear_dock::{DockableWindow, MAIN_DOCK_SPACE, RunnerParams};
use dear_imgui_rs::SplitDirection;

pub use state::{AppState, RocketState};

pub const WINDOW_TITLE: &str = "Docking demo";
pub const INI_FILENAME: &str = "docking_demo.ini";
pub const BOTTOM_SPACE: &str = "BottomSpace";
pub const LEFT_SPACE: &str = "LeftSpace";

/// Everything the runner needs to show the demo.
pub fn runner_params(log: LogBuffer) -> RunnerParams<AppState> {
    RunnerParams::new(WINDOW_TITLE)
        .with_window_size(1000.0, 800.0)
        .with_restore_previous_geometry(true)
        .with_menu_bar(true)
        .with_status_bar(true)
        .with_viewports(true)
        .with_assets_folder(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))
        .with_ini_filename(INI_FILENAME)
        .with_log_buffer(log)
        // the bottom split comes first so it spans the whole width
        .with_split(MAIN_DOCK_SPACE, BOTTOM_SPACE, SplitDirection::Down, 0.25)
        .with_split(MAIN_DOCK_SPACE, LEFT_SPACE, SplitDirection::Left, 0.25)
        .with_window(DockableWindow::new("Commands", LEFT_SPACE, gui::command_gui))
        .with_window(DockableWindow::new("Logs", BOTTOM_SPACE, |ctx, _: &mut AppState| {
            log_gui(ctx)
        }))
        .with_window(DockableWindow::new(
            "Dear ImGui Demo",
            MAIN_DOCK_SPACE,
            gui::imgui_demo_gui,
        ))
        .on_show_menus(gui::show_menus)
        .on_show_status(gui::status_bar_gui)
        .on_load_fonts(fonts::load_fonts)
}
