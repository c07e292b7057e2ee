//! Windows the runner draws around the user's: the main menu bar, the
//! full-viewport host (dockspace or plain window) and the status bar.

use dear_imgui_rs::{Condition, DockBuilder, DockFlags, Id, StyleVar, Ui, WindowFlags};

use crate::docking::{DockingParams, LayoutPlan, apply_layout};
use crate::params::{ImGuiWindowParams, RunnerCallbacks, Theme};
use crate::GuiCtx;

const HOST_WINDOW_NAME: &str = "##DockSpaceHost";
const FULL_SCREEN_WINDOW_NAME: &str = "##FullScreenWindow";
const STATUS_BAR_NAME: &str = "##StatusBar";
const STATUS_BAR_PADDING: [f32; 2] = [8.0, 4.0];

fn host_flags() -> WindowFlags {
    WindowFlags::NO_TITLE_BAR
        | WindowFlags::NO_RESIZE
        | WindowFlags::NO_MOVE
        | WindowFlags::NO_COLLAPSE
        | WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS
        | WindowFlags::NO_NAV_FOCUS
        | WindowFlags::NO_DOCKING
        | WindowFlags::NO_SAVED_SETTINGS
}

pub(crate) fn status_bar_height(ui: &Ui) -> f32 {
    ui.frame_height() + 2.0 * STATUS_BAR_PADDING[1]
}

/// Work area of the main viewport left for the host window.
fn host_rect(ui: &Ui, bottom_inset: f32) -> ([f32; 2], [f32; 2]) {
    let viewport = ui.main_viewport();
    let pos = viewport.work_pos();
    let size = viewport.work_size();
    (pos, [size[0], (size[1] - bottom_inset).max(0.0)])
}

/// Full-viewport host window containing the main dockspace.
///
/// The layout is written before the dockspace is submitted, when `force` is
/// set or when the dockspace has no node yet (no saved layout).
pub(crate) fn dockspace_host(
    ui: &Ui,
    plan: &LayoutPlan,
    dock_flags: DockFlags,
    bottom_inset: f32,
    force: bool,
) -> bool {
    let viewport = ui.main_viewport();
    ui.set_next_window_viewport(Id::from(viewport.id()));
    let (pos, size) = host_rect(ui, bottom_inset);

    let mut flags = host_flags();
    if dock_flags.contains(DockFlags::PASSTHRU_CENTRAL_NODE) {
        flags |= WindowFlags::NO_BACKGROUND;
    }

    let rounding = ui.push_style_var(StyleVar::WindowRounding(0.0));
    let border = ui.push_style_var(StyleVar::WindowBorderSize(0.0));
    let padding = ui.push_style_var(StyleVar::WindowPadding([0.0, 0.0]));

    let mut applied = false;
    ui.window(HOST_WINDOW_NAME)
        .flags(flags)
        .position(pos, Condition::Always)
        .size(size, Condition::Always)
        .build(|| {
            padding.pop();
            border.pop();
            rounding.pop();

            let dockspace_id = ui.get_id(&plan.root);
            if force || !DockBuilder::node_exists(ui, dockspace_id) {
                apply_layout(plan, dockspace_id, pos, size);
                applied = true;
            }
            let _ = ui.dock_space_with_class(dockspace_id, [0.0, 0.0], dock_flags, None);
        });
    applied
}

/// Full-viewport undecorated window; `gui` draws its content.
pub(crate) fn full_screen_window(ui: &Ui, bottom_inset: f32, gui: impl FnOnce()) {
    let viewport = ui.main_viewport();
    ui.set_next_window_viewport(Id::from(viewport.id()));
    let (pos, size) = host_rect(ui, bottom_inset);
    let rounding = ui.push_style_var(StyleVar::WindowRounding(0.0));
    ui.window(FULL_SCREEN_WINDOW_NAME)
        .flags(host_flags())
        .position(pos, Condition::Always)
        .size(size, Condition::Always)
        .build(|| {
            rounding.pop();
            gui();
        });
}

/// Main menu bar: App, View, then the user's menus.
pub(crate) fn menu_bar<S>(
    ctx: &mut GuiCtx<'_>,
    window: &mut ImGuiWindowParams,
    docking: &mut DockingParams<S>,
    callbacks: &mut RunnerCallbacks<S>,
    state: &mut S,
) {
    let ui = ctx.ui();
    let Some(bar) = ui.begin_main_menu_bar() else {
        return;
    };

    if window.show_menu_app
        && let Some(menu) = ui.begin_menu("App")
    {
        if let Some(items) = callbacks.show_app_menu_items.as_mut() {
            items(ctx, state);
            ui.separator();
        }
        if ui.menu_item("Quit") {
            ctx.request_exit();
        }
        menu.end();
    }

    if window.show_menu_view
        && let Some(menu) = ui.begin_menu("View")
    {
        view_menu(ctx, window, docking);
        menu.end();
    }

    if let Some(menus) = callbacks.show_menus.as_mut() {
        menus(ctx, state);
    }
    bar.end();
}

fn view_menu<S>(
    ctx: &mut GuiCtx<'_>,
    window: &mut ImGuiWindowParams,
    docking: &mut DockingParams<S>,
) {
    let ui = ctx.ui();
    let mut listed = false;
    for dockable in docking
        .dockable_windows
        .iter_mut()
        .filter(|w| w.include_in_view_menu)
    {
        ui.menu_item_toggle(&dockable.label, None::<&str>, &mut dockable.is_visible, true);
        listed = true;
    }
    if listed {
        ui.separator();
    }
    if ui.menu_item("Restore default layout") {
        ctx.request_layout_reset();
    }
    ui.separator();
    ui.menu_item_toggle("Show status bar", None::<&str>, &mut window.show_status_bar, true);
    ui.menu_item_toggle(
        "Show FPS",
        None::<&str>,
        &mut window.show_status_fps,
        window.show_status_bar,
    );
    if let Some(menu) = ui.begin_menu("Theme") {
        let current = ctx.theme();
        for theme in Theme::ALL {
            let mut selected = current == Some(theme);
            if ui.menu_item_toggle(theme.label(), None::<&str>, &mut selected, true) {
                ctx.set_theme(theme);
            }
        }
        menu.end();
    }
}

/// Fixed bar across the bottom of the main viewport.
pub(crate) fn status_bar<S>(
    ctx: &mut GuiCtx<'_>,
    window: &ImGuiWindowParams,
    callbacks: &mut RunnerCallbacks<S>,
    state: &mut S,
) {
    let ui = ctx.ui();
    let viewport = ui.main_viewport();
    let height = status_bar_height(ui);
    let work_pos = viewport.work_pos();
    let work_size = viewport.work_size();
    let pos = [work_pos[0], work_pos[1] + (work_size[1] - height).max(0.0)];

    let padding = ui.push_style_var(StyleVar::WindowPadding(STATUS_BAR_PADDING));
    let rounding = ui.push_style_var(StyleVar::WindowRounding(0.0));
    ui.window(STATUS_BAR_NAME)
        .flags(
            host_flags()
                | WindowFlags::NO_SCROLLBAR
                | WindowFlags::NO_SCROLL_WITH_MOUSE,
        )
        .position(pos, Condition::Always)
        .size([work_size[0], height], Condition::Always)
        .build(|| {
            if let Some(status) = callbacks.show_status.as_mut() {
                status(ctx, state);
            }
            if window.show_status_fps {
                let fps = format!("FPS: {:.1}", ui.io().framerate());
                ui.same_line_with_pos((ui.window_size()[0] - 90.0).max(0.0));
                ui.text(fps);
            }
        });
    rounding.pop();
    padding.pop();
}
