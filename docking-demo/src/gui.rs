//! Widgets of the demo windows, status bar and menu.

use dear_dock::GuiCtx;
use dear_dock::fonts::icons;
use tracing::{info, warn};

use crate::state::{AppState, RocketState};

pub const IMAGE_ASSET: &str = "images/world.jpg";
pub const IMAGE_SIZE: [f32; 2] = [100.0, 100.0];
pub const PROGRESS_BAR_SIZE: [f32; 2] = [100.0, 15.0];

const THEME_HELP: &str = "Tweak the theme!\n\n\
    Select the menu \"View/Theme\" in order to browse the available themes.";

const ASSETS_TOOLTIP: &str = "The custom font and the globe image below were loaded\n\
    from the application assets folder.";

/// Content of the "Commands" window.
pub fn command_gui(ctx: &mut GuiCtx<'_>, state: &mut AppState) {
    let ui = ctx.ui();
    ui.text_wrapped(THEME_HELP);
    ui.separator();

    let font = state.title_font.map(|id| ui.push_font(id));
    ui.text(format!("Hello  {}", icons::SMILE));
    ctx.image_from_asset(IMAGE_ASSET, IMAGE_SIZE);
    if let Some(font) = font {
        font.pop();
    }
    if ui.is_item_hovered() {
        ui.tooltip_text(ASSETS_TOOLTIP);
    }

    ui.separator();

    if ui.slider_f32("float", &mut state.f, 0.0, 1.0) {
        warn!("state.f was changed to {:.6}", state.f);
    }

    if ui.button("Button") {
        state.counter += 1;
        info!("Button was pressed");
    }
    ui.same_line();
    ui.text(format!("counter = {}", state.counter));

    match state.rocket_state {
        RocketState::Init => {
            if ui.button(format!("{} Launch rocket", icons::ROCKET)) {
                state.launch();
            }
        }
        RocketState::Preparing => {
            ui.text("Please Wait");
            state.advance();
        }
        RocketState::Launched => {
            ui.text(format!("{} Rocket launched", icons::ROCKET));
            if ui.button("Reset Rocket") {
                state.reset();
            }
        }
    }
}

/// Left part of the status bar: the rocket's progress while it is prepared.
pub fn status_bar_gui(ctx: &mut GuiCtx<'_>, state: &mut AppState) {
    if state.rocket_state == RocketState::Preparing {
        let ui = ctx.ui();
        ui.text("Rocket completion: ");
        ui.same_line();
        ui.progress_bar(state.rocket_progress)
            .size(PROGRESS_BAR_SIZE)
            .build();
    }
}

/// Menus appended to the default menu bar.
pub fn show_menus(ctx: &mut GuiCtx<'_>, _state: &mut AppState) {
    let ui = ctx.ui();
    if let Some(menu) = ui.begin_menu("My Menu") {
        if ui.menu_item("Test me") {
            warn!("It works");
        }
        menu.end();
    }
}

/// Content of the "Dear ImGui Demo" window.
pub fn imgui_demo_gui(ctx: &mut GuiCtx<'_>, _state: &mut AppState) {
    let mut opened = true;
    ctx.ui().show_demo_window(&mut opened);
}
