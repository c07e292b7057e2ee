//! Fonts loaded on top of the default one.

use dear_dock::Assets;
use dear_dock::fonts::load_font_ttf_with_icons;
use dear_imgui_rs::Context;
use tracing::warn;

use crate::state::AppState;

pub const TITLE_FONT: &str = "fonts/Akronim-Regular.ttf";
pub const TITLE_FONT_SIZE: f32 = 40.0;

/// Load the title font with icons merged in. Without the font file the
/// window titles fall back to the default font.
pub fn load_fonts(ctx: &mut Context, assets: &Assets, state: &mut AppState) {
    state.title_font = match load_font_ttf_with_icons(ctx, assets, TITLE_FONT, TITLE_FONT_SIZE) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Title font unavailable: {e}");
            None
        }
    };
}
