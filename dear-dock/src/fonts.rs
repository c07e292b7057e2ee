//! Font loading from the assets folder.
//!
//! Dear ImGui's stb_truetype backend asserts on files it cannot parse, so
//! every file is sniffed with [`is_truetype`] before it reaches the atlas.

use std::path::PathBuf;

use dear_imgui_rs::{Context, FontConfig, FontId, FontSource};
use tracing::{debug, info};

use crate::assets::Assets;
use crate::error::{Result, RunnerError};

/// Icon font merged by [`load_font_ttf_with_icons`].
pub const ICON_FONT: &str = "fonts/fontawesome-webfont.ttf";

/// Font Awesome 4 code points.
pub mod icons {
    pub const ROCKET: &str = "\u{f135}";
    pub const SMILE: &str = "\u{f118}";
}

// Accept classic TrueType (0x00010000 or 'true') with 'glyf' and 'loca'
// tables. CFF ('OTTO') and collections ('ttcf') are rejected.
pub fn is_truetype(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let tag_u32 = |b: &[u8]| -> u32 { u32::from_be_bytes([b[0], b[1], b[2], b[3]]) };
    const TAG_TRUE: u32 = 0x7472_7565; // 'true'
    const TAG_GLYF: u32 = 0x676C_7966; // 'glyf'
    const TAG_LOCA: u32 = 0x6C6F_6361; // 'loca'
    const DIR_ENTRY_SIZE: usize = 16;

    let sfnt = tag_u32(&data[0..4]);
    if !(sfnt == 0x0001_0000 || sfnt == TAG_TRUE) {
        return false;
    }
    let num_tables = u16::from_be_bytes([data[4], data[5]]) as usize;
    if data.len() < 12 + num_tables * DIR_ENTRY_SIZE {
        return false;
    }
    let (mut has_glyf, mut has_loca) = (false, false);
    for i in 0..num_tables {
        let off = 12 + i * DIR_ENTRY_SIZE;
        match tag_u32(&data[off..off + 4]) {
            TAG_GLYF => has_glyf = true,
            TAG_LOCA => has_loca = true,
            _ => {}
        }
    }
    has_glyf && has_loca
}

fn read_truetype(assets: &Assets, name: &str) -> Result<(PathBuf, Vec<u8>)> {
    let (path, data) = assets.read(name)?;
    if !is_truetype(&data) {
        return Err(RunnerError::Font {
            path,
            reason: "not a TrueType font with glyf/loca tables".to_string(),
        });
    }
    Ok((path, data))
}

/// Add Dear ImGui's built-in font. The first font added is the default one.
pub fn load_default_font(ctx: &mut Context) -> FontId {
    ctx.fonts().add_font(&[FontSource::DefaultFontData {
        size_pixels: None,
        config: None,
    }])
}

/// Size of Dear ImGui's built-in font.
pub const DEFAULT_FONT_SIZE: f32 = 13.0;

/// Add the built-in font with the icon font merged in, when the icon font
/// is found in the assets folder.
pub fn load_default_font_with_icons(ctx: &mut Context, assets: &Assets) -> FontId {
    let icons = match read_truetype(assets, ICON_FONT) {
        Ok((_, icons)) => icons,
        Err(e) => {
            debug!("Default font without icons: {e}");
            return load_default_font(ctx);
        }
    };
    ctx.fonts().add_font(&[
        FontSource::DefaultFontData {
            size_pixels: None,
            config: None,
        },
        FontSource::TtfData {
            data: &icons,
            size_pixels: Some(DEFAULT_FONT_SIZE),
            config: Some(
                FontConfig::new()
                    .size_pixels(DEFAULT_FONT_SIZE)
                    .merge_mode(true),
            ),
        },
    ])
}

/// Load a TrueType font from the assets folder at `size_pixels`.
pub fn load_font_ttf(
    ctx: &mut Context,
    assets: &Assets,
    name: &str,
    size_pixels: f32,
) -> Result<FontId> {
    let (path, data) = read_truetype(assets, name)?;
    let id = ctx.fonts().add_font(&[FontSource::TtfData {
        data: &data,
        size_pixels: Some(size_pixels),
        config: Some(FontConfig::new().size_pixels(size_pixels)),
    }]);
    info!("Loaded font {}", path.display());
    Ok(id)
}

/// Like [`load_font_ttf`], with the icon font merged into the same font.
///
/// A missing or unusable icon font is not an error: the text font is
/// returned alone.
pub fn load_font_ttf_with_icons(
    ctx: &mut Context,
    assets: &Assets,
    name: &str,
    size_pixels: f32,
) -> Result<FontId> {
    let (path, data) = read_truetype(assets, name)?;
    let icons = match read_truetype(assets, ICON_FONT) {
        Ok((_, icons)) => Some(icons),
        Err(e) => {
            debug!("Icon font skipped: {e}");
            None
        }
    };

    let mut sources = vec![FontSource::TtfData {
        data: &data,
        size_pixels: Some(size_pixels),
        config: Some(FontConfig::new().size_pixels(size_pixels)),
    }];
    if let Some(icons) = icons.as_deref() {
        sources.push(FontSource::TtfData {
            data: icons,
            size_pixels: Some(size_pixels),
            config: Some(
                FontConfig::new()
                    .size_pixels(size_pixels)
                    .merge_mode(true),
            ),
        });
    }
    let id = ctx.fonts().add_font(&sources);
    info!(
        icons = icons.is_some(),
        "Loaded font {}",
        path.display()
    );
    Ok(id)
}
