//! Application state and the rocket launch state machine.
//!
//! ```text
//!  Init --launch--> Preparing --progress >= 1--> Launched --reset--> Init
//! ```

use dear_imgui_rs::FontId;
use tracing::warn;

/// Progress added to the rocket on every frame spent preparing.
pub const ROCKET_STEP: f32 = 0.003;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RocketState {
    #[default]
    Init,
    Preparing,
    Launched,
}

#[derive(Debug, Default)]
pub struct AppState {
    /// Edited by the "float" slider, in [0, 1].
    pub f: f32,
    pub counter: i32,
    /// Only meaningful while preparing.
    pub rocket_progress: f32,
    pub rocket_state: RocketState,
    /// Title font loaded at startup; `None` when the font file is missing.
    pub title_font: Option<FontId>,
}

impl AppState {
    /// Init -> Preparing. Returns whether the state changed.
    pub fn launch(&mut self) -> bool {
        if self.rocket_state != RocketState::Init {
            return false;
        }
        self.rocket_state = RocketState::Preparing;
        warn!("Rocket is being prepared");
        true
    }

    /// Advance a preparing rocket by one frame. Returns true on the frame
    /// the rocket is launched.
    pub fn advance(&mut self) -> bool {
        if self.rocket_state != RocketState::Preparing {
            return false;
        }
        self.rocket_progress += ROCKET_STEP;
        if self.rocket_progress >= 1.0 {
            self.rocket_state = RocketState::Launched;
            warn!("Rocket was launched");
            return true;
        }
        false
    }

    /// Launched -> Init, progress back to zero. Returns whether the state
    /// changed.
    pub fn reset(&mut self) -> bool {
        if self.rocket_state != RocketState::Launched {
            return false;
        }
        self.rocket_state = RocketState::Init;
        self.rocket_progress = 0.0;
        true
    }
}
