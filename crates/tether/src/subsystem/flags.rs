//! Subsystem flag set

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Logical subsystems a handle can switch on
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Subsystems: u32 {
        /// Audio playback and capture
        const AUDIO = 1 << 1;
        /// Event queue
        const EVENTS = 1 << 2;
        /// Game controller mapping
        const GAME_CONTROLLER = 1 << 3;
        /// Force feedback
        const HAPTIC = 1 << 4;
        /// Raw joystick access
        const JOYSTICK = 1 << 5;
        /// Timers
        const TIMER = 1 << 6;
        /// Video and windowing
        const VIDEO = 1 << 7;
    }
}

impl Subsystems {
    /// Nothing switched on
    pub const NONE: Self = Self::empty();

    /// Every known subsystem
    pub const ALL: Self = Self::all();
}

impl Default for Subsystems {
    fn default() -> Self {
        Self::NONE
    }
}
