//! Window option flags

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Creation and state options of a window
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct WindowOptions: u32 {
        /// Exclusive fullscreen mode
        const FULLSCREEN = 1 << 1;
        /// Borderless fullscreen at desktop resolution
        const FULLSCREEN_DESKTOP = 1 << 2;
        /// User may resize the window
        const RESIZABLE = 1 << 3;
        /// Window is visible
        const SHOWN = 1 << 4;
        /// Window is hidden
        const HIDDEN = 1 << 5;
        /// Window is minimized
        const MINIMIZED = 1 << 6;
        /// Window is maximized
        const MAXIMIZED = 1 << 7;
        /// Window grabs input
        const GRABBED = 1 << 8;
        /// Window has input focus
        const INPUT_FOCUS = 1 << 9;
        /// Window has mouse focus
        const MOUSE_FOCUS = 1 << 10;
    }
}

impl WindowOptions {
    /// No option set
    pub const NONE: Self = Self::empty();

    /// Every option
    pub const ALL: Self = Self::all();
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::NONE
    }
}
