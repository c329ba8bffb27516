//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the crate, providing a single source of truth for constant values.

/// Fixed animation timings (milliseconds)
pub mod timing {
    /// Delay between two pulse ticks
    pub const PULSE_INTERVAL_MS: u64 = 400;

    /// Duration of one ring pulse (grow + fade)
    pub const PULSE_DURATION_MS: u64 = 1400;

    /// Unselect content fade is this many times slower than the base fade
    pub const UNSELECT_FADE_FACTOR: u64 = 4;

    /// Interpolated frame cadence of the live driver
    pub const FRAME_INTERVAL_MS: u64 = 16;

    /// Longest quiet stretch a replay will simulate between two events
    pub const MAX_REPLAY_GAP_MS: u64 = 10 * 60 * 1000;
}

/// Marker element layout
pub mod marker {
    /// Dot is drawn this many pixels up/left of the point
    pub const DOT_OFFSET: f64 = 3.0;

    /// Dot width and height in pixels
    pub const DOT_SIZE: f64 = 4.0;

    /// Dots sit above rings
    pub const DOT_Z_INDEX: i32 = 10;

    /// Ring opacity while its point is selected
    pub const SELECTED_RING_OPACITY: f64 = 0.5;
}

/// Option defaults
pub mod defaults {
    /// Hit/visual radius in pixels
    pub const RADIUS: f64 = 30.0;

    /// Base fade duration in milliseconds
    pub const FADE_DURATION_MS: u64 = 250;

    /// Unselected marker color
    pub const POINT_COLOR: &str = "#DD0000";

    /// Selected marker color
    pub const SELECTED_POINT_COLOR: &str = "#069900";
}

/// Option validation bounds
pub mod validation {
    /// Smallest usable radius in pixels
    pub const MIN_RADIUS: f64 = 1.0;

    /// Largest radius in pixels
    pub const MAX_RADIUS: f64 = 4096.0;

    /// Longest base fade in milliseconds
    pub const MAX_FADE_DURATION_MS: u64 = 60_000;
}

/// Element naming
pub mod naming {
    /// Prefix for every class and element id created by a widget
    pub const PREFIX: &str = "hotspots";
}

/// Config file locations
pub mod config {
    /// Directory under the user config dir
    pub const APP_DIR: &str = "hotspots";

    /// Default scene file name
    pub const FILENAME: &str = "scene.json";
}
