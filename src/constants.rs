//! Centralized constants for the scene builder
//!
//! Shared tuning values for resolution, placement, physics and persistence.

use bevy::prelude::*;

/// Model resolution
pub mod resolve {
    /// Largest bounding-box dimension a remote model is normalized to
    pub const REMOTE_TARGET_SIZE: f32 = 2.0;
    /// Color of the last-resort primitive, chosen to make degradation obvious
    pub const FALLBACK_COLOR: u32 = 0xff4b2b;
    /// Edge length of the fallback box
    pub const FALLBACK_SIZE: f32 = 1.0;
}

/// Ghost placement
pub mod placement {
    /// Previews are shown slightly larger than the placed result
    pub const PREVIEW_ENLARGEMENT: f32 = 1.2;
    /// Alpha applied to ghosted materials
    pub const GHOST_ALPHA: f32 = 0.5;
    /// Yaw increment for rotate actions, in degrees
    pub const ROTATION_STEP_DEGREES: f32 = 15.0;
    /// Radius of the circle used when several copies are placed at once
    pub const ARRANGEMENT_RADIUS: f32 = 3.0;
}

/// Physics binding
pub mod physics {
    pub const LINEAR_DAMPING: f32 = 0.5;
    pub const ANGULAR_DAMPING: f32 = 0.3;
    /// Thinnest collider extent, keeps flat objects from tunnelling
    pub const MIN_COLLIDER_EXTENT: f32 = 0.02;
    /// Size of the static ground slab
    pub const GROUND_SIZE: f32 = 200.0;
    pub const GROUND_THICKNESS: f32 = 0.2;
}

/// Selection and manipulation
pub mod selection {
    /// Maximum gap between clicks on the same object to count as a double-click
    pub const DOUBLE_CLICK_WINDOW_SECS: f64 = 0.35;
    /// Ray length used for hit-testing
    pub const PICK_DISTANCE: f32 = 500.0;
    /// Range of the raw scale slider
    pub const SCALE_SLIDER_MIN: f32 = 0.1;
    pub const SCALE_SLIDER_MAX: f32 = 3.0;
}

/// Lights attached to placed objects
pub mod lights {
    /// Lumens per unit of relative light intensity
    pub const LUMENS_PER_UNIT: f32 = 60_000.0;
    pub const MAX_RELATIVE_INTENSITY: f32 = 5.0;
}

/// Scene background and highlight colors
pub mod scene_colors {
    use super::*;

    pub const CLEAR: Color = Color::srgb(0.12, 0.13, 0.15);
    pub const SELECTION: Color = Color::srgb(1.0, 0.6, 0.1);
}
