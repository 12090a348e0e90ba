mod scaling;
mod selection;
mod state;

pub use scaling::{current_step, nearest_step, scale_for_slider, scale_steps, step_factor};
pub use selection::*;
pub use state::{ClickOutcome, ClickTracker, Drag, DragState, Selection};

use bevy::prelude::*;

pub struct SelectionPlugin;

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SelectionSystemPlugin);
    }
}
