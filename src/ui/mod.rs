mod command_bar;
mod palette;
mod panels;
mod properties;
pub mod settings;
pub mod theme;

pub use command_bar::*;
pub use palette::*;
pub use panels::*;
pub use properties::*;
pub use settings::{Settings, SettingsPlugin, SettingsWindowState};
pub use theme::ThemePlugin;

use bevy::prelude::*;

/// Egui panels. Settings are added separately by the builder plugin since other
/// plugins read them while building.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ThemePlugin)
            .add_plugins(CommandBarPlugin)
            .add_plugins(PanelsPlugin)
            .add_plugins(PalettePlugin)
            .add_plugins(PropertiesPlugin);
    }
}
