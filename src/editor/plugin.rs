use avian3d::prelude::PhysicsPlugins;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use super::camera::EditorCameraPlugin;
use super::state::StatusLine;
use crate::commands::CommandsPlugin;
use crate::persistence::PersistencePlugin;
use crate::physics::PhysicsBindingPlugin;
use crate::placement::PlacementPlugin;
use crate::resolver::ResolverPlugin;
use crate::scene::ScenePlugin;
use crate::selection::SelectionPlugin;
use crate::ui::{SettingsPlugin, UiPlugin};

/// Main plugin that bundles the whole scene builder
pub struct SceneBuilderPlugin;

impl Plugin for SceneBuilderPlugin {
    fn build(&self, app: &mut App) {
        app
            // Third-party plugins
            .add_plugins(EguiPlugin::default())
            .add_plugins(PhysicsPlugins::default())
            // Settings first: physics, persistence and the resolver read them while building
            .add_plugins(SettingsPlugin)
            .init_resource::<StatusLine>()
            // Core
            .add_plugins(ScenePlugin)
            .add_plugins(ResolverPlugin)
            .add_plugins(PhysicsBindingPlugin)
            .add_plugins(CommandsPlugin)
            .add_plugins(PlacementPlugin)
            .add_plugins(SelectionPlugin)
            .add_plugins(PersistencePlugin)
            .add_plugins(EditorCameraPlugin)
            // UI
            .add_plugins(UiPlugin);
    }
}
