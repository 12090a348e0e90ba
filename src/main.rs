//! Standalone scene builder.

use bevy::prelude::*;
use bevy_scene_builder::SceneBuilderPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Scene Builder".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(SceneBuilderPlugin)
        .run();
}
