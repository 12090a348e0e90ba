//! Placed objects and their render hierarchy.

mod appearance;
mod spawn;

use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use serde::{Deserialize, Serialize};

pub use appearance::{apply_appearance, set_light_intensity, Appearance, ObjectLight};
pub use spawn::{spawn_model, InstanceMaterial, ModelGeometry, ModelRoot};

use crate::catalog::ObjectClass;
use crate::constants::scene_colors;
use crate::resolver::SourceType;

/// Stable identifier assigned when an object is placed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Hands out object identifiers
#[derive(Resource, Default)]
pub struct ObjectIds {
    next: u64,
}

impl ObjectIds {
    pub fn allocate(&mut self) -> ObjectId {
        self.next += 1;
        ObjectId(self.next)
    }
}

/// A committed, user-visible object
#[derive(Component, Clone, Debug)]
pub struct PlacedObject {
    pub id: ObjectId,
    /// Canonical keyword, used for matching and deletion
    pub keyword: String,
    /// Provenance, for status reporting only
    pub source: SourceType,
    pub class: ObjectClass,
}

/// World size and root scale captured once at confirm time.
///
/// Step scaling is always expressed relative to these values.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct BaseDimensions {
    pub size: Vec3,
    pub root_scale: Vec3,
}

impl BaseDimensions {
    /// Root scale that gives the object `factor` times its base size per axis
    pub fn scale_for(&self, factor: Vec3) -> Vec3 {
        self.root_scale * factor
    }

    pub fn size_for(&self, factor: Vec3) -> Vec3 {
        self.size * factor
    }

    /// World size at a given root scale
    pub fn world_size(&self, scale: Vec3) -> Vec3 {
        self.size * scale / self.root_scale.max(Vec3::splat(f32::EPSILON))
    }
}

/// Last user-intended transform.
///
/// Written only by completed user actions (confirm, drag release, rotation, property
/// edits); persistence reads this instead of the live transform.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct SavedTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl SavedTransform {
    pub fn capture(transform: &Transform) -> Self {
        Self {
            translation: transform.translation,
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }

    pub fn to_transform(&self) -> Transform {
        Transform {
            translation: self.translation,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

/// Handle to the light attached to an object, if any
#[derive(Component, Clone, Copy, Debug)]
pub struct LightRef(pub Entity);

/// Where a light sits relative to its object's geometry, for objects without one yet
#[derive(Component, Clone, Copy, Debug)]
pub struct LightAnchor(pub Vec3);

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InfiniteGridPlugin)
            .init_resource::<ObjectIds>()
            .insert_resource(ClearColor(scene_colors::CLEAR))
            .add_systems(Startup, setup_scene)
            .add_systems(Update, (spawn::own_instance_materials, apply_appearance).chain());
    }
}

fn setup_scene(mut commands: Commands) {
    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        affects_lightmapped_meshes: true,
    });
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.5, 0.0)),
    ));
    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            x_axis_color: Color::srgb(0.8, 0.2, 0.2),
            z_axis_color: Color::srgb(0.2, 0.2, 0.8),
            minor_line_color: Color::srgba(0.3, 0.3, 0.3, 0.5),
            major_line_color: Color::srgba(0.5, 0.5, 0.5, 0.7),
            fadeout_distance: 120.0,
            dot_fadeout_strength: 0.1,
            scale: 1.0,
        },
        ..default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut ids = ObjectIds::default();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }

    #[test]
    fn base_dimensions_scale_from_capture() {
        let base = BaseDimensions {
            size: Vec3::new(2.0, 1.0, 1.0),
            root_scale: Vec3::splat(1.5),
        };
        assert_eq!(base.scale_for(Vec3::splat(2.0)), Vec3::splat(3.0));
        assert_eq!(base.size_for(Vec3::new(0.5, 1.0, 1.0)), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(base.world_size(Vec3::splat(3.0)), Vec3::new(4.0, 2.0, 2.0));
    }

    #[test]
    fn saved_transform_round_trips() {
        let transform = Transform::from_xyz(1.0, 0.0, -2.0)
            .with_rotation(Quat::from_rotation_y(0.4))
            .with_scale(Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(SavedTransform::capture(&transform).to_transform(), transform);
    }
}
