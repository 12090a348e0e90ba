use bevy::prelude::*;

use super::{LightAnchor, LightRef, ObjectLight};
use crate::constants::lights::LUMENS_PER_UNIT;
use crate::resolver::{Geometry, ModelTemplate};

/// Root of an instantiated model. The root's origin is the bottom center of the model.
#[derive(Component, Clone, Copy, Debug)]
pub struct ModelRoot {
    /// Child holding the geometry offset and import scale
    pub geometry: Entity,
}

/// Marker for the offset/scale child under a [`ModelRoot`]
#[derive(Component)]
pub struct ModelGeometry;

/// Marks a mesh whose material handle belongs to this instance alone
#[derive(Component)]
pub struct InstanceMaterial;

/// Instantiate a template: every part gets its own mesh and material handle.
pub fn spawn_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    asset_server: &AssetServer,
    template: &ModelTemplate,
    transform: Transform,
) -> Entity {
    let scale = template.scale;
    let bounds = template.bounds;
    let (offset, anchor) = if bounds.is_empty() {
        (Vec3::ZERO, Vec3::Y)
    } else {
        let center = bounds.center();
        (
            -Vec3::new(center.x, bounds.min.y, center.z) * scale,
            Vec3::new(center.x, bounds.max.y * 0.9, center.z),
        )
    };

    let geometry = commands
        .spawn((
            ModelGeometry,
            Transform::from_translation(offset).with_scale(Vec3::splat(scale)),
            Visibility::default(),
        ))
        .id();

    match &template.geometry {
        Geometry::Blueprint(blueprint) => {
            for part in &blueprint.parts {
                let material = materials.add(StandardMaterial {
                    base_color: part.color,
                    perceptual_roughness: 0.8,
                    ..default()
                });
                commands.spawn((
                    Mesh3d(meshes.add(part.shape.mesh())),
                    MeshMaterial3d(material),
                    part.transform,
                    InstanceMaterial,
                    ChildOf(geometry),
                ));
            }
        }
        Geometry::Gltf { path } => {
            commands.entity(geometry).insert(SceneRoot(
                asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone())),
            ));
        }
    }

    let root = commands
        .spawn((
            Name::new(template.keyword.clone()),
            ModelRoot { geometry },
            LightAnchor(anchor),
            transform,
            Visibility::default(),
        ))
        .add_child(geometry)
        .id();

    if let Some(emitter) = template.light() {
        let light = commands
            .spawn((
                ObjectLight,
                PointLight {
                    color: emitter.color,
                    intensity: emitter.intensity * LUMENS_PER_UNIT,
                    range: emitter.range,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(emitter.offset),
                ChildOf(geometry),
            ))
            .id();
        commands.entity(root).insert(LightRef(light));
    }

    root
}

/// glTF scenes share materials across instances; give each instance its own copy as
/// its meshes appear.
pub(super) fn own_instance_materials(
    mut commands: Commands,
    new_meshes: Query<
        (Entity, &MeshMaterial3d<StandardMaterial>),
        (Added<MeshMaterial3d<StandardMaterial>>, Without<InstanceMaterial>),
    >,
    parents: Query<&ChildOf>,
    roots: Query<(), With<ModelRoot>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, material) in &new_meshes {
        if !parents.iter_ancestors(entity).any(|a| roots.contains(a)) {
            continue;
        }
        let Some(shared) = materials.get(&material.0).cloned() else {
            continue;
        };
        let owned = materials.add(shared);
        commands
            .entity(entity)
            .insert((MeshMaterial3d(owned), InstanceMaterial));
    }
}
