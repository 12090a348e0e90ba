//! Ghost placement: a translucent preview that follows the pointer until the user
//! confirms or cancels it.

mod ghost;
mod materials;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

pub use ghost::{arrangement_offsets, Began, GhostPlacement, GhostState, Preview, QueuedPlacement};
pub use materials::{GhostMaterials, Ghosted};

use crate::catalog::ObjectClass;
use crate::commands::PlaceObjects;
use crate::constants::placement::ROTATION_STEP_DEGREES;
use crate::editor::{EditorCamera, StatusLine};
use crate::persistence::SceneMutated;
use crate::physics::{attach_body, PhysicsBodies};
use crate::resolver::{ModelResolved, ResolveRequest, ResolveTicket, SourceType};
use crate::scene::{spawn_model, Appearance, BaseDimensions, InstanceMaterial, ObjectIds, PlacedObject, SavedTransform};
use crate::selection::Selection;
use crate::ui::Settings;
use crate::utils::{collect_descendants, cursor_ray, intersect_horizontal_plane, pointer_over_ui, should_process_keys, snap_to_grid};

/// Marker for the preview entity
#[derive(Component)]
pub struct GhostObject;

#[derive(Message, Clone, Debug)]
pub struct ConfirmPreview;

#[derive(Message, Clone, Debug)]
pub struct CancelPreview;

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GhostPlacement>()
            .init_resource::<GhostMaterials>()
            .add_message::<ConfirmPreview>()
            .add_message::<CancelPreview>()
            .add_systems(
                Update,
                (
                    start_placements,
                    receive_preview_models,
                    ghost_preview_meshes,
                    follow_pointer,
                    handle_preview_input,
                    sync_ghost_transform,
                    cancel_preview,
                    confirm_preview,
                )
                    .chain(),
            );
    }
}

/// Turn a preview entity into a placed object: record its base size and saved
/// transform, apply cosmetics and give it a body.
pub fn commit_object(
    commands: &mut Commands,
    ids: &mut ObjectIds,
    bodies: &mut PhysicsBodies,
    entity: Entity,
    keyword: &str,
    source: SourceType,
    transform: Transform,
    base: BaseDimensions,
    appearance: Appearance,
) {
    commands.entity(entity).insert((
        PlacedObject {
            id: ids.allocate(),
            keyword: keyword.to_string(),
            source,
            class: ObjectClass::of(keyword),
        },
        base,
        SavedTransform::capture(&transform),
        appearance,
        transform,
    ));
    attach_body(commands, bodies, entity, &transform, base.world_size(transform.scale));
}

fn begin_next(ghost: &mut GhostPlacement, resolve: &mut MessageWriter<ResolveRequest>) {
    let Some(next) = ghost.next_queued() else {
        return;
    };
    let keyword = next.request.keyword.clone();
    let began = ghost.begin(next.request, next.offset);
    resolve.write(ResolveRequest {
        ticket: ResolveTicket::Preview(began.generation),
        keyword,
    });
}

fn discard_preview(
    commands: &mut Commands,
    ghost_materials: &mut GhostMaterials,
    materials: &mut Assets<StandardMaterial>,
    preview: Preview,
) {
    ghost_materials.restore_all(materials);
    if let Some(entity) = preview.entity {
        commands.entity(entity).despawn();
    }
}

fn start_placements(
    mut events: MessageReader<PlaceObjects>,
    mut ghost: ResMut<GhostPlacement>,
    mut ghost_materials: ResMut<GhostMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut resolve: MessageWriter<ResolveRequest>,
    mut commands: Commands,
) {
    for PlaceObjects(requests) in events.read() {
        if requests.is_empty() {
            continue;
        }
        if let Some(previous) = ghost.cancel() {
            debug!("Replacing preview of {}", previous.request.keyword);
            discard_preview(&mut commands, &mut ghost_materials, &mut materials, previous);
        }
        ghost.enqueue(requests.clone());
        begin_next(&mut ghost, &mut resolve);
    }
}

fn receive_preview_models(
    mut events: MessageReader<ModelResolved>,
    mut ghost: ResMut<GhostPlacement>,
    mut status: ResMut<StatusLine>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    for ModelResolved { ticket, resolved } in events.read() {
        let ResolveTicket::Preview(generation) = *ticket else {
            continue;
        };
        if !ghost.accepts(generation) {
            debug!("Discarding stale resolution of {}", resolved.template.keyword);
            continue;
        }
        let Some(transform) = ghost.preview().map(Preview::ghost_transform) else {
            continue;
        };

        let entity = spawn_model(
            &mut commands,
            &mut meshes,
            &mut materials,
            &asset_server,
            &resolved.template,
            transform,
        );
        commands.entity(entity).insert(GhostObject);
        ghost.attach(generation, entity, resolved.source, resolved.template.size());

        let keyword = &resolved.template.keyword;
        match resolved.source {
            SourceType::Primitive => status.warn(format!("No model found for \"{keyword}\", using a placeholder")),
            source => status.info(format!(
                "Placing {keyword} ({}): click or Enter to confirm, R to rotate, Esc to cancel",
                source.label()
            )),
        }
    }
}

fn ghost_preview_meshes(
    ghost: Res<GhostPlacement>,
    children: Query<&Children>,
    meshes: Query<&MeshMaterial3d<StandardMaterial>, (With<InstanceMaterial>, Without<Ghosted>)>,
    mut ghost_materials: ResMut<GhostMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
) {
    let Some(root) = ghost.preview().and_then(|preview| preview.entity) else {
        return;
    };
    for entity in collect_descendants(root, &children) {
        if let Ok(material) = meshes.get(entity) {
            ghost_materials.ghost(material.id(), &mut materials);
            commands.entity(entity).insert(Ghosted);
        }
    }
}

fn follow_pointer(
    mut ghost: ResMut<GhostPlacement>,
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
    mut contexts: EguiContexts,
) {
    if !ghost.is_previewing() || pointer_over_ui(&mut contexts) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Some(ray) = cursor_ray(window, camera, camera_transform) else {
        return;
    };
    let Some(mut point) = intersect_horizontal_plane(ray.origin, *ray.direction, 0.0) else {
        return;
    };
    if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        point = snap_to_grid(point, settings.grid_snap);
    }
    ghost.move_to(point);
}

/// R rotates, Escape cancels, Enter or a viewport click confirms
pub fn handle_preview_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut ghost: ResMut<GhostPlacement>,
    mut confirm: MessageWriter<ConfirmPreview>,
    mut cancel: MessageWriter<CancelPreview>,
    mut contexts: EguiContexts,
) {
    if !ghost.is_previewing() {
        return;
    }

    let keys = should_process_keys(&mut contexts);
    if keys && keyboard.just_pressed(KeyCode::KeyR) {
        ghost.rotate(ROTATION_STEP_DEGREES.to_radians());
    }
    if keys && keyboard.just_pressed(KeyCode::Escape) {
        cancel.write(CancelPreview);
        return;
    }

    let clicked = mouse.just_pressed(MouseButton::Left) && !pointer_over_ui(&mut contexts);
    let entered = keys && keyboard.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter]);
    if clicked || entered {
        confirm.write(ConfirmPreview);
    }
}

fn sync_ghost_transform(ghost: Res<GhostPlacement>, mut transforms: Query<&mut Transform, With<GhostObject>>) {
    let Some(preview) = ghost.preview() else {
        return;
    };
    let Some(Ok(mut transform)) = preview.entity.map(|entity| transforms.get_mut(entity)) else {
        return;
    };
    let target = preview.ghost_transform();
    if *transform != target {
        *transform = target;
    }
}

fn cancel_preview(
    mut events: MessageReader<CancelPreview>,
    mut ghost: ResMut<GhostPlacement>,
    mut ghost_materials: ResMut<GhostMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut status: ResMut<StatusLine>,
    mut commands: Commands,
) {
    if events.read().count() == 0 {
        return;
    }
    if let Some(preview) = ghost.cancel() {
        info!("Cancelled placement of {}", preview.request.keyword);
        discard_preview(&mut commands, &mut ghost_materials, &mut materials, preview);
        status.info("Placement cancelled");
    }
}

fn confirm_preview(
    mut events: MessageReader<ConfirmPreview>,
    mut ghost: ResMut<GhostPlacement>,
    mut ghost_materials: ResMut<GhostMaterials>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut ids: ResMut<ObjectIds>,
    mut bodies: ResMut<PhysicsBodies>,
    mut selection: ResMut<Selection>,
    mut status: ResMut<StatusLine>,
    mut mutated: MessageWriter<SceneMutated>,
    mut resolve: MessageWriter<ResolveRequest>,
    children: Query<&Children>,
    ghosted: Query<(), With<Ghosted>>,
    mut commands: Commands,
) {
    if events.read().count() == 0 {
        return;
    }
    let Some(preview) = ghost.confirm() else {
        debug!("Confirm ignored: no preview ready");
        return;
    };
    let Some(entity) = preview.entity else {
        return;
    };

    ghost_materials.restore_all(&mut materials);
    for descendant in collect_descendants(entity, &children) {
        if ghosted.contains(descendant) {
            commands.entity(descendant).remove::<Ghosted>();
        }
    }
    commands.entity(entity).remove::<GhostObject>();

    let transform = preview.committed_transform();
    let source = preview.source.unwrap_or(SourceType::Primitive);
    let request = &preview.request;
    commit_object(
        &mut commands,
        &mut ids,
        &mut bodies,
        entity,
        &request.keyword,
        source,
        transform,
        BaseDimensions {
            size: preview.committed_size(),
            root_scale: transform.scale,
        },
        Appearance {
            color: request.color,
            material: request.material,
            light_intensity: None,
        },
    );
    selection.select(entity);
    mutated.write(SceneMutated);

    info!("Placed {} ({}) at {}", request.keyword, source.label(), transform.translation);
    status.info(format!("Placed {} ({})", request.keyword, source.label()));

    begin_next(&mut ghost, &mut resolve);
}

#[cfg(test)]
mod tests {
    use avian3d::prelude::RigidBody;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::commands::PlacementRequest;
    use crate::physics::BodyMode;

    fn placement_world() -> World {
        let mut world = World::new();
        world.init_resource::<GhostPlacement>();
        world.init_resource::<GhostMaterials>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<ObjectIds>();
        world.init_resource::<PhysicsBodies>();
        world.init_resource::<Selection>();
        world.init_resource::<StatusLine>();
        world.init_resource::<Messages<ConfirmPreview>>();
        world.init_resource::<Messages<SceneMutated>>();
        world.init_resource::<Messages<ResolveRequest>>();
        world
    }

    fn confirm(world: &mut World) {
        world.resource_mut::<Messages<ConfirmPreview>>().write(ConfirmPreview);
        world.run_system_once(confirm_preview).expect("confirm preview");
    }

    /// Preview "chair", move the pointer, confirm: the object gets a dynamic body and
    /// its saved transform is the last preview position.
    #[test]
    fn place_chair_with_preview() {
        let mut world = placement_world();
        let ghost_entity = world.spawn((GhostObject, Transform::IDENTITY)).id();
        {
            let mut ghost = world.resource_mut::<GhostPlacement>();
            let request = PlacementRequest::keyword("chair").expect("valid keyword");
            let began = ghost.begin(request, Vec3::ZERO);
            assert!(ghost.attach(began.generation, ghost_entity, SourceType::Procedural, Vec3::new(0.5, 0.9, 0.5)));
            ghost.move_to(Vec3::new(1.0, 0.0, 2.0));
            ghost.move_to(Vec3::new(2.5, 0.0, -1.0));
        }

        confirm(&mut world);

        assert_eq!(world.resource::<GhostPlacement>().state(), &GhostState::Idle);
        assert!(world.get::<GhostObject>(ghost_entity).is_none());
        let placed = world.get::<PlacedObject>(ghost_entity).expect("placed object");
        assert_eq!(placed.keyword, "chair");
        let saved = world.get::<SavedTransform>(ghost_entity).expect("saved transform");
        assert_eq!(saved.translation, Vec3::new(2.5, 0.0, -1.0));

        let bodies = world.resource::<PhysicsBodies>();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies.mode(ghost_entity), Some(BodyMode::Dynamic));
        let body = bodies.get(ghost_entity).map(|record| record.body).expect("body record");
        assert_eq!(world.get::<RigidBody>(body).copied(), Some(RigidBody::Dynamic));

        assert!(world.resource::<Selection>().is_selected(ghost_entity));
        assert_eq!(world.resource_mut::<Messages<SceneMutated>>().drain().count(), 1);
    }

    #[test]
    fn confirm_without_ready_preview_places_nothing() {
        let mut world = placement_world();
        confirm(&mut world);

        let request = PlacementRequest::keyword("lamp").expect("valid keyword");
        world.resource_mut::<GhostPlacement>().begin(request, Vec3::ZERO);
        confirm(&mut world);

        assert!(world.resource::<GhostPlacement>().is_previewing());
        assert!(world.resource::<PhysicsBodies>().is_empty());
        assert_eq!(world.resource_mut::<Messages<SceneMutated>>().drain().count(), 0);
    }
}
