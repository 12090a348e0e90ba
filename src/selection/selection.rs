use avian3d::prelude::*;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::scaling::scale_for_slider;
use super::state::{ClickOutcome, ClickTracker, Drag, DragState, Selection};
use crate::catalog::MaterialPreset;
use crate::commands::remove_object;
use crate::constants::placement::ROTATION_STEP_DEGREES;
use crate::constants::scene_colors::SELECTION;
use crate::constants::selection::PICK_DISTANCE;
use crate::editor::{EditorCamera, StatusLine};
use crate::persistence::SceneMutated;
use crate::physics::{place_body, resize_body, set_manipulable, GroundBody, PhysicsBodies};
use crate::placement::{handle_preview_input, GhostPlacement};
use crate::scene::{set_light_intensity, Appearance, BaseDimensions, PlacedObject, SavedTransform};
use crate::utils::{cursor_ray, pointer_over_ui, should_process_keys};

/// A change to the selected object, from the keyboard or the property panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyEdit {
    /// Raw slider value, snapped to the nearest permitted step
    Scale(f32),
    /// Yaw increment in radians
    Rotate(f32),
    Color(Color),
    Material(MaterialPreset),
    LightIntensity(f32),
    Delete,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct EditSelected(pub PropertyEdit);

pub struct SelectionSystemPlugin;

impl Plugin for SelectionSystemPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Selection>()
            .init_resource::<PointerRay>()
            .init_resource::<ClickTracker>()
            .init_resource::<DragState>()
            .add_message::<EditSelected>()
            .add_systems(
                Update,
                (
                    update_pointer_ray,
                    clear_stale_selection,
                    handle_pointer_press,
                    update_drag,
                    release_drag,
                    handle_selection_keys,
                    apply_property_edits,
                )
                    .chain()
                    .before(handle_preview_input),
            )
            .add_systems(Update, draw_selection_outline);
    }
}

fn clear_stale_selection(
    mut selection: ResMut<Selection>,
    mut drag: ResMut<DragState>,
    objects: Query<(), With<PlacedObject>>,
) {
    if let Some(entity) = selection.entity {
        if !objects.contains(entity) {
            selection.clear();
        }
    }
    if drag.active.is_some_and(|active| !objects.contains(active.entity)) {
        drag.active = None;
    }
}

/// World-space ray under the cursor, refreshed once per frame
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PointerRay(pub Option<Ray3d>);

fn update_pointer_ray(
    mut pointer: ResMut<PointerRay>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<EditorCamera>>,
) {
    let ray = match (window_query.single(), camera_query.single()) {
        (Ok(window), Ok((camera, camera_transform))) => cursor_ray(window, camera, camera_transform),
        _ => None,
    };
    pointer.0 = ray;
}

/// Hand `entity` to the pointer: its body stops simulating until release
fn begin_drag(
    commands: &mut Commands,
    bodies: &mut PhysicsBodies,
    drag: &mut DragState,
    entity: Entity,
    object: Vec3,
    grab_point: Vec3,
) {
    set_manipulable(commands, bodies, entity, true);
    drag.active = Some(Drag::start(entity, object, grab_point));
}

/// Click an object to select and start dragging it; click it again quickly to open
/// its properties. Clicking empty space clears the selection.
fn handle_pointer_press(
    mouse: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    ghost: Res<GhostPlacement>,
    pointer: Res<PointerRay>,
    spatial_query: SpatialQuery,
    ground: Query<Entity, With<GroundBody>>,
    objects: Query<&Transform, With<PlacedObject>>,
    mut bodies: ResMut<PhysicsBodies>,
    mut selection: ResMut<Selection>,
    mut clicks: ResMut<ClickTracker>,
    mut drag: ResMut<DragState>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    if !mouse.just_pressed(MouseButton::Left) || ghost.is_previewing() || pointer_over_ui(&mut contexts) {
        return;
    }
    let Some(ray) = pointer.0 else {
        return;
    };

    let filter = SpatialQueryFilter::default().with_excluded_entities(ground.iter());
    let picked = spatial_query
        .cast_ray(ray.origin, ray.direction, PICK_DISTANCE, true, &filter)
        .and_then(|hit| {
            let owner = bodies.owner_of(hit.entity)?;
            Some((owner, ray.origin + *ray.direction * hit.distance))
        });

    let Some((entity, point)) = picked else {
        selection.clear();
        clicks.reset();
        return;
    };
    let Ok(transform) = objects.get(entity) else {
        return;
    };

    selection.select(entity);
    match clicks.register(entity, time.elapsed_secs_f64()) {
        ClickOutcome::BeginDrag => {
            begin_drag(&mut commands, &mut bodies, &mut drag, entity, transform.translation, point);
        }
        ClickOutcome::OpenProperties => {
            selection.properties_open = true;
        }
    }
}

fn update_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    drag: Res<DragState>,
    bodies: Res<PhysicsBodies>,
    pointer: Res<PointerRay>,
    mut objects: Query<&mut Transform, With<PlacedObject>>,
    mut commands: Commands,
) {
    let Some(active) = drag.active else {
        return;
    };
    if !mouse.pressed(MouseButton::Left) {
        return;
    }
    let Some(target) = pointer.0.and_then(|ray| active.target(ray.origin, *ray.direction)) else {
        return;
    };
    let Ok(mut transform) = objects.get_mut(active.entity) else {
        return;
    };
    if transform.translation != target {
        transform.translation = target;
        place_body(&mut commands, &bodies, active.entity, &transform);
    }
}

/// On pointer-up the body goes back to simulation and the position becomes the saved one
fn release_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    mut drag: ResMut<DragState>,
    mut bodies: ResMut<PhysicsBodies>,
    mut objects: Query<(&Transform, &mut SavedTransform)>,
    mut mutated: MessageWriter<SceneMutated>,
    mut commands: Commands,
) {
    if mouse.pressed(MouseButton::Left) {
        return;
    }
    let Some(active) = drag.active.take() else {
        return;
    };
    set_manipulable(&mut commands, &mut bodies, active.entity, false);

    let Ok((transform, mut saved)) = objects.get_mut(active.entity) else {
        return;
    };
    let released = SavedTransform::capture(transform);
    if *saved != released {
        *saved = released;
        mutated.write(SceneMutated);
    }
}

fn handle_selection_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    ghost: Res<GhostPlacement>,
    mut selection: ResMut<Selection>,
    mut edits: MessageWriter<EditSelected>,
    mut contexts: EguiContexts,
) {
    if selection.entity.is_none() || ghost.is_previewing() || !should_process_keys(&mut contexts) {
        return;
    }
    let step = ROTATION_STEP_DEGREES.to_radians();
    if keyboard.just_pressed(KeyCode::KeyQ) {
        edits.write(EditSelected(PropertyEdit::Rotate(step)));
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        edits.write(EditSelected(PropertyEdit::Rotate(-step)));
    }
    if keyboard.any_just_pressed([KeyCode::Delete, KeyCode::Backspace]) {
        edits.write(EditSelected(PropertyEdit::Delete));
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        selection.clear();
    }
}

fn apply_property_edits(
    mut edits: MessageReader<EditSelected>,
    mut selection: ResMut<Selection>,
    mut drag: ResMut<DragState>,
    mut bodies: ResMut<PhysicsBodies>,
    mut objects: Query<(
        &PlacedObject,
        &BaseDimensions,
        &mut Transform,
        &mut SavedTransform,
        &mut Appearance,
    )>,
    mut status: ResMut<StatusLine>,
    mut mutated: MessageWriter<SceneMutated>,
    mut commands: Commands,
) {
    for EditSelected(edit) in edits.read() {
        let Some(entity) = selection.entity else {
            continue;
        };
        let Ok((object, base, mut transform, mut saved, mut appearance)) = objects.get_mut(entity) else {
            continue;
        };

        match *edit {
            PropertyEdit::Delete => {
                let keyword = object.keyword.clone();
                if drag.active.is_some_and(|active| active.entity == entity) {
                    drag.active = None;
                }
                remove_object(&mut commands, &mut bodies, &mut selection, entity);
                info!("Deleted {}", keyword);
                status.info(format!("Deleted {keyword}"));
            }
            PropertyEdit::Scale(raw) => {
                transform.scale = scale_for_slider(object.class, base, raw);
                *saved = SavedTransform::capture(&transform);
                resize_body(&mut commands, &mut bodies, entity, &transform, base.world_size(transform.scale));
            }
            PropertyEdit::Rotate(radians) => {
                transform.rotation = Quat::from_rotation_y(radians) * transform.rotation;
                *saved = SavedTransform::capture(&transform);
                place_body(&mut commands, &bodies, entity, &transform);
            }
            PropertyEdit::Color(color) => appearance.color = Some(color),
            PropertyEdit::Material(preset) => appearance.material = Some(preset),
            PropertyEdit::LightIntensity(intensity) => set_light_intensity(&mut appearance, intensity),
        }
        mutated.write(SceneMutated);
    }
}

fn draw_selection_outline(
    mut gizmos: Gizmos,
    selection: Res<Selection>,
    objects: Query<(&Transform, &BaseDimensions), With<PlacedObject>>,
) {
    let Some((transform, base)) = selection.entity.and_then(|entity| objects.get(entity).ok()) else {
        return;
    };
    let half = base.world_size(transform.scale) * 0.5 + Vec3::splat(0.02);
    let center = transform.translation + transform.rotation * Vec3::new(0.0, half.y, 0.0);
    let corner = |x: f32, y: f32, z: f32| center + transform.rotation * (half * Vec3::new(x, y, z));

    for y in [-1.0, 1.0] {
        gizmos.line(corner(-1.0, y, -1.0), corner(1.0, y, -1.0), SELECTION);
        gizmos.line(corner(1.0, y, -1.0), corner(1.0, y, 1.0), SELECTION);
        gizmos.line(corner(1.0, y, 1.0), corner(-1.0, y, 1.0), SELECTION);
        gizmos.line(corner(-1.0, y, 1.0), corner(-1.0, y, -1.0), SELECTION);
    }
    for (x, z) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        gizmos.line(corner(x, -1.0, z), corner(x, 1.0, z), SELECTION);
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::catalog::ObjectClass;
    use crate::physics::{attach_body, sync_objects_from_bodies, BodyMode, SimulatedBody};
    use crate::resolver::SourceType;
    use crate::scene::ObjectId;

    fn drag_world() -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<PhysicsBodies>();
        world.init_resource::<DragState>();
        world.init_resource::<PointerRay>();
        world.init_resource::<ButtonInput<MouseButton>>();
        world.init_resource::<Messages<SceneMutated>>();

        let transform = Transform::IDENTITY;
        let object = world
            .spawn((
                PlacedObject {
                    id: ObjectId(1),
                    keyword: "chair".into(),
                    source: SourceType::Procedural,
                    class: ObjectClass::of("chair"),
                },
                BaseDimensions {
                    size: Vec3::ONE,
                    root_scale: Vec3::ONE,
                },
                SavedTransform::capture(&transform),
                transform,
            ))
            .id();
        world
            .run_system_once(move |mut commands: Commands, mut bodies: ResMut<PhysicsBodies>| {
                attach_body(&mut commands, &mut bodies, object, &transform, Vec3::ONE);
            })
            .expect("attach body");
        (world, object)
    }

    fn body_kind(world: &mut World, object: Entity) -> (Option<BodyMode>, Option<RigidBody>) {
        let bodies = world.resource::<PhysicsBodies>();
        let mode = bodies.mode(object);
        let body = bodies.get(object).map(|record| record.body);
        let rigid = body.and_then(|body| world.get::<RigidBody>(body).copied());
        (mode, rigid)
    }

    fn mutations(world: &mut World) -> usize {
        world.resource_mut::<Messages<SceneMutated>>().drain().count()
    }

    /// Select, drag, release: dynamic → kinematic → dynamic, and the saved transform
    /// changes exactly once, at release.
    #[test]
    fn drag_release_updates_saved_once() {
        let (mut world, object) = drag_world();
        assert_eq!(body_kind(&mut world, object), (Some(BodyMode::Dynamic), Some(RigidBody::Dynamic)));

        world
            .run_system_once(
                move |mut commands: Commands, mut bodies: ResMut<PhysicsBodies>, mut drag: ResMut<DragState>| {
                    begin_drag(&mut commands, &mut bodies, &mut drag, object, Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0));
                },
            )
            .expect("begin drag");
        assert_eq!(body_kind(&mut world, object), (Some(BodyMode::Kinematic), Some(RigidBody::Kinematic)));

        world.resource_mut::<ButtonInput<MouseButton>>().press(MouseButton::Left);
        for x in [1.0, 2.0, 3.0] {
            world.resource_mut::<PointerRay>().0 = Some(Ray3d::new(Vec3::new(x, 10.0, 0.0), Dir3::NEG_Y));
            world.run_system_once(update_drag).expect("update drag");
            world.run_system_once(release_drag).expect("release drag");
            assert_eq!(world.get::<SavedTransform>(object).map(|s| s.translation), Some(Vec3::ZERO));
        }
        let dragged = world.get::<Transform>(object).copied();
        assert_eq!(dragged.map(|t| t.translation), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(mutations(&mut world), 0);

        world.resource_mut::<ButtonInput<MouseButton>>().release(MouseButton::Left);
        world.run_system_once(release_drag).expect("release drag");
        world.run_system_once(release_drag).expect("second release is a no-op");

        assert_eq!(body_kind(&mut world, object), (Some(BodyMode::Dynamic), Some(RigidBody::Dynamic)));
        assert_eq!(mutations(&mut world), 1);
        let released = SavedTransform::capture(&dragged.unwrap_or_default());
        assert_eq!(world.get::<SavedTransform>(object).copied(), Some(released));

        // The body settles somewhere else; the object follows but the snapshot stays
        let body = world.resource::<PhysicsBodies>().get(object).map(|record| record.body);
        let Some(body) = body else { panic!("body missing") };
        assert!(world.get::<SimulatedBody>(body).is_some());
        if let Some(mut pose) = world.get_mut::<Transform>(body) {
            pose.translation = Vec3::new(3.2, 0.5, 0.4);
        }
        world.run_system_once(sync_objects_from_bodies).expect("sync");

        let settled = world.get::<Transform>(object).map(|t| t.translation);
        assert_ne!(settled, Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(world.get::<SavedTransform>(object).copied(), Some(released));
    }

    #[test]
    fn drag_ignores_pointer_once_button_is_up() {
        let (mut world, object) = drag_world();
        world
            .run_system_once(
                move |mut commands: Commands, mut bodies: ResMut<PhysicsBodies>, mut drag: ResMut<DragState>| {
                    begin_drag(&mut commands, &mut bodies, &mut drag, object, Vec3::ZERO, Vec3::ZERO);
                },
            )
            .expect("begin drag");
        world.resource_mut::<PointerRay>().0 = Some(Ray3d::new(Vec3::new(5.0, 10.0, 0.0), Dir3::NEG_Y));
        world.run_system_once(update_drag).expect("update drag");
        assert_eq!(world.get::<Transform>(object).map(|t| t.translation), Some(Vec3::ZERO));
    }
}
