//! Binds placed objects to rigid bodies.
//!
//! Bodies are separate entities from the objects they simulate. The
//! [`PhysicsBodies`] table links the two; objects only carry a [`PhysicsBodyRef`].
//! While a body is [`BodyMode::Dynamic`] it drives its object; while it is
//! [`BodyMode::Kinematic`] the object drives it.

mod bodies;

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy::transform::TransformSystems;

pub use bodies::{
    body_pose_from_object, collider_half_extents, object_pose_from_body, synced_pose, BodyMode,
    BodyRecord, PhysicsBodies,
};

use crate::constants::physics::{ANGULAR_DAMPING, GROUND_SIZE, GROUND_THICKNESS, LINEAR_DAMPING};
use crate::ui::Settings;

/// Body entity simulating a placed object
#[derive(Component, Clone, Copy, Debug)]
pub struct SimulatedBody {
    pub owner: Entity,
}

/// Object → body back-reference
#[derive(Component, Clone, Copy, Debug)]
pub struct PhysicsBodyRef(pub Entity);

/// The static floor slab
#[derive(Component)]
pub struct GroundBody;

pub struct PhysicsBindingPlugin;

impl Plugin for PhysicsBindingPlugin {
    fn build(&self, app: &mut App) {
        let debug = app
            .world()
            .get_resource::<Settings>()
            .is_some_and(|settings| settings.show_physics_debug);
        if debug {
            app.add_plugins(PhysicsDebugPlugin);
        }

        app.init_resource::<PhysicsBodies>()
            .add_systems(Startup, spawn_ground)
            .add_systems(
                PostUpdate,
                sync_objects_from_bodies.before(TransformSystems::Propagate),
            );
    }
}

fn spawn_ground(mut commands: Commands) {
    commands.spawn((
        Name::new("Ground"),
        GroundBody,
        RigidBody::Static,
        Collider::cuboid(GROUND_SIZE, GROUND_THICKNESS, GROUND_SIZE),
        Transform::from_xyz(0.0, -GROUND_THICKNESS * 0.5, 0.0),
    ));
}

/// Create a dynamic body for `owner`, sized to its world bounds.
///
/// Attaching twice is a logic error; release builds recover by replacing the old body.
pub fn attach_body(
    commands: &mut Commands,
    bodies: &mut PhysicsBodies,
    owner: Entity,
    transform: &Transform,
    size: Vec3,
) -> Entity {
    if bodies.get(owner).is_some() {
        debug_assert!(false, "object {owner} already has a physics body");
        detach_body(commands, bodies, owner);
    }

    let half_extents = collider_half_extents(size);
    let body = commands
        .spawn((
            Name::new("Body"),
            SimulatedBody { owner },
            RigidBody::Dynamic,
            Collider::cuboid(half_extents.x * 2.0, half_extents.y * 2.0, half_extents.z * 2.0),
            LinearDamping(LINEAR_DAMPING),
            AngularDamping(ANGULAR_DAMPING),
            body_pose_from_object(transform, half_extents),
        ))
        .id();

    bodies.register(
        owner,
        BodyRecord {
            body,
            mode: BodyMode::Dynamic,
            half_extents,
        },
    );
    if let Ok(mut entity) = commands.get_entity(owner) {
        entity.insert(PhysicsBodyRef(body));
    }
    body
}

/// Remove `owner`'s body. Safe to call when there is none.
pub fn detach_body(commands: &mut Commands, bodies: &mut PhysicsBodies, owner: Entity) -> bool {
    let Some(record) = bodies.remove(owner) else {
        return false;
    };
    if let Ok(mut body) = commands.get_entity(record.body) {
        body.despawn();
    }
    if let Ok(mut entity) = commands.get_entity(owner) {
        entity.remove::<PhysicsBodyRef>();
    }
    true
}

/// Switch between user-driven (kinematic) and simulated (dynamic) motion
pub fn set_manipulable(commands: &mut Commands, bodies: &mut PhysicsBodies, owner: Entity, manipulable: bool) {
    let mode = if manipulable {
        BodyMode::Kinematic
    } else {
        BodyMode::Dynamic
    };
    if !bodies.set_mode(owner, mode) {
        return;
    }
    let Some(record) = bodies.get(owner) else {
        return;
    };
    let Ok(mut body) = commands.get_entity(record.body) else {
        return;
    };
    match mode {
        BodyMode::Kinematic => {
            body.insert((RigidBody::Kinematic, LinearVelocity::ZERO, AngularVelocity::ZERO, SleepingDisabled));
        }
        BodyMode::Dynamic => {
            body.insert((RigidBody::Dynamic, LinearVelocity::ZERO, AngularVelocity::ZERO))
                .remove::<(Sleeping, SleepingDisabled)>();
        }
    }
}

/// Move `owner`'s body to match the object and stop it
pub fn place_body(commands: &mut Commands, bodies: &PhysicsBodies, owner: Entity, transform: &Transform) {
    let Some(record) = bodies.get(owner) else {
        return;
    };
    if let Ok(mut body) = commands.get_entity(record.body) {
        body.insert((
            body_pose_from_object(transform, record.half_extents),
            LinearVelocity::ZERO,
            AngularVelocity::ZERO,
        ));
    }
}

/// Refit `owner`'s collider to a new world size
pub fn resize_body(
    commands: &mut Commands,
    bodies: &mut PhysicsBodies,
    owner: Entity,
    transform: &Transform,
    size: Vec3,
) {
    let Some(record) = bodies.get(owner).copied() else {
        return;
    };
    let half_extents = collider_half_extents(size);
    bodies.set_half_extents(owner, half_extents);
    if let Ok(mut body) = commands.get_entity(record.body) {
        body.insert((
            Collider::cuboid(half_extents.x * 2.0, half_extents.y * 2.0, half_extents.z * 2.0),
            body_pose_from_object(transform, half_extents),
            LinearVelocity::ZERO,
            AngularVelocity::ZERO,
        ));
    }
}

/// Copy simulated poses onto their objects. Kinematic bodies are skipped.
pub(crate) fn sync_objects_from_bodies(
    bodies: Res<PhysicsBodies>,
    body_transforms: Query<&Transform, With<SimulatedBody>>,
    mut objects: Query<&mut Transform, Without<SimulatedBody>>,
) {
    for (owner, record) in bodies.iter() {
        let Ok(body) = body_transforms.get(record.body) else {
            continue;
        };
        let Ok(mut object) = objects.get_mut(owner) else {
            continue;
        };
        if let Some(pose) = synced_pose(record, body, &object) {
            if pose != *object {
                *object = pose;
            }
        }
    }
}
