use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::scene::{BaseDimensions, SavedTransform};
use crate::selection::Selection;
use crate::ui::Settings;
use crate::utils::{pointer_over_ui, should_process_keys};

/// Distance moved per scroll unit
const DOLLY_SPEED: f32 = 1.0;
/// Minimum distance from target when framing objects
const MIN_FRAME_DISTANCE: f32 = 3.0;
/// Padding multiplier for framing (1.5 = 50% extra space around objects)
const FRAME_PADDING: f32 = 1.5;

pub struct EditorCameraPlugin;

impl Plugin for EditorCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_editor_camera).add_systems(
            Update,
            (camera_look, camera_movement, camera_dolly, frame_selected),
        );
    }
}

/// Marker component for the viewport camera
#[derive(Component)]
pub struct EditorCamera;

/// Fly camera state
#[derive(Component)]
pub struct FlyCamera {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: -0.6,
        }
    }
}

impl FlyCamera {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

fn spawn_editor_camera(mut commands: Commands) {
    let fly_cam = FlyCamera::default();
    let rotation = fly_cam.rotation();

    commands.spawn((
        EditorCamera,
        fly_cam,
        Camera3d::default(),
        Transform::from_translation(Vec3::new(0.0, 6.0, 10.0)).with_rotation(rotation),
    ));
}

/// Look around with right mouse button drag
fn camera_look(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    settings: Res<Settings>,
    mut query: Query<(&mut FlyCamera, &mut Transform), With<EditorCamera>>,
    mut contexts: EguiContexts,
) {
    if !mouse_button.pressed(MouseButton::Right) || pointer_over_ui(&mut contexts) {
        return;
    }

    let delta = mouse_motion.delta;
    if delta == Vec2::ZERO {
        return;
    }

    for (mut fly_cam, mut transform) in &mut query {
        fly_cam.yaw -= delta.x * settings.camera_sensitivity;
        fly_cam.pitch = (fly_cam.pitch - delta.y * settings.camera_sensitivity)
            .clamp(-std::f32::consts::FRAC_PI_2 + 0.1, std::f32::consts::FRAC_PI_2 - 0.1);
        transform.rotation = fly_cam.rotation();
    }
}

/// WASD movement while the right mouse button is held
fn camera_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    settings: Res<Settings>,
    mut query: Query<&mut Transform, With<EditorCamera>>,
    mut contexts: EguiContexts,
) {
    if !mouse_button.pressed(MouseButton::Right) || !should_process_keys(&mut contexts) {
        return;
    }

    for mut transform in &mut query {
        let forward = transform.forward().as_vec3();
        let right = transform.right().as_vec3();

        let mut velocity = Vec3::ZERO;
        if keyboard.pressed(KeyCode::KeyW) {
            velocity += forward;
        }
        if keyboard.pressed(KeyCode::KeyS) {
            velocity -= forward;
        }
        if keyboard.pressed(KeyCode::KeyA) {
            velocity -= right;
        }
        if keyboard.pressed(KeyCode::KeyD) {
            velocity += right;
        }
        if keyboard.pressed(KeyCode::Space) {
            velocity += Vec3::Y;
        }
        if keyboard.pressed(KeyCode::ControlLeft) {
            velocity -= Vec3::Y;
        }

        if velocity != Vec3::ZERO {
            let boost = if keyboard.pressed(KeyCode::ShiftLeft) { 3.0 } else { 1.0 };
            transform.translation += velocity.normalize() * settings.camera_speed * boost * time.delta_secs();
        }
    }
}

/// Scroll moves the camera along its view direction
fn camera_dolly(
    scroll: Res<AccumulatedMouseScroll>,
    mut query: Query<&mut Transform, With<EditorCamera>>,
    mut contexts: EguiContexts,
) {
    if scroll.delta.y == 0.0 || pointer_over_ui(&mut contexts) {
        return;
    }
    for mut transform in &mut query {
        let forward = transform.forward().as_vec3();
        transform.translation += forward * scroll.delta.y * DOLLY_SPEED;
    }
}

/// Frame the selected object when F is pressed
fn frame_selected(
    keyboard: Res<ButtonInput<KeyCode>>,
    selection: Res<Selection>,
    objects: Query<(&SavedTransform, &BaseDimensions), Without<EditorCamera>>,
    mut camera_query: Query<(&mut FlyCamera, &mut Transform, &Projection), With<EditorCamera>>,
    mut contexts: EguiContexts,
) {
    if !keyboard.just_pressed(KeyCode::KeyF) || !should_process_keys(&mut contexts) {
        return;
    }
    let Some((saved, base)) = selection.entity.and_then(|entity| objects.get(entity).ok()) else {
        return;
    };

    let size = base.world_size(saved.scale);
    let center = saved.translation + Vec3::Y * size.y * 0.5;
    let extent = size.max_element().max(0.5);

    for (mut fly_cam, mut transform, projection) in &mut camera_query {
        let distance = match projection {
            Projection::Perspective(persp) => extent * FRAME_PADDING / (persp.fov * 0.5).tan(),
            _ => extent * FRAME_PADDING * 2.0,
        }
        .max(MIN_FRAME_DISTANCE);

        transform.translation = center + Vec3::new(1.0, 0.7, 1.0).normalize() * distance;
        transform.look_at(center, Vec3::Y);

        let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        fly_cam.yaw = yaw;
        fly_cam.pitch = pitch;
    }
}
