//! Shared utility functions

use bevy::prelude::*;
use bevy_egui::EguiContexts;

/// Check if pointer input should be processed by viewport systems.
///
/// Returns `false` when egui is using the pointer (hovering a panel or dragging a widget).
pub fn pointer_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false)
}

/// Check if keyboard input should be processed by viewport systems.
///
/// Returns `false` when an egui text field has focus.
pub fn should_process_keys(contexts: &mut EguiContexts) -> bool {
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return false;
        }
    }
    true
}

/// Intersect a ray with the horizontal plane `y = height`.
///
/// Returns `None` when the ray is parallel to the plane or points away from it.
pub fn intersect_horizontal_plane(origin: Vec3, direction: Vec3, height: f32) -> Option<Vec3> {
    if direction.y.abs() < 1e-6 {
        return None;
    }
    let t = (height - origin.y) / direction.y;
    if t < 0.0 {
        return None;
    }
    Some(origin + direction * t)
}

/// Ray from the camera through the cursor, if the cursor is in the window
pub fn cursor_ray(window: &Window, camera: &Camera, camera_transform: &GlobalTransform) -> Option<Ray3d> {
    let cursor = window.cursor_position()?;
    camera.viewport_to_world(camera_transform, cursor).ok()
}

/// Snap the horizontal coordinates of `point` to a grid of `step` meters
pub fn snap_to_grid(point: Vec3, step: f32) -> Vec3 {
    if step <= 0.0 {
        return point;
    }
    Vec3::new(
        (point.x / step).round() * step,
        point.y,
        (point.z / step).round() * step,
    )
}

/// Yaw (rotation around Y) of a quaternion, in radians
pub fn yaw_of(rotation: Quat) -> f32 {
    rotation.to_euler(EulerRot::YXZ).0
}

/// Collect `root` and every entity below it
pub fn collect_descendants(root: Entity, children_query: &Query<&Children>) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        out.push(entity);
        if let Ok(children) = children_query.get(entity) {
            stack.extend(children.iter());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_ground_below_camera() {
        let origin = Vec3::new(0.0, 10.0, 10.0);
        let direction = (Vec3::new(2.0, 0.0, 4.0) - origin).normalize();
        let hit = intersect_horizontal_plane(origin, direction, 0.0).expect("hit");
        assert!((hit - Vec3::new(2.0, 0.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn parallel_or_upward_ray_misses() {
        assert!(intersect_horizontal_plane(Vec3::Y, Vec3::X, 0.0).is_none());
        assert!(intersect_horizontal_plane(Vec3::Y, Vec3::Y, 0.0).is_none());
    }

    #[test]
    fn snapping_keeps_height() {
        let snapped = snap_to_grid(Vec3::new(1.26, 0.7, -0.74), 0.5);
        assert_eq!(snapped, Vec3::new(1.5, 0.7, -0.5));
        assert_eq!(snap_to_grid(Vec3::new(1.26, 0.0, 0.1), 0.0), Vec3::new(1.26, 0.0, 0.1));
    }

    #[test]
    fn yaw_round_trips() {
        let yaw = yaw_of(Quat::from_rotation_y(0.6));
        assert!((yaw - 0.6).abs() < 1e-5);
    }
}
