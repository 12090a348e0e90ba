use bevy::prelude::*;

use crate::constants::selection::DOUBLE_CLICK_WINDOW_SECS;
use crate::utils::intersect_horizontal_plane;

/// The single selected object, if any
#[derive(Resource, Debug, Default)]
pub struct Selection {
    pub entity: Option<Entity>,
    /// Whether the property panel is showing for the selection
    pub properties_open: bool,
}

impl Selection {
    pub fn select(&mut self, entity: Entity) {
        if self.entity != Some(entity) {
            self.properties_open = false;
        }
        self.entity = Some(entity);
    }

    pub fn clear(&mut self) {
        self.entity = None;
        self.properties_open = false;
    }

    pub fn is_selected(&self, entity: Entity) -> bool {
        self.entity == Some(entity)
    }
}

/// What a click on an object means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    BeginDrag,
    OpenProperties,
}

/// Tells single clicks from double clicks
#[derive(Resource, Debug, Default)]
pub struct ClickTracker {
    last: Option<(Entity, f64)>,
}

impl ClickTracker {
    pub fn register(&mut self, entity: Entity, now: f64) -> ClickOutcome {
        match self.last {
            Some((last, at)) if last == entity && now - at <= DOUBLE_CLICK_WINDOW_SECS => {
                self.last = None;
                ClickOutcome::OpenProperties
            }
            _ => {
                self.last = Some((entity, now));
                ClickOutcome::BeginDrag
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// An object being dragged across a horizontal plane through the grab point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub entity: Entity,
    pub grab_offset: Vec3,
    pub plane_height: f32,
}

impl Drag {
    pub fn start(entity: Entity, object: Vec3, grab_point: Vec3) -> Self {
        Self {
            entity,
            grab_offset: grab_point - object,
            plane_height: grab_point.y,
        }
    }

    /// Object position for a pointer ray, if it meets the drag plane
    pub fn target(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        intersect_horizontal_plane(origin, direction, self.plane_height).map(|point| point - self.grab_offset)
    }
}

#[derive(Resource, Debug, Default)]
pub struct DragState {
    pub active: Option<Drag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn double_click_needs_same_object_in_window() {
        let e = entities(2);
        let mut clicks = ClickTracker::default();
        assert_eq!(clicks.register(e[0], 1.0), ClickOutcome::BeginDrag);
        assert_eq!(clicks.register(e[0], 1.2), ClickOutcome::OpenProperties);
        // Third click starts over
        assert_eq!(clicks.register(e[0], 1.3), ClickOutcome::BeginDrag);

        assert_eq!(clicks.register(e[1], 1.4), ClickOutcome::BeginDrag);
        assert_eq!(clicks.register(e[1], 2.0), ClickOutcome::BeginDrag);
        assert_eq!(clicks.register(e[0], 2.1), ClickOutcome::BeginDrag);
    }

    #[test]
    fn selecting_another_object_closes_properties() {
        let e = entities(2);
        let mut selection = Selection::default();
        selection.select(e[0]);
        selection.properties_open = true;
        selection.select(e[0]);
        assert!(selection.properties_open);
        selection.select(e[1]);
        assert!(!selection.properties_open);
        selection.clear();
        assert!(selection.entity.is_none());
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let e = entities(1);
        let drag = Drag::start(e[0], Vec3::new(1.0, 0.0, 1.0), Vec3::new(1.2, 0.5, 0.8));
        let target = drag.target(Vec3::new(3.2, 5.5, 2.8), Vec3::NEG_Y);
        let Some(target) = target else { panic!("ray meets plane") };
        assert!((target - Vec3::new(3.0, 0.0, 3.0)).length() < 1e-5);
        assert_eq!(drag.target(Vec3::new(0.0, 5.0, 0.0), Vec3::X), None);
    }
}
