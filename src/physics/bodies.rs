use std::collections::HashMap;

use bevy::prelude::*;

use crate::constants::physics::MIN_COLLIDER_EXTENT;

/// How a body is currently driven
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyMode {
    /// Simulated; the object follows the body
    Dynamic,
    /// Moved by the user; the body follows the object
    Kinematic,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyRecord {
    pub body: Entity,
    pub mode: BodyMode,
    pub half_extents: Vec3,
}

impl BodyRecord {
    /// Offset from the object's origin (bottom center) to the body center, in object space
    pub fn center_offset(&self) -> Vec3 {
        Vec3::new(0.0, self.half_extents.y, 0.0)
    }
}

/// Owner object → body, plus the reverse index
#[derive(Resource, Default, Debug)]
pub struct PhysicsBodies {
    by_owner: HashMap<Entity, BodyRecord>,
    by_body: HashMap<Entity, Entity>,
}

impl PhysicsBodies {
    /// Register a body for `owner`, returning the record it replaced
    pub fn register(&mut self, owner: Entity, record: BodyRecord) -> Option<BodyRecord> {
        let previous = self.by_owner.insert(owner, record);
        if let Some(previous) = previous {
            self.by_body.remove(&previous.body);
        }
        self.by_body.insert(record.body, owner);
        previous
    }

    pub fn remove(&mut self, owner: Entity) -> Option<BodyRecord> {
        let record = self.by_owner.remove(&owner)?;
        self.by_body.remove(&record.body);
        Some(record)
    }

    pub fn get(&self, owner: Entity) -> Option<&BodyRecord> {
        self.by_owner.get(&owner)
    }

    pub fn owner_of(&self, body: Entity) -> Option<Entity> {
        self.by_body.get(&body).copied()
    }

    pub fn mode(&self, owner: Entity) -> Option<BodyMode> {
        self.get(owner).map(|record| record.mode)
    }

    /// Returns false when the owner has no body
    pub fn set_mode(&mut self, owner: Entity, mode: BodyMode) -> bool {
        match self.by_owner.get_mut(&owner) {
            Some(record) => {
                record.mode = mode;
                true
            }
            None => false,
        }
    }

    pub fn set_half_extents(&mut self, owner: Entity, half_extents: Vec3) {
        if let Some(record) = self.by_owner.get_mut(&owner) {
            record.half_extents = half_extents;
        }
    }

    pub fn len(&self) -> usize {
        self.by_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &BodyRecord)> {
        self.by_owner.iter().map(|(owner, record)| (*owner, record))
    }
}

/// Collider half extents for an object of world size `size`.
///
/// Degenerate sizes get a unit box; thin axes are thickened.
pub fn collider_half_extents(size: Vec3) -> Vec3 {
    if !size.is_finite() || size.max_element() <= 0.0 {
        return Vec3::splat(0.5);
    }
    (size * 0.5).max(Vec3::splat(MIN_COLLIDER_EXTENT))
}

/// Body pose for an object at `object`
pub fn body_pose_from_object(object: &Transform, half_extents: Vec3) -> Transform {
    let offset = Vec3::new(0.0, half_extents.y, 0.0);
    Transform::from_translation(object.translation + object.rotation * offset)
        .with_rotation(object.rotation)
}

/// Object pose for a simulated body, keeping the object's own scale
pub fn object_pose_from_body(body: &Transform, half_extents: Vec3, scale: Vec3) -> Transform {
    let offset = Vec3::new(0.0, half_extents.y, 0.0);
    Transform {
        translation: body.translation - body.rotation * offset,
        rotation: body.rotation,
        scale,
    }
}

/// Pose the object should take this frame, if its body drives it
pub fn synced_pose(record: &BodyRecord, body: &Transform, object: &Transform) -> Option<Transform> {
    (record.mode == BodyMode::Dynamic)
        .then(|| object_pose_from_body(body, record.half_extents, object.scale))
}
