use std::collections::VecDeque;
use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::commands::PlacementRequest;
use crate::constants::placement::{ARRANGEMENT_RADIUS, PREVIEW_ENLARGEMENT};
use crate::resolver::SourceType;

/// The single in-flight placement candidate
#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    /// Token matched against resolver results; stale results are dropped
    pub generation: u64,
    pub request: PlacementRequest,
    /// `None` while the model is still resolving
    pub entity: Option<Entity>,
    pub source: Option<SourceType>,
    /// World size of the resolved model at its import scale
    pub model_size: Vec3,
    /// Pointer point on the ground
    pub anchor: Vec3,
    /// Offset from the anchor when placing several copies at once
    pub offset: Vec3,
    /// Pending yaw, in radians
    pub rotation_y: f32,
}

impl Preview {
    pub fn is_resolving(&self) -> bool {
        self.entity.is_none()
    }

    pub fn position(&self) -> Vec3 {
        self.anchor + self.offset
    }

    /// Transform of the enlarged ghost
    pub fn ghost_transform(&self) -> Transform {
        Transform::from_translation(self.position())
            .with_rotation(Quat::from_rotation_y(self.rotation_y))
            .with_scale(Vec3::splat(PREVIEW_ENLARGEMENT * self.request.scale_factor()))
    }

    /// Transform the object keeps once placed, with the enlargement taken back out
    pub fn committed_transform(&self) -> Transform {
        let mut transform = self.ghost_transform();
        transform.scale /= PREVIEW_ENLARGEMENT;
        transform
    }

    /// World size of the placed object
    pub fn committed_size(&self) -> Vec3 {
        self.model_size * self.request.scale_factor()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GhostState {
    #[default]
    Idle,
    Previewing(Preview),
}

/// A request waiting for the current preview to finish
#[derive(Clone, Debug, PartialEq)]
pub struct QueuedPlacement {
    pub request: PlacementRequest,
    pub offset: Vec3,
}

/// What [`GhostPlacement::begin`] did
#[derive(Debug, PartialEq)]
pub struct Began {
    pub generation: u64,
    /// Entity of the preview that was implicitly cancelled
    pub replaced: Option<Entity>,
}

/// Ghost placement controller. Owns the one preview and the queue behind it.
#[derive(Resource, Debug, Default)]
pub struct GhostPlacement {
    generation: u64,
    state: GhostState,
    queue: VecDeque<QueuedPlacement>,
}

impl GhostPlacement {
    pub fn state(&self) -> &GhostState {
        &self.state
    }

    pub fn preview(&self) -> Option<&Preview> {
        match &self.state {
            GhostState::Previewing(preview) => Some(preview),
            GhostState::Idle => None,
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.preview().is_some()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Start previewing `request` at the origin. Any current preview is cancelled first.
    pub fn begin(&mut self, request: PlacementRequest, offset: Vec3) -> Began {
        let replaced = match std::mem::take(&mut self.state) {
            GhostState::Previewing(preview) => preview.entity,
            GhostState::Idle => None,
        };
        self.generation += 1;
        self.state = GhostState::Previewing(Preview {
            generation: self.generation,
            request,
            entity: None,
            source: None,
            model_size: Vec3::ONE,
            anchor: Vec3::ZERO,
            offset,
            rotation_y: 0.0,
        });
        Began {
            generation: self.generation,
            replaced,
        }
    }

    /// Whether a resolution for `generation` is still wanted
    pub fn accepts(&self, generation: u64) -> bool {
        self.preview()
            .is_some_and(|preview| preview.generation == generation && preview.is_resolving())
    }

    /// Hand the spawned ghost to the current preview. Returns false for stale generations.
    pub fn attach(&mut self, generation: u64, entity: Entity, source: SourceType, model_size: Vec3) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        if let GhostState::Previewing(preview) = &mut self.state {
            preview.entity = Some(entity);
            preview.source = Some(source);
            preview.model_size = model_size;
        }
        true
    }

    pub fn move_to(&mut self, point: Vec3) {
        if let GhostState::Previewing(preview) = &mut self.state {
            preview.anchor = point;
        }
    }

    pub fn rotate(&mut self, radians: f32) {
        if let GhostState::Previewing(preview) = &mut self.state {
            preview.rotation_y = (preview.rotation_y + radians).rem_euclid(TAU);
        }
    }

    /// Finish the preview. No-op when idle or while the model is still resolving.
    pub fn confirm(&mut self) -> Option<Preview> {
        match &self.state {
            GhostState::Previewing(preview) if !preview.is_resolving() => {}
            _ => return None,
        }
        match std::mem::take(&mut self.state) {
            GhostState::Previewing(preview) => Some(preview),
            GhostState::Idle => None,
        }
    }

    /// Drop the preview and everything queued behind it
    pub fn cancel(&mut self) -> Option<Preview> {
        self.queue.clear();
        match std::mem::take(&mut self.state) {
            GhostState::Previewing(preview) => Some(preview),
            GhostState::Idle => None,
        }
    }

    /// Queue a batch; several requests are spread around the anchor
    pub fn enqueue(&mut self, requests: Vec<PlacementRequest>) {
        let offsets = arrangement_offsets(requests.len());
        self.queue.extend(
            requests
                .into_iter()
                .zip(offsets)
                .map(|(request, offset)| QueuedPlacement { request, offset }),
        );
    }

    pub fn next_queued(&mut self) -> Option<QueuedPlacement> {
        self.queue.pop_front()
    }
}

/// Positions on a circle around the anchor, one per object
pub fn arrangement_offsets(count: usize) -> Vec<Vec3> {
    if count <= 1 {
        return vec![Vec3::ZERO; count];
    }
    (0..count)
        .map(|i| {
            let angle = TAU * i as f32 / count as f32;
            Vec3::new(angle.cos(), 0.0, angle.sin()) * ARRANGEMENT_RADIUS
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chair() -> PlacementRequest {
        match PlacementRequest::keyword("chair") {
            Ok(request) => request,
            Err(e) => panic!("{e}"),
        }
    }

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn idle_confirm_and_cancel_are_noops() {
        let mut ghost = GhostPlacement::default();
        assert!(ghost.confirm().is_none());
        assert!(ghost.cancel().is_none());
        assert_eq!(ghost.state(), &GhostState::Idle);
    }

    #[test]
    fn confirm_while_resolving_is_noop() {
        let mut ghost = GhostPlacement::default();
        ghost.begin(chair(), Vec3::ZERO);
        assert!(ghost.confirm().is_none());
        assert!(ghost.is_previewing());
    }

    #[test]
    fn second_preview_replaces_first() {
        let e = entities(1);
        let mut ghost = GhostPlacement::default();
        let first = ghost.begin(chair(), Vec3::ZERO);
        assert!(ghost.attach(first.generation, e[0], SourceType::Procedural, Vec3::ONE));

        let second = ghost.begin(chair(), Vec3::ZERO);
        assert_eq!(second.replaced, Some(e[0]));
        assert!(second.generation > first.generation);
    }

    #[test]
    fn stale_resolution_is_discarded() {
        let e = entities(1);
        let mut ghost = GhostPlacement::default();
        let stale = ghost.begin(chair(), Vec3::ZERO).generation;
        ghost.cancel();
        assert!(!ghost.attach(stale, e[0], SourceType::Local, Vec3::ONE));

        ghost.begin(chair(), Vec3::ZERO);
        assert!(!ghost.accepts(stale));
        assert!(!ghost.attach(stale, e[0], SourceType::Local, Vec3::ONE));
    }

    #[test]
    fn each_preview_starts_at_origin() {
        let e = entities(1);
        let mut ghost = GhostPlacement::default();
        let first = ghost.begin(chair(), Vec3::ZERO);
        assert!(ghost.attach(first.generation, e[0], SourceType::Local, Vec3::ONE));
        ghost.move_to(Vec3::new(4.0, 0.0, -3.0));
        assert!(ghost.confirm().is_some());

        let offset = Vec3::new(1.0, 0.0, 0.0);
        ghost.begin(chair(), offset);
        let Some(preview) = ghost.preview() else { panic!("previewing") };
        assert_eq!(preview.anchor, Vec3::ZERO);
        assert_eq!(preview.position(), offset);
    }

    #[test]
    fn rotation_wraps() {
        let mut ghost = GhostPlacement::default();
        ghost.begin(chair(), Vec3::ZERO);
        for _ in 0..25 {
            ghost.rotate(15f32.to_radians());
        }
        let yaw = ghost.preview().map(|p| p.rotation_y).unwrap_or_default();
        assert!((yaw - 15f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn enlargement_is_reversed_on_commit() {
        let mut ghost = GhostPlacement::default();
        let request = PlacementRequest::new("chair", None, Some(2.0), None);
        let Ok(request) = request else { panic!("valid request") };
        ghost.begin(request, Vec3::ZERO);
        let Some(preview) = ghost.preview() else { panic!("previewing") };
        assert!((preview.ghost_transform().scale.x - 2.0 * PREVIEW_ENLARGEMENT).abs() < 1e-5);
        assert!((preview.committed_transform().scale.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn queue_is_arranged_and_cleared_by_cancel() {
        let mut ghost = GhostPlacement::default();
        ghost.enqueue(vec![chair(), chair(), chair()]);
        assert_eq!(ghost.queued(), 3);
        let Some(first) = ghost.next_queued() else { panic!("queued") };
        assert!((first.offset.length() - ARRANGEMENT_RADIUS).abs() < 1e-4);
        ghost.begin(first.request, first.offset);
        ghost.cancel();
        assert_eq!(ghost.queued(), 0);
    }

    #[test]
    fn single_request_is_not_offset() {
        assert_eq!(arrangement_offsets(1), vec![Vec3::ZERO]);
        assert!(arrangement_offsets(0).is_empty());
        let ring = arrangement_offsets(4);
        assert!((ring[0] - ring[2]).length() > 2.0 * ARRANGEMENT_RADIUS - 1e-3);
    }
}
