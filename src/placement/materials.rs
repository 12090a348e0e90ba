use std::collections::HashMap;

use bevy::prelude::*;

use crate::constants::placement::GHOST_ALPHA;

/// Marks a mesh whose material has been ghosted
#[derive(Component)]
pub struct Ghosted;

/// Original parameters of every ghosted material, keyed by material identity.
///
/// A material is snapshotted the first time it is ghosted only, so ghosting twice
/// never records the translucent values as the originals.
#[derive(Resource, Debug, Default)]
pub struct GhostMaterials {
    originals: HashMap<AssetId<StandardMaterial>, (Color, AlphaMode)>,
}

impl GhostMaterials {
    pub fn ghost(&mut self, id: AssetId<StandardMaterial>, materials: &mut Assets<StandardMaterial>) {
        let Some(material) = materials.get_mut(id) else {
            return;
        };
        self.originals
            .entry(id)
            .or_insert((material.base_color, material.alpha_mode));
        let alpha = material.base_color.alpha().min(GHOST_ALPHA);
        material.base_color = material.base_color.with_alpha(alpha);
        material.alpha_mode = AlphaMode::Blend;
    }

    /// Put every snapshotted material back and forget the snapshots
    pub fn restore_all(&mut self, materials: &mut Assets<StandardMaterial>) {
        for (id, (color, alpha_mode)) in self.originals.drain() {
            if let Some(material) = materials.get_mut(id) {
                material.base_color = color;
                material.alpha_mode = alpha_mode;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}
