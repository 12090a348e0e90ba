use bevy::prelude::*;

use super::{LightAnchor, LightRef, ModelRoot};
use crate::catalog::MaterialPreset;
use crate::constants::lights::{LUMENS_PER_UNIT, MAX_RELATIVE_INTENSITY};
use crate::utils::collect_descendants;

use super::InstanceMaterial;

/// Cosmetic overrides chosen by the user
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Appearance {
    pub color: Option<Color>,
    pub material: Option<MaterialPreset>,
    /// Relative intensity, 0 to [`MAX_RELATIVE_INTENSITY`]
    pub light_intensity: Option<f32>,
}

impl Appearance {
    /// Write the overrides into one material
    pub fn tint(&self, material: &mut StandardMaterial) {
        if let Some(preset) = self.material {
            if let Some(tint) = preset.tint().filter(|_| self.color.is_none()) {
                material.base_color = tint;
            }
            preset.apply(material);
        }
        if let Some(color) = self.color {
            let alpha = material.base_color.alpha();
            material.base_color = color.with_alpha(alpha);
        }
    }
}

/// Light attached to a placed object
#[derive(Component)]
pub struct ObjectLight;

/// Push changed appearances into the instance's materials and light.
///
/// Also covers glTF meshes that show up after the appearance was set.
pub fn apply_appearance(
    mut commands: Commands,
    changed: Query<(Entity, &Appearance, &ModelRoot, &LightAnchor, Option<&LightRef>), Changed<Appearance>>,
    late_meshes: Query<(Entity, &MeshMaterial3d<StandardMaterial>), Added<InstanceMaterial>>,
    owned: Query<&MeshMaterial3d<StandardMaterial>, With<InstanceMaterial>>,
    appearances: Query<&Appearance>,
    parents: Query<&ChildOf>,
    children: Query<&Children>,
    mut lights: Query<&mut PointLight, With<ObjectLight>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (root, appearance, model, anchor, light_ref) in &changed {
        if appearance.color.is_some() || appearance.material.is_some() {
            for entity in collect_descendants(root, &children) {
                let Ok(handle) = owned.get(entity) else {
                    continue;
                };
                if let Some(mut material) = materials.get_mut(&handle.0) {
                    appearance.tint(&mut material);
                }
            }
        }

        let Some(intensity) = appearance.light_intensity else {
            continue;
        };
        let lumens = intensity.clamp(0.0, MAX_RELATIVE_INTENSITY) * LUMENS_PER_UNIT;
        match light_ref.and_then(|light| lights.get_mut(light.0).ok()) {
            Some(mut light) => light.intensity = lumens,
            None => {
                let light = commands
                    .spawn((
                        ObjectLight,
                        PointLight {
                            intensity: lumens,
                            range: 5.0,
                            ..default()
                        },
                        Transform::from_translation(anchor.0),
                        ChildOf(model.geometry),
                    ))
                    .id();
                commands.entity(root).insert(LightRef(light));
            }
        }
    }

    for (entity, handle) in &late_meshes {
        let Some(appearance) = parents
            .iter_ancestors(entity)
            .find_map(|ancestor| appearances.get(ancestor).ok())
        else {
            continue;
        };
        if let Some(mut material) = materials.get_mut(&handle.0) {
            appearance.tint(&mut material);
        }
    }
}

/// Set an object's light intensity, clamped to the permitted range
pub fn set_light_intensity(appearance: &mut Appearance, intensity: f32) {
    appearance.light_intensity = Some(intensity.clamp(0.0, MAX_RELATIVE_INTENSITY));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_furniture::hex;

    #[test]
    fn color_override_keeps_alpha() {
        let mut material = StandardMaterial {
            base_color: Color::WHITE.with_alpha(0.35),
            ..default()
        };
        Appearance {
            color: Some(hex(0xff0000)),
            ..default()
        }
        .tint(&mut material);
        assert_eq!(material.base_color, hex(0xff0000).with_alpha(0.35));
    }

    #[test]
    fn preset_tint_yields_to_explicit_color() {
        let mut material = StandardMaterial::default();
        Appearance {
            color: Some(hex(0x0000ff)),
            material: Some(MaterialPreset::Wood),
            ..default()
        }
        .tint(&mut material);
        assert_eq!(material.base_color, hex(0x0000ff));

        let mut material = StandardMaterial::default();
        Appearance {
            material: Some(MaterialPreset::Wood),
            ..default()
        }
        .tint(&mut material);
        assert_eq!(Some(material.base_color), MaterialPreset::Wood.tint());
    }

    #[test]
    fn glass_is_translucent() {
        let mut material = StandardMaterial::default();
        Appearance {
            material: Some(MaterialPreset::Glass),
            ..default()
        }
        .tint(&mut material);
        assert_eq!(material.alpha_mode, AlphaMode::Blend);
        assert!(material.base_color.alpha() < 1.0);
    }

    #[test]
    fn intensity_is_clamped() {
        let mut appearance = Appearance::default();
        set_light_intensity(&mut appearance, 40.0);
        assert_eq!(appearance.light_intensity, Some(MAX_RELATIVE_INTENSITY));
        set_light_intensity(&mut appearance, -1.0);
        assert_eq!(appearance.light_intensity, Some(0.0));
        assert_ne!(appearance, Appearance::default());
    }
}
