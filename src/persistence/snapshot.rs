use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::MaterialPreset;
use crate::scene::{Appearance, BaseDimensions, ObjectId, PlacedObject, SavedTransform};

/// What a snapshot reads from each placed object
pub type SavedObject<'a> = (
    &'a PlacedObject,
    &'a SavedTransform,
    Option<&'a Appearance>,
    Option<&'a BaseDimensions>,
);

/// Saved translation, rotation and scale of one object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializedTransform {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl From<&SavedTransform> for SerializedTransform {
    fn from(saved: &SavedTransform) -> Self {
        Self {
            translation: saved.translation.to_array(),
            rotation: saved.rotation.to_array(),
            scale: saved.scale.to_array(),
        }
    }
}

impl SerializedTransform {
    /// Back to a transform. Non-finite values are rejected.
    pub fn to_transform(&self) -> Option<Transform> {
        let translation = Vec3::from_array(self.translation);
        let rotation = Quat::from_array(self.rotation);
        let scale = Vec3::from_array(self.scale);
        if !translation.is_finite() || !rotation.is_finite() || !scale.is_finite() {
            return None;
        }
        let rotation = if rotation.length_squared() > f32::EPSILON {
            rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        Some(Transform {
            translation,
            rotation,
            scale,
        })
    }
}

/// One placed object as stored. Provenance is never stored: objects are re-resolved
/// by keyword on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub keyword: String,
    pub transform: SerializedTransform,
    #[serde(default)]
    pub color: Option<[f32; 4]>,
    #[serde(default)]
    pub material: Option<MaterialPreset>,
    #[serde(default)]
    pub light_intensity: Option<f32>,
    /// World size captured at confirm
    #[serde(default)]
    pub base_size: Option<[f32; 3]>,
    /// Root scale captured at confirm
    #[serde(default)]
    pub base_scale: Option<[f32; 3]>,
}

impl ObjectRecord {
    pub fn appearance(&self) -> Appearance {
        Appearance {
            color: self.color.map(|[r, g, b, a]| Color::srgba(r, g, b, a)),
            material: self.material,
            light_intensity: self.light_intensity,
        }
    }

    /// Base dimensions as captured at confirm. Records without them treat the
    /// saved scale as the base, sized from the re-resolved template.
    pub fn base_dimensions(&self, template_size: Vec3) -> BaseDimensions {
        let valid = |v: Vec3| v.is_finite() && v.min_element() > 0.0;
        match (self.base_size.map(Vec3::from_array), self.base_scale.map(Vec3::from_array)) {
            (Some(size), Some(root_scale)) if valid(size) && valid(root_scale) => BaseDimensions { size, root_scale },
            _ => {
                let scale = Vec3::from_array(self.transform.scale);
                let root_scale = if valid(scale) { scale } else { Vec3::ONE };
                BaseDimensions {
                    size: template_size * root_scale,
                    root_scale,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub project_id: String,
    pub objects: Vec<ObjectRecord>,
}

impl SceneSnapshot {
    /// Build a snapshot from saved transforms and cosmetic overrides, ordered by placement
    pub fn capture<'a>(
        project_id: &str,
        objects: impl IntoIterator<Item = SavedObject<'a>>,
    ) -> Self {
        let mut records: Vec<(ObjectId, ObjectRecord)> = objects
            .into_iter()
            .map(|(object, saved, appearance, base)| {
                let appearance = appearance.copied().unwrap_or_default();
                (
                    object.id,
                    ObjectRecord {
                        keyword: object.keyword.clone(),
                        transform: saved.into(),
                        color: appearance.color.map(|color| {
                            let c = color.to_srgba();
                            [c.red, c.green, c.blue, c.alpha]
                        }),
                        material: appearance.material,
                        light_intensity: appearance.light_intensity,
                        base_size: base.map(|base| base.size.to_array()),
                        base_scale: base.map(|base| base.root_scale.to_array()),
                    },
                )
            })
            .collect();
        records.sort_by_key(|(id, _)| id.0);

        Self {
            project_id: project_id.to_string(),
            objects: records.into_iter().map(|(_, record)| record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectClass;
    use crate::resolver::SourceType;

    fn placed(id: u64, keyword: &str) -> PlacedObject {
        PlacedObject {
            id: ObjectId(id),
            keyword: keyword.to_string(),
            source: SourceType::Remote,
            class: ObjectClass::of(keyword),
        }
    }

    #[test]
    fn snapshot_uses_saved_transform_and_keyword() {
        let sofa = placed(2, "sofa");
        let lamp = placed(1, "lamp");
        let saved = SavedTransform::capture(&Transform::from_xyz(1.0, 0.0, 2.0));
        let lamp_saved = SavedTransform::capture(&Transform::from_xyz(-1.0, 0.0, 0.0));
        let appearance = Appearance {
            color: Some(Color::srgb(1.0, 0.0, 0.0)),
            material: Some(MaterialPreset::Metal),
            light_intensity: None,
        };

        let snapshot = SceneSnapshot::capture(
            "demo",
            [(&sofa, &saved, Some(&appearance), None), (&lamp, &lamp_saved, None, None)],
        );

        assert_eq!(snapshot.project_id, "demo");
        let keywords: Vec<_> = snapshot.objects.iter().map(|o| o.keyword.as_str()).collect();
        assert_eq!(keywords, ["lamp", "sofa"]);
        assert_eq!(snapshot.objects[1].transform.translation, [1.0, 0.0, 2.0]);
        assert_eq!(snapshot.objects[1].color, Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(snapshot.objects[1].material, Some(MaterialPreset::Metal));
        assert_eq!(snapshot.objects[0].color, None);
    }

    #[test]
    fn stored_form_has_no_provenance() {
        let sofa = placed(1, "sofa");
        let saved = SavedTransform::capture(&Transform::IDENTITY);
        let snapshot = SceneSnapshot::capture("p", [(&sofa, &saved, None, None)]);
        let text = ron::to_string(&snapshot).unwrap_or_default();
        assert!(text.contains("sofa"));
        assert!(!text.to_lowercase().contains("remote"));
    }

    #[test]
    fn bad_transforms_are_rejected() {
        let bad = SerializedTransform {
            translation: [f32::NAN, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        };
        assert!(bad.to_transform().is_none());

        let zero_rotation = SerializedTransform {
            translation: [0.0; 3],
            rotation: [0.0; 4],
            scale: [1.0; 3],
        };
        assert_eq!(zero_rotation.to_transform().map(|t| t.rotation), Some(Quat::IDENTITY));
    }

    #[test]
    fn record_appearance_round_trips() {
        let record = ObjectRecord {
            keyword: "chair".into(),
            transform: (&SavedTransform::capture(&Transform::IDENTITY)).into(),
            color: Some([0.0, 0.0, 1.0, 1.0]),
            material: None,
            light_intensity: Some(2.0),
            base_size: None,
            base_scale: None,
        };
        let appearance = record.appearance();
        assert_eq!(appearance.color, Some(Color::srgba(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(appearance.light_intensity, Some(2.0));
    }

    #[test]
    fn base_dimensions_survive_save_and_load() {
        // A "huge chair": model 0.5 x 1.0 x 0.5 placed at scale 2.5
        let model = Vec3::new(0.5, 1.0, 0.5);
        let base = BaseDimensions {
            size: model * 2.5,
            root_scale: Vec3::splat(2.5),
        };
        let chair = placed(1, "chair");
        let saved = SavedTransform::capture(&Transform::from_scale(Vec3::splat(2.5)));

        let snapshot = SceneSnapshot::capture("p", [(&chair, &saved, None, Some(&base))]);
        let text = ron::to_string(&snapshot).unwrap_or_default();
        let loaded: SceneSnapshot = ron::from_str(&text).expect("parse snapshot");
        let restored = loaded.objects[0].base_dimensions(model);

        assert_eq!(restored, base);
        assert_eq!(restored.scale_for(Vec3::ONE), base.scale_for(Vec3::ONE));
        assert_eq!(restored.world_size(Vec3::splat(2.5)), base.world_size(Vec3::splat(2.5)));
    }

    #[test]
    fn records_without_base_use_saved_scale() {
        let record = ObjectRecord {
            keyword: "chair".into(),
            transform: (&SavedTransform::capture(&Transform::from_scale(Vec3::splat(2.0)))).into(),
            color: None,
            material: None,
            light_intensity: None,
            base_size: None,
            base_scale: None,
        };
        let base = record.base_dimensions(Vec3::ONE);
        assert_eq!(base.root_scale, Vec3::splat(2.0));
        assert_eq!(base.world_size(Vec3::splat(2.0)), Vec3::splat(2.0));
    }
}
