//! Tables, beds, lamps, plants and other room fixtures.

use bevy::prelude::*;

use crate::blueprint::{hex, Blueprint, LightSpec, Part, PartShape};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableParams {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub leg_thickness: f32,
    pub color: Color,
}

impl Default for TableParams {
    fn default() -> Self {
        Self {
            width: 1.2,
            height: 0.75,
            depth: 0.8,
            leg_thickness: 0.1,
            color: hex(0x8b4513),
        }
    }
}

const TABLE_TOP_THICKNESS: f32 = 0.05;

pub fn table(params: &TableParams) -> Blueprint {
    let TableParams {
        width,
        height,
        depth,
        leg_thickness,
        color,
    } = *params;

    let leg_height = height - TABLE_TOP_THICKNESS;
    let leg_x = width / 2.0 - leg_thickness / 2.0;
    let leg_z = depth / 2.0 - leg_thickness / 2.0;

    let mut parts = vec![Part::new(
        PartShape::cuboid(width, TABLE_TOP_THICKNESS, depth),
        Vec3::new(0.0, height - TABLE_TOP_THICKNESS / 2.0, 0.0),
        color,
    )];
    for (x, z) in [(-leg_x, -leg_z), (leg_x, -leg_z), (-leg_x, leg_z), (leg_x, leg_z)] {
        parts.push(Part::new(
            PartShape::cuboid(leg_thickness, leg_height, leg_thickness),
            Vec3::new(x, leg_height / 2.0, z),
            color,
        ));
    }

    Blueprint::new(parts)
}

pub fn bed() -> Blueprint {
    let frame = hex(0x8e6e53);
    let linen = hex(0xeeeeee);
    Blueprint::new(vec![
        Part::new(PartShape::cuboid(1.6, 0.3, 2.1), Vec3::new(0.0, 0.15, 0.0), frame),
        Part::new(PartShape::cuboid(1.5, 0.2, 2.0), Vec3::new(0.0, 0.4, 0.0), linen),
        Part::new(PartShape::cuboid(1.6, 0.8, 0.1), Vec3::new(0.0, 0.4, -1.0), frame),
        Part::new(PartShape::cuboid(0.6, 0.1, 0.35), Vec3::new(-0.4, 0.55, -0.75), linen),
        Part::new(PartShape::cuboid(0.6, 0.1, 0.35), Vec3::new(0.4, 0.55, -0.75), linen),
    ])
}

/// Relative intensity of the bulb inside a generated lamp
pub const LAMP_INTENSITY: f32 = 1.2;
pub const LAMP_RANGE: f32 = 5.0;

pub fn lamp() -> Blueprint {
    let stand = hex(0x999999);
    let shade = hex(0xfff3e0);
    Blueprint::new(vec![
        Part::new(
            PartShape::Cylinder {
                radius: 0.15,
                height: 0.05,
            },
            Vec3::new(0.0, 0.025, 0.0),
            stand,
        ),
        Part::new(
            PartShape::Cylinder {
                radius: 0.02,
                height: 1.2,
            },
            Vec3::new(0.0, 0.65, 0.0),
            stand,
        ),
        Part::new(
            PartShape::Frustum {
                radius_top: 0.15,
                radius_bottom: 0.25,
                height: 0.3,
            },
            Vec3::new(0.0, 1.3, 0.0),
            shade,
        ),
    ])
    .with_light(LightSpec {
        offset: Vec3::new(0.0, 1.25, 0.0),
        color: hex(0xfff3e0),
        intensity: LAMP_INTENSITY,
        range: LAMP_RANGE,
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantParams {
    pub seed: u64,
    pub leaf_count: usize,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            seed: 7,
            leaf_count: 7,
        }
    }
}

pub fn plant(params: &PlantParams) -> Blueprint {
    let pot = hex(0x6d4c41);
    let leaves = hex(0x388e3c);
    let mut rng = fastrand::Rng::with_seed(params.seed);

    let mut parts = vec![
        Part::new(
            PartShape::Frustum {
                radius_top: 0.2,
                radius_bottom: 0.15,
                height: 0.3,
            },
            Vec3::new(0.0, 0.15, 0.0),
            pot,
        ),
        Part::new(
            PartShape::Cylinder {
                radius: 0.02,
                height: 0.4,
            },
            Vec3::new(0.0, 0.5, 0.0),
            leaves,
        ),
    ];

    for _ in 0..params.leaf_count {
        let jitter = Vec3::new(
            rng.f32() * 0.3 - 0.15,
            rng.f32() * 0.25,
            rng.f32() * 0.3 - 0.15,
        );
        parts.push(Part::new(
            PartShape::Sphere {
                radius: 0.1 + rng.f32() * 0.06,
            },
            Vec3::new(0.0, 0.75, 0.0) + jitter,
            leaves,
        ));
    }

    Blueprint::new(parts)
}

pub fn carpet() -> Blueprint {
    Blueprint::single(PartShape::cuboid(2.0, 0.01, 1.4), hex(0xa1443c))
}

/// Flat screen on a stand, used for TVs and monitors
pub fn electronics() -> Blueprint {
    let color = hex(0x263238);
    let screen = hex(0x101418);
    Blueprint::new(vec![
        Part::new(PartShape::cuboid(0.4, 0.03, 0.2), Vec3::new(0.0, 0.015, 0.0), color),
        Part::new(PartShape::cuboid(0.06, 0.3, 0.04), Vec3::new(0.0, 0.18, -0.02), color),
        Part::new(PartShape::cuboid(1.2, 0.7, 0.05), Vec3::new(0.0, 0.65, 0.0), color),
        Part::new(PartShape::cuboid(1.12, 0.62, 0.01), Vec3::new(0.0, 0.65, 0.026), screen),
    ])
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxParams {
    pub size: f32,
    pub color: Color,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self {
            size: 1.0,
            color: hex(0xcccccc),
        }
    }
}

pub fn boxed(params: &BoxParams) -> Blueprint {
    Blueprint::single(
        PartShape::cuboid(params.size, params.size, params.size),
        params.color,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_requested_dimensions() {
        let params = TableParams {
            width: 1.6,
            height: 0.9,
            depth: 1.0,
            ..default()
        };
        let blueprint = table(&params);
        assert_eq!(blueprint.parts.len(), 5);
        let size = blueprint.bounds().size();
        assert!((size - Vec3::new(1.6, 0.9, 1.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn lamp_emits_light() {
        let light = lamp().light.expect("lamp has a light");
        assert_eq!(light.intensity, LAMP_INTENSITY);
        assert_eq!(light.range, LAMP_RANGE);
    }

    #[test]
    fn plant_is_deterministic_per_seed() {
        let a = plant(&PlantParams::default());
        let b = plant(&PlantParams::default());
        let c = plant(&PlantParams {
            seed: 99,
            ..default()
        });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.parts.len(), 2 + PlantParams::default().leaf_count);
    }

    #[test]
    fn carpet_is_flat() {
        let size = carpet().bounds().size();
        assert!(size.y < 0.02);
        assert!(size.x > 1.0);
    }

    #[test]
    fn box_is_unit_cube_by_default() {
        let size = boxed(&BoxParams::default()).bounds().size();
        assert!((size - Vec3::ONE).abs().max_element() < 1e-6);
    }
}
