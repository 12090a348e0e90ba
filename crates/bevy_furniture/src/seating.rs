//! Chairs and sofas.

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::prelude::*;

use crate::blueprint::{hex, Blueprint, Part, PartShape};

/// Parameters for a four-legged chair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChairParams {
    pub seat_height: f32,
    pub seat_width: f32,
    pub seat_depth: f32,
    /// Height of the backrest above the seat
    pub back_height: f32,
    pub has_armrests: bool,
    pub color: Color,
}

impl Default for ChairParams {
    fn default() -> Self {
        Self {
            seat_height: 0.45,
            seat_width: 0.45,
            seat_depth: 0.45,
            back_height: 0.45,
            has_armrests: false,
            color: hex(0x795548),
        }
    }
}

const SEAT_THICKNESS: f32 = 0.05;
const CHAIR_LEG: f32 = 0.04;

pub fn chair(params: &ChairParams) -> Blueprint {
    let ChairParams {
        seat_height,
        seat_width,
        seat_depth,
        back_height,
        has_armrests,
        color,
    } = *params;

    let leg_height = seat_height - SEAT_THICKNESS;
    let leg_x = seat_width / 2.0 - CHAIR_LEG / 2.0;
    let leg_z = seat_depth / 2.0 - CHAIR_LEG / 2.0;

    let mut parts = vec![Part::new(
        PartShape::cuboid(seat_width, SEAT_THICKNESS, seat_depth),
        Vec3::new(0.0, seat_height - SEAT_THICKNESS / 2.0, 0.0),
        color,
    )];

    for (x, z) in [(-leg_x, -leg_z), (leg_x, -leg_z), (-leg_x, leg_z), (leg_x, leg_z)] {
        parts.push(Part::new(
            PartShape::cuboid(CHAIR_LEG, leg_height, CHAIR_LEG),
            Vec3::new(x, leg_height / 2.0, z),
            color,
        ));
    }

    // Backrest sits on the rear edge
    parts.push(Part::new(
        PartShape::cuboid(seat_width, back_height, SEAT_THICKNESS),
        Vec3::new(
            0.0,
            seat_height + back_height / 2.0,
            -seat_depth / 2.0 + SEAT_THICKNESS / 2.0,
        ),
        color,
    ));

    if has_armrests {
        let arm_height = 0.2;
        for side in [-1.0, 1.0] {
            parts.push(Part::new(
                PartShape::cuboid(CHAIR_LEG, 0.04, seat_depth),
                Vec3::new(side * leg_x, seat_height + arm_height, 0.0),
                color,
            ));
            parts.push(Part::new(
                PartShape::cuboid(CHAIR_LEG, arm_height, CHAIR_LEG),
                Vec3::new(side * leg_x, seat_height + arm_height / 2.0, leg_z),
                color,
            ));
        }
    }

    Blueprint::new(parts)
}

pub fn armchair() -> Blueprint {
    let color = hex(0x8d6e63);
    let cushion = hex(0xa1887f);
    Blueprint::new(vec![
        Part::new(PartShape::cuboid(0.8, 0.4, 0.8), Vec3::new(0.0, 0.2, 0.0), color),
        Part::new(PartShape::cuboid(0.8, 0.5, 0.15), Vec3::new(0.0, 0.65, -0.325), color),
        Part::new(PartShape::cuboid(0.15, 0.25, 0.8), Vec3::new(-0.325, 0.525, 0.0), color),
        Part::new(PartShape::cuboid(0.15, 0.25, 0.8), Vec3::new(0.325, 0.525, 0.0), color),
        Part::new(PartShape::cuboid(0.5, 0.1, 0.6), Vec3::new(0.0, 0.45, 0.05), cushion),
    ])
}

pub fn office_chair() -> Blueprint {
    let body = hex(0x455a64);
    let wheel = hex(0x222222);

    let mut parts = vec![
        Part::new(PartShape::cuboid(0.5, 0.08, 0.5), Vec3::new(0.0, 0.5, 0.0), body),
        Part::new(PartShape::cuboid(0.48, 0.55, 0.06), Vec3::new(0.0, 0.82, -0.24), body),
        Part::new(
            PartShape::Cylinder {
                radius: 0.03,
                height: 0.36,
            },
            Vec3::new(0.0, 0.28, 0.0),
            body,
        ),
    ];

    // Five-star base with a wheel at every tip
    for i in 0..5 {
        let angle = i as f32 / 5.0 * TAU;
        let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
        parts.push(
            Part::new(PartShape::cuboid(0.3, 0.03, 0.04), dir * 0.15 + Vec3::Y * 0.1, body)
                .rotated(Quat::from_rotation_y(-angle)),
        );
        parts.push(Part::new(
            PartShape::Sphere { radius: 0.04 },
            dir * 0.28 + Vec3::Y * 0.04,
            wheel,
        ));
    }

    Blueprint::new(parts)
}

pub fn sofa() -> Blueprint {
    let color = hex(0x6d4c41);
    let cushion = hex(0x8d6e63);

    let mut parts = vec![
        Part::new(PartShape::cuboid(2.0, 0.4, 0.9), Vec3::new(0.0, 0.2, 0.0), color),
        Part::new(PartShape::cuboid(2.0, 0.5, 0.2), Vec3::new(0.0, 0.65, -0.35), color),
        Part::new(PartShape::cuboid(0.2, 0.3, 0.9), Vec3::new(-0.9, 0.55, 0.0), color),
        Part::new(PartShape::cuboid(0.2, 0.3, 0.9), Vec3::new(0.9, 0.55, 0.0), color),
    ];
    for x in [-0.53, 0.0, 0.53] {
        parts.push(Part::new(
            PartShape::cuboid(0.52, 0.12, 0.65),
            Vec3::new(x, 0.46, 0.08),
            cushion,
        ));
    }
    // Rounded back pillows
    for x in [-0.53, 0.53] {
        parts.push(
            Part::new(
                PartShape::Capsule {
                    radius: 0.1,
                    length: 0.3,
                },
                Vec3::new(x, 0.65, -0.18),
                cushion,
            )
            .rotated(Quat::from_rotation_z(FRAC_PI_2)),
        );
    }

    Blueprint::new(parts)
}
