//! Vehicles, creatures and small props.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::blueprint::{hex, Blueprint, Part, PartShape};

pub fn car() -> Blueprint {
    let body = hex(0x1565c0);
    let glass = hex(0x90caf9);
    let tire = hex(0x111111);

    let mut parts = vec![
        Part::new(PartShape::cuboid(1.8, 0.5, 4.0), Vec3::new(0.0, 0.6, 0.0), body),
        Part::new(PartShape::cuboid(1.6, 0.5, 2.0), Vec3::new(0.0, 1.1, -0.2), glass),
    ];
    for (x, z) in [(-0.85, -1.3), (0.85, -1.3), (-0.85, 1.3), (0.85, 1.3)] {
        parts.push(
            Part::new(
                PartShape::Cylinder {
                    radius: 0.35,
                    height: 0.25,
                },
                Vec3::new(x, 0.35, z),
                tire,
            )
            .rotated(Quat::from_rotation_z(FRAC_PI_2)),
        );
    }
    Blueprint::new(parts)
}

pub fn food() -> Blueprint {
    Blueprint::new(vec![
        Part::new(PartShape::Sphere { radius: 0.1 }, Vec3::new(0.0, 0.1, 0.0), hex(0xff7043)),
        Part::new(
            PartShape::Cylinder {
                radius: 0.008,
                height: 0.05,
            },
            Vec3::new(0.0, 0.22, 0.0),
            hex(0x5d4037),
        ),
    ])
}

/// A hammer lying on its side
pub fn tool() -> Blueprint {
    Blueprint::new(vec![
        Part::new(
            PartShape::Cylinder {
                radius: 0.02,
                height: 0.3,
            },
            Vec3::new(0.0, 0.03, 0.0),
            hex(0x8d6e63),
        )
        .rotated(Quat::from_rotation_x(FRAC_PI_2)),
        Part::new(PartShape::cuboid(0.12, 0.06, 0.05), Vec3::new(0.0, 0.03, 0.17), hex(0x607d8b)),
    ])
}

pub fn human() -> Blueprint {
    let skin = hex(0xffcc99);
    let shirt = hex(0x42a5f5);
    let pants = hex(0x263238);
    let limb = |radius, length, at: Vec3, color| {
        Part::new(PartShape::Capsule { radius, length }, at, color)
    };

    Blueprint::new(vec![
        limb(0.07, 0.7, Vec3::new(-0.1, 0.42, 0.0), pants),
        limb(0.07, 0.7, Vec3::new(0.1, 0.42, 0.0), pants),
        Part::new(PartShape::cuboid(0.4, 0.55, 0.22), Vec3::new(0.0, 1.1, 0.0), shirt),
        limb(0.05, 0.5, Vec3::new(-0.26, 1.05, 0.0), shirt),
        limb(0.05, 0.5, Vec3::new(0.26, 1.05, 0.0), shirt),
        Part::new(PartShape::Sphere { radius: 0.12 }, Vec3::new(0.0, 1.52, 0.0), skin),
    ])
}

pub fn dragon() -> Blueprint {
    let scales = hex(0x8e24aa);
    let horn = hex(0xe1bee7);
    let along_z = Quat::from_rotation_x(FRAC_PI_2);

    Blueprint::new(vec![
        Part::new(
            PartShape::Capsule {
                radius: 0.35,
                length: 1.0,
            },
            Vec3::new(0.0, 0.7, 0.0),
            scales,
        )
        .rotated(along_z),
        Part::new(
            PartShape::Capsule {
                radius: 0.12,
                length: 0.5,
            },
            Vec3::new(0.0, 1.15, 0.75),
            scales,
        )
        .rotated(Quat::from_rotation_x(0.6)),
        Part::new(PartShape::Sphere { radius: 0.2 }, Vec3::new(0.0, 1.45, 1.0), scales),
        Part::new(PartShape::Cone { radius: 0.04, height: 0.18 }, Vec3::new(-0.08, 1.68, 0.98), horn),
        Part::new(PartShape::Cone { radius: 0.04, height: 0.18 }, Vec3::new(0.08, 1.68, 0.98), horn),
        Part::new(
            PartShape::Cone {
                radius: 0.2,
                height: 1.0,
            },
            Vec3::new(0.0, 0.6, -1.2),
            scales,
        )
        .rotated(Quat::from_rotation_x(-FRAC_PI_2)),
        Part::new(PartShape::cuboid(1.2, 0.04, 0.7), Vec3::new(-0.85, 1.1, 0.0), scales)
            .rotated(Quat::from_rotation_z(0.35)),
        Part::new(PartShape::cuboid(1.2, 0.04, 0.7), Vec3::new(0.85, 1.1, 0.0), scales)
            .rotated(Quat::from_rotation_z(-0.35)),
        Part::new(PartShape::cuboid(0.15, 0.35, 0.15), Vec3::new(-0.2, 0.175, 0.3), scales),
        Part::new(PartShape::cuboid(0.15, 0.35, 0.15), Vec3::new(0.2, 0.175, 0.3), scales),
        Part::new(PartShape::cuboid(0.15, 0.35, 0.15), Vec3::new(-0.2, 0.175, -0.3), scales),
        Part::new(PartShape::cuboid(0.15, 0.35, 0.15), Vec3::new(0.2, 0.175, -0.3), scales),
    ])
}

/// Generic four-legged animal
pub fn animal() -> Blueprint {
    let fur = hex(0xa1887f);
    let mut parts = vec![
        Part::new(
            PartShape::Capsule {
                radius: 0.18,
                length: 0.5,
            },
            Vec3::new(0.0, 0.5, 0.0),
            fur,
        )
        .rotated(Quat::from_rotation_x(FRAC_PI_2)),
        Part::new(PartShape::Sphere { radius: 0.13 }, Vec3::new(0.0, 0.7, 0.45), fur),
    ];
    for (x, z) in [(-0.1, -0.22), (0.1, -0.22), (-0.1, 0.22), (0.1, 0.22)] {
        parts.push(Part::new(
            PartShape::Cylinder {
                radius: 0.04,
                height: 0.35,
            },
            Vec3::new(x, 0.175, z),
            fur,
        ));
    }
    Blueprint::new(parts)
}
