use bevy::prelude::*;

/// A single primitive shape, sized in meters, Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PartShape {
    Cuboid { size: Vec3 },
    Cylinder { radius: f32, height: f32 },
    /// Truncated cone, used for lamp shades and plant pots
    Frustum {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Cone { radius: f32, height: f32 },
    Sphere { radius: f32 },
    /// Capsule whose `length` excludes the hemispherical caps
    Capsule { radius: f32, length: f32 },
}

impl PartShape {
    pub fn cuboid(x: f32, y: f32, z: f32) -> Self {
        Self::Cuboid {
            size: Vec3::new(x, y, z),
        }
    }

    /// Build the render mesh for this shape
    pub fn mesh(&self) -> Mesh {
        match *self {
            PartShape::Cuboid { size } => Cuboid::from_size(size).into(),
            PartShape::Cylinder { radius, height } => Cylinder::new(radius, height).into(),
            PartShape::Frustum {
                radius_top,
                radius_bottom,
                height,
            } => ConicalFrustum {
                radius_top,
                radius_bottom,
                height,
            }
            .into(),
            PartShape::Cone { radius, height } => Cone { radius, height }.into(),
            PartShape::Sphere { radius } => Sphere::new(radius).into(),
            PartShape::Capsule { radius, length } => Capsule3d::new(radius, length).into(),
        }
    }

    /// Half extents of the shape's local axis-aligned box
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            PartShape::Cuboid { size } => size * 0.5,
            PartShape::Cylinder { radius, height } | PartShape::Cone { radius, height } => {
                Vec3::new(radius, height * 0.5, radius)
            }
            PartShape::Frustum {
                radius_top,
                radius_bottom,
                height,
            } => {
                let r = radius_top.max(radius_bottom);
                Vec3::new(r, height * 0.5, r)
            }
            PartShape::Sphere { radius } => Vec3::splat(radius),
            PartShape::Capsule { radius, length } => Vec3::new(radius, length * 0.5 + radius, radius),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Inverted box that any `union` replaces
    pub const EMPTY: Bounds = Bounds {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Size along each axis, zero for an empty box
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    /// True when the box has no volume worth simulating
    pub fn is_degenerate(&self) -> bool {
        !self.size().is_finite() || self.max_dimension() <= f32::EPSILON
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn include_point(self, point: Vec3) -> Bounds {
        Bounds {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Box enclosing this box after applying `transform` to all eight corners
    pub fn transformed(&self, transform: &Transform) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        let mut out = Bounds::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out = out.include_point(transform.transform_point(corner));
        }
        out
    }
}

/// A light emitted by a blueprint, positioned relative to the blueprint origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSpec {
    pub offset: Vec3,
    pub color: Color,
    /// Relative intensity, 1.0 being a plain household bulb
    pub intensity: f32,
    pub range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    pub shape: PartShape,
    pub transform: Transform,
    pub color: Color,
}

impl Part {
    pub fn new(shape: PartShape, translation: Vec3, color: Color) -> Self {
        Self {
            shape,
            transform: Transform::from_translation(translation),
            color,
        }
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_center_half(Vec3::ZERO, self.shape.half_extents()).transformed(&self.transform)
    }
}

/// A model described as a flat list of colored primitive parts.
///
/// Blueprints stand on the floor: y = 0 is the ground contact plane.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Blueprint {
    pub parts: Vec<Part>,
    pub light: Option<LightSpec>,
}

impl Blueprint {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts, light: None }
    }

    pub fn with_light(mut self, light: LightSpec) -> Self {
        self.light = Some(light);
        self
    }

    /// A blueprint made of a single shape resting on the floor
    pub fn single(shape: PartShape, color: Color) -> Self {
        let lift = shape.half_extents().y;
        Self::new(vec![Part::new(shape, Vec3::Y * lift, color)])
    }

    pub fn bounds(&self) -> Bounds {
        self.parts
            .iter()
            .fold(Bounds::EMPTY, |acc, part| acc.union(part.bounds()))
    }

    /// Replace the color of every part
    pub fn tinted(mut self, color: Color) -> Self {
        for part in &mut self.parts {
            part.color = color;
        }
        self
    }
}

/// Color from a packed `0xRRGGBB` value
pub fn hex(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounds_have_zero_size() {
        assert!(Bounds::EMPTY.is_empty());
        assert_eq!(Bounds::EMPTY.size(), Vec3::ZERO);
        assert!(Bounds::EMPTY.is_degenerate());
    }

    #[test]
    fn rotated_part_swaps_extents() {
        let part = Part::new(PartShape::cuboid(2.0, 1.0, 1.0), Vec3::ZERO, Color::WHITE)
            .rotated(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let size = part.bounds().size();
        assert!((size.x - 1.0).abs() < 1e-4);
        assert!((size.z - 2.0).abs() < 1e-4);
    }

    #[test]
    fn single_shape_rests_on_floor() {
        let blueprint = Blueprint::single(PartShape::Sphere { radius: 0.5 }, Color::WHITE);
        let bounds = blueprint.bounds();
        assert!(bounds.min.y.abs() < 1e-6);
        assert!((bounds.max.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn capsule_extents_include_caps() {
        let shape = PartShape::Capsule {
            radius: 0.25,
            length: 1.0,
        };
        assert_eq!(shape.half_extents(), Vec3::new(0.25, 0.75, 0.25));
    }

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(hex(0xff4b2b), Color::srgb_u8(0xff, 0x4b, 0x2b));
    }
}
