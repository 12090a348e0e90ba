//! Discrete, type-aware scaling.
//!
//! A raw slider value maps to the nearest permitted step for the object's class, and
//! the step is applied relative to the object's base dimensions.

use bevy::prelude::*;

use crate::catalog::ObjectClass;
use crate::constants::selection::{SCALE_SLIDER_MAX, SCALE_SLIDER_MIN};
use crate::scene::BaseDimensions;

const ELECTRONICS_STEPS: &[f32] = &[0.5, 0.75, 1.0, 1.25, 1.5];
const FURNITURE_STEPS: &[f32] = &[0.5, 0.75, 1.0, 1.25, 1.5, 2.0];
const DEFAULT_STEPS: &[f32] = &[0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0];

/// Widest an electronics object may get, in meters
const ELECTRONICS_MAX_WIDTH: f32 = 1.4;
/// World width range for furniture and electronics, in meters
const MIN_WIDTH: f32 = 0.2;
const MAX_WIDTH: f32 = 2.0;

pub fn scale_steps(class: ObjectClass) -> &'static [f32] {
    match class {
        ObjectClass::Electronics => ELECTRONICS_STEPS,
        ObjectClass::Furniture => FURNITURE_STEPS,
        ObjectClass::Default => DEFAULT_STEPS,
    }
}

/// Permitted step closest to a raw slider value. Ties go to the smaller step.
pub fn nearest_step(class: ObjectClass, raw: f32) -> f32 {
    let raw = if raw.is_finite() {
        raw.clamp(SCALE_SLIDER_MIN, SCALE_SLIDER_MAX)
    } else {
        1.0
    };
    let steps = scale_steps(class);
    let mut best = steps[0];
    for &step in &steps[1..] {
        if (step - raw).abs() < (best - raw).abs() {
            best = step;
        }
    }
    best
}

/// Per-axis factor, relative to base dimensions, for a step
pub fn step_factor(class: ObjectClass, base: &BaseDimensions, step: f32) -> Vec3 {
    let mut factor = match class {
        ObjectClass::Electronics => Vec3::new(step, step, 1.0),
        ObjectClass::Furniture | ObjectClass::Default => Vec3::splat(step),
    };

    let base_width = base.size.x;
    if base_width > f32::EPSILON && class != ObjectClass::Default {
        let mut width = base_width * factor.x;
        if class == ObjectClass::Electronics {
            width = width.min(ELECTRONICS_MAX_WIDTH);
        }
        factor.x = width.clamp(MIN_WIDTH, MAX_WIDTH) / base_width;
    }
    factor
}

/// Root scale for a raw slider value. Depends only on class, base and the raw value.
pub fn scale_for_slider(class: ObjectClass, base: &BaseDimensions, raw: f32) -> Vec3 {
    base.scale_for(step_factor(class, base, nearest_step(class, raw)))
}

/// Step an object is currently at, read from its height factor
pub fn current_step(base: &BaseDimensions, scale: Vec3) -> f32 {
    if base.root_scale.y.abs() <= f32::EPSILON {
        return 1.0;
    }
    scale.y / base.root_scale.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(size: Vec3) -> BaseDimensions {
        BaseDimensions {
            size,
            root_scale: Vec3::ONE,
        }
    }

    #[test]
    fn raw_values_snap_to_class_steps() {
        assert_eq!(nearest_step(ObjectClass::Default, 2.6), 3.0);
        assert_eq!(nearest_step(ObjectClass::Furniture, 2.6), 2.0);
        assert_eq!(nearest_step(ObjectClass::Electronics, 2.6), 1.5);
        assert_eq!(nearest_step(ObjectClass::Default, 0.1), 0.25);
        assert_eq!(nearest_step(ObjectClass::Furniture, f32::NAN), 1.0);
    }

    #[test]
    fn ties_pick_smaller_step() {
        assert_eq!(nearest_step(ObjectClass::Furniture, 1.75), 1.5);
    }

    #[test]
    fn scaling_ignores_current_scale() {
        let chair = base(Vec3::new(0.5, 0.9, 0.5));
        let a = scale_for_slider(ObjectClass::Furniture, &chair, 1.4);
        let b = scale_for_slider(ObjectClass::Furniture, &chair, 1.4);
        assert_eq!(a, b);
        assert_eq!(a, Vec3::splat(1.5));
    }

    #[test]
    fn electronics_keep_thin_silhouette() {
        let tv = base(Vec3::new(1.2, 0.7, 0.1));
        let factor = step_factor(ObjectClass::Electronics, &tv, 1.5);
        assert_eq!(factor.z, 1.0);
        assert_eq!(factor.y, 1.5);
        assert!((tv.size.x * factor.x - ELECTRONICS_MAX_WIDTH).abs() < 1e-5);
    }

    #[test]
    fn furniture_width_is_clamped() {
        let sofa = base(Vec3::new(1.8, 0.8, 0.9));
        let factor = step_factor(ObjectClass::Furniture, &sofa, 2.0);
        assert!((sofa.size.x * factor.x - MAX_WIDTH).abs() < 1e-5);
        assert_eq!(factor.y, 2.0);

        let cup = base(Vec3::new(0.3, 0.1, 0.3));
        let factor = step_factor(ObjectClass::Furniture, &cup, 0.5);
        assert!((cup.size.x * factor.x - MIN_WIDTH).abs() < 1e-5);
    }

    #[test]
    fn default_class_is_uniform() {
        let thing = base(Vec3::new(5.0, 1.0, 1.0));
        assert_eq!(step_factor(ObjectClass::Default, &thing, 3.0), Vec3::splat(3.0));
    }

    #[test]
    fn current_step_reads_height() {
        let b = BaseDimensions {
            size: Vec3::ONE,
            root_scale: Vec3::splat(2.0),
        };
        assert_eq!(current_step(&b, Vec3::splat(3.0)), 1.5);
    }
}
