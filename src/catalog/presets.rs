//! Cosmetic presets shared by the property panel and the command parser.

use bevy::prelude::*;
use bevy_furniture::hex;
use serde::{Deserialize, Serialize};

/// Surface finish applied on top of an object's own materials
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialPreset {
    Wood,
    Metal,
    Plastic,
    Glass,
    Stone,
}

impl MaterialPreset {
    pub const ALL: [MaterialPreset; 5] = [
        MaterialPreset::Wood,
        MaterialPreset::Metal,
        MaterialPreset::Plastic,
        MaterialPreset::Glass,
        MaterialPreset::Stone,
    ];

    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "wood" | "wooden" => Some(MaterialPreset::Wood),
            "metal" | "metallic" | "steel" | "iron" => Some(MaterialPreset::Metal),
            "plastic" => Some(MaterialPreset::Plastic),
            "glass" => Some(MaterialPreset::Glass),
            "stone" | "marble" | "concrete" => Some(MaterialPreset::Stone),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialPreset::Wood => "Wood",
            MaterialPreset::Metal => "Metal",
            MaterialPreset::Plastic => "Plastic",
            MaterialPreset::Glass => "Glass",
            MaterialPreset::Stone => "Stone",
        }
    }

    /// Color used when the preset is applied without an explicit color
    pub fn tint(&self) -> Option<Color> {
        match self {
            MaterialPreset::Wood => Some(hex(0x8b5a2b)),
            MaterialPreset::Stone => Some(hex(0x9e9e9e)),
            _ => None,
        }
    }

    /// Write the preset's surface parameters into a material
    pub fn apply(&self, material: &mut StandardMaterial) {
        let (roughness, metallic, reflectance) = match self {
            MaterialPreset::Wood => (0.8, 0.0, 0.3),
            MaterialPreset::Metal => (0.25, 1.0, 0.5),
            MaterialPreset::Plastic => (0.4, 0.0, 0.5),
            MaterialPreset::Glass => (0.05, 0.0, 0.9),
            MaterialPreset::Stone => (0.95, 0.0, 0.2),
        };
        material.perceptual_roughness = roughness;
        material.metallic = metallic;
        material.reflectance = reflectance;

        if *self == MaterialPreset::Glass {
            material.base_color = material.base_color.with_alpha(0.35);
            material.alpha_mode = AlphaMode::Blend;
        } else {
            material.base_color = material.base_color.with_alpha(1.0);
            material.alpha_mode = AlphaMode::Opaque;
        }
    }
}

/// Map a color word to its color
pub fn color_from_word(word: &str) -> Option<Color> {
    let rgb = match word {
        "red" => 0xff0000,
        "blue" => 0x0000ff,
        "green" => 0x00ff00,
        "yellow" => 0xffff00,
        "black" => 0x000000,
        "white" => 0xffffff,
        "brown" => 0x8b4513,
        "gray" | "grey" => 0x808080,
        "orange" => 0xffa500,
        "purple" => 0x800080,
        "pink" => 0xffc0cb,
        "cyan" => 0x00ffff,
        "magenta" => 0xff00ff,
        _ => return None,
    };
    Some(hex(rgb))
}

/// Map a size word to a uniform scale factor
pub fn size_from_word(word: &str) -> Option<f32> {
    match word {
        "tiny" => Some(0.3),
        "small" | "little" => Some(0.6),
        "medium" | "normal" => Some(1.0),
        "large" | "big" => Some(1.5),
        "huge" | "massive" | "giant" => Some(2.5),
        _ => None,
    }
}
