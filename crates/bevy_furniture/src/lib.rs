//! # bevy_furniture
//!
//! Parametric blueprints for furniture, fixtures and props, assembled from Bevy
//! primitive shapes.
//!
//! ```ignore
//! use bevy_furniture::prelude::*;
//!
//! let table = table(&TableParams { width: 1.6, ..default() });
//! for part in &table.parts {
//!     let mesh = part.shape.mesh();
//!     // spawn with part.transform and part.color
//! }
//! ```
//!
//! Generators are pure: the same parameters always produce the same blueprint.

pub mod blueprint;
pub mod figures;
pub mod household;
pub mod seating;

pub use blueprint::{hex, Blueprint, Bounds, LightSpec, Part, PartShape};
pub use household::{BoxParams, PlantParams, TableParams};
pub use seating::ChairParams;

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::blueprint::{hex, Blueprint, Bounds, LightSpec, Part, PartShape};
    pub use crate::figures::*;
    pub use crate::household::*;
    pub use crate::seating::*;
    pub use crate::Archetype;
}

/// The fixed set of shapes that can be generated without any asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Archetype {
    Table,
    Chair,
    Armchair,
    OfficeChair,
    Sofa,
    Bed,
    Lamp,
    Plant,
    Car,
    Food,
    Tool,
    Electronics,
    Human,
    Dragon,
    Animal,
    Carpet,
    Box,
}

impl Archetype {
    pub const ALL: [Archetype; 17] = [
        Archetype::Table,
        Archetype::Chair,
        Archetype::Armchair,
        Archetype::OfficeChair,
        Archetype::Sofa,
        Archetype::Bed,
        Archetype::Lamp,
        Archetype::Plant,
        Archetype::Car,
        Archetype::Food,
        Archetype::Tool,
        Archetype::Electronics,
        Archetype::Human,
        Archetype::Dragon,
        Archetype::Animal,
        Archetype::Carpet,
        Archetype::Box,
    ];

    /// Match a canonical keyword to the archetype that can stand in for it
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let archetype = match keyword {
            "table" | "desk" => Archetype::Table,
            "chair" | "stool" => Archetype::Chair,
            "armchair" => Archetype::Armchair,
            "officechair" => Archetype::OfficeChair,
            "sofa" | "couch" => Archetype::Sofa,
            "bed" => Archetype::Bed,
            "lamp" | "light" => Archetype::Lamp,
            "plant" | "flower" | "tree" => Archetype::Plant,
            "car" | "vehicle" => Archetype::Car,
            "food" | "apple" | "fruit" => Archetype::Food,
            "tool" | "hammer" => Archetype::Tool,
            "tv" | "computer" | "monitor" | "laptop" => Archetype::Electronics,
            "human" | "person" | "character" => Archetype::Human,
            "dragon" | "monster" => Archetype::Dragon,
            "animal" | "dog" | "cat" | "horse" => Archetype::Animal,
            "carpet" | "rug" => Archetype::Carpet,
            "box" | "cube" | "crate" => Archetype::Box,
            _ => return None,
        };
        Some(archetype)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Table => "table",
            Archetype::Chair => "chair",
            Archetype::Armchair => "armchair",
            Archetype::OfficeChair => "officechair",
            Archetype::Sofa => "sofa",
            Archetype::Bed => "bed",
            Archetype::Lamp => "lamp",
            Archetype::Plant => "plant",
            Archetype::Car => "car",
            Archetype::Food => "food",
            Archetype::Tool => "tool",
            Archetype::Electronics => "electronics",
            Archetype::Human => "human",
            Archetype::Dragon => "dragon",
            Archetype::Animal => "animal",
            Archetype::Carpet => "carpet",
            Archetype::Box => "box",
        }
    }

    /// Generate the blueprint with default parameters
    pub fn build(&self) -> Blueprint {
        match self {
            Archetype::Table => household::table(&TableParams::default()),
            Archetype::Chair => seating::chair(&ChairParams::default()),
            Archetype::Armchair => seating::armchair(),
            Archetype::OfficeChair => seating::office_chair(),
            Archetype::Sofa => seating::sofa(),
            Archetype::Bed => household::bed(),
            Archetype::Lamp => household::lamp(),
            Archetype::Plant => household::plant(&PlantParams::default()),
            Archetype::Car => figures::car(),
            Archetype::Food => figures::food(),
            Archetype::Tool => figures::tool(),
            Archetype::Electronics => household::electronics(),
            Archetype::Human => figures::human(),
            Archetype::Dragon => figures::dragon(),
            Archetype::Animal => figures::animal(),
            Archetype::Carpet => household::carpet(),
            Archetype::Box => household::boxed(&BoxParams::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_archetype_builds_solid_geometry() {
        for archetype in Archetype::ALL {
            let blueprint = archetype.build();
            assert!(!blueprint.parts.is_empty(), "{archetype:?}");
            assert!(!blueprint.bounds().is_degenerate(), "{archetype:?}");
        }
    }

    #[test]
    fn names_round_trip_through_keywords() {
        for archetype in Archetype::ALL {
            if archetype == Archetype::Electronics {
                continue;
            }
            assert_eq!(Archetype::from_keyword(archetype.name()), Some(archetype));
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(Archetype::from_keyword("desk"), Some(Archetype::Table));
        assert_eq!(Archetype::from_keyword("tv"), Some(Archetype::Electronics));
        assert_eq!(Archetype::from_keyword("bookshelf"), None);
        assert_eq!(Archetype::from_keyword("zzz_unknown_creature"), None);
    }
}
