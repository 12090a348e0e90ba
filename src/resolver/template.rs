use bevy::prelude::*;
use bevy_furniture::{Blueprint, Bounds, LightSpec};

/// Which resolution tier produced a model.
///
/// Used for status reporting only, never for identity or persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceType {
    Local,
    Remote,
    Procedural,
    Primitive,
}

impl SourceType {
    pub fn label(&self) -> &'static str {
        match self {
            SourceType::Local => "local",
            SourceType::Remote => "remote",
            SourceType::Procedural => "procedural",
            SourceType::Primitive => "primitive",
        }
    }
}

/// Where a template's geometry comes from
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Assembled from primitive parts
    Blueprint(Blueprint),
    /// A glTF scene file, relative to the asset root
    Gltf { path: String },
}

/// An owned, instantiable description of a model.
///
/// Templates hold no render handles: every instantiation creates its own meshes and
/// materials, so placed objects never share mutable state.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelTemplate {
    pub keyword: String,
    pub geometry: Geometry,
    /// Uniform import scale applied on top of the geometry's own units
    pub scale: f32,
    /// Unscaled local bounds of the geometry
    pub bounds: Bounds,
}

impl ModelTemplate {
    pub fn from_blueprint(keyword: impl Into<String>, blueprint: Blueprint) -> Self {
        let bounds = blueprint.bounds();
        Self {
            keyword: keyword.into(),
            geometry: Geometry::Blueprint(blueprint),
            scale: 1.0,
            bounds,
        }
    }

    /// World size of the model at its import scale
    pub fn size(&self) -> Vec3 {
        self.bounds.size() * self.scale
    }

    pub fn light(&self) -> Option<LightSpec> {
        match &self.geometry {
            Geometry::Blueprint(blueprint) => blueprint.light,
            Geometry::Gltf { .. } => None,
        }
    }
}

/// Result of resolving a keyword
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub template: ModelTemplate,
    pub source: SourceType,
}
