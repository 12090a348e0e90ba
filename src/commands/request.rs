use bevy::prelude::*;
use thiserror::Error;

use crate::catalog::{normalize_keyword, MaterialPreset};

/// Why a placement request was rejected
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    /// Nothing identifying was left after normalization
    #[error("don't know what to place from \"{0}\"")]
    EmptyKeyword(String),
    #[error("invalid scale {0}")]
    InvalidScale(f32),
}

/// What to place, independent of which command source asked for it
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRequest {
    /// Canonical keyword
    pub keyword: String,
    pub color: Option<Color>,
    pub scale: Option<f32>,
    pub material: Option<MaterialPreset>,
}

impl PlacementRequest {
    /// Validate and normalize a request
    pub fn new(
        raw: &str,
        color: Option<Color>,
        scale: Option<f32>,
        material: Option<MaterialPreset>,
    ) -> Result<Self, RequestError> {
        let keyword = normalize_keyword(raw).ok_or_else(|| RequestError::EmptyKeyword(raw.trim().to_string()))?;
        if let Some(scale) = scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(RequestError::InvalidScale(scale));
            }
        }
        Ok(Self {
            keyword,
            color,
            scale,
            material,
        })
    }

    pub fn keyword(raw: &str) -> Result<Self, RequestError> {
        Self::new(raw, None, None, None)
    }

    /// Uniform scale to apply on placement
    pub fn scale_factor(&self) -> f32 {
        self.scale.unwrap_or(1.0)
    }
}
