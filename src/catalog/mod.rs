//! Object vocabulary: keyword normalization, built-in assets and cosmetic presets.

mod keywords;
mod local;
mod presets;

pub use keywords::{normalize_keyword, singularize, ObjectClass};
pub use local::{local_asset, palette_keywords, LocalAsset};
pub use presets::{color_from_word, size_from_word, MaterialPreset};
