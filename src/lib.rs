//! # Bevy Scene Builder
//!
//! Build furnished 3D scenes by name. Type `a red sofa and two lamps`, and each
//! object is resolved to a model, previewed as a ghost under the pointer, then
//! committed into an Avian3D physics world where it can be selected, dragged,
//! scaled and recolored. The scene autosaves and is restored on the next launch.
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_scene_builder::SceneBuilderPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SceneBuilderPlugin)
//!         .run();
//! }
//! ```
//!
//! Models come from the first tier that has one: the in-memory cache, the built-in
//! assets, a remote model search (when `POLY_PIZZA_API_KEY` is set), a procedural
//! blueprint, or a plain box.
//!
//! ## Controls
//!
//! - **Placing**: move the pointer, `R` rotates, hold `Shift` to snap, click or
//!   `Enter` confirms, `Esc` cancels
//! - **Selected object**: drag to move, double-click for properties, `Q`/`E` rotate,
//!   `Delete` removes it
//! - **Camera**: hold right mouse to look and fly with WASD, scroll to dolly, `F` frames
//!   the selection
//! - `F2` opens settings

pub mod catalog;
pub mod commands;
pub mod constants;
pub mod editor;
pub mod persistence;
pub mod physics;
pub mod placement;
pub mod resolver;
pub mod scene;
pub mod selection;
pub mod ui;
pub mod utils;

pub use editor::SceneBuilderPlugin;

pub use commands::{parse_command, PlacementRequest, SceneCommand};
pub use persistence::{RonFileStore, SceneSnapshot, SceneStore};
pub use resolver::{ModelResolver, ModelTemplate, SourceType};
pub use scene::{ObjectId, PlacedObject};
