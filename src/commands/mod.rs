mod operations;
mod parser;
mod request;

pub use operations::*;
pub use parser::{parse_command, ParseError, SceneCommand, Target, MAX_QUANTITY};
pub use request::{PlacementRequest, RequestError};

use bevy::prelude::*;

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(OperationsPlugin);
    }
}
