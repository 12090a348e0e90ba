use bevy::prelude::*;

use super::{parse_command, PlacementRequest, SceneCommand, Target};
use crate::editor::StatusLine;
use crate::persistence::{PendingRestore, SceneMutated};
use crate::physics::{detach_body, place_body, PhysicsBodies};
use crate::scene::{PlacedObject, SavedTransform};
use crate::selection::Selection;

/// How long the "voice unavailable" notice stays up
const NOTICE_SECS: f64 = 4.0;

/// A line of text from the command bar
#[derive(Message, Clone, Debug)]
pub struct SubmitCommand(pub String);

/// Queue objects for ghost placement, previewed one after another
#[derive(Message, Clone, Debug)]
pub struct PlaceObjects(pub Vec<PlacementRequest>);

#[derive(Message, Clone, Debug)]
pub struct DeleteObjects(pub Target);

/// Delete every placed object
#[derive(Message, Clone, Debug)]
pub struct ClearScene;

#[derive(Message, Clone, Debug)]
pub struct MoveObjects {
    pub target: Target,
    pub offset: Vec3,
}

pub struct OperationsPlugin;

impl Plugin for OperationsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SubmitCommand>()
            .add_message::<PlaceObjects>()
            .add_message::<DeleteObjects>()
            .add_message::<ClearScene>()
            .add_message::<MoveObjects>()
            .add_systems(
                Update,
                (
                    handle_submitted_commands,
                    (handle_delete_objects, handle_clear_scene, handle_move_objects),
                )
                    .chain(),
            );
    }
}

fn handle_submitted_commands(
    mut submitted: MessageReader<SubmitCommand>,
    mut place: MessageWriter<PlaceObjects>,
    mut delete: MessageWriter<DeleteObjects>,
    mut clear: MessageWriter<ClearScene>,
    mut moves: MessageWriter<MoveObjects>,
    mut status: ResMut<StatusLine>,
    time: Res<Time>,
) {
    for SubmitCommand(text) in submitted.read() {
        match parse_command(text) {
            Ok(SceneCommand::Place(requests)) => {
                info!("Command \"{}\" queued {} object(s)", text, requests.len());
                place.write(PlaceObjects(requests));
            }
            Ok(SceneCommand::Delete(target)) => {
                delete.write(DeleteObjects(target));
            }
            Ok(SceneCommand::Clear) => {
                clear.write(ClearScene);
            }
            Ok(SceneCommand::Move { target, offset }) => {
                moves.write(MoveObjects { target, offset });
            }
            Ok(SceneCommand::Voice) => {
                status.notify("Voice input is unavailable in this build", time.elapsed_secs_f64(), NOTICE_SECS);
            }
            Err(e) => {
                warn!("Rejected command \"{}\": {}", text, e);
                status.error(e.to_string());
            }
        }
    }
}

/// Entities matching a target, in no particular order
fn targets(target: &Target, selection: &Selection, objects: &Query<(Entity, &PlacedObject)>) -> Vec<Entity> {
    match target {
        Target::Selected => selection
            .entity
            .filter(|entity| objects.contains(*entity))
            .into_iter()
            .collect(),
        Target::Keyword(keyword) => objects
            .iter()
            .filter(|(_, object)| &object.keyword == keyword)
            .map(|(entity, _)| entity)
            .collect(),
    }
}

/// Remove a placed object: its body first, then the object itself
pub fn remove_object(commands: &mut Commands, bodies: &mut PhysicsBodies, selection: &mut Selection, entity: Entity) {
    detach_body(commands, bodies, entity);
    if let Ok(mut object) = commands.get_entity(entity) {
        object.despawn();
    }
    if selection.is_selected(entity) {
        selection.clear();
    }
}

fn describe(target: &Target) -> &str {
    match target {
        Target::Selected => "selection",
        Target::Keyword(keyword) => keyword,
    }
}

fn handle_delete_objects(
    mut events: MessageReader<DeleteObjects>,
    objects: Query<(Entity, &PlacedObject)>,
    mut bodies: ResMut<PhysicsBodies>,
    mut selection: ResMut<Selection>,
    mut status: ResMut<StatusLine>,
    mut mutated: MessageWriter<SceneMutated>,
    mut commands: Commands,
) {
    for DeleteObjects(target) in events.read() {
        let entities = targets(target, &selection, &objects);
        if entities.is_empty() {
            status.warn(format!("Nothing to delete for {}", describe(target)));
            continue;
        }
        for entity in &entities {
            remove_object(&mut commands, &mut bodies, &mut selection, *entity);
        }
        info!("Deleted {} object(s) for {}", entities.len(), describe(target));
        status.info(format!("Deleted {} object(s)", entities.len()));
        mutated.write(SceneMutated);
    }
}

fn handle_clear_scene(
    mut events: MessageReader<ClearScene>,
    objects: Query<Entity, With<PlacedObject>>,
    mut bodies: ResMut<PhysicsBodies>,
    mut selection: ResMut<Selection>,
    mut pending: ResMut<PendingRestore>,
    mut status: ResMut<StatusLine>,
    mut mutated: MessageWriter<SceneMutated>,
    mut commands: Commands,
) {
    if events.read().count() == 0 {
        return;
    }
    pending.clear();
    let mut count = 0;
    for entity in &objects {
        remove_object(&mut commands, &mut bodies, &mut selection, entity);
        count += 1;
    }
    info!("Cleared scene ({} objects)", count);
    status.info("Scene cleared");
    mutated.write(SceneMutated);
}

fn handle_move_objects(
    mut events: MessageReader<MoveObjects>,
    objects: Query<(Entity, &PlacedObject)>,
    mut transforms: Query<(&mut Transform, &mut SavedTransform)>,
    bodies: Res<PhysicsBodies>,
    selection: Res<Selection>,
    mut status: ResMut<StatusLine>,
    mut mutated: MessageWriter<SceneMutated>,
    mut commands: Commands,
) {
    for MoveObjects { target, offset } in events.read() {
        let entities = targets(target, &selection, &objects);
        if entities.is_empty() {
            status.warn(format!("Nothing to move for {}", describe(target)));
            continue;
        }
        for entity in entities {
            let Ok((mut transform, mut saved)) = transforms.get_mut(entity) else {
                continue;
            };
            transform.translation += *offset;
            *saved = SavedTransform::capture(&transform);
            place_body(&mut commands, &bodies, entity, &transform);
        }
        mutated.write(SceneMutated);
    }
}
