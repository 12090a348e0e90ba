//! Scene snapshots and debounced autosave.
//!
//! Saves are built from each object's keyword, [`SavedTransform`] and cosmetic
//! overrides only, never from the live (possibly physics-drifted) transform.

mod autosave;
mod snapshot;
mod store;

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::tasks::IoTaskPool;

pub use autosave::Autosave;
pub use snapshot::{ObjectRecord, SavedObject, SceneSnapshot, SerializedTransform};
pub use store::{RonFileStore, SceneStore, StoreError};

use crate::editor::StatusLine;
use crate::physics::PhysicsBodies;
use crate::placement::commit_object;
use crate::resolver::{ModelResolved, ResolveRequest, ResolveTicket};
use crate::scene::{spawn_model, Appearance, BaseDimensions, ObjectIds, PlacedObject, SavedTransform};
use crate::ui::Settings;

type SavedObjects = (
    &'static PlacedObject,
    &'static SavedTransform,
    Option<&'static Appearance>,
    Option<&'static BaseDimensions>,
);

/// Something the user did changed persisted state
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct SceneMutated;

/// Outcome of one save: the number of objects written, or `None` when a newer
/// save reached the store first
pub type SaveResult = Result<Option<usize>, StoreError>;

/// Orders writes so an older snapshot never lands on top of a newer one
#[derive(Default)]
struct WriteOrder {
    issued: AtomicU64,
    /// Ticket of the newest snapshot written; held for the duration of a write
    written: Mutex<u64>,
}

impl WriteOrder {
    fn next_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn write(&self, store: &dyn SceneStore, ticket: u64, snapshot: &SceneSnapshot) -> SaveResult {
        let mut written = self.written.lock().unwrap_or_else(|e| e.into_inner());
        if *written > ticket {
            return Ok(None);
        }
        store.save(snapshot)?;
        *written = ticket;
        Ok(Some(snapshot.objects.len()))
    }
}

/// The store plus the channel its background saves report back on
#[derive(Resource)]
pub struct SceneStorage {
    store: Option<Arc<dyn SceneStore>>,
    project_id: String,
    order: Arc<WriteOrder>,
    sender: Sender<SaveResult>,
    receiver: Mutex<Receiver<SaveResult>>,
}

impl SceneStorage {
    pub fn new(store: Option<Arc<dyn SceneStore>>, project_id: impl Into<String>) -> Self {
        let (sender, receiver) = channel();
        Self {
            store,
            project_id: project_id.into(),
            order: Arc::default(),
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Save on the IO task pool. Returns false when there is no store.
    pub fn save_in_background(&self, snapshot: SceneSnapshot) -> bool {
        let Some(store) = self.store.clone() else {
            return false;
        };
        let sender = self.sender.clone();
        let order = self.order.clone();
        let ticket = order.next_ticket();
        IoTaskPool::get()
            .spawn(async move {
                let _ = sender.send(order.write(store.as_ref(), ticket, &snapshot));
            })
            .detach();
        true
    }

    /// Save on the calling thread. Background saves started earlier are not written
    /// over it.
    pub fn save_now(&self, snapshot: &SceneSnapshot) -> SaveResult {
        match &self.store {
            Some(store) => self.order.write(store.as_ref(), self.order.next_ticket(), snapshot),
            None => Ok(None),
        }
    }

    pub fn load(&self) -> Result<Option<SceneSnapshot>, StoreError> {
        match &self.store {
            Some(store) => store.load(&self.project_id),
            None => Ok(None),
        }
    }

    /// Results of every background save finished since the last call
    pub fn drain(&self) -> Vec<SaveResult> {
        let receiver = self.receiver.lock().unwrap_or_else(|e| e.into_inner());
        receiver.try_iter().collect()
    }
}

/// Saved objects waiting for their models, by snapshot index
#[derive(Resource, Default)]
pub struct PendingRestore {
    records: HashMap<usize, ObjectRecord>,
}

impl PendingRestore {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget objects that have not been restored yet
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        let delay = app
            .world()
            .get_resource::<Settings>()
            .map_or(1.0, |settings| settings.autosave_delay_secs);

        app.add_message::<SceneMutated>()
            .insert_resource(Autosave::new(f64::from(delay)))
            .init_resource::<PendingRestore>()
            .add_systems(PreStartup, setup_storage)
            .add_systems(Startup, request_restore)
            .add_systems(
                Update,
                (restore_objects, track_mutations, start_due_save, collect_save_results).chain(),
            )
            .add_systems(Last, flush_on_exit);
    }
}

fn setup_storage(mut commands: Commands, settings: Res<Settings>) {
    let store: Option<Arc<dyn SceneStore>> = match RonFileStore::in_data_dir() {
        Ok(store) => {
            info!("Scenes stored in {:?}", store.root());
            Some(Arc::new(store))
        }
        Err(e) => {
            error!("Scene persistence disabled: {}", e);
            None
        }
    };
    commands.insert_resource(SceneStorage::new(store, settings.project_id.clone()));
}

/// Ask for every saved object's model; they are placed as results arrive
fn request_restore(
    storage: Res<SceneStorage>,
    mut pending: ResMut<PendingRestore>,
    mut resolve: MessageWriter<ResolveRequest>,
    mut status: ResMut<StatusLine>,
) {
    let snapshot = match storage.load() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return,
        Err(e) => {
            error!("Failed to load scene {}: {}", storage.project_id(), e);
            status.error(format!("Could not load saved scene: {e}"));
            return;
        }
    };

    info!("Restoring {} object(s) for project {}", snapshot.objects.len(), snapshot.project_id);
    for (index, record) in snapshot.objects.into_iter().enumerate() {
        if record.transform.to_transform().is_none() {
            warn!("Skipping saved {} with an invalid transform", record.keyword);
            continue;
        }
        resolve.write(ResolveRequest {
            ticket: ResolveTicket::Restore(index),
            keyword: record.keyword.clone(),
        });
        pending.records.insert(index, record);
    }
}

/// Place restored objects directly at their saved transforms, without an autosave
fn restore_objects(
    mut events: MessageReader<ModelResolved>,
    mut pending: ResMut<PendingRestore>,
    mut ids: ResMut<ObjectIds>,
    mut bodies: ResMut<PhysicsBodies>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    for ModelResolved { ticket, resolved } in events.read() {
        let ResolveTicket::Restore(index) = *ticket else {
            continue;
        };
        let Some(record) = pending.records.remove(&index) else {
            continue;
        };
        let Some(transform) = record.transform.to_transform() else {
            continue;
        };

        let entity = spawn_model(
            &mut commands,
            &mut meshes,
            &mut materials,
            &asset_server,
            &resolved.template,
            transform,
        );
        commit_object(
            &mut commands,
            &mut ids,
            &mut bodies,
            entity,
            &record.keyword,
            resolved.source,
            transform,
            record.base_dimensions(resolved.template.size()),
            record.appearance(),
        );
        debug!("Restored {} ({})", record.keyword, resolved.source.label());
    }
}

fn track_mutations(mut events: MessageReader<SceneMutated>, mut autosave: ResMut<Autosave>, time: Res<Time>) {
    if events.read().count() > 0 {
        autosave.mark_dirty(time.elapsed_secs_f64());
    }
}

/// Snapshot of the scene, including saved objects still waiting to be restored
fn capture(
    project_id: &str,
    objects: &Query<SavedObjects>,
    pending: &PendingRestore,
) -> SceneSnapshot {
    let mut snapshot = SceneSnapshot::capture(project_id, objects.iter());
    let mut waiting: Vec<_> = pending.records.iter().collect();
    waiting.sort_by_key(|(index, _)| **index);
    snapshot.objects.extend(waiting.into_iter().map(|(_, record)| record.clone()));
    snapshot
}

fn start_due_save(
    mut autosave: ResMut<Autosave>,
    time: Res<Time>,
    storage: Res<SceneStorage>,
    pending: Res<PendingRestore>,
    objects: Query<SavedObjects>,
) {
    if !autosave.poll(time.elapsed_secs_f64()) {
        return;
    }
    let snapshot = capture(storage.project_id(), &objects, &pending);
    debug!("Autosaving {} object(s)", snapshot.objects.len());
    if !storage.save_in_background(snapshot) {
        autosave.finish();
    }
}

fn collect_save_results(storage: Res<SceneStorage>, mut autosave: ResMut<Autosave>, mut status: ResMut<StatusLine>) {
    for result in storage.drain() {
        autosave.finish();
        match result {
            Ok(Some(count)) => debug!("Saved {} object(s)", count),
            Ok(None) => debug!("Autosave superseded by a newer save"),
            Err(e) => {
                error!("Autosave failed: {}", e);
                status.error(format!("Autosave failed: {e}"));
            }
        }
    }
}

/// Write pending edits synchronously before the app closes, including edits whose
/// background save has not finished yet
fn flush_on_exit(
    mut exits: MessageReader<AppExit>,
    autosave: Res<Autosave>,
    storage: Res<SceneStorage>,
    pending: Res<PendingRestore>,
    objects: Query<SavedObjects>,
) {
    if exits.read().count() == 0 || !autosave.has_unsaved_work() {
        return;
    }
    let snapshot = capture(storage.project_id(), &objects, &pending);
    match storage.save_now(&snapshot) {
        Ok(Some(count)) => info!("Saved {} object(s) on exit", count),
        Ok(None) => {}
        Err(e) => error!("Failed to save on exit: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::catalog::ObjectClass;
    use crate::resolver::SourceType;
    use crate::scene::ObjectId;

    /// Records the object count of every snapshot it is asked to save
    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<usize>>,
    }

    impl RecordingStore {
        fn saved(&self) -> Vec<usize> {
            self.saved.lock().map(|saved| saved.clone()).unwrap_or_default()
        }
    }

    impl SceneStore for RecordingStore {
        fn save(&self, snapshot: &SceneSnapshot) -> Result<(), StoreError> {
            if let Ok(mut saved) = self.saved.lock() {
                saved.push(snapshot.objects.len());
            }
            Ok(())
        }

        fn load(&self, _project_id: &str) -> Result<Option<SceneSnapshot>, StoreError> {
            Ok(None)
        }
    }

    fn snapshot_of(count: usize) -> SceneSnapshot {
        let record = ObjectRecord {
            keyword: "chair".into(),
            transform: SerializedTransform {
                translation: [0.0; 3],
                rotation: [0.0, 0.0, 0.0, 1.0],
                scale: [1.0; 3],
            },
            color: None,
            material: None,
            light_intensity: None,
            base_size: None,
            base_scale: None,
        };
        SceneSnapshot {
            project_id: "p".into(),
            objects: vec![record; count],
        }
    }

    #[test]
    fn older_save_never_overwrites_newer() {
        let store = Arc::new(RecordingStore::default());
        let storage = SceneStorage::new(Some(store.clone()), "p");

        // A background save took its ticket, then the exit flush ran before it wrote
        let stale = storage.order.next_ticket();
        assert!(matches!(storage.save_now(&snapshot_of(2)), Ok(Some(2))));
        assert!(matches!(
            storage.order.write(store.as_ref(), stale, &snapshot_of(1)),
            Ok(None)
        ));
        assert_eq!(store.saved(), vec![2]);
    }

    #[test]
    fn exit_flushes_while_save_in_flight() {
        let store = Arc::new(RecordingStore::default());
        let mut world = World::new();
        world.insert_resource(SceneStorage::new(Some(store.clone()), "p"));
        world.init_resource::<PendingRestore>();
        world.init_resource::<Messages<AppExit>>();

        let mut autosave = Autosave::new(1.0);
        autosave.mark_dirty(0.0);
        assert!(autosave.poll(1.0));
        world.insert_resource(autosave);

        let transform = Transform::from_xyz(1.0, 0.0, 2.0);
        world.spawn((
            PlacedObject {
                id: ObjectId(1),
                keyword: "chair".into(),
                source: SourceType::Procedural,
                class: ObjectClass::of("chair"),
            },
            SavedTransform::capture(&transform),
            transform,
        ));

        world.resource_mut::<Messages<AppExit>>().write(AppExit::Success);
        world.run_system_once(flush_on_exit).expect("flush on exit");
        assert_eq!(store.saved(), vec![1]);
    }

    #[test]
    fn exit_without_edits_writes_nothing() {
        let store = Arc::new(RecordingStore::default());
        let mut world = World::new();
        world.insert_resource(SceneStorage::new(Some(store.clone()), "p"));
        world.init_resource::<PendingRestore>();
        world.init_resource::<Messages<AppExit>>();
        world.insert_resource(Autosave::new(1.0));

        world.resource_mut::<Messages<AppExit>>().write(AppExit::Success);
        world.run_system_once(flush_on_exit).expect("flush on exit");
        assert!(store.saved().is_empty());
    }

    #[test]
    fn storage_without_store_is_inert() {
        let storage = SceneStorage::new(None, "p");
        let snapshot = SceneSnapshot {
            project_id: "p".into(),
            objects: Vec::new(),
        };
        assert!(!storage.save_in_background(snapshot.clone()));
        assert!(matches!(storage.save_now(&snapshot), Ok(None)));
        assert!(matches!(storage.load(), Ok(None)));
        assert!(storage.drain().is_empty());
    }
}
