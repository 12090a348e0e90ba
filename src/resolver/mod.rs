//! Model resolution: turns a keyword into a renderable template.
//!
//! Resolution runs on a background tokio runtime; results come back to the ECS as
//! [`ModelResolved`] messages, tagged with the [`ResolveTicket`] of the request so
//! that consumers can discard results they no longer want.

mod chain;
mod fetch;
mod glb;
mod search;
mod template;

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

pub use chain::{primitive_blueprint, AssetSource, BoxFuture, LoadedAsset, ModelResolver, ModelSearch, TierMiss};
pub use fetch::{download_file_name, FetchError, FileAssetSource};
pub use glb::{model_bounds, GlbError};
pub use search::{parse_search_response, rank_hits, relevance, PolyPizzaSearch, SearchError, SearchHit, TtlCache};
pub use template::{Geometry, ModelTemplate, Resolved, SourceType};

use crate::ui::Settings;

/// Identifies who asked for a model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolveTicket {
    /// A ghost preview, by preview generation
    Preview(u64),
    /// An object restored from a saved scene, by its index in the snapshot
    Restore(usize),
}

/// Ask for a keyword to be resolved
#[derive(Message, Clone, Debug)]
pub struct ResolveRequest {
    pub ticket: ResolveTicket,
    pub keyword: String,
}

/// Drop every cached template so the next request resolves again
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct ClearModelCache;

/// A finished resolution
#[derive(Message, Clone, Debug)]
pub struct ModelResolved {
    pub ticket: ResolveTicket,
    pub resolved: Resolved,
}

/// Owns the resolver and the runtime its remote tiers run on
#[derive(Resource)]
pub struct ResolverRuntime {
    resolver: ModelResolver,
    /// Absent when no runtime could be started; only offline tiers are used then
    runtime: Option<tokio::runtime::Runtime>,
    sender: Sender<ModelResolved>,
    receiver: Mutex<Receiver<ModelResolved>>,
}

impl ResolverRuntime {
    pub fn new(resolver: ModelResolver, runtime: Option<tokio::runtime::Runtime>) -> Self {
        let (sender, receiver) = channel();
        Self {
            resolver,
            runtime,
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    pub fn resolver(&self) -> &ModelResolver {
        &self.resolver
    }

    /// Start resolving in the background
    pub fn submit(&self, request: ResolveRequest) {
        let ResolveRequest { ticket, keyword } = request;
        let Some(runtime) = &self.runtime else {
            let resolved = self.resolver.resolve_offline(&keyword);
            let _ = self.sender.send(ModelResolved { ticket, resolved });
            return;
        };

        let resolver = self.resolver.clone();
        let sender = self.sender.clone();
        runtime.spawn(async move {
            let resolved = resolver.resolve(&keyword).await;
            // The receiver only goes away with the app
            let _ = sender.send(ModelResolved { ticket, resolved });
        });
    }

    /// Collect every resolution finished since the last call
    pub fn drain(&self) -> Vec<ModelResolved> {
        let receiver = self.receiver.lock().unwrap_or_else(|e| e.into_inner());
        receiver.try_iter().collect()
    }
}

pub struct ResolverPlugin;

impl Plugin for ResolverPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ResolveRequest>()
            .add_message::<ModelResolved>()
            .add_message::<ClearModelCache>()
            .add_systems(PreStartup, setup_resolver)
            .add_systems(PreUpdate, (clear_model_cache, dispatch_resolve_requests, collect_resolved).chain());
    }
}

fn setup_resolver(mut commands: Commands, settings: Res<Settings>) {
    let root = settings.asset_root_path();
    let assets: Arc<dyn AssetSource> =
        match FileAssetSource::new(root.clone(), settings.download_dir.clone(), settings.download_timeout()) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                error!("Model downloads unavailable: {}", e);
                Arc::new(OfflineAssets)
            }
        };
    let mut resolver = ModelResolver::new(assets);

    match (settings.remote_search_enabled, Settings::api_key()) {
        (false, _) => info!("Remote model search disabled in settings"),
        (true, None) => warn!(
            "Remote model search skipped: {} is not set",
            crate::ui::settings::API_KEY_VAR
        ),
        (true, Some(key)) => match PolyPizzaSearch::new(
            &settings.search_endpoint,
            key,
            settings.search_timeout(),
            settings.search_cache_ttl(),
        ) {
            Ok(search) => resolver = resolver.with_search(Arc::new(search)),
            Err(e) => error!("Remote model search unavailable: {}", e),
        },
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("model-resolver")
        .enable_all()
        .build();
    let runtime = match runtime {
        Ok(runtime) => Some(runtime),
        Err(e) => {
            error!("Failed to start resolver runtime, using built-in shapes only: {}", e);
            None
        }
    };

    info!("Model resolver ready, assets at {:?}", root);
    commands.insert_resource(ResolverRuntime::new(resolver, runtime));
}

fn clear_model_cache(mut events: MessageReader<ClearModelCache>, runtime: Res<ResolverRuntime>) {
    if events.read().count() > 0 {
        runtime.resolver().clear_cache();
    }
}

fn dispatch_resolve_requests(mut requests: MessageReader<ResolveRequest>, runtime: Res<ResolverRuntime>) {
    for request in requests.read() {
        runtime.submit(request.clone());
    }
}

fn collect_resolved(runtime: Res<ResolverRuntime>, mut resolved: MessageWriter<ModelResolved>) {
    for outcome in runtime.drain() {
        resolved.write(outcome);
    }
}

/// Stand-in asset source when no HTTP client could be built
struct OfflineAssets;

impl AssetSource for OfflineAssets {
    fn load_local<'a>(&'a self, asset: &'a crate::catalog::LocalAsset) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
        Box::pin(async move {
            Err(FetchError::Request(format!("{} is not reachable offline", asset.path)))
        })
    }

    fn download<'a>(&'a self, _keyword: &'a str, url: &'a str) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
        Box::pin(async move { Err(FetchError::Request(format!("{url} is not reachable offline"))) })
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;
    use bevy_furniture::Bounds;

    use super::*;

    /// Every built-in asset loads with unit bounds
    struct LocalAssets;

    impl AssetSource for LocalAssets {
        fn load_local<'a>(&'a self, asset: &'a crate::catalog::LocalAsset) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
            Box::pin(async move {
                Ok(LoadedAsset {
                    path: asset.path.to_string(),
                    bounds: Bounds::new(Vec3::ZERO, Vec3::ONE),
                })
            })
        }

        fn download<'a>(&'a self, _keyword: &'a str, url: &'a str) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
            Box::pin(async move { Err(FetchError::Request(format!("{url} is not reachable"))) })
        }
    }

    #[tokio::test]
    async fn clear_message_empties_resolver_cache() {
        let resolver = ModelResolver::new(Arc::new(LocalAssets));
        assert_eq!(resolver.resolve("lamp").await.source, SourceType::Local);
        assert!(resolver.is_cached("lamp"));

        let mut world = World::new();
        world.insert_resource(ResolverRuntime::new(resolver, None));
        world.init_resource::<Messages<ClearModelCache>>();

        world.run_system_once(clear_model_cache).expect("clear cache");
        assert!(world.resource::<ResolverRuntime>().resolver().is_cached("lamp"));

        world.resource_mut::<Messages<ClearModelCache>>().write(ClearModelCache);
        world.run_system_once(clear_model_cache).expect("clear cache");
        assert!(!world.resource::<ResolverRuntime>().resolver().is_cached("lamp"));
    }

    #[test]
    fn offline_runtime_resolves_synchronously() {
        let runtime = ResolverRuntime::new(ModelResolver::new(Arc::new(OfflineAssets)), None);
        runtime.submit(ResolveRequest {
            ticket: ResolveTicket::Preview(3),
            keyword: "chair".to_string(),
        });
        runtime.submit(ResolveRequest {
            ticket: ResolveTicket::Restore(0),
            keyword: "zzz".to_string(),
        });

        let results = runtime.drain();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ticket, ResolveTicket::Preview(3));
        assert_eq!(results[0].resolved.source, SourceType::Procedural);
        assert_eq!(results[1].resolved.source, SourceType::Primitive);
        assert!(runtime.drain().is_empty());
    }
}
