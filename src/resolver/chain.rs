//! The tiered resolution chain: cache, built-in asset, remote search, procedural
//! archetype, primitive shape.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bevy_furniture::{hex, Archetype, Blueprint, Bounds, PartShape};

use super::fetch::FetchError;
use super::search::{rank_hits, SearchError, SearchHit};
use super::template::{Geometry, ModelTemplate, Resolved, SourceType};
use crate::catalog::{local_asset, LocalAsset};
use crate::constants::resolve::{FALLBACK_COLOR, FALLBACK_SIZE, REMOTE_TARGET_SIZE};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote model-search collaborator
pub trait ModelSearch: Send + Sync {
    fn search<'a>(&'a self, keyword: &'a str) -> BoxFuture<'a, Result<Vec<SearchHit>, SearchError>>;
}

/// A model file available to the renderer, with the bounds of its geometry
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedAsset {
    /// Path relative to the asset root
    pub path: String,
    pub bounds: Bounds,
}

/// Reads built-in asset files and stores downloaded ones
pub trait AssetSource: Send + Sync {
    fn load_local<'a>(&'a self, asset: &'a LocalAsset) -> BoxFuture<'a, Result<LoadedAsset, FetchError>>;
    fn download<'a>(&'a self, keyword: &'a str, url: &'a str) -> BoxFuture<'a, Result<LoadedAsset, FetchError>>;
}

/// Why a tier produced nothing. Logged, never surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TierMiss {
    #[error("remote search is not configured")]
    SearchDisabled,
    #[error("search returned no results")]
    NoResults,
    #[error("model has an empty bounding box")]
    Degenerate,
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Resolves keywords to model templates through the fallback tiers.
///
/// Cheap to clone; clones share the same cache.
#[derive(Clone)]
pub struct ModelResolver {
    assets: Arc<dyn AssetSource>,
    search: Option<Arc<dyn ModelSearch>>,
    cache: Arc<Mutex<HashMap<String, Resolved>>>,
}

impl ModelResolver {
    pub fn new(assets: Arc<dyn AssetSource>) -> Self {
        Self {
            assets,
            search: None,
            cache: Arc::default(),
        }
    }

    pub fn with_search(mut self, search: Arc<dyn ModelSearch>) -> Self {
        self.search = Some(search);
        self
    }

    /// Resolve a canonical keyword. Always produces a model.
    pub async fn resolve(&self, keyword: &str) -> Resolved {
        if let Some(cached) = self.cached(keyword) {
            debug!("Resolver: '{}' served from cache ({})", keyword, cached.source.label());
            return cached;
        }

        match self.resolve_local(keyword).await {
            Ok(Some(resolved)) => {
                info!("Resolver: '{}' loaded from built-in asset", keyword);
                self.remember(keyword, &resolved);
                return resolved;
            }
            Ok(None) => {}
            Err(miss) => warn!("Resolver: built-in asset for '{}' unavailable: {}", keyword, miss),
        }

        match self.resolve_remote(keyword).await {
            Ok(resolved) => {
                info!("Resolver: '{}' downloaded from remote search", keyword);
                self.remember(keyword, &resolved);
                return resolved;
            }
            Err(miss) => warn!("Resolver: remote tier missed for '{}': {}", keyword, miss),
        }

        self.resolve_offline(keyword)
    }

    /// The two tiers that need no I/O: procedural archetype, then primitive shape
    pub fn resolve_offline(&self, keyword: &str) -> Resolved {
        if let Some(archetype) = Archetype::from_keyword(keyword) {
            info!("Resolver: '{}' generated as {}", keyword, archetype.name());
            return Resolved {
                template: ModelTemplate::from_blueprint(keyword, archetype.build()),
                source: SourceType::Procedural,
            };
        }

        warn!("Resolver: no model for '{}', using a primitive", keyword);
        Resolved {
            template: ModelTemplate::from_blueprint(keyword, primitive_blueprint(keyword)),
            source: SourceType::Primitive,
        }
    }

    pub fn is_cached(&self, keyword: &str) -> bool {
        self.lock_cache().contains_key(keyword)
    }

    /// Forget every cached template
    pub fn clear_cache(&self) {
        let mut cache = self.lock_cache();
        info!("Resolver: cleared {} cached templates", cache.len());
        cache.clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Resolved>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cached(&self, keyword: &str) -> Option<Resolved> {
        self.lock_cache().get(keyword).cloned()
    }

    fn remember(&self, keyword: &str, resolved: &Resolved) {
        self.lock_cache().insert(keyword.to_string(), resolved.clone());
    }

    async fn resolve_local(&self, keyword: &str) -> Result<Option<Resolved>, TierMiss> {
        let Some(asset) = local_asset(keyword) else {
            return Ok(None);
        };
        let loaded = self.assets.load_local(&asset).await?;
        Ok(Some(Resolved {
            template: ModelTemplate {
                keyword: keyword.to_string(),
                geometry: Geometry::Gltf { path: loaded.path },
                scale: asset.scale,
                bounds: loaded.bounds,
            },
            source: SourceType::Local,
        }))
    }

    async fn resolve_remote(&self, keyword: &str) -> Result<Resolved, TierMiss> {
        let search = self.search.as_ref().ok_or(TierMiss::SearchDisabled)?;
        let hits = search.search(keyword).await?;
        let best = rank_hits(keyword, hits)
            .into_iter()
            .next()
            .ok_or(TierMiss::NoResults)?;

        let loaded = self.assets.download(keyword, &best.download_url).await?;
        if loaded.bounds.is_degenerate() {
            return Err(TierMiss::Degenerate);
        }

        Ok(Resolved {
            template: ModelTemplate {
                keyword: keyword.to_string(),
                geometry: Geometry::Gltf { path: loaded.path },
                scale: REMOTE_TARGET_SIZE / loaded.bounds.max_dimension(),
                bounds: loaded.bounds,
            },
            source: SourceType::Remote,
        })
    }
}

/// Pick a primitive from the words of the keyword, defaulting to a box.
/// A word matches itself or its plural, never a fragment of a longer word.
pub fn primitive_blueprint(keyword: &str) -> Blueprint {
    let lowered = keyword.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let has = |words: &[&str]| {
        tokens
            .iter()
            .any(|t| words.iter().any(|w| *t == *w || t.strip_suffix('s') == Some(*w)))
    };
    let half = FALLBACK_SIZE / 2.0;

    let shape = if has(&["ball", "sphere", "globe", "orb"]) {
        PartShape::Sphere { radius: half }
    } else if has(&["can", "cylinder", "pillar", "barrel", "tube", "pipe"]) {
        PartShape::Cylinder {
            radius: half,
            height: FALLBACK_SIZE,
        }
    } else if has(&["cone", "pyramid", "spike"]) {
        PartShape::Cone {
            radius: half,
            height: FALLBACK_SIZE,
        }
    } else {
        PartShape::cuboid(FALLBACK_SIZE, FALLBACK_SIZE, FALLBACK_SIZE)
    };

    Blueprint::single(shape, hex(FALLBACK_COLOR))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Asset source with canned bounds that counts how often it is hit
    #[derive(Default)]
    struct MockAssets {
        local_loads: AtomicUsize,
        downloads: AtomicUsize,
        remote_bounds: Option<Bounds>,
    }

    impl AssetSource for MockAssets {
        fn load_local<'a>(&'a self, asset: &'a LocalAsset) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
            Box::pin(async move {
                self.local_loads.fetch_add(1, Ordering::SeqCst);
                Ok(LoadedAsset {
                    path: asset.path.to_string(),
                    bounds: Bounds::new(Vec3::new(-1.0, 0.0, -0.5), Vec3::new(1.0, 0.8, 0.5)),
                })
            })
        }

        fn download<'a>(&'a self, keyword: &'a str, _url: &'a str) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
            Box::pin(async move {
                self.downloads.fetch_add(1, Ordering::SeqCst);
                Ok(LoadedAsset {
                    path: format!("downloads/{keyword}.glb"),
                    bounds: self.remote_bounds.unwrap_or(Bounds::new(Vec3::ZERO, Vec3::new(40.0, 80.0, 10.0))),
                })
            })
        }
    }

    enum MockSearch {
        Hits(Vec<&'static str>),
        Fails,
    }

    impl ModelSearch for MockSearch {
        fn search<'a>(&'a self, _keyword: &'a str) -> BoxFuture<'a, Result<Vec<SearchHit>, SearchError>> {
            Box::pin(async move {
                match self {
                    MockSearch::Hits(names) => Ok(names
                        .iter()
                        .map(|name| SearchHit {
                            name: name.to_string(),
                            download_url: format!("https://models.test/{name}.glb"),
                        })
                        .collect()),
                    MockSearch::Fails => Err(SearchError::Request("operation timed out".into())),
                }
            })
        }
    }

    fn resolver(assets: Arc<MockAssets>, search: MockSearch) -> ModelResolver {
        ModelResolver::new(assets).with_search(Arc::new(search))
    }

    #[tokio::test]
    async fn local_asset_is_cached_after_first_load() {
        let assets = Arc::new(MockAssets::default());
        let resolver = resolver(assets.clone(), MockSearch::Hits(vec![]));

        let first = resolver.resolve("sofa").await;
        assert_eq!(first.source, SourceType::Local);
        assert!(resolver.is_cached("sofa"));

        let second = resolver.resolve("sofa").await;
        assert_eq!(second, first);
        assert_eq!(assets.local_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_model_is_normalized_to_target_size() {
        let assets = Arc::new(MockAssets::default());
        let resolver = resolver(assets.clone(), MockSearch::Hits(vec!["Bookshelf"]));

        let resolved = resolver.resolve("bookshelf").await;
        assert_eq!(resolved.source, SourceType::Remote);
        assert!((resolved.template.size().max_element() - REMOTE_TARGET_SIZE).abs() < 1e-5);
        assert_eq!(assets.downloads.load(Ordering::SeqCst), 1);

        resolver.resolve("bookshelf").await;
        assert_eq!(assets.downloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_search_falls_back_to_procedural_table() {
        let resolver = resolver(Arc::new(MockAssets::default()), MockSearch::Fails);

        let resolved = resolver.resolve("table").await;
        assert_eq!(resolved.source, SourceType::Procedural);
        assert_eq!(resolved.template.geometry, Geometry::Blueprint(Archetype::Table.build()));
        assert!(!resolver.is_cached("table"));
    }

    #[tokio::test]
    async fn unknown_keyword_becomes_fallback_box() {
        let resolver = resolver(Arc::new(MockAssets::default()), MockSearch::Hits(vec![]));

        let resolved = resolver.resolve("zzz_unknown_creature").await;
        assert_eq!(resolved.source, SourceType::Primitive);
        let Geometry::Blueprint(blueprint) = &resolved.template.geometry else {
            panic!("primitive should be a blueprint");
        };
        assert_eq!(blueprint.parts.len(), 1);
        assert!(matches!(blueprint.parts[0].shape, PartShape::Cuboid { .. }));
        assert_eq!(blueprint.parts[0].color, hex(FALLBACK_COLOR));
    }

    #[tokio::test]
    async fn degenerate_download_is_a_miss() {
        let assets = Arc::new(MockAssets {
            remote_bounds: Some(Bounds::new(Vec3::ONE, Vec3::ONE)),
            ..default()
        });
        let resolver = resolver(assets, MockSearch::Hits(vec!["Flat"]));
        assert_eq!(resolver.resolve("poster").await.source, SourceType::Primitive);
    }

    #[tokio::test]
    async fn no_search_configured_skips_remote_tier() {
        let resolver = ModelResolver::new(Arc::new(MockAssets::default()));
        assert_eq!(resolver.resolve("chair").await.source, SourceType::Procedural);
    }

    #[tokio::test]
    async fn clear_cache_forces_reload() {
        let assets = Arc::new(MockAssets::default());
        let resolver = resolver(assets.clone(), MockSearch::Hits(vec![]));
        resolver.resolve("lamp").await;
        resolver.clear_cache();
        assert!(!resolver.is_cached("lamp"));
        resolver.resolve("lamp").await;
        assert_eq!(assets.local_loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn primitive_heuristics() {
        let shape = |k| primitive_blueprint(k).parts[0].shape;
        assert!(matches!(shape("beach ball"), PartShape::Sphere { .. }));
        assert!(matches!(shape("oil barrel"), PartShape::Cylinder { .. }));
        assert!(matches!(shape("pyramid"), PartShape::Cone { .. }));
        assert!(matches!(shape("thing"), PartShape::Cuboid { .. }));
        assert!(matches!(shape("tin can"), PartShape::Cylinder { .. }));
        assert!(matches!(shape("Soda-Cans"), PartShape::Cylinder { .. }));
    }

    #[test]
    fn primitive_words_do_not_match_inside_other_words() {
        let shape = |k| primitive_blueprint(k).parts[0].shape;
        for keyword in ["scanner", "canvas", "american flag", "balloon", "scone"] {
            assert!(matches!(shape(keyword), PartShape::Cuboid { .. }), "{keyword}");
        }
    }
}
