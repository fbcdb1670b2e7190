//! Tiered graph retrieval orchestrator.
//!
//! Lookup order is fast tier, durable tier, external source. A hit in the
//! durable tier backfills the fast tier; a double miss fetches from the
//! source and writes through both tiers, durable first because it is the
//! durability guarantee. Tier failures and undecodable blobs degrade to
//! misses and are logged, never propagated.
//!
//! No per-key locking serialises fetches: concurrent misses for the same
//! key may each call the source and the last writer wins on cache
//! population. That duplication is a deliberate tradeoff in favour of
//! simplicity over a distributed coordination mechanism.

use std::sync::Arc;

use tracing::{debug, warn};

use super::error::GraphError;
use super::graph::NetworkGraph;
use super::place::{CacheKey, PlaceQuery};
use super::ports::{GraphCache, NetworkSource};

/// Orchestrates cache tiers and the external source behind one call.
///
/// Both tiers are injected as trait objects; an unconfigured fast tier is
/// represented by a no-op implementation, so this service never branches
/// on tier presence.
#[derive(Clone)]
pub struct GraphService {
    fast: Arc<dyn GraphCache>,
    durable: Arc<dyn GraphCache>,
    source: Arc<dyn NetworkSource>,
}

impl GraphService {
    /// Assemble the service from its port implementations.
    pub fn new(
        fast: Arc<dyn GraphCache>,
        durable: Arc<dyn GraphCache>,
        source: Arc<dyn NetworkSource>,
    ) -> Self {
        Self {
            fast,
            durable,
            source,
        }
    }

    /// Return the road network for `place`, from cache or freshly fetched.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidQuery`] for blank input;
    /// [`GraphError::Retrieval`] only when both tiers miss and the external
    /// source call fails.
    pub async fn get_graph(&self, place: &str) -> Result<NetworkGraph, GraphError> {
        let place = PlaceQuery::new(place)?;
        let key = CacheKey::from_place(&place);

        if let Some(graph) = self.read_tier(&*self.fast, &key, "fast").await {
            debug!(key = %key, "fast tier hit");
            return Ok(graph);
        }

        if let Some(graph) = self.read_tier(&*self.durable, &key, "durable").await {
            debug!(key = %key, "durable tier hit, backfilling fast tier");
            self.write_tier(&*self.fast, &key, &graph, "fast").await;
            return Ok(graph);
        }

        let graph = self
            .source
            .fetch_network(&place)
            .await
            .map_err(|source| GraphError::retrieval(place.as_str(), source))?;

        self.write_tier(&*self.durable, &key, &graph, "durable").await;
        self.write_tier(&*self.fast, &key, &graph, "fast").await;
        Ok(graph)
    }

    /// Read one tier, degrading backend failures and corrupt blobs to a
    /// miss.
    async fn read_tier(
        &self,
        tier: &dyn GraphCache,
        key: &CacheKey,
        tier_name: &str,
    ) -> Option<NetworkGraph> {
        let blob = match tier.get(key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(error) => {
                warn!(key = %key, tier = tier_name, %error, "cache read degraded to miss");
                return None;
            }
        };

        match NetworkGraph::from_blob(&blob) {
            Ok(graph) => Some(graph),
            Err(error) => {
                warn!(key = %key, tier = tier_name, %error, "corrupt cached blob treated as miss");
                None
            }
        }
    }

    /// Write one tier best-effort; failures are logged and swallowed.
    async fn write_tier(
        &self,
        tier: &dyn GraphCache,
        key: &CacheKey,
        graph: &NetworkGraph,
        tier_name: &str,
    ) {
        let blob = match graph.to_blob() {
            Ok(blob) => blob,
            Err(error) => {
                warn!(key = %key, tier = tier_name, %error, "graph serialisation failed, skipping cache write");
                return;
            }
        };
        if let Err(error) = tier.put(key, &blob).await {
            warn!(key = %key, tier = tier_name, %error, "cache write degraded to no-op");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use rstest::rstest;

    use crate::domain::graph::{GraphEdge, GraphNode, NodeId};
    use crate::domain::ports::{GraphCacheError, NetworkSourceError};

    fn sample_graph() -> NetworkGraph {
        NetworkGraph {
            place_name: "Volgograd, Russia".to_owned(),
            fetched_at: Utc::now(),
            nodes: vec![
                GraphNode {
                    id: NodeId(1),
                    lat: 48.7,
                    lon: 44.5,
                },
                GraphNode {
                    id: NodeId(2),
                    lat: 48.71,
                    lon: 44.52,
                },
            ],
            edges: vec![GraphEdge {
                source: NodeId(1),
                target: NodeId(2),
                geometry: vec![[44.5, 48.7], [44.52, 48.71]],
                attributes: BTreeMap::new(),
            }],
        }
    }

    #[derive(Default)]
    struct MemoryTier {
        store: Mutex<HashMap<String, Vec<u8>>>,
        puts: AtomicUsize,
    }

    impl MemoryTier {
        fn put_count(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }

        fn seed(&self, key: &CacheKey, blob: Vec<u8>) {
            self.store
                .lock()
                .expect("store poisoned")
                .insert(key.as_str().to_owned(), blob);
        }
    }

    #[async_trait]
    impl GraphCache for MemoryTier {
        async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, GraphCacheError> {
            Ok(self
                .store
                .lock()
                .expect("store poisoned")
                .get(key.as_str())
                .cloned())
        }

        async fn put(&self, key: &CacheKey, blob: &[u8]) -> Result<(), GraphCacheError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.store
                .lock()
                .expect("store poisoned")
                .insert(key.as_str().to_owned(), blob.to_vec());
            Ok(())
        }
    }

    /// Tier that fails every operation, standing in for an unreachable
    /// Redis instance.
    struct BrokenTier;

    #[async_trait]
    impl GraphCache for BrokenTier {
        async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, GraphCacheError> {
            Err(GraphCacheError::backend("connection refused"))
        }

        async fn put(&self, _key: &CacheKey, _blob: &[u8]) -> Result<(), GraphCacheError> {
            Err(GraphCacheError::backend("connection refused"))
        }
    }

    struct CountingSource {
        calls: AtomicUsize,
        response: Result<NetworkGraph, NetworkSourceError>,
    }

    impl CountingSource {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Ok(sample_graph()),
            }
        }

        fn failing(error: NetworkSourceError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Err(error),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NetworkSource for CountingSource {
        async fn fetch_network(
            &self,
            _place: &PlaceQuery,
        ) -> Result<NetworkGraph, NetworkSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn key_for(place: &str) -> CacheKey {
        CacheKey::from_place(&PlaceQuery::new(place).expect("valid place"))
    }

    #[rstest]
    #[tokio::test]
    async fn cold_cache_fetches_once_and_writes_through_both_tiers() {
        let fast = Arc::new(MemoryTier::default());
        let durable = Arc::new(MemoryTier::default());
        let source = Arc::new(CountingSource::succeeding());
        let service = GraphService::new(fast.clone(), durable.clone(), source.clone());

        let graph = service
            .get_graph("Volgograd, Russia")
            .await
            .expect("retrieval succeeds");
        assert!(graph.node_count() >= 1);
        assert_eq!(source.call_count(), 1);
        assert_eq!(durable.put_count(), 1);
        assert_eq!(fast.put_count(), 1);

        let again = service
            .get_graph("Volgograd, Russia")
            .await
            .expect("warm retrieval succeeds");
        assert_eq!(source.call_count(), 1, "warm call must not hit the source");
        assert_eq!(again, graph);
    }

    #[rstest]
    #[tokio::test]
    async fn durable_hit_backfills_the_fast_tier() {
        let fast = Arc::new(MemoryTier::default());
        let durable = Arc::new(MemoryTier::default());
        durable.seed(
            &key_for("Volgograd, Russia"),
            sample_graph().to_blob().expect("serialise"),
        );
        let source = Arc::new(CountingSource::succeeding());
        let service = GraphService::new(fast.clone(), durable, source.clone());

        service
            .get_graph("Volgograd, Russia")
            .await
            .expect("durable hit succeeds");
        assert_eq!(source.call_count(), 0);
        assert_eq!(fast.put_count(), 1, "fast tier must be backfilled");
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_fast_tier_degrades_silently() {
        let durable = Arc::new(MemoryTier::default());
        let source = Arc::new(CountingSource::succeeding());
        let service = GraphService::new(Arc::new(BrokenTier), durable.clone(), source.clone());

        let graph = service
            .get_graph("Volgograd, Russia")
            .await
            .expect("request succeeds despite a broken fast tier");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(source.call_count(), 1);
        assert_eq!(durable.put_count(), 1);

        service
            .get_graph("Volgograd, Russia")
            .await
            .expect("second request served from the durable tier");
        assert_eq!(source.call_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn corrupt_fast_blob_falls_through_to_the_durable_tier() {
        let fast = Arc::new(MemoryTier::default());
        fast.seed(&key_for("Volgograd, Russia"), b"not json".to_vec());
        let durable = Arc::new(MemoryTier::default());
        durable.seed(
            &key_for("Volgograd, Russia"),
            sample_graph().to_blob().expect("serialise"),
        );
        let source = Arc::new(CountingSource::succeeding());
        let service = GraphService::new(fast, durable, source.clone());

        service
            .get_graph("Volgograd, Russia")
            .await
            .expect("corrupt fast blob degrades to a durable hit");
        assert_eq!(source.call_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_place_is_rejected_before_any_lookup() {
        let source = Arc::new(CountingSource::succeeding());
        let service = GraphService::new(
            Arc::new(MemoryTier::default()),
            Arc::new(MemoryTier::default()),
            source.clone(),
        );

        let err = service.get_graph("   ").await.expect_err("blank rejected");
        assert!(matches!(err, GraphError::InvalidQuery { .. }));
        assert_eq!(source.call_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn total_miss_with_source_failure_surfaces_retrieval_error() {
        let source = Arc::new(CountingSource::failing(NetworkSourceError::not_found(
            "no area matched",
        )));
        let service = GraphService::new(
            Arc::new(MemoryTier::default()),
            Arc::new(MemoryTier::default()),
            source,
        );

        let err = service
            .get_graph("NonexistentPlaceXYZ123")
            .await
            .expect_err("unresolvable place fails");
        match err {
            GraphError::Retrieval { place, source } => {
                assert_eq!(place, "NonexistentPlaceXYZ123");
                assert!(matches!(source, NetworkSourceError::NotFound { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn broken_durable_tier_still_returns_the_fetched_graph() {
        let source = Arc::new(CountingSource::succeeding());
        let service = GraphService::new(
            Arc::new(BrokenTier),
            Arc::new(BrokenTier),
            source.clone(),
        );

        let graph = service
            .get_graph("Volgograd, Russia")
            .await
            .expect("graph returned even when both tiers reject writes");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(source.call_count(), 1);
    }
}
