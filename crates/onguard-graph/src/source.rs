//! Graph data sources.
//!
//! [`GraphFeed`] is the boundary the widget consumes: one initial snapshot,
//! then push-based incremental deltas. Deltas arrive over a channel that the
//! widget drains once per frame - no callbacks into UI state.
//!
//! [`MockFeed`] is the reference implementation: a producer thread that
//! simulates a live monitoring feed on a timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use onguard_types::{
    EntityKind, GraphDelta, Position, RelationKind, ThreatEdge, ThreatGraph, ThreatNode,
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::global_config;

/// Errors at the feed boundary.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

/// A source of graph data: one-shot snapshot plus incremental updates.
pub trait GraphFeed {
    /// Fetch the initial full snapshot.
    fn fetch_initial(&self) -> Result<ThreatGraph, FeedError>;

    /// Start pushing incremental deltas. Dropping (or unsubscribing) the
    /// returned subscription stops all future deliveries and releases the
    /// producer.
    fn subscribe(&self) -> FeedSubscription;
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Producer threads check the stop flag at this granularity, so unsubscribe
/// takes effect well before the emission interval elapses.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Handle to an active incremental subscription.
///
/// Drain with [`try_next`](Self::try_next) each frame. Unsubscribing is
/// idempotent; dropping the handle unsubscribes.
pub struct FeedSubscription {
    rx: Receiver<GraphDelta>,
    stop: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
}

impl FeedSubscription {
    /// Wrap a delta channel and its producer thread.
    pub fn new(rx: Receiver<GraphDelta>, stop: Arc<AtomicBool>, producer: JoinHandle<()>) -> Self {
        Self {
            rx,
            stop,
            producer: Some(producer),
        }
    }

    /// Next pending delta, if any (never blocks).
    pub fn try_next(&self) -> Option<GraphDelta> {
        self.rx.try_recv().ok()
    }

    /// Stop the producer and release its scheduling resource. Safe to call
    /// more than once.
    pub fn unsubscribe(&mut self) {
        if let Some(handle) = self.producer.take() {
            self.stop.store(true, Ordering::Relaxed);
            let _ = handle.join();
            debug!("feed subscription stopped");
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// =============================================================================
// MOCK FEED
// =============================================================================

/// Simulated live feed: a fixed random snapshot up front, then occasional
/// single-node/single-edge deltas on a timer.
pub struct MockFeed {
    update_interval: Duration,
    emit_probability: f64,
    node_count: usize,
    edge_count: usize,
}

impl Default for MockFeed {
    fn default() -> Self {
        let feed = &global_config().feed;
        Self {
            update_interval: Duration::from_secs_f32(feed.update_interval_secs),
            emit_probability: feed.emit_probability,
            node_count: 30,
            edge_count: 40,
        }
    }
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the emission interval (tests use a short one).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Override the per-interval emission probability.
    pub fn with_emit_probability(mut self, probability: f64) -> Self {
        self.emit_probability = probability;
        self
    }

    fn generate_snapshot(&self) -> ThreatGraph {
        let mut rng = rand::thread_rng();

        let nodes: Vec<ThreatNode> = (0..self.node_count)
            .map(|i| random_node(&mut rng, i))
            .collect();

        let mut edges = Vec::with_capacity(self.edge_count);
        for i in 0..self.edge_count {
            let source = rng.gen_range(0..nodes.len());
            let mut target = rng.gen_range(0..nodes.len());
            while source == target {
                target = rng.gen_range(0..nodes.len());
            }
            edges.push(ThreatEdge {
                id: format!("edge{i}"),
                source: nodes[source].id.clone(),
                target: nodes[target].id.clone(),
                kind: random_relation_kind(&mut rng),
                value: rng.gen_range(0.0..10.0),
            });
        }

        ThreatGraph { nodes, edges }
    }
}

impl GraphFeed for MockFeed {
    fn fetch_initial(&self) -> Result<ThreatGraph, FeedError> {
        Ok(self.generate_snapshot())
    }

    fn subscribe(&self) -> FeedSubscription {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let producer = spawn_producer(
            tx,
            Arc::clone(&stop),
            self.update_interval,
            self.emit_probability,
            self.node_count,
        );
        info!(
            interval_secs = self.update_interval.as_secs_f32(),
            "subscribed to mock threat feed"
        );
        FeedSubscription::new(rx, stop, producer)
    }
}

/// Producer loop: every interval, maybe emit one fresh node plus one edge
/// linking it back into the known graph. Ids continue past the initial
/// snapshot's so deltas never collide with already-delivered ids.
fn spawn_producer(
    tx: Sender<GraphDelta>,
    stop: Arc<AtomicBool>,
    interval: Duration,
    emit_probability: f64,
    initial_node_count: usize,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let mut next_node = initial_node_count;
        let mut next_edge = 0usize;
        let mut last_emit = Instant::now();

        loop {
            std::thread::sleep(STOP_POLL.min(interval));
            if stop.load(Ordering::Relaxed) {
                break;
            }
            if last_emit.elapsed() < interval {
                continue;
            }
            last_emit = Instant::now();

            if !rng.gen_bool(emit_probability) {
                continue;
            }

            let node = random_node(&mut rng, next_node);
            let target = format!("node{}", rng.gen_range(0..next_node));
            let edge = ThreatEdge {
                id: format!("edge-live{next_edge}"),
                source: node.id.clone(),
                target,
                kind: random_relation_kind(&mut rng),
                value: rng.gen_range(0.0..10.0),
            };
            next_node += 1;
            next_edge += 1;

            let delta = GraphDelta {
                nodes: vec![node],
                edges: vec![edge],
            };
            debug!("emitting incremental threat delta");
            if tx.send(delta).is_err() {
                // Receiver is gone; nothing left to feed.
                break;
            }
        }
    })
}

fn random_node(rng: &mut impl Rng, index: usize) -> ThreatNode {
    let kind = *EntityKind::all()
        .get(rng.gen_range(0..EntityKind::all().len()))
        .unwrap_or(&EntityKind::Unknown);
    ThreatNode {
        id: format!("node{index}"),
        kind,
        address: format!("0x{:012x}", rng.gen_range(0u64..u64::MAX >> 16)),
        label: (index < 5).then(|| format!("Node {index}")),
        risk_score: Some(rng.gen_range(0.0..100.0)),
        position: Position::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        ),
    }
}

fn random_relation_kind(rng: &mut impl Rng) -> RelationKind {
    *RelationKind::all()
        .get(rng.gen_range(0..RelationKind::all().len()))
        .unwrap_or(&RelationKind::Interaction)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_snapshot_shape() {
        let feed = MockFeed::new();
        let graph = feed.fetch_initial().unwrap();

        assert_eq!(graph.nodes.len(), 30);
        assert_eq!(graph.edges.len(), 40);

        // First 5 nodes carry labels, the rest do not
        assert!(graph.nodes[..5].iter().all(|n| n.label.is_some()));
        assert!(graph.nodes[5..].iter().all(|n| n.label.is_none()));

        // No self-edges; every endpoint resolves
        for edge in &graph.edges {
            assert_ne!(edge.source, edge.target);
            assert!(graph.nodes.iter().any(|n| n.id == edge.source));
            assert!(graph.nodes.iter().any(|n| n.id == edge.target));
        }
    }

    #[test]
    fn risk_scores_in_range() {
        let graph = MockFeed::new().fetch_initial().unwrap();
        for node in &graph.nodes {
            let risk = node.risk_score.unwrap();
            assert!((0.0..=100.0).contains(&risk));
        }
    }

    #[test]
    fn subscription_delivers_fresh_ids() {
        let feed = MockFeed::new()
            .with_interval(Duration::from_millis(10))
            .with_emit_probability(1.0);
        let sub = feed.subscribe();

        let deadline = Instant::now() + Duration::from_secs(5);
        let delta = loop {
            if let Some(delta) = sub.try_next() {
                break delta;
            }
            assert!(Instant::now() < deadline, "no delta before deadline");
            std::thread::sleep(Duration::from_millis(5));
        };

        assert_eq!(delta.nodes.len(), 1);
        assert_eq!(delta.edges.len(), 1);
        // Delta ids continue past the initial snapshot's id space
        assert_eq!(delta.nodes[0].id, "node30");
        assert_eq!(delta.edges[0].source, "node30");
    }

    #[test]
    fn unsubscribe_stops_all_deliveries() {
        let feed = MockFeed::new()
            .with_interval(Duration::from_millis(10))
            .with_emit_probability(1.0);
        let mut sub = feed.subscribe();

        sub.unsubscribe();
        sub.unsubscribe(); // idempotent

        // Producer has joined; drain anything sent before the stop.
        while sub.try_next().is_some() {}
        std::thread::sleep(Duration::from_millis(30));
        assert!(sub.try_next().is_none());
    }
}
