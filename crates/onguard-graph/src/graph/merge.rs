//! Graph state merger - accumulates incremental payloads into a
//! monotonically growing snapshot.
//!
//! Snapshots are immutable-append: every merge returns a new
//! `Arc<ThreatGraph>`, and snapshots handed out earlier are never touched,
//! so consumers holding a previous `Arc` stay valid.
//!
//! Duplicate ids in later payloads are ignored (first delivery wins) and
//! counted; there is no removal or eviction.

use std::collections::HashSet;
use std::sync::Arc;

use onguard_types::{GraphDelta, ThreatGraph};
use tracing::debug;

/// Accumulated graph state with id-based de-duplication.
#[derive(Debug, Default)]
pub struct GraphState {
    snapshot: Arc<ThreatGraph>,
    seen_nodes: HashSet<String>,
    seen_edges: HashSet<String>,
    /// Redelivered ids dropped so far (nodes + edges).
    duplicates_dropped: usize,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the one-shot initial snapshot.
    ///
    /// Implemented as a merge into the empty state so duplicate ids inside
    /// the initial payload follow the same first-wins policy.
    pub fn set_initial(&mut self, initial: ThreatGraph) -> Arc<ThreatGraph> {
        self.apply_increment(initial.into())
    }

    /// Merge an incremental payload and return the new snapshot.
    ///
    /// Nodes and edges are appended in arrival order; ids already present
    /// are dropped with a debug log.
    pub fn apply_increment(&mut self, delta: GraphDelta) -> Arc<ThreatGraph> {
        let mut next = ThreatGraph {
            nodes: self.snapshot.nodes.clone(),
            edges: self.snapshot.edges.clone(),
        };

        for node in delta.nodes {
            if self.seen_nodes.insert(node.id.clone()) {
                next.nodes.push(node);
            } else {
                debug!(id = %node.id, "dropping redelivered node");
                self.duplicates_dropped += 1;
            }
        }
        for edge in delta.edges {
            if self.seen_edges.insert(edge.id.clone()) {
                next.edges.push(edge);
            } else {
                debug!(id = %edge.id, "dropping redelivered edge");
                self.duplicates_dropped += 1;
            }
        }

        self.snapshot = Arc::new(next);
        Arc::clone(&self.snapshot)
    }

    /// Current merged snapshot.
    pub fn snapshot(&self) -> Arc<ThreatGraph> {
        Arc::clone(&self.snapshot)
    }

    /// Number of redelivered ids ignored so far.
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    pub fn node_count(&self) -> usize {
        self.snapshot.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.snapshot.edges.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use onguard_types::{EntityKind, Position, RelationKind, ThreatEdge, ThreatNode};

    fn node(id: &str) -> ThreatNode {
        ThreatNode {
            id: id.into(),
            kind: EntityKind::Wallet,
            address: format!("0x{id}"),
            label: None,
            risk_score: None,
            position: Position::default(),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> ThreatEdge {
        ThreatEdge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: RelationKind::Transaction,
            value: 1.0,
        }
    }

    #[test]
    fn increments_accumulate_distinct_ids() {
        let mut state = GraphState::new();
        state.set_initial(ThreatGraph {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("e1", "a", "b")],
        });

        state.apply_increment(GraphDelta {
            nodes: vec![node("c")],
            edges: vec![edge("e2", "b", "c")],
        });
        state.apply_increment(GraphDelta {
            nodes: vec![node("d")],
            edges: vec![],
        });

        assert_eq!(state.node_count(), 4);
        assert_eq!(state.edge_count(), 2);
        assert_eq!(state.duplicates_dropped(), 0);
    }

    #[test]
    fn redelivered_ids_are_ignored_first_wins() {
        let mut state = GraphState::new();
        state.set_initial(ThreatGraph {
            nodes: vec![node("a")],
            edges: vec![],
        });

        let mut dup = node("a");
        dup.label = Some("replacement".into());
        state.apply_increment(GraphDelta {
            nodes: vec![dup],
            edges: vec![],
        });

        assert_eq!(state.node_count(), 1);
        assert_eq!(state.duplicates_dropped(), 1);
        // First delivery wins: the original (unlabeled) node is kept.
        assert!(state.snapshot().nodes[0].label.is_none());
    }

    #[test]
    fn prior_snapshots_are_never_mutated() {
        let mut state = GraphState::new();
        let first = state.set_initial(ThreatGraph {
            nodes: vec![node("a")],
            edges: vec![],
        });

        let second = state.apply_increment(GraphDelta {
            nodes: vec![node("b")],
            edges: vec![],
        });

        assert_eq!(first.nodes.len(), 1);
        assert_eq!(second.nodes.len(), 2);
    }

    #[test]
    fn merge_preserves_arrival_order() {
        let mut state = GraphState::new();
        state.set_initial(ThreatGraph::default());
        state.apply_increment(GraphDelta {
            nodes: vec![node("z"), node("a")],
            edges: vec![],
        });
        state.apply_increment(GraphDelta {
            nodes: vec![node("m")],
            edges: vec![],
        });

        let snapshot = state.snapshot();
        let ids: Vec<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }
}
