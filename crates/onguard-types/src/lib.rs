//! Shared data contracts for the OnGuard threat map.
//!
//! This crate is the single source of truth for every type that crosses the
//! feed boundary (data source → widget).
//!
//! ## Rules
//!
//! 1. Data contracts only - no behavior, no state, no egui
//! 2. String ids (node ids and addresses are opaque hex-ish strings)
//! 3. Derive-heavy: Serialize, Deserialize, Clone, Debug on everything
//! 4. Closed enums with `snake_case` wire names

use serde::{Deserialize, Serialize};

// ============================================================================
// ENTITY / RELATION KINDS
// ============================================================================

/// Category of an on-chain entity. Drives the geometric primitive used to
/// render it (box / sphere / cylinder / tetrahedron).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contract,
    Wallet,
    Exchange,
    #[default]
    Unknown,
}

impl EntityKind {
    /// All kinds, in a stable order (useful for mock generation and UI).
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Contract,
            EntityKind::Wallet,
            EntityKind::Exchange,
            EntityKind::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Contract => "contract",
            EntityKind::Wallet => "wallet",
            EntityKind::Exchange => "exchange",
            EntityKind::Unknown => "unknown",
        }
    }
}

/// Category of a relation between two entities. Drives line color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Transaction,
    Deployment,
    Interaction,
    Attack,
}

impl RelationKind {
    /// All kinds, in a stable order.
    pub fn all() -> &'static [RelationKind] {
        &[
            RelationKind::Transaction,
            RelationKind::Deployment,
            RelationKind::Interaction,
            RelationKind::Attack,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Transaction => "transaction",
            RelationKind::Deployment => "deployment",
            RelationKind::Interaction => "interaction",
            RelationKind::Attack => "attack",
        }
    }
}

// ============================================================================
// GRAPH PAYLOADS
// ============================================================================

/// A point in the 3D scene. Assigned once when the entity is created and
/// never recomputed from relations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A positioned, categorized, risk-scored node in the relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatNode {
    /// Unique within a graph snapshot.
    pub id: String,
    pub kind: EntityKind,
    /// On-chain address the node represents.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 0-100; absent is treated as 0 by consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f32>,
    pub position: Position,
}

/// A directed, categorized, weighted edge between two entities.
///
/// `source` and `target` reference [`ThreatNode::id`] values. Producers are
/// expected not to emit self-edges; consumers drop any edge whose endpoints
/// cannot both be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    /// Transaction value or importance weight.
    pub value: f32,
}

/// The full accumulated set of entities and relations at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThreatGraph {
    pub nodes: Vec<ThreatNode>,
    pub edges: Vec<ThreatEdge>,
}

impl ThreatGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// An incremental payload: zero or more new nodes plus zero or more new
/// edges, merged into the accumulated graph by union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphDelta {
    #[serde(default)]
    pub nodes: Vec<ThreatNode>,
    #[serde(default)]
    pub edges: Vec<ThreatEdge>,
}

impl GraphDelta {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

impl From<ThreatGraph> for GraphDelta {
    fn from(graph: ThreatGraph) -> Self {
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_wire_names() {
        let json = serde_json::to_string(&EntityKind::Wallet).unwrap();
        assert_eq!(json, "\"wallet\"");

        let kind: EntityKind = serde_json::from_str("\"exchange\"").unwrap();
        assert_eq!(kind, EntityKind::Exchange);
    }

    #[test]
    fn relation_kind_is_closed() {
        // Set is closed: an unknown kind is a deserialization error, not a
        // silent fallback.
        let result: Result<RelationKind, _> = serde_json::from_str("\"bridge\"");
        assert!(result.is_err());
    }

    #[test]
    fn node_optional_fields_default() {
        let json = r#"{
            "id": "node0",
            "kind": "contract",
            "address": "0xabc",
            "position": { "x": 1.0, "y": 2.0, "z": 3.0 }
        }"#;
        let node: ThreatNode = serde_json::from_str(json).unwrap();
        assert!(node.label.is_none());
        assert!(node.risk_score.is_none());
        assert_eq!(node.position, Position::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn delta_fields_default_to_empty() {
        let delta: GraphDelta = serde_json::from_str("{}").unwrap();
        assert!(delta.is_empty());
    }
}
