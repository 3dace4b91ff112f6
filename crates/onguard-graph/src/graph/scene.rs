//! Scene graph - owned visual state for realized entities and relations.
//!
//! One visual per realized id, indexed for idempotent re-realization: an id
//! that already has a visual is never re-instantiated. Dropping a visual (or
//! clearing the scene) releases everything it owns; there is no separate
//! geometry/material handle to leak.

use std::collections::HashMap;

use egui::Color32;
use glam::Vec3;
use onguard_types::{EntityKind, ThreatEdge, ThreatNode};
use tracing::debug;

use super::colors;
use super::DeviceProfile;

// =============================================================================
// VISUALS
// =============================================================================

/// Geometric primitive family chosen by entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// Contracts render as boxes.
    Box,
    /// Wallets render as spheres.
    Sphere,
    /// Exchanges render as cylinders.
    Cylinder,
    /// Everything else renders as a tetrahedron.
    Tetrahedron,
}

impl NodeShape {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Contract => NodeShape::Box,
            EntityKind::Wallet => NodeShape::Sphere,
            EntityKind::Exchange => NodeShape::Cylinder,
            EntityKind::Unknown => NodeShape::Tetrahedron,
        }
    }
}

/// Owned render state for one realized entity.
#[derive(Debug, Clone)]
pub struct NodeVisual {
    pub id: String,
    pub shape: NodeShape,
    /// Base color from the risk band.
    pub color: Color32,
    /// Dimmer glow tint (base color scaled down).
    pub emissive: Color32,
    /// World-space half-extent / radius of the primitive.
    pub size: f32,
    /// Outline tessellation (lower on constrained profiles).
    pub segments: u32,
    /// Specular highlight strength (lower on constrained profiles).
    pub shininess: f32,
    /// Current world position; the idle bob perturbs `y` every frame.
    pub position: Vec3,
    pub label: Option<String>,
}

/// Owned render state for one realized relation.
///
/// Endpoint positions are captured when the edge is realized and never
/// re-evaluated afterwards.
#[derive(Debug, Clone)]
pub struct EdgeVisual {
    pub id: String,
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color32,
    pub opacity: f32,
}

// =============================================================================
// SCENE GRAPH
// =============================================================================

/// Base primitive half-extent before the profile scale factor.
const BASE_SIZE: f32 = 0.5;

/// The shared scene: all realized visuals plus the idle-animation clock.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: HashMap<String, NodeVisual>,
    edges: HashMap<String, EdgeVisual>,
    profile: DeviceProfile,
    /// Wall-clock seconds since the scene was created; drives the bob.
    clock: f32,
}

impl SceneGraph {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            profile,
            clock: 0.0,
        }
    }

    // =========================================================================
    // REALIZATION
    // =========================================================================

    /// Realize an entity as a visual. Returns `false` (no-op) if a visual
    /// for this id already exists.
    pub fn realize_node(&mut self, node: &ThreatNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }

        let scale = match self.profile {
            DeviceProfile::Full => 1.0,
            // Slightly larger on constrained targets for visibility
            DeviceProfile::Constrained => 1.2,
        };
        let (segments, shininess) = match self.profile {
            DeviceProfile::Full => (32, 100.0),
            DeviceProfile::Constrained => (16, 80.0),
        };

        let risk = node.risk_score.unwrap_or(0.0);
        let color = colors::risk_color(risk);

        let visual = NodeVisual {
            id: node.id.clone(),
            shape: NodeShape::for_kind(node.kind),
            color,
            emissive: colors::emissive_tint(color),
            size: BASE_SIZE * scale,
            segments,
            shininess,
            position: Vec3::new(node.position.x, node.position.y, node.position.z),
            label: node.label.clone(),
        };
        self.nodes.insert(node.id.clone(), visual);
        true
    }

    /// Realize a relation as a line visual between its endpoints' current
    /// positions. Returns `false` if the id is already realized, if either
    /// endpoint is not realized, or if the edge is a self-loop; unresolved
    /// relations are dropped, not queued.
    pub fn realize_edge(&mut self, edge: &ThreatEdge) -> bool {
        if self.edges.contains_key(&edge.id) {
            return false;
        }
        if edge.source == edge.target {
            debug!(id = %edge.id, "dropping self-loop relation");
            return false;
        }
        let (Some(source), Some(target)) =
            (self.nodes.get(&edge.source), self.nodes.get(&edge.target))
        else {
            debug!(
                id = %edge.id,
                source = %edge.source,
                target = %edge.target,
                "dropping relation with unrealized endpoint"
            );
            return false;
        };

        let opacity = match self.profile {
            DeviceProfile::Full => 0.6,
            // Slightly more visible on constrained targets
            DeviceProfile::Constrained => 0.7,
        };

        let visual = EdgeVisual {
            id: edge.id.clone(),
            start: source.position,
            end: target.position,
            color: colors::relation_color(edge.kind),
            opacity,
        };
        self.edges.insert(edge.id.clone(), visual);
        true
    }

    // =========================================================================
    // PER-FRAME ANIMATION
    // =========================================================================

    /// Advance the idle animation: every node visual bobs vertically, out of
    /// phase with its neighbors via its own x-position.
    pub fn tick(&mut self, dt: f32) {
        self.clock += dt;
        let amplitude = match self.profile {
            DeviceProfile::Full => 0.005,
            // Less motion on constrained targets
            DeviceProfile::Constrained => 0.003,
        };
        for visual in self.nodes.values_mut() {
            visual.position.y += (self.clock + visual.position.x).sin() * amplitude;
        }
    }

    // =========================================================================
    // QUERIES & DISPOSAL
    // =========================================================================

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&NodeVisual> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeVisual> {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeVisual> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeVisual> {
        self.edges.values()
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    /// Release every visual. All owned render state is dropped, not merely
    /// detached.
    pub fn clear(&mut self) {
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "disposing scene visuals"
        );
        self.nodes.clear();
        self.edges.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use onguard_types::{Position, RelationKind};

    fn node(id: &str, kind: EntityKind, risk: f32, x: f32) -> ThreatNode {
        ThreatNode {
            id: id.into(),
            kind,
            address: format!("0x{id}"),
            label: None,
            risk_score: Some(risk),
            position: Position::new(x, 0.0, 0.0),
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
    fn realize_is_idempotent() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        let n = node("a", EntityKind::Wallet, 80.0, 0.0);

        assert!(scene.realize_node(&n));
        assert!(!scene.realize_node(&n));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn shape_follows_kind() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        scene.realize_node(&node("c", EntityKind::Contract, 0.0, 0.0));
        scene.realize_node(&node("w", EntityKind::Wallet, 0.0, 1.0));
        scene.realize_node(&node("x", EntityKind::Exchange, 0.0, 2.0));
        scene.realize_node(&node("u", EntityKind::Unknown, 0.0, 3.0));

        assert_eq!(scene.node("c").unwrap().shape, NodeShape::Box);
        assert_eq!(scene.node("w").unwrap().shape, NodeShape::Sphere);
        assert_eq!(scene.node("x").unwrap().shape, NodeShape::Cylinder);
        assert_eq!(scene.node("u").unwrap().shape, NodeShape::Tetrahedron);
    }

    #[test]
    fn missing_risk_score_counts_as_safe() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        let mut n = node("a", EntityKind::Wallet, 0.0, 0.0);
        n.risk_score = None;
        scene.realize_node(&n);

        assert_eq!(scene.node("a").unwrap().color, colors::risk_color(0.0));
    }

    #[test]
    fn dangling_relation_yields_no_visual() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        scene.realize_node(&node("a", EntityKind::Wallet, 10.0, 0.0));

        // Target never realized: dropped silently.
        assert!(!scene.realize_edge(&edge("e1", "a", "ghost")));
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn self_loop_is_dropped() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        scene.realize_node(&node("a", EntityKind::Wallet, 10.0, 0.0));

        assert!(!scene.realize_edge(&edge("e1", "a", "a")));
        assert_eq!(scene.edge_count(), 0);
    }

    #[test]
    fn edge_captures_positions_at_realization() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        scene.realize_node(&node("a", EntityKind::Wallet, 10.0, 1.0));
        scene.realize_node(&node("b", EntityKind::Contract, 10.0, 4.0));
        assert!(scene.realize_edge(&edge("e1", "a", "b")));

        let before = scene.edge("e1").unwrap().start;

        // Bob the nodes; the line must not follow.
        for _ in 0..60 {
            scene.tick(1.0 / 60.0);
        }
        assert_eq!(scene.edge("e1").unwrap().start, before);
    }

    #[test]
    fn bob_perturbs_only_node_y() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        scene.realize_node(&node("a", EntityKind::Wallet, 10.0, 1.0));
        let before = scene.node("a").unwrap().position;

        for _ in 0..30 {
            scene.tick(1.0 / 60.0);
        }
        let after = scene.node("a").unwrap().position;

        assert_eq!(after.x, before.x);
        assert_eq!(after.z, before.z);
        assert_ne!(after.y, before.y);
    }

    #[test]
    fn constrained_profile_scales_up_and_coarsens() {
        let mut full = SceneGraph::new(DeviceProfile::Full);
        let mut constrained = SceneGraph::new(DeviceProfile::Constrained);
        let n = node("a", EntityKind::Wallet, 10.0, 0.0);
        full.realize_node(&n);
        constrained.realize_node(&n);

        let f = full.node("a").unwrap();
        let c = constrained.node("a").unwrap();
        assert!(c.size > f.size);
        assert!(c.segments < f.segments);
        assert!(c.shininess < f.shininess);
    }

    #[test]
    fn clear_disposes_everything() {
        let mut scene = SceneGraph::new(DeviceProfile::Full);
        scene.realize_node(&node("a", EntityKind::Wallet, 10.0, 0.0));
        scene.realize_node(&node("b", EntityKind::Contract, 10.0, 1.0));
        scene.realize_edge(&edge("e1", "a", "b"));

        scene.clear();
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.edge_count(), 0);
    }
}
