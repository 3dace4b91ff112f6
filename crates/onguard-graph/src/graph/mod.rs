//! Interactive 3D threat map widget for egui.
//!
//! The widget owns the camera, the realized scene, and the merged graph
//! state, and paints everything through `egui::Painter`. Input is polled
//! from the frame's response; feed deltas are drained from the subscription
//! channel once per frame. No callbacks.
//!
//! ```no_run
//! use onguard_graph::graph::{DeviceProfile, ThreatMapWidget};
//! use onguard_graph::source::{GraphFeed, MockFeed};
//!
//! let feed = MockFeed::new();
//! let mut widget = ThreatMapWidget::new(DeviceProfile::Full);
//! widget.connect(&feed);
//! // each frame: widget.ui(ui);
//! ```

pub mod animation;
pub mod camera;
pub mod colors;
pub mod merge;
pub mod render;
pub mod scene;

use egui::{Rect, Sense};
use onguard_types::{GraphDelta, ThreatGraph};
use tracing::{info, warn};

use crate::source::{FeedSubscription, GraphFeed};
use camera::OrbitCamera;
use merge::GraphState;
use render::SceneRenderer;
use scene::SceneGraph;

// =============================================================================
// DEVICE PROFILE
// =============================================================================

/// Rendering tier, fixed when the widget is created.
///
/// `Constrained` trades fidelity for fill rate: wider field of view, nearer
/// fog, fewer polygon segments, slower rotate response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceProfile {
    /// Desktop-class rendering.
    Full,
    /// Reduced-fidelity rendering for low-power targets.
    Constrained,
}

// =============================================================================
// WIDGET
// =============================================================================

/// Scene host lifecycle. Mount happens on the first `ui()` call; teardown is
/// explicit and final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Uninitialized,
    Mounted,
    TornDown,
}

/// The threat map widget. Embed with [`ui`](Self::ui); feed it data with
/// [`connect`](Self::connect) or directly via [`load_snapshot`](Self::load_snapshot)
/// and [`apply_delta`](Self::apply_delta).
pub struct ThreatMapWidget {
    profile: DeviceProfile,
    state: HostState,
    camera: OrbitCamera,
    scene: SceneGraph,
    renderer: SceneRenderer,
    graph: GraphState,
    subscription: Option<FeedSubscription>,
    frame_count: u64,
    fetch_failed: bool,
}

impl ThreatMapWidget {
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            state: HostState::Uninitialized,
            camera: OrbitCamera::for_profile(profile),
            scene: SceneGraph::new(profile),
            renderer: SceneRenderer::new(),
            graph: GraphState::new(),
            subscription: None,
            frame_count: 0,
            fetch_failed: false,
        }
    }

    /// Fetch the initial snapshot and start the incremental subscription.
    ///
    /// A failed fetch leaves the widget in the empty state; the subscription
    /// is started regardless so later deltas still arrive.
    pub fn connect(&mut self, feed: &dyn GraphFeed) {
        match feed.fetch_initial() {
            Ok(graph) => self.load_snapshot(graph),
            Err(err) => {
                warn!(%err, "initial graph fetch failed, starting empty");
                self.fetch_failed = true;
            }
        }
        self.subscription = Some(feed.subscribe());
    }

    /// Merge a full snapshot and realize it in the scene.
    pub fn load_snapshot(&mut self, graph: ThreatGraph) {
        let merged = self.graph.set_initial(graph);
        self.fetch_failed = false;
        for node in &merged.nodes {
            self.scene.realize_node(node);
        }
        for edge in &merged.edges {
            self.scene.realize_edge(edge);
        }
        info!(
            nodes = merged.nodes.len(),
            edges = merged.edges.len(),
            "loaded threat graph snapshot"
        );
    }

    /// Merge an incremental delta. Nodes realize before edges so edges added
    /// in the same delta can resolve their endpoints.
    pub fn apply_delta(&mut self, delta: GraphDelta) {
        let merged = self.graph.apply_increment(delta);
        for node in &merged.nodes {
            self.scene.realize_node(node);
        }
        for edge in &merged.edges {
            self.scene.realize_edge(edge);
        }
    }

    /// Transition into the mounted state. No-op when already mounted;
    /// a widget that has been torn down never remounts.
    pub fn mount(&mut self, ctx: &egui::Context) {
        if self.state != HostState::Uninitialized {
            return;
        }
        if self.profile == DeviceProfile::Constrained {
            // Feathering costs fill rate on weak GPUs.
            ctx.tessellation_options_mut(|opts| opts.feathering = false);
        }
        self.state = HostState::Mounted;
        info!(profile = ?self.profile, "threat map mounted");
    }

    /// Stop the feed and freeze the widget. Idempotent; nothing animates,
    /// updates, or repaints afterwards.
    pub fn teardown(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.unsubscribe();
        }
        if self.state == HostState::Mounted {
            info!("threat map torn down");
        }
        self.state = HostState::TornDown;
    }

    /// Record a profile preference. Takes effect only for widgets created
    /// with it; an already-built scene keeps its original fidelity.
    pub fn set_profile(&mut self, profile: DeviceProfile) {
        self.profile = profile;
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    /// Frames advanced since mount. Stops counting at teardown.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance one frame: viewport, camera springs, pending feed deltas,
    /// idle animation. Inert unless mounted.
    pub fn frame(&mut self, dt: f32, screen_rect: Rect) {
        if self.state != HostState::Mounted {
            return;
        }
        self.frame_count += 1;

        self.camera.set_viewport(screen_rect);
        self.camera.update(dt);

        let mut pending = Vec::new();
        if let Some(sub) = &self.subscription {
            while let Some(delta) = sub.try_next() {
                pending.push(delta);
            }
        }
        for delta in pending {
            self.apply_delta(delta);
        }

        self.scene.tick(dt);
    }

    /// Embed the map into an egui layout, filling the available space.
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.mount(ui.ctx());

        let size = ui.available_size();
        let (response, painter) = ui.allocate_painter(size, Sense::drag());
        let rect = response.rect;

        if response.dragged() {
            self.camera.orbit(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.dolly(scroll);
            }
        }

        let dt = ui.input(|i| i.stable_dt);
        self.frame(dt, rect);

        if self.graph.node_count() == 0 {
            painter.rect_filled(rect, 0.0, colors::BACKGROUND);
            let message = if self.fetch_failed {
                "Threat feed unavailable"
            } else {
                "Waiting for threat data..."
            };
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(14.0),
                egui::Color32::from_rgb(176, 190, 197),
            );
        } else {
            self.renderer.render(&painter, &self.scene, &self.camera, rect);
            self.render_chrome(&painter, rect);
        }

        // Idle bobbing and spring settling both need continuous frames.
        if self.state == HostState::Mounted {
            ui.ctx().request_repaint();
        }
    }

    /// Entity and relation counters in the corner of the viewport.
    fn render_chrome(&self, painter: &egui::Painter, rect: Rect) {
        let text = format!(
            "{} entities | {} relations",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        painter.text(
            rect.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            text,
            egui::FontId::monospace(11.0),
            egui::Color32::from_rgb(176, 190, 197),
        );
    }
}

impl Drop for ThreatMapWidget {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================
