//! 3D threat map visualization for egui.
//!
//! Renders a live relationship graph of on-chain entities (wallets,
//! contracts, exchanges) as an orbitable 3D scene painted entirely through
//! `egui::Painter`: perspective projection, depth sorting, distance fog, and
//! risk-driven coloring.
//!
//! EGUI-RULES:
//! - The widget polls input and feed channels each frame; no callbacks.
//! - Data types come from `onguard-types` and stay UI-free.
//! - Ambient motion requests repaint only while the widget is mounted.
//!
//! ```no_run
//! use onguard_graph::{DeviceProfile, MockFeed, ThreatMapWidget};
//!
//! let mut widget = ThreatMapWidget::new(DeviceProfile::Full);
//! widget.connect(&MockFeed::new());
//! ```

pub mod config;
pub mod graph;
pub mod source;

pub use graph::{DeviceProfile, ThreatMapWidget};
pub use source::{FeedError, FeedSubscription, GraphFeed, MockFeed};
