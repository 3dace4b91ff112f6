//! Standalone threat map demo.
//!
//! ```bash
//! cargo run -p onguard-graph --example threat_map
//! ```
//!
//! Drag to orbit, scroll to dolly. The mock feed grows the graph over time.

use onguard_graph::{DeviceProfile, MockFeed, ThreatMapWidget};

struct ThreatMapApp {
    widget: ThreatMapWidget,
}

impl ThreatMapApp {
    fn new() -> Self {
        let mut widget = ThreatMapWidget::new(DeviceProfile::Full);
        widget.connect(&MockFeed::new());
        Self { widget }
    }
}

impl eframe::App for ThreatMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.widget.ui(ui);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.widget.teardown();
    }
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,onguard_graph=debug".into()),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("OnGuard Threat Map"),
        ..Default::default()
    };

    eframe::run_native(
        "OnGuard Threat Map",
        options,
        Box::new(|_cc| Ok(Box::new(ThreatMapApp::new()))),
    )
}
