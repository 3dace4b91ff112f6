//! Rendering - draws the scene to an egui::Painter.
//!
//! World positions go through the orbit camera's perspective projection and
//! are painted back-to-front (edges and nodes sorted together by view
//! depth). Depth fog fades distant visuals toward the background, and nodes
//! get the layered glow treatment (outer glow / core / border / highlight).

use egui::{Pos2, Rect, Stroke, Vec2};
use glam::Vec3;

use super::camera::OrbitCamera;
use super::colors;
use super::scene::{EdgeVisual, NodeShape, NodeVisual, SceneGraph};
use super::DeviceProfile;

// =============================================================================
// RENDER CONSTANTS
// =============================================================================

/// Directional light direction (normalized at use).
const LIGHT_DIR: Vec3 = Vec3::new(1.0, 1.0, 1.0);

/// Lambert shading floor (the ambient light term).
const AMBIENT: f32 = 0.45;

/// Reference grid sits below the node cloud.
const GRID_Y: f32 = -10.0;

/// Grid line count per axis.
const GRID_DIVISIONS: u32 = 20;

/// Relation line width (thicker lines are unreliable in the original too).
const EDGE_WIDTH: f32 = 1.0;

/// Fog start/end distance per device profile. The constrained profile pulls
/// the fog in for a smaller visible volume.
fn fog_range(profile: DeviceProfile) -> (f32, f32) {
    match profile {
        DeviceProfile::Full => (20.0, 100.0),
        DeviceProfile::Constrained => (25.0, 80.0),
    }
}

/// Reference grid extent per device profile.
fn grid_extent(profile: DeviceProfile) -> f32 {
    match profile {
        DeviceProfile::Full => 100.0,
        DeviceProfile::Constrained => 70.0,
    }
}

/// Depth fog factor: 0.0 at the fog near plane, 1.0 fully fogged.
fn fog_factor(depth: f32, near: f32, far: f32) -> f32 {
    ((depth - near) / (far - near)).clamp(0.0, 1.0)
}

// =============================================================================
// SCENE RENDERER
// =============================================================================

/// Painter-level renderer for a [`SceneGraph`].
pub struct SceneRenderer {
    /// Whether to draw the reference grid.
    pub show_grid: bool,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self { show_grid: true }
    }
}

enum DrawItem<'a> {
    Node(&'a NodeVisual),
    Edge(&'a EdgeVisual),
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the complete scene for one frame.
    pub fn render(
        &self,
        painter: &egui::Painter,
        scene: &SceneGraph,
        camera: &OrbitCamera,
        screen_rect: Rect,
    ) {
        let (fog_near, fog_far) = fog_range(scene.profile());

        // Background fill doubles as the fog color.
        painter.rect_filled(screen_rect, 0.0, colors::BACKGROUND);

        if self.show_grid {
            self.render_grid(painter, camera, screen_rect, scene.profile(), fog_near, fog_far);
        }

        // Depth-sort edges and nodes together, far to near.
        let mut items: Vec<(f32, DrawItem)> = Vec::new();
        for edge in scene.edges() {
            let (Some(a), Some(b)) = (
                camera.project(edge.start, screen_rect),
                camera.project(edge.end, screen_rect),
            ) else {
                continue;
            };
            items.push(((a.depth + b.depth) * 0.5, DrawItem::Edge(edge)));
        }
        for node in scene.nodes() {
            if let Some(p) = camera.project(node.position, screen_rect) {
                items.push((p.depth, DrawItem::Node(node)));
            }
        }
        items.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (depth, item) in items {
            let fog = fog_factor(depth, fog_near, fog_far);
            if fog >= 1.0 {
                continue;
            }
            match item {
                DrawItem::Edge(edge) => self.render_edge(painter, camera, screen_rect, edge, fog),
                DrawItem::Node(node) => {
                    self.render_node(painter, camera, screen_rect, node, depth, fog)
                }
            }
        }
    }

    // =========================================================================
    // GRID
    // =========================================================================

    fn render_grid(
        &self,
        painter: &egui::Painter,
        camera: &OrbitCamera,
        screen_rect: Rect,
        profile: DeviceProfile,
        fog_near: f32,
        fog_far: f32,
    ) {
        let extent = grid_extent(profile);
        let half = extent / 2.0;
        let step = extent / GRID_DIVISIONS as f32;

        for i in 0..=GRID_DIVISIONS {
            let offset = -half + i as f32 * step;
            let color = if i == GRID_DIVISIONS / 2 {
                colors::GRID_MAJOR
            } else {
                colors::GRID_MINOR
            };

            // Line parallel to Z at x = offset
            self.grid_line(
                painter,
                camera,
                screen_rect,
                Vec3::new(offset, GRID_Y, -half),
                Vec3::new(offset, GRID_Y, half),
                color,
                fog_near,
                fog_far,
            );
            // Line parallel to X at z = offset
            self.grid_line(
                painter,
                camera,
                screen_rect,
                Vec3::new(-half, GRID_Y, offset),
                Vec3::new(half, GRID_Y, offset),
                color,
                fog_near,
                fog_far,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn grid_line(
        &self,
        painter: &egui::Painter,
        camera: &OrbitCamera,
        screen_rect: Rect,
        from: Vec3,
        to: Vec3,
        color: egui::Color32,
        fog_near: f32,
        fog_far: f32,
    ) {
        let (Some(a), Some(b)) = (
            camera.project(from, screen_rect),
            camera.project(to, screen_rect),
        ) else {
            return;
        };
        let fog = fog_factor((a.depth + b.depth) * 0.5, fog_near, fog_far);
        if fog >= 1.0 {
            return;
        }
        let faded = colors::mix(color, colors::BACKGROUND, fog);
        painter.line_segment([a.pos, b.pos], Stroke::new(1.0, faded));
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    fn render_edge(
        &self,
        painter: &egui::Painter,
        camera: &OrbitCamera,
        screen_rect: Rect,
        edge: &EdgeVisual,
        fog: f32,
    ) {
        let (Some(a), Some(b)) = (
            camera.project(edge.start, screen_rect),
            camera.project(edge.end, screen_rect),
        ) else {
            return;
        };
        let fogged = colors::mix(edge.color, colors::BACKGROUND, fog);
        let color = colors::apply_opacity(fogged, edge.opacity);
        painter.line_segment([a.pos, b.pos], Stroke::new(EDGE_WIDTH, color));
    }

    // =========================================================================
    // NODES
    // =========================================================================

    fn render_node(
        &self,
        painter: &egui::Painter,
        camera: &OrbitCamera,
        screen_rect: Rect,
        node: &NodeVisual,
        depth: f32,
        fog: f32,
    ) {
        let Some(projected) = camera.project(node.position, screen_rect) else {
            return;
        };
        let pos = projected.pos;
        let radius = camera.scale_at(node.size, depth, screen_rect);
        if radius < 0.5 {
            return;
        }

        // Lambert shading with a camera-facing normal, plus the hemisphere
        // sky tint and depth fog.
        let light = LIGHT_DIR.normalize();
        let normal = (camera.eye() - node.position).normalize_or_zero();
        let lambert = normal.dot(light).max(0.0);
        let shaded = colors::scale_rgb(node.color, AMBIENT + (1.0 - AMBIENT) * lambert);
        let tinted = colors::mix(shaded, colors::HEMISPHERE_SKY, 0.08);
        let lit = colors::mix(tinted, colors::BACKGROUND, fog);

        // Outer glow from the emissive tint
        let glow = colors::mix(node.emissive, colors::BACKGROUND, fog);
        painter.circle_filled(pos, radius * 1.6, colors::apply_opacity(glow, 0.35 * (1.0 - fog)));

        // Core primitive
        match node.shape {
            NodeShape::Box => {
                let rect = Rect::from_center_size(pos, Vec2::splat(radius * 2.0));
                painter.rect_filled(rect, 2.0, lit);
                painter.rect_stroke(rect, 2.0, Stroke::new(1.0, colors::scale_rgb(lit, 1.25)));
            }
            NodeShape::Sphere => {
                painter.circle_filled(pos, radius, lit);
                painter.circle_stroke(pos, radius, Stroke::new(1.0, colors::scale_rgb(lit, 1.25)));
            }
            NodeShape::Cylinder => {
                let points = regular_polygon(pos, radius, node.segments);
                painter.add(egui::Shape::convex_polygon(
                    points,
                    lit,
                    Stroke::new(1.0, colors::scale_rgb(lit, 1.25)),
                ));
            }
            NodeShape::Tetrahedron => {
                let points = vec![
                    pos - Vec2::new(0.0, radius),
                    pos + Vec2::new(-radius * 0.866, radius * 0.5),
                    pos + Vec2::new(radius * 0.866, radius * 0.5),
                ];
                painter.add(egui::Shape::convex_polygon(
                    points,
                    lit,
                    Stroke::new(1.0, colors::scale_rgb(lit, 1.25)),
                ));
            }
        }

        // Specular highlight scaled by shininess
        let highlight_alpha = (node.shininess / 100.0 * 150.0 * (1.0 - fog)) as u8;
        if highlight_alpha > 0 {
            painter.circle_filled(
                pos - Vec2::splat(radius * 0.35),
                radius * 0.22,
                egui::Color32::from_rgba_unmultiplied(255, 255, 255, highlight_alpha),
            );
        }

        // Label, when the node is close enough to matter
        if let Some(ref label) = node.label {
            if radius > 6.0 {
                painter.text(
                    pos + Vec2::new(0.0, radius + 8.0),
                    egui::Align2::CENTER_TOP,
                    label,
                    egui::FontId::proportional(11.0),
                    colors::mix(egui::Color32::from_rgb(220, 220, 220), colors::BACKGROUND, fog),
                );
            }
        }
    }
}

/// Regular n-gon in screen space (cylinder cross-section).
fn regular_polygon(center: Pos2, radius: f32, segments: u32) -> Vec<Pos2> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_factor_clamps() {
        assert_eq!(fog_factor(10.0, 20.0, 100.0), 0.0);
        assert_eq!(fog_factor(200.0, 20.0, 100.0), 1.0);
        assert!((fog_factor(60.0, 20.0, 100.0) - 0.5).abs() < 0.001);
    }

    #[test]
    fn constrained_fog_is_tighter() {
        let (full_near, full_far) = fog_range(DeviceProfile::Full);
        let (c_near, c_far) = fog_range(DeviceProfile::Constrained);
        assert!(c_far < full_far);
        assert!(c_near > full_near);
        assert!(grid_extent(DeviceProfile::Constrained) < grid_extent(DeviceProfile::Full));
    }

    #[test]
    fn polygon_has_requested_vertex_count() {
        let points = regular_polygon(Pos2::new(0.0, 0.0), 10.0, 16);
        assert_eq!(points.len(), 16);
        // Degenerate segment counts are raised to a triangle
        assert_eq!(regular_polygon(Pos2::ZERO, 10.0, 1).len(), 3);
    }
}
