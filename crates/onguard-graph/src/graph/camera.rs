//! OrbitCamera - perspective camera orbiting the scene origin.
//!
//! Yaw, pitch, and distance are spring-animated so drag input settles with
//! the damped feel of orbit controls. Call `update(dt)` at the start of the
//! frame, then use `project()` for rendering.

use egui::{Pos2, Rect, Vec2};
use glam::{Mat4, Vec3, Vec4Swizzles};

use super::animation::{SpringConfig, SpringF32};
use super::DeviceProfile;

/// Result of projecting a world point into the viewport.
#[derive(Debug, Clone, Copy)]
pub struct Projected {
    /// Screen position in egui coordinates.
    pub pos: Pos2,
    /// View depth (distance along the camera axis); larger = farther.
    pub depth: f32,
}

/// Perspective orbit camera with damped controls.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal orbit angle in radians (animated).
    yaw: SpringF32,
    /// Vertical orbit angle in radians (animated, clamped).
    pitch: SpringF32,
    /// Distance from the orbit target (animated).
    distance: SpringF32,
    /// Point the camera orbits and looks at.
    target: Vec3,
    /// Vertical field of view in degrees.
    fov_y_deg: f32,
    /// Viewport aspect ratio (width / height), updated on resize.
    aspect: f32,
    near: f32,
    far: f32,
    /// Drag-to-radians factor (slower on touch profiles).
    rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Pitch is kept just short of the poles to avoid a degenerate up vector.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.05;

/// Radians of orbit per pixel of drag, before the rotate-speed factor.
const DRAG_SENSITIVITY: f32 = 0.005;

impl OrbitCamera {
    /// Create a camera tuned for the given device profile.
    ///
    /// Constrained targets get a wider field of view and a farther start
    /// distance, plus heavier damping and slower rotation for touch input.
    pub fn for_profile(profile: DeviceProfile) -> Self {
        let (fov_y_deg, start_distance, rotate_speed, preset) = match profile {
            DeviceProfile::Full => (75.0, 30.0, 1.0, "camera"),
            DeviceProfile::Constrained => (85.0, 40.0, 0.6, "camera_touch"),
        };
        let config = SpringConfig::from_preset(preset);

        Self {
            yaw: SpringF32::with_config(0.0, config),
            pitch: SpringF32::with_config(0.0, config),
            distance: SpringF32::with_config(start_distance, config),
            target: Vec3::ZERO,
            fov_y_deg,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            rotate_speed,
            min_distance: 5.0,
            max_distance: 200.0,
        }
    }

    // =========================================================================
    // VIEWPORT
    // =========================================================================

    /// Track the render surface size (call every frame; cheap).
    ///
    /// The next projection uses exactly `width / height` as the aspect ratio.
    pub fn set_viewport(&mut self, screen_rect: Rect) {
        if screen_rect.height() > 0.0 {
            self.aspect = screen_rect.width() / screen_rect.height();
        }
    }

    /// Current aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    // =========================================================================
    // CONTROLS
    // =========================================================================

    /// Orbit by a drag delta in screen pixels.
    pub fn orbit(&mut self, drag_delta: Vec2) {
        let yaw = self.yaw.target() - drag_delta.x * DRAG_SENSITIVITY * self.rotate_speed;
        let pitch = (self.pitch.target() + drag_delta.y * DRAG_SENSITIVITY * self.rotate_speed)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw.set_target(yaw);
        self.pitch.set_target(pitch);
    }

    /// Dolly in/out from scroll input (positive scroll = closer).
    pub fn dolly(&mut self, scroll_delta: f32) {
        let factor = 1.0 - scroll_delta * 0.001;
        let next = (self.distance.target() * factor).clamp(self.min_distance, self.max_distance);
        self.distance.set_target(next);
    }

    /// Advance the damped control animation (call every frame).
    pub fn update(&mut self, dt: f32) {
        self.yaw.tick(dt);
        self.pitch.tick(dt);
        self.distance.tick(dt);
    }

    /// Jump all controls to their targets (no interpolation).
    pub fn snap_to_target(&mut self) {
        self.yaw.set_immediate(self.yaw.target());
        self.pitch.set_immediate(self.pitch.target());
        self.distance.set_immediate(self.distance.target());
    }

    /// Check if the camera is still settling toward its targets.
    pub fn is_animating(&self) -> bool {
        self.yaw.is_animating() || self.pitch.is_animating() || self.distance.is_animating()
    }

    /// Reset orbit to the default front-on view.
    pub fn reset(&mut self) {
        self.yaw.set_target(0.0);
        self.pitch.set_target(0.0);
    }

    // =========================================================================
    // PROJECTION
    // =========================================================================

    /// Camera position in world space.
    pub fn eye(&self) -> Vec3 {
        let yaw = self.yaw.get();
        let pitch = self.pitch.get();
        let dist = self.distance.get();
        self.target
            + Vec3::new(
                dist * pitch.cos() * yaw.sin(),
                dist * pitch.sin(),
                dist * pitch.cos() * yaw.cos(),
            )
    }

    /// Combined view-projection matrix for the current frame.
    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        proj * view
    }

    /// Project a world point to screen space.
    ///
    /// Returns `None` for points behind (or at) the near plane.
    pub fn project(&self, world: Vec3, screen_rect: Rect) -> Option<Projected> {
        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= self.near {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        let center = screen_rect.center();
        let pos = Pos2::new(
            center.x + ndc.x * screen_rect.width() * 0.5,
            center.y - ndc.y * screen_rect.height() * 0.5,
        );
        Some(Projected { pos, depth: clip.w })
    }

    /// Screen-pixel size of a world-space length at the given view depth.
    pub fn scale_at(&self, world_size: f32, depth: f32, screen_rect: Rect) -> f32 {
        let focal = 0.5 * screen_rect.height() / (self.fov_y_deg.to_radians() * 0.5).tan();
        world_size * focal / depth.max(self.near)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::for_profile(DeviceProfile::Full)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: f32, h: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(w, h))
    }

    #[test]
    fn resize_sets_exact_aspect() {
        let mut cam = OrbitCamera::default();
        cam.set_viewport(rect(800.0, 600.0));
        assert_eq!(cam.aspect(), 800.0 / 600.0);

        cam.set_viewport(rect(1024.0, 300.0));
        assert_eq!(cam.aspect(), 1024.0 / 300.0);
    }

    #[test]
    fn zero_height_viewport_is_ignored() {
        let mut cam = OrbitCamera::default();
        cam.set_viewport(rect(800.0, 600.0));
        cam.set_viewport(rect(800.0, 0.0));
        assert_eq!(cam.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let mut cam = OrbitCamera::default();
        let screen = rect(800.0, 600.0);
        cam.set_viewport(screen);

        let projected = cam.project(Vec3::ZERO, screen).unwrap();
        assert!((projected.pos.x - 400.0).abs() < 0.01);
        assert!((projected.pos.y - 300.0).abs() < 0.01);
        // Default full-profile camera starts 30 units back
        assert!((projected.depth - 30.0).abs() < 0.01);
    }

    #[test]
    fn higher_world_y_is_higher_on_screen() {
        let mut cam = OrbitCamera::default();
        let screen = rect(800.0, 600.0);
        cam.set_viewport(screen);

        let up = cam.project(Vec3::new(0.0, 5.0, 0.0), screen).unwrap();
        let center = cam.project(Vec3::ZERO, screen).unwrap();
        assert!(up.pos.y < center.pos.y);
    }

    #[test]
    fn point_behind_camera_is_culled() {
        let mut cam = OrbitCamera::default();
        let screen = rect(800.0, 600.0);
        cam.set_viewport(screen);

        // Camera sits at z=+30 looking at origin; z=+100 is behind it.
        assert!(cam.project(Vec3::new(0.0, 0.0, 100.0), screen).is_none());
    }

    #[test]
    fn nearer_objects_render_larger() {
        let cam = OrbitCamera::default();
        let screen = rect(800.0, 600.0);
        let near = cam.scale_at(1.0, 10.0, screen);
        let far = cam.scale_at(1.0, 50.0, screen);
        assert!(near > far);
    }

    #[test]
    fn orbit_moves_the_eye() {
        let mut cam = OrbitCamera::default();
        let before = cam.eye();

        cam.orbit(egui::vec2(120.0, 0.0));
        cam.snap_to_target();
        let after = cam.eye();

        assert!((before - after).length() > 0.1);
        // Distance from target is preserved by an orbit
        assert!((before.length() - after.length()).abs() < 0.001);
    }

    #[test]
    fn dolly_clamps_to_limits() {
        let mut cam = OrbitCamera::default();
        for _ in 0..100 {
            cam.dolly(10_000.0);
        }
        cam.snap_to_target();
        assert!((cam.eye().length() - cam.min_distance).abs() < 0.001);
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut cam = OrbitCamera::default();
        cam.orbit(egui::vec2(0.0, 100_000.0));
        cam.snap_to_target();
        let eye = cam.eye();
        // Even at the pitch limit the eye keeps a horizontal component.
        assert!(eye.z.abs() > 0.01);
    }
}
