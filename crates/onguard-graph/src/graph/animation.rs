//! Spring-based animation for smooth 60fps camera motion.
//!
//! Uses critically-damped spring physics so values converge without
//! overshoot (unless a bouncy preset is chosen).
//!
//! No callbacks - values are polled each frame via `get()` after `tick(dt)`.
//! Presets come from `config/graph_settings.yaml` via [`global_config`].

use crate::config::{global_config, SpringConfigYaml};

/// Spring configuration parameters
#[derive(Debug, Clone, Copy)]
pub struct SpringConfig {
    /// Stiffness (higher = faster response). Typical: 80-300
    pub stiffness: f32,
    /// Damping ratio: 1.0 = critically damped (no overshoot)
    pub damping: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::from_preset("medium")
    }
}

impl From<SpringConfigYaml> for SpringConfig {
    fn from(yaml: SpringConfigYaml) -> Self {
        Self {
            stiffness: yaml.stiffness,
            damping: yaml.damping,
        }
    }
}

impl SpringConfig {
    /// Load a spring preset by name.
    ///
    /// Available presets: fast, medium, slow, bouncy, camera, camera_touch.
    /// Unknown names fall back to medium.
    pub fn from_preset(name: &str) -> Self {
        global_config().animation.spring(name).into()
    }
}

// =============================================================================
// SPRING F32
// =============================================================================

/// Animated f32 value with spring physics
///
/// # Usage
/// ```ignore
/// let mut distance = SpringF32::new(30.0);
/// distance.set_target(50.0);
///
/// // Each frame:
/// distance.tick(dt);
/// let current = distance.get();
/// ```
#[derive(Debug, Clone)]
pub struct SpringF32 {
    current: f32,
    target: f32,
    velocity: f32,
    config: SpringConfig,
}

impl SpringF32 {
    /// Create with initial value and default (medium) spring config
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, SpringConfig::from_preset("medium"))
    }

    /// Create with initial value and custom spring config
    pub fn with_config(initial: f32, config: SpringConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            velocity: 0.0,
            config,
        }
    }

    /// Set new target value (animation begins)
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Get current target value
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Jump immediately to value (no animation)
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Update animation state (call each frame with delta time in seconds)
    ///
    /// F = -k*x - c*v, where k = stiffness, c = damping * 2 * sqrt(k)
    pub fn tick(&mut self, dt: f32) {
        // Clamp dt to prevent instability with large time steps
        let dt = dt.min(0.1);

        let displacement = self.current - self.target;
        let spring_force = -self.config.stiffness * displacement;
        let damping_force =
            -self.config.damping * 2.0 * self.config.stiffness.sqrt() * self.velocity;
        let acceleration = spring_force + damping_force;

        self.velocity += acceleration * dt;
        self.current += self.velocity * dt;

        // Snap to target if close enough (prevents micro-oscillation)
        if (self.current - self.target).abs() < 0.0001 && self.velocity.abs() < 0.001 {
            self.current = self.target;
            self.velocity = 0.0;
        }
    }

    /// Get current animated value
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Check if animation is still in progress
    pub fn is_animating(&self) -> bool {
        (self.current - self.target).abs() > 0.0001 || self.velocity.abs() > 0.001
    }

    /// Update spring configuration
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }
}

// =============================================================================
// TESTS
// =============================================================================
