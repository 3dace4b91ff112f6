//! Color palettes for the threat map.
//!
//! Risk bands, relation colors, and scene constants live here so every
//! renderer agrees on the same values.

use egui::Color32;
use onguard_types::RelationKind;

// =============================================================================
// SCENE CONSTANTS
// =============================================================================

/// Scene background (also the fog color).
pub const BACKGROUND: Color32 = Color32::from_rgb(10, 14, 23); // #0a0e17

/// Reference grid: center lines.
pub const GRID_MAJOR: Color32 = Color32::from_rgb(68, 68, 68); // #444444

/// Reference grid: division lines.
pub const GRID_MINOR: Color32 = Color32::from_rgb(34, 34, 34); // #222222

/// Hemisphere sky tint used for top-light shading.
pub const HEMISPHERE_SKY: Color32 = Color32::from_rgb(179, 229, 252); // #B3E5FC

// =============================================================================
// RISK COLORS
// =============================================================================

/// Map a risk score (0-100) to its band color.
///
/// Strict `>` thresholds: 75/50/25 themselves fall into the lower band.
pub fn risk_color(score: f32) -> Color32 {
    if score > 75.0 {
        Color32::from_rgb(255, 61, 0) // #ff3d00 red, high risk
    } else if score > 50.0 {
        Color32::from_rgb(255, 145, 0) // #ff9100 orange, medium risk
    } else if score > 25.0 {
        Color32::from_rgb(255, 234, 0) // #ffea00 yellow, low risk
    } else {
        Color32::from_rgb(118, 255, 3) // #76ff03 green, safe
    }
}

/// Dimmer emissive tint derived from a base color (base scaled by 0.3).
pub fn emissive_tint(base: Color32) -> Color32 {
    scale_rgb(base, 0.3)
}

// =============================================================================
// RELATION COLORS
// =============================================================================

/// Fixed color per relation kind.
pub fn relation_color(kind: RelationKind) -> Color32 {
    match kind {
        RelationKind::Transaction => Color32::from_rgb(79, 195, 247), // #4fc3f7 light blue
        RelationKind::Deployment => Color32::from_rgb(121, 134, 203), // #7986cb purple blue
        RelationKind::Attack => Color32::from_rgb(255, 82, 82),       // #ff5252 red
        RelationKind::Interaction => Color32::from_rgb(176, 190, 197), // #b0bec5 grey blue
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Multiply the alpha channel by `opacity` (0.0-1.0).
pub fn apply_opacity(color: Color32, opacity: f32) -> Color32 {
    let [r, g, b, a] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * opacity.clamp(0.0, 1.0)) as u8)
}

/// Linear blend from `a` to `b` by `t` (0.0 = a, 1.0 = b). Used for fog.
pub fn mix(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |x: u8, y: u8| -> u8 { (x as f32 + (y as f32 - x as f32) * t) as u8 };
    Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
}

/// Multiply RGB channels by a factor (> 1.0 brightens, < 1.0 darkens).
pub fn scale_rgb(color: Color32, factor: f32) -> Color32 {
    let scale = |c: u8| -> u8 { ((c as f32 * factor).round() as u32).min(255) as u8 };
    Color32::from_rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_bands() {
        assert_eq!(risk_color(80.0), Color32::from_rgb(255, 61, 0)); // red
        assert_eq!(risk_color(60.0), Color32::from_rgb(255, 145, 0)); // orange
        assert_eq!(risk_color(30.0), Color32::from_rgb(255, 234, 0)); // yellow
        assert_eq!(risk_color(10.0), Color32::from_rgb(118, 255, 3)); // green
    }

    #[test]
    fn risk_boundaries_map_to_lower_band() {
        // Strict `>`: exactly 75/50/25 stay in the lower band.
        assert_eq!(risk_color(75.0), risk_color(60.0));
        assert_eq!(risk_color(50.0), risk_color(30.0));
        assert_eq!(risk_color(25.0), risk_color(10.0));
    }

    #[test]
    fn relation_colors_are_fixed() {
        assert_eq!(
            relation_color(RelationKind::Transaction),
            Color32::from_rgb(79, 195, 247)
        );
        assert_eq!(
            relation_color(RelationKind::Attack),
            Color32::from_rgb(255, 82, 82)
        );
    }

    #[test]
    fn emissive_is_dimmer_than_base() {
        let base = risk_color(80.0);
        let emissive = emissive_tint(base);
        assert!(emissive.r() < base.r());
        assert_eq!(emissive.g(), (base.g() as f32 * 0.3).round() as u8);
    }

    #[test]
    fn mix_endpoints() {
        let a = Color32::from_rgb(0, 0, 0);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
    }
}
