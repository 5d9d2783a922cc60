use vitrine_common::Color;

/// Scale a hovered shoe grows toward.
pub const HOVER_SCALE: f32 = 0.7;
/// Scale of a shoe at rest.
pub const REST_SCALE: f32 = 0.3;
/// Per-frame smoothing toward the scale target.
pub const SCALE_SMOOTHING: f32 = 0.1;
/// Per-frame smoothing toward red while hovered.
pub const HOVER_COLOR_SMOOTHING: f32 = 1.0;
/// Per-frame smoothing back toward white.
pub const REST_COLOR_SMOOTHING: f32 = 0.1;

/// Hover flag of one instance, flipped by pointer enter and leave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverTracker {
    hovered: bool,
}

impl HoverTracker {
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Set the flag. Returns whether it changed.
    pub fn set(&mut self, hovered: bool) -> bool {
        let changed = self.hovered != hovered;
        self.hovered = hovered;
        changed
    }

    pub fn enter(&mut self) -> bool {
        self.set(true)
    }

    pub fn leave(&mut self) -> bool {
        self.set(false)
    }

    pub fn scale_target(&self) -> f32 {
        if self.hovered { HOVER_SCALE } else { REST_SCALE }
    }

    /// Target color and the smoothing factor used to approach it.
    pub fn color_target(&self) -> (Color, f32) {
        if self.hovered {
            (Color::RED, HOVER_COLOR_SMOOTHING)
        } else {
            (Color::WHITE, REST_COLOR_SMOOTHING)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_is_idempotent() {
        let mut h = HoverTracker::default();
        assert!(h.enter());
        assert!(!h.enter());
        assert!(h.is_hovered());
        assert!(h.leave());
        assert!(!h.leave());
        assert!(!h.is_hovered());
    }

    #[test]
    fn targets_follow_flag() {
        let mut h = HoverTracker::default();
        assert_eq!(h.scale_target(), REST_SCALE);
        assert_eq!(h.color_target(), (Color::WHITE, 0.1));
        h.enter();
        assert_eq!(h.scale_target(), HOVER_SCALE);
        assert_eq!(h.color_target(), (Color::RED, 1.0));
    }
}
