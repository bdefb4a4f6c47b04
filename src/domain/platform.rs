/// Platforms: immutable-shape horizontal surfaces the actor lands on.
///
/// A platform's shape never changes after construction; the only mutable
/// state is its position, driven by a drift velocity that is zero by
/// default (latent feature — moving platforms share the same tick path).
///
/// Identity: every platform gets a stable `PlatformId` at creation. The
/// actor refers to its resting platform by id, never by index, because the
/// pool evicts from the front and indices shift.

use glam::Vec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PlatformId(pub u32);

#[derive(Clone, Debug)]
pub struct Platform {
    id: PlatformId,
    pos: Vec2,     // top-left, world coordinates (y grows downward)
    size: Vec2,
    drift: Vec2,   // units/s, zero by default
}

impl Platform {
    pub fn new(id: PlatformId, x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0, "platform width must be positive");
        Platform {
            id,
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
            drift: Vec2::ZERO,
        }
    }

    pub fn id(&self) -> PlatformId {
        self.id
    }

    /// World y of the top surface (the landing edge).
    pub fn top_y(&self) -> f32 {
        self.pos.y
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Horizontal span as `(left_x, right_x)`, left <= right.
    pub fn x_extent(&self) -> (f32, f32) {
        (self.pos.x, self.pos.x + self.size.x)
    }

    /// Still visible relative to the camera's lower bound?
    ///
    /// `view_bottom_y` is the world y of the lowest visible row
    /// (`screen_height - camera.offset.y`). Once the platform's bottom
    /// edge drops below it, the platform has scrolled out and can be
    /// evicted. Pure predicate, no side effects.
    pub fn still_in_focus(&self, view_bottom_y: f32) -> bool {
        self.pos.y + self.size.y <= view_bottom_y
    }

    /// Apply drift. A no-op for the default zero drift velocity.
    pub fn tick(&mut self, dt: f32) {
        self.pos += self.drift * dt;
    }

    /// For rendering: top-left position.
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// For rendering: width in world units.
    pub fn width(&self) -> f32 {
        self.size.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plat(x: f32, y: f32, w: f32) -> Platform {
        Platform::new(PlatformId(0), x, y, w, 10.0)
    }

    #[test]
    fn x_extent_ordering() {
        let p = plat(100.0, 500.0, 200.0);
        let (l, r) = p.x_extent();
        assert_eq!(l, 100.0);
        assert_eq!(r, 300.0);
        assert!(l <= r);
    }

    #[test]
    fn scrolled_out_platform_loses_focus() {
        // Camera offset 0, screen height 600: view bottom at world y 600.
        // A platform at y=605 has its bottom edge at 615 — out of view.
        let p = plat(0.0, 605.0, 100.0);
        assert!(!p.still_in_focus(600.0));
    }

    #[test]
    fn visible_platform_keeps_focus() {
        let p = plat(0.0, 500.0, 100.0);
        assert!(p.still_in_focus(600.0));
        // Exactly on the bound counts as visible.
        let edge = plat(0.0, 590.0, 100.0);
        assert!(edge.still_in_focus(600.0));
    }

    #[test]
    fn focus_follows_camera_scroll() {
        let p = plat(0.0, 500.0, 100.0);
        assert!(p.still_in_focus(600.0 - 0.0));
        // Camera climbed 100 units: view bottom now 500, bottom edge 510.
        assert!(!p.still_in_focus(600.0 - 100.0));
    }

    #[test]
    fn zero_drift_tick_is_noop() {
        let mut p = plat(50.0, 400.0, 150.0);
        let before = p.pos();
        p.tick(1.0 / 60.0);
        assert_eq!(p.pos(), before);
    }
}
