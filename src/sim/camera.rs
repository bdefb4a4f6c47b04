/// The auto-scrolling camera: a cumulative climb offset, advanced every
/// tick regardless of what the actor does. The offset only ever grows —
/// the view never scrolls back down, which is what makes a missed jump
/// eventually fatal.

use glam::Vec2;

#[derive(Clone, Debug)]
pub struct Camera {
    offset: Vec2,      // cumulative climb, y >= 0 and monotonically rising
    scroll_rate: f32,  // units/s
}

impl Camera {
    pub fn new(scroll_rate: f32) -> Self {
        Camera { offset: Vec2::ZERO, scroll_rate }
    }

    pub fn advance(&mut self, dt: f32) {
        self.offset.y += self.scroll_rate * dt;
    }

    /// World y of the lowest visible row. Decreases as the camera climbs
    /// (world y grows downward).
    pub fn view_bottom_y(&self, screen_h: f32) -> f32 {
        screen_h - self.offset.y
    }

    /// Total climb in world units. Doubles as the HUD altitude readout.
    pub fn climb(&self) -> f32 {
        self.offset.y
    }
}
