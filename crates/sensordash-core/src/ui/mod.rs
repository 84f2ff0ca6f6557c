//! Presentation of the reading store
//!
//! A single scrolling list page drawn with `embedded-graphics`, plus a RAM
//! framebuffer that flushes only the region that changed.

mod framebuffer;
mod list_page;

pub use framebuffer::FrameBuffer;
pub use list_page::{ROW_HEIGHT_PX, SensorListPage};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// Round wearable panel, square framebuffer.
pub const DISPLAY_WIDTH_PX: u16 = 240;
pub const DISPLAY_HEIGHT_PX: u16 = 240;

pub const BACKGROUND_COLOR: Rgb565 = Rgb565::BLACK;
pub const NAME_COLOR: Rgb565 = Rgb565::new(20, 40, 20);
pub const VALUE_COLOR: Rgb565 = Rgb565::WHITE;
pub const PLACEHOLDER_COLOR: Rgb565 = Rgb565::new(12, 24, 12);

/// Represents a 2D touch point on the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// Touch events that can occur on the UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// Initial touch press at a point
    Press(TouchPoint),
    /// Touch drag to a new point
    Drag(TouchPoint),
    /// Finger lifted
    Release,
}
