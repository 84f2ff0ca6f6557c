//! RAM framebuffer with per-pixel change detection.
//!
//! The list page draws into this buffer instead of the panel. After drawing,
//! only the rectangle containing changed pixels is pushed to the display, so
//! a single updated reading costs one small transfer instead of a full frame.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use super::BACKGROUND_COLOR;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(self.width() as u32, self.height() as u32),
        )
    }
}

/// Heap-allocated `DrawTarget<Color = Rgb565>` sized to the panel.
///
/// A fresh buffer is filled with the background color and is not dirty.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    pub fn new(size: Size) -> Self {
        let width = size.width as usize;
        let height = size.height as usize;
        Self {
            width,
            height,
            pixels: vec![BACKGROUND_COLOR; width * height],
            dirty: None,
        }
    }

    /// Color at a point, or `None` outside the buffer.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let (x, y) = self.index_of(point)?;
        Some(self.pixels[y * self.width + x])
    }

    /// Region that the next [`flush`](Self::flush) would send.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    fn index_of(&self, point: Point) -> Option<(usize, usize)> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Push the changed region to a display, then reset the dirty state.
    ///
    /// A no-op when nothing changed since the last flush.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let width = rect.width();
        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            width,
            rect.height(),
            rect.min_x,
            rect.min_y
        );

        let pixels = &self.pixels;
        let stride = self.width;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&rect.to_rectangle(), pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let Some((x, y)) = self.index_of(coord) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Display double that records which pixels it was sent.
    struct RecordingDisplay {
        size: Size,
        received: Vec<Pixel<Rgb565>>,
    }

    impl OriginDimensions for RecordingDisplay {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for RecordingDisplay {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            self.received.extend(pixels);
            Ok(())
        }
    }

    fn display() -> RecordingDisplay {
        RecordingDisplay {
            size: Size::new(16, 16),
            received: Vec::new(),
        }
    }

    #[test]
    fn test_new_buffer_is_clean() {
        let mut framebuffer = FrameBuffer::new(Size::new(16, 16));
        let mut display = display();

        assert_eq!(framebuffer.dirty_area(), None);
        framebuffer.flush(&mut display).unwrap();
        assert!(display.received.is_empty());
    }

    #[test]
    fn test_dirty_area_covers_changed_pixels() {
        let mut framebuffer = FrameBuffer::new(Size::new(16, 16));
        Pixel(Point::new(3, 4), Rgb565::WHITE)
            .draw(&mut framebuffer)
            .unwrap();
        Pixel(Point::new(6, 2), Rgb565::RED)
            .draw(&mut framebuffer)
            .unwrap();
        // Same color as the background: no change.
        Pixel(Point::new(15, 15), BACKGROUND_COLOR)
            .draw(&mut framebuffer)
            .unwrap();

        assert_eq!(
            framebuffer.dirty_area(),
            Some(Rectangle::new(Point::new(3, 2), Size::new(4, 3)))
        );
    }

    #[test]
    fn test_flush_sends_only_dirty_region() {
        let mut framebuffer = FrameBuffer::new(Size::new(16, 16));
        let mut display = display();
        framebuffer
            .fill_solid(
                &Rectangle::new(Point::new(2, 2), Size::new(2, 3)),
                Rgb565::GREEN,
            )
            .unwrap();

        framebuffer.flush(&mut display).unwrap();

        assert_eq!(display.received.len(), 6);
        assert!(display.received.iter().all(|p| p.1 == Rgb565::GREEN));
        assert_eq!(framebuffer.dirty_area(), None);
    }

    #[test]
    fn test_out_of_bounds_drawing_is_clipped() {
        let mut framebuffer = FrameBuffer::new(Size::new(16, 16));
        framebuffer
            .fill_solid(
                &Rectangle::new(Point::new(-4, 14), Size::new(8, 8)),
                Rgb565::BLUE,
            )
            .unwrap();

        assert_eq!(framebuffer.pixel(Point::new(0, 15)), Some(Rgb565::BLUE));
        assert_eq!(framebuffer.pixel(Point::new(4, 15)), Some(BACKGROUND_COLOR));
        assert_eq!(framebuffer.pixel(Point::new(-1, 15)), None);
        assert_eq!(
            framebuffer.dirty_area(),
            Some(Rectangle::new(Point::new(0, 14), Size::new(4, 2)))
        );
    }
}
