//! Scrolling list of sensor rows.
//!
//! Each row is drawn as two lines: the sensor name in a small dim font and
//! the latest value in a large font underneath. The page tracks the store
//! revision it last drew so the host only redraws after a real change.

use core::ops::Range;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use super::{
    BACKGROUND_COLOR, NAME_COLOR, PLACEHOLDER_COLOR, TouchEvent, TouchPoint, VALUE_COLOR,
};
use crate::store::{ReadingStore, Row};

/// Height of one name + value row, including the gap below it.
pub const ROW_HEIGHT_PX: u32 = 36;

/// Offset of the value line below the name line.
const VALUE_OFFSET_PX: i32 = 11;

/// Inset from the page edges; keeps text inside a round panel's visible area.
const HORIZONTAL_INSET_PX: i32 = 28;
const VERTICAL_INSET_PX: i32 = 24;

/// Drawn in place of the placeholder dash, which the ASCII fonts lack.
const PLACEHOLDER_TEXT: &str = "--";

pub struct SensorListPage {
    bounds: Rectangle,
    scroll_offset: i32,
    row_count: usize,
    drawn_revision: Option<u32>,
    dirty: bool,
    last_touch: Option<TouchPoint>,
}

impl SensorListPage {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            scroll_offset: 0,
            row_count: 0,
            drawn_revision: None,
            dirty: true,
            last_touch: None,
        }
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    /// Pick up store changes. Returns `true` if the page now needs a redraw.
    pub fn sync(&mut self, store: &ReadingStore) -> bool {
        if self.row_count != store.len() {
            self.row_count = store.len();
            self.constrain_scroll();
            self.dirty = true;
        }
        if self.drawn_revision != Some(store.revision()) {
            self.drawn_revision = Some(store.revision());
            self.dirty = true;
        }
        self.dirty
    }

    /// Scroll on vertical drags. Returns `true` if the offset moved.
    pub fn handle_touch(&mut self, event: TouchEvent) -> bool {
        match event {
            TouchEvent::Press(point) => {
                self.last_touch = Some(point);
                false
            }
            TouchEvent::Drag(point) => {
                let Some(last) = self.last_touch.replace(point) else {
                    return false;
                };
                let before = self.scroll_offset;
                self.scroll_by((last.to_point() - point.to_point()).y);
                self.scroll_offset != before
            }
            TouchEvent::Release => {
                self.last_touch = None;
                false
            }
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let before = self.scroll_offset;
        self.scroll_offset = self.scroll_offset.saturating_add(delta);
        self.constrain_scroll();
        if self.scroll_offset != before {
            self.dirty = true;
        }
    }

    /// Largest offset that still keeps the last row on screen.
    pub fn max_scroll(&self) -> i32 {
        let content = self.row_count as i32 * ROW_HEIGHT_PX as i32 + 2 * VERTICAL_INSET_PX;
        (content - self.bounds.size.height as i32).max(0)
    }

    fn constrain_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0, self.max_scroll());
    }

    /// Indices of rows that intersect the viewport.
    pub fn visible_rows(&self) -> Range<usize> {
        let row_height = ROW_HEIGHT_PX as i32;
        let top = (self.scroll_offset - VERTICAL_INSET_PX).max(0);
        let bottom = self.scroll_offset + self.bounds.size.height as i32 - VERTICAL_INSET_PX;
        let first = (top / row_height) as usize;
        let last = ((bottom + row_height - 1) / row_height).max(0) as usize;
        first.min(self.row_count)..last.min(self.row_count)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Render the visible rows, clipped to the page bounds.
    pub fn draw<D: DrawTarget<Color = Rgb565>>(
        &self,
        store: &ReadingStore,
        display: &mut D,
    ) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(BACKGROUND_COLOR))
            .draw(display)?;

        let mut clipped = display.clipped(&self.bounds);
        let rows = store.rows();
        for i in self.visible_rows() {
            if let Some(row) = rows.get(i) {
                self.draw_row(row, self.row_origin(i), &mut clipped)?;
            }
        }
        Ok(())
    }

    fn row_origin(&self, index: usize) -> Point {
        self.bounds.top_left
            + Point::new(
                HORIZONTAL_INSET_PX,
                VERTICAL_INSET_PX + index as i32 * ROW_HEIGHT_PX as i32 - self.scroll_offset,
            )
    }

    fn draw_row<D: DrawTarget<Color = Rgb565>>(
        &self,
        row: &Row,
        origin: Point,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let name_style = MonoTextStyle::new(&FONT_6X10, NAME_COLOR);
        Text::with_baseline(&row.name, origin, name_style, Baseline::Top).draw(display)?;

        let (value, color) = if row.is_placeholder() {
            (PLACEHOLDER_TEXT, PLACEHOLDER_COLOR)
        } else {
            (row.value.as_str(), VALUE_COLOR)
        };
        let value_style = MonoTextStyle::new(&FONT_10X20, color);
        Text::with_baseline(
            value,
            origin + Point::new(0, VALUE_OFFSET_PX),
            value_style,
            Baseline::Top,
        )
        .draw(display)?;

        Ok(())
    }
}
