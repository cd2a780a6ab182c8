//! Projection between screen pixels and (layout axis, sample axis) coordinates.

use crate::data_types::Layout;
use crate::layout::Span;
use crate::utils::PixelsExt;
use gpui::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutTransform {
    pub layout: Layout,
    pub bounds: Bounds<Pixels>,
}

impl LayoutTransform {
    pub fn new(layout: Layout, bounds: Bounds<Pixels>) -> Self {
        Self { layout, bounds }
    }

    pub fn layout_extent(&self) -> f32 {
        match self.layout {
            Layout::Vertical => self.bounds.size.width.as_f32(),
            Layout::Horizontal => self.bounds.size.height.as_f32(),
        }
    }

    pub fn sample_extent(&self) -> f32 {
        match self.layout {
            Layout::Vertical => self.bounds.size.height.as_f32(),
            Layout::Horizontal => self.bounds.size.width.as_f32(),
        }
    }

    /// Returns `(layout_pos, sample_pos)` relative to the container origin.
    pub fn screen_to_axes(&self, point: Point<Pixels>) -> (f32, f32) {
        let x = (point.x - self.bounds.origin.x).as_f32();
        let y = (point.y - self.bounds.origin.y).as_f32();
        match self.layout {
            Layout::Vertical => (x, y),
            Layout::Horizontal => (y, x),
        }
    }

    pub fn axes_to_screen(&self, layout_pos: f32, sample_pos: f32) -> Point<Pixels> {
        let (x, y) = match self.layout {
            Layout::Vertical => (layout_pos, sample_pos),
            Layout::Horizontal => (sample_pos, layout_pos),
        };
        point(self.bounds.origin.x + px(x), self.bounds.origin.y + px(y))
    }

    /// Screen rectangle covering `layout_span` x `sample_span`.
    pub fn region(&self, layout_span: Span, sample_span: Span) -> Bounds<Pixels> {
        let origin = self.axes_to_screen(layout_span.start, sample_span.start);
        let (w, h) = match self.layout {
            Layout::Vertical => (layout_span.len, sample_span.len),
            Layout::Horizontal => (sample_span.len, layout_span.len),
        };
        Bounds::new(origin, size(px(w), px(h)))
    }
}
