//! Dense-pixel rasterization: one opaque rectangle per matrix value.

use crate::colormap::{Colormap, PackedColor};
use crate::data_types::{Layout, Matrix, Panel};
use crate::utils::{round2, PixelsExt};
use gpui::*;

/// Target that dense-pixel cells are painted into.
pub trait PixelCanvas {
    fn fill_rect(&mut self, rect: Bounds<Pixels>, color: PackedColor);
}

/// Paints straight into the gpui window during the canvas paint phase.
pub struct WindowCanvas<'a> {
    window: &'a mut Window,
}

impl<'a> WindowCanvas<'a> {
    pub fn new(window: &'a mut Window) -> Self {
        Self { window }
    }
}

impl PixelCanvas for WindowCanvas<'_> {
    fn fill_rect(&mut self, rect: Bounds<Pixels>, color: PackedColor) {
        self.window.paint_quad(gpui::fill(rect, color.to_hsla()));
    }
}

/// In-memory raster of packed `0xRRGGBB` pixels. Also logs every drawn cell.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterCanvas {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    cells: Vec<(Bounds<Pixels>, PackedColor)>,
}

impl RasterCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            cells: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.cells.clear();
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<PackedColor> {
        (x < self.width && y < self.height).then(|| PackedColor(self.pixels[y * self.width + x]))
    }

    pub fn cells(&self) -> &[(Bounds<Pixels>, PackedColor)] {
        &self.cells
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Raw little-endian bytes of the pixel buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

impl PixelCanvas for RasterCanvas {
    fn fill_rect(&mut self, rect: Bounds<Pixels>, color: PackedColor) {
        self.cells.push((rect, color));
        // Edges are rounded so neighbouring cells share a boundary instead of overlapping.
        let edge = |v: Pixels, max: usize| (v.as_f32().round().max(0.0) as usize).min(max);
        let x0 = edge(rect.origin.x, self.width);
        let x1 = edge(rect.origin.x + rect.size.width, self.width);
        let y0 = edge(rect.origin.y, self.height);
        let y1 = edge(rect.origin.y + rect.size.height, self.height);
        for y in y0..y1 {
            let row = y * self.width;
            self.pixels[row + x0..row + x1].fill(color.0);
        }
    }
}

/// Cell size along the time and sample axes for an `rows x cols` matrix.
pub fn cell_size(rows: usize, cols: usize, time_extent: f32, sample_extent: f32) -> (f32, f32) {
    let along_time = round2(time_extent / cols.max(1) as f32).max(1.0);
    let along_samples = round2(sample_extent / rows.max(1) as f32).max(1.0);
    (along_time, along_samples)
}

/// Paints `matrix` (values already in [0, 1]) into the region starting at `origin`.
///
/// In the vertical layout rows are horizontal bands and columns vertical
/// slices; the horizontal layout is the transpose. Returns the number of
/// cells drawn, which is zero for an empty matrix.
pub fn render_dense(
    canvas: &mut impl PixelCanvas,
    matrix: &Matrix,
    layout: Layout,
    origin: Point<Pixels>,
    time_extent: f32,
    sample_extent: f32,
    cmap: Colormap,
) -> usize {
    if matrix.is_empty() {
        return 0;
    }
    let (along_time, along_samples) =
        cell_size(matrix.rows(), matrix.cols(), time_extent, sample_extent);
    let (w, h) = match layout {
        Layout::Vertical => (along_time, along_samples),
        Layout::Horizontal => (along_samples, along_time),
    };

    let mut drawn = 0;
    for (i, row) in matrix.iter_rows().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let (x, y) = match layout {
                Layout::Vertical => (w * j as f32, h * i as f32),
                Layout::Horizontal => (w * i as f32, h * j as f32),
            };
            let rect = Bounds::new(
                point(origin.x + px(x), origin.y + px(y)),
                size(px(w), px(h)),
            );
            canvas.fill_rect(rect, cmap.color(value));
            drawn += 1;
        }
    }
    drawn
}

/// Paints a panel's data and histogram sub-regions. `origin` is the container's top-left corner.
pub fn paint_panel(canvas: &mut impl PixelCanvas, panel: &Panel, origin: Point<Pixels>) -> usize {
    let at = |layout_pos: f32| match panel.layout {
        Layout::Vertical => point(origin.x + px(layout_pos), origin.y),
        Layout::Horizontal => point(origin.x, origin.y + px(layout_pos)),
    };

    let mut drawn = 0;
    if let Some(data) = &panel.data {
        drawn += render_dense(
            canvas,
            data,
            panel.layout,
            at(panel.pos),
            panel.dimensions,
            panel.samples,
            panel.color_data,
        );
    }
    if let Some(hist) = &panel.hist {
        drawn += render_dense(
            canvas,
            hist,
            panel.layout,
            at(panel.hist_pos()),
            panel.hist_dimensions,
            panel.samples,
            panel.color_hist,
        );
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::prelude::v1::test;

    #[test]
    fn empty_matrix_draws_nothing() {
        let mut canvas = RasterCanvas::new(10, 10);
        let m = Matrix::default();
        let drawn = render_dense(
            &mut canvas,
            &m,
            Layout::Vertical,
            Point::default(),
            10.0,
            10.0,
            Colormap::Viridis,
        );
        assert_eq!(drawn, 0);
        assert!(canvas.cells().is_empty());
    }

    #[test]
    fn tiny_regions_clamp_cells_to_one_pixel() {
        assert_eq!(cell_size(1000, 1000, 100.0, 100.0), (1.0, 1.0));
        assert_eq!(cell_size(3, 3, 100.0, 100.0), (33.33, 33.33));
    }
}
