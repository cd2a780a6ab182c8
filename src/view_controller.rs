use gpui::{point, px, Bounds, Pixels, Point};
use serde::{Deserialize, Serialize};

use crate::brush::{BrushRegion, HitGrid};
use crate::data_types::InterestingWindow;
use crate::layout::{LayoutGeometry, Span};
use crate::sessions::SessionKey;

/// Tooltip flips to the left when it would end closer than this to the right edge.
const TOOLTIP_FLIP_MARGIN: f32 = 75.0;
const TOOLTIP_FLIPPED_INSET: f32 = 50.0;
const TOOLTIP_DROP: f32 = 5.0;

/// Fractional `[start, end]` window along a panel's time axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentileWindow {
    pub start: f64,
    pub end: f64,
}

impl PercentileWindow {
    /// Orders and clamps both edges into [0, 1].
    pub fn new(a: f64, b: f64) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start: lo.clamp(0.0, 1.0),
            end: hi.clamp(0.0, 1.0),
        }
    }

    pub fn full() -> Self {
        Self { start: 0.0, end: 1.0 }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    /// Projects the window onto a sub-region along the layout axis.
    pub fn project(&self, base: Span) -> Span {
        Span::new(
            base.start + (self.start * base.len as f64) as f32,
            (self.len() * base.len as f64) as f32,
        )
    }
}

/// A resolved sample selection, ready to open a detail session.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    /// Panel the brush was drawn over; `None` for synthesized selections.
    pub panel: Option<usize>,
    pub rows: Vec<usize>,
    pub indices: Vec<usize>,
    pub window: PercentileWindow,
}

/// Temporary highlight drawn over one panel for an open session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    pub key: SessionKey,
    pub panel: usize,
    pub layout: Span,
    pub samples: Span,
}

/// Pure interaction math (inversion, reprojection, placement), kept apart
/// from gpui so it can be tested directly.
pub struct ViewController;

impl ViewController {
    /// Relative position of `layout` edges inside `base`, clamped to [0, 1].
    pub fn percentile_window(layout: Span, base: Span) -> PercentileWindow {
        if base.len <= 0.0 {
            return PercentileWindow::full();
        }
        let frac = |edge: f32| (edge - base.start) as f64 / base.len as f64;
        PercentileWindow::new(frac(layout.start), frac(layout.end()))
    }

    /// Inverts a released brush into sample rows/indices and a percentile window.
    pub fn selection_from_brush(
        region: &BrushRegion,
        geometry: &LayoutGeometry,
        grid: &HitGrid,
    ) -> Option<Selection> {
        let rows = grid.hit_test(region.samples);
        if rows.is_empty() {
            return None;
        }
        let base = geometry.panel(region.panel)?.percent_base()?;
        Some(Selection {
            panel: Some(region.panel),
            indices: grid.indices_for(&rows),
            rows,
            window: Self::percentile_window(region.layout, base),
        })
    }

    /// The same fractional window on every visible panel that has a sub-region to measure against.
    pub fn reproject(window: PercentileWindow, geometry: &LayoutGeometry) -> Vec<(usize, Span)> {
        geometry
            .panels()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_visible())
            .filter_map(|(i, p)| p.percent_base().map(|base| (i, window.project(base))))
            .collect()
    }

    /// One highlight per panel and per run of consecutive display rows that
    /// hold `indices`. Indices no longer displayed get no highlight.
    pub fn highlights(
        key: SessionKey,
        window: PercentileWindow,
        indices: &[usize],
        geometry: &LayoutGeometry,
        grid: &HitGrid,
    ) -> Vec<Highlight> {
        let runs: Vec<Span> = grid
            .row_runs(&grid.rows_of(indices))
            .iter()
            .filter_map(|run| grid.rows_span(run))
            .collect();
        if runs.is_empty() {
            return Vec::new();
        }
        Self::reproject(window, geometry)
            .into_iter()
            .flat_map(|(panel, layout)| {
                runs.iter().map(move |&samples| Highlight {
                    key,
                    panel,
                    layout,
                    samples,
                })
            })
            .collect()
    }

    /// Turns service-flagged windows into selections. Windows of `min_len`
    /// samples or fewer are dropped; rows beyond the grid are ignored.
    pub fn interesting_selections(
        windows: &[InterestingWindow],
        grid: &HitGrid,
        time_len: usize,
        radius: f64,
        min_len: usize,
    ) -> Vec<Selection> {
        windows
            .iter()
            .filter(|w| w.len() > min_len)
            .filter_map(|w| {
                let end = w.samples.1.min(grid.len());
                let rows: Vec<usize> = (w.samples.0..end).collect();
                if rows.is_empty() {
                    return None;
                }
                let window = if time_len == 0 {
                    PercentileWindow::full()
                } else {
                    let len = time_len as f64;
                    PercentileWindow::new((w.center - radius) / len, (w.center + radius) / len)
                };
                Some(Selection {
                    panel: None,
                    indices: grid.indices_for(&rows),
                    rows,
                    window,
                })
            })
            .collect()
    }

    pub fn tooltip_position(
        pointer: Point<Pixels>,
        container: Bounds<Pixels>,
        offset: f32,
    ) -> Point<Pixels> {
        let right = container.origin.x + container.size.width;
        let x = if pointer.x + px(TOOLTIP_FLIP_MARGIN) < right {
            pointer.x + px(offset)
        } else {
            right - px(TOOLTIP_FLIPPED_INSET)
        };
        point(x, pointer.y + px(TOOLTIP_DROP))
    }

    pub fn tooltip_text(index: usize) -> String {
        format!("Index of the row: {index}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::size;

    #[test]
    fn percentile_window_is_clamped() {
        let w = ViewController::percentile_window(Span::new(-10.0, 40.0), Span::new(0.0, 100.0));
        assert_eq!(w, PercentileWindow::new(0.0, 0.3));
        let reversed = PercentileWindow::new(0.8, 0.2);
        assert_eq!(reversed.start, 0.2);
    }

    #[test]
    fn tooltip_flips_near_right_edge() {
        let container = Bounds::new(point(px(0.0), px(0.0)), size(px(200.0), px(100.0)));
        let near = ViewController::tooltip_position(point(px(10.0), px(20.0)), container, 15.0);
        assert_eq!(near, point(px(25.0), px(25.0)));
        let far = ViewController::tooltip_position(point(px(150.0), px(20.0)), container, 15.0);
        assert_eq!(far.x, px(150.0));
    }

    #[test]
    fn tooltip_text_names_the_row() {
        assert_eq!(ViewController::tooltip_text(42), "Index of the row: 42");
    }
}
