//! Proportional packing of panels along the shared layout axis.
//!
//! Geometry is always recomputed from scratch from the panel specs and the
//! container extent. Inter-panel margins are only charged between panels with
//! a positive logical length; a hidden panel gets extent 0 and sits at the
//! running cursor.

use crate::data_types::{Layout, Matrix, Panel, PanelKind, PanelLengths, PanelMatrices, PanelSpec, Settings};
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Pixels available along the layout axis.
    pub total_extent: f32,
    pub inter_margin: f32,
    pub intra_margin: f32,
    /// Share of a panel's extent given to its histogram when both sub-regions show.
    pub hist_fraction: f32,
}

impl LayoutParams {
    pub fn new(total_extent: f32) -> Self {
        Self {
            total_extent,
            inter_margin: 3.0,
            intra_margin: 2.0,
            hist_fraction: 0.1,
        }
    }

    pub fn with_margins(mut self, inter_margin: f32, intra_margin: f32) -> Self {
        self.inter_margin = inter_margin;
        self.intra_margin = intra_margin;
        self
    }
}

/// A half-open interval `[start, start + len)` along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Span {
    pub start: f32,
    pub len: f32,
}

impl Span {
    pub fn new(start: f32, len: f32) -> Self {
        Self { start, len }
    }

    pub fn from_edges(a: f32, b: f32) -> Self {
        Self {
            start: a.min(b),
            len: (b - a).abs(),
        }
    }

    pub fn end(&self) -> f32 {
        self.start + self.len
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.start && v < self.end()
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    pub fn clamp_to(&self, bounds: &Span) -> Span {
        let start = self.start.clamp(bounds.start, bounds.end());
        let end = self.end().clamp(bounds.start, bounds.end());
        Span::new(start, end - start)
    }

    pub fn is_empty(&self) -> bool {
        self.len <= 0.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanelGeometry {
    pub kind: PanelKind,
    pub pos: f32,
    pub extent: f32,
    pub logical_len: f32,
    pub data: Option<Span>,
    pub hist: Option<Span>,
}

impl PanelGeometry {
    fn hidden(kind: PanelKind, pos: f32) -> Self {
        Self {
            kind,
            pos,
            extent: 0.0,
            logical_len: 0.0,
            data: None,
            hist: None,
        }
    }

    pub fn band(&self) -> Span {
        Span::new(self.pos, self.extent)
    }

    pub fn is_visible(&self) -> bool {
        self.extent > 0.0
    }

    /// Sub-region that brush fractions are measured against.
    pub fn percent_base(&self) -> Option<Span> {
        self.data.or(self.hist)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutGeometry {
    panels: Vec<PanelGeometry>,
    whole_len: f32,
    inter_margin: f32,
}

impl LayoutGeometry {
    /// Packs `specs` (in order) into `params.total_extent`.
    pub fn compute(specs: &[PanelSpec], params: &LayoutParams) -> Result<Self> {
        for spec in specs {
            spec.validate()?;
        }

        let lens: Vec<f32> = specs
            .iter()
            .map(|s| s.logical_len(params.intra_margin))
            .collect();
        let active = lens.iter().filter(|l| **l > 0.0).count();
        let whole_len = lens.iter().sum::<f32>()
            + active.saturating_sub(1) as f32 * params.inter_margin;

        let mut panels = Vec::with_capacity(specs.len());
        let mut cursor = 0.0;
        let mut placed = false;
        for (spec, len) in specs.iter().zip(lens) {
            if len <= 0.0 || whole_len <= 0.0 {
                panels.push(PanelGeometry::hidden(spec.kind, cursor));
                continue;
            }
            if placed {
                cursor += params.inter_margin;
            }
            let extent = params.total_extent * len / whole_len;
            let (data, hist) = split_panel(spec, cursor, extent, params);
            panels.push(PanelGeometry {
                kind: spec.kind,
                pos: cursor,
                extent,
                logical_len: len,
                data,
                hist,
            });
            cursor += extent;
            placed = true;
        }

        Ok(Self {
            panels,
            whole_len,
            inter_margin: params.inter_margin,
        })
    }

    /// Geometry for image mode, where the service reports pixel lengths directly.
    pub fn from_scaled(lengths: &[PanelLengths], params: &LayoutParams) -> Self {
        let mut panels = Vec::with_capacity(lengths.len());
        let mut cursor = 0.0;
        let mut placed = false;
        for l in lengths {
            let data = l.data.max(0.0);
            let hist = l.hist.max(0.0);
            if data + hist <= 0.0 {
                panels.push(PanelGeometry::hidden(l.panel, cursor));
                continue;
            }
            if placed {
                cursor += params.inter_margin;
            }
            let both = data > 0.0 && hist > 0.0;
            let extent = data + hist + if both { params.intra_margin } else { 0.0 };
            let data_span = (data > 0.0).then(|| Span::new(cursor, data));
            let hist_start = if both {
                cursor + data + params.intra_margin
            } else {
                cursor
            };
            panels.push(PanelGeometry {
                kind: l.panel,
                pos: cursor,
                extent,
                logical_len: extent,
                data: data_span,
                hist: (hist > 0.0).then(|| Span::new(hist_start, hist)),
            });
            cursor += extent;
            placed = true;
        }
        let whole_len = cursor;
        Self {
            panels,
            whole_len,
            inter_margin: params.inter_margin,
        }
    }

    pub fn panels(&self) -> &[PanelGeometry] {
        &self.panels
    }

    pub fn panel(&self, index: usize) -> Option<&PanelGeometry> {
        self.panels.get(index)
    }

    pub fn whole_len(&self) -> f32 {
        self.whole_len
    }

    pub fn visible_count(&self) -> usize {
        self.panels.iter().filter(|p| p.is_visible()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_count() == 0
    }

    /// Sum of visible extents plus the margins charged between them.
    pub fn packed_span(&self) -> f32 {
        let extents: f32 = self.panels.iter().map(|p| p.extent).sum();
        extents + self.visible_count().saturating_sub(1) as f32 * self.inter_margin
    }

    /// Index of the visible panel whose band contains `axis_pos`.
    pub fn panel_at(&self, axis_pos: f32) -> Option<usize> {
        self.panels
            .iter()
            .position(|p| p.is_visible() && p.band().contains(axis_pos))
    }
}

fn split_panel(
    spec: &PanelSpec,
    pos: f32,
    extent: f32,
    params: &LayoutParams,
) -> (Option<Span>, Option<Span>) {
    match (spec.shown_data_cols() > 0, spec.shown_hist_cols() > 0) {
        (true, true) => {
            let data_len = ((1.0 - params.hist_fraction) * extent - params.intra_margin).max(0.0);
            let hist_len = params.hist_fraction * extent;
            (
                Some(Span::new(pos, data_len)),
                Some(Span::new(pos + data_len + params.intra_margin, hist_len)),
            )
        }
        (true, false) => (Some(Span::new(pos, extent)), None),
        (false, true) => (None, Some(Span::new(pos, extent))),
        (false, false) => (None, None),
    }
}

/// Specs for data mode: a panel is shown when the settings ask for it and the
/// response carried its matrix. Absent matrices contribute nothing.
pub fn specs_for(settings: &Settings, matrices: &PanelMatrices) -> Vec<PanelSpec> {
    PanelKind::ALL
        .iter()
        .map(|&kind| {
            let data = matrices.data(kind).filter(|m| !m.is_empty());
            let hist = matrices.hist(kind).filter(|m| !m.is_empty());
            let show_data = settings.shows(kind) && data.is_some();
            let show_hist = settings.shows_hist(kind) && hist.is_some();
            PanelSpec {
                kind,
                show_data,
                show_hist,
                data_cols: data.map(Matrix::cols),
                hist_cols: hist.map(Matrix::cols),
            }
        })
        .collect()
}

/// Rebuilds the drawable panels from fresh geometry and (already normalized) matrices.
pub fn build_panels(
    geometry: &LayoutGeometry,
    matrices: &PanelMatrices,
    settings: &Settings,
    sample_extent: f32,
    intra_margin: f32,
) -> Vec<Panel> {
    geometry
        .panels()
        .iter()
        .filter(|g| g.is_visible())
        .map(|g| {
            let colors = settings.panel(g.kind);
            Panel {
                kind: g.kind,
                data: g.data.and(matrices.data(g.kind).cloned()),
                hist: g.hist.and(matrices.hist(g.kind).cloned()),
                color_data: colors.color_data,
                color_hist: colors.color_hist,
                dimensions: g.data.map_or(0.0, |s| s.len),
                hist_dimensions: g.hist.map_or(0.0, |s| s.len),
                samples: sample_extent,
                pos: g.pos,
                intra_margin,
                layout: settings.layout,
            }
        })
        .collect()
}

/// Splits a container size into (layout-axis extent, sample-axis extent).
pub fn axis_extents(layout: Layout, width: f32, height: f32) -> (f32, f32) {
    match layout {
        Layout::Vertical => (width, height),
        Layout::Horizontal => (height, width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_panel_fills_extent() {
        let geo = LayoutGeometry::compute(
            &[PanelSpec::data(PanelKind::Raw, 40)],
            &LayoutParams::new(400.0),
        )
        .unwrap();
        let p = &geo.panels()[0];
        assert_eq!(p.pos, 0.0);
        assert!((p.extent - 400.0).abs() < 1e-3);
        assert_eq!(p.data, Some(Span::new(0.0, p.extent)));
    }

    #[test]
    fn hidden_middle_panel_charges_no_margin() {
        let specs = [
            PanelSpec::data(PanelKind::Raw, 50),
            PanelSpec::hidden(PanelKind::Activations),
            PanelSpec::data(PanelKind::Attributions, 50),
        ];
        let geo = LayoutGeometry::compute(&specs, &LayoutParams::new(103.0)).unwrap();
        assert_eq!(geo.whole_len(), 103.0);
        assert_eq!(geo.panels()[1].extent, 0.0);
        assert_eq!(geo.panels()[1].pos, 50.0);
        assert!((geo.panels()[2].pos - 53.0).abs() < 1e-4);
    }

    #[test]
    fn panel_at_skips_margins() {
        let specs = [
            PanelSpec::data(PanelKind::Raw, 50),
            PanelSpec::data(PanelKind::Labels, 50),
        ];
        let geo = LayoutGeometry::compute(&specs, &LayoutParams::new(103.0)).unwrap();
        assert_eq!(geo.panel_at(10.0), Some(0));
        assert_eq!(geo.panel_at(51.0), None);
        assert_eq!(geo.panel_at(60.0), Some(1));
    }

    #[test]
    fn scaled_lengths_are_used_verbatim() {
        let lengths = [
            PanelLengths { panel: PanelKind::Raw, data: 100.0, hist: 10.0 },
            PanelLengths { panel: PanelKind::Labels, data: 20.0, hist: 0.0 },
        ];
        let geo = LayoutGeometry::from_scaled(&lengths, &LayoutParams::new(0.0));
        let raw = &geo.panels()[0];
        assert_eq!(raw.extent, 112.0);
        assert_eq!(raw.hist, Some(Span::new(102.0, 10.0)));
        assert_eq!(geo.panels()[1].pos, 115.0);
    }
}
