//! Hit-grid and per-panel brush gestures, in container-relative axis coordinates.

use std::collections::HashSet;

use crate::layout::{LayoutGeometry, Span};
use crate::utils::round2;

pub type PointerId = u64;

/// Pointer id used for the primary mouse.
pub const MOUSE_POINTER: PointerId = 0;

/// Invisible hit rectangle of one displayed sample row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRow {
    /// Display position (after ordering).
    pub row: usize,
    /// Dataset index of the sample shown in this row.
    pub index: usize,
    pub span: Span,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitGrid {
    rows: Vec<HitRow>,
    row_size: f32,
}

impl HitGrid {
    /// One row per entry of `indices`, sized like the rendered sample bands.
    pub fn new(indices: &[usize], sample_extent: f32) -> Self {
        if indices.is_empty() {
            return Self::default();
        }
        let row_size = round2(sample_extent / indices.len() as f32).max(1.0);
        let rows = indices
            .iter()
            .enumerate()
            .map(|(row, &index)| HitRow {
                row,
                index,
                span: Span::new(row_size * row as f32, row_size),
            })
            .collect();
        Self { rows, row_size }
    }

    pub fn row_size(&self) -> f32 {
        self.row_size
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[HitRow] {
        &self.rows
    }

    /// Display rows whose rectangle overlaps `samples`, in display order.
    pub fn hit_test(&self, samples: Span) -> Vec<usize> {
        if samples.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|r| r.span.overlaps(&samples))
            .map(|r| r.row)
            .collect()
    }

    pub fn row_at(&self, sample_pos: f32) -> Option<&HitRow> {
        if sample_pos < 0.0 || self.row_size <= 0.0 {
            return None;
        }
        self.rows.get((sample_pos / self.row_size) as usize)
    }

    pub fn indices_for(&self, rows: &[usize]) -> Vec<usize> {
        rows.iter()
            .filter_map(|&r| self.rows.get(r).map(|h| h.index))
            .collect()
    }

    /// Display rows currently showing any of `indices`, in display order.
    pub fn rows_of(&self, indices: &[usize]) -> Vec<usize> {
        let wanted: HashSet<usize> = indices.iter().copied().collect();
        self.rows
            .iter()
            .filter(|r| wanted.contains(&r.index))
            .map(|r| r.row)
            .collect()
    }

    /// Splits ascending display rows into runs of consecutive rows.
    pub fn row_runs(&self, rows: &[usize]) -> Vec<Vec<usize>> {
        let mut runs: Vec<Vec<usize>> = Vec::new();
        for &row in rows {
            match runs.last_mut() {
                Some(run) if run.last().is_some_and(|&last| last + 1 == row) => run.push(row),
                _ => runs.push(vec![row]),
            }
        }
        runs
    }

    /// Smallest span covering the given display rows.
    pub fn rows_span(&self, rows: &[usize]) -> Option<Span> {
        let first = self.rows.get(*rows.iter().min()?)?;
        let last = self.rows.get(*rows.iter().max()?)?;
        Some(Span::new(first.span.start, last.span.end() - first.span.start))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BrushState {
    #[default]
    Idle,
    Dragging {
        pointer: PointerId,
        anchor: (f32, f32),
        current: (f32, f32),
    },
}

/// A finished (or in-progress) brush, clamped to its panel band and to the sample extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushRegion {
    pub panel: usize,
    pub layout: Span,
    pub samples: Span,
}

impl BrushRegion {
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty() || self.samples.is_empty()
    }
}

/// One brush state machine per panel band.
///
/// A band holds at most one drag at a time; different bands may be brushed
/// concurrently by different pointers. Release is reported by
/// [`BrushController::pointer_up`] and the band returns to idle immediately.
#[derive(Clone, Debug, Default)]
pub struct BrushController {
    states: Vec<BrushState>,
}

impl BrushController {
    pub fn new(panel_count: usize) -> Self {
        Self {
            states: vec![BrushState::Idle; panel_count],
        }
    }

    /// Drops every in-flight gesture; called whenever geometry is rebuilt.
    pub fn reset(&mut self, panel_count: usize) {
        self.states.clear();
        self.states.resize(panel_count, BrushState::Idle);
    }

    pub fn state(&self, panel: usize) -> BrushState {
        self.states.get(panel).copied().unwrap_or_default()
    }

    pub fn is_dragging(&self) -> bool {
        self.states.iter().any(|s| matches!(s, BrushState::Dragging { .. }))
    }

    fn panel_of(&self, pointer: PointerId) -> Option<usize> {
        self.states.iter().position(
            |s| matches!(s, BrushState::Dragging { pointer: p, .. } if *p == pointer),
        )
    }

    /// Starts a drag in the band under `pos`. Returns the panel index on success.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        pos: (f32, f32),
        geometry: &LayoutGeometry,
    ) -> Option<usize> {
        if self.panel_of(pointer).is_some() {
            return None;
        }
        let panel = geometry.panel_at(pos.0)?;
        let state = self.states.get_mut(panel)?;
        if *state != BrushState::Idle {
            return None;
        }
        *state = BrushState::Dragging {
            pointer,
            anchor: pos,
            current: pos,
        };
        Some(panel)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, pos: (f32, f32)) -> Option<usize> {
        let panel = self.panel_of(pointer)?;
        if let BrushState::Dragging { current, .. } = &mut self.states[panel] {
            *current = pos;
        }
        Some(panel)
    }

    /// Ends the drag owned by `pointer`. Returns the region unless it is empty.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        pos: (f32, f32),
        geometry: &LayoutGeometry,
        sample_extent: f32,
    ) -> Option<BrushRegion> {
        let panel = self.panel_of(pointer)?;
        let anchor = match std::mem::take(&mut self.states[panel]) {
            BrushState::Dragging { anchor, .. } => anchor,
            BrushState::Idle => return None,
        };
        let region = constrain(panel, anchor, pos, geometry, sample_extent)?;
        (!region.is_empty()).then_some(region)
    }

    /// Region of an in-progress drag, for drawing the brush rectangle.
    pub fn current_region(
        &self,
        panel: usize,
        geometry: &LayoutGeometry,
        sample_extent: f32,
    ) -> Option<BrushRegion> {
        match self.state(panel) {
            BrushState::Dragging {
                anchor, current, ..
            } => constrain(panel, anchor, current, geometry, sample_extent),
            BrushState::Idle => None,
        }
    }

    pub fn cancel_all(&mut self) {
        self.states.fill(BrushState::Idle);
    }
}

fn constrain(
    panel: usize,
    anchor: (f32, f32),
    current: (f32, f32),
    geometry: &LayoutGeometry,
    sample_extent: f32,
) -> Option<BrushRegion> {
    let band = geometry.panel(panel)?.band();
    Some(BrushRegion {
        panel,
        layout: Span::from_edges(anchor.0, current.0).clamp_to(&band),
        samples: Span::from_edges(anchor.1, current.1).clamp_to(&Span::new(0.0, sample_extent)),
    })
}
