//! State of one dense-pixel viewer, kept free of gpui entities so every
//! transition can be driven and checked directly.
//!
//! All changes funnel through `&mut self` methods. Geometry, panels and the
//! hit-grid are rebuilt from (content, settings, container) on every change.

use std::sync::Arc;

use gpui::{Bounds, Pixels, Point};
use tracing::{debug, info, warn};

use crate::brush::{BrushController, BrushRegion, HitGrid, PointerId, MOUSE_POINTER};
use crate::config::{NormalizationConfig, VizConfig};
use crate::data_types::{
    DetailRequest, DetailResponse, Layout, MainRequest, MainResponse, Panel, PanelKind,
    PanelLengths, PanelMatrices, PanelRequestBody, Query, RenderedImage, ResponseMeta, Settings,
    SettingsPatch,
};
use crate::error::{Result, VizError};
use crate::layout::{axis_extents, build_panels, specs_for, LayoutGeometry};
use crate::rendering::{paint_panel, PixelCanvas};
use crate::sessions::{DetailContext, SessionKey, SessionRegistry};
use crate::slider::SampleSlider;
use crate::source::RequestSequencer;
use crate::transform::LayoutTransform;
use crate::utils::PixelsExt;
use crate::view_controller::{Highlight, Selection, ViewController};

/// Horizontal pixels subtracted from the container width in the requested resolution.
const RESOLUTION_INSET: f32 = 10.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Content {
    #[default]
    Empty,
    /// Server-rendered image; overlay bands come from the scaled lengths.
    Image(RenderedImage),
    /// Normalized matrices, painted client-side.
    Data(Arc<PanelMatrices>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MainTicket {
    pub seq: u64,
    pub request: MainRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetailTicket {
    pub key: SessionKey,
    pub context: DetailContext,
    pub request: DetailRequest,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MainOutcome {
    /// A newer request was issued; nothing changed.
    Stale,
    Failed(VizError),
    /// Applied. Detail fetches for sessions synthesized from interesting windows.
    Applied { details: Vec<DetailTicket> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub position: Point<Pixels>,
    pub text: String,
    pub row: usize,
}

pub struct DenseModel {
    config: VizConfig,
    settings: Settings,
    query: Query,
    sequencer: RequestSequencer,
    loading: bool,
    error: Option<VizError>,
    meta: Option<ResponseMeta>,
    content: Content,
    /// Layout and pixel size the latest main request asked the service to render at.
    requested: Option<(Layout, f32, f32)>,
    container: Bounds<Pixels>,
    geometry: LayoutGeometry,
    panels: Arc<Vec<Panel>>,
    grid: HitGrid,
    brushes: BrushController,
    sessions: SessionRegistry,
    synthesized: Vec<SessionKey>,
    hover: Option<Tooltip>,
}

impl DenseModel {
    pub fn new(config: VizConfig, settings: Settings) -> Self {
        Self {
            config,
            settings,
            query: Query::default(),
            sequencer: RequestSequencer::default(),
            loading: false,
            error: None,
            meta: None,
            content: Content::Empty,
            requested: None,
            container: Bounds::default(),
            geometry: LayoutGeometry::default(),
            panels: Arc::new(Vec::new()),
            grid: HitGrid::default(),
            brushes: BrushController::default(),
            sessions: SessionRegistry::new(),
            synthesized: Vec::new(),
            hover: None,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&VizError> {
        self.error.as_ref()
    }

    pub fn meta(&self) -> Option<&ResponseMeta> {
        self.meta.as_ref()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn container(&self) -> Bounds<Pixels> {
        self.container
    }

    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    pub fn panels(&self) -> Arc<Vec<Panel>> {
        self.panels.clone()
    }

    pub fn grid(&self) -> &HitGrid {
        &self.grid
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.hover.as_ref()
    }

    pub fn transform(&self) -> LayoutTransform {
        LayoutTransform::new(self.settings.layout, self.container)
    }

    /// Initial query: the first half-extent worth of samples.
    pub fn initial_query(&self) -> Query {
        let size = self.container.size;
        Query::range(
            0,
            SampleSlider::initial_window(
                self.settings.layout,
                size.width.as_f32(),
                size.height.as_f32(),
                self.config.parameter_height,
            ),
        )
    }

    pub fn slider(&self, width: f32) -> Option<SampleSlider> {
        let meta = self.meta.as_ref()?;
        let max = meta.max_samples?;
        Some(SampleSlider::new(max, width).with_summary(meta.summary_for_current_base()))
    }

    // --- Settings and queries ---

    /// Applies a settings patch. Returns whether the main data must be refetched.
    ///
    /// An invalid patch (unknown colormap) leaves the current settings untouched.
    pub fn change_settings(&mut self, patch: &SettingsPatch) -> Result<bool> {
        let next = self.settings.apply(patch).inspect_err(|e| {
            warn!(error = %e, "rejected settings patch");
        })?;
        let visibility_changed = PanelKind::ALL.iter().any(|&k| {
            next.shows(k) != self.settings.shows(k) || next.shows_hist(k) != self.settings.shows_hist(k)
        });
        let refetch = visibility_changed
            || next.dataset != self.settings.dataset
            || !matches!(self.content, Content::Data(_));
        self.settings = next;
        self.relayout();
        debug!(refetch, "settings changed");
        Ok(refetch)
    }

    fn main_request(&self) -> MainRequest {
        let size = self.container.size;
        let width = (size.width.as_f32() - RESOLUTION_INSET).max(0.0);
        let height = size.height.as_f32().max(0.0);
        MainRequest {
            dataset: self.settings.dataset.clone(),
            query: self.query.clone(),
            body: PanelRequestBody::new(&self.settings, width as u32, height as u32),
        }
    }

    /// Issues a new main request; any in-flight request becomes stale.
    pub fn begin_query(&mut self, query: Query) -> MainTicket {
        if self.loading {
            debug!(superseded = self.sequencer.latest(), "superseding in-flight main request");
        }
        let seq = self.sequencer.issue();
        self.loading = true;
        self.query = query;
        info!(seq, start = self.query.start, end = self.query.end, "main request issued");
        let request = self.main_request();
        self.requested = Some((
            request.body.layout,
            request.body.resolution_width as f32,
            request.body.resolution_height as f32,
        ));
        MainTicket { seq, request }
    }

    pub fn reload(&mut self) -> MainTicket {
        self.begin_query(self.query.clone())
    }

    pub fn select_samples(&mut self, start: usize, end: usize) -> MainTicket {
        let query = Query {
            start,
            end,
            ..self.query.clone()
        };
        self.begin_query(query)
    }

    pub fn select_ordering_base(&mut self, base: &str) -> Option<MainTicket> {
        let choice = self.meta.as_ref()?.orderings.select_base(base)?;
        let query = self.query.clone().with_ordering(choice);
        Some(self.begin_query(query))
    }

    pub fn select_ordering_method(&mut self, method: &str) -> Option<MainTicket> {
        let choice = self
            .meta
            .as_ref()?
            .orderings
            .select_method(&self.query.ordering_base, method)?;
        let query = self.query.clone().with_ordering(choice);
        Some(self.begin_query(query))
    }

    pub fn select_stage(&mut self, stage: &str) -> MainTicket {
        let query = Query {
            stage: stage.to_string(),
            ..self.query.clone()
        };
        self.begin_query(query)
    }

    pub fn select_attribution_method(&mut self, method: &str) -> MainTicket {
        let query = Query {
            attribution_method: method.to_string(),
            ..self.query.clone()
        };
        self.begin_query(query)
    }

    /// Applies a main response if it answers the latest request.
    pub fn complete_main(&mut self, seq: u64, outcome: Result<MainResponse>) -> MainOutcome {
        if !self.sequencer.is_current(seq) {
            debug!(seq, latest = self.sequencer.latest(), "discarding stale main response");
            return MainOutcome::Stale;
        }
        self.loading = false;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(seq, error = %e, "main request failed");
                self.fail(e.clone());
                return MainOutcome::Failed(e);
            }
        };

        let content = match (response.data, response.image) {
            (Some(data), _) => Content::Data(Arc::new(normalize_matrices(
                &data,
                &self.config.normalization,
            ))),
            (None, Some(image)) => match RenderedImage::from_base64(&image) {
                Ok(image) => Content::Image(image),
                Err(e) => {
                    warn!(seq, error = %e, "main image could not be decoded");
                    self.fail(e.clone());
                    return MainOutcome::Failed(e);
                }
            },
            (None, None) => Content::Empty,
        };

        self.error = None;
        self.sync_query(&response.meta);
        self.meta = Some(response.meta);
        self.content = content;
        self.relayout();
        if let Some(e) = &self.error {
            return MainOutcome::Failed(e.clone());
        }

        let details = self.ingest_interesting();
        info!(
            seq,
            panels = self.geometry.visible_count(),
            samples = self.grid.len(),
            synthesized = details.len(),
            "main response applied"
        );
        MainOutcome::Applied { details }
    }

    fn fail(&mut self, error: VizError) {
        self.error = Some(error);
        self.content = Content::Empty;
        self.geometry = LayoutGeometry::default();
        self.panels = Arc::new(Vec::new());
        self.grid = HitGrid::default();
        self.brushes.reset(0);
        self.hover = None;
    }

    fn sync_query(&mut self, meta: &ResponseMeta) {
        let pairs = [
            (&mut self.query.stage, &meta.cur_stage),
            (&mut self.query.ordering_base, &meta.cur_ordering_base),
            (&mut self.query.ordering_method, &meta.cur_ordering_method),
            (&mut self.query.attribution_method, &meta.cur_attribution_method),
        ];
        for (slot, current) in pairs {
            if !current.is_empty() {
                slot.clone_from(current);
            }
        }
    }

    /// Replaces the sessions synthesized by the previous response with one per surviving window.
    fn ingest_interesting(&mut self) -> Vec<DetailTicket> {
        for key in std::mem::take(&mut self.synthesized) {
            self.sessions = self.sessions.close(key);
        }
        let Some(meta) = &self.meta else {
            return Vec::new();
        };
        let selections = ViewController::interesting_selections(
            &meta.interestingness,
            &self.grid,
            self.time_len(),
            self.config.interesting_radius,
            self.config.min_window_len,
        );
        let dropped = meta.interestingness.len() - selections.len();
        if dropped > 0 {
            debug!(dropped, "interesting windows below threshold");
        }
        selections
            .into_iter()
            .map(|s| {
                let ticket = self.open_selection(s);
                self.synthesized.push(ticket.key);
                ticket
            })
            .collect()
    }

    /// Number of time points in the first shown panel.
    fn time_len(&self) -> usize {
        match &self.content {
            Content::Data(m) => PanelKind::ALL
                .iter()
                .find_map(|&k| m.data(k))
                .map_or(0, |m| m.cols()),
            Content::Image(_) => self
                .meta
                .as_ref()
                .and_then(|m| m.data_lengths.iter().find(|l| l.data > 0.0))
                .map_or(0, |l| l.data as usize),
            Content::Empty => 0,
        }
    }

    // --- Geometry ---

    /// Geometry readback: the rendered region's screen bounds. Returns whether anything changed.
    pub fn set_container(&mut self, bounds: Bounds<Pixels>) -> bool {
        if bounds == self.container {
            return false;
        }
        let resized = bounds.size != self.container.size;
        self.container = bounds;
        if resized {
            self.relayout();
        }
        true
    }

    fn relayout(&mut self) {
        let size = self.container.size;
        let (layout_extent, sample_extent) =
            axis_extents(self.settings.layout, size.width.as_f32(), size.height.as_f32());
        let params = self.config.layout_params(layout_extent);

        let (geometry, panels, samples) = match &self.content {
            Content::Empty => (LayoutGeometry::default(), Vec::new(), 0),
            Content::Image(_) => {
                let meta = self.meta.as_ref();
                let lengths = meta.map_or(&[][..], |m| m.data_lengths_scaled.as_slice());
                let samples = meta.map_or(0, |m| m.ordering_idc.len());
                // The image is stretched over the container; stretch its bands with it.
                let stretch = self.image_stretch(layout_extent);
                let lengths: Vec<PanelLengths> = lengths
                    .iter()
                    .map(|l| PanelLengths {
                        panel: l.panel,
                        data: l.data * stretch,
                        hist: l.hist * stretch,
                    })
                    .collect();
                let params = params.with_margins(
                    params.inter_margin * stretch,
                    params.intra_margin * stretch,
                );
                (LayoutGeometry::from_scaled(&lengths, &params), Vec::new(), samples)
            }
            Content::Data(matrices) => {
                let specs = specs_for(&self.settings, matrices);
                match LayoutGeometry::compute(&specs, &params) {
                    Ok(geometry) => {
                        let panels = build_panels(
                            &geometry,
                            matrices,
                            &self.settings,
                            sample_extent,
                            params.intra_margin,
                        );
                        (geometry, panels, matrices.sample_count())
                    }
                    Err(e) => {
                        warn!(error = %e, "panel layout rejected");
                        self.error = Some(e);
                        (LayoutGeometry::default(), Vec::new(), 0)
                    }
                }
            }
        };

        let indices: Vec<usize> = match &self.meta {
            Some(meta) if meta.ordering_idc.len() == samples => meta.ordering_idc.clone(),
            _ => (self.query.start..self.query.start + samples).collect(),
        };
        self.grid = HitGrid::new(&indices, sample_extent);
        self.brushes.reset(geometry.panels().len());
        self.geometry = geometry;
        self.panels = Arc::new(panels);
        self.hover = None;
        debug!(
            layout_extent,
            sample_extent,
            panels = self.geometry.visible_count(),
            "geometry rebuilt"
        );
    }

    /// Ratio between the container's layout extent and the rendered image's.
    fn image_stretch(&self, layout_extent: f32) -> f32 {
        let Some((layout, width, height)) = self.requested else {
            return 1.0;
        };
        let rendered = match layout {
            Layout::Vertical => width,
            Layout::Horizontal => height,
        };
        if rendered > 0.0 && layout == self.settings.layout {
            layout_extent / rendered
        } else {
            1.0
        }
    }

    fn sample_extent(&self) -> f32 {
        self.transform().sample_extent()
    }

    // --- Pointer interaction ---

    pub fn pointer_down(&mut self, pointer: PointerId, position: Point<Pixels>) -> bool {
        if self.error.is_some() || !self.container.contains(&position) {
            return false;
        }
        let pos = self.transform().screen_to_axes(position);
        self.brushes
            .pointer_down(pointer, pos, &self.geometry)
            .inspect(|panel| debug!(panel, pointer, "brush started"))
            .is_some()
    }

    /// Returns whether the overlay needs repainting.
    pub fn pointer_move(&mut self, pointer: PointerId, position: Point<Pixels>) -> bool {
        let pos = self.transform().screen_to_axes(position);
        let dragged = self.brushes.pointer_move(pointer, pos).is_some();
        let hovered = pointer == MOUSE_POINTER && self.update_hover(position);
        dragged || hovered
    }

    /// Ends a brush; a non-empty selection opens a detail session.
    pub fn pointer_up(&mut self, pointer: PointerId, position: Point<Pixels>) -> Option<DetailTicket> {
        let pos = self.transform().screen_to_axes(position);
        let sample_extent = self.sample_extent();
        let region = self
            .brushes
            .pointer_up(pointer, pos, &self.geometry, sample_extent)?;
        let selection = ViewController::selection_from_brush(&region, &self.geometry, &self.grid)?;
        info!(
            panel = region.panel,
            samples = selection.indices.len(),
            start = selection.window.start,
            end = selection.window.end,
            "brush released"
        );
        Some(self.open_selection(selection))
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.hover.take().is_some()
    }

    fn update_hover(&mut self, position: Point<Pixels>) -> bool {
        let next = if self.container.contains(&position) {
            let (_, sample_pos) = self.transform().screen_to_axes(position);
            self.grid.row_at(sample_pos).map(|row| Tooltip {
                position: ViewController::tooltip_position(
                    position,
                    self.container,
                    self.config.tooltip_offset,
                ),
                text: ViewController::tooltip_text(row.index),
                row: row.row,
            })
        } else {
            None
        };
        let changed = next != self.hover;
        self.hover = next;
        changed
    }

    /// In-progress brush rectangles, one per dragging band.
    pub fn active_brushes(&self) -> Vec<BrushRegion> {
        let sample_extent = self.sample_extent();
        (0..self.geometry.panels().len())
            .filter_map(|i| self.brushes.current_region(i, &self.geometry, sample_extent))
            .collect()
    }

    pub fn is_brushing(&self) -> bool {
        self.brushes.is_dragging()
    }

    // --- Sessions ---

    fn detail_context(&self) -> DetailContext {
        let stage = self
            .meta
            .as_ref()
            .map(|m| m.cur_stage.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.query.stage.clone());
        DetailContext {
            dataset: self.settings.dataset.clone(),
            stage,
        }
    }

    pub fn open_selection(&mut self, selection: Selection) -> DetailTicket {
        let context = self.detail_context();
        let request = DetailRequest {
            indices: selection.indices.clone(),
            start: selection.window.start,
            end: selection.window.end,
        };
        let (sessions, key) =
            self.sessions
                .open(selection.indices, selection.window, context.clone());
        self.sessions = sessions;
        info!(key, samples = request.indices.len(), "detail session opened");
        DetailTicket {
            key,
            context,
            request,
        }
    }

    pub fn close_session(&mut self, key: SessionKey) {
        if self.sessions.contains(key) {
            info!(key, "detail session removed");
        }
        self.sessions = self.sessions.close(key);
        self.synthesized.retain(|k| *k != key);
    }

    pub fn toggle_session(&mut self, key: SessionKey) {
        self.sessions = self.sessions.toggle_open(key);
    }

    /// Closes every session and drops in-flight brushes without fetching anything.
    pub fn clear_selections(&mut self) {
        info!(sessions = self.sessions.len(), "clearing selections");
        self.sessions = self.sessions.clear_all();
        self.synthesized.clear();
        self.brushes.cancel_all();
    }

    pub fn complete_detail(&mut self, key: SessionKey, outcome: Result<DetailResponse>) {
        if !self.sessions.contains(key) {
            debug!(key, "detail result for a removed session dropped");
            return;
        }
        let outcome = outcome.and_then(|r| RenderedImage::from_base64(&r.image));
        match &outcome {
            Ok(image) => debug!(key, bytes = image.len(), "detail image ready"),
            Err(e) => warn!(key, error = %e, "detail request failed"),
        }
        self.sessions = self.sessions.complete(key, outcome);
    }

    /// Highlights of every open session, reprojected onto the current geometry.
    ///
    /// Rows are looked up from each session's indices in the current hit-grid,
    /// so a reordered or shifted response moves the highlight with its samples.
    pub fn highlights(&self) -> Vec<Highlight> {
        self.sessions
            .iter()
            .filter(|s| s.open)
            .flat_map(|s| {
                ViewController::highlights(s.key, s.window, &s.indices, &self.geometry, &self.grid)
            })
            .collect()
    }

    // --- Painting ---

    /// Paints every data-mode panel at the container origin. Nothing is drawn while an error is shown.
    pub fn paint(&self, canvas: &mut impl PixelCanvas) -> usize {
        if self.error.is_some() {
            return 0;
        }
        self.panels
            .iter()
            .map(|p| paint_panel(canvas, p, self.container.origin))
            .sum()
    }
}

fn normalize_matrices(m: &PanelMatrices, cfg: &NormalizationConfig) -> PanelMatrices {
    let data = |x: &Option<crate::data_types::Matrix>| x.as_ref().map(|x| cfg.data.apply(x));
    let hist = |x: &Option<crate::data_types::Matrix>| x.as_ref().map(|x| cfg.hist.apply(x));
    PanelMatrices {
        raw: data(&m.raw),
        raw_histogram: hist(&m.raw_histogram),
        activations: data(&m.activations),
        activations_histogram: hist(&m.activations_histogram),
        attributions: data(&m.attributions),
        attributions_histogram: hist(&m.attributions_histogram),
        labels_pred: m.labels_pred.as_ref().map(|x| cfg.labels.apply(x)),
    }
}
