//! Request and response shapes exchanged with the image/data service.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::matrix::Matrix;
use super::panel::PanelKind;
use super::query::{Orderings, Query};
use super::settings::{Layout, Settings};
use crate::error::{Result, VizError};

/// JSON body of the main request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PanelRequestBody {
    pub layout: Layout,
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub raw: bool,
    pub raw_data_histogram: bool,
    pub activations: bool,
    pub activations_histogram: bool,
    pub attributions: bool,
    pub attributions_histogram: bool,
    pub labels_pred: bool,
    pub raw_time_series_colormap: String,
    pub raw_time_series_histogram_colormap: String,
    pub activations_colormap: String,
    pub activations_histogram_colormap: String,
    pub attributions_colormap: String,
    pub attributions_histogram_colormap: String,
    pub predictions_colormap: String,
}

impl PanelRequestBody {
    pub fn new(settings: &Settings, resolution_width: u32, resolution_height: u32) -> Self {
        let color = |kind| settings.panel(kind).color_data.name().to_string();
        let hist_color = |kind| settings.panel(kind).color_hist.name().to_string();
        Self {
            layout: settings.layout,
            resolution_width,
            resolution_height,
            raw: settings.shows(PanelKind::Raw),
            raw_data_histogram: settings.shows_hist(PanelKind::Raw),
            activations: settings.shows(PanelKind::Activations),
            activations_histogram: settings.shows_hist(PanelKind::Activations),
            attributions: settings.shows(PanelKind::Attributions),
            attributions_histogram: settings.shows_hist(PanelKind::Attributions),
            labels_pred: settings.shows(PanelKind::Labels),
            raw_time_series_colormap: color(PanelKind::Raw),
            raw_time_series_histogram_colormap: hist_color(PanelKind::Raw),
            activations_colormap: color(PanelKind::Activations),
            activations_histogram_colormap: hist_color(PanelKind::Activations),
            attributions_colormap: color(PanelKind::Attributions),
            attributions_histogram_colormap: hist_color(PanelKind::Attributions),
            predictions_colormap: color(PanelKind::Labels),
        }
    }
}

/// Everything needed to issue one main request.
#[derive(Clone, Debug, PartialEq)]
pub struct MainRequest {
    pub dataset: String,
    pub query: Query,
    pub body: PanelRequestBody,
}

/// Raw matrices returned in data mode. Missing entries mean "not requested".
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelMatrices {
    pub raw: Option<Matrix>,
    pub raw_histogram: Option<Matrix>,
    pub activations: Option<Matrix>,
    pub activations_histogram: Option<Matrix>,
    pub attributions: Option<Matrix>,
    pub attributions_histogram: Option<Matrix>,
    pub labels_pred: Option<Matrix>,
}

impl PanelMatrices {
    pub fn data(&self, kind: PanelKind) -> Option<&Matrix> {
        match kind {
            PanelKind::Raw => self.raw.as_ref(),
            PanelKind::Activations => self.activations.as_ref(),
            PanelKind::Attributions => self.attributions.as_ref(),
            PanelKind::Labels => self.labels_pred.as_ref(),
        }
    }

    pub fn hist(&self, kind: PanelKind) -> Option<&Matrix> {
        match kind {
            PanelKind::Raw => self.raw_histogram.as_ref(),
            PanelKind::Activations => self.activations_histogram.as_ref(),
            PanelKind::Attributions => self.attributions_histogram.as_ref(),
            PanelKind::Labels => None,
        }
    }

    /// Number of samples (rows) in the first present matrix.
    pub fn sample_count(&self) -> usize {
        PanelKind::ALL
            .iter()
            .find_map(|k| self.data(*k))
            .map_or(0, Matrix::rows)
    }
}

/// Per-panel lengths along the time axis; counts in `data_lengths`, pixels in `data_lengths_scaled`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelLengths {
    pub panel: PanelKind,
    pub data: f32,
    #[serde(default)]
    pub hist: f32,
}

/// A window flagged by the service as worth inspecting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterestingWindow {
    /// Display rows `[start, end)`.
    pub samples: (usize, usize),
    /// Centre time point.
    pub center: f64,
}

impl InterestingWindow {
    pub fn len(&self) -> usize {
        self.samples.1.saturating_sub(self.samples.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResponseMeta {
    pub orderings: Orderings,
    pub max_samples: Option<usize>,
    pub cur_ordering_base: String,
    pub cur_ordering_method: String,
    pub cur_stage: String,
    pub cur_attribution_method: String,
    pub summary_data: BTreeMap<String, Vec<f64>>,
    pub stages: Vec<String>,
    pub attribution_methods: Vec<String>,
    /// Dataset index of every displayed row, in display order.
    pub ordering_idc: Vec<usize>,
    pub data_lengths: Vec<PanelLengths>,
    pub data_lengths_scaled: Vec<PanelLengths>,
    pub interestingness: Vec<InterestingWindow>,
}

impl ResponseMeta {
    pub fn summary_for_current_base(&self) -> Option<&[f64]> {
        self.summary_data
            .get(&self.cur_ordering_base)
            .map(Vec::as_slice)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MainResponse {
    /// Base64 encoded image (image mode).
    #[serde(default)]
    pub image: Option<String>,
    /// Raw matrices (data mode).
    #[serde(default)]
    pub data: Option<PanelMatrices>,
    #[serde(default)]
    pub meta: ResponseMeta,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailRequest {
    pub indices: Vec<usize>,
    pub start: f64,
    pub end: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DetailResponse {
    pub image: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Unknown,
}

/// Opaque encoded image bytes returned by the service.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedImage {
    pub kind: ImageKind,
    pub bytes: Arc<[u8]>,
}

impl RenderedImage {
    pub fn from_base64(encoded: &str) -> Result<Self> {
        // Some services send a full data URL.
        let payload = encoded
            .split_once(";base64,")
            .map_or(encoded, |(_, data)| data)
            .trim();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| VizError::Decode {
                message: e.to_string(),
            })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let kind = if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            ImageKind::Png
        } else if bytes.starts_with(&[0xff, 0xd8]) {
            ImageKind::Jpeg
        } else {
            ImageKind::Unknown
        };
        Self {
            kind,
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
