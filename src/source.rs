//! Data sources for the main panel query and the per-session detail query.

use std::collections::BTreeMap;
use std::time::Duration;

use eyre::{Result, WrapErr};
use parking_lot::Mutex;
use reqwest::blocking::Client;

use crate::config::VizConfig;
use crate::data_types::{
    DetailRequest, DetailResponse, InterestingWindow, MainRequest, MainResponse, Matrix,
    Orderings, PanelKind, PanelLengths, PanelMatrices, ResponseMeta,
};
use crate::sessions::DetailContext;

/// Trait for the service that renders or returns panel data.
///
/// Calls are blocking; the view runs them on the background executor.
pub trait DenseDataSource: Send + Sync {
    fn fetch_main(&self, request: &MainRequest) -> Result<MainResponse>;

    fn fetch_detail(&self, context: &DetailContext, request: &DetailRequest)
        -> Result<DetailResponse>;
}

/// Monotonic tags for main requests. Only the latest tag is current.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Main query endpoint; the dataset is appended as the last path segment.
pub const MAIN_PATH: &str = "/data-or-image";
/// Detail query endpoint, posted `{indices, start, end}`.
pub const DETAIL_PATH: &str = "/detail-for-indices";

pub struct HttpDataSource {
    client: Client,
    base_url: String,
    main_path: String,
    detail_path: String,
}

impl HttpDataSource {
    pub fn new(config: &VizConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .wrap_err("building HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            main_path: MAIN_PATH.to_string(),
            detail_path: DETAIL_PATH.to_string(),
        })
    }

    pub fn with_paths(mut self, main_path: &str, detail_path: &str) -> Self {
        self.main_path = main_path.to_string();
        self.detail_path = detail_path.to_string();
        self
    }

    fn url(&self, path: &str, dataset: &str) -> String {
        format!("{}{}/{}", self.base_url, path, dataset)
    }
}

impl DenseDataSource for HttpDataSource {
    fn fetch_main(&self, request: &MainRequest) -> Result<MainResponse> {
        let url = self.url(&self.main_path, &request.dataset);
        self.client
            .post(&url)
            .query(&request.query)
            .json(&request.body)
            .send()
            .and_then(|r| r.error_for_status())
            .wrap_err_with(|| format!("POST {url}"))?
            .json::<MainResponse>()
            .wrap_err("decoding main response")
    }

    fn fetch_detail(
        &self,
        context: &DetailContext,
        request: &DetailRequest,
    ) -> Result<DetailResponse> {
        let url = self.url(&self.detail_path, &context.dataset);
        let mut builder = self.client.post(&url).json(request);
        if !context.stage.is_empty() {
            builder = builder.query(&[("stage", context.stage.as_str())]);
        }
        builder
            .send()
            .and_then(|r| r.error_for_status())
            .wrap_err_with(|| format!("POST {url}"))?
            .json::<DetailResponse>()
            .wrap_err("decoding detail response")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoggedRequest {
    Main(MainRequest),
    Detail(DetailContext, DetailRequest),
}

type MainFn = dyn Fn(&MainRequest) -> Result<MainResponse> + Send + Sync;
type DetailFn = dyn Fn(&DetailContext, &DetailRequest) -> Result<DetailResponse> + Send + Sync;

/// In-process source that answers from closures and records every request.
pub struct MemoryDataSource {
    main: Box<MainFn>,
    detail: Box<DetailFn>,
    log: Mutex<Vec<LoggedRequest>>,
}

/// Smallest payload that still sniffs as a PNG.
pub const PLACEHOLDER_IMAGE: &str = "iVBORw0KGgo=";

impl MemoryDataSource {
    pub fn new(main: impl Fn(&MainRequest) -> Result<MainResponse> + Send + Sync + 'static) -> Self {
        Self {
            main: Box::new(main),
            detail: Box::new(|_: &DetailContext, _: &DetailRequest| {
                Ok(DetailResponse {
                    image: PLACEHOLDER_IMAGE.to_string(),
                })
            }),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with a clone of `response`.
    pub fn fixed(response: MainResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    /// Deterministic synthetic dataset sized by the requested sample range.
    pub fn synthetic() -> Self {
        Self::new(|req| Ok(synthetic_response(req)))
    }

    pub fn with_detail(
        mut self,
        detail: impl Fn(&DetailContext, &DetailRequest) -> Result<DetailResponse>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.detail = Box::new(detail);
        self
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.log.lock().clone()
    }

    pub fn main_requests(&self) -> Vec<MainRequest> {
        self.log
            .lock()
            .iter()
            .filter_map(|r| match r {
                LoggedRequest::Main(m) => Some(m.clone()),
                LoggedRequest::Detail(..) => None,
            })
            .collect()
    }

    pub fn detail_count(&self) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|r| matches!(r, LoggedRequest::Detail(..)))
            .count()
    }
}

impl DenseDataSource for MemoryDataSource {
    fn fetch_main(&self, request: &MainRequest) -> Result<MainResponse> {
        self.log.lock().push(LoggedRequest::Main(request.clone()));
        (self.main)(request)
    }

    fn fetch_detail(
        &self,
        context: &DetailContext,
        request: &DetailRequest,
    ) -> Result<DetailResponse> {
        self.log
            .lock()
            .push(LoggedRequest::Detail(context.clone(), request.clone()));
        (self.detail)(context, request)
    }
}

const SYNTHETIC_MAX_SAMPLES: usize = 1000;

fn wave(rows: usize, cols: usize, freq: f64, phase: f64) -> Matrix {
    let values = (0..rows * cols)
        .map(|k| {
            let (i, j) = ((k / cols) as f64, (k % cols) as f64);
            (freq * j + phase * i).sin() + 0.25 * (0.5 * freq * j).cos()
        })
        .collect();
    Matrix::from_flat(rows, cols, values).unwrap_or_default()
}

fn synthetic_response(req: &MainRequest) -> MainResponse {
    let start = req.query.start.min(SYNTHETIC_MAX_SAMPLES);
    let end = req.query.end.clamp(start, SYNTHETIC_MAX_SAMPLES);
    let rows = end - start;
    let body = &req.body;
    let hist = |on: bool, phase: f64| on.then(|| wave(rows, 8, 0.9, phase));

    let data = PanelMatrices {
        raw: body.raw.then(|| wave(rows, 96, 0.12, 0.05)),
        raw_histogram: hist(body.raw && body.raw_data_histogram, 0.3),
        activations: body.activations.then(|| wave(rows, 48, 0.31, 0.11)),
        activations_histogram: hist(body.activations && body.activations_histogram, 0.7),
        attributions: body.attributions.then(|| wave(rows, 96, 0.07, 0.21)),
        attributions_histogram: hist(body.attributions && body.attributions_histogram, 1.1),
        labels_pred: body.labels_pred.then(|| wave(rows, 4, 1.3, 0.4)),
    };

    let lengths = PanelKind::ALL
        .iter()
        .map(|&kind| PanelLengths {
            panel: kind,
            data: data.data(kind).map_or(0.0, |m| m.cols() as f32),
            hist: data.hist(kind).map_or(0.0, |m| m.cols() as f32),
        })
        .collect();

    let mut orderings = BTreeMap::new();
    orderings.insert("raw".to_string(), vec!["euclidean".to_string(), "dtw".to_string()]);
    orderings.insert(
        "activations".to_string(),
        vec!["euclidean".to_string(), "cosine".to_string()],
    );
    let base = if req.query.ordering_base.is_empty() {
        "raw".to_string()
    } else {
        req.query.ordering_base.clone()
    };
    let mut summary_data = BTreeMap::new();
    summary_data.insert(
        base.clone(),
        (0..SYNTHETIC_MAX_SAMPLES).map(|i| (i as f64 * 0.02).sin()).collect(),
    );

    let interestingness = (0..rows / 100)
        .map(|k| InterestingWindow {
            samples: (k * 100, k * 100 + 40),
            center: 48.0,
        })
        .collect();

    MainResponse {
        image: None,
        data: Some(data),
        meta: ResponseMeta {
            orderings: Orderings(orderings),
            max_samples: Some(SYNTHETIC_MAX_SAMPLES),
            cur_ordering_method: req.query.ordering_method.clone(),
            cur_ordering_base: base,
            cur_stage: if req.query.stage.is_empty() {
                "train".to_string()
            } else {
                req.query.stage.clone()
            },
            cur_attribution_method: req.query.attribution_method.clone(),
            summary_data,
            stages: vec!["train".to_string(), "test".to_string()],
            attribution_methods: vec!["IntegratedGradients".to_string(), "Saliency".to_string()],
            ordering_idc: (start..end).collect(),
            data_lengths: lengths,
            data_lengths_scaled: Vec::new(),
            interestingness,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{PanelRequestBody, Query, Settings};

    #[test]
    fn sequencer_only_trusts_latest() {
        let mut seq = RequestSequencer::default();
        let a = seq.issue();
        let b = seq.issue();
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
    }

    #[test]
    fn http_urls_carry_the_dataset() {
        let config = VizConfig {
            base_url: "http://viz.local:5000/".to_string(),
            ..VizConfig::default()
        };
        let source = HttpDataSource::new(&config).unwrap();
        assert_eq!(
            source.url(&source.detail_path, "ecg"),
            "http://viz.local:5000/detail-for-indices/ecg"
        );
        assert_eq!(
            source.url(&source.main_path, "ecg"),
            "http://viz.local:5000/data-or-image/ecg"
        );
    }

    #[test]
    fn memory_source_logs_requests() {
        let source = MemoryDataSource::synthetic();
        let request = MainRequest {
            dataset: "demo".into(),
            query: Query::range(0, 120),
            body: PanelRequestBody::new(&Settings::default(), 800, 600),
        };
        let resp = source.fetch_main(&request).unwrap();
        assert_eq!(resp.data.unwrap().sample_count(), 120);
        assert_eq!(resp.meta.interestingness.len(), 1);
        assert_eq!(source.main_requests(), vec![request]);
    }
}
