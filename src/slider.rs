use crate::data_types::Layout;
use crate::scales::ChartScale;

const MARGIN_LEFT: f32 = 10.0;
const MARGIN_RIGHT: f32 = 10.0;
const MARGIN_TOP: f32 = 2.5;
const MARGIN_BOTTOM: f32 = 2.5;
/// Room kept under the summary curve for the axis.
const AXIS_HEIGHT: f32 = 20.0;

/// Sample-range slider: maps a brushed interval on its track back to a sample range.
#[derive(Clone)]
pub struct SampleSlider {
    max_samples: usize,
    scale: ChartScale,
    summary: Vec<f64>,
}

impl SampleSlider {
    pub fn new(max_samples: usize, width: f32) -> Self {
        Self {
            max_samples,
            scale: ChartScale::new_linear(
                (0.0, max_samples as f64),
                (MARGIN_LEFT, (width - MARGIN_RIGHT).max(MARGIN_LEFT + 1.0)),
            ),
            summary: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: Option<&[f64]>) -> Self {
        self.summary = summary.map(<[f64]>::to_vec).unwrap_or_default();
        self
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Rounded, ordered sample range for a brushed pixel interval.
    pub fn range_for(&self, a: f32, b: f32) -> (usize, usize) {
        let to_sample = |p: f32| {
            self.scale
                .invert(p)
                .round()
                .clamp(0.0, self.max_samples as f64) as usize
        };
        let (s, e) = (to_sample(a), to_sample(b));
        (s.min(e), s.max(e))
    }

    pub fn pixels_for(&self, start: usize, end: usize) -> (f32, f32) {
        (self.scale.map(start as f64), self.scale.map(end as f64))
    }

    /// Initial number of samples requested: half the sample-axis extent.
    pub fn initial_window(
        layout: Layout,
        container_width: f32,
        container_height: f32,
        parameter_height: f32,
    ) -> usize {
        let extent = match layout {
            Layout::Horizontal => container_width,
            Layout::Vertical => container_height - parameter_height,
        };
        (extent / 2.0).max(0.0) as usize
    }

    /// Track-space points of the current ordering's summary curve.
    pub fn summary_points(&self, height: f32) -> Vec<(f32, f32)> {
        if self.summary.is_empty() {
            return Vec::new();
        }
        let (lo, hi) = self
            .summary
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let y = ChartScale::new_linear((lo, hi), (MARGIN_TOP, height - MARGIN_BOTTOM - AXIS_HEIGHT));
        self.summary
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.scale.map(i as f64), y.map(v)))
            .collect()
    }
}
