use serde::{Deserialize, Serialize};

use super::matrix::Matrix;
use super::settings::Layout;
use crate::colormap::Colormap;
use crate::error::{Result, VizError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Raw,
    Activations,
    Attributions,
    Labels,
}

impl PanelKind {
    /// Panel order along the layout axis.
    pub const ALL: [PanelKind; 4] = [
        Self::Raw,
        Self::Activations,
        Self::Attributions,
        Self::Labels,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Raw => 0,
            Self::Activations => 1,
            Self::Attributions => 2,
            Self::Labels => 3,
        }
    }

    /// The label strip has no histogram companion.
    pub fn supports_hist(self) -> bool {
        !matches!(self, Self::Labels)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Activations => "activations",
            Self::Attributions => "attributions",
            Self::Labels => "labels",
        }
    }
}

/// Input to the layout engine: which sub-regions are shown and their column counts.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelSpec {
    pub kind: PanelKind,
    pub show_data: bool,
    pub show_hist: bool,
    pub data_cols: Option<usize>,
    pub hist_cols: Option<usize>,
}

impl PanelSpec {
    pub fn data(kind: PanelKind, cols: usize) -> Self {
        Self {
            kind,
            show_data: true,
            show_hist: false,
            data_cols: Some(cols),
            hist_cols: None,
        }
    }

    pub fn with_hist(mut self, cols: usize) -> Self {
        self.show_hist = true;
        self.hist_cols = Some(cols);
        self
    }

    pub fn hidden(kind: PanelKind) -> Self {
        Self {
            kind,
            show_data: false,
            show_hist: false,
            data_cols: None,
            hist_cols: None,
        }
    }

    /// A shown sub-region must carry its column count.
    pub fn validate(&self) -> Result<()> {
        if self.show_data && self.data_cols.is_none() {
            return Err(VizError::MissingColumnCount {
                panel: self.kind.label().to_string(),
            });
        }
        if self.show_hist && self.hist_cols.is_none() {
            return Err(VizError::MissingColumnCount {
                panel: format!("{} histogram", self.kind.label()),
            });
        }
        Ok(())
    }

    pub fn shown_data_cols(&self) -> usize {
        if self.show_data {
            self.data_cols.unwrap_or(0)
        } else {
            0
        }
    }

    pub fn shown_hist_cols(&self) -> usize {
        if self.show_hist {
            self.hist_cols.unwrap_or(0)
        } else {
            0
        }
    }

    /// Data + histogram columns, plus the intra margin when both are shown.
    pub fn logical_len(&self, intra_margin: f32) -> f32 {
        let data = self.shown_data_cols();
        let hist = self.shown_hist_cols();
        let margin = if data > 0 && hist > 0 { intra_margin } else { 0.0 };
        data as f32 + hist as f32 + margin
    }
}

/// A drawable panel, rebuilt on every data or settings change.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub kind: PanelKind,
    pub data: Option<Matrix>,
    pub hist: Option<Matrix>,
    pub color_data: Colormap,
    pub color_hist: Colormap,
    /// Pixels along the time axis for the data sub-region.
    pub dimensions: f32,
    /// Pixels along the time axis for the histogram sub-region.
    pub hist_dimensions: f32,
    /// Pixels along the sample axis.
    pub samples: f32,
    /// Offset along the layout axis.
    pub pos: f32,
    pub intra_margin: f32,
    pub layout: Layout,
}

impl Panel {
    /// Offset of the histogram sub-region along the layout axis.
    pub fn hist_pos(&self) -> f32 {
        self.pos + self.dimensions + self.intra_margin
    }

    pub fn is_drawable(&self) -> bool {
        self.data.as_ref().is_some_and(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_len_counts_intra_margin_only_with_both() {
        let spec = PanelSpec::data(PanelKind::Raw, 10).with_hist(10);
        assert_eq!(spec.logical_len(2.0), 22.0);
        assert_eq!(PanelSpec::data(PanelKind::Raw, 10).logical_len(2.0), 10.0);
        assert_eq!(PanelSpec::hidden(PanelKind::Raw).logical_len(2.0), 0.0);
    }

    #[test]
    fn shown_panel_without_columns_is_malformed() {
        let mut spec = PanelSpec::hidden(PanelKind::Attributions);
        spec.show_data = true;
        assert!(matches!(
            spec.validate(),
            Err(VizError::MissingColumnCount { .. })
        ));
    }
}
