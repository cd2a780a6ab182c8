use serde::{Deserialize, Serialize};

use super::panel::PanelKind;
use crate::colormap::Colormap;
use crate::error::{Result, VizError};

/// Orientation shared by every panel.
///
/// `Vertical`: samples stacked top-to-bottom, time along the width, panels side by side.
/// `Horizontal`: samples side by side, time along the height, panels stacked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Vertical,
    #[default]
    Horizontal,
}

impl Layout {
    pub fn toggled(self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelSettings {
    pub show: bool,
    pub show_hist: bool,
    pub color_data: Colormap,
    pub color_hist: Colormap,
}

/// Immutable snapshot of layout, visibility and colormap choices.
///
/// Updates go through [`Settings::apply`], which returns a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub dataset: String,
    pub layout: Layout,
    panels: [PanelSettings; 4],
}

impl Default for Settings {
    fn default() -> Self {
        let panel = |color_data, color_hist| PanelSettings {
            show: true,
            show_hist: false,
            color_data,
            color_hist,
        };
        Self {
            dataset: String::new(),
            layout: Layout::Horizontal,
            panels: [
                panel(Colormap::RdBu, Colormap::Reds),
                panel(Colormap::Reds, Colormap::Reds),
                panel(Colormap::RdBu, Colormap::Reds),
                panel(Colormap::Viridis, Colormap::Viridis),
            ],
        }
    }
}

impl Settings {
    pub fn panel(&self, kind: PanelKind) -> &PanelSettings {
        &self.panels[kind.index()]
    }

    pub fn shows(&self, kind: PanelKind) -> bool {
        self.panel(kind).show
    }

    pub fn shows_hist(&self, kind: PanelKind) -> bool {
        kind.supports_hist() && self.panel(kind).show_hist
    }

    pub fn with_layout(&self, layout: Layout) -> Self {
        Self {
            layout,
            ..self.clone()
        }
    }

    /// Returns the patched settings; colormap names are resolved here, so an
    /// unknown name fails before anything is drawn.
    pub fn apply(&self, patch: &SettingsPatch) -> Result<Self> {
        let mut next = self.clone();
        if let Some(dataset) = &patch.dataset {
            next.dataset = dataset.clone();
        }
        if let Some(layout) = patch.layout {
            next.layout = layout;
        }

        let toggles = [
            (PanelKind::Raw, patch.show_raw_data, patch.show_raw_data_histogram),
            (
                PanelKind::Activations,
                patch.show_activations,
                patch.show_activations_histogram,
            ),
            (
                PanelKind::Attributions,
                patch.show_attributions,
                patch.show_attributions_histogram,
            ),
            (PanelKind::Labels, patch.show_labels_pred, None),
        ];
        for (kind, show, show_hist) in toggles {
            let p = &mut next.panels[kind.index()];
            if let Some(show) = show {
                p.show = show;
            }
            if let Some(show_hist) = show_hist {
                p.show_hist = show_hist;
            }
        }

        let colormaps = [
            (PanelKind::Raw, &patch.raw_time_series_colormap, &patch.raw_time_series_histogram_colormap),
            (PanelKind::Activations, &patch.activations_colormap, &patch.activations_histogram_colormap),
            (PanelKind::Attributions, &patch.attributions_colormap, &patch.attributions_histogram_colormap),
            (PanelKind::Labels, &patch.predictions_colormap, &None),
        ];
        for (kind, data, hist) in colormaps {
            let p = &mut next.panels[kind.index()];
            if let Some(name) = data {
                p.color_data = Colormap::resolve(name)?;
            }
            if let Some(name) = hist {
                p.color_hist = Colormap::resolve(name)?;
            }
        }
        Ok(next)
    }
}

/// Partial settings update accepted by the settings-change callback.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    pub dataset: Option<String>,
    pub layout: Option<Layout>,
    pub show_raw_data: Option<bool>,
    pub show_raw_data_histogram: Option<bool>,
    pub show_activations: Option<bool>,
    pub show_activations_histogram: Option<bool>,
    pub show_attributions: Option<bool>,
    pub show_attributions_histogram: Option<bool>,
    pub show_labels_pred: Option<bool>,
    pub raw_time_series_colormap: Option<String>,
    pub raw_time_series_histogram_colormap: Option<String>,
    pub activations_colormap: Option<String>,
    pub activations_histogram_colormap: Option<String>,
    pub attributions_colormap: Option<String>,
    pub attributions_histogram_colormap: Option<String>,
    pub predictions_colormap: Option<String>,
}

impl SettingsPatch {
    pub fn layout(layout: Layout) -> Self {
        Self {
            layout: Some(layout),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            let msg = e.to_string();
            match msg.strip_prefix("unknown field `") {
                Some(rest) => VizError::UnknownOption {
                    key: rest.split('`').next().unwrap_or_default().to_string(),
                },
                None => VizError::invalid(msg),
            }
        })
    }
}
