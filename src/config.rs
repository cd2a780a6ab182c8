use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};
use crate::layout::LayoutParams;
use crate::normalize::Normalization;

/// Names a JSON config file read by [`VizConfig::from_env`].
pub const CONFIG_ENV: &str = "DENSE_PIXEL_CONFIG";
/// Overrides `base_url` when set.
pub const API_URL_ENV: &str = "DENSE_PIXEL_API_URL";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub data: Normalization,
    pub hist: Normalization,
    pub labels: Normalization,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            data: Normalization::MinMax,
            hist: Normalization::MinMax,
            labels: Normalization::Softmax,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub base_url: String,
    pub inter_margin: f32,
    pub intra_margin: f32,
    pub hist_fraction: f32,
    /// Interesting windows of this many samples or fewer are dropped.
    pub min_window_len: usize,
    /// Time points on each side of an interesting window's centre.
    pub interesting_radius: f64,
    pub request_timeout_secs: u64,
    /// Height reserved for the parameter bar in the vertical layout.
    pub parameter_height: f32,
    pub tooltip_offset: f32,
    pub normalization: NormalizationConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            inter_margin: 3.0,
            intra_margin: 2.0,
            hist_fraction: 0.1,
            min_window_len: 25,
            interesting_radius: 10.0,
            request_timeout_secs: 30,
            parameter_height: 60.0,
            tooltip_offset: 15.0,
            normalization: NormalizationConfig::default(),
        }
    }
}

impl VizConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| VizError::invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| VizError::invalid(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Defaults, then the file named by `DENSE_PIXEL_CONFIG`, then the URL override.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_path(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.inter_margin < 0.0 || self.intra_margin < 0.0 {
            return Err(VizError::invalid("margins must not be negative"));
        }
        if !(self.hist_fraction > 0.0 && self.hist_fraction < 1.0) {
            return Err(VizError::invalid(format!(
                "hist_fraction must be in (0, 1), got {}",
                self.hist_fraction
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(VizError::invalid("request_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn layout_params(&self, total_extent: f32) -> LayoutParams {
        LayoutParams {
            total_extent,
            inter_margin: self.inter_margin,
            intra_margin: self.intra_margin,
            hist_fraction: self.hist_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = VizConfig::from_json_str(r#"{"inter_margin": 5.0}"#).unwrap();
        assert_eq!(config.inter_margin, 5.0);
        assert_eq!(config.min_window_len, 25);
        assert_eq!(config.normalization.labels, Normalization::Softmax);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(VizConfig::from_json_str(r#"{"hist_fraction": 1.5}"#).is_err());
        assert!(VizConfig::from_json_str(r#"{"intra_margin": -1}"#).is_err());
        assert!(VizConfig::from_json_str(r#"{"request_timeout_secs": 0}"#).is_err());
    }
}
