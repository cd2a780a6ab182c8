use thiserror::Error;

pub type Result<T> = std::result::Result<T, VizError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VizError {
    #[error("unknown colormap: {name}")]
    UnknownColormap { name: String },

    #[error("ragged matrix: row {row} has {found} values, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("panel {panel} is shown but has no column count")]
    MissingColumnCount { panel: String },

    #[error("unknown option: {key}")]
    UnknownOption { key: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("failed to load: {message}")]
    Transport { message: String },

    #[error("failed to decode: {message}")]
    Decode { message: String },
}

impl VizError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Flattens an `eyre` report (with its context chain) into a transport error.
    #[must_use]
    pub fn transport(report: &eyre::Report) -> Self {
        Self::Transport {
            message: format!("{report:#}"),
        }
    }

    /// Configuration errors are raised at construction time; everything else is recoverable.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownColormap { .. }
                | Self::RaggedMatrix { .. }
                | Self::MissingColumnCount { .. }
                | Self::UnknownOption { .. }
                | Self::InvalidConfig { .. }
        )
    }
}
