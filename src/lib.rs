//! dense_pixel_viz: dense-pixel views of time-series model internals in GPUI

pub mod brush;
pub mod colormap;
pub mod config;
pub mod data_types;
pub mod dense_view;
pub mod error;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod rendering;
pub mod scales;
pub mod sessions;
pub mod slider;
pub mod source;
pub mod theme;
pub mod transform;
pub mod utils;
pub mod view_controller;

pub use colormap::{Colormap, PackedColor};
pub use config::VizConfig;
pub use data_types::{Layout, Matrix, PanelKind, Query, Settings, SettingsPatch};
pub use dense_view::{init, DensePixelView};
pub use error::{Result, VizError};
pub use model::DenseModel;
pub use source::{DenseDataSource, HttpDataSource, MemoryDataSource};
