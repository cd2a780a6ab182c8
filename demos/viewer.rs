//! Opens a dense-pixel viewer window.
//!
//! Talks to the service at `DENSE_PIXEL_API_URL` (or the configured base URL).
//! Pass `--offline` to browse a synthetic dataset instead.

use dense_pixel_viz::data_types::{Settings, SettingsPatch};
use dense_pixel_viz::{DenseDataSource, DenseModel, DensePixelView, HttpDataSource, MemoryDataSource, VizConfig};
use gpui::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct ViewerApp {
    view: Entity<DensePixelView>,
}

impl Render for ViewerApp {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
        div().size_full().bg(gpui::white()).child(self.view.clone())
    }
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = VizConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let offline = args.iter().any(|a| a == "--offline");
    let dataset = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "demo".to_string());

    let source: Arc<dyn DenseDataSource> = if offline {
        Arc::new(MemoryDataSource::synthetic())
    } else {
        Arc::new(HttpDataSource::new(&config)?)
    };
    let settings = Settings::default().apply(&SettingsPatch {
        dataset: Some(dataset),
        ..Default::default()
    })?;

    Application::new().run(move |cx: &mut App| {
        dense_pixel_viz::init(cx);
        let result = cx.open_window(WindowOptions::default(), |_window, cx| {
            let model = cx.new(|_| DenseModel::new(config, settings));
            let view = cx.new(|cx| DensePixelView::new(model, source, cx));
            cx.new(|_| ViewerApp { view })
        });
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to open window");
            cx.quit();
        }
    });
    Ok(())
}
