use super::fetch::DataFetcher;
use crate::data_types::SettingsPatch;
use gpui::*;
use tracing::warn;

actions!(dense_pixel_viz, [ClearSelections, ToggleLayout, ReloadData]);

#[derive(Clone)]
pub struct DenseActionHandler {
    pub fetcher: DataFetcher,
}

impl DenseActionHandler {
    pub fn new(fetcher: DataFetcher) -> Self {
        Self { fetcher }
    }

    pub fn handle_clear_selections(&self, _: &ClearSelections, _win: &mut Window, cx: &mut App) {
        self.fetcher.model.update(cx, |m, cx| {
            m.clear_selections();
            cx.notify();
        });
    }

    pub fn handle_toggle_layout(&self, _: &ToggleLayout, _win: &mut Window, cx: &mut App) {
        self.fetcher.request(cx, |m| {
            let patch = SettingsPatch::layout(m.settings().layout.toggled());
            match m.change_settings(&patch) {
                Ok(true) => Some(m.reload()),
                Ok(false) => None,
                Err(e) => {
                    warn!(error = %e, "layout toggle rejected");
                    None
                }
            }
        });
    }

    pub fn handle_reload(&self, _: &ReloadData, _win: &mut Window, cx: &mut App) {
        self.fetcher.request(cx, |m| Some(m.reload()));
    }
}
