use gpui::*;

#[derive(Clone, Debug)]
pub struct VizTheme {
    pub background: Hsla,
    pub highlight: Hsla,
    pub highlight_border: Hsla,
    pub brush: Hsla,
    pub brush_border: Hsla,
    pub tooltip_background: Hsla,
    pub tooltip_text: Hsla,
    pub label_text: Hsla,
    pub label_size: Pixels,
    pub error_text: Hsla,
}

impl Default for VizTheme {
    fn default() -> Self {
        Self {
            background: gpui::white(),
            highlight: gpui::black().alpha(0.12),
            highlight_border: gpui::black().alpha(0.6),
            brush: gpui::blue().alpha(0.15),
            brush_border: gpui::blue().alpha(0.7),
            tooltip_background: gpui::black().alpha(0.8),
            tooltip_text: gpui::white(),
            label_text: gpui::black().alpha(0.8),
            label_size: px(11.0),
            error_text: gpui::red(),
        }
    }
}
