use crate::data_types::{ImageKind, RenderedImage};
use crate::model::{Content, DenseModel};
use crate::rendering::WindowCanvas;
use crate::sessions::{DetailSession, DetailState};
use crate::theme::VizTheme;
use crate::utils::PixelsExt;
use gpui::prelude::*;
use gpui::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

const STATUS_HEIGHT: f32 = 20.0;
const DETAIL_SIZE: f32 = 160.0;

pub struct DenseRenderer {
    pub model: Entity<DenseModel>,
    pub theme: VizTheme,

    // Bounds shared with the input handler
    pub bounds: Rc<RefCell<Bounds<Pixels>>>,
    pub slider_bounds: Rc<RefCell<Bounds<Pixels>>>,
    pub slider_drag: Rc<RefCell<Option<(f32, f32)>>>,
}

/// Converts service bytes into a gpui image; unknown formats are skipped.
pub fn gpui_image(image: &RenderedImage) -> Option<Arc<Image>> {
    let format = match image.kind {
        ImageKind::Png => ImageFormat::Png,
        ImageKind::Jpeg => ImageFormat::Jpeg,
        ImageKind::Unknown => return None,
    };
    Some(Arc::new(Image::from_bytes(format, image.bytes.to_vec())))
}

impl DenseRenderer {
    pub fn new(
        model: Entity<DenseModel>,
        bounds: Rc<RefCell<Bounds<Pixels>>>,
        slider_bounds: Rc<RefCell<Bounds<Pixels>>>,
        slider_drag: Rc<RefCell<Option<(f32, f32)>>>,
    ) -> Self {
        Self {
            model,
            theme: VizTheme::default(),
            bounds,
            slider_bounds,
            slider_drag,
        }
    }

    fn render_status(&self, model: &DenseModel) -> impl IntoElement {
        let theme = &self.theme;
        let (text, color) = match model.error() {
            Some(e) => (format!("Error: {e}"), theme.error_text),
            None if model.is_loading() => ("Loading...".to_string(), theme.label_text),
            None => {
                let q = model.query();
                (
                    format!(
                        "{} | samples {}..{} | {} {} | {}",
                        model.settings().dataset,
                        q.start,
                        q.end,
                        q.ordering_base,
                        q.ordering_method,
                        q.stage
                    ),
                    theme.label_text,
                )
            }
        };
        div()
            .h(px(STATUS_HEIGHT))
            .w_full()
            .px_2()
            .flex()
            .items_center()
            .text_size(theme.label_size)
            .text_color(color)
            .child(text)
    }

    fn render_slider(&self, height: f32) -> impl IntoElement {
        let model = self.model.clone();
        let theme = self.theme.clone();
        let slider_rc = self.slider_bounds.clone();
        let drag_rc = self.slider_drag.clone();
        div().h(px(height)).w_full().relative().child(
            canvas(
                move |_, _, _| {},
                move |bounds, (), window, cx| {
                    *slider_rc.borrow_mut() = bounds;
                    let model = model.read(cx);
                    let Some(slider) = model.slider(bounds.size.width.as_f32()) else {
                        return;
                    };
                    let origin = bounds.origin;
                    let (a, b) = slider.pixels_for(model.query().start, model.query().end);
                    window.paint_quad(fill(
                        Bounds::new(
                            point(origin.x + px(a), origin.y),
                            size(px((b - a).max(1.0)), bounds.size.height),
                        ),
                        theme.highlight,
                    ));
                    for (x, y) in slider.summary_points(bounds.size.height.as_f32()) {
                        window.paint_quad(fill(
                            Bounds::new(
                                point(origin.x + px(x), origin.y + px(y)),
                                size(px(1.0), px(1.0)),
                            ),
                            theme.label_text,
                        ));
                    }
                    if let Some((anchor, current)) = *drag_rc.borrow() {
                        let (lo, hi) = (anchor.min(current), anchor.max(current));
                        let rect = Bounds::new(
                            point(origin.x + px(lo), origin.y),
                            size(px(hi - lo), bounds.size.height),
                        );
                        window.paint_quad(fill(rect, theme.brush));
                        window.paint_quad(outline(rect, theme.brush_border, BorderStyle::Solid));
                    }
                },
            )
            .size_full()
            .absolute(),
        )
    }

    fn render_canvas(&self) -> impl IntoElement {
        let model = self.model.clone();
        let theme = self.theme.clone();
        let bounds_rc = self.bounds.clone();
        canvas(
            move |_, _, _| {},
            move |bounds, (), window, cx| {
                if *bounds_rc.borrow() != bounds {
                    // The model picks up the new container on the next render.
                    *bounds_rc.borrow_mut() = bounds;
                    window.refresh();
                }
                let model = model.read(cx);
                let transform = model.transform();
                window.with_content_mask(Some(ContentMask { bounds }), |window| {
                    model.paint(&mut WindowCanvas::new(window));
                    for h in model.highlights() {
                        let rect = transform.region(h.layout, h.samples);
                        window.paint_quad(fill(rect, theme.highlight));
                        window.paint_quad(outline(rect, theme.highlight_border, BorderStyle::Solid));
                    }
                    for b in model.active_brushes() {
                        let rect = transform.region(b.layout, b.samples);
                        window.paint_quad(fill(rect, theme.brush));
                        window.paint_quad(outline(rect, theme.brush_border, BorderStyle::Solid));
                    }
                });
            },
        )
        .size_full()
        .absolute()
    }

    fn render_session(&self, session: &DetailSession) -> impl IntoElement {
        let theme = &self.theme;
        let key = session.key;
        let toggle = {
            let model = self.model.clone();
            move |_: &MouseDownEvent, _: &mut Window, cx: &mut App| {
                model.update(cx, |m, cx| {
                    m.toggle_session(key);
                    cx.notify();
                });
            }
        };
        let close = {
            let model = self.model.clone();
            move |_: &MouseDownEvent, _: &mut Window, cx: &mut App| {
                model.update(cx, |m, cx| {
                    m.close_session(key);
                    cx.notify();
                });
            }
        };

        let header = div()
            .flex()
            .flex_row()
            .justify_between()
            .gap_2()
            .text_size(theme.label_size)
            .text_color(theme.label_text)
            .child(
                div()
                    .cursor_pointer()
                    .on_mouse_down(MouseButton::Left, toggle)
                    .child(session.title()),
            )
            .child(
                div()
                    .cursor_pointer()
                    .on_mouse_down(MouseButton::Left, close)
                    .child("x"),
            );

        let body = match &session.state {
            DetailState::Loading => div().child("Loading..."),
            DetailState::Failed(e) => div().text_color(theme.error_text).child(e.to_string()),
            DetailState::Ready(image) => match gpui_image(image) {
                Some(image) => div().child(
                    img(image)
                        .w(px(DETAIL_SIZE))
                        .h(px(DETAIL_SIZE))
                        .object_fit(ObjectFit::Contain),
                ),
                None => div().child("Unsupported image"),
            },
        };

        div()
            .flex()
            .flex_col()
            .p_1()
            .rounded_sm()
            .border_1()
            .border_color(theme.label_text.opacity(0.2))
            .text_size(theme.label_size)
            .child(header)
            .when(session.open, |d| d.child(body))
    }

    pub fn render<V: 'static>(&mut self, _window: &mut Window, cx: &mut Context<V>) -> Div {
        let model = self.model.read(cx);
        let parameter_height = model.config().parameter_height;

        let mut main = div()
            .flex_1()
            .w_full()
            .relative()
            .overflow_hidden()
            .cursor(CursorStyle::Crosshair);
        if model.error().is_none() {
            if let Content::Image(image) = model.content() {
                if let Some(image) = gpui_image(image) {
                    main = main.child(
                        img(image)
                            .absolute()
                            .size_full()
                            .object_fit(ObjectFit::Fill),
                    );
                }
            }
        }
        main = main.child(self.render_canvas());
        if let Some(tooltip) = model.tooltip() {
            let origin = model.container().origin;
            main = main.child(
                div()
                    .absolute()
                    .left(tooltip.position.x - origin.x)
                    .top(tooltip.position.y - origin.y)
                    .px_1()
                    .rounded_sm()
                    .bg(self.theme.tooltip_background)
                    .text_color(self.theme.tooltip_text)
                    .text_size(self.theme.label_size)
                    .child(tooltip.text.clone()),
            );
        }

        let sessions: Vec<_> = model.sessions().iter().map(|s| self.render_session(s)).collect();

        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(self.theme.background)
            .child(self.render_status(model))
            .child(self.render_slider(parameter_height))
            .child(main)
            .when(!sessions.is_empty(), |d| {
                d.child(
                    div()
                        .w_full()
                        .flex()
                        .flex_row()
                        .flex_wrap()
                        .gap_2()
                        .p_1()
                        .children(sessions),
                )
            })
    }
}
