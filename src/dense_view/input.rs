use super::fetch::DataFetcher;
use crate::brush::MOUSE_POINTER;
use crate::model::DenseModel;
use crate::utils::PixelsExt;
use gpui::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone)]
pub struct DenseInputHandler {
    pub model: Entity<DenseModel>,
    pub fetcher: DataFetcher,
    pub focus_handle: FocusHandle,

    // Shared bounds
    pub slider_bounds: Rc<RefCell<Bounds<Pixels>>>,
    pub slider_drag: Rc<RefCell<Option<(f32, f32)>>>,
}

impl DenseInputHandler {
    pub fn new(
        fetcher: DataFetcher,
        focus_handle: FocusHandle,
        slider_bounds: Rc<RefCell<Bounds<Pixels>>>,
        slider_drag: Rc<RefCell<Option<(f32, f32)>>>,
    ) -> Self {
        Self {
            model: fetcher.model.clone(),
            fetcher,
            focus_handle,
            slider_bounds,
            slider_drag,
        }
    }

    fn slider_x(&self, position: Point<Pixels>) -> Option<f32> {
        let bounds = *self.slider_bounds.borrow();
        bounds
            .contains(&position)
            .then(|| (position.x - bounds.origin.x).as_f32())
    }

    pub fn handle_mouse_down(&self, event: &MouseDownEvent, window: &mut Window, cx: &mut App) {
        window.focus(&self.focus_handle);
        if let Some(x) = self.slider_x(event.position) {
            *self.slider_drag.borrow_mut() = Some((x, x));
            window.refresh();
            return;
        }
        self.model.update(cx, |m, cx| {
            if m.pointer_down(MOUSE_POINTER, event.position) {
                cx.notify();
            }
        });
    }

    pub fn handle_mouse_move(&self, event: &MouseMoveEvent, window: &mut Window, cx: &mut App) {
        let slider_dragging = self.slider_drag.borrow().is_some();
        if slider_dragging {
            let bounds = *self.slider_bounds.borrow();
            let x = (event.position.x - bounds.origin.x).as_f32();
            if let Some((_, current)) = self.slider_drag.borrow_mut().as_mut() {
                *current = x.clamp(0.0, bounds.size.width.as_f32());
            }
            window.refresh();
            return;
        }
        self.model.update(cx, |m, cx| {
            if m.pointer_move(MOUSE_POINTER, event.position) {
                cx.notify();
            }
        });
    }

    pub fn handle_mouse_up(&self, event: &MouseUpEvent, window: &mut Window, cx: &mut App) {
        let slider_drag = self.slider_drag.borrow_mut().take();
        if let Some((anchor, current)) = slider_drag {
            window.refresh();
            let width = self.slider_bounds.borrow().size.width.as_f32();
            self.fetcher.request(cx, |m| {
                let slider = m.slider(width)?;
                let (start, end) = slider.range_for(anchor, current);
                (end > start).then(|| m.select_samples(start, end))
            });
            return;
        }
        let ticket = self.model.update(cx, |m, cx| {
            let ticket = m.pointer_up(MOUSE_POINTER, event.position);
            cx.notify();
            ticket
        });
        if let Some(ticket) = ticket {
            self.fetcher.detail(ticket, cx);
        }
    }

    pub fn handle_hover(&self, hovered: &bool, _window: &mut Window, cx: &mut App) {
        if *hovered {
            return;
        }
        self.model.update(cx, |m, cx| {
            if m.pointer_leave() {
                cx.notify();
            }
        });
    }
}
