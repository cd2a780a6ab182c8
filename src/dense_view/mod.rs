pub mod actions;
pub mod fetch;
pub mod input;
pub mod renderer;

use crate::data_types::SettingsPatch;
use crate::error::Result;
use crate::model::{Content, DenseModel};
use crate::sessions::SessionKey;
use crate::source::DenseDataSource;
use crate::theme::VizTheme;
use gpui::prelude::*;
use gpui::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

pub use actions::{ClearSelections, ReloadData, ToggleLayout};
pub use fetch::DataFetcher;

use self::actions::DenseActionHandler;
use self::input::DenseInputHandler;
use self::renderer::DenseRenderer;

const KEY_CONTEXT: &str = "DensePixelView";

/// Binds the default keys for the view's actions.
pub fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("escape", ClearSelections, Some(KEY_CONTEXT)),
        KeyBinding::new("l", ToggleLayout, Some(KEY_CONTEXT)),
        KeyBinding::new("r", ReloadData, Some(KEY_CONTEXT)),
    ]);
}

pub struct DensePixelView {
    pub model: Entity<DenseModel>,

    // Components (Delegates)
    renderer: DenseRenderer,
    input: DenseInputHandler,
    actions: DenseActionHandler,
    fetcher: DataFetcher,

    bounds: Rc<RefCell<Bounds<Pixels>>>,
    focus_handle: FocusHandle,
    started: bool,
}

impl Focusable for DensePixelView {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl DensePixelView {
    pub fn new(
        model: Entity<DenseModel>,
        source: Arc<dyn DenseDataSource>,
        cx: &mut Context<Self>,
    ) -> Self {
        cx.observe(&model, |_, _, cx| cx.notify()).detach();
        let focus_handle = cx.focus_handle();

        let bounds = Rc::new(RefCell::new(Bounds::default()));
        let slider_bounds = Rc::new(RefCell::new(Bounds::default()));
        let slider_drag = Rc::new(RefCell::new(None));

        let fetcher = DataFetcher::new(model.clone(), source);
        let renderer = DenseRenderer::new(
            model.clone(),
            bounds.clone(),
            slider_bounds.clone(),
            slider_drag.clone(),
        );
        let input = DenseInputHandler::new(
            fetcher.clone(),
            focus_handle.clone(),
            slider_bounds,
            slider_drag,
        );
        let actions = DenseActionHandler::new(fetcher.clone());

        Self {
            model,
            renderer,
            input,
            actions,
            fetcher,
            bounds,
            focus_handle,
            started: false,
        }
    }

    pub fn set_theme(&mut self, theme: VizTheme) {
        self.renderer.theme = theme;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Issues the initial query sized from the current container.
    pub fn start(&mut self, cx: &mut Context<Self>) {
        self.started = true;
        self.fetcher.request(cx, |m| {
            let query = m.initial_query();
            Some(m.begin_query(query))
        });
    }

    /// Applies a settings patch, refetching when the change needs new data.
    pub fn apply_settings(&mut self, patch: &SettingsPatch, cx: &mut Context<Self>) -> Result<()> {
        let mut result = Ok(());
        self.fetcher.request(cx, |m| match m.change_settings(patch) {
            Ok(refetch) => refetch.then(|| m.reload()),
            Err(e) => {
                result = Err(e);
                None
            }
        });
        result
    }

    pub fn select_samples(&mut self, start: usize, end: usize, cx: &mut Context<Self>) {
        self.fetcher
            .request(cx, |m| Some(m.select_samples(start, end)));
    }

    pub fn select_ordering_base(&mut self, base: &str, cx: &mut Context<Self>) {
        self.fetcher.request(cx, |m| m.select_ordering_base(base));
    }

    pub fn select_ordering_method(&mut self, method: &str, cx: &mut Context<Self>) {
        self.fetcher.request(cx, |m| m.select_ordering_method(method));
    }

    pub fn select_stage(&mut self, stage: &str, cx: &mut Context<Self>) {
        self.fetcher.request(cx, |m| Some(m.select_stage(stage)));
    }

    pub fn select_attribution_method(&mut self, method: &str, cx: &mut Context<Self>) {
        self.fetcher
            .request(cx, |m| Some(m.select_attribution_method(method)));
    }

    pub fn reload(&mut self, cx: &mut Context<Self>) {
        self.fetcher.request(cx, |m| Some(m.reload()));
    }

    pub fn clear_selections(&mut self, cx: &mut Context<Self>) {
        self.model.update(cx, |m, cx| {
            m.clear_selections();
            cx.notify();
        });
    }

    pub fn close_session(&mut self, key: SessionKey, cx: &mut Context<Self>) {
        self.model.update(cx, |m, cx| {
            m.close_session(key);
            cx.notify();
        });
    }

    /// Pushes the last painted bounds into the model.
    fn sync_container(&mut self, cx: &mut Context<Self>) {
        let bounds = *self.bounds.borrow();
        if bounds.size.width <= px(0.0) || bounds.size.height <= px(0.0) {
            return;
        }
        let (resized, image_mode) = self.model.update(cx, |m, _| {
            let resized = m.container().size != bounds.size;
            m.set_container(bounds);
            (resized, matches!(m.content(), Content::Image(_)))
        });
        if !self.started {
            self.start(cx);
        } else if resized && image_mode {
            // Server-rendered images are sized to the container.
            self.reload(cx);
        }
    }
}

impl Render for DensePixelView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.sync_container(cx);
        let element = self.renderer.render(window, cx);

        let input = self.input.clone();
        let actions = self.actions.clone();
        let entity_id = cx.entity_id();

        element
            .id(("dense-pixel-view", entity_id))
            .key_context(KEY_CONTEXT)
            .track_focus(&self.focus_handle)
            .on_mouse_down(MouseButton::Left, {
                let input = input.clone();
                move |e, w, c| input.handle_mouse_down(e, w, c)
            })
            .on_mouse_move({
                let input = input.clone();
                move |e, w, c| input.handle_mouse_move(e, w, c)
            })
            .on_mouse_up(MouseButton::Left, {
                let input = input.clone();
                move |e, w, c| input.handle_mouse_up(e, w, c)
            })
            .on_mouse_up_out(MouseButton::Left, {
                let input = input.clone();
                move |e, w, c| input.handle_mouse_up(e, w, c)
            })
            .on_hover({
                let input = input.clone();
                move |hovered, w, c| input.handle_hover(hovered, w, c)
            })
            .on_action({
                let actions = actions.clone();
                move |a, w, c| actions.handle_clear_selections(a, w, c)
            })
            .on_action({
                let actions = actions.clone();
                move |a, w, c| actions.handle_toggle_layout(a, w, c)
            })
            .on_action({
                let actions = actions.clone();
                move |a, w, c| actions.handle_reload(a, w, c)
            })
    }
}
