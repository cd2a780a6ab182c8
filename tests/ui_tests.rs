use std::sync::Arc;

use dense_pixel_viz::brush::MOUSE_POINTER;
use dense_pixel_viz::data_types::SettingsPatch;
use dense_pixel_viz::dense_view::DataFetcher;
use dense_pixel_viz::sessions::DetailState;
use dense_pixel_viz::{DenseModel, DensePixelView, MemoryDataSource, Settings, VizConfig};
use gpui::{point, px, size, AppContext, Bounds, Entity, Point, TestAppContext, WindowHandle};

type Harness = (
    Entity<DenseModel>,
    WindowHandle<DensePixelView>,
    Arc<MemoryDataSource>,
);

fn setup(cx: &mut TestAppContext) -> Harness {
    cx.update(dense_pixel_viz::init);
    let model = cx.update(|cx| {
        cx.new(|_| {
            let mut model = DenseModel::new(VizConfig::default(), Settings::default());
            model.set_container(Bounds::new(point(px(0.0), px(0.0)), size(px(400.0), px(300.0))));
            model
        })
    });
    let source = Arc::new(MemoryDataSource::synthetic());
    let window = cx.add_window({
        let model = model.clone();
        let source = source.clone();
        move |_window, cx| DensePixelView::new(model, source, cx)
    });
    window
        .update(cx, |view, _window, cx| view.start(cx))
        .unwrap();
    cx.run_until_parked();
    (model, window, source)
}

#[gpui::test]
fn test_view_is_linked_to_model(cx: &mut TestAppContext) {
    let (model, window, _) = setup(cx);
    window
        .update(cx, |view, _window, _cx| {
            assert!(
                view.model.entity_id() == model.entity_id(),
                "DensePixelView should hold the correct model entity"
            );
        })
        .unwrap();
}

#[gpui::test]
fn test_start_fetches_and_lays_out(cx: &mut TestAppContext) {
    let (model, window, source) = setup(cx);
    assert!(window
        .update(cx, |view, _window, _cx| view.is_started())
        .unwrap());
    assert!(!source.main_requests().is_empty());
    model.read_with(cx, |m, _| {
        assert!(!m.is_loading());
        assert!(m.error().is_none());
        assert_eq!(m.geometry().visible_count(), 4);
        assert!(!m.grid().is_empty());
    });
}

#[gpui::test]
fn test_only_latest_selection_is_applied(cx: &mut TestAppContext) {
    let (model, window, _) = setup(cx);
    window
        .update(cx, |view, _window, cx| {
            view.select_samples(0, 40, cx);
            view.select_samples(0, 60, cx);
        })
        .unwrap();
    cx.run_until_parked();

    model.read_with(cx, |m, _| {
        assert_eq!(m.grid().len(), 60);
        assert_eq!(m.query().end, 60);
    });
}

#[gpui::test]
fn test_interesting_windows_load_details(cx: &mut TestAppContext) {
    let (model, window, source) = setup(cx);
    window
        .update(cx, |view, _window, cx| view.select_samples(0, 250, cx))
        .unwrap();
    cx.run_until_parked();

    assert_eq!(source.detail_count(), 2);
    model.read_with(cx, |m, _| {
        assert_eq!(m.sessions().len(), 2);
        assert_eq!(m.highlights().len(), 8);
        assert!(m
            .sessions()
            .iter()
            .all(|s| matches!(s.state, DetailState::Ready(_))));
    });

    window
        .update(cx, |view, _window, cx| view.clear_selections(cx))
        .unwrap();
    model.read_with(cx, |m, _| {
        assert!(m.sessions().is_empty());
        assert!(m.highlights().is_empty());
    });
    assert_eq!(source.detail_count(), 2);
}

#[gpui::test]
fn test_settings_patch_validation(cx: &mut TestAppContext) {
    let (model, window, source) = setup(cx);
    window
        .update(cx, |view, _window, cx| view.select_samples(0, 40, cx))
        .unwrap();
    cx.run_until_parked();
    let before = source.main_requests().len();

    let bad = SettingsPatch {
        activations_colormap: Some("Rainbow".to_string()),
        ..Default::default()
    };
    let result = window
        .update(cx, |view, _window, cx| view.apply_settings(&bad, cx))
        .unwrap();
    assert!(result.is_err());

    let hide = SettingsPatch {
        show_labels_pred: Some(false),
        ..Default::default()
    };
    window
        .update(cx, |view, _window, cx| view.apply_settings(&hide, cx))
        .unwrap()
        .unwrap();
    cx.run_until_parked();

    assert_eq!(source.main_requests().len(), before + 1);
    let last = source.main_requests().pop().unwrap();
    assert!(!last.body.labels_pred);
    model.read_with(cx, |m, _| {
        assert_eq!(m.geometry().visible_count(), 3);
    });
}

#[gpui::test]
fn test_brush_opens_detail_session(cx: &mut TestAppContext) {
    let (model, window, source) = setup(cx);
    window
        .update(cx, |view, _window, cx| view.select_samples(0, 40, cx))
        .unwrap();
    cx.run_until_parked();

    let (container, band) = model.read_with(cx, |m, _| {
        (m.container(), m.geometry().panels()[0].extent)
    });
    let at = |x: f32, y: f32| Point {
        x: container.origin.x + px(x),
        y: container.origin.y + px(y),
    };
    let width = f32::from(container.size.width);

    let fetcher = DataFetcher::new(model.clone(), source.clone());
    cx.update(|cx| {
        let ticket = model.update(cx, |m, _| {
            assert!(m.pointer_down(MOUSE_POINTER, at(1.0, band * 0.25)));
            m.pointer_up(MOUSE_POINTER, at(width * 0.5, band * 0.75))
        });
        fetcher.detail(ticket.expect("brush should select rows"), cx);
    });
    cx.run_until_parked();

    assert_eq!(source.detail_count(), 1);
    model.read_with(cx, |m, _| {
        assert_eq!(m.sessions().len(), 1);
        let session = m.sessions().iter().next().unwrap();
        assert!(matches!(session.state, DetailState::Ready(_)));
        assert_eq!(session.indices.first(), Some(&0));
        assert_eq!(m.highlights().len(), 4);
    });
}
