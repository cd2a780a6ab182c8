use dense_pixel_viz::brush::{BrushController, BrushState, HitGrid};
use dense_pixel_viz::data_types::{PanelKind, PanelSpec};
use dense_pixel_viz::layout::{LayoutGeometry, LayoutParams, Span};
use dense_pixel_viz::view_controller::{PercentileWindow, ViewController};

const SAMPLE_EXTENT: f32 = 200.0;

fn geometry() -> LayoutGeometry {
    // Raw: band [0, 100); activations: band [103, 203) with data [103, 191) and hist [193, 203).
    let specs = [
        PanelSpec::data(PanelKind::Raw, 50),
        PanelSpec::data(PanelKind::Activations, 40).with_hist(8),
    ];
    LayoutGeometry::compute(&specs, &LayoutParams::new(206.0).with_margins(3.0, 2.0)).unwrap()
}

#[test]
fn test_brush_over_rows_hits_exact_indices() {
    // 20 rows of 10px each, shown in a permuted order.
    let indices: Vec<usize> = (0..20).map(|i| 100 + 2 * i).collect();
    let grid = HitGrid::new(&indices, SAMPLE_EXTENT);
    assert_eq!(grid.row_size(), 10.0);
    for (i, j) in [(0, 1), (3, 9), (12, 20)] {
        let rows = grid.hit_test(Span::new(10.0 * i as f32, 10.0 * (j - i) as f32));
        assert_eq!(rows, (i..j).collect::<Vec<_>>());
        assert_eq!(grid.indices_for(&rows), indices[i..j].to_vec());
    }
}

#[test]
fn test_released_brush_becomes_selection() {
    let geo = geometry();
    let grid = HitGrid::new(&(0..20).collect::<Vec<_>>(), SAMPLE_EXTENT);
    let mut brushes = BrushController::new(geo.panels().len());

    assert_eq!(brushes.pointer_down(0, (10.0, 30.0), &geo), Some(0));
    assert!(matches!(brushes.state(0), BrushState::Dragging { .. }));
    brushes.pointer_move(0, (40.0, 60.0));
    let region = brushes.pointer_up(0, (40.0, 60.0), &geo, SAMPLE_EXTENT).unwrap();
    assert_eq!(brushes.state(0), BrushState::Idle);

    let selection = ViewController::selection_from_brush(&region, &geo, &grid).unwrap();
    assert_eq!(selection.panel, Some(0));
    assert_eq!(selection.indices, vec![3, 4, 5]);
    let w = selection.window;
    assert!((w.start - 0.1).abs() < 1e-6);
    assert!((w.end - 0.4).abs() < 1e-6);
}

#[test]
fn test_brush_fraction_ignores_histogram() {
    let geo = geometry();
    let activations = &geo.panels()[1];
    let data = activations.data.unwrap();
    // Dragging past the data region into the histogram clamps to 1.
    let layout = Span::from_edges(data.start + data.len / 2.0, activations.band().end());
    let w = ViewController::percentile_window(layout, activations.percent_base().unwrap());
    assert!((w.start - 0.5).abs() < 1e-4);
    assert_eq!(w.end, 1.0);
}

#[test]
fn test_window_reprojects_onto_each_panel() {
    let geo = geometry();
    let window = PercentileWindow::new(0.25, 0.5);
    let spans = ViewController::reproject(window, &geo);
    assert_eq!(spans.len(), 2);
    let (p0, s0) = spans[0];
    assert_eq!(p0, 0);
    assert!((s0.start - 25.0).abs() < 1e-3);
    assert!((s0.len - 25.0).abs() < 1e-3);
    let (p1, s1) = spans[1];
    let data = geo.panels()[1].data.unwrap();
    assert_eq!(p1, 1);
    assert!((s1.start - (data.start + data.len * 0.25)).abs() < 1e-3);
    assert!((s1.len - data.len * 0.25).abs() < 1e-3);
}

#[test]
fn test_highlights_span_selected_rows_on_every_panel() {
    let geo = geometry();
    let grid = HitGrid::new(&(0..20).collect::<Vec<_>>(), SAMPLE_EXTENT);
    let highlights =
        ViewController::highlights(4, PercentileWindow::new(0.0, 1.0), &[5, 6, 7], &geo, &grid);
    assert_eq!(highlights.len(), 2);
    for h in &highlights {
        assert_eq!(h.key, 4);
        assert_eq!(h.samples, Span::new(50.0, 30.0));
    }
}

#[test]
fn test_simultaneous_brushes_in_different_panels() {
    let geo = geometry();
    let mut brushes = BrushController::new(geo.panels().len());
    assert_eq!(brushes.pointer_down(1, (20.0, 0.0), &geo), Some(0));
    assert_eq!(brushes.pointer_down(2, (120.0, 0.0), &geo), Some(1));
    // A third pointer cannot join a busy band.
    assert_eq!(brushes.pointer_down(3, (30.0, 0.0), &geo), None);

    let a = brushes.pointer_up(1, (60.0, 50.0), &geo, SAMPLE_EXTENT).unwrap();
    assert!(brushes.is_dragging());
    let b = brushes.pointer_up(2, (150.0, 90.0), &geo, SAMPLE_EXTENT).unwrap();
    assert_eq!((a.panel, b.panel), (0, 1));
    assert!(!brushes.is_dragging());
}

#[test]
fn test_cancel_drops_in_flight_brushes() {
    let geo = geometry();
    let mut brushes = BrushController::new(geo.panels().len());
    brushes.pointer_down(0, (5.0, 5.0), &geo);
    brushes.cancel_all();
    assert!(brushes.pointer_up(0, (50.0, 50.0), &geo, SAMPLE_EXTENT).is_none());
}

#[test]
fn test_highlights_split_on_reordered_rows() {
    let geo = geometry();
    // Display order 0, 2, 4, ... then 1, 3, 5, ...
    let order: Vec<usize> = (0..20).step_by(2).chain((1..20).step_by(2)).collect();
    let grid = HitGrid::new(&order, SAMPLE_EXTENT);
    assert_eq!(grid.rows_of(&[4, 5, 6]), vec![2, 3, 12]);
    assert_eq!(grid.row_runs(&[2, 3, 12]), vec![vec![2, 3], vec![12]]);

    let highlights =
        ViewController::highlights(1, PercentileWindow::full(), &[4, 5, 6], &geo, &grid);
    // Two runs on each of the two panels.
    assert_eq!(highlights.len(), 4);
    assert_eq!(highlights[0].samples, Span::new(20.0, 20.0));
    assert_eq!(highlights[1].samples, Span::new(120.0, 10.0));
    assert!(ViewController::highlights(1, PercentileWindow::full(), &[99], &geo, &grid).is_empty());
}
