use dense_pixel_viz::colormap::Colormap;
use dense_pixel_viz::config::VizConfig;
use dense_pixel_viz::data_types::{Layout, Orderings, PanelKind, Query, Settings, SettingsPatch};
use dense_pixel_viz::VizError;
use std::collections::BTreeMap;

#[test]
fn test_patch_from_json_resolves_colormaps() {
    let patch = SettingsPatch::from_json(
        r#"{"layout": "vertical", "show_labels_pred": false, "activations_colormap": "interpolateMagma"}"#,
    )
    .unwrap();
    let next = Settings::default().apply(&patch).unwrap();
    assert_eq!(next.layout, Layout::Vertical);
    assert!(!next.shows(PanelKind::Labels));
    assert_eq!(next.panel(PanelKind::Activations).color_data, Colormap::Magma);
}

#[test]
fn test_unknown_option_is_rejected() {
    let err = SettingsPatch::from_json(r#"{"show_everything": true}"#).unwrap_err();
    assert_eq!(
        err,
        VizError::UnknownOption {
            key: "show_everything".to_string()
        }
    );
}

#[test]
fn test_bad_colormap_leaves_base_untouched() {
    let base = Settings::default();
    let patch = SettingsPatch {
        show_raw_data: Some(false),
        predictions_colormap: Some("plasma".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        base.apply(&patch),
        Err(VizError::UnknownColormap { .. })
    ));
    assert!(base.shows(PanelKind::Raw));
}

#[test]
fn test_layout_toggle_round_trips() {
    let s = Settings::default();
    let flipped = s.with_layout(s.layout.toggled());
    assert_ne!(flipped.layout, s.layout);
    assert_eq!(flipped.with_layout(flipped.layout.toggled()), s);
}

#[test]
fn test_orderings_select_first_method() {
    let mut map = BTreeMap::new();
    map.insert("activations".to_string(), vec!["cosine".to_string(), "dtw".to_string()]);
    map.insert("raw".to_string(), vec!["euclidean".to_string()]);
    let orderings = Orderings(map);

    assert_eq!(orderings.bases().collect::<Vec<_>>(), vec!["activations", "raw"]);
    let choice = orderings.select_base("activations").unwrap();
    assert_eq!(choice.method, "cosine");
    assert!(orderings.select_method("activations", "dtw").is_some());
    assert!(orderings.select_method("raw", "dtw").is_none());
    assert!(orderings.select_base("labels").is_none());

    let q = Query::range(0, 100).with_ordering(choice);
    assert_eq!(q.ordering_base, "activations");
    assert_eq!(q.sample_count(), 100);
}

#[test]
fn test_query_string_fields() {
    let q = Query {
        start: 5,
        end: 50,
        stage: "test".to_string(),
        ordering_base: "raw".to_string(),
        ordering_method: "euclidean".to_string(),
        attribution_method: "Saliency".to_string(),
    };
    let json = serde_json::to_value(&q).unwrap();
    for key in ["start", "end", "stage", "ordering_base", "ordering_method", "attribution_method"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn test_config_layout_params_follow_margins() {
    let config = VizConfig::from_json_str(r#"{"inter_margin": 4.0, "hist_fraction": 0.2}"#).unwrap();
    let params = config.layout_params(640.0);
    assert_eq!(params.total_extent, 640.0);
    assert_eq!(params.inter_margin, 4.0);
    assert_eq!(params.intra_margin, 2.0);
    assert_eq!(params.hist_fraction, 0.2);
    assert!(VizConfig::from_json_str("not json").unwrap_err().is_config());
}
