use dense_pixel_viz::data_types::{
    DetailRequest, ImageKind, MainResponse, PanelKind, PanelRequestBody, RenderedImage, Settings,
    SettingsPatch,
};
use dense_pixel_viz::VizError;

#[test]
fn test_data_mode_response() {
    let resp: MainResponse = serde_json::from_str(
        r#"{
            "data": {"raw": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], "labels_pred": [[0.1, 0.9], [2.0, -1.0]]},
            "meta": {
                "cur_ordering_base": "raw",
                "summary_data": {"raw": [0.5, 0.25]},
                "ordering_idc": [7, 3],
                "data_lengths": [{"panel": "raw", "data": 3}, {"panel": "labels", "data": 2}]
            }
        }"#,
    )
    .unwrap();
    let data = resp.data.unwrap();
    assert_eq!(data.sample_count(), 2);
    assert_eq!(data.data(PanelKind::Raw).unwrap().cols(), 3);
    assert!(data.hist(PanelKind::Raw).is_none());
    assert_eq!(data.data(PanelKind::Labels).unwrap().cols(), 2);
    assert_eq!(resp.meta.ordering_idc, vec![7, 3]);
    assert_eq!(resp.meta.summary_for_current_base(), Some(&[0.5, 0.25][..]));
    assert_eq!(resp.meta.data_lengths[0].hist, 0.0);
}

#[test]
fn test_ragged_matrix_is_rejected() {
    let err = serde_json::from_str::<MainResponse>(r#"{"data": {"raw": [[1.0, 2.0], [3.0]]}}"#);
    assert!(err.is_err());
}

#[test]
fn test_body_tracks_visibility_and_resolution() {
    let settings = Settings::default()
        .apply(&SettingsPatch {
            show_attributions_histogram: Some(true),
            show_labels_pred: Some(false),
            ..Default::default()
        })
        .unwrap();
    let body = PanelRequestBody::new(&settings, 1014, 600);
    assert_eq!(body.resolution_width, 1014);
    assert!(body.attributions_histogram);
    assert!(!body.labels_pred);
    assert_eq!(body.attributions_histogram_colormap, "interpolateReds");
}

#[test]
fn test_detail_request_shape() {
    let req = DetailRequest {
        indices: vec![4, 9],
        start: 0.25,
        end: 0.5,
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json, serde_json::json!({"indices": [4, 9], "start": 0.25, "end": 0.5}));
}

#[test]
fn test_image_sniffing() {
    assert_eq!(RenderedImage::from_bytes(vec![0xff, 0xd8, 0xff]).kind, ImageKind::Jpeg);
    assert_eq!(RenderedImage::from_bytes(b"GIF8".to_vec()).kind, ImageKind::Unknown);
    let png = RenderedImage::from_base64("iVBORw0KGgo=").unwrap();
    assert_eq!(png.kind, ImageKind::Png);
    assert_eq!(png.len(), 8);
    assert!(matches!(
        RenderedImage::from_base64("%%%"),
        Err(VizError::Decode { .. })
    ));
}
