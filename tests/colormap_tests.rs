use dense_pixel_viz::colormap::{to_packed_color, Colormap, PackedColor};
use dense_pixel_viz::VizError;

#[test]
fn test_resolve_is_case_insensitive() {
    assert_eq!(Colormap::resolve("InterpolateViridis").unwrap(), Colormap::Viridis);
    assert_eq!(Colormap::resolve("  PuOr ").unwrap(), Colormap::PuOr);
    assert_eq!(Colormap::resolve("interpolateCoolwarm").unwrap(), Colormap::Coolwarm);
    assert_eq!("magma".parse::<Colormap>().unwrap(), Colormap::Magma);
}

#[test]
fn test_unknown_name_is_a_config_error() {
    let err = Colormap::resolve("interpolateSpectral").unwrap_err();
    assert!(err.is_config());
    assert_eq!(
        err,
        VizError::UnknownColormap {
            name: "interpolateSpectral".to_string()
        }
    );
}

#[test]
fn test_packed_color_is_order_independent() {
    let probes = [0.0, 0.13, 0.5, 0.77, 1.0];
    let forward: Vec<_> = Colormap::ALL
        .iter()
        .flat_map(|c| probes.iter().map(move |&t| to_packed_color(*c, t)))
        .collect();
    let mut backward: Vec<_> = Colormap::ALL
        .iter()
        .rev()
        .flat_map(|c| probes.iter().rev().map(move |&t| to_packed_color(*c, t)))
        .collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn test_packed_color_channels() {
    let c = PackedColor::from_rgb(0x12, 0xab, 0xef);
    assert_eq!(c.0, 0x12abef);
    assert_eq!((c.r(), c.g(), c.b()), (0x12, 0xab, 0xef));
    assert_eq!(c.to_hex(), "#12abef");
}

#[test]
fn test_serde_uses_d3_names() {
    let json = serde_json::to_string(&Colormap::RdBu).unwrap();
    assert_eq!(json, "\"interpolateRdBu\"");
    let parsed: Colormap = serde_json::from_str("\"blues\"").unwrap();
    assert_eq!(parsed, Colormap::Blues);
    assert!(serde_json::from_str::<Colormap>("\"nope\"").is_err());
}
