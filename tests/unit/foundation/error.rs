use super::*;
use crate::stream::descriptor::StreamDescriptor;
use crate::stream::registry::StreamTypeRegistry;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RenderPathError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        RenderPathError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RenderPathError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn unsupported_names_interval_and_types() {
    let reg = StreamTypeRegistry::new();
    let a = reg.classify(&"audio:48000:stereo:f32".parse::<StreamDescriptor>().unwrap());
    let v = reg.classify(&"video:1920x1080:25p:rgb8".parse::<StreamDescriptor>().unwrap());
    let err = BuildError::Unsupported {
        segment: 2,
        range: FrameRange::from_frames(10, 20),
        types: vec![a, v],
    };
    let msg = err.to_string();
    assert!(msg.contains("segment #2"));
    assert!(msg.contains("[10,20)"));
    assert!(msg.contains("audio:48000:stereo:f32"));
    assert!(msg.contains("video:1920x1080:25p:rgb8"));
}

#[test]
fn param_and_build_errors_convert_transparently() {
    let e: RenderPathError = ParamError::UnboundParameter {
        owner: PlacementId(1),
        name: "gain".to_string(),
    }
    .into();
    assert!(e.to_string().contains("'gain'"));
    let e: RenderPathError = BuildError::Unresolved { segment: 0 }.into();
    assert!(e.to_string().contains("segment #0"));
}
