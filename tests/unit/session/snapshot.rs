use super::*;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::ParamError;
use crate::param::value::ParamValue;

const JSON: &str = r#"{
  "duration": 100,
  "output": {"pipe": "master", "sink": "audio:48000:stereo:f32"},
  "assets": {
    "voice": {
      "native": "audio:44100:mono:s16",
      "params": [
        {"name": "gain", "domain": "float", "default": 1.0},
        {"name": "mute", "domain": "toggle"}
      ]
    }
  },
  "placements": [
    {"id": "v1", "asset": "voice", "at": {"start": 0}, "duration": 20,
     "automation": {"gain": {"keys": [{"frame": 0, "value": 0.0}, {"frame": 10, "value": 1.0}]}}}
  ]
}"#;

#[test]
fn from_def_instantiates_objects_and_binds_automation() {
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    assert_eq!(snap.duration(), Some(100));
    assert_eq!(snap.output().pipe, PipeId::from_label("master"));
    assert_eq!(snap.objects().len(), 1);

    let v1 = snap.object(PlacementId::from_label("v1")).unwrap();
    assert_eq!(snap.catalog().lookup(v1.asset).unwrap().name, "voice");
    let gain = v1.params.get("gain").unwrap();
    assert_eq!(gain.sample(FrameIndex(5)).unwrap(), ParamValue::Float(0.5));
    let mute = v1.params.get("mute").unwrap();
    assert!(matches!(
        mute.sample(FrameIndex(5)),
        Err(ParamError::UnboundParameter { .. })
    ));
}

#[test]
fn from_def_validation() {
    let dup = JSON.replace(
        r#""placements": ["#,
        r#""placements": [{"id": "v1", "asset": "voice", "at": {"start": 50}, "duration": 1},"#,
    );
    assert!(matches!(
        SessionSnapshot::from_json(&dup),
        Err(RenderPathError::Validation(_))
    ));

    let unknown_asset = JSON.replace(r#""asset": "voice""#, r#""asset": "choir""#);
    assert!(SessionSnapshot::from_json(&unknown_asset).is_err());

    let unknown_param = JSON.replace(r#""automation": {"gain""#, r#""automation": {"pan""#);
    assert!(SessionSnapshot::from_json(&unknown_param).is_err());

    let wrong_domain = JSON.replace(
        r#""automation": {"gain": {"keys": [{"frame": 0, "value": 0.0}, {"frame": 10, "value": 1.0}]}}"#,
        r#""automation": {"mute": 0.5}"#,
    );
    assert!(matches!(
        SessionSnapshot::from_json(&wrong_domain),
        Err(RenderPathError::Param(ParamError::DomainMismatch { .. }))
    ));

    let zero_fps = JSON.replace(r#""duration": 100,"#, r#""duration": 100, "fps": {"num": 0, "den": 1},"#);
    assert!(SessionSnapshot::from_json(&zero_fps).is_err());
}

#[test]
fn edits_are_copy_on_write_and_share_parameters() {
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let extra = snap
        .instantiate("v2", "voice", Locator::at(40), 10)
        .unwrap();
    let edited = snap.with_placement(extra);
    assert_eq!(snap.objects().len(), 1);
    assert_eq!(edited.objects().len(), 2);

    let id = PlacementId::from_label("v1");
    let a = snap.object(id).unwrap().params.get("mute").unwrap();
    let b = edited.object(id).unwrap().params.get("mute").unwrap();
    assert!(a.same_instance(b));

    let removed = edited.without_placement(id);
    assert!(removed.object(id).is_none());
    assert_eq!(removed.objects().len(), 1);
    assert!(snap.instantiate("x", "missing", Locator::at(0), 1).is_err());
}

#[test]
fn with_placement_replaces_same_identity() {
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let moved = snap.instantiate("v1", "voice", Locator::at(60), 5).unwrap();
    let edited = snap.with_placement(moved);
    assert_eq!(edited.objects().len(), 1);
    assert_eq!(edited.objects()[0].locator, Locator::at(60));
}
