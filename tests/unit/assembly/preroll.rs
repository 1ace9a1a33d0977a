use super::*;
use crate::assembly::assembler::Assembler;
use crate::fixture::build::Fixture;
use crate::path::manager::PathManager;
use crate::session::snapshot::SessionSnapshot;
use crate::stream::registry::StreamTypeRegistry;

const JSON: &str = r#"{
  "duration": 40,
  "output": {"pipe": "master", "sink": "audio:48000:stereo:f32"},
  "assets": {
    "music": {
      "native": "audio:48000:stereo:f32",
      "params": [
        {"name": "gain", "domain": "float", "default": 1.0},
        {"name": "mute", "domain": "toggle"}
      ]
    },
    "voice": {
      "native": "audio:44100:mono:s16",
      "params": [{"name": "pitch", "domain": "int"}]
    }
  },
  "placements": [
    {"id": "m", "asset": "music", "at": {"start": 0}, "duration": 20,
     "automation": {"gain": {"keys": [{"frame": 0, "value": 0.0}, {"frame": 20, "value": 1.0}]}}},
    {"id": "v", "asset": "voice", "at": {"start": 10}, "duration": 20, "automation": {"pitch": 3}}
  ]
}"#;

fn engine() -> RenderEngine {
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let reg = StreamTypeRegistry::new();
    let fixture = PathManager::new(&reg).resolve(&Fixture::build(&snap, &reg).unwrap());
    Assembler::default().build(&fixture).unwrap()
}

#[test]
fn samples_parameters_feeding_each_frame() {
    let e = engine();
    let frames = preroll(&e, FrameRange::from_frames(0, 40), &PrerollOpts::default()).unwrap();
    assert_eq!(frames.len(), 40);

    let m = PlacementId::from_label("m");
    let v = PlacementId::from_label("v");

    // Frame 5: only the music placement.
    let f5 = &frames[5];
    assert_eq!(f5.values.len(), 1);
    assert_eq!(f5.values[0].name, "gain");
    assert_eq!(f5.values[0].value, ParamValue::Float(0.25));
    assert!(!f5.values[0].defaulted);
    assert_eq!(f5.unbound, [(m, "mute".to_owned())]);

    // Frame 15: both placements feed the composite.
    let names: Vec<_> = frames[15].values.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["gain", "pitch"]);
    assert_eq!(frames[15].values[1].owner, v);
    assert_eq!(frames[15].values[1].value, ParamValue::Int(3));

    // Frame 35 is a gap.
    assert!(frames[35].values.is_empty());
    assert!(frames[35].unbound.is_empty());
}

#[test]
fn unbound_parameters_fall_back_to_defaults() {
    let e = engine();
    let m = PlacementId::from_label("m");
    let gain = e
        .stages()
        .iter()
        .flat_map(|s| &s.params)
        .find(|b| b.param.owner() == m && b.param.name() == "gain")
        .unwrap();
    assert!(gain.param.unbind());

    let frames = preroll(&e, FrameRange::from_frames(5, 6), &PrerollOpts::default()).unwrap();
    assert_eq!(frames[0].frame, FrameIndex(5));
    assert_eq!(frames[0].values[0].value, ParamValue::Float(1.0));
    assert!(frames[0].values[0].defaulted);
}

#[test]
fn parallel_matches_sequential() {
    let e = engine();
    let range = FrameRange::from_frames(0, 40);
    let seq = preroll(&e, range, &PrerollOpts::default()).unwrap();
    let par = preroll(
        &e,
        range,
        &PrerollOpts {
            parallel: true,
            chunk_size: 7,
            threads: Some(3),
        },
    )
    .unwrap();
    assert_eq!(seq, par);
}

#[test]
fn range_is_clipped_and_zero_threads_rejected() {
    let e = engine();
    let frames = preroll(&e, FrameRange::from_frames(38, 100), &PrerollOpts::default()).unwrap();
    assert_eq!(frames.len(), 2);
    assert!(preroll(&e, FrameRange::from_frames(50, 60), &PrerollOpts::default())
        .unwrap()
        .is_empty());

    let err = preroll(
        &e,
        FrameRange::from_frames(0, 4),
        &PrerollOpts {
            parallel: true,
            threads: Some(0),
            ..PrerollOpts::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, RenderPathError::Validation(_)));
}

#[test]
fn oversized_chunks_cover_a_late_range() {
    let e = engine();
    let range = FrameRange::from_frames(3, 8);
    let seq = preroll(&e, range, &PrerollOpts::default()).unwrap();
    let par = preroll(
        &e,
        range,
        &PrerollOpts {
            parallel: true,
            chunk_size: usize::MAX,
            threads: Some(1),
        },
    )
    .unwrap();
    assert_eq!(par.len(), 5);
    assert_eq!(par[0].frame, FrameIndex(3));
    assert_eq!(seq, par);
}
