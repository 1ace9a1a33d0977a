use super::*;
use crate::session::placement::Locator;

const JSON: &str = r#"{
  "duration": 30,
  "output": {"pipe": "master", "sink": "audio:48000:stereo:f32"},
  "assets": {
    "music": {"native": "audio:48000:stereo:f32", "params": [{"name": "gain", "domain": "float", "default": 1.0}]},
    "film": {"native": "video:1920x1080:25p:rgb8"}
  },
  "placements": [
    {"id": "m", "asset": "music", "at": {"start": 0}, "duration": 20}
  ]
}"#;

fn builder(opts: BuildOpts) -> Builder {
    Builder::with_registry(Arc::new(StreamTypeRegistry::new()), opts)
}

#[test]
fn publishes_engine_and_model_port() {
    let b = builder(BuildOpts::default());
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    assert!(b.current().is_none());

    let published = b.build_and_publish(&snap).unwrap();
    let pipe = snap.output().pipe;
    assert!(b.ports().is_registered(pipe));
    assert_eq!(b.port(pipe).unwrap(), published.port);
    assert_eq!(published.port.stream_type, *published.engine.sink());
    assert!(Arc::ptr_eq(&b.current().unwrap().engine, &published.engine));
}

#[test]
fn unchanged_session_keeps_the_published_engine() {
    let b = builder(BuildOpts::default());
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let first = b.build_and_publish(&snap).unwrap();
    let second = b.build_and_publish(&snap).unwrap();
    assert!(Arc::ptr_eq(&first.engine, &second.engine));

    let moved = snap
        .instantiate("extra", "music", Locator::at(25), 5)
        .unwrap();
    let third = b.build_and_publish(&snap.with_placement(moved)).unwrap();
    assert!(!Arc::ptr_eq(&first.engine, &third.engine));
    assert_ne!(first.engine_fingerprint, third.engine_fingerprint);
}

#[test]
fn readded_placement_republishes_with_fresh_parameters() {
    let b = builder(BuildOpts::default());
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let first = b.build_and_publish(&snap).unwrap();

    let id = crate::foundation::ids::PlacementId::from_label("m");
    let readded = snap
        .without_placement(id)
        .with_placement(snap.instantiate("m", "music", Locator::at(0), 20).unwrap());
    let second = b.build_and_publish(&readded).unwrap();
    assert_eq!(first.engine_fingerprint, second.engine_fingerprint);
    assert!(!Arc::ptr_eq(&first.engine, &second.engine));
}

#[test]
fn failed_build_keeps_previous_publication() {
    let b = builder(BuildOpts::default());
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let first = b.build_and_publish(&snap).unwrap();

    let film = snap.instantiate("f", "film", Locator::at(5), 5).unwrap();
    let err = b.build_and_publish(&snap.with_placement(film)).unwrap_err();
    assert!(matches!(err, BuildError::Unsupported { segment: 1, .. }));

    let current = b.current().unwrap();
    assert!(Arc::ptr_eq(&current.engine, &first.engine));
    assert!(b.ports().is_registered(snap.output().pipe));
    assert!(b.ports().contains(snap.output().pipe));
}

#[test]
fn partial_option_skips_unsupported_segments() {
    let b = builder(BuildOpts {
        partial: true,
        ..BuildOpts::default()
    });
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let film = snap.instantiate("f", "film", Locator::at(5), 5).unwrap();
    let published = b.build_and_publish(&snap.with_placement(film)).unwrap();
    assert_eq!(published.engine.skipped(), [1]);
}

#[test]
fn preroll_requires_a_publication() {
    let b = builder(BuildOpts::default());
    assert!(b.preroll(FrameRange::from_frames(0, 5)).is_err());
    b.build_and_publish(&SessionSnapshot::from_json(JSON).unwrap())
        .unwrap();
    let frames = b.preroll(FrameRange::from_frames(0, 5)).unwrap();
    assert_eq!(frames.len(), 5);
    assert!(frames.iter().all(|f| f.values[0].defaulted));
}

#[test]
fn opts_load_from_json() {
    let opts = BuildOpts::from_json(r#"{"partial": true, "preroll": {"parallel": true, "threads": 2}}"#)
        .unwrap();
    assert!(opts.partial);
    assert!(opts.preroll.parallel);
    assert_eq!(opts.preroll.threads, Some(2));
    assert_eq!(opts.preroll.chunk_size, 64);
    assert!(BuildOpts::from_json(r#"{"partal": true}"#).is_err());
}

#[test]
fn concurrent_builds_publish_consistently() {
    let b = builder(BuildOpts::default());
    let snap = SessionSnapshot::from_json(JSON).unwrap();
    let longer = snap.with_placement(snap.instantiate("tail", "music", Locator::at(20), 10).unwrap());

    std::thread::scope(|s| {
        for i in 0..8 {
            let (b, snap) = (&b, if i % 2 == 0 { &snap } else { &longer });
            s.spawn(move || {
                for _ in 0..10 {
                    b.build_and_publish(snap).unwrap();
                }
            });
        }
    });

    let pipe = snap.output().pipe;
    let current = b.current().unwrap();
    assert!(b.ports().is_registered(pipe));
    assert!(b.ports().contains(pipe));
    assert_eq!(b.port(pipe).unwrap(), current.port);
    assert_eq!(current.engine_fingerprint, fingerprint_engine(&current.engine));
}
