use super::*;
use crate::foundation::core::Fps;
use crate::session::catalog::{AssetCatalog, AssetLookup};
use crate::session::placement::Locator;
use crate::session::snapshot::{MediaObject, OutputSpec};
use crate::stream::descriptor::{ChannelLayout, SampleFormat, StreamDescriptor};

fn stereo() -> StreamDescriptor {
    StreamDescriptor::audio(48_000, ChannelLayout::Stereo, SampleFormat::F32)
}

fn session(duration: Option<u64>, placements: &[(&str, u64, u64)]) -> SessionSnapshot {
    let mut catalog = AssetCatalog::new();
    catalog.insert("tone", stereo(), vec![]).unwrap();
    let asset = catalog.find("tone").unwrap().clone();
    let mut snap = SessionSnapshot::new(
        Arc::new(catalog),
        Fps::default(),
        OutputSpec::new("master", stereo()),
    )
    .with_duration(duration);
    for (label, start, len) in placements {
        snap = snap.with_placement(MediaObject::new(label, &asset, Locator::at(*start), *len));
    }
    snap
}

fn layout(f: &Fixture) -> Vec<(u64, u64, Vec<String>)> {
    f.segments()
        .iter()
        .map(|s| {
            (
                s.range.start.0,
                s.range.end.0,
                s.placements.iter().map(|p| p.label.to_string()).collect(),
            )
        })
        .collect()
}

fn assert_covers(f: &Fixture) {
    let mut at = 0;
    for (i, seg) in f.segments().iter().enumerate() {
        assert_eq!(seg.index, i);
        assert_eq!(seg.range.start.0, at, "segments must be contiguous");
        assert!(seg.range.end.0 > seg.range.start.0, "segments must be non-empty");
        at = seg.range.end.0;
    }
    assert_eq!(at, f.extent().0);
}

#[test]
fn empty_session_is_one_gap() {
    let f = Fixture::build(&session(Some(50), &[]), &StreamTypeRegistry::new()).unwrap();
    assert_eq!(layout(&f), [(0, 50, vec![])]);
    assert!(f.segments()[0].is_gap());
    assert!(!f.is_resolved());
}

#[test]
fn overlaps_split_into_maximal_segments() {
    let snap = session(Some(40), &[("a", 0, 15), ("b", 10, 20)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    assert_eq!(
        layout(&f),
        [
            (0, 10, vec!["a".to_owned()]),
            (10, 15, vec!["a".to_owned(), "b".to_owned()]),
            (15, 30, vec!["b".to_owned()]),
            (30, 40, vec![]),
        ]
    );
    assert_covers(&f);
    // Placements keep their whole range; only the segment is cut.
    assert_eq!(f.segments()[1].placements[0].range, FrameRange::from_frames(0, 15));
}

#[test]
fn extent_defaults_to_last_end_and_clips() {
    let snap = session(None, &[("a", 5, 10)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    assert_eq!(f.extent(), FrameIndex(15));
    assert_eq!(layout(&f), [(0, 5, vec![]), (5, 15, vec!["a".to_owned()])]);

    let snap = session(Some(8), &[("a", 5, 10), ("late", 20, 5)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    assert_eq!(layout(&f), [(0, 5, vec![]), (5, 8, vec!["a".to_owned()])]);
    assert_eq!(f.segments()[1].placements[0].range, FrameRange::from_frames(5, 8));
}

#[test]
fn zero_length_placements_join_the_containing_segment() {
    let snap = session(Some(20), &[("a", 0, 10), ("blip", 4, 0)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    assert_eq!(
        layout(&f),
        [
            (0, 10, vec!["a".to_owned(), "blip".to_owned()]),
            (10, 20, vec![]),
        ]
    );
}

#[test]
fn back_to_back_placements_stay_separate_segments() {
    let snap = session(Some(30), &[("a", 0, 10), ("b", 10, 10), ("blip", 15, 0), ("c", 20, 10)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    assert_eq!(
        layout(&f),
        [
            (0, 10, vec!["a".to_owned()]),
            (10, 20, vec!["b".to_owned(), "blip".to_owned()]),
            (20, 30, vec!["c".to_owned()]),
        ]
    );
    for pair in f.segments().windows(2) {
        assert!(!pair[0].placements.iter().map(|p| p.id).eq(pair[1].placements.iter().map(|p| p.id)));
    }
}

#[test]
fn identical_start_orders_by_placement_id() {
    let snap = session(Some(10), &[("x", 0, 10), ("y", 0, 10)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    let ids: Vec<_> = f.segments()[0].placements.iter().map(|p| p.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn build_is_idempotent() {
    let snap = session(None, &[("a", 0, 15), ("b", 10, 20), ("c", 40, 3)]);
    let registry = StreamTypeRegistry::new();
    let f1 = Fixture::build(&snap, &registry).unwrap();
    let f2 = Fixture::build(&snap, &registry).unwrap();
    assert_eq!(f1, f2);
    assert_eq!(f1.dump(), f2.dump());
    assert_covers(&f1);
}

#[test]
fn segment_lookup_by_frame() {
    let snap = session(Some(40), &[("a", 0, 15), ("b", 10, 20)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    assert_eq!(f.segment_at(FrameIndex(0)).unwrap().index, 0);
    assert_eq!(f.segment_at(FrameIndex(10)).unwrap().index, 1);
    assert_eq!(f.segment_at(FrameIndex(39)).unwrap().index, 3);
    assert!(f.segment_at(FrameIndex(40)).is_none());
}

#[test]
fn removing_and_readding_a_placement_restores_segments() {
    let snap = session(Some(30), &[("a", 0, 10), ("b", 10, 10)]);
    let registry = StreamTypeRegistry::new();
    let before = Fixture::build(&snap, &registry).unwrap();

    let b = snap.object(PlacementId::from_label("b")).unwrap().clone();
    let without = snap.without_placement(b.id);
    let dissolved = Fixture::build(&without, &registry).unwrap();
    assert_eq!(
        layout(&dissolved),
        [(0, 10, vec!["a".to_owned()]), (10, 30, vec![])]
    );

    let fresh = without
        .instantiate("b", "tone", Locator::at(10), 10)
        .unwrap();
    let restored = Fixture::build(&without.with_placement(fresh), &registry).unwrap();
    assert_eq!(restored, before);
}

#[test]
fn dump_lists_segments_and_placements() {
    let snap = session(Some(20), &[("a", 0, 10)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    let dump = f.dump();
    assert!(dump.starts_with("Fixture\nextent: 20\nsink: audio:48000:stereo:f32\nsegments: 2\n"));
    assert!(dump.contains("  #0 [0,10) unresolved\n"));
    assert!(dump.contains("'a' [0,10) audio:48000:stereo:f32\n"));
    assert!(dump.contains("  #1 [10,20) unresolved\n"));
}

#[test]
fn params_are_shared_with_the_session() {
    let snap = session(Some(10), &[("a", 0, 10)]);
    let f = Fixture::build(&snap, &StreamTypeRegistry::new()).unwrap();
    let id = PlacementId::from_label("a");
    assert!(f.params_of(id).is_some());
    assert!(f.params_of(PlacementId::from_label("zzz")).is_none());
}
