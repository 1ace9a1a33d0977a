use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
    assert!(FrameRange::from_frames(5, 2).is_empty());
}

#[test]
fn clip_to_bounds() {
    let bounds = FrameRange::from_frames(0, 10);
    assert_eq!(
        FrameRange::from_frames(5, 20).clip_to(bounds),
        FrameRange::from_frames(5, 10)
    );
    assert!(FrameRange::from_frames(12, 20).clip_to(bounds).is_empty());
}

#[test]
fn shift_saturates_at_zero() {
    let r = FrameRange::from_frames(3, 8).shift(-5);
    assert_eq!(r, FrameRange::from_frames(0, 3));
}

#[test]
fn display_is_half_open() {
    assert_eq!(FrameRange::from_frames(0, 25).to_string(), "[0,25)");
}

#[test]
fn fps_validation_and_seconds() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(25, 0).is_err());
    let fps = Fps::new(25, 1).unwrap();
    assert!((fps.frames_to_secs(50) - 2.0).abs() < 1e-12);
}
