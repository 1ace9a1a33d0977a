use super::*;

fn d(s: &str) -> StreamDescriptor {
    s.parse().unwrap()
}

#[test]
fn identical_descriptors_convert_for_free() {
    let c = StructuralConversions
        .plan(&d("audio:48000:stereo:f32"), &d("audio:48000:stereo:f32"))
        .unwrap();
    assert!(c.is_identity());
    assert_eq!(c.cost(), 0);
    assert_eq!(c.to_string(), "identity");
}

#[test]
fn audio_steps_accumulate_cost() {
    let c = StructuralConversions
        .plan(&d("audio:44100:mono:s16"), &d("audio:48000:stereo:f32"))
        .unwrap();
    assert_eq!(c.steps().len(), 3);
    assert_eq!(c.cost(), 2 + 4 + 8);
    assert_eq!(
        c.to_string(),
        "requantize(S16->F32)+remix(1ch->2ch)+resample(44100->48000)"
    );
}

#[test]
fn video_deinterlace_scale_and_pixel_convert() {
    let c = StructuralConversions
        .plan(
            &d("video:720x576:25i:yuv420p"),
            &d("video:1920x1080:25p:rgb8"),
        )
        .unwrap();
    assert_eq!(
        c.steps(),
        &[
            ConversionStep::Deinterlace,
            ConversionStep::Scale {
                from: (720, 576),
                to: (1920, 1080)
            },
            ConversionStep::PixelConvert {
                from: PixelFormat::Yuv420p,
                to: PixelFormat::Rgb8
            },
        ]
    );
    assert_eq!(c.cost(), 10 + 16 + 4);
}

#[test]
fn origin_only_difference_is_a_rewrap() {
    let c = StructuralConversions
        .plan(&d("other:midi@alsa"), &d("other:midi"))
        .unwrap();
    assert_eq!(c.steps(), &[ConversionStep::Rewrap]);
    assert_eq!(c.cost(), 1);
}

#[test]
fn cross_kind_and_foreign_other_types_do_not_convert() {
    assert!(
        StructuralConversions
            .plan(&d("audio:48000:stereo:f32"), &d("video:1920x1080:25p:rgb8"))
            .is_none()
    );
    assert!(
        StructuralConversions
            .plan(&d("other:midi"), &d("other:subtitle"))
            .is_none()
    );
}
