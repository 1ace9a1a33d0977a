use super::*;
use crate::param::value::ParamDomain;

fn key<V>(frame: u64, value: V) -> Key<V> {
    Key {
        frame: FrameIndex(frame),
        value,
        ease: Ease::Linear,
    }
}

#[test]
fn automation_interpolates_and_holds_outside_keys() {
    let a = Automation::new(vec![key(10, 0.0), key(20, 1.0)], Interp::Linear).unwrap();
    assert_eq!(a.sample(FrameIndex(0)), 0.0);
    assert_eq!(a.sample(FrameIndex(15)), 0.5);
    assert_eq!(a.sample(FrameIndex(20)), 1.0);
    assert_eq!(a.sample(FrameIndex(99)), 1.0);
}

#[test]
fn hold_mode_steps() {
    let a = Automation::new(vec![key(0, 1_i64), key(10, 5)], Interp::Hold).unwrap();
    assert_eq!(a.sample(FrameIndex(9)), 1);
    assert_eq!(a.sample(FrameIndex(10)), 5);
}

#[test]
fn ease_shapes_the_segment() {
    let mut k0 = key(0, 0.0);
    k0.ease = Ease::EaseIn;
    let a = Automation::new(vec![k0, key(10, 1.0)], Interp::Linear).unwrap();
    assert!((a.sample(FrameIndex(5)) - 0.25).abs() < 1e-12);
    assert_eq!(Ease::EaseInOut.apply(0.5), 0.5);
    assert_eq!(Ease::EaseOut.apply(2.0), 1.0);
}

#[test]
fn automation_validation() {
    assert!(Automation::<f64>::new(vec![], Interp::Linear).is_err());
    assert!(Automation::new(vec![key(5, 0.0), key(1, 1.0)], Interp::Linear).is_err());
}

#[test]
fn function_source_is_sampled_per_frame() {
    let src = ParamSource::function(|t: FrameIndex| t.0 as f64 * 0.5);
    assert_eq!(src.sample(FrameIndex(4)), 2.0);
    assert_eq!(src.sample(FrameIndex(4)), 2.0);
}

#[test]
fn source_def_parses_constants_and_curves() {
    let c: ParamSourceDef = serde_json::from_str("5").unwrap();
    assert_eq!(c, ParamSourceDef::Constant(ParamValue::Int(5)));
    // Int widens into the float domain.
    let src = c.to_source::<f64>("gain").unwrap();
    assert_eq!(src.sample(FrameIndex(0)), 5.0);

    let curve: ParamSourceDef = serde_json::from_str(
        r#"{"keys": [{"frame": 0, "value": 0.0}, {"frame": 10, "value": 1.0, "ease": "ease_out"}], "interp": "hold"}"#,
    )
    .unwrap();
    let src = curve.to_source::<f64>("mix").unwrap();
    assert_eq!(src.sample(FrameIndex(5)), 0.0);
    assert_eq!(src.sample(FrameIndex(10)), 1.0);
}

#[test]
fn source_def_reports_domain_mismatch() {
    let def = ParamSourceDef::Constant(ParamValue::Float(0.5));
    let err = def.to_source::<bool>("bypass").unwrap_err();
    match err {
        RenderPathError::Param(ParamError::DomainMismatch {
            name,
            expected,
            actual,
        }) => {
            assert_eq!(name, "bypass");
            assert_eq!(expected, ParamDomain::Toggle);
            assert_eq!(actual, ParamDomain::Float);
        }
        other => panic!("unexpected error: {other}"),
    }
}
