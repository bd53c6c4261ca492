use super::*;
use crate::foundation::core::Rgb8;

const NEG: Rgb8 = Rgb8::new(0xfc, 0x8d, 0x59);
const MID: Rgb8 = Rgb8::new(0xff, 0xff, 0xbf);
const POS: Rgb8 = Rgb8::new(0x91, 0xbf, 0xdb);

fn diverging(lo: f64, hi: f64) -> LinearScale<Rgb8> {
    LinearScale::new(ScaleId(1), vec![lo, 0.0, hi], vec![NEG, MID, POS]).unwrap()
}

#[test]
fn maps_and_extrapolates_two_stop_scales() {
    let y = LinearScale::new(ScaleId(7), vec![-5.0, 15.0], vec![300.0, 0.0]).unwrap();
    assert_eq!(y.map(-5.0), 300.0);
    assert_eq!(y.map(15.0), 0.0);
    assert_eq!(y.map(0.0), 225.0);
    assert_eq!(y.map(35.0), -300.0);
}

#[test]
fn zero_maps_to_neutral_regardless_of_skew() {
    for (lo, hi) in [(-1.0, 1.0), (-1.0, 1_000_000.0), (-9e6, 0.5), (0.0, 12.0), (-4.0, 0.0)] {
        assert_eq!(diverging(lo, hi).map(0.0), MID, "domain [{lo}, 0, {hi}]");
    }
    assert_eq!(diverging(0.0, 0.0).map(0.0), MID);
}

#[test]
fn diverging_endpoints_hit_control_colors() {
    let c = diverging(-20.0, 80.0);
    assert_eq!(c.map(-20.0), NEG);
    assert_eq!(c.map(80.0), POS);
    assert_eq!(c.map(-10.0), Rgb8::lerp(&NEG, &MID, 0.5));
    assert_eq!(c.map(40.0), Rgb8::lerp(&MID, &POS, 0.5));
}

#[test]
fn degenerate_domain_maps_to_range_start() {
    let y = LinearScale::new(ScaleId(2), vec![0.0, 0.0], vec![300.0, 2.0]).unwrap();
    assert_eq!(y.map(0.0), 300.0);
    assert_eq!(y.map(5.0), 300.0);
}

#[test]
fn update_keeps_identity_and_bumps_revision() {
    let mut y = LinearScale::new(ScaleId(3), vec![0.0, 1.0], vec![0.0, 10.0]).unwrap();
    y.update(vec![-2.0, 2.0], vec![0.0, 10.0]).unwrap();
    assert_eq!(y.id(), ScaleId(3));
    assert_eq!(y.revision(), 1);
    assert_eq!(y.map(0.0), 5.0);
}

#[test]
fn rejects_bad_domains() {
    assert!(LinearScale::new(ScaleId(1), vec![1.0], vec![0.0]).is_err());
    assert!(LinearScale::new(ScaleId(1), vec![1.0, 0.0], vec![0.0, 1.0]).is_err());
    assert!(LinearScale::new(ScaleId(1), vec![0.0, f64::NAN], vec![0.0, 1.0]).is_err());
    assert!(LinearScale::new(ScaleId(1), vec![0.0, 1.0], vec![0.0]).is_err());
}

#[test]
fn ticks_are_round() {
    let y = LinearScale::new(ScaleId(1), vec![-5.0, 10.0], vec![0.0, 1.0]).unwrap();
    assert_eq!(y.ticks(10), vec![-4.0, -2.0, 0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);

    let y = LinearScale::new(ScaleId(1), vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
    assert_eq!(y.ticks(5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

    let flat = LinearScale::new(ScaleId(1), vec![3.0, 3.0], vec![0.0, 1.0]).unwrap();
    assert_eq!(flat.ticks(10), vec![3.0]);
}

#[test]
fn tick_labels_group_thousands() {
    assert_eq!(format_tick(-250_000.0, Some(50_000.0)), "-250,000");
    assert_eq!(format_tick(1_234.5, Some(0.5)), "1,234.5");
    assert_eq!(format_tick(0.25, Some(0.05)), "0.25");
    assert_eq!(format_tick(-0.0001, Some(1.0)), "0");
    assert_eq!(format_tick(999.0, None), "999");
}
