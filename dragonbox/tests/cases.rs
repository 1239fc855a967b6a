#![allow(clippy::float_cmp)]

fn shortest64(f: f64) -> (String, isize) {
    let (mant, exp, denorm) = dragonbox::unpack64(f);
    let mut dig = [0u8; 17];
    let mut d = dragonbox::Decimal::new(&mut dig);
    dragonbox::shortest64(&mut d, mant, exp, denorm);
    (String::from_utf8(d.digits().to_vec()).unwrap(), d.dp())
}

fn shortest32(f: f32) -> (String, isize) {
    let (mant, exp, denorm) = dragonbox::unpack32(f);
    let mut dig = [0u8; 17];
    let mut d = dragonbox::Decimal::new(&mut dig);
    dragonbox::shortest32(&mut d, mant, exp, denorm);
    (String::from_utf8(d.digits().to_vec()).unwrap(), d.dp())
}

#[test]
fn one() {
    assert_eq!(shortest64(1.0), ("1".to_owned(), 1));
}

#[test]
fn tenth() {
    assert_eq!(shortest64(0.1), ("1".to_owned(), 0));
}

#[test]
fn short_fraction() {
    assert_eq!(shortest64(3.14), ("314".to_owned(), 1));
}

#[test]
fn smallest_denormal() {
    // 2^-1074 prints as 5e-324 and must survive the trip back.
    assert_eq!(shortest64(5e-324), ("5".to_owned(), -323));
    let mut buffer = dragonbox::Buffer::new();
    let repr = buffer.format_finite(5e-324);
    assert_eq!(repr, "5e-324");
    assert_eq!(repr.parse::<f64>().unwrap(), 5e-324);
}

#[test]
fn max_finite() {
    let (digits, dp) = shortest64(f64::MAX);
    assert_eq!(digits, "17976931348623157");
    assert_eq!(digits.len(), 17);
    assert_eq!(dp, 309);
    let mut buffer = dragonbox::Buffer::new();
    let repr = buffer.format_finite(f64::MAX);
    assert_eq!(repr.parse::<f64>().unwrap(), f64::MAX);
}

#[test]
fn tenth_f32() {
    assert_eq!(shortest32(0.1), ("1".to_owned(), 0));
}

#[test]
fn max_finite_f32() {
    assert_eq!(shortest32(f32::MAX), ("34028235".to_owned(), 39));
}

#[test]
fn power_of_two_boundary() {
    // Exactly the implicit-one significand, where the rounding interval
    // is lopsided.
    assert_eq!(shortest64(2.0), ("2".to_owned(), 1));
    assert_eq!(shortest64(1024.0), ("1024".to_owned(), 4));
    assert_eq!(shortest64(f64::MIN_POSITIVE), ("22250738585072014".to_owned(), -307));
}

#[test]
fn zero() {
    let (mant, exp, denorm) = dragonbox::unpack64(0.0);
    assert_eq!(mant, 0);
    assert!(denorm);
    let mut dig = [0u8; 17];
    let mut d = dragonbox::Decimal::new(&mut dig);
    dragonbox::shortest64(&mut d, mant, exp, denorm);
    assert_eq!(d.nd(), 0);
    assert_eq!(d.dp(), 0);

    let mut buffer = dragonbox::Buffer::new();
    assert_eq!(buffer.format_finite(0.0), "0.0");
    assert_eq!(buffer.format_finite(-0.0), "-0.0");
}

#[test]
fn surface() {
    let mut buffer = dragonbox::Buffer::new();
    assert_eq!(buffer.format_finite(1.0), "1e+00");
    assert_eq!(buffer.format_finite(0.1), "1e-01");
    assert_eq!(buffer.format_finite(3.14), "3.14e+00");
    assert_eq!(buffer.format_finite(-2.5), "-2.5e+00");
    assert_eq!(
        buffer.format_finite(1.7976931348623157e308),
        "1.7976931348623157e+308"
    );
    assert_eq!(buffer.format_finite(0.1f32), "1e-01");
}
