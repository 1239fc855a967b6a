use crate::traits;
use rand::SeedableRng as _;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::SmallRng;

const VERIFY_RANDOM_COUNT: usize = if cfg!(miri) { 40 } else { 100_000 };

// Formats value through f, parses the result back, and reports the length
// of the formatting and whether the round trip was exact.
fn verify_value<T>(value: T, f: crate::F<T>) -> (usize, bool)
where
    T: traits::Float,
{
    let mut len = 0;
    let mut ok = false;

    f(value, &mut |actual| {
        let Ok(roundtrip) = actual.parse::<T>() else {
            eprintln!("Error: failed to parse {actual}");
            return;
        };

        if value != roundtrip {
            eprintln!("Error: roundtrip fail {value:?} -> {actual:?} -> {roundtrip:?}");
            return;
        }

        len = actual.len();
        ok = true;
    });

    (len, ok)
}

fn verify<T>(f: crate::F<T>, name: &str, boundary: &[T])
where
    T: traits::Float,
    StandardUniform: Distribution<T::Bits>,
{
    print!("Verifying {name:20} ... ");

    let mut fail = 0;
    for &value in boundary {
        fail += usize::from(!verify_value(value, f).1);
    }

    let mut r = SmallRng::seed_from_u64(1);

    let mut len_sum = 0u64;
    let mut len_max = 0usize;
    for _i in 0..VERIFY_RANDOM_COUNT {
        let mut d;
        while {
            d = T::from_bits(StandardUniform.sample(&mut r));
            !d.is_finite()
        } {}
        let (len, ok) = verify_value(d, f);
        fail += usize::from(!ok);
        len_sum += len as u64;
        len_max = usize::max(len_max, len);
    }

    assert!(fail == 0, "{name}: {fail} verification failures");

    let len_avg = len_sum as f64 / VERIFY_RANDOM_COUNT as f64;
    println!("OK. Length Avg = {len_avg:.3}, Max = {len_max}");
}

#[test]
fn verify_all_f64() {
    // Boundary and simple cases
    let boundary = [
        0.0,
        0.1,
        0.12,
        0.123,
        0.1234,
        1.2345,
        1.0 / 3.0,
        2.0 / 3.0,
        10.0 / 3.0,
        20.0 / 3.0,
        f64::MIN,
        f64::MAX,
        f64::MIN_POSITIVE,
        5e-324,
    ];
    for imp in crate::IMPLS {
        if imp.name != "null" {
            verify(imp.f64, imp.name, &boundary);
        }
    }
}

#[test]
fn verify_all_f32() {
    let boundary = [
        0.0f32,
        0.1,
        0.12,
        0.123,
        1.2345,
        1.0 / 3.0,
        f32::MIN,
        f32::MAX,
        f32::MIN_POSITIVE,
        1e-45,
    ];
    for imp in crate::IMPLS {
        if imp.name != "null" {
            verify(imp.f32, imp.name, &boundary);
        }
    }
}
