#![allow(clippy::float_cmp)]

use rand::rngs::SmallRng;
use rand::{RngCore as _, SeedableRng as _};

const N: usize = if cfg!(miri) {
    500
} else if cfg!(debug_assertions) {
    200_000
} else {
    10_000_000
};

#[test]
fn roundtrip64() {
    let mut buffer = dragonbox::Buffer::new();
    let mut rng = SmallRng::from_os_rng();
    let mut fail = 0;

    for _ in 0..N {
        let bits = rng.next_u64();
        let float = f64::from_bits(bits);
        if !float.is_finite() {
            continue;
        }
        let repr = buffer.format_finite(float);
        let matches = repr
            .parse::<f64>()
            .is_ok_and(|roundtrip| roundtrip == float);
        if !matches {
            eprintln!("{float:?} DRAGONBOX={repr}");
            fail += 1;
        }
    }

    assert!(fail == 0, "{fail} mismatches");
}

#[test]
fn roundtrip32() {
    let mut buffer = dragonbox::Buffer::new();
    let mut rng = SmallRng::from_os_rng();
    let mut fail = 0;

    for _ in 0..N {
        let bits = rng.next_u32();
        let float = f32::from_bits(bits);
        if !float.is_finite() {
            continue;
        }
        let repr = buffer.format_finite(float);
        let matches = repr
            .parse::<f32>()
            .is_ok_and(|roundtrip| roundtrip == float);
        if !matches {
            eprintln!("{float:?} DRAGONBOX={repr}");
            fail += 1;
        }
    }

    assert!(fail == 0, "{fail} mismatches");
}
