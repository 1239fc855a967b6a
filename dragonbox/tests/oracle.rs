//! Cross-check against Ryū: same digits, same decimal point, same length,
//! for a large sample of random bit patterns per width.

use rand::rngs::SmallRng;
use rand::{RngCore as _, SeedableRng as _};

const N: usize = if cfg!(miri) { 40 } else { 200_000 };

// Pulls (digits, decimal point) out of the oracle's rendering, normalized
// to the value being 0.digits × 10^dp.
fn oracle_digits(repr: &str) -> (Vec<u8>, isize) {
    let repr = repr.strip_prefix('-').unwrap_or(repr);
    let (mant, exp) = match repr.split_once(['e', 'E']) {
        Some((mant, exp)) => (mant, exp.parse::<isize>().unwrap()),
        None => (repr, 0),
    };
    let (int, frac) = match mant.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (mant, ""),
    };

    let mut digits: Vec<u8> = int.bytes().chain(frac.bytes()).collect();
    let mut dp = int.len() as isize + exp;
    while digits.first() == Some(&b'0') {
        digits.remove(0);
        dp -= 1;
    }
    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    (digits, dp)
}

#[test]
fn matches_ryu64() {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut oracle = ryu::Buffer::new();

    for _ in 0..N {
        let float = f64::from_bits(rng.next_u64());
        if !float.is_finite() || float == 0.0 {
            continue;
        }

        let (mant, exp, denorm) = dragonbox::unpack64(float);
        let mut dig = [0u8; 17];
        let mut d = dragonbox::Decimal::new(&mut dig);
        dragonbox::shortest64(&mut d, mant, exp, denorm);

        let (digits, dp) = oracle_digits(oracle.format_finite(float));
        assert_eq!(d.digits(), &digits[..], "digits for {float:?}");
        assert_eq!(d.dp(), dp, "decimal point for {float:?}");
        assert_ne!(d.digits().last(), Some(&b'0'), "trailing zero for {float:?}");
    }
}

#[test]
fn matches_ryu32() {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut oracle = ryu::Buffer::new();

    for _ in 0..N {
        let float = f32::from_bits(rng.next_u32());
        if !float.is_finite() || float == 0.0 {
            continue;
        }

        let (mant, exp, denorm) = dragonbox::unpack32(float);
        let mut dig = [0u8; 17];
        let mut d = dragonbox::Decimal::new(&mut dig);
        dragonbox::shortest32(&mut d, mant, exp, denorm);

        let (digits, dp) = oracle_digits(oracle.format_finite(float));
        assert_eq!(d.digits(), &digits[..], "digits for {float:?}");
        assert_eq!(d.dp(), dp, "decimal point for {float:?}");
        assert_ne!(d.digits().last(), Some(&b'0'), "trailing zero for {float:?}");
    }
}
