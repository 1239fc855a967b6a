//! Shortest round-trip digit generation, after Junekey Jeon's Dragonbox.
//!
//! A finite float w = fc * 2^e rounds back from any decimal in the interval
//! I whose endpoints sit halfway to w's neighbors. The core scales I by a
//! power of ten so that it has length between 1 and 10, then asks whether a
//! multiple of ten lands inside (one fewer digit) and otherwise picks the
//! integer nearest to the scaled w, breaking ties to even. All interval
//! arithmetic reduces to fixed-point multiplies against a precomputed
//! 128-bit (or 64-bit) ceiling of the scaling power of ten.

use crate::digits;
use crate::pow10;
use crate::wide::{umul96_lower64, umul96_upper64, umul192_lower128, umul192_upper128, HiLo};
use crate::Decimal;

const MANT_BITS_64: u32 = 52;
const MANT_BITS_32: u32 = 23;
const CACHE_BITS_64: u32 = 128;
const CACHE_BITS_32: u32 = 64;

// floor(log10(2^e)) = floor(e * log10(2)).
fn floor_log10_pow2(e: isize) -> isize {
    debug_assert!((-2620..=2620).contains(&e));
    (e * 315653) >> 20
}

// floor(log2(10^e)) = floor(e * log2(10)).
fn floor_log2_pow10(e: isize) -> isize {
    debug_assert!((-1233..=1233).contains(&e));
    (e * 1741647) >> 19
}

// floor(e * log10(2) - log10(4/3)).
fn floor_log10_pow2_minus_log10_4over3(e: isize) -> isize {
    debug_assert!((-2985..=2936).contains(&e));
    (e * 631305 - 261663) >> 21
}

// Integer part of u * phi / 2^128 and whether the fraction is zero.
fn compute_mul64(u: u64, phi: HiLo) -> (u64, bool) {
    let r = umul192_upper128(u, phi);
    (r.hi, r.lo == 0)
}

// Integer part of u * phi / 2^64 and whether the fraction is zero.
fn compute_mul32(u: u32, phi: u64) -> (u32, bool) {
    let r = umul96_upper64(u, phi);
    ((r >> 32) as u32, r as u32 == 0)
}

// Parity of the integer part of mant2 * phi * 2^(beta-128) and whether the
// value is exactly an integer, read off the low 128 bits of the product.
fn compute_mul_parity64(mant2: u64, phi: HiLo, beta: isize) -> (bool, bool) {
    let beta = beta as u32;
    let r = umul192_lower128(mant2, phi);
    let parity = (r.hi >> (64 - beta)) & 1 != 0;
    let is_int = ((r.hi << beta) | (r.lo >> (64 - beta))) == 0;
    (parity, is_int)
}

fn compute_mul_parity32(mant2: u32, phi: u64, beta: isize) -> (bool, bool) {
    let beta = beta as u32;
    let r = umul96_lower64(mant2, phi);
    let parity = (r >> (64 - beta)) & 1 != 0;
    let is_int = (r >> (32 - beta)) as u32 == 0;
    (parity, is_int)
}

// Scaled interval length.
fn compute_delta64(phi: HiLo, beta: isize) -> u32 {
    (phi.hi >> (CACHE_BITS_64 / 2 - 1 - beta as u32)) as u32
}

fn compute_delta32(phi: u64, beta: isize) -> u32 {
    (phi >> (CACHE_BITS_32 - 1 - beta as u32)) as u32
}

// Integer part of the left interval endpoint in the power-of-two case.
fn compute_left_endpoint64(phi: HiLo, beta: isize) -> u64 {
    (phi.hi - (phi.hi >> (MANT_BITS_64 + 2))) >> (CACHE_BITS_64 / 2 - MANT_BITS_64 - 1 - beta as u32)
}

fn compute_left_endpoint32(phi: u64, beta: isize) -> u32 {
    ((phi - (phi >> (MANT_BITS_32 + 2))) >> (CACHE_BITS_32 - MANT_BITS_32 - 1 - beta as u32)) as u32
}

// Integer part of the right interval endpoint in the power-of-two case.
fn compute_right_endpoint64(phi: HiLo, beta: isize) -> u64 {
    (phi.hi + (phi.hi >> (MANT_BITS_64 + 1))) >> (CACHE_BITS_64 / 2 - MANT_BITS_64 - 1 - beta as u32)
}

fn compute_right_endpoint32(phi: u64, beta: isize) -> u32 {
    ((phi + (phi >> (MANT_BITS_32 + 1))) >> (CACHE_BITS_32 - MANT_BITS_32 - 1 - beta as u32)) as u32
}

// floor(y + 1/2) in the power-of-two case.
fn compute_round_up64(phi: HiLo, beta: isize) -> u64 {
    ((phi.hi >> (CACHE_BITS_64 / 2 - MANT_BITS_64 - 2 - beta as u32)) + 1) / 2
}

fn compute_round_up32(phi: u64, beta: isize) -> u32 {
    ((phi >> (CACHE_BITS_32 - MANT_BITS_32 - 2 - beta as u32)) + 1) as u32 / 2
}

/// Fills d with the shortest decimal significand that reads back as the
/// f64 value mant * 2^exp under round-to-nearest, ties-to-even.
///
/// mant and exp are the adjusted significand and exponent from [`unpack64`]:
/// the implicit bit is set for normal values and denorm marks the rest.
///
/// [`unpack64`]: crate::unpack64
pub fn shortest64(d: &mut Decimal, mant: u64, exp: isize, denorm: bool) {
    d.nd = 0;
    d.dp = 0;
    if mant == 0 {
        return;
    }

    if mant == 1 << MANT_BITS_64 && !denorm {
        // The value sits on a power-of-two boundary, so the interval is
        // lopsided: 1/4 below, 1/2 above, total width 3*2^(e-2).
        let minus_k0 = floor_log10_pow2_minus_log10_4over3(exp);

        let beta = exp + floor_log2_pow10(-minus_k0);
        let phi = pow10::pow10_64(-minus_k0);
        let mut xi = compute_left_endpoint64(phi, beta);
        let zi = compute_right_endpoint64(phi, beta);

        // The left endpoint is attainable only for e in [2, 3]; everywhere
        // else xi itself rounds the wrong way and the first admissible
        // integer is one higher. The right endpoint always rounds back
        // since the boundary significand is even.
        if !(2..=3).contains(&exp) {
            xi += 1;
        }

        // A multiple of ten inside the interval wins: it is the unique
        // shortest candidate.
        let q = zi / 10;
        if xi <= q * 10 {
            let (mant, exp) = remove_trailing_zeros64(q, minus_k0 + 1);
            digits::emit64(d, mant, exp);
            return;
        }

        // Otherwise round the scaled value half-up, then repair the two
        // ways that can miss: a fractional part of exactly 1/2 (only at
        // e = -77) must break the tie to even, and a round-up that fell
        // below the left endpoint is off by one.
        let mut yru = compute_round_up64(phi, beta);
        if exp == -77 && yru % 2 != 0 {
            yru -= 1;
        } else if yru < xi {
            yru += 1;
        }
        digits::emit64(d, yru, minus_k0);
        return;
    }

    // Ordinary significand: the interval is centered with width 2^e.
    const KAPPA: isize = 2;
    const LARGE_DIVISOR: u64 = 1000; // 10^(KAPPA+1)
    const SMALL_DIVISOR: u32 = 100; // 10^KAPPA

    let minus_k = floor_log10_pow2(exp) - KAPPA;
    let beta = exp + floor_log2_pow10(-minus_k);
    let phi = pow10::pow10_64(-minus_k);

    // zi is the integer part of the scaled right endpoint z; the fraction
    // being zero matters when deciding whether z itself is admissible.
    let (zi, z_is_int) = compute_mul64((mant * 2 + 1) << beta as u32, phi);
    let deltai = compute_delta64(phi, beta);

    let mut s = zi / LARGE_DIVISOR;
    let mut r = (zi - LARGE_DIVISOR * s) as u32;

    if r < deltai {
        // s * 10^(-k0+1) lies inside the interval, except in the one case
        // where it coincides with the excluded right endpoint: remainder
        // zero, fraction zero, odd significand.
        if r != 0 || !z_is_int || mant % 2 == 0 {
            let (mant, exp) = remove_trailing_zeros64(s, minus_k + KAPPA + 1);
            digits::emit64(d, mant, exp);
            return;
        }
        // Step back below the endpoint and hand the remainder to the
        // one-more-digit search below.
        s -= 1;
        r = LARGE_DIVISOR as u32;
    } else if r == deltai {
        // Right on the left endpoint: admissible when x's fraction is
        // beyond it (left-endpoint parity odd) or when x is exactly an
        // integer and the interval is closed (even significand).
        let (xi_parity, x_is_int) = compute_mul_parity64(mant * 2 - 1, phi, beta);
        if xi_parity || (x_is_int && mant % 2 == 0) {
            let (mant, exp) = remove_trailing_zeros64(s, minus_k + KAPPA + 1);
            digits::emit64(d, mant, exp);
            return;
        }
    }

    // No multiple of 10^(-k0+1) fits, so produce one more digit: round
    // y/10^KAPPA half-up via the remainder arithmetic below.
    let dividend = r + SMALL_DIVISOR / 2 - deltai / 2;
    let t = dividend / SMALL_DIVISOR;
    let rho = dividend - t * SMALL_DIVISOR;
    let mut yru = 10 * s + u64::from(t);

    if rho == 0 {
        // The truncated division may sit exactly on a half: compare the
        // parity of y against the parity the remainder predicts, and
        // break genuine ties to even.
        let (yi_parity, y_is_int) = compute_mul_parity64(mant * 2, phi, beta);
        let parity_from_remainder = (dividend - SMALL_DIVISOR / 2) % 2 != 0;
        if yi_parity != parity_from_remainder {
            yru -= 1;
        } else if y_is_int && yru % 2 != 0 {
            yru -= 1;
        }
    }
    digits::emit64(d, yru, minus_k + KAPPA);
}

/// Fills d with the shortest decimal significand that reads back as the
/// f32 value mant * 2^exp. The same search as [`shortest64`] over the
/// 32-bit significand and the 64-bit power-of-ten table.
pub fn shortest32(d: &mut Decimal, mant: u32, exp: isize, denorm: bool) {
    d.nd = 0;
    d.dp = 0;
    if mant == 0 {
        return;
    }

    if mant == 1 << MANT_BITS_32 && !denorm {
        let minus_k0 = floor_log10_pow2_minus_log10_4over3(exp);

        let beta = exp + floor_log2_pow10(-minus_k0);
        let phi = pow10::pow10_32(-minus_k0);
        let mut xi = compute_left_endpoint32(phi, beta);
        let zi = compute_right_endpoint32(phi, beta);

        if !(2..=3).contains(&exp) {
            xi += 1;
        }

        let q = zi / 10;
        if xi <= q * 10 {
            let (mant, exp) = remove_trailing_zeros32(q, minus_k0 + 1);
            digits::emit32(d, mant, exp);
            return;
        }

        // The fractional-half tie lives at e = -35 for this width.
        let mut yru = compute_round_up32(phi, beta);
        if exp == -35 && yru % 2 != 0 {
            yru -= 1;
        } else if yru < xi {
            yru += 1;
        }
        digits::emit32(d, yru, minus_k0);
        return;
    }

    const KAPPA: isize = 1;
    const LARGE_DIVISOR: u32 = 100; // 10^(KAPPA+1)
    const SMALL_DIVISOR: u32 = 10; // 10^KAPPA

    let minus_k = floor_log10_pow2(exp) - KAPPA;
    let beta = exp + floor_log2_pow10(-minus_k);
    let phi = pow10::pow10_32(-minus_k);
    let (zi, z_is_int) = compute_mul32((mant * 2 + 1) << beta as u32, phi);
    let deltai = compute_delta32(phi, beta);

    let mut s = zi / LARGE_DIVISOR;
    let mut r = zi - LARGE_DIVISOR * s;

    if r < deltai {
        if r != 0 || !z_is_int || mant % 2 == 0 {
            let (mant, exp) = remove_trailing_zeros32(s, minus_k + KAPPA + 1);
            digits::emit32(d, mant, exp);
            return;
        }
        s -= 1;
        r = LARGE_DIVISOR;
    } else if r == deltai {
        let (xi_parity, x_is_int) = compute_mul_parity32(mant * 2 - 1, phi, beta);
        if xi_parity || (x_is_int && mant % 2 == 0) {
            let (mant, exp) = remove_trailing_zeros32(s, minus_k + KAPPA + 1);
            digits::emit32(d, mant, exp);
            return;
        }
    }

    let dividend = r + SMALL_DIVISOR / 2 - deltai / 2;
    let t = dividend / SMALL_DIVISOR;
    let rho = dividend - t * SMALL_DIVISOR;
    let mut yru = 10 * s + t;

    if rho == 0 {
        let (yi_parity, y_is_int) = compute_mul_parity32(mant * 2, phi, beta);
        let parity_from_remainder = (dividend - SMALL_DIVISOR / 2) % 2 != 0;
        if yi_parity != parity_from_remainder {
            yru -= 1;
        } else if y_is_int && yru % 2 != 0 {
            yru -= 1;
        }
    }
    digits::emit32(d, yru, minus_k + KAPPA);
}

// Strips decimal zeros from the tail of mant, raising exp by the count.
// Each step multiplies by a modular inverse of a power of five and rotates
// the matching power-of-two bits down; the result stays below the threshold
// exactly when that many zeros were present. The core above never produces
// more than 15 of them.
fn remove_trailing_zeros64(mut mant: u64, mut exp: isize) -> (u64, isize) {
    let mut s = 0;

    let r = mant.wrapping_mul(28999941890838049).rotate_right(8);
    if r < 184467440738 {
        s += 1;
        mant = r;
    }

    let r = mant.wrapping_mul(182622766329724561).rotate_right(4);
    s *= 2;
    if r < 1844674407370956 {
        s += 1;
        mant = r;
    }

    let r = mant.wrapping_mul(10330176681277348905).rotate_right(2);
    s *= 2;
    if r < 184467440737095517 {
        s += 1;
        mant = r;
    }

    let r = mant.wrapping_mul(14757395258967641293).rotate_right(1);
    s *= 2;
    if r < 1844674407370955162 {
        s += 1;
        mant = r;
    }

    exp += s as isize;
    (mant, exp)
}

// As above for the 32-bit core, which sees at most 7 trailing zeros.
fn remove_trailing_zeros32(mut mant: u32, mut exp: isize) -> (u32, isize) {
    let mut s = 0;

    let r = mant.wrapping_mul(184254097).rotate_right(4);
    if r < 429497 {
        s += 1;
        mant = r;
    }

    let r = mant.wrapping_mul(42949673).rotate_right(2);
    s *= 2;
    if r < 42949673 {
        s += 1;
        mant = r;
    }

    let r = mant.wrapping_mul(1288490189).rotate_right(1);
    s *= 2;
    if r < 429496730 {
        s += 1;
        mant = r;
    }

    exp += s as isize;
    (mant, exp)
}
