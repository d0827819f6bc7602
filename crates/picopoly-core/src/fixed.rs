//! Log-domain frequency modulation on fixed-point phase increments.
//!
//! Pitch bend, the pitch envelope and vibrato all express their effect as a
//! signed index into [`POWER_TABLE`](crate::POWER_TABLE). Each source is
//! applied to the oscillator step on its own, one multiplication per source,
//! which keeps every index inside the table and every product inside 32 bits:
//!
//! ```text
//! m    = POWER_TABLE[index + 8192]                 // 1:15, 0.5 ..= ~2.0
//! step = ((step_hi * m) << 1) + ((step_lo * m) >> 15)
//! ```
//!
//! `step_hi`/`step_lo` are the upper and lower 16 bits of the step. The split
//! keeps each partial product within a 32x32 multiply, which is all a
//! Cortex-M0+ offers.

use crate::tables::{POWER_CENTER, power};

/// Clamp a modulation index to the power table domain `[-8192, 8191]`.
#[inline]
pub fn clamp_index(index: i32) -> i32 {
    index.clamp(-POWER_CENTER, POWER_CENTER - 1)
}

/// Scale a phase increment by a 1:15 fixed-point multiplier.
///
/// ```rust
/// use picopoly_core::{UNITY, apply_multiplier};
///
/// assert_eq!(apply_multiplier(1_339_133, UNITY), 1_339_133);
/// assert_eq!(apply_multiplier(1_000, UNITY / 2), 500);
/// ```
#[inline]
pub fn apply_multiplier(step: u32, multiplier: u16) -> u32 {
    let m = u32::from(multiplier);
    let hi = (step >> 16).wrapping_mul(m) << 1;
    let lo = ((step & 0xffff) * m) >> 15;
    hi.wrapping_add(lo)
}

/// Scale a phase increment by the power table entry for `index`.
///
/// An index of `0` leaves the step unchanged; `±8192` is `±1` octave.
#[inline]
pub fn frequency_modulate(step: u32, index: i32) -> u32 {
    apply_multiplier(step, power(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::UNITY;

    #[test]
    fn unity_multiplier_is_identity() {
        for step in [0u32, 1, 0xffff, 0x1_0000, 1_339_133, 38_000_000] {
            assert_eq!(apply_multiplier(step, UNITY), step);
            assert_eq!(frequency_modulate(step, 0), step);
        }
    }

    #[test]
    fn octave_down_halves_the_step() {
        assert_eq!(frequency_modulate(2_000_000, -8192), 1_000_000);
    }

    #[test]
    fn octave_up_nearly_doubles_the_step() {
        let step = 1_339_133u32;
        let up = frequency_modulate(step, 8191);
        let ratio = f64::from(up) / f64::from(step);
        assert!((ratio - 2.0).abs() < 1e-3, "ratio = {ratio}");
    }

    #[test]
    fn matches_wide_multiplication() {
        for &step in &[123_456u32, 9_876_543, 50_000_000] {
            for &index in &[-8192, -683, -1, 1, 683, 4000, 8191] {
                let m = u64::from(power(index));
                let wide = ((u64::from(step) * m) >> 15) as i64;
                let got = i64::from(frequency_modulate(step, index));
                assert!((wide - got).abs() <= 1, "step {step} index {index}");
            }
        }
    }

    #[test]
    fn clamp_index_bounds() {
        assert_eq!(clamp_index(-9000), -8192);
        assert_eq!(clamp_index(9000), 8191);
        assert_eq!(clamp_index(12), 12);
    }
}
