//! Compile-time lookup tables.
//!
//! Every table here is a `static` built by a `const fn`, so the values are
//! baked into the binary (flash on a microcontroller) and no initialization
//! has to run before the audio context starts.
//!
//! | Table | Entries | Format | Contents |
//! |-------|---------|--------|----------|
//! | [`POWER_TABLE`] | 16384 | `u16`, 1:15 | `32768 · 2^((i - 8192) / 8192)` |
//! | [`PAN_TABLE`] | 128 | `u8` | `round(127 · sqrt(i / 127))` |
//! | [`SINE_TABLE`] | 2048 | `i16` | one sine cycle |
//! | [`SAW_TABLE`] | 2048 | `i16` | falling ramp |
//! | [`SQUARE_TABLE`] | 2048 | `i16` | 50% duty square |
//! | [`TRIANGLE_TABLE`] | 2048 | `i16` | triangle starting at zero |
//!
//! The power table spans one octave either side of its center, so an index of
//! `±8192` is `±1` octave and `±683` is roughly `±1` semitone.

/// log2 of the wavetable length.
pub const WAVE_SHIFT: u32 = 11;

/// Number of samples in a single-cycle wavetable.
pub const WAVE_LEN: usize = 1 << WAVE_SHIFT;

/// Fractional bits of the oscillator phase accumulator (11:16 format).
pub const PHASE_FRAC_BITS: u32 = 16;

/// Wrap mask for the oscillator phase accumulator.
pub const PHASE_MASK: u32 = ((WAVE_LEN as u32) << PHASE_FRAC_BITS) - 1;

/// Number of entries in [`POWER_TABLE`].
pub const POWER_TABLE_LEN: usize = 16384;

/// Index of the unity entry in [`POWER_TABLE`].
pub const POWER_CENTER: i32 = 8192;

/// 1.0 in 1:15 fixed point.
pub const UNITY: u16 = 1 << 15;

/// A single-cycle waveform.
pub type Wavetable = [i16; WAVE_LEN];

/// Log-domain frequency multipliers, 1:15 fixed point.
pub static POWER_TABLE: [u16; POWER_TABLE_LEN] = build_power_table();

/// Square-root pan law gains.
pub static PAN_TABLE: [u8; 128] = build_pan_table();

/// One cycle of a sine wave.
pub static SINE_TABLE: Wavetable = build_sine_table();

/// One cycle of a falling sawtooth.
pub static SAW_TABLE: Wavetable = build_saw_table();

/// One cycle of a square wave.
pub static SQUARE_TABLE: Wavetable = build_square_table();

/// One cycle of a triangle wave.
pub static TRIANGLE_TABLE: Wavetable = build_triangle_table();

/// Look up the frequency multiplier for a signed modulation index.
///
/// The index is clamped to `[-8192, 8191]`, so any `i32` is accepted.
///
/// ```rust
/// use picopoly_core::{UNITY, power};
///
/// assert_eq!(power(0), UNITY);
/// assert_eq!(power(i32::MAX), power(8191));
/// ```
#[inline]
pub fn power(index: i32) -> u16 {
    let offset = (index.clamp(-POWER_CENTER, POWER_CENTER - 1) + POWER_CENTER) as usize;
    POWER_TABLE[offset]
}

/// Left and right pan-law gains for a 7-bit pan controller value.
///
/// The value is masked to 7 bits. `0` is hard left, `127` hard right.
#[inline]
pub fn pan_gains(value: u8) -> (u8, u8) {
    let v = usize::from(value & 0x7f);
    (PAN_TABLE[127 - v], PAN_TABLE[v])
}

// ln(2) / 8192, the per-entry exponent step of the power table
const POWER_STEP_LN: f64 = core::f64::consts::LN_2 / 8192.0;

const fn round_to_i32(v: f64) -> i32 {
    if v >= 0.0 {
        (v + 0.5) as i32
    } else {
        (v - 0.5) as i32
    }
}

// e^x for the tiny x used by the power table step
const fn exp_small(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut n = 1;
    while n < 8 {
        term = term * x / n as f64;
        sum += term;
        n += 1;
    }
    sum
}

const fn build_power_table() -> [u16; POWER_TABLE_LEN] {
    let mut table = [0u16; POWER_TABLE_LEN];
    let up = exp_small(POWER_STEP_LN);
    let down = exp_small(-POWER_STEP_LN);
    let center = POWER_CENTER as usize;

    table[center] = UNITY;

    let mut ratio = 1.0;
    let mut i = center + 1;
    while i < POWER_TABLE_LEN {
        ratio *= up;
        table[i] = round_to_i32(32768.0 * ratio) as u16;
        i += 1;
    }

    ratio = 1.0;
    i = center;
    while i > 0 {
        i -= 1;
        ratio *= down;
        table[i] = round_to_i32(32768.0 * ratio) as u16;
    }
    table
}

// round(sqrt(n)) for small n
const fn isqrt_round(n: u32) -> u32 {
    let mut r = 0;
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    // n > r^2 + r  <=>  sqrt(n) > r + 0.5 for integer n
    if n > r * r + r { r + 1 } else { r }
}

const fn build_pan_table() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        // 127 * sqrt(i / 127) == sqrt(127 * i)
        table[i] = isqrt_round(127 * i as u32) as u8;
        i += 1;
    }
    table
}

// sin(k * PI / 1024) for k in 0..=512, Taylor series on [0, PI/2]
const fn quarter_sine(k: usize) -> f64 {
    let x = k as f64 * core::f64::consts::PI / 1024.0;
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    let mut n = 1;
    while n < 11 {
        term = -term * x2 / ((2 * n) * (2 * n + 1)) as f64;
        sum += term;
        n += 1;
    }
    sum
}

const fn build_sine_table() -> Wavetable {
    let mut table = [0i16; WAVE_LEN];
    let quarter = WAVE_LEN / 4;
    let mut i = 0;
    while i < WAVE_LEN {
        let (k, negative) = match i / quarter {
            0 => (i, false),
            1 => (2 * quarter - i, false),
            2 => (i - 2 * quarter, true),
            _ => (WAVE_LEN - i, true),
        };
        let v = round_to_i32(32767.0 * quarter_sine(k));
        table[i] = if negative { -v as i16 } else { v as i16 };
        i += 1;
    }
    table
}

const fn build_saw_table() -> Wavetable {
    let mut table = [0i16; WAVE_LEN];
    let mut i = 0;
    while i < WAVE_LEN {
        table[i] = (32767 - 32 * i as i32) as i16;
        i += 1;
    }
    table
}

const fn build_square_table() -> Wavetable {
    let mut table = [0i16; WAVE_LEN];
    let mut i = 0;
    while i < WAVE_LEN {
        table[i] = if i < WAVE_LEN / 2 { 32767 } else { -32768 };
        i += 1;
    }
    table
}

const fn build_triangle_table() -> Wavetable {
    let mut table = [0i16; WAVE_LEN];
    let mut i = 0;
    while i < WAVE_LEN {
        let v = if i < 512 {
            64 * i as i32
        } else if i < 1536 {
            32767 - 64 * (i as i32 - 512)
        } else {
            -32768 + 64 * (i as i32 - 1536)
        };
        table[i] = v as i16;
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_table_center_is_unity() {
        assert_eq!(POWER_TABLE[POWER_CENTER as usize], UNITY);
        assert_eq!(power(0), UNITY);
    }

    #[test]
    fn power_table_octave_endpoints() {
        // one octave down is exactly half
        assert_eq!(POWER_TABLE[0], 16384);
        // one step short of an octave up
        let top = f64::from(POWER_TABLE[POWER_TABLE_LEN - 1]) / 32768.0;
        assert!((top - 2.0 * (-1.0f64 / 8192.0).exp2()).abs() < 1e-4, "top = {top}");
    }

    #[test]
    fn power_table_matches_exp2() {
        for i in (0..POWER_TABLE_LEN).step_by(97) {
            let expected = (32768.0 * ((i as f64 - 8192.0) / 8192.0).exp2()).round();
            let got = f64::from(POWER_TABLE[i]);
            assert!(
                (got - expected).abs() <= 1.0,
                "entry {i}: expected {expected}, got {got}"
            );
        }
    }

    #[test]
    fn power_table_is_monotonic() {
        for pair in POWER_TABLE.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn power_clamps_out_of_range_indices() {
        assert_eq!(power(-100_000), POWER_TABLE[0]);
        assert_eq!(power(100_000), POWER_TABLE[POWER_TABLE_LEN - 1]);
    }

    #[test]
    fn pan_table_endpoints_and_shape() {
        assert_eq!(PAN_TABLE[0], 0);
        assert_eq!(PAN_TABLE[127], 127);
        for i in 0..128 {
            let expected = (127.0 * (i as f64 / 127.0).sqrt()).round() as u8;
            assert_eq!(PAN_TABLE[i], expected, "pan entry {i}");
        }
    }

    #[test]
    fn pan_gains_center_is_balanced() {
        let (l, r) = pan_gains(64);
        assert!(l.abs_diff(r) <= 1, "l = {l}, r = {r}");
        assert_eq!(pan_gains(0), (127, 0));
        assert_eq!(pan_gains(127), (0, 127));
        // high bit ignored
        assert_eq!(pan_gains(0x80 | 64), pan_gains(64));
    }

    #[test]
    fn sine_table_key_points() {
        assert_eq!(SINE_TABLE[0], 0);
        assert_eq!(SINE_TABLE[512], 32767);
        assert_eq!(SINE_TABLE[1024], 0);
        assert_eq!(SINE_TABLE[1536], -32767);
        for i in (0..WAVE_LEN).step_by(31) {
            let expected = 32767.0 * (2.0 * core::f64::consts::PI * i as f64 / 2048.0).sin();
            assert!((f64::from(SINE_TABLE[i]) - expected).abs() <= 1.0);
        }
    }

    #[test]
    fn shaped_tables_match_definitions() {
        assert_eq!(SAW_TABLE[0], 32767);
        assert_eq!(SAW_TABLE[2047], -32737);
        assert_eq!(SQUARE_TABLE[1023], 32767);
        assert_eq!(SQUARE_TABLE[1024], -32768);
        assert_eq!(TRIANGLE_TABLE[0], 0);
        assert_eq!(TRIANGLE_TABLE[512], 32767);
        assert_eq!(TRIANGLE_TABLE[1536], -32768);
    }
}
