//! Truncation of the `i32` mix to device sample formats.

/// Converts the engine's accumulated `i32` samples to output samples.
///
/// The mix is arithmetic-shifted right by `shift` bits and saturated to
/// 16 bits. Sixteen voices at full level on one side stay inside `i16`
/// with a shift of 4; the default of 2 leaves headroom for typical playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStage {
    shift: u32,
}

impl OutputStage {
    /// Largest accepted shift.
    pub const MAX_SHIFT: u32 = 16;

    /// Create a stage; shifts above [`OutputStage::MAX_SHIFT`] are clamped.
    pub const fn new(shift: u32) -> Self {
        let shift = if shift > Self::MAX_SHIFT {
            Self::MAX_SHIFT
        } else {
            shift
        };
        Self { shift }
    }

    /// Right shift applied to each sample.
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// One sample as saturated 16-bit PCM.
    #[inline]
    pub fn to_i16(&self, sample: i32) -> i16 {
        (sample >> self.shift).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
    }

    /// One sample as float in `[-1.0, 1.0)`.
    #[inline]
    pub fn to_f32(&self, sample: i32) -> f32 {
        f32::from(self.to_i16(sample)) / 32768.0
    }

    /// Convert a block into `out`, element by element.
    ///
    /// Converts `min(input.len(), out.len())` samples.
    pub fn write_i16(&self, input: &[i32], out: &mut [i16]) {
        for (o, &s) in out.iter_mut().zip(input) {
            *o = self.to_i16(s);
        }
    }

    /// Float version of [`OutputStage::write_i16`].
    pub fn write_f32(&self, input: &[i32], out: &mut [f32]) {
        for (o, &s) in out.iter_mut().zip(input) {
            *o = self.to_f32(s);
        }
    }
}

impl Default for OutputStage {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_and_saturates() {
        let stage = OutputStage::new(2);
        assert_eq!(stage.to_i16(400), 100);
        assert_eq!(stage.to_i16(-400), -100);
        assert_eq!(stage.to_i16(i32::MAX), i16::MAX);
        assert_eq!(stage.to_i16(i32::MIN), i16::MIN);
        assert_eq!(stage.to_i16(4 * 40_000), i16::MAX);
    }

    #[test]
    fn negative_values_round_toward_negative_infinity() {
        let stage = OutputStage::new(1);
        assert_eq!(stage.to_i16(-1), -1);
        assert_eq!(stage.to_i16(1), 0);
    }

    #[test]
    fn shift_is_clamped() {
        assert_eq!(OutputStage::new(40).shift(), OutputStage::MAX_SHIFT);
        assert_eq!(OutputStage::new(16).to_i16(i32::MAX), i16::MAX);
        assert_eq!(OutputStage::default().shift(), 2);
    }

    #[test]
    fn float_range() {
        let stage = OutputStage::new(0);
        assert_eq!(stage.to_f32(0), 0.0);
        assert_eq!(stage.to_f32(i32::MIN), -1.0);
        assert!(stage.to_f32(i32::MAX) < 1.0);
        assert!((stage.to_f32(16384) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn block_conversion() {
        let stage = OutputStage::new(4);
        let input = [16, -32, 1 << 24, 0];
        let mut out = [0i16; 4];
        stage.write_i16(&input, &mut out);
        assert_eq!(out, [1, -2, i16::MAX, 0]);

        let mut floats = [1.0f32; 3];
        stage.write_f32(&input, &mut floats);
        assert_eq!(floats[2], 1.0 - 1.0 / 32768.0);
    }
}
