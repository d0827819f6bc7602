//! Integer division seam.
//!
//! Pitch math needs a handful of signed divisions by non-powers-of-two (12
//! semitones per octave). Microcontrollers such as the RP2040 have a
//! memory-mapped hardware divider that answers in a few cycles; everywhere
//! else the compiler's software routine is used. Both must produce the same
//! truncating quotient and remainder, so the choice only affects latency.

/// A signed 32-bit integer divider.
///
/// Implementations must truncate toward zero (the semantics of Rust's `/`
/// and `%` on `i32`) and must be total: a zero divisor yields a quotient of
/// `0` and returns the dividend as the remainder.
pub trait IntDivider {
    /// Divide `dividend` by `divisor`, returning `(quotient, remainder)`.
    fn divmod(&self, dividend: i32, divisor: i32) -> (i32, i32);

    /// Quotient only.
    #[inline]
    fn quotient(&self, dividend: i32, divisor: i32) -> i32 {
        self.divmod(dividend, divisor).0
    }
}

/// Portable software divider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftDivider;

impl IntDivider for SoftDivider {
    #[inline]
    fn divmod(&self, dividend: i32, divisor: i32) -> (i32, i32) {
        if divisor == 0 {
            return (0, dividend);
        }
        (dividend.wrapping_div(divisor), dividend.wrapping_rem(divisor))
    }
}

impl<D: IntDivider + ?Sized> IntDivider for &D {
    #[inline]
    fn divmod(&self, dividend: i32, divisor: i32) -> (i32, i32) {
        (**self).divmod(dividend, divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(SoftDivider.divmod(7, 2), (3, 1));
        assert_eq!(SoftDivider.divmod(-7, 2), (-3, -1));
        assert_eq!(SoftDivider.quotient(-8191 * 2, 12), -1365);
    }

    #[test]
    fn total_on_edge_inputs() {
        assert_eq!(SoftDivider.divmod(5, 0), (0, 5));
        assert_eq!(SoftDivider.divmod(i32::MIN, -1), (i32::MIN, 0));
    }
}
