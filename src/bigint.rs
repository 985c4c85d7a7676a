//! Arbitrary-precision signed integers.
//!
//! `BigInteger` is the numeric substrate of the real-number engine: every
//! approximation handed out by a [`Real`](crate::Real) is one of these.
//!
//! The representation is sign-magnitude. The magnitude is a sequence of 32-bit
//! words, most significant first, with no leading zero words. Zero has an empty
//! magnitude and is never negative, so every value has exactly one
//! representation and derived equality is value equality.
//!
//! # Modules
//!
//! - [`magnitude`]: unsigned word-array algorithms (schoolbook multiply, Knuth division)
//! - `ops`: operator overloads for owned and borrowed operands
//! - `radix`: conversion to and from strings in radix 2 to 36
//! - `interop`: lossless conversions to and from `num_bigint::BigInt`

mod error;
pub(crate) mod magnitude;
mod interop;
mod ops;
mod radix;

use std::cmp::Ordering;

use num_traits::{Num, One, Signed, ToPrimitive, Zero};

pub use error::BigIntegerError;
use magnitude::{Word, WORD_BITS};

/// Sign of an integer or real number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sign {
    Minus,
    Zero,
    Plus,
}

impl Sign {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Minus => -1,
            Self::Zero => 0,
            Self::Plus => 1,
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Self::Minus => Self::Plus,
            Self::Zero => Self::Zero,
            Self::Plus => Self::Minus,
        }
    }
}

/// Immutable arbitrary-precision integer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BigInteger {
    negative: bool,
    magnitude: Vec<Word>,
}

impl BigInteger {
    /// Builds a value from a sign flag and a most-significant-first word sequence,
    /// restoring canonical form.
    pub fn from_words(negative: bool, words: Vec<u32>) -> Self {
        let magnitude = magnitude::trim(words);
        let negative = negative && !magnitude.is_empty();
        Self {
            negative,
            magnitude,
        }
    }

    /// The magnitude words, most significant first.
    pub fn words(&self) -> &[u32] {
        &self.magnitude
    }

    pub fn sign(&self) -> Sign {
        if self.magnitude.is_empty() {
            Sign::Zero
        } else if self.negative {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_odd(&self) -> bool {
        self.magnitude.last().is_some_and(|word| word & 1 == 1)
    }

    pub fn abs(&self) -> Self {
        Self {
            negative: false,
            magnitude: self.magnitude.clone(),
        }
    }

    /// Number of bits in the magnitude; zero has bit length zero.
    pub fn bits(&self) -> u64 {
        magnitude::bits(&self.magnitude)
    }

    /// Truncating division, returning quotient and remainder together.
    ///
    /// The quotient rounds toward zero and the remainder takes the sign of the
    /// dividend, so `self == quotient * divisor + remainder`.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), BigIntegerError> {
        if divisor.magnitude.is_empty() {
            return Err(BigIntegerError::DivisionByZero);
        }
        let (quotient, remainder) = magnitude::div_rem(&self.magnitude, &divisor.magnitude);
        Ok((
            Self::from_words(self.negative != divisor.negative, quotient),
            Self::from_words(self.negative, remainder),
        ))
    }

    /// Truncating quotient; see [`div_rem`](Self::div_rem).
    pub fn divide(&self, divisor: &Self) -> Result<Self, BigIntegerError> {
        self.div_rem(divisor).map(|(quotient, _)| quotient)
    }

    /// Remainder carrying the dividend's sign; see [`div_rem`](Self::div_rem).
    pub fn remainder(&self, divisor: &Self) -> Result<Self, BigIntegerError> {
        self.div_rem(divisor).map(|(_, remainder)| remainder)
    }

    /// Multiplies by `2^shift`. A negative `shift` shifts right instead.
    pub fn shift_left(&self, shift: i32) -> Self {
        if shift < 0 {
            self.shift_right_bits(u64::from(shift.unsigned_abs()))
        } else {
            self.shift_left_bits(u64::from(shift.unsigned_abs()))
        }
    }

    /// Divides by `2^shift`, rounding toward negative infinity.
    /// A negative `shift` shifts left instead.
    pub fn shift_right(&self, shift: i32) -> Self {
        if shift < 0 {
            self.shift_left_bits(u64::from(shift.unsigned_abs()))
        } else {
            self.shift_right_bits(u64::from(shift.unsigned_abs()))
        }
    }

    fn shift_left_bits(&self, shift: u64) -> Self {
        Self::from_words(self.negative, magnitude::shl(&self.magnitude, shift))
    }

    fn shift_right_bits(&self, shift: u64) -> Self {
        if !self.negative {
            return Self::from_words(false, magnitude::shr(&self.magnitude, shift));
        }
        // floor(-m / 2^k) == -(((m - 1) >> k) + 1) for m > 0
        let reduced = magnitude::sub(&self.magnitude, &[1]);
        let shifted = magnitude::shr(&reduced, shift);
        Self::from_words(true, magnitude::add(&shifted, &[1]))
    }

    /// Raises to a non-negative power by repeated squaring.
    pub fn pow(&self, exponent: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut remaining = exponent;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = &result * &base;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Nearest `f64`, or an infinity if the magnitude exceeds the `f64` range.
    pub fn to_f64_lossy(&self) -> f64 {
        let bits = self.bits();
        let magnitude = if bits <= 64 {
            self.magnitude_u64() as f64
        } else {
            // Keep the top 64 bits; the dropped bits are below f64 resolution.
            let excess = bits - 64;
            let top = Self::from_words(false, magnitude::shr(&self.magnitude, excess));
            let mut value = top.magnitude_u64() as f64;
            let mut remaining = excess;
            while remaining > 0 && value.is_finite() {
                let step = remaining.min(512);
                value *= 2f64.powi(step as i32);
                remaining -= step;
            }
            value
        };
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    fn magnitude_u64(&self) -> u64 {
        self.magnitude
            .iter()
            .fold(0u64, |acc, &word| (acc << WORD_BITS) | u64::from(word))
    }

    fn add_signed(&self, other: &Self, other_negative: bool) -> Self {
        if self.negative == other_negative {
            return Self::from_words(
                self.negative,
                magnitude::add(&self.magnitude, &other.magnitude),
            );
        }
        match magnitude::cmp(&self.magnitude, &other.magnitude) {
            Ordering::Equal => Self::zero(),
            Ordering::Greater => Self::from_words(
                self.negative,
                magnitude::sub(&self.magnitude, &other.magnitude),
            ),
            Ordering::Less => Self::from_words(
                other_negative,
                magnitude::sub(&other.magnitude, &self.magnitude),
            ),
        }
    }

    fn mul_ref(&self, other: &Self) -> Self {
        Self::from_words(
            self.negative != other.negative,
            magnitude::mul(&self.magnitude, &other.magnitude),
        )
    }
}

impl PartialOrd for BigInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => magnitude::cmp(&self.magnitude, &other.magnitude),
            (true, true) => magnitude::cmp(&other.magnitude, &self.magnitude),
        }
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInteger {
            fn from(value: $t) -> Self {
                let value = u64::from(value);
                Self::from_words(false, vec![(value >> WORD_BITS) as Word, value as Word])
            }
        }
    )*};
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInteger {
            fn from(value: $t) -> Self {
                let value = i64::from(value);
                let magnitude = value.unsigned_abs();
                Self::from_words(
                    value < 0,
                    vec![(magnitude >> WORD_BITS) as Word, magnitude as Word],
                )
            }
        }
    )*};
}

impl_from_unsigned!(u8, u16, u32, u64);
impl_from_signed!(i8, i16, i32, i64);

impl Zero for BigInteger {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }
}

impl One for BigInteger {
    fn one() -> Self {
        Self::from_words(false, vec![1])
    }
}

impl Num for BigInteger {
    type FromStrRadixErr = BigIntegerError;

    fn from_str_radix(text: &str, radix: u32) -> Result<Self, BigIntegerError> {
        radix::parse(text, radix)
    }
}

impl Signed for BigInteger {
    fn abs(&self) -> Self {
        BigInteger::abs(self)
    }

    fn abs_sub(&self, other: &Self) -> Self {
        if self <= other {
            Self::zero()
        } else {
            self - other
        }
    }

    fn signum(&self) -> Self {
        Self::from(self.sign().as_i32())
    }

    fn is_positive(&self) -> bool {
        self.sign() == Sign::Plus
    }

    fn is_negative(&self) -> bool {
        self.negative
    }
}

impl ToPrimitive for BigInteger {
    fn to_i64(&self) -> Option<i64> {
        if self.bits() > 64 {
            return None;
        }
        let magnitude = self.magnitude_u64();
        if self.negative {
            if magnitude <= i64::MIN.unsigned_abs() {
                Some(0i64.wrapping_sub_unsigned(magnitude))
            } else {
                None
            }
        } else {
            i64::try_from(magnitude).ok()
        }
    }

    fn to_u64(&self) -> Option<u64> {
        if self.negative || self.bits() > 64 {
            None
        } else {
            Some(self.magnitude_u64())
        }
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.to_f64_lossy())
    }
}
