//! Word-array algorithms on unsigned magnitudes.
//!
//! A magnitude is a slice of 32-bit words stored most-significant word first.
//! Canonical magnitudes carry no leading zero words, so zero is the empty slice.
//! Every function here accepts canonical input and returns canonical output.

use std::cmp::Ordering;

pub(crate) type Word = u32;
pub(crate) type DoubleWord = u64;

pub(crate) const WORD_BITS: u32 = Word::BITS;
const WORD_MASK: DoubleWord = (1 << WORD_BITS) - 1;
const BASE: DoubleWord = 1 << WORD_BITS;

/// Drops leading zero words.
pub(crate) fn trim(mut words: Vec<Word>) -> Vec<Word> {
    let leading = words.iter().take_while(|&&word| word == 0).count();
    if leading > 0 {
        words.drain(..leading);
    }
    words
}

pub(crate) fn cmp(lhs: &[Word], rhs: &[Word]) -> Ordering {
    // Equal lengths compare lexicographically because the top word comes first.
    lhs.len().cmp(&rhs.len()).then_with(|| lhs.cmp(rhs))
}

/// Number of significant bits.
pub(crate) fn bits(words: &[Word]) -> u64 {
    match words.first() {
        None => 0,
        Some(top) => {
            (words.len() as u64 - 1) * u64::from(WORD_BITS)
                + u64::from(WORD_BITS - top.leading_zeros())
        }
    }
}

pub(crate) fn add(lhs: &[Word], rhs: &[Word]) -> Vec<Word> {
    let (long, short) = if lhs.len() >= rhs.len() {
        (lhs, rhs)
    } else {
        (rhs, lhs)
    };
    let offset = long.len() - short.len();
    let mut result = vec![0; long.len() + 1];
    let mut carry: DoubleWord = 0;
    for index in (0..long.len()).rev() {
        let mut sum = DoubleWord::from(long[index]) + carry;
        if index >= offset {
            sum += DoubleWord::from(short[index - offset]);
        }
        result[index + 1] = sum as Word;
        carry = sum >> WORD_BITS;
    }
    result[0] = carry as Word;
    trim(result)
}

/// Computes `lhs - rhs`; requires `lhs >= rhs`.
pub(crate) fn sub(lhs: &[Word], rhs: &[Word]) -> Vec<Word> {
    debug_assert!(cmp(lhs, rhs) != Ordering::Less);
    let offset = lhs.len() - rhs.len();
    let mut result = vec![0; lhs.len()];
    let mut borrow: i64 = 0;
    for index in (0..lhs.len()).rev() {
        let mut difference = i64::from(lhs[index]) - borrow;
        if index >= offset {
            difference -= i64::from(rhs[index - offset]);
        }
        if difference < 0 {
            difference += BASE as i64;
            borrow = 1;
        } else {
            borrow = 0;
        }
        result[index] = difference as Word;
    }
    trim(result)
}

/// Schoolbook multiplication.
pub(crate) fn mul(lhs: &[Word], rhs: &[Word]) -> Vec<Word> {
    if lhs.is_empty() || rhs.is_empty() {
        return Vec::new();
    }
    let mut result = vec![0 as Word; lhs.len() + rhs.len()];
    for i in (0..lhs.len()).rev() {
        let multiplier = DoubleWord::from(lhs[i]);
        let mut carry: DoubleWord = 0;
        for j in (0..rhs.len()).rev() {
            let slot = i + j + 1;
            let product =
                multiplier * DoubleWord::from(rhs[j]) + DoubleWord::from(result[slot]) + carry;
            result[slot] = product as Word;
            carry = product >> WORD_BITS;
        }
        result[i] = carry as Word;
    }
    trim(result)
}

/// Computes `words * multiplier + addend` for single-word operands.
pub(crate) fn mul_add_small(words: &[Word], multiplier: Word, addend: Word) -> Vec<Word> {
    let mut result = vec![0 as Word; words.len() + 1];
    let mut carry = DoubleWord::from(addend);
    for index in (0..words.len()).rev() {
        let product = DoubleWord::from(words[index]) * DoubleWord::from(multiplier) + carry;
        result[index + 1] = product as Word;
        carry = product >> WORD_BITS;
    }
    result[0] = carry as Word;
    trim(result)
}

/// Divides by a single nonzero word, returning quotient and remainder.
pub(crate) fn div_rem_small(words: &[Word], divisor: Word) -> (Vec<Word>, Word) {
    debug_assert!(divisor != 0);
    let divisor = DoubleWord::from(divisor);
    let mut quotient = Vec::with_capacity(words.len());
    let mut remainder: DoubleWord = 0;
    for &word in words {
        let current = (remainder << WORD_BITS) | DoubleWord::from(word);
        quotient.push((current / divisor) as Word);
        remainder = current % divisor;
    }
    (trim(quotient), remainder as Word)
}

/// Shifts every word left by `shift` bits (`shift < WORD_BITS`) and returns the
/// bits pushed out of the top word separately.
fn normalize(words: &[Word], shift: u32) -> (Word, Vec<Word>) {
    if shift == 0 {
        return (0, words.to_vec());
    }
    let overflow = words[0] >> (WORD_BITS - shift);
    let shifted = (0..words.len())
        .map(|index| {
            let low = words
                .get(index + 1)
                .map_or(0, |next| next >> (WORD_BITS - shift));
            (words[index] << shift) | low
        })
        .collect();
    (overflow, shifted)
}

/// Truncating division (Knuth, TAOCP vol. 2, algorithm D). `divisor` must be nonzero.
pub(crate) fn div_rem(dividend: &[Word], divisor: &[Word]) -> (Vec<Word>, Vec<Word>) {
    debug_assert!(!divisor.is_empty());
    if cmp(dividend, divisor) == Ordering::Less {
        return (Vec::new(), dividend.to_vec());
    }
    if divisor.len() == 1 {
        let (quotient, remainder) = div_rem_small(dividend, divisor[0]);
        return (quotient, trim(vec![remainder]));
    }

    let n = divisor.len();
    let m = dividend.len() - n;
    let shift = divisor[0].leading_zeros();
    let (_, vn) = normalize(divisor, shift);
    let (overflow, shifted) = normalize(dividend, shift);
    let mut un = Vec::with_capacity(dividend.len() + 1);
    un.push(overflow);
    un.extend(shifted);

    let top = DoubleWord::from(vn[0]);
    let second = DoubleWord::from(vn[1]);
    let mut quotient = vec![0 as Word; m + 1];
    for j in 0..=m {
        let numerator = (DoubleWord::from(un[j]) << WORD_BITS) | DoubleWord::from(un[j + 1]);
        let mut qhat = numerator / top;
        let mut rhat = numerator % top;
        while qhat >= BASE
            || qhat * second > ((rhat << WORD_BITS) | DoubleWord::from(un[j + 2]))
        {
            qhat -= 1;
            rhat += top;
            if rhat >= BASE {
                break;
            }
        }

        let mut borrow: i64 = 0;
        for i in (0..n).rev() {
            let product = qhat * DoubleWord::from(vn[i]);
            let t = i64::from(un[i + j + 1]) - borrow - (product & WORD_MASK) as i64;
            un[i + j + 1] = t as Word;
            borrow = (product >> WORD_BITS) as i64 - (t >> WORD_BITS);
        }
        let t = i64::from(un[j]) - borrow;
        un[j] = t as Word;

        if t < 0 {
            // qhat was one too large; add the divisor back.
            qhat -= 1;
            let mut carry: DoubleWord = 0;
            for i in (0..n).rev() {
                let sum = DoubleWord::from(un[i + j + 1]) + DoubleWord::from(vn[i]) + carry;
                un[i + j + 1] = sum as Word;
                carry = sum >> WORD_BITS;
            }
            un[j] = un[j].wrapping_add(carry as Word);
        }
        quotient[j] = qhat as Word;
    }

    let remainder_words = &un[m + 1..];
    let remainder = if shift == 0 {
        remainder_words.to_vec()
    } else {
        (0..n)
            .map(|i| {
                let high = if i > 0 {
                    remainder_words[i - 1] << (WORD_BITS - shift)
                } else {
                    0
                };
                (remainder_words[i] >> shift) | high
            })
            .collect()
    };
    (trim(quotient), trim(remainder))
}

pub(crate) fn shl(words: &[Word], shift: u64) -> Vec<Word> {
    if words.is_empty() {
        return Vec::new();
    }
    let word_shift = (shift / u64::from(WORD_BITS)) as usize;
    let bit_shift = (shift % u64::from(WORD_BITS)) as u32;
    let (overflow, mut result) = normalize(words, bit_shift);
    if overflow != 0 {
        result.insert(0, overflow);
    }
    result.resize(result.len() + word_shift, 0);
    result
}

/// Logical right shift; bits shifted out are discarded.
pub(crate) fn shr(words: &[Word], shift: u64) -> Vec<Word> {
    let word_shift = shift / u64::from(WORD_BITS);
    if word_shift >= words.len() as u64 {
        return Vec::new();
    }
    let kept = &words[..words.len() - word_shift as usize];
    let bit_shift = (shift % u64::from(WORD_BITS)) as u32;
    if bit_shift == 0 {
        return kept.to_vec();
    }
    let result = (0..kept.len())
        .map(|index| {
            let high = if index > 0 {
                kept[index - 1] << (WORD_BITS - bit_shift)
            } else {
                0
            };
            (kept[index] >> bit_shift) | high
        })
        .collect();
    trim(result)
}
