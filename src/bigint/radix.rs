//! Conversion between `BigInteger` and digit strings.

use std::fmt;
use std::str::FromStr;

use super::magnitude::{self, Word};
use super::{BigInteger, BigIntegerError};

/// Largest `(radix^k, k)` with `radix^k` fitting in a word.
fn chunk_for(radix: u32) -> (Word, usize) {
    let mut power: Word = radix;
    let mut digits = 1;
    while let Some(next) = power.checked_mul(radix) {
        power = next;
        digits += 1;
    }
    (power, digits)
}

fn check_radix(radix: u32) -> Result<(), BigIntegerError> {
    if (2..=36).contains(&radix) {
        Ok(())
    } else {
        Err(BigIntegerError::InvalidRadix(radix))
    }
}

pub(super) fn parse(text: &str, radix: u32) -> Result<BigInteger, BigIntegerError> {
    check_radix(radix)?;
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return Err(BigIntegerError::Empty);
    }

    let (chunk_power, chunk_digits) = chunk_for(radix);
    let mut words: Vec<Word> = Vec::new();
    let mut pending: Word = 0;
    let mut pending_digits = 0;
    for character in digits.chars() {
        let digit = character
            .to_digit(radix)
            .ok_or(BigIntegerError::InvalidDigit(character))?;
        pending = pending * radix + digit;
        pending_digits += 1;
        if pending_digits == chunk_digits {
            words = magnitude::mul_add_small(&words, chunk_power, pending);
            pending = 0;
            pending_digits = 0;
        }
    }
    if pending_digits > 0 {
        let multiplier = (0..pending_digits).fold(1, |acc: Word, _| acc * radix);
        words = magnitude::mul_add_small(&words, multiplier, pending);
    }
    Ok(BigInteger::from_words(negative, words))
}

impl BigInteger {
    /// Formats the value in the given radix using lowercase digits.
    pub fn to_str_radix(&self, radix: u32) -> Result<String, BigIntegerError> {
        check_radix(radix)?;
        if self.magnitude.is_empty() {
            return Ok("0".to_string());
        }

        let (chunk_power, chunk_digits) = chunk_for(radix);
        let mut chunks = Vec::new();
        let mut remaining = self.magnitude.clone();
        while !remaining.is_empty() {
            let (quotient, chunk) = magnitude::div_rem_small(&remaining, chunk_power);
            chunks.push(chunk);
            remaining = quotient;
        }

        let mut text = String::with_capacity(chunks.len() * chunk_digits + 1);
        if self.negative {
            text.push('-');
        }
        for (index, chunk) in chunks.iter().rev().enumerate() {
            let digits = chunk_to_digits(*chunk, radix);
            if index > 0 {
                text.extend(std::iter::repeat('0').take(chunk_digits - digits.len()));
            }
            text.push_str(&digits);
        }
        Ok(text)
    }

    /// Parses a string of digits in the given radix with an optional sign.
    pub fn parse_radix(text: &str, radix: u32) -> Result<Self, BigIntegerError> {
        parse(text, radix)
    }
}

fn chunk_to_digits(mut chunk: Word, radix: u32) -> String {
    if chunk == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while chunk > 0 {
        if let Some(digit) = std::char::from_digit(chunk % radix, radix) {
            digits.push(digit);
        }
        chunk /= radix;
    }
    digits.iter().rev().collect()
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_str_radix(10).map_err(|_| fmt::Error)?;
        f.pad_integral(!self.negative, "", text.trim_start_matches('-'))
    }
}

impl FromStr for BigInteger {
    type Err = BigIntegerError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text, 10)
    }
}
