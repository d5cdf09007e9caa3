//! Character-level readers and writers shared by the printable encodings
//! (isomorphism signatures, dehydration strings, tight encodings).

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// The 64-character alphabet of isomorphism signatures, in value order.
pub const SIG_ALPHABET: &[u8; 64] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789+-";

#[inline]
pub fn sig_char(value: u8) -> char {
    SIG_ALPHABET[(value & 63) as usize] as char
}

#[inline]
pub fn sig_value(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - b'a'),
        'A'..='Z' => Some(c as u8 - b'A' + 26),
        '0'..='9' => Some(c as u8 - b'0' + 52),
        '+' => Some(62),
        '-' => Some(63),
        _ => None,
    }
}

/// Number of six-bit characters needed to write `value`.
pub fn sig_chars_for(mut value: usize) -> usize {
    let mut n = 0;
    while value > 0 {
        value >>= 6;
        n += 1;
    }
    n
}

pub trait CharWriter {
    fn write_char(&mut self, c: char);

    fn write_sig_value(&mut self, value: u8) {
        self.write_char(sig_char(value));
    }

    /// Writes `value` as `n_chars` six-bit characters, least significant first.
    fn write_sig_int(&mut self, value: usize, n_chars: usize) {
        for i in 0..n_chars {
            self.write_sig_value(((value >> (6 * i)) & 63) as u8);
        }
    }

    /// Packs up to three values in `0..4` into one character.
    fn write_sig_trits(&mut self, trits: &[u8]) {
        debug_assert!(trits.len() <= 3);
        let packed = trits.iter().enumerate().fold(0u8, |acc, (i, &t)| acc | (t << (2 * i)));
        self.write_sig_value(packed);
    }
}

impl CharWriter for String {
    fn write_char(&mut self, c: char) {
        self.push(c);
    }
}

/// Forwards every character to a closure.
pub struct FunctionalCharWriter<W> {
    write_fn: W,
}

impl<W: FnMut(char)> CharWriter for FunctionalCharWriter<W> {
    fn write_char(&mut self, c: char) {
        (self.write_fn)(c);
    }
}

impl<W: FnMut(char)> FunctionalCharWriter<W> {
    pub fn new(write_fn: W) -> Self {
        Self { write_fn }
    }
}

pub trait CharReader {
    fn read_char(&mut self) -> Result<char, ReaderErr>;

    fn is_exhausted(&mut self) -> bool;

    fn read_sig_value(&mut self) -> Result<u8, ReaderErr> {
        let c = self.read_char()?;
        sig_value(c).ok_or(ReaderErr::InvalidCharacter(c))
    }

    fn read_sig_int(&mut self, n_chars: usize) -> Result<usize, ReaderErr> {
        let mut value = 0;
        for i in 0..n_chars {
            value |= (self.read_sig_value()? as usize) << (6 * i);
        }
        Ok(value)
    }

    fn read_sig_trits(&mut self) -> Result<[u8; 3], ReaderErr> {
        let packed = self.read_sig_value()?;
        Ok([packed & 3, (packed >> 2) & 3, (packed >> 4) & 3])
    }
}

impl CharReader for Peekable<Chars<'_>> {
    fn read_char(&mut self) -> Result<char, ReaderErr> {
        self.next().ok_or(ReaderErr::NotEnoughData)
    }

    fn is_exhausted(&mut self) -> bool {
        self.peek().is_none()
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderErr {
    #[error("Unexpected character {0:?}")]
    InvalidCharacter(char),
    #[error("Not enough data to read")]
    NotEnoughData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_is_consistent() {
        for v in 0..64u8 {
            assert_eq!(sig_value(sig_char(v)), Some(v));
        }
        assert_eq!(sig_value('!'), None);
    }

    #[test]
    fn six_bit_integers() {
        let mut out = String::new();
        out.write_sig_int(4100, 3);
        out.write_sig_trits(&[1, 2]);
        assert_eq!(out.len(), 4);
        let mut reader = out.chars().peekable();
        assert_eq!(reader.read_sig_int(3).unwrap(), 4100);
        assert_eq!(reader.read_sig_trits().unwrap(), [1, 2, 0]);
        assert!(reader.is_exhausted());
        assert_eq!(reader.read_char(), Err(ReaderErr::NotEnoughData));
    }

    #[test]
    fn functional_writer_forwards() {
        let mut seen = Vec::new();
        {
            let mut writer = FunctionalCharWriter::new(|c| seen.push(c));
            writer.write_sig_int(1, 2);
        }
        assert_eq!(seen, vec!['b', 'a']);
        assert_eq!(sig_chars_for(0), 0);
        assert_eq!(sig_chars_for(63), 1);
        assert_eq!(sig_chars_for(64), 2);
    }
}
