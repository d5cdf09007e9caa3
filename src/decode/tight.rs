//! Decoders for the tight encodings written by `encode::tight`.

use num_bigint::BigInt;
use thiserror::Error;

use crate::core::char_coder::{CharReader, ReaderErr};
use crate::core::perm::{self, Perm};
use crate::core::shared::ErrorKind;
use crate::encode::tight::{
    INT_BASE, INT_OFFSET, NEGATIVE_MARKER, PERM_ESCAPE, POSITIVE_MARKER, SINGLE_CHAR_PERMS, SMALL_INT_LIMIT,
};

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Tight encoding ends before the integer is complete.")]
    IncompleteEncoding,
    #[error("Tight encoding is followed by unexpected characters.")]
    TrailingCharacters,
    #[error("Tight encoding character {0:?} is out of range.")]
    ValueOutOfRange(char),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidEncoding
    }
}

impl From<ReaderErr> for Err {
    fn from(e: ReaderErr) -> Self {
        match e {
            ReaderErr::InvalidCharacter(c) => Err::ValueOutOfRange(c),
            ReaderErr::NotEnoughData => Err::IncompleteEncoding,
        }
    }
}

fn perm_err(e: ReaderErr) -> perm::Err {
    match e {
        ReaderErr::InvalidCharacter(c) => perm::Err::ValueOutOfRange(c),
        ReaderErr::NotEnoughData => perm::Err::IncompleteEncoding,
    }
}

/// Reads one tightly encoded permutation from the stream.
pub fn decode_perm<const N: usize, R: CharReader>(reader: &mut R) -> Result<Perm<N>, perm::Err> {
    let c = reader.read_char().map_err(perm_err)?;
    let idx = if c == PERM_ESCAPE {
        let d = reader.read_char().map_err(perm_err)?;
        if !('!'..='~').contains(&d) {
            return Err(perm::Err::ValueOutOfRange(d));
        }
        SINGLE_CHAR_PERMS + (d as usize - 33)
    } else {
        if !('!'..'~').contains(&c) {
            return Err(perm::Err::ValueOutOfRange(c));
        }
        c as usize - 33
    };
    if idx >= Perm::<N>::N_PERMS {
        return Err(perm::Err::ValueOutOfRange(c));
    }
    Perm::from_sn_index(idx)
}

/// Decodes a string holding exactly one tightly encoded permutation.
pub fn decode_perm_str<const N: usize>(s: &str) -> Result<Perm<N>, perm::Err> {
    let mut reader = s.chars().peekable();
    let perm = decode_perm(&mut reader)?;
    if !reader.is_exhausted() {
        return Err(perm::Err::TrailingCharacters);
    }
    Ok(perm)
}

/// Reads one tightly encoded integer from the stream.
pub fn decode_int<R: CharReader>(reader: &mut R) -> Result<BigInt, Err> {
    let c = reader.read_char()?;
    let small = c as i64 - INT_OFFSET;
    if small.abs() < SMALL_INT_LIMIT {
        return Ok(BigInt::from(small));
    }
    let negative = match c {
        POSITIVE_MARKER => false,
        NEGATIVE_MARKER => true,
        _ => return Err(Err::ValueOutOfRange(c)),
    };
    let len_char = reader.read_char()?;
    let len = (len_char as usize).checked_sub(33).ok_or(Err::ValueOutOfRange(len_char))?;
    let mut digits = Vec::with_capacity(len);
    for _ in 0..len {
        let d = reader.read_char()?;
        let value = (d as u32).checked_sub(33).filter(|v| *v < INT_BASE).ok_or(Err::ValueOutOfRange(d))?;
        digits.push(value);
    }
    if digits.last() == Some(&0) {
        // Leading zero digits would give a second encoding of the same value.
        return Err(Err::ValueOutOfRange(len_char));
    }
    let magnitude = digits
        .iter()
        .rev()
        .fold(BigInt::from(0), |acc, &d| acc * INT_BASE + d)
        + SMALL_INT_LIMIT;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Decodes a string holding exactly one tightly encoded integer.
pub fn decode_int_str(s: &str) -> Result<BigInt, Err> {
    let mut reader = s.chars().peekable();
    let value = decode_int(&mut reader)?;
    if !reader.is_exhausted() {
        return Err(Err::TrailingCharacters);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perm::{Perm3, Perm5};
    use crate::encode::tight::{encode_i64, encode_perm};

    #[test]
    fn every_perm5_round_trips() {
        for idx in 0..120 {
            let p = Perm5::from_sn_index(idx).unwrap();
            let enc = p.tight_encoding();
            assert_eq!(enc.len(), if idx < 93 { 1 } else { 2 });
            assert_eq!(Perm5::tight_decode(&enc).unwrap(), p);
        }
    }

    #[test]
    fn malformed_perms_are_rejected() {
        assert_eq!(Perm5::tight_decode(""), Err(perm::Err::IncompleteEncoding));
        assert_eq!(Perm5::tight_decode("~"), Err(perm::Err::IncompleteEncoding));
        assert_eq!(Perm5::tight_decode("!!"), Err(perm::Err::TrailingCharacters));
        assert_eq!(Perm5::tight_decode("~<"), Err(perm::Err::ValueOutOfRange('~')));
        assert_eq!(Perm3::tight_decode("'"), Err(perm::Err::ValueOutOfRange('\'')));
        assert_eq!(Perm5::tight_decode(" "), Err(perm::Err::ValueOutOfRange(' ')));
    }

    #[test]
    fn integers_round_trip_through_a_stream() {
        let values = [0i64, 7, -44, 45, -46, 4049, 1 << 40, -(1 << 50)];
        let mut out = String::new();
        for v in values {
            encode_i64(v, &mut out);
        }
        let mut p = String::new();
        encode_perm(Perm3::transposition(0, 2), &mut p);
        out.push_str(&p);
        let mut reader = out.chars().peekable();
        for v in values {
            assert_eq!(decode_int(&mut reader).unwrap(), BigInt::from(v));
        }
        assert_eq!(decode_perm::<3, _>(&mut reader).unwrap(), Perm3::transposition(0, 2));
        assert!(reader.is_exhausted());
    }

    #[test]
    fn malformed_integers_are_rejected() {
        assert_eq!(decode_int_str(""), Err(Err::IncompleteEncoding));
        assert_eq!(decode_int_str("|\""), Err(Err::IncompleteEncoding));
        assert_eq!(decode_int_str("O!"), Err(Err::TrailingCharacters));
        assert_eq!(decode_int_str("~"), Err(Err::ValueOutOfRange('~')));
        assert_eq!(decode_int_str("|\"!"), Err(Err::ValueOutOfRange('"')));
    }
}
