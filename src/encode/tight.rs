//! Tight encodings: short printable strings for permutations and integers.
//!
//! Permutations use one character `33 + index` for the first 93 indices of
//! S_N and the escape `~` followed by `33 + (index - 93)` for the rest.
//! Integers with `|v| < 45` use the single character `79 + v`; larger values
//! use a sign marker (`|` positive, `}` negative), a length character and
//! then the digits of `|v| - 45` in base 90, least significant first.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::core::char_coder::CharWriter;
use crate::core::perm::Perm;

pub(crate) const SINGLE_CHAR_PERMS: usize = 93;
pub(crate) const PERM_ESCAPE: char = '~';
pub(crate) const SMALL_INT_LIMIT: i64 = 45;
pub(crate) const INT_OFFSET: i64 = 79;
pub(crate) const POSITIVE_MARKER: char = '|';
pub(crate) const NEGATIVE_MARKER: char = '}';
pub(crate) const INT_BASE: u32 = 90;

pub fn encode_perm<const N: usize, W: CharWriter>(perm: Perm<N>, writer: &mut W) {
    let idx = perm.sn_index();
    if idx < SINGLE_CHAR_PERMS {
        writer.write_char((33 + idx as u8) as char);
    } else {
        writer.write_char(PERM_ESCAPE);
        writer.write_char((33 + (idx - SINGLE_CHAR_PERMS) as u8) as char);
    }
}

pub fn encode_int<W: CharWriter>(value: &BigInt, writer: &mut W) {
    if let Some(small) = value.to_i64().filter(|v| v.abs() < SMALL_INT_LIMIT) {
        writer.write_char((INT_OFFSET + small) as u8 as char);
        return;
    }
    writer.write_char(if value.is_negative() { NEGATIVE_MARKER } else { POSITIVE_MARKER });
    let mut rest = value.abs() - SMALL_INT_LIMIT;
    let base = BigInt::from(INT_BASE);
    let mut digits = Vec::new();
    while !rest.is_zero() {
        let (q, r) = rest.div_rem(&base);
        digits.push(r.to_u8().unwrap_or_default());
        rest = q;
    }
    writer.write_char((33 + digits.len() as u8) as char);
    for d in digits {
        writer.write_char((33 + d) as char);
    }
}

/// Shorthand for machine-sized integers.
pub fn encode_i64<W: CharWriter>(value: i64, writer: &mut W) {
    encode_int(&BigInt::from(value), writer);
}
