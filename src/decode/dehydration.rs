//! Census dehydration strings for closed 3-manifold triangulations.
//!
//! A dehydration string is a run of letters: the number of tetrahedra, a
//! bit field (two letters per byte, low nibble second) flagging which
//! gluings discover a new tetrahedron, then one destination letter and one
//! permutation letter for every remaining gluing.

use thiserror::Error;

use crate::core::char_coder::{CharReader, ReaderErr};
use crate::core::perm::Perm4;
use crate::core::shared::{ErrorKind, SimplexIdx};
use crate::core::triangulation::{self, Triangulation3};

/// Gluing permutations addressed by the permutation letters, packed two bits
/// per image with image `i` stored as `3 - field(i)`.
const PERM_CODES: [u8; 24] = [
    0xE4, 0xE1, 0xD8, 0xD2, 0xC9, 0xC6, 0xB4, 0xB1, 0x9C, 0x93, 0x8D, 0x87,
    0x78, 0x72, 0x6C, 0x63, 0x4E, 0x4B, 0x39, 0x36, 0x2D, 0x27, 0x1E, 0x1B,
];

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Dehydration string contains the invalid character {0:?}.")]
    InvalidCharacter(char),
    #[error("Destination tetrahedron {0} is out of range.")]
    InvalidDestination(usize),
    #[error("Dehydration string has length {found}, expected {expected}.")]
    InvalidLength { expected: usize, found: usize },
    #[error("Permutation letter {0} is out of range.")]
    InvalidPermutation(usize),
    #[error("Dehydration string asks for more tetrahedra than it declares.")]
    NotEnoughTetrahedra,
    #[error("Dehydration string asks for an impossible gluing: {0}")]
    Triangulation(#[from] triangulation::Err),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

fn letter<R: CharReader>(reader: &mut R) -> Result<usize, Err> {
    match reader.read_char() {
        Ok(c) if c.is_ascii_alphabetic() => Ok((c.to_ascii_lowercase() as u8 - b'a') as usize),
        Ok(c) => Err(Err::InvalidCharacter(c)),
        Err(ReaderErr::InvalidCharacter(c)) => Err(Err::InvalidCharacter(c)),
        Err(ReaderErr::NotEnoughData) => Err(Err::InvalidLength { expected: 1, found: 0 }),
    }
}

fn gluing_perm(code: usize) -> Result<Perm4, Err> {
    let packed = *PERM_CODES.get(code).ok_or(Err::InvalidPermutation(code))?;
    let images = std::array::from_fn(|i| 3 - ((packed >> (2 * i)) & 3) as usize);
    Perm4::from_images(images).map_err(|_| Err::InvalidPermutation(code))
}

/// Rebuilds the triangulation described by a dehydration string.
pub fn rehydrate(s: &str) -> Result<Triangulation3, Err> {
    let mut reader = s.chars().peekable();
    let n = letter(&mut reader)?;
    let found = s.chars().count();
    if n == 0 {
        return Err(Err::InvalidLength { expected: 3, found });
    }
    let bit_letters = 2 * ((2 * n + 7) / 8);
    let expected = 1 + bit_letters + 2 * (n + 1);
    if found != expected {
        return Err(Err::InvalidLength { expected, found });
    }

    let mut new_tet = Vec::with_capacity(4 * bit_letters);
    for _ in 0..bit_letters / 2 {
        let hi = letter(&mut reader)?;
        let lo = letter(&mut reader)?;
        if hi >= 16 || lo >= 16 {
            return Err(Err::InvalidCharacter((b'a' + hi.max(lo) as u8) as char));
        }
        let byte = hi * 16 + lo;
        new_tet.extend((0..8).map(|j| (byte >> j) & 1 == 1));
    }
    let dests = (0..=n).map(|_| letter(&mut reader)).collect::<Result<Vec<_>, _>>()?;
    let perms = (0..=n).map(|_| letter(&mut reader)).collect::<Result<Vec<_>, _>>()?;

    let mut tri = Triangulation3::new();
    {
        let mut span = tri.change();
        span.new_simplices(n);
        let mut next_new = 1;
        let mut gluing = 0;
        let mut old = 0;
        for t in 0..n {
            let t = SimplexIdx::from(t);
            for face in 0..4 {
                if span.simplex(t).adjacent(face).is_some() {
                    continue;
                }
                if new_tet[gluing] {
                    if next_new >= n {
                        return Err(Err::NotEnoughTetrahedra);
                    }
                    span.join(t, face, SimplexIdx::from(next_new), Perm4::identity())?;
                    next_new += 1;
                } else {
                    let (Some(&dest), Some(&code)) = (dests.get(old), perms.get(old)) else {
                        return Err(Err::InvalidLength { expected, found: expected + 1 });
                    };
                    if dest >= n {
                        return Err(Err::InvalidDestination(dest));
                    }
                    span.join(t, face, SimplexIdx::from(dest), gluing_perm(code)?)?;
                    old += 1;
                }
                gluing += 1;
            }
        }
    }
    tracing::debug!(dehydration = s, size = n, "rehydrated triangulation");
    Ok(tri)
}

impl Triangulation3 {
    pub fn rehydrate(s: &str) -> Result<Self, Err> {
        rehydrate(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_strings_rehydrate() {
        for (s, h1) in [
            ("cabbbbmlq", "Z + Z_5"),
            ("gepaacdfefefknakanx", "Z + 2 Z_2"),
            ("jofbdaabccfhgihiiffhofoxohx", "Z + Z_2 + Z_4"),
            ("gepaacdfefefaaknnkx", "Z + Z_4"),
            ("baaaade", "Z"),
            ("eanadccdnxfno", "2 Z"),
            ("eahcdbddbokpv", "Z + Z_2"),
            ("cabbbbaei", "Z"),
        ] {
            let tri = rehydrate(s).unwrap();
            assert_eq!(tri.size(), s.as_bytes()[0] as usize - b'a' as usize);
            assert!(tri.is_closed(), "{s}");
            assert!(tri.is_valid(), "{s}");
            assert_eq!(tri.homology_h1().to_string(), h1, "{s}");
        }
    }

    #[test]
    fn uppercase_is_accepted() {
        let lower = rehydrate("cabbbbmlq").unwrap();
        let upper = rehydrate("CABBBBMLQ").unwrap();
        assert!(lower.is_identical_to(&upper));
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert_eq!(rehydrate("cabbbbml").unwrap_err(), Err::InvalidLength { expected: 9, found: 8 });
        assert_eq!(rehydrate("cabbb1mlq").unwrap_err(), Err::InvalidCharacter('1'));
        assert_eq!(rehydrate("cabbbzmlq").unwrap_err(), Err::InvalidDestination(25));
        assert_eq!(rehydrate("cabbbbmlz").unwrap_err(), Err::InvalidPermutation(25));
        assert!(matches!(rehydrate(""), Err(Err::InvalidLength { .. })));
    }
}
