//! Splitting-surface signatures, written in cycle notation such as
//! `(abb)(ac)(c)`.
//!
//! Every letter names a tetrahedron and appears exactly twice. Consecutive
//! letters in a cycle are glued exit face to entry face, with the faces used
//! by an occurrence depending on whether it is the first or second
//! appearance of its letter. An uppercase occurrence is glued with its two
//! free vertices exchanged.

use thiserror::Error;

use crate::core::perm::Perm4;
use crate::core::shared::{ErrorKind, SimplexIdx};
use crate::core::triangulation::{self, Triangulation3};

const SEPARATORS: &[char] = &['(', ')', '.', ',', ';', ':', '|', '-'];

/// (face, a, b, c) for the first and second appearance of a letter.
const EXIT: [[usize; 4]; 2] = [[3, 0, 1, 2], [1, 2, 3, 0]];
const ENTRY: [[usize; 4]; 2] = [[2, 0, 1, 3], [0, 2, 3, 1]];

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Signature contains no cycles.")]
    Empty,
    #[error("Signature contains the invalid character {0:?}.")]
    InvalidCharacter(char),
    #[error("Letter {letter:?} appears {count} times instead of twice.")]
    LetterCount { letter: char, count: usize },
    #[error("Letter {0:?} is skipped although later letters are used.")]
    SkippedLetter(char),
    #[error("Signature asks for an impossible gluing: {0}")]
    Triangulation(#[from] triangulation::Err),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

#[derive(Clone, Copy, Debug)]
struct Occurrence {
    simplex: usize,
    second: bool,
    upper: bool,
}

impl Occurrence {
    fn faces(self, table: &[[usize; 4]; 2]) -> [usize; 4] {
        let mut f = table[self.second as usize];
        if self.upper {
            f.swap(1, 2);
        }
        f
    }
}

/// Splits a signature into cycles of occurrences.
fn parse(sig: &str) -> Result<(usize, Vec<Vec<Occurrence>>), Err> {
    let mut seen = [0usize; 26];
    let mut cycles = Vec::new();
    for part in sig.split(SEPARATORS).filter(|p| !p.is_empty()) {
        let mut cycle = Vec::with_capacity(part.len());
        for c in part.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Err::InvalidCharacter(c));
            }
            let simplex = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            cycle.push(Occurrence { simplex, second: seen[simplex] > 0, upper: c.is_ascii_uppercase() });
            seen[simplex] += 1;
        }
        cycles.push(cycle);
    }
    if cycles.is_empty() {
        return Err(Err::Empty);
    }
    let n = seen.iter().rposition(|&k| k > 0).map_or(0, |i| i + 1);
    for (i, &count) in seen[..n].iter().enumerate() {
        let letter = (b'a' + i as u8) as char;
        match count {
            0 => return Err(Err::SkippedLetter(letter)),
            2 => {}
            _ => return Err(Err::LetterCount { letter, count }),
        }
    }
    Ok((n, cycles))
}

/// Builds the closed triangulation described by a splitting-surface signature.
pub fn decode(sig: &str) -> Result<Triangulation3, Err> {
    let (n, cycles) = parse(sig)?;
    let mut tri = Triangulation3::new();
    {
        let mut span = tri.change();
        span.new_simplices(n);
        for cycle in &cycles {
            for (i, &from) in cycle.iter().enumerate() {
                let to = cycle[(i + 1) % cycle.len()];
                let [f, a, b, c] = from.faces(&EXIT);
                let [g, a2, b2, c2] = to.faces(&ENTRY);
                let mut images = [0; 4];
                images[f] = g;
                images[a] = a2;
                images[b] = b2;
                images[c] = c2;
                let perm = Perm4::from_images(images).map_err(triangulation::Err::from)?;
                span.join(SimplexIdx::from(from.simplex), f, SimplexIdx::from(to.simplex), perm)?;
            }
        }
    }
    tracing::debug!(sig, size = n, "decoded splitting surface signature");
    Ok(tri)
}

impl Triangulation3 {
    pub fn from_splitting_signature(sig: &str) -> Result<Self, Err> {
        decode(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_tetrahedron_signature() {
        let tri = decode("(abb)(ac)(c)").unwrap();
        assert_eq!(tri.size(), 3);
        assert!(tri.is_closed());
        assert!(tri.is_valid());
        assert!(tri.is_orientable());
        assert_eq!(tri.homology_h1().to_string(), "Z_4");
    }

    #[test]
    fn separators_are_interchangeable() {
        for (sig, h1) in [
            ("aabcb.cd.d", "Z_8"),
            ("aabccd.b.d", "2 Z_2"),
            ("abcd.abe.c.d.e", "0"),
            ("aabcd.be.c.d.e", "Z_2"),
            ("abc.abd.cef.de.fg.g", "0"),
            ("aabcdedcfb.fg.e.g", "Z_2"),
            ("aabcdb.cedfef", "Z_2 + Z_6"),
        ] {
            let tri = decode(sig).unwrap();
            assert!(tri.is_orientable(), "{sig}");
            assert_eq!(tri.homology_h1().to_string(), h1, "{sig}");
        }
        let dotted = decode("abb.ac.c").unwrap();
        let mixed = decode("(abb);ac|c").unwrap();
        assert!(dotted.is_identical_to(&mixed));
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        assert_eq!(decode("()").unwrap_err(), Err::Empty);
        assert_eq!(decode("(ab1)").unwrap_err(), Err::InvalidCharacter('1'));
        assert_eq!(decode("(abb)").unwrap_err(), Err::LetterCount { letter: 'a', count: 1 });
        assert_eq!(decode("(abbb)(a)").unwrap_err(), Err::LetterCount { letter: 'b', count: 3 });
        assert_eq!(decode("(aacc)").unwrap_err(), Err::SkippedLetter('b'));
    }
}
