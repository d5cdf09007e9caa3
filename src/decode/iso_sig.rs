use thiserror::Error;

use crate::core::char_coder::{CharReader, ReaderErr};
use crate::core::perm::Perm;
use crate::core::shared::{ErrorKind, SimplexIdx};
use crate::core::triangulation::{self, Triangulation};
use crate::encode::iso_sig::{chars_per_perm, SIZE_ESCAPE};

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Signature uses more facet actions than there are facets.")]
    ExtraneousActions,
    #[error("Signature ends before it is complete.")]
    Incomplete,
    #[error("Facet action {0} is not 0, 1 or 2.")]
    InvalidAction(u8),
    #[error("Signature contains the invalid character {0:?}.")]
    InvalidCharacter(char),
    #[error("Gluing destination {0} is out of range.")]
    InvalidDestination(usize),
    #[error("Gluing index {0} does not name a permutation.")]
    InvalidPermutation(usize),
    #[error("Signature asks for an impossible gluing: {0}")]
    Triangulation(#[from] triangulation::Err),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

impl From<ReaderErr> for Err {
    fn from(e: ReaderErr) -> Self {
        match e {
            ReaderErr::InvalidCharacter(c) => Err::InvalidCharacter(c),
            ReaderErr::NotEnoughData => Err::Incomplete,
        }
    }
}

/// Reads one component and appends it to `tri`.
fn decode_component<const N: usize, R: CharReader>(reader: &mut R, tri: &mut Triangulation<N>) -> Result<(), Err> {
    let first = reader.read_sig_value()?;
    let (size, n_chars) = if first < SIZE_ESCAPE {
        (first as usize, 1)
    } else {
        let n_chars = reader.read_sig_value()? as usize;
        (reader.read_sig_int(n_chars)?, n_chars)
    };
    if size == 0 {
        return Ok(());
    }

    // Actions are read lazily: a facet glued from an earlier simplex needs none.
    let mut actions = Vec::new();
    let mut consumed_facets = 0;
    while consumed_facets < N * size {
        for action in reader.read_sig_trits()? {
            if consumed_facets == N * size {
                if action != 0 {
                    return Err(Err::ExtraneousActions);
                }
                continue;
            }
            consumed_facets += match action {
                0 => 1,
                1 | 2 => 2,
                a => return Err(Err::InvalidAction(a)),
            };
            actions.push(action);
        }
    }
    if consumed_facets > N * size {
        return Err(Err::ExtraneousActions);
    }

    let n_joins = actions.iter().filter(|&&a| a == 2).count();
    let mut dests = Vec::with_capacity(n_joins);
    for _ in 0..n_joins {
        let dest = reader.read_sig_int(n_chars)?;
        if dest >= size {
            return Err(Err::InvalidDestination(dest));
        }
        dests.push(dest);
    }
    let per_perm = chars_per_perm(Perm::<N>::N_PERMS);
    let mut gluings = Vec::with_capacity(n_joins);
    for _ in 0..n_joins {
        let idx = reader.read_sig_int(per_perm)?;
        let perm = Perm::<N>::from_ordered_sn_index(idx).map_err(|_| Err::InvalidPermutation(idx))?;
        gluings.push(perm);
    }

    let offset = tri.size();
    tri.new_simplices(size);
    let simplex = |i: usize| SimplexIdx::from(offset + i);
    let mut actions = actions.into_iter();
    let mut joins = dests.into_iter().zip(gluings);
    let mut next_new = 1;
    for s in 0..size {
        for facet in 0..N {
            if tri.simplex(simplex(s)).adjacent(facet).is_some() {
                continue;
            }
            match actions.next().ok_or(Err::Incomplete)? {
                0 => {}
                1 => {
                    if next_new >= size {
                        return Err(Err::InvalidDestination(next_new));
                    }
                    tri.join(simplex(s), facet, simplex(next_new), Perm::identity())?;
                    next_new += 1;
                }
                _ => {
                    let (dest, gluing) = joins.next().ok_or(Err::Incomplete)?;
                    tri.join(simplex(s), facet, simplex(dest), gluing)?;
                }
            }
        }
    }
    if actions.next().is_some() {
        return Err(Err::ExtraneousActions);
    }
    Ok(())
}

/// Rebuilds a triangulation from its isomorphism signature.
///
/// On error no partial triangulation is returned.
pub fn decode<const N: usize>(sig: &str) -> Result<Triangulation<N>, Err> {
    let mut reader = sig.chars().peekable();
    let mut tri = Triangulation::<N>::new();
    {
        let mut span = tri.change();
        if reader.is_exhausted() {
            return Err(Err::Incomplete);
        }
        while !reader.is_exhausted() {
            decode_component(&mut reader, &mut span)?;
        }
    }
    tracing::trace!(sig, size = tri.size(), "decoded isomorphism signature");
    Ok(tri)
}

impl<const N: usize> Triangulation<N> {
    pub fn from_iso_sig(sig: &str) -> Result<Self, Err> {
        decode(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::triangulation::{factory, Triangulation2, Triangulation3, Triangulation4};

    #[test]
    fn figure_eight_round_trip() {
        let tri = Triangulation3::from_iso_sig("cPcbbbiht").unwrap();
        assert_eq!(tri.size(), 2);
        assert!(tri.is_ideal());
        assert_eq!(tri.iso_sig(), "cPcbbbiht");
        assert!(tri.is_orientable());
    }

    #[test]
    fn lens_space_signatures_decode() {
        for (sig, order) in [("cMcabbjqs", 8), ("cMcabbgaj", 3), ("bkaajn", 5), ("fLAMcbcbdeehhjhhs", 8)] {
            let tri = Triangulation3::from_iso_sig(sig).unwrap();
            assert!(tri.is_closed());
            assert_eq!(tri.homology_h1().to_string(), format!("Z_{order}"));
            assert_eq!(tri.iso_sig(), sig);
        }
    }

    #[test]
    fn factories_survive_a_round_trip() {
        for tri in [factory::rp3(), factory::layered_lens_space(21, 8).unwrap(), factory::layered_solid_torus(3, 5).unwrap()] {
            let sig = tri.iso_sig();
            let back = Triangulation3::from_iso_sig(&sig).unwrap();
            assert_eq!(back.size(), tri.size());
            assert_eq!(back.iso_sig(), sig);
        }
    }

    #[test]
    fn other_dimensions_round_trip() {
        let mut surface = Triangulation2::new();
        let s = surface.new_simplices(2);
        for f in 0..3 {
            surface.join(s[0], f, s[1], crate::core::perm::Perm3::identity()).unwrap();
        }
        let sig = surface.iso_sig();
        assert_eq!(Triangulation2::from_iso_sig(&sig).unwrap().iso_sig(), sig);

        let mut four = Triangulation4::new();
        let p = four.new_simplices(2);
        four.join(p[0], 4, p[1], crate::core::perm::Perm5::rot(1)).unwrap();
        let sig = four.iso_sig();
        let back = Triangulation4::from_iso_sig(&sig).unwrap();
        assert_eq!(back.size(), 2);
        assert_eq!(back.iso_sig(), sig);
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        assert_eq!(Triangulation3::from_iso_sig("").unwrap_err(), Err::Incomplete);
        assert_eq!(Triangulation3::from_iso_sig("cPcbbbih").unwrap_err(), Err::Incomplete);
        assert_eq!(Triangulation3::from_iso_sig("cPcbbbi!t").unwrap_err(), Err::InvalidCharacter('!'));
        assert!(matches!(Triangulation3::from_iso_sig("bP"), Err(Err::InvalidAction(3))));
        assert!(Triangulation3::from_iso_sig("a").unwrap().is_empty());
    }
}
