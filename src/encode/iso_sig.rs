//! Isomorphism signatures: canonical printable strings that identify a
//! triangulation up to relabelling of simplices and vertices.
//!
//! For one connected component and one choice of starting simplex and
//! vertex labelling, the simplices are renumbered in breadth-first order
//! and every facet is described by an action: 0 for a boundary facet, 1 for
//! a gluing that discovers a new simplex, 2 for a gluing back to a simplex
//! already seen. The signature of the component is the lexicographically
//! smallest such description over all starting choices; the signatures of
//! the components are sorted and concatenated.

use crate::core::char_coder::{sig_chars_for, CharWriter};
use crate::core::perm::Perm;
use crate::core::shared::{ConfigType, SimplexIdx};
use crate::core::triangulation::Triangulation;

/// Escape value in the first character announcing a long size field.
pub(crate) const SIZE_ESCAPE: u8 = 63;

#[derive(Clone, Debug)]
pub struct Config {
    /// When false, each component is encoded from its lowest simplex with
    /// the identity labelling only. The result still decodes to the same
    /// triangulation but is no longer an isomorphism invariant.
    pub canonical: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self { canonical: true }
    }
}

/// Characters used by one gluing permutation.
pub(crate) const fn chars_per_perm(n_perms: usize) -> usize {
    if n_perms <= 64 {
        1
    } else {
        2
    }
}

/// Actions, destinations and gluings for one traversal of a component.
struct Traversal {
    size: usize,
    actions: Vec<u8>,
    dests: Vec<usize>,
    gluings: Vec<usize>,
}

impl Traversal {
    fn write<const N: usize, W: CharWriter>(&self, writer: &mut W) {
        let n_chars = if self.size < SIZE_ESCAPE as usize {
            writer.write_sig_value(self.size as u8);
            1
        } else {
            let n_chars = sig_chars_for(self.size);
            writer.write_sig_value(SIZE_ESCAPE);
            writer.write_sig_value(n_chars as u8);
            writer.write_sig_int(self.size, n_chars);
            n_chars
        };
        for chunk in self.actions.chunks(3) {
            writer.write_sig_trits(chunk);
        }
        for &dest in &self.dests {
            writer.write_sig_int(dest, n_chars);
        }
        let per_perm = chars_per_perm(Perm::<N>::N_PERMS);
        for &gluing in &self.gluings {
            writer.write_sig_int(gluing, per_perm);
        }
    }
}

/// Encodes the component containing `start`, relabelling `start` by the
/// inverse of `vertices`.
fn traverse<const N: usize>(tri: &Triangulation<N>, start: SimplexIdx, vertices: Perm<N>) -> Traversal {
    let n = tri.size();
    let mut image = vec![usize::MAX; n];
    let mut preimage = Vec::new();
    let mut vertex_map = vec![Perm::<N>::identity(); n];
    image[start.get()] = 0;
    preimage.push(start);
    vertex_map[start.get()] = vertices.inverse();

    let mut actions = Vec::new();
    let mut dests = Vec::new();
    let mut gluings = Vec::new();
    let mut next = 0;
    while next < preimage.len() {
        let src = preimage[next];
        let simp = tri.simplex(src);
        let src_map = vertex_map[src.get()];
        for facet_img in 0..N {
            let facet = src_map.pre(facet_img);
            let (Some(dest), Some(g)) = (simp.adjacent(facet), simp.gluing(facet)) else {
                actions.push(0);
                continue;
            };
            let dest_img = image[dest.get()];
            if dest_img != usize::MAX {
                let adj_facet = g.image(facet);
                if dest_img < next || (dest == src && src_map.image(adj_facet) < facet_img) {
                    continue;
                }
            }
            if dest_img == usize::MAX {
                image[dest.get()] = preimage.len();
                preimage.push(dest);
                vertex_map[dest.get()] = src_map * g.inverse();
                actions.push(1);
                continue;
            }
            dests.push(dest_img);
            gluings.push((vertex_map[dest.get()] * g * src_map.inverse()).ordered_sn_index());
            actions.push(2);
        }
        next += 1;
    }
    Traversal { size: preimage.len(), actions, dests, gluings }
}

fn encode_component<const N: usize>(tri: &Triangulation<N>, start: SimplexIdx, vertices: Perm<N>) -> String {
    let mut out = String::new();
    traverse(tri, start, vertices).write::<N, _>(&mut out);
    out
}

/// The isomorphism signature of a triangulation.
pub fn iso_sig<const N: usize>(tri: &Triangulation<N>, cfg: &Config) -> String {
    if tri.is_empty() {
        let mut out = String::new();
        out.write_sig_value(0);
        return out;
    }
    let mut parts = tri
        .components()
        .iter()
        .map(|comp| {
            let simplices = comp.simplices();
            if !cfg.canonical {
                return encode_component(tri, simplices[0], Perm::identity());
            }
            let mut best: Option<String> = None;
            for &start in simplices {
                for code in 0..Perm::<N>::N_PERMS {
                    let Ok(vertices) = Perm::<N>::from_sn_index(code) else { continue };
                    let candidate = encode_component(tri, start, vertices);
                    if best.as_ref().is_none_or(|b| candidate < *b) {
                        best = Some(candidate);
                    }
                }
            }
            best.unwrap_or_default()
        })
        .collect::<Vec<_>>();
    parts.sort();
    tracing::trace!(components = parts.len(), "computed isomorphism signature");
    parts.concat()
}

impl<const N: usize> Triangulation<N> {
    /// The canonical isomorphism signature.
    pub fn iso_sig(&self) -> String {
        iso_sig(self, &Config::default())
    }
}
