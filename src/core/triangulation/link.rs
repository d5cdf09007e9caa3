use std::collections::HashMap;

use crate::core::face_numbering::FaceNumbering;
use crate::core::perm::Perm;
use crate::core::shared::SimplexIdx;

use super::face::Embeddings;
use super::{Err, Triangulation};

/// Builds the link of a k-face as a triangulation with M-vertex simplices,
/// where `M = N - k - 1`.
///
/// Link simplex `i` sits opposite embedding `i` of the face, and its facet
/// `a` corresponds to facet `vertices[k + 1 + a]` of the ambient simplex.
pub(crate) fn build<const N: usize, const M: usize>(
    tri: &Triangulation<N>,
    k: usize,
    embeddings: &Embeddings<N>,
) -> Result<Triangulation<M>, Err> {
    if M + k + 1 != N {
        return Err(Err::Unsupported(format!(
            "the link of a {k}-face in dimension {} has dimension {}",
            N - 1,
            N - k - 2
        )));
    }
    let embs = embeddings.iter().copied().collect::<Vec<_>>();
    let lookup = embs
        .iter()
        .enumerate()
        .map(|(i, e)| ((e.simplex, e.face), i))
        .collect::<HashMap<(SimplexIdx, usize), usize>>();

    let mut link = Triangulation::<M>::new();
    {
        let mut span = link.change();
        let simplices = span.new_simplices(embs.len());
        for (i, emb) in embs.iter().enumerate() {
            let simp = tri.simplex(emb.simplex);
            for a in 0..M {
                let j = emb.vertices.image(k + 1 + a);
                let (Some(t), Some(g)) = (simp.adjacent(j), simp.gluing(j)) else {
                    continue;
                };
                if span.simplex(simplices[i]).adjacent(a).is_some() {
                    continue;
                }
                let across = g * emb.vertices;
                let nf = FaceNumbering::<N>::face_number(k, across);
                let &other = lookup.get(&(t, nf)).ok_or_else(|| {
                    Err::Unsupported(format!("embedding ({t}, {nf}) is missing from the face"))
                })?;
                let q = embs[other].vertices.inverse() * across;
                let images = std::array::from_fn(|b| q.image(k + 1 + b).wrapping_sub(k + 1));
                let p = Perm::<M>::from_images(images)?;
                span.join(simplices[i], a, simplices[other], p)?;
            }
        }
    }
    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perm::Perm4;
    use crate::core::shared::FaceIdx;
    use crate::core::triangulation::Triangulation3;

    #[test]
    fn vertex_link_of_a_lone_tetrahedron_is_a_triangle() {
        let mut tri = Triangulation3::new();
        tri.new_simplex();
        let vertex = tri.face(0, FaceIdx::from(0)).unwrap();
        let link = build::<4, 3>(&tri, 0, vertex.embeddings()).unwrap();
        assert_eq!(link.size(), 1);
        assert_eq!(link.count_boundary_facets(), 3);
    }

    #[test]
    fn edge_link_is_a_path_or_cycle() {
        let mut tri = Triangulation3::new();
        let s = tri.new_simplices(2);
        tri.join(s[0], 0, s[1], Perm4::identity()).unwrap();
        tri.join(s[0], 1, s[1], Perm4::identity()).unwrap();
        let edge = tri.simplex_face(s[0], 1, 5);
        let face = tri.face(1, edge).unwrap();
        let link = build::<4, 2>(&tri, 1, face.embeddings()).unwrap();
        assert_eq!(link.size(), 2);
        assert!(!link.has_boundary_facets());
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mut tri = Triangulation3::new();
        tri.new_simplex();
        let vertex = tri.face(0, FaceIdx::from(0)).unwrap();
        assert!(matches!(build::<4, 2>(&tri, 0, vertex.embeddings()), Err(Err::Unsupported(_))));
    }
}
