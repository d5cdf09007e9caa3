//! The pieces of a block's boundary that lie on one facet of the outer
//! tetrahedron.
//!
//! A piece is a triangulated quadrilateral (two inner triangles) or hexagon
//! (four inner triangles). Each inner triangle is described by an inner
//! tetrahedron together with a permutation sending the triangle's own
//! vertices 0, 1, 2 to vertices of that tetrahedron; image 3 is the facet
//! of the tetrahedron that lies on the boundary. `outer` sends the piece's
//! vertices 0, 1, 2 to vertices of the outer tetrahedron, and `outer[3]` is
//! the outer facet the piece lies on.

use crate::core::perm::{perm4, Perm4};
use crate::core::shared::SimplexIdx;
use crate::core::triangulation::Triangulation3;

use crate::surface::Err;

#[enum_dispatch::enum_dispatch]
pub(crate) trait BoundaryImpl {
    /// Vertices of the outer tetrahedron at this piece's corners.
    fn outer(&self) -> Perm4;

    /// Glues this piece to `dest`, which lies on the other side of the same
    /// facet of the original triangulation. `outer_gluing` is that facet's
    /// gluing as seen from this piece's outer tetrahedron. Layerings are
    /// added to `dest` when its triangulation does not line up.
    fn join(&self, outer_gluing: Perm4, dest: &mut Boundary, ans: &mut Triangulation3) -> Result<(), Err>;
}

#[enum_dispatch::enum_dispatch(BoundaryImpl)]
#[derive(Clone, Copy, Debug)]
pub(crate) enum Boundary {
    Quad(BdryQuad),
    Hex(BdryHex),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BdryQuad {
    outer: Perm4,
    tets: [SimplexIdx; 2],
    vertices: [Perm4; 2],
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct BdryHex {
    outer: Perm4,
    tets: [SimplexIdx; 4],
    vertices: [Perm4; 4],
}

impl Boundary {
    /// Inner tetrahedra and the facets of theirs that make up this piece.
    #[cfg(test)]
    pub(crate) fn inner_facets(&self) -> Vec<(SimplexIdx, usize)> {
        let pairs = |tets: &[SimplexIdx], vertices: &[Perm4]| -> Vec<(SimplexIdx, usize)> {
            tets.iter().zip(vertices).map(|(t, v)| (*t, v.image(3))).collect()
        };
        match self {
            Boundary::Quad(q) => pairs(&q.tets, &q.vertices),
            Boundary::Hex(h) => pairs(&h.tets, &h.vertices),
        }
    }
}

/// Glues matching inner triangles face to face.
fn glue_inner<const K: usize>(
    tets: &[SimplexIdx; K],
    vertices: &[Perm4; K],
    dest_tets: &[SimplexIdx; K],
    dest_vertices: &[Perm4; K],
    ans: &mut Triangulation3,
) -> Result<(), Err> {
    for i in 0..K {
        ans.join(tets[i], vertices[i].image(3), dest_tets[i], dest_vertices[i] * vertices[i].inverse())?;
    }
    Ok(())
}

impl BdryQuad {
    pub fn new(outer: Perm4, tets: [SimplexIdx; 2], vertices: [Perm4; 2]) -> Self {
        Self { outer, tets, vertices }
    }

    /// Flips the diagonal of the quadrilateral by layering one tetrahedron.
    fn reflect(&mut self, ans: &mut Triangulation3) -> Result<(), Err> {
        let layer = ans.new_simplex();
        ans.join(layer, 0, self.tets[1], self.vertices[1] * perm4!(3, 2, 1, 0))?;
        ans.join(layer, 2, self.tets[0], self.vertices[0] * perm4!(1, 0, 3, 2))?;
        self.tets = [layer, layer];
        self.vertices = [Perm4::identity(), perm4!(2, 3, 0, 1)];
        self.outer = self.outer * Perm4::transposition(1, 2);
        tracing::debug!(%layer, "layered onto quadrilateral boundary");
        Ok(())
    }
}

impl BoundaryImpl for BdryQuad {
    fn outer(&self) -> Perm4 {
        self.outer
    }

    fn join(&self, outer_gluing: Perm4, dest: &mut Boundary, ans: &mut Triangulation3) -> Result<(), Err> {
        let Boundary::Quad(dest) = dest else {
            return Err(Err::UnmatchedBoundary { facet: self.outer().image(3) });
        };
        let dest_map = outer_gluing * self.outer();
        if dest_map != dest.outer() {
            dest.reflect(ans)?;
            if dest_map != dest.outer() {
                return Err(Err::UnmatchedBoundary { facet: self.outer().image(3) });
            }
        }
        glue_inner(&self.tets, &self.vertices, &dest.tets, &dest.vertices, ans)
    }
}

impl BdryHex {
    pub fn new(outer: Perm4, tets: [SimplexIdx; 4], vertices: [Perm4; 4]) -> Self {
        Self { outer, tets, vertices }
    }

    /// Mirrors the hexagon's triangulation by layering four tetrahedra.
    fn reflect(&mut self, ans: &mut Triangulation3) -> Result<(), Err> {
        let layers = ans.new_simplices(4);
        let id = Perm4::identity();
        ans.join(layers[0], 1, self.tets[3], self.vertices[3] * Perm4::transposition(1, 3))?;
        ans.join(layers[0], 2, self.tets[2], self.vertices[2] * Perm4::transposition(2, 3))?;
        ans.join(layers[1], 3, layers[0], id)?;
        ans.join(layers[1], 1, self.tets[1], self.vertices[1] * perm4!(2, 3, 0, 1))?;
        ans.join(layers[2], 0, layers[0], id)?;
        ans.join(layers[2], 1, self.tets[0], self.vertices[0] * perm4!(1, 3, 2, 0))?;
        ans.join(layers[3], 0, layers[1], id)?;
        ans.join(layers[3], 3, layers[2], id)?;

        self.tets = [layers[2], layers[1], layers[3], layers[3]];
        self.vertices = [perm4!(0, 3, 1, 2), perm4!(1, 0, 3, 2), perm4!(3, 2, 0, 1), perm4!(3, 0, 1, 2)];
        self.outer = self.outer * Perm4::transposition(1, 2);
        tracing::debug!(first = %layers[0], "layered onto hexagonal boundary");
        Ok(())
    }

    /// Relabels the hexagon by a third of a turn.
    fn rotate(&mut self) {
        self.tets[..3].rotate_left(1);
        self.vertices[..3].rotate_left(1);
        self.vertices[3] = self.vertices[3] * perm4!(1, 2, 0, 3);
        self.outer = self.outer * perm4!(1, 2, 0, 3);
    }
}

impl BoundaryImpl for BdryHex {
    fn outer(&self) -> Perm4 {
        self.outer
    }

    fn join(&self, outer_gluing: Perm4, dest: &mut Boundary, ans: &mut Triangulation3) -> Result<(), Err> {
        let Boundary::Hex(dest) = dest else {
            return Err(Err::UnmatchedBoundary { facet: self.outer().image(3) });
        };
        let dest_map = outer_gluing * self.outer();
        if dest_map.sign() != dest.outer().sign() {
            dest.reflect(ans)?;
        }
        for _ in 0..3 {
            if dest_map == dest.outer() {
                return glue_inner(&self.tets, &self.vertices, &dest.tets, &dest.vertices, ans);
            }
            dest.rotate();
        }
        Err(Err::UnmatchedBoundary { facet: self.outer().image(3) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(ans: &mut Triangulation3) -> BdryHex {
        let tets = ans.new_simplices(4);
        BdryHex::new(
            perm4!(2, 1, 3, 0),
            [tets[0], tets[1], tets[2], tets[3]],
            [perm4!(2, 0, 1, 3), perm4!(1, 2, 0, 3), Perm4::identity(), perm4!(0, 2, 1, 3)],
        )
    }

    #[test]
    fn three_rotations_restore_a_hexagon() {
        let mut ans = Triangulation3::new();
        let start = hex(&mut ans);
        let mut h = start;
        h.rotate();
        assert_ne!(h.outer, start.outer);
        assert_eq!(h.outer.image(3), start.outer.image(3));
        h.rotate();
        h.rotate();
        assert_eq!(h.outer, start.outer);
        assert_eq!(h.tets, start.tets);
        assert_eq!(h.vertices, start.vertices);
    }

    #[test]
    fn reflections_layer_new_tetrahedra() {
        let mut ans = Triangulation3::new();
        let mut h = hex(&mut ans);
        let before = h.outer;
        h.reflect(&mut ans).unwrap();
        assert_eq!(ans.size(), 8);
        assert_eq!(h.outer.sign(), -before.sign());
        assert_eq!(h.outer.image(3), before.image(3));
        // The new boundary faces are still free.
        for i in 0..4 {
            assert!(ans.simplex(h.tets[i]).adjacent(h.vertices[i].image(3)).is_none());
        }

        let tets = ans.new_simplices(2);
        let mut q = BdryQuad::new(Perm4::identity(), [tets[0], tets[1]], [perm4!(3, 1, 0, 2), perm4!(0, 1, 3, 2)]);
        q.reflect(&mut ans).unwrap();
        assert_eq!(ans.size(), 11);
        assert_eq!(q.outer, Perm4::transposition(1, 2));
        assert_eq!(q.tets[0], q.tets[1]);
        assert!(ans.simplex(q.tets[0]).adjacent(0).is_some());
        assert!(ans.simplex(q.tets[0]).adjacent(3).is_none());
    }

    #[test]
    fn shapes_must_agree() {
        let mut ans = Triangulation3::new();
        let h = hex(&mut ans);
        let tets = ans.new_simplices(2);
        let mut q = Boundary::from(BdryQuad::new(Perm4::identity(), [tets[0], tets[1]], [Perm4::identity(); 2]));
        assert!(matches!(h.join(Perm4::identity(), &mut q, &mut ans), Err(Err::UnmatchedBoundary { .. })));
    }

    fn assert_glued_to_partner(ans: &Triangulation3, facets: &[(SimplexIdx, usize)]) {
        for &(t, f) in facets {
            let simp = ans.simplex(t);
            let (u, g) = (simp.adjacent(f).unwrap(), simp.gluing(f).unwrap());
            assert_eq!(ans.simplex(u).adjacent(g.image(f)), Some(t));
            assert_eq!(ans.simplex(u).gluing(g.image(f)), Some(g.inverse()));
        }
    }

    #[test]
    fn hexagons_are_reflected_then_rotated_into_place() {
        let mut ans = Triangulation3::new();
        let src = hex(&mut ans);
        // Opposite orientation, and one third of a turn out once reflected.
        let outer = src.outer * perm4!(2, 0, 1, 3) * Perm4::transposition(1, 2);
        let tets = ans.new_simplices(4);
        let mut dest = Boundary::from(BdryHex::new(
            outer,
            [tets[0], tets[1], tets[2], tets[3]],
            [Perm4::identity(), perm4!(1, 0, 3, 2), perm4!(3, 1, 2, 0), perm4!(0, 3, 2, 1)],
        ));
        src.join(Perm4::identity(), &mut dest, &mut ans).unwrap();

        assert_eq!(ans.size(), 12);
        assert_eq!(dest.outer(), src.outer());
        assert_glued_to_partner(&ans, &Boundary::from(src).inner_facets());
        assert_glued_to_partner(&ans, &dest.inner_facets());
        for (t, f) in dest.inner_facets() {
            assert!(tets.iter().all(|&old| old != t), "{t} {f} should be a layered tetrahedron");
        }
    }

    #[test]
    fn matching_quads_are_glued_without_layering() {
        let mut ans = Triangulation3::new();
        let tets = ans.new_simplices(4);
        let src = BdryQuad::new(Perm4::identity(), [tets[0], tets[1]], [perm4!(3, 1, 0, 2), perm4!(0, 1, 3, 2)]);
        let mut dest = Boundary::from(BdryQuad::new(
            Perm4::identity(),
            [tets[2], tets[3]],
            [Perm4::identity(), perm4!(1, 0, 3, 2)],
        ));
        src.join(Perm4::identity(), &mut dest, &mut ans).unwrap();
        assert_eq!(ans.size(), 4);
        assert_glued_to_partner(&ans, &Boundary::from(src).inner_facets());
    }
}
