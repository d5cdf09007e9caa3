//! Triangulated blocks: the pieces one outer tetrahedron falls into once
//! it is cut along the surface and along an extra copy of every vertex
//! link.

use crate::core::perm::{perm4, Perm4};
use crate::core::shared::SimplexIdx;
use crate::core::triangulation::Triangulation3;

use super::boundary::{BdryHex, BdryQuad, Boundary};
use crate::surface::tables::{EDGE_VERTEX, QUAD_DEFN};
use crate::surface::Err;

#[derive(Clone, Debug)]
pub(crate) struct Block {
    /// The tetrahedron of the original triangulation holding this block.
    pub outer: SimplexIdx,
    /// The piece of boundary on each facet of the outer tetrahedron.
    pub bdry: [Option<Boundary>; 4],
    /// For each outer vertex this block faces through a vertex linking
    /// triangle: the inner tetrahedron holding that triangle, and the map
    /// from its vertices to the parallel vertices of the outer tetrahedron.
    link: [Option<(SimplexIdx, Perm4)>; 4],
}

impl Block {
    /// Creates `count` inner tetrahedra, glued along the given facets by the
    /// identity.
    fn new(
        outer: SimplexIdx,
        count: usize,
        internal: &[(usize, usize, usize)],
        ans: &mut Triangulation3,
    ) -> Result<(Self, Vec<SimplexIdx>), Err> {
        let tets = ans.new_simplices(count);
        for &(a, facet, b) in internal {
            ans.join(tets[a], facet, tets[b], Perm4::identity())?;
        }
        Ok((Self { outer, bdry: [None; 4], link: [None; 4] }, tets))
    }

    /// Three tetrahedra between two triangles of type `vertex`.
    pub fn tri_prism(outer: SimplexIdx, vertex: usize, ans: &mut Triangulation3) -> Result<Self, Err> {
        let (mut block, t) = Self::new(outer, 3, &[(1, 1, 0), (1, 3, 2)], ans)?;
        let v = Perm4::transposition(0, vertex);
        block.bdry[v.image(1)] =
            Some(BdryQuad::new(v * perm4!(0, 2, 3, 1), [t[1], t[2]], [perm4!(2, 3, 1, 0), perm4!(1, 3, 2, 0)]).into());
        block.bdry[v.image(2)] = Some(
            BdryQuad::new(v * Perm4::transposition(2, 3), [t[0], t[2]], [perm4!(2, 1, 0, 3), perm4!(0, 3, 2, 1)]).into(),
        );
        block.bdry[v.image(3)] =
            Some(BdryQuad::new(v, [t[0], t[1]], [perm4!(3, 1, 0, 2), perm4!(0, 1, 3, 2)]).into());
        block.link[v.image(0)] = Some((t[0], v * perm4!(0, 1, 3, 2)));
        Ok(block)
    }

    /// Five tetrahedra between two quads of type `q`.
    pub fn quad_prism(outer: SimplexIdx, q: usize, ans: &mut Triangulation3) -> Result<Self, Err> {
        let (mut block, t) = Self::new(outer, 5, &[(4, 2, 0), (4, 3, 1), (4, 0, 2), (4, 1, 3)], ans)?;
        let d = QUAD_DEFN[q];
        let v = perm4!(d[0], d[2], d[1], d[3]);
        block.bdry[v.image(0)] =
            Some(BdryQuad::new(v * perm4!(2, 3, 1, 0), [t[2], t[1]], [perm4!(1, 0, 2, 3), perm4!(2, 3, 1, 0)]).into());
        block.bdry[v.image(1)] =
            Some(BdryQuad::new(v * perm4!(3, 0, 2, 1), [t[3], t[2]], [perm4!(2, 1, 3, 0), perm4!(3, 0, 2, 1)]).into());
        block.bdry[v.image(2)] =
            Some(BdryQuad::new(v * perm4!(0, 1, 3, 2), [t[0], t[3]], [perm4!(3, 2, 0, 1), perm4!(0, 1, 3, 2)]).into());
        block.bdry[v.image(3)] =
            Some(BdryQuad::new(v * perm4!(1, 2, 0, 3), [t[1], t[0]], [perm4!(0, 3, 1, 2), perm4!(1, 2, 0, 3)]).into());
        Ok(block)
    }

    /// Eight tetrahedra forming a truncated tetrahedron sliced along a quad,
    /// on the side away from edge `edge`.
    pub fn trunc_half_tet(outer: SimplexIdx, edge: usize, ans: &mut Triangulation3) -> Result<Self, Err> {
        let internal = [(1, 2, 0), (1, 1, 2), (1, 0, 3), (2, 0, 4), (3, 1, 4), (3, 3, 5), (5, 2, 6), (4, 2, 7)];
        let (mut block, t) = Self::new(outer, 8, &internal, ans)?;
        let [a, b] = EDGE_VERTEX[edge];
        let [c, d] = EDGE_VERTEX[5 - edge];
        let v = perm4!(a, b, c, d);
        block.bdry[v.image(0)] = Some(
            BdryHex::new(
                v * perm4!(1, 3, 2, 0),
                [t[2], t[7], t[5], t[4]],
                [perm4!(2, 0, 1, 3), perm4!(1, 2, 0, 3), perm4!(0, 3, 2, 1), perm4!(0, 2, 1, 3)],
            )
            .into(),
        );
        block.bdry[v.image(1)] = Some(
            BdryHex::new(
                v * perm4!(0, 3, 2, 1),
                [t[0], t[7], t[6], t[3]],
                [perm4!(1, 2, 3, 0), perm4!(3, 2, 0, 1), perm4!(0, 2, 1, 3), perm4!(0, 1, 3, 2)],
            )
            .into(),
        );
        block.bdry[v.image(2)] =
            Some(BdryQuad::new(v * perm4!(3, 1, 0, 2), [t[2], t[0]], [perm4!(3, 1, 0, 2), perm4!(0, 2, 3, 1)]).into());
        block.bdry[v.image(3)] =
            Some(BdryQuad::new(v * perm4!(2, 0, 1, 3), [t[6], t[5]], [perm4!(3, 2, 1, 0), perm4!(1, 2, 3, 0)]).into());
        block.link[v.image(2)] = Some((t[6], v * perm4!(3, 2, 0, 1)));
        block.link[v.image(3)] = Some((t[7], v * perm4!(3, 1, 2, 0)));
        Ok(block)
    }

    /// Eleven tetrahedra forming a tetrahedron truncated at all four
    /// vertices.
    pub fn trunc_tet(outer: SimplexIdx, ans: &mut Triangulation3) -> Result<Self, Err> {
        let internal = [
            (0, 2, 4),
            (1, 3, 7),
            (2, 0, 6),
            (3, 1, 9),
            (5, 3, 4),
            (5, 1, 6),
            (8, 0, 7),
            (8, 2, 9),
            (4, 1, 10),
            (6, 3, 10),
            (7, 2, 10),
            (9, 0, 10),
        ];
        let (mut block, t) = Self::new(outer, 11, &internal, ans)?;
        block.bdry[0] = Some(
            BdryHex::new(
                perm4!(2, 1, 3, 0),
                [t[2], t[8], t[3], t[9]],
                [perm4!(2, 0, 1, 3), perm4!(1, 2, 0, 3), Perm4::identity(), perm4!(0, 2, 1, 3)],
            )
            .into(),
        );
        block.bdry[1] = Some(
            BdryHex::new(
                perm4!(3, 2, 0, 1),
                [t[3], t[5], t[0], t[4]],
                [perm4!(3, 1, 2, 0), perm4!(2, 3, 1, 0), perm4!(1, 2, 3, 0), perm4!(1, 3, 2, 0)],
            )
            .into(),
        );
        block.bdry[2] = Some(
            BdryHex::new(
                perm4!(0, 3, 1, 2),
                [t[0], t[8], t[1], t[7]],
                [perm4!(0, 2, 3, 1), perm4!(3, 0, 2, 1), perm4!(2, 3, 0, 1), perm4!(2, 0, 3, 1)],
            )
            .into(),
        );
        block.bdry[3] = Some(
            BdryHex::new(
                perm4!(1, 0, 2, 3),
                [t[1], t[5], t[2], t[6]],
                [perm4!(1, 3, 0, 2), perm4!(0, 1, 3, 2), perm4!(3, 0, 1, 2), perm4!(3, 1, 0, 2)],
            )
            .into(),
        );
        for (i, tet) in t[..4].iter().enumerate() {
            block.link[i] = Some((*tet, perm4!(1, 2, 3, 0)));
        }
        Ok(block)
    }

    /// Glues the vertex linking triangle facing outer vertex `vertex` onto
    /// the small tetrahedron `nbd`, whose vertices are numbered like a
    /// shrunken copy of the outer tetrahedron.
    pub fn attach_vertex_nbd(&self, nbd: SimplexIdx, vertex: usize, ans: &mut Triangulation3) -> Result<(), Err> {
        let (tet, vertices) = self.link[vertex].ok_or(Err::UnmatchedBoundary { facet: vertex })?;
        ans.join(tet, vertices.pre(vertex), nbd, vertices)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::cut::boundary::BoundaryImpl;

    /// Every boundary piece must sit on the outer facet it is filed under,
    /// and its inner triangles must still be free.
    fn check(block: &Block, ans: &Triangulation3) {
        for (facet, piece) in block.bdry.iter().enumerate() {
            let Some(piece) = piece else {
                continue;
            };
            assert_eq!(piece.outer().image(3), facet);
            for (t, f) in piece.inner_facets() {
                assert!(ans.simplex(t).adjacent(f).is_none());
            }
        }
    }

    #[test]
    fn block_sizes_and_boundaries() {
        let mut ans = Triangulation3::new();
        let outer = SimplexIdx::from(0);
        for v in 0..4 {
            let b = Block::tri_prism(outer, v, &mut ans).unwrap();
            assert!(b.bdry[v].is_none());
            assert_eq!(b.bdry.iter().flatten().count(), 3);
            check(&b, &ans);
        }
        assert_eq!(ans.size(), 12);
        for q in 0..3 {
            let b = Block::quad_prism(outer, q, &mut ans).unwrap();
            assert_eq!(b.bdry.iter().flatten().count(), 4);
            check(&b, &ans);
        }
        assert_eq!(ans.size(), 27);
        for e in 0..6 {
            let b = Block::trunc_half_tet(outer, e, &mut ans).unwrap();
            let hexes = b.bdry.iter().flatten().filter(|p| matches!(p, Boundary::Hex(_))).count();
            assert_eq!(hexes, 2);
            check(&b, &ans);
        }
        assert_eq!(ans.size(), 75);
        let b = Block::trunc_tet(outer, &mut ans).unwrap();
        check(&b, &ans);
        assert_eq!(ans.size(), 86);
        assert!(!ans.is_connected());
    }

    #[test]
    fn vertex_neighbourhoods_attach_once() {
        let mut ans = Triangulation3::new();
        let b = Block::trunc_tet(SimplexIdx::from(0), &mut ans).unwrap();
        let nbd = ans.new_simplex();
        b.attach_vertex_nbd(nbd, 2, &mut ans).unwrap();
        assert!(ans.simplex(nbd).adjacent(2).is_some());
        assert!(b.attach_vertex_nbd(nbd, 2, &mut ans).is_err());

        let prism = Block::tri_prism(SimplexIdx::from(0), 1, &mut ans).unwrap();
        assert!(prism.attach_vertex_nbd(ans.new_simplex(), 0, &mut ans).is_err());
    }
}
