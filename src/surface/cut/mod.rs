//! Cutting a triangulation open along a normal surface.
//!
//! An extra copy of every vertex link is added to the surface, so that each
//! tetrahedron falls apart into triangular prisms, quadrilateral prisms,
//! truncated half-tetrahedra and truncated tetrahedra, plus four small
//! tetrahedra around its vertices. Each block is triangulated separately.
//! Blocks are then glued across the facets of the original triangulation,
//! layering tetrahedra onto quadrilateral and hexagonal boundaries when
//! their diagonals disagree, and the small vertex tetrahedra are glued back
//! on. The surface itself (doubled if it is one-sided) becomes boundary.

mod block;
mod boundary;

use crate::core::shared::SimplexIdx;
use crate::core::triangulation::Triangulation3;

use block::Block;
use boundary::BoundaryImpl;

use super::tables::{on_zero_side, quad_separating};
use super::{DiscCount, Err, NormalSurface, TetCoords};

/// Every block inside one tetrahedron of the original triangulation, as
/// indices into the shared block list.
#[derive(Debug)]
struct TetBlockSet {
    tri_count: [usize; 4],
    /// Quad type and (positive) count, if the tetrahedron holds quads.
    quads: Option<(usize, usize)>,
    /// Triangular prisms around each vertex, moving away from it.
    tri_prisms: [Vec<usize>; 4],
    /// Quad prisms, moving away from vertex 0.
    quad_prisms: Vec<usize>,
    /// Truncated half-tetrahedra, nearer to vertex 0 first.
    trunc_half: Option<[usize; 2]>,
    trunc_tet: Option<usize>,
    vertex_nbd: [SimplexIdx; 4],
}

impl TetBlockSet {
    fn new(
        outer: SimplexIdx,
        coords: &TetCoords,
        blocks: &mut Vec<Block>,
        ans: &mut Triangulation3,
    ) -> Result<Self, Err> {
        let count = |n: &DiscCount| n.to_usize().ok_or(Err::TooManyDiscs);
        let mut tri_count = [0; 4];
        for (v, n) in coords.triangles.iter().enumerate() {
            tri_count[v] = count(n)?;
        }
        let quads = match coords.quads.iter().position(|n| !n.is_zero()) {
            Some(q) => Some((q, count(&coords.quads[q])?)),
            None => None,
        };

        let mut tri_prisms: [Vec<usize>; 4] = Default::default();
        for (v, prisms) in tri_prisms.iter_mut().enumerate() {
            for _ in 0..tri_count[v] {
                prisms.push(push(blocks, Block::tri_prism(outer, v, ans)?));
            }
        }

        let mut quad_prisms = Vec::new();
        let (trunc_half, trunc_tet) = match quads {
            None => (None, Some(push(blocks, Block::trunc_tet(outer, ans)?))),
            Some((q, n)) => {
                for _ in 1..n {
                    quad_prisms.push(push(blocks, Block::quad_prism(outer, q, ans)?));
                }
                let near = push(blocks, Block::trunc_half_tet(outer, 5 - q, ans)?);
                let far = push(blocks, Block::trunc_half_tet(outer, q, ans)?);
                (Some([near, far]), None)
            }
        };

        let mut vertex_nbd = [SimplexIdx::from(0); 4];
        for (v, nbd) in vertex_nbd.iter_mut().enumerate() {
            *nbd = ans.new_simplex();
            let owner = match (tri_prisms[v].first(), trunc_tet, trunc_half, quads) {
                (Some(&prism), ..) => prism,
                (None, Some(tet), ..) => tet,
                (None, None, Some([near, far]), Some((q, _))) => {
                    if on_zero_side(q, v) {
                        near
                    } else {
                        far
                    }
                }
                _ => return Err(Err::UnmatchedBoundary { facet: v }),
            };
            blocks[owner].attach_vertex_nbd(*nbd, v, ans)?;
        }

        Ok(Self { tri_count, quads, tri_prisms, quad_prisms, trunc_half, trunc_tet, vertex_nbd })
    }

    /// Blocks meeting facet `facet` near vertex `vertex` in quadrilaterals.
    fn num_quad_blocks(&self, facet: usize, vertex: usize) -> usize {
        let mut ans = self.tri_count[vertex];
        if let Some((q, n)) = self.quads {
            if q == quad_separating(facet, vertex) {
                ans += n;
            }
        }
        ans
    }

    /// The `which`-th block meeting a facet near `vertex`, counting outwards
    /// from the vertex.
    fn quad_block(&self, vertex: usize, which: usize) -> Option<usize> {
        let tc = self.tri_count[vertex];
        if which < tc {
            return self.tri_prisms[vertex].get(which).copied();
        }
        let (q, n) = self.quads?;
        let [near, far] = self.trunc_half?;
        let zero_side = on_zero_side(q, vertex);
        if which == tc {
            return Some(if zero_side { near } else { far });
        }
        let step = which - tc;
        let idx = if zero_side { step - 1 } else { n.checked_sub(step + 1)? };
        self.quad_prisms.get(idx).copied()
    }

    /// The block meeting facet `facet` in a hexagon.
    fn hex_block(&self, facet: usize) -> Option<usize> {
        match (self.trunc_tet, self.trunc_half, self.quads) {
            (Some(tet), ..) => Some(tet),
            (None, Some([near, far]), Some((q, _))) => Some(if on_zero_side(q, facet) { far } else { near }),
            _ => None,
        }
    }
}

fn push(blocks: &mut Vec<Block>, block: Block) -> usize {
    blocks.push(block);
    blocks.len() - 1
}

/// Glues the piece of `blocks[a]` on facet `facet` of its outer
/// tetrahedron to the matching piece of `blocks[b]`.
fn join_blocks(
    tri: &Triangulation3,
    blocks: &mut [Block],
    a: usize,
    facet: usize,
    b: usize,
    ans: &mut Triangulation3,
) -> Result<(), Err> {
    let outer = blocks[a].outer;
    let gluing = tri.simplex(outer).gluing(facet).ok_or(Err::UnmatchedBoundary { facet })?;
    let src = blocks[a].bdry[facet].ok_or(Err::UnmatchedBoundary { facet })?;
    let dest = blocks[b].bdry[gluing.image(facet)].as_mut().ok_or(Err::UnmatchedBoundary { facet })?;
    src.join(gluing, dest, ans)
}

impl NormalSurface {
    /// Cuts the triangulation open along this surface.
    ///
    /// The result has the surface as new boundary: two copies of it if it is
    /// two-sided, or its orientable double cover if it is one-sided. Almost
    /// normal surfaces are first made normal with [`NormalSurface::remove_octs`].
    /// No simplification is attempted, so the result is large.
    pub fn cut_along(&self) -> Result<Triangulation3, Err> {
        if !self.is_normal() {
            return self.remove_octs()?.cut_along();
        }
        if !self.is_compact() {
            return Err(Err::NotCompact);
        }
        let tri = &*self.tri;
        let mut ans = Triangulation3::new();
        if tri.is_empty() {
            return Ok(ans);
        }

        let mut blocks = Vec::new();
        let mut sets = Vec::with_capacity(tri.size());
        {
            let mut span = ans.change();
            for (t, c) in self.coords.iter().enumerate() {
                sets.push(TetBlockSet::new(SimplexIdx::from(t), c, &mut blocks, &mut span)?);
            }
            tracing::debug!(blocks = blocks.len(), size = span.size(), "triangulated blocks");

            for triangle in tri.faces(2) {
                let (Some(front), Some(back)) = (triangle.embedding(0), triangle.embedding(1)) else {
                    continue;
                };
                let (t0, f0) = (front.simplex(), front.face());
                let (t1, f1) = (back.simplex(), back.face());
                let gluing = tri.simplex(t0).gluing(f0).ok_or(Err::UnmatchedBoundary { facet: f0 })?;
                let (set0, set1) = (&sets[t0.get()], &sets[t1.get()]);
                let mismatch = || Err::MatchingEquations { simplex: t0.get(), facet: f0 };

                for v0 in (0..4).filter(|&v| v != f0) {
                    let v1 = gluing.image(v0);
                    for i in 0..set0.num_quad_blocks(f0, v0) {
                        let a = set0.quad_block(v0, i).ok_or_else(mismatch)?;
                        let b = set1.quad_block(v1, i).ok_or_else(mismatch)?;
                        join_blocks(tri, &mut blocks, a, f0, b, &mut span)?;
                    }
                    span.join(set0.vertex_nbd[v0], f0, set1.vertex_nbd[v1], gluing)?;
                }
                let a = set0.hex_block(f0).ok_or_else(mismatch)?;
                let b = set1.hex_block(f1).ok_or_else(mismatch)?;
                join_blocks(tri, &mut blocks, a, f0, b, &mut span)?;
            }
        }
        tracing::debug!(size = ans.size(), "cut along surface");
        Ok(ans)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::triangulation::factory;

    fn assert_gluings_are_symmetric(tri: &Triangulation3) {
        for (t, simp) in tri.simplices() {
            for f in 0..4 {
                let Some(u) = simp.adjacent(f) else {
                    assert!(simp.gluing(f).is_none());
                    continue;
                };
                let g = simp.gluing(f).unwrap();
                assert_eq!(tri.simplex(u).adjacent(g.image(f)), Some(t), "simplex {t} facet {f}");
                assert_eq!(tri.simplex(u).gluing(g.image(f)), Some(g.inverse()), "simplex {t} facet {f}");
            }
        }
    }

    /// Every embedded surface whose disc counts are at most `max`.
    fn small_surfaces(tri: Triangulation3, max: u64) -> Vec<NormalSurface> {
        let tri = Arc::new(tri);
        let mut digits = vec![0u64; 7 * tri.size()];
        let mut ans = Vec::new();
        loop {
            let coords = digits.chunks(7).map(|c| TetCoords::standard(c.try_into().unwrap())).collect();
            if let Ok(s) = NormalSurface::new(tri.clone(), coords) {
                if s.embedded() {
                    ans.push(s);
                }
            }
            let Some(i) = digits.iter().position(|&d| d < max) else {
                return ans;
            };
            digits[i] += 1;
            digits[..i].fill(0);
        }
    }

    #[test]
    fn cut_results_are_glued_symmetrically() {
        for (tri, max, expect_at_least) in [
            (factory::s3(), 2, 3),
            (factory::layered_solid_torus(1, 2).unwrap(), 2, 3),
            (factory::figure_eight(), 1, 2),
        ] {
            let surfaces = small_surfaces(tri, max);
            assert!(surfaces.len() >= expect_at_least, "only {} surfaces", surfaces.len());
            for s in surfaces {
                let cut = s.cut_along().unwrap();
                assert_gluings_are_symmetric(&cut);
                assert!(cut.is_valid());
            }
        }
    }

    fn boundary_euler_chars(tri: &Triangulation3) -> Vec<i64> {
        let mut ans: Vec<i64> = tri.boundary_components().iter().map(|b| b.euler_char()).collect();
        ans.sort();
        ans
    }

    #[test]
    fn cutting_along_nothing_rebuilds_the_manifold() {
        let tri = Arc::new(factory::s3());
        let cut = NormalSurface::empty(tri).cut_along().unwrap();
        assert_eq!(cut.size(), 15);
        assert!(cut.is_closed());
        assert!(cut.is_connected());
        assert_eq!(cut.count_vertices(), 5);
        assert_eq!(cut.euler_char_tri(), 0);
    }

    #[test]
    fn cutting_along_a_vertex_link_splits_off_a_ball() {
        let tri = Arc::new(factory::s3());
        let link = NormalSurface::vertex_link(tri, 0.into()).unwrap();
        let cut = link.cut_along().unwrap();
        assert_eq!(cut.size(), 28);
        assert_eq!(cut.count_components(), 2);
        assert_eq!(boundary_euler_chars(&cut), vec![2, 2]);
        assert!(cut.is_valid());
    }

    #[test]
    fn cutting_along_a_mobius_band() {
        let tri = Arc::new(factory::layered_solid_torus(1, 2).unwrap());
        let band = NormalSurface::new(tri, vec![TetCoords::standard([0, 0, 0, 0, 0, 1, 0])]).unwrap();
        let cut = band.cut_along().unwrap();
        assert_eq!(cut.size(), 25);
        assert!(cut.is_connected());
        assert_eq!(boundary_euler_chars(&cut), vec![0]);

        let annulus = band.double().cut_along().unwrap();
        assert_eq!(annulus.size(), 30);
        assert_eq!(annulus.count_components(), 2);
        assert_eq!(boundary_euler_chars(&annulus), vec![0, 0]);
    }

    #[test]
    fn cutting_rp3_along_its_projective_plane_leaves_a_ball() {
        let tri = Arc::new(factory::rp3());
        let rp2 = NormalSurface::new(
            tri,
            vec![
                TetCoords::standard([0, 0, 0, 0, 0, 1, 0]),
                TetCoords::standard([0, 0, 0, 0, 0, 1, 0]),
                TetCoords::standard([1, 1, 0, 0, 0, 0, 0]),
            ],
        )
        .unwrap();
        let cut = rp2.cut_along().unwrap();
        assert_eq!(cut.size(), 79);
        assert!(cut.is_connected());
        assert_eq!(boundary_euler_chars(&cut), vec![2]);
    }

    #[test]
    fn cutting_the_figure_eight_along_its_cusp() {
        let tri = Arc::new(factory::figure_eight());
        let link = NormalSurface::vertex_link(tri, 0.into()).unwrap();
        let cut = link.cut_along().unwrap();
        assert_eq!(cut.size(), 72);
        assert_eq!(cut.count_components(), 2);
        assert_eq!(cut.count_boundary_components(), 3);
        let real: Vec<_> = cut.boundary_components().iter().filter(|b| !b.is_ideal()).collect();
        assert_eq!(real.len(), 2);
        assert!(real.iter().all(|b| b.euler_char() == 0));
    }

    #[test]
    fn octagons_are_removed_before_cutting() {
        let tri = Arc::new(factory::s3());
        let sphere = NormalSurface::from_parts(tri, vec![TetCoords::almost_normal([1, 1, 0, 0, 0, 0, 0, 1, 0, 0])]);
        let cut = sphere.cut_along().unwrap();
        assert_eq!(cut.count_components(), 2);
        assert_eq!(boundary_euler_chars(&cut), vec![2, 2]);
    }
}
