//! Normal and almost normal surfaces in 3-manifold triangulations.
//!
//! A surface is stored as disc counts per tetrahedron: four triangle types,
//! three quadrilateral types and three octagon types. Surfaces share their
//! triangulation through an `Arc`, so the triangulation cannot change while
//! a surface refers to it.

pub mod compress;
pub mod count;
pub mod crush;
pub mod cut;
mod discs;
pub mod links;
pub mod oct;
pub mod tables;

use std::fmt;
use std::ops;
use std::sync::Arc;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::shared::{ErrorKind, FaceIdx, SimplexIdx};
use crate::core::triangulation::{self, Triangulation3};

pub use count::DiscCount;
use tables::{quad_meeting, quad_separating};

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("The search was cancelled.")]
    Cancelled,
    #[error("The two surfaces live in different triangulations.")]
    DifferentTriangulations,
    #[error("Disc counts do not match across facet {facet} of tetrahedron {simplex}.")]
    MatchingEquations { simplex: usize, facet: usize },
    #[error("Tetrahedron {simplex} has a negative disc count.")]
    NegativeCoordinate { simplex: usize },
    #[error("The surface is not compact.")]
    NotCompact,
    #[error("The surface contains octagons.")]
    Octagons,
    #[error("Expected disc counts for {expected} tetrahedra, found {found}.")]
    SizeMismatch { expected: usize, found: usize },
    #[error("The surface has too many discs to handle one at a time.")]
    TooManyDiscs,
    #[error("Triangulation error: {0}")]
    Triangulation(#[from] triangulation::Err),
    #[error("Block boundaries on outer facet {facet} do not line up.")]
    UnmatchedBoundary { facet: usize },
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::Cancelled => ErrorKind::Cancelled,
            Err::NotCompact | Err::Octagons | Err::TooManyDiscs => ErrorKind::Unsupported,
            Err::Triangulation(e) => e.kind(),
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// Disc counts inside one tetrahedron.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TetCoords {
    pub triangles: [DiscCount; 4],
    pub quads: [DiscCount; 3],
    pub octs: [DiscCount; 3],
}

impl TetCoords {
    /// Triangles then quadrilaterals.
    pub fn standard(c: [u64; 7]) -> Self {
        Self {
            triangles: std::array::from_fn(|i| c[i].into()),
            quads: std::array::from_fn(|i| c[4 + i].into()),
            octs: Default::default(),
        }
    }

    /// Triangles, quadrilaterals, then octagons.
    pub fn almost_normal(c: [u64; 10]) -> Self {
        Self {
            triangles: std::array::from_fn(|i| c[i].into()),
            quads: std::array::from_fn(|i| c[4 + i].into()),
            octs: std::array::from_fn(|i| c[7 + i].into()),
        }
    }

    /// All ten counts, triangles first.
    pub fn iter(&self) -> impl Iterator<Item = &DiscCount> {
        self.triangles.iter().chain(&self.quads).chain(&self.octs)
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut DiscCount> {
        self.triangles.iter_mut().chain(&mut self.quads).chain(&mut self.octs)
    }

    /// Total number of discs of every type.
    pub fn total(&self) -> DiscCount {
        self.iter().fold(DiscCount::zero(), |acc, c| &acc + c)
    }

    /// Number of quad and octagon types that appear.
    fn non_triangle_types(&self) -> usize {
        self.quads.iter().chain(&self.octs).filter(|c| !c.is_zero()).count()
    }

    /// Arcs cut off near `vertex` on facet `facet`.
    pub(crate) fn arcs(&self, vertex: usize, facet: usize) -> DiscCount {
        let [m0, m1] = quad_meeting(vertex, facet);
        let mut ans = &self.triangles[vertex] + &self.quads[quad_separating(vertex, facet)];
        ans += &self.octs[m0];
        ans += &self.octs[m1];
        ans
    }

    /// Points where the surface crosses the edge joining `a` and `b`.
    pub(crate) fn edge_weight(&self, a: usize, b: usize) -> DiscCount {
        let [m0, m1] = quad_meeting(a, b);
        let mut ans = &self.triangles[a] + &self.triangles[b];
        ans += &self.quads[m0];
        ans += &self.quads[m1];
        for oct in &self.octs {
            ans += oct;
        }
        ans += &self.octs[quad_separating(a, b)];
        ans
    }
}

/// A normal or almost normal surface, as disc counts per tetrahedron.
#[derive(Clone, Debug)]
pub struct NormalSurface {
    tri: Arc<Triangulation3>,
    coords: Vec<TetCoords>,
}

impl NormalSurface {
    /// Builds a surface after checking that the counts are non-negative and
    /// satisfy the matching equations across every internal facet.
    pub fn new(tri: Arc<Triangulation3>, coords: Vec<TetCoords>) -> Result<Self, Err> {
        if coords.len() != tri.size() {
            return Err(Err::SizeMismatch { expected: tri.size(), found: coords.len() });
        }
        if let Some(simplex) = coords.iter().position(|c| c.iter().any(DiscCount::is_negative)) {
            return Err(Err::NegativeCoordinate { simplex });
        }
        let ans = Self { tri, coords };
        ans.check_matching()?;
        Ok(ans)
    }

    /// The surface with no discs at all.
    pub fn empty(tri: Arc<Triangulation3>) -> Self {
        let coords = vec![TetCoords::default(); tri.size()];
        Self { tri, coords }
    }

    /// Counts built internally from surfaces that are already known to match.
    pub(crate) fn from_parts(tri: Arc<Triangulation3>, coords: Vec<TetCoords>) -> Self {
        debug_assert_eq!(tri.size(), coords.len());
        Self { tri, coords }
    }

    fn check_matching(&self) -> Result<(), Err> {
        for (t, simp) in self.tri.simplices() {
            for facet in 0..4 {
                let (Some(u), Some(g)) = (simp.adjacent(facet), simp.gluing(facet)) else {
                    continue;
                };
                for v in (0..4).filter(|&v| v != facet) {
                    let here = self.coords[t.get()].arcs(v, facet);
                    let there = self.coords[u.get()].arcs(g.image(v), g.image(facet));
                    if here != there {
                        tracing::warn!(simplex = t.get(), facet, vertex = v, %here, %there, "matching equation fails");
                        return Err(Err::MatchingEquations { simplex: t.get(), facet });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn triangulation(&self) -> &Arc<Triangulation3> {
        &self.tri
    }

    pub fn coords(&self) -> &[TetCoords] {
        &self.coords
    }

    pub fn triangles(&self, s: SimplexIdx, vertex: usize) -> &DiscCount {
        &self.coords[s.get()].triangles[vertex]
    }

    pub fn quads(&self, s: SimplexIdx, q: usize) -> &DiscCount {
        &self.coords[s.get()].quads[q]
    }

    pub fn octs(&self, s: SimplexIdx, q: usize) -> &DiscCount {
        &self.coords[s.get()].octs[q]
    }

    pub fn is_empty(&self) -> bool {
        self.coords.iter().all(|c| c.iter().all(DiscCount::is_zero))
    }

    /// Whether the surface avoids octagons entirely.
    pub fn is_normal(&self) -> bool {
        self.coords.iter().all(|c| c.octs.iter().all(DiscCount::is_zero))
    }

    pub fn is_compact(&self) -> bool {
        self.coords.iter().all(|c| c.iter().all(|n| !n.is_infinite()))
    }

    /// Points where the surface crosses the given edge.
    pub fn edge_weight(&self, edge: FaceIdx) -> Result<DiscCount, Err> {
        let emb = *self.tri.face(1, edge)?.front();
        let v = emb.vertices();
        Ok(self.coords[emb.simplex().get()].edge_weight(v.image(0), v.image(1)))
    }

    /// Arcs in which the surface meets the given triangle near its vertex
    /// `vertex` (numbered 0, 1 or 2 within the triangle).
    pub fn arcs(&self, triangle: FaceIdx, vertex: usize) -> Result<DiscCount, Err> {
        if vertex > 2 {
            return Err(triangulation::Err::FaceOutOfRange(vertex, 0).into());
        }
        let emb = *self.tri.face(2, triangle)?.front();
        let v = emb.vertices();
        Ok(self.coords[emb.simplex().get()].arcs(v.image(vertex), v.image(3)))
    }

    /// Vertices minus edges plus faces of the surface's cell structure.
    pub fn euler_char(&self) -> Result<BigInt, Err> {
        if !self.is_compact() {
            return Err(Err::NotCompact);
        }
        let finite = |c: DiscCount| c.finite().cloned().ok_or(Err::NotCompact);
        let mut ans = BigInt::default();
        for e in 0..self.tri.count_edges() {
            ans += finite(self.edge_weight(FaceIdx::from(e))?)?;
        }
        for t in 0..self.tri.count_triangles() {
            for v in 0..3 {
                ans -= finite(self.arcs(FaceIdx::from(t), v)?)?;
            }
        }
        for c in &self.coords {
            ans += finite(c.total())?;
        }
        Ok(ans)
    }

    /// Whether the surface meets the boundary facets of the triangulation.
    pub fn has_real_boundary(&self) -> bool {
        if !self.tri.has_boundary_facets() {
            return false;
        }
        for (t, simp) in self.tri.simplices() {
            if !simp.has_boundary() {
                continue;
            }
            let c = &self.coords[t.get()];
            if c.non_triangle_types() > 0 {
                return true;
            }
            for (v, n) in c.triangles.iter().enumerate() {
                if !n.is_zero() && (0..4).any(|f| f != v && simp.adjacent(f).is_none()) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether at most one quad or octagon type appears in each tetrahedron.
    pub fn embedded(&self) -> bool {
        self.coords.iter().all(|c| c.non_triangle_types() <= 1)
    }

    /// Whether this surface and `other` could be made disjoint inside every
    /// tetrahedron, which requires their quads and octagons to agree in type.
    pub fn locally_compatible(&self, other: &NormalSurface) -> bool {
        self.coords.iter().zip(&other.coords).all(|(a, b)| {
            let used = |q: usize, c: &TetCoords| !c.quads[q].is_zero();
            let used_oct = |q: usize, c: &TetCoords| !c.octs[q].is_zero();
            (0..3).filter(|&q| used(q, a) || used(q, b)).count()
                + (0..3).filter(|&q| used_oct(q, a) || used_oct(q, b)).count()
                <= 1
        })
    }

    /// Exactly one quad per tetrahedron and nothing else.
    pub fn is_splitting(&self) -> bool {
        let one = DiscCount::from(1);
        self.coords.iter().all(|c| {
            c.triangles.iter().chain(&c.octs).all(DiscCount::is_zero)
                && c.quads.iter().fold(DiscCount::zero(), |acc, q| &acc + q) == one
        })
    }

    /// If every tetrahedron holds at most one disc, returns the number of
    /// tetrahedra holding one; otherwise returns zero.
    pub fn is_central(&self) -> usize {
        let one = DiscCount::from(1);
        let mut ans = 0;
        for c in &self.coords {
            let total = c.total();
            if total > one {
                return 0;
            }
            if total == one {
                ans += 1;
            }
        }
        ans
    }

    /// The first tetrahedron and type holding an octagon.
    pub fn oct_position(&self) -> Option<(SimplexIdx, usize)> {
        self.coords.iter().enumerate().find_map(|(t, c)| {
            c.octs.iter().position(|n| !n.is_zero()).map(|q| (SimplexIdx::from(t), q))
        })
    }

    pub fn has_multiple_oct_discs(&self) -> bool {
        self.oct_position()
            .map(|(t, q)| self.coords[t.get()].octs[q] > DiscCount::from(1))
            .unwrap_or(false)
    }

    /// The sum of two surfaces in the same triangulation.
    pub fn sum(&self, other: &NormalSurface) -> Result<NormalSurface, Err> {
        if !Arc::ptr_eq(&self.tri, &other.tri) && !self.tri.is_identical_to(&other.tri) {
            return Err(Err::DifferentTriangulations);
        }
        let coords = self
            .coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| {
                let mut c = a.clone();
                for (x, y) in c.iter_mut().zip(b.iter()) {
                    *x += y;
                }
                c
            })
            .collect();
        Ok(Self::from_parts(self.tri.clone(), coords))
    }

    /// Multiplies every count by a non-negative integer.
    pub fn scaled(&self, coeff: &BigInt) -> Result<NormalSurface, Err> {
        if coeff < &BigInt::default() {
            return Err(Err::NegativeCoordinate { simplex: 0 });
        }
        let coords = self
            .coords
            .iter()
            .map(|c| {
                let mut c = c.clone();
                for x in c.iter_mut() {
                    *x = &*x * coeff;
                }
                c
            })
            .collect();
        Ok(Self::from_parts(self.tri.clone(), coords))
    }

    /// The surface with every count doubled.
    pub fn double(&self) -> NormalSurface {
        self * 2
    }
}

impl ops::Mul<u64> for &NormalSurface {
    type Output = NormalSurface;

    fn mul(self, rhs: u64) -> NormalSurface {
        let coeff = BigInt::from(rhs);
        let coords = self
            .coords
            .iter()
            .map(|c| {
                let mut c = c.clone();
                for x in c.iter_mut() {
                    *x = &*x * &coeff;
                }
                c
            })
            .collect();
        NormalSurface::from_parts(self.tri.clone(), coords)
    }
}

impl fmt::Display for NormalSurface {
    /// Counts per tetrahedron, with triangles, quads and octagons separated
    /// by `;`. Octagons are omitted when there are none.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let normal = self.is_normal();
        for (t, c) in self.coords.iter().enumerate() {
            if t > 0 {
                f.write_str(" || ")?;
            }
            let join = |xs: &[DiscCount]| xs.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
            write!(f, "{} ; {}", join(&c.triangles), join(&c.quads))?;
            if !normal {
                write!(f, " ; {}", join(&c.octs))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::triangulation::factory;

    fn lst() -> Arc<Triangulation3> {
        Arc::new(factory::layered_solid_torus(1, 2).unwrap())
    }

    #[test]
    fn rejects_bad_coordinates() {
        let tri = Arc::new(factory::s3());
        assert_eq!(
            NormalSurface::new(tri.clone(), vec![]).unwrap_err(),
            Err::SizeMismatch { expected: 1, found: 0 }
        );
        let lopsided = TetCoords::standard([1, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(NormalSurface::new(tri, vec![lopsided]), Err(Err::MatchingEquations { .. })));
    }

    #[test]
    fn vertex_link_of_the_sphere() {
        let tri = Arc::new(factory::s3());
        let s = NormalSurface::new(tri, vec![TetCoords::standard([1, 1, 1, 1, 0, 0, 0])]).unwrap();
        assert!(s.is_compact());
        assert!(s.is_normal());
        assert!(!s.has_real_boundary());
        assert_eq!(s.euler_char().unwrap(), BigInt::from(2));
        assert_eq!(s.is_central(), 0);
        assert!(s.embedded());
        assert!(!s.is_splitting());
        assert_eq!(s.double().euler_char().unwrap(), BigInt::from(4));
        assert_eq!(s.oct_position(), None);
    }

    #[test]
    fn quads_and_octagons() {
        let quad = NormalSurface::new(lst(), vec![TetCoords::standard([0, 0, 0, 0, 0, 1, 0])]).unwrap();
        assert!(quad.is_splitting());
        assert_eq!(quad.is_central(), 1);
        assert!(quad.has_real_boundary());
        assert!(!quad.double().is_splitting());
        assert_eq!(quad.double().is_central(), 0);

        let tri = Arc::new(factory::s3());
        let oct = NormalSurface::from_parts(tri, vec![TetCoords::almost_normal([0, 0, 0, 0, 0, 0, 0, 0, 2, 0])]);
        assert_eq!(oct.oct_position(), Some((SimplexIdx::from(0), 1)));
        assert!(oct.has_multiple_oct_discs());
        assert!(!oct.is_normal());
        assert!(oct.embedded());
    }

    #[test]
    fn compatibility_and_sums() {
        let tri = lst();
        let a = NormalSurface::from_parts(tri.clone(), vec![TetCoords::standard([0, 0, 0, 0, 1, 0, 0])]);
        let b = NormalSurface::from_parts(tri.clone(), vec![TetCoords::standard([0, 0, 0, 0, 0, 1, 0])]);
        let c = NormalSurface::from_parts(tri, vec![TetCoords::standard([1, 0, 0, 0, 2, 0, 0])]);
        assert!(!a.locally_compatible(&b));
        assert!(a.locally_compatible(&c));
        let sum = a.sum(&c).unwrap();
        assert_eq!(sum.quads(0.into(), 0), &DiscCount::from(3));
        assert_eq!(sum.triangles(0.into(), 0), &DiscCount::from(1));
        assert!(!a.sum(&b).unwrap().embedded());
        let other = Arc::new(factory::s3());
        let d = NormalSurface::empty(other);
        assert!(matches!(a.sum(&d), Err(Err::DifferentTriangulations)));
        assert!(a.scaled(&BigInt::from(0)).unwrap().is_empty());
    }

    #[test]
    fn infinite_counts_are_not_compact() {
        let tri = Arc::new(factory::figure_eight());
        let mut coords = vec![TetCoords::default(); 2];
        coords[0].triangles[0] = DiscCount::Infinity;
        let s = NormalSurface::from_parts(tri, coords);
        assert!(!s.is_compact());
        assert_eq!(s.euler_char(), Err(Err::NotCompact));
    }
}
