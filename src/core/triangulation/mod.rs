//! Triangulations built from top-dimensional simplices glued along facets.
//!
//! `Triangulation<N>` uses simplices with N vertices, so `Triangulation<4>`
//! is a 3-manifold triangulation. The derived skeleton (faces, components,
//! boundary components, links) is computed lazily on the first query and is
//! discarded by every mutation.

pub mod change_span;
pub mod component;
pub mod face;
pub mod factory;
pub mod homology;
pub(crate) mod link;
pub mod simplex;
pub(crate) mod skeleton;

use std::fmt;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::core::face_numbering::FaceNumbering;
use crate::core::perm::{self, Perm};
use crate::core::shared::{BoundaryIdx, ComponentIdx, ErrorKind, FaceIdx, SimplexIdx, VecSimplexIdx};

pub use change_span::{ChangeObserver, ChangeSpan};
pub use component::{BoundaryComponent, Component};
pub use face::{Embeddings, Face, FaceEmbedding, LinkKind};
pub use homology::AbelianGroup;
pub use simplex::Simplex;
use skeleton::Skeleton;

/// Triangulated surfaces.
pub type Triangulation2 = Triangulation<3>;
/// Triangulated 3-manifolds.
pub type Triangulation3 = Triangulation<4>;
/// Triangulated 4-manifolds.
pub type Triangulation4 = Triangulation<5>;

#[remain::sorted]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Err {
    #[error("Facet {facet} of simplex {simplex} is already glued.")]
    AlreadyGlued { simplex: usize, facet: usize },
    #[error("There is no {1}-face with index {0}.")]
    FaceOutOfRange(usize, usize),
    #[error("Facet {0} does not exist in a simplex with {1} vertices.")]
    FacetOutOfRange(usize, usize),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Permutation error: {0}")]
    PermError(#[from] perm::Err),
    #[error("Facet {facet} of simplex {simplex} cannot be glued to itself.")]
    SelfGluedFacet { simplex: usize, facet: usize },
    #[error("Simplex {0} does not exist in a triangulation of size {1}.")]
    SimplexOutOfRange(usize, usize),
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Err {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Err::PermError(e) => e.kind(),
            Err::Unsupported(_) => ErrorKind::Unsupported,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

/// A triangulation whose top-dimensional simplices have N vertices.
pub struct Triangulation<const N: usize> {
    simplices: VecSimplexIdx<Simplex<N>>,
    skeleton: OnceLock<Skeleton<N>>,
    span_depth: usize,
    observer: Option<Arc<dyn ChangeObserver>>,
}

impl<const N: usize> Clone for Triangulation<N> {
    /// Copies the simplices and their gluings; observers are not copied.
    fn clone(&self) -> Self {
        Self {
            simplices: self.simplices.clone(),
            skeleton: OnceLock::new(),
            span_depth: 0,
            observer: None,
        }
    }
}

impl<const N: usize> Default for Triangulation<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for Triangulation<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Triangulation")
            .field("dim", &Self::DIM)
            .field("simplices", &self.simplices)
            .finish()
    }
}

impl<const N: usize> fmt::Display for Triangulation<N> {
    /// One line per simplex listing `neighbour (gluing)` for each facet.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (s, simp) in self.simplices.indexed() {
            write!(f, "{s}:")?;
            for facet in 0..N {
                match (simp.adjacent(facet), simp.gluing(facet)) {
                    (Some(t), Some(g)) => write!(f, " {t} ({g})")?,
                    _ => write!(f, " boundary")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<const N: usize> Triangulation<N> {
    /// Dimension of the triangulation.
    pub const DIM: usize = N - 1;

    pub fn new() -> Self {
        Self {
            simplices: VecSimplexIdx::new(),
            skeleton: OnceLock::new(),
            span_depth: 0,
            observer: None,
        }
    }

    /// Opens a change span so that the enclosed mutations are reported as one.
    pub fn change(&mut self) -> ChangeSpan<'_, N> {
        ChangeSpan::new(self)
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn ChangeObserver>>) {
        self.observer = observer;
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.simplices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    /// Panics if the index is out of range, like slice indexing.
    #[inline]
    pub fn simplex(&self, s: SimplexIdx) -> &Simplex<N> {
        &self.simplices[s]
    }

    pub fn get_simplex(&self, s: SimplexIdx) -> Result<&Simplex<N>, Err> {
        self.check_simplex(s)?;
        Ok(&self.simplices[s])
    }

    pub fn simplices(&self) -> impl Iterator<Item = (SimplexIdx, &Simplex<N>)> {
        self.simplices.indexed()
    }

    fn check_simplex(&self, s: SimplexIdx) -> Result<(), Err> {
        if s.get() >= self.size() {
            return Err(Err::SimplexOutOfRange(s.get(), self.size()));
        }
        Ok(())
    }

    fn check_facet(facet: usize) -> Result<(), Err> {
        if facet >= N {
            return Err(Err::FacetOutOfRange(facet, N));
        }
        Ok(())
    }

    /// Discards the cached skeleton; called by every structural mutation.
    fn invalidate(&mut self) {
        self.skeleton.take();
    }

    pub fn new_simplex(&mut self) -> SimplexIdx {
        self.new_simplex_with_description(String::new())
    }

    pub fn new_simplex_with_description(&mut self, description: impl Into<String>) -> SimplexIdx {
        let mut span = self.change();
        span.invalidate();
        span.simplices.push(Simplex::new(description.into()))
    }

    pub fn new_simplices(&mut self, count: usize) -> Vec<SimplexIdx> {
        let mut span = self.change();
        (0..count).map(|_| span.new_simplex()).collect()
    }

    pub fn set_description(&mut self, s: SimplexIdx, description: impl Into<String>) -> Result<(), Err> {
        self.check_simplex(s)?;
        let mut span = self.change();
        span.simplices[s].description = description.into();
        Ok(())
    }

    /// Glues facet `facet` of `s` to facet `gluing[facet]` of `t`.
    ///
    /// Both facets must be free, and a facet may not be glued to itself.
    /// On error nothing changes.
    pub fn join(&mut self, s: SimplexIdx, facet: usize, t: SimplexIdx, gluing: Perm<N>) -> Result<(), Err> {
        self.check_simplex(s)?;
        self.check_simplex(t)?;
        Self::check_facet(facet)?;
        let other_facet = gluing.image(facet);
        if self.simplices[s].adj[facet].is_some() {
            return Err(Err::AlreadyGlued { simplex: s.get(), facet });
        }
        if s == t && other_facet == facet {
            return Err(Err::SelfGluedFacet { simplex: s.get(), facet });
        }
        if self.simplices[t].adj[other_facet].is_some() {
            return Err(Err::AlreadyGlued { simplex: t.get(), facet: other_facet });
        }
        let mut span = self.change();
        span.invalidate();
        span.simplices[s].adj[facet] = Some(t);
        span.simplices[s].gluing[facet] = gluing;
        span.simplices[t].adj[other_facet] = Some(s);
        span.simplices[t].gluing[other_facet] = gluing.inverse();
        Ok(())
    }

    /// Unglues the given facet and returns the former neighbour, if any.
    pub fn unjoin(&mut self, s: SimplexIdx, facet: usize) -> Result<Option<SimplexIdx>, Err> {
        self.check_simplex(s)?;
        Self::check_facet(facet)?;
        let Some(t) = self.simplices[s].adj[facet] else {
            return Ok(None);
        };
        let other_facet = self.simplices[s].gluing[facet].image(facet);
        let mut span = self.change();
        span.invalidate();
        span.simplices[t].adj[other_facet] = None;
        span.simplices[s].adj[facet] = None;
        Ok(Some(t))
    }

    /// Unglues every facet of the given simplex.
    pub fn isolate(&mut self, s: SimplexIdx) -> Result<(), Err> {
        let mut span = self.change();
        for facet in 0..N {
            span.unjoin(s, facet)?;
        }
        Ok(())
    }

    /// Removes a simplex; later simplices move down by one index.
    pub fn remove_simplex(&mut self, s: SimplexIdx) -> Result<(), Err> {
        self.check_simplex(s)?;
        let mut span = self.change();
        span.isolate(s)?;
        span.invalidate();
        span.simplices.remove(s);
        for simp in span.simplices.iter_mut() {
            for adj in simp.adj.iter_mut().flatten() {
                if *adj > s {
                    *adj = SimplexIdx::from(adj.get() - 1);
                }
            }
        }
        Ok(())
    }

    /// Removes every simplex.
    pub fn clear(&mut self) {
        let mut span = self.change();
        span.invalidate();
        span.simplices = VecSimplexIdx::new();
    }

    /// Appends a copy of `other`; returns the index of its first simplex here.
    pub fn insert_triangulation(&mut self, other: &Triangulation<N>) -> SimplexIdx {
        let offset = self.size();
        let mut span = self.change();
        span.invalidate();
        for (_, simp) in other.simplices() {
            let mut copy = simp.clone();
            for adj in copy.adj.iter_mut().flatten() {
                *adj = SimplexIdx::from(adj.get() + offset);
            }
            span.simplices.push(copy);
        }
        SimplexIdx::from(offset)
    }

    /// Relabels vertices: old vertex `v` of simplex `s` becomes `perms[s][v]`.
    pub(crate) fn relabel(&mut self, perms: &[Perm<N>]) {
        debug_assert_eq!(perms.len(), self.size());
        let old = self.simplices.clone();
        let mut span = self.change();
        span.invalidate();
        for (s, simp) in old.indexed() {
            let rho = perms[s.get()];
            let target = &mut span.simplices[s];
            for facet in 0..N {
                let new_facet = rho.image(facet);
                target.adj[new_facet] = simp.adj[facet];
                if let Some(t) = simp.adj[facet] {
                    target.gluing[new_facet] = perms[t.get()] * simp.gluing[facet] * rho.inverse();
                }
            }
        }
    }

    /// Relabels simplices so that every orientable component becomes oriented.
    pub fn orient(&mut self) {
        let swap = Perm::<N>::transposition(N - 2, N - 1);
        let perms = (0..self.size())
            .map(|s| {
                let s = SimplexIdx::from(s);
                let comp = self.component_of(s);
                if self.components()[comp.get()].is_orientable() && self.orientation(s) < 0 {
                    swap
                } else {
                    Perm::identity()
                }
            })
            .collect::<Vec<_>>();
        if perms.iter().any(|p| !p.is_identity()) {
            self.relabel(&perms);
        }
    }

    /// Reverses the orientation of every simplex.
    pub fn reflect(&mut self) {
        let perms = vec![Perm::<N>::transposition(N - 2, N - 1); self.size()];
        self.relabel(&perms);
    }

    /// True if both triangulations have exactly the same gluings.
    pub fn is_identical_to(&self, other: &Triangulation<N>) -> bool {
        self.size() == other.size()
            && self.simplices().zip(other.simplices()).all(|((_, a), (_, b))| {
                (0..N).all(|f| a.adjacent(f) == b.adjacent(f) && a.gluing(f) == b.gluing(f))
            })
    }

    pub(crate) fn skeleton(&self) -> &Skeleton<N> {
        self.skeleton.get_or_init(|| Skeleton::compute(self))
    }

    /// Computes the skeleton now; afterwards read-only queries may be shared across threads.
    pub fn ensure_skeleton(&self) {
        self.skeleton();
    }

    pub fn count_faces(&self, k: usize) -> usize {
        self.skeleton().faces.get(k).map_or(0, Vec::len)
    }

    pub fn count_vertices(&self) -> usize {
        self.count_faces(0)
    }

    pub fn count_edges(&self) -> usize {
        self.count_faces(1)
    }

    pub fn count_triangles(&self) -> usize {
        self.count_faces(2)
    }

    /// All k-faces, for `k < N - 1`.
    pub fn faces(&self, k: usize) -> &[Face<N>] {
        self.skeleton().faces.get(k).map_or(&[], Vec::as_slice)
    }

    pub fn face(&self, k: usize, idx: FaceIdx) -> Result<&Face<N>, Err> {
        self.faces(k).get(idx.get()).ok_or(Err::FaceOutOfRange(idx.get(), k))
    }

    /// The triangulation face that is local k-face `f` of simplex `s`.
    pub fn simplex_face(&self, s: SimplexIdx, k: usize, f: usize) -> FaceIdx {
        self.skeleton().simplex_faces[s][k][f]
    }

    /// Maps the vertices of that face to the vertices of `s`.
    pub fn simplex_face_mapping(&self, s: SimplexIdx, k: usize, f: usize) -> Perm<N> {
        self.skeleton().simplex_mappings[s][k][f]
    }

    pub fn components(&self) -> &[Component] {
        self.skeleton().components.as_slice()
    }

    pub fn count_components(&self) -> usize {
        self.components().len()
    }

    pub fn component_of(&self, s: SimplexIdx) -> ComponentIdx {
        self.skeleton().simplex_component[s]
    }

    pub fn boundary_components(&self) -> &[BoundaryComponent] {
        self.skeleton().boundary_components.as_slice()
    }

    pub fn boundary_component(&self, idx: BoundaryIdx) -> &BoundaryComponent {
        &self.skeleton().boundary_components[idx]
    }

    pub fn count_boundary_components(&self) -> usize {
        self.boundary_components().len()
    }

    /// +1 or -1; consistent across gluings within orientable components.
    pub fn orientation(&self, s: SimplexIdx) -> i32 {
        self.skeleton().orientation[s]
    }

    /// True if the given facet is an edge of the spanning dual forest.
    pub fn in_dual_forest(&self, s: SimplexIdx, facet: usize) -> bool {
        self.skeleton().dual_forest[s] & (1 << facet) != 0
    }

    pub fn count_boundary_facets(&self) -> usize {
        self.components().iter().map(Component::count_boundary_facets).sum()
    }

    pub fn has_boundary_facets(&self) -> bool {
        self.simplices.iter().any(Simplex::has_boundary)
    }

    pub fn is_valid(&self) -> bool {
        self.skeleton().valid
    }

    pub fn is_orientable(&self) -> bool {
        self.components().iter().all(Component::is_orientable)
    }

    pub fn is_oriented(&self) -> bool {
        (0..self.size()).all(|s| self.orientation(SimplexIdx::from(s)) > 0)
    }

    pub fn is_connected(&self) -> bool {
        self.count_components() <= 1
    }

    /// No boundary facets and no ideal vertices.
    pub fn is_closed(&self) -> bool {
        self.boundary_components().is_empty()
    }

    pub fn is_ideal(&self) -> bool {
        self.faces(0).iter().any(Face::is_ideal)
    }

    /// Alternating count of faces of every dimension.
    pub fn euler_char_tri(&self) -> i64 {
        let mut ans = 0i64;
        for k in 0..N - 1 {
            let count = self.count_faces(k) as i64;
            ans += if k % 2 == 0 { count } else { -count };
        }
        ans + if (N - 1) % 2 == 0 { self.size() as i64 } else { -(self.size() as i64) }
    }

    /// Euler characteristic of the compact manifold obtained by truncating
    /// every ideal vertex.
    pub fn euler_char_manifold(&self) -> i64 {
        let correction = self
            .faces(0)
            .iter()
            .filter(|v| v.is_ideal())
            .filter_map(Face::link_euler_char)
            .map(|chi| chi - 1)
            .sum::<i64>();
        self.euler_char_tri() + correction
    }

    /// Number of k-faces inside one simplex.
    pub fn faces_per_simplex(k: usize) -> usize {
        FaceNumbering::<N>::count(k)
    }

    /// The link of a k-face, triangulated with one simplex per embedding.
    /// `M` must equal `N - k - 1`.
    pub fn face_link<const M: usize>(&self, k: usize, idx: FaceIdx) -> Result<Triangulation<M>, Err> {
        let face = self.face(k, idx)?;
        link::build::<N, M>(self, k, face.embeddings())
    }

    /// One triangulation per connected component, in component order.
    pub fn triangulate_components(&self) -> Vec<Triangulation<N>> {
        self.components()
            .iter()
            .map(|comp| {
                let position = comp
                    .simplices()
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| (s, SimplexIdx::from(i)))
                    .collect::<std::collections::HashMap<_, _>>();
                let mut piece = Triangulation::new();
                {
                    let mut span = piece.change();
                    span.invalidate();
                    for &s in comp.simplices() {
                        let mut copy = self.simplex(s).clone();
                        for adj in copy.adj.iter_mut().flatten() {
                            *adj = position[&*adj];
                        }
                        span.simplices.push(copy);
                    }
                }
                piece
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perm::Perm4;

    #[test]
    fn join_is_symmetric() {
        let mut tri = Triangulation3::new();
        let a = tri.new_simplex();
        let b = tri.new_simplex();
        let g = Perm4::from_images([1, 2, 3, 0]).unwrap();
        tri.join(a, 0, b, g).unwrap();
        assert_eq!(tri.simplex(b).adjacent(1), Some(a));
        assert_eq!(tri.simplex(b).gluing(1), Some(g.inverse()));
        assert_eq!(tri.simplex(a).adjacent_facet(0), Some(1));
    }

    #[test]
    fn join_rejects_bad_gluings() {
        let mut tri = Triangulation3::new();
        let a = tri.new_simplex();
        let b = tri.new_simplex();
        assert_eq!(
            tri.join(a, 2, a, Perm4::identity()),
            Err(Err::SelfGluedFacet { simplex: 0, facet: 2 })
        );
        tri.join(a, 0, b, Perm4::identity()).unwrap();
        assert!(matches!(tri.join(b, 0, a, Perm4::transposition(0, 1)), Err(Err::AlreadyGlued { .. })));
        assert!(matches!(tri.join(a, 7, b, Perm4::identity()), Err(Err::FacetOutOfRange(7, 4))));
        assert!(matches!(tri.join(a, 1, 5.into(), Perm4::identity()), Err(Err::SimplexOutOfRange(5, 2))));
        assert_eq!(tri.simplex(a).adjacent(1), None);
    }

    #[test]
    fn unjoin_is_idempotent() {
        let mut tri = Triangulation3::new();
        let a = tri.new_simplex();
        let b = tri.new_simplex();
        tri.join(a, 3, b, Perm4::identity()).unwrap();
        assert_eq!(tri.unjoin(b, 3).unwrap(), Some(a));
        assert_eq!(tri.unjoin(a, 3).unwrap(), None);
        assert!(tri.simplex(a).is_isolated());
    }

    #[test]
    fn remove_simplex_shifts_indices() {
        let mut tri = Triangulation3::new();
        let s = tri.new_simplices(3);
        tri.join(s[1], 0, s[2], Perm4::identity()).unwrap();
        tri.join(s[0], 0, s[1], Perm4::transposition(0, 1)).unwrap();
        tri.remove_simplex(s[0]).unwrap();
        assert_eq!(tri.size(), 2);
        assert_eq!(tri.simplex(0.into()).adjacent(0), Some(1.into()));
        assert_eq!(tri.simplex(0.into()).adjacent(1), None);
    }

    #[test]
    fn mutation_discards_the_skeleton() {
        let mut tri = Triangulation3::new();
        let a = tri.new_simplex();
        assert_eq!(tri.count_vertices(), 4);
        let b = tri.new_simplex();
        tri.join(a, 0, b, Perm4::identity()).unwrap();
        assert_eq!(tri.count_vertices(), 5);
        assert_eq!(tri.count_triangles(), 7);
        assert_eq!(tri.count_components(), 1);
    }

    #[test]
    fn orient_makes_every_gluing_odd() {
        let mut tri = Triangulation3::new();
        let s = tri.new_simplices(3);
        tri.join(s[0], 0, s[1], Perm4::identity()).unwrap();
        tri.join(s[1], 1, s[2], Perm4::transposition(0, 2)).unwrap();
        tri.join(s[2], 3, s[0], Perm4::rot(1)).unwrap();
        assert!(tri.is_orientable());
        tri.orient();
        assert!(tri.is_oriented());
        for (_, simp) in tri.simplices() {
            for f in 0..4 {
                if let Some(g) = simp.gluing(f) {
                    assert_eq!(g.sign(), -1);
                }
            }
        }
    }

    #[test]
    fn insert_and_compare() {
        let mut a = Triangulation3::new();
        let s = a.new_simplices(2);
        a.join(s[0], 2, s[1], Perm4::rot(2)).unwrap();
        let mut b = Triangulation3::new();
        b.insert_triangulation(&a);
        assert!(a.is_identical_to(&b));
        b.insert_triangulation(&a);
        assert_eq!(b.size(), 4);
        assert_eq!(b.simplex(2.into()).adjacent(2), Some(3.into()));
        assert_eq!(b.count_components(), 2);
    }

    #[test]
    fn components_split_apart() {
        let mut tri = factory::layered_lens_space(5, 2).unwrap();
        let s = tri.new_simplices(2);
        tri.join(s[0], 1, s[1], Perm4::rot(1)).unwrap();
        let pieces = tri.triangulate_components();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces.iter().map(Triangulation::size).sum::<usize>(), 3);
        assert!(pieces.iter().any(Triangulation::is_closed));
        assert!(pieces.iter().all(Triangulation::is_connected));
    }

    #[test]
    fn vertex_links_are_surfaces() {
        let tri = factory::figure_eight();
        let link = tri.face_link::<3>(0, FaceIdx::from(0)).unwrap();
        assert_eq!(link.size(), 8);
        assert!(!link.has_boundary_facets());
        assert!(tri.face_link::<2>(0, FaceIdx::from(0)).is_err());
    }
}
