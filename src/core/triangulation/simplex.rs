use crate::core::perm::Perm;
use crate::core::shared::SimplexIdx;

/// A top-dimensional simplex with N vertices, owned by a [`super::Triangulation`].
///
/// Facet `i` is the facet opposite vertex `i`. If facet `i` is glued to
/// simplex `t` then `gluing(i)` maps the vertices of this simplex to the
/// corresponding vertices of `t`, and `gluing(i)[i]` is the facet of `t`
/// on the other side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Simplex<const N: usize> {
    pub(super) adj: [Option<SimplexIdx>; N],
    pub(super) gluing: [Perm<N>; N],
    pub(super) description: String,
}

impl<const N: usize> Simplex<N> {
    pub(super) fn new(description: String) -> Self {
        Self {
            adj: [None; N],
            gluing: [Perm::identity(); N],
            description,
        }
    }

    #[inline]
    pub fn adjacent(&self, facet: usize) -> Option<SimplexIdx> {
        self.adj[facet]
    }

    /// The gluing permutation across the given facet, or `None` on the boundary.
    #[inline]
    pub fn gluing(&self, facet: usize) -> Option<Perm<N>> {
        self.adj[facet].map(|_| self.gluing[facet])
    }

    /// The facet of the adjacent simplex that meets the given facet.
    #[inline]
    pub fn adjacent_facet(&self, facet: usize) -> Option<usize> {
        self.adj[facet].map(|_| self.gluing[facet].image(facet))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn has_boundary(&self) -> bool {
        self.adj.iter().any(Option::is_none)
    }

    pub fn is_isolated(&self) -> bool {
        self.adj.iter().all(Option::is_none)
    }
}
