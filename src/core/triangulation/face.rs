use std::collections::VecDeque;

use serde::Serialize;

use crate::core::perm::Perm;
use crate::core::shared::{BoundaryIdx, ComponentIdx, FaceIdx, SimplexIdx};

/// One appearance of a face inside a top-dimensional simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceEmbedding<const N: usize> {
    pub(super) simplex: SimplexIdx,
    pub(super) face: usize,
    pub(super) vertices: Perm<N>,
}

impl<const N: usize> FaceEmbedding<N> {
    #[inline]
    pub fn simplex(&self) -> SimplexIdx {
        self.simplex
    }

    /// The face number inside the simplex.
    #[inline]
    pub fn face(&self) -> usize {
        self.face
    }

    /// Maps the face's own vertices `0..=k` to simplex vertices; the
    /// remaining images describe the simplex vertices outside the face.
    #[inline]
    pub fn vertices(&self) -> Perm<N> {
        self.vertices
    }
}

/// Embedding storage, shaped by the codimension of the face.
#[derive(Clone, Debug)]
pub enum Embeddings<const N: usize> {
    /// A facet appears once on the boundary and twice in the interior.
    Facet {
        front: FaceEmbedding<N>,
        back: Option<FaceEmbedding<N>>,
    },
    /// Codimension two, in the order met walking around the link.
    Ridge(VecDeque<FaceEmbedding<N>>),
    Other(Vec<FaceEmbedding<N>>),
}

impl<const N: usize> Embeddings<N> {
    pub fn len(&self) -> usize {
        match self {
            Embeddings::Facet { back, .. } => 1 + back.is_some() as usize,
            Embeddings::Ridge(e) => e.len(),
            Embeddings::Other(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &FaceEmbedding<N>> + '_> {
        match self {
            Embeddings::Facet { front, back } => Box::new(std::iter::once(front).chain(back.iter())),
            Embeddings::Ridge(e) => Box::new(e.iter()),
            Embeddings::Other(e) => Box::new(e.iter()),
        }
    }

    pub fn get(&self, i: usize) -> Option<&FaceEmbedding<N>> {
        match self {
            Embeddings::Facet { front, back } => match i {
                0 => Some(front),
                1 => back.as_ref(),
                _ => None,
            },
            Embeddings::Ridge(e) => e.get(i),
            Embeddings::Other(e) => e.get(i),
        }
    }
}

/// How the link of a vertex (or of an edge in dimension 4) looks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LinkKind {
    /// Links are not examined for faces of this dimension.
    Unchecked,
    /// A sphere: the face is internal and regular.
    Sphere,
    /// A disc or ball: the face lies on the real boundary.
    Ball,
    /// A closed link that is not a sphere: the vertex is ideal.
    Ideal,
    /// A bounded link that is not a ball, or an invalid link.
    Invalid,
}

/// A k-face of a triangulation with N-vertex simplices.
///
/// Faces live as long as the skeleton they belong to.
#[derive(Clone, Debug)]
pub struct Face<const N: usize> {
    pub(super) dim: usize,
    pub(super) index: FaceIdx,
    pub(super) embeddings: Embeddings<N>,
    pub(super) bad_identification: bool,
    pub(super) bad_link: bool,
    pub(super) link_orientable: bool,
    pub(super) link_kind: LinkKind,
    pub(super) link_euler_char: Option<i64>,
    pub(super) component: ComponentIdx,
    pub(super) boundary: Option<BoundaryIdx>,
}

impl<const N: usize> Face<N> {
    pub(super) fn new(dim: usize, index: FaceIdx, embeddings: Embeddings<N>, component: ComponentIdx) -> Self {
        Self {
            dim,
            index,
            embeddings,
            bad_identification: false,
            bad_link: false,
            link_orientable: true,
            link_kind: LinkKind::Unchecked,
            link_euler_char: None,
            component,
            boundary: None,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn index(&self) -> FaceIdx {
        self.index
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.embeddings.len()
    }

    pub fn embeddings(&self) -> &Embeddings<N> {
        &self.embeddings
    }

    pub fn embedding(&self, i: usize) -> Option<&FaceEmbedding<N>> {
        self.embeddings.get(i)
    }

    pub fn front(&self) -> &FaceEmbedding<N> {
        match &self.embeddings {
            Embeddings::Facet { front, .. } => front,
            Embeddings::Ridge(e) => &e[0],
            Embeddings::Other(e) => &e[0],
        }
    }

    pub fn back(&self) -> &FaceEmbedding<N> {
        match &self.embeddings {
            Embeddings::Facet { front, back } => back.as_ref().unwrap_or(front),
            Embeddings::Ridge(e) => &e[e.len() - 1],
            Embeddings::Other(e) => &e[e.len() - 1],
        }
    }

    /// A face is valid unless it is identified with itself under a
    /// non-identity map, or its link is neither a sphere, a ball nor
    /// (for ideal vertices) a closed manifold.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.bad_identification && !self.bad_link
    }

    pub fn has_bad_identification(&self) -> bool {
        self.bad_identification
    }

    pub fn has_bad_link(&self) -> bool {
        self.bad_link
    }

    pub fn is_link_orientable(&self) -> bool {
        self.link_orientable
    }

    pub fn link_kind(&self) -> LinkKind {
        self.link_kind
    }

    /// Euler characteristic of the link, for faces whose link was examined.
    pub fn link_euler_char(&self) -> Option<i64> {
        self.link_euler_char
    }

    pub fn is_ideal(&self) -> bool {
        self.link_kind == LinkKind::Ideal && !self.bad_identification
    }

    pub fn is_boundary(&self) -> bool {
        self.boundary.is_some()
    }

    pub fn boundary_component(&self) -> Option<BoundaryIdx> {
        self.boundary
    }

    pub fn component(&self) -> ComponentIdx {
        self.component
    }
}
