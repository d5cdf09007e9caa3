use crate::core::shared::{BoundaryIdx, ComponentIdx, FaceIdx, SimplexIdx};

/// A connected component of a triangulation.
#[derive(Clone, Debug)]
pub struct Component {
    pub(super) index: ComponentIdx,
    pub(super) simplices: Vec<SimplexIdx>,
    pub(super) orientable: bool,
    pub(super) boundary_facets: usize,
    pub(super) boundary_components: Vec<BoundaryIdx>,
}

impl Component {
    pub(super) fn new(index: ComponentIdx) -> Self {
        Self {
            index,
            simplices: Vec::new(),
            orientable: true,
            boundary_facets: 0,
            boundary_components: Vec::new(),
        }
    }

    pub fn index(&self) -> ComponentIdx {
        self.index
    }

    pub fn size(&self) -> usize {
        self.simplices.len()
    }

    pub fn simplices(&self) -> &[SimplexIdx] {
        &self.simplices
    }

    pub fn is_orientable(&self) -> bool {
        self.orientable
    }

    pub fn count_boundary_facets(&self) -> usize {
        self.boundary_facets
    }

    pub fn boundary_components(&self) -> &[BoundaryIdx] {
        &self.boundary_components
    }

    pub fn is_closed(&self) -> bool {
        self.boundary_components.is_empty()
    }
}

/// A boundary component: either a connected union of boundary facets, or
/// a single ideal vertex.
#[derive(Clone, Debug)]
pub struct BoundaryComponent {
    pub(super) index: BoundaryIdx,
    pub(super) component: ComponentIdx,
    pub(super) facets: Vec<FaceIdx>,
    pub(super) ideal_vertex: Option<FaceIdx>,
    pub(super) euler_char: i64,
}

impl BoundaryComponent {
    pub fn index(&self) -> BoundaryIdx {
        self.index
    }

    pub fn component(&self) -> ComponentIdx {
        self.component
    }

    /// The boundary facets, empty for an ideal boundary component.
    pub fn facets(&self) -> &[FaceIdx] {
        &self.facets
    }

    pub fn ideal_vertex(&self) -> Option<FaceIdx> {
        self.ideal_vertex
    }

    pub fn is_ideal(&self) -> bool {
        self.ideal_vertex.is_some()
    }

    pub fn is_real(&self) -> bool {
        self.ideal_vertex.is_none()
    }

    pub fn euler_char(&self) -> i64 {
        self.euler_char
    }
}
