//! Combinatorial tables for normal discs inside a single tetrahedron.
//!
//! Triangle type `v` cuts off vertex `v`. Quadrilateral type `q` separates
//! the vertex pairs `{QUAD_DEFN[q][0], QUAD_DEFN[q][1]}` and
//! `{QUAD_DEFN[q][2], QUAD_DEFN[q][3]}`. Octagon type `q` meets the two
//! edges that quadrilateral type `q` leaves alone twice each.

pub use crate::core::face_numbering::{edge_number, EDGE_VERTEX};

/// The vertex split of each quadrilateral type, first pair first.
pub const QUAD_DEFN: [[usize; 4]; 3] = [[0, 1, 2, 3], [0, 2, 1, 3], [0, 3, 1, 2]];

/// `QUAD_PARTNER[q][v]` is the vertex on the same side of quad type `q` as `v`.
pub const QUAD_PARTNER: [[usize; 4]; 3] = [[1, 0, 3, 2], [2, 3, 0, 1], [3, 2, 1, 0]];

const NONE: usize = usize::MAX;

const SEPARATING: [[usize; 4]; 4] = [
    [NONE, 0, 1, 2],
    [0, NONE, 2, 1],
    [1, 2, NONE, 0],
    [2, 1, 0, NONE],
];

const MEETING: [[[usize; 2]; 4]; 4] = [
    [[NONE, NONE], [1, 2], [0, 2], [0, 1]],
    [[1, 2], [NONE, NONE], [0, 1], [0, 2]],
    [[0, 2], [0, 1], [NONE, NONE], [1, 2]],
    [[0, 1], [0, 2], [1, 2], [NONE, NONE]],
];

/// The quad type that keeps vertices `a` and `b` on the same side.
#[inline]
pub fn quad_separating(a: usize, b: usize) -> usize {
    debug_assert!(a != b);
    SEPARATING[a][b]
}

/// The two quad types that cross the edge joining `a` and `b`.
#[inline]
pub fn quad_meeting(a: usize, b: usize) -> [usize; 2] {
    debug_assert!(a != b);
    MEETING[a][b]
}

/// Whether `v` lies on the same side of quad type `q` as vertex 0.
#[inline]
pub fn on_zero_side(q: usize, v: usize) -> bool {
    v == 0 || QUAD_PARTNER[q][0] == v
}
