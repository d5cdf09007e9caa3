//! Canonical numbering of the k-faces of a top-dimensional simplex.
//!
//! A k-face is a set of k+1 simplex vertices. When such a set is no larger
//! than its complement the faces are numbered lexicographically; otherwise
//! face `i` is the complement of the lexicographically numbered face `i` of
//! the complementary dimension (so facet `i` is opposite vertex `i`).
//!
//! Each face also carries an ordering permutation `p` whose first k+1 images
//! are the face's vertices in increasing order. For faces of codimension at
//! least two the remaining images are chosen so that `p` is even.

use lazy_static::lazy_static;

use crate::core::perm::{Perm, PermTable, MAX_PERM_SIZE};

/// Vertices of each edge of a tetrahedron.
pub const EDGE_VERTEX: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Returns the number of the tetrahedron edge joining vertices `a` and `b`.
#[inline]
pub fn edge_number(a: usize, b: usize) -> usize {
    debug_assert!(a != b && a < 4 && b < 4);
    const NUMBER: [[usize; 4]; 4] = [
        [usize::MAX, 0, 1, 2],
        [0, usize::MAX, 3, 4],
        [1, 3, usize::MAX, 5],
        [2, 4, 5, usize::MAX],
    ];
    NUMBER[a][b]
}

#[derive(Clone, Copy)]
struct FaceInfo {
    mask: u8,
    ordering: u8,
}

struct FaceTable {
    /// `faces[k][f]`, for 0 <= k <= n - 2.
    faces: Vec<Vec<FaceInfo>>,
    /// `number[k][mask]` is the face number of the vertex set `mask`.
    number: Vec<Vec<u8>>,
}

fn subsets(n: usize, size: usize) -> Vec<u8> {
    // Lexicographic order on sorted vertex lists.
    let mut out = (0u8..(1 << n))
        .filter(|m| m.count_ones() as usize == size)
        .map(|m| {
            let verts = (0..n).filter(|&i| m & (1 << i) != 0).collect::<Vec<_>>();
            (verts, m)
        })
        .collect::<Vec<_>>();
    out.sort();
    out.into_iter().map(|(_, m)| m).collect()
}

impl FaceTable {
    fn build(n: usize) -> Self {
        let mut faces = Vec::new();
        let mut number = Vec::new();
        if n < 3 {
            return Self { faces, number };
        }
        let dim = n - 1;
        let full = ((1u16 << n) - 1) as u8;
        let table = &perm_tables()[n];
        for k in 0..dim {
            let size = k + 1;
            let masks = if size <= n - size {
                subsets(n, size)
            } else {
                subsets(n, n - size).into_iter().map(|m| full & !m).collect()
            };
            let infos = masks
                .iter()
                .enumerate()
                .map(|(f, &mask)| FaceInfo { mask, ordering: ordering_code(table, n, k, f, mask) as u8 })
                .collect::<Vec<_>>();
            let mut lookup = vec![u8::MAX; 1 << n];
            for (f, info) in infos.iter().enumerate() {
                lookup[info.mask as usize] = f as u8;
            }
            faces.push(infos);
            number.push(lookup);
        }
        Self { faces, number }
    }
}

fn perm_tables() -> &'static [PermTable; MAX_PERM_SIZE + 1] {
    PermTable::all()
}

fn ordering_code(table: &PermTable, n: usize, k: usize, face: usize, mask: u8) -> usize {
    let dim = n - 1;
    let mut images = (0..n).filter(|&i| mask & (1 << i) != 0).collect::<Vec<_>>();
    images.extend((0..n).filter(|&i| mask & (1 << i) == 0));
    if k + 1 == dim {
        // facet opposite `face`: the other vertices in order, then `face`
        images = (0..n).filter(|&i| i != face).chain(std::iter::once(face)).collect();
    } else if k == 0 && dim == 3 {
        const TET_VERTEX: [[usize; 4]; 4] = [[0, 1, 2, 3], [1, 0, 3, 2], [2, 3, 0, 1], [3, 2, 1, 0]];
        images = TET_VERTEX[face].to_vec();
    } else if k == 0 {
        images = (0..n).map(|i| (i + face) % n).collect();
    } else if parity_of(&images) == 1 {
        images.swap(n - 2, n - 1);
    }
    table.code_of(&images)
}

fn parity_of(images: &[usize]) -> usize {
    let mut inv = 0;
    for i in 0..images.len() {
        for j in i + 1..images.len() {
            if images[i] > images[j] {
                inv += 1;
            }
        }
    }
    inv & 1
}

lazy_static! {
    static ref FACE_TABLES: [FaceTable; MAX_PERM_SIZE + 1] = std::array::from_fn(FaceTable::build);
}

/// Face numbering inside a simplex with N vertices (dimension N - 1).
pub struct FaceNumbering<const N: usize>;

impl<const N: usize> FaceNumbering<N> {
    /// Dimension of the simplex.
    pub const DIM: usize = N - 1;

    #[inline]
    fn table() -> &'static FaceTable {
        &FACE_TABLES[N]
    }

    /// Number of k-faces in the simplex, for `k < N - 1`.
    #[inline]
    pub fn count(k: usize) -> usize {
        Self::table().faces[k].len()
    }

    /// The canonical ordering permutation of the given k-face.
    #[inline]
    pub fn ordering(k: usize, face: usize) -> Perm<N> {
        let code = Self::table().faces[k][face].ordering as usize;
        Perm::<N>::from_sn_index(code).unwrap_or_default()
    }

    /// The k-face spanned by the images of `0..=k` under `vertices`.
    #[inline]
    pub fn face_number(k: usize, vertices: Perm<N>) -> usize {
        let mask = (0..=k).fold(0usize, |m, i| m | (1 << vertices.image(i)));
        Self::table().number[k][mask] as usize
    }

    #[inline]
    pub fn contains_vertex(k: usize, face: usize, vertex: usize) -> bool {
        Self::table().faces[k][face].mask & (1 << vertex) != 0
    }

    /// Vertices of the given k-face in increasing order.
    pub fn vertices(k: usize, face: usize) -> impl Iterator<Item = usize> {
        let mask = Self::table().faces[k][face].mask;
        (0..N).filter(move |&i| mask & (1 << i) != 0)
    }

    /// The k-faces (as face numbers) contained in the given j-face, j > k.
    pub fn subfaces(j: usize, face: usize, k: usize) -> impl Iterator<Item = usize> {
        let outer = Self::table().faces[j][face].mask;
        Self::table().faces[k]
            .iter()
            .enumerate()
            .filter(move |(_, info)| info.mask & !outer == 0)
            .map(|(f, _)| f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::perm::{Perm3, Perm4, Perm5};

    #[test]
    fn tetrahedron_edges_are_lexicographic() {
        for (e, [a, b]) in EDGE_VERTEX.iter().enumerate() {
            let p = FaceNumbering::<4>::ordering(1, e);
            assert_eq!((p.image(0), p.image(1)), (*a, *b));
            assert_eq!(p.sign(), 1);
            assert_eq!(FaceNumbering::<4>::face_number(1, p), e);
            assert_eq!(edge_number(*a, *b), e);
        }
        assert_eq!(FaceNumbering::<4>::ordering(1, 1), Perm4::from_images([0, 2, 3, 1]).unwrap());
    }

    #[test]
    fn facets_are_opposite_their_number() {
        assert_eq!(FaceNumbering::<4>::ordering(2, 0), Perm4::from_images([1, 2, 3, 0]).unwrap());
        assert_eq!(FaceNumbering::<4>::ordering(2, 3), Perm4::identity());
        for f in 0..4 {
            assert!(!FaceNumbering::<4>::contains_vertex(2, f, f));
        }
        assert_eq!(FaceNumbering::<3>::ordering(1, 1), Perm3::from_images([0, 2, 1]).unwrap());
    }

    #[test]
    fn pentachoron_triangles_complement_edges() {
        for t in 0..10 {
            let tri = FaceNumbering::<5>::vertices(2, t).collect::<Vec<_>>();
            let edge = FaceNumbering::<5>::vertices(1, t).collect::<Vec<_>>();
            assert_eq!(tri.len(), 3);
            assert!(edge.iter().all(|v| !tri.contains(v)));
            assert_eq!(FaceNumbering::<5>::ordering(2, t).sign(), 1);
        }
        assert_eq!(FaceNumbering::<5>::ordering(0, 2), Perm5::rot(2));
    }

    #[test]
    fn vertex_orderings_start_at_the_vertex() {
        for v in 0..4 {
            let p = FaceNumbering::<4>::ordering(0, v);
            assert_eq!(p.image(0), v);
            assert_eq!(p.sign(), 1);
            assert_eq!(FaceNumbering::<4>::face_number(0, p), v);
        }
    }

    #[test]
    fn subfaces_of_a_facet() {
        let edges = FaceNumbering::<4>::subfaces(2, 0, 1).collect::<Vec<_>>();
        assert_eq!(edges, vec![3, 4, 5]);
        assert_eq!(FaceNumbering::<4>::count(1), 6);
        assert_eq!(FaceNumbering::<5>::count(2), 10);
    }
}
