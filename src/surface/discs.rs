//! Individual normal discs, glued together across the facets of the
//! triangulation, for connectivity and sidedness queries.
//!
//! Triangles of type `v` are numbered outwards from vertex `v`; quads of
//! type `q` are numbered outwards from vertex 0. Each disc carries a
//! transverse direction: away from its vertex for a triangle, away from
//! vertex 0 for a quad.

use super::tables::{on_zero_side, quad_separating};
use super::{Err, NormalSurface};

/// Union-find whose edges record whether the two ends disagree.
struct ParityForest {
    parent: Vec<usize>,
    parity: Vec<bool>,
}

impl ParityForest {
    fn new(len: usize) -> Self {
        Self { parent: (0..len).collect(), parity: vec![false; len] }
    }

    fn find(&mut self, mut x: usize) -> (usize, bool) {
        let mut path = Vec::new();
        while self.parent[x] != x {
            path.push(x);
            x = self.parent[x];
        }
        let root = x;
        // Compress from the top of the path down, accumulating parity.
        let mut acc = false;
        for &node in path.iter().rev() {
            acc ^= self.parity[node];
            self.parity[node] = acc;
            self.parent[node] = root;
        }
        match path.first() {
            Some(&first) => (root, self.parity[first]),
            None => (root, false),
        }
    }

    /// Returns false if the new relation contradicts the existing ones.
    fn union(&mut self, a: usize, b: usize, odd: bool) -> bool {
        let (ra, pa) = self.find(a);
        let (rb, pb) = self.find(b);
        if ra == rb {
            return (pa ^ pb) == odd;
        }
        self.parent[ra] = rb;
        self.parity[ra] = pa ^ pb ^ odd;
        true
    }

    fn count_roots(&mut self) -> usize {
        (0..self.parent.len()).filter(|&x| self.find(x).0 == x).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DiscAnalysis {
    pub components: usize,
    pub two_sided: bool,
    pub orientable: bool,
}

struct DiscIndex {
    /// Disc counts as machine integers, seven per tetrahedron.
    counts: Vec<[usize; 7]>,
    offsets: Vec<[usize; 7]>,
    len: usize,
}

impl DiscIndex {
    fn new(surface: &NormalSurface) -> Result<Self, Err> {
        let mut counts = Vec::with_capacity(surface.coords.len());
        let mut offsets = Vec::with_capacity(surface.coords.len());
        let mut len = 0usize;
        for c in &surface.coords {
            let mut row = [0; 7];
            let mut off = [0; 7];
            for (k, n) in c.triangles.iter().chain(&c.quads).enumerate() {
                if n.is_infinite() {
                    return Err(Err::NotCompact);
                }
                row[k] = n.to_usize().ok_or(Err::TooManyDiscs)?;
                off[k] = len;
                len = len.checked_add(row[k]).ok_or(Err::TooManyDiscs)?;
            }
            counts.push(row);
            offsets.push(off);
        }
        Ok(Self { counts, offsets, len })
    }

    /// The disc whose arc sits at position `k` (counting outwards from
    /// `vertex`) on facet `facet` of tetrahedron `t`, with its direction
    /// relative to "away from `vertex`".
    fn arc_disc(&self, t: usize, vertex: usize, facet: usize, k: usize) -> (usize, i32) {
        let c = &self.counts[t];
        if k < c[vertex] {
            return (self.offsets[t][vertex] + k, 1);
        }
        let q = quad_separating(vertex, facet);
        let j = k - c[vertex];
        if on_zero_side(q, vertex) {
            (self.offsets[t][4 + q] + j, 1)
        } else {
            (self.offsets[t][4 + q] + c[4 + q] - 1 - j, -1)
        }
    }

    fn arcs(&self, t: usize, vertex: usize, facet: usize) -> usize {
        self.counts[t][vertex] + self.counts[t][4 + quad_separating(vertex, facet)]
    }
}

pub(crate) fn analyse(surface: &NormalSurface) -> Result<DiscAnalysis, Err> {
    if !surface.is_normal() {
        return analyse(&surface.remove_octs()?);
    }
    let index = DiscIndex::new(surface)?;
    let mut sides = ParityForest::new(index.len);
    let mut orientation = ParityForest::new(index.len);
    let mut two_sided = true;
    let mut orientable = true;
    for (t, simp) in surface.tri.simplices() {
        let t = t.get();
        for facet in 0..4 {
            let (Some(u), Some(g)) = (simp.adjacent(facet), simp.gluing(facet)) else {
                continue;
            };
            let u = u.get();
            if (u, g.image(facet)) < (t, facet) {
                continue;
            }
            for v in (0..4).filter(|&v| v != facet) {
                for k in 0..index.arcs(t, v, facet) {
                    let (a, dir_a) = index.arc_disc(t, v, facet, k);
                    let (b, dir_b) = index.arc_disc(u, g.image(v), g.image(facet), k);
                    two_sided &= sides.union(a, b, dir_a != dir_b);
                    orientable &= orientation.union(a, b, dir_a * dir_b * -g.sign() == -1);
                }
            }
        }
    }
    let components = sides.count_roots();
    tracing::trace!(discs = index.len, components, two_sided, orientable, "analysed normal discs");
    Ok(DiscAnalysis { components, two_sided, orientable })
}

impl NormalSurface {
    /// Number of connected components. Requires a compact surface.
    pub fn count_components(&self) -> Result<usize, Err> {
        Ok(analyse(self)?.components)
    }

    /// Whether the surface has exactly one component.
    pub fn is_connected(&self) -> Result<bool, Err> {
        Ok(analyse(self)?.components == 1)
    }

    pub fn is_orientable(&self) -> Result<bool, Err> {
        Ok(analyse(self)?.orientable)
    }

    /// Whether the surface has a consistent transverse direction.
    pub fn is_two_sided(&self) -> Result<bool, Err> {
        Ok(analyse(self)?.two_sided)
    }
}
