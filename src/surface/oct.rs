//! Converting almost normal surfaces into normal surfaces in a
//! retriangulation.

use std::sync::Arc;

use crate::core::perm::Perm4;
use crate::core::shared::SimplexIdx;

use super::tables::EDGE_VERTEX;
use super::{Err, NormalSurface, TetCoords};

impl NormalSurface {
    /// Returns an isotopic normal surface in a new triangulation.
    ///
    /// Each tetrahedron holding octagons of type `k` is split into three
    /// tetrahedra `a`, `b` and `c`: `b` keeps the original index, while `a`
    /// (around edge `k`) and `c` (around edge `5 - k`) are appended in that
    /// order. The octagons become quads of `b` together with triangles of
    /// `a` and `c`. A surface without octagons is returned unchanged.
    pub fn remove_octs(&self) -> Result<NormalSurface, Err> {
        let expand: Vec<(usize, usize)> = self
            .coords
            .iter()
            .enumerate()
            .filter_map(|(t, c)| c.octs.iter().position(|n| !n.is_zero()).map(|k| (t, k)))
            .collect();

        let mut coords: Vec<TetCoords> = self
            .coords
            .iter()
            .map(|c| TetCoords { triangles: c.triangles.clone(), quads: c.quads.clone(), octs: Default::default() })
            .collect();
        if expand.is_empty() {
            return Ok(Self::from_parts(self.tri.clone(), coords));
        }
        if !self.embedded() {
            return Err(Err::Octagons);
        }

        let mut retri = (*self.tri).clone();
        {
            let mut span = retri.change();
            for &(t, k) in &expand {
                let a = span.new_simplex();
                let b = SimplexIdx::from(t);
                let c = span.new_simplex();

                // The facets on either side of edge k, then of edge 5 - k.
                let a_ext = EDGE_VERTEX[5 - k];
                let c_ext = EDGE_VERTEX[k];

                for (ext, me, other) in [(a_ext, a, c), (c_ext, c, a)] {
                    for j in 0..2 {
                        let simp = span.simplex(b);
                        let (Some(adj), Some(gluing)) = (simp.adjacent(ext[j]), simp.gluing(ext[j])) else {
                            continue;
                        };
                        span.unjoin(b, ext[j])?;
                        if adj == b {
                            if gluing.image(ext[j]) == ext[j ^ 1] {
                                span.join(me, ext[j], me, gluing)?;
                            } else {
                                span.join(me, ext[j], other, gluing)?;
                            }
                        } else {
                            span.join(me, ext[j], adj, gluing)?;
                        }
                    }
                }

                let swap = Perm4::transposition(a_ext[0], a_ext[1]);
                span.join(b, c_ext[0], a, swap)?;
                span.join(b, c_ext[1], a, swap)?;
                span.join(b, a_ext[0], c, swap)?;
                span.join(b, a_ext[1], c, swap)?;

                let octs = self.coords[t].octs[k].clone();
                let triangles = coords[t].triangles.clone();
                coords[t].triangles.swap(a_ext[0], a_ext[1]);
                coords[t].quads[k] += &octs;

                let mut outer_a = TetCoords { triangles: triangles.clone(), ..Default::default() };
                let mut outer_c = TetCoords { triangles, ..Default::default() };
                for v in c_ext {
                    outer_a.triangles[v] += &octs;
                }
                for v in a_ext {
                    outer_c.triangles[v] += &octs;
                }
                coords.push(outer_a);
                coords.push(outer_c);
            }
        }
        tracing::debug!(expanded = expand.len(), size = retri.size(), "removed octagons");
        Ok(Self::from_parts(Arc::new(retri), coords))
    }
}
