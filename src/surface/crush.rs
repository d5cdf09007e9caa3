use crate::core::perm::Perm4;
use crate::core::shared::SimplexIdx;
use crate::core::triangulation::Triangulation3;

use super::tables::QUAD_PARTNER;
use super::{Err, NormalSurface};

impl NormalSurface {
    /// Crushes the surface to a point.
    ///
    /// Every tetrahedron holding a quad is flattened: its facets are paired
    /// off across the quad and removed, and the surviving tetrahedra are
    /// reglued through the chains that result. Triangles play no part, so
    /// only the quad types matter. The result may be disconnected or empty,
    /// and the original triangulation is left untouched.
    pub fn crush(&self) -> Result<Triangulation3, Err> {
        if !self.is_normal() {
            return Err(Err::Octagons);
        }
        let mut ans = (*self.tri).clone();
        if ans.is_empty() {
            return Ok(ans);
        }
        let quad_types: Vec<Option<usize>> =
            self.coords.iter().map(|c| c.quads.iter().position(|n| !n.is_zero())).collect();

        let mut span = ans.change();
        for t in (0..quad_types.len()).filter(|&t| quad_types[t].is_none()) {
            let tet = SimplexIdx::from(t);
            for facet in 0..4 {
                let simp = span.simplex(tet);
                let (Some(first), Some(gluing)) = (simp.adjacent(facet), simp.gluing(facet)) else {
                    continue;
                };
                if quad_types[first.get()].is_none() {
                    continue;
                }

                // Walk through flattened tetrahedra until reaching a kept
                // one or the boundary.
                let mut adj = Some(first);
                let mut adj_perm = gluing;
                let mut adj_facet = adj_perm.image(facet);
                while let Some(a) = adj {
                    let Some(q) = quad_types[a.get()] else {
                        break;
                    };
                    let swap = Perm4::transposition(adj_facet, QUAD_PARTNER[q][adj_facet]);
                    adj_facet = swap.image(adj_facet);
                    let next = span.simplex(a);
                    adj = next.adjacent(adj_facet);
                    if let Some(g) = next.gluing(adj_facet) {
                        adj_perm = g * swap * adj_perm;
                        adj_facet = adj_perm.image(facet);
                    }
                }

                span.unjoin(tet, facet)?;
                let Some(adj) = adj else {
                    continue;
                };
                if adj == tet && adj_facet == facet {
                    tracing::warn!(simplex = t, facet, "crushed chain returns to its own facet");
                    continue;
                }
                span.unjoin(adj, adj_facet)?;
                span.join(tet, facet, adj, adj_perm)?;
            }
        }

        let mut removed = 0;
        for t in (0..quad_types.len()).rev().filter(|&t| quad_types[t].is_some()) {
            span.remove_simplex(SimplexIdx::from(t))?;
            removed += 1;
        }
        drop(span);
        tracing::debug!(removed, remaining = ans.size(), "crushed surface");
        Ok(ans)
    }
}
