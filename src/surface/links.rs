//! Recognising vertex links and thin edge links.

use std::collections::HashSet;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::core::shared::{FaceIdx, SimplexIdx};
use crate::core::triangulation::Triangulation3;

use super::tables::{edge_number, QUAD_DEFN};
use super::{DiscCount, Err, NormalSurface, TetCoords};

impl NormalSurface {
    /// The link of a vertex: one triangle in every corner at that vertex.
    pub fn vertex_link(tri: Arc<Triangulation3>, vertex: FaceIdx) -> Result<Self, Err> {
        tri.face(0, vertex)?;
        let coords = (0..tri.size())
            .map(|t| {
                let mut c = TetCoords::default();
                for (v, n) in c.triangles.iter_mut().enumerate() {
                    if tri.simplex_face(SimplexIdx::from(t), 0, v) == vertex {
                        *n = DiscCount::from(1);
                    }
                }
                c
            })
            .collect();
        Ok(Self::from_parts(tri, coords))
    }

    /// If the surface is a positive multiple of a single vertex link,
    /// returns that vertex.
    pub fn is_vertex_link(&self) -> Option<FaceIdx> {
        if self.coords.iter().any(|c| c.quads.iter().chain(&c.octs).any(|n| !n.is_zero())) {
            return None;
        }
        let mut ans = None;
        for (t, c) in self.coords.iter().enumerate() {
            for (v, n) in c.triangles.iter().enumerate() {
                if n.is_zero() {
                    continue;
                }
                let vertex = self.tri.simplex_face(SimplexIdx::from(t), 0, v);
                match ans {
                    None => ans = Some(vertex),
                    Some(prev) if prev != vertex => return None,
                    Some(_) => {}
                }
            }
        }
        ans
    }

    /// If the surface is a multiple of the boundary of a thin regular
    /// neighbourhood of an edge, returns that edge. A surface can link two
    /// edges at once, in which case both are returned.
    pub fn is_thin_edge_link(&self) -> (Option<FaceIdx>, Option<FaceIdx>) {
        const NOTHING: (Option<FaceIdx>, Option<FaceIdx>) = (None, None);
        if !self.is_normal() {
            return NOTHING;
        }
        let tri = &self.tri;
        let edge = |t: usize, a: usize, b: usize| tri.simplex_face(SimplexIdx::from(t), 1, edge_number(a, b));

        let mut not_ans = HashSet::new();
        let mut found_quads = false;
        let mut ans: [Option<FaceIdx>; 2] = [None, None];
        let mut mult_double = BigInt::default();

        for (t, c) in self.coords.iter().enumerate() {
            for (q, coord) in c.quads.iter().enumerate() {
                let d = QUAD_DEFN[q];
                // Two edges the quad misses, then the four it crosses.
                let e = [
                    edge(t, d[0], d[1]),
                    edge(t, d[2], d[3]),
                    edge(t, d[0], d[2]),
                    edge(t, d[0], d[3]),
                    edge(t, d[1], d[2]),
                    edge(t, d[1], d[3]),
                ];
                let Some(coord) = coord.finite() else {
                    return NOTHING;
                };
                if coord.sign() == num_bigint::Sign::NoSign {
                    if found_quads {
                        for a in ans.iter_mut() {
                            if *a == Some(e[0]) || *a == Some(e[1]) {
                                *a = None;
                            }
                        }
                    } else {
                        not_ans.insert(e[0]);
                        not_ans.insert(e[1]);
                    }
                } else {
                    if found_quads {
                        if e[0] == e[1] {
                            if ans[0] == Some(e[0]) {
                                ans[1] = None;
                            } else if ans[1] == Some(e[0]) {
                                ans = [ans[1], None];
                            } else {
                                return NOTHING;
                            }
                            if ans[0].is_none() || &mult_double != coord {
                                return NOTHING;
                            }
                        } else {
                            for a in ans.iter_mut() {
                                if *a != Some(e[0]) && *a != Some(e[1]) {
                                    *a = None;
                                }
                            }
                            if mult_double != coord * 2 {
                                return NOTHING;
                            }
                        }
                    } else {
                        if e[0] == e[1] {
                            if not_ans.contains(&e[0]) {
                                return NOTHING;
                            }
                            ans = [Some(e[0]), None];
                            mult_double = coord.clone();
                        } else {
                            for i in 0..2 {
                                if not_ans.contains(&e[i]) {
                                    ans[i] = None;
                                } else {
                                    ans[i] = Some(e[i]);
                                    mult_double = coord * 2;
                                }
                            }
                        }
                        found_quads = true;
                    }
                    for crossed in &e[2..] {
                        for a in ans.iter_mut() {
                            if *a == Some(*crossed) {
                                *a = None;
                            }
                        }
                    }
                }
                if found_quads && ans.iter().all(Option::is_none) {
                    return NOTHING;
                }
            }
        }
        if !found_quads || ans.iter().all(Option::is_none) {
            return NOTHING;
        }

        // Triangles must appear exactly at the ends of each candidate, away
        // from the edge itself.
        let endpoints = |e: FaceIdx| -> Option<[FaceIdx; 2]> {
            let emb = *tri.face(1, e).ok()?.front();
            let s = emb.simplex();
            let v = emb.vertices();
            Some([tri.simplex_face(s, 0, v.image(0)), tri.simplex_face(s, 0, v.image(1))])
        };
        let ends = [ans[0].and_then(endpoints), ans[1].and_then(endpoints)];
        for (t, c) in self.coords.iter().enumerate() {
            for (v, coord) in c.triangles.iter().enumerate() {
                let vertex = tri.simplex_face(SimplexIdx::from(t), 0, v);
                for i in 0..2 {
                    let (Some(candidate), Some(end)) = (ans[i], ends[i]) else {
                        continue;
                    };
                    let expect_zero = !end.contains(&vertex)
                        || (1..4).any(|j| edge(t, v, (v + j) % 4) == candidate);
                    let ok = match coord.finite() {
                        Some(n) if expect_zero => n.sign() == num_bigint::Sign::NoSign,
                        Some(n) => mult_double == n * 2,
                        None => false,
                    };
                    if !ok {
                        ans[i] = None;
                    }
                }
                if ans.iter().all(Option::is_none) {
                    return NOTHING;
                }
            }
        }
        match ans {
            [Some(a), b] => (Some(a), b),
            [None, b] => (b, None),
        }
    }
}
