use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use super::face::Embeddings;
use super::Triangulation;

/// A finitely generated abelian group `Z^rank + Z_d1 + ... + Z_dk`, with
/// every invariant factor dividing the next.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbelianGroup {
    rank: usize,
    invariant_factors: Vec<BigInt>,
}

impl AbelianGroup {
    pub fn trivial() -> Self {
        Self::default()
    }

    /// The group with the given number of generators, subject to the given
    /// relations (one coefficient row per relation).
    pub fn from_presentation(generators: usize, relations: &[Vec<BigInt>]) -> Self {
        let diagonal = smith_diagonal(generators, relations);
        let rank = generators - diagonal.len();
        let invariant_factors = diagonal.into_iter().filter(|d| !d.is_one()).collect();
        Self { rank, invariant_factors }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn invariant_factors(&self) -> &[BigInt] {
        &self.invariant_factors
    }

    pub fn is_trivial(&self) -> bool {
        self.rank == 0 && self.invariant_factors.is_empty()
    }

    /// True if the group is infinite cyclic.
    pub fn is_z(&self) -> bool {
        self.rank == 1 && self.invariant_factors.is_empty()
    }

    /// Order of the torsion subgroup.
    pub fn torsion_order(&self) -> BigInt {
        self.invariant_factors.iter().fold(BigInt::one(), |acc, d| acc * d)
    }
}

impl fmt::Display for AbelianGroup {
    /// Writes groups the usual way, e.g. `2 Z + Z_5` or `0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_trivial() {
            return write!(f, "0");
        }
        let mut parts = Vec::new();
        match self.rank {
            0 => {}
            1 => parts.push("Z".to_owned()),
            r => parts.push(format!("{r} Z")),
        }
        let mut i = 0;
        while i < self.invariant_factors.len() {
            let d = &self.invariant_factors[i];
            let run = self.invariant_factors[i..].iter().take_while(|x| *x == d).count();
            if run == 1 {
                parts.push(format!("Z_{d}"));
            } else {
                parts.push(format!("{run} Z_{d}"));
            }
            i += run;
        }
        write!(f, "{}", parts.join(" + "))
    }
}

/// The nonzero diagonal entries of the Smith normal form, positive and in
/// divisibility order.
fn smith_diagonal(cols: usize, relations: &[Vec<BigInt>]) -> Vec<BigInt> {
    let mut m = relations
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.resize(cols, BigInt::zero());
            row
        })
        .collect::<Vec<_>>();
    let rows = m.len();
    let mut diagonal = Vec::new();

    for t in 0..rows.min(cols) {
        loop {
            // Smallest nonzero pivot in the remaining block.
            let pivot = (t..rows)
                .flat_map(|i| (t..cols).map(move |j| (i, j)))
                .filter(|&(i, j)| !m[i][j].is_zero())
                .min_by(|&(a, b), &(c, d)| m[a][b].abs().cmp(&m[c][d].abs()));
            let Some((pi, pj)) = pivot else {
                return finish(diagonal);
            };
            m.swap(t, pi);
            for row in m.iter_mut() {
                row.swap(t, pj);
            }

            let mut clean = true;
            for i in t + 1..rows {
                if m[i][t].is_zero() {
                    continue;
                }
                let q = m[i][t].div_floor(&m[t][t]);
                for j in t..cols {
                    let delta = &q * &m[t][j];
                    m[i][j] -= delta;
                }
                clean &= m[i][t].is_zero();
            }
            for j in t + 1..cols {
                if m[t][j].is_zero() {
                    continue;
                }
                let q = m[t][j].div_floor(&m[t][t]);
                for i in t..rows {
                    let delta = &q * &m[i][t];
                    m[i][j] -= delta;
                }
                clean &= m[t][j].is_zero();
            }
            if clean {
                break;
            }
        }
        diagonal.push(m[t][t].abs());
    }
    finish(diagonal)
}

fn finish(mut diagonal: Vec<BigInt>) -> Vec<BigInt> {
    for i in 0..diagonal.len() {
        for j in i + 1..diagonal.len() {
            let g = diagonal[i].gcd(&diagonal[j]);
            let l = diagonal[i].lcm(&diagonal[j]);
            diagonal[i] = g;
            diagonal[j] = l;
        }
    }
    diagonal
}

impl<const N: usize> Triangulation<N> {
    /// First homology, computed from the dual 2-skeleton: generators are the
    /// interior facets off the dual spanning forest, relations come from the
    /// interior codimension-two faces.
    pub fn homology_h1(&self) -> AbelianGroup {
        let facet_dim = N - 2;
        let facets = self.faces(facet_dim);
        let mut generator = vec![None; facets.len()];
        let mut count = 0;
        for (i, facet) in facets.iter().enumerate() {
            let front = facet.front();
            if facet.degree() == 2 && !self.in_dual_forest(front.simplex(), front.face()) {
                generator[i] = Some(count);
                count += 1;
            }
        }

        let mut relations = Vec::new();
        if N >= 3 {
            for ridge in self.faces(N - 3) {
                if ridge.is_boundary() {
                    continue;
                }
                let Embeddings::Ridge(embs) = ridge.embeddings() else {
                    continue;
                };
                let mut row = vec![BigInt::zero(); count];
                for emb in embs {
                    let crossing = emb.vertices().image(N - 1);
                    let facet = self.simplex_face(emb.simplex(), facet_dim, crossing);
                    let Some(g) = generator[facet.get()] else { continue };
                    let front = facets[facet.get()].front();
                    if front.simplex() == emb.simplex() && front.face() == crossing {
                        row[g] += 1;
                    } else {
                        row[g] -= 1;
                    }
                }
                relations.push(row);
            }
        }
        let group = AbelianGroup::from_presentation(count, &relations);
        tracing::trace!(generators = count, relations = relations.len(), %group, "computed H1");
        group
    }
}
