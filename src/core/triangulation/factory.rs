//! Ready-made triangulations: layered solid tori, layered lens spaces and a
//! few small examples.

use num_integer::Integer;

use crate::core::perm::{perm4, Perm4};
use crate::core::shared::{FaceIdx, SimplexIdx};

use super::{Err, Triangulation3};

/// The three ways of layering a tetrahedron over faces 0 and 1 of the top
/// tetrahedron of a layered solid torus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layering {
    A,
    B,
    C,
}

impl Layering {
    /// Gluings for faces 0 and 1 of the new tetrahedron.
    fn gluings(self) -> (Perm4, Perm4) {
        match self {
            Layering::A => (perm4!(2, 3, 0, 1), perm4!(2, 3, 0, 1)),
            Layering::B => (perm4!(2, 0, 3, 1), perm4!(1, 3, 0, 2)),
            Layering::C => (perm4!(2, 1, 0, 3), perm4!(0, 3, 2, 1)),
        }
    }

    /// Folds the two boundary faces of the top tetrahedron together so that
    /// the matching boundary edge becomes the meridian.
    fn fold(self) -> Perm4 {
        match self {
            Layering::A => perm4!(0, 1, 3, 2),
            Layering::B => perm4!(3, 0, 1, 2),
            Layering::C => perm4!(1, 3, 0, 2),
        }
    }
}

fn layer(tri: &mut Triangulation3, top: SimplexIdx, layering: Layering) -> Result<SimplexIdx, Err> {
    let (g0, g1) = layering.gluings();
    let mut span = tri.change();
    let new = span.new_simplex();
    span.join(new, 0, top, g0)?;
    span.join(new, 1, top, g1)?;
    Ok(new)
}

/// The one-tetrahedron LST(1,2,3), with boundary faces 2 and 3.
fn base(tri: &mut Triangulation3) -> Result<SimplexIdx, Err> {
    let t = tri.new_simplex();
    tri.join(t, 0, t, perm4!(1, 2, 3, 0))?;
    Ok(t)
}

/// Builds LST(u, v, u+v) inside `tri` and returns the top tetrahedron and
/// the boundary edge weights `[u+v, b, c]` with `{b, c} = {u, v}`, where
/// `b` and `c` sit on the edges matched by layerings B and C.
fn build_lst(tri: &mut Triangulation3, u: u64, v: u64) -> Result<(SimplexIdx, [u64; 3]), Err> {
    let (small, big) = (u.min(v), u.max(v));
    if (small, big) == (1, 2) {
        return Ok((base(tri)?, [3, 2, 1]));
    }
    let (top, [a, b, c]) = build_lst(tri, big - small, small)?;
    if b == big - small && b != c {
        Ok((layer(tri, top, Layering::B)?, [a + c, a, c]))
    } else {
        Ok((layer(tri, top, Layering::C)?, [a + b, b, a]))
    }
}

/// The layered solid torus LST(a, b, a+b).
///
/// `a` and `b` must be coprime and positive, and not both 1. The top
/// tetrahedron is the last one; its faces 2 and 3 form the boundary.
pub fn layered_solid_torus(a: u64, b: u64) -> Result<Triangulation3, Err> {
    if a == 0 || b == 0 || a.gcd(&b) != 1 || (a, b) == (1, 1) {
        return Err(Err::InvalidParameters(format!("LST({a}, {b}) does not exist")));
    }
    let mut tri = Triangulation3::new();
    build_lst(&mut tri, a, b)?;
    Ok(tri)
}

/// The layered lens space L(p, q), built by folding a layered solid torus.
///
/// `p` and `q` must be coprime; L(0, 1) is S2 x S1 and L(1, 0) is S3.
pub fn layered_lens_space(p: u64, q: u64) -> Result<Triangulation3, Err> {
    if p.gcd(&q) != 1 {
        return Err(Err::InvalidParameters(format!("L({p}, {q}) requires coprime parameters")));
    }
    tracing::debug!(p, q, "building layered lens space");
    let mut tri = Triangulation3::new();
    {
        let mut span = tri.change();
        match p {
            0 => {
                let t = base(&mut span)?;
                let top = layer(&mut span, t, Layering::A)?;
                span.join(top, 3, top, Layering::B.fold())?;
            }
            1 => {
                let t = base(&mut span)?;
                span.join(t, 3, t, Layering::A.fold())?;
            }
            2 => {
                let t = base(&mut span)?;
                let mid = layer(&mut span, t, Layering::A)?;
                let top = layer(&mut span, mid, Layering::B)?;
                span.join(top, 3, top, Layering::A.fold())?;
            }
            3 => {
                let t = base(&mut span)?;
                let top = layer(&mut span, t, Layering::A)?;
                span.join(top, 3, top, Layering::A.fold())?;
            }
            _ => {
                let mut q = q % p;
                if 2 * q > p {
                    q = p - q;
                }
                let x = p - 2 * q;
                let (top, [_, b, _]) = build_lst(&mut span, x, q)?;
                let hinge = if b == x { Layering::B } else { Layering::C };
                span.join(top, 3, top, hinge.fold())?;
            }
        }
    }
    Ok(tri)
}

/// Layers a new tetrahedron over a boundary edge, so that the two boundary
/// triangles meeting at the edge become internal. Returns the new tetrahedron.
pub fn layer_on(tri: &mut Triangulation3, edge: FaceIdx) -> Result<SimplexIdx, Err> {
    let face = tri.face(1, edge)?;
    if !face.is_boundary() || face.is_ideal() {
        return Err(Err::InvalidParameters(format!("edge {edge} is not a boundary edge")));
    }
    let front = *face.front();
    let back = *face.back();
    if tri.simplex(front.simplex()).adjacent(front.vertices().image(2)).is_some()
        || tri.simplex(back.simplex()).adjacent(back.vertices().image(3)).is_some()
    {
        return Err(Err::InvalidParameters(format!("edge {edge} is not a boundary edge")));
    }
    let mut span = tri.change();
    let new = span.new_simplex();
    span.join(new, 2, front.simplex(), front.vertices())?;
    span.join(new, 3, back.simplex(), back.vertices())?;
    Ok(new)
}

/// The two-tetrahedron ideal triangulation of the figure-eight knot complement.
pub fn figure_eight() -> Triangulation3 {
    let mut tri = Triangulation3::new();
    {
        let mut span = tri.change();
        let r = span.new_simplex();
        let s = span.new_simplex();
        let gluings = [perm4!(1, 3, 0, 2), perm4!(2, 0, 3, 1), perm4!(0, 3, 2, 1), perm4!(2, 1, 0, 3)];
        for (facet, g) in gluings.into_iter().enumerate() {
            if let Err(e) = span.join(r, facet, s, g) {
                unreachable!("figure-eight gluing {facet} failed: {e}");
            }
        }
    }
    tri
}

/// The one-tetrahedron 3-sphere L(1, 0).
pub fn s3() -> Triangulation3 {
    lens_or_empty(1, 0)
}

/// Real projective space, as the layered lens space L(2, 1).
pub fn rp3() -> Triangulation3 {
    lens_or_empty(2, 1)
}

fn lens_or_empty(p: u64, q: u64) -> Triangulation3 {
    layered_lens_space(p, q).unwrap_or_default()
}
