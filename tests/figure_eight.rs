use std::sync::Arc;

use normal_oxide::prelude::*;
use num_bigint::BigInt;

#[test]
fn figure_eight_knot_complement() {
    let tri = factory::figure_eight();
    assert_eq!(tri.size(), 2);
    assert_eq!(tri.count_vertices(), 1);
    assert!(tri.is_ideal());
    assert!(tri.is_orientable());
    assert_eq!(tri.euler_char_manifold(), 0);
    assert_eq!(tri.iso_sig(), "cPcbbbiht");

    let decoded = decode_any("cPcbbbiht").unwrap();
    assert_eq!(decoded.iso_sig(), tri.iso_sig());
    assert!(decoded.homology_h1().is_z());
}

#[test]
fn cusp_torus() {
    let tri = Arc::new(factory::figure_eight());
    let cusp = NormalSurface::vertex_link(tri.clone(), FaceIdx::from(0)).unwrap();
    assert_eq!(cusp.euler_char().unwrap(), BigInt::from(0));
    assert!(cusp.is_connected().unwrap());
    assert!(cusp.is_orientable().unwrap());
    assert!(cusp.is_two_sided().unwrap());
    assert!(!cusp.has_real_boundary());
    assert_eq!(cusp.is_vertex_link(), Some(FaceIdx::from(0)));

    // No quads, so nothing is crushed.
    let crushed = cusp.crush().unwrap();
    assert_eq!(crushed.size(), tri.size());
    assert!(crushed.is_identical_to(&tri));

    let cut = cusp.cut_along().unwrap();
    assert_eq!(cut.count_components(), 2);
    assert!(cut.is_valid());
}

#[test]
fn cusp_survives_every_candidate() {
    let tri = Arc::new(factory::figure_eight());
    let cusp = NormalSurface::vertex_link(tri, FaceIdx::from(0)).unwrap();
    // Candidates that are not discs are ignored.
    let searcher = CandidateSearcher::new(|side| vec![vec![TetCoords::default(); side.size()]]);
    let cfg = normal_oxide::surface::compress::Config::default();
    assert!(cusp.is_incompressible(&searcher, &cfg).unwrap());
}
