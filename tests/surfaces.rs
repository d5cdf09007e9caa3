use std::sync::Arc;

use normal_oxide::prelude::*;
use normal_oxide::surface::compress::Config;
use num_bigint::BigInt;

fn boundary_euler_chars(tri: &Triangulation3) -> Vec<i64> {
    let mut ans: Vec<i64> = tri.boundary_components().iter().map(|b| b.euler_char()).collect();
    ans.sort();
    ans
}

fn rp3_surface(coords: [[u64; 7]; 3]) -> NormalSurface {
    let tri = Arc::new(factory::rp3());
    NormalSurface::new(tri, coords.into_iter().map(TetCoords::standard).collect()).unwrap()
}

#[test]
fn cutting_the_sphere_along_a_vertex_link() {
    let tri = Arc::new(factory::s3());
    let link = NormalSurface::vertex_link(tri.clone(), FaceIdx::from(0)).unwrap();
    assert_eq!(link.euler_char().unwrap(), BigInt::from(2));

    let cut = link.cut_along().unwrap();
    assert!(cut.is_valid());
    assert_eq!(cut.count_components(), 2);
    assert_eq!(boundary_euler_chars(&cut), vec![2, 2]);
    // Two copies of the four link triangles.
    assert_eq!(cut.count_boundary_facets(), 8);
    assert_eq!(tri.size(), 1);
}

#[test]
fn cutting_along_a_one_sided_surface_doubles_it() {
    let rp2 = rp3_surface([[0, 0, 0, 0, 0, 1, 0], [0, 0, 0, 0, 0, 1, 0], [1, 1, 0, 0, 0, 0, 0]]);
    assert_eq!(rp2.euler_char().unwrap(), BigInt::from(1));
    assert!(!rp2.is_two_sided().unwrap());

    let cut = rp2.cut_along().unwrap();
    assert!(cut.is_connected());
    assert_eq!(boundary_euler_chars(&cut), vec![2]);
    assert_eq!(cut.count_boundary_facets(), 12);
}

#[test]
fn crushing_removes_exactly_the_quad_tetrahedra() {
    for (coords, quad_tets) in [
        ([[0, 0, 0, 0, 0, 1, 0], [0, 0, 0, 0, 0, 1, 0], [1, 1, 0, 0, 0, 0, 0]], 2),
        ([[1, 1, 1, 1, 0, 0, 0], [1, 1, 1, 1, 0, 0, 0], [0, 0, 1, 1, 1, 0, 0]], 1),
    ] {
        let surface = rp3_surface(coords);
        let crushed = surface.crush().unwrap();
        assert_eq!(crushed.size(), 3 - quad_tets);
        assert!(crushed.is_closed());
        assert_eq!(surface.triangulation().size(), 3);
    }
}

#[test]
fn edge_links_compress() {
    let torus = rp3_surface([[1, 1, 1, 1, 0, 0, 0], [1, 1, 1, 1, 0, 0, 0], [0, 0, 1, 1, 1, 0, 0]]);
    assert_eq!(torus.euler_char().unwrap(), BigInt::from(0));
    assert!(torus.is_thin_edge_link().0.is_some());
    let searcher = CandidateSearcher::new(|_| Vec::new());
    assert!(!torus.is_incompressible(&searcher, &Config::default()).unwrap());
}

#[test]
fn surfaces_from_different_triangulations_do_not_add() {
    let a = NormalSurface::vertex_link(Arc::new(factory::s3()), FaceIdx::from(0)).unwrap();
    let b = NormalSurface::vertex_link(Arc::new(factory::rp3()), FaceIdx::from(0)).unwrap();
    let err: Error = a.sum(&b).unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let twice = a.sum(&a).unwrap();
    assert_eq!(twice.euler_char().unwrap(), BigInt::from(4));
}

fn assert_gluings_are_symmetric(tri: &Triangulation3) {
    for (t, simp) in tri.simplices() {
        for f in 0..4 {
            match (simp.adjacent(f), simp.gluing(f)) {
                (Some(u), Some(g)) => {
                    let back = tri.simplex(u);
                    assert_eq!(back.adjacent(g.image(f)), Some(t), "simplex {t} facet {f}");
                    assert_eq!(back.gluing(g.image(f)), Some(g.inverse()), "simplex {t} facet {f}");
                }
                (None, None) => {}
                _ => panic!("simplex {t} facet {f} is half glued"),
            }
        }
    }
}

#[test]
fn every_cut_facet_is_glued_both_ways() {
    let rp2 = rp3_surface([[0, 0, 0, 0, 0, 1, 0], [0, 0, 0, 0, 0, 1, 0], [1, 1, 0, 0, 0, 0, 0]]);
    let torus = rp3_surface([[1, 1, 1, 1, 0, 0, 0], [1, 1, 1, 1, 0, 0, 0], [0, 0, 1, 1, 1, 0, 0]]);
    let cusp = NormalSurface::vertex_link(Arc::new(factory::figure_eight()), FaceIdx::from(0)).unwrap();
    let lens = Arc::new(factory::layered_lens_space(8, 3).unwrap());
    let lens_link = NormalSurface::vertex_link(lens, FaceIdx::from(0)).unwrap();

    for surface in [rp2.double(), rp2, torus.clone(), torus.sum(&torus).unwrap(), cusp, lens_link] {
        let cut = surface.cut_along().unwrap();
        assert!(cut.is_valid());
        assert!(cut.has_boundary_facets());
        assert_gluings_are_symmetric(&cut);
    }
}
