use std::collections::{HashSet, VecDeque};

use crate::core::face_numbering::FaceNumbering;
use crate::core::perm::Perm;
use crate::core::shared::{BoundaryIdx, ComponentIdx, FaceIdx, SimplexIdx, VecBoundaryIdx, VecComponentIdx, VecSimplexIdx};

use super::component::{BoundaryComponent, Component};
use super::face::{Embeddings, Face, FaceEmbedding, LinkKind};
use super::{link, Triangulation};

const UNSET: usize = usize::MAX;

/// Everything derived from the gluings of a triangulation.
#[derive(Debug)]
pub(crate) struct Skeleton<const N: usize> {
    /// `faces[k]` holds the k-faces for `k < N - 1`.
    pub(super) faces: Vec<Vec<Face<N>>>,
    pub(super) simplex_faces: VecSimplexIdx<Vec<Vec<FaceIdx>>>,
    pub(super) simplex_mappings: VecSimplexIdx<Vec<Vec<Perm<N>>>>,
    pub(super) orientation: VecSimplexIdx<i32>,
    /// Bitmask of facets that are edges of the dual spanning forest.
    pub(super) dual_forest: VecSimplexIdx<u32>,
    pub(super) simplex_component: VecSimplexIdx<ComponentIdx>,
    pub(super) components: VecComponentIdx<Component>,
    pub(super) boundary_components: VecBoundaryIdx<BoundaryComponent>,
    pub(super) valid: bool,
}

impl<const N: usize> Skeleton<N> {
    pub(super) fn compute(tri: &Triangulation<N>) -> Self {
        let dim = N - 1;
        tracing::debug!(dim, size = tri.size(), "computing skeleton");
        let n = tri.size();
        let mut sk = Self {
            faces: vec![Vec::new(); dim],
            simplex_faces: VecSimplexIdx::filled(
                n,
                (0..dim).map(|k| vec![FaceIdx::from(UNSET); FaceNumbering::<N>::count(k)]).collect(),
            ),
            simplex_mappings: VecSimplexIdx::filled(
                n,
                (0..dim).map(|k| vec![Perm::identity(); FaceNumbering::<N>::count(k)]).collect(),
            ),
            orientation: VecSimplexIdx::filled(n, 0),
            dual_forest: VecSimplexIdx::filled(n, 0),
            simplex_component: VecSimplexIdx::filled(n, ComponentIdx::from(0)),
            components: VecComponentIdx::new(),
            boundary_components: VecBoundaryIdx::new(),
            valid: true,
        };
        sk.compute_components(tri);
        sk.compute_facets(tri);
        for k in 0..dim - 1 {
            if k + 2 == dim {
                sk.compute_ridges(tri);
            } else {
                sk.compute_faces(tri, k);
            }
        }
        sk.check_links(tri);
        sk.compute_boundary(tri);
        sk.valid = sk.faces.iter().flatten().all(Face::is_valid);
        tracing::trace!(
            components = sk.components.len(),
            boundary_components = sk.boundary_components.len(),
            valid = sk.valid,
            "skeleton ready"
        );
        sk
    }

    fn is_set(&self, s: SimplexIdx, k: usize, f: usize) -> bool {
        self.simplex_faces[s][k][f].get() != UNSET
    }

    fn set(&mut self, s: SimplexIdx, k: usize, f: usize, idx: FaceIdx, vertices: Perm<N>) -> FaceEmbedding<N> {
        self.simplex_faces[s][k][f] = idx;
        self.simplex_mappings[s][k][f] = vertices;
        FaceEmbedding { simplex: s, face: f, vertices }
    }

    /// Breadth-first search over simplices, assigning orientations and
    /// recording which gluings form the dual spanning forest.
    fn compute_components(&mut self, tri: &Triangulation<N>) {
        for start in 0..tri.size() {
            let start = SimplexIdx::from(start);
            if self.orientation[start] != 0 {
                continue;
            }
            let c_idx = ComponentIdx::from(self.components.len());
            let mut comp = Component::new(c_idx);
            self.orientation[start] = 1;
            let mut queue = VecDeque::from([start]);
            while let Some(s) = queue.pop_front() {
                comp.simplices.push(s);
                self.simplex_component[s] = c_idx;
                let simp = tri.simplex(s);
                for f in 0..N {
                    let Some(t) = simp.adj[f] else {
                        comp.boundary_facets += 1;
                        continue;
                    };
                    let g = simp.gluing[f];
                    let want = -g.sign() * self.orientation[s];
                    if self.orientation[t] == 0 {
                        self.orientation[t] = want;
                        self.dual_forest[s] |= 1 << f;
                        self.dual_forest[t] |= 1 << g.image(f);
                        queue.push_back(t);
                    } else if self.orientation[t] != want {
                        comp.orientable = false;
                    }
                }
            }
            comp.simplices.sort();
            self.components.push(comp);
        }
    }

    fn compute_facets(&mut self, tri: &Triangulation<N>) {
        let k = N - 2;
        let mut list = Vec::new();
        for s in 0..tri.size() {
            let s = SimplexIdx::from(s);
            for f in 0..N {
                if self.is_set(s, k, f) {
                    continue;
                }
                let idx = FaceIdx::from(list.len());
                let m = FaceNumbering::<N>::ordering(k, f);
                let front = self.set(s, k, f, idx, m);
                let simp = tri.simplex(s);
                let back = match simp.adj[f] {
                    Some(t) => {
                        let g = simp.gluing[f];
                        Some(self.set(t, k, g.image(f), idx, g * m))
                    }
                    None => None,
                };
                list.push(Face::new(k, idx, Embeddings::Facet { front, back }, self.simplex_component[s]));
            }
        }
        self.faces[k] = list;
    }

    /// Faces of codimension at least three: a breadth-first search through
    /// every facet of every embedding that does not contain the face.
    fn compute_faces(&mut self, tri: &Triangulation<N>, k: usize) {
        let swap = Perm::<N>::transposition(N - 2, N - 1);
        let mut list = Vec::new();
        for s in 0..tri.size() {
            let s = SimplexIdx::from(s);
            for f in 0..FaceNumbering::<N>::count(k) {
                if self.is_set(s, k, f) {
                    continue;
                }
                let idx = FaceIdx::from(list.len());
                let mut face = Face::new(k, idx, Embeddings::Other(Vec::new()), self.simplex_component[s]);
                let m = FaceNumbering::<N>::ordering(k, f);
                let mut embs = vec![self.set(s, k, f, idx, m)];
                let mut queue = VecDeque::from([(s, m)]);
                while let Some((cs, cm)) = queue.pop_front() {
                    let simp = tri.simplex(cs);
                    for pos in k + 1..N {
                        let j = cm.image(pos);
                        let Some(t) = simp.adj[j] else { continue };
                        let next = simp.gluing[j] * cm * swap;
                        let nf = FaceNumbering::<N>::face_number(k, next);
                        if !self.is_set(t, k, nf) {
                            embs.push(self.set(t, k, nf, idx, next));
                            queue.push_back((t, next));
                            continue;
                        }
                        let stored = self.simplex_mappings[t][k][nf];
                        if (0..=k).any(|i| stored.image(i) != next.image(i)) {
                            face.bad_identification = true;
                        } else if stored.sign() != next.sign() {
                            face.link_orientable = false;
                        }
                    }
                }
                face.embeddings = Embeddings::Other(embs);
                list.push(face);
            }
        }
        self.faces[k] = list;
    }

    /// Codimension-two faces: walk around the face in one direction until
    /// the walk closes up or hits the boundary, then walk the other way.
    fn compute_ridges(&mut self, tri: &Triangulation<N>) {
        let k = N - 3;
        let swap = Perm::<N>::transposition(N - 2, N - 1);
        let mut list = Vec::new();
        for s in 0..tri.size() {
            let s = SimplexIdx::from(s);
            for f in 0..FaceNumbering::<N>::count(k) {
                if self.is_set(s, k, f) {
                    continue;
                }
                let idx = FaceIdx::from(list.len());
                let mut face = Face::new(k, idx, Embeddings::Ridge(VecDeque::new()), self.simplex_component[s]);
                let m = FaceNumbering::<N>::ordering(k, f);
                let mut embs = VecDeque::from([self.set(s, k, f, idx, m)]);

                let mut closed = false;
                let (mut cs, mut cm) = (s, m);
                loop {
                    let simp = tri.simplex(cs);
                    let j = cm.image(N - 1);
                    let Some(t) = simp.adj[j] else { break };
                    let next = simp.gluing[j] * cm * swap;
                    let nf = FaceNumbering::<N>::face_number(k, next);
                    if self.is_set(t, k, nf) {
                        let stored = self.simplex_mappings[t][k][nf];
                        if stored != next {
                            if (0..=k).any(|i| stored.image(i) != next.image(i)) {
                                face.bad_identification = true;
                            } else {
                                face.link_orientable = false;
                            }
                        }
                        closed = true;
                        break;
                    }
                    embs.push_back(self.set(t, k, nf, idx, next));
                    (cs, cm) = (t, next);
                }

                if !closed {
                    let (mut cs, mut cm) = (s, m);
                    loop {
                        let simp = tri.simplex(cs);
                        let j = cm.image(N - 2);
                        let Some(t) = simp.adj[j] else { break };
                        let next = simp.gluing[j] * cm * swap;
                        let nf = FaceNumbering::<N>::face_number(k, next);
                        if self.is_set(t, k, nf) {
                            face.bad_identification = true;
                            break;
                        }
                        embs.push_front(self.set(t, k, nf, idx, next));
                        (cs, cm) = (t, next);
                    }
                }
                face.embeddings = Embeddings::Ridge(embs);
                list.push(face);
            }
        }
        self.faces[k] = list;
    }

    /// Examines vertex links in dimensions 3 and 4, and edge links in
    /// dimension 4.
    fn check_links(&mut self, tri: &Triangulation<N>) {
        match N {
            4 => {
                for v in 0..self.faces[0].len() {
                    let result = link::build::<N, 3>(tri, 0, &self.faces[0][v].embeddings);
                    let face = &mut self.faces[0][v];
                    match result {
                        Ok(l) => classify_surface_link(face, &l, true),
                        Err(e) => {
                            tracing::warn!("vertex link could not be built: {e}");
                            face.bad_link = true;
                            face.link_kind = LinkKind::Invalid;
                        }
                    }
                }
            }
            5 => {
                for v in 0..self.faces[0].len() {
                    let result = link::build::<N, 4>(tri, 0, &self.faces[0][v].embeddings);
                    let face = &mut self.faces[0][v];
                    match result {
                        Ok(l) => classify_three_manifold_link(face, &l),
                        Err(e) => {
                            tracing::warn!("vertex link could not be built: {e}");
                            face.bad_link = true;
                            face.link_kind = LinkKind::Invalid;
                        }
                    }
                }
                for e in 0..self.faces[1].len() {
                    if self.faces[1][e].bad_identification {
                        continue;
                    }
                    let result = link::build::<N, 3>(tri, 1, &self.faces[1][e].embeddings);
                    let face = &mut self.faces[1][e];
                    match result {
                        Ok(l) => classify_surface_link(face, &l, false),
                        Err(_) => {
                            face.bad_link = true;
                            face.link_kind = LinkKind::Invalid;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Groups boundary facets into boundary components, then adds one
    /// boundary component per ideal vertex.
    fn compute_boundary(&mut self, tri: &Triangulation<N>) {
        let dim = N - 1;
        if dim < 2 {
            return;
        }
        let facet_dim = dim - 1;
        let n_facets = self.faces[facet_dim].len();
        let mut parent = (0..n_facets).collect::<Vec<_>>();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        let ridge_dim = dim - 2;
        for r in 0..self.faces[ridge_dim].len() {
            let ridge = &self.faces[ridge_dim][r];
            let front = *ridge.front();
            let back = *ridge.back();
            let front_facet = front.vertices.image(N - 2);
            if tri.simplex(front.simplex).adj[front_facet].is_some() {
                continue;
            }
            let a = self.simplex_faces[front.simplex][facet_dim][front_facet].get();
            let b = self.simplex_faces[back.simplex][facet_dim][back.vertices.image(N - 1)].get();
            let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
            if ra != rb {
                parent[ra.max(rb)] = ra.min(rb);
            }
        }

        let mut root_to_bc = vec![None; n_facets];
        for f in 0..n_facets {
            if self.faces[facet_dim][f].degree() != 1 {
                continue;
            }
            let root = find(&mut parent, f);
            let bc_idx = match root_to_bc[root] {
                Some(idx) => idx,
                None => {
                    let idx = BoundaryIdx::from(self.boundary_components.len());
                    self.boundary_components.push(BoundaryComponent {
                        index: idx,
                        component: self.faces[facet_dim][f].component,
                        facets: Vec::new(),
                        ideal_vertex: None,
                        euler_char: 0,
                    });
                    root_to_bc[root] = Some(idx);
                    idx
                }
            };
            self.boundary_components[bc_idx].facets.push(FaceIdx::from(f));
            self.faces[facet_dim][f].boundary = Some(bc_idx);
        }

        for b in 0..self.boundary_components.len() {
            let bc_idx = BoundaryIdx::from(b);
            let mut euler = 0i64;
            for sub_dim in 0..facet_dim {
                let mut seen = HashSet::new();
                for &facet in &self.boundary_components[bc_idx].facets {
                    let emb = *self.faces[facet_dim][facet.get()].front();
                    for sub in FaceNumbering::<N>::subfaces(facet_dim, emb.face, sub_dim) {
                        seen.insert(self.simplex_faces[emb.simplex][sub_dim][sub]);
                    }
                }
                for &face in &seen {
                    self.faces[sub_dim][face.get()].boundary = Some(bc_idx);
                }
                euler += if sub_dim % 2 == 0 { seen.len() as i64 } else { -(seen.len() as i64) };
            }
            let n = self.boundary_components[bc_idx].facets.len() as i64;
            euler += if facet_dim % 2 == 0 { n } else { -n };
            self.boundary_components[bc_idx].euler_char = euler;
        }

        for v in 0..self.faces[0].len() {
            let vertex = &self.faces[0][v];
            if !vertex.is_ideal() || vertex.boundary.is_some() {
                continue;
            }
            let idx = BoundaryIdx::from(self.boundary_components.len());
            let component = vertex.component;
            let euler_char = vertex.link_euler_char.unwrap_or(0);
            self.boundary_components.push(BoundaryComponent {
                index: idx,
                component,
                facets: Vec::new(),
                ideal_vertex: Some(FaceIdx::from(v)),
                euler_char,
            });
            self.faces[0][v].boundary = Some(idx);
        }

        for bc in self.boundary_components.iter() {
            self.components[bc.component].boundary_components.push(bc.index);
        }
    }
}

/// Links that are triangulated surfaces: vertex links of 3-manifolds and
/// edge links of 4-manifolds. Only vertices may be ideal.
fn classify_surface_link<const N: usize>(face: &mut Face<N>, link: &Triangulation<3>, may_be_ideal: bool) {
    let chi = link.euler_char_tri();
    face.link_euler_char = Some(chi);
    face.link_orientable = face.link_orientable && link.is_orientable();
    face.link_kind = if !link.is_connected() {
        LinkKind::Invalid
    } else if link.has_boundary_facets() {
        if chi == 1 && link.count_boundary_components() == 1 {
            LinkKind::Ball
        } else {
            LinkKind::Invalid
        }
    } else if chi == 2 {
        LinkKind::Sphere
    } else if may_be_ideal {
        LinkKind::Ideal
    } else {
        LinkKind::Invalid
    };
    face.bad_link = face.link_kind == LinkKind::Invalid;
}

/// Vertex links of 4-manifolds. Spheres and balls are recognised by their
/// homology, which is exact for the small links that occur in practice.
fn classify_three_manifold_link<const N: usize>(face: &mut Face<N>, link: &Triangulation<4>) {
    let chi = link.euler_char_manifold();
    face.link_euler_char = Some(chi);
    face.link_orientable = link.is_orientable();
    let simply_connected = || link.homology_h1().is_trivial();
    face.link_kind = if !link.is_valid() || !link.is_connected() {
        LinkKind::Invalid
    } else if link.has_boundary_facets() {
        let bcs = link.boundary_components();
        if bcs.len() == 1 && bcs[0].is_real() && bcs[0].euler_char() == 2 && simply_connected() {
            LinkKind::Ball
        } else {
            LinkKind::Invalid
        }
    } else if link.is_ideal() {
        LinkKind::Invalid
    } else if link.is_orientable() && simply_connected() {
        LinkKind::Sphere
    } else {
        LinkKind::Ideal
    };
    face.bad_link = face.link_kind == LinkKind::Invalid;
}

#[cfg(test)]
mod tests {
    use crate::core::perm::{Perm, Perm3, Perm4};
    use crate::core::shared::SimplexIdx;
    use crate::core::triangulation::{factory, LinkKind, Triangulation2, Triangulation3};

    fn perm4(images: [usize; 4]) -> Perm4 {
        Perm::from_images(images).unwrap()
    }

    #[test]
    fn single_tetrahedron() {
        let mut tri = Triangulation3::new();
        tri.new_simplex();
        assert_eq!(tri.count_vertices(), 4);
        assert_eq!(tri.count_edges(), 6);
        assert_eq!(tri.count_triangles(), 4);
        assert_eq!(tri.count_boundary_components(), 1);
        assert_eq!(tri.boundary_components()[0].euler_char(), 2);
        assert!(tri.is_valid());
        assert!(tri.faces(0).iter().all(|v| v.link_kind() == LinkKind::Ball));
        assert_eq!(tri.euler_char_tri(), 1);
    }

    #[test]
    fn two_triangles_make_a_sphere() {
        let mut tri = Triangulation2::new();
        let a = tri.new_simplex();
        let b = tri.new_simplex();
        for f in 0..3 {
            tri.join(a, f, b, Perm3::identity()).unwrap();
        }
        assert!(tri.is_closed());
        assert!(tri.is_orientable());
        assert_eq!(tri.euler_char_tri(), 2);
        assert_eq!(tri.count_faces(1), 3);
        assert_eq!(tri.faces(0)[0].degree(), 2);
    }

    #[test]
    fn one_tetrahedron_sphere() {
        // Faces 0/1 and 2/3 folded together: the one-tetrahedron 3-sphere.
        let mut tri = Triangulation3::new();
        let t = tri.new_simplex();
        tri.join(t, 0, t, perm4([1, 0, 2, 3])).unwrap();
        tri.join(t, 2, t, perm4([0, 1, 3, 2])).unwrap();
        assert!(tri.is_valid());
        assert!(tri.is_closed());
        assert_eq!(tri.count_vertices(), 2);
        assert_eq!(tri.count_edges(), 3);
        assert_eq!(tri.euler_char_tri(), 0);
    }

    #[test]
    fn edge_folded_onto_itself_is_invalid() {
        // Face 012 onto face 230 sends edge 02 onto itself reversed.
        let mut tri = Triangulation3::new();
        let t = tri.new_simplex();
        tri.join(t, 3, t, perm4([2, 3, 0, 1])).unwrap();
        assert!(!tri.is_valid());
        assert!(tri.faces(1).iter().any(|e| e.has_bad_identification()));
    }

    #[test]
    fn ridge_embeddings_follow_the_link() {
        let mut tri = Triangulation3::new();
        let s = tri.new_simplices(3);
        tri.join(s[0], 0, s[1], perm4([1, 0, 2, 3])).unwrap();
        tri.join(s[1], 0, s[2], perm4([1, 0, 2, 3])).unwrap();
        let edge = tri.simplex_face(s[0], 1, 5);
        let face = &tri.faces(1)[edge.get()];
        assert_eq!(face.degree(), 3);
        assert!(face.is_boundary());
        let order = face.embeddings().iter().map(|e| e.simplex().get()).collect::<Vec<_>>();
        assert!(order == vec![0, 1, 2] || order == vec![2, 1, 0]);
    }

    /// Everything the skeleton numbers, in the order it numbers them.
    fn skeleton_snapshot(tri: &Triangulation3) -> Vec<String> {
        let mut out = Vec::new();
        for k in 0..3 {
            for face in tri.faces(k) {
                let embs = face
                    .embeddings()
                    .iter()
                    .map(|e| (e.simplex().get(), e.face(), e.vertices().sn_index()))
                    .collect::<Vec<_>>();
                out.push(format!(
                    "{k}-face {} {embs:?} {:?} {:?} {}",
                    face.index(),
                    face.component(),
                    face.boundary_component(),
                    face.is_valid()
                ));
            }
        }
        for (s, _) in tri.simplices() {
            for k in 0..3 {
                for f in 0..Triangulation3::faces_per_simplex(k) {
                    out.push(format!("{s} {k} {f} {}", tri.simplex_face(s, k, f)));
                }
            }
        }
        for c in tri.components() {
            out.push(format!("component {} {:?} {:?}", c.index(), c.simplices(), c.boundary_components()));
        }
        for b in tri.boundary_components() {
            out.push(format!("boundary {} {:?} {:?} {:?}", b.index(), b.component(), b.facets(), b.ideal_vertex()));
        }
        out
    }

    #[test]
    fn skeleton_does_not_depend_on_when_it_is_built() {
        let mut tris = vec![
            factory::figure_eight(),
            factory::layered_solid_torus(2, 3).unwrap(),
            factory::layered_lens_space(8, 3).unwrap(),
        ];
        let mut pair = Triangulation3::new();
        let s = pair.new_simplices(2);
        pair.join(s[0], 0, s[1], perm4([1, 0, 2, 3])).unwrap();
        pair.join(s[0], 2, s[1], perm4([0, 1, 3, 2])).unwrap();
        tris.push(pair);

        for tri in &tris {
            let first = skeleton_snapshot(tri);
            tri.ensure_skeleton();
            assert_eq!(skeleton_snapshot(tri), first);
            assert_eq!(skeleton_snapshot(&tri.clone()), first);

            let mut rebuilt = Triangulation3::new();
            rebuilt.new_simplices(tri.size());
            for (s, simp) in tri.simplices() {
                for f in 0..4 {
                    if let (Some(t), Some(g)) = (simp.adjacent(f), simp.gluing(f)) {
                        if (s, f) < (t, g.image(f)) {
                            rebuilt.join(s, f, t, g).unwrap();
                        }
                    }
                }
            }
            assert_eq!(skeleton_snapshot(&rebuilt), first);

            // Unglue and reglue one facet so the cache is thrown away.
            let s = SimplexIdx::from(0);
            let f = (0..4).find(|&f| rebuilt.simplex(s).adjacent(f).is_some()).unwrap();
            let (t, g) = (rebuilt.simplex(s).adjacent(f).unwrap(), rebuilt.simplex(s).gluing(f).unwrap());
            rebuilt.unjoin(s, f).unwrap();
            assert_ne!(skeleton_snapshot(&rebuilt), first);
            rebuilt.join(s, f, t, g).unwrap();
            assert_eq!(skeleton_snapshot(&rebuilt), first);
        }
    }
}
