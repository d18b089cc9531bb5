//! Integration tests for constructing and querying small complexes.
//!
//! These follow the canonical growth path: repeated
//! `insert_increase_dimension` calls build the boundary of a simplex one
//! dimension at a time, and the local insertion operations refine it. All
//! checks here are purely combinatorial.

use simplicial::core::face::Face;
use simplicial::core::facet::Rotor;
use simplicial::core::triangulation_data_structure::{CellKey, Tds, VertexKey};

type TestTds<const D: usize> = Tds<Option<()>, Option<()>, D>;

/// Builds the boundary of a (D+1)-simplex: D + 2 vertices, D + 2 cells.
fn sphere<const D: usize>() -> TestTds<D> {
    let mut tds = TestTds::new();
    let mut last = tds.insert_increase_dimension(None);
    for _ in 0..=D {
        last = tds.insert_increase_dimension(Some(last));
    }
    tds
}

/// Brute force: all cells whose vertex set contains every vertex of `face`.
fn cells_containing<const D: usize>(
    tds: &TestTds<D>,
    face_vertices: &[VertexKey],
) -> Vec<CellKey> {
    tds.full_cells()
        .filter(|(_, cell)| {
            face_vertices
                .iter()
                .all(|&v| cell.vertices().any(|w| w == v))
        })
        .map(|(key, _)| key)
        .collect()
}

/// Brute force: all cells sharing at least one vertex with `face`.
fn cells_sharing<const D: usize>(
    tds: &TestTds<D>,
    face_vertices: &[VertexKey],
) -> Vec<CellKey> {
    tds.full_cells()
        .filter(|(_, cell)| {
            face_vertices
                .iter()
                .any(|&v| cell.vertices().any(|w| w == v))
        })
        .map(|(key, _)| key)
        .collect()
}

fn sorted(mut keys: Vec<CellKey>) -> Vec<CellKey> {
    keys.sort_unstable();
    keys
}

#[test]
fn empty_to_two_sphere() {
    // four increase-dimension calls: the boundary of a 2-simplex plus its
    // completion through the star vertex
    let tds = sphere::<2>();
    assert_eq!(tds.current_dimension(), 2);
    assert_eq!(tds.number_of_vertices(), 4);
    assert_eq!(tds.number_of_full_cells(), 4);
    assert!(tds.is_valid().is_ok());
}

#[test]
fn split_a_two_cell() {
    let mut tds = sphere::<2>();
    let s = tds.full_cell_keys().next().unwrap();
    let v = tds.insert_in_full_cell(s);

    assert_eq!(tds.number_of_vertices(), 5);
    assert_eq!(tds.number_of_full_cells(), 6); // 1 cell replaced by 3
    assert!(tds.is_valid().is_ok());
    assert_eq!(tds.incident_full_cells_of_vertex(v).len(), 3);
}

#[test]
fn facet_insertion_after_a_split() {
    let mut tds = sphere::<2>();
    let s = tds.full_cell_keys().next().unwrap();
    tds.insert_in_full_cell(s);

    let cells_before = tds.number_of_full_cells();
    let facet = tds.facets().next().unwrap();
    let v = tds.insert_in_facet(&facet);

    // each of the pair's four boundary edges is coned onto the new vertex
    assert_eq!(tds.number_of_full_cells(), cells_before + 2);
    assert!(tds.is_valid().is_ok());
    assert_eq!(tds.incident_full_cells_of_vertex(v).len(), 4);
}

#[test]
fn gathering_matches_brute_force() {
    let mut tds = sphere::<3>();
    let s = tds.full_cell_keys().next().unwrap();
    tds.insert_in_full_cell(s);

    for (cell, feature_dim) in tds
        .full_cell_keys()
        .collect::<Vec<_>>()
        .into_iter()
        .zip([0usize, 1, 2].into_iter().cycle())
    {
        let mut face = Face::new(cell);
        for i in 0..=feature_dim {
            face.set_index(i, i);
        }
        let face_vertices: Vec<VertexKey> = tds.face_vertices(&face).to_vec();

        let incident = sorted(tds.incident_full_cells(&face));
        assert_eq!(incident, sorted(cells_containing(&tds, &face_vertices)));

        let star = sorted(tds.star(&face));
        assert_eq!(star, sorted(cells_sharing(&tds, &face_vertices)));
    }
}

#[test]
fn marks_are_clear_after_every_gather() {
    let mut tds = sphere::<3>();
    let s = tds.full_cell_keys().next().unwrap();
    tds.insert_in_full_cell(s);

    let vertices: Vec<VertexKey> = tds.vertex_keys().collect();
    for v in vertices {
        tds.incident_full_cells_of_vertex(v);
        assert!(tds.full_cells().all(|(_, cell)| cell.mark().is_clear()));
    }

    let cell = tds.full_cell_keys().next().unwrap();
    let mut edge = Face::new(cell);
    edge.set_index(0, 0);
    edge.set_index(1, 1);
    tds.star(&edge);
    assert!(tds.full_cells().all(|(_, cell)| cell.mark().is_clear()));
}

#[test]
fn rotor_rotation_is_periodic() {
    // in dimension 3 a rotor walks around an edge; the cycle length is the
    // number of cells around that edge
    let mut tds = sphere::<3>();
    let s = tds.full_cell_keys().next().unwrap();
    tds.insert_in_full_cell(s);

    for cell in tds.full_cell_keys().collect::<Vec<_>>() {
        let start = Rotor::new(cell, 0, 1);
        // the (d−2)-face opposite slots {0, 1} spans the remaining corners
        let pivot_vertices: Vec<VertexKey> = (2..=3).map(|i| tds.vertex(cell, i)).collect();
        let around = cells_containing(&tds, &pivot_vertices).len();

        let mut rotor = tds.rotate_rotor(&start);
        let mut steps = 1;
        while rotor != start {
            rotor = tds.rotate_rotor(&rotor);
            steps += 1;
            assert!(steps <= tds.number_of_full_cells(), "rotor failed to close");
        }
        assert_eq!(steps, around);
    }
}

#[test]
fn euler_lower_bound_holds_under_refinement() {
    let mut tds = sphere::<3>();
    for _ in 0..4 {
        let s = tds.full_cell_keys().next().unwrap();
        tds.insert_in_full_cell(s);
        let d = tds.current_dimension() as i64;
        let n = tds.number_of_vertices() as i64;
        let m = tds.number_of_full_cells() as i64;
        assert!(m >= n - d + 1, "cell count {m} below Euler bound for {n} vertices");
    }
}

#[test]
fn incident_faces_enumerates_each_face_once() {
    // boundary of a 4-simplex: every pair of the 5 vertices spans an edge,
    // every triple a triangle
    let mut tds = sphere::<3>();
    let vertices: Vec<VertexKey> = tds.vertex_keys().collect();

    for &v in &vertices {
        let edges = tds.incident_faces(v, 1);
        assert_eq!(edges.len(), 4);
        for edge in &edges {
            let ends = tds.face_vertices(edge);
            assert!(ends.contains(&v));
        }
        let triangles = tds.incident_faces(v, 2);
        assert_eq!(triangles.len(), 6);
        // faces of the current dimension and above are not sub-simplices
        assert!(tds.incident_faces(v, 3).is_empty());
    }

    // upper enumeration over all vertices yields each face exactly once
    let total_upper_edges: usize = vertices
        .iter()
        .map(|&v| tds.incident_upper_faces(v, 1).len())
        .sum();
    assert_eq!(total_upper_edges, 10); // C(5, 2)
    let total_upper_triangles: usize = vertices
        .iter()
        .map(|&v| tds.incident_upper_faces(v, 2).len())
        .sum();
    assert_eq!(total_upper_triangles, 10); // C(5, 3)
}
