//! Integration tests for the editing operations: dimension changes, hole
//! insertion, and face collapse composed into longer sequences.

use simplicial::core::face::Face;
use simplicial::core::facet::Facet;
use simplicial::core::triangulation_data_structure::Tds;

type TestTds<const D: usize> = Tds<Option<()>, Option<()>, D>;

fn sphere<const D: usize>() -> TestTds<D> {
    let mut tds = TestTds::new();
    let mut last = tds.insert_increase_dimension(None);
    for _ in 0..=D {
        last = tds.insert_increase_dimension(Some(last));
    }
    tds
}

#[test]
fn increase_then_decrease_restores_counts_in_every_dimension() {
    fn check<const D: usize>() {
        let mut tds = TestTds::<D>::new();
        let star = tds.insert_increase_dimension(None);
        let mut last = star;
        for _ in 0..D {
            last = tds.insert_increase_dimension(Some(last));
        }
        let dim = tds.current_dimension();
        let vertices = tds.number_of_vertices();
        let cells = tds.number_of_full_cells();

        let v = tds.insert_increase_dimension(Some(star));
        assert!(tds.is_valid().is_ok(), "invalid after increase in D = {D}");
        tds.remove_decrease_dimension(v, star);

        assert_eq!(tds.current_dimension(), dim);
        assert_eq!(tds.number_of_vertices(), vertices);
        assert_eq!(tds.number_of_full_cells(), cells);
        assert!(tds.is_valid().is_ok(), "invalid after decrease in D = {D}");
    }
    check::<2>();
    check::<3>();
    check::<4>();
    check::<5>();
}

#[test]
fn collapse_an_edge_shared_by_several_tetrahedra() {
    let mut tds = sphere::<3>();
    let c = tds.full_cell_keys().next().unwrap();
    let u = tds.insert_in_full_cell(c);

    // slots (0, 1) of the reused cell span an edge at the fresh vertex whose
    // star leaves part of the sphere untouched
    let mut edge = Face::new(c);
    edge.set_index(0, 0);
    edge.set_index(1, 1);
    assert_eq!(tds.face_vertex(&edge, 0), u);
    assert!(tds.incident_full_cells(&edge).len() >= 2);

    let vertices_before = tds.number_of_vertices();
    let v = tds.collapse_face(&edge);

    assert_eq!(tds.number_of_vertices(), vertices_before - 1);
    assert!(tds.is_vertex(v));
    assert!(tds.is_valid().is_ok());
    assert!(tds.full_cells().all(|(_, cell)| cell.mark().is_clear()));
}

#[test]
fn replacing_a_vertex_through_its_star() {
    let mut tds = sphere::<3>();
    let s = tds.full_cell_keys().next().unwrap();
    let v = tds.insert_in_full_cell(s);
    let s = tds.full_cell_keys().last().unwrap();
    tds.insert_in_full_cell(s);

    let hole = tds.incident_full_cells_of_vertex(v);
    let seed_cell = hole[0];
    let seed_slot = tds.get_full_cell(seed_cell).unwrap().index_of(v).unwrap();
    let vertices = tds.number_of_vertices();
    let cells = tds.number_of_full_cells();

    let mut new_cells = Vec::new();
    let w = tds.insert_in_hole_collecting(
        &hole,
        Facet::new(seed_cell, seed_slot as u8),
        &mut new_cells,
    );
    tds.delete_vertex(v);

    assert_eq!(tds.number_of_vertices(), vertices);
    assert_eq!(tds.number_of_full_cells(), cells);
    assert_eq!(new_cells.len(), hole.len());
    assert!(new_cells.iter().all(|&c| tds.is_full_cell(c)));
    assert!(tds
        .get_full_cell(tds.full_cell_of(w))
        .unwrap()
        .has_vertex(w));
    assert!(tds.is_valid().is_ok());
}

#[test]
fn long_editing_sequence_stays_valid() {
    let mut tds = sphere::<3>();
    for round in 0..5 {
        let cells: Vec<_> = tds.full_cell_keys().collect();
        tds.insert_in_full_cell(cells[round % cells.len()]);
        assert!(tds.is_valid().is_ok(), "invalid after split {round}");

        let facets: Vec<_> = tds.facets().collect();
        tds.insert_in_facet(&facets[(round * 7) % facets.len()]);
        assert!(tds.is_valid().is_ok(), "invalid after facet insertion {round}");
    }
    // every split adds d = 3 cells, every facet insertion 2d − 2 = 4
    assert_eq!(tds.number_of_full_cells(), 5 + 5 * 3 + 5 * 4);
    assert_eq!(tds.number_of_vertices(), 5 + 10);
}
