//! Round-trip tests for the flat stream format and the 1-skeleton export.
//!
//! Writing then reading a complex must reproduce the dimension, the entity
//! counts, the vertex payloads in order, and the neighbor graph up to the
//! index assignment the writer emits. Since the reader allocates entities in
//! stream order, the graph export of the round-tripped complex is
//! byte-identical to the original's.

use simplicial::core::triangulation_data_structure::Tds;

type PlainTds<const D: usize> = Tds<Option<()>, Option<()>, D>;
type PayloadTds = Tds<u32, char, 2>;

fn sphere<const D: usize>() -> PlainTds<D> {
    let mut tds = PlainTds::new();
    let mut last = tds.insert_increase_dimension(None);
    for _ in 0..=D {
        last = tds.insert_increase_dimension(Some(last));
    }
    tds
}

fn graph_text<U, V, const D: usize>(tds: &Tds<U, V, D>) -> String
where
    U: simplicial::core::DataType,
    V: simplicial::core::DataType,
{
    let mut out = Vec::new();
    tds.write_graph(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn five_vertex_state_round_trips() {
    let mut tds = sphere::<2>();
    let s = tds.full_cell_keys().next().unwrap();
    tds.insert_in_full_cell(s);
    assert_eq!(tds.number_of_vertices(), 5);

    let stream = serde_json::to_string(&tds).unwrap();
    let read: PlainTds<2> = serde_json::from_str(&stream).unwrap();

    assert_eq!(read.current_dimension(), tds.current_dimension());
    assert_eq!(read.number_of_vertices(), tds.number_of_vertices());
    assert_eq!(read.number_of_full_cells(), tds.number_of_full_cells());
    assert!(read.is_valid().is_ok());
    // entities come back in stream order, so the skeletons match exactly
    assert_eq!(graph_text(&read), graph_text(&tds));
}

#[test]
fn payloads_survive_in_order() {
    let mut tds = PayloadTds::new();
    let mut last = tds.insert_increase_dimension(None);
    for _ in 0..3 {
        last = tds.insert_increase_dimension(Some(last));
    }
    for (i, v) in tds.vertex_keys().collect::<Vec<_>>().into_iter().enumerate() {
        tds.get_vertex_mut(v).unwrap().data = Some(i as u32 * 10);
    }
    let cell = tds.full_cell_keys().next().unwrap();
    tds.get_full_cell_mut(cell).unwrap().data = Some('x');

    let stream = serde_json::to_string(&tds).unwrap();
    let read: PayloadTds = serde_json::from_str(&stream).unwrap();

    let original: Vec<Option<u32>> = tds.vertices().map(|(_, v)| v.data).collect();
    let recovered: Vec<Option<u32>> = read.vertices().map(|(_, v)| v.data).collect();
    assert_eq!(original, recovered);

    let cell_payloads: Vec<Option<char>> = read.full_cells().map(|(_, c)| c.data).collect();
    assert_eq!(cell_payloads.iter().filter(|d| d.is_some()).count(), 1);
    assert!(read.is_valid().is_ok());
}

#[test]
fn singleton_complex_round_trips() {
    let mut tds = PlainTds::<3>::new();
    tds.insert_increase_dimension(None);
    assert_eq!(tds.current_dimension(), -1);

    let stream = serde_json::to_string(&tds).unwrap();
    let read: PlainTds<3> = serde_json::from_str(&stream).unwrap();
    assert_eq!(read.current_dimension(), -1);
    assert_eq!(read.number_of_vertices(), 1);
    assert_eq!(read.number_of_full_cells(), 1);
    assert!(read.is_valid().is_ok());
}

#[test]
fn empty_complex_round_trips() {
    let tds = PlainTds::<3>::new();
    let stream = serde_json::to_string(&tds).unwrap();
    let read: PlainTds<3> = serde_json::from_str(&stream).unwrap();
    assert!(read.is_empty());
    assert!(read.is_valid().is_ok());
}

#[test]
fn malformed_streams_are_rejected() {
    // vertex index out of range
    let bad = r#"{"current_dimension":0,"vertices":[null],"full_cells":[{"vertices":[7],"data":null}],"neighbors":[[0]]}"#;
    assert!(serde_json::from_str::<PlainTds<2>>(bad).is_err());

    // dimension above the ambient dimension
    let bad = r#"{"current_dimension":5,"vertices":[],"full_cells":[],"neighbors":[]}"#;
    assert!(serde_json::from_str::<PlainTds<2>>(bad).is_err());

    // neighbor links that are not reciprocal
    let bad = r#"{"current_dimension":0,"vertices":[null,null,null],"full_cells":[{"vertices":[0],"data":null},{"vertices":[1],"data":null},{"vertices":[2],"data":null}],"neighbors":[[1],[2],[0]]}"#;
    assert!(serde_json::from_str::<PlainTds<2>>(bad).is_err());
}

#[test]
fn graph_export_lists_complete_adjacency() {
    // boundary of a 3-simplex: each vertex neighbors the other three
    let tds = sphere::<2>();
    let text = graph_text(&tds);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("5")); // four vertices plus infinity
    // infinity vertex has no incident edges
    assert_eq!(lines.next(), Some("0"));
    for line in lines {
        let mut parts = line.split_whitespace();
        assert_eq!(parts.next(), Some("3"));
        assert_eq!(parts.count(), 3);
    }
}
