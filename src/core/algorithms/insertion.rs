//! Vertex insertion: in a full cell, a face, a facet, or a star-shaped hole.
//!
//! The cell/face/facet entry points all reduce to the hole-insertion engine:
//! collect the cells to retriangulate, mark them, and cone a fresh apex
//! vertex onto the boundary of the marked region. `insert_in_tagged_hole`
//! walks that boundary facet by facet, rotating a [`Rotor`] around each
//! (d−2)-face of a new cell until it re-enters the boundary, and reuses an
//! already built neighbor when the rotation lands on a facet that was
//! extruded earlier. The old cells are freed in one pass at the end, which is
//! also what keeps the mark discipline: every marked cell dies, every new
//! cell is born clear.

use smallvec::smallvec;
use tracing::debug;

use crate::core::{
    collections::{FacetIndex, SlotBuffer},
    face::Face,
    facet::{Facet, Rotor},
    traits::data_type::DataType,
    triangulation_data_structure::{CellKey, Tds, VertexKey},
};

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Inserts a new vertex in full cell `s`, splitting it into
    /// `current_dimension + 1` cells that all share the new vertex.
    ///
    /// `s` itself is reused as the first of the new cells; the other cells
    /// are copies with one slot re-pointed at the new vertex. Returns the new
    /// vertex.
    ///
    /// # Panics
    ///
    /// Panics if the current dimension is not positive or `s` is dead.
    pub fn insert_in_full_cell(&mut self, s: CellKey) -> VertexKey {
        assert!(self.current_dimension() > 0, "insertion needs a full-dimensional cell");
        assert!(self.is_full_cell(s), "dead full cell key");

        let dcur = self.current_dimension() as usize;
        let v = self.new_vertex();
        // scratch table of the d+1 cells replacing `s`, indexed by the slot
        // each one gives to `v`
        let mut new_cells: SlotBuffer<CellKey> = smallvec![s; dcur + 1];
        for i in 1..=dcur {
            let new_s = self.new_full_cell_from(s);
            new_cells[i] = new_s;
            self.associate_vertex_with_full_cell(new_s, i, v);
            // the displaced corner keeps a valid back-pointer
            let displaced = self.vertex(s, i - 1);
            self.associate_vertex_with_full_cell(new_s, i - 1, displaced);
            let outer = self.neighbor(s, i);
            let mirror = self.mirror_index(s, i);
            self.set_neighbors(new_s, i, outer, mirror);
        }
        self.associate_vertex_with_full_cell(s, 0, v);
        for i in 0..=dcur {
            for j in (i + 1)..=dcur {
                self.set_neighbors(new_cells[i], j, new_cells[j], i);
            }
        }
        v
    }

    /// Inserts a new vertex in the face `f`, retriangulating the cells
    /// incident to it. Returns the new vertex.
    ///
    /// A face of full feature dimension falls back to
    /// [`Tds::insert_in_full_cell`]; a facet behaves like
    /// [`Tds::insert_in_facet`].
    ///
    /// # Panics
    ///
    /// Panics if the face is empty or its cell is dead.
    pub fn insert_in_face(&mut self, f: &Face) -> VertexKey {
        assert!(f.feature_dimension() >= 0, "insertion needs a non-empty face");
        if f.feature_dimension() == self.current_dimension() {
            return self.insert_in_full_cell(f.full_cell());
        }
        let simps = self.incident_full_cells(f);
        self.insert_in_hole(&simps, Facet::new(f.full_cell(), f.index(0) as FacetIndex))
    }

    /// Inserts a new vertex in the facet `ft`, retriangulating the two cells
    /// sharing it. Returns the new vertex.
    ///
    /// # Panics
    ///
    /// Panics if the current dimension is not positive or the facet's cell is
    /// dead.
    pub fn insert_in_facet(&mut self, ft: &Facet) -> VertexKey {
        assert!(self.current_dimension() > 0, "insertion needs a full-dimensional facet");
        let s0 = ft.full_cell();
        let i = ft.index_of_covertex();
        let s1 = self.neighbor(s0, i);
        // any facet of s0 other than the shared one seeds the hole boundary
        let seed = (i + 1) % self.current_dimension() as usize;
        self.insert_in_hole(&[s0, s1], Facet::new(s0, seed as FacetIndex))
    }

    /// Inserts a new vertex in a hole: the cells of `hole` form a topological
    /// ball, and `f` is a facet of one of them lying on the hole's boundary.
    /// The hole is retriangulated by coning the new vertex onto its boundary;
    /// the old cells are freed. Returns the new vertex.
    ///
    /// # Panics
    ///
    /// Panics if the hole is empty, or spans several cells below dimension 2,
    /// or `f` is not on the hole's boundary. A hole that is not a ball, or a
    /// seed facet not on its boundary, is a contract violation: the operation
    /// panics or leaves the structure undefined, by design.
    pub fn insert_in_hole(&mut self, hole: &[CellKey], f: Facet) -> VertexKey {
        let mut new_cells = Vec::new();
        self.insert_in_hole_collecting(hole, f, &mut new_cells)
    }

    /// Like [`Tds::insert_in_hole`], but also appends the newly created cells
    /// to `out`.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Tds::insert_in_hole`].
    pub fn insert_in_hole_collecting(
        &mut self,
        hole: &[CellKey],
        f: Facet,
        out: &mut Vec<CellKey>,
    ) -> VertexKey {
        assert!(
            hole.len() == 1 || self.current_dimension() > 1,
            "a multi-cell hole needs dimension at least 2"
        );
        for &s in hole {
            self.set_visited(s, true);
        }
        let v = self.new_vertex();
        debug!(cells = hole.len(), "retriangulating hole");
        self.insert_in_tagged_hole(v, f, out);
        self.delete_full_cells(hole.iter().copied());
        v
    }

    /// The recursive cone over the boundary of a marked hole.
    ///
    /// `f` is a boundary facet of the marked region; this builds the new cell
    /// coning `v` onto that facet, then finds or builds the new neighbor
    /// across every other facet of the new cell by rotating around the
    /// (d−2)-faces of the old cell until the rotation re-enters the boundary.
    /// Returns the new cell.
    ///
    /// Every boundary facet is extruded exactly once: before recursing, the
    /// candidate facet is checked through the mirror vertex of the cell
    /// outside the hole — if that cell already points away from the hole, the
    /// extrusion exists and is reused.
    pub(crate) fn insert_in_tagged_hole(
        &mut self,
        v: VertexKey,
        f: Facet,
        out: &mut Vec<CellKey>,
    ) -> CellKey {
        assert!(
            self.is_boundary_facet(&f),
            "starting facet should be on the hole boundary"
        );

        let dcur = self.current_dimension() as usize;
        let old_s = f.full_cell();
        let facet_index = f.index_of_covertex();

        let new_s = self.new_full_cell();
        for i in (0..=dcur).filter(|&i| i != facet_index) {
            let w = self.vertex(old_s, i);
            self.associate_vertex_with_full_cell(new_s, i, w);
        }
        self.associate_vertex_with_full_cell(new_s, facet_index, v);
        let outer = self.neighbor(old_s, facet_index);
        let mirror = self.mirror_index(old_s, facet_index);
        self.set_neighbors(new_s, facet_index, outer, mirror);

        out.push(new_s);

        // hook up or build the new neighbor across every other facet
        for i in (0..=dcur).filter(|&i| i != facet_index) {
            // rotate around the (d−2)-face opposite {i, facet_index} until
            // the candidate facet lies on the hole boundary
            let mut rot = Rotor::new(old_s, i as FacetIndex, facet_index as FacetIndex);
            while !self.is_boundary_facet(&rot.facet()) {
                rot = self.rotate_rotor(&rot);
            }

            // has that boundary facet already been extruded to `v`?
            let inside = rot.full_cell();
            let outside = self.neighbor(inside, rot.index_of_covertex());
            let m = self.mirror_vertex(inside, rot.index_of_covertex());
            let index = self.get_full_cell(outside)
                .and_then(|cell| cell.index_of(m))
                .expect("mirror vertex missing from the cell outside the hole");
            let mut new_neighbor = self.neighbor(outside, index);
            if new_neighbor == inside {
                // not extruded yet, recurse
                new_neighbor = self.insert_in_tagged_hole(v, rot.facet(), out);
            }
            self.set_neighbors(new_s, i, new_neighbor, rot.index_of_second_covertex());
        }
        new_s
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::core::triangulation_data_structure::Tds;

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
    fn insert_in_full_cell_splits_one_into_three() {
        let mut tds = sphere::<2>();
        let cells_before = tds.number_of_full_cells();
        let s = tds.full_cell_keys().next().unwrap();

        let v = tds.insert_in_full_cell(s);
        assert_eq!(tds.number_of_full_cells(), cells_before + 2);
        assert_eq!(tds.number_of_vertices(), 5);
        assert!(tds.is_valid().is_ok());
        assert_eq!(tds.incident_full_cells_of_vertex(v).len(), 3);
    }

    #[test]
    fn insert_in_full_cell_keeps_marks_clear() {
        let mut tds = sphere::<3>();
        let s = tds.full_cell_keys().next().unwrap();
        tds.insert_in_full_cell(s);
        assert!(tds.full_cells().all(|(_, cell)| cell.mark().is_clear()));
    }

    #[test]
    fn insert_in_facet_cones_both_sides() {
        let mut tds = sphere::<2>();
        let s = tds.full_cell_keys().next().unwrap();
        tds.insert_in_full_cell(s);
        let cells_before = tds.number_of_full_cells();

        let facet = tds.facets().next().unwrap();
        let v = tds.insert_in_facet(&facet);
        // the two seed cells are replaced by one cell per boundary facet of
        // the pair, 2d − 2 = 4 of them in dimension 2
        assert_eq!(tds.number_of_full_cells(), cells_before + 2);
        assert!(tds.is_valid().is_ok());
        assert_eq!(tds.incident_full_cells_of_vertex(v).len(), 4);
    }

    #[test]
    fn insert_in_hole_over_a_vertex_star_replaces_it() {
        let mut tds = sphere::<3>();
        let s = tds.full_cell_keys().next().unwrap();
        let v = tds.insert_in_full_cell(s);

        // the star of v is a ball; re-coning it swaps v for a fresh vertex
        let hole = tds.incident_full_cells_of_vertex(v);
        let seed_cell = hole[0];
        let slot = tds.get_full_cell(seed_cell).unwrap().index_of(v).unwrap();
        let vertices_before = tds.number_of_vertices();
        let cells_before = tds.number_of_full_cells();

        let w = tds.insert_in_hole(&hole, crate::core::facet::Facet::new(seed_cell, slot as u8));
        tds.delete_vertex(v);
        assert_eq!(tds.number_of_vertices(), vertices_before);
        assert_eq!(tds.number_of_full_cells(), cells_before);
        assert!(tds.is_valid().is_ok());
        assert!(tds.incident_full_cells_of_vertex(w).len() == hole.len());
    }

    #[test]
    fn insert_in_face_on_an_edge_in_3d() {
        let mut tds = sphere::<3>();
        let cell = tds.full_cell_keys().next().unwrap();
        let mut edge = crate::core::face::Face::new(cell);
        edge.set_index(0, 0);
        edge.set_index(1, 1);

        let incident = tds.incident_full_cells(&edge).len();
        let cells_before = tds.number_of_full_cells();
        let v = tds.insert_in_face(&edge);
        // the hole is replaced by 2 * incident cells in 3D (each old cell
        // splits across the subdivided edge)
        assert_eq!(tds.number_of_full_cells(), cells_before + incident);
        assert!(tds.is_valid().is_ok());
        assert!(tds.is_vertex(v));
    }
}
