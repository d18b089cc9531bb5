//! Face collapse: identify all vertices of a face with one new vertex.
//!
//! The collapse retriangulates the union of the vertex stars of the face —
//! every full cell sharing at least one vertex with it — by coning a fresh
//! apex onto the boundary of that union, then deletes the face's original
//! vertices. Cells containing a proper subset of the face's vertices come
//! back with those corners renamed to the apex; cells containing the whole
//! face degenerate and disappear.

use crate::core::{
    algorithms::gathering::StarOfFace,
    collections::SlotBuffer,
    face::Face,
    traits::data_type::DataType,
    triangulation_data_structure::{Tds, VertexKey},
};

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Collapses `f`, replacing all of its vertices with a single new vertex.
    /// Returns the new vertex.
    ///
    /// The boundary of the union of full cells sharing a vertex with `f`
    /// must be a topological sphere; this holds for the usual edge and
    /// triangle collapses on well-formed complexes and is the caller's
    /// responsibility.
    ///
    /// # Panics
    ///
    /// Panics if the feature dimension is not in `1..current_dimension`, or
    /// if the star of `f` covers the whole complex and leaves no boundary
    /// facet to cone from.
    pub fn collapse_face(&mut self, f: &Face) -> VertexKey {
        let fd = f.feature_dimension();
        assert!(
            fd >= 1 && fd < self.current_dimension(),
            "collapse needs a proper face of positive dimension"
        );
        // save the face's vertices before its cell is retriangulated away
        let saved: SlotBuffer<VertexKey> = self.face_vertices(f);

        // gather the union of vertex stars; the gathering hands back a facet
        // on the union's boundary, which seeds the cone
        let predicate = StarOfFace::new(self, f);
        let mut simps = Vec::new();
        let boundary = self
            .gather_full_cells(f.full_cell(), &predicate, &mut simps)
            .expect("the star of a proper face leaves a boundary facet");

        let v = self.insert_in_hole(&simps, boundary);
        for w in saved {
            self.delete_vertex(w);
        }
        v
    }
}

// =============================================================================
// TESTS
// =============================================================================
