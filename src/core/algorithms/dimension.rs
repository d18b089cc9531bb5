//! Dimension growth and shrinkage.
//!
//! `insert_increase_dimension` embeds the current d-sphere as the equator of
//! a (d+1)-sphere: every cell is extended with the new vertex, every cell not
//! containing the distinguished *star* vertex gets an extruded twin through
//! the star, and the twins are stitched together by shifting the old
//! adjacency one slot to the right. `remove_decrease_dimension` is the
//! inverse, peeling the complex back down around the star vertex. Both carry
//! special cases for the degenerate low dimensions, and both repair
//! orientation by swapping the last two slots where the parity of the
//! extrusion demands it.

use std::collections::VecDeque;

use tracing::debug;

use crate::core::{
    traits::data_type::DataType,
    triangulation_data_structure::{CellKey, Tds, VertexKey},
};

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Adds one vertex and raises the current dimension by one, keeping the
    /// sphere topology anchored at `star`.
    ///
    /// `star` must be `None` for the very first insertion (the complex is
    /// empty) and a live vertex of the complex afterwards — typically the
    /// artificial "infinite" vertex carried along through every dimension
    /// change. Returns the new vertex.
    ///
    /// # Panics
    ///
    /// Panics if the current dimension already equals the ambient dimension,
    /// or if `star` is absent/present in disagreement with the state above.
    pub fn insert_increase_dimension(&mut self, star: Option<VertexKey>) -> VertexKey {
        let prev = self.current_dimension();
        assert!(
            prev < self.ambient_dimension(),
            "cannot grow past the ambient dimension"
        );
        if prev == -2 {
            assert!(star.is_none(), "the first insertion takes no star vertex");
        } else {
            assert!(
                star.is_some_and(|s| self.is_vertex(s)),
                "a live star vertex is required once the complex is non-empty"
            );
        }

        self.set_current_dimension(prev + 1);
        let v = self.new_vertex();
        match prev {
            -2 => {
                // the very first vertex, with its placeholder cell
                let s = self.new_full_cell();
                self.associate_vertex_with_full_cell(s, 0, v);
            }
            -1 => {
                // a triangulation of the 0-sphere: two vertices, two cells
                let star = star.expect("checked above");
                let infinite_cell = self.full_cell_of(star);
                let finite_cell = self.new_full_cell();
                self.associate_vertex_with_full_cell(finite_cell, 0, v);
                self.set_neighbors(infinite_cell, 0, finite_cell, 0);
            }
            _ => self.do_insert_increase_dimension(v, star.expect("checked above")),
        }
        debug!(current_dimension = self.current_dimension(), "dimension increased");
        v
    }

    /// The general extrusion for a previous dimension of at least 0.
    fn do_insert_increase_dimension(&mut self, x: VertexKey, star: VertexKey) {
        let cur = self.current_dimension() as usize; // already raised
        let existing: Vec<CellKey> = self.full_cell_keys().collect();
        let start = existing[0];
        let mut swap_me: Option<CellKey> = None;

        // First pass: extend every existing cell with `x` and extrude a twin
        // through `star` for each cell not containing it. New twins carry a
        // vertex in slot `cur` already, so the guard skips them even though
        // the pass allocates while it runs.
        for s in existing {
            if self.get_full_cell(s).expect("snapshot key is live").vertex(cur).is_some() {
                continue;
            }
            self.set_visited(s, true);
            self.associate_vertex_with_full_cell(s, cur, x);
            if self.get_full_cell(s).expect("live").has_vertex(star) {
                // if the new dimension is 2, the 'rightmost' infinite cell
                // needs an orientation fix at the very end
                if cur == 2 {
                    let star_slot = self
                        .get_full_cell(s)
                        .expect("live")
                        .index_of(star)
                        .expect("checked above");
                    if self.mirror_index(s, star_slot) == 0 {
                        swap_me = Some(s);
                    }
                }
            } else {
                let twin = self.new_full_cell();
                self.set_neighbors(s, cur, twin, 0);
                self.associate_vertex_with_full_cell(twin, 0, star);
                // the old vertices shift one slot to the right in the twin
                for k in 1..=cur {
                    let w = self.vertex(s, k - 1);
                    self.associate_vertex_with_full_cell(twin, k, w);
                }
            }
        }

        // Second pass: breadth-first over the old cells, clearing marks and
        // stitching the links across the new facet `cur`.
        let mut queue = VecDeque::new();
        self.set_visited(start, false);
        queue.push_back(start);
        while let Some(s) = queue.pop_front() {
            let star_slot = self.get_full_cell(s).expect("live").index_of(star);
            if let Some(si) = star_slot {
                // the twin of the finite cell across `star` sits opposite `x`
                let finite = self.neighbor(s, si);
                let twin = self.neighbor(finite, cur);
                let mirror = self.mirror_index(s, si) + 1;
                self.set_neighbors(s, cur, twin, mirror);
            } else {
                let twin = self.neighbor(s, cur);
                for k in 0..cur {
                    let opposite = self.neighbor(s, k);
                    if !self.get_full_cell(opposite).expect("live").has_vertex(star) {
                        // twin adjacency is the old adjacency shifted right
                        let other_twin = self.neighbor(opposite, cur);
                        let mirror = self.mirror_index(s, k) + 1;
                        self.set_neighbors(twin, k + 1, other_twin, mirror);
                    }
                }
            }
            for k in 0..cur {
                let n = self.neighbor(s, k);
                if self.get_visited(n) {
                    self.set_visited(n, false);
                    queue.push_back(n);
                }
            }
        }

        // The extrusion reverses orientation on even dimensions; swapping the
        // last two slots of every twin restores it.
        if cur % 2 == 0 && cur > 1 {
            let all: Vec<CellKey> = self.full_cell_keys().collect();
            for s in all {
                if self.get_full_cell(s).expect("live").vertex(cur) != Some(x) {
                    self.swap_vertices(s, cur - 1, cur);
                }
            }
        }
        if let Some(s) = swap_me {
            self.swap_vertices(s, 1, 2);
        }
    }

    /// Removes `v` and lowers the current dimension by one, keeping the
    /// complex anchored at `star`.
    ///
    /// This inverts [`Tds::insert_increase_dimension`]: it expects the
    /// complex to be (combinatorially) a suspension over `v`, which is the
    /// shape that operation produces. Below dimension 2 the degenerate
    /// complexes are torn down directly; at −1 the whole complex is cleared.
    ///
    /// # Panics
    ///
    /// Panics if the current dimension is below −1 or either vertex is dead.
    pub fn remove_decrease_dimension(&mut self, v: VertexKey, star: VertexKey) {
        assert!(self.current_dimension() >= -1, "nothing to remove");
        assert!(self.is_vertex(v), "dead vertex key");
        assert!(self.is_vertex(star), "dead star vertex key");
        match self.current_dimension() {
            -1 => self.clear(),
            0 => {
                let cell = self.full_cell_of(v);
                self.delete_full_cell(cell);
                self.delete_vertex(v);
                let star_cell = self.full_cell_of(star);
                self.clear_neighbor_slot(star_cell, 0);
                self.set_current_dimension(-1);
            }
            1 => self.remove_decrease_dimension_from_1(v, star),
            _ => self.remove_decrease_dimension_general(v, star),
        }
        debug!(current_dimension = self.current_dimension(), "dimension decreased");
    }

    /// Teardown from dimension 1: three edges around the circle collapse to
    /// the two-cell 0-sphere on `star` and the surviving finite vertex.
    fn remove_decrease_dimension_from_1(&mut self, v: VertexKey, star: VertexKey) {
        let mut s = self.full_cell_of(v);
        if let Some(star_slot) = self.get_full_cell(s).expect("live").index_of(star) {
            s = self.neighbor(s, star_slot);
        }
        // here `star` is not a vertex of `s`, so it's the only finite cell
        let inf1 = self.neighbor(s, 0);
        let inf2 = self.neighbor(s, 1);
        let v_slot = self
            .get_full_cell(s)
            .expect("live")
            .index_of(v)
            .expect("the finite cell contains v");
        let v2 = self.vertex(s, 1 - v_slot);
        self.delete_vertex(v);
        self.delete_full_cell(s);
        // null both second slots on both infinite cells, vertex and link
        self.clear_vertex_slot(inf1, 1);
        self.clear_neighbor_slot(inf1, 1);
        self.clear_vertex_slot(inf2, 1);
        self.clear_neighbor_slot(inf2, 1);
        self.associate_vertex_with_full_cell(inf1, 0, star);
        self.associate_vertex_with_full_cell(inf2, 0, v2);
        self.set_neighbors(inf1, 0, inf2, 0);
        self.set_current_dimension(0);
    }

    /// Teardown from dimension at least 2.
    fn remove_decrease_dimension_general(&mut self, v: VertexKey, star: VertexKey) {
        let dcur = self.current_dimension() as usize;
        let simps = self.incident_full_cells_of_vertex(v);
        for &s in &simps {
            let v_slot = self
                .get_full_cell(s)
                .expect("gathered cell is live")
                .index_of(v)
                .expect("gathered cell contains v");
            if self.get_full_cell(s).expect("live").has_vertex(star) {
                self.get_vertex_mut(star).expect("live").full_cell = Some(s);
            } else {
                // the cell across the facet opposite v is a twin outside the
                // surviving sub-complex
                let twin = self.neighbor(s, v_slot);
                self.delete_full_cell(twin);
                for i in 0..=dcur {
                    let w = self.vertex(s, i);
                    self.get_vertex_mut(w).expect("live").full_cell = Some(s);
                }
            }
            if v_slot != dcur {
                self.swap_vertices(s, v_slot, dcur);
                if !self.get_full_cell(s).expect("live").has_vertex(star) || dcur > 2 {
                    self.swap_vertices(s, dcur - 2, dcur - 1);
                }
            }
            self.clear_vertex_slot(s, dcur);
            self.clear_neighbor_slot(s, dcur);
        }
        self.set_current_dimension(dcur as i32 - 1);
        self.delete_vertex(v);
    }
}

// =============================================================================
// TESTS
// =============================================================================
