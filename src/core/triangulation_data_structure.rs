//! The combinatorial triangulation data structure.
//!
//! [`Tds`] owns the two entity stores — vertices and full cells, each in a
//! [`SlotMap`] so handles stay stable across allocation and deletion — plus
//! the current dimension of the complex. Everything else in the crate is
//! expressed through the primitives defined here:
//!
//! - **Bookkeeping** — [`Tds::associate_vertex_with_full_cell`] and
//!   [`Tds::set_neighbors`] are the only mutators of vertex slots and
//!   neighbor links, so the maintenance of the structural invariants is
//!   centralized and auditable.
//! - **Facet and rotor navigation** — [`Tds::rotate_rotor`] walks around a
//!   codimension-2 face; [`Tds::is_boundary_facet`] tests a facet against the
//!   marked region during hole insertion.
//! - **Validation** — [`Tds::is_valid`] checks the pseudo-manifold
//!   invariants: slot layout, neighbor symmetry, the shared-facet rule,
//!   vertex incidence, and mark discipline.
//! - **Serialization** — serde impls produce the flat index-based layout
//!   (dimension, vertex payloads, per-cell vertex indices and payloads,
//!   per-cell neighbor indices); mirror indices and vertex back-pointers are
//!   reconstructed on read. [`Tds::write_graph`] emits the 1-skeleton as
//!   text.
//!
//! The current dimension starts at −2 (empty), moves to −1 when the first
//! vertex arrives with its placeholder cell, and from 0 upward the complex is
//! a triangulated sphere of that dimension. The update operations live in
//! [`crate::core::algorithms`].

// =============================================================================
// IMPORTS
// =============================================================================

use std::collections::BTreeSet;
use std::io::{self, Write};

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::{
    collections::{FacetIndex, FastHashMap, SlotBuffer},
    face::Face,
    facet::{Facet, Rotor},
    full_cell::{FullCell, FullCellValidationError},
    traits::data_type::DataType,
    vertex::{Vertex, VertexValidationError},
};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during triangulation validation.
///
/// Each variant corresponds to one structural invariant of the complex.
/// [`Tds::is_valid`] returns the first violation it finds and logs a warning
/// through [`tracing`] for each failed check.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TriangulationValidationError {
    /// The complex claims to be empty but the stores are not.
    #[error("current dimension is -2 but there are vertices or full cells")]
    UnexpectedEntities,
    /// A −1-dimensional complex must be exactly one vertex and one cell.
    #[error(
        "current dimension is -1 but there is not exactly one vertex and one full cell (found {vertices} and {full_cells})"
    )]
    NotASingletonComplex {
        /// The number of vertices found.
        vertices: usize,
        /// The number of full cells found.
        full_cells: usize,
    },
    /// A vertex failed its own validation.
    #[error("Invalid vertex {uuid}: {source}")]
    InvalidVertex {
        /// The UUID of the invalid vertex.
        uuid: Uuid,
        /// The underlying vertex validation error.
        source: VertexValidationError,
    },
    /// The full cell a vertex points to does not contain that vertex.
    #[error("the full cell incident to vertex {uuid} does not contain that vertex")]
    IncidenceViolation {
        /// The UUID of the vertex whose back-pointer is wrong.
        uuid: Uuid,
    },
    /// A full cell failed its own validation.
    #[error("Invalid full cell {uuid}: {source}")]
    InvalidFullCell {
        /// The UUID of the invalid full cell.
        uuid: Uuid,
        /// The underlying full-cell validation error.
        source: FullCellValidationError,
    },
    /// A full cell's slots disagree with the current dimension: a live slot
    /// is empty or dangling, or a slot above the current dimension is set.
    #[error("full cell {uuid} violates the slot layout at slot {index} for current dimension {current_dimension}")]
    SlotViolation {
        /// The UUID of the offending full cell.
        uuid: Uuid,
        /// The current dimension of the complex.
        current_dimension: i32,
        /// The offending slot.
        index: usize,
    },
    /// A full cell has a null or dangling neighbor link.
    #[error("full cell {uuid} has a null or dangling neighbor at slot {index}")]
    NullNeighbor {
        /// The UUID of the offending full cell.
        uuid: Uuid,
        /// The slot with the missing neighbor.
        index: usize,
    },
    /// The neighbor relation is not symmetric.
    #[error("neighbor relation between full cells {uuid} and {neighbor_uuid} is not symmetric")]
    AsymmetricNeighbor {
        /// The UUID of the cell whose link is wrong.
        uuid: Uuid,
        /// The UUID of the neighbor across the bad link.
        neighbor_uuid: Uuid,
    },
    /// Two neighboring cells share too few vertices.
    #[error("too few shared vertices between neighboring full cells {uuid} and {neighbor_uuid}")]
    MissingSharedVertex {
        /// The UUID of the cell on the near side of the facet.
        uuid: Uuid,
        /// The UUID of the neighbor.
        neighbor_uuid: Uuid,
    },
    /// A traversal mark survived past the end of an operation.
    #[error("full cell {uuid} has a set traversal mark outside any operation")]
    UnclearedMark {
        /// The UUID of the still-marked cell.
        uuid: Uuid,
    },
}

// =============================================================================
// KEY TYPES
// =============================================================================

new_key_type! {
    /// Key type for accessing vertices in the vertex store.
    ///
    /// Keys are stable: allocating or freeing other vertices never
    /// invalidates an existing key, and key equality is the authoritative
    /// notion of "same vertex".
    pub struct VertexKey;
}

new_key_type! {
    /// Key type for accessing full cells in the cell store.
    ///
    /// Keys are stable: allocating or freeing other cells never invalidates
    /// an existing key, and key equality is the authoritative notion of
    /// "same full cell".
    pub struct CellKey;
}

// =============================================================================
// STRUCT DEFINITION
// =============================================================================

/// A pure triangulation of a topological sphere in dimension
/// `current_dimension`, embedded in ambient dimension `D`.
///
/// # Generic Parameters
///
/// * `U` - Vertex payload type (use `Option<()>` or `()` for no data)
/// * `V` - Full-cell payload type
/// * `D` - Ambient dimension; full cells have `D + 1` slots of which only the
///   first `current_dimension + 1` are live
///
/// # Usage
///
/// ```rust
/// use simplicial::core::triangulation_data_structure::Tds;
///
/// let mut tds: Tds<Option<()>, Option<()>, 3> = Tds::new();
/// let mut last = tds.insert_increase_dimension(None);
/// for _ in 0..4 {
///     last = tds.insert_increase_dimension(Some(last));
/// }
/// assert_eq!(tds.current_dimension(), 3);
/// assert_eq!(tds.number_of_full_cells(), 5); // boundary of a 4-simplex
/// assert!(tds.is_valid().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct Tds<U, V, const D: usize>
where
    U: DataType,
    V: DataType,
{
    /// Vertex store with stable keys.
    vertices: SlotMap<VertexKey, Vertex<U>>,
    /// Full-cell store with stable keys.
    full_cells: SlotMap<CellKey, FullCell<V>>,
    /// −2 = empty, −1 = a single vertex with its placeholder cell, d ≥ 0 = a
    /// triangulated (d−1)-sphere.
    current_dimension: i32,
}

// =============================================================================
// CONSTRUCTION & BASIC QUERIES
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Creates an empty complex: current dimension −2, both stores empty.
    ///
    /// # Panics
    ///
    /// Panics if `D` is zero; the ambient dimension must be positive.
    #[must_use]
    pub fn new() -> Self {
        assert!(D >= 1, "ambient dimension must be positive");
        Self {
            vertices: SlotMap::with_key(),
            full_cells: SlotMap::with_key(),
            current_dimension: -2,
        }
    }

    /// The ambient dimension `D`.
    #[must_use]
    pub const fn ambient_dimension(&self) -> i32 {
        D as i32
    }

    /// The current dimension of the full cells in the triangulation.
    #[must_use]
    pub const fn current_dimension(&self) -> i32 {
        self.current_dimension
    }

    /// Returns `true` when the complex is empty (current dimension −2).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current_dimension == -2
    }

    /// The number of live vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The number of live full cells.
    #[must_use]
    pub fn number_of_full_cells(&self) -> usize {
        self.full_cells.len()
    }

    /// Sets the current dimension.
    ///
    /// This is a low-level operation: it does not touch the stores, and a
    /// mismatched dimension makes the complex invalid. The update operations
    /// manage the dimension themselves.
    ///
    /// # Panics
    ///
    /// Panics if `d` is outside `-2..=D`.
    pub fn set_current_dimension(&mut self, d: i32) {
        assert!(
            (-2..=D as i32).contains(&d),
            "current dimension {d} outside -2..={D}"
        );
        self.current_dimension = d;
    }

    /// Deletes every vertex and full cell and resets the dimension to −2.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.full_cells.clear();
        self.current_dimension = -2;
    }

    /// Slot indices valid at the current dimension: only slot 0 below
    /// dimension 0, slots `0..=current_dimension` otherwise.
    pub(crate) fn check_range(&self, i: usize) -> bool {
        if self.current_dimension < 0 {
            i == 0
        } else {
            i <= self.current_dimension as usize
        }
    }
}

impl<U, V, const D: usize> Default for Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ENTITY MANAGEMENT
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Allocates a fresh vertex with no payload and no incident cell.
    pub fn new_vertex(&mut self) -> VertexKey {
        self.vertices.insert(Vertex::new())
    }

    /// Allocates a fresh vertex carrying `data`.
    pub fn new_vertex_with_data(&mut self, data: U) -> VertexKey {
        self.vertices.insert(Vertex::with_data(data))
    }

    /// Frees a vertex. The key becomes invalid; no cell slots are touched.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a live vertex.
    pub fn delete_vertex(&mut self, v: VertexKey) {
        assert!(self.vertices.remove(v).is_some(), "deleting a dead vertex");
    }

    /// Allocates a fresh full cell with `D + 1` empty slots.
    pub fn new_full_cell(&mut self) -> CellKey {
        self.full_cells.insert(FullCell::empty(D + 1))
    }

    /// Allocates a full cell copying `s`'s slots and payload, with a fresh
    /// UUID and a clear mark.
    pub(crate) fn new_full_cell_from(&mut self, s: CellKey) -> CellKey {
        let copy = FullCell::copied_from(&self.full_cells[s]);
        self.full_cells.insert(copy)
    }

    /// Frees a full cell. The key becomes invalid; neighbor links pointing at
    /// it are not touched.
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a live full cell.
    pub fn delete_full_cell(&mut self, s: CellKey) {
        assert!(self.full_cells.remove(s).is_some(), "deleting a dead full cell");
    }

    /// Frees every full cell in `cells`.
    ///
    /// # Panics
    ///
    /// Panics if any of the keys is not a live full cell.
    pub fn delete_full_cells(&mut self, cells: impl IntoIterator<Item = CellKey>) {
        for s in cells {
            self.delete_full_cell(s);
        }
    }

    /// Returns `true` if `v` is a live vertex of this complex.
    #[must_use]
    pub fn is_vertex(&self, v: VertexKey) -> bool {
        self.vertices.contains_key(v)
    }

    /// Returns `true` if `s` is a live full cell of this complex.
    #[must_use]
    pub fn is_full_cell(&self, s: CellKey) -> bool {
        self.full_cells.contains_key(s)
    }

    /// Borrows a vertex, or `None` for a dead key.
    #[must_use]
    pub fn get_vertex(&self, v: VertexKey) -> Option<&Vertex<U>> {
        self.vertices.get(v)
    }

    /// Mutably borrows a vertex (for payload edits), or `None` for a dead
    /// key.
    pub fn get_vertex_mut(&mut self, v: VertexKey) -> Option<&mut Vertex<U>> {
        self.vertices.get_mut(v)
    }

    /// Borrows a full cell, or `None` for a dead key.
    #[must_use]
    pub fn get_full_cell(&self, s: CellKey) -> Option<&FullCell<V>> {
        self.full_cells.get(s)
    }

    /// Mutably borrows a full cell (for payload edits), or `None` for a dead
    /// key.
    pub fn get_full_cell_mut(&mut self, s: CellKey) -> Option<&mut FullCell<V>> {
        self.full_cells.get_mut(s)
    }

    /// Iterates over the live vertices in unspecified but stable order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex<U>)> {
        self.vertices.iter()
    }

    /// Iterates over the live vertex keys.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.keys()
    }

    /// Iterates over the live full cells in unspecified but stable order.
    pub fn full_cells(&self) -> impl Iterator<Item = (CellKey, &FullCell<V>)> {
        self.full_cells.iter()
    }

    /// Iterates over the live full-cell keys.
    pub fn full_cell_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.full_cells.keys()
    }
}

// =============================================================================
// SLOT QUERIES
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// The vertex in slot `i` of full cell `s`.
    ///
    /// # Panics
    ///
    /// Panics if `s` is dead, `i` is out of range for the current dimension,
    /// or the slot is empty.
    #[must_use]
    pub fn vertex(&self, s: CellKey, i: usize) -> VertexKey {
        assert!(self.check_range(i), "slot {i} out of range");
        self.full_cells[s].vertex(i).expect("empty live vertex slot")
    }

    /// The neighbor of full cell `s` across facet `i`.
    ///
    /// # Panics
    ///
    /// Panics if `s` is dead, `i` is out of range, or the link is unset.
    #[must_use]
    pub fn neighbor(&self, s: CellKey, i: usize) -> CellKey {
        assert!(self.check_range(i), "slot {i} out of range");
        self.full_cells[s].neighbor(i).expect("unset neighbor link")
    }

    /// The slot `s` occupies inside its neighbor across facet `i`.
    ///
    /// # Panics
    ///
    /// Panics if `s` is dead, `i` is out of range, or the link is unset.
    #[must_use]
    pub fn mirror_index(&self, s: CellKey, i: usize) -> usize {
        assert!(self.check_range(i), "slot {i} out of range");
        self.full_cells[s].mirror_index(i).expect("unset mirror index") as usize
    }

    /// The vertex of `s`'s neighbor across facet `i` that is *not* shared
    /// with `s` — the vertex opposite `s` in that neighbor.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Tds::neighbor`] and
    /// [`Tds::mirror_index`].
    #[must_use]
    pub fn mirror_vertex(&self, s: CellKey, i: usize) -> VertexKey {
        let n = self.neighbor(s, i);
        let l = self.mirror_index(s, i);
        self.vertex(n, l)
    }

    /// The full cell a vertex points back to.
    ///
    /// # Panics
    ///
    /// Panics if `v` is dead or not wired into a cell yet.
    #[must_use]
    pub fn full_cell_of(&self, v: VertexKey) -> CellKey {
        self.vertices[v].full_cell.expect("vertex has no incident cell")
    }

    /// The vertex selected by `f`'s `i`-th index.
    ///
    /// # Panics
    ///
    /// Panics if the face's cell is dead or the selected slot is not live.
    #[must_use]
    pub fn face_vertex(&self, f: &Face, i: usize) -> VertexKey {
        self.vertex(f.full_cell(), f.index(i))
    }

    /// The vertices of a face, in face-index order.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Tds::face_vertex`].
    #[must_use]
    pub fn face_vertices(&self, f: &Face) -> SlotBuffer<VertexKey> {
        f.indices().map(|i| self.vertex(f.full_cell(), i)).collect()
    }
}

// =============================================================================
// BOOKKEEPING PRIMITIVES
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Puts vertex `v` into slot `i` of full cell `s` and points `v`'s
    /// back-pointer at `s`.
    ///
    /// # Panics
    ///
    /// Panics if either key is dead or `i` is out of range for the current
    /// dimension.
    pub fn associate_vertex_with_full_cell(&mut self, s: CellKey, i: usize, v: VertexKey) {
        assert!(self.check_range(i), "slot {i} out of range");
        assert!(self.vertices.contains_key(v), "dead vertex key");
        self.full_cells[s].set_vertex(i, Some(v));
        self.vertices[v].full_cell = Some(s);
    }

    /// Links `s` and `s1` as neighbors across facets `i` and `j`, recording
    /// the mirror indices on both sides.
    ///
    /// # Panics
    ///
    /// Panics if either key is dead or either slot is out of range.
    pub fn set_neighbors(&mut self, s: CellKey, i: usize, s1: CellKey, j: usize) {
        assert!(self.check_range(i), "slot {i} out of range");
        assert!(self.check_range(j), "slot {j} out of range");
        assert!(self.full_cells.contains_key(s1), "dead full cell key");
        {
            let cell = &mut self.full_cells[s];
            cell.set_neighbor(i, Some(s1));
            cell.set_mirror_index(i, Some(j as FacetIndex));
        }
        let cell1 = &mut self.full_cells[s1];
        cell1.set_neighbor(j, Some(s));
        cell1.set_mirror_index(j, Some(i as FacetIndex));
    }

    /// Empties vertex slot `i` of `s` without touching any back-pointer.
    pub(crate) fn clear_vertex_slot(&mut self, s: CellKey, i: usize) {
        self.full_cells[s].set_vertex(i, None);
    }

    /// Unsets the neighbor link and mirror index at slot `i` of `s`. The
    /// reciprocal link, if any, is not touched.
    pub(crate) fn clear_neighbor_slot(&mut self, s: CellKey, i: usize) {
        let cell = &mut self.full_cells[s];
        cell.set_neighbor(i, None);
        cell.set_mirror_index(i, None);
    }

    /// Swaps slots `i` and `j` of `s` — vertices, neighbor links and mirror
    /// indices move together — and repairs the two neighbors' reciprocal
    /// mirror indices. Neighbors that are unset or already deleted are left
    /// alone.
    pub(crate) fn swap_vertices(&mut self, s: CellKey, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.full_cells[s].swap_slot_storage(i, j);
        for slot in [i, j] {
            let (n, m) = {
                let cell = &self.full_cells[s];
                (cell.neighbor(slot), cell.mirror_index(slot))
            };
            if let (Some(n), Some(m)) = (n, m) {
                if let Some(neighbor) = self.full_cells.get_mut(n) {
                    neighbor.set_mirror_index(m as usize, Some(slot as FacetIndex));
                }
            }
        }
    }

    pub(crate) fn get_visited(&self, s: CellKey) -> bool {
        self.full_cells[s].mark().is_visited()
    }

    pub(crate) fn set_visited(&mut self, s: CellKey, visited: bool) {
        let mark = self.full_cells[s].mark_mut();
        if visited {
            mark.mark_visited();
        } else {
            mark.clear_visited();
        }
    }
}

// =============================================================================
// FACET & ROTOR NAVIGATION
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Tests whether a facet lies on the boundary of the currently marked
    /// region: its cell is marked visited and the neighbor across it is not.
    ///
    /// Only meaningful while a hole-insertion operation holds marks.
    #[must_use]
    pub fn is_boundary_facet(&self, f: &Facet) -> bool {
        if self.get_visited(self.neighbor(f.full_cell(), f.index_of_covertex())) {
            return false;
        }
        self.get_visited(f.full_cell())
    }

    /// Produces the next rotor around the same (d−2)-face: crosses the facet
    /// opposite the first covertex and re-addresses the pivot vertex in the
    /// cell on the other side.
    ///
    /// Iterating from any rotor returns to it after exactly as many steps as
    /// there are full cells around the (d−2)-face.
    ///
    /// # Panics
    ///
    /// Panics if the rotor's links are unset or the pivot vertex is missing
    /// from the neighbor, which cannot happen on a valid complex.
    #[must_use]
    pub fn rotate_rotor(&self, f: &Rotor) -> Rotor {
        let opposite = self.mirror_index(f.full_cell(), f.index_of_covertex());
        let s = self.neighbor(f.full_cell(), f.index_of_covertex());
        let pivot = self.vertex(f.full_cell(), f.index_of_second_covertex());
        let new_second = self.full_cells[s]
            .index_of(pivot)
            .expect("pivot vertex missing from the next cell around the rotor");
        Rotor::new(s, new_second as FacetIndex, opposite as FacetIndex)
    }

    /// Iterates over every facet of the complex exactly once, addressed
    /// through the incident cell with the smaller key. Empty below dimension
    /// 1.
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        let slots = if self.current_dimension > 0 {
            self.current_dimension as usize + 1
        } else {
            0
        };
        self.full_cells.iter().flat_map(move |(key, cell)| {
            (0..slots).filter_map(move |i| {
                let n = cell.neighbor(i)?;
                (key < n).then(|| Facet::new(key, i as FacetIndex))
            })
        })
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Partially checks whether this is an abstract simplicial complex.
    ///
    /// This function succeeds if each vertex is a vertex of the full cell of
    /// which it claims to be a vertex, if the vertices of all full cells are
    /// pairwise distinct, if the neighbor relation is symmetric with
    /// consistent mirror indices, if neighboring full cells share exactly
    /// `current_dimension` vertices, and if every traversal mark is clear.
    /// Note that it is not checked whether full cells that share
    /// `current_dimension` vertices are neighbors in the data structure.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant; a [`tracing`] warning is emitted
    /// for it as well.
    pub fn is_valid(&self) -> Result<(), TriangulationValidationError> {
        self.validate_counts()?;
        self.validate_vertices()?;
        self.validate_marks()?;
        if self.current_dimension < 0 {
            return Ok(());
        }
        self.validate_cells()?;
        self.validate_neighbors()
    }

    fn validate_counts(&self) -> Result<(), TriangulationValidationError> {
        if self.current_dimension == -2
            && (!self.vertices.is_empty() || !self.full_cells.is_empty())
        {
            warn!("current dimension is -2 but there are vertices or full cells");
            return Err(TriangulationValidationError::UnexpectedEntities);
        }
        if self.current_dimension == -1
            && (self.number_of_vertices() != 1 || self.number_of_full_cells() != 1)
        {
            warn!("current dimension is -1 but the complex is not a single vertex with its cell");
            return Err(TriangulationValidationError::NotASingletonComplex {
                vertices: self.number_of_vertices(),
                full_cells: self.number_of_full_cells(),
            });
        }
        Ok(())
    }

    fn validate_vertices(&self) -> Result<(), TriangulationValidationError> {
        let fake_dcur = self.current_dimension.max(0) as usize;
        for (vk, vertex) in &self.vertices {
            vertex.is_valid().map_err(|source| {
                warn!(vertex = %vertex.uuid(), "invalid vertex: {source}");
                TriangulationValidationError::InvalidVertex {
                    uuid: vertex.uuid(),
                    source,
                }
            })?;
            // check that the vertex's full cell actually contains it
            let contains = vertex
                .full_cell()
                .and_then(|ck| self.full_cells.get(ck))
                .is_some_and(|cell| (0..=fake_dcur).any(|i| cell.vertex(i) == Some(vk)));
            if !contains {
                warn!(
                    vertex = %vertex.uuid(),
                    "the full cell incident to some vertex does not contain that vertex"
                );
                return Err(TriangulationValidationError::IncidenceViolation {
                    uuid: vertex.uuid(),
                });
            }
        }
        Ok(())
    }

    fn validate_marks(&self) -> Result<(), TriangulationValidationError> {
        for (_, cell) in &self.full_cells {
            if !cell.mark().is_clear() {
                warn!(cell = %cell.uuid(), "a traversal mark survived past an operation");
                return Err(TriangulationValidationError::UnclearedMark { uuid: cell.uuid() });
            }
        }
        Ok(())
    }

    fn validate_cells(&self) -> Result<(), TriangulationValidationError> {
        let dcur = self.current_dimension as usize;
        for (_, cell) in &self.full_cells {
            cell.is_valid().map_err(|source| {
                warn!(cell = %cell.uuid(), "invalid full cell: {source}");
                TriangulationValidationError::InvalidFullCell {
                    uuid: cell.uuid(),
                    source,
                }
            })?;
            for i in 0..=D {
                let live = i <= dcur;
                let valid_slot = match cell.vertex(i) {
                    Some(v) => live && self.vertices.contains_key(v),
                    None => !live,
                };
                if !valid_slot {
                    warn!(cell = %cell.uuid(), slot = i, "slot layout violation");
                    return Err(TriangulationValidationError::SlotViolation {
                        uuid: cell.uuid(),
                        current_dimension: self.current_dimension,
                        index: i,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_neighbors(&self) -> Result<(), TriangulationValidationError> {
        let dcur = self.current_dimension as usize;
        for (sk, cell) in &self.full_cells {
            for i in 0..=dcur {
                let (Some(tk), Some(l)) = (cell.neighbor(i), cell.mirror_index(i)) else {
                    warn!(cell = %cell.uuid(), slot = i, "full cell has a null neighbor");
                    return Err(TriangulationValidationError::NullNeighbor {
                        uuid: cell.uuid(),
                        index: i,
                    });
                };
                let l = l as usize;
                let Some(neighbor) = self.full_cells.get(tk) else {
                    warn!(cell = %cell.uuid(), slot = i, "full cell has a dangling neighbor");
                    return Err(TriangulationValidationError::NullNeighbor {
                        uuid: cell.uuid(),
                        index: i,
                    });
                };
                if neighbor.neighbor(l) != Some(sk)
                    || neighbor.mirror_index(l) != Some(i as FacetIndex)
                {
                    warn!(
                        cell = %cell.uuid(),
                        neighbor = %neighbor.uuid(),
                        "neighbor relation is not symmetric"
                    );
                    return Err(TriangulationValidationError::AsymmetricNeighbor {
                        uuid: cell.uuid(),
                        neighbor_uuid: neighbor.uuid(),
                    });
                }
                // every other vertex of the cell must occur in the neighbor,
                // away from the mirror slot
                for j in (0..=dcur).filter(|&j| j != i) {
                    let shared = (0..=dcur)
                        .any(|k| k != l && neighbor.vertex(k) == cell.vertex(j));
                    if !shared {
                        warn!(
                            cell = %cell.uuid(),
                            neighbor = %neighbor.uuid(),
                            "too few shared vertices between neighboring full cells"
                        );
                        return Err(TriangulationValidationError::MissingSharedVertex {
                            uuid: cell.uuid(),
                            neighbor_uuid: neighbor.uuid(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// GRAPH EXPORT
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Writes the 1-skeleton of the complex as text: the vertex count
    /// including one implicit "infinity" vertex at index 0, then one line per
    /// vertex with its distinct-neighbor count followed by the sorted
    /// neighbor indices. Empty vertex slots contribute index 0.
    ///
    /// # Errors
    ///
    /// Propagates any error from the underlying writer.
    pub fn write_graph<W: Write>(&self, os: &mut W) -> io::Result<()> {
        let total = self.number_of_vertices() + 1; // add the vertex at infinity
        let mut index_of_vertex: FastHashMap<VertexKey, usize> = FastHashMap::default();
        for (count, vk) in self.vertices.keys().enumerate() {
            index_of_vertex.insert(vk, count + 1);
        }

        let mut edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); total];
        if self.current_dimension > 0 {
            let dcur = self.current_dimension as usize;
            for (_, cell) in &self.full_cells {
                for v1 in 0..dcur {
                    for v2 in (v1 + 1)..=dcur {
                        let i1 = cell.vertex(v1).map_or(0, |k| index_of_vertex[&k]);
                        let i2 = cell.vertex(v2).map_or(0, |k| index_of_vertex[&k]);
                        edges[i1].insert(i2);
                        edges[i2].insert(i1);
                    }
                }
            }
        }

        write!(os, "{total}")?;
        for neighbors in &edges {
            write!(os, "\n{}", neighbors.len())?;
            for n in neighbors {
                write!(os, " {n}")?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// One full cell in the flat stream: the indices of its live vertices into
/// the vertex list, then its payload.
#[derive(Serialize, Deserialize)]
struct FullCellRecord<V> {
    vertices: Vec<usize>,
    data: Option<V>,
}

impl<U, V, const D: usize> Serialize for Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut vertex_index: FastHashMap<VertexKey, usize> = FastHashMap::default();
        let mut payloads: Vec<&Option<U>> = Vec::with_capacity(self.number_of_vertices());
        for (i, (vk, vertex)) in self.vertices.iter().enumerate() {
            vertex_index.insert(vk, i);
            payloads.push(&vertex.data);
        }

        let mut cell_index: FastHashMap<CellKey, usize> = FastHashMap::default();
        for (i, ck) in self.full_cells.keys().enumerate() {
            cell_index.insert(ck, i);
        }

        let live_slots = if self.current_dimension >= -1 {
            self.current_dimension.max(0) as usize + 1
        } else {
            0
        };
        let mut cells: Vec<FullCellRecord<&V>> =
            Vec::with_capacity(self.number_of_full_cells());
        let mut neighbors: Vec<Vec<usize>> = Vec::with_capacity(self.number_of_full_cells());
        for (_, cell) in &self.full_cells {
            let indices = (0..live_slots)
                .map(|i| {
                    cell.vertex(i)
                        .map(|v| vertex_index[&v])
                        .ok_or_else(|| serde::ser::Error::custom("empty live vertex slot"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(FullCellRecord {
                vertices: indices,
                data: cell.data.as_ref(),
            });
            // neighbor links exist only from dimension 0 upward
            let row = if self.current_dimension >= 0 {
                (0..live_slots)
                    .map(|i| {
                        cell.neighbor(i)
                            .map(|n| cell_index[&n])
                            .ok_or_else(|| serde::ser::Error::custom("unset neighbor link"))
                    })
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                Vec::new()
            };
            neighbors.push(row);
        }

        let mut state = serializer.serialize_struct("Tds", 4)?;
        state.serialize_field("current_dimension", &self.current_dimension)?;
        state.serialize_field("vertices", &payloads)?;
        state.serialize_field("full_cells", &cells)?;
        state.serialize_field("neighbors", &neighbors)?;
        state.end()
    }
}

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Rebuilds a complex from the flat stream pieces: allocates the
    /// entities, wires vertex slots and back-pointers, sets neighbor links,
    /// and reconstructs every mirror index by scanning the neighbor's slots
    /// for the reciprocal link.
    fn from_stream_parts(
        current_dimension: i32,
        payloads: Vec<Option<U>>,
        cells: Vec<FullCellRecord<V>>,
        neighbors: Vec<Vec<usize>>,
    ) -> Result<Self, String> {
        if !(-2..=D as i32).contains(&current_dimension) {
            return Err(format!(
                "current dimension {current_dimension} outside -2..={D}"
            ));
        }
        let mut tds = Self::new();
        tds.current_dimension = current_dimension;

        let vertex_keys: Vec<VertexKey> = payloads
            .into_iter()
            .map(|data| {
                let vk = tds.new_vertex();
                tds.vertices[vk].data = data;
                vk
            })
            .collect();

        let live_slots = if current_dimension >= -1 {
            current_dimension.max(0) as usize + 1
        } else {
            0
        };
        let mut cell_keys: Vec<CellKey> = Vec::with_capacity(cells.len());
        for record in cells {
            if record.vertices.len() != live_slots {
                return Err(format!(
                    "full cell lists {} vertices; expected {live_slots}",
                    record.vertices.len()
                ));
            }
            let ck = tds.new_full_cell();
            for (i, &vi) in record.vertices.iter().enumerate() {
                let vk = *vertex_keys
                    .get(vi)
                    .ok_or_else(|| format!("vertex index {vi} out of range"))?;
                tds.full_cells[ck].set_vertex(i, Some(vk));
                tds.vertices[vk].full_cell = Some(ck);
            }
            tds.full_cells[ck].data = record.data;
            cell_keys.push(ck);
        }

        if current_dimension >= 0 {
            if neighbors.len() != cell_keys.len() {
                return Err(format!(
                    "{} neighbor rows for {} full cells",
                    neighbors.len(),
                    cell_keys.len()
                ));
            }
            for (ci, row) in neighbors.iter().enumerate() {
                if row.len() != live_slots {
                    return Err(format!(
                        "neighbor row lists {} links; expected {live_slots}",
                        row.len()
                    ));
                }
                for (i, &ni) in row.iter().enumerate() {
                    let nk = *cell_keys
                        .get(ni)
                        .ok_or_else(|| format!("full cell index {ni} out of range"))?;
                    tds.full_cells[cell_keys[ci]].set_neighbor(i, Some(nk));
                }
            }
            // reconstruct the mirror indices from the reciprocal links
            for &ck in &cell_keys {
                for i in 0..live_slots {
                    if tds.full_cells[ck].mirror_index(i).is_some() {
                        continue;
                    }
                    let nk = tds.full_cells[ck]
                        .neighbor(i)
                        .expect("neighbor links were just set");
                    let l = (0..live_slots)
                        .find(|&l| {
                            tds.full_cells[nk].neighbor(l) == Some(ck)
                                && tds.full_cells[nk].mirror_index(l).is_none()
                        })
                        .ok_or_else(|| "neighbor links are not reciprocal".to_string())?;
                    tds.full_cells[ck].set_mirror_index(i, Some(l as FacetIndex));
                    tds.full_cells[nk].set_mirror_index(l, Some(i as FacetIndex));
                }
            }
        }
        Ok(tds)
    }
}

impl<'de, U, V, const D: usize> Deserialize<'de> for Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        struct TdsVisitor<U, V, const D: usize> {
            _phantom: std::marker::PhantomData<(U, V)>,
        }

        impl<'de, U, V, const D: usize> Visitor<'de> for TdsVisitor<U, V, D>
        where
            U: DataType,
            V: DataType,
        {
            type Value = Tds<U, V, D>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a Tds stream")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut current_dimension: Option<i32> = None;
                let mut payloads: Option<Vec<Option<U>>> = None;
                let mut cells: Option<Vec<FullCellRecord<V>>> = None;
                let mut neighbors: Option<Vec<Vec<usize>>> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "current_dimension" => {
                            if current_dimension.is_some() {
                                return Err(de::Error::duplicate_field("current_dimension"));
                            }
                            current_dimension = Some(map.next_value()?);
                        }
                        "vertices" => {
                            if payloads.is_some() {
                                return Err(de::Error::duplicate_field("vertices"));
                            }
                            payloads = Some(map.next_value()?);
                        }
                        "full_cells" => {
                            if cells.is_some() {
                                return Err(de::Error::duplicate_field("full_cells"));
                            }
                            cells = Some(map.next_value()?);
                        }
                        "neighbors" => {
                            if neighbors.is_some() {
                                return Err(de::Error::duplicate_field("neighbors"));
                            }
                            neighbors = Some(map.next_value()?);
                        }
                        _ => {
                            let _ = map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                let current_dimension = current_dimension
                    .ok_or_else(|| de::Error::missing_field("current_dimension"))?;
                let payloads = payloads.ok_or_else(|| de::Error::missing_field("vertices"))?;
                let cells = cells.ok_or_else(|| de::Error::missing_field("full_cells"))?;
                let neighbors = neighbors.ok_or_else(|| de::Error::missing_field("neighbors"))?;

                Tds::from_stream_parts(current_dimension, payloads, cells, neighbors)
                    .map_err(de::Error::custom)
            }
        }

        const FIELDS: &[&str] = &["current_dimension", "vertices", "full_cells", "neighbors"];
        deserializer.deserialize_struct(
            "Tds",
            FIELDS,
            TdsVisitor {
                _phantom: std::marker::PhantomData,
            },
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
