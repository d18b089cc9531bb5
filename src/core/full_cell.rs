//! Data and operations on full cells, the top-dimensional simplices of the
//! triangulation.
//!
//! A full cell of current dimension d is an *ordered* array of `D + 1` vertex
//! slots of which only positions `0..=d` are live, together with one neighbor
//! slot per facet and the **mirror index** bookkeeping that records where
//! this cell sits inside each neighbor. A one-byte traversal mark supports
//! the breadth-first gathering operations.
//!
//! Slots, neighbors and mirror indices are only ever mutated through the
//! bookkeeping primitives on
//! [`Tds`](crate::core::triangulation_data_structure::Tds), which keeps the
//! structural invariants auditable in one place.

use super::{
    collections::{FacetIndex, SlotBuffer},
    traits::DataType,
    triangulation_data_structure::{CellKey, VertexKey},
    util::{UuidValidationError, make_uuid, validate_uuid},
};
use smallvec::smallvec;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during full-cell validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FullCellValidationError {
    /// The full cell has an invalid UUID.
    #[error("Invalid UUID: {source}")]
    InvalidUuid {
        /// The underlying UUID validation error.
        #[from]
        source: UuidValidationError,
    },
    /// The full cell lists the same vertex in two slots.
    #[error("Duplicate vertex in slots {first} and {second}")]
    DuplicateVertex {
        /// The first slot holding the vertex.
        first: usize,
        /// The second slot holding the same vertex.
        second: usize,
    },
}

// =============================================================================
// TRAVERSAL MARK
// =============================================================================

/// One-byte per-cell mark used by the gathering operations.
///
/// Outside any mark-using operation every cell's mark is clear; each
/// operation that sets marks is responsible for clearing them before it
/// returns (or for deleting the marked cells outright, as hole insertion
/// does).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TraversalMark(u8);

impl TraversalMark {
    /// Returns `true` when the mark carries no state at all.
    #[must_use]
    pub const fn is_clear(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` when the cell is marked visited.
    #[must_use]
    pub const fn is_visited(self) -> bool {
        self.0 == 1
    }

    pub(crate) fn mark_visited(&mut self) {
        self.0 = 1;
    }

    pub(crate) fn clear_visited(&mut self) {
        self.0 = 0;
    }
}

// =============================================================================
// FULL CELL STRUCT DEFINITION
// =============================================================================

/// A top-dimensional simplex: `D + 1` ordered vertex slots, the neighbor
/// links across its facets, and the mirror indices tying the two together.
///
/// # Generic Parameters
///
/// * `V` - User payload type that implements [`DataType`] (use `()` for no
///   data)
///
/// # Slot layout
///
/// For a complex of current dimension d, slots `0..=d` hold vertices and
/// slots `d+1..=D` hold `None`. The neighbor across facet `i` (the facet
/// opposite slot `i`) sits in neighbor slot `i`, and `mirror_index(i)` is the
/// slot this cell occupies in that neighbor's neighbor array.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FullCell<V>
where
    V: DataType,
{
    /// A universally unique identifier for the full cell.
    uuid: Uuid,
    /// Vertex slots, one per corner. `None` above the current dimension.
    vertices: SlotBuffer<Option<VertexKey>>,
    /// Neighbor slots, one per facet.
    neighbors: SlotBuffer<Option<CellKey>>,
    /// `mirrors[i]` is the slot this cell occupies inside `neighbors[i]`.
    mirrors: SlotBuffer<Option<FacetIndex>>,
    /// Transient traversal mark; clear between operations.
    mark: TraversalMark,
    /// Optional payload associated with the full cell.
    pub data: Option<V>,
}

// =============================================================================
// FULL CELL IMPLEMENTATION
// =============================================================================

impl<V> FullCell<V>
where
    V: DataType,
{
    /// Creates a cell with `slots` empty vertex/neighbor/mirror slots.
    pub(crate) fn empty(slots: usize) -> Self {
        Self {
            uuid: make_uuid(),
            vertices: smallvec![None; slots],
            neighbors: smallvec![None; slots],
            mirrors: smallvec![None; slots],
            mark: TraversalMark::default(),
            data: None,
        }
    }

    /// Creates a cell copying another cell's slots and payload.
    ///
    /// The copy gets a fresh UUID and a clear mark; insertion operations use
    /// this to duplicate a cell before re-pointing individual slots.
    pub(crate) fn copied_from(other: &Self) -> Self {
        Self {
            uuid: make_uuid(),
            vertices: other.vertices.clone(),
            neighbors: other.neighbors.clone(),
            mirrors: other.mirrors.clone(),
            mark: TraversalMark::default(),
            data: other.data.clone(),
        }
    }

    /// Returns the full cell's UUID.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Number of slots (always the ambient dimension plus one).
    #[must_use]
    pub fn number_of_slots(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the vertex in slot `i`, or `None` above the current dimension.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a slot of this cell.
    #[must_use]
    pub fn vertex(&self, i: usize) -> Option<VertexKey> {
        self.vertices[i]
    }

    /// Returns the neighbor across facet `i`, if linked.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a slot of this cell.
    #[must_use]
    pub fn neighbor(&self, i: usize) -> Option<CellKey> {
        self.neighbors[i]
    }

    /// Returns the slot this cell occupies inside its neighbor across facet
    /// `i`, if linked.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a slot of this cell.
    #[must_use]
    pub fn mirror_index(&self, i: usize) -> Option<FacetIndex> {
        self.mirrors[i]
    }

    /// Returns the slot holding vertex `v`, or `None` if `v` is not a corner
    /// of this cell.
    #[must_use]
    pub fn index_of(&self, v: VertexKey) -> Option<usize> {
        self.vertices.iter().position(|slot| *slot == Some(v))
    }

    /// Returns `true` if `v` is a corner of this cell.
    #[must_use]
    pub fn has_vertex(&self, v: VertexKey) -> bool {
        self.index_of(v).is_some()
    }

    /// Iterates over the live vertices of the cell in slot order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.iter().copied().flatten()
    }

    /// The cell's traversal mark.
    #[must_use]
    pub const fn mark(&self) -> TraversalMark {
        self.mark
    }

    pub(crate) fn mark_mut(&mut self) -> &mut TraversalMark {
        &mut self.mark
    }

    pub(crate) fn set_vertex(&mut self, i: usize, v: Option<VertexKey>) {
        self.vertices[i] = v;
    }

    pub(crate) fn set_neighbor(&mut self, i: usize, n: Option<CellKey>) {
        self.neighbors[i] = n;
    }

    pub(crate) fn set_mirror_index(&mut self, i: usize, m: Option<FacetIndex>) {
        self.mirrors[i] = m;
    }

    /// Swaps the storage of slots `i` and `j`: vertices, neighbors and mirror
    /// indices move together.
    ///
    /// The neighbors' reciprocal mirror entries are *not* touched here; the
    /// triangulation-level `swap_vertices` repairs them.
    pub(crate) fn swap_slot_storage(&mut self, i: usize, j: usize) {
        self.vertices.swap(i, j);
        self.neighbors.swap(i, j);
        self.mirrors.swap(i, j);
    }

    /// Checks the cell in isolation: a valid UUID and no repeated vertex.
    ///
    /// Neighbor symmetry and the shared-facet rule need both stores and are
    /// checked by the triangulation-level validation.
    ///
    /// # Errors
    ///
    /// Returns a [`FullCellValidationError`] describing the first failed
    /// check.
    pub fn is_valid(&self) -> Result<(), FullCellValidationError> {
        validate_uuid(&self.uuid)?;
        for (i, a) in self.vertices.iter().enumerate() {
            let Some(a) = a else { continue };
            for (j, b) in self.vertices.iter().enumerate().skip(i + 1) {
                if *b == Some(*a) {
                    return Err(FullCellValidationError::DuplicateVertex { first: i, second: j });
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn vertex_keys(n: usize) -> Vec<VertexKey> {
        let mut store: SlotMap<VertexKey, ()> = SlotMap::with_key();
        (0..n).map(|_| store.insert(())).collect()
    }

    #[test]
    fn empty_cell_has_no_live_slots() {
        let cell: FullCell<()> = FullCell::empty(4);
        assert_eq!(cell.number_of_slots(), 4);
        assert_eq!(cell.vertices().count(), 0);
        assert!(cell.mark().is_clear());
        assert!(cell.is_valid().is_ok());
    }

    #[test]
    fn copied_cell_gets_fresh_uuid_and_clear_mark() {
        let keys = vertex_keys(3);
        let mut cell: FullCell<u8> = FullCell::empty(3);
        cell.set_vertex(0, Some(keys[0]));
        cell.set_vertex(1, Some(keys[1]));
        cell.data = Some(7);
        cell.mark_mut().mark_visited();

        let copy = FullCell::copied_from(&cell);
        assert_ne!(copy.uuid(), cell.uuid());
        assert_eq!(copy.vertex(0), Some(keys[0]));
        assert_eq!(copy.vertex(1), Some(keys[1]));
        assert_eq!(copy.data, Some(7));
        assert!(copy.mark().is_clear());
        assert!(cell.mark().is_visited());
    }

    #[test]
    fn index_of_finds_slot() {
        let keys = vertex_keys(3);
        let mut cell: FullCell<()> = FullCell::empty(3);
        for (i, k) in keys.iter().enumerate() {
            cell.set_vertex(i, Some(*k));
        }
        assert_eq!(cell.index_of(keys[2]), Some(2));
        assert!(cell.has_vertex(keys[0]));
    }

    #[test]
    fn duplicate_vertex_is_reported() {
        let keys = vertex_keys(1);
        let mut cell: FullCell<()> = FullCell::empty(3);
        cell.set_vertex(0, Some(keys[0]));
        cell.set_vertex(2, Some(keys[0]));
        assert_eq!(
            cell.is_valid(),
            Err(FullCellValidationError::DuplicateVertex { first: 0, second: 2 })
        );
    }

    #[test]
    fn swap_slot_storage_moves_all_three_arrays() {
        let keys = vertex_keys(2);
        let mut cells: SlotMap<CellKey, ()> = SlotMap::with_key();
        let n0 = cells.insert(());
        let n1 = cells.insert(());

        let mut cell: FullCell<()> = FullCell::empty(2);
        cell.set_vertex(0, Some(keys[0]));
        cell.set_vertex(1, Some(keys[1]));
        cell.set_neighbor(0, Some(n0));
        cell.set_neighbor(1, Some(n1));
        cell.set_mirror_index(0, Some(0));
        cell.set_mirror_index(1, Some(1));

        cell.swap_slot_storage(0, 1);
        assert_eq!(cell.vertex(0), Some(keys[1]));
        assert_eq!(cell.vertex(1), Some(keys[0]));
        assert_eq!(cell.neighbor(0), Some(n1));
        assert_eq!(cell.neighbor(1), Some(n0));
        assert_eq!(cell.mirror_index(0), Some(1));
        assert_eq!(cell.mirror_index(1), Some(0));
    }
}
