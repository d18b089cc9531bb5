//! Faces: sub-simplices of arbitrary feature dimension.
//!
//! A [`Face`] selects k+1 vertices of one full cell by their slot positions,
//! describing a k-dimensional sub-simplex. Faces are the currency of the
//! star/incidence queries and of the face-insertion and face-collapse
//! operations.

use super::{collections::SlotBuffer, triangulation_data_structure::CellKey};

/// A sub-simplex of arbitrary feature dimension: a full cell plus the slot
/// positions of the vertices spanning the face inside that cell.
///
/// The feature dimension is implied by the number of set indices: a face with
/// one index is a vertex, with two an edge, and so on. Indices are appended
/// with [`set_index`](Face::set_index) and there is no requirement that they
/// be sorted.
///
/// # Examples
///
/// ```rust
/// use simplicial::core::face::Face;
/// use simplicial::core::triangulation_data_structure::Tds;
///
/// let mut tds: Tds<Option<()>, Option<()>, 3> = Tds::new();
/// let mut last = tds.insert_increase_dimension(None);
/// for _ in 0..4 {
///     last = tds.insert_increase_dimension(Some(last));
/// }
///
/// // The edge spanned by slots 0 and 2 of some full cell:
/// let cell = tds.full_cell_keys().next().unwrap();
/// let mut edge = Face::new(cell);
/// edge.set_index(0, 0);
/// edge.set_index(1, 2);
/// assert_eq!(edge.feature_dimension(), 1);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Face {
    full_cell: CellKey,
    indices: SlotBuffer<usize>,
}

impl Face {
    /// Creates an empty face addressed through `full_cell`; indices are added
    /// with [`set_index`](Face::set_index).
    #[must_use]
    pub const fn new(full_cell: CellKey) -> Self {
        Self {
            full_cell,
            indices: SlotBuffer::new_const(),
        }
    }

    /// The full cell this face is addressed through.
    #[must_use]
    pub const fn full_cell(&self) -> CellKey {
        self.full_cell
    }

    /// The feature dimension: number of face vertices minus one, or −1 for a
    /// face with no indices set yet.
    #[must_use]
    pub fn feature_dimension(&self) -> i32 {
        self.indices.len() as i32 - 1
    }

    /// The cell slot of the face's `i`-th vertex.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `i + 1` indices have been set.
    #[must_use]
    pub fn index(&self, i: usize) -> usize {
        self.indices[i]
    }

    /// Sets the cell slot of the face's `i`-th vertex, growing the face by
    /// one when `i` is the next unset position.
    ///
    /// # Panics
    ///
    /// Panics if `i` is more than one past the currently set indices.
    pub fn set_index(&mut self, i: usize, slot: usize) {
        if i == self.indices.len() {
            self.indices.push(slot);
        } else {
            self.indices[i] = slot;
        }
    }

    /// Iterates over the set cell slots in face order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Drops all indices, keeping the cell.
    pub fn clear(&mut self) {
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn cell_key() -> CellKey {
        let mut cells: SlotMap<CellKey, ()> = SlotMap::with_key();
        cells.insert(())
    }

    #[test]
    fn empty_face_has_negative_feature_dimension() {
        let f = Face::new(cell_key());
        assert_eq!(f.feature_dimension(), -1);
    }

    #[test]
    fn set_index_grows_and_overwrites() {
        let mut f = Face::new(cell_key());
        f.set_index(0, 3);
        f.set_index(1, 1);
        assert_eq!(f.feature_dimension(), 1);
        assert_eq!(f.index(0), 3);

        f.set_index(0, 2);
        assert_eq!(f.index(0), 2);
        assert_eq!(f.indices().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    #[should_panic]
    fn set_index_rejects_gaps() {
        let mut f = Face::new(cell_key());
        f.set_index(1, 0);
    }

    #[test]
    fn clear_resets_indices() {
        let mut f = Face::new(cell_key());
        f.set_index(0, 0);
        f.clear();
        assert_eq!(f.feature_dimension(), -1);
    }
}
