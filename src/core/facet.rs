//! Facets and rotors: the codimension-1 and codimension-2 sub-simplex
//! handles used when walking the triangulation.
//!
//! A [`Facet`] addresses the (d−1)-face of a full cell opposite one slot. A
//! [`Rotor`] addresses a (d−2)-face together with an orientation, which makes
//! it easy to rotate around that face in a self-contained fashion while
//! searching the boundary of a hole — see
//! [`Tds::rotate_rotor`](crate::core::triangulation_data_structure::Tds::rotate_rotor)
//! and the hole-insertion engine.

use super::{collections::FacetIndex, triangulation_data_structure::CellKey};

// =============================================================================
// FACET
// =============================================================================

/// A codimension-1 sub-simplex, addressed as the face of `full_cell` opposite
/// slot `index` (the *covertex*).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Facet {
    full_cell: CellKey,
    index: FacetIndex,
}

impl Facet {
    /// Addresses the facet of `full_cell` opposite slot `index`.
    #[must_use]
    pub const fn new(full_cell: CellKey, index: FacetIndex) -> Self {
        Self { full_cell, index }
    }

    /// The full cell this facet is addressed through.
    #[must_use]
    pub const fn full_cell(&self) -> CellKey {
        self.full_cell
    }

    /// The slot of the covertex, i.e. the vertex opposite this facet.
    #[must_use]
    pub const fn index_of_covertex(&self) -> usize {
        self.index as usize
    }
}

// =============================================================================
// ROTOR
// =============================================================================

/// A codimension-2 sub-simplex plus an orientation: the face of `full_cell`
/// opposite both `index` and `second`, entered "over" the covertex at
/// `index`.
///
/// Called a rotor because the two covertices can be rotated around the
/// sub-simplex, visiting every full cell that shares it in cyclic order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Rotor {
    full_cell: CellKey,
    index: FacetIndex,
    second: FacetIndex,
}

impl Rotor {
    /// Addresses the (d−2)-face of `full_cell` opposite slots `index` and
    /// `second`.
    ///
    /// # Panics
    ///
    /// Panics if the two covertex slots coincide.
    #[must_use]
    pub fn new(full_cell: CellKey, index: FacetIndex, second: FacetIndex) -> Self {
        assert_ne!(index, second, "a rotor needs two distinct covertices");
        Self {
            full_cell,
            index,
            second,
        }
    }

    /// The full cell this rotor is addressed through.
    #[must_use]
    pub const fn full_cell(&self) -> CellKey {
        self.full_cell
    }

    /// The slot of the first covertex — the one walked over when rotating.
    #[must_use]
    pub const fn index_of_covertex(&self) -> usize {
        self.index as usize
    }

    /// The slot of the second covertex — the pivot identifying the
    /// (d−2)-face.
    #[must_use]
    pub const fn index_of_second_covertex(&self) -> usize {
        self.second as usize
    }

    /// The facet opposite the first covertex; this is the candidate boundary
    /// facet when rotating around a hole.
    #[must_use]
    pub const fn facet(&self) -> Facet {
        Facet::new(self.full_cell, self.index)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn cell_key() -> CellKey {
        let mut cells: SlotMap<CellKey, ()> = SlotMap::with_key();
        cells.insert(())
    }

    #[test]
    fn facet_accessors() {
        let c = cell_key();
        let f = Facet::new(c, 2);
        assert_eq!(f.full_cell(), c);
        assert_eq!(f.index_of_covertex(), 2);
    }

    #[test]
    fn rotor_facet_drops_second_covertex() {
        let c = cell_key();
        let r = Rotor::new(c, 1, 3);
        assert_eq!(r.facet(), Facet::new(c, 1));
        assert_eq!(r.index_of_second_covertex(), 3);
    }

    #[test]
    #[should_panic(expected = "distinct covertices")]
    fn rotor_rejects_equal_covertices() {
        let _ = Rotor::new(cell_key(), 1, 1);
    }
}
