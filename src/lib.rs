//! # simplicial
//!
//! A library for building and editing the *combinatorial* part of a
//! d-dimensional triangulation — an
//! [abstract simplicial complex](https://en.wikipedia.org/wiki/Abstract_simplicial_complex)
//! triangulating a topological sphere — inspired by
//! [CGAL](https://www.cgal.org)'s triangulation data structures.
//!
//! # Features
//!
//! - Arbitrary ambient dimension `D` (compile-time constant), with a runtime
//!   current dimension growing from the empty complex up to `D`
//! - Local update operations: vertex insertion in a full cell, a face, a
//!   facet, or an arbitrary star-shaped hole of cells
//! - Dimension growth (`insert_increase_dimension`) and shrinkage
//!   (`remove_decrease_dimension`), plus face collapse
//! - Opaque vertex and full-cell payloads (see
//!   [`DataType`](core::traits::DataType) for constraints) that never
//!   influence combinatorial decisions
//! - Serialization/deserialization with [serde](https://serde.rs) in a flat
//!   index-based layout
//!
//! There is **no geometry** here: points, predicates and orientation tests
//! belong to layers built on top of this crate.
//!
//! # Basic Usage
//!
//! A triangulated sphere is grown one dimension at a time. Each call to
//! [`insert_increase_dimension`](core::triangulation_data_structure::Tds::insert_increase_dimension)
//! adds one vertex and raises the current dimension by one:
//!
//! ```rust
//! use simplicial::core::triangulation_data_structure::Tds;
//!
//! let mut tds: Tds<Option<()>, Option<()>, 2> = Tds::new();
//! assert_eq!(tds.current_dimension(), -2); // empty complex
//!
//! let star = tds.insert_increase_dimension(None); // first vertex
//! let mut last = star;
//! for _ in 0..3 {
//!     last = tds.insert_increase_dimension(Some(last));
//! }
//!
//! // The boundary of a 2-simplex plus its completion through `star`:
//! assert_eq!(tds.current_dimension(), 2);
//! assert_eq!(tds.number_of_vertices(), 4);
//! assert_eq!(tds.number_of_full_cells(), 4);
//! assert!(tds.is_valid().is_ok());
//! ```
//!
//! Once full-dimensional, the complex is refined with the local operations:
//!
//! ```rust
//! use simplicial::core::triangulation_data_structure::Tds;
//!
//! let mut tds: Tds<Option<()>, Option<()>, 2> = Tds::new();
//! let mut last = tds.insert_increase_dimension(None);
//! for _ in 0..3 {
//!     last = tds.insert_increase_dimension(Some(last));
//! }
//!
//! // Split any full cell into D + 1 new cells around a fresh vertex.
//! let cell = tds.full_cell_keys().next().unwrap();
//! let v = tds.insert_in_full_cell(cell);
//!
//! assert_eq!(tds.number_of_vertices(), 5);
//! assert_eq!(tds.number_of_full_cells(), 6);
//! assert_eq!(tds.incident_full_cells_of_vertex(v).len(), 3);
//! assert!(tds.is_valid().is_ok());
//! ```
//!
//! # Structural Invariants
//!
//! Between operations the complex satisfies the invariants checked by
//! [`Tds::is_valid`](core::triangulation_data_structure::Tds::is_valid):
//!
//! - **Neighbor symmetry** — neighbor links are mutual, with consistent
//!   mirror indices on both sides.
//! - **Shared facets** — two neighboring full cells share exactly
//!   `current_dimension` vertices, one facet on each side.
//! - **Distinct vertices** — no full cell lists the same vertex twice.
//! - **Incidence** — every vertex appears in the full cell it points to.
//! - **Mark discipline** — every traversal mark is clear between operations.
//!
//! Contract violations (out-of-range slot, wrong current dimension, a handle
//! from another complex) are programming errors and panic; they are not
//! recoverable conditions.
//!
//! # References
//!
//! - Samuel Hornus's CGAL `Triangulation_data_structure`, the design this
//!   crate follows
//! - [CGAL dD Triangulation documentation](https://doc.cgal.org/latest/Triangulation/index.html)

#![forbid(unsafe_code)]

/// The `core` module contains the primary data structures and algorithms for
/// building and manipulating combinatorial triangulations.
///
/// It includes the `Tds` struct, which represents the triangulation, as well
/// as the `FullCell`, `Facet`, `Face` and `Vertex` components. The crate also
/// includes a `prelude` module for convenient access to commonly used types.
pub mod core {
    /// Update and traversal algorithms over the triangulation data structure.
    pub mod algorithms {
        /// Dimension growth and shrinkage.
        pub mod dimension;
        /// Breadth-first gathering of full cells with transient marks.
        pub mod gathering;
        /// Vertex insertion in a full cell, a face, a facet, or a hole.
        pub mod insertion;
        /// Face collapse.
        pub mod removal;
        pub use gathering::*;
    }
    /// Collection types shared by the triangulation internals.
    pub mod collections;
    pub mod face;
    pub mod facet;
    pub mod full_cell;
    pub mod triangulation_data_structure;
    pub mod util;
    pub mod vertex;
    /// Traits for triangulation payload types.
    pub mod traits {
        pub mod data_type;
        pub use data_type::*;
    }
    // Re-export the `core` modules.
    pub use face::*;
    pub use facet::*;
    pub use full_cell::*;
    pub use traits::*;
    pub use triangulation_data_structure::*;
    pub use util::*;
    pub use vertex::*;
    // Note: collections is not re-exported here to avoid namespace pollution.
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    pub use crate::core::{
        algorithms::gathering::*,
        face::*,
        facet::*,
        full_cell::*,
        traits::data_type::*,
        triangulation_data_structure::*,
        vertex::*,
    };

    // Collection aliases that show up in public signatures and downstream code.
    pub use crate::core::collections::{FacetIndex, FastHashMap, FastHashSet, SmallBuffer};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{
        core::{full_cell::FullCell, triangulation_data_structure::Tds, vertex::Vertex},
        is_normal,
    };

    #[test]
    fn normal_types() {
        assert!(is_normal::<Vertex<u32>>());
        assert!(is_normal::<Vertex<Option<()>>>());
        assert!(is_normal::<FullCell<Option<()>>>());
        assert!(is_normal::<Tds<Option<()>, Option<()>, 4>>());
    }

    #[test]
    fn prelude_exports() {
        use crate::prelude::*;

        let mut map: FastHashMap<u64, usize> = FastHashMap::default();
        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));

        let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
        buffer.push(42);
        assert_eq!(buffer.len(), 1);

        let _tds: Tds<Option<()>, Option<()>, 3> = Tds::default();
    }
}
