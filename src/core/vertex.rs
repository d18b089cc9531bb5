//! Data and operations on triangulation vertices.
//!
//! This module provides the `Vertex` struct which represents a vertex of the
//! combinatorial triangulation: an opaque user payload, a unique
//! identification, and a back-pointer to one incident full cell. There are no
//! coordinates here — geometry lives in the layers built on top of the
//! combinatorial core.
//!
//! # Key Features
//!
//! - **Unique Identification**: Each vertex has a UUID for consistent
//!   identification across serialization and in diagnostics
//! - **Optional Payload**: Supports attaching user data of any type `U` that
//!   implements [`DataType`], or use `()` for no data
//! - **Incident Cell Tracking**: Maintains a reference to one containing full
//!   cell (managed by the triangulation data structure)
//!
//! # Examples
//!
//! ```rust
//! use simplicial::core::vertex::Vertex;
//!
//! let plain: Vertex<()> = Vertex::new();
//! assert!(plain.data.is_none());
//!
//! let decorated: Vertex<i32> = Vertex::with_data(42);
//! assert_eq!(decorated.data, Some(42));
//! ```

use super::{
    traits::DataType,
    triangulation_data_structure::CellKey,
    util::{UuidValidationError, make_uuid, validate_uuid},
};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during vertex validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VertexValidationError {
    /// The vertex has an invalid UUID.
    #[error("Invalid UUID: {source}")]
    InvalidUuid {
        /// The underlying UUID validation error.
        #[from]
        source: UuidValidationError,
    },
    /// The vertex has no incident full cell.
    #[error("Vertex has no incident full cell")]
    MissingIncidentCell,
}

// =============================================================================
// VERTEX STRUCT DEFINITION
// =============================================================================

/// The `Vertex` struct represents a vertex of the triangulation with unique
/// identification and optional payload.
///
/// # Generic Parameters
///
/// * `U` - User payload type that implements [`DataType`] (use `()` for no
///   data)
///
/// # Properties
///
/// - **`uuid`**: A universally unique identifier (auto-generated)
/// - **`full_cell`**: Reference to one containing full cell, maintained by
///   the triangulation data structure. Which incident cell it names is
///   arbitrary and may change across operations; that it names *some*
///   incident cell is an invariant.
/// - **`data`**: Optional user-defined payload
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Vertex<U>
where
    U: DataType,
{
    /// A universally unique identifier for the vertex.
    uuid: Uuid,
    /// The key of one full cell this vertex is incident to.
    ///
    /// Managed by the triangulation data structure; `None` only for a vertex
    /// not yet wired into a complex. Not serialized — the flat stream format
    /// reconstructs incidence from the cells.
    pub(crate) full_cell: Option<CellKey>,
    /// Optional payload associated with the vertex.
    pub data: Option<U>,
}

// =============================================================================
// VERTEX IMPLEMENTATION
// =============================================================================

impl<U> Vertex<U>
where
    U: DataType,
{
    /// Creates a new vertex with a fresh UUID and no payload.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: make_uuid(),
            full_cell: None,
            data: None,
        }
    }

    /// Creates a new vertex carrying `data`.
    #[must_use]
    pub fn with_data(data: U) -> Self {
        Self {
            uuid: make_uuid(),
            full_cell: None,
            data: Some(data),
        }
    }

    /// Returns the vertex's UUID.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the key of one incident full cell, or `None` if the vertex is
    /// not wired into a complex.
    #[must_use]
    pub const fn full_cell(&self) -> Option<CellKey> {
        self.full_cell
    }

    /// Checks the vertex in isolation: a valid UUID and a set incident cell.
    ///
    /// Whether the incident cell actually contains this vertex is checked by
    /// the triangulation-level validation, which can see both stores.
    ///
    /// # Errors
    ///
    /// Returns a [`VertexValidationError`] describing the first failed check.
    pub fn is_valid(&self) -> Result<(), VertexValidationError> {
        validate_uuid(&self.uuid)?;
        if self.full_cell.is_none() {
            return Err(VertexValidationError::MissingIncidentCell);
        }
        Ok(())
    }
}

impl<U> Default for Vertex<U>
where
    U: DataType,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn arbitrary_cell_key() -> CellKey {
        let mut cells: SlotMap<CellKey, ()> = SlotMap::with_key();
        cells.insert(())
    }

    #[test]
    fn new_vertex_has_unique_v4_uuid() {
        let a: Vertex<()> = Vertex::new();
        let b: Vertex<()> = Vertex::new();
        assert_ne!(a.uuid(), b.uuid());
        assert_eq!(a.uuid().get_version_num(), 4);
    }

    #[test]
    fn with_data_stores_payload() {
        let v: Vertex<char> = Vertex::with_data('x');
        assert_eq!(v.data, Some('x'));
        assert!(v.full_cell().is_none());
    }

    #[test]
    fn unwired_vertex_is_invalid() {
        let v: Vertex<()> = Vertex::new();
        assert_eq!(v.is_valid(), Err(VertexValidationError::MissingIncidentCell));
    }

    #[test]
    fn wired_vertex_is_valid() {
        let mut v: Vertex<()> = Vertex::new();
        v.full_cell = Some(arbitrary_cell_key());
        assert!(v.is_valid().is_ok());
    }
}
