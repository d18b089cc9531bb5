//! Payload traits for the triangulation data structure.
//!
//! This module contains the trait definition for the opaque data carried by
//! vertices and full cells. Payloads are stored, compared and serialized by
//! the triangulation but never influence any combinatorial decision.

use serde::{Serialize, de::DeserializeOwned};
use std::{fmt::Debug, hash::Hash};

/// Trait alias for data types that can be stored in vertices and full cells.
///
/// This trait alias captures all the requirements for payloads associated
/// with vertices and cells in the triangulation data structure.
///
/// # Required Traits
///
/// - `Clone`: Payloads are duplicated when a full cell is copied during an
///   insertion
/// - `Eq` + `PartialEq`: For equality comparison in tests and validation
/// - `Hash`: For use in hash-based collections
/// - `Debug`: For debug formatting
/// - `Serialize` / `DeserializeOwned`: For the flat stream format
///
/// # Usage
///
/// ```rust
/// use simplicial::core::DataType;
///
/// fn process_data<T: DataType>(data: T) {
///     // T has all the necessary bounds for use as vertex/cell data
/// }
///
/// // Examples of types that implement DataType:
/// // - u32, i64, char (primitive types)
/// // - Option<T> where T: DataType
/// // - () (unit type for no data)
/// // - custom enums and structs with serde derives
/// ```
pub trait DataType: Clone + Eq + Hash + PartialEq + Debug + Serialize + DeserializeOwned {}

// Blanket implementation for all types that satisfy the bounds
impl<T> DataType for T where T: Clone + Eq + Hash + PartialEq + Debug + Serialize + DeserializeOwned {}
