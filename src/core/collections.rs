//! Collection types shared by the triangulation internals.
//!
//! The triangulation works with small, hot collections: per-cell slot arrays
//! of `D + 1` entries, breadth-first queues, and deduplication sets keyed by
//! handles. The aliases here pick the implementations used throughout the
//! crate so call sites stay uniform and the choices are documented once.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Compact index type for slot positions within a full cell.
///
/// A cell of current dimension d has d + 1 vertex slots and d + 1 facets, and
/// practical triangulations work with d ≤ 255, so a `u8` provides sufficient
/// range while keeping `(CellKey, FacetIndex)` pairs small.
pub type FacetIndex = u8;

/// Semantic constant for the maximum practical dimension.
///
/// Most applications work with dimensions 2–5, so 8 provides comfortable
/// headroom while keeping the per-cell slot arrays stack-allocated.
pub const MAX_PRACTICAL_DIMENSION_SIZE: usize = 8;

/// Fast `HashMap` for internal mappings keyed by handles or indices.
///
/// Uses `rustc_hash::FxHasher`, which is non-cryptographic and considerably
/// faster than the default hasher for small keys. Do not use with
/// attacker-controlled keys.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast `HashSet` counterpart of [`FastHashMap`].
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses stack allocation for small collections.
/// Generic size parameter allows customization per use case, with heap
/// fallback for larger collections.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Per-cell slot array: one entry per vertex slot, `D + 1` entries in total.
///
/// Sized by [`MAX_PRACTICAL_DIMENSION_SIZE`] so that cells in the common
/// dimensions never spill to the heap.
pub type SlotBuffer<T> = SmallVec<[T; MAX_PRACTICAL_DIMENSION_SIZE]>;
