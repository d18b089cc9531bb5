//! Utility functions for the triangulation core.

use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during UUID validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UuidValidationError {
    /// The UUID is nil (all zeros), which is not allowed.
    #[error("UUID is nil (all zeros) which is not allowed")]
    NilUuid,
    /// The UUID is not version 4.
    #[error("UUID is not version 4: expected version 4, found version {found}")]
    InvalidVersion {
        /// The version number that was found.
        found: usize,
    },
}

// =============================================================================
// UUID HELPERS
// =============================================================================

/// The function `make_uuid` generates a version 4 [`Uuid`].
///
/// # Example
///
/// ```rust
/// use simplicial::core::util::make_uuid;
/// let uuid = make_uuid();
/// assert_eq!(uuid.get_version_num(), 4);
/// ```
#[must_use]
pub fn make_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Validates that a [`Uuid`] is non-nil and version 4.
///
/// Entity UUIDs are always produced by [`make_uuid`], so anything else
/// indicates a corrupted or hand-rolled entity.
///
/// # Errors
///
/// Returns [`UuidValidationError::NilUuid`] for the nil UUID and
/// [`UuidValidationError::InvalidVersion`] for any version other than 4.
pub fn validate_uuid(uuid: &Uuid) -> Result<(), UuidValidationError> {
    if uuid.is_nil() {
        return Err(UuidValidationError::NilUuid);
    }
    let version = uuid.get_version_num();
    if version != 4 {
        return Err(UuidValidationError::InvalidVersion { found: version });
    }
    Ok(())
}
