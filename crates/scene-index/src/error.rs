use thiserror::Error;

use crate::scene::ObjectId;

/// Errors from index maintenance.
///
/// Queries never fail; objects that cannot be tested are left out of the
/// results instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("object {0} is already registered")]
    AlreadyRegistered(ObjectId),

    #[error("object {0} is not registered")]
    NotRegistered(ObjectId),

    /// The host could not classify the object.
    #[error("object {0} is unknown to the scene")]
    UnknownObject(ObjectId),

    /// The object may be pooled or has no computable bounds.
    #[error("object {0} cannot be indexed")]
    NotIndexable(ObjectId),
}
