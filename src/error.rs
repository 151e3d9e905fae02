use thiserror::Error;

/// Failures reported by the fallible operations of a [`DualKeyIndex`](crate::DualKeyIndex).
///
/// Every failure is a pure function of the current contents and the arguments, so retrying the
/// same call against an unchanged index reproduces the same error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Key A is already bound to a different key B
    #[error("key A is already bound to a different key B")]
    KeyAConflict,

    /// Key B is already bound to a different key A
    #[error("key B is already bound to a different key A")]
    KeyBConflict,

    /// The key used for removal is not present
    #[error("key does not exist")]
    NotFound,
}

/// Result type specialized for index operations
pub type Result<T> = std::result::Result<T, Error>;
