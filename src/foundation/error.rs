/// Convenience result type used across the crate.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Error type returned by every scene-graph and façade operation.
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    /// Malformed input: bad name, non-finite number, wrong shape kind.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced window, scene, group or entity does not exist.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// The name is already taken, or the node is already attached at that place.
    #[error("duplicate error: {0}")]
    Duplicate(String),

    /// Internal inconsistency of the scene graph (a programming error).
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Configuration or script (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Failure reported by the visualization backend.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Discriminant of [`ViewerError`], convenient for matching in calling code and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ViewerError::Validation`].
    Validation,
    /// See [`ViewerError::Lookup`].
    Lookup,
    /// See [`ViewerError::Duplicate`].
    Duplicate,
    /// See [`ViewerError::Invariant`].
    Invariant,
    /// See [`ViewerError::Serde`].
    Serde,
    /// See [`ViewerError::Other`].
    Backend,
}

impl ViewerError {
    /// Build a [`ViewerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ViewerError::Lookup`] value.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Build a [`ViewerError::Duplicate`] value.
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Build a [`ViewerError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a [`ViewerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return the error discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Lookup(_) => ErrorKind::Lookup,
            Self::Duplicate(_) => ErrorKind::Duplicate,
            Self::Invariant(_) => ErrorKind::Invariant,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Backend,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
