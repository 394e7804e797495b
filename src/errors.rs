use thiserror::Error;

/// Errors raised while building, encoding or checking compressed account inclusion proofs.
///
/// A proof that recomputes to the wrong root is not an error: verification returns
/// `Ok(false)` for it. These variants cover malformed inputs caught at the boundary and
/// failures of the surrounding I/O and proving stack.
#[derive(Debug, Error)]
pub enum InclusionError {
    #[error("Merkle path has {actual} siblings, expected {expected}")]
    InvalidPathLength { expected: usize, actual: usize },
    #[error("Leaf index {index} does not fit in a tree of depth {depth}")]
    LeafIndexOutOfRange { index: u64, depth: usize },
    #[error("PublicInputGreaterThanFieldSize")]
    PublicInputGreaterThanFieldSize,
    #[error("Invalid field element encoding: {0}")]
    InvalidFieldEncoding(String),
    #[error("The tree depth must be between 1 and {max}, got {depth}")]
    InvalidTreeDepth { depth: usize, max: usize },
    #[error("{leaves} leaves do not fit in a tree of depth {depth}")]
    TooManyLeaves { leaves: usize, depth: usize },
    #[error("Account at slot {slot} declares leaf index {declared}")]
    LeafIndexMismatch { slot: usize, declared: u64 },
    #[error("The leaf does not exist in this tree")]
    LeafNotFound,
    #[error("Poseidon hash failed: {0}")]
    Hash(String),
    #[error("Failed to load setup params: {0}")]
    Setup(String),
    #[error("Circuit synthesis failed: {0:?}")]
    Synthesis(halo2_proofs::plonk::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<halo2_proofs::plonk::Error> for InclusionError {
    fn from(error: halo2_proofs::plonk::Error) -> Self {
        InclusionError::Synthesis(error)
    }
}

/// Stable numeric codes, for callers that report failures across an FFI or program boundary.
impl From<InclusionError> for u32 {
    fn from(error: InclusionError) -> Self {
        match error {
            InclusionError::InvalidPathLength { .. } => 0,
            InclusionError::LeafIndexOutOfRange { .. } => 1,
            InclusionError::PublicInputGreaterThanFieldSize => 2,
            InclusionError::InvalidFieldEncoding(_) => 3,
            InclusionError::InvalidTreeDepth { .. } => 4,
            InclusionError::TooManyLeaves { .. } => 5,
            InclusionError::LeafIndexMismatch { .. } => 6,
            InclusionError::LeafNotFound => 7,
            InclusionError::Hash(_) => 8,
            InclusionError::Setup(_) => 9,
            InclusionError::Synthesis(_) => 10,
            InclusionError::Io(_) => 11,
            InclusionError::Csv(_) => 12,
            InclusionError::Json(_) => 13,
        }
    }
}

pub type Result<T> = std::result::Result<T, InclusionError>;

#[cfg(test)]
mod tests {
    use super::InclusionError;

    #[test]
    fn test_error_codes_are_stable() {
        let code: u32 = InclusionError::PublicInputGreaterThanFieldSize.into();
        assert_eq!(code, 2);

        let code: u32 = InclusionError::InvalidPathLength {
            expected: 26,
            actual: 25,
        }
        .into();
        assert_eq!(code, 0);

        let code: u32 = InclusionError::LeafNotFound.into();
        assert_eq!(code, 7);
    }

    #[test]
    fn test_error_messages() {
        let error = InclusionError::LeafIndexOutOfRange {
            index: 4,
            depth: 2,
        };
        assert_eq!(
            error.to_string(),
            "Leaf index 4 does not fit in a tree of depth 2"
        );
    }
}
