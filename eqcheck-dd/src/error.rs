//! Error types for eqcheck-dd

use thiserror::Error;

/// Errors reported by the decision-diagram package
#[derive(Debug, Error)]
pub enum DdError {
    /// Asked to build a matrix for an operation without one
    #[error("operation '{0}' has no unitary representation")]
    NonUnitary(&'static str),

    /// The configured node limit was exceeded
    #[error("decision diagram node limit of {0} exceeded")]
    OutOfNodes(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let msg = format!("{}", DdError::NonUnitary("measure"));
        assert!(msg.contains("measure"));
        let msg = format!("{}", DdError::OutOfNodes(1024));
        assert!(msg.contains("1024"));
    }
}
