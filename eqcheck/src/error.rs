//! Error types for the checking engine

use crate::application_scheme::ApplicationSchemeType;
use eqcheck_core::CircuitError;
use eqcheck_dd::DdError;
use thiserror::Error;

/// Errors raised while setting up or running an equivalence check
///
/// These fail the check outright; inconclusive outcomes are verdicts
/// ([`EquivalenceCriterion`](crate::EquivalenceCriterion)), not errors.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The requested application scheme does not fit the checker kind
    #[error("application scheme '{0}' is not supported by the {1} checker")]
    UnsupportedScheme(ApplicationSchemeType, &'static str),

    /// A circuit needs the dynamic-circuit transformation, which is off
    #[error(
        "circuit contains mid-circuit measurements or resets; \
         enable the dynamic circuit transformation to check it"
    )]
    DynamicCircuitUnsupported,

    /// The lookahead scheme was stepped before being wired up
    #[error("lookahead scheme used before its running diagram and package were set")]
    UninitializedScheme,

    /// An operation cannot be turned into a matrix during checking
    #[error("invalid gate during checking: {0}")]
    InvalidGate(String),

    /// The DD package hit its configured node limit
    #[error("decision diagram node limit of {0} exceeded")]
    OutOfNodes(usize),

    /// The gate-cost profile file is missing or malformed
    #[error("cost profile unreadable: {0}")]
    ProfileUnreadable(String),

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Circuit construction or preprocessing failed
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

impl From<DdError> for CheckError {
    fn from(err: DdError) -> Self {
        match err {
            DdError::NonUnitary(name) => CheckError::InvalidGate(name.to_string()),
            DdError::OutOfNodes(limit) => CheckError::OutOfNodes(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dd_error_conversion() {
        let err: CheckError = DdError::OutOfNodes(512).into();
        assert!(matches!(err, CheckError::OutOfNodes(512)));
        let err: CheckError = DdError::NonUnitary("reset").into();
        assert!(matches!(err, CheckError::InvalidGate(ref s) if s == "reset"));
    }

    #[test]
    fn test_display() {
        let msg = format!("{}", CheckError::DynamicCircuitUnsupported);
        assert!(msg.contains("dynamic circuit transformation"));
    }
}
