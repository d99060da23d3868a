//! Defines the `Error` type for the diagnet library

use std::result;

pub type Result<T> = result::Result<T, DiagnetError>;

/// The broad class an error belongs to. The class decides how a caller reacts: configuration
/// errors abort startup, domain errors are programming errors, and numeric errors only discard
/// the single query that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Domain,
    Numeric,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DiagnetError {

    /// The knowledge base violates one of its invariants
    #[error("invalid knowledge base: {0}")]
    InvalidKnowledgeBase(String),

    /// A parent variable was expected in the model, but not found
    #[error("missing parent: {0}")]
    MissingParent(String),

    /// A variable was present multiple times where it should only be present once
    #[error("duplicate variable: {0}")]
    DuplicateVariable(String),

    /// An `Initialization` that cannot produce a CPD for the requested variable
    #[error("invalid initialization: {0}")]
    InvalidInitialization(String),

    /// We expected a CPD but the table is not normalized over its child variable
    #[error("not a conditional probability distribution: {0}")]
    NotACPD(String),

    /// A runtime setting could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation referenced a variable outside of a factor's scope
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// An incomplete assignment was given where a complete assignment was required
    #[error("missing assignments to the required variables")]
    IncompleteAssignment,

    /// Normalization of a factor whose total mass is zero (or not finite)
    #[error("cannot normalize a factor with total mass {0}")]
    ZeroPartition(f64),

}

impl DiagnetError {

    /// The class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiagnetError::InvalidKnowledgeBase(_)
            | DiagnetError::MissingParent(_)
            | DiagnetError::DuplicateVariable(_)
            | DiagnetError::InvalidInitialization(_)
            | DiagnetError::NotACPD(_)
            | DiagnetError::InvalidConfig(_) => ErrorKind::Config,
            DiagnetError::InvalidScope(_) | DiagnetError::IncompleteAssignment => ErrorKind::Domain,
            DiagnetError::ZeroPartition(_) => ErrorKind::Numeric,
        }
    }

}
