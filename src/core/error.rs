use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Invalid deployment: {0}")]
    InvalidDeployment(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reason codes for a rejected production request.
///
/// Production rejection is an expected outcome, not a fault: callers surface
/// the reason to the UI or AI and move on without retrying.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionError {
    #[error("insufficient resources")]
    InsufficientResources,

    #[error("commander already has a queued order")]
    CommanderBusy,

    #[error("unit is not a commander")]
    NotACommander,

    #[error("requested unit type is not in the catalog")]
    UnknownUnitType,

    #[error("commander instance not found")]
    UnknownCommander,
}
