use thiserror::Error;

/// Domain failures raised by the linker and the packaging tool.
///
/// These are returned wrapped in [`anyhow::Error`]; callers that need to tell
/// them apart use `err.downcast_ref::<PackError>()`. Plain I/O failures are
/// not wrapped and surface as ordinary `anyhow` errors with context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    /// Missing or invalid `foundryconfig.json` data, missing `Data` directory,
    /// or an unrecognized manifest file name.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required JSON fields or unreadable input files.
    #[error("Packaging error: {0}")]
    Packaging(String),
}

impl PackError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        PackError::Configuration(msg.into())
    }

    pub fn packaging(msg: impl Into<String>) -> Self {
        PackError::Packaging(msg.into())
    }
}

/// Returns true if `err` is a [`PackError::Configuration`].
pub fn is_configuration_error(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<PackError>(), Some(PackError::Configuration(_)))
}

/// Returns true if `err` is a [`PackError::Packaging`].
pub fn is_packaging_error(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<PackError>(), Some(PackError::Packaging(_)))
}
