//! Error types for the asset layer.

use std::fmt;

use crate::host::HostError;

/// Errors that can occur during asset operations.
#[derive(Debug)]
pub enum AssetError {
    /// An asset or package was constructed without a name.
    MissingName {
        /// What was being constructed ("script", "style", "package").
        kind: &'static str,
    },

    /// The asset targets an area with no lifecycle event.
    UnknownArea {
        /// The asset name.
        name: String,
        /// The unrecognized area.
        area: String,
    },

    /// A configuration key that no entity recognizes.
    UnknownOption {
        /// The offending key.
        key: String,
    },

    /// A recognized configuration key with a value of the wrong shape.
    InvalidOption {
        /// The offending key.
        key: String,
        /// Description of the accepted shape.
        expected: &'static str,
    },

    /// The host collaborator failed.
    Host(HostError),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::MissingName { kind } => {
                write!(f, "The name of the {} is missing", kind)
            }
            AssetError::UnknownArea { name, area } => {
                write!(f, "Area not found for asset '{}': {}", name, area)
            }
            AssetError::UnknownOption { key } => {
                write!(f, "Unknown configuration option: {}", key)
            }
            AssetError::InvalidOption { key, expected } => {
                write!(f, "Invalid value for option '{}': expected {}", key, expected)
            }
            AssetError::Host(err) => write!(f, "Host error: {}", err),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Host(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<HostError> for AssetError {
    fn from(err: HostError) -> Self {
        AssetError::Host(err)
    }
}

/// Result type alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
