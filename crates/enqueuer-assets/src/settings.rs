//! Server-wide defaults applied to newly constructed assets.

use crate::area::{Area, Position};

/// What to do with configuration keys no entity recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Log a warning and skip the key.
    #[default]
    Warn,
    /// Fail with [`AssetError::UnknownOption`](crate::AssetError::UnknownOption).
    Reject,
}

/// Settings for an [`AssetServer`](crate::AssetServer).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Cache-busting version for assets that do not set one.
    pub default_version: String,
    /// Area for assets that do not set one.
    pub default_area: Area,
    /// Inline payload position for assets that do not set one.
    pub default_position: Position,
    /// Media query for styles that do not set one.
    pub default_media: String,
    /// Policy for unrecognized configuration keys.
    pub unknown_keys: UnknownKeys,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_version: "1.0.0".to_string(),
            default_area: Area::Front,
            default_position: Position::After,
            default_media: "screen".to_string(),
            unknown_keys: UnknownKeys::Warn,
        }
    }
}

impl Settings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default version.
    pub fn default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = version.into();
        self
    }

    /// Set the default area.
    pub fn default_area(mut self, area: Area) -> Self {
        self.default_area = area;
        self
    }

    /// Set the default inline position.
    pub fn default_position(mut self, position: Position) -> Self {
        self.default_position = position;
        self
    }

    /// Set the default style media query.
    pub fn default_media(mut self, media: impl Into<String>) -> Self {
        self.default_media = media.into();
        self
    }

    /// Set the unknown-key policy.
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }
}
