//! The host platform's asset API, as seen by this crate.
//!
//! The host owns the real script/style tables and tag emission. Everything here
//! is a direct call into it; failures are returned unmodified.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::area::Position;

/// Error raised by a host implementation.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for host calls.
pub type HostResult<T> = Result<T, HostError>;

/// The two asset kinds a host knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Script,
    Style,
}

impl AssetType {
    pub fn name(self) -> &'static str {
        match self {
            AssetType::Script => "script",
            AssetType::Style => "style",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-side status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Registered,
    Enqueued,
}

/// Kind-specific placement passed along with a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Scripts: print in the footer instead of the head.
    Footer(bool),
    /// Styles: the media query.
    Media(String),
}

/// Everything the host needs to register or enqueue an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDefinition {
    pub kind: AssetType,
    pub name: String,
    /// Resolved source path or URL.
    pub src: String,
    /// Dependency names already known to the host.
    pub deps: Vec<String>,
    pub version: String,
    pub placement: Placement,
}

/// A tag about to be printed by the host.
#[derive(Debug, Clone, Copy)]
pub struct Tag<'a> {
    /// The rendered HTML so far.
    pub html: &'a str,
    /// Name of the asset the tag belongs to.
    pub handle: &'a str,
    pub href: &'a str,
    /// Media query, styles only.
    pub media: Option<&'a str>,
}

/// Rewrites a rendered tag. Called once per printed tag of the filter's kind.
pub type TagFilter = Arc<dyn Fn(&Tag<'_>) -> String + Send + Sync>;

/// The host platform's asset API.
pub trait Host: Send + Sync {
    /// Declare an asset without printing it.
    fn register(&self, asset: &AssetDefinition) -> HostResult<()>;

    /// Declare and queue an asset in one call.
    fn enqueue(&self, asset: &AssetDefinition) -> HostResult<()>;

    /// Queue an asset the host already knows.
    fn enqueue_registered(&self, kind: AssetType, name: &str) -> HostResult<()>;

    fn deregister(&self, kind: AssetType, name: &str) -> HostResult<()>;

    fn dequeue(&self, kind: AssetType, name: &str) -> HostResult<()>;

    fn status(&self, kind: AssetType, name: &str, status: Status) -> bool;

    /// Attach literal code next to the asset's tag.
    fn add_inline(&self, kind: AssetType, name: &str, code: &str, position: Position) -> HostResult<()>;

    /// Expose `data` to a script as a global named `object`.
    fn localize(&self, name: &str, object: &str, data: &Value) -> HostResult<()>;

    /// Subscribe a rewrite hook to the tag rendering of `kind`.
    fn add_tag_filter(&self, kind: AssetType, filter: TagFilter) -> HostResult<()>;
}
