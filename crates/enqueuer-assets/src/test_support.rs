//! Host stand-in for unit tests that never inspect host state.

use serde_json::Value;

use crate::area::Position;
use crate::host::{AssetDefinition, AssetType, Host, HostResult, Status, TagFilter};

/// Accepts every call and knows no asset.
pub(crate) struct NullHost;

impl Host for NullHost {
    fn register(&self, _: &AssetDefinition) -> HostResult<()> {
        Ok(())
    }

    fn enqueue(&self, _: &AssetDefinition) -> HostResult<()> {
        Ok(())
    }

    fn enqueue_registered(&self, _: AssetType, _: &str) -> HostResult<()> {
        Ok(())
    }

    fn deregister(&self, _: AssetType, _: &str) -> HostResult<()> {
        Ok(())
    }

    fn dequeue(&self, _: AssetType, _: &str) -> HostResult<()> {
        Ok(())
    }

    fn status(&self, _: AssetType, _: &str, _: Status) -> bool {
        false
    }

    fn add_inline(&self, _: AssetType, _: &str, _: &str, _: Position) -> HostResult<()> {
        Ok(())
    }

    fn localize(&self, _: &str, _: &str, _: &Value) -> HostResult<()> {
        Ok(())
    }

    fn add_tag_filter(&self, _: AssetType, _: TagFilter) -> HostResult<()> {
        Ok(())
    }
}
