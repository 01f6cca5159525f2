//! Profiling utilities based on the `puffin` crate.
//!
//! A host request plays the role of a frame: scopes recorded between two calls to
//! [`end_request`] belong to the same request lifecycle.

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

/// Enable or disable scope collection.
///
/// # Example
/// ```no_run
/// use enqueuer_core::profiling::set_enabled;
///
/// set_enabled(true);
/// ```
pub fn set_enabled(enabled: bool) {
    puffin::set_scopes_on(enabled);
}

/// Returns true when scopes are being collected.
pub fn is_enabled() -> bool {
    puffin::are_scopes_on()
}

/// Close the profiling frame of the current request.
#[inline]
pub fn end_request() {
    puffin::GlobalProfiler::lock().new_frame();
}
